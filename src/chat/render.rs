//! Markup for one answered question: answer line, timing line, confidence
//! badge and the structured-info panel.

use super::schema::{ChatResponse, Source};
use crate::markup::escape_html;
use crate::view::Badge;
use std::fmt::Write;
use std::time::Duration;

pub const NO_ANSWER: &str = "(sin respuesta)";
pub const NO_SOURCES: &str = "No se encontraron fuentes relevantes.";

/// Latency bucket shown next to the response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedClass {
    Fast,
    Medium,
    Slow,
}

impl SpeedClass {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < 2.0 {
            Self::Fast
        } else if seconds < 5.0 {
            Self::Medium
        } else {
            Self::Slow
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Fast => "⚡",
            Self::Medium => "🚀",
            Self::Slow => "⏳",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        }
    }
}

/// Icon appended to the bot name: cache tier when cached, otherwise a bolt
/// for answers that arrived in under two seconds.
pub fn cache_icon(response: &ChatResponse, elapsed: Duration) -> &'static str {
    if response.is_cached() {
        match response.cache_type.as_deref() {
            Some("memory") => " ⚡",
            _ => " 🚀",
        }
    } else if elapsed < Duration::from_secs(2) {
        " ⚡"
    } else {
        ""
    }
}

/// Inner markup of the bot answer message.
pub fn answer_html(response: &ChatResponse, elapsed: Duration) -> String {
    let text = response.response.as_deref().unwrap_or(NO_ANSWER);
    format!("Bot{}: {}", cache_icon(response, elapsed), escape_html(text))
}

/// Class and markup of the response-time line. The server's figure wins when
/// it parses; otherwise the locally measured time is used.
pub fn response_time_line(response: &ChatResponse, elapsed: Duration) -> (String, String) {
    let local = elapsed.as_secs_f64();
    let (display, seconds) = match &response.response_time {
        Some(server) => (server.display(), server.seconds().unwrap_or(local)),
        None => (format!("{local:.2}s"), local),
    };
    let speed = SpeedClass::from_seconds(seconds);
    let cache = if response.is_cached() { " (cache)" } else { "" };
    (
        format!("response-time {}", speed.as_str()),
        format!("{} Tiempo: {}{}", speed.icon(), escape_html(&display), cache),
    )
}

pub fn confidence_badge(response: &ChatResponse) -> Badge {
    match response.confidence.as_deref().filter(|c| !c.is_empty()) {
        Some(label) => Badge {
            text: format!("Confianza: {label}"),
            class: format!("badge {label}"),
        },
        None => Badge { text: "Confianza: —".into(), class: "badge unknown".into() },
    }
}

/// The structured-info panel, rebuilt from scratch for every answer.
pub fn render_panel(response: &ChatResponse) -> String {
    let mut html = String::from(r#"<div id="sourcesList">"#);

    if !response.key_points.is_empty() {
        html.push_str(r#"<div class="key-points"><h5>🎯 Puntos clave:</h5><ul class="key-points-list">"#);
        for point in &response.key_points {
            let _ = write!(html, "<li>{}</li>", escape_html(point));
        }
        html.push_str("</ul></div>");
    }

    if !response.specific_articles.is_empty() {
        html.push_str(r#"<div class="specific-articles"><h5>📋 Referencias específicas:</h5><div class="articles-list">"#);
        for article in &response.specific_articles {
            let _ = write!(html, r#"<span class="article-tag">{}</span>"#, escape_html(article));
        }
        html.push_str("</div></div>");
    }

    if !response.exact_quotes.is_empty() {
        html.push_str(r#"<div class="exact-quotes"><h5>💬 Citas exactas:</h5><div class="quotes-list">"#);
        for quote in &response.exact_quotes {
            let _ = write!(html, "<blockquote>\"{}\"</blockquote>", escape_html(quote));
        }
        html.push_str("</div></div>");
    }

    if let Some(missing) = response.missing_info() {
        let _ = write!(
            html,
            r#"<div class="missing-info"><h5>⚠️ Información adicional necesaria:</h5><p>{}</p></div>"#,
            escape_html(missing)
        );
    }

    if response.sources.is_empty() {
        let _ = write!(html, r#"<div class="no-sources">{NO_SOURCES}</div>"#);
    } else {
        html.push_str(r#"<div class="sources-section"><h5>📚 Fuentes:</h5>"#);
        for (idx, source) in response.sources.iter().enumerate() {
            html.push_str(&source_item(idx + 1, source));
        }
        html.push_str("</div>");
    }

    if !response.cross_references.is_empty() {
        html.push_str(r#"<div class="cross-references"><h5>🔗 Conexiones encontradas:</h5><ul>"#);
        for reference in &response.cross_references {
            let _ = write!(html, "<li>{}</li>", escape_html(reference));
        }
        html.push_str("</ul></div>");
    }

    html.push_str("</div>");
    html
}

fn source_item(number: usize, source: &Source) -> String {
    let page = source.page.map(|p| format!(" (p. {p})")).unwrap_or_default();
    let relevance = source
        .relevance_percent()
        .map(|r| format!(" — relevancia: {r}%"))
        .unwrap_or_default();
    format!(
        r#"<div class="source-item"><div class="source-header">Fuente {number}: <strong>{}</strong>{page}{relevance}</div><div class="source-snippet">{}</div></div>"#,
        escape_html(source.identifier()),
        escape_html(source.text_snippet.as_deref().unwrap_or("")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::schema::ResponseTime;

    fn full_response() -> ChatResponse {
        serde_json::from_value(serde_json::json!({
            "response": "El plazo es de 30 días.",
            "confidence": "high",
            "key_points": ["Plazo <30> días"],
            "specific_articles": ["Art. 12"],
            "exact_quotes": ["el plazo será de treinta días"],
            "missing_info": "Fecha de notificación",
            "sources": [
                {"source": "codigo.pdf", "page": 3, "score": 1.0, "text_snippet": "Artículo 12..."},
                {"source_id": "anexo.txt"}
            ],
            "cross_references": ["Art. 12 ↔ Art. 40"]
        }))
        .unwrap()
    }

    #[test]
    fn speed_thresholds() {
        assert_eq!(SpeedClass::from_seconds(1.99), SpeedClass::Fast);
        assert_eq!(SpeedClass::from_seconds(2.0), SpeedClass::Medium);
        assert_eq!(SpeedClass::from_seconds(4.99), SpeedClass::Medium);
        assert_eq!(SpeedClass::from_seconds(5.0), SpeedClass::Slow);
    }

    #[test]
    fn cache_icon_depends_on_tier() {
        let slow = Duration::from_secs(9);
        let mut response = ChatResponse { cached: Some(true), cache_type: Some("memory".into()), ..Default::default() };
        assert_eq!(cache_icon(&response, slow), " ⚡");
        response.cache_type = Some("disk".into());
        assert_eq!(cache_icon(&response, slow), " 🚀");
        response.cache_type = None;
        assert_eq!(cache_icon(&response, slow), " 🚀");
        response.cached = Some(false);
        assert_eq!(cache_icon(&response, slow), "");
        assert_eq!(cache_icon(&response, Duration::from_millis(300)), " ⚡");
    }

    #[test]
    fn answer_is_escaped_and_defaults() {
        let response = ChatResponse { response: Some("<b>hola</b>".into()), ..Default::default() };
        assert_eq!(answer_html(&response, Duration::from_secs(3)), "Bot: &lt;b&gt;hola&lt;/b&gt;");
        assert_eq!(answer_html(&ChatResponse::default(), Duration::from_secs(3)), "Bot: (sin respuesta)");
    }

    #[test]
    fn response_time_prefers_server_figure() {
        let response = ChatResponse {
            response_time: Some(ResponseTime::Text("6.10s".into())),
            cached: Some(true),
            ..Default::default()
        };
        let (class, html) = response_time_line(&response, Duration::from_millis(100));
        assert_eq!(class, "response-time slow");
        assert_eq!(html, "⏳ Tiempo: 6.10s (cache)");
    }

    #[test]
    fn response_time_falls_back_to_local() {
        let (class, html) = response_time_line(&ChatResponse::default(), Duration::from_millis(3250));
        assert_eq!(class, "response-time medium");
        assert_eq!(html, "🚀 Tiempo: 3.25s");

        let unparsable = ChatResponse { response_time: Some(ResponseTime::Text("n/d".into())), ..Default::default() };
        let (class, html) = response_time_line(&unparsable, Duration::from_millis(500));
        assert_eq!(class, "response-time fast");
        assert_eq!(html, "⚡ Tiempo: n/d");
    }

    #[test]
    fn badge_uses_label_or_unknown() {
        let badge = confidence_badge(&full_response());
        assert_eq!(badge.text, "Confianza: high");
        assert_eq!(badge.class, "badge high");
        let badge = confidence_badge(&ChatResponse::default());
        assert_eq!(badge.text, "Confianza: —");
        assert_eq!(badge.class, "badge unknown");
    }

    #[test]
    fn panel_renders_every_present_section_in_order() {
        let html = render_panel(&full_response());
        let order = [
            "key-points",
            "specific-articles",
            "exact-quotes",
            "missing-info",
            "sources-section",
            "cross-references",
        ];
        let positions: Vec<usize> = order.iter().map(|c| html.find(c).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains("<li>Plazo &lt;30&gt; días</li>"));
        assert!(html.contains(r#"<span class="article-tag">Art. 12</span>"#));
        assert!(html.contains("<blockquote>\"el plazo será de treinta días\"</blockquote>"));
        assert!(html.contains("Fuente 1: <strong>codigo.pdf</strong> (p. 3) — relevancia: 50%"));
        assert!(html.contains("Fuente 2: <strong>anexo.txt</strong></div>"));
        assert!(!html.contains(NO_SOURCES));
    }

    #[test]
    fn panel_omits_absent_sections() {
        let response = ChatResponse {
            missing_info: Some("   ".into()),
            cross_references: vec!["ref".into()],
            ..Default::default()
        };
        let html = render_panel(&response);
        assert!(!html.contains("key-points"));
        assert!(!html.contains("missing-info"));
        assert!(html.contains(NO_SOURCES));
        assert!(html.contains("<li>ref</li>"));
    }

    #[test]
    fn panel_rebuild_is_idempotent() {
        let response = full_response();
        assert_eq!(render_panel(&response), render_panel(&response));
    }
}
