//! Read-only list of past turns, shown in an overlay.

use crate::client::Backend;
use crate::markup::escape_html;
use crate::view::{ClickTarget, Overlay};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

pub const EMPTY_HISTORY: &str = "<p>No hay conversaciones previas.</p>";
pub const HISTORY_ERROR: &str = "<p>Error cargando historial.</p>";

const DISPLAY_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub has_cross_refs: bool,
}

/// When a turn happened: ISO-8601 text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    Text(String),
}

impl Timestamp {
    /// Local `dd/mm/yyyy, HH:MM:SS`. Zone-less text is shown as written;
    /// unparseable text is returned verbatim.
    pub fn display(&self) -> String {
        match self {
            Self::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|t| t.with_timezone(&Local).format(DISPLAY_FORMAT).to_string())
                .unwrap_or_else(|| ms.to_string()),
            Self::Text(text) => {
                if let Ok(t) = DateTime::parse_from_rfc3339(text) {
                    return t.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
                }
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                    .map(|t| t.format(DISPLAY_FORMAT).to_string())
                    .unwrap_or_else(|| text.clone())
            }
        }
    }
}

pub fn render_entries(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    let mut html = String::new();
    for entry in entries {
        let cross_refs = if entry.has_cross_refs { " 🔗" } else { "" };
        let date = entry.timestamp.as_ref().map(Timestamp::display).unwrap_or_default();
        let confidence = entry.confidence.as_deref().filter(|c| !c.is_empty()).unwrap_or("N/A");
        let _ = write!(
            html,
            r#"<div class="history-item"><div class="history-question">{}{cross_refs}</div><div class="history-response">{}</div><div class="history-meta">{} - Confianza: {}</div></div>"#,
            escape_html(&entry.question),
            escape_html(&entry.response),
            escape_html(&date),
            escape_html(confidence),
        );
    }
    html
}

/// Fetches history on demand and shows it in an overlay.
pub struct HistoryViewer {
    backend: Arc<dyn Backend>,
    overlay: Overlay,
}

impl HistoryViewer {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend, overlay: Overlay::default() }
    }

    /// Fetch and open. The overlay opens on failure too, with an error note.
    pub async fn open(&mut self) {
        let html = match self.backend.history().await {
            Ok(entries) => render_entries(&entries),
            Err(e) => {
                tracing::error!(error = %e, "failed to load history");
                HISTORY_ERROR.to_string()
            }
        };
        self.overlay.open(html);
    }

    pub fn close(&mut self) {
        self.overlay.close();
    }

    pub fn click(&mut self, target: ClickTarget) {
        self.overlay.click(target);
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }
}
