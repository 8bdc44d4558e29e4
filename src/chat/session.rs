use super::render::{answer_html, confidence_badge, render_panel, response_time_line};
use super::schema::ChatResponse;
use crate::client::Backend;
use crate::markup::escape_html;
use crate::ticker::Ticker;
use crate::view::{Badge, MessageArea, LOADING_MARKER};
use crate::voice::Voice;
use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const LOADING_CAPTION: &str = "Procesando";
pub const CHAT_CONNECTION_ERROR: &str = "Error de conexión con el servidor";

const DOTS_PERIOD: Duration = Duration::from_millis(500);

/// Where the current question is in its round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatState {
    Idle,
    Sending { question: String },
    Succeeded(ChatResponse),
    Failed(String),
}

fn loading_html(dots: usize) -> String {
    format!(
        "Bot: <span class='loading-dots'>{LOADING_CAPTION}<span class='dots'>{}</span></span>",
        ".".repeat(dots)
    )
}

/// One conversation: message log, confidence badge and structured panel.
pub struct ChatSession {
    backend: Arc<dyn Backend>,
    voice: Voice,
    state: ChatState,
    messages: Arc<Mutex<MessageArea>>,
    badge: Badge,
    panel: String,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn Backend>, voice: Voice) -> Self {
        Self {
            backend,
            voice,
            state: ChatState::Idle,
            messages: Arc::new(Mutex::new(MessageArea::default())),
            badge: Badge::default(),
            panel: String::new(),
        }
    }

    /// Send one question and render the answer. Blank input is ignored.
    pub async fn submit(&mut self, input: &str) -> &ChatState {
        let question = input.trim();
        if question.is_empty() {
            return &self.state;
        }
        self.state = ChatState::Sending { question: question.to_string() };

        let loading_id = {
            let mut messages = self.messages.lock();
            messages.push("msg user", format!("Tú: {}", escape_html(question)));
            let id = messages.push(format!("msg bot {LOADING_MARKER}"), loading_html(0));
            messages.scroll_to_newest();
            id
        };
        let animation = self.animate_loading(loading_id);

        let started = Instant::now();
        let result = self.backend.ask(question).await;
        let elapsed = started.elapsed();

        animation.stop();
        self.messages.lock().remove_marked(LOADING_MARKER);

        match result {
            Ok(response) => {
                tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "answer received");
                self.render_answer(&response, elapsed);
                self.speak_answer(&response);
                self.state = ChatState::Succeeded(response);
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                let mut messages = self.messages.lock();
                messages.push("msg bot error", format!("Bot: {CHAT_CONNECTION_ERROR}"));
                messages.scroll_to_newest();
                self.state = ChatState::Failed(e.to_string());
            }
        }
        &self.state
    }

    /// Dictate a question and submit it. Returns false when nothing was sent.
    pub async fn dictate(&mut self) -> bool {
        let Some(recognizer) = self.voice.recognizer.clone() else {
            tracing::debug!("dictation unavailable");
            return false;
        };
        match recognizer.listen().await {
            Ok(Some(transcript)) => {
                self.submit(&transcript).await;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "speech recognition failed");
                false
            }
        }
    }

    fn animate_loading(&self, id: Uuid) -> Ticker {
        let messages = self.messages.clone();
        let mut dots = 0;
        Ticker::spawn(DOTS_PERIOD, move || {
            dots = (dots + 1) % 4;
            if messages.lock().update(id, loading_html(dots)) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
    }

    fn render_answer(&mut self, response: &ChatResponse, elapsed: Duration) {
        {
            let mut messages = self.messages.lock();
            messages.push("msg bot", answer_html(response, elapsed));
            let (class, html) = response_time_line(response, elapsed);
            messages.push(class, html);
            messages.scroll_to_newest();
        }
        self.badge = confidence_badge(response);
        self.panel = render_panel(response);
    }

    /// Read the answer aloud in the background; the turn does not wait for it.
    fn speak_answer(&self, response: &ChatResponse) {
        if !self.voice.speak_answers {
            return;
        }
        let (Some(synthesizer), Some(text)) = (self.voice.synthesizer.clone(), response.response.clone()) else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = synthesizer.speak(&text).await {
                tracing::warn!(error = %e, "speech synthesis failed");
            }
        });
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn messages(&self) -> MessageArea {
        self.messages.lock().clone()
    }

    /// Shared handle to the message log, for observers while a request is in
    /// flight.
    pub fn messages_handle(&self) -> Arc<Mutex<MessageArea>> {
        self.messages.clone()
    }

    pub fn badge(&self) -> &Badge {
        &self.badge
    }

    pub fn panel(&self) -> &str {
        &self.panel
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn to_html(&self) -> String {
        format!("{}{}{}", self.messages.lock().to_html(), self.badge.to_html(), self.panel)
    }
}
