use crate::chat::ChatSession;
use crate::client::{Backend, HttpBackend};
use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryViewer;
use crate::upload::UploadPanel;
use crate::voice::Voice;
use std::sync::Arc;

/// All state of one panel session, built once and handed to every handler.
pub struct Widget {
    pub chat: ChatSession,
    pub upload: UploadPanel,
    pub history: HistoryViewer,
}

impl Widget {
    pub fn new(backend: Arc<dyn Backend>, config: &Config) -> Self {
        Self {
            chat: ChatSession::new(backend.clone(), Voice::from_config(&config.voice)),
            upload: UploadPanel::new(backend.clone(), &config.upload),
            history: HistoryViewer::new(backend),
        }
    }

    /// Widget talking to the configured HTTP backend.
    pub fn connect(config: &Config) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        Ok(Self::new(backend, config))
    }

    /// Every surface, in page order.
    pub fn snapshot_html(&self) -> String {
        format!(
            "{}{}{}",
            self.chat.to_html(),
            self.upload.to_html(),
            self.history.overlay().to_html()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use crate::upload::PendingFile;

    #[tokio::test]
    async fn surfaces_share_one_backend() {
        let backend = Arc::new(FakeBackend::default());
        backend.push_answer(Ok(Default::default()));
        backend.push_history(Ok(vec![]));
        let mut widget = Widget::new(backend.clone(), &Config::default());

        widget.chat.submit("hola").await;
        widget.upload.add_files(vec![PendingFile::new("a.pdf", 10, "/tmp/a.pdf")]).unwrap();
        widget.history.open().await;

        let html = widget.snapshot_html();
        assert!(html.contains("Tú: hola"));
        assert!(html.contains("a.pdf"));
        assert!(html.contains("No hay conversaciones previas."));
        assert!(html.contains(r#"<button id="uploadBtn">Subir 1 archivo(s)</button>"#));
    }
}
