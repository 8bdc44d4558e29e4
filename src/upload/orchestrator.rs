use super::progress::{ProgressModel, COMPLETED_CAPTION, STARTING_CAPTION};
use super::registry::SelectedFileSet;
use super::schema::{PendingFile, UploadResult};
use super::validate::FileRules;
use crate::client::Backend;
use crate::config::{FieldMode, ProgressStrategy, UploadConfig};
use crate::error::{Result, WidgetError};
use crate::markup::escape_html;
use crate::ticker::Ticker;
use crate::view::{ProgressSurface, StatusLine, TriggerButton};
use parking_lot::Mutex;
use std::fmt::Write;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

pub const NO_VALID_FILES: &str = "❌ No hay archivos válidos para subir";
pub const UPLOAD_CONNECTION_ERROR: &str = "❌ Error de conexión al subir archivos";

/// How a call to [`UploadPanel::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// An upload was already in flight.
    Ignored,
    /// Nothing eligible; no request was made.
    NothingToUpload,
    Succeeded(UploadResult),
    /// The backend answered `success: false`.
    Failed(String),
    ConnectionError,
}

/// Upload form: selected files, trigger button, progress bar and status line.
pub struct UploadPanel {
    backend: Arc<dyn Backend>,
    registry: SelectedFileSet,
    field_mode: FieldMode,
    strategy: ProgressStrategy,
    result_delay: Duration,
    list_html: String,
    button: TriggerButton,
    status: StatusLine,
    progress: Arc<Mutex<ProgressSurface>>,
    busy: bool,
}

impl UploadPanel {
    pub fn new(backend: Arc<dyn Backend>, config: &UploadConfig) -> Self {
        let registry = SelectedFileSet::new(FileRules::from_config(config), config.max_files);
        let mut panel = Self {
            backend,
            registry,
            field_mode: config.field_mode,
            strategy: config.progress,
            result_delay: Duration::from_millis(config.result_delay_ms),
            list_html: String::new(),
            button: TriggerButton::default(),
            status: StatusLine::default(),
            progress: Arc::new(Mutex::new(ProgressSurface::default())),
            busy: false,
        };
        panel.refresh_list();
        panel
    }

    /// Select more files. An overflowing batch leaves the selection as it was
    /// and puts a warning in the status line.
    pub fn add_files(&mut self, batch: Vec<PendingFile>) -> Result<usize> {
        match self.registry.add_files(batch) {
            Ok(added) => {
                self.refresh_list();
                self.status.clear();
                Ok(added)
            }
            Err(e) => {
                if let WidgetError::Validation(message) = &e {
                    self.status.set(Some("warning"), format!("⚠️ {}", escape_html(message)));
                }
                tracing::warn!(error = %e, "file batch rejected");
                Err(e)
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<PendingFile> {
        let removed = self.registry.remove(index);
        self.refresh_list();
        removed
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.refresh_list();
    }

    /// Upload every eligible file in one request.
    pub async fn submit(&mut self) -> UploadOutcome {
        if self.busy {
            return UploadOutcome::Ignored;
        }
        let eligible = self.registry.eligible();
        if eligible.is_empty() {
            self.status.set(Some("error"), NO_VALID_FILES);
            return UploadOutcome::NothingToUpload;
        }
        let files: Vec<PendingFile> = match self.field_mode {
            FieldMode::Multi => eligible,
            FieldMode::Single => eligible.into_iter().take(1).collect(),
        };

        self.busy = true;
        self.button.enabled = false;
        self.status.clear();
        *self.progress.lock() = ProgressSurface {
            visible: true,
            percent: 0.0,
            caption: STARTING_CAPTION.to_string(),
        };

        let ticker = self.start_ticker();
        let result = self.backend.upload(self.field_mode.field_name(), &files).await;
        ticker.stop();

        let outcome = match result {
            Ok(result) => {
                {
                    let mut progress = self.progress.lock();
                    progress.percent = 100.0;
                    progress.caption = COMPLETED_CAPTION.to_string();
                }
                if !self.result_delay.is_zero() {
                    tokio::time::sleep(self.result_delay).await;
                }
                self.progress.lock().visible = false;
                self.show_result(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload request failed");
                self.progress.lock().visible = false;
                self.status.set(Some("error"), UPLOAD_CONNECTION_ERROR);
                UploadOutcome::ConnectionError
            }
        };

        self.busy = false;
        self.button.enabled = true;
        outcome
    }

    fn start_ticker(&self) -> Ticker {
        let mut model = ProgressModel::new(self.strategy);
        let period = model.period();
        let surface = self.progress.clone();
        Ticker::spawn(period, move || match model.advance(rand::random::<f64>()) {
            Some(caption) => {
                model.apply(caption, &mut surface.lock());
                ControlFlow::Continue(())
            }
            None => ControlFlow::Break(()),
        })
    }

    fn show_result(&mut self, result: UploadResult) -> UploadOutcome {
        if !result.success {
            self.status.set(Some("error"), format!("❌ {}", escape_html(&result.message)));
            return UploadOutcome::Failed(result.message);
        }

        let mut html = format!("✅ {}", escape_html(&result.message));
        if let Some(details) = result.details.as_ref().filter(|d| d.len() > 1) {
            html.push_str("<br><small>");
            for detail in details {
                let icon = if detail.success { "✅" } else { "❌" };
                let size = detail.size_mb.map(|s| s.to_string()).unwrap_or_else(|| "?".into());
                let _ = write!(html, "{icon} {} ({size}MB)<br>", escape_html(&detail.filename));
            }
            html.push_str("</small>");
        }
        self.status.set(Some("success"), html);
        tracing::info!(message = %result.message, "upload finished");

        self.registry.clear();
        self.refresh_list();
        UploadOutcome::Succeeded(result)
    }

    fn refresh_list(&mut self) {
        self.list_html = self.registry.render_list();
        self.button.enabled = !self.busy && self.registry.eligible_count() > 0;
        self.button.label = self.registry.upload_label();
    }

    pub fn registry(&self) -> &SelectedFileSet {
        &self.registry
    }

    pub fn list_html(&self) -> &str {
        &self.list_html
    }

    pub fn button(&self) -> &TriggerButton {
        &self.button
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn progress(&self) -> ProgressSurface {
        self.progress.lock().clone()
    }

    /// Shared handle to the progress surface, for observers while a submit
    /// is in flight.
    pub fn progress_handle(&self) -> Arc<Mutex<ProgressSurface>> {
        self.progress.clone()
    }

    pub fn to_html(&self) -> String {
        format!(
            "{}{}{}{}",
            self.list_html,
            self.button.to_html(),
            self.progress.lock().to_html(),
            self.status.to_html()
        )
    }
}
