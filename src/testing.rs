//! In-process backend double for orchestration tests.

use crate::chat::schema::ChatResponse;
use crate::client::Backend;
use crate::error::{Result, WidgetError};
use crate::history::HistoryEntry;
use crate::upload::schema::{PendingFile, UploadResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Default)]
pub struct FakeBackend {
    answers: Mutex<VecDeque<Result<ChatResponse>>>,
    uploads: Mutex<VecDeque<Result<UploadResult>>>,
    histories: Mutex<VecDeque<Result<Vec<HistoryEntry>>>>,
    pub questions: Mutex<Vec<String>>,
    pub uploaded: Mutex<Vec<(String, Vec<String>)>>,
    pub delay: Mutex<Duration>,
}

impl FakeBackend {
    pub fn push_answer(&self, answer: Result<ChatResponse>) {
        self.answers.lock().push_back(answer);
    }

    pub fn push_upload(&self, result: Result<UploadResult>) {
        self.uploads.lock().push_back(result);
    }

    pub fn push_history(&self, history: Result<Vec<HistoryEntry>>) {
        self.histories.lock().push_back(history);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn exhausted() -> WidgetError {
    WidgetError::Io(std::io::Error::other("fake backend has no queued reply"))
}

#[async_trait]
impl Backend for FakeBackend {
    async fn ask(&self, question: &str) -> Result<ChatResponse> {
        self.questions.lock().push(question.to_string());
        self.pause().await;
        self.answers.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn upload(&self, field: &str, files: &[PendingFile]) -> Result<UploadResult> {
        let names = files.iter().map(|f| f.name.clone()).collect();
        self.uploaded.lock().push((field.to_string(), names));
        self.pause().await;
        self.uploads.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.pause().await;
        self.histories.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }
}
