//! Multi-file upload: selection, local validation, simulated progress and
//! the single upload request.

pub mod orchestrator;
pub mod progress;
pub mod registry;
pub mod schema;
pub mod validate;

pub use orchestrator::{UploadOutcome, UploadPanel};
pub use registry::SelectedFileSet;
pub use schema::{PendingFile, UploadDetail, UploadResult};
pub use validate::{FileRules, Ineligibility};
