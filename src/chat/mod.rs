//! Question/answer round trips and the structured answer view.

pub mod render;
pub mod schema;
pub mod session;

pub use schema::{ChatResponse, ResponseTime, Source};
pub use session::{ChatSession, ChatState};
