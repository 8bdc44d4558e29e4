use thiserror::Error;

/// Failure taxonomy shared by the chat, upload and history flows.
///
/// `Validation` never reaches the network. Everything else is a
/// transport-class failure and is shown to the user as a generic connection
/// error. Failures the server reports itself arrive as decoded bodies, not
/// errors.
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WidgetError {
    /// True for failures that take the generic connection-error path.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_) | Self::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_failures() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(WidgetError::Decode(decode).is_transport());
        assert!(WidgetError::Io(std::io::Error::other("gone")).is_transport());
        assert!(!WidgetError::Validation("empty".into()).is_transport());
    }
}
