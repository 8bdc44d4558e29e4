use super::schema::PendingFile;
use crate::config::UploadConfig;

/// Why a selected file cannot be uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    WrongType,
    TooLarge,
}

impl Ineligibility {
    pub fn label(self) -> &'static str {
        match self {
            Self::WrongType => "Tipo no permitido",
            Self::TooLarge => "Muy grande (máx. 16MB)",
        }
    }
}

/// Extension and size rules applied before anything touches the network.
#[derive(Debug, Clone)]
pub struct FileRules {
    allowed_extensions: Vec<String>,
    max_file_size: u64,
}

impl FileRules {
    pub fn new(allowed_extensions: Vec<String>, max_file_size: u64) -> Self {
        Self { allowed_extensions, max_file_size }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.allowed_extensions.clone(), config.max_file_size)
    }

    /// Whether the text after the last `.` (lower-cased) is allowed.
    /// A name without a dot is its own extension.
    pub fn is_valid_file(&self, file: &PendingFile) -> bool {
        let ext = extension_of(&file.name);
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }

    pub fn is_too_large(&self, file: &PendingFile) -> bool {
        file.size > self.max_file_size
    }

    /// A wrong type is reported ahead of an oversized file.
    pub fn ineligibility(&self, file: &PendingFile) -> Option<Ineligibility> {
        if !self.is_valid_file(file) {
            Some(Ineligibility::WrongType)
        } else if self.is_too_large(file) {
            Some(Ineligibility::TooLarge)
        } else {
            None
        }
    }

    pub fn is_eligible(&self, file: &PendingFile) -> bool {
        self.ineligibility(file).is_none()
    }
}

impl Default for FileRules {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}

fn extension_of(filename: &str) -> String {
    filename.rsplit('.').next().unwrap_or("").to_lowercase()
}

/// Guess MIME type for a multipart part from the filename extension.
pub fn guess_mime_type(filename: &str) -> &'static str {
    match extension_of(filename).as_str() {
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn file(name: &str, size: u64) -> PendingFile {
        PendingFile::new(name, size, name)
    }

    #[test]
    fn eligibility_examples() {
        let rules = FileRules::default();
        assert!(rules.is_eligible(&file("policy.pdf", 2 * MIB)));
        assert_eq!(rules.ineligibility(&file("image.png", 1024)), Some(Ineligibility::WrongType));
        assert_eq!(rules.ineligibility(&file("manual.pdf", 20 * MIB)), Some(Ineligibility::TooLarge));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let rules = FileRules::default();
        assert!(!rules.is_too_large(&file("a.txt", 16 * MIB)));
        assert!(rules.is_too_large(&file("a.txt", 16 * MIB + 1)));
    }

    #[test]
    fn extension_uses_last_dot_and_ignores_case() {
        let rules = FileRules::default();
        assert!(rules.is_valid_file(&file("Contrato.Final.DOCX", 10)));
        assert!(!rules.is_valid_file(&file("notes.pdf.exe", 10)));
    }

    #[test]
    fn name_without_extension_is_rejected() {
        let rules = FileRules::default();
        assert!(!rules.is_valid_file(&file("README", 10)));
        assert!(rules.is_valid_file(&file("txt", 10)));
    }

    #[test]
    fn wrong_type_reported_before_size() {
        let rules = FileRules::default();
        assert_eq!(
            rules.ineligibility(&file("huge.png", 40 * MIB)),
            Some(Ineligibility::WrongType)
        );
    }

    #[test]
    fn mime_types() {
        assert_eq!(guess_mime_type("a.PDF"), "application/pdf");
        assert_eq!(guess_mime_type("a.txt"), "text/plain");
        assert!(guess_mime_type("a.docx").starts_with("application/vnd.openxmlformats"));
        assert_eq!(guess_mime_type("README"), "application/octet-stream");
    }
}
