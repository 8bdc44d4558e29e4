use super::schema::PendingFile;
use super::validate::FileRules;
use crate::error::{Result, WidgetError};
use crate::markup::{escape_html, format_file_size};

/// Ordered set of files waiting to be uploaded, unique by `(name, size)` and
/// never longer than `max_files`.
#[derive(Debug, Clone)]
pub struct SelectedFileSet {
    files: Vec<PendingFile>,
    rules: FileRules,
    max_files: usize,
}

impl SelectedFileSet {
    pub fn new(rules: FileRules, max_files: usize) -> Self {
        Self { files: Vec::new(), rules, max_files }
    }

    /// Add a batch. An overflowing batch is rejected whole and the set is left
    /// untouched; duplicates inside an accepted batch are skipped silently.
    /// Returns how many files were actually appended.
    pub fn add_files(&mut self, batch: Vec<PendingFile>) -> Result<usize> {
        if self.files.len() + batch.len() > self.max_files {
            return Err(WidgetError::Validation(format!(
                "Máximo {} archivos permitidos",
                self.max_files
            )));
        }
        let mut added = 0;
        for file in batch {
            if self.files.iter().any(|f| f.same_identity(&file)) {
                tracing::debug!(name = %file.name, size = file.size, "skipping duplicate file");
                continue;
            }
            self.files.push(file);
            added += 1;
        }
        Ok(added)
    }

    /// Remove by position. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<PendingFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[PendingFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn rules(&self) -> &FileRules {
        &self.rules
    }

    pub fn eligible(&self) -> Vec<PendingFile> {
        self.files.iter().filter(|f| self.rules.is_eligible(f)).cloned().collect()
    }

    pub fn eligible_count(&self) -> usize {
        self.files.iter().filter(|f| self.rules.is_eligible(f)).count()
    }

    /// Label of the upload button for the current selection.
    pub fn upload_label(&self) -> String {
        format!("Subir {} archivo(s)", self.eligible_count())
    }

    /// Full markup of the file list, rebuilt from the current contents.
    pub fn render_list(&self) -> String {
        let items: String = self
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let problem = self.rules.ineligibility(file);
                let error = problem
                    .map(|p| format!(r#"<span class="file-error">{}</span>"#, p.label()))
                    .unwrap_or_default();
                let class = if problem.is_some() { "file-item has-error" } else { "file-item" };
                format!(
                    r#"<div class="{class}"><div class="file-info"><span>📄 {}</span><span class="file-size">{}</span>{error}</div><button type="button" class="file-remove" data-index="{index}">✕</button></div>"#,
                    escape_html(&file.name),
                    format_file_size(file.size),
                )
            })
            .collect();
        format!(r#"<div id="filesList">{items}</div>"#)
    }
}

impl Default for SelectedFileSet {
    fn default() -> Self {
        Self::new(FileRules::default(), crate::config::schema::DEFAULT_MAX_FILES)
    }
}
