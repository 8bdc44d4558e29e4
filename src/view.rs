//! In-memory surfaces the widget renders into.
//!
//! Each surface owns its current markup and can print itself as an HTML
//! fragment. Text stored here is escaped at the point it is turned into
//! markup, never before.

use crate::markup::escape_html;
use uuid::Uuid;

/// Class marker carried by loading placeholders.
pub const LOADING_MARKER: &str = "loading";

#[derive(Debug, Clone, PartialEq)]
pub struct MessageNode {
    pub id: Uuid,
    pub class: String,
    /// Trusted markup; callers escape text before building it.
    pub html: String,
}

impl MessageNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }

    pub fn to_html(&self) -> String {
        format!(r#"<div class="{}">{}</div>"#, self.class, self.html)
    }
}

/// The scrolling message log.
#[derive(Debug, Clone, Default)]
pub struct MessageArea {
    nodes: Vec<MessageNode>,
    scroll_anchor: usize,
}

impl MessageArea {
    pub fn push(&mut self, class: impl Into<String>, html: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.nodes.push(MessageNode { id, class: class.into(), html: html.into() });
        id
    }

    /// Replace a node's markup. Returns false when the node is gone.
    pub fn update(&mut self, id: Uuid, html: impl Into<String>) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.html = html.into();
                true
            }
            None => false,
        }
    }

    /// Remove every node carrying `class`, returning how many went.
    pub fn remove_marked(&mut self, class: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| !n.has_class(class));
        self.scroll_anchor = self.scroll_anchor.min(self.nodes.len());
        before - self.nodes.len()
    }

    pub fn scroll_to_newest(&mut self) {
        self.scroll_anchor = self.nodes.len();
    }

    pub fn is_scrolled_to_newest(&self) -> bool {
        self.scroll_anchor == self.nodes.len()
    }

    pub fn nodes(&self) -> &[MessageNode] {
        &self.nodes
    }

    pub fn to_html(&self) -> String {
        let inner: String = self.nodes.iter().map(MessageNode::to_html).collect();
        format!(r#"<div id="messages">{inner}</div>"#)
    }
}

/// Confidence badge next to the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub text: String,
    pub class: String,
}

impl Default for Badge {
    fn default() -> Self {
        Self { text: String::new(), class: "badge".into() }
    }
}

impl Badge {
    pub fn to_html(&self) -> String {
        format!(
            r#"<span id="confidenceBadge" class="{}">{}</span>"#,
            escape_html(&self.class),
            escape_html(&self.text)
        )
    }
}

/// Inline status text under a form.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub class: String,
    pub html: String,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self { class: "status".into(), html: String::new() }
    }
}

impl StatusLine {
    pub fn set(&mut self, kind: Option<&str>, html: impl Into<String>) {
        self.class = match kind {
            Some(kind) => format!("status {kind}"),
            None => "status".into(),
        };
        self.html = html.into();
    }

    pub fn clear(&mut self) {
        self.set(None, String::new());
    }

    pub fn to_html(&self) -> String {
        format!(r#"<div id="uploadStatus" class="{}">{}</div>"#, self.class, self.html)
    }
}

/// Upload progress bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSurface {
    pub visible: bool,
    pub percent: f64,
    pub caption: String,
}

impl ProgressSurface {
    pub fn to_html(&self) -> String {
        let display = if self.visible { "block" } else { "none" };
        format!(
            r#"<div id="uploadProgress" style="display: {display}"><div class="progress-fill" style="width: {:.0}%"></div><div class="progress-text">{}</div></div>"#,
            self.percent,
            escape_html(&self.caption)
        )
    }
}

/// The upload submit button.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerButton {
    pub enabled: bool,
    pub label: String,
}

impl Default for TriggerButton {
    fn default() -> Self {
        Self { enabled: false, label: "Subir 0 archivo(s)".into() }
    }
}

impl TriggerButton {
    pub fn to_html(&self) -> String {
        let disabled = if self.enabled { "" } else { " disabled" };
        format!(r#"<button id="uploadBtn"{disabled}>{}</button>"#, escape_html(&self.label))
    }
}

/// Where a click inside an open overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
}

/// Modal overlay, used for history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub visible: bool,
    pub html: String,
}

impl Overlay {
    pub fn open(&mut self, html: impl Into<String>) {
        self.html = html.into();
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Clicking outside the content dismisses the overlay.
    pub fn click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Backdrop {
            self.close();
        }
    }

    pub fn to_html(&self) -> String {
        let display = if self.visible { "block" } else { "none" };
        format!(
            r#"<div id="historyModal" style="display: {display}"><span class="close">&times;</span><div id="historyList">{}</div></div>"#,
            self.html
        )
    }
}
