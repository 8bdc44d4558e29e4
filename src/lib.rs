//! askpanel: a headless chat panel for a document question-answering
//! backend.
//!
//! The panel asks questions over `/chat` and renders the structured answer,
//! uploads documents over `/upload` after checking them locally, and shows
//! past turns from `/history`. Every surface is kept as an HTML fragment in
//! memory; [`widget::Widget`] ties them to one backend.

pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod markup;
pub mod ticker;
pub mod upload;
pub mod view;
pub mod voice;
pub mod widget;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Result, WidgetError};
pub use widget::Widget;
