//! Report presentation
//!
//! Pure functions over [`crate::analysis::Report`]:
//! - [`html`]: embeddable fragment (headline, expandable table, inline
//!   style and toggle script) for a host debug panel
//! - [`text`]: fixed-width table for terminals

pub mod html;
pub mod text;

pub use html::render_html;
pub use text::{render_text, TextOptions};
