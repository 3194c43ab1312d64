//! View renderer implementations.
//!
//! - `html`: HTML pages and HTMX out-of-band fragments

pub mod html;

pub use html::HtmlRenderer;
