//! A content-stream writer and tagged-form composition layer for PDF
//! documents: the PDF object model and low-level file structure, a
//! graphics-state-aware content-stream state machine, shape/text layout
//! built on top of it, and a tagged-PDF structure tree and form-field
//! composer that tie into the catalog and document page tree.

pub mod catalog;
pub mod collab;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod form;
pub mod graphics;
pub mod pdf;
pub mod structure;

pub use catalog::Catalog;
pub use collab::{ByteSink, Encoder, Font, XObject};
pub use config::DocumentConfig;
pub use content::stream::ContentStream;
pub use document::{Document, Page};
pub use error::{PdfError, PdfResult};
