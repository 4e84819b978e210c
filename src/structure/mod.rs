//! §4.G: tagged-PDF structure tree and marked-content subsystem.

pub mod marked_content;
pub mod tree;
