//! §4.D/§4.E/§4.F: the content-stream state machine and the higher-level
//! drawing layer built on top of it.

pub mod color;
pub mod shapes;
pub mod stream;
pub mod text_layout;
