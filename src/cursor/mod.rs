//! Cursors over encoded DICOM data.
//!
//! Both keep a stack of transfer syntaxes, so that parts of the data encoded differently (meta
//! group, delimiters, content of UN elements) can be handled in a scoped way, and both record the
//! first error instead of returning it from every primitive.
mod decoder;
mod encoder;

pub use decoder::{Decoder, DEFAULT_MAX_DEPTH};
pub use encoder::Encoder;
