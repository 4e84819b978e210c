//! §6 external interfaces: the collaborator traits the core consumes but
//! does not implement. Font shaping, image decoding, compression and the
//! final byte sink are someone else's concern (§1 Non-goals); the core only
//! needs the shapes described here.

use crate::error::PdfResult;

/// Horizontal or vertical text layout, reported by a [`Font`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum WritingMode {
    Horizontal,
    Vertical,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FontKind {
    Type1,
    TrueType,
    Type0Tt,
    Type0Cid,
}

/// A read-only view onto a font resource, as needed by text layout and
/// measurement. Embedding, subsetting and glyph shaping live outside the
/// core (§1 Non-goals: "font shaping beyond width-table lookup").
pub trait Font {
    /// `(top, bottom)` of the font bounding box, in glyph-space units per
    /// 1000 text-space units (the usual PDF convention).
    fn bbox(&self) -> (f32, f32);
    fn descent(&self) -> f32;
    fn writing_mode(&self) -> WritingMode;
    fn kind(&self) -> FontKind;
    fn encoder(&self) -> Option<&dyn Encoder>;
    /// Local resource name this font has been assigned on the page that is
    /// asking (`F1`, `F2`, …); see §5 "Shared resources".
    fn local_resource_name(&self) -> &str;

    /// Measure as much of `text` as fits within `max_width` text-space
    /// units, wrapping at word boundaries when `wordwrap` is set. Returns
    /// the number of bytes consumed and the rendered width of that prefix.
    fn measure_text(&self, text: &str, max_width: f32, wordwrap: bool) -> (usize, f32);
}

/// How a single byte participates in a (possibly multi-byte) glyph cluster,
/// used by the justification algorithm (§4.E) to count clusters rather than
/// bytes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ByteClass {
    Lead,
    Trail,
    Single,
    Control,
}

/// Converts text to the byte encoding a font expects, and classifies bytes
/// for cluster counting.
pub trait Encoder {
    fn encode_text(&self, text: &str) -> (Vec<u8>, usize);
    fn byte_class(&self, state: u32, byte: u8) -> ByteClass;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum XObjectKind {
    Form,
    Image,
}

/// An XObject (form or image) already registered with the document.
pub trait XObject {
    fn kind(&self) -> XObjectKind;
    fn local_resource_name(&self) -> &str;
}

/// Destination for the final serialized document (§6 "Byte sink"). The
/// document writer (`document.rs`) drives a `std::io::Write` directly
/// through `pdf::file::PdfFile`; this trait documents the minimal contract
/// an external byte sink must satisfy and is the interface test doubles in
/// this crate's own test suite implement.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> PdfResult<()>;
    fn tell(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A `ByteSink` test double: an in-memory buffer that tracks its own
    /// write position, the way an external sink backed by a socket or a
    /// streaming HTTP body would.
    struct VecSink {
        buffer: Vec<u8>,
    }

    impl ByteSink for VecSink {
        fn write_bytes(&mut self, bytes: &[u8]) -> PdfResult<()> {
            self.buffer.extend_from_slice(bytes);
            Ok(())
        }

        fn tell(&self) -> u64 {
            self.buffer.len() as u64
        }
    }

    #[test]
    fn tell_tracks_bytes_written() {
        let mut sink = VecSink { buffer: Vec::new() };
        sink.write_bytes(b"%PDF-1.7\n").unwrap();
        assert_eq!(sink.tell(), 9);
        sink.write_bytes(b"%%EOF").unwrap();
        assert_eq!(sink.tell(), 14);
        assert_eq!(sink.buffer, b"%PDF-1.7\n%%EOF");
    }
}
