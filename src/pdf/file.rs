//! §4.B low-level file structure: header, indirect objects, cross-reference
//! table, trailer.
//!
//! Adapted from the teacher's `pdf/file_structure.rs` (`PdfFile`,
//! `CountingWriter`): the position-tracking and xref/trailer-writing logic
//! is kept nearly verbatim, generalized to reuse this crate's `ObjectId`
//! (shared with `pdf::object` instead of being private to this module) and
//! to report failures through [`PdfError`] instead of bare `io::Result`.

use std::io::{self, Write};

use tracing::{debug, trace};

use super::object::ObjectId;
use crate::error::{PdfError, PdfResult};

/// Wraps a byte sink and counts bytes written, so object positions for the
/// cross-reference table can be recorded without seeking.
pub struct CountingWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn position(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buffer);
        if let Ok(bytes) = result {
            self.bytes_written += bytes as u64;
        }
        result
    }

    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.bytes_written += buffer.len() as u64;
        self.inner.write_all(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Low-level writer for one PDF file: header, a body of indirect objects,
/// and (on [`PdfFile::finish`]) the cross-reference table and trailer.
pub struct PdfFile<W: Write> {
    output: CountingWriter<W>,
    /// Indexed by object number; object 0 is the reserved free-list head and
    /// is always `None`. `None` for an allocated-but-not-yet-written object,
    /// `Some(offset)` once `write_object` has recorded its position.
    objects_positions: Vec<Option<u64>>,
}

impl<W: Write> PdfFile<W> {
    pub fn new(mut output: W, pdf_version: &str) -> PdfResult<Self> {
        write!(output, "%PDF-{pdf_version}\n%\xB5\xED\xAE\xFB\n")?;
        debug!(pdf_version, "wrote PDF header");
        Ok(PdfFile { output: CountingWriter { inner: output, bytes_written: 0 }, objects_positions: vec![None] })
    }

    /// Reserve the next object number without writing anything yet, so a
    /// reference to it can be emitted before its content is known.
    pub fn assign_object_id(&mut self) -> ObjectId {
        let number = self.objects_positions.len() as u32;
        self.objects_positions.push(None);
        ObjectId::new(number)
    }

    /// Write the body of a previously-assigned object. `write_content` is
    /// handed the raw byte sink between the `N 0 obj` and `endobj` markers.
    pub fn write_object<F>(&mut self, id: ObjectId, write_content: F) -> PdfResult<()>
    where
        F: FnOnce(&mut CountingWriter<W>) -> io::Result<()>,
    {
        let slot = self
            .objects_positions
            .get_mut(id.number as usize)
            .ok_or(PdfError::Allocation("object id was not assigned by this file"))?;
        if slot.is_some() {
            return Err(PdfError::Allocation("object was already written"));
        }
        *slot = Some(self.output.position());

        write!(self.output, "{} 0 obj\n", id.number)?;
        write_content(&mut self.output)?;
        write!(self.output, "endobj\n")?;
        trace!(object = id.number, "wrote indirect object");
        Ok(())
    }

    /// Write the cross-reference table and trailer, then hand back the
    /// underlying byte sink.
    pub fn finish(mut self, document_catalog: ObjectId, document_information: Option<ObjectId>) -> PdfResult<W> {
        let startxref = self.output.position();
        write!(self.output, "xref\n0 {}\n", self.objects_positions.len())?;
        write!(self.output, "0000000000 65535 f \n")?;
        for (number, position) in self.objects_positions.iter().enumerate().skip(1) {
            let offset = position
                .1
                .ok_or(PdfError::Allocation("an object id was assigned but never written"))?;
            let _ = number;
            write!(self.output, "{offset:010} 00000 n \n")?;
        }

        write!(
            self.output,
            "trailer\n<< /Size {}\n/Root {} 0 R\n",
            self.objects_positions.len(),
            document_catalog.number
        )?;
        if let Some(info) = document_information {
            write!(self.output, "/Info {} 0 R\n", info.number)?;
        }
        write!(self.output, ">>\nstartxref\n{startxref}\n%%EOF\n")?;
        debug!(objects = self.objects_positions.len() - 1, "wrote cross-reference table and trailer");

        Ok(self.output.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_minimal_file() {
        let mut file = PdfFile::new(Vec::new(), "1.7").unwrap();
        let catalog_id = file.assign_object_id();
        file.write_object(catalog_id, |w| w.write_all(b"<< /Type /Catalog >>\n")).unwrap();
        let bytes = file.finish(catalog_id, None).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.7\n"));
        assert!(text.contains("1 0 obj\n<< /Type /Catalog >>\nendobj\n"));
        assert!(text.contains("xref\n0 2\n"));
        assert!(text.contains("/Root 1 0 R"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn writing_unassigned_id_is_an_error() {
        let mut file = PdfFile::new(Vec::new(), "1.7").unwrap();
        let bogus = ObjectId::new(99);
        assert!(file.write_object(bogus, |w| w.write_all(b"null")).is_err());
    }

    #[test]
    fn double_write_is_an_error() {
        let mut file = PdfFile::new(Vec::new(), "1.7").unwrap();
        let id = file.assign_object_id();
        file.write_object(id, |w| w.write_all(b"null")).unwrap();
        assert!(file.write_object(id, |w| w.write_all(b"null")).is_err());
    }
}
