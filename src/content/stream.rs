//! §4.D content-stream state machine — the central component. Accepts
//! operator calls, enforces the graphics-mode automaton (`graphics::mode`),
//! appends PDF operator syntax to an in-memory byte buffer, and mutates the
//! top of the graphics-state stack (`graphics::state`).
//!
//! Grounded in the teacher's `Page` (`examples/SimonSapin-victor/src/pdf/document_structure.rs`,
//! `save_state`/`restore_state`/`transform_matrix`/`move_to`/`line_to`/
//! `curve_to`/`fill`/`stroke`), generalized from that handful of drawing
//! methods to the full operator table of spec §4.D, and from libharu's
//! per-operator `HPDF_Page_CheckState` → validate → `HPDF_Stream_Write*` →
//! mutate-gstate pattern (`examples/original_source/src/hpdf_page_operator.c`).

use tracing::warn;

use crate::collab::Font;
use crate::config::DocumentConfig;
use crate::content::color;
use crate::error::{PdfError, PdfResult};
use crate::graphics::mode::GraphicsMode;
use crate::graphics::mode::ModeTracker;
use crate::graphics::state::{Color, DashPattern, GraphicsStateStack, LineCap, LineJoin, Matrix};
use crate::pdf::format::{format_int, format_real, format_real_default, write_escaped_string};
use crate::pdf::object::{Dict, Name};

use GraphicsMode::{ClippingPath, PageDescription, PathObject, TextObject};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PaintOp {
    Stroke,
    CloseAndStroke,
    Fill,
    FillEvenOdd,
    FillAndStroke,
    FillAndStrokeEvenOdd,
    CloseFillAndStroke,
    CloseFillAndStrokeEvenOdd,
    EndPath,
}

impl PaintOp {
    fn mnemonic(self) -> &'static str {
        match self {
            PaintOp::Stroke => "S",
            PaintOp::CloseAndStroke => "s",
            PaintOp::Fill => "f",
            PaintOp::FillEvenOdd => "f*",
            PaintOp::FillAndStroke => "B",
            PaintOp::FillAndStrokeEvenOdd => "B*",
            PaintOp::CloseFillAndStroke => "b",
            PaintOp::CloseFillAndStrokeEvenOdd => "b*",
            PaintOp::EndPath => "n",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClipRule {
    NonZero,
    EvenOdd,
}

/// One page's (or one form XObject's) content-stream writer.
pub struct ContentStream {
    buffer: Vec<u8>,
    mode: ModeTracker,
    gstate: GraphicsStateStack,
    current_point: (f32, f32),
    start_point: (f32, f32),
    text_matrix: Matrix,
    text_line_matrix: Matrix,
    precision: u8,
}

impl ContentStream {
    pub fn new(config: &DocumentConfig) -> Self {
        ContentStream {
            buffer: Vec::new(),
            mode: ModeTracker::new(),
            gstate: GraphicsStateStack::new(),
            current_point: (0.0, 0.0),
            start_point: (0.0, 0.0),
            text_matrix: Matrix::IDENTITY,
            text_line_matrix: Matrix::IDENTITY,
            precision: config.text_placement_accuracy.decimal_places(),
        }
    }

    pub fn mode(&self) -> GraphicsMode {
        self.mode.mode()
    }

    pub fn gstate(&self) -> &GraphicsStateStack {
        &self.gstate
    }

    /// Consumes the writer and returns its accumulated content-stream
    /// bytes. `BT`/`ET` and `BMC`/`EMC` brackets must already be balanced;
    /// an unbalanced writer is a programming error caught by `document.rs`
    /// at finalize time (§5 "Ordering guarantees").
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn operator_stack_size(&self) -> usize {
        self.mode.operator_stack_size()
    }

    fn require_mode(&self, op: &'static str, allowed: &[GraphicsMode]) -> PdfResult<()> {
        self.mode.require_mode(op, allowed).map_err(|err| {
            warn!(op, mode = ?self.mode.mode(), "operator rejected: illegal graphics mode");
            err
        })
    }

    fn real(&self, value: f32) -> String {
        format_real(value, self.precision)
    }

    fn write_operator(&mut self, op: &str) {
        self.buffer.extend_from_slice(op.as_bytes());
        self.buffer.push(b'\n');
    }

    fn write_reals_operator(&mut self, values: &[f32], op: &str) {
        for value in values {
            self.buffer.extend_from_slice(self.real(*value).as_bytes());
            self.buffer.push(b' ');
        }
        self.write_operator(op);
    }

    // ---- §4.D graphics-state operators -------------------------------

    pub fn set_line_width(&mut self, width: f32) -> PdfResult<()> {
        self.require_mode("w", &[PageDescription, TextObject])?;
        if width < 0.0 {
            return Err(PdfError::OutOfRange { op: "w", detail: format!("line width {width} is negative") });
        }
        self.write_reals_operator(&[width], "w");
        self.gstate.top_mut().line_width = width;
        Ok(())
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> PdfResult<()> {
        self.require_mode("J", &[PageDescription, TextObject])?;
        let n = match cap {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::ProjectingSquare => 2,
        };
        self.buffer.extend_from_slice(format_int(n).as_bytes());
        self.buffer.push(b' ');
        self.write_operator("J");
        self.gstate.top_mut().line_cap = cap;
        Ok(())
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> PdfResult<()> {
        self.require_mode("j", &[PageDescription, TextObject])?;
        let n = match join {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        };
        self.buffer.extend_from_slice(format_int(n).as_bytes());
        self.buffer.push(b' ');
        self.write_operator("j");
        self.gstate.top_mut().line_join = join;
        Ok(())
    }

    pub fn set_miter_limit(&mut self, limit: f32) -> PdfResult<()> {
        self.require_mode("M", &[PageDescription, TextObject])?;
        if limit < 1.0 {
            return Err(PdfError::OutOfRange { op: "M", detail: format!("miter limit {limit} is below 1") });
        }
        self.write_reals_operator(&[limit], "M");
        self.gstate.top_mut().miter_limit = limit;
        Ok(())
    }

    pub fn set_dash(&mut self, pattern: &[f32], phase: f32) -> PdfResult<()> {
        self.require_mode("d", &[PageDescription, TextObject])?;
        for &element in pattern {
            if !(element > 0.0 && element <= crate::config::MAX_DASH_PATTERN) {
                return Err(PdfError::OutOfRange { op: "d", detail: format!("dash element {element} is out of range") });
            }
        }
        let phase = if pattern.is_empty() { 0.0 } else { phase };
        self.buffer.push(b'[');
        for (i, element) in pattern.iter().enumerate() {
            if i > 0 {
                self.buffer.push(b' ');
            }
            self.buffer.extend_from_slice(self.real(*element).as_bytes());
        }
        self.buffer.extend_from_slice(b"] ");
        self.buffer.extend_from_slice(self.real(phase).as_bytes());
        self.buffer.push(b' ');
        self.write_operator("d");
        self.gstate.top_mut().dash = DashPattern { pattern: pattern.to_vec(), phase };
        Ok(())
    }

    pub fn set_flatness(&mut self, flatness: f32) -> PdfResult<()> {
        self.require_mode("i", &[PageDescription, TextObject])?;
        if !(0.0..=100.0).contains(&flatness) {
            return Err(PdfError::OutOfRange { op: "i", detail: format!("flatness {flatness} is not in [0, 100]") });
        }
        self.write_reals_operator(&[flatness], "i");
        self.gstate.top_mut().flatness = flatness;
        Ok(())
    }

    pub fn set_ext_gstate(&mut self, local_name: &str) -> PdfResult<()> {
        self.require_mode("gs", &[PageDescription])?;
        self.buffer.push(b'/');
        self.buffer.extend_from_slice(local_name.as_bytes());
        self.buffer.push(b' ');
        self.write_operator("gs");
        Ok(())
    }

    pub fn save_state(&mut self) -> PdfResult<()> {
        self.require_mode("q", &[PageDescription])?;
        self.write_operator("q");
        self.gstate.save();
        Ok(())
    }

    pub fn restore_state(&mut self) -> PdfResult<()> {
        self.require_mode("Q", &[PageDescription])?;
        if !self.gstate.can_restore() {
            return Err(PdfError::CannotRestoreGState);
        }
        self.write_operator("Q");
        self.gstate.restore();
        Ok(())
    }

    pub fn concat(&mut self, m: Matrix) -> PdfResult<()> {
        self.require_mode("cm", &[PageDescription])?;
        self.write_reals_operator(&[m.a, m.b, m.c, m.d, m.e, m.f], "cm");
        let gs = self.gstate.top_mut();
        gs.ctm = m.then(&gs.ctm);
        Ok(())
    }

    // ---- path construction --------------------------------------------

    pub fn move_to(&mut self, x: f32, y: f32) -> PdfResult<()> {
        self.require_mode("m", &[PageDescription, PathObject])?;
        self.write_reals_operator(&[x, y], "m");
        self.current_point = (x, y);
        self.start_point = (x, y);
        self.mode.enter(PathObject);
        Ok(())
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> PdfResult<()> {
        self.require_mode("l", &[PathObject])?;
        self.write_reals_operator(&[x, y], "l");
        self.current_point = (x, y);
        Ok(())
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> PdfResult<()> {
        self.require_mode("c", &[PathObject])?;
        self.write_reals_operator(&[x1, y1, x2, y2, x3, y3], "c");
        self.current_point = (x3, y3);
        Ok(())
    }

    /// `v`: first control point implicitly equals the current point.
    pub fn curve_to_v(&mut self, x2: f32, y2: f32, x3: f32, y3: f32) -> PdfResult<()> {
        self.require_mode("v", &[PathObject])?;
        self.write_reals_operator(&[x2, y2, x3, y3], "v");
        self.current_point = (x3, y3);
        Ok(())
    }

    /// `y`: second control point implicitly equals the end point.
    pub fn curve_to_y(&mut self, x1: f32, y1: f32, x3: f32, y3: f32) -> PdfResult<()> {
        self.require_mode("y", &[PathObject])?;
        self.write_reals_operator(&[x1, y1, x3, y3], "y");
        self.current_point = (x3, y3);
        Ok(())
    }

    pub fn close_path(&mut self) -> PdfResult<()> {
        self.require_mode("h", &[PathObject])?;
        self.write_operator("h");
        self.current_point = self.start_point;
        Ok(())
    }

    pub fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) -> PdfResult<()> {
        self.require_mode("re", &[PageDescription, PathObject])?;
        self.write_reals_operator(&[x, y, width, height], "re");
        self.current_point = (x, y);
        self.start_point = (x, y);
        self.mode.enter(PathObject);
        Ok(())
    }

    pub fn clip(&mut self, rule: ClipRule) -> PdfResult<()> {
        let op = match rule {
            ClipRule::NonZero => "W",
            ClipRule::EvenOdd => "W*",
        };
        self.require_mode(op, &[PathObject])?;
        self.write_operator(op);
        self.mode.enter(ClippingPath);
        Ok(())
    }

    pub fn paint(&mut self, op: PaintOp) -> PdfResult<()> {
        self.require_mode(op.mnemonic(), &[PathObject, ClippingPath])?;
        self.write_operator(op.mnemonic());
        self.current_point = (0.0, 0.0);
        self.mode.enter(PageDescription);
        Ok(())
    }

    // ---- text objects ----------------------------------------------------

    pub fn begin_text(&mut self) -> PdfResult<()> {
        self.mode.begin_text()?;
        self.write_operator("BT");
        self.text_matrix = Matrix::IDENTITY;
        self.text_line_matrix = Matrix::IDENTITY;
        Ok(())
    }

    pub fn end_text(&mut self) -> PdfResult<()> {
        self.mode.end_text()?;
        self.write_operator("ET");
        Ok(())
    }

    pub fn set_char_space(&mut self, value: f32) -> PdfResult<()> {
        self.require_mode("Tc", &[PageDescription, TextObject])?;
        if !(crate::config::MIN_CHARSPACE..=crate::config::MAX_CHARSPACE).contains(&value) {
            return Err(PdfError::OutOfRange { op: "Tc", detail: format!("char space {value} is out of range") });
        }
        self.write_reals_operator(&[value], "Tc");
        self.gstate.top_mut().char_space = value;
        Ok(())
    }

    pub fn set_word_space(&mut self, value: f32) -> PdfResult<()> {
        self.require_mode("Tw", &[PageDescription, TextObject])?;
        if !(crate::config::MIN_WORDSPACE..=crate::config::MAX_WORDSPACE).contains(&value) {
            return Err(PdfError::OutOfRange { op: "Tw", detail: format!("word space {value} is out of range") });
        }
        self.write_reals_operator(&[value], "Tw");
        self.gstate.top_mut().word_space = value;
        Ok(())
    }

    pub fn set_horizontal_scaling(&mut self, value: f32) -> PdfResult<()> {
        self.require_mode("Tz", &[PageDescription, TextObject])?;
        if !(crate::config::MIN_HORIZONTAL_SCALING..=crate::config::MAX_HORIZONTAL_SCALING).contains(&value) {
            return Err(PdfError::OutOfRange { op: "Tz", detail: format!("horizontal scaling {value} is out of range") });
        }
        self.write_reals_operator(&[value], "Tz");
        self.gstate.top_mut().horizontal_scaling = value;
        Ok(())
    }

    pub fn set_text_leading(&mut self, value: f32) -> PdfResult<()> {
        self.require_mode("TL", &[PageDescription, TextObject])?;
        self.write_reals_operator(&[value], "TL");
        self.gstate.top_mut().leading = value;
        Ok(())
    }

    pub fn set_font(&mut self, local_name: &str, size: f32) -> PdfResult<()> {
        self.require_mode("Tf", &[PageDescription, TextObject])?;
        if !(size > 0.0 && size <= crate::config::MAX_FONT_SIZE) {
            return Err(PdfError::OutOfRange { op: "Tf", detail: format!("font size {size} is out of range") });
        }
        self.buffer.push(b'/');
        self.buffer.extend_from_slice(local_name.as_bytes());
        self.buffer.push(b' ');
        self.buffer.extend_from_slice(self.real(size).as_bytes());
        self.buffer.push(b' ');
        self.write_operator("Tf");
        let gs = self.gstate.top_mut();
        gs.font = Some(Name::from(local_name));
        gs.font_size = size;
        Ok(())
    }

    pub fn set_text_rendering_mode(&mut self, mode: i32) -> PdfResult<()> {
        self.require_mode("Tr", &[PageDescription, TextObject])?;
        self.buffer.extend_from_slice(format_int(mode as i64).as_bytes());
        self.buffer.push(b' ');
        self.write_operator("Tr");
        self.gstate.top_mut().rendering_mode = mode;
        Ok(())
    }

    pub fn set_text_rise(&mut self, value: f32) -> PdfResult<()> {
        self.require_mode("Ts", &[PageDescription, TextObject])?;
        self.write_reals_operator(&[value], "Ts");
        self.gstate.top_mut().text_rise = value;
        Ok(())
    }

    fn move_text_line(&mut self, tx: f32, ty: f32) {
        let translate = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: tx, f: ty };
        self.text_line_matrix = translate.then(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    pub fn move_text_position(&mut self, tx: f32, ty: f32) -> PdfResult<()> {
        self.require_mode("Td", &[TextObject])?;
        self.write_reals_operator(&[tx, ty], "Td");
        self.move_text_line(tx, ty);
        Ok(())
    }

    pub fn move_text_position_set_leading(&mut self, tx: f32, ty: f32) -> PdfResult<()> {
        self.require_mode("TD", &[TextObject])?;
        self.write_reals_operator(&[tx, ty], "TD");
        self.gstate.top_mut().leading = -ty;
        self.move_text_line(tx, ty);
        Ok(())
    }

    pub fn set_text_matrix(&mut self, m: Matrix) -> PdfResult<()> {
        self.require_mode("Tm", &[TextObject])?;
        self.write_reals_operator(&[m.a, m.b, m.c, m.d, m.e, m.f], "Tm");
        self.text_matrix = m;
        self.text_line_matrix = m;
        Ok(())
    }

    pub fn next_line(&mut self) -> PdfResult<()> {
        self.require_mode("T*", &[TextObject])?;
        self.write_operator("T*");
        let leading = self.gstate.top().leading;
        self.move_text_line(0.0, -leading);
        Ok(())
    }

    /// Advance the text matrix origin by the measured width of a shown
    /// run, per spec §4.D "Text position update after `Tj`".
    fn advance_text_position(&mut self, font: &dyn Font, rendered_width_in_1000ths: f32, glyphs: usize, spaces: usize) {
        let gs = self.gstate.top();
        let scaled = rendered_width_in_1000ths / 1000.0 * gs.font_size;
        let spacing = gs.char_space * glyphs as f32 + gs.word_space * spaces as f32;
        let tw = (scaled + spacing) * (gs.horizontal_scaling / 100.0);
        let (a, b) = (self.text_matrix.a, self.text_matrix.b);
        match font.writing_mode() {
            crate::collab::WritingMode::Horizontal => {
                self.text_matrix.e += tw * a;
                self.text_matrix.f += tw * b;
            }
            crate::collab::WritingMode::Vertical => {
                self.text_matrix.e -= tw * b;
                self.text_matrix.f -= tw * a;
            }
        }
    }

    fn count_spaces(bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| b == b' ').count()
    }

    /// `Tj`: show `text` using `font`, which must be the font set by the
    /// most recent `Tf` on this writer.
    pub fn show_text(&mut self, font: &dyn Font, text: &str) -> PdfResult<()> {
        self.require_mode("Tj", &[TextObject])?;
        if self.gstate.top().font.is_none() {
            return Err(PdfError::FontRequired { op: "Tj" });
        }
        let (bytes, rendered_width) = self.encode_and_measure(font, text)?;
        write_escaped_string(&mut self.buffer, &bytes);
        self.buffer.push(b' ');
        self.write_operator("Tj");
        let spaces = Self::count_spaces(&bytes);
        self.advance_text_position(font, rendered_width, bytes.len(), spaces);
        Ok(())
    }

    /// `'`: move to the next line, then show `text`.
    pub fn show_text_next_line(&mut self, font: &dyn Font, text: &str) -> PdfResult<()> {
        self.require_mode("'", &[TextObject])?;
        self.next_line_bare();
        self.show_text_raw(font, text, "'")
    }

    /// `"`: set word/char space, move to the next line, then show `text`.
    pub fn show_text_next_line_with_spacing(
        &mut self,
        font: &dyn Font,
        aw: f32,
        ac: f32,
        text: &str,
    ) -> PdfResult<()> {
        self.require_mode("\"", &[TextObject])?;
        self.gstate.top_mut().word_space = aw;
        self.gstate.top_mut().char_space = ac;
        self.next_line_bare();
        self.show_text_raw(font, text, "\"")
    }

    fn next_line_bare(&mut self) {
        let leading = self.gstate.top().leading;
        self.move_text_line(0.0, -leading);
    }

    fn show_text_raw(&mut self, font: &dyn Font, text: &str, op: &str) -> PdfResult<()> {
        if self.gstate.top().font.is_none() {
            return Err(PdfError::FontRequired { op: "Tj" });
        }
        let (bytes, rendered_width) = self.encode_and_measure(font, text)?;
        write_escaped_string(&mut self.buffer, &bytes);
        self.buffer.push(b' ');
        self.write_operator(op);
        let spaces = Self::count_spaces(&bytes);
        self.advance_text_position(font, rendered_width, bytes.len(), spaces);
        Ok(())
    }

    fn encode_and_measure(&self, font: &dyn Font, text: &str) -> PdfResult<(Vec<u8>, f32)> {
        if text.as_bytes().len() > crate::config::MAX_STRING_LEN {
            return Err(PdfError::StringTooLong);
        }
        let (bytes, _) = if let Some(encoder) = font.encoder() {
            encoder.encode_text(text)
        } else {
            (text.as_bytes().to_vec(), text.len())
        };
        let (_, rendered_width) = font.measure_text(text, f32::MAX, false);
        Ok((bytes, rendered_width))
    }

    // ---- color -----------------------------------------------------------

    pub fn set_fill_color(&mut self, color: Color) -> PdfResult<()> {
        self.require_mode("rg", &[PageDescription, TextObject])?;
        color::validate("rg", color)?;
        color::emit_fill(&mut self.buffer, color);
        self.gstate.top_mut().non_stroking_color = color;
        Ok(())
    }

    pub fn set_stroke_color(&mut self, color: Color) -> PdfResult<()> {
        self.require_mode("RG", &[PageDescription, TextObject])?;
        color::validate("RG", color)?;
        color::emit_stroke(&mut self.buffer, color);
        self.gstate.top_mut().stroking_color = color;
        Ok(())
    }

    // ---- XObjects and marked content --------------------------------------

    pub fn invoke_xobject(&mut self, local_name: &str) -> PdfResult<()> {
        self.require_mode("Do", &[PageDescription])?;
        self.buffer.push(b'/');
        self.buffer.extend_from_slice(local_name.as_bytes());
        self.buffer.push(b' ');
        self.write_operator("Do");
        Ok(())
    }

    pub fn begin_marked_content(&mut self, tag: &str) -> PdfResult<()> {
        self.require_mode("BMC", &[PageDescription, TextObject])?;
        self.buffer.push(b'/');
        self.buffer.extend_from_slice(tag.as_bytes());
        self.buffer.push(b' ');
        self.write_operator("BMC");
        self.mode.begin_marked_content();
        Ok(())
    }

    pub fn begin_marked_content_with_properties(&mut self, tag: &str, properties: &Dict) -> PdfResult<()> {
        self.require_mode("BDC", &[PageDescription, TextObject])?;
        self.buffer.push(b'/');
        self.buffer.extend_from_slice(tag.as_bytes());
        self.buffer.push(b' ');
        properties.emit(&mut self.buffer);
        self.buffer.push(b' ');
        self.write_operator("BDC");
        self.mode.begin_marked_content();
        Ok(())
    }

    pub fn end_marked_content(&mut self) -> PdfResult<()> {
        self.require_mode("EMC", &[PageDescription, TextObject])?;
        self.mode.end_marked_content()?;
        self.write_operator("EMC");
        Ok(())
    }

    pub fn format_real(&self, value: f32) -> String {
        format_real_default(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{ByteClass, Encoder, FontKind, WritingMode};

    struct StubFont;
    impl Font for StubFont {
        fn bbox(&self) -> (f32, f32) {
            (750.0, -250.0)
        }
        fn descent(&self) -> f32 {
            -250.0
        }
        fn writing_mode(&self) -> WritingMode {
            WritingMode::Horizontal
        }
        fn kind(&self) -> FontKind {
            FontKind::Type1
        }
        fn encoder(&self) -> Option<&dyn Encoder> {
            None
        }
        fn local_resource_name(&self) -> &str {
            "F1"
        }
        fn measure_text(&self, text: &str, _max_width: f32, _wordwrap: bool) -> (usize, f32) {
            (text.len(), text.len() as f32 * 500.0)
        }
    }

    fn as_text(stream: ContentStream) -> String {
        String::from_utf8(stream.into_bytes()).unwrap()
    }

    #[test]
    fn simple_text_scenario_matches_expected_bytes() {
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        cs.begin_text().unwrap();
        cs.set_font("F1", 24.0).unwrap();
        cs.move_text_position(0.0, 100.0).unwrap();
        cs.show_text(&StubFont, "Hello").unwrap();
        cs.end_text().unwrap();
        assert_eq!(as_text(cs), "BT\n/F1 24 Tf\n0 100 Td\n(Hello) Tj\nET\n");
    }

    #[test]
    fn rectangle_fill_resets_current_point_and_mode() {
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        cs.rectangle(100.0, 100.0, 50.0, 50.0).unwrap();
        assert_eq!(cs.mode(), GraphicsMode::PathObject);
        cs.paint(PaintOp::Fill).unwrap();
        assert_eq!(cs.mode(), GraphicsMode::PageDescription);
        assert_eq!(cs.current_point, (0.0, 0.0));
    }

    #[test]
    fn gsave_grestore_round_trips_line_width() {
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        cs.set_line_width(1.0).unwrap();
        cs.save_state().unwrap();
        cs.set_line_width(3.0).unwrap();
        cs.restore_state().unwrap();
        assert_eq!(cs.gstate().top().line_width, 1.0);
    }

    #[test]
    fn unbalanced_emc_is_rejected_and_emits_nothing() {
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        cs.begin_text().unwrap();
        let before = cs.buffer.len();
        let result = cs.end_marked_content();
        assert!(matches!(result, Err(PdfError::UnbalancedOperatorStack { .. })));
        assert_eq!(cs.buffer.len(), before);
    }

    #[test]
    fn line_to_outside_path_object_is_rejected() {
        let config = DocumentConfig::default();
        let mut cs = ContentStream::new(&config);
        assert!(cs.line_to(1.0, 1.0).is_err());
    }
}
