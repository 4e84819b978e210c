//! §4.C graphics-state stack: the subset of the PDF graphics state this
//! crate tracks outside the content stream itself, pushed/popped by `q`/`Q`.
//!
//! Grounded in the teacher's `Page::save_state`/`restore_state`
//! (`examples/SimonSapin-victor/src/pdf/document_structure.rs`), generalized
//! from a single `transform_matrix` field to the full set of state spec §4.C
//! lists, plus libharu's `HPDF_GState` fields referenced throughout
//! `hpdf_page_operator.c` (line width, dash, colors, text state).

use crate::pdf::object::Name;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Compose `self` followed by `other`, i.e. `self * other` in the PDF
    /// convention where row vectors are transformed on the left.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LineCap {
    Butt,
    Round,
    ProjectingSquare,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashPattern {
    pub pattern: Vec<f32>,
    pub phase: f32,
}

impl Default for DashPattern {
    fn default() -> Self {
        DashPattern { pattern: Vec::new(), phase: 0.0 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Color {
    Gray(f32),
    Rgb(f32, f32, f32),
    Cmyk(f32, f32, f32, f32),
}

/// One frame of graphics state, pushed by `q` and restored by `Q`. Only the
/// fields spec §4.C names as state are here; everything else (current path,
/// text-line matrices) lives in the content-stream writer itself since it is
/// never saved/restored.
#[derive(Clone, Debug)]
pub struct GraphicsStateFrame {
    pub ctm: Matrix,
    pub line_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f32,
    pub dash: DashPattern,
    pub flatness: f32,
    pub stroking_color: Color,
    pub non_stroking_color: Color,
    pub char_space: f32,
    pub word_space: f32,
    pub horizontal_scaling: f32,
    pub leading: f32,
    pub font: Option<Name>,
    pub font_size: f32,
    pub text_rise: f32,
    pub rendering_mode: i32,
}

impl Default for GraphicsStateFrame {
    fn default() -> Self {
        GraphicsStateFrame {
            ctm: Matrix::IDENTITY,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: DashPattern::default(),
            flatness: 0.0,
            stroking_color: Color::Gray(0.0),
            non_stroking_color: Color::Gray(0.0),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            text_rise: 0.0,
            rendering_mode: 0,
        }
    }
}

/// The `q`/`Q` stack. The bottom frame is a sentinel: it is never popped by
/// `Q`, matching libharu's "restore with nothing left to restore is an
/// error" behavior (`HPDF_Page_GRestore`).
#[derive(Clone, Debug)]
pub struct GraphicsStateStack {
    frames: Vec<GraphicsStateFrame>,
}

impl GraphicsStateStack {
    pub fn new() -> Self {
        GraphicsStateStack { frames: vec![GraphicsStateFrame::default()] }
    }

    pub fn top(&self) -> &GraphicsStateFrame {
        self.frames.last().expect("sentinel frame is never removed")
    }

    pub fn top_mut(&mut self) -> &mut GraphicsStateFrame {
        self.frames.last_mut().expect("sentinel frame is never removed")
    }

    pub fn save(&mut self) {
        let frame = self.top().clone();
        self.frames.push(frame);
    }

    /// `true` if a save is still outstanding, i.e. popping would not touch
    /// the sentinel frame.
    pub fn can_restore(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn restore(&mut self) -> bool {
        if self.can_restore() {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        GraphicsStateStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_round_trips_line_width() {
        let mut stack = GraphicsStateStack::new();
        stack.top_mut().line_width = 1.0;
        stack.save();
        stack.top_mut().line_width = 5.0;
        assert_eq!(stack.top().line_width, 5.0);
        assert!(stack.restore());
        assert_eq!(stack.top().line_width, 1.0);
    }

    #[test]
    fn restore_past_sentinel_fails() {
        let mut stack = GraphicsStateStack::new();
        assert!(!stack.can_restore());
        assert!(!stack.restore());
    }

    #[test]
    fn matrix_composition_translates_then_scales() {
        let translate = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 10.0, f: 0.0 };
        let scale = Matrix { a: 2.0, b: 0.0, c: 0.0, d: 2.0, e: 0.0, f: 0.0 };
        let combined = translate.then(&scale);
        assert_eq!(combined.e, 20.0);
    }
}
