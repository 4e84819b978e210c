//! §4.D graphics-mode automaton: which operators are legal right now, and
//! the nesting counters that keep `BT`/`ET` and `BMC`/`BDC`/`EMC` honest.

use crate::error::{PdfError, PdfResult};

/// The finite set of modes a content stream can be in. Mirrors libharu's
/// `HPDF_GMODE_*` constants (`hpdf_page_operator.c`): every operator checks
/// the current mode before doing anything else.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GraphicsMode {
    PageDescription,
    PathObject,
    ClippingPath,
    TextObject,
}

/// A single entry in the marked-content bracket stack: which kind of
/// bracket is open, so `ET`/`EMC` can be checked against the *matching*
/// bracket kind rather than against a pair of counters that happen to
/// agree. This replaces the original `HPDF_Page_EndMarkedContentSequence`
/// double-decrement (see `examples/original_source/src/hpdf_page_operator.c`,
/// `InternalOperatorStackSize`), which inferred the match from two separate
/// monotone counters and needed an ad-hoc correction when they collided.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BracketKind {
    Text,
    MarkedContent,
}

/// Tracks the current [`GraphicsMode`] and the open `BT`/`BMC`/`BDC`
/// bracket stack for one content stream.
#[derive(Clone, Debug, Default)]
pub struct ModeTracker {
    mode: Option<GraphicsMode>,
    brackets: Vec<BracketKind>,
}

impl ModeTracker {
    pub fn new() -> Self {
        ModeTracker { mode: Some(GraphicsMode::PageDescription), brackets: Vec::new() }
    }

    pub fn mode(&self) -> GraphicsMode {
        self.mode.unwrap_or(GraphicsMode::PageDescription)
    }

    /// Depth of the operator stack, i.e. how many `BT`/`BMC`/`BDC` brackets
    /// are currently open. Corresponds to libharu's `InternalOperatorStackSize`.
    pub fn operator_stack_size(&self) -> usize {
        self.brackets.len()
    }

    /// Require that the current mode is one of `allowed`, returning an
    /// error naming `op` otherwise.
    pub fn require_mode(&self, op: &'static str, allowed: &[GraphicsMode]) -> PdfResult<()> {
        if allowed.contains(&self.mode()) {
            Ok(())
        } else {
            Err(PdfError::InvalidGraphicsMode { op, mode: self.mode() })
        }
    }

    pub fn enter(&mut self, mode: GraphicsMode) {
        self.mode = Some(mode);
    }

    pub fn begin_text(&mut self) -> PdfResult<()> {
        self.require_mode("BT", &[GraphicsMode::PageDescription])?;
        self.enter(GraphicsMode::TextObject);
        self.brackets.push(BracketKind::Text);
        Ok(())
    }

    pub fn end_text(&mut self) -> PdfResult<()> {
        self.require_mode("ET", &[GraphicsMode::TextObject])?;
        match self.brackets.last() {
            Some(BracketKind::Text) => {
                self.brackets.pop();
            }
            _ => {
                return Err(PdfError::UnbalancedOperatorStack {
                    detail: "ET does not match the innermost open bracket",
                })
            }
        }
        self.enter(GraphicsMode::PageDescription);
        Ok(())
    }

    pub fn begin_marked_content(&mut self) {
        self.brackets.push(BracketKind::MarkedContent);
    }

    pub fn end_marked_content(&mut self) -> PdfResult<()> {
        match self.brackets.last() {
            Some(BracketKind::MarkedContent) => {
                self.brackets.pop();
                Ok(())
            }
            Some(BracketKind::Text) => Err(PdfError::UnbalancedOperatorStack {
                detail: "EMC cannot close a BT/ET bracket",
            }),
            None => Err(PdfError::UnbalancedOperatorStack { detail: "EMC with no matching BMC/BDC" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_text_requires_page_description_mode() {
        let mut tracker = ModeTracker::new();
        tracker.enter(GraphicsMode::PathObject);
        assert!(tracker.begin_text().is_err());
    }

    #[test]
    fn marked_content_nests_inside_text_object() {
        let mut tracker = ModeTracker::new();
        tracker.begin_text().unwrap();
        tracker.begin_marked_content();
        assert_eq!(tracker.operator_stack_size(), 2);
        tracker.end_marked_content().unwrap();
        assert_eq!(tracker.operator_stack_size(), 1);
        tracker.end_text().unwrap();
        assert_eq!(tracker.operator_stack_size(), 0);
    }

    #[test]
    fn emc_cannot_close_a_text_bracket() {
        let mut tracker = ModeTracker::new();
        tracker.begin_text().unwrap();
        assert!(tracker.end_marked_content().is_err());
    }

    #[test]
    fn emc_with_nothing_open_is_an_error() {
        let mut tracker = ModeTracker::new();
        assert!(tracker.end_marked_content().is_err());
    }
}
