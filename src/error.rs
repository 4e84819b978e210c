use thiserror::Error;

/// Every fallible operation in this crate returns this error type.
///
/// Strict validation (invalid color component, wrong mode for an operator, missing font)
/// returns an error without mutating state or emitting bytes, so callers may retry with
/// corrected arguments. `InsufficientSpace` is the one variant that is *not* fatal: it
/// carries partial-progress data (how many bytes of input were consumed) rather than
/// aborting the caller's work.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("operator {op} is not legal in the current graphics mode {mode:?}")]
    InvalidGraphicsMode { op: &'static str, mode: crate::graphics::mode::GraphicsMode },

    #[error("argument to {op} is out of range: {detail}")]
    OutOfRange { op: &'static str, detail: String },

    #[error("invalid parameter passed to {op}: {detail}")]
    InvalidParameter { op: &'static str, detail: String },

    #[error("operator {op} requires a font to be set")]
    FontRequired { op: &'static str },

    #[error("font is invalid or does not belong to this document")]
    InvalidFont,

    #[error("XObject does not belong to this document")]
    InvalidXObject,

    #[error("ExtGState does not belong to this document")]
    InvalidExtGState,

    #[error("unbalanced operator stack: {detail}")]
    UnbalancedOperatorStack { detail: &'static str },

    #[error("Q has no matching q: graphics-state stack only has the sentinel frame")]
    CannotRestoreGState,

    #[error("not enough vertical space to place all of the text; {consumed} bytes consumed")]
    InsufficientSpace { consumed: usize },

    #[error("string exceeds the maximum length accepted by a content-stream operator")]
    StringTooLong,

    #[error("dictionary has no entry named {0:?}")]
    DictItemNotFound(&'static str),

    #[error("write to the byte sink failed")]
    StreamIoFailed(#[from] std::io::Error),

    #[error("allocation of an indirect object failed: {0}")]
    Allocation(&'static str),

    #[error("the document already has a sticky error and cannot accept further operations")]
    Poisoned,
}

pub type PdfResult<T> = Result<T, PdfError>;
