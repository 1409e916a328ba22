use std::fmt;

/// The tiler's narrow error taxonomy: everything that isn't a
/// normal `None`/`bool` "no path"/"not valid" result, but also isn't
/// severe enough to be an `assert!`/`panic!` programmer error, lands
/// here. There are no retries and no partial results — a `TilerError`
/// is always returned immediately from the call that detected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TilerError {
    /// An argument was out of the range the operation requires, e.g.
    /// `shrink`'s `minimum_length <= 1`.
    InvalidArgument { reason: String },
    /// A [crate::TemplateSegment] failed construction-time geometry
    /// validation (duplicate consecutive points, or a non-unit step).
    InvalidSegment { reason: String },
}

impl fmt::Display for TilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TilerError::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
            TilerError::InvalidSegment { reason } => {
                write!(f, "invalid template segment: {reason}")
            }
        }
    }
}

impl std::error::Error for TilerError {}
