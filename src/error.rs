use thiserror::Error;

/// Structural problems found while reading outline markup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutlineError {
    #[error("expected {expected} at byte {offset}, found {found}")]
    UnexpectedTag {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("<{0}> is never closed")]
    Unclosed(String),

    #[error("outline markup is empty")]
    Empty,

    #[error("trailing content after the outline at byte {0}")]
    TrailingContent(usize),
}

pub type Result<T> = std::result::Result<T, OutlineError>;
