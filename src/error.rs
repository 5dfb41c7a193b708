use thiserror::Error;

/// Errors raised while reading a level description.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid level XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("expected <level> root element, found <{0}>")]
    UnexpectedRoot(String),
    #[error("<{element}> is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("`{attribute}` on <{element}> is not a valid number: {value:?}")]
    InvalidNumber {
        element: String,
        attribute: &'static str,
        value: String,
    },
    #[error("`{attribute}` on <{element}> is not a boolean: {value:?}")]
    InvalidBool {
        element: String,
        attribute: &'static str,
        value: String,
    },
    #[error("unknown wall side {0:?}")]
    UnknownSide(String),
    #[error("tile ({x}, {y}) is outside a {width}x{depth} level")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        depth: usize,
    },
    #[error("level must be at least 1x1")]
    Empty,
    #[error("a {width}x{depth} level exceeds the limit of {limit} tiles")]
    TooLarge {
        width: usize,
        depth: usize,
        limit: usize,
    },
}
