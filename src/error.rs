//! Error types.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are grouped
//! by [`ErrorKind`] so hosts can tell a caller bug (precondition) from a bad
//! construction bag or a failing event handler.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Out-of-range index, unknown reference, stale handle, invalid tree edit.
    PreconditionViolation,
    /// Unknown tag name or malformed attributes bag.
    ConstructionFailure,
    /// An event handler returned an error.
    EventHandlerFailure,
    /// Failure reported by the surrounding host (terminal, serializer, environment).
    Host,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("unknown reference `{0}`")]
    UnknownRef(String),

    #[error("reference `{name}` is not a {expected}")]
    RefKind { name: String, expected: &'static str },

    #[error("node handle refers to a released node")]
    StaleNode,

    #[error("hierarchy request: {0}")]
    HierarchyRequest(&'static str),

    #[error("reference node is not a child of this parent")]
    NotFound,

    #[error("collection item at index {index} no longer matches its live node")]
    Desynchronized { index: usize },

    #[error("item is already attached to a live container")]
    AlreadyAttached,

    #[error("invalid class token `{0}`")]
    InvalidToken(String),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("invalid tag name `{0}`")]
    InvalidTagName(String),

    #[error("property `{name}` expects {expected}")]
    PropertyType { name: String, expected: &'static str },

    #[error("attribute `{0}` has no string form")]
    MalformedAttribute(String),

    #[error("handler for `{event}` failed: {source}")]
    Handler {
        event: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid value for {key}: {message}")]
    Config { key: &'static str, message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IndexOutOfBounds { .. }
            | Error::UnknownRef(_)
            | Error::RefKind { .. }
            | Error::StaleNode
            | Error::HierarchyRequest(_)
            | Error::NotFound
            | Error::Desynchronized { .. }
            | Error::AlreadyAttached
            | Error::InvalidToken(_)
            | Error::InvalidSelector(_) => ErrorKind::PreconditionViolation,
            Error::InvalidTagName(_) | Error::PropertyType { .. } | Error::MalformedAttribute(_) => {
                ErrorKind::ConstructionFailure
            }
            Error::Handler { .. } => ErrorKind::EventHandlerFailure,
            Error::Config { .. } | Error::Json(_) | Error::Io(_) => ErrorKind::Host,
        }
    }

    /// Strip `Handler` wrappers down to the error a handler actually returned.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Handler { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
