use thiserror::Error;

/// Status codes surfaced by the stylesheet API. Client callbacks return the
/// same type so domain errors from URL resolution or `@import` fetching pass
/// through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CssError {
    #[error("out of memory")]
    Nomem,
    #[error("invalid input")]
    Invalid,
    #[error("more data required")]
    NeedsData,
    #[error("bad parameter")]
    BadParm,
    #[error("not found")]
    NotFound,
    #[error("end of input")]
    Eof,
    /// Failure reported by the client's `import` callback.
    #[error("import failed: {0}")]
    Import(String),
    /// Failure reported by the client's `resolve` callback.
    #[error("could not resolve url: {0}")]
    Resolve(String),
}

pub type CssResult<T> = Result<T, CssError>;
