/// Core error type for the goal bot.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can tell user-facing failures (not found, validation, forbidden) apart from
/// transport hiccups and unexpected collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Errors that should be answered with a plain "not found" style reply.
    ///
    /// `Forbidden` is folded in so a reply never reveals that another
    /// account's object exists.
    pub fn is_not_found_like(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Forbidden(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
