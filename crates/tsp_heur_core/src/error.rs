use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("search cancelled")]
    Cancelled,
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Cancellation is an expected outcome, not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn cancelled_is_distinguishable_from_failures() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::invalid_input("bad").is_cancelled());
        assert!(!Error::invalid_config("bad").is_cancelled());
    }

    #[test]
    fn messages_carry_the_reason() {
        assert_eq!(
            Error::invalid_config("cooling_rate must be in (0, 1)").to_string(),
            "invalid config: cooling_rate must be in (0, 1)"
        );
        assert_eq!(Error::Cancelled.to_string(), "search cancelled");
    }
}
