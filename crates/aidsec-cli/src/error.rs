#![forbid(unsafe_code)]

use aidsec_render::RenderError;
use aidsec_runtime::{ConfigError, LoadError, PageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("page error: {0}")]
    Page(#[from] PageError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::InvalidArgument { .. } | Self::Config(_) => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use aidsec_runtime::ConfigError;

    #[test]
    fn exit_constructor_preserves_code_and_message() {
        let error = CliError::exit(42, "boom");
        assert_eq!(error.exit_code(), 42);
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn invalid_argument_exits_with_usage_code() {
        let error = CliError::invalid("bad --delta");
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "invalid argument: bad --delta");
    }

    #[test]
    fn config_errors_list_every_problem() {
        let error = CliError::from(ConfigError::Invalid(vec!["a".into(), "b".into()]));
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("a; b"));
    }

    #[test]
    fn io_errors_use_generic_code() {
        let error = CliError::from(std::io::Error::other("disk"));
        assert_eq!(error.exit_code(), 1);
    }
}
