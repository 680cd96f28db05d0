//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(domain) => match domain {
            DomainError::SourceNotFound(_) => exitcode::NOINPUT,
            DomainError::MalformedSource { .. }
            | DomainError::DuplicateId { .. }
            | DomainError::EmptySource => exitcode::DATAERR,
            DomainError::DetachedNode { .. } | DomainError::UnknownNode(_) => exitcode::SOFTWARE,
        },
        ApplicationError::UnsupportedSource(_) => exitcode::NOINPUT,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::Export { .. } => exitcode::SOFTWARE,
        ApplicationError::OperationFailed { .. } => exitcode::IOERR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case(DomainError::SourceNotFound(PathBuf::from("x")), exitcode::NOINPUT)]
    #[case(DomainError::EmptySource, exitcode::DATAERR)]
    #[case(DomainError::malformed("a.yaml", "bad"), exitcode::DATAERR)]
    #[case(
        DomainError::DetachedNode { id: "a".into(), max_depth: 1 },
        exitcode::SOFTWARE
    )]
    #[case(DomainError::UnknownNode("ghost".into()), exitcode::SOFTWARE)]
    #[case(
        DomainError::DuplicateId { id: "index".into(), first: "a".into(), second: "b".into() },
        exitcode::DATAERR
    )]
    fn given_domain_error_when_mapping_then_sysexits_code(
        #[case] error: DomainError,
        #[case] expected: i32,
    ) {
        let cli: CliError = ApplicationError::from(error).into();
        assert_eq!(cli.exit_code(), expected);
        assert_ne!(cli.exit_code(), exitcode::OK);
    }

    #[test]
    fn given_config_error_when_mapping_then_config_code() {
        let cli: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(cli.exit_code(), exitcode::CONFIG);
    }
}
