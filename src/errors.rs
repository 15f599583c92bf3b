//! Typed error hierarchy for the Architect pipeline.
//!
//! Component-local precondition violations come back as
//! `architect_common::IgnoredReason` outcomes. Only conditions that block the
//! cycle from moving forward surface here:
//! - `WorkflowError`: orchestrator transitions that cannot proceed
//! - `ConfigError`: configuration loading failures

use architect_common::{IgnoredReason, Phase, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the workflow orchestrator.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Cannot {operation} during the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Specification must be confirmed before generation can start")]
    SpecNotConfirmed,

    #[error("Cannot generate without a destination")]
    NoDestination,

    #[error("Generation did not start: {0}")]
    GenerationIgnored(IgnoredReason),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from loading `.architect/architect.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse architect.toml: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {variable}")]
    InvalidEnv { variable: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_error_invalid_phase_names_operation_and_phase() {
        let err = WorkflowError::InvalidPhase {
            operation: "approve a change",
            phase: Phase::Input,
        };
        assert_eq!(err.to_string(), "Cannot approve a change during the input phase");
    }

    #[test]
    fn workflow_error_no_destination_is_user_readable() {
        let err = WorkflowError::NoDestination;
        assert!(err.to_string().contains("without a destination"));
    }

    #[test]
    fn workflow_error_converts_from_store_error() {
        let inner = StoreError::LockPoisoned;
        let err: WorkflowError = inner.into();
        assert!(matches!(err, WorkflowError::Store(StoreError::LockPoisoned)));
    }

    #[test]
    fn workflow_error_generation_ignored_carries_reason() {
        let err = WorkflowError::GenerationIgnored(IgnoredReason::AlreadyGenerating);
        match &err {
            WorkflowError::GenerationIgnored(reason) => {
                assert_eq!(*reason, IgnoredReason::AlreadyGenerating)
            }
            _ => panic!("Expected GenerationIgnored"),
        }
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn config_error_read_failed_carries_path() {
        let path = PathBuf::from("/project/.architect/architect.toml");
        let err = ConfigError::ReadFailed {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        match &err {
            ConfigError::ReadFailed { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected ReadFailed"),
        }
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&WorkflowError::SpecNotConfirmed);
        assert_std_error(&ConfigError::InvalidEnv {
            variable: "X".into(),
            value: "y".into(),
        });
    }
}
