use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for srt operations
#[derive(Error, Debug)]
pub enum SrtError {
    /// Tag string does not follow `v<major>.<minor>.<patch>[-<name><number>]*`
    #[error("Failed to parse {0}")]
    TagParse(String),

    /// Suffix component was never parsed
    #[error("No such attribute {0}")]
    TagAttr(String),

    /// Base requested on a tag without an `rt` component
    #[error("No rt base tag {0}")]
    TagBase(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// External tool exited non-zero; `code` is -1 when killed by a signal
    #[error("{program} failed with exit code {code}: {stderr}")]
    Tool {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Unable to read {}, did you remember to create?", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Preflight check failed: {0}")]
    Preflight(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in srt
pub type Result<T> = std::result::Result<T, SrtError>;

impl SrtError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        SrtError::Config(msg.into())
    }

    /// Create an external tool error
    pub fn tool(program: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        SrtError::Tool {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn preflight(msg: impl Into<String>) -> Self {
        SrtError::Preflight(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        SrtError::Template(msg.into())
    }

    /// True for the three tag model failures (parse, attribute, base)
    pub fn is_tag_error(&self) -> bool {
        matches!(
            self,
            SrtError::TagParse(_) | SrtError::TagAttr(_) | SrtError::TagBase(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SrtError::config("missing key prj_dir");
        assert_eq!(err.to_string(), "Configuration error: missing key prj_dir");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SrtError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_tag_errors_are_distinct() {
        let parse = SrtError::TagParse("4.4.144".to_string());
        let attr = SrtError::TagAttr("rc".to_string());
        let base = SrtError::TagBase("v4.4.144".to_string());

        assert_eq!(parse.to_string(), "Failed to parse 4.4.144");
        assert_eq!(attr.to_string(), "No such attribute rc");
        assert_eq!(base.to_string(), "No rt base tag v4.4.144");
        assert!(parse.is_tag_error() && attr.is_tag_error() && base.is_tag_error());
        assert!(!SrtError::config("x").is_tag_error());
    }

    #[test]
    fn test_tool_error_display() {
        let err = SrtError::tool("kup", 2, "permission denied");
        assert_eq!(
            err.to_string(),
            "kup failed with exit code 2: permission denied"
        );

        let err = SrtError::tool("xz", -1, "killed");
        assert!(err.to_string().contains("exit code -1"));
    }

    #[test]
    fn test_missing_artifact_display() {
        let err = SrtError::MissingArtifact(PathBuf::from("/tmp/patch-4.4.1-rt1.patch.xz"));
        assert_eq!(
            err.to_string(),
            "Unable to read /tmp/patch-4.4.1-rt1.patch.xz, did you remember to create?"
        );
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (SrtError::config("x"), "Configuration error"),
            (SrtError::preflight("x"), "Preflight check failed"),
            (SrtError::template("x"), "Template error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
