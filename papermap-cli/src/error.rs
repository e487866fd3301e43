//! Error handling for the papermap CLI

use thiserror::Error;
use std::path::PathBuf;

/// Main error type for papermap CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid marker file {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_input<S: Into<String>>(path: PathBuf, message: S) -> Self {
        Self::InvalidInput {
            path,
            message: message.into(),
        }
    }

    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation { message: message.into() }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(format!("TOML serialization error: {}", err))
    }
}

impl From<papermap_core::GenerateError> for CliError {
    fn from(err: papermap_core::GenerateError) -> Self {
        Self::generation(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    // Add helpful suggestions based on error type
    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidInput { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Markers must be a JSON array of [id, x, y, r] tuples or {\"id\", \"x\", \"y\", \"r\"} objects\n\
                 • Marker ids must be unique and radii must not be negative"
            );
        }

        CliError::Config { .. } | CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your papermap.toml configuration file\n\
                 • Use 'papermap config' to print a sample configuration\n\
                 • Every depth needs non-zero cells and scale"
            );
        }

        CliError::Generation { .. } | CliError::Io { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Ensure the output directory is writable\n\
                 • Reduce the number of workers with --threads"
            );
        }
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("markers.json"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct: markers.json"));

        let err = CliError::invalid_input(PathBuf::from("m.json"), "Duplicate marker id: 3");
        assert!(format_error_with_suggestions(&err).contains("ids must be unique"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));
    }
}
