//! Error types for conf-ts compilation

use crate::diagnostics::SourceLocation;
use crate::program::FileId;
use thiserror::Error;

/// Result type used throughout the crate
pub type ConfResult<T> = Result<T, ConfError>;

/// Errors produced while loading, evaluating or rendering a configuration.
///
/// Every variant carries the [`SourceLocation`] it originates from. A failure
/// anywhere aborts the whole compile; there is no partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfError {
    /// No tsconfig.json was found above the entry file
    #[error("Could not find a tsconfig.json file. ({location})")]
    ConfigurationMissing {
        /// Where the lookup started
        location: SourceLocation,
    },

    /// The entry file has no `export default` expression
    #[error("No default export found in the entry file: {}", .location.file)]
    NoExportedExpression {
        /// The entry file
        location: SourceLocation,
    },

    /// An identifier, import or enum member could not be resolved
    #[error("Unresolved reference '{name}': {reason} ({location})")]
    UnresolvedReference {
        /// The name that failed to resolve
        name: String,
        /// Why resolution failed
        reason: String,
        /// Reference site
        location: SourceLocation,
    },

    /// A macro was invoked without an opt-in import, or with macro mode disabled
    #[error("{} ({location})", macro_not_imported_message(.name, .macro_enabled))]
    MacroNotImported {
        /// Macro name as written at the call site
        name: String,
        /// Whether macro mode was enabled for the compile
        macro_enabled: bool,
        /// Call site
        location: SourceLocation,
    },

    /// A compile option had the wrong shape
    #[error("Invalid option: {message}")]
    InvalidOption {
        /// What was wrong with the option
        message: String,
        /// Always the unknown location; options are not tied to a file
        location: SourceLocation,
    },

    /// Output format outside `json` / `yaml`
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// The rejected format name
        format: String,
        /// Always the unknown location
        location: SourceLocation,
    },

    /// A binding reaches itself while being evaluated
    #[error("Cycle detected while evaluating '{name}' ({location})")]
    CycleDetected {
        /// Binding or export that closed the cycle
        name: String,
        /// Reference site
        location: SourceLocation,
    },

    /// A macro received arguments it cannot work with
    #[error("Invalid argument for macro '{macro_name}': {message} ({location})")]
    InvalidMacroArgument {
        /// Macro name
        macro_name: String,
        /// What was wrong
        message: String,
        /// Call site
        location: SourceLocation,
    },

    /// Syntax that parses but cannot be folded at compile time
    #[error("Unsupported expression: {message} ({location})")]
    UnsupportedExpression {
        /// Description of the construct
        message: String,
        /// Expression site
        location: SourceLocation,
    },

    /// An operator received operands of the wrong type
    #[error("Type error: expected {expected}, got {actual} ({location})")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type found
        actual: String,
        /// Expression site
        location: SourceLocation,
    },

    /// Source text could not be parsed
    #[error("Parse error: {message} ({location})")]
    Parse {
        /// Parser message
        message: String,
        /// Error site
        location: SourceLocation,
    },

    /// A file could not be read
    #[error("Could not read {}: {message}", .location.file)]
    Io {
        /// Underlying I/O message
        message: String,
        /// The file being read
        location: SourceLocation,
    },

    /// The value tree could not be rendered
    #[error("Could not render output: {message}")]
    Render {
        /// Serializer message
        message: String,
        /// Always the unknown location
        location: SourceLocation,
    },
}

fn macro_not_imported_message(name: &str, macro_enabled: &bool) -> String {
    if *macro_enabled {
        format!("Macro '{name}' must be imported from '{}'", crate::registry::MACRO_MODULE)
    } else {
        format!("Macro '{name}' cannot be used because macro mode is disabled")
    }
}

/// Discriminant of [`ConfError`], convenient for matching in callers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ConfError::ConfigurationMissing`]
    ConfigurationMissing,
    /// See [`ConfError::NoExportedExpression`]
    NoExportedExpression,
    /// See [`ConfError::UnresolvedReference`]
    UnresolvedReference,
    /// See [`ConfError::MacroNotImported`]
    MacroNotImported,
    /// See [`ConfError::InvalidOption`]
    InvalidOption,
    /// See [`ConfError::UnsupportedFormat`]
    UnsupportedFormat,
    /// See [`ConfError::CycleDetected`]
    CycleDetected,
    /// See [`ConfError::InvalidMacroArgument`]
    InvalidMacroArgument,
    /// See [`ConfError::UnsupportedExpression`]
    UnsupportedExpression,
    /// See [`ConfError::TypeMismatch`]
    TypeMismatch,
    /// See [`ConfError::Parse`]
    Parse,
    /// See [`ConfError::Io`]
    Io,
    /// See [`ConfError::Render`]
    Render,
}

impl ConfError {
    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfError::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            ConfError::NoExportedExpression { .. } => ErrorKind::NoExportedExpression,
            ConfError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            ConfError::MacroNotImported { .. } => ErrorKind::MacroNotImported,
            ConfError::InvalidOption { .. } => ErrorKind::InvalidOption,
            ConfError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConfError::CycleDetected { .. } => ErrorKind::CycleDetected,
            ConfError::InvalidMacroArgument { .. } => ErrorKind::InvalidMacroArgument,
            ConfError::UnsupportedExpression { .. } => ErrorKind::UnsupportedExpression,
            ConfError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ConfError::Parse { .. } => ErrorKind::Parse,
            ConfError::Io { .. } => ErrorKind::Io,
            ConfError::Render { .. } => ErrorKind::Render,
        }
    }

    /// Where the error originates
    pub fn location(&self) -> &SourceLocation {
        match self {
            ConfError::ConfigurationMissing { location }
            | ConfError::NoExportedExpression { location }
            | ConfError::UnresolvedReference { location, .. }
            | ConfError::MacroNotImported { location, .. }
            | ConfError::InvalidOption { location, .. }
            | ConfError::UnsupportedFormat { location, .. }
            | ConfError::CycleDetected { location, .. }
            | ConfError::InvalidMacroArgument { location, .. }
            | ConfError::UnsupportedExpression { location, .. }
            | ConfError::TypeMismatch { location, .. }
            | ConfError::Parse { location, .. }
            | ConfError::Io { location, .. }
            | ConfError::Render { location, .. } => location,
        }
    }

    /// The file the error originates from
    pub fn file(&self) -> &FileId {
        &self.location().file
    }

    /// Create an invalid option error
    pub fn invalid_option(message: impl Into<String>) -> Self {
        ConfError::InvalidOption {
            message: message.into(),
            location: SourceLocation::unknown(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ConfError::UnsupportedFormat {
            format: format.into(),
            location: SourceLocation::unknown(),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        ConfError::Render {
            message: message.into(),
            location: SourceLocation::unknown(),
        }
    }

    /// Create an I/O error for a file
    pub fn io(file: FileId, error: &std::io::Error) -> Self {
        ConfError::Io {
            message: error.to_string(),
            location: SourceLocation::file(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Position;

    #[test]
    fn test_messages_name_the_file() {
        let err = ConfError::NoExportedExpression {
            location: SourceLocation::file_start(FileId::new("/cfg/index.ts")),
        };
        assert_eq!(
            err.to_string(),
            "No default export found in the entry file: /cfg/index.ts"
        );
        assert_eq!(err.kind(), ErrorKind::NoExportedExpression);
        assert_eq!(err.file().as_str(), "/cfg/index.ts");
    }

    #[test]
    fn test_macro_messages_depend_on_mode() {
        let location = SourceLocation::new(FileId::new("a.ts"), Position::new(2, 5));
        let disabled = ConfError::MacroNotImported {
            name: "env".to_string(),
            macro_enabled: false,
            location: location.clone(),
        };
        assert!(disabled.to_string().contains("macro mode is disabled"));
        assert!(disabled.to_string().ends_with("(a.ts:2:5)"));

        let missing = ConfError::MacroNotImported {
            name: "env".to_string(),
            macro_enabled: true,
            location,
        };
        assert!(missing.to_string().contains("@conf-ts/macro"));
    }
}
