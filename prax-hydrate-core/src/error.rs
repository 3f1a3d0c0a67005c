//! Error types for association hydration with actionable messages.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: H{category}{number}
//! - 1xxx: Metadata errors (unknown model, unknown association)
//! - 2xxx: Access errors (unknown property, missing identifier)
//! - 3xxx: Query execution errors (backend failures)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use prax_hydrate_core::{ErrorCode, HydrateError};
//!
//! let err = HydrateError::unknown_association("Order", "shipment");
//! assert_eq!(err.code, ErrorCode::UnknownAssociation);
//! assert!(err.is_metadata_error());
//! assert!(err.to_string().contains("shipment"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for hydration operations.
pub type HydrateResult<T> = Result<T, HydrateError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Metadata errors (1xxx)
    /// Model is not registered with the metadata provider (H1001).
    UnknownModel = 1001,
    /// Association is not defined on the model (H1002).
    UnknownAssociation = 1002,
    /// Association path is malformed (H1003).
    InvalidPath = 1003,

    // Access errors (2xxx)
    /// Property cannot be read on a concrete instance (H2001).
    UnknownProperty = 2001,
    /// Entity has no usable identifier (H2002).
    MissingIdentifier = 2002,

    // Query execution errors (3xxx)
    /// Batched fetch failed (H3001).
    QueryFailed = 3001,
    /// General database error (H3002).
    DatabaseError = 3002,

    // Configuration errors (7xxx)
    /// Invalid configuration (H7001).
    InvalidConfiguration = 7001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "H1002").
    pub fn code(&self) -> String {
        format!("H{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnknownModel => "Unknown model",
            Self::UnknownAssociation => "Unknown association",
            Self::InvalidPath => "Invalid association path",
            Self::UnknownProperty => "Unknown property",
            Self::MissingIdentifier => "Missing identifier",
            Self::QueryFailed => "Batched fetch failed",
            Self::DatabaseError => "Database error",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The model involved.
    pub model: Option<String>,
    /// The association or property involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while hydrating associations.
#[derive(Error, Debug)]
pub struct HydrateError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for HydrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl HydrateError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the association or property name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an unknown model error.
    pub fn unknown_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(
            ErrorCode::UnknownModel,
            format!("Model {} is not registered", model),
        )
        .with_model(&model)
        .with_suggestion(format!("Register {} with the metadata provider", model))
    }

    /// Create an unknown association error.
    pub fn unknown_association(model: impl Into<String>, association: impl Into<String>) -> Self {
        let model = model.into();
        let association = association.into();
        Self::new(
            ErrorCode::UnknownAssociation,
            format!("{} has no association named '{}'", model, association),
        )
        .with_model(&model)
        .with_field(&association)
        .with_suggestion("Check the association path for typos")
        .with_help("Every segment of a path must name a relation declared on the model it is read from")
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::InvalidPath,
            format!("Invalid association path '{}': {}", path, message.into()),
        )
        .with_field(&path)
    }

    /// Create an unknown property error.
    pub fn unknown_property(model: impl Into<String>, property: impl Into<String>) -> Self {
        let model = model.into();
        let property = property.into();
        Self::new(
            ErrorCode::UnknownProperty,
            format!("Cannot read property '{}' on {}", property, model),
        )
        .with_model(&model)
        .with_field(&property)
        .with_help("The entity type does not expose this association through Entity::association")
    }

    /// Create a missing identifier error.
    pub fn missing_identifier(model: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(
            ErrorCode::MissingIdentifier,
            format!("{} instance has no identifier", model),
        )
        .with_model(&model)
        .with_suggestion("Only persisted entities can be hydrated")
    }

    /// Create a query execution error.
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::QueryFailed,
            format!("Batched fetch failed: {}", message.into()),
        )
    }

    /// Create a general database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message.into())
            .with_suggestion("Check the database logs for more details")
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid configuration: {}", message.into()),
        )
    }

    // ============== Error Checks ==============

    /// Check if this is a metadata error.
    pub fn is_metadata_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownModel | ErrorCode::UnknownAssociation | ErrorCode::InvalidPath
        )
    }

    /// Check if this is an access error.
    pub fn is_access_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownProperty | ErrorCode::MissingIdentifier
        )
    }

    /// Check if this is a query execution error.
    pub fn is_query_error(&self) -> bool {
        matches!(self.code, ErrorCode::QueryFailed | ErrorCode::DatabaseError)
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.code.code(), self.message);

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! hydrate_error {
    ($code:expr, $msg:expr) => {
        $crate::error::HydrateError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::HydrateError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
