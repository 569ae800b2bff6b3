use thiserror::Error;

/// Why a single request field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    /// The field was not supplied
    #[error("this field is required")]
    Missing,

    /// The field could not be parsed as an integer
    #[error("enter a whole number")]
    NotAnInteger,

    /// The value is smaller than the allowed minimum
    #[error("ensure this value is greater than or equal to {min}")]
    BelowMinimum { min: u32 },

    /// The value is larger than the allowed maximum
    #[error("ensure this value is less than or equal to {max}")]
    AboveMaximum { max: u32 },
}

/// A validation failure for one named field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {kind}")]
pub struct ValidationError {
    /// Field name (`height` or `width`)
    pub field: &'static str,

    /// Failure reason
    pub kind: ValidationErrorKind,
}

/// Every field that failed validation for a card request.
///
/// Never empty when returned from the validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, kind: ValidationErrorKind) {
        self.errors.push(ValidationError { field, kind });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The failure recorded for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&ValidationErrorKind> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| &e.kind)
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while producing a card
#[derive(Debug, Clone, Error)]
pub enum CardError {
    /// Request parameters were rejected (maps to HTTP 400)
    #[error("Invalid card request: {0}")]
    Validation(#[from] ValidationErrors),

    /// The raster could not be encoded to the requested format
    #[error("Failed to encode card: {message}")]
    Encode { message: String },

    /// The render task did not complete
    #[error("Render task failed: {message}")]
    Render { message: String },
}

/// Errors reported by a card store backend
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The backing store could not be reached
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}
