//! Card request validation.
//!
//! Path parameters arrive as strings. They are parsed and bounds-checked here
//! before any cache key is built or any pixel is drawn, so invalid requests
//! never reach the store or the renderer.

use crate::error::{ValidationErrorKind, ValidationErrors};

/// Smallest allowed card side, in pixels.
pub const MIN_DIMENSION: u32 = 1;

/// Largest allowed card side, in pixels.
pub const MAX_DIMENSION: u32 = 1024;

// =============================================================================
// Card Request
// =============================================================================

/// Validated card dimensions.
///
/// Both sides are guaranteed to lie in `MIN_DIMENSION..=MAX_DIMENSION`. The
/// only ways to obtain one are [`validate_card_request`] and
/// [`CardRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardRequest {
    height: u32,
    width: u32,
}

impl CardRequest {
    /// Build a request from already-parsed integers.
    ///
    /// Applies the same bounds as [`validate_card_request`].
    pub fn new(height: u32, width: u32) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_bounds(&mut errors, "height", i128::from(height));
        check_bounds(&mut errors, "width", i128::from(width));

        if errors.is_empty() {
            Ok(Self { height, width })
        } else {
            Err(errors)
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// The text burned into the card, e.g. `"15 X 10 "`.
    ///
    /// The trailing space is part of the label.
    pub fn label(&self) -> String {
        format!("{} X {} ", self.height, self.width)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validate raw height and width values.
///
/// Each value may carry surrounding whitespace and an optional sign. Every
/// failing field is reported, not just the first one.
///
/// # Example
///
/// ```
/// use cardgen::card::validate_card_request;
///
/// let request = validate_card_request(Some("15"), Some("10")).unwrap();
/// assert_eq!((request.height(), request.width()), (15, 10));
///
/// let errors = validate_card_request(Some("0"), None).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
pub fn validate_card_request(
    height: Option<&str>,
    width: Option<&str>,
) -> Result<CardRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let height = parse_dimension(&mut errors, "height", height);
    let width = parse_dimension(&mut errors, "width", width);

    match (height, width) {
        (Some(height), Some(width)) if errors.is_empty() => Ok(CardRequest { height, width }),
        _ => Err(errors),
    }
}

fn parse_dimension(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
) -> Option<u32> {
    let raw = match raw.map(str::trim) {
        None | Some("") => {
            errors.push(field, ValidationErrorKind::Missing);
            return None;
        }
        Some(raw) => raw,
    };

    let value = match parse_integer(raw) {
        Some(value) => value,
        None => {
            errors.push(field, ValidationErrorKind::NotAnInteger);
            return None;
        }
    };

    if check_bounds(errors, field, value) {
        // In range, so the narrowing cannot fail.
        u32::try_from(value).ok()
    } else {
        None
    }
}

/// Parse an optionally signed run of ASCII digits.
///
/// Values outside the `i128` range saturate, which keeps them on the correct
/// side of the bounds check instead of reporting them as non-integers.
fn parse_integer(raw: &str) -> Option<i128> {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value = digits.parse::<i128>().unwrap_or(i128::MAX);
    Some(if negative { -value } else { value })
}

fn check_bounds(errors: &mut ValidationErrors, field: &'static str, value: i128) -> bool {
    if value < i128::from(MIN_DIMENSION) {
        errors.push(
            field,
            ValidationErrorKind::BelowMinimum {
                min: MIN_DIMENSION,
            },
        );
        false
    } else if value > i128::from(MAX_DIMENSION) {
        errors.push(
            field,
            ValidationErrorKind::AboveMaximum {
                max: MAX_DIMENSION,
            },
        );
        false
    } else {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
