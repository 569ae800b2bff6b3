//! Entity tags for conditional GET.
//!
//! The tag depends only on the card dimensions, never on the encoded bytes or
//! the output format. Rendering is deterministic, so equal dimensions always
//! describe the same image for a given format.

use sha2::{Digest, Sha256};

/// Deterministic entity tag for a card, as lowercase hex SHA-256 of
/// `"{width}x{height}"`.
///
/// The value is unquoted; see [`quoted_card_etag`] for the header form.
pub fn card_etag(width: u32, height: u32) -> String {
    let digest = Sha256::digest(format!("{}x{}", width, height).as_bytes());
    hex::encode(digest)
}

/// [`card_etag`] wrapped in double quotes, ready for an `ETag` header.
pub fn quoted_card_etag(width: u32, height: u32) -> String {
    format!("\"{}\"", card_etag(width, height))
}
