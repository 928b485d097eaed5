//! Inline icon encoding
//!
//! Catalogue entries embed their icon as a data URI so the serving side
//! never has to host image files. Vector icons get the `image/svg+xml` MIME
//! type; anything else is sniffed from content.

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode raw bytes as an SVG data URI without sniffing.
///
/// Used for icons referenced by a bundle manifest, which are SVG by
/// convention.
pub fn svg_data_uri(data: &[u8]) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(data))
}

/// Encode raw bytes as a data URI, sniffing the MIME type from content.
///
/// Fails when the bytes are not recognizably an image.
pub fn icon_data_uri(data: &[u8]) -> Result<String> {
    if is_svg(data) {
        return Ok(svg_data_uri(data));
    }

    match infer::get(data) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(format!(
            "data:{};base64,{}",
            kind.mime_type(),
            STANDARD.encode(data)
        )),
        _ => Err(Error::Other(
            "icon data does not look like an image".to_string(),
        )),
    }
}

fn is_svg(data: &[u8]) -> bool {
    match std::str::from_utf8(data) {
        Ok(text) => text.contains("<svg"),
        Err(_) => false,
    }
}
