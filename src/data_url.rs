//! Data URL encoding for local image files
//!
//! Converts file bytes into `data:<mime>;base64,<payload>` strings and back,
//! so an image can be handed to a provider without hosting it anywhere.

use base64::Engine as _;

/// Sniff an image mime type from magic bytes, falling back to PNG.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

pub fn is_data_url(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// Encode raw image bytes as a base64 data URL.
pub fn encode(bytes: &[u8]) -> String {
    let mime = detect_image_mime(bytes);
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, payload)
}

/// Decode a base64 data URL into its mime type and raw bytes.
pub fn decode(data_url: &str) -> crate::Result<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:").ok_or_else(|| {
        crate::Error::InvalidRequest("not a data URL (missing 'data:' prefix)".to_string())
    })?;

    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        crate::Error::InvalidRequest("malformed data URL (missing ',' separator)".to_string())
    })?;

    let mime = header.strip_suffix(";base64").ok_or_else(|| {
        crate::Error::InvalidRequest("only base64 data URLs are supported".to_string())
    })?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| {
            crate::Error::InvalidRequest(format!("invalid base64 payload in data URL: {}", e))
        })?;

    Ok((mime.to_string(), bytes))
}
