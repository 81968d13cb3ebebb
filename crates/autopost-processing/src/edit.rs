use base64::{engine::general_purpose, Engine as _};

use crate::error::PrepareError;

/// Decode a `data:<mime>;base64,<payload>` URL into raw image bytes.
///
/// Only image MIME types are accepted; the bytes themselves are checked when
/// they are attached to a store.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, PrepareError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| PrepareError::InvalidEdit("not a data url".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PrepareError::InvalidEdit("missing data url payload".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| PrepareError::InvalidEdit("data url is not base64 encoded".to_string()))?;

    if !mime.starts_with("image/") {
        return Err(PrepareError::InvalidEdit(format!(
            "unexpected content type {}",
            mime
        )));
    }

    general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| PrepareError::InvalidEdit(format!("bad base64 payload: {}", e)))
}
