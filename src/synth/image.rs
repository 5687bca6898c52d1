use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::SynthesisError;

/// MIME type assumed when a data URL does not declare one.
pub const FALLBACK_MIME: &str = "image/jpeg";

/// Inline image split out of a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage<'a> {
    /// Declared MIME type, or [`FALLBACK_MIME`].
    pub mime_type: String,
    /// Base64 payload after the comma.
    pub data: &'a str,
}

/// Splits `data:<mime>;base64,<payload>` into MIME type and payload.
pub fn parse_data_url(url: &str) -> Result<InlineImage<'_>, SynthesisError> {
    let Some((header, data)) = url.split_once(',') else {
        return Err(SynthesisError::InvalidImage(
            "expected a data URL with a ',' separator".to_string(),
        ));
    };
    let data = data.trim();
    if data.is_empty() {
        return Err(SynthesisError::InvalidImage("empty image payload".to_string()));
    }

    let mime_type = header
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MIME)
        .to_string();

    Ok(InlineImage { mime_type, data })
}

/// Encodes raw image bytes as a base64 data URL, sniffing the MIME type.
pub fn encode_data_url(bytes: &[u8]) -> Result<String, SynthesisError> {
    let kind = infer::get(bytes)
        .ok_or_else(|| SynthesisError::InvalidImage("unrecognized file type".to_string()))?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(SynthesisError::InvalidImage(format!(
            "{} is not an image",
            kind.mime_type()
        )));
    }
    Ok(format!("data:{};base64,{}", kind.mime_type(), STANDARD.encode(bytes)))
}
