use std::str::FromStr;

use super::extractor::ExtractionError;

/// An uploaded screenshot as a `data:<mime>;base64,<payload>` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub base64: String,
}

impl ImageData {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

impl FromStr for ImageData {
    type Err = ExtractionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ExtractionError::InvalidImage(reason.to_string());

        let rest = value
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("image must be a data URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("data URI has no payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("data URI must be base64 encoded"))?;

        if !mime_type.starts_with("image/") {
            return Err(invalid("data URI is not an image"));
        }
        if payload.is_empty() {
            return Err(invalid("image payload is empty"));
        }
        if !payload
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
        {
            return Err(invalid("image payload is not valid base64"));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            base64: payload.to_string(),
        })
    }
}
