//! Compact order identifier for the gateway's 30-character bill number field

use base64::Engine;
use common_utils::consts::BASE64_URL_SAFE_NO_PAD_ENGINE;
use uuid::Uuid;

/// Gateway-facing order identifier. A registration token's 16 raw bytes are
/// rendered as URL-safe unpadded base64, giving a fixed 22 characters, well
/// inside the gateway's 30-character limit. The hyphenated token text (36
/// characters) would not fit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BillNumber(String);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BillNumberDecodeError {
    #[error("bill number is not valid url-safe base64: {0}")]
    InvalidEncoding(String),
    #[error("bill number does not decode to a 16 byte token")]
    InvalidLength,
}

impl BillNumber {
    pub fn from_token(token: Uuid) -> Self {
        Self(BASE64_URL_SAFE_NO_PAD_ENGINE.encode(token.as_bytes()))
    }

    /// Recover the registration token. Strict: padded, malformed or
    /// wrong-length input is rejected rather than fixed up.
    pub fn token(&self) -> Result<Uuid, BillNumberDecodeError> {
        let bytes = BASE64_URL_SAFE_NO_PAD_ENGINE
            .decode(self.0.as_bytes())
            .map_err(|e| BillNumberDecodeError::InvalidEncoding(e.to_string()))?;
        Uuid::from_slice(&bytes).map_err(|_| BillNumberDecodeError::InvalidLength)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BillNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn token() -> Uuid {
        Uuid::parse_str("01234567-89ab-cdef-0123-456789abcdef").unwrap()
    }

    #[test]
    fn encodes_to_22_url_safe_characters() {
        let billno = BillNumber::from_token(token());
        assert_eq!(billno.as_str().len(), 22);
        assert!(billno
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn round_trips_the_token() {
        let billno = BillNumber::from_token(token());
        assert_eq!(billno.token().unwrap(), token());
    }

    #[test]
    fn rejects_padded_input() {
        let padded: BillNumber = serde_json::from_str("\"ASNFZ4mrze8BI0VniavN7w==\"").unwrap();
        assert!(matches!(
            padded.token(),
            Err(BillNumberDecodeError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn rejects_standard_alphabet_input() {
        let standard: BillNumber = serde_json::from_str("\"ASNFZ4mrze8BI0Vnia/N+w\"").unwrap();
        assert!(matches!(
            standard.token(),
            Err(BillNumberDecodeError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn rejects_wrong_length_input() {
        let short: BillNumber = serde_json::from_str("\"ASNFZ4mrze8\"").unwrap();
        assert!(short.token().is_err());
    }
}
