//! Keyed-digest signing and the `signature@payload` envelope.
//!
//! Every payload that crosses the wire in either direction carries an MD5
//! digest of the billing identity, the shared secret and the payload itself,
//! concatenated in that order. The secret never travels; both ends mix it in
//! locally and compare lowercase hex digests as exact strings.

use std::borrow::Cow;

use common_utils::{
    crypto::{self, GenerateDigest},
    errors::CryptoError,
    CustomResult,
};
use domain_types::types::EventPaymentSettings;
use error_stack::ResultExt;
use secrecy::{ExposeSecret, Secret};

/// Sign a payload on behalf of an event's billing identity.
///
/// The digest input is `sysid + subsysid + cert + payload` with no separators,
/// rendered as lowercase hex.
pub fn sign_payload(
    event: &EventPaymentSettings,
    cert: &Secret<String>,
    payload: &str,
) -> CustomResult<String, CryptoError> {
    let message = format!(
        "{}{}{}{}",
        event.sysid,
        event.subsysid,
        cert.expose_secret(),
        payload
    );
    Ok(hex::encode(
        crypto::Md5
            .generate_digest(message.as_bytes())
            .change_context(CryptoError::DigestFailed)?,
    ))
}

/// Recompute the signature over a received payload and compare it with the
/// transmitted one. Exact string comparison; a digest in the wrong case does
/// not verify.
pub fn verify_payload(
    event: &EventPaymentSettings,
    cert: &Secret<String>,
    payload: &str,
    signature: &str,
) -> CustomResult<bool, CryptoError> {
    let expected = sign_payload(event, cert, payload)?;
    Ok(expected == signature)
}

/// Split an envelope at the first `@` into `(signature, payload)`.
///
/// The payload half may itself contain `@` characters (hex digests never do),
/// so only the first occurrence separates. `None` when no separator exists.
pub fn split_envelope(envelope: &str) -> Option<(&str, &str)> {
    envelope.split_once('@')
}

/// Percent-decode the payload half of an envelope.
///
/// The query endpoints URL-encode the payload before signing the decoded
/// form, so decoding must happen before verification. `None` when the decoded
/// bytes are not valid UTF-8.
pub fn decode_payload(payload: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(payload).ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn event() -> EventPaymentSettings {
        EventPaymentSettings {
            enabled: true,
            title: "Test Conference".to_string(),
            sysid: "199".to_string(),
            subsysid: "01".to_string(),
            feeitemid: "20230001".to_string(),
        }
    }

    fn cert() -> Secret<String> {
        Secret::new("sjtu-shared-secret".to_string())
    }

    #[test]
    fn signature_is_deterministic_lowercase_hex() {
        let first = sign_payload(&event(), &cert(), "<billinfo/>").unwrap();
        let second = sign_payload(&event(), &cert(), "<billinfo/>").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn every_component_contributes_to_the_signature() {
        let base = sign_payload(&event(), &cert(), "payload").unwrap();

        let mut other_sysid = event();
        other_sysid.sysid = "200".to_string();
        assert_ne!(sign_payload(&other_sysid, &cert(), "payload").unwrap(), base);

        let mut other_subsysid = event();
        other_subsysid.subsysid = "02".to_string();
        assert_ne!(
            sign_payload(&other_subsysid, &cert(), "payload").unwrap(),
            base
        );

        let other_cert = Secret::new("another-secret".to_string());
        assert_ne!(sign_payload(&event(), &other_cert, "payload").unwrap(), base);

        assert_ne!(sign_payload(&event(), &cert(), "payloae").unwrap(), base);
    }

    #[test]
    fn verify_accepts_matching_and_rejects_tampered() {
        let signature = sign_payload(&event(), &cert(), "<payResult/>").unwrap();
        assert!(verify_payload(&event(), &cert(), "<payResult/>", &signature).unwrap());
        assert!(!verify_payload(&event(), &cert(), "<payResult2/>", &signature).unwrap());
        assert!(!verify_payload(&event(), &cert(), "<payResult/>", &signature.to_uppercase())
            .unwrap());
    }

    #[test]
    fn envelope_splits_at_the_first_separator() {
        assert_eq!(
            split_envelope("abc123@<data attr=\"x@y\"/>"),
            Some(("abc123", "<data attr=\"x@y\"/>"))
        );
        assert_eq!(split_envelope("@payload"), Some(("", "payload")));
        assert_eq!(split_envelope("no separator here"), None);
    }

    #[test]
    fn payload_decoding() {
        assert_eq!(
            decode_payload("%3Cbillinfo%3E%E4%BC%9A%E8%AE%AE%3C%2Fbillinfo%3E").unwrap(),
            "<billinfo>会议</billinfo>"
        );
        // decoded bytes must form valid UTF-8
        assert!(decode_payload("%FF%FE").is_none());
    }
}
