//! XML helpers for the gateway's payload bodies.

use common_utils::CustomResult;
use error_stack::ResultExt;
use interfaces::errors::GatewayError;
use serde::de::DeserializeOwned;

/// Drop a leading `<?xml ... ?>` declaration if one is present.
///
/// The gateway prefixes a GBK declaration to some payloads even though the
/// bytes on the wire are UTF-8; quick-xml would otherwise try to honour the
/// declared encoding.
pub fn strip_declaration(xml: &str) -> &str {
    let trimmed = xml.trim();
    if trimmed.starts_with("<?xml") {
        match trimmed.find("?>") {
            Some(pos) => trimmed[pos + 2..].trim(),
            None => trimmed,
        }
    } else {
        trimmed
    }
}

/// Deserialize a payload into a typed structure, declaration-tolerant.
pub fn parse_payload<T: DeserializeOwned>(xml: &str) -> CustomResult<T, GatewayError> {
    quick_xml::de::from_str(strip_declaration(xml))
        .change_context(GatewayError::ResponseDeserializationFailed)
        .attach_printable_lazy(|| format!("Failed to parse gateway payload: {xml}"))
}
