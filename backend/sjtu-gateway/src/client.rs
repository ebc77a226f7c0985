//! Client for the gateway's portal endpoints.
//!
//! Every outbound call is signed with the caller's event identity and every
//! response travels as a `signature@payload` envelope. Failures of any kind
//! (transport, missing separator, bad signature, malformed XML, non-success
//! return code) are normalized to `None` so callers degrade to "payment not
//! confirmed" instead of surfacing a fault.

use std::borrow::Cow;

use common_utils::{
    ext_traits::Encode,
    request::{Method, Request, RequestBuilder, RequestContent},
};
use domain_types::{
    types::{EventPaymentSettings, PaymentSettings, Proxy},
    BillNumber,
};
use external_services::service::call_gateway_api;
use serde::de::DeserializeOwned;

use crate::{
    consts, envelope,
    transformers::{PayQueryResponse, RefundInfo, RefundResult, TicketQueryResponse},
    xml,
};

pub struct SjtuGateway {
    settings: PaymentSettings,
    proxy: Proxy,
}

/// Query-string parameters of the billno-keyed GET endpoints. The signature
/// covers the bill number alone.
#[derive(Debug, serde::Serialize)]
struct SignedBillnoParams<'a> {
    sign: String,
    sysid: &'a str,
    subsysid: &'a str,
    billno: &'a str,
}

/// Form parameters of the data-carrying POST endpoints. The signature covers
/// the full XML payload in `data`.
#[derive(Debug, serde::Serialize)]
struct SignedDataParams<'a> {
    sign: String,
    sysid: &'a str,
    subsysid: &'a str,
    data: String,
}

impl SjtuGateway {
    pub fn new(settings: PaymentSettings, proxy: Proxy) -> Self {
        Self { settings, proxy }
    }

    /// Ask the gateway for the payment state of a bill number.
    ///
    /// `None` covers both failure and "nothing to report": transport errors,
    /// a broken envelope and a non-`"0000"` return code all look the same to
    /// the caller, which treats them as payment-not-confirmed.
    pub async fn pay_query(
        &self,
        event: &EventPaymentSettings,
        billno: &BillNumber,
    ) -> Option<PayQueryResponse> {
        let response: PayQueryResponse = self
            .signed_billno_query(event, billno, consts::PAY_QUERY_PATH)
            .await?;
        if response.returncode != consts::RETURN_CODE_SUCCESS {
            tracing::warn!(
                returncode = %response.returncode,
                returnmsg = ?response.returnmsg,
                billno = %billno,
                "PayQuery returned a non-success code"
            );
            return None;
        }
        Some(response)
    }

    /// Fetch the electronic invoice records issued for a bill number.
    pub async fn ticket_query(
        &self,
        event: &EventPaymentSettings,
        billno: &BillNumber,
    ) -> Option<TicketQueryResponse> {
        let response: TicketQueryResponse = self
            .signed_billno_query(event, billno, consts::TICKET_QUERY_PATH)
            .await?;
        if response.returncode != consts::RETURN_CODE_SUCCESS {
            tracing::warn!(
                returncode = %response.returncode,
                returnmsg = ?response.returnmsg,
                billno = %billno,
                "TicketQuery returned a non-success code"
            );
            return None;
        }
        Some(response)
    }

    /// Submit a refund request. The refund XML travels GBK-declared inside
    /// the signed `data` form field; the response envelope payload is not
    /// URL-encoded on this endpoint.
    pub async fn refund(
        &self,
        event: &EventPaymentSettings,
        refund: RefundInfo,
    ) -> Option<RefundResult> {
        let xml_body = match quick_xml::se::to_string_with_root("refundinfo", &refund) {
            Ok(xml_body) => xml_body,
            Err(error) => {
                tracing::warn!(error = ?error, "Failed to serialize the refund request");
                return None;
            }
        };
        let data = format!("{}{}", consts::XML_DECLARATION_GBK, xml_body);
        let sign = match envelope::sign_payload(event, &self.settings.cert, &data) {
            Ok(sign) => sign,
            Err(error) => {
                tracing::warn!(error = ?error, "Failed to sign the refund request");
                return None;
            }
        };
        let params = SignedDataParams {
            sign,
            sysid: &event.sysid,
            subsysid: &event.subsysid,
            data,
        };
        let form = match params.encode_to_value() {
            Ok(form) => form,
            Err(error) => {
                tracing::warn!(error = ?error, "Failed to encode the refund form");
                return None;
            }
        };
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&self.endpoint(consts::APP_REFUND_PATH))
            .set_body(RequestContent::FormUrlEncoded(form))
            .build();
        let body = self.send(request).await?;
        self.open_envelope(event, &body, false)
    }

    /// GET a billno-keyed endpoint with signed query parameters and open the
    /// URL-encoded response envelope.
    async fn signed_billno_query<T: DeserializeOwned>(
        &self,
        event: &EventPaymentSettings,
        billno: &BillNumber,
        path: &str,
    ) -> Option<T> {
        let sign = match envelope::sign_payload(event, &self.settings.cert, billno.as_str()) {
            Ok(sign) => sign,
            Err(error) => {
                tracing::warn!(error = ?error, "Failed to sign the query parameters");
                return None;
            }
        };
        let params = SignedBillnoParams {
            sign,
            sysid: &event.sysid,
            subsysid: &event.subsysid,
            billno: billno.as_str(),
        };
        let query = match serde_urlencoded::to_string(&params) {
            Ok(query) => query,
            Err(error) => {
                tracing::warn!(error = ?error, "Failed to encode the query parameters");
                return None;
            }
        };
        let request = RequestBuilder::new()
            .method(Method::Get)
            .url(&format!("{}?{}", self.endpoint(path), query))
            .build();
        let body = self.send(request).await?;
        self.open_envelope(event, &body, true)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: Request) -> Option<String> {
        match call_gateway_api(&self.proxy, request).await {
            Ok(Ok(response)) => match String::from_utf8(response.response.to_vec()) {
                Ok(body) => Some(body),
                Err(error) => {
                    tracing::warn!(error = ?error, "Gateway response body is not valid UTF-8");
                    None
                }
            },
            Ok(Err(response)) => {
                tracing::warn!(
                    status_code = response.status_code,
                    "Gateway responded with an error status"
                );
                None
            }
            Err(error) => {
                tracing::warn!(error = ?error, "Gateway call failed");
                None
            }
        }
    }

    /// Split, optionally URL-decode, verify and parse a response envelope.
    /// An unverified payload never reaches the XML parser.
    fn open_envelope<T: DeserializeOwned>(
        &self,
        event: &EventPaymentSettings,
        body: &str,
        url_decode: bool,
    ) -> Option<T> {
        let (signature, payload) = match envelope::split_envelope(body) {
            Some(parts) => parts,
            None => {
                tracing::warn!("Gateway response has no envelope separator");
                return None;
            }
        };
        let payload = if url_decode {
            match envelope::decode_payload(payload) {
                Some(payload) => payload,
                None => {
                    tracing::warn!("Gateway response payload failed URL decoding");
                    return None;
                }
            }
        } else {
            Cow::Borrowed(payload)
        };
        let verified = envelope::verify_payload(event, &self.settings.cert, &payload, signature)
            .unwrap_or(false);
        if !verified {
            tracing::warn!("Gateway response failed signature verification");
            return None;
        }
        match xml::parse_payload(&payload) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(error = ?error, "Gateway response payload is not parseable");
                None
            }
        }
    }
}
