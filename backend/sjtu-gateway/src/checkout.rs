//! Builds the signed payload the host platform embeds in its payment form.
//!
//! The payer's browser posts this to the gateway's pay page; the gateway
//! verifies `payment_sign` over the `billinfo` XML, collects the money and
//! redirects back to `return_url` carrying a signed `payResult`.

use base64::Engine;
use common_utils::{
    consts::BASE64_ENGINE,
    types::{AmountConvertor, StringMajorUnit, StringMajorUnitForConnector},
    CustomResult,
};
use domain_types::{
    types::{EventPaymentSettings, PaymentSettings},
    BillNumber, Registration,
};
use error_stack::ResultExt;
use interfaces::errors::GatewayError;

use crate::{consts, envelope};

/// Everything the host's payment form needs to hand the payer over to the
/// gateway.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutForm {
    pub item_name: String,
    pub billno: BillNumber,
    pub return_url: String,
    pub query_url: String,
    /// The `billinfo` XML, GBK declaration prefixed, exactly as signed
    pub payment_data: String,
    pub payment_sign: String,
    pub query_sign: String,
    pub payment_data_base64: String,
}

/// The gateway's order payload. The paper-invoice header fields are part of
/// the schema; this integration always sends the no-invoice form, so they
/// serialize empty.
#[derive(Debug, serde::Serialize)]
struct BillInfo {
    billno: BillNumber,
    orderinfono: String,
    orderinfoname: String,
    #[serde(rename = "returnURL")]
    return_url: String,
    billremark: String,
    tax_code: String,
    zz_unit: String,
    zz_mobile: String,
    zz_email: String,
    type_no: String,
    billdtl: BillDetailLine,
}

#[derive(Debug, serde::Serialize)]
struct BillDetailLine {
    feeitemid: String,
    feeord: u32,
    amt: StringMajorUnit,
    dtlremark: String,
    unit: String,
}

pub fn build_checkout_form(
    settings: &PaymentSettings,
    event: &EventPaymentSettings,
    registration: &Registration,
    return_url: String,
    query_url: String,
) -> CustomResult<CheckoutForm, GatewayError> {
    let billno = BillNumber::from_token(registration.token);
    let amount = StringMajorUnitForConnector
        .convert(registration.price, registration.currency)
        .change_context(GatewayError::RequestEncodingFailed)?;

    let bill_info = BillInfo {
        billno: billno.clone(),
        orderinfono: consts::ORDER_INFO_NO.to_string(),
        orderinfoname: registration.full_name(),
        return_url: return_url.clone(),
        billremark: format!(
            "会议名称：{}，参会人员：{}",
            event.title,
            registration.full_name()
        ),
        tax_code: String::new(),
        zz_unit: String::new(),
        zz_mobile: String::new(),
        zz_email: String::new(),
        type_no: String::new(),
        billdtl: BillDetailLine {
            feeitemid: event.feeitemid.clone(),
            feeord: 1,
            amt: amount,
            dtlremark: String::new(),
            unit: consts::BILL_DETAIL_UNIT.to_string(),
        },
    };

    let xml_body = quick_xml::se::to_string_with_root("billinfo", &bill_info)
        .change_context(GatewayError::RequestEncodingFailed)
        .attach_printable("Failed to serialize the billinfo payload")?;
    let payment_data = format!("{}{}", consts::XML_DECLARATION_GBK, xml_body);

    let payment_sign = envelope::sign_payload(event, &settings.cert, &payment_data)
        .change_context(GatewayError::RequestEncodingFailed)?;
    let query_sign = envelope::sign_payload(event, &settings.cert, billno.as_str())
        .change_context(GatewayError::RequestEncodingFailed)?;
    let payment_data_base64 = BASE64_ENGINE.encode(payment_data.as_bytes());

    Ok(CheckoutForm {
        item_name: format!("{}: registration for {}", registration.full_name(), event.title),
        billno,
        return_url,
        query_url,
        payment_data,
        payment_sign,
        query_sign,
        payment_data_base64,
    })
}
