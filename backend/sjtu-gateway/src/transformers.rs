//! Wire types for the gateway's XML payloads.
//!
//! Every payload travels inside a signed envelope (see [`crate::envelope`]);
//! the structures here are the decoded halves. Field names mirror the
//! gateway's tags, which are fixed protocol surface.

use common_utils::types::StringMajorUnit;
use domain_types::{BillNumber, PaymentResult};
use serde::{Deserialize, Serialize};

/// Payload of the success redirect: the `data` request parameter holds this
/// XML, signed as the raw string.
#[derive(Debug, Clone, Deserialize)]
pub struct PayResult {
    pub billno: BillNumber,
    pub billamt: StringMajorUnit,
    pub trade_no: String,
}

impl From<PayResult> for PaymentResult {
    fn from(result: PayResult) -> Self {
        Self {
            billno: result.billno,
            billamt: result.billamt,
            trade_no: result.trade_no,
        }
    }
}

/// Response payload of `Query_PayQuery.action`.
#[derive(Debug, Clone, Deserialize)]
pub struct PayQueryResponse {
    pub returncode: String,
    #[serde(default)]
    pub returnmsg: Option<String>,
    #[serde(default)]
    pub billdtls: Option<BillDetails>,
}

impl PayQueryResponse {
    /// Bill-detail entries, empty when the gateway sent none.
    pub fn entries(&self) -> &[BillDetail] {
        self.billdtls
            .as_ref()
            .map(|details| details.billdtl.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillDetails {
    #[serde(default)]
    pub billdtl: Vec<BillDetail>,
}

/// One settled (or pending) bill as the gateway reports it. `paystate` is the
/// gateway's numeric payment state; 4 means paid.
#[derive(Debug, Clone, Deserialize)]
pub struct BillDetail {
    pub billno: BillNumber,
    pub billamt: StringMajorUnit,
    pub trade_no: String,
    pub paystate: i32,
}

impl From<BillDetail> for PaymentResult {
    fn from(detail: BillDetail) -> Self {
        Self {
            billno: detail.billno,
            billamt: detail.billamt,
            trade_no: detail.trade_no,
        }
    }
}

/// Response payload of `TicketQuery.action`.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketQueryResponse {
    pub returncode: String,
    #[serde(default)]
    pub returnmsg: Option<String>,
    #[serde(default)]
    pub tickets: Option<Tickets>,
}

impl TicketQueryResponse {
    pub fn entries(&self) -> &[Ticket] {
        self.tickets
            .as_ref()
            .map(|tickets| tickets.ticket.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tickets {
    #[serde(default)]
    pub ticket: Vec<Ticket>,
}

/// An electronic invoice record for a paid bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticketno: String,
    pub billno: String,
    #[serde(default)]
    pub ticketdate: Option<String>,
    #[serde(default)]
    pub ticketurl: Option<String>,
}

/// Refund request payload, serialized with root `refundinfo` and carried in
/// the signed `data` form field of `appRefund.action`.
#[derive(Debug, Clone, Serialize)]
pub struct RefundInfo {
    pub billno: BillNumber,
    /// Amount to refund, the major-unit decimal string that was paid
    pub billamt: StringMajorUnit,
    pub feeitemid: String,
    pub reason: String,
}

/// Response payload of `appRefund.action`. `refundState` is `"1"` on
/// acceptance; any other value carries the gateway's message in `msg`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundResult {
    #[serde(rename = "refundState")]
    pub refund_state: String,
    #[serde(default)]
    pub msg: Option<String>,
}

impl RefundResult {
    pub fn is_success(&self) -> bool {
        self.refund_state == crate::consts::REFUND_STATE_SUCCESS
    }

    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use common_enums::Currency;
    use common_utils::types::{AmountConvertor, MinorUnit, StringMajorUnitForConnector};
    use uuid::Uuid;

    use super::*;
    use crate::xml::parse_payload;

    #[test]
    fn parses_a_success_redirect_payload() {
        let token = Uuid::new_v4();
        let billno = BillNumber::from_token(token);
        let xml = format!(
            "<payResult><billno>{billno}</billno><billamt>100.00</billamt>\
             <trade_no>2023112800001</trade_no></payResult>"
        );
        let parsed: PayResult = parse_payload(&xml).unwrap();
        assert_eq!(parsed.billno.token().unwrap(), token);
        assert_eq!(parsed.billamt.get_amount_as_string(), "100.00");
        assert_eq!(parsed.trade_no, "2023112800001");
    }

    #[test]
    fn parses_a_pay_query_response_with_details() {
        let billno = BillNumber::from_token(Uuid::new_v4());
        let xml = format!(
            "<queryResult><returncode>0000</returncode><returnmsg>ok</returnmsg>\
             <billdtls>\
             <billdtl><billno>{billno}</billno><billamt>100.00</billamt>\
             <trade_no>T1</trade_no><paystate>4</paystate></billdtl>\
             <billdtl><billno>{billno}</billno><billamt>100.00</billamt>\
             <trade_no>T2</trade_no><paystate>1</paystate></billdtl>\
             </billdtls></queryResult>"
        );
        let parsed: PayQueryResponse = parse_payload(&xml).unwrap();
        assert_eq!(parsed.returncode, "0000");
        assert_eq!(parsed.entries().len(), 2);
        assert_eq!(parsed.entries()[0].paystate, 4);
        assert_eq!(parsed.entries()[1].trade_no, "T2");
    }

    #[test]
    fn pay_query_response_without_details_has_no_entries() {
        let parsed: PayQueryResponse =
            parse_payload("<queryResult><returncode>3001</returncode></queryResult>").unwrap();
        assert_eq!(parsed.returncode, "3001");
        assert!(parsed.entries().is_empty());
    }

    #[test]
    fn parses_a_ticket_query_response() {
        let xml = "<ticketResult><returncode>0000</returncode><tickets>\
                   <ticket><ticketno>TK01</ticketno><billno>abc</billno>\
                   <ticketdate>2023-11-28</ticketdate>\
                   <ticketurl>https://example.invalid/tk01.pdf</ticketurl></ticket>\
                   </tickets></ticketResult>";
        let parsed: TicketQueryResponse = parse_payload(xml).unwrap();
        assert_eq!(parsed.entries().len(), 1);
        assert_eq!(parsed.entries()[0].ticketno, "TK01");
        assert_eq!(parsed.entries()[0].ticketdate.as_deref(), Some("2023-11-28"));
    }

    #[test]
    fn refund_result_state_mapping() {
        let accepted: RefundResult =
            parse_payload("<refundresult><refundState>1</refundState></refundresult>").unwrap();
        assert!(accepted.is_success());
        assert_eq!(accepted.message(), "");

        let rejected: RefundResult = parse_payload(
            "<refundresult><refundState>0</refundState><msg>不可退款</msg></refundresult>",
        )
        .unwrap();
        assert!(!rejected.is_success());
        assert_eq!(rejected.message(), "不可退款");
    }

    #[test]
    fn refund_request_serializes_with_its_root() {
        let refund = RefundInfo {
            billno: BillNumber::from_token(Uuid::nil()),
            billamt: StringMajorUnitForConnector
                .convert(MinorUnit::new(10000), Currency::CNY)
                .unwrap(),
            feeitemid: "20230001".to_string(),
            reason: "注册费退款".to_string(),
        };
        let xml = quick_xml::se::to_string_with_root("refundinfo", &refund).unwrap();
        assert!(xml.starts_with("<refundinfo>"));
        assert!(xml.contains("<billamt>100.00</billamt>"));
        assert!(xml.contains("<reason>注册费退款</reason>"));
        assert!(xml.ends_with("</refundinfo>"));
    }
}
