//! Protocol constants fixed by the SJTU Pay gateway

/// Provider tag recorded on transactions created by this integration
pub const PROVIDER_NAME: &str = "sjtu";

/// Return code marking a successful query response
pub const RETURN_CODE_SUCCESS: &str = "0000";

/// `paystate` value marking a bill detail as paid
pub const PAYSTATE_PAID: i32 = 4;

/// `refundState` value marking a refund as accepted
pub const REFUND_STATE_SUCCESS: &str = "1";

/// Fixed reason carried on every refund request
pub const REFUND_REASON: &str = "注册费退款";

/// Placeholder the gateway accepts for the unused order-info number field
pub const ORDER_INFO_NO: &str = "...";

/// Unit label on the single fee line of every bill
pub const BILL_DETAIL_UNIT: &str = "项";

/// Declaration prefixed to outbound XML payloads. The gateway expects a GBK
/// declaration even though payloads travel base64/form encoded as UTF-8.
pub const XML_DECLARATION_GBK: &str = "<?xml version=\"1.0\" encoding=\"GBK\"?>";

/// Path of the payment status query endpoint
pub const PAY_QUERY_PATH: &str = "/portal/Query_PayQuery.action";

/// Path of the ticket (electronic invoice) query endpoint
pub const TICKET_QUERY_PATH: &str = "/payment_dzp/portal/TicketQuery.action";

/// Path of the refund endpoint
pub const APP_REFUND_PATH: &str = "/portal/appRefund.action";
