/// The three-letter ISO 4217 currency code (e.g., "CNY", "USD") an event bills
/// its registrations in.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    AUD,
    CAD,
    CHF,
    #[default]
    CNY,
    EUR,
    GBP,
    HKD,
    JPY,
    KRW,
    MYR,
    NZD,
    SGD,
    THB,
    TWD,
    USD,
    VND,
}

impl Currency {
    pub fn is_zero_decimal_currency(self) -> bool {
        matches!(self, Self::JPY | Self::KRW | Self::VND)
    }

    pub fn number_of_digits_after_decimal_point(self) -> u8 {
        if self.is_zero_decimal_currency() {
            0
        } else {
            2
        }
    }
}

/// Lifecycle state of a registration on the host platform. Payment outcomes
/// move a registration between `Unpaid`, `Pending` and `Complete`; managers
/// can reject or withdraw one out of band.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegistrationState {
    #[default]
    Unpaid,
    Complete,
    Pending,
    Rejected,
    Withdrawn,
}

/// Final status stored on a recorded payment transaction.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Successful,
    Cancelled,
    Failed,
    Pending,
}

/// What a recorded transaction does to its registration.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionAction {
    Complete,
    Reject,
    Pending,
}

impl TransactionAction {
    pub fn transaction_status(self) -> TransactionStatus {
        match self {
            Self::Complete => TransactionStatus::Successful,
            Self::Reject => TransactionStatus::Failed,
            Self::Pending => TransactionStatus::Pending,
        }
    }

    pub fn registration_state(self) -> RegistrationState {
        match self {
            Self::Complete => RegistrationState::Complete,
            Self::Reject => RegistrationState::Rejected,
            Self::Pending => RegistrationState::Pending,
        }
    }
}

/// Severity of a flash message surfaced on the host platform's registration
/// page after a redirect.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_decimal_digits() {
        assert_eq!(Currency::CNY.number_of_digits_after_decimal_point(), 2);
        assert_eq!(Currency::JPY.number_of_digits_after_decimal_point(), 0);
        assert_eq!(Currency::KRW.number_of_digits_after_decimal_point(), 0);
        assert_eq!(Currency::USD.number_of_digits_after_decimal_point(), 2);
    }

    #[test]
    fn action_maps_to_states() {
        assert_eq!(
            TransactionAction::Complete.registration_state(),
            RegistrationState::Complete
        );
        assert_eq!(
            TransactionAction::Reject.registration_state(),
            RegistrationState::Rejected
        );
        assert_eq!(
            TransactionAction::Pending.transaction_status(),
            TransactionStatus::Pending
        );
    }
}
