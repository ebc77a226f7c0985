//! Verification gates applied to gateway payment results before anything is
//! recorded.

use common_utils::types::{AmountConvertor, StringMajorUnit, StringMajorUnitForConnector};
use domain_types::Registration;
use sjtu_gateway::consts::{PAYSTATE_PAID, PROVIDER_NAME};

/// The reported amount must equal the registration fee exactly. Comparison
/// happens on minor units after a lossless decimal conversion, so `100.0`
/// and `100.00` are equal but `99.99` and `100.001` are not.
pub fn verify_amount(registration: &Registration, billamt: &StringMajorUnit) -> bool {
    match StringMajorUnitForConnector.convert_back(billamt.clone(), registration.currency) {
        Ok(paid) if paid == registration.price => true,
        Ok(paid) => {
            tracing::warn!(
                expected = %registration.price,
                received = %paid,
                currency = %registration.currency,
                "Reported amount does not match the registration fee"
            );
            false
        }
        Err(error) => {
            tracing::warn!(
                ?error,
                received = %billamt.get_amount_as_string(),
                "Reported amount is not a usable decimal"
            );
            false
        }
    }
}

/// A result is a duplicate when the registration already carries an SJTU
/// transaction with the same trade number.
pub fn is_duplicate(registration: &Registration, trade_no: &str) -> bool {
    registration
        .transaction
        .as_ref()
        .filter(|transaction| transaction.provider == PROVIDER_NAME)
        .and_then(|transaction| transaction.trade_no())
        .map(|existing| existing == trade_no)
        .unwrap_or(false)
}

pub fn is_payment_state_paid(paystate: i32) -> bool {
    paystate == PAYSTATE_PAID
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use common_enums::{Currency, RegistrationState, TransactionStatus};
    use common_utils::types::MinorUnit;
    use domain_types::Transaction;
    use uuid::Uuid;

    use super::*;

    fn registration(transaction: Option<Transaction>) -> Registration {
        Registration {
            token: Uuid::new_v4(),
            event_id: 7,
            registration_form_id: 3,
            first_name: "Wei".to_string(),
            last_name: "Chen".to_string(),
            email: "wei.chen@example.com".to_string(),
            price: MinorUnit::new(10000),
            currency: Currency::CNY,
            state: RegistrationState::Unpaid,
            transaction,
        }
    }

    fn transaction(provider: &str, trade_no: &str) -> Transaction {
        Transaction {
            provider: provider.to_string(),
            amount: MinorUnit::new(10000),
            currency: Currency::CNY,
            status: TransactionStatus::Successful,
            data: serde_json::json!({ "trade_no": trade_no }),
            recorded_at: common_utils::date_time::now(),
        }
    }

    fn major(amount: &str) -> StringMajorUnit {
        serde_json::from_str(&format!("\"{amount}\"")).unwrap()
    }

    #[test]
    fn amount_must_match_exactly() {
        let registration = registration(None);

        assert!(verify_amount(&registration, &major("100.00")));
        assert!(verify_amount(&registration, &major("100.0")));
        assert!(!verify_amount(&registration, &major("99.00")));
        assert!(!verify_amount(&registration, &major("100.01")));
        assert!(!verify_amount(&registration, &major("not-a-number")));
    }

    #[test]
    fn sub_minor_precision_is_rejected() {
        let registration = registration(None);

        assert!(!verify_amount(&registration, &major("100.001")));
    }

    #[test]
    fn duplicate_requires_same_provider_and_trade_no() {
        assert!(is_duplicate(
            &registration(Some(transaction("sjtu", "2023X1"))),
            "2023X1"
        ));
        assert!(!is_duplicate(
            &registration(Some(transaction("sjtu", "2023X1"))),
            "2023X2"
        ));
        assert!(!is_duplicate(
            &registration(Some(transaction("paypal", "2023X1"))),
            "2023X1"
        ));
        assert!(!is_duplicate(&registration(None), "2023X1"));
    }

    #[test]
    fn paystate_four_is_the_only_paid_state() {
        assert!(is_payment_state_paid(4));
        assert!(!is_payment_state_paid(1));
        assert!(!is_payment_state_paid(0));
        assert!(!is_payment_state_paid(5));
    }
}
