//! Event records as read from JSON, and the transaction models built from them.

use crate::amount::Amount;
use crate::error::{Result, SummaryError};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Raw event record as read from the input document.
///
/// Every field is kept as an untyped JSON value so that missing fields and
/// numeric coercion are reported with our own messages rather than serde's.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    /// Event type tag, e.g. `TXN_AUTHED`
    #[serde(rename = "eventType", default)]
    pub event_type: Option<Value>,

    /// Transaction id shared by an opening event and its resolution
    #[serde(rename = "txnId", default)]
    pub txn_id: Option<Value>,

    /// Event timestamp, used only for ordering
    #[serde(rename = "eventTime", default)]
    pub event_time: Option<Value>,

    /// Amount (required for openers, optional otherwise)
    #[serde(default)]
    pub amount: Option<Value>,
}

impl EventRecord {
    /// Parses the raw record into a typed event.
    pub fn parse(&self) -> Result<Event> {
        let kind = match self.event_type.as_ref() {
            Some(Value::String(tag)) => tag.parse::<EventKind>()?,
            Some(other) => return Err(SummaryError::InvalidKind(other.to_string())),
            None => return Err(SummaryError::MissingField { field: "eventType" }),
        };

        let id = match self.txn_id.as_ref() {
            Some(Value::String(id)) => TxnId::Text(id.clone()),
            Some(Value::Number(n)) => TxnId::Number(n.clone()),
            Some(other) => {
                return Err(SummaryError::InvalidField {
                    field: "txnId",
                    value: other.to_string(),
                })
            }
            None => return Err(SummaryError::MissingField { field: "txnId" }),
        };

        let time = match self.event_time.as_ref() {
            Some(value) => coerce_int("eventTime", value)?,
            None => return Err(SummaryError::MissingField { field: "eventTime" }),
        };

        let amount = self
            .amount
            .as_ref()
            .map(|value| coerce_int("amount", value).map(Amount::new))
            .transpose()?;

        if kind.requires_amount() && amount.is_none() {
            return Err(SummaryError::MissingField { field: "amount" });
        }

        Ok(Event {
            kind,
            id,
            time,
            amount,
        })
    }
}

/// Coerces a JSON value to an integer.
///
/// Integers pass through, floats truncate toward zero, strings are trimmed
/// and parsed, booleans become 1 or 0. Anything else is rejected.
pub fn coerce_int(field: &'static str, value: &Value) -> Result<i64> {
    let invalid = || SummaryError::InvalidNumber {
        field,
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64().map(f64::trunc) {
                // 2^63 is exactly representable, so `<` excludes the first overflow
                Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err(invalid()),
    }
}

/// Transaction id as it appeared in the input.
///
/// Text and numeric ids are distinct: `"42"` and `42` name different
/// transactions even though both render as `42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TxnId {
    Text(String),
    Number(Number),
}

impl From<&str> for TxnId {
    fn from(id: &str) -> Self {
        TxnId::Text(id.to_string())
    }
}

impl From<String> for TxnId {
    fn from(id: String) -> Self {
        TxnId::Text(id)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnId::Text(id) => f.write_str(id),
            TxnId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// The higher-level class of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionClass {
    /// Card purchases: authorization, settlement, clearance.
    Credit,

    /// Payments toward the payable balance: initiation, posting, cancellation.
    Payment,
}

/// Event kinds, one per lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Hold placed against available credit.
    Authorized,

    /// Final posting of an authorized purchase.
    Settled,

    /// Release of an authorization hold without settlement.
    AuthCleared,

    /// Pending payment against the payable balance.
    PaymentInitiated,

    /// Finalization of a payment.
    PaymentPosted,

    /// Reversal of a payment initiation.
    PaymentCanceled,
}

impl EventKind {
    /// Returns the class this kind belongs to.
    pub fn class(self) -> TransactionClass {
        match self {
            EventKind::Authorized | EventKind::Settled | EventKind::AuthCleared => {
                TransactionClass::Credit
            }
            EventKind::PaymentInitiated | EventKind::PaymentPosted | EventKind::PaymentCanceled => {
                TransactionClass::Payment
            }
        }
    }

    /// Returns `true` for kinds that open a pending transaction.
    pub fn is_opening(self) -> bool {
        matches!(self, EventKind::Authorized | EventKind::PaymentInitiated)
    }

    /// Returns `true` for kinds that must carry their own amount.
    pub fn requires_amount(self) -> bool {
        self.is_opening()
    }

    /// The wire tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            EventKind::Authorized => "TXN_AUTHED",
            EventKind::Settled => "TXN_SETTLED",
            EventKind::AuthCleared => "TXN_AUTH_CLEARED",
            EventKind::PaymentInitiated => "PAYMENT_INITIATED",
            EventKind::PaymentPosted => "PAYMENT_POSTED",
            EventKind::PaymentCanceled => "PAYMENT_CANCELED",
        }
    }
}

impl FromStr for EventKind {
    type Err = SummaryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "TXN_AUTHED" => Ok(EventKind::Authorized),
            "TXN_SETTLED" => Ok(EventKind::Settled),
            "TXN_AUTH_CLEARED" => Ok(EventKind::AuthCleared),
            "PAYMENT_INITIATED" => Ok(EventKind::PaymentInitiated),
            "PAYMENT_POSTED" => Ok(EventKind::PaymentPosted),
            "PAYMENT_CANCELED" => Ok(EventKind::PaymentCanceled),
            other => Err(SummaryError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A parsed and validated event ready for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,

    pub id: TxnId,

    /// Ordering timestamp
    pub time: i64,

    /// Own amount, if the record carried one
    pub amount: Option<Amount>,
}

impl Event {
    pub fn new(kind: EventKind, id: impl Into<TxnId>, time: i64, amount: Option<i64>) -> Self {
        Event {
            kind,
            id: id.into(),
            time,
            amount: amount.map(Amount::new),
        }
    }
}

/// An authorization or payment initiation awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    pub id: TxnId,
    pub class: TransactionClass,
    pub amount: Amount,

    /// Time the transaction was opened
    pub time: i64,
}

impl fmt::Display for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} @ time {}", self.id, self.amount, self.time)
    }
}

/// A settled purchase or posted payment.
///
/// The amount is always the one the transaction was opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettledTransaction {
    pub id: TxnId,
    pub class: TransactionClass,
    pub amount: Amount,

    /// Time the transaction was opened
    pub initial_time: i64,

    /// Time the transaction was finalized
    pub time: i64,
}

impl SettledTransaction {
    /// Finalizes a pending transaction at the resolving event's time.
    pub fn finalize(pending: PendingTransaction, resolved_at: i64) -> Self {
        SettledTransaction {
            id: pending.id,
            class: pending.class,
            amount: pending.amount,
            initial_time: pending.time,
            time: resolved_at,
        }
    }
}

impl fmt::Display for SettledTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} @ time {} (finalized @ time {})",
            self.id, self.amount, self.initial_time, self.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EventRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_authorization() {
        let event = record(json!({
            "eventType": "TXN_AUTHED",
            "txnId": "t1",
            "eventTime": 1,
            "amount": 123
        }))
        .parse()
        .unwrap();

        assert_eq!(event.kind, EventKind::Authorized);
        assert_eq!(event.id, TxnId::from("t1"));
        assert_eq!(event.time, 1);
        assert_eq!(event.amount, Some(Amount::new(123)));
    }

    #[test]
    fn test_parse_clearance_without_amount() {
        let event = record(json!({
            "eventType": "TXN_AUTH_CLEARED",
            "txnId": "t1",
            "eventTime": 2
        }))
        .parse()
        .unwrap();

        assert_eq!(event.kind, EventKind::AuthCleared);
        assert_eq!(event.amount, None);
    }

    #[test]
    fn test_parse_coerces_numeric_strings_and_floats() {
        let event = record(json!({
            "eventType": "PAYMENT_INITIATED",
            "txnId": "p1",
            "eventTime": " 7 ",
            "amount": -20.9
        }))
        .parse()
        .unwrap();

        assert_eq!(event.time, 7);
        assert_eq!(event.amount, Some(Amount::new(-20)));
    }

    #[test]
    fn test_parse_numeric_txn_id() {
        let event = record(json!({
            "eventType": "TXN_AUTHED",
            "txnId": 42,
            "eventTime": 1,
            "amount": 1
        }))
        .parse()
        .unwrap();

        assert_eq!(event.id, TxnId::Number(Number::from(42)));
        assert_eq!(event.id.to_string(), "42");
        assert_ne!(event.id, TxnId::from("42"));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = record(json!({
            "eventType": "txn_authed",
            "txnId": "t1",
            "eventTime": 1,
            "amount": 1
        }))
        .parse()
        .unwrap_err();

        assert_eq!(err.to_string(), "invalid transaction type: txn_authed");
    }

    #[test]
    fn test_parse_rejects_missing_amount_for_opener() {
        let err = record(json!({
            "eventType": "PAYMENT_INITIATED",
            "txnId": "p1",
            "eventTime": 1
        }))
        .parse()
        .unwrap_err();

        assert!(matches!(err, SummaryError::MissingField { field: "amount" }));
    }

    #[test]
    fn test_parse_rejects_missing_time() {
        let err = record(json!({"eventType": "TXN_SETTLED", "txnId": "t1"}))
            .parse()
            .unwrap_err();

        assert!(matches!(err, SummaryError::MissingField { field: "eventTime" }));
    }

    #[test]
    fn test_parse_rejects_non_numeric_amount() {
        let err = record(json!({
            "eventType": "TXN_AUTHED",
            "txnId": "t1",
            "eventTime": 1,
            "amount": "ten"
        }))
        .parse()
        .unwrap_err();

        assert!(matches!(err, SummaryError::InvalidNumber { field: "amount", .. }));
    }

    #[test]
    fn test_coerce_int_edge_values() {
        assert_eq!(coerce_int("x", &json!(true)).unwrap(), 1);
        assert_eq!(coerce_int("x", &json!(-3.7)).unwrap(), -3);
        assert!(coerce_int("x", &json!(null)).is_err());
        assert!(coerce_int("x", &json!([1])).is_err());
        assert!(coerce_int("x", &json!(u64::MAX)).is_err());
        assert!(coerce_int("x", &json!("1.5")).is_err());
    }

    #[test]
    fn test_kind_classes() {
        assert_eq!(EventKind::Authorized.class(), TransactionClass::Credit);
        assert_eq!(EventKind::Settled.class(), TransactionClass::Credit);
        assert_eq!(EventKind::AuthCleared.class(), TransactionClass::Credit);
        assert_eq!(EventKind::PaymentInitiated.class(), TransactionClass::Payment);
        assert_eq!(EventKind::PaymentPosted.class(), TransactionClass::Payment);
        assert_eq!(EventKind::PaymentCanceled.class(), TransactionClass::Payment);
    }

    #[test]
    fn test_transaction_display() {
        let pending = PendingTransaction {
            id: TxnId::from("p1"),
            class: TransactionClass::Payment,
            amount: Amount::new(-50),
            time: 3,
        };
        assert_eq!(pending.to_string(), "p1: -$50 @ time 3");

        let settled = SettledTransaction::finalize(pending, 9);
        assert_eq!(settled.to_string(), "p1: -$50 @ time 3 (finalized @ time 9)");
    }
}
