//! # Credit Summary
//!
//! Replays credit card lifecycle events (authorizations, settlements,
//! clearances, payment initiations, postings and cancellations) against a
//! single account and renders the resulting balances and transactions.
//!
//! ## Design Principles
//!
//! - **Integer amounts**: all money is signed integer minor units
//! - **Timestamp ordering**: events are stably sorted by time before replay
//! - **All or nothing**: the first invalid event aborts the whole summary
//! - **Permanent ids**: an id used to open a transaction is never reusable
//!
//! ## Example
//!
//! ```
//! let input = r#"{"creditLimit": 1000, "events": [
//!     {"eventType": "TXN_AUTHED", "txnId": "t1", "eventTime": 1, "amount": 200},
//!     {"eventType": "TXN_SETTLED", "txnId": "t1", "eventTime": 2}
//! ]}"#;
//!
//! let summary = credit_summary::summarize(input).unwrap();
//! assert!(summary.starts_with("Available credit: $800\nPayable balance: $200"));
//! ```

pub mod account;
pub mod amount;
pub mod document;
pub mod engine;
pub mod error;
pub mod summary;
pub mod transaction;

pub use account::CreditAccount;
pub use amount::Amount;
pub use document::AccountDocument;
pub use engine::CreditLedger;
pub use error::{Result, SummaryError};
pub use summary::{Summary, RECENT_SETTLED_LIMIT};
pub use transaction::{
    Event, EventKind, EventRecord, PendingTransaction, SettledTransaction, TransactionClass,
    TxnId,
};

/// Replays a document and returns its structured summary.
pub fn build_summary(document: AccountDocument) -> Result<Summary> {
    let ledger = document.into_ledger()?.process()?;
    Ok(Summary::from_ledger(&ledger))
}

/// Summarizes a JSON input document as text.
pub fn summarize(input: &str) -> Result<String> {
    let document = AccountDocument::from_json(input)?;
    Ok(build_summary(document)?.to_string())
}

/// Like [`summarize`], but renders a failure as `Error: <message>`.
pub fn summarize_or_error(input: &str) -> String {
    summarize(input).unwrap_or_else(|e| format!("Error: {}", e))
}
