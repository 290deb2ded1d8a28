//! Error types for the credit account summarizer.

use thiserror::Error;

/// Result type alias for summarizer operations
pub type Result<T> = std::result::Result<T, SummaryError>;

/// Errors that can occur while summarizing a credit account.
///
/// Every variant aborts the whole summarization; callers only ever see the
/// message, rendered as `Error: <message>`.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not a well-formed JSON document
    #[error("malformed input: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent from the document or an event record
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// A numeric field could not be coerced to an integer
    #[error("invalid integer for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// A field has the wrong JSON shape (e.g. an object where an id is expected)
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// Event type tag outside the known vocabulary
    #[error("invalid transaction type: {0}")]
    InvalidKind(String),

    /// Credit limit is zero or negative
    #[error("Invalid credit limit: {0}")]
    InvalidConfig(i64),

    /// An opening event reused an id that was already opened once
    #[error("Repeated transaction id: {0}")]
    DuplicateId(String),

    /// Authorization larger than the available credit
    #[error("Transaction cannot be authorized due to insufficient funds: {0}")]
    InsufficientCredit(String),

    /// Payment initiation larger than the payable balance
    #[error("Payment transaction not allowed as it is greater than payable amount: {0}")]
    PaymentExceedsBalance(String),

    /// Applying the transaction would overflow a 64-bit balance
    #[error("Amount overflow while applying transaction: {0}")]
    AmountOverflow(String),

    /// Resolving event without a pending counterpart
    #[error("Could not find the pending txn for a settled txn: {0}")]
    NoPendingMatch(String),

    /// Resolving event whose class differs from its pending counterpart
    #[error("Class mismatch between settled {0} and pending txn {0}.")]
    ClassMismatch(String),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: credit-summary <input.json>")]
    MissingArgument,
}
