//! The top-level input document: a credit limit and a list of events.

use crate::engine::CreditLedger;
use crate::error::{Result, SummaryError};
use crate::transaction::{coerce_int, Event, EventRecord};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

/// Input document as read from JSON.
///
/// ```json
/// {"creditLimit": 1000, "events": [{"eventType": "TXN_AUTHED", ...}]}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountDocument {
    #[serde(rename = "creditLimit", default)]
    pub credit_limit: Option<Value>,

    #[serde(default)]
    pub events: Option<Vec<EventRecord>>,
}

impl AccountDocument {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parses every event record, failing on the first malformed one.
    pub fn parse_events(&self) -> Result<Vec<Event>> {
        self.events
            .as_ref()
            .ok_or(SummaryError::MissingField { field: "events" })?
            .iter()
            .map(EventRecord::parse)
            .collect()
    }

    pub fn credit_limit(&self) -> Result<i64> {
        let value = self
            .credit_limit
            .as_ref()
            .ok_or(SummaryError::MissingField {
                field: "creditLimit",
            })?;
        coerce_int("creditLimit", value)
    }

    /// Builds an unprocessed ledger from this document.
    pub fn into_ledger(self) -> Result<CreditLedger> {
        let credit_limit = self.credit_limit()?;
        let events = self.parse_events()?;
        CreditLedger::new(credit_limit, events)
    }
}
