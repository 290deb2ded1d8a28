//! Point-in-time account summary and its text rendering.

use crate::amount::Amount;
use crate::engine::CreditLedger;
use crate::transaction::{PendingTransaction, SettledTransaction};
use serde::Serialize;
use std::fmt;

/// Number of settled transactions shown in a summary.
pub const RECENT_SETTLED_LIMIT: usize = 3;

/// Summary of a fully replayed credit account.
///
/// # Rendering
///
/// ```text
/// Available credit: $800
/// Payable balance: $200
///
/// Pending transactions:
/// t2: $50 @ time 3
///
/// Settled transactions:
/// t1: $200 @ time 1 (finalized @ time 2)
/// ```
///
/// Balances print as `$` followed by the signed value (`$-5`), while
/// transaction amounts use [`Amount`]'s `-$5` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub available_credit: Amount,
    pub payable_balance: Amount,

    /// Pending transactions in the order they were opened.
    pub pending: Vec<PendingTransaction>,

    /// Most recently finalized transactions, newest first.
    pub recent_settled: Vec<SettledTransaction>,
}

impl Summary {
    /// Builds the summary from a ledger's current state.
    ///
    /// Settled transactions are ordered by finalization time, newest first.
    /// The sort is stable, so transactions finalized at the same time keep
    /// their processing order.
    pub fn from_ledger(ledger: &CreditLedger) -> Self {
        let mut settled: Vec<&SettledTransaction> = ledger.settled().iter().collect();
        settled.sort_by(|a, b| b.time.cmp(&a.time));

        Summary {
            available_credit: ledger.available_credit(),
            payable_balance: ledger.payable_balance(),
            pending: ledger.pending().cloned().collect(),
            recent_settled: settled
                .into_iter()
                .take(RECENT_SETTLED_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available credit: ${}", self.available_credit.value())?;
        writeln!(f, "Payable balance: ${}", self.payable_balance.value())?;
        writeln!(f)?;

        writeln!(f, "Pending transactions:")?;
        for txn in &self.pending {
            writeln!(f, "{}", txn)?;
        }
        writeln!(f)?;

        write!(f, "Settled transactions:")?;
        for txn in &self.recent_settled {
            write!(f, "\n{}", txn)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Event, EventKind};

    fn summarize_events(limit: i64, events: Vec<Event>) -> Summary {
        let ledger = CreditLedger::new(limit, events).unwrap().process().unwrap();
        Summary::from_ledger(&ledger)
    }

    fn auth(id: &str, time: i64, amount: i64) -> Event {
        Event::new(EventKind::Authorized, id, time, Some(amount))
    }

    fn settle(id: &str, time: i64) -> Event {
        Event::new(EventKind::Settled, id, time, None)
    }

    #[test]
    fn test_empty_account_rendering() {
        let summary = summarize_events(1000, Vec::new());
        assert_eq!(
            summary.to_string(),
            "Available credit: $1000\nPayable balance: $0\n\nPending transactions:\n\nSettled transactions:"
        );
    }

    #[test]
    fn test_pending_and_settled_rendering() {
        let summary = summarize_events(
            1000,
            vec![auth("t1", 1, 200), settle("t1", 2), auth("t2", 3, 50)],
        );

        assert_eq!(
            summary.to_string(),
            "Available credit: $750\n\
             Payable balance: $200\n\
             \n\
             Pending transactions:\n\
             t2: $50 @ time 3\n\
             \n\
             Settled transactions:\n\
             t1: $200 @ time 1 (finalized @ time 2)"
        );
    }

    #[test]
    fn test_keeps_three_most_recent_settled() {
        let mut events = Vec::new();
        for (i, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            let t = i as i64 * 10;
            events.push(auth(id, t, 10));
            events.push(settle(id, t + 1));
        }

        let summary = summarize_events(1000, events);
        let ids: Vec<String> = summary.recent_settled.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["e", "d", "c"]);
    }

    #[test]
    fn test_settled_order_uses_finalization_time() {
        let summary = summarize_events(
            1000,
            vec![
                auth("early", 1, 10),
                auth("late", 2, 10),
                settle("late", 3),
                settle("early", 4),
            ],
        );

        let ids: Vec<String> = summary.recent_settled.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_settled_ties_keep_processing_order() {
        let summary = summarize_events(
            1000,
            vec![
                auth("x", 1, 10),
                auth("y", 2, 10),
                settle("x", 5),
                settle("y", 5),
            ],
        );

        let ids: Vec<String> = summary.recent_settled.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn test_negative_balance_keeps_sign_after_dollar() {
        let summary = Summary {
            available_credit: Amount::new(-5),
            payable_balance: Amount::new(-7),
            pending: Vec::new(),
            recent_settled: Vec::new(),
        };

        let rendered = summary.to_string();
        assert!(rendered.starts_with("Available credit: $-5\nPayable balance: $-7\n"));
    }

    #[test]
    fn test_serializes_to_json() {
        let summary = summarize_events(1000, vec![auth("t1", 1, 200)]);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["availableCredit"], 800);
        assert_eq!(json["payableBalance"], 0);
        assert_eq!(json["pending"][0]["id"], "t1");
        assert_eq!(json["pending"][0]["class"], "CREDIT");
    }
}
