//! Credit account balances and the arithmetic behind each lifecycle step.

use crate::amount::Amount;
use crate::error::{Result, SummaryError};
use crate::transaction::TxnId;
use serde::Serialize;

/// Balance state of a single credit account.
///
/// # Invariants
///
/// - `credit_limit` is positive and never changes after construction
/// - An authorization never takes `available_credit` below zero
/// - A payment initiation never exceeds the current `payable_balance`
/// - A step that would overflow either balance fails and changes nothing
///
/// Both balances are signed. Payments carry negative amounts, so posting a
/// payment raises `available_credit` and initiating one lowers
/// `payable_balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditAccount {
    pub credit_limit: Amount,

    /// Credit left after outstanding authorizations and settlements.
    pub available_credit: Amount,

    /// Amount owed on settled purchases, net of initiated payments.
    pub payable_balance: Amount,
}

impl CreditAccount {
    /// Creates an account with the full limit available and nothing payable.
    ///
    /// Fails with [`SummaryError::InvalidConfig`] if `credit_limit <= 0`.
    pub fn new(credit_limit: i64) -> Result<Self> {
        if credit_limit <= 0 {
            return Err(SummaryError::InvalidConfig(credit_limit));
        }

        let limit = Amount::new(credit_limit);
        Ok(CreditAccount {
            credit_limit: limit,
            available_credit: limit,
            payable_balance: Amount::ZERO,
        })
    }

    /// Places a hold of `amount` against available credit.
    ///
    /// Fails with [`SummaryError::InsufficientCredit`] if the hold would
    /// exceed the available credit.
    pub fn authorize(&mut self, id: &TxnId, amount: Amount) -> Result<()> {
        if self.available_credit < amount {
            return Err(SummaryError::InsufficientCredit(id.to_string()));
        }

        self.available_credit = checked(id, self.available_credit.checked_sub(amount))?;
        Ok(())
    }

    /// Releases a hold without settling it.
    pub fn release(&mut self, id: &TxnId, held: Amount) -> Result<()> {
        self.available_credit = checked(id, self.available_credit.checked_add(held))?;
        Ok(())
    }

    /// Settles a hold of `held` as a final charge of `charged`.
    ///
    /// The hold is swapped for the charge in one step, so a balance near the
    /// limits of `i64` does not overflow on the intermediate value.
    pub fn settle(&mut self, id: &TxnId, held: Amount, charged: Amount) -> Result<()> {
        let available = checked(
            id,
            held.checked_sub(charged)
                .and_then(|delta| self.available_credit.checked_add(delta)),
        )?;
        let payable = checked(id, self.payable_balance.checked_add(charged))?;

        self.available_credit = available;
        self.payable_balance = payable;
        Ok(())
    }

    /// Applies a pending payment to the payable balance.
    ///
    /// Fails with [`SummaryError::PaymentExceedsBalance`] if the payment is
    /// larger than what is owed.
    pub fn initiate_payment(&mut self, id: &TxnId, amount: Amount) -> Result<()> {
        // widened so that negating i64::MIN is exact
        if i128::from(self.payable_balance.value()) < -i128::from(amount.value()) {
            return Err(SummaryError::PaymentExceedsBalance(id.to_string()));
        }

        self.payable_balance = checked(id, self.payable_balance.checked_add(amount))?;
        Ok(())
    }

    /// Reverses the balance effect of a payment initiation.
    pub fn cancel_payment(&mut self, id: &TxnId, amount: Amount) -> Result<()> {
        self.payable_balance = checked(id, self.payable_balance.checked_sub(amount))?;
        Ok(())
    }

    /// Posts a payment, restoring available credit.
    pub fn post_payment(&mut self, id: &TxnId, amount: Amount) -> Result<()> {
        self.available_credit = checked(id, self.available_credit.checked_sub(amount))?;
        Ok(())
    }
}

fn checked(id: &TxnId, value: Option<Amount>) -> Result<Amount> {
    value.ok_or_else(|| SummaryError::AmountOverflow(id.to_string()))
}
