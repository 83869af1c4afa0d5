//! The Capital singleton and its transaction history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DocumentRef, DomainError, DomainResult, UserId};

/// Why the balance changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalTransactionKind {
    Initial,
    OwnerInjection,
    PurchasePayment,
    SaleRevenue,
    ExpensePayment,
    ProfitWithdrawal,
}

/// The business's single cash balance. Exactly one instance exists; the
/// store creates it with a zero balance on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capital {
    balance: Decimal,
    initial_capital: Decimal,
    last_updated: DateTime<Utc>,
}

impl Capital {
    pub fn opening(at: DateTime<Utc>) -> Self {
        Self {
            balance: Decimal::ZERO,
            initial_capital: Decimal::ZERO,
            last_updated: at,
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Apply a signed delta to the balance.
    ///
    /// Fails with `InsufficientFunds` before mutating when the delta would
    /// drive the balance negative — a negative balance is a hard error, not a
    /// valid state. On success the returned draft satisfies
    /// `balance_after == balance_before + amount` by construction.
    pub fn apply_delta(
        &mut self,
        amount: Decimal,
        kind: CapitalTransactionKind,
        reference: Option<DocumentRef>,
        description: impl Into<String>,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<CapitalTransactionDraft> {
        let before = self.balance;
        let after = before + amount;
        if after < Decimal::ZERO {
            return Err(DomainError::insufficient_funds(format!(
                "balance {before} cannot absorb {amount}"
            )));
        }

        self.balance = after;
        self.last_updated = at;

        Ok(CapitalTransactionDraft {
            kind,
            amount,
            balance_before: before,
            balance_after: after,
            reference,
            description: description.into(),
            created_by,
        })
    }

    /// Remove `amount` (positive) from the balance.
    pub fn debit(
        &mut self,
        amount: Decimal,
        kind: CapitalTransactionKind,
        reference: Option<DocumentRef>,
        description: impl Into<String>,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<CapitalTransactionDraft> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("debit amount must be positive"));
        }
        self.apply_delta(-amount, kind, reference, description, created_by, at)
    }

    /// Add `amount` (positive) to the balance.
    pub fn credit(
        &mut self,
        amount: Decimal,
        kind: CapitalTransactionKind,
        reference: Option<DocumentRef>,
        description: impl Into<String>,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<CapitalTransactionDraft> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("credit amount must be positive"));
        }
        self.apply_delta(amount, kind, reference, description, created_by, at)
    }
}

/// Transaction content before the store assigns its number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalTransactionDraft {
    pub kind: CapitalTransactionKind,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub reference: Option<DocumentRef>,
    pub description: String,
    pub created_by: UserId,
}

/// A committed, immutable capital transaction. Linked 1:1 to the business
/// event that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalTransaction {
    pub id: DocumentId,
    pub transaction_number: String,
    pub kind: CapitalTransactionKind,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub reference: Option<DocumentRef>,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl CapitalTransaction {
    pub fn from_draft(
        draft: CapitalTransactionDraft,
        transaction_number: String,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            transaction_number,
            kind: draft.kind,
            amount: draft.amount,
            balance_before: draft.balance_before,
            balance_after: draft.balance_after,
            reference: draft.reference,
            description: draft.description,
            created_by: draft.created_by,
            created_at: at,
        }
    }
}
