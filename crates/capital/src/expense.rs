//! Expense documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DomainError, DomainResult, LocationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    Rent,
    Salary,
    Utilities,
    Transport,
    Marketing,
    Maintenance,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
    Other,
}

/// A business expense. When paid from capital the debit happens in the same
/// store transaction and the resulting transaction id is linked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: DocumentId,
    pub expense_number: String,
    pub kind: ExpenseKind,
    pub amount: Decimal,
    pub location: Option<LocationId>,
    pub description: String,
    pub paid_to: Option<String>,
    pub payment_method: PaymentMethod,
    pub paid_from_capital: bool,
    pub capital_transaction: Option<DocumentId>,
    pub expense_date: DateTime<Utc>,
    pub created_by: UserId,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        expense_number: String,
        kind: ExpenseKind,
        amount: Decimal,
        location: Option<LocationId>,
        description: impl Into<String>,
        paid_to: Option<String>,
        payment_method: PaymentMethod,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("expense amount must be positive"));
        }
        Ok(Self {
            id: DocumentId::new(),
            expense_number,
            kind,
            amount,
            location,
            description: description.into(),
            paid_to,
            payment_method,
            paid_from_capital: false,
            capital_transaction: None,
            expense_date: at,
            created_by,
        })
    }

    pub fn mark_paid(&mut self, capital_transaction: DocumentId) -> DomainResult<()> {
        if self.paid_from_capital {
            return Err(DomainError::invalid_operation(format!(
                "expense {} already paid",
                self.expense_number
            )));
        }
        self.paid_from_capital = true;
        self.capital_transaction = Some(capital_transaction);
        Ok(())
    }
}
