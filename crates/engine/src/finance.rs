//! Capital injections and expenses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_capital::{CapitalTransaction, CapitalTransactionKind, Expense, ExpenseKind, PaymentMethod};
use stockbook_core::{DocumentKind, DocumentRef, DomainResult, LocationId, UserId};
use stockbook_store::Store;

use crate::Engine;

/// Input for [`Engine::create_expense`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub kind: ExpenseKind,
    pub amount: Decimal,
    pub location: Option<LocationId>,
    pub description: String,
    pub paid_to: Option<String>,
    pub payment_method: PaymentMethod,
    pub pay_from_capital: bool,
}

impl<S: Store> Engine<S> {
    /// Owner capital injection: credits the (create-if-absent) capital
    /// singleton and appends the transaction.
    pub fn add_capital(
        &self,
        amount: Decimal,
        description: Option<String>,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<CapitalTransaction> {
        self.store().transaction(|state| {
            let capital = state.capital.get_or_create(at);
            let draft = capital.credit(
                amount,
                CapitalTransactionKind::OwnerInjection,
                None,
                description.unwrap_or_else(|| "Owner capital injection".to_string()),
                actor,
                at,
            )?;
            let tx = state.record_capital_transaction(draft, at);
            tracing::info!(number = %tx.transaction_number, amount = %amount, "capital injected");
            Ok(tx)
        })
    }

    /// Persist an expense; when paid from capital, the debit happens in the
    /// same transaction and its id is linked on the expense.
    pub fn create_expense(
        &self,
        input: NewExpense,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Expense> {
        self.store().transaction(|state| {
            let number = state.next_expense_number(at);
            let mut expense = Expense::create(
                number,
                input.kind,
                input.amount,
                input.location,
                input.description.clone(),
                input.paid_to.clone(),
                input.payment_method,
                actor,
                at,
            )?;

            if input.pay_from_capital {
                let reference = DocumentRef::new(
                    DocumentKind::Expense,
                    expense.id,
                    expense.expense_number.clone(),
                );
                let capital = state.capital.get_or_create(at);
                let draft = capital.debit(
                    expense.amount,
                    CapitalTransactionKind::ExpensePayment,
                    Some(reference),
                    format!("Payment for {}", expense.expense_number),
                    actor,
                    at,
                )?;
                let tx = state.record_capital_transaction(draft, at);
                expense.mark_paid(tx.id)?;
            }

            tracing::info!(number = %expense.expense_number, amount = %expense.amount, "expense recorded");
            state.expenses.insert(expense.id, expense.clone());
            Ok(expense)
        })
    }
}
