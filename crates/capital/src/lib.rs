//! `stockbook-capital` — the single cash balance ("Capital") and its
//! append-only transaction history. Every balance mutation goes through
//! [`Capital::credit`] or [`Capital::debit`], which produce a transaction
//! draft whose before/after amounts balance by construction.

pub mod expense;
pub mod ledger;

pub use expense::{Expense, ExpenseKind, PaymentMethod};
pub use ledger::{Capital, CapitalTransaction, CapitalTransactionDraft, CapitalTransactionKind};
