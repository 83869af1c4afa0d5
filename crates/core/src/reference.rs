//! Non-owning references to business documents.
//!
//! Movements and capital transactions point *back* at the document that
//! caused them; the document never owns its audit records.

use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// Kind of business document an audit record points back to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PurchaseOrder,
    ProductionOrder,
    Sale,
    Expense,
    Return,
}

/// Non-owning back-reference to the originating business document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub id: DocumentId,
    pub number: String,
}

impl DocumentRef {
    pub fn new(kind: DocumentKind, id: DocumentId, number: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            number: number.into(),
        }
    }
}
