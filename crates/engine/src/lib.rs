//! `stockbook-engine` — the transaction orchestrators.
//!
//! Every operation runs inside one store transaction: preconditions are
//! checked before any mutation, and any error discards the whole unit of
//! work. Timestamps and the acting user are passed in explicitly so callers
//! (and tests) control them.

pub mod finance;
pub mod production;
pub mod purchasing;
pub mod sales;
pub mod telemetry;
pub mod transfer;

pub use finance::NewExpense;
pub use production::{BomLineInput, NewBillOfMaterial, NewProductionOrder};
pub use purchasing::{NewPurchaseLine, NewPurchaseOrder};
pub use sales::{NewSale, NewSaleLine};
pub use transfer::TransferRequest;

use stockbook_store::Store;

/// The orchestration façade over a [`Store`].
pub struct Engine<S: Store> {
    store: S,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
