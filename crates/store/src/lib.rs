//! `stockbook-store` — the persistence contract and its in-memory
//! implementation.
//!
//! [`Store`] runs closures over a [`StoreState`] of typed collections with
//! all-or-nothing semantics. [`InMemoryStore`] serializes transactions behind
//! a mutex and commits by snapshot swap; it is intended for tests and
//! embedded use, with durable backends implementing the same contract.

pub mod memory;
pub mod state;

pub use memory::InMemoryStore;
pub use state::{
    BomSet, CapitalBook, ItemCatalog, SequenceBook, StockKey, StockSet, Store, StoreState,
};
