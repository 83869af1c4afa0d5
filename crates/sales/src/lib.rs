//! `stockbook-sales` — sale documents: per-line FIFO cost, cost of goods
//! sold, and profit.

pub mod invoice;

pub use invoice::{Sale, SaleLine};
