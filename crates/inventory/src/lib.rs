//! `stockbook-inventory` — per-location stock records, cost batches, and the
//! FIFO consumption engine, plus the immutable movement audit types.

pub mod movement;
pub mod stock;

pub use movement::{Movement, MovementDraft, MovementType};
pub use stock::{Batch, BatchDraw, Consumption, ItemRef, ItemType, StockRecord};
