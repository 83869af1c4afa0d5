//! `stockbook-purchasing` — purchase order documents: line totals,
//! proportional landed-cost allocation, and the received/paid status guards.

pub mod order;

pub use order::{PurchaseLine, PurchaseOrder, PurchaseOrderStatus, Supplier};
