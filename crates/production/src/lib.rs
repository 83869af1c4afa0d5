//! `stockbook-production` — bills of material, the material availability
//! report, and production order documents with their completion cost math.

pub mod bom;
pub mod order;

pub use bom::{AvailabilityReport, BillOfMaterial, BomLine, MaterialAvailability};
pub use order::{MaterialConsumed, ProductionOrder, ProductionOrderStatus};
