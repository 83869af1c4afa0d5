//! `stockbook-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod numbering;
pub mod reference;

pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, ItemId, LocationId, UserId};
pub use numbering::{DocumentNumber, Period};
pub use reference::{DocumentKind, DocumentRef};
