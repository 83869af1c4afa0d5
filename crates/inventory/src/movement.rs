//! Immutable stock movement records.
//!
//! A movement is the audit trail of one quantity change: it is appended by
//! the store's movement log and never mutated or deleted. Before/after
//! snapshots are supplied by the orchestrator — several mutations may compose
//! inside one operation, so the caller is the source of truth.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DocumentRef, ItemId, LocationId, UserId};
#[cfg(test)]
use stockbook_core::DocumentKind;

use crate::stock::ItemType;

/// What kind of quantity change a movement records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    PurchaseReceipt,
    ProductionConsumption,
    ProductionOutput,
    Transfer,
    Sale,
    Return,
    DamageLoss,
    Adjustment,
}

/// Caller-supplied content of a movement, before the log assigns its number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub item_type: ItemType,
    pub item_id: ItemId,
    pub item_name: String,
    pub movement_type: MovementType,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub batch_numbers: Vec<String>,
    pub reference: Option<DocumentRef>,
    pub stock_before: Decimal,
    pub stock_after: Decimal,
    pub notes: Option<String>,
    pub created_by: UserId,
}

/// A committed, immutable movement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: DocumentId,
    pub movement_number: String,
    pub item_type: ItemType,
    pub item_id: ItemId,
    pub item_name: String,
    pub movement_type: MovementType,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub batch_numbers: Vec<String>,
    pub reference: Option<DocumentRef>,
    pub stock_before: Decimal,
    pub stock_after: Decimal,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Seal a draft with its assigned number and timestamp.
    pub fn from_draft(draft: MovementDraft, movement_number: String, at: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            movement_number,
            item_type: draft.item_type,
            item_id: draft.item_id,
            item_name: draft.item_name,
            movement_type: draft.movement_type,
            from_location: draft.from_location,
            to_location: draft.to_location,
            quantity: draft.quantity,
            unit_cost: draft.unit_cost,
            total_cost: draft.total_cost,
            batch_numbers: draft.batch_numbers,
            reference: draft.reference,
            stock_before: draft.stock_before,
            stock_after: draft.stock_after,
            notes: draft.notes,
            created_by: draft.created_by,
            created_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn movement_serializes_with_snake_case_tags() {
        let draft = MovementDraft {
            item_type: ItemType::RawMaterial,
            item_id: ItemId::new(),
            item_name: "Oak board".to_string(),
            movement_type: MovementType::PurchaseReceipt,
            from_location: None,
            to_location: Some(LocationId::new()),
            quantity: "10".parse().unwrap(),
            unit_cost: "4.5".parse().unwrap(),
            total_cost: "45".parse().unwrap(),
            batch_numbers: vec!["PO-2403-0001".to_string()],
            reference: Some(DocumentRef::new(
                DocumentKind::PurchaseOrder,
                DocumentId::new(),
                "PO-2403-0001",
            )),
            stock_before: "0".parse().unwrap(),
            stock_after: "10".parse().unwrap(),
            notes: None,
            created_by: UserId::new(),
        };
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let movement = Movement::from_draft(draft, "MOV-240301-00001".to_string(), at);

        // Downstream audit consumers read this wire shape.
        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["movement_type"], "purchase_receipt");
        assert_eq!(json["item_type"], "raw_material");
        assert_eq!(json["reference"]["kind"], "purchase_order");
        assert_eq!(json["movement_number"], "MOV-240301-00001");
    }
}
