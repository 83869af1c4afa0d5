//! Bills of material and the availability report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DomainError, DomainResult, ItemId};

/// One raw material requirement per produced unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    pub raw_material: ItemId,
    pub raw_material_name: String,
    pub quantity_per_unit: Decimal,
}

/// The recipe for one product. Versioned; at most one active version per
/// product, enforced by the store's BOM set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillOfMaterial {
    pub id: DocumentId,
    pub product: ItemId,
    pub version: u32,
    pub is_active: bool,
    pub materials: Vec<BomLine>,
    /// Labor cost per produced unit.
    pub labor_cost: Decimal,
    /// Overhead cost per produced unit.
    pub overhead_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl BillOfMaterial {
    pub fn create(
        product: ItemId,
        version: u32,
        materials: Vec<BomLine>,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if materials.is_empty() {
            return Err(DomainError::validation("bill of material needs at least one line"));
        }
        for line in &materials {
            if line.quantity_per_unit <= Decimal::ZERO {
                return Err(DomainError::validation("quantity per unit must be positive"));
            }
        }
        if labor_cost < Decimal::ZERO || overhead_cost < Decimal::ZERO {
            return Err(DomainError::validation("unit costs must not be negative"));
        }
        Ok(Self {
            id: DocumentId::new(),
            product,
            version,
            is_active: true,
            materials,
            labor_cost,
            overhead_cost,
            created_at: at,
        })
    }

    /// Evaluate whether `requested` units can be produced, given the stock
    /// on hand per material. A material without a stock record reads as zero.
    pub fn availability(
        &self,
        requested: Decimal,
        on_hand: impl Fn(&ItemId) -> Decimal,
    ) -> AvailabilityReport {
        let mut materials = Vec::with_capacity(self.materials.len());
        let mut max_possible = requested;

        for line in &self.materials {
            let needed = line.quantity_per_unit * requested;
            let available = on_hand(&line.raw_material);
            let possible_units = (available / line.quantity_per_unit).floor();
            if possible_units < max_possible {
                max_possible = possible_units;
            }
            materials.push(MaterialAvailability {
                raw_material: line.raw_material,
                raw_material_name: line.raw_material_name.clone(),
                quantity_per_unit: line.quantity_per_unit,
                needed,
                available,
                possible_units,
                sufficient: available >= needed,
            });
        }

        AvailabilityReport {
            requested,
            can_produce: materials.iter().all(|m| m.sufficient),
            max_possible,
            materials,
        }
    }
}

/// Per-material row of an availability report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAvailability {
    pub raw_material: ItemId,
    pub raw_material_name: String,
    pub quantity_per_unit: Decimal,
    pub needed: Decimal,
    pub available: Decimal,
    pub possible_units: Decimal,
    pub sufficient: bool,
}

/// Read-only answer to "can we build N of this product right now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub requested: Decimal,
    pub can_produce: bool,
    /// The binding constraint across materials; equals `requested` when
    /// everything is sufficient.
    pub max_possible: Decimal,
    pub materials: Vec<MaterialAvailability>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn bom(lines: Vec<(ItemId, &str)>) -> BillOfMaterial {
        let materials = lines
            .into_iter()
            .map(|(id, per_unit)| BomLine {
                raw_material: id,
                raw_material_name: "material".to_string(),
                quantity_per_unit: d(per_unit),
            })
            .collect();
        BillOfMaterial::create(ItemId::new(), 1, materials, d("5"), d("2"), Utc::now()).unwrap()
    }

    #[test]
    fn availability_floors_the_binding_material() {
        let wood = ItemId::new();
        let glue = ItemId::new();
        let bom = bom(vec![(wood, "2"), (glue, "1")]);

        let stock: HashMap<ItemId, Decimal> =
            [(wood, d("15")), (glue, d("100"))].into_iter().collect();
        let report = bom.availability(d("10"), |id| stock.get(id).copied().unwrap_or(Decimal::ZERO));

        assert!(!report.can_produce);
        // 15 on hand at 2 per unit caps output at 7.
        assert_eq!(report.max_possible, d("7"));
        assert!(!report.materials[0].sufficient);
        assert!(report.materials[1].sufficient);
        assert_eq!(report.materials[0].needed, d("20"));
    }

    #[test]
    fn availability_reports_requested_when_sufficient() {
        let wood = ItemId::new();
        let bom = bom(vec![(wood, "2")]);

        let report = bom.availability(d("5"), |_| d("100"));
        assert!(report.can_produce);
        assert_eq!(report.max_possible, d("5"));
    }

    #[test]
    fn missing_stock_reads_as_zero() {
        let bom = bom(vec![(ItemId::new(), "1")]);
        let report = bom.availability(d("3"), |_| Decimal::ZERO);
        assert!(!report.can_produce);
        assert_eq!(report.max_possible, d("0"));
    }

    #[test]
    fn empty_bom_is_rejected() {
        let result =
            BillOfMaterial::create(ItemId::new(), 1, vec![], Decimal::ZERO, Decimal::ZERO, Utc::now());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
