//! Production orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DomainError, DomainResult, ItemId, LocationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

/// What one completed order actually drew from stock, per material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConsumed {
    pub raw_material: ItemId,
    pub raw_material_name: String,
    pub quantity: Decimal,
    pub cost: Decimal,
    pub batch_numbers: Vec<String>,
}

/// An order to produce `quantity` units of a product from raw materials at
/// the source location, delivering output stock to the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: DocumentId,
    pub order_number: String,
    pub product: ItemId,
    pub product_name: String,
    pub bill_of_material: DocumentId,
    pub quantity: Decimal,
    pub source: LocationId,
    pub destination: LocationId,
    pub status: ProductionOrderStatus,
    pub materials_consumed: Vec<MaterialConsumed>,
    pub total_cost: Decimal,
    pub cost_per_unit: Decimal,
    pub completed_quantity: Decimal,
    pub completion_date: Option<DateTime<Utc>>,
    pub order_date: DateTime<Utc>,
    pub created_by: UserId,
}

impl ProductionOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        order_number: String,
        product: ItemId,
        product_name: String,
        bill_of_material: DocumentId,
        quantity: Decimal,
        source: LocationId,
        destination: LocationId,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("production quantity must be positive"));
        }
        Ok(Self {
            id: DocumentId::new(),
            order_number,
            product,
            product_name,
            bill_of_material,
            quantity,
            source,
            destination,
            status: ProductionOrderStatus::Planned,
            materials_consumed: Vec::new(),
            total_cost: Decimal::ZERO,
            cost_per_unit: Decimal::ZERO,
            completed_quantity: Decimal::ZERO,
            completion_date: None,
            order_date: at,
            created_by,
        })
    }

    /// Completion is only legal once; completed and cancelled orders reject
    /// it so retried calls cannot double-consume materials.
    pub fn ensure_completable(&self) -> DomainResult<()> {
        match self.status {
            ProductionOrderStatus::Completed => Err(DomainError::invalid_operation(format!(
                "production order {} already completed",
                self.order_number
            ))),
            ProductionOrderStatus::Cancelled => Err(DomainError::invalid_operation(format!(
                "production order {} is cancelled",
                self.order_number
            ))),
            _ => Ok(()),
        }
    }

    /// Record the completion outcome: the consumption breakdown and the unit
    /// cost including labor and overhead.
    pub fn complete(
        &mut self,
        materials_consumed: Vec<MaterialConsumed>,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_completable()?;

        let material_cost: Decimal = materials_consumed.iter().map(|m| m.cost).sum();
        let total_cost =
            material_cost + labor_cost * self.quantity + overhead_cost * self.quantity;

        self.materials_consumed = materials_consumed;
        self.total_cost = total_cost;
        self.cost_per_unit = total_cost / self.quantity;
        self.completed_quantity = self.quantity;
        self.completion_date = Some(at);
        self.status = ProductionOrderStatus::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn order(quantity: &str) -> ProductionOrder {
        ProductionOrder::create(
            "PROD-2403-0001".to_string(),
            ItemId::new(),
            "Chair".to_string(),
            DocumentId::new(),
            d(quantity),
            LocationId::new(),
            LocationId::new(),
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    fn consumed(cost: &str) -> MaterialConsumed {
        MaterialConsumed {
            raw_material: ItemId::new(),
            raw_material_name: "Oak".to_string(),
            quantity: d("20"),
            cost: d(cost),
            batch_numbers: vec!["PO-2403-0001".to_string()],
        }
    }

    #[test]
    fn completion_prices_labor_and_overhead_per_unit() {
        let mut order = order("10");
        order
            .complete(vec![consumed("200")], d("5"), d("2"), Utc::now())
            .unwrap();

        // 200 material + 50 labor + 20 overhead over 10 units.
        assert_eq!(order.total_cost, d("270"));
        assert_eq!(order.cost_per_unit, d("27"));
        assert_eq!(order.completed_quantity, d("10"));
        assert_eq!(order.status, ProductionOrderStatus::Completed);
        assert!(order.completion_date.is_some());
    }

    #[test]
    fn completing_twice_is_rejected() {
        let mut order = order("10");
        order
            .complete(vec![consumed("200")], d("0"), d("0"), Utc::now())
            .unwrap();
        let snapshot = order.clone();

        let err = order
            .complete(vec![consumed("999")], d("0"), d("0"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation(_)));
        assert_eq!(order, snapshot);
    }

    #[test]
    fn cancelled_order_cannot_complete() {
        let mut order = order("5");
        order.status = ProductionOrderStatus::Cancelled;
        assert!(order.ensure_completable().is_err());
    }

    #[test]
    fn zero_quantity_order_is_rejected() {
        let result = ProductionOrder::create(
            "PROD-2403-0002".to_string(),
            ItemId::new(),
            "Chair".to_string(),
            DocumentId::new(),
            Decimal::ZERO,
            LocationId::new(),
            LocationId::new(),
            UserId::new(),
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
