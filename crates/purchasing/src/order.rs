//! Purchase orders.
//!
//! Computed fields (line totals, subtotal, grand total, landed-cost
//! allocation) are explicit steps the orchestrator runs before persistence,
//! never implicit lifecycle hooks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DomainError, DomainResult, ItemId, LocationId, UserId};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

/// Free-form supplier details kept on the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub invoice_number: Option<String>,
}

/// One raw-material line on a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub raw_material: ItemId,
    pub raw_material_name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    /// quantity × unit cost, computed at creation.
    pub total_cost: Decimal,
    /// Unit cost after shared costs are allocated; set at receipt.
    pub final_unit_cost: Option<Decimal>,
}

/// A purchase of raw materials into one destination location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: DocumentId,
    pub order_number: String,
    pub supplier: Supplier,
    pub lines: Vec<PurchaseLine>,
    pub destination: LocationId,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub clearance: Decimal,
    pub other_fees: Decimal,
    pub grand_total: Decimal,
    pub status: PurchaseOrderStatus,
    pub paid_from_capital: bool,
    pub capital_transaction: Option<DocumentId>,
    pub order_date: DateTime<Utc>,
    pub received_date: Option<DateTime<Utc>>,
    pub created_by: UserId,
}

impl PurchaseOrder {
    /// Build an order with computed line totals, subtotal, and grand total.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        order_number: String,
        supplier: Supplier,
        mut lines: Vec<PurchaseLine>,
        destination: LocationId,
        shipping: Decimal,
        clearance: Decimal,
        other_fees: Decimal,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("purchase order needs at least one line"));
        }
        for fee in [shipping, clearance, other_fees] {
            if fee < Decimal::ZERO {
                return Err(DomainError::validation("fees must not be negative"));
            }
        }

        let mut subtotal = Decimal::ZERO;
        for line in &mut lines {
            if line.quantity <= Decimal::ZERO {
                return Err(DomainError::validation("line quantity must be positive"));
            }
            if line.unit_cost < Decimal::ZERO {
                return Err(DomainError::validation("line unit cost must not be negative"));
            }
            line.total_cost = line.quantity * line.unit_cost;
            line.final_unit_cost = None;
            subtotal += line.total_cost;
        }

        let grand_total = subtotal + shipping + clearance + other_fees;

        Ok(Self {
            id: DocumentId::new(),
            order_number,
            supplier,
            lines,
            destination,
            subtotal,
            shipping,
            clearance,
            other_fees,
            grand_total,
            status: PurchaseOrderStatus::Ordered,
            paid_from_capital: false,
            capital_transaction: None,
            order_date: at,
            received_date: None,
            created_by,
        })
    }

    /// Spread shipping + clearance + other fees across the lines in
    /// proportion to each line's share of the subtotal, and fix each line's
    /// final unit cost.
    pub fn allocate_landed_costs(&mut self) -> DomainResult<()> {
        if self.subtotal.is_zero() {
            return Err(DomainError::validation(
                "cannot allocate shared costs over a zero subtotal",
            ));
        }
        let additional = self.shipping + self.clearance + self.other_fees;
        for line in &mut self.lines {
            let share = additional * (line.total_cost / self.subtotal);
            line.final_unit_cost = Some((line.total_cost + share) / line.quantity);
        }
        Ok(())
    }

    /// Guard + transition for goods receipt.
    pub fn mark_received(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            PurchaseOrderStatus::Received => Err(DomainError::invalid_operation(format!(
                "purchase order {} already received",
                self.order_number
            ))),
            PurchaseOrderStatus::Cancelled => Err(DomainError::invalid_operation(format!(
                "purchase order {} is cancelled",
                self.order_number
            ))),
            _ => {
                self.status = PurchaseOrderStatus::Received;
                self.received_date = Some(at);
                Ok(())
            }
        }
    }

    /// Payment is only legal once; checked before the capital debit so a
    /// repeat call reports the status problem, not a funds problem.
    pub fn ensure_unpaid(&self) -> DomainResult<()> {
        if self.paid_from_capital {
            return Err(DomainError::invalid_operation(format!(
                "purchase order {} already paid",
                self.order_number
            )));
        }
        Ok(())
    }

    /// Guard + transition for payment from capital.
    pub fn mark_paid(&mut self, capital_transaction: DocumentId) -> DomainResult<()> {
        self.ensure_unpaid()?;
        self.paid_from_capital = true;
        self.capital_transaction = Some(capital_transaction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(name: &str, qty: &str, cost: &str) -> PurchaseLine {
        PurchaseLine {
            raw_material: ItemId::new(),
            raw_material_name: name.to_string(),
            quantity: d(qty),
            unit_cost: d(cost),
            total_cost: Decimal::ZERO,
            final_unit_cost: None,
        }
    }

    fn order(lines: Vec<PurchaseLine>, shipping: &str, clearance: &str, other: &str) -> PurchaseOrder {
        PurchaseOrder::create(
            "PO-2403-0001".to_string(),
            Supplier {
                name: "Acme Timber".to_string(),
                invoice_number: None,
            },
            lines,
            LocationId::new(),
            d(shipping),
            d(clearance),
            d(other),
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_computes_totals() {
        let po = order(vec![line("Oak", "10", "10"), line("Pine", "30", "10")], "30", "5", "5");
        assert_eq!(po.subtotal, d("400"));
        assert_eq!(po.grand_total, d("440"));
        assert_eq!(po.lines[0].total_cost, d("100"));
        assert_eq!(po.lines[1].total_cost, d("300"));
    }

    #[test]
    fn landed_costs_split_proportionally() {
        let mut po = order(vec![line("Oak", "10", "10"), line("Pine", "30", "10")], "30", "5", "5");
        po.allocate_landed_costs().unwrap();

        // Line 1 carries 100/400 of the 40 in shared costs: (100 + 10) / 10.
        assert_eq!(po.lines[0].final_unit_cost, Some(d("11")));
        // Line 2 carries 300/400: (300 + 30) / 30.
        assert_eq!(po.lines[1].final_unit_cost, Some(d("11")));

        // Allocated value sums back to subtotal + fees.
        let landed: Decimal = po
            .lines
            .iter()
            .map(|l| l.final_unit_cost.unwrap() * l.quantity)
            .sum();
        assert_eq!(landed, po.grand_total);
    }

    #[test]
    fn receive_twice_is_rejected() {
        let mut po = order(vec![line("Oak", "1", "10")], "0", "0", "0");
        po.mark_received(Utc::now()).unwrap();
        let err = po.mark_received(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation(_)));
    }

    #[test]
    fn pay_twice_is_rejected() {
        let mut po = order(vec![line("Oak", "1", "10")], "0", "0", "0");
        po.mark_paid(DocumentId::new()).unwrap();
        assert!(po.mark_paid(DocumentId::new()).is_err());
    }

    #[test]
    fn empty_order_is_rejected() {
        let result = PurchaseOrder::create(
            "PO-2403-0002".to_string(),
            Supplier::default(),
            vec![],
            LocationId::new(),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            UserId::new(),
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
