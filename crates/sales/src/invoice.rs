//! Sale documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DomainError, DomainResult, ItemId, LocationId, UserId};

/// One product line on a sale. `cost` is the FIFO-weighted unit cost the
/// consumption engine reported for this line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product: ItemId,
    pub product_name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub cost: Decimal,
    pub subtotal: Decimal,
}

impl SaleLine {
    pub fn new(
        product: ItemId,
        product_name: String,
        quantity: Decimal,
        price: Decimal,
        cost: Decimal,
    ) -> Self {
        Self {
            product,
            product_name,
            quantity,
            price,
            cost,
            subtotal: quantity * price,
        }
    }
}

/// A customer sale from one location. Totals and profit are fixed at
/// creation; the capital transaction link is attached when revenue posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: DocumentId,
    pub invoice_number: String,
    pub location: LocationId,
    pub customer_name: Option<String>,
    pub lines: Vec<SaleLine>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub profit: Decimal,
    pub capital_transaction: Option<DocumentId>,
    pub sale_date: DateTime<Utc>,
    pub created_by: UserId,
}

impl Sale {
    /// Build a sale from costed lines. `subtotal = Σ quantity × price`,
    /// `profit = subtotal − Σ quantity × cost`. Profit may be negative; a
    /// below-cost sale is legal.
    pub fn create(
        invoice_number: String,
        location: LocationId,
        customer_name: Option<String>,
        lines: Vec<SaleLine>,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("sale needs at least one line"));
        }
        for line in &lines {
            if line.quantity <= Decimal::ZERO {
                return Err(DomainError::validation("line quantity must be positive"));
            }
            if line.price < Decimal::ZERO {
                return Err(DomainError::validation("line price must not be negative"));
            }
        }

        let subtotal: Decimal = lines.iter().map(|l| l.subtotal).sum();
        let cost_of_goods_sold: Decimal = lines.iter().map(|l| l.quantity * l.cost).sum();

        Ok(Self {
            id: DocumentId::new(),
            invoice_number,
            location,
            customer_name,
            lines,
            subtotal,
            total: subtotal,
            cost_of_goods_sold,
            profit: subtotal - cost_of_goods_sold,
            capital_transaction: None,
            sale_date: at,
            created_by,
        })
    }
}
