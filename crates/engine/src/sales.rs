//! Sale orchestration: FIFO line costing and profit posting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_capital::CapitalTransactionKind;
use stockbook_core::{DocumentKind, DocumentRef, DomainError, DomainResult, ItemId, LocationId, UserId};
use stockbook_inventory::ItemRef;
use stockbook_sales::{Sale, SaleLine};
use stockbook_store::Store;

use crate::Engine;

/// Input line for [`Engine::create_sale`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product: ItemId,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Input for [`Engine::create_sale`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub location: LocationId,
    pub customer_name: Option<String>,
    pub lines: Vec<NewSaleLine>,
}

impl<S: Store> Engine<S> {
    /// Sell products from one location. Each line is FIFO-costed; the sale's
    /// profit posts to capital as `sale_revenue` in the same transaction.
    /// No stock movement is recorded for sales.
    pub fn create_sale(
        &self,
        input: NewSale,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Sale> {
        self.store().transaction(|state| {
            let mut costed = Vec::with_capacity(input.lines.len());
            for line in &input.lines {
                let item = ItemRef::product(line.product);
                let name = state.catalog.resolve(item)?;

                let stock = state.stock.get_mut(item, input.location).ok_or_else(|| {
                    DomainError::insufficient_stock(format!(
                        "{name}: requested {}, available 0",
                        line.quantity
                    ))
                })?;
                let consumption = stock.consume(line.quantity)?;

                costed.push(SaleLine::new(
                    line.product,
                    name,
                    line.quantity,
                    line.price,
                    consumption.weighted_unit_cost(line.quantity),
                ));
            }

            let number = state.next_invoice_number(at);
            let mut sale = Sale::create(
                number,
                input.location,
                input.customer_name.clone(),
                costed,
                actor,
                at,
            )?;

            let reference = DocumentRef::new(DocumentKind::Sale, sale.id, sale.invoice_number.clone());
            let capital = state.capital.get_or_create(at);
            let draft = capital.apply_delta(
                sale.profit,
                CapitalTransactionKind::SaleRevenue,
                Some(reference),
                format!("Sale profit: {}", sale.invoice_number),
                actor,
                at,
            )?;
            let tx = state.record_capital_transaction(draft, at);
            sale.capital_transaction = Some(tx.id);

            tracing::info!(number = %sale.invoice_number, profit = %sale.profit, "sale recorded");
            state.sales.insert(sale.id, sale.clone());
            Ok(sale)
        })
    }
}
