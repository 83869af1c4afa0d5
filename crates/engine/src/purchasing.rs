//! Purchase order orchestration: create, receive into stock, pay.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_capital::CapitalTransactionKind;
use stockbook_core::{DocumentId, DocumentKind, DocumentRef, DomainResult, ItemId, LocationId, UserId};
use stockbook_inventory::{Batch, ItemRef, ItemType, MovementDraft, MovementType};
use stockbook_purchasing::{PurchaseLine, PurchaseOrder, Supplier};
use stockbook_store::Store;

use crate::Engine;

/// Input line for [`Engine::create_purchase_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseLine {
    pub raw_material: ItemId,
    pub raw_material_name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// Input for [`Engine::create_purchase_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub supplier: Supplier,
    pub lines: Vec<NewPurchaseLine>,
    pub destination: LocationId,
    pub shipping: Decimal,
    pub clearance: Decimal,
    pub other_fees: Decimal,
}

impl<S: Store> Engine<S> {
    /// Create an order with computed totals and a fresh `PO` number. The
    /// catalog learns each material's name from the document.
    pub fn create_purchase_order(
        &self,
        input: NewPurchaseOrder,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        self.store().transaction(|state| {
            let number = state.next_purchase_order_number(at);
            let lines = input
                .lines
                .iter()
                .map(|l| PurchaseLine {
                    raw_material: l.raw_material,
                    raw_material_name: l.raw_material_name.clone(),
                    quantity: l.quantity,
                    unit_cost: l.unit_cost,
                    total_cost: Decimal::ZERO,
                    final_unit_cost: None,
                })
                .collect();
            let order = PurchaseOrder::create(
                number,
                input.supplier.clone(),
                lines,
                input.destination,
                input.shipping,
                input.clearance,
                input.other_fees,
                actor,
                at,
            )?;

            for line in &order.lines {
                state.catalog.register(
                    ItemRef::raw_material(line.raw_material),
                    line.raw_material_name.clone(),
                );
            }

            tracing::info!(number = %order.order_number, total = %order.grand_total, "purchase order created");
            state.purchase_orders.insert(order.id, order.clone());
            Ok(order)
        })
    }

    /// Receive an ordered purchase into stock: allocate landed costs, append
    /// one batch per line at its final unit cost, and record a
    /// `purchase_receipt` movement per line.
    pub fn receive_purchase_order(
        &self,
        order_id: DocumentId,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        self.store().transaction(|state| {
            let mut order = state.purchase_order(order_id)?.clone();
            order.mark_received(at)?;
            order.allocate_landed_costs()?;

            let batch_number = format!("PO-{}", order.order_number);
            let reference =
                DocumentRef::new(DocumentKind::PurchaseOrder, order.id, order.order_number.clone());

            for line in &order.lines {
                let unit_cost = line.final_unit_cost.unwrap_or(line.unit_cost);
                let item = ItemRef::raw_material(line.raw_material);

                let (before, after) = {
                    let stock = state.stock.get_or_create(item, order.destination);
                    let before = stock.quantity();
                    stock.add_batch(Batch {
                        batch_number: batch_number.clone(),
                        quantity: line.quantity,
                        unit_cost,
                        received_date: at,
                        purchase_order: Some(order.id),
                    })?;
                    (before, stock.quantity())
                };

                state.record_movement(
                    MovementDraft {
                        item_type: ItemType::RawMaterial,
                        item_id: line.raw_material,
                        item_name: line.raw_material_name.clone(),
                        movement_type: MovementType::PurchaseReceipt,
                        from_location: None,
                        to_location: Some(order.destination),
                        quantity: line.quantity,
                        unit_cost,
                        total_cost: unit_cost * line.quantity,
                        batch_numbers: vec![batch_number.clone()],
                        reference: Some(reference.clone()),
                        stock_before: before,
                        stock_after: after,
                        notes: None,
                        created_by: actor,
                    },
                    at,
                );
            }

            tracing::info!(number = %order.order_number, "purchase order received");
            state.purchase_orders.insert(order.id, order.clone());
            Ok(order)
        })
    }

    /// Pay the order's grand total from capital. Fails `InvalidOperation`
    /// when already paid and `InsufficientFunds` when the balance cannot
    /// cover it; either way nothing is persisted.
    pub fn pay_purchase_order(
        &self,
        order_id: DocumentId,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        self.store().transaction(|state| {
            let mut order = state.purchase_order(order_id)?.clone();
            order.ensure_unpaid()?;

            let reference =
                DocumentRef::new(DocumentKind::PurchaseOrder, order.id, order.order_number.clone());
            let capital = state.capital.get_or_create(at);
            let draft = capital.debit(
                order.grand_total,
                CapitalTransactionKind::PurchasePayment,
                Some(reference),
                format!("Payment for {}", order.order_number),
                actor,
                at,
            )?;
            let tx = state.record_capital_transaction(draft, at);
            order.mark_paid(tx.id)?;

            tracing::info!(number = %order.order_number, amount = %order.grand_total, "purchase order paid");
            state.purchase_orders.insert(order.id, order.clone());
            Ok(order)
        })
    }
}
