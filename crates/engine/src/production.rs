//! Production orchestration: BOM definition, availability, completion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DocumentKind, DocumentRef, DomainError, DomainResult, ItemId, LocationId, UserId};
use stockbook_inventory::{Batch, ItemRef, ItemType, MovementDraft, MovementType};
use stockbook_production::{
    AvailabilityReport, BillOfMaterial, BomLine, MaterialConsumed, ProductionOrder,
};
use stockbook_store::Store;

use crate::Engine;

/// Input line for [`Engine::define_bom`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLineInput {
    pub raw_material: ItemId,
    pub raw_material_name: String,
    pub quantity_per_unit: Decimal,
}

/// Input for [`Engine::define_bom`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBillOfMaterial {
    pub product: ItemId,
    pub product_name: String,
    pub version: u32,
    pub materials: Vec<BomLineInput>,
    pub labor_cost: Decimal,
    pub overhead_cost: Decimal,
}

/// Input for [`Engine::create_production_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductionOrder {
    pub product: ItemId,
    pub quantity: Decimal,
    pub source: LocationId,
    pub destination: LocationId,
}

impl<S: Store> Engine<S> {
    /// Register a BOM version. Inserting an active version retires the
    /// previous active one for the same product.
    pub fn define_bom(
        &self,
        input: NewBillOfMaterial,
        at: DateTime<Utc>,
    ) -> DomainResult<BillOfMaterial> {
        self.store().transaction(|state| {
            let materials = input
                .materials
                .iter()
                .map(|l| BomLine {
                    raw_material: l.raw_material,
                    raw_material_name: l.raw_material_name.clone(),
                    quantity_per_unit: l.quantity_per_unit,
                })
                .collect();
            let bom = BillOfMaterial::create(
                input.product,
                input.version,
                materials,
                input.labor_cost,
                input.overhead_cost,
                at,
            )?;

            state
                .catalog
                .register(ItemRef::product(input.product), input.product_name.clone());
            for line in &input.materials {
                state.catalog.register(
                    ItemRef::raw_material(line.raw_material),
                    line.raw_material_name.clone(),
                );
            }

            state.boms.insert(bom.clone());
            Ok(bom)
        })
    }

    /// Plan a production run against the product's active BOM. `NotFound`
    /// when the product has no active BOM.
    pub fn create_production_order(
        &self,
        input: NewProductionOrder,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<ProductionOrder> {
        self.store().transaction(|state| {
            let product_name = state.catalog.resolve(ItemRef::product(input.product))?;
            let bom_id = state
                .boms
                .active_for(input.product)
                .ok_or_else(|| {
                    DomainError::not_found(format!("active bill of material for {product_name}"))
                })?
                .id;

            let number = state.next_production_order_number(at);
            let order = ProductionOrder::create(
                number,
                input.product,
                product_name,
                bom_id,
                input.quantity,
                input.source,
                input.destination,
                actor,
                at,
            )?;

            tracing::info!(number = %order.order_number, quantity = %order.quantity, "production order created");
            state.production_orders.insert(order.id, order.clone());
            Ok(order)
        })
    }

    /// Read-only check of how many units the active BOM allows from the
    /// stock at `source`.
    pub fn check_availability(
        &self,
        product: ItemId,
        requested: Decimal,
        source: LocationId,
    ) -> DomainResult<AvailabilityReport> {
        self.store().read(|state| {
            let bom = state.boms.active_for(product).ok_or_else(|| {
                DomainError::not_found(format!("active bill of material for product {product}"))
            })?;
            Ok(bom.availability(requested, |material| {
                state
                    .stock
                    .quantity_of(ItemRef::raw_material(*material), source)
            }))
        })
    }

    /// Complete a production order: verify every material first, FIFO-consume
    /// each with its own consumption movement, then stock the output batch at
    /// cost per unit (materials + labor + overhead).
    pub fn complete_production(
        &self,
        order_id: DocumentId,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<ProductionOrder> {
        self.store().transaction(|state| {
            let mut order = state.production_order(order_id)?.clone();
            order.ensure_completable()?;
            let bom = state.bom(order.bill_of_material)?.clone();

            // Validate every material before touching any stock.
            for line in &bom.materials {
                let needed = line.quantity_per_unit * order.quantity;
                let available = state
                    .stock
                    .quantity_of(ItemRef::raw_material(line.raw_material), order.source);
                if available < needed {
                    return Err(DomainError::insufficient_material(format!(
                        "{}: need {needed}, available {available}",
                        line.raw_material_name
                    )));
                }
            }

            let reference =
                DocumentRef::new(DocumentKind::ProductionOrder, order.id, order.order_number.clone());

            let mut consumed = Vec::with_capacity(bom.materials.len());
            for line in &bom.materials {
                let needed = line.quantity_per_unit * order.quantity;
                let item = ItemRef::raw_material(line.raw_material);

                let (before, consumption, after) = {
                    let stock = state.stock.get_mut(item, order.source).ok_or_else(|| {
                        DomainError::not_found(format!(
                            "stock of {} at {}",
                            line.raw_material_name, order.source
                        ))
                    })?;
                    let before = stock.quantity();
                    let consumption = stock.consume(needed)?;
                    (before, consumption, stock.quantity())
                };

                // Each consumption movement is priced at this material's own
                // weighted cost, not a running order total.
                state.record_movement(
                    MovementDraft {
                        item_type: ItemType::RawMaterial,
                        item_id: line.raw_material,
                        item_name: line.raw_material_name.clone(),
                        movement_type: MovementType::ProductionConsumption,
                        from_location: Some(order.source),
                        to_location: None,
                        quantity: needed,
                        unit_cost: consumption.weighted_unit_cost(needed),
                        total_cost: consumption.total_cost,
                        batch_numbers: consumption.batch_numbers(),
                        reference: Some(reference.clone()),
                        stock_before: before,
                        stock_after: after,
                        notes: None,
                        created_by: actor,
                    },
                    at,
                );

                consumed.push(MaterialConsumed {
                    raw_material: line.raw_material,
                    raw_material_name: line.raw_material_name.clone(),
                    quantity: needed,
                    cost: consumption.total_cost,
                    batch_numbers: consumption.batch_numbers(),
                });
            }

            order.complete(consumed, bom.labor_cost, bom.overhead_cost, at)?;

            let output_item = ItemRef::product(order.product);
            state.catalog.register(output_item, order.product_name.clone());
            let batch_number = format!("PROD-{}", order.order_number);
            let (before, after) = {
                let stock = state.stock.get_or_create(output_item, order.destination);
                let before = stock.quantity();
                stock.add_batch(Batch {
                    batch_number: batch_number.clone(),
                    quantity: order.quantity,
                    unit_cost: order.cost_per_unit,
                    received_date: at,
                    purchase_order: None,
                })?;
                (before, stock.quantity())
            };

            state.record_movement(
                MovementDraft {
                    item_type: ItemType::Product,
                    item_id: order.product,
                    item_name: order.product_name.clone(),
                    movement_type: MovementType::ProductionOutput,
                    from_location: None,
                    to_location: Some(order.destination),
                    quantity: order.quantity,
                    unit_cost: order.cost_per_unit,
                    total_cost: order.total_cost,
                    batch_numbers: vec![batch_number],
                    reference: Some(reference),
                    stock_before: before,
                    stock_after: after,
                    notes: None,
                    created_by: actor,
                },
                at,
            );

            tracing::info!(
                number = %order.order_number,
                cost_per_unit = %order.cost_per_unit,
                "production completed"
            );
            state.production_orders.insert(order.id, order.clone());
            Ok(order)
        })
    }
}
