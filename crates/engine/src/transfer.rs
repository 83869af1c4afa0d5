//! Stock transfers between locations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, LocationId, UserId};
use stockbook_inventory::{ItemRef, Movement, MovementDraft, MovementType};
use stockbook_store::Store;

use crate::Engine;

/// Input for [`Engine::transfer_stock`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub item: ItemRef,
    pub from: LocationId,
    pub to: LocationId,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

impl<S: Store> Engine<S> {
    /// Move stock between locations as a batch move: the extracted batches
    /// keep their numbers, unit costs, and received dates at the destination,
    /// so FIFO order and value are preserved. One `transfer` movement records
    /// the aggregate with a value-weighted unit cost.
    pub fn transfer_stock(
        &self,
        request: TransferRequest,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Movement> {
        self.store().transaction(|state| {
            if request.from == request.to {
                return Err(DomainError::invalid_operation(
                    "source and destination locations are the same",
                ));
            }
            if request.quantity <= Decimal::ZERO {
                return Err(DomainError::invalid_operation(
                    "transfer quantity must be positive",
                ));
            }

            let name = state.catalog.resolve(request.item)?;

            let (before, moved, after) = {
                let stock = state.stock.get_mut(request.item, request.from).ok_or_else(|| {
                    DomainError::not_found(format!("stock of {name} at {}", request.from))
                })?;
                let before = stock.quantity();
                let moved = stock.extract_batches(request.quantity)?;
                (before, moved, stock.quantity())
            };

            let total_value: Decimal = moved.iter().map(|b| b.quantity * b.unit_cost).sum();
            let batch_numbers: Vec<String> =
                moved.iter().map(|b| b.batch_number.clone()).collect();

            state
                .stock
                .get_or_create(request.item, request.to)
                .receive_batches(moved)?;

            let movement = state.record_movement(
                MovementDraft {
                    item_type: request.item.item_type,
                    item_id: request.item.item_id,
                    item_name: name,
                    movement_type: MovementType::Transfer,
                    from_location: Some(request.from),
                    to_location: Some(request.to),
                    quantity: request.quantity,
                    unit_cost: total_value / request.quantity,
                    total_cost: total_value,
                    batch_numbers,
                    reference: None,
                    stock_before: before,
                    stock_after: after,
                    notes: request.notes.clone(),
                    created_by: actor,
                },
                at,
            );

            tracing::info!(
                number = %movement.movement_number,
                quantity = %movement.quantity,
                "stock transferred"
            );
            Ok(movement)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchasing::{NewPurchaseLine, NewPurchaseOrder};
    use stockbook_core::ItemId;
    use stockbook_purchasing::Supplier;
    use stockbook_store::InMemoryStore;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    struct Depot {
        engine: Engine<InMemoryStore>,
        actor: UserId,
        warehouse: LocationId,
        outlet: LocationId,
        oak: ItemRef,
    }

    /// Two receipts at the warehouse: 5 @ 10 (older) then 3 @ 12.
    fn depot() -> Depot {
        let engine = Engine::new(InMemoryStore::new());
        let actor = UserId::new();
        let warehouse = LocationId::new();
        let outlet = LocationId::new();
        let oak_id = ItemId::new();

        for (qty, cost) in [("5", "10"), ("3", "12")] {
            let po = engine
                .create_purchase_order(
                    NewPurchaseOrder {
                        supplier: Supplier::default(),
                        lines: vec![NewPurchaseLine {
                            raw_material: oak_id,
                            raw_material_name: "Oak board".to_string(),
                            quantity: d(qty),
                            unit_cost: d(cost),
                        }],
                        destination: warehouse,
                        shipping: Decimal::ZERO,
                        clearance: Decimal::ZERO,
                        other_fees: Decimal::ZERO,
                    },
                    actor,
                    Utc::now(),
                )
                .unwrap();
            engine.receive_purchase_order(po.id, actor, Utc::now()).unwrap();
        }

        Depot {
            engine,
            actor,
            warehouse,
            outlet,
            oak: ItemRef::raw_material(oak_id),
        }
    }

    #[test]
    fn transfer_preserves_batches_quantity_and_value() {
        let depot = depot();

        let total_before = depot
            .engine
            .store()
            .read(|state| {
                let stock = state.stock.get(depot.oak, depot.warehouse).unwrap();
                Ok((stock.quantity(), stock.total_value()))
            })
            .unwrap();

        let movement = depot
            .engine
            .transfer_stock(
                TransferRequest {
                    item: depot.oak,
                    from: depot.warehouse,
                    to: depot.outlet,
                    quantity: d("6"),
                    notes: None,
                },
                depot.actor,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(movement.movement_type, MovementType::Transfer);
        assert_eq!(movement.quantity, d("6"));
        // 5*10 + 1*12 = 62 moved value.
        assert_eq!(movement.total_cost, d("62"));
        assert_eq!(movement.stock_before, d("8"));
        assert_eq!(movement.stock_after, d("2"));

        depot
            .engine
            .store()
            .read(|state| {
                let source = state.stock.get(depot.oak, depot.warehouse).unwrap();
                let dest = state.stock.get(depot.oak, depot.outlet).unwrap();

                assert_eq!(source.quantity(), d("2"));
                assert_eq!(dest.quantity(), d("6"));
                assert_eq!(source.quantity() + dest.quantity(), total_before.0);
                assert_eq!(source.total_value() + dest.total_value(), total_before.1);

                // The destination keeps the original batch identities.
                assert_eq!(dest.batches().len(), 2);
                assert_eq!(dest.batches()[0].unit_cost, d("10"));
                assert_eq!(dest.batches()[1].unit_cost, d("12"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn transfer_to_the_same_location_is_rejected() {
        let depot = depot();
        let err = depot
            .engine
            .transfer_stock(
                TransferRequest {
                    item: depot.oak,
                    from: depot.warehouse,
                    to: depot.warehouse,
                    quantity: d("1"),
                    notes: None,
                },
                depot.actor,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation(_)));
    }

    #[test]
    fn transfer_from_an_empty_location_is_not_found() {
        let depot = depot();
        let err = depot
            .engine
            .transfer_stock(
                TransferRequest {
                    item: depot.oak,
                    from: depot.outlet,
                    to: depot.warehouse,
                    quantity: d("1"),
                    notes: None,
                },
                depot.actor,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn oversized_transfer_leaves_both_locations_unchanged() {
        let depot = depot();
        let err = depot
            .engine
            .transfer_stock(
                TransferRequest {
                    item: depot.oak,
                    from: depot.warehouse,
                    to: depot.outlet,
                    quantity: d("20"),
                    notes: None,
                },
                depot.actor,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock(_)));

        depot
            .engine
            .store()
            .read(|state| {
                assert_eq!(state.stock.quantity_of(depot.oak, depot.warehouse), d("8"));
                assert_eq!(state.stock.quantity_of(depot.oak, depot.outlet), Decimal::ZERO);
                Ok(())
            })
            .unwrap();
    }
}
