//! Stock records and cost batches.
//!
//! One `StockRecord` exists per (item type, item id, location) triple and owns
//! an ordered list of cost batches. All consumption is FIFO over
//! `received_date`; ties fall back to insertion order (stable sort).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DocumentId, DomainError, DomainResult, ItemId, LocationId};

/// Kind of a stocked item. Dispatch happens on this tag at the stock and
/// movement boundaries; there is no runtime type inspection anywhere else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    RawMaterial,
    Product,
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ItemType::RawMaterial => f.write_str("raw_material"),
            ItemType::Product => f.write_str("product"),
        }
    }
}

/// Typed reference to a stocked item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub item_id: ItemId,
}

impl ItemRef {
    pub fn raw_material(item_id: ItemId) -> Self {
        Self {
            item_type: ItemType::RawMaterial,
            item_id,
        }
    }

    pub fn product(item_id: ItemId) -> Self {
        Self {
            item_type: ItemType::Product,
            item_id,
        }
    }
}

/// A quantity of an item received at one cost on one date.
///
/// Batches have no identity outside their owning `StockRecord`; the batch
/// number is an opaque label (not globally unique).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_number: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub received_date: DateTime<Utc>,
    pub purchase_order: Option<DocumentId>,
}

/// One batch's contribution to a FIFO consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDraw {
    pub batch_number: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// Result of a FIFO consumption: total cost plus the batches it drew from,
/// oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Consumption {
    pub total_cost: Decimal,
    pub draws: Vec<BatchDraw>,
}

impl Consumption {
    /// Value-weighted unit cost of the consumed quantity. Zero for an empty
    /// consumption.
    pub fn weighted_unit_cost(&self, quantity: Decimal) -> Decimal {
        if quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost / quantity
        }
    }

    pub fn batch_numbers(&self) -> Vec<String> {
        self.draws.iter().map(|d| d.batch_number.clone()).collect()
    }
}

/// Stock of one item at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    item: ItemRef,
    location: LocationId,
    quantity: Decimal,
    batches: Vec<Batch>,
    average_cost: Decimal,
}

impl StockRecord {
    /// Empty record; created lazily on first inbound movement.
    pub fn new(item: ItemRef, location: LocationId) -> Self {
        Self {
            item,
            location,
            quantity: Decimal::ZERO,
            batches: Vec::new(),
            average_cost: Decimal::ZERO,
        }
    }

    pub fn item(&self) -> ItemRef {
        self.item
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Value-weighted average cost over the remaining batches (zero if none).
    pub fn average_cost(&self) -> Decimal {
        self.average_cost
    }

    /// Append a new batch and add its quantity to the record.
    pub fn add_batch(&mut self, batch: Batch) -> DomainResult<()> {
        if batch.quantity < Decimal::ZERO || batch.unit_cost < Decimal::ZERO {
            return Err(DomainError::validation(
                "batch quantity and unit cost must be non-negative",
            ));
        }
        if batch.quantity.is_zero() {
            // A zero batch would be filtered on the next mutation anyway.
            return Ok(());
        }
        self.quantity += batch.quantity;
        self.batches.push(batch);
        self.recompute_average_cost();
        Ok(())
    }

    /// Append batches carried over from another location, preserving their
    /// received dates and costs.
    pub fn receive_batches(&mut self, batches: Vec<Batch>) -> DomainResult<()> {
        for batch in batches {
            self.add_batch(batch)?;
        }
        Ok(())
    }

    /// Consume `requested` units FIFO (oldest `received_date` first, ties by
    /// insertion order), returning the total cost and per-batch draws.
    ///
    /// Availability is checked up front: on `InsufficientStock` no batch has
    /// been touched. A zero request is a no-op.
    pub fn consume(&mut self, requested: Decimal) -> DomainResult<Consumption> {
        if requested < Decimal::ZERO {
            return Err(DomainError::validation("consumption quantity must not be negative"));
        }
        if requested.is_zero() {
            return Ok(Consumption {
                total_cost: Decimal::ZERO,
                draws: Vec::new(),
            });
        }
        if self.quantity < requested {
            return Err(DomainError::insufficient_stock(format!(
                "requested {requested}, available {}",
                self.quantity
            )));
        }

        let order = self.fifo_order();
        let mut remaining = requested;
        let mut total_cost = Decimal::ZERO;
        let mut draws = Vec::new();

        for idx in order {
            if remaining.is_zero() {
                break;
            }
            let batch = &mut self.batches[idx];
            let take = batch.quantity.min(remaining);
            total_cost += take * batch.unit_cost;
            batch.quantity -= take;
            remaining -= take;
            draws.push(BatchDraw {
                batch_number: batch.batch_number.clone(),
                quantity: take,
                unit_cost: batch.unit_cost,
            });
        }

        self.quantity -= requested;
        self.remove_empty_batches();
        self.recompute_average_cost();

        Ok(Consumption { total_cost, draws })
    }

    /// Drain `requested` units as whole or split batches, FIFO order, keeping
    /// each extracted batch's number, unit cost, and received date intact.
    ///
    /// This is the transfer path: a batch *move*, not a cost recomputation.
    pub fn extract_batches(&mut self, requested: Decimal) -> DomainResult<Vec<Batch>> {
        if requested <= Decimal::ZERO {
            return Err(DomainError::validation("extraction quantity must be positive"));
        }
        if self.quantity < requested {
            return Err(DomainError::insufficient_stock(format!(
                "requested {requested}, available {}",
                self.quantity
            )));
        }

        let order = self.fifo_order();
        let mut remaining = requested;
        let mut extracted = Vec::new();

        for idx in order {
            if remaining.is_zero() {
                break;
            }
            let batch = &mut self.batches[idx];
            let take = batch.quantity.min(remaining);
            extracted.push(Batch {
                batch_number: batch.batch_number.clone(),
                quantity: take,
                unit_cost: batch.unit_cost,
                received_date: batch.received_date,
                purchase_order: batch.purchase_order,
            });
            batch.quantity -= take;
            remaining -= take;
        }

        self.quantity -= requested;
        self.remove_empty_batches();
        self.recompute_average_cost();

        Ok(extracted)
    }

    /// Σ(qty × cost) over remaining batches.
    pub fn total_value(&self) -> Decimal {
        self.batches
            .iter()
            .map(|b| b.quantity * b.unit_cost)
            .sum()
    }

    /// Indices of `batches` sorted oldest-first; stable, so same-date batches
    /// keep insertion order.
    fn fifo_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.batches.len()).collect();
        order.sort_by_key(|&i| self.batches[i].received_date);
        order
    }

    fn remove_empty_batches(&mut self) {
        self.batches.retain(|b| !b.quantity.is_zero());
    }

    fn recompute_average_cost(&mut self) {
        let total_qty: Decimal = self.batches.iter().map(|b| b.quantity).sum();
        self.average_cost = if total_qty.is_zero() {
            Decimal::ZERO
        } else {
            self.total_value() / total_qty
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, n, 0, 0, 0).unwrap()
    }

    fn batch(number: &str, qty: &str, cost: &str, received: DateTime<Utc>) -> Batch {
        Batch {
            batch_number: number.to_string(),
            quantity: d(qty),
            unit_cost: d(cost),
            received_date: received,
            purchase_order: None,
        }
    }

    fn stock_with(batches: Vec<Batch>) -> StockRecord {
        let mut stock = StockRecord::new(ItemRef::product(ItemId::new()), LocationId::new());
        for b in batches {
            stock.add_batch(b).unwrap();
        }
        stock
    }

    #[test]
    fn add_batch_updates_quantity_and_average_cost() {
        let mut stock = stock_with(vec![batch("B1", "5", "10", day(1))]);
        assert_eq!(stock.quantity(), d("5"));
        assert_eq!(stock.average_cost(), d("10"));

        stock.add_batch(batch("B2", "3", "12", day(2))).unwrap();
        assert_eq!(stock.quantity(), d("8"));
        // (5*10 + 3*12) / 8 = 86 / 8 = 10.75
        assert_eq!(stock.average_cost(), d("10.75"));
    }

    #[test]
    fn consume_drains_oldest_batches_first() {
        // Scenario from the costing contract: 5@10 (older) + 3@12, sell 6.
        let mut stock = stock_with(vec![
            batch("B1", "5", "10", day(1)),
            batch("B2", "3", "12", day(2)),
        ]);

        let consumption = stock.consume(d("6")).unwrap();
        assert_eq!(consumption.total_cost, d("62"));
        assert_eq!(consumption.draws.len(), 2);
        assert_eq!(consumption.draws[0].batch_number, "B1");
        assert_eq!(consumption.draws[0].quantity, d("5"));
        assert_eq!(consumption.draws[1].batch_number, "B2");
        assert_eq!(consumption.draws[1].quantity, d("1"));

        assert_eq!(stock.quantity(), d("2"));
        assert_eq!(stock.batches().len(), 1);
        assert_eq!(stock.batches()[0].batch_number, "B2");
        assert_eq!(stock.average_cost(), d("12"));
    }

    #[test]
    fn consume_ignores_insertion_order_when_dates_differ() {
        // Newer batch inserted first; FIFO must still start at the older date.
        let mut stock = stock_with(vec![
            batch("NEW", "4", "20", day(9)),
            batch("OLD", "4", "15", day(2)),
        ]);

        let consumption = stock.consume(d("4")).unwrap();
        assert_eq!(consumption.draws.len(), 1);
        assert_eq!(consumption.draws[0].batch_number, "OLD");
        assert_eq!(consumption.total_cost, d("60"));
    }

    #[test]
    fn same_date_ties_break_by_insertion_order() {
        let mut stock = stock_with(vec![
            batch("FIRST", "2", "5", day(3)),
            batch("SECOND", "2", "7", day(3)),
        ]);

        let consumption = stock.consume(d("3")).unwrap();
        assert_eq!(consumption.draws[0].batch_number, "FIRST");
        assert_eq!(consumption.draws[1].batch_number, "SECOND");
        assert_eq!(consumption.total_cost, d("17"));
    }

    #[test]
    fn consume_zero_is_a_no_op() {
        let mut stock = stock_with(vec![batch("B1", "5", "10", day(1))]);
        let consumption = stock.consume(Decimal::ZERO).unwrap();
        assert_eq!(consumption.total_cost, Decimal::ZERO);
        assert!(consumption.draws.is_empty());
        assert_eq!(stock.quantity(), d("5"));
    }

    #[test]
    fn consume_rejects_shortfall_without_touching_batches() {
        let mut stock = stock_with(vec![batch("B1", "5", "10", day(1))]);
        let before = stock.clone();

        let err = stock.consume(d("6")).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock(_)));
        assert_eq!(stock, before);
    }

    #[test]
    fn extract_preserves_batch_identity() {
        let mut stock = stock_with(vec![
            batch("B1", "5", "10", day(1)),
            batch("B2", "3", "12", day(2)),
        ]);
        let value_before = stock.total_value();

        let moved = stock.extract_batches(d("6")).unwrap();
        assert_eq!(moved.len(), 2);
        assert_eq!(moved[0].batch_number, "B1");
        assert_eq!(moved[0].quantity, d("5"));
        assert_eq!(moved[0].received_date, day(1));
        assert_eq!(moved[1].batch_number, "B2");
        assert_eq!(moved[1].quantity, d("1"));
        assert_eq!(moved[1].unit_cost, d("12"));

        let moved_value: Decimal = moved.iter().map(|b| b.quantity * b.unit_cost).sum();
        assert_eq!(moved_value + stock.total_value(), value_before);
        assert_eq!(stock.quantity(), d("2"));
    }

    #[test]
    fn weighted_unit_cost_is_total_over_quantity() {
        let mut stock = stock_with(vec![
            batch("B1", "5", "10", day(1)),
            batch("B2", "3", "12", day(2)),
        ]);
        let consumption = stock.consume(d("6")).unwrap();
        // 62 / 6 = 10.33...
        let unit = consumption.weighted_unit_cost(d("6"));
        assert!(unit > d("10.33") && unit < d("10.34"));
    }

    proptest! {
        /// Quantity always equals the batch sum and no empty batch survives,
        /// across arbitrary receive/consume sequences.
        #[test]
        fn quantity_matches_batch_sum(
            adds in prop::collection::vec((1u32..100, 1u32..50, 1u32..28), 1..8),
            takes in prop::collection::vec(1u32..40, 0..8),
        ) {
            let mut stock = StockRecord::new(
                ItemRef::raw_material(ItemId::new()),
                LocationId::new(),
            );

            for (qty, cost, day_no) in adds {
                stock.add_batch(batch(
                    &format!("B{qty}"),
                    &qty.to_string(),
                    &cost.to_string(),
                    day(day_no),
                )).unwrap();
            }

            for take in takes {
                let requested = Decimal::from(take);
                if requested <= stock.quantity() {
                    stock.consume(requested).unwrap();
                } else {
                    prop_assert!(stock.consume(requested).is_err());
                }

                let batch_sum: Decimal = stock.batches().iter().map(|b| b.quantity).sum();
                prop_assert_eq!(stock.quantity(), batch_sum);
                prop_assert!(stock.batches().iter().all(|b| !b.quantity.is_zero()));
            }
        }

        /// FIFO never draws a newer batch while an older one still has stock:
        /// draw dates are non-decreasing and every draw before the last fully
        /// drains its batch.
        #[test]
        fn draws_are_oldest_first(
            batches in prop::collection::vec((1u32..50, 1u32..30, 1u32..28), 2..6),
            take_fraction in 1u32..100,
        ) {
            let mut stock = StockRecord::new(
                ItemRef::product(ItemId::new()),
                LocationId::new(),
            );
            let mut dates = std::collections::HashMap::new();
            for (i, (qty, cost, day_no)) in batches.iter().enumerate() {
                let number = format!("B{i}");
                dates.insert(number.clone(), day(*day_no));
                stock.add_batch(batch(&number, &qty.to_string(), &cost.to_string(), day(*day_no))).unwrap();
            }

            let total = stock.quantity();
            let requested = (total * Decimal::from(take_fraction) / Decimal::from(100u32)).floor();
            prop_assume!(requested > Decimal::ZERO);

            let consumption = stock.consume(requested).unwrap();
            let draw_dates: Vec<_> = consumption
                .draws
                .iter()
                .map(|draw| dates[&draw.batch_number])
                .collect();
            prop_assert!(draw_dates.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
