//! The transactional state and its typed collections.
//!
//! `StoreState` is a plain value: cloning it snapshots the whole business
//! state, which is what gives transactions their all-or-nothing behavior.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use stockbook_capital::{Capital, CapitalTransaction, CapitalTransactionDraft, Expense};
use stockbook_core::{DocumentId, DocumentNumber, DomainError, DomainResult, ItemId, LocationId, Period};
use stockbook_inventory::{ItemRef, ItemType, Movement, MovementDraft, StockRecord};
use stockbook_production::{BillOfMaterial, ProductionOrder};
use stockbook_purchasing::PurchaseOrder;
use stockbook_sales::Sale;

/// The persistence contract. Implementations serialize transactions: within
/// `transaction`, either every mutation commits or none does.
pub trait Store {
    fn transaction<T>(&self, f: impl FnOnce(&mut StoreState) -> DomainResult<T>)
    -> DomainResult<T>;

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> DomainResult<T>) -> DomainResult<T>;
}

/// The unique identity of one stock record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StockKey {
    pub item_type: ItemType,
    pub item_id: ItemId,
    pub location: LocationId,
}

impl StockKey {
    pub fn new(item: ItemRef, location: LocationId) -> Self {
        Self {
            item_type: item.item_type,
            item_id: item.item_id,
            location,
        }
    }
}

/// Stock records keyed by their unique (item type, item id, location) triple.
#[derive(Debug, Clone, Default)]
pub struct StockSet {
    records: HashMap<StockKey, StockRecord>,
}

impl StockSet {
    /// Read path; a missing record means zero stock, never an error.
    pub fn get(&self, item: ItemRef, location: LocationId) -> Option<&StockRecord> {
        self.records.get(&StockKey::new(item, location))
    }

    pub fn get_mut(&mut self, item: ItemRef, location: LocationId) -> Option<&mut StockRecord> {
        self.records.get_mut(&StockKey::new(item, location))
    }

    /// Write path: creates the record lazily on first inbound movement.
    pub fn get_or_create(&mut self, item: ItemRef, location: LocationId) -> &mut StockRecord {
        self.records
            .entry(StockKey::new(item, location))
            .or_insert_with(|| StockRecord::new(item, location))
    }

    /// Explicit insert; an existing triple is `DuplicateKey`.
    pub fn insert(&mut self, record: StockRecord) -> DomainResult<()> {
        let key = StockKey::new(record.item(), record.location());
        if self.records.contains_key(&key) {
            return Err(DomainError::duplicate_key(format!(
                "stock record for {} {} at {} already exists",
                key.item_type, key.item_id, key.location
            )));
        }
        self.records.insert(key, record);
        Ok(())
    }

    pub fn quantity_of(&self, item: ItemRef, location: LocationId) -> Decimal {
        self.get(item, location)
            .map(StockRecord::quantity)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockRecord> {
        self.records.values()
    }
}

/// The Capital singleton: create-if-absent with a zero opening balance.
#[derive(Debug, Clone, Default)]
pub struct CapitalBook {
    capital: Option<Capital>,
}

impl CapitalBook {
    pub fn get(&self) -> Option<&Capital> {
        self.capital.as_ref()
    }

    pub fn get_or_create(&mut self, at: DateTime<Utc>) -> &mut Capital {
        self.capital.get_or_insert_with(|| Capital::opening(at))
    }
}

/// Active-version index over bills of material. At most one active BOM per
/// product: inserting a new active version retires the previous one.
#[derive(Debug, Clone, Default)]
pub struct BomSet {
    boms: Vec<BillOfMaterial>,
}

impl BomSet {
    pub fn insert(&mut self, bom: BillOfMaterial) {
        if bom.is_active {
            for existing in &mut self.boms {
                if existing.product == bom.product {
                    existing.is_active = false;
                }
            }
        }
        self.boms.push(bom);
    }

    pub fn get(&self, id: DocumentId) -> Option<&BillOfMaterial> {
        self.boms.iter().find(|b| b.id == id)
    }

    pub fn active_for(&self, product: ItemId) -> Option<&BillOfMaterial> {
        self.boms.iter().find(|b| b.product == product && b.is_active)
    }
}

/// (item type, item id) → display name. Sales require products to be
/// cataloged; movements carry resolved names.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    names: HashMap<(ItemType, ItemId), String>,
}

impl ItemCatalog {
    pub fn register(&mut self, item: ItemRef, name: impl Into<String>) {
        self.names.insert((item.item_type, item.item_id), name.into());
    }

    pub fn name_of(&self, item: ItemRef) -> Option<&str> {
        self.names
            .get(&(item.item_type, item.item_id))
            .map(String::as_str)
    }

    pub fn resolve(&self, item: ItemRef) -> DomainResult<String> {
        self.name_of(item)
            .map(str::to_string)
            .ok_or_else(|| DomainError::not_found(format!("{} {}", item.item_type, item.item_id)))
    }
}

/// Per-(prefix, period) document number sequences.
#[derive(Debug, Clone, Default)]
pub struct SequenceBook {
    counters: HashMap<(&'static str, String), u64>,
}

impl SequenceBook {
    pub fn next(
        &mut self,
        prefix: &'static str,
        period: Period,
        width: usize,
        at: DateTime<Utc>,
    ) -> String {
        let counter = self
            .counters
            .entry((prefix, period.stamp(at)))
            .or_insert(0);
        *counter += 1;
        DocumentNumber::format(prefix, period, at, *counter, width).into()
    }
}

/// One consistent view of the whole business state.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub stock: StockSet,
    pub capital: CapitalBook,
    pub boms: BomSet,
    pub catalog: ItemCatalog,
    pub purchase_orders: HashMap<DocumentId, PurchaseOrder>,
    pub production_orders: HashMap<DocumentId, ProductionOrder>,
    pub sales: HashMap<DocumentId, Sale>,
    pub expenses: HashMap<DocumentId, Expense>,
    movements: Vec<Movement>,
    capital_transactions: Vec<CapitalTransaction>,
    sequences: SequenceBook,
}

impl StoreState {
    /// Append-only movement log: assigns the per-day `MOV` number and seals
    /// the draft. There is no update or delete path.
    pub fn record_movement(&mut self, draft: MovementDraft, at: DateTime<Utc>) -> Movement {
        let number = self.sequences.next("MOV", Period::Day, 5, at);
        let movement = Movement::from_draft(draft, number, at);
        self.movements.push(movement.clone());
        movement
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Append-only capital transaction log: assigns the `CAP` number and
    /// seals the draft.
    pub fn record_capital_transaction(
        &mut self,
        draft: CapitalTransactionDraft,
        at: DateTime<Utc>,
    ) -> CapitalTransaction {
        let number = self.sequences.next("CAP", Period::Month, 5, at);
        let tx = CapitalTransaction::from_draft(draft, number, at);
        self.capital_transactions.push(tx.clone());
        tx
    }

    pub fn capital_transactions(&self) -> &[CapitalTransaction] {
        &self.capital_transactions
    }

    pub fn next_purchase_order_number(&mut self, at: DateTime<Utc>) -> String {
        self.sequences.next("PO", Period::Month, 4, at)
    }

    pub fn next_production_order_number(&mut self, at: DateTime<Utc>) -> String {
        self.sequences.next("PROD", Period::Month, 4, at)
    }

    pub fn next_expense_number(&mut self, at: DateTime<Utc>) -> String {
        self.sequences.next("EXP", Period::Month, 4, at)
    }

    pub fn next_invoice_number(&mut self, at: DateTime<Utc>) -> String {
        self.sequences.next("INV", Period::Day, 3, at)
    }

    pub fn purchase_order(&self, id: DocumentId) -> DomainResult<&PurchaseOrder> {
        self.purchase_orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))
    }

    pub fn purchase_order_mut(&mut self, id: DocumentId) -> DomainResult<&mut PurchaseOrder> {
        self.purchase_orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))
    }

    pub fn production_order(&self, id: DocumentId) -> DomainResult<&ProductionOrder> {
        self.production_orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("production order {id}")))
    }

    pub fn production_order_mut(&mut self, id: DocumentId) -> DomainResult<&mut ProductionOrder> {
        self.production_orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("production order {id}")))
    }

    pub fn bom(&self, id: DocumentId) -> DomainResult<&BillOfMaterial> {
        self.boms
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("bill of material {id}")))
    }
}
