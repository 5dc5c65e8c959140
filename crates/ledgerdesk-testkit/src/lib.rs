// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use ledgerdesk_app::{
    ActionMeta, ColumnDef, ColumnKind, EntityAdapter, EntityKind, FieldValue, JsonNormalizer,
    PageData, Record, RecordId, RecordPayload,
};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeSet;
use time::macros::date;
use time::{Date, Duration};

const COMPANY_STEMS: [&str; 14] = [
    "Acme", "Northwind", "Bluestone", "Harbor", "Summit", "Crescent", "Ironwood", "Lakeside",
    "Pinnacle", "Redfern", "Silverline", "Tidewater", "Granite", "Oakridge",
];
const COMPANY_SUFFIXES: [&str; 6] = ["Traders", "Supply", "Industries", "& Sons", "Ltd", "Group"];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const CITIES: [&str; 12] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Pittsburgh",
    "Portland",
    "Boise",
    "Phoenix",
    "Nashville",
    "Columbus",
    "Omaha",
];

const ITEM_NAMES: [&str; 14] = [
    "Copier paper A4",
    "Toner cartridge",
    "Steel bolt M8",
    "Packing tape",
    "Pallet wrap",
    "Safety gloves",
    "LED panel",
    "Cable ties",
    "Label roll",
    "Desk lamp",
    "Hand truck",
    "Shelf bracket",
    "Extension cord",
    "First aid kit",
];
const UNITS: [&str; 5] = ["pcs", "box", "roll", "kg", "set"];

const DEPARTMENTS: [&str; 10] = [
    "Finance",
    "Operations",
    "Sales",
    "Purchasing",
    "Warehouse",
    "Human Resources",
    "Customer Service",
    "Logistics",
    "Marketing",
    "Administration",
];
const DESIGNATIONS: [&str; 8] = [
    "Clerk",
    "Accountant",
    "Supervisor",
    "Manager",
    "Analyst",
    "Storekeeper",
    "Driver",
    "Coordinator",
];

const BANKS: [&str; 6] = [
    "First Federal",
    "Commerce Bank",
    "Union Trust",
    "Harbor Savings",
    "Metro Credit",
    "Citizens National",
];
const CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "CAD"];

const LEDGER_ACCOUNTS: [(&str, &str, bool); 10] = [
    ("Cash on hand", "Assets", false),
    ("Accounts receivable", "Assets", true),
    ("Inventory", "Assets", true),
    ("Accounts payable", "Liabilities", true),
    ("Accrued expenses", "Liabilities", false),
    ("Share capital", "Equity", false),
    ("Sales revenue", "Income", false),
    ("Cost of goods sold", "Expenses", false),
    ("Rent expense", "Expenses", false),
    ("Bank charges", "Expenses", false),
];

const DOCUMENT_STATUSES: [&str; 4] = ["draft", "submitted", "paid", "cancelled"];

const MEETING_TITLES: [&str; 8] = [
    "Monthly close review",
    "Budget planning",
    "Supplier negotiation",
    "Stock count briefing",
    "Sales pipeline sync",
    "Safety committee",
    "Quarterly review",
    "Hiring panel",
];
const VENUES: [&str; 5] = ["Board room", "Room 2B", "Warehouse office", "Video call", "Cafeteria"];

const REFERENCE_DATE: Date = date!(2026 - 01 - 01);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic record payloads for every catalog entity. The same seed
/// always produces the same rows.
#[derive(Debug, Clone)]
pub struct LedgerFaker {
    rng: DeterministicRng,
}

impl LedgerFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Payloads numbered `1..=count`; codes and document numbers embed the
    /// serial so they stay unique.
    pub fn payloads(&mut self, kind: EntityKind, count: u32) -> Vec<RecordPayload> {
        (1..=count).map(|serial| self.payload(kind, serial)).collect()
    }

    pub fn payload(&mut self, kind: EntityKind, serial: u32) -> RecordPayload {
        let schema = kind.schema();
        let mut payload = RecordPayload::new();
        for column in schema.columns {
            let value = self.value(kind, column, serial);
            payload.insert(column.key.to_owned(), value);
        }
        payload
    }

    fn value(&mut self, kind: EntityKind, column: &ColumnDef, serial: u32) -> FieldValue {
        let text = |value: String| FieldValue::Text(value);
        match (kind, column.key) {
            (_, "code") => text(format!("{}{serial:04}", code_prefix(kind))),
            (EntityKind::Customer | EntityKind::Supplier, "name") => text(self.company()),
            (EntityKind::Item, "name") => text(self.pick(&ITEM_NAMES).to_owned()),
            (EntityKind::Warehouse, "name") => {
                text(format!("{} depot", self.pick(&CITIES)))
            }
            (EntityKind::Employee, "name") => text(self.person()),
            (EntityKind::Department, "name") => {
                text(DEPARTMENTS[(serial as usize - 1) % DEPARTMENTS.len()].to_owned())
            }
            (EntityKind::LedgerAccount, "name") => {
                text(LEDGER_ACCOUNTS[(serial as usize - 1) % LEDGER_ACCOUNTS.len()].0.to_owned())
            }
            (EntityKind::LedgerAccount, "group") => {
                text(LEDGER_ACCOUNTS[(serial as usize - 1) % LEDGER_ACCOUNTS.len()].1.to_owned())
            }
            (EntityKind::LedgerAccount, "is_control") => FieldValue::Bool(
                LEDGER_ACCOUNTS[(serial as usize - 1) % LEDGER_ACCOUNTS.len()].2,
            ),
            (_, "contact" | "head" | "organizer") => text(self.person()),
            (_, "phone") => text(format!(
                "({:03}) {:03}-{:04}",
                self.range(200, 999),
                self.range(200, 999),
                self.range(0, 9_999),
            )),
            (_, "email") => text(format!(
                "{}@example-{serial}.com",
                self.pick(&FIRST_NAMES).to_ascii_lowercase()
            )),
            (_, "city" | "location" | "branch") => text(self.pick(&CITIES).to_owned()),
            (_, "tax_number") => text(format!("TX-{:07}", self.range(0, 9_999_999))),
            (_, "sku") => text(format!("SKU-{serial:05}")),
            (_, "unit") => text(self.pick(&UNITS).to_owned()),
            (_, "image_url") => text(format!("https://img.example.com/items/{serial}.png")),
            (_, "employee_no") => text(format!("E{serial:04}")),
            (_, "department") => text(self.pick(&DEPARTMENTS).to_owned()),
            (_, "designation") => text(self.pick(&DESIGNATIONS).to_owned()),
            (_, "account_no") => text(format!("{:04}-{serial:06}", self.range(1000, 9999))),
            (_, "bank") => text(self.pick(&BANKS).to_owned()),
            (_, "currency") => text(self.pick(&CURRENCIES).to_owned()),
            (_, "invoice_no") => text(format!("SI-{serial:05}")),
            (_, "po_no") => text(format!("PO-{serial:05}")),
            (_, "customer" | "supplier") => text(self.company()),
            (_, "status") => text(self.pick(&DOCUMENT_STATUSES).to_owned()),
            (_, "title") => text(self.pick(&MEETING_TITLES).to_owned()),
            (_, "venue") => text(self.pick(&VENUES).to_owned()),
            // Some rows leave optional text empty so blank sorting shows up.
            (_, "remarks" | "minutes") if self.int_n(3) == 0 => text(String::new()),
            _ => self.by_kind(column.kind),
        }
    }

    fn by_kind(&mut self, kind: ColumnKind) -> FieldValue {
        match kind {
            ColumnKind::Text => FieldValue::Text(self.sentence()),
            ColumnKind::Integer => FieldValue::Integer(self.range(0, 500)),
            ColumnKind::Decimal => {
                FieldValue::Decimal(self.range(100, 2_500_000) as f64 / 100.0)
            }
            ColumnKind::Bool => FieldValue::Bool(self.int_n(2) == 1),
            ColumnKind::Date => {
                FieldValue::Date(REFERENCE_DATE - Duration::days(self.range(0, 730)))
            }
        }
    }

    fn company(&mut self) -> String {
        format!(
            "{} {}",
            self.pick(&COMPANY_STEMS),
            self.pick(&COMPANY_SUFFIXES)
        )
    }

    fn person(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    fn sentence(&mut self) -> String {
        format!(
            "{} with {}",
            self.pick(&MEETING_TITLES).to_lowercase(),
            self.person()
        )
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    fn range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        low + self.rng.int_n((high - low + 1) as usize) as i64
    }
}

fn code_prefix(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Customer => "C",
        EntityKind::Supplier => "S",
        EntityKind::Warehouse => "W",
        EntityKind::Department => "D",
        EntityKind::LedgerAccount => "GL",
        _ => "X",
    }
}

pub fn record(id: i64, fields: &[(&str, FieldValue)]) -> Record {
    fields
        .iter()
        .fold(Record::new(RecordId::new(id)), |record, (key, value)| {
            record.with(key, value.clone())
        })
}

pub fn named(id: i64, name: &str) -> Record {
    record(id, &[("name", FieldValue::text(name))])
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().map(|record| record.id.get()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    List,
    Search,
    Create,
    Update,
    Delete,
    ListInactive,
    Restore,
}

#[derive(Debug, Clone)]
struct MemoryRow {
    id: i64,
    payload: RecordPayload,
    deleted: Option<ActionMeta>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<MemoryRow>,
    next_id: i64,
    failing: BTreeSet<Operation>,
    calls: Vec<Operation>,
}

/// In-memory [`EntityAdapter`] with soft-delete semantics. Rows travel as
/// JSON with an `Id` key so normalization runs the same path as the HTTP
/// backend.
#[derive(Debug)]
pub struct MemoryAdapter {
    kind: EntityKind,
    state: RefCell<MemoryState>,
}

impl MemoryAdapter {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            state: RefCell::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    pub fn seeded(kind: EntityKind, count: u32, seed: u64) -> Self {
        let adapter = Self::new(kind);
        for payload in LedgerFaker::new(seed).payloads(kind, count) {
            adapter.insert(payload);
        }
        adapter
    }

    pub fn insert(&self, payload: RecordPayload) -> RecordId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.rows.push(MemoryRow {
            id,
            payload,
            deleted: None,
        });
        RecordId::new(id)
    }

    /// Makes every call of `operation` fail until [`MemoryAdapter::recover`].
    pub fn fail(&self, operation: Operation) {
        self.state.borrow_mut().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.state.borrow_mut().failing.remove(&operation);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state.borrow().calls.clone()
    }

    pub fn active_ids(&self) -> Vec<i64> {
        self.ids_where(|row| row.deleted.is_none())
    }

    pub fn inactive_ids(&self) -> Vec<i64> {
        self.ids_where(|row| row.deleted.is_some())
    }

    pub fn deleted_meta(&self, id: RecordId) -> Option<ActionMeta> {
        self.state
            .borrow()
            .rows
            .iter()
            .find(|row| row.id == id.get())
            .and_then(|row| row.deleted)
    }

    fn ids_where(&self, keep: impl Fn(&MemoryRow) -> bool) -> Vec<i64> {
        self.state
            .borrow()
            .rows
            .iter()
            .filter(|row| keep(row))
            .map(|row| row.id)
            .collect()
    }

    fn begin(&self, operation: Operation) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation);
        if state.failing.contains(&operation) {
            bail!("{operation:?} failed: 503 service unavailable");
        }
        Ok(())
    }

    fn to_json(&self, row: &MemoryRow) -> Value {
        let mut value = JsonNormalizer::new(self.kind).payload_to_json(&row.payload);
        if let Value::Object(object) = &mut value {
            object.insert("Id".to_owned(), Value::from(row.id));
        }
        value
    }

    fn matches(&self, row: &MemoryRow, needle: &str) -> bool {
        self.kind.schema().searchable_columns().any(|column| {
            row.payload
                .get(column.key)
                .is_some_and(|value| value.display().to_lowercase().contains(needle))
        })
    }

    fn set_deleted(&self, id: RecordId, deleted: Option<ActionMeta>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let row = state
            .rows
            .iter_mut()
            .find(|row| row.id == id.get())
            .ok_or_else(|| anyhow!("404 not found: {} {id}", self.kind.as_str()))?;
        match (row.deleted.is_some(), deleted.is_some()) {
            (true, true) => bail!("409 conflict: {} {id} is already deleted", self.kind.as_str()),
            (false, false) => bail!("409 conflict: {} {id} is not deleted", self.kind.as_str()),
            _ => {}
        }
        row.deleted = deleted;
        Ok(())
    }
}

impl EntityAdapter for MemoryAdapter {
    type Raw = Value;

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn list(&self, page: u32, limit: u32) -> Result<PageData<Value>> {
        self.begin(Operation::List)?;
        let state = self.state.borrow();
        let active = state
            .rows
            .iter()
            .filter(|row| row.deleted.is_none())
            .collect::<Vec<_>>();
        let offset = (page.max(1) - 1) as usize * limit as usize;
        Ok(PageData {
            records: active
                .iter()
                .skip(offset)
                .take(limit as usize)
                .map(|row| self.to_json(row))
                .collect(),
            total: active.len() as u64,
        })
    }

    fn search(&self, query: &str) -> Result<Vec<Value>> {
        self.begin(Operation::Search)?;
        let needle = query.trim().to_lowercase();
        let state = self.state.borrow();
        Ok(state
            .rows
            .iter()
            .filter(|row| row.deleted.is_none() && self.matches(row, &needle))
            .map(|row| self.to_json(row))
            .collect())
    }

    fn create(&self, payload: &RecordPayload) -> Result<Value> {
        self.begin(Operation::Create)?;
        let id = self.insert(payload.clone());
        let state = self.state.borrow();
        let row = state
            .rows
            .iter()
            .find(|row| row.id == id.get())
            .ok_or_else(|| anyhow!("created row vanished"))?;
        Ok(self.to_json(row))
    }

    fn update(&self, id: RecordId, payload: &RecordPayload) -> Result<Value> {
        self.begin(Operation::Update)?;
        let mut state = self.state.borrow_mut();
        let row = state
            .rows
            .iter_mut()
            .find(|row| row.id == id.get() && row.deleted.is_none())
            .ok_or_else(|| anyhow!("404 not found: {} {id}", self.kind.as_str()))?;
        row.payload = payload.clone();
        let row = row.clone();
        drop(state);
        Ok(self.to_json(&row))
    }

    fn delete(&self, id: RecordId, meta: &ActionMeta) -> Result<()> {
        self.begin(Operation::Delete)?;
        self.set_deleted(id, Some(*meta))
    }

    fn list_inactive(&self) -> Result<Vec<Value>> {
        self.begin(Operation::ListInactive)?;
        let state = self.state.borrow();
        Ok(state
            .rows
            .iter()
            .filter(|row| row.deleted.is_some())
            .map(|row| self.to_json(row))
            .collect())
    }

    fn restore(&self, id: RecordId, _meta: &ActionMeta) -> Result<()> {
        self.begin(Operation::Restore)?;
        self.set_deleted(id, None)
    }

    fn normalize(&self, raw: Value) -> Result<Record> {
        JsonNormalizer::new(self.kind).normalize(&raw)
    }
}
