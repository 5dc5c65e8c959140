// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use ledgerdesk_app::{
    ActionMeta, EntityAdapter, EntityKind, JsonNormalizer, PageData, Record, RecordId,
    RecordPayload, UserId,
};
use ledgerdesk_testkit::LedgerFaker;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const APP_NAME: &str = "ledgerdesk";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "records",
    &[
        "id",
        "entity",
        "payload",
        "created_at",
        "updated_at",
        "deleted_at",
        "deleted_by",
    ],
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[RequiredIndex {
    name: "idx_records_entity_deleted_at",
    create_sql: "CREATE INDEX IF NOT EXISTS idx_records_entity_deleted_at ON records (entity, deleted_at);",
}];

// Rows per entity written by `seed_demo_data`; every ninth one starts inactive.
const DEMO_ROWS: &[(EntityKind, u32)] = &[
    (EntityKind::Customer, 64),
    (EntityKind::Supplier, 28),
    (EntityKind::Item, 120),
    (EntityKind::Warehouse, 6),
    (EntityKind::Employee, 45),
    (EntityKind::Department, 9),
    (EntityKind::BankAccount, 7),
    (EntityKind::LedgerAccount, 36),
    (EntityKind::SalesInvoice, 210),
    (EntityKind::PurchaseOrder, 90),
    (EntityKind::Meeting, 18),
];
const DEMO_INACTIVE_EVERY: u32 = 9;
const DEMO_USER: UserId = UserId::new(1);

/// One row of the `records` table, payload still undecoded.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub payload: Value,
    pub deleted_at: Option<OffsetDateTime>,
    pub deleted_by: Option<UserId>,
}

impl StoredRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The payload object with the row id folded in, ready for
    /// [`JsonNormalizer::normalize`].
    pub fn to_json(&self) -> Value {
        let mut object = match &self.payload {
            Value::Object(object) => object.clone(),
            _ => serde_json::Map::new(),
        };
        object.insert("id".to_owned(), Value::from(self.id.get()));
        Value::Object(object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCounts {
    pub entity: EntityKind,
    pub active: u64,
    pub inactive: u64,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    /// Fills an empty database with deterministic sample rows for every
    /// entity. Returns how many rows were written; a database that already
    /// holds records is left alone.
    pub fn seed_demo_data(&self, seed: u64) -> Result<usize> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .context("count existing records")?;
        if existing > 0 {
            tracing::debug!(existing, "database not empty, demo seeding skipped");
            return Ok(0);
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin demo seed transaction")?;
        let mut faker = LedgerFaker::new(seed);
        let mut written = 0usize;
        for (entity, count) in DEMO_ROWS {
            for (index, payload) in faker.payloads(*entity, *count).iter().enumerate() {
                let stored = self.create_record(*entity, payload)?;
                if (index as u32 + 1) % DEMO_INACTIVE_EVERY == 0 {
                    self.soft_delete(*entity, stored.id, &ActionMeta::now(DEMO_USER))?;
                }
                written += 1;
            }
        }
        tx.commit().context("commit demo seed")?;
        tracing::info!(rows = written, seed, "demo data seeded");
        Ok(written)
    }

    pub fn entity_counts(&self) -> Result<Vec<EntityCounts>> {
        EntityKind::ALL
            .into_iter()
            .map(|entity| {
                let (active, inactive): (i64, i64) = self
                    .conn
                    .query_row(
                        "
                        SELECT
                          COALESCE(SUM(deleted_at IS NULL), 0),
                          COALESCE(SUM(deleted_at IS NOT NULL), 0)
                        FROM records
                        WHERE entity = ?
                        ",
                        params![entity.as_str()],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .with_context(|| format!("count {} records", entity.as_str()))?;
                Ok(EntityCounts {
                    entity,
                    active: active.max(0) as u64,
                    inactive: inactive.max(0) as u64,
                })
            })
            .collect()
    }

    pub fn list_records(
        &self,
        entity: EntityKind,
        page: u32,
        limit: u32,
    ) -> Result<PageData<StoredRecord>> {
        if page == 0 || limit == 0 {
            bail!("page and limit start at 1 -- got page {page}, limit {limit}");
        }
        let total: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE entity = ? AND deleted_at IS NULL",
                params![entity.as_str()],
                |row| row.get(0),
            )
            .with_context(|| format!("count {}", entity.as_str()))?;

        let offset = i64::from(page - 1) * i64::from(limit);
        let records = self.query_records(
            "
            SELECT id, payload, deleted_at, deleted_by
            FROM records
            WHERE entity = ? AND deleted_at IS NULL
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            ",
            params![entity.as_str(), i64::from(limit), offset],
            entity,
        )?;
        Ok(PageData {
            records,
            total: total.max(0) as u64,
        })
    }

    /// Case-insensitive substring match over the entity's searchable
    /// columns. Results are unpaginated. Case folding runs in Rust because
    /// SQLite's `lower()` only folds ASCII.
    pub fn search_records(&self, entity: EntityKind, query: &str) -> Result<Vec<StoredRecord>> {
        let needle = query.trim().to_lowercase();
        let columns: Vec<&str> = entity
            .schema()
            .searchable_columns()
            .map(|column| column.key)
            .collect();
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let active = self.query_records(
            "
            SELECT id, payload, deleted_at, deleted_by
            FROM records
            WHERE entity = ? AND deleted_at IS NULL
            ORDER BY id ASC
            ",
            params![entity.as_str()],
            entity,
        )?;
        Ok(active
            .into_iter()
            .filter(|row| {
                columns.iter().any(|key| {
                    payload_text(&row.payload, key)
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            })
            .collect())
    }

    pub fn list_inactive(&self, entity: EntityKind) -> Result<Vec<StoredRecord>> {
        self.query_records(
            "
            SELECT id, payload, deleted_at, deleted_by
            FROM records
            WHERE entity = ? AND deleted_at IS NOT NULL
            ORDER BY id ASC
            ",
            params![entity.as_str()],
            entity,
        )
    }

    pub fn get_record(&self, entity: EntityKind, id: RecordId) -> Result<StoredRecord> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, payload, deleted_at, deleted_by
                FROM records
                WHERE entity = ? AND id = ?
                ",
            )
            .with_context(|| format!("prepare {} lookup", entity.as_str()))?;
        stmt.query_row(params![entity.as_str(), id.get()], stored_from_row)
            .optional()
            .with_context(|| format!("load {} record {id}", entity.as_str()))?
            .ok_or_else(|| {
                anyhow!(
                    "{} record {id} not found -- refresh the list and retry",
                    entity.as_str()
                )
            })
    }

    pub fn create_record(&self, entity: EntityKind, payload: &RecordPayload) -> Result<StoredRecord> {
        let now = now_rfc3339()?;
        let json = encode_payload(entity, payload)?;
        self.conn
            .execute(
                "
                INSERT INTO records (entity, payload, created_at, updated_at)
                VALUES (?, ?, ?, ?)
                ",
                params![entity.as_str(), json, now, now],
            )
            .with_context(|| format!("insert {} record", entity.as_str()))?;
        let id = RecordId::new(self.conn.last_insert_rowid());
        self.get_record(entity, id)
    }

    pub fn update_record(
        &self,
        entity: EntityKind,
        id: RecordId,
        payload: &RecordPayload,
    ) -> Result<StoredRecord> {
        let now = now_rfc3339()?;
        let json = encode_payload(entity, payload)?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE records
                SET payload = ?, updated_at = ?
                WHERE entity = ? AND id = ? AND deleted_at IS NULL
                ",
                params![json, now, entity.as_str(), id.get()],
            )
            .with_context(|| format!("update {} record {id}", entity.as_str()))?;
        if rows_affected == 0 {
            bail!(
                "{} record {id} not found or inactive -- restore it before editing",
                entity.as_str()
            );
        }
        self.get_record(entity, id)
    }

    pub fn soft_delete(&self, entity: EntityKind, id: RecordId, meta: &ActionMeta) -> Result<()> {
        let at = format_timestamp(meta.at)?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE records
                SET deleted_at = ?, deleted_by = ?, updated_at = ?
                WHERE entity = ? AND id = ? AND deleted_at IS NULL
                ",
                params![at, meta.user_id.get(), at, entity.as_str(), id.get()],
            )
            .with_context(|| format!("soft delete {} record {id}", entity.as_str()))?;
        if rows_affected == 0 {
            bail!("{} record {id} not found or already deleted", entity.as_str());
        }
        tracing::info!(
            entity = entity.as_str(),
            id = id.get(),
            user = meta.user_id.get(),
            "record deleted"
        );
        Ok(())
    }

    pub fn restore(&self, entity: EntityKind, id: RecordId, meta: &ActionMeta) -> Result<()> {
        let at = format_timestamp(meta.at)?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE records
                SET deleted_at = NULL, deleted_by = NULL, updated_at = ?
                WHERE entity = ? AND id = ? AND deleted_at IS NOT NULL
                ",
                params![at, entity.as_str(), id.get()],
            )
            .with_context(|| format!("restore {} record {id}", entity.as_str()))?;
        if rows_affected == 0 {
            bail!(
                "{} record {id} is not deleted or does not exist",
                entity.as_str()
            );
        }
        tracing::info!(
            entity = entity.as_str(),
            id = id.get(),
            user = meta.user_id.get(),
            "record restored"
        );
        Ok(())
    }

    pub fn adapter(&self, entity: EntityKind) -> StoreAdapter<'_> {
        StoreAdapter {
            store: self,
            entity,
        }
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
        entity: EntityKind,
    ) -> Result<Vec<StoredRecord>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("prepare {} query", entity.as_str()))?;
        let rows = stmt
            .query_map(params, stored_from_row)
            .with_context(|| format!("query {}", entity.as_str()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("collect {}", entity.as_str()))
    }
}

/// [`EntityAdapter`] over one entity's rows in a [`Store`].
#[derive(Clone, Copy)]
pub struct StoreAdapter<'a> {
    store: &'a Store,
    entity: EntityKind,
}

impl EntityAdapter for StoreAdapter<'_> {
    type Raw = StoredRecord;

    fn kind(&self) -> EntityKind {
        self.entity
    }

    fn list(&self, page: u32, limit: u32) -> Result<PageData<StoredRecord>> {
        self.store.list_records(self.entity, page, limit)
    }

    fn search(&self, query: &str) -> Result<Vec<StoredRecord>> {
        self.store.search_records(self.entity, query)
    }

    fn create(&self, payload: &RecordPayload) -> Result<StoredRecord> {
        self.store.create_record(self.entity, payload)
    }

    fn update(&self, id: RecordId, payload: &RecordPayload) -> Result<StoredRecord> {
        self.store.update_record(self.entity, id, payload)
    }

    fn delete(&self, id: RecordId, meta: &ActionMeta) -> Result<()> {
        self.store.soft_delete(self.entity, id, meta)
    }

    fn list_inactive(&self) -> Result<Vec<StoredRecord>> {
        self.store.list_inactive(self.entity)
    }

    fn restore(&self, id: RecordId, meta: &ActionMeta) -> Result<()> {
        self.store.restore(self.entity, id, meta)
    }

    fn normalize(&self, raw: StoredRecord) -> Result<Record> {
        JsonNormalizer::new(self.entity).normalize(&raw.to_json())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("LEDGERDESK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set LEDGERDESK_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("ledgerdesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            bail!(
                "database is missing required table `{table}`; point db_path at a ledgerdesk database"
            );
        }

        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn stored_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRecord> {
    let payload_raw: String = row.get(1)?;
    let deleted_at_raw: Option<String> = row.get(2)?;
    let deleted_by: Option<i64> = row.get(3)?;

    let payload = serde_json::from_str(&payload_raw)
        .context("decode record payload")
        .map_err(to_sql_error)?;
    let deleted_at = deleted_at_raw
        .map(|raw| {
            OffsetDateTime::parse(&raw, &Rfc3339)
                .with_context(|| format!("parse deleted_at {raw:?}"))
        })
        .transpose()
        .map_err(to_sql_error)?;

    Ok(StoredRecord {
        id: RecordId::new(row.get(0)?),
        payload,
        deleted_at,
        deleted_by: deleted_by.map(UserId::new),
    })
}

fn encode_payload(entity: EntityKind, payload: &RecordPayload) -> Result<String> {
    let json = JsonNormalizer::new(entity).payload_to_json(payload);
    serde_json::to_string(&json).with_context(|| format!("encode {} payload", entity.as_str()))
}

fn payload_text(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn now_rfc3339() -> Result<String> {
    format_timestamp(OffsetDateTime::now_utc())
}

fn format_timestamp(value: OffsetDateTime) -> Result<String> {
    value.format(&Rfc3339).context("format timestamp")
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{error:#}"),
        )),
    )
}
