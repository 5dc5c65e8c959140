// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use ledgerdesk_app::{
    ActionMeta, EntityAdapter, EntityKind, FieldValue, ListCommand, ListView, RecordId,
    RecordPayload, UserId, run_to_idle,
};
use ledgerdesk_db::{Store, validate_db_path};
use ledgerdesk_testkit::{LedgerFaker, ids};

fn store_with(entity: EntityKind, count: u32) -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    for payload in LedgerFaker::new(11).payloads(entity, count) {
        store.create_record(entity, &payload)?;
    }
    Ok(store)
}

fn customer(code: &str, name: &str) -> RecordPayload {
    RecordPayload::from([
        ("code".to_owned(), FieldValue::text(code)),
        ("name".to_owned(), FieldValue::text(name)),
    ])
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("/tmp/ledgerdesk.db").is_ok());
}

#[test]
fn bootstrap_is_idempotent_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ledgerdesk.db");
    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        store.create_record(EntityKind::Customer, &customer("C-1", "Acme"))?;
    }

    let store = Store::open(&path)?;
    store.bootstrap()?;
    let page = store.list_records(EntityKind::Customer, 1, 10)?;
    assert_eq!(page.total, 1);
    Ok(())
}

#[test]
fn bootstrap_rejects_foreign_schema() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE records (id INTEGER PRIMARY KEY, entity TEXT NOT NULL);")?;

    let error = store.bootstrap().expect_err("missing columns should fail");
    let message = format!("{error:#}");
    assert!(message.contains("missing required columns"), "{message}");
    assert!(message.contains("payload"), "{message}");
    Ok(())
}

#[test]
fn pages_are_ordered_by_id_and_scoped_to_entity() -> Result<()> {
    let store = store_with(EntityKind::Item, 12)?;
    store.create_record(EntityKind::Customer, &customer("C-1", "Acme"))?;

    let second = store.list_records(EntityKind::Item, 2, 5)?;
    assert_eq!(second.total, 12);
    let ids: Vec<i64> = second.records.iter().map(|row| row.id.get()).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);

    let past_end = store.list_records(EntityKind::Item, 9, 5)?;
    assert!(past_end.records.is_empty());
    assert_eq!(past_end.total, 12);

    assert!(store.list_records(EntityKind::Item, 0, 5).is_err());
    Ok(())
}

#[test]
fn search_is_case_insensitive_and_literal() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.create_record(EntityKind::Customer, &customer("C-1", "Foo Holdings"))?;
    store.create_record(EntityKind::Customer, &customer("C-2", "Harbor Mills"))?;
    store.create_record(EntityKind::Customer, &customer("C-3", "BIGFOOT outdoor"))?;
    store.create_record(EntityKind::Customer, &customer("C-4", "100% Cotton"))?;

    let found: Vec<i64> = store
        .search_records(EntityKind::Customer, "foo")?
        .iter()
        .map(|row| row.id.get())
        .collect();
    assert_eq!(found, vec![1, 3]);

    let literal = store.search_records(EntityKind::Customer, "0%")?;
    assert_eq!(literal.len(), 1);
    assert!(store.search_records(EntityKind::Customer, "c_")?.is_empty());
    Ok(())
}

#[test]
fn search_folds_non_ascii_case() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.create_record(EntityKind::Customer, &customer("C-1", "Ängelholm Trading"))?;
    store.create_record(EntityKind::Customer, &customer("C-2", "Östra Depå"))?;
    store.create_record(EntityKind::Customer, &customer("C-3", "Angel Foods"))?;

    let found: Vec<i64> = store
        .search_records(EntityKind::Customer, "ä")?
        .iter()
        .map(|row| row.id.get())
        .collect();
    assert_eq!(found, vec![1, 2]);

    let upper = store.search_records(EntityKind::Customer, "DEPÅ")?;
    assert_eq!(upper.len(), 1);
    assert_eq!(upper[0].id, RecordId::new(2));
    Ok(())
}

#[test]
fn soft_delete_records_audit_and_restore_clears_it() -> Result<()> {
    let store = store_with(EntityKind::Department, 3)?;
    let id = RecordId::new(2);
    let meta = ActionMeta::now(UserId::new(42));

    store.soft_delete(EntityKind::Department, id, &meta)?;
    let deleted = store.get_record(EntityKind::Department, id)?;
    assert!(deleted.is_deleted());
    assert_eq!(deleted.deleted_by, Some(UserId::new(42)));
    assert_eq!(store.list_records(EntityKind::Department, 1, 10)?.total, 2);
    assert!(store.soft_delete(EntityKind::Department, id, &meta).is_err());
    assert!(
        store
            .update_record(EntityKind::Department, id, &RecordPayload::new())
            .is_err(),
        "inactive rows are read-only"
    );

    store.restore(EntityKind::Department, id, &meta)?;
    let restored = store.get_record(EntityKind::Department, id)?;
    assert!(!restored.is_deleted());
    assert_eq!(restored.deleted_by, None);
    assert!(store.list_inactive(EntityKind::Department)?.is_empty());
    assert!(store.restore(EntityKind::Department, id, &meta).is_err());
    Ok(())
}

#[test]
fn adapter_normalizes_typed_fields() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let payload = RecordPayload::from([
        ("sku".to_owned(), FieldValue::text("SKU-00001")),
        ("name".to_owned(), FieldValue::text("Hex bolt")),
        ("price".to_owned(), FieldValue::Decimal(12.5)),
        ("on_hand".to_owned(), FieldValue::Integer(300)),
        ("unknown".to_owned(), FieldValue::text("dropped")),
    ]);
    let adapter = store.adapter(EntityKind::Item);
    let raw = adapter.create(&payload)?;
    let record = adapter.normalize(raw)?;

    assert_eq!(record.id, RecordId::new(1));
    assert_eq!(record.get("price"), Some(&FieldValue::Decimal(12.5)));
    assert_eq!(record.get("on_hand"), Some(&FieldValue::Integer(300)));
    assert_eq!(record.get("unit"), Some(&FieldValue::Null));
    assert_eq!(record.get("unknown"), None);
    Ok(())
}

#[test]
fn demo_seed_fills_every_entity_once() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let written = store.seed_demo_data(7)?;
    assert!(written > 0);
    assert_eq!(store.seed_demo_data(7)?, 0);

    let counts = store.entity_counts()?;
    assert_eq!(counts.len(), EntityKind::ALL.len());
    for count in counts {
        assert!(count.active > 0, "{} has no active rows", count.entity.as_str());
    }
    let customers = store.entity_counts()?[0];
    assert_eq!(customers.inactive, 64 / 9);
    Ok(())
}

#[test]
fn list_view_pages_searches_and_restores_against_sqlite() -> Result<()> {
    let store = store_with(EntityKind::Supplier, 23)?;
    let adapter = store.adapter(EntityKind::Supplier);
    let mut view = ListView::new(EntityKind::Supplier, UserId::new(5), 10);
    let mount = view.mount();
    run_to_idle(&mut view, &adapter, mount);

    let model = view.render();
    assert_eq!((model.total, model.total_pages), (23, 3));
    assert_eq!(ids(&model.visible_records), (1..=10).collect::<Vec<_>>());

    let last = view.dispatch(ListCommand::LastPage);
    run_to_idle(&mut view, &adapter, last);
    assert_eq!(ids(&view.render().visible_records), vec![21, 22, 23]);

    let expand = view.dispatch(ListCommand::ToggleInactive);
    run_to_idle(&mut view, &adapter, expand);
    let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(22)));
    run_to_idle(&mut view, &adapter, delete);
    let model = view.render();
    assert_eq!(ids(&model.visible_records), vec![21, 23]);
    assert_eq!(ids(&model.visible_inactive), vec![22]);
    assert_eq!(
        store
            .get_record(EntityKind::Supplier, RecordId::new(22))?
            .deleted_by,
        Some(UserId::new(5))
    );

    let restore = view.dispatch(ListCommand::RestoreRecord(RecordId::new(22)));
    run_to_idle(&mut view, &adapter, restore);
    let model = view.render();
    assert_eq!(ids(&model.visible_records), vec![21, 22, 23]);
    assert!(model.visible_inactive.is_empty());

    let name = store
        .get_record(EntityKind::Supplier, RecordId::new(7))?
        .payload["name"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_default();
    let search = view.dispatch(ListCommand::SetQuery(name.to_uppercase()));
    run_to_idle(&mut view, &adapter, search);
    let model = view.render();
    assert!(ids(&model.visible_records).contains(&7));
    assert!(!model.pagination_enabled);
    Ok(())
}
