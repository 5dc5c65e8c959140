// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use ledgerdesk_app::{
    EmptyState, EntityAdapter, EntityKind, ErrorKind, FieldValue, ListCommand, ListView,
    RecordId, UserId, run_to_idle,
};
use ledgerdesk_testkit::{LedgerFaker, MemoryAdapter, Operation, ids};

fn customers_with_two_foos() -> MemoryAdapter {
    let adapter = MemoryAdapter::new(EntityKind::Customer);
    for (index, mut payload) in LedgerFaker::new(5)
        .payloads(EntityKind::Customer, 60)
        .into_iter()
        .enumerate()
    {
        if index == 3 {
            payload.insert("name".to_owned(), FieldValue::text("Foo Holdings"));
        }
        if index == 41 {
            payload.insert("name".to_owned(), FieldValue::text("Bigfoot Outdoor"));
        }
        adapter.insert(payload);
    }
    adapter
}

fn mounted(adapter: &MemoryAdapter, page_size: u32) -> ListView {
    let mut view = ListView::new(adapter.kind(), UserId::new(12), page_size);
    let mount = view.mount();
    run_to_idle(&mut view, adapter, mount);
    view
}

#[test]
fn search_replaces_page_with_all_matches() {
    let adapter = customers_with_two_foos();
    let mut view = mounted(&adapter, 25);
    let before = view.render();
    assert_eq!((before.page, before.limit, before.total), (1, 25, 60));
    assert_eq!(before.total_pages, 3);

    let search = view.dispatch(ListCommand::SetQuery("foo".to_owned()));
    run_to_idle(&mut view, &adapter, search);

    let model = view.render();
    assert_eq!(ids(&model.visible_records), vec![4, 42]);
    assert_eq!(model.total, 2);
    assert_eq!(model.total_pages, 1);
    assert!(!model.pagination_enabled);
}

#[test]
fn pagination_walks_server_pages() {
    let adapter = customers_with_two_foos();
    let mut view = mounted(&adapter, 25);

    for command in [ListCommand::NextPage, ListCommand::NextPage] {
        let requests = view.dispatch(command);
        run_to_idle(&mut view, &adapter, requests);
    }
    let model = view.render();
    assert_eq!(model.page, 3);
    assert_eq!(model.visible_records.len(), 10);
    assert!(view.dispatch(ListCommand::NextPage).is_empty());

    let requests = view.dispatch(ListCommand::SetLimit(50));
    run_to_idle(&mut view, &adapter, requests);
    let model = view.render();
    assert_eq!((model.page, model.limit, model.total_pages), (1, 50, 2));
}

#[test]
fn delete_and_restore_round_trip() -> Result<()> {
    let adapter = MemoryAdapter::seeded(EntityKind::Department, 6, 2);
    let mut view = mounted(&adapter, 10);
    let expand = view.dispatch(ListCommand::ToggleInactive);
    run_to_idle(&mut view, &adapter, expand);
    assert!(view.render().visible_inactive.is_empty());

    let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(5)));
    run_to_idle(&mut view, &adapter, delete);
    let model = view.render();
    assert_eq!(ids(&model.visible_records), vec![1, 2, 3, 4, 6]);
    assert_eq!(ids(&model.visible_inactive), vec![5]);
    let meta = adapter
        .deleted_meta(RecordId::new(5))
        .expect("delete carries audit data");
    assert_eq!(meta.user_id, UserId::new(12));

    view.dispatch(ListCommand::OpenInactive(RecordId::new(5)));
    let restore = view.dispatch(ListCommand::RestoreRecord(RecordId::new(5)));
    run_to_idle(&mut view, &adapter, restore);
    let model = view.render();
    assert_eq!(ids(&model.visible_records), vec![1, 2, 3, 4, 5, 6]);
    assert!(model.visible_inactive.is_empty());
    assert!(model.form.is_none());
    assert_eq!(adapter.inactive_ids(), Vec::<i64>::new());
    Ok(())
}

#[test]
fn collapsed_panel_refetches_after_delete() {
    let adapter = MemoryAdapter::seeded(EntityKind::Warehouse, 3, 4);
    let mut view = mounted(&adapter, 10);
    let expand = view.dispatch(ListCommand::ToggleInactive);
    run_to_idle(&mut view, &adapter, expand);
    view.dispatch(ListCommand::ToggleInactive);

    let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(1)));
    run_to_idle(&mut view, &adapter, delete);
    let expand = view.dispatch(ListCommand::ToggleInactive);
    assert_eq!(expand.len(), 1, "stale inactive set is refetched");
    run_to_idle(&mut view, &adapter, expand);
    assert_eq!(ids(&view.render().visible_inactive), vec![1]);
}

#[test]
fn backend_failures_keep_last_good_state() {
    let adapter = MemoryAdapter::seeded(EntityKind::Item, 8, 9);
    let mut view = mounted(&adapter, 5);
    adapter.fail(Operation::List);
    adapter.fail(Operation::Delete);

    let next = view.dispatch(ListCommand::NextPage);
    run_to_idle(&mut view, &adapter, next);
    let model = view.render();
    assert_eq!(model.page, 1);
    assert_eq!(ids(&model.visible_records), vec![1, 2, 3, 4, 5]);
    let error = model.error.expect("load failure surfaces");
    assert_eq!(error.kind, ErrorKind::Fetch);
    assert!(error.message.contains("load items page 2"), "{}", error.message);

    let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(2)));
    run_to_idle(&mut view, &adapter, delete);
    assert_eq!(ids(&view.render().visible_records), vec![1, 2, 3, 4, 5]);
    assert_eq!(adapter.inactive_ids(), Vec::<i64>::new());

    adapter.recover(Operation::List);
    let retry = view.dispatch(ListCommand::NextPage);
    run_to_idle(&mut view, &adapter, retry);
    assert_eq!(ids(&view.render().visible_records), vec![6, 7, 8]);
}

#[test]
fn create_and_edit_through_form() {
    let adapter = MemoryAdapter::new(EntityKind::Meeting);
    let mut view = mounted(&adapter, 10);
    assert_eq!(view.render().empty_state, Some(EmptyState::NoRecords));

    view.dispatch(ListCommand::OpenCreate);
    for (key, raw) in [("title", "Budget planning"), ("meeting_date", "2026-02-10")] {
        view.dispatch(ListCommand::SetFormInput {
            key: key.to_owned(),
            raw: raw.to_owned(),
        });
    }
    let create = view.dispatch(ListCommand::SubmitForm);
    run_to_idle(&mut view, &adapter, create);
    let model = view.render();
    assert_eq!(ids(&model.visible_records), vec![1]);
    assert_eq!(model.visible_records[0].display("meeting_date"), "2026-02-10");

    view.dispatch(ListCommand::OpenEdit(RecordId::new(1)));
    view.dispatch(ListCommand::SetFormInput {
        key: "venue".to_owned(),
        raw: "Board room".to_owned(),
    });
    let update = view.dispatch(ListCommand::SubmitForm);
    run_to_idle(&mut view, &adapter, update);
    assert_eq!(view.render().visible_records[0].display("venue"), "Board room");
    assert!(
        adapter
            .calls()
            .iter()
            .any(|operation| *operation == Operation::Update)
    );
}

#[test]
fn validation_blocks_the_backend_call() {
    let adapter = MemoryAdapter::new(EntityKind::SalesInvoice);
    let mut view = mounted(&adapter, 10);
    view.dispatch(ListCommand::OpenCreate);
    let create = view.dispatch(ListCommand::SubmitForm);

    assert!(create.is_empty());
    assert_eq!(
        view.error().map(|error| error.kind),
        Some(ErrorKind::Validation)
    );
    assert!(!adapter.calls().contains(&Operation::Create));
}
