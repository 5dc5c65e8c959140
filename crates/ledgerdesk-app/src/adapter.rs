// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::collections::VecDeque;

use crate::{
    ActionMeta, EntityKind, ListRequest, ListResponse, ListView, PageData, Record, RecordId,
    RecordPayload,
};

/// CRUD access to one entity's records. `Raw` is whatever the backend hands
/// back; [`EntityAdapter::normalize`] is the only place it is interpreted.
pub trait EntityAdapter {
    type Raw;

    fn kind(&self) -> EntityKind;
    fn list(&self, page: u32, limit: u32) -> Result<PageData<Self::Raw>>;
    fn search(&self, query: &str) -> Result<Vec<Self::Raw>>;
    fn create(&self, payload: &RecordPayload) -> Result<Self::Raw>;
    fn update(&self, id: RecordId, payload: &RecordPayload) -> Result<Self::Raw>;
    fn delete(&self, id: RecordId, meta: &ActionMeta) -> Result<()>;
    fn list_inactive(&self) -> Result<Vec<Self::Raw>>;
    fn restore(&self, id: RecordId, meta: &ActionMeta) -> Result<()>;
    fn normalize(&self, raw: Self::Raw) -> Result<Record>;
}

/// Runs one request and packages the outcome for [`ListView::apply`].
pub fn execute<A>(adapter: &A, request: &ListRequest) -> ListResponse
where
    A: EntityAdapter + ?Sized,
{
    let entity = adapter.kind().as_str();
    match request {
        ListRequest::Load {
            ticket,
            page,
            limit,
        } => ListResponse::Loaded {
            ticket: *ticket,
            result: adapter
                .list(*page, *limit)
                .and_then(|data| {
                    Ok(PageData {
                        records: normalize_all(adapter, data.records)?,
                        total: data.total,
                    })
                })
                .with_context(|| format!("load {entity} page {page}")),
        },
        ListRequest::Search { ticket, query } => ListResponse::Searched {
            ticket: *ticket,
            result: adapter
                .search(query)
                .and_then(|rows| normalize_all(adapter, rows))
                .with_context(|| format!("search {entity} for {query:?}")),
        },
        ListRequest::LoadInactive { ticket } => ListResponse::InactiveLoaded {
            ticket: *ticket,
            result: adapter
                .list_inactive()
                .and_then(|rows| normalize_all(adapter, rows))
                .with_context(|| format!("load inactive {entity}")),
        },
        ListRequest::Create { ticket, payload } => ListResponse::Mutated {
            ticket: *ticket,
            result: adapter
                .create(payload)
                .map(|raw| read_back(adapter, raw))
                .with_context(|| format!("create {entity} record")),
        },
        ListRequest::Update {
            ticket,
            id,
            payload,
        } => ListResponse::Mutated {
            ticket: *ticket,
            result: adapter
                .update(*id, payload)
                .map(|raw| read_back(adapter, raw))
                .with_context(|| format!("update {entity} record {id}")),
        },
        ListRequest::Delete { ticket, id, meta } => ListResponse::Mutated {
            ticket: *ticket,
            result: adapter
                .delete(*id, meta)
                .with_context(|| format!("delete {entity} record {id}")),
        },
        ListRequest::Restore { ticket, id, meta } => ListResponse::Mutated {
            ticket: *ticket,
            result: adapter
                .restore(*id, meta)
                .with_context(|| format!("restore {entity} record {id}")),
        },
    }
}

/// Executes `requests` and every follow-up they trigger, in issue order,
/// until the view is idle. Returns how many requests ran.
pub fn run_to_idle<A>(view: &mut ListView, adapter: &A, requests: Vec<ListRequest>) -> usize
where
    A: EntityAdapter + ?Sized,
{
    let mut queue = VecDeque::from(requests);
    let mut executed = 0;
    while let Some(request) = queue.pop_front() {
        let response = execute(adapter, &request);
        executed += 1;
        queue.extend(view.apply(response).followups());
    }
    executed
}

fn normalize_all<A>(adapter: &A, rows: Vec<A::Raw>) -> Result<Vec<Record>>
where
    A: EntityAdapter + ?Sized,
{
    rows.into_iter().map(|raw| adapter.normalize(raw)).collect()
}

// The backend already accepted the write; an unreadable echo is only logged.
fn read_back<A>(adapter: &A, raw: A::Raw)
where
    A: EntityAdapter + ?Sized,
{
    match adapter.normalize(raw) {
        Ok(record) => tracing::debug!(
            entity = adapter.kind().as_str(),
            id = record.id.get(),
            "record saved"
        ),
        Err(error) => tracing::warn!(
            entity = adapter.kind().as_str(),
            error = %format!("{error:#}"),
            "saved record could not be read back"
        ),
    }
}
