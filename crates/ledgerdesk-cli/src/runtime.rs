// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use ledgerdesk_api::HttpAdapter;
use ledgerdesk_app::{EntityKind, ListRequest, ListResponse, Outbound, execute};
use ledgerdesk_db::Store;
use ledgerdesk_tui::{AppRuntime, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;

/// Runs requests inline against the local database.
pub struct SqliteRuntime<'a> {
    store: &'a Store,
}

impl<'a> SqliteRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl AppRuntime for SqliteRuntime<'_> {
    fn execute(&mut self, entity: EntityKind, request: &ListRequest) -> ListResponse {
        execute(&self.store.adapter(entity), request)
    }
}

/// Sends each request from its own worker thread so a slow server never
/// blocks key handling. Late answers are sorted out by the screen epoch and
/// request tickets.
pub struct HttpRuntime {
    client: HttpAdapter,
}

impl HttpRuntime {
    pub fn new(client: HttpAdapter) -> Self {
        Self { client }
    }
}

impl AppRuntime for HttpRuntime {
    fn execute(&mut self, entity: EntityKind, request: &ListRequest) -> ListResponse {
        execute(&self.client.for_entity(entity), request)
    }

    fn spawn_request(&mut self, outbound: Outbound, tx: Sender<InternalEvent>) -> Result<()> {
        let adapter = self.client.for_entity(outbound.entity);
        thread::Builder::new()
            .name(format!("ledgerdesk-{}", outbound.entity.as_str()))
            .spawn(move || {
                let response = execute(&adapter, &outbound.request);
                let sent = tx.send(InternalEvent::Response {
                    epoch: outbound.epoch,
                    response,
                });
                if sent.is_err() {
                    tracing::debug!(
                        entity = outbound.entity.as_str(),
                        "response arrived after shutdown"
                    );
                }
            })
            .context("spawn request worker")?;
        Ok(())
    }
}
