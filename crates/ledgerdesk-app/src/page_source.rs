// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::collections::BTreeMap;

use crate::{Page, PageData, Record, Resolution, Ticket, total_pages};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: Ticket,
    pub page: u32,
    pub limit: u32,
}

/// The server-paginated window of active records.
///
/// The held [`Page`] is only ever replaced wholesale by a successful load.
/// Overlapping loads for the same page/limit resolve last-wins; loads for a
/// page/limit the user has since moved away from, or issued before a
/// confirmed mutation, are stale.
#[derive(Debug, Clone)]
pub struct PageSource {
    held: Page,
    requested_page: u32,
    requested_limit: u32,
    in_flight: BTreeMap<Ticket, (u32, u32)>,
    barrier: Option<Ticket>,
}

impl PageSource {
    pub fn new(limit: u32) -> Self {
        let limit = limit.max(1);
        Self {
            held: Page::empty(limit),
            requested_page: 1,
            requested_limit: limit,
            in_flight: BTreeMap::new(),
            barrier: None,
        }
    }

    pub fn page(&self) -> &Page {
        &self.held
    }

    pub fn requested_page(&self) -> u32 {
        self.requested_page
    }

    pub fn requested_limit(&self) -> u32 {
        self.requested_limit
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.held.total, self.requested_limit)
    }

    pub fn can_go_next(&self) -> bool {
        self.requested_page < self.total_pages()
    }

    pub fn can_go_prev(&self) -> bool {
        self.requested_page > 1
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
            .iter()
            .any(|(ticket, target)| self.is_current(*ticket, *target))
    }

    pub fn load(&mut self, ticket: Ticket, page: u32, limit: u32) -> LoadRequest {
        self.requested_page = page.max(1);
        self.requested_limit = limit.max(1);
        self.in_flight
            .insert(ticket, (self.requested_page, self.requested_limit));
        LoadRequest {
            ticket,
            page: self.requested_page,
            limit: self.requested_limit,
        }
    }

    pub fn refresh(&mut self, ticket: Ticket) -> LoadRequest {
        self.load(ticket, self.requested_page, self.requested_limit)
    }

    pub fn set_page(&mut self, ticket: Ticket, page: u32) -> LoadRequest {
        self.load(ticket, page, self.requested_limit)
    }

    /// A new page size invalidates the old page index, so this always
    /// returns to page 1. A zero limit is ignored.
    pub fn set_limit(&mut self, ticket: Ticket, limit: u32) -> Option<LoadRequest> {
        if limit == 0 {
            return None;
        }
        Some(self.load(ticket, 1, limit))
    }

    pub fn next_page(&mut self, ticket: Ticket) -> Option<LoadRequest> {
        if !self.can_go_next() {
            return None;
        }
        let page = self.requested_page + 1;
        Some(self.set_page(ticket, page))
    }

    pub fn prev_page(&mut self, ticket: Ticket) -> Option<LoadRequest> {
        if !self.can_go_prev() {
            return None;
        }
        let page = self.requested_page - 1;
        Some(self.set_page(ticket, page))
    }

    pub fn first_page(&mut self, ticket: Ticket) -> Option<LoadRequest> {
        if self.requested_page == 1 {
            return None;
        }
        Some(self.set_page(ticket, 1))
    }

    pub fn last_page(&mut self, ticket: Ticket) -> Option<LoadRequest> {
        let last = self.total_pages();
        if self.requested_page == last {
            return None;
        }
        Some(self.set_page(ticket, last))
    }

    /// Every load issued before `ticket` becomes stale. Used once a mutation
    /// is confirmed and `ticket` is the reload that reflects it.
    pub fn invalidate_before(&mut self, ticket: Ticket) {
        self.barrier = Some(self.barrier.map_or(ticket, |barrier| barrier.max(ticket)));
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<PageData<Record>>) -> Resolution {
        let Some(target) = self.in_flight.remove(&ticket) else {
            return Resolution::Stale;
        };
        if !self.is_current(ticket, target) {
            return Resolution::Stale;
        }

        let (page, limit) = target;
        match result {
            Ok(mut data) => {
                if data.records.len() > limit as usize {
                    tracing::warn!(
                        returned = data.records.len(),
                        limit,
                        "page larger than requested limit; truncating"
                    );
                    data.records.truncate(limit as usize);
                }
                self.held = Page {
                    records: data.records,
                    page,
                    limit,
                    total: data.total,
                };
                Resolution::Applied
            }
            Err(error) => {
                let retry_pending = self
                    .in_flight
                    .iter()
                    .any(|(other, other_target)| self.is_current(*other, *other_target));
                if !retry_pending {
                    self.requested_page = self.held.page;
                    self.requested_limit = self.held.limit;
                }
                Resolution::Failed(error)
            }
        }
    }

    fn is_current(&self, ticket: Ticket, target: (u32, u32)) -> bool {
        let after_barrier = self.barrier.is_none_or(|barrier| ticket >= barrier);
        after_barrier && target == (self.requested_page, self.requested_limit)
    }
}
