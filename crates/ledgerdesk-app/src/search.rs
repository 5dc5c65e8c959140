// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{Record, Resolution, Ticket, TicketCounter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub ticket: Ticket,
    pub query: String,
}

/// Search-override mode. While the query is non-blank the rendered rows are
/// the (unpaginated) search results and pagination is inert.
#[derive(Debug, Clone, Default)]
pub struct SearchMode {
    query: String,
    results: Vec<Record>,
    latest: Option<Ticket>,
    in_flight: bool,
}

impl SearchMode {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn results(&self) -> &[Record] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Blank text leaves search mode without fetching; anything else always
    /// fetches, even when it repeats an earlier query.
    pub fn set_query(&mut self, text: &str, tickets: &mut TicketCounter) -> Option<SearchRequest> {
        self.query = text.to_owned();
        if !self.is_active() {
            self.results.clear();
            self.latest = None;
            self.in_flight = false;
            return None;
        }

        let ticket = tickets.issue();
        self.latest = Some(ticket);
        self.in_flight = true;
        Some(SearchRequest {
            ticket,
            query: text.trim().to_owned(),
        })
    }

    /// Re-issues the current query, e.g. after a mutation changed the data
    /// behind the result set.
    pub fn rerun(&mut self, tickets: &mut TicketCounter) -> Option<SearchRequest> {
        if !self.is_active() {
            return None;
        }
        let query = self.query.clone();
        self.set_query(&query, tickets)
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<Vec<Record>>) -> Resolution {
        if self.latest != Some(ticket) || !self.in_flight {
            return Resolution::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(records) => {
                self.results = records;
                Resolution::Applied
            }
            Err(error) => Resolution::Failed(error),
        }
    }
}
