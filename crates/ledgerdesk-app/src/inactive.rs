// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{Record, RecordId, Resolution, Ticket, TicketCounter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Collapsed,
    Expanded,
}

/// Soft-deleted records for one entity, shown below the active rows when
/// expanded. Always fetched as a whole set.
#[derive(Debug, Clone)]
pub struct InactiveShadowList {
    state: PanelState,
    records: Option<Vec<Record>>,
    stale: bool,
    latest: Option<Ticket>,
    in_flight: bool,
}

impl Default for InactiveShadowList {
    fn default() -> Self {
        Self {
            state: PanelState::Collapsed,
            records: None,
            stale: false,
            latest: None,
            in_flight: false,
        }
    }
}

impl InactiveShadowList {
    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == PanelState::Expanded
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Rows to render: empty while collapsed.
    pub fn visible(&self) -> &[Record] {
        match (self.state, &self.records) {
            (PanelState::Expanded, Some(records)) => records.as_slice(),
            _ => &[],
        }
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records
            .as_ref()?
            .iter()
            .find(|record| record.id == id)
    }

    /// Flips the panel. Expanding fetches when nothing is held or the held
    /// set is known stale; collapsing keeps the data.
    pub fn toggle(&mut self, tickets: &mut TicketCounter) -> Option<Ticket> {
        match self.state {
            PanelState::Expanded => {
                self.state = PanelState::Collapsed;
                None
            }
            PanelState::Collapsed => {
                self.state = PanelState::Expanded;
                if self.records.is_none() || self.stale {
                    Some(self.reload(tickets))
                } else {
                    None
                }
            }
        }
    }

    pub fn reload(&mut self, tickets: &mut TicketCounter) -> Ticket {
        let ticket = tickets.issue();
        self.latest = Some(ticket);
        self.in_flight = true;
        ticket
    }

    /// Records that the server-side inactive set changed. Reloads right away
    /// when expanded; otherwise the next expand refetches.
    pub fn invalidate(&mut self, tickets: &mut TicketCounter) -> Option<Ticket> {
        self.stale = true;
        if self.is_expanded() {
            Some(self.reload(tickets))
        } else {
            // Anything still in flight predates the change.
            self.latest = None;
            self.in_flight = false;
            None
        }
    }

    /// Optimistic removal after a confirmed restore.
    pub fn remove(&mut self, id: RecordId) {
        if let Some(records) = self.records.as_mut() {
            records.retain(|record| record.id != id);
        }
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<Vec<Record>>) -> Resolution {
        if self.latest != Some(ticket) || !self.in_flight {
            return Resolution::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(records) => {
                self.records = Some(records);
                self.stale = false;
                Resolution::Applied
            }
            Err(error) => Resolution::Failed(error),
        }
    }
}
