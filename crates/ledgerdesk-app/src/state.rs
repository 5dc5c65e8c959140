// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{
    Applied, ColumnVisibility, EntityKind, ListCommand, ListRequest, ListResponse, ListView,
    ModuleKind, UserId,
};

/// Identifies one mounted screen. Responses addressed to an older epoch
/// belong to a screen that has since been discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenEpoch(u64);

impl ScreenEpoch {
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A request bound to the screen that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub epoch: ScreenEpoch,
    pub entity: EntityKind,
    pub request: ListRequest,
}

#[derive(Debug, Clone)]
pub struct Screen {
    pub epoch: ScreenEpoch,
    pub view: ListView,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub active: EntityKind,
    pub current_user: UserId,
    pub page_size: u32,
    pub show_inactive: bool,
    pub status_line: Option<String>,
    column_prefs: BTreeMap<EntityKind, ColumnVisibility>,
    screen: Option<Screen>,
    last_epoch: u64,
    outbox: Vec<Outbound>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    NextModule,
    PrevModule,
    Open(EntityKind),
    List(ListCommand),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ScreenMounted {
        entity: EntityKind,
        epoch: ScreenEpoch,
    },
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(current_user: UserId, page_size: u32) -> Self {
        Self {
            active: EntityKind::ALL[0],
            current_user,
            page_size: page_size.max(1),
            show_inactive: false,
            status_line: None,
            column_prefs: BTreeMap::new(),
            screen: None,
            last_epoch: 0,
            outbox: Vec::new(),
        }
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn view(&self) -> Option<&ListView> {
        self.screen.as_ref().map(|screen| &screen.view)
    }

    pub fn column_prefs(&self, entity: EntityKind) -> Option<&ColumnVisibility> {
        self.column_prefs.get(&entity)
    }

    /// Drains requests issued since the last call.
    pub fn take_requests(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::NextModule => self.rotate_module(1),
            AppCommand::PrevModule => self.rotate_module(-1),
            AppCommand::Open(entity) => self.mount(entity),
            AppCommand::List(command) => {
                let Some(screen) = self.screen.as_mut() else {
                    return vec![self.set_status("no screen open")];
                };
                let requests = screen.view.dispatch(command);
                let (epoch, entity) = (screen.epoch, screen.view.kind());
                self.queue(epoch, entity, requests);
                Vec::new()
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Hands a response to the screen that issued it. Returns whether it was
    /// applied; responses for discarded screens or stale tickets are not.
    pub fn deliver(&mut self, epoch: ScreenEpoch, response: ListResponse) -> bool {
        let Some(screen) = self.screen.as_mut().filter(|screen| screen.epoch == epoch) else {
            tracing::debug!(
                epoch = epoch.get(),
                ticket = response.ticket().get(),
                "response for discarded screen dropped"
            );
            return false;
        };
        let entity = screen.view.kind();
        match screen.view.apply(response) {
            Applied::Fresh(followups) => {
                self.queue(epoch, entity, followups);
                true
            }
            Applied::StaleDiscarded => false,
        }
    }

    fn mount(&mut self, entity: EntityKind) -> Vec<AppEvent> {
        if let Some(previous) = self.screen.take() {
            self.column_prefs
                .insert(previous.view.kind(), previous.view.committed_columns().clone());
        }

        self.last_epoch = self.last_epoch.saturating_add(1);
        let epoch = ScreenEpoch(self.last_epoch);
        let mut view = ListView::new(entity, self.current_user, self.page_size);
        if let Some(saved) = self.column_prefs.get(&entity) {
            view = view.with_columns(saved);
        }

        let mut requests = view.mount();
        if self.show_inactive {
            requests.extend(view.dispatch(ListCommand::ToggleInactive));
        }
        self.active = entity;
        self.screen = Some(Screen { epoch, view });
        self.queue(epoch, entity, requests);
        tracing::debug!(entity = entity.as_str(), epoch = epoch.get(), "screen mounted");
        vec![AppEvent::ScreenMounted { entity, epoch }]
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = EntityKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.mount(tabs[next])
    }

    fn rotate_module(&mut self, delta: isize) -> Vec<AppEvent> {
        let modules = ModuleKind::ALL;
        let current = modules
            .iter()
            .position(|module| *module == self.active.module())
            .unwrap_or(0) as isize;
        let len = modules.len() as isize;
        let next = modules[(current + delta).rem_euclid(len) as usize];
        match EntityKind::ALL.into_iter().find(|kind| kind.module() == next) {
            Some(entity) => self.mount(entity),
            None => vec![self.set_status(&format!("{} has no screens", next.label()))],
        }
    }

    fn queue(&mut self, epoch: ScreenEpoch, entity: EntityKind, requests: Vec<ListRequest>) {
        self.outbox
            .extend(requests.into_iter().map(|request| Outbound {
                epoch,
                entity,
                request,
            }));
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
