// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! One list screen: a server-paginated table with search, sort, a column
//! picker, and the inactive (soft-deleted) panel.
//!
//! [`ListView`] never performs I/O. Commands return [`ListRequest`]s that the
//! host executes against an [`crate::EntityAdapter`]; the outcomes come back
//! through [`ListView::apply`] as [`ListResponse`]s carrying the same
//! [`Ticket`]. Responses that no longer describe what the user is looking at
//! are dropped there.

use anyhow::{Error, Result, anyhow};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::{
    ActionMeta, ColumnDef, ColumnVisibility, ColumnVisibilitySet, CommitOutcome, EntityKind,
    FieldValue, FormMode, InactiveShadowList, LoadRequest, PageData, PageSource, Record,
    RecordForm, RecordId, RecordPayload, Resolution, SearchMode, SearchRequest, SortState, Ticket,
    TicketCounter, UserId, sort_records,
};

const READ_ONLY: &str = "inactive records are read-only -- restore the record to edit it";

#[derive(Debug, Clone, PartialEq)]
pub enum ListCommand {
    Refresh,
    SetPage(u32),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    SetLimit(u32),
    SetQuery(String),
    ClickHeader(String),
    ToggleInactive,
    OpenColumnPicker,
    ToggleColumn(String),
    CommitColumns,
    CancelColumns,
    RestoreDefaultColumns,
    OpenCreate,
    OpenEdit(RecordId),
    OpenInactive(RecordId),
    SetFormField { key: String, value: FieldValue },
    SetFormInput { key: String, raw: String },
    SubmitForm,
    DeleteRecord(RecordId),
    RestoreRecord(RecordId),
    CloseForm,
    DismissError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListRequest {
    Load {
        ticket: Ticket,
        page: u32,
        limit: u32,
    },
    Search {
        ticket: Ticket,
        query: String,
    },
    LoadInactive {
        ticket: Ticket,
    },
    Create {
        ticket: Ticket,
        payload: RecordPayload,
    },
    Update {
        ticket: Ticket,
        id: RecordId,
        payload: RecordPayload,
    },
    Delete {
        ticket: Ticket,
        id: RecordId,
        meta: ActionMeta,
    },
    Restore {
        ticket: Ticket,
        id: RecordId,
        meta: ActionMeta,
    },
}

impl ListRequest {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Load { ticket, .. }
            | Self::Search { ticket, .. }
            | Self::LoadInactive { ticket }
            | Self::Create { ticket, .. }
            | Self::Update { ticket, .. }
            | Self::Delete { ticket, .. }
            | Self::Restore { ticket, .. } => *ticket,
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Update { .. } | Self::Delete { .. } | Self::Restore { .. }
        )
    }
}

impl From<LoadRequest> for ListRequest {
    fn from(request: LoadRequest) -> Self {
        Self::Load {
            ticket: request.ticket,
            page: request.page,
            limit: request.limit,
        }
    }
}

impl From<SearchRequest> for ListRequest {
    fn from(request: SearchRequest) -> Self {
        Self::Search {
            ticket: request.ticket,
            query: request.query,
        }
    }
}

#[derive(Debug)]
pub enum ListResponse {
    Loaded {
        ticket: Ticket,
        result: Result<PageData<Record>>,
    },
    Searched {
        ticket: Ticket,
        result: Result<Vec<Record>>,
    },
    InactiveLoaded {
        ticket: Ticket,
        result: Result<Vec<Record>>,
    },
    Mutated {
        ticket: Ticket,
        result: Result<()>,
    },
}

impl ListResponse {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Loaded { ticket, .. }
            | Self::Searched { ticket, .. }
            | Self::InactiveLoaded { ticket, .. }
            | Self::Mutated { ticket, .. } => *ticket,
        }
    }
}

/// Outcome of [`ListView::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The response was current. Carries any requests it triggered.
    Fresh(Vec<ListRequest>),
    StaleDiscarded,
}

impl Applied {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleDiscarded)
    }

    pub fn followups(self) -> Vec<ListRequest> {
        match self {
            Self::Fresh(requests) => requests,
            Self::StaleDiscarded => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A backend call failed; the last good data stays on screen.
    Fetch,
    /// Rejected locally; nothing was sent.
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoColumns,
    NoRecords,
    NoMatches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub entity: EntityKind,
    pub columns: Vec<ColumnDef>,
    pub column_visibility: ColumnVisibility,
    pub visible_records: Vec<Record>,
    pub visible_inactive: Vec<Record>,
    pub sort: SortState,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub pagination_enabled: bool,
    pub loading: bool,
    pub error: Option<ViewError>,
    pub query: String,
    pub inactive_expanded: bool,
    pub form: Option<RecordForm>,
    pub picker: Option<Vec<PickerEntry>>,
    pub status: Option<String>,
    pub empty_state: Option<EmptyState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Create,
    Update(RecordId),
    Delete(RecordId),
    Restore(RecordId),
}

impl Mutation {
    const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update(_) => "saved",
            Self::Delete(_) => "deleted",
            Self::Restore(_) => "restored",
        }
    }

    const fn record_id(self) -> Option<RecordId> {
        match self {
            Self::Create => None,
            Self::Update(id) | Self::Delete(id) | Self::Restore(id) => Some(id),
        }
    }

    const fn touches_inactive(self) -> bool {
        matches!(self, Self::Delete(_) | Self::Restore(_))
    }
}

#[derive(Debug, Clone)]
pub struct ListView {
    kind: EntityKind,
    current_user: UserId,
    tickets: TicketCounter,
    pages: PageSource,
    search: SearchMode,
    sort: SortState,
    columns: ColumnVisibilitySet,
    inactive: InactiveShadowList,
    form: Option<RecordForm>,
    submitted: Option<Ticket>,
    mutations: BTreeMap<Ticket, Mutation>,
    error: Option<ViewError>,
    status: Option<String>,
}

impl ListView {
    pub fn new(kind: EntityKind, current_user: UserId, page_size: u32) -> Self {
        Self {
            kind,
            current_user,
            tickets: TicketCounter::default(),
            pages: PageSource::new(page_size),
            search: SearchMode::default(),
            sort: SortState::none(),
            columns: ColumnVisibilitySet::for_schema(&kind.schema()),
            inactive: InactiveShadowList::default(),
            form: None,
            submitted: None,
            mutations: BTreeMap::new(),
            error: None,
            status: None,
        }
    }

    /// Starts from a previously committed column map instead of the entity
    /// defaults.
    pub fn with_columns(mut self, saved: &ColumnVisibility) -> Self {
        self.columns = ColumnVisibilitySet::for_schema(&self.kind.schema()).reconcile(saved);
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn current_user(&self) -> UserId {
        self.current_user
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn columns(&self) -> &ColumnVisibilitySet {
        &self.columns
    }

    pub fn committed_columns(&self) -> &ColumnVisibility {
        self.columns.live()
    }

    pub fn pages(&self) -> &PageSource {
        &self.pages
    }

    pub fn search(&self) -> &SearchMode {
        &self.search
    }

    pub fn inactive(&self) -> &InactiveShadowList {
        &self.inactive
    }

    pub fn form(&self) -> Option<&RecordForm> {
        self.form.as_ref()
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pages.is_loading()
            || self.search.is_loading()
            || self.inactive.is_loading()
            || !self.mutations.is_empty()
    }

    /// The first load for a freshly shown screen.
    pub fn mount(&mut self) -> Vec<ListRequest> {
        let ticket = self.tickets.issue();
        vec![self.pages.refresh(ticket).into()]
    }

    pub fn dispatch(&mut self, command: ListCommand) -> Vec<ListRequest> {
        self.error = None;
        match command {
            ListCommand::Refresh => {
                let ticket = self.tickets.issue();
                let mut requests = vec![self.pages.refresh(ticket).into()];
                requests.extend(self.search.rerun(&mut self.tickets).map(ListRequest::from));
                if self.inactive.is_expanded() {
                    let ticket = self.inactive.reload(&mut self.tickets);
                    requests.push(ListRequest::LoadInactive { ticket });
                }
                requests
            }
            ListCommand::SetPage(page) => self.paginate(|pages, ticket| {
                let page = page.clamp(1, pages.total_pages());
                Some(pages.set_page(ticket, page))
            }),
            ListCommand::NextPage => self.paginate(PageSource::next_page),
            ListCommand::PrevPage => self.paginate(PageSource::prev_page),
            ListCommand::FirstPage => self.paginate(PageSource::first_page),
            ListCommand::LastPage => self.paginate(PageSource::last_page),
            ListCommand::SetLimit(limit) => {
                self.paginate(|pages, ticket| pages.set_limit(ticket, limit))
            }
            ListCommand::SetQuery(text) => {
                let was_active = self.search.is_active();
                match self.search.set_query(&text, &mut self.tickets) {
                    Some(request) => vec![request.into()],
                    None => {
                        if was_active {
                            self.status = Some("search cleared".to_owned());
                        }
                        Vec::new()
                    }
                }
            }
            ListCommand::ClickHeader(key) => {
                self.click_header(&key);
                Vec::new()
            }
            ListCommand::ToggleInactive => self
                .inactive
                .toggle(&mut self.tickets)
                .map(|ticket| ListRequest::LoadInactive { ticket })
                .into_iter()
                .collect(),
            ListCommand::OpenColumnPicker => {
                self.columns.open_picker();
                Vec::new()
            }
            ListCommand::ToggleColumn(key) => {
                if self.columns.is_picker_open() && !self.columns.toggle(&key) {
                    self.status = Some(format!("no column {key:?}"));
                }
                Vec::new()
            }
            ListCommand::CommitColumns => {
                if self.columns.commit() == CommitOutcome::KeepOneColumnVisible {
                    self.status = Some("keep one column visible".to_owned());
                }
                Vec::new()
            }
            ListCommand::CancelColumns => {
                self.columns.cancel();
                Vec::new()
            }
            ListCommand::RestoreDefaultColumns => {
                self.columns.restore_defaults();
                Vec::new()
            }
            ListCommand::OpenCreate => {
                self.open_form(RecordForm::blank(self.kind));
                Vec::new()
            }
            ListCommand::OpenEdit(id) => {
                match self.active_record(id) {
                    Some(record) => {
                        let form = RecordForm::edit(self.kind, record);
                        self.open_form(form);
                    }
                    None => self.reject(anyhow!("record {id} is not on screen")),
                }
                Vec::new()
            }
            ListCommand::OpenInactive(id) => {
                match self.inactive.get(id) {
                    Some(record) => {
                        let form = RecordForm::restore(self.kind, record);
                        self.open_form(form);
                    }
                    None => self.reject(anyhow!("record {id} is not inactive")),
                }
                Vec::new()
            }
            ListCommand::SetFormField { key, value } => {
                self.edit_form(|form| form.set_field(&key, value));
                Vec::new()
            }
            ListCommand::SetFormInput { key, raw } => {
                self.edit_form(|form| form.set_input(&key, &raw));
                Vec::new()
            }
            ListCommand::SubmitForm => self.submit_form(),
            ListCommand::DeleteRecord(id) => self.delete_record(id),
            ListCommand::RestoreRecord(id) => self.restore_record(id),
            ListCommand::CloseForm => {
                self.form = None;
                self.submitted = None;
                Vec::new()
            }
            ListCommand::DismissError => Vec::new(),
        }
    }

    pub fn apply(&mut self, response: ListResponse) -> Applied {
        match response {
            ListResponse::Loaded { ticket, result } => {
                let resolution = self.pages.apply(ticket, result);
                let applied = self.settle(ticket, "load", resolution);
                match applied {
                    Applied::Fresh(mut followups) => {
                        followups.extend(self.back_off_empty_page());
                        Applied::Fresh(followups)
                    }
                    Applied::StaleDiscarded => Applied::StaleDiscarded,
                }
            }
            ListResponse::Searched { ticket, result } => {
                let resolution = self.search.apply(ticket, result);
                self.settle(ticket, "search", resolution)
            }
            ListResponse::InactiveLoaded { ticket, result } => {
                let resolution = self.inactive.apply(ticket, result);
                self.settle(ticket, "inactive load", resolution)
            }
            ListResponse::Mutated { ticket, result } => self.finish_mutation(ticket, result),
        }
    }

    pub fn render(&self) -> RenderModel {
        let schema = self.kind.schema();
        let columns = schema
            .columns
            .iter()
            .filter(|column| self.columns.is_visible(column.key))
            .copied()
            .collect::<Vec<_>>();

        let searching = self.search.is_active();
        let (visible_records, page, limit, total, total_pages) = if searching {
            let results = sort_records(self.search.results(), &self.sort);
            let total = results.len() as u64;
            (results, 1, self.pages.page().limit, total, 1)
        } else {
            let held = self.pages.page();
            (
                sort_records(&held.records, &self.sort),
                held.page,
                held.limit,
                held.total,
                held.total_pages(),
            )
        };
        let visible_inactive = sort_records(self.inactive.visible(), &self.sort);

        let loading = self.is_loading();
        let empty_state = if columns.is_empty() {
            Some(EmptyState::NoColumns)
        } else if loading || !visible_records.is_empty() || !visible_inactive.is_empty() {
            None
        } else if searching {
            Some(EmptyState::NoMatches)
        } else {
            Some(EmptyState::NoRecords)
        };

        let picker = self.columns.is_picker_open().then(|| {
            schema
                .columns
                .iter()
                .map(|column| PickerEntry {
                    key: column.key,
                    label: column.label,
                    checked: self
                        .columns
                        .pending()
                        .get(column.key)
                        .copied()
                        .unwrap_or(false),
                })
                .collect()
        });

        RenderModel {
            entity: self.kind,
            columns,
            column_visibility: self.columns.live().clone(),
            visible_records,
            visible_inactive,
            sort: self.sort.clone(),
            page,
            limit,
            total,
            total_pages,
            pagination_enabled: !searching,
            loading,
            error: self.error.clone(),
            query: self.search.query().to_owned(),
            inactive_expanded: self.inactive.is_expanded(),
            form: self.form.clone(),
            picker,
            status: self.status.clone(),
            empty_state,
        }
    }

    fn paginate(
        &mut self,
        step: impl FnOnce(&mut PageSource, Ticket) -> Option<LoadRequest>,
    ) -> Vec<ListRequest> {
        if self.search.is_active() {
            self.status = Some("clear the search to page through records".to_owned());
            return Vec::new();
        }
        let ticket = self.tickets.issue();
        step(&mut self.pages, ticket)
            .map(ListRequest::from)
            .into_iter()
            .collect()
    }

    fn click_header(&mut self, key: &str) {
        let sortable = key == "id"
            || self
                .kind
                .schema()
                .column(key)
                .is_some_and(|column| column.sortable);
        if !sortable {
            self.status = Some(format!("sort unavailable for {key}"));
            return;
        }
        self.sort.cycle(key);
        self.status = Some(match self.sort.active() {
            Some((key, direction)) => format!("sort: {key} {}", direction.as_str()),
            None => "sort cleared".to_owned(),
        });
    }

    fn active_record(&self, id: RecordId) -> Option<&Record> {
        let rows = if self.search.is_active() {
            self.search.results()
        } else {
            &self.pages.page().records
        };
        rows.iter().find(|record| record.id == id)
    }

    fn open_form(&mut self, form: RecordForm) {
        self.form = Some(form);
        self.submitted = None;
    }

    fn edit_form(&mut self, edit: impl FnOnce(&mut RecordForm) -> Result<()>) {
        let result = match self.form.as_mut() {
            Some(form) => edit(form),
            None => Err(anyhow!("no form is open")),
        };
        if let Err(error) = result {
            self.reject(error);
        }
    }

    fn submit_form(&mut self) -> Vec<ListRequest> {
        let Some(form) = self.form.as_ref() else {
            self.reject(anyhow!("no form is open"));
            return Vec::new();
        };
        let mode = form.mode;
        let checked = form.validate().map(|()| form.payload());

        let (mutation, payload) = match (mode, checked) {
            (FormMode::Restore(_), _) => {
                self.reject(anyhow!(READ_ONLY));
                return Vec::new();
            }
            (_, Err(error)) => {
                self.reject(error);
                return Vec::new();
            }
            (FormMode::Create, Ok(payload)) => (Mutation::Create, payload),
            (FormMode::Edit(id), Ok(payload)) => (Mutation::Update(id), payload),
        };

        let ticket = self.begin(mutation);
        self.submitted = Some(ticket);
        match mutation {
            Mutation::Update(id) => vec![ListRequest::Update {
                ticket,
                id,
                payload,
            }],
            _ => vec![ListRequest::Create { ticket, payload }],
        }
    }

    fn delete_record(&mut self, id: RecordId) -> Vec<ListRequest> {
        let restoring = self
            .form
            .as_ref()
            .is_some_and(|form| form.mode == FormMode::Restore(id));
        if restoring || (self.inactive.get(id).is_some() && self.active_record(id).is_none()) {
            self.reject(anyhow!("record {id} is already inactive"));
            return Vec::new();
        }
        let ticket = self.begin(Mutation::Delete(id));
        vec![ListRequest::Delete {
            ticket,
            id,
            meta: ActionMeta::now(self.current_user),
        }]
    }

    fn restore_record(&mut self, id: RecordId) -> Vec<ListRequest> {
        let from_form = self
            .form
            .as_ref()
            .is_some_and(|form| form.mode == FormMode::Restore(id));
        if !from_form && self.inactive.get(id).is_none() {
            self.reject(anyhow!("record {id} is not inactive"));
            return Vec::new();
        }
        let ticket = self.begin(Mutation::Restore(id));
        vec![ListRequest::Restore {
            ticket,
            id,
            meta: ActionMeta::now(self.current_user),
        }]
    }

    fn begin(&mut self, mutation: Mutation) -> Ticket {
        let ticket = self.tickets.issue();
        debug!(
            entity = self.kind.as_str(),
            ticket = ticket.get(),
            ?mutation,
            "mutation issued"
        );
        self.mutations.insert(ticket, mutation);
        ticket
    }

    fn finish_mutation(&mut self, ticket: Ticket, result: Result<()>) -> Applied {
        let Some(mutation) = self.mutations.remove(&ticket) else {
            debug!(
                entity = self.kind.as_str(),
                ticket = ticket.get(),
                "unknown mutation response discarded"
            );
            return Applied::StaleDiscarded;
        };

        if let Err(error) = result {
            let message = format!("{error:#}");
            warn!(
                entity = self.kind.as_str(),
                ticket = ticket.get(),
                ?mutation,
                error = %message,
                "mutation failed"
            );
            self.fail(ErrorKind::Fetch, message);
            return Applied::Fresh(Vec::new());
        }

        info!(
            entity = self.kind.as_str(),
            id = mutation.record_id().map(RecordId::get),
            "record {}",
            mutation.past_tense()
        );
        self.status = Some(match mutation.record_id() {
            Some(id) => format!("{} #{id}", mutation.past_tense()),
            None => mutation.past_tense().to_owned(),
        });

        let form_target = self.form.as_ref().and_then(|form| form.mode.record_id());
        let close_form = self.submitted == Some(ticket)
            || (mutation.touches_inactive() && form_target == mutation.record_id());
        if close_form {
            self.form = None;
            self.submitted = None;
        }

        if let Mutation::Restore(id) = mutation {
            self.inactive.remove(id);
        }

        let ticket = self.tickets.issue();
        let reload = self.pages.refresh(ticket);
        self.pages.invalidate_before(ticket);

        let mut followups = vec![ListRequest::from(reload)];
        if mutation.touches_inactive()
            && let Some(ticket) = self.inactive.invalidate(&mut self.tickets)
        {
            followups.push(ListRequest::LoadInactive { ticket });
        }
        followups.extend(self.search.rerun(&mut self.tickets).map(ListRequest::from));
        Applied::Fresh(followups)
    }

    fn settle(&mut self, ticket: Ticket, what: &str, resolution: Resolution) -> Applied {
        match resolution {
            Resolution::Applied => Applied::Fresh(Vec::new()),
            Resolution::Failed(error) => {
                self.fail_fetch(ticket, what, &error);
                Applied::Fresh(Vec::new())
            }
            Resolution::Stale => {
                debug!(
                    entity = self.kind.as_str(),
                    ticket = ticket.get(),
                    "stale {what} response discarded"
                );
                Applied::StaleDiscarded
            }
        }
    }

    /// A page past the end (e.g. after deleting the only row on the last
    /// page) steps back to the new last page.
    fn back_off_empty_page(&mut self) -> Option<ListRequest> {
        let held = self.pages.page();
        if !held.records.is_empty() || held.page <= held.total_pages() {
            return None;
        }
        let ticket = self.tickets.issue();
        self.pages.last_page(ticket).map(ListRequest::from)
    }

    fn fail_fetch(&mut self, ticket: Ticket, what: &str, error: &Error) {
        let message = format!("{error:#}");
        warn!(
            entity = self.kind.as_str(),
            ticket = ticket.get(),
            error = %message,
            "{what} failed"
        );
        self.fail(ErrorKind::Fetch, message);
    }

    fn reject(&mut self, error: Error) {
        self.fail(ErrorKind::Validation, format!("{error:#}"));
    }

    fn fail(&mut self, kind: ErrorKind, message: String) {
        self.error = Some(ViewError { kind, message });
    }
}

#[cfg(test)]
mod tests {
    use super::{Applied, EmptyState, ErrorKind, ListCommand, ListRequest, ListResponse, ListView};
    use crate::{
        ColumnVisibility, EntityKind, FieldValue, PageData, Record, RecordId, SortDirection,
        SortState, Ticket, UserId,
    };
    use anyhow::anyhow;

    fn view() -> ListView {
        ListView::new(EntityKind::Department, UserId::new(7), 25)
    }

    fn row(id: i64) -> Record {
        Record::new(RecordId::new(id))
            .with("code", FieldValue::text(format!("D{id:02}")))
            .with("name", FieldValue::text(format!("name-{id:02}")))
    }

    fn rows(ids: impl IntoIterator<Item = i64>) -> Vec<Record> {
        ids.into_iter().map(row).collect()
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records.iter().map(|record| record.id.get()).collect()
    }

    fn find(requests: &[ListRequest], wanted: fn(&ListRequest) -> bool) -> Ticket {
        requests
            .iter()
            .find(|request| wanted(request))
            .map(ListRequest::ticket)
            .expect("request issued")
    }

    fn is_load(request: &ListRequest) -> bool {
        matches!(request, ListRequest::Load { .. })
    }

    fn is_search(request: &ListRequest) -> bool {
        matches!(request, ListRequest::Search { .. })
    }

    fn is_inactive(request: &ListRequest) -> bool {
        matches!(request, ListRequest::LoadInactive { .. })
    }

    fn is_mutation(request: &ListRequest) -> bool {
        request.is_mutation()
    }

    fn load(view: &mut ListView, requests: &[ListRequest], records: Vec<Record>, total: u64) -> Applied {
        view.apply(ListResponse::Loaded {
            ticket: find(requests, is_load),
            result: Ok(PageData { records, total }),
        })
    }

    fn mounted(records: Vec<Record>, total: u64) -> ListView {
        let mut view = view();
        let requests = view.mount();
        load(&mut view, &requests, records, total);
        view
    }

    fn expand_inactive(view: &mut ListView, records: Vec<Record>) {
        let requests = view.dispatch(ListCommand::ToggleInactive);
        view.apply(ListResponse::InactiveLoaded {
            ticket: find(&requests, is_inactive),
            result: Ok(records),
        });
    }

    #[test]
    fn mount_requests_first_page() {
        let mut view = view();
        let requests = view.mount();
        assert!(matches!(
            requests.as_slice(),
            [ListRequest::Load { page: 1, limit: 25, .. }]
        ));
        assert!(view.render().loading);
    }

    #[test]
    fn limit_change_resets_page() {
        let mut view = mounted(rows(1..=25), 60);
        let next = view.dispatch(ListCommand::NextPage);
        load(&mut view, &next, rows(26..=50), 60);
        assert_eq!(view.render().page, 2);

        let requests = view.dispatch(ListCommand::SetLimit(10));
        assert!(matches!(
            requests.as_slice(),
            [ListRequest::Load { page: 1, limit: 10, .. }]
        ));
    }

    #[test]
    fn search_overrides_pagination() {
        let mut view = mounted(rows(1..=25), 60);
        let requests = view.dispatch(ListCommand::SetQuery("foo".to_owned()));
        view.apply(ListResponse::Searched {
            ticket: find(&requests, is_search),
            result: Ok(rows([4, 40])),
        });

        let model = view.render();
        assert_eq!(ids(&model.visible_records), vec![4, 40]);
        assert_eq!(model.total, 2);
        assert_eq!(model.total_pages, 1);
        assert!(!model.pagination_enabled);

        for command in [
            ListCommand::NextPage,
            ListCommand::LastPage,
            ListCommand::SetPage(3),
            ListCommand::SetLimit(10),
        ] {
            assert!(view.dispatch(command).is_empty());
            assert_eq!(view.render().visible_records.len(), 2);
        }
    }

    #[test]
    fn clearing_search_returns_to_held_page_without_fetch() {
        let mut view = mounted(rows(1..=25), 60);
        let requests = view.dispatch(ListCommand::SetQuery("foo".to_owned()));
        view.apply(ListResponse::Searched {
            ticket: find(&requests, is_search),
            result: Ok(rows([4])),
        });

        assert!(view.dispatch(ListCommand::SetQuery("  ".to_owned())).is_empty());
        let model = view.render();
        assert_eq!(model.visible_records.len(), 25);
        assert_eq!(model.total, 60);
        assert!(model.pagination_enabled);
    }

    #[test]
    fn out_of_order_search_keeps_latest_query() {
        let mut view = mounted(rows(1..=3), 3);
        let a = view.dispatch(ListCommand::SetQuery("a".to_owned()));
        let ab = view.dispatch(ListCommand::SetQuery("ab".to_owned()));

        let fresh = view.apply(ListResponse::Searched {
            ticket: find(&ab, is_search),
            result: Ok(rows([2])),
        });
        let late = view.apply(ListResponse::Searched {
            ticket: find(&a, is_search),
            result: Ok(rows([1, 2, 3])),
        });

        assert_eq!(fresh, Applied::Fresh(Vec::new()));
        assert!(late.is_stale());
        assert_eq!(ids(&view.render().visible_records), vec![2]);
    }

    #[test]
    fn three_clicks_restore_id_order_for_every_entity() {
        for kind in EntityKind::ALL {
            let column = kind
                .schema()
                .columns
                .iter()
                .find(|column| column.sortable)
                .expect("every entity has a sortable column");
            let mut view = ListView::new(kind, UserId::new(1), 10);
            let requests = view.mount();
            let records = (1..=3)
                .map(|id| Record::new(RecordId::new(id)).with(column.key, FieldValue::Integer(10 - id)))
                .collect();
            load(&mut view, &requests, records, 3);

            for _ in 0..3 {
                view.dispatch(ListCommand::ClickHeader(column.key.to_owned()));
            }
            let model = view.render();
            assert_eq!(model.sort, SortState::none(), "{kind:?}");
            assert_eq!(ids(&model.visible_records), vec![1, 2, 3], "{kind:?}");
        }
    }

    #[test]
    fn blank_sort_values_lead_in_both_directions() {
        let records = vec![
            row(1),
            Record::new(RecordId::new(2)).with("code", FieldValue::Null),
            row(3),
            Record::new(RecordId::new(4)),
        ];
        let mut view = mounted(records, 4);

        view.dispatch(ListCommand::ClickHeader("code".to_owned()));
        assert_eq!(ids(&view.render().visible_records), vec![2, 4, 1, 3]);
        view.dispatch(ListCommand::ClickHeader("code".to_owned()));
        assert_eq!(ids(&view.render().visible_records), vec![2, 4, 3, 1]);
    }

    #[test]
    fn unsortable_header_reports_status() {
        let mut view = ListView::new(EntityKind::Customer, UserId::new(1), 10);
        view.dispatch(ListCommand::ClickHeader("phone".to_owned()));
        assert_eq!(view.sort(), &SortState::none());
        assert_eq!(view.status(), Some("sort unavailable for phone"));
    }

    #[test]
    fn sort_survives_search_round_trip() {
        let mut view = mounted(rows(1..=5), 5);
        view.dispatch(ListCommand::ClickHeader("name".to_owned()));
        view.dispatch(ListCommand::ClickHeader("name".to_owned()));

        let requests = view.dispatch(ListCommand::SetQuery("name".to_owned()));
        view.apply(ListResponse::Searched {
            ticket: find(&requests, is_search),
            result: Ok(rows([2, 3])),
        });
        assert_eq!(ids(&view.render().visible_records), vec![3, 2]);

        view.dispatch(ListCommand::SetQuery(String::new()));
        let model = view.render();
        assert_eq!(model.sort, SortState::by("name", SortDirection::Desc));
        assert_eq!(ids(&model.visible_records), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn committing_no_columns_is_refused() {
        let mut view = mounted(rows(1..=2), 2);
        view.dispatch(ListCommand::OpenColumnPicker);
        for key in ["code", "name", "head"] {
            view.dispatch(ListCommand::ToggleColumn(key.to_owned()));
        }
        view.dispatch(ListCommand::CommitColumns);

        let model = view.render();
        assert_eq!(model.status.as_deref(), Some("keep one column visible"));
        assert!(model.picker.is_some());
        assert_eq!(model.columns.len(), 3);
    }

    #[test]
    fn saved_map_with_nothing_visible_renders_no_columns() {
        let saved = ["code", "name", "head"]
            .into_iter()
            .map(|key| (key.to_owned(), false))
            .collect::<ColumnVisibility>();
        let view = view().with_columns(&saved);

        let model = view.render();
        assert!(model.columns.is_empty());
        assert_eq!(model.empty_state, Some(EmptyState::NoColumns));
    }

    #[test]
    fn restore_moves_record_back_to_active_page() {
        let mut view = mounted(rows(1..=3), 3);
        expand_inactive(&mut view, rows([5]));

        let restore = view.dispatch(ListCommand::RestoreRecord(RecordId::new(5)));
        let followups = view
            .apply(ListResponse::Mutated {
                ticket: find(&restore, is_mutation),
                result: Ok(()),
            })
            .followups();

        assert!(view.render().visible_inactive.is_empty());
        load(&mut view, &followups, rows([1, 2, 3, 5]), 4);
        view.apply(ListResponse::InactiveLoaded {
            ticket: find(&followups, is_inactive),
            result: Ok(Vec::new()),
        });

        let model = view.render();
        assert_eq!(ids(&model.visible_records), vec![1, 2, 3, 5]);
        assert!(model.visible_inactive.is_empty());
    }

    #[test]
    fn delete_while_expanded_shows_record_as_inactive() {
        let mut view = mounted(rows(1..=5), 5);
        expand_inactive(&mut view, Vec::new());

        let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(5)));
        let Some(ListRequest::Delete { meta, .. }) = delete.first() else {
            panic!("expected delete request, got {delete:?}");
        };
        assert_eq!(meta.user_id, UserId::new(7));

        let followups = view
            .apply(ListResponse::Mutated {
                ticket: find(&delete, is_mutation),
                result: Ok(()),
            })
            .followups();
        load(&mut view, &followups, rows(1..=4), 4);
        view.apply(ListResponse::InactiveLoaded {
            ticket: find(&followups, is_inactive),
            result: Ok(rows([5])),
        });

        let model = view.render();
        assert_eq!(ids(&model.visible_records), vec![1, 2, 3, 4]);
        assert_eq!(ids(&model.visible_inactive), vec![5]);
    }

    #[test]
    fn failed_restore_changes_nothing() {
        let mut view = mounted(rows(1..=3), 3);
        expand_inactive(&mut view, rows([5]));

        let restore = view.dispatch(ListCommand::RestoreRecord(RecordId::new(5)));
        let applied = view.apply(ListResponse::Mutated {
            ticket: find(&restore, is_mutation),
            result: Err(anyhow!("503 service unavailable")),
        });

        assert_eq!(applied, Applied::Fresh(Vec::new()));
        let model = view.render();
        assert_eq!(ids(&model.visible_inactive), vec![5]);
        assert_eq!(ids(&model.visible_records), vec![1, 2, 3]);
        let error = model.error.expect("error surfaced");
        assert_eq!(error.kind, ErrorKind::Fetch);
        assert!(error.message.contains("503"));
    }

    #[test]
    fn load_issued_before_mutation_cannot_overwrite_it() {
        let mut view = mounted(rows(1..=5), 5);
        let before = view.dispatch(ListCommand::Refresh);
        let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(5)));
        let followups = view
            .apply(ListResponse::Mutated {
                ticket: find(&delete, is_mutation),
                result: Ok(()),
            })
            .followups();

        load(&mut view, &followups, rows(1..=4), 4);
        let late = load(&mut view, &before, rows(1..=5), 5);

        assert!(late.is_stale());
        assert_eq!(view.render().total, 4);
    }

    #[test]
    fn failed_load_keeps_last_good_page() {
        let mut view = mounted(rows(1..=25), 60);
        let next = view.dispatch(ListCommand::NextPage);
        view.apply(ListResponse::Loaded {
            ticket: find(&next, is_load),
            result: Err(anyhow!("connection refused")),
        });

        let model = view.render();
        assert_eq!(model.page, 1);
        assert_eq!(model.visible_records.len(), 25);
        assert_eq!(model.error.map(|error| error.kind), Some(ErrorKind::Fetch));
    }

    #[test]
    fn invalid_form_never_issues_request() {
        let mut view = mounted(rows(1..=2), 2);
        view.dispatch(ListCommand::OpenCreate);
        view.dispatch(ListCommand::SetFormInput {
            key: "code".to_owned(),
            raw: "OPS".to_owned(),
        });

        assert!(view.dispatch(ListCommand::SubmitForm).is_empty());
        let error = view.error().expect("validation error");
        assert_eq!(error.kind, ErrorKind::Validation);
        assert!(error.message.contains("Name is required"));
        assert!(!view.is_loading());
    }

    #[test]
    fn successful_create_closes_form_and_reloads() {
        let mut view = mounted(rows(1..=2), 2);
        view.dispatch(ListCommand::OpenCreate);
        for (key, raw) in [("code", "OPS"), ("name", "Operations")] {
            view.dispatch(ListCommand::SetFormInput {
                key: key.to_owned(),
                raw: raw.to_owned(),
            });
        }

        let create = view.dispatch(ListCommand::SubmitForm);
        let Some(ListRequest::Create { payload, .. }) = create.first() else {
            panic!("expected create request, got {create:?}");
        };
        assert_eq!(payload.get("name"), Some(&FieldValue::text("Operations")));

        let followups = view
            .apply(ListResponse::Mutated {
                ticket: find(&create, is_mutation),
                result: Ok(()),
            })
            .followups();
        assert!(view.form().is_none());
        assert!(followups.iter().any(is_load));
        assert_eq!(view.status(), Some("created"));
    }

    #[test]
    fn inactive_form_is_restore_only() {
        let mut view = mounted(rows(1..=2), 2);
        expand_inactive(&mut view, rows([9]));
        view.dispatch(ListCommand::OpenInactive(RecordId::new(9)));

        view.dispatch(ListCommand::SetFormInput {
            key: "name".to_owned(),
            raw: "changed".to_owned(),
        });
        assert_eq!(view.error().map(|error| error.kind), Some(ErrorKind::Validation));
        assert!(view.dispatch(ListCommand::SubmitForm).is_empty());
        assert!(view.dispatch(ListCommand::DeleteRecord(RecordId::new(9))).is_empty());

        let restore = view.dispatch(ListCommand::RestoreRecord(RecordId::new(9)));
        view.apply(ListResponse::Mutated {
            ticket: find(&restore, is_mutation),
            result: Ok(()),
        });
        assert!(view.form().is_none());
        assert_eq!(view.status(), Some("restored #9"));
    }

    #[test]
    fn emptied_last_page_steps_back() {
        let mut view = ListView::new(EntityKind::Department, UserId::new(7), 10);
        let first = view.mount();
        load(&mut view, &first, rows(1..=10), 11);
        let last = view.dispatch(ListCommand::LastPage);
        load(&mut view, &last, rows([11]), 11);

        let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(11)));
        let followups = view
            .apply(ListResponse::Mutated {
                ticket: find(&delete, is_mutation),
                result: Ok(()),
            })
            .followups();
        let back = load(&mut view, &followups, Vec::new(), 10).followups();

        assert!(matches!(
            back.as_slice(),
            [ListRequest::Load { page: 1, .. }]
        ));
    }

    #[test]
    fn mutation_reruns_active_search() {
        let mut view = mounted(rows(1..=3), 3);
        let search = view.dispatch(ListCommand::SetQuery("name".to_owned()));
        view.apply(ListResponse::Searched {
            ticket: find(&search, is_search),
            result: Ok(rows([2, 3])),
        });

        let delete = view.dispatch(ListCommand::DeleteRecord(RecordId::new(3)));
        let followups = view
            .apply(ListResponse::Mutated {
                ticket: find(&delete, is_mutation),
                result: Ok(()),
            })
            .followups();
        assert!(followups.iter().any(is_search));
        assert!(followups.iter().any(is_load));
    }
}
