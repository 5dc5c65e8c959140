// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking REST client implementing [`EntityAdapter`] for one entity.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | call            | request                                   |
//! |-----------------|-------------------------------------------|
//! | `list`          | `GET /{entity}?page=&limit=`              |
//! | `search`        | `GET /{entity}/search?q=`                 |
//! | `create`        | `POST /{entity}`                          |
//! | `update`        | `PUT /{entity}/{id}`                      |
//! | `delete`        | `DELETE /{entity}/{id}` with an audit body |
//! | `list_inactive` | `GET /{entity}/inactive`                  |
//! | `restore`       | `POST /{entity}/{id}/restore`             |

use anyhow::{Context, Result, anyhow, bail};
use ledgerdesk_app::{
    ActionMeta, EntityAdapter, EntityKind, JsonNormalizer, PageData, Record, RecordId,
    RecordPayload,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use url::Url;

const LIST_KEYS: [&str; 2] = ["records", "data"];
const TOTAL_KEYS: [&str; 2] = ["total", "count"];

#[derive(Debug, Clone)]
pub struct HttpAdapter {
    base_url: Url,
    entity: EntityKind,
    token: Option<String>,
    timeout: Duration,
    http: HttpClient,
}

impl HttpAdapter {
    pub fn new(base_url: &str, entity: EntityKind, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("backend.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("backend.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "backend.base_url must use http or https, got {}://",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("backend.base_url {trimmed:?} cannot carry a path");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            entity,
            token: None,
            timeout,
            http,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request. Blank tokens
    /// are ignored.
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        self
    }

    /// Same connection settings, different entity. The underlying HTTP
    /// client is shared.
    pub fn for_entity(&self, entity: EntityKind) -> Self {
        Self {
            entity,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("base URL {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .push(self.entity.as_str())
            .extend(tail);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(
                entity = self.entity.as_str(),
                status = status.as_u16(),
                "backend rejected request"
            );
            return Err(clean_error_response(status, &body));
        }
        let body = response.text().context("read response body")?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).context("decode response body")
    }

    fn audit_body(meta: &ActionMeta) -> Result<AuditBody> {
        Ok(AuditBody {
            user_id: meta.user_id.get(),
            at: meta.at.format(&Rfc3339).context("format audit timestamp")?,
        })
    }
}

impl EntityAdapter for HttpAdapter {
    type Raw = Value;

    fn kind(&self) -> EntityKind {
        self.entity
    }

    fn list(&self, page: u32, limit: u32) -> Result<PageData<Value>> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        let body = self.send(self.http.get(url))?;
        parse_list_envelope(body)
    }

    fn search(&self, query: &str) -> Result<Vec<Value>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        let body = self.send(self.http.get(url))?;
        Ok(parse_list_envelope(body)?.records)
    }

    fn create(&self, payload: &RecordPayload) -> Result<Value> {
        let url = self.endpoint(&[])?;
        let body = JsonNormalizer::new(self.entity).payload_to_json(payload);
        self.send(self.http.post(url).json(&body))
            .map(unwrap_record_envelope)
    }

    fn update(&self, id: RecordId, payload: &RecordPayload) -> Result<Value> {
        let id = id.to_string();
        let url = self.endpoint(&[id.as_str()])?;
        let body = JsonNormalizer::new(self.entity).payload_to_json(payload);
        self.send(self.http.put(url).json(&body))
            .map(unwrap_record_envelope)
    }

    fn delete(&self, id: RecordId, meta: &ActionMeta) -> Result<()> {
        let id = id.to_string();
        let url = self.endpoint(&[id.as_str()])?;
        let body = Self::audit_body(meta)?;
        self.send(self.http.delete(url).json(&body))?;
        Ok(())
    }

    fn list_inactive(&self) -> Result<Vec<Value>> {
        let url = self.endpoint(&["inactive"])?;
        let body = self.send(self.http.get(url))?;
        Ok(parse_list_envelope(body)?.records)
    }

    fn restore(&self, id: RecordId, meta: &ActionMeta) -> Result<()> {
        let id = id.to_string();
        let url = self.endpoint(&[id.as_str(), "restore"])?;
        let body = Self::audit_body(meta)?;
        self.send(self.http.post(url).json(&body))?;
        Ok(())
    }

    fn normalize(&self, raw: Value) -> Result<Record> {
        JsonNormalizer::new(self.entity).normalize(&raw)
    }
}

#[derive(Debug, Serialize)]
struct AuditBody {
    user_id: i64,
    at: String,
}

/// Accepts a bare array or an object carrying `records`/`data` and
/// `total`/`count`, keys matched case-insensitively. A missing total falls
/// back to the number of rows returned.
pub fn parse_list_envelope(body: Value) -> Result<PageData<Value>> {
    let mut object = match body {
        Value::Array(records) => {
            let total = records.len() as u64;
            return Ok(PageData { records, total });
        }
        Value::Object(object) => object,
        other => bail!("expected a list response, got {}", json_type(&other)),
    };

    let records = match take_key(&mut object, &LIST_KEYS) {
        Some(Value::Array(records)) => records,
        Some(other) => bail!("list field should be an array, got {}", json_type(&other)),
        None => bail!(
            "list response has none of the fields {}",
            LIST_KEYS.join(", ")
        ),
    };
    let total = match take_key(&mut object, &TOTAL_KEYS) {
        None | Some(Value::Null) => records.len() as u64,
        Some(Value::Number(number)) => number
            .as_u64()
            .ok_or_else(|| anyhow!("total should be a non-negative integer, got {number}"))?,
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .with_context(|| format!("total should be an integer, got {text:?}"))?,
        Some(other) => bail!("total should be a number, got {}", json_type(&other)),
    };
    Ok(PageData { records, total })
}

fn unwrap_record_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut object)
            if object.len() == 1 && matches!(object.values().next(), Some(Value::Object(_))) =>
        {
            match take_key(&mut object, &["record", "data"]) {
                Some(inner) => inner,
                None => Value::Object(object),
            }
        }
        other => other,
    }
}

fn take_key(object: &mut Map<String, Value>, candidates: &[&str]) -> Option<Value> {
    let key = object
        .keys()
        .find(|key| {
            candidates
                .iter()
                .any(|candidate| key.eq_ignore_ascii_case(candidate))
        })?
        .clone();
    object.remove(&key)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn connection_error(base_url: &Url, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out -- raise backend.timeout or retry");
    }
    anyhow!("cannot reach {base_url} -- check backend.base_url and that the server is running ({error})")
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Object {
        #[serde(default)]
        message: String,
    },
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        let detail = match parsed.error {
            Some(ErrorDetail::Text(text)) => Some(text),
            Some(ErrorDetail::Object { message }) => Some(message),
            None => parsed.message,
        };
        if let Some(detail) = detail.filter(|detail| !detail.is_empty()) {
            return anyhow!("server error ({}): {}", status.as_u16(), detail);
        }
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}
