//! HTTP-backed store backends.
//!
//! The record store speaks a PostgREST-compatible API (Supabase-style):
//! lookups are filtered GETs, inserts are POSTs, and a unique-constraint
//! violation comes back as HTTP 409 with SQLSTATE 23505 in the error body.
//! The counter store speaks a Redis-over-REST API with path-based commands
//! and bearer-token auth.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{CounterStore, StoreError, Subscriber, SubscriberStore};

const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST-compatible subscriber store.
#[derive(Clone, Debug)]
pub struct RestSubscriberStore {
    /// API base URL, e.g. `https://xyz.supabase.co`.
    base_url: String,
    /// Service credential sent as both `apikey` and bearer token.
    service_key: String,
    /// Table holding subscriber records.
    table: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

impl RestSubscriberStore {
    pub fn new<S: Into<String>>(base_url: S, service_key: S, table: S) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            table: table.into(),
            http: reqwest::Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    fn classify_failure(status: reqwest::StatusCode, body: &str) -> StoreError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return StoreError::Auth(format!("HTTP {status}: {body}"));
        }
        let pg: Option<PostgrestError> = serde_json::from_str(body).ok();
        let is_duplicate = status == reqwest::StatusCode::CONFLICT
            || pg
                .as_ref()
                .and_then(|e| e.code.as_deref())
                .is_some_and(|code| code == UNIQUE_VIOLATION);
        if is_duplicate {
            let detail = pg
                .and_then(|e| e.message)
                .unwrap_or_else(|| body.to_string());
            StoreError::Duplicate(detail)
        } else {
            StoreError::Backend(format!("HTTP {status}: {body}"))
        }
    }
}

#[async_trait]
impl SubscriberStore for RestSubscriberStore {
    async fn find(&self, phone_number: &str) -> Result<Option<Subscriber>, StoreError> {
        let filter = format!("eq.{phone_number}");
        let res = self
            .http
            .get(self.table_url())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(&[
                ("select", "phone_number"),
                ("phone_number", filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Self::classify_failure(status, &body));
        }

        let mut rows: Vec<Subscriber> = serde_json::from_str(&body)
            .map_err(|e| StoreError::Backend(format!("bad lookup payload: {e}")))?;
        Ok(rows.pop())
    }

    async fn insert(&self, phone_number: &str) -> Result<Subscriber, StoreError> {
        let record = Subscriber {
            phone_number: phone_number.to_string(),
        };
        let res = self
            .http
            .post(self.table_url())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(record);
        }
        let body = res.text().await.unwrap_or_default();
        Err(Self::classify_failure(status, &body))
    }
}

/// Redis-over-REST counter store.
#[derive(Clone, Debug)]
pub struct RestCounterStore {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct KvReply {
    result: Option<serde_json::Value>,
}

impl RestCounterStore {
    pub fn new<S: Into<String>>(base_url: S, token: S) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn command(&self, path: &str, query: &[(&str, String)]) -> Result<KvReply, StoreError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let res = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StoreError::Auth(format!("HTTP {status}")));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("HTTP {status}: {body}")));
        }
        res.json::<KvReply>()
            .await
            .map_err(|e| StoreError::Backend(format!("bad counter payload: {e}")))
    }
}

#[async_trait]
impl CounterStore for RestCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let reply = self.command(&format!("get/{key}"), &[]).await?;
        match reply.result {
            None | Some(serde_json::Value::Null) => Ok(None),
            // Redis stores counters as strings; some gateways return numbers.
            Some(serde_json::Value::String(s)) => s
                .parse::<u64>()
                .map(Some)
                .map_err(|e| StoreError::Backend(format!("non-numeric counter: {e}"))),
            Some(serde_json::Value::Number(n)) => Ok(n.as_u64()),
            Some(other) => Err(StoreError::Backend(format!(
                "unexpected counter payload: {other}"
            ))),
        }
    }

    async fn put_with_ttl(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError> {
        self.command(
            &format!("set/{key}/{value}"),
            &[("EX", ttl.as_secs().to_string())],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_status_maps_to_duplicate() {
        let err = RestSubscriberStore::classify_failure(reqwest::StatusCode::CONFLICT, "{}");
        assert!(err.is_duplicate());
    }

    #[test]
    fn sqlstate_23505_maps_to_duplicate() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        let err =
            RestSubscriberStore::classify_failure(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(err.is_duplicate());
    }

    #[test]
    fn auth_failures_are_typed() {
        let err = RestSubscriberStore::classify_failure(
            reqwest::StatusCode::UNAUTHORIZED,
            "no api key found",
        );
        assert!(matches!(err, StoreError::Auth(_)));
    }

    #[test]
    fn other_failures_are_backend_errors() {
        let err = RestSubscriberStore::classify_failure(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(!err.is_duplicate());
    }
}
