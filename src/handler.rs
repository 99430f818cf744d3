//! The webhook handler.
//!
//! One inbound provider request per SMS; one response per request. The
//! pipeline is a linear branch-and-fallthrough: method gate, form decode,
//! rate limit, command dispatch against the subscriber store, XML reply.
//! Every failure path ends in a defined response; nothing escapes the
//! handler boundary.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::command::Command;
use crate::rate_limit::{RateLimitDecision, RateLimiter};
use crate::replies;
use crate::store::{StoreError, SubscriberStore};
use crate::twiml;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared handler state. `subscribers` is `None` when the record store is
/// not configured; the handler then answers with the configuration-error
/// reply without attempting any store access.
#[derive(Clone)]
pub struct AppState {
    pub subscribers: Option<Arc<dyn SubscriberStore>>,
    pub limiter: RateLimiter,
}

/// Build the service router.
///
/// `/sms` accepts every method so the handler can produce the exact 405
/// body the provider contract expects.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sms", any(sms_webhook))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Inbound provider payload, `application/x-www-form-urlencoded`.
#[derive(Debug, Deserialize)]
struct SmsForm {
    #[serde(rename = "From")]
    from: Option<String>,
    #[serde(rename = "Body")]
    body: Option<String>,
}

/// Handler for POST /sms.
pub async fn sms_webhook(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::POST {
        return plain(StatusCode::METHOD_NOT_ALLOWED, replies::EXPECTED_POST);
    }

    let bytes = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            return plain(StatusCode::BAD_REQUEST, replies::PARSE_FAILED);
        }
    };
    let form: SmsForm = match serde_urlencoded::from_bytes(&bytes) {
        Ok(form) => form,
        Err(e) => {
            debug!(error = %e, "form decode failed");
            return plain(StatusCode::BAD_REQUEST, replies::PARSE_FAILED);
        }
    };
    let (sender, text) = match (form.from, form.body) {
        (Some(from), Some(body)) if !from.is_empty() && !body.is_empty() => (from, body),
        _ => return plain(StatusCode::BAD_REQUEST, replies::MISSING_FIELDS),
    };
    debug!(%sender, "inbound message");

    // Rate limiting short-circuits before any record-store access.
    if state.limiter.check(&sender).await == RateLimitDecision::Limited {
        return xml_reply(replies::RATE_LIMITED);
    }

    let command = Command::parse(&text);

    let Some(subscribers) = &state.subscribers else {
        warn!("subscriber store not configured");
        return xml_reply(replies::CONFIG_ERROR);
    };

    let reply = match dispatch(subscribers.as_ref(), &sender, command).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, "unhandled dispatch failure");
            replies::UNEXPECTED_ERROR.to_string()
        }
    };
    xml_reply(&reply)
}

/// Run a command against the subscriber store and produce the reply text.
///
/// Lookup and insert are deliberately not transactional; a concurrent
/// subscribe for the same sender loses the insert race with a typed
/// duplicate-key error and is answered as already subscribed.
async fn dispatch(
    store: &dyn SubscriberStore,
    sender: &str,
    command: Command,
) -> Result<String, StoreError> {
    let is_subscribed = match store.find(sender).await {
        Ok(record) => record.is_some(),
        Err(e) => {
            error!(error = %e, "subscriber lookup failed");
            return Ok(replies::STATUS_CHECK_FAILED.to_string());
        }
    };

    let reply = match command {
        Command::Find if is_subscribed => replies::ALREADY_SUBSCRIBED,
        Command::Find => match store.insert(sender).await {
            Ok(_) => replies::SUBSCRIBED,
            Err(e) if e.is_duplicate() => {
                debug!("insert race lost, sender already subscribed");
                replies::ALREADY_SUBSCRIBED
            }
            Err(e) => {
                error!(error = %e, "subscribe insert failed");
                replies::SUBSCRIBE_FAILED
            }
        },
        Command::Help => {
            // Best effort: a help request subscribes the sender too, but an
            // insert failure never changes the reply.
            if !is_subscribed {
                if let Err(e) = store.insert(sender).await {
                    warn!(error = %e, "help-command subscribe failed");
                }
            }
            replies::HELP
        }
        Command::Unknown => replies::UNKNOWN_COMMAND,
    };
    Ok(reply.to_string())
}

fn plain(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

fn xml_reply(text: &str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        twiml::message_response(text),
    )
        .into_response()
}
