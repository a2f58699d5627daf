/// Response cache with block-driven refresh of subscribed queries
///
/// Responses are keyed by method and the JSON form of the completed request,
/// so `{}` and `{"status": ""}` share one entry. Readers never wait: `get`
/// returns the latest committed response or an empty placeholder.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::codec::{CodecConfig, Int64Encoding, JsonCasing, JsonProjection, Message};

use super::error::{ClientError, Result};
use super::queries::QueryClient;
use super::transport::Transport;

/// Cache and subscription keys use a lossless rendering (64-bit integers as
/// strings) independent of the caller's projection
const KEY_PROJECTION: JsonProjection = JsonProjection::new(CodecConfig {
    casing: JsonCasing::Snake,
    int64: Int64Encoding::String,
});

/// Per-call behaviour of `QueryStore::query`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Re-issue this query on every new block
    pub subscribe: bool,
    /// Follow pagination cursors to the last page
    pub all: bool,
}

/// Serialized form of a subscription; equal subscriptions collapse
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Subscription {
    action: String,
    payload: SubscriptionPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubscriptionPayload {
    request: serde_json::Value,
    all: bool,
}

/// Outcome of one `refresh` pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    /// (method, error message)
    pub failed: Vec<(String, String)>,
}

pub struct QueryStore<T> {
    client: QueryClient<T>,
    projection: JsonProjection,
    cache: RwLock<HashMap<String, HashMap<String, Message>>>,
    subscriptions: RwLock<BTreeSet<String>>,
}

impl<T: Transport> QueryStore<T> {
    pub fn new(client: QueryClient<T>, projection: JsonProjection) -> Self {
        Self {
            client,
            projection,
            cache: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn client(&self) -> &QueryClient<T> {
        &self.client
    }

    /// Canonical cache key: JSON of the request after `from_partial`
    fn request_json(&self, method: &str, request: &Message) -> Result<serde_json::Value> {
        let descriptor = self
            .client
            .service()
            .method(method)
            .ok_or_else(|| ClientError::UnknownMethod {
                service: self.client.service().name.to_string(),
                method: method.to_string(),
            })?;
        let codec = (descriptor.request)();
        let complete = codec.from_partial(request)?;
        Ok(KEY_PROJECTION.to_plain(&codec, &complete)?)
    }

    /// Run a query, commit the response and optionally subscribe to it
    pub async fn query(&self, method: &str, request: &Message, options: QueryOptions) -> Result<Message> {
        self.run(method, request, options).await.map_err(|e| ClientError::Query {
            method: method.to_string(),
            source: Box::new(e),
        })
    }

    async fn run(&self, method: &str, request: &Message, options: QueryOptions) -> Result<Message> {
        let key = self.request_json(method, request)?.to_string();
        let response = if options.all {
            self.client.call_all(method, request).await?
        } else {
            self.client.call(method, request).await?
        };

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method.to_string())
            .or_default()
            .insert(key, response.clone());

        if options.subscribe {
            self.subscribe(method, request, options.all)?;
        }
        Ok(response)
    }

    /// Latest committed response, or an empty message if none has completed yet
    pub fn get(&self, method: &str, request: &Message) -> Message {
        let key = match self.request_json(method, request) {
            Ok(json) => json.to_string(),
            Err(_) => return Message::new(),
        };
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .and_then(|responses| responses.get(&key))
            .cloned()
            .unwrap_or_default()
    }

    /// `get` rendered with the store's projection
    pub fn get_plain(&self, method: &str, request: &Message) -> Result<serde_json::Value> {
        let descriptor = self
            .client
            .service()
            .method(method)
            .ok_or_else(|| ClientError::UnknownMethod {
                service: self.client.service().name.to_string(),
                method: method.to_string(),
            })?;
        let response = self.get(method, request);
        if response.is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        Ok(self.projection.to_plain(&(descriptor.response)(), &response)?)
    }

    fn subscription_key(&self, method: &str, request: &Message, all: bool) -> Result<String> {
        let subscription = Subscription {
            action: method.to_string(),
            payload: SubscriptionPayload {
                request: self.request_json(method, request)?,
                all,
            },
        };
        Ok(serde_json::to_string(&subscription)?)
    }

    /// Idempotent: an identical `{action, payload}` is stored once
    pub fn subscribe(&self, method: &str, request: &Message, all: bool) -> Result<()> {
        let key = self.subscription_key(method, request, all)?;
        let added = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        if added {
            log::debug!("Subscribed to {}/{}", self.client.service().name, method);
        }
        Ok(())
    }

    pub fn unsubscribe(&self, method: &str, request: &Message, all: bool) -> Result<()> {
        let key = self.subscription_key(method, request, all)?;
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Re-issue every subscribed query; failures are reported, not raised
    pub async fn refresh(&self) -> RefreshReport {
        let subscriptions: Vec<String> = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();

        let mut report = RefreshReport::default();
        for raw in subscriptions {
            let subscription: Subscription = match serde_json::from_str(&raw) {
                Ok(subscription) => subscription,
                Err(e) => {
                    report.failed.push((raw.clone(), e.to_string()));
                    continue;
                }
            };
            let method = subscription.action;
            let result = match self.request_from_json(&method, &subscription.payload.request) {
                Ok(request) => {
                    let options = QueryOptions {
                        subscribe: false,
                        all: subscription.payload.all,
                    };
                    self.query(&method, &request, options).await.map(|_| ())
                }
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => report.refreshed.push(method),
                Err(e) => {
                    log::warn!("Refresh of {} failed: {}", method, e);
                    report.failed.push((method, e.to_string()));
                }
            }
        }
        report
    }

    fn request_from_json(&self, method: &str, json: &serde_json::Value) -> Result<Message> {
        let descriptor = self
            .client
            .service()
            .method(method)
            .ok_or_else(|| ClientError::UnknownMethod {
                service: self.client.service().name.to_string(),
                method: method.to_string(),
            })?;
        Ok(KEY_PROJECTION.from_plain(&(descriptor.request)(), json)?)
    }

    /// Refresh on every block notification until the sender side closes
    pub async fn watch(&self, mut blocks: broadcast::Receiver<u64>) {
        loop {
            match blocks.recv().await {
                Ok(height) => {
                    let report = self.refresh().await;
                    log::debug!(
                        "Block {}: refreshed {} subscriptions, {} failed",
                        height,
                        report.refreshed.len(),
                        report.failed.len()
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Missed {} block notifications, refreshing once", skipped);
                    self.refresh().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Drop every cached response and subscription
    pub fn reset(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.subscriptions.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
