//! The in-process typed message bus.
//!
//! Every cross-component call — Planner to worker, worker to quality
//! validator, planner to budget distributor — flows through a single
//! [`MessageBus`] instance rather than direct calls, so the Planner never
//! holds a reference to a concrete worker type.

use crate::handler::Handler;
use banquet_types::{Message, MessageBody, MessageKind};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

struct Inner {
    handlers: DashMap<String, Handler>,
    waiters: DashMap<Uuid, oneshot::Sender<Message>>,
    shared_data: DashMap<String, Value>,
    inbound_tx: mpsc::UnboundedSender<Message>,
}

/// A typed, named-endpoint message broker.
///
/// Cheap to clone: every clone shares the same handler table, pending-waiter
/// map and background dispatch/response loops.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<Inner>,
}

impl MessageBus {
    /// Start a new bus, spawning its dispatch and response loops.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Inner {
            handlers: DashMap::new(),
            waiters: DashMap::new(),
            shared_data: DashMap::new(),
            inbound_tx: inbound_tx.clone(),
        });

        tokio::spawn(dispatch_loop(inbound_rx, inner.clone(), response_tx));
        tokio::spawn(response_loop(response_rx, inner.clone(), inbound_tx));

        Self { inner }
    }

    /// Register `handler` under `endpoint_name`. A duplicate registration
    /// replaces the previous handler.
    pub fn register(&self, endpoint_name: impl Into<String>, handler: Handler) {
        self.inner.handlers.insert(endpoint_name.into(), handler);
    }

    /// Enqueue `msg` for dispatch and return immediately; the caller does
    /// not learn whether a handler accepted it.
    pub fn send(&self, msg: Message) {
        if self.inner.inbound_tx.send(msg).is_err() {
            tracing::error!("message bus dispatch loop is gone, dropping message");
        }
    }

    /// Enqueue `msg`, then wait up to `timeout` for a reply correlated by
    /// `body.task_id`. Returns `None` on timeout (the waiter is
    /// deregistered) or if `msg`'s body carries no `task_id` to correlate
    /// against.
    pub async fn send_and_wait(&self, msg: Message, timeout: Duration) -> Option<Message> {
        let task_id = msg.task_id()?;
        let (tx, rx) = oneshot::channel();
        self.inner.waiters.insert(task_id, tx);

        self.send(msg);

        if timeout.is_zero() {
            self.inner.waiters.remove(&task_id);
            return None;
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(_)) => None,
            Err(_) => {
                self.inner.waiters.remove(&task_id);
                None
            }
        }
    }

    /// Fan a message out to every registered endpoint except `from`.
    pub fn broadcast(&self, body: MessageBody, from: impl Into<String>, session_id: Uuid) {
        let from = from.into();
        for entry in self.inner.handlers.iter() {
            let to = entry.key().clone();
            if to == from {
                continue;
            }
            self.send(Message {
                from: from.clone(),
                to,
                kind: MessageKind::Broadcast,
                session_id,
                body: body.clone(),
            });
        }
    }

    /// Overwrite `key` in the shared-data registry.
    pub fn set_shared_data(&self, key: impl Into<String>, value: Value) {
        self.inner.shared_data.insert(key.into(), value);
    }

    /// A snapshot of the shared-data registry, suitable for embedding as
    /// `body.graph_data` in an outgoing task message.
    pub fn get_shared_data(&self) -> Value {
        let mut map = serde_json::Map::new();
        for entry in self.inner.shared_data.iter() {
            map.insert(entry.key().clone(), entry.value().clone());
        }
        Value::Object(map)
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

async fn dispatch_loop(
    mut inbound_rx: mpsc::UnboundedReceiver<Message>,
    inner: Arc<Inner>,
    response_tx: mpsc::UnboundedSender<Option<Message>>,
) {
    while let Some(msg) = inbound_rx.recv().await {
        let Some(handler) = inner.handlers.get(&msg.to).map(|h| h.clone()) else {
            tracing::warn!(endpoint = %msg.to, "dropping message for unknown endpoint");
            continue;
        };

        let fallback_to = msg.from.clone();
        let fallback_session = msg.session_id;
        let fallback_task_id = msg.task_id();
        let response_tx = response_tx.clone();

        tokio::spawn(async move {
            let reply = match tokio::spawn(handler(msg)).await {
                Ok(reply) => reply,
                Err(join_err) => Some(Message {
                    from: "bus".to_string(),
                    to: fallback_to,
                    kind: MessageKind::Error,
                    session_id: fallback_session,
                    body: MessageBody::Error {
                        task_id: fallback_task_id,
                        error: format!("handler panicked: {join_err}"),
                    },
                }),
            };
            let _ = response_tx.send(reply);
        });
    }
}

async fn response_loop(
    mut response_rx: mpsc::UnboundedReceiver<Option<Message>>,
    inner: Arc<Inner>,
    inbound_tx: mpsc::UnboundedSender<Message>,
) {
    while let Some(reply) = response_rx.recv().await {
        let Some(reply) = reply else {
            continue;
        };

        if let Some(task_id) = reply.task_id() {
            if let Some((_, waiter)) = inner.waiters.remove(&task_id) {
                let _ = waiter.send(reply);
                continue;
            }
        }

        let _ = inbound_tx.send(reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use banquet_types::MessageBody;

    fn task_msg(to: &str, task_id: Uuid, session_id: Uuid) -> Message {
        Message {
            from: "planner".to_string(),
            to: to.to_string(),
            kind: MessageKind::Task,
            session_id,
            body: MessageBody::Task {
                task_id,
                parameters: serde_json::json!({}),
                graph_data: None,
            },
        }
    }

    #[tokio::test]
    async fn send_and_wait_returns_the_correlated_reply() {
        let bus = MessageBus::new();
        bus.register(
            "venue_search",
            handler_fn(|msg| async move {
                let task_id = msg.task_id().unwrap();
                Some(Message {
                    from: "venue_search".to_string(),
                    to: msg.from,
                    kind: MessageKind::AgentResponse,
                    session_id: msg.session_id,
                    body: MessageBody::AgentResponse {
                        task_id,
                        result: serde_json::json!({"candidate": "the grand hall"}),
                    },
                })
            }),
        );

        let session_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let reply = bus
            .send_and_wait(task_msg("venue_search", task_id, session_id), Duration::from_secs(1))
            .await
            .expect("expected a reply");

        match reply.body {
            MessageBody::AgentResponse { task_id: got, .. } => assert_eq!(got, task_id),
            _ => panic!("wrong body variant"),
        }
    }

    #[tokio::test]
    async fn send_and_wait_times_out_with_no_handler() {
        let bus = MessageBus::new();
        let session_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let reply = bus
            .send_and_wait(
                task_msg("nobody_home", task_id, session_id),
                Duration::from_millis(50),
            )
            .await;
        assert!(reply.is_none());
        assert!(!bus.inner.waiters.contains_key(&task_id));
    }

    #[tokio::test]
    async fn zero_timeout_returns_immediately() {
        let bus = MessageBus::new();
        let session_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let reply = bus
            .send_and_wait(task_msg("venue_search", task_id, session_id), Duration::ZERO)
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn broadcast_skips_the_sender() {
        let bus = MessageBus::new();
        let (planner_tx, mut planner_rx) = mpsc::unbounded_channel();
        let (worker_tx, mut worker_rx) = mpsc::unbounded_channel();
        bus.register(
            "planner",
            handler_fn(move |msg| {
                let planner_tx = planner_tx.clone();
                async move {
                    let _ = planner_tx.send(msg);
                    None
                }
            }),
        );
        bus.register(
            "venue_search",
            handler_fn(move |msg| {
                let worker_tx = worker_tx.clone();
                async move {
                    let _ = worker_tx.send(msg);
                    None
                }
            }),
        );

        let session_id = Uuid::new_v4();
        bus.broadcast(
            MessageBody::Broadcast {
                payload: serde_json::json!({"event": "session_started"}),
            },
            "planner",
            session_id,
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(planner_rx.try_recv().is_err(), "the sender must not receive its own broadcast");
        assert!(worker_rx.try_recv().is_ok(), "other endpoints must receive the broadcast");
    }

    #[tokio::test]
    async fn handler_panic_becomes_an_error_reply() {
        let bus = MessageBus::new();
        bus.register(
            "flaky",
            handler_fn(|_msg| async move {
                panic!("boom");
            }),
        );

        let session_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let reply = bus
            .send_and_wait(task_msg("flaky", task_id, session_id), Duration::from_secs(1))
            .await
            .expect("panic should surface as an error reply");

        match reply.body {
            MessageBody::Error { task_id: got, .. } => assert_eq!(got, Some(task_id)),
            _ => panic!("wrong body variant"),
        }
    }

    #[tokio::test]
    async fn shared_data_round_trips_as_a_snapshot() {
        let bus = MessageBus::new();
        bus.set_shared_data("venue_graph", serde_json::json!({"nodes": []}));
        let snapshot = bus.get_shared_data();
        assert_eq!(snapshot["venue_graph"]["nodes"], serde_json::json!([]));
    }
}
