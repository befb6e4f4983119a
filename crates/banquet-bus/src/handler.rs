//! The handler type endpoints register behind.

use banquet_types::Message;
use futures::future::BoxFuture;
use std::sync::Arc;

/// A registered endpoint's reply function: given an inbound message,
/// produce an optional reply. Handlers run on the Tokio pool, so they may
/// themselves await (an HTTP fetch, a channel, ...).
pub type Handler = Arc<dyn Fn(Message) -> BoxFuture<'static, Option<Message>> + Send + Sync>;

/// Wrap a plain async closure as a [`Handler`].
///
/// ```ignore
/// bus.register("venue_search", handler_fn(|msg| async move { None }));
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Option<Message>> + Send + 'static,
{
    Arc::new(move |msg| Box::pin(f(msg)))
}
