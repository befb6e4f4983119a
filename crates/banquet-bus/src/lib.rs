//! In-process typed message bus: named endpoints, task-correlated
//! request/response, broadcast, and a shared-data registry.
//!
//! Every cross-component call in the planning system flows through a
//! single [`MessageBus`], so the Planner never holds a concrete reference
//! to a worker, validator or distributor — it only knows endpoint names.

#![warn(missing_docs)]

mod bus;
mod error;
mod handler;

pub use bus::MessageBus;
pub use error::{BusError, Result};
pub use handler::{handler_fn, Handler};
