//! Shared wire types for the Banquet event-planning core.
//!
//! Every inter-component message, belief, task, desire and intention that
//! crosses a component boundary is defined here so the Bus, Planner, Budget
//! Distributor, Workers and Knowledge Graph share a single vocabulary instead
//! of passing around untyped JSON.

#![warn(missing_docs)]

pub mod criteria;
pub mod belief;
pub mod task;
pub mod desire;
pub mod intention;
pub mod message;
pub mod error;
pub mod price;

pub use criteria::{Category, CategoryCriteria, Criteria};
pub use belief::{BeliefState, CorrectionStrategy, ErrorRecord, SessionState, TaskProgress};
pub use task::{Task, TaskStatus, TaskType};
pub use desire::{Desire, DesireStatus};
pub use intention::{Intention, IntentionStatus};
pub use message::{Message, MessageBody, MessageKind};
pub use error::{Result, TypesError};
pub use price::PriceStats;
