//! Order Lifecycle Core
//!
//! The one subsystem with real multi-step business logic: moving orders
//! through their status timeline, assigning and unassigning delivery
//! agents, and settling delivery fees into commission splits — with every
//! order+agent mutation pair committed as a single store transaction.

pub mod earnings;
mod error;
pub mod lifecycle;

pub use earnings::{DeliveryEarning, DeliverySettlement, EarningsCalculator, EarningsReport};
pub use error::{BulkItemError, LifecycleError, LifecycleResult};
pub use lifecycle::{
    AgentSummary, AssignmentOutcome, BulkAssignOutcome, BulkPolicy, BulkUnassignOutcome,
    OrderLifecycle, UnassignmentOutcome,
};

#[cfg(test)]
mod tests;
