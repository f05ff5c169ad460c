//! Stakeholder feedback services.
//!
//! Handlers stay thin: they extract the [`StakeholderContext`], call into
//! these modules, and wrap the result in a response envelope. Each service
//! takes the pool (and, where needed, configuration or the event bus)
//! explicitly so integration tests can drive it without a router.
//!
//! [`StakeholderContext`]: crate::middleware::stakeholder::StakeholderContext

pub mod experience;
pub mod pending;
pub mod projector;
pub mod resolver;
pub mod submission;
