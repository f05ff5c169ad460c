//! Stakeholder access primitives.
//!
//! - [`context`] -- signed, short-lived stakeholder context tokens issued
//!   after an opaque feedback token has been resolved.

pub mod context;
