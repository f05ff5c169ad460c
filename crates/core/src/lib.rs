//! Keystone domain core.
//!
//! Pure types and rules shared by the persistence and HTTP layers of the
//! stakeholder feedback service. Nothing in this crate touches the database
//! or the network.

pub mod error;
pub mod feedback;
pub mod submission;
pub mod types;
