//! External delivery channels for stakeholder notifications.

pub mod email;
