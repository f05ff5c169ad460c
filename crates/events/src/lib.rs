//! Keystone event bus and stakeholder notification infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope.
//! - [`NotificationSink`] -- best-effort `(recipient, subject, body)` delivery.
//! - [`delivery`] -- concrete sinks (SMTP email).
//! - [`ConfirmationMailer`] -- background consumer that turns
//!   `feedback.submitted` events into confirmation emails.

pub mod bus;
pub mod delivery;
pub mod mailer;
pub mod sink;

pub use bus::{EventBus, FeedbackSubmitted, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use mailer::ConfirmationMailer;
pub use sink::{LogSink, NotificationError, NotificationSink};
