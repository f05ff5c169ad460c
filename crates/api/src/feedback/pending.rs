//! A stakeholder's outstanding feedback requests.

use keystone_core::feedback::validate_stakeholder_email;
use keystone_db::models::feedback_session::PendingFeedbackItem;
use keystone_db::repositories::FeedbackSessionRepo;
use keystone_db::DbPool;
use serde::Serialize;

use crate::config::FeedbackConfig;
use crate::error::AppResult;

/// One pending request plus the link that reopens it.
#[derive(Debug, Clone, Serialize)]
pub struct PendingEntry {
    #[serde(flatten)]
    pub item: PendingFeedbackItem,
    pub link: String,
}

/// The pending worklist for one email.
#[derive(Debug, Clone, Serialize)]
pub struct PendingList {
    pub count: usize,
    pub items: Vec<PendingEntry>,
}

/// List every pending session addressed to `email`, newest first.
///
/// An email that is not a valid address is rejected before any lookup.
pub async fn list_pending(
    pool: &DbPool,
    config: &FeedbackConfig,
    email: &str,
) -> AppResult<PendingList> {
    validate_stakeholder_email(email)?;

    let items: Vec<PendingEntry> = FeedbackSessionRepo::list_pending_for_email(pool, email)
        .await?
        .into_iter()
        .map(|item| PendingEntry {
            link: config.link_for(&item.token),
            item,
        })
        .collect();

    Ok(PendingList {
        count: items.len(),
        items,
    })
}
