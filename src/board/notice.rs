use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflow::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    /// A move the rules do not allow; nothing was sent.
    Info,
    /// The user should wait or fix data before retrying.
    Warning,
    /// The backend refused or never answered.
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// User-facing toast emitted by the board controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub item_id: ItemId,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, item_id: &ItemId, message: impl Into<String>) -> Self {
        Self {
            level,
            item_id: item_id.clone(),
            message: message.into(),
            at: Utc::now(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.item_id, self.message)
    }
}
