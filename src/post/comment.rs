use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{limits::Limits, normalize::truncate, user::User, utils::time_id};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub user: User,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: &str, user: User, content: impl Into<String>) -> Self {
        Self {
            id: time_id(),
            content: content.into(),
            user,
            post_id: post_id.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Storage form: content truncated, author image capped.
    pub fn optimized(&self, limits: &Limits) -> Self {
        Self {
            content: truncate(&self.content, limits.comment_content_max),
            user: self.user.compressed(limits.max_image_length),
            ..self.clone()
        }
    }
}
