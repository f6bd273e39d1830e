pub mod comment;
pub mod store;
pub mod timeline;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use comment::Comment;
pub use store::{PostStore, SaveSummary};
pub use timeline::{SortDirection, SortField, Timeline};

use crate::{limits::Limits, normalize::truncate, user::User, utils::time_id};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub mentioned_users: Vec<User>,
    pub created_at: DateTime<Utc>,
    pub user: User,
    pub likes: u32,
    pub has_liked: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(user: User, content: impl Into<String>) -> Self {
        Self {
            id: time_id(),
            content: content.into(),
            mentioned_users: vec![],
            created_at: Utc::now(),
            user,
            likes: 0,
            has_liked: false,
            comments: vec![],
        }
    }

    pub fn mentioning(mut self, users: Vec<User>) -> Self {
        self.mentioned_users = users;
        self
    }

    /// Flip the viewer's like and move the counter with it.
    pub fn toggle_like(&mut self) {
        if self.has_liked {
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.likes += 1;
        }
        self.has_liked = !self.has_liked;
    }

    /// Append a comment, dropping the oldest ones past `max`.
    pub fn push_comment(&mut self, comment: Comment, max: usize) {
        self.comments.push(comment);
        if self.comments.len() > max {
            let excess = self.comments.len() - max;
            self.comments.drain(..excess);
        }
    }

    /// Storage form of the post, see [`PostStore::save`].
    pub fn optimized(&self, limits: &Limits) -> Self {
        let skip = self
            .comments
            .len()
            .saturating_sub(limits.max_saved_comments);

        Self {
            content: truncate(&self.content, limits.post_content_max),
            user: self.user.compressed(limits.max_image_length),
            comments: self.comments[skip..]
                .iter()
                .map(|comment| comment.optimized(limits))
                .collect(),
            mentioned_users: self
                .mentioned_users
                .iter()
                .map(|user| user.compressed(limits.max_image_length))
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::user::seed_users;

    pub fn post_by(user: &User, content: &str) -> Post {
        Post::new(user.clone(), content)
    }

    #[test]
    fn toggle_like_round_trips() {
        let mut post = post_by(&seed_users()[0], "nice work");
        post.toggle_like();
        assert_eq!((post.likes, post.has_liked), (1, true));
        post.toggle_like();
        assert_eq!((post.likes, post.has_liked), (0, false));
    }

    #[test]
    fn comments_keep_the_most_recent() {
        let users = seed_users();
        let mut post = post_by(&users[0], "thanks");
        for i in 0..55 {
            let comment = Comment::new(&post.id, users[1].clone(), format!("c{i}"));
            post.push_comment(comment, 50);
        }
        assert_eq!(post.comments.len(), 50);
        assert_eq!(post.comments[0].content, "c5");
        assert_eq!(post.comments[49].content, "c54");
    }

    #[test]
    fn optimized_applies_every_cap() {
        let users = seed_users();
        let limits = Limits {
            max_saved_comments: 2,
            max_image_length: 16,
            post_content_max: 4,
            comment_content_max: 3,
            ..Limits::default()
        };

        let mut author = users[0].clone();
        author.profile_image = format!("data:image/png;base64,{}", "A".repeat(64));
        let mut post = post_by(&author, "great job").mentioning(vec![author.clone()]);
        for i in 0..4 {
            let comment = Comment::new(&post.id, author.clone(), format!("comment {i}"));
            post.push_comment(comment, 50);
        }

        let optimized = post.optimized(&limits);
        assert_eq!(optimized.content, "grea...");
        assert_eq!(optimized.user.profile_image.len(), 16);
        assert_eq!(optimized.mentioned_users[0].profile_image.len(), 16);
        assert_eq!(optimized.comments.len(), 2);
        assert_eq!(optimized.comments[0].content, "com...");
        assert_eq!(optimized.comments[1].id, post.comments[3].id);
        assert_eq!(optimized.comments[1].user.profile_image.len(), 16);
        assert_eq!(optimized.id, post.id);
        assert_eq!(optimized.created_at, post.created_at);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let json = serde_json::json!({
            "id": "1700000000000",
            "content": "hi",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "user": seed_users()[0],
            "likes": 3,
            "hasLiked": true,
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert!(post.comments.is_empty());
        assert!(post.mentioned_users.is_empty());
        assert_eq!(post.likes, 3);
    }
}
