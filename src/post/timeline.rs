use std::{cmp::Ordering, fmt};

use clap::ValueEnum;
use log::{debug, error};

use crate::{storage::KeyValueStore, user::User, Kudos};

use super::{Comment, Post};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SortField {
    User,
    Content,
    #[default]
    CreatedAt,
    Likes,
    Comments,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Content => write!(f, "content"),
            Self::CreatedAt => write!(f, "created-at"),
            Self::Likes => write!(f, "likes"),
            Self::Comments => write!(f, "comments"),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl SortField {
    fn compare(self, a: &Post, b: &Post) -> Ordering {
        match self {
            Self::User => a.user.name.cmp(&b.user.name),
            Self::Content => a.content.cmp(&b.content),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::Likes => a.likes.cmp(&b.likes),
            Self::Comments => a.comments.len().cmp(&b.comments.len()),
        }
    }
}

/// Post, like and comment actions over the stored collection.
pub struct Timeline<'a, S> {
    kudos: &'a Kudos<S>,
}

impl<'a, S: KeyValueStore> Timeline<'a, S> {
    pub fn new(kudos: &'a Kudos<S>) -> Self {
        Self { kudos }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.kudos.posts().load()
    }

    /// Put a new post on top of the timeline. Blank content is ignored and
    /// `None` is also returned when the post could not be saved.
    pub fn publish(&self, author: &User, content: &str, mentions: Vec<User>) -> Option<Post> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let post = Post::new(author.clone(), content).mentioning(mentions);
        self.update(|posts| {
            posts.insert(0, post.clone());
            Some(())
        })?;
        Some(post)
    }

    /// Like or unlike `post_id`. `false` if the post is unknown or nothing
    /// was saved.
    pub fn toggle_like(&self, post_id: &str) -> bool {
        self.update(|posts| {
            let post = posts.iter_mut().find(|post| post.id == post_id)?;
            post.toggle_like();
            debug!("Post {} has {} likes", post.id, post.likes);
            Some(())
        })
        .is_some()
    }

    pub fn comment(&self, post_id: &str, author: &User, content: &str) -> Option<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let max = self.kudos.limits().max_comments;
        self.update(|posts| {
            let post = posts.iter_mut().find(|post| post.id == post_id)?;
            let comment = Comment::new(&post.id, author.clone(), content);
            post.push_comment(comment.clone(), max);
            Some(comment)
        })
    }

    /// Posts whose content contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<Post> {
        let term = term.to_lowercase();
        self.posts()
            .into_iter()
            .filter(|post| post.content.to_lowercase().contains(&term))
            .collect()
    }

    /// Posts matching `term` in content or author name, sorted.
    pub fn list(&self, term: &str, field: SortField, direction: SortDirection) -> Vec<Post> {
        let term = term.to_lowercase();
        let mut posts: Vec<Post> = self
            .posts()
            .into_iter()
            .filter(|post| {
                post.content.to_lowercase().contains(&term)
                    || post.user.name.to_lowercase().contains(&term)
            })
            .collect();

        posts.sort_by(|a, b| match direction {
            SortDirection::Asc => field.compare(a, b),
            SortDirection::Desc => field.compare(b, a),
        });
        posts
    }

    /// Load, apply `change` and save under the writer lock.
    ///
    /// Nothing is written when `change` returns `None` or the stored posts
    /// cannot be read. `None` when the save fails.
    fn update<T>(&self, change: impl FnOnce(&mut Vec<Post>) -> Option<T>) -> Option<T> {
        let _guard = self.kudos.write_lock();
        let store = self.kudos.posts();

        let mut posts = match store.try_load() {
            Ok(posts) => posts,
            Err(err) => {
                error!("Not writing over unreadable posts: {}", err);
                return None;
            }
        };
        let value = change(&mut posts)?;
        store.save(&posts).then_some(value)
    }
}
