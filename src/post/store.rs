//! Chunked persistence of the post collection.
//!
//! A browser store caps the size of a single value, so the (capped) post list
//! is split into chunks of [`Limits::chunk_size`] posts, each under its own
//! `praise_platform_posts_<n>` key, with the chunk count kept under
//! `praise_platform_posts_count`. Reading walks the chunks in index order, so
//! the loaded list has exactly the saved order.

use log::{debug, error, warn};

use crate::{
    error::StoreError,
    limits::Limits,
    storage::{posts_chunk_key, posts_count_key, KeyValueStore},
};

use super::Post;

/// What a successful save wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub posts: usize,
    pub chunks: usize,
}

pub struct PostStore<'a, S: ?Sized> {
    storage: &'a S,
    limits: &'a Limits,
}

impl<'a, S: KeyValueStore + ?Sized> PostStore<'a, S> {
    pub fn new(storage: &'a S, limits: &'a Limits) -> Self {
        Self { storage, limits }
    }

    /// Save `posts` (newest first), logging instead of failing.
    ///
    /// Returns `false` when nothing or only part of the collection was written.
    pub fn save(&self, posts: &[Post]) -> bool {
        match self.try_save(posts) {
            Ok(_) => true,
            Err(err) => {
                error!("Failed to save posts: {}", err);
                false
            }
        }
    }

    pub fn try_save(&self, posts: &[Post]) -> Result<SaveSummary, StoreError> {
        let kept = posts.len().min(self.limits.max_posts);
        if kept < posts.len() {
            debug!("Dropping {} posts past the cap", posts.len() - kept);
        }

        let optimized: Vec<Post> = posts[..kept]
            .iter()
            .map(|post| post.optimized(self.limits))
            .collect();

        let chunk_size = self.limits.chunk_size.max(1);
        let mut chunks = 0;
        for (index, chunk) in optimized.chunks(chunk_size).enumerate() {
            let key = posts_chunk_key(index);
            let value = serde_json::to_string(chunk)
                .map_err(|source| StoreError::Json { key: key.clone(), source })?;
            self.storage.set(&key, &value)?;
            debug!("Wrote {} posts to {}", chunk.len(), key);
            chunks += 1;
        }

        self.storage.set(&posts_count_key(), &chunks.to_string())?;

        Ok(SaveSummary {
            posts: optimized.len(),
            chunks,
        })
    }

    /// Load the saved posts, or an empty list if anything cannot be read.
    pub fn load(&self) -> Vec<Post> {
        self.try_load().unwrap_or_else(|err| {
            error!("Failed to load posts: {}", err);
            vec![]
        })
    }

    pub fn try_load(&self) -> Result<Vec<Post>, StoreError> {
        let Some(count) = self.storage.get(&posts_count_key())? else {
            return Ok(vec![]);
        };
        let count: usize = count
            .trim()
            .parse()
            .map_err(|_| StoreError::ChunkCount(count.clone()))?;

        let mut posts = vec![];
        for index in 0..count {
            let key = posts_chunk_key(index);
            let Some(chunk) = self.storage.get(&key)? else {
                warn!("Missing post chunk {}", key);
                continue;
            };
            let chunk: Vec<Post> = serde_json::from_str(&chunk)
                .map_err(|source| StoreError::Json { key, source })?;
            posts.extend(chunk);
        }

        Ok(posts)
    }
}
