pub const MAX_POSTS: usize = 20;
pub const CHUNK_SIZE: usize = 5;
pub const MAX_SAVED_COMMENTS: usize = 10;
pub const MAX_COMMENTS: usize = 50;
pub const MAX_IMAGE_LENGTH: usize = 100_000;
pub const POST_CONTENT_MAX: usize = 280;
pub const COMMENT_CONTENT_MAX: usize = 140;

/// Caps applied when posts and users are written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Posts kept by a save, newest first.
    pub max_posts: usize,
    /// Posts per chunk key.
    pub chunk_size: usize,
    /// Trailing comments kept per post by a save.
    pub max_saved_comments: usize,
    /// Comments kept per post while commenting.
    pub max_comments: usize,
    pub max_image_length: usize,
    pub post_content_max: usize,
    pub comment_content_max: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_posts: MAX_POSTS,
            chunk_size: CHUNK_SIZE,
            max_saved_comments: MAX_SAVED_COMMENTS,
            max_comments: MAX_COMMENTS,
            max_image_length: MAX_IMAGE_LENGTH,
            post_content_max: POST_CONTENT_MAX,
            comment_content_max: COMMENT_CONTENT_MAX,
        }
    }
}
