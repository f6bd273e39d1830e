//! Size caps applied to text and inlined images before they are stored.

pub const IMAGE_PAYLOAD_PREFIX: &str = "data:image";
pub const ELLIPSIS: &str = "...";

/// Cap an inlined image payload at `max` characters.
///
/// URLs and anything that is not a `data:image` payload pass through as-is.
/// The cut is lossy and may leave an undecodable payload.
pub fn compress_image(image: &str, max: usize) -> String {
    if !image.starts_with(IMAGE_PAYLOAD_PREFIX) {
        return image.to_string();
    }
    take_chars(image, max).to_string()
}

/// Shorten `text` to `max` characters followed by [`ELLIPSIS`].
pub fn truncate(text: &str, max: usize) -> String {
    let head = take_chars(text, max);
    if head.len() == text.len() {
        text.to_string()
    } else {
        format!("{head}{ELLIPSIS}")
    }
}

fn take_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
