// Download filenames derived from the input text.
//
// The first 20 characters of the code are slugified and wrapped as
// `code_music_<slug>.mid`. Slugs are lowercase ASCII alphanumerics joined by
// single hyphens, so the result is safe in a path and in a
// Content-Disposition header.

/// Characters of input text that feed the slug.
pub const SLUG_SOURCE_CHARS: usize = 20;

/// Lowercase `text` and collapse every run of non-alphanumeric characters
/// into one hyphen, trimming hyphens at both ends. Non-ASCII characters are
/// treated as separators.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Filename offered for the MIDI produced from `text`.
pub fn download_filename(text: &str) -> String {
    let prefix: String = text.chars().take(SLUG_SOURCE_CHARS).collect();
    format!("code_music_{}.mid", slugify(&prefix))
}
