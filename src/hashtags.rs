//! Caption and hashtag helpers

/// Turn free text into a hashtag: `"Albert Einstein"` becomes `"#alberteinstein"`.
///
/// Returns `None` when nothing alphanumeric is left.
pub fn hashtag(text: &str) -> Option<String> {
    let body: String = text
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if body.is_empty() {
        None
    } else {
        Some(format!("#{body}"))
    }
}

/// Join the base tags and a tag for the author, without duplicates.
pub fn caption(base_tags: &[String], author: Option<&str>) -> String {
    let mut tags: Vec<String> = Vec::new();
    let candidates = base_tags
        .iter()
        .filter_map(|t| hashtag(t))
        .chain(author.and_then(hashtag));
    for tag in candidates {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags.join(" ")
}
