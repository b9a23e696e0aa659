//! Stylesheet block merging.
//!
//! A stored stylesheet may carry any number of externally-sourced blocks, each wrapped in a
//! pair of marker lines naming its source. Merging inserts a block for a source or replaces
//! the existing one, leaving every byte outside the block untouched.

use tracing::warn;

use crate::error::{PublishError, Result};

/// Creates the opening marker for a source's block.
pub fn start_marker(source: &str) -> String {
    format!("/***** ---- START EXTERNAL STYLESHEET '{}' ---- ****/", source)
}

/// Creates the closing marker for a source's block.
pub fn end_marker(source: &str) -> String {
    format!("/***** ---- END EXTERNAL STYLESHEET '{}' ---- ****/", source)
}

fn format_block(source: &str, content: &str) -> String {
    format!("{}\n{}\n{}", start_marker(source), content, end_marker(source))
}

/// Returns true when the body already carries an opening marker for `source`.
pub fn has_block(body: &str, source: &str) -> bool {
    body.contains(&start_marker(source))
}

/// Inserts or replaces the block for `source` in `body`.
///
/// Without an existing block the new one is appended, separated by blank lines. With one,
/// the span from its opening marker to the end of its closing marker is replaced.
///
/// # Errors
/// Returns [`PublishError::DataCorruption`] when the opening marker has no closing marker
/// after it, or when the opening marker occurs more than once.
///
/// # Example
/// ```
/// use appframe_publish_core::merge::merge_block;
///
/// let once = merge_block("body { margin: 0; }", "theme.css", "a { color: red; }").unwrap();
/// let twice = merge_block(&once, "theme.css", "a { color: blue; }").unwrap();
/// assert!(twice.starts_with("body { margin: 0; }"));
/// assert!(twice.contains("a { color: blue; }"));
/// assert!(!twice.contains("a { color: red; }"));
/// ```
pub fn merge_block(body: &str, source: &str, new_content: &str) -> Result<String> {
    let start = start_marker(source);
    let end = end_marker(source);

    if new_content.contains(&start) || new_content.contains(&end) {
        warn!(
            source = source,
            "Content contains its own block markers; later merges of this source may fail"
        );
    }

    let Some(start_idx) = body.find(&start) else {
        return Ok(format!("{}\n\n{}\n\n", body, format_block(source, new_content)));
    };

    let after_start = start_idx + start.len();
    if body[after_start..].contains(&start) {
        return Err(PublishError::DataCorruption {
            source_name: source.to_string(),
            reason: "opening marker occurs more than once".to_string(),
        });
    }

    let end_idx = match body[after_start..].find(&end) {
        Some(offset) => after_start + offset + end.len(),
        None => {
            return Err(PublishError::DataCorruption {
                source_name: source.to_string(),
                reason: "opening marker has no matching closing marker".to_string(),
            })
        }
    };

    Ok(format!(
        "{}{}{}",
        &body[..start_idx],
        format_block(source, new_content),
        &body[end_idx..]
    ))
}
