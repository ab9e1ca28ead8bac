//! Result rendering for the CLI.

use crate::search::Document;

/// Longest content excerpt printed per line.
const EXCERPT_CHARS: usize = 72;

/// Render documents one per line: rank, id, corpus and a content excerpt.
#[must_use]
pub fn render_table(docs: &[Document]) -> String {
    if docs.is_empty() {
        return "no results\n".to_string();
    }
    let mut out = String::new();
    for (rank, doc) in docs.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. #{:<6} corpus {:<4} {}\n",
            rank + 1,
            doc.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            doc.corpus,
            excerpt(&doc.content)
        ));
    }
    out
}

/// Render documents as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn render_json(docs: &[Document]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(docs)
}

fn excerpt(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(EXCERPT_CHARS - 1).collect();
    cut.push('…');
    cut
}
