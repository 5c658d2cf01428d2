//! Terminal output for search results.

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use crate::models::ArxivResult;

/// Longest title shown in a table cell before truncation.
pub const MAX_TITLE_WIDTH: usize = 80;

/// Longest author list shown in a table cell before truncation.
pub const MAX_AUTHORS_WIDTH: usize = 40;

/// Truncate text to at most `max_width` characters, appending an ellipsis if
/// anything was cut.
///
/// ```
/// use arxiv_pager::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let truncated: String = text.chars().take(max_width - 3).collect();
    format!("{}...", truncated.trim_end())
}

/// Render results as a table.
pub fn render_table(results: &[ArxivResult]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "ID", "Title", "Authors", "Published"]);

    for (i, result) in results.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            result.short_id().to_string(),
            truncate_with_ellipsis(&result.title, MAX_TITLE_WIDTH),
            truncate_with_ellipsis(&result.author_names(), MAX_AUTHORS_WIDTH),
            result.published.format("%Y-%m-%d").to_string(),
        ]);
    }

    table.to_string()
}

/// Render results one per line: `id<TAB>title`.
pub fn render_plain(results: &[ArxivResult]) -> String {
    results
        .iter()
        .map(|r| format!("{}\t{}", r.short_id(), r.title))
        .collect::<Vec<_>>()
        .join("\n")
}
