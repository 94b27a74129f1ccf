//! Post-processing: deterministic cleanup of converter output.
//!
//! Decoding libraries disagree on line endings, trailing spaces and blank
//! runs; PDF text extraction in particular leaves long runs of empty lines
//! and soft hyphens. Each rule here is a pure `&str → String` pass, and the
//! whole pipeline is idempotent: cleaning already-clean text is a no-op.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule can split on `\n`;
//! invisible characters are stripped before whitespace trimming so a
//! zero-width space cannot shield trailing blanks.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to raw converter output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Insert a missing GFM separator row after a table header
/// 6. Ensure the text ends with exactly one newline (empty stays empty)
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = fix_table_headers(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Fix table headers ────────────────────────────────────────────────

/// A table block is a run of `|`-delimited lines. If its second line is not a
/// separator row, one is inserted after the first line, sized to its columns.
fn fix_table_headers(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut result: Vec<String> = Vec::with_capacity(lines.len() + 4);
    let mut prev_was_table = false;

    for (i, line) in lines.iter().enumerate() {
        let is_row = is_table_row(line);
        result.push((*line).to_string());

        let starts_block = is_row && !prev_was_table && !is_separator_row(line);
        if starts_block {
            let next = lines.get(i + 1).copied().unwrap_or("");
            if is_table_row(next) && !is_separator_row(next) {
                result.push(separator_for(line));
            }
        }
        prev_was_table = is_row;
    }

    let mut out = result.join("\n");
    if input.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn separator_for(header: &str) -> String {
    let col_count = header.trim().matches('|').count().saturating_sub(1).max(1);
    std::iter::once("|")
        .chain(std::iter::repeat(" --- |").take(col_count))
        .collect()
}

fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.len() > 2
}

fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.starts_with('|') || !trimmed.contains('-') {
        return false;
    }
    // A separator row contains only |, -, :, and whitespace
    trimmed
        .chars()
        .all(|c| c == '|' || c == '-' || c == ':' || c == ' ')
}

// ── Rule 6: Ensure text ends with a single newline ───────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        let input = "a\n\n\n\n\n\nb";
        assert_eq!(collapse_blank_lines(input), "a\n\n\nb");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("hello"), "hello\n");
        assert_eq!(ensure_final_newline("hello\n\n\n"), "hello\n");
        assert_eq!(ensure_final_newline(""), "");
        assert_eq!(ensure_final_newline(" \n\n"), "");
    }

    #[test]
    fn test_fix_table_header_inserts_once() {
        let input = "| A | B |\n| 1 | 2 |\n| 3 | 4 |";
        let result = fix_table_headers(input);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines.iter().filter(|l| is_separator_row(l)).count(), 1);
    }

    #[test]
    fn test_table_with_separator_unchanged() {
        let input = "| A | B |\n| --- | --- |\n| 1 | 2 |";
        assert_eq!(fix_table_headers(input), input);
    }

    #[test]
    fn test_single_row_table_unchanged() {
        let input = "text\n| only |\nmore";
        assert_eq!(fix_table_headers(input), input);
    }

    #[test]
    fn test_pipe_text_is_not_a_separator() {
        assert!(!is_separator_row("| |"));
        assert!(is_separator_row("| :--- | ---: |"));
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_clean_markdown_full_pipeline() {
        let input = "\u{FEFF}# Title\r\n\r\nSome text   \n\n\n\n\n\n## Section\n\n| A | B |\n| 1 | 2 |\n\n\n";
        let result = clean_markdown(input);
        assert!(result.starts_with("# Title"));
        assert!(result.ends_with("| 1 | 2 |\n"));
        assert!(!result.contains("\n\n\n\n"));
        assert!(result.contains("| A | B |\n| --- | --- |\n| 1 | 2 |"));
    }

    #[test]
    fn test_clean_markdown_is_idempotent() {
        let input = "Intro\r\n\n\n\n\n| x | y |\n| 1 | 2 |\ntrailing  \u{200B}";
        let once = clean_markdown(input);
        assert_eq!(clean_markdown(&once), once);
    }
}
