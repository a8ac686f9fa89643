//! # Text Format Module
//!
//! Post-processing of model replies before they are sent to Telegram:
//! Markdown headings become bold text and long replies are split into
//! chunks under the platform message limit.

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length of a Telegram text message, in characters
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

const HEADING_PREFIXES: &[&str] = &["### ", "## ", "# "];

lazy_static! {
    static ref DOUBLE_BOLD_REGEX: Regex =
        Regex::new(r"\*\*(.+?)\*\*").expect("Bold pattern should be valid");
}

/// Convert Markdown headings and `**bold**` into Telegram Markdown bold (`*bold*`)
pub fn headings_to_bold(text: &str) -> String {
    let text = DOUBLE_BOLD_REGEX.replace_all(text, "*$1*");

    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            match HEADING_PREFIXES
                .iter()
                .find_map(|prefix| trimmed.strip_prefix(prefix))
            {
                Some(heading) => format!("*{}*", heading.trim().trim_matches('*')),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `text` into chunks of at most `limit` characters.
///
/// Each chunk ends right after the last newline that fits in the limit; when
/// there is none, the chunk is cut at the limit. Concatenating the chunks gives
/// back the original text.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let hard_end = match rest.char_indices().nth(limit) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(rest.to_string());
                break;
            }
        };

        let cut = match rest[..hard_end].rfind('\n') {
            Some(pos) if pos > 0 => pos + 1,
            _ => hard_end,
        };

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_become_bold() {
        let input = "### Plan\nEat well\n## Notes\n**Drink** water";
        let output = headings_to_bold(input);
        assert_eq!(output, "*Plan*\nEat well\n*Notes*\n*Drink* water");
    }

    #[test]
    fn test_heading_without_space_untouched() {
        assert_eq!(headings_to_bold("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_message("hello", TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_message("", TELEGRAM_MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn test_hard_cut_without_newlines() {
        let text = "a".repeat(10);
        let chunks = split_message(&text, 4);
        assert_eq!(chunks, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "ж".repeat(6);
        let chunks = split_message(&text, 4);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4);
        assert_eq!(chunks.concat(), text);
    }
}
