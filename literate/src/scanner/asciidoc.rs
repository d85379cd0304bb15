use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScanError;
use crate::scanner::{Locator, SampleConsumer, find_closing};

static EXTRACT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]*)\]\]").unwrap());
static EXTRACT_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[source,\s*([A-Za-z0-9_+-]+)").unwrap());
static EXTRACT_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^// verifier:(.*)$").unwrap());
static TOP_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^={1,3} (.*)$").unwrap());

const BLOCK_DELIMITER: &str = "----";
const COMMENT_DELIMITER: &str = "////";

fn capture<'t>(re: &Regex, line: &'t str) -> Option<&'t str> {
    re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Scan an AsciiDoc document.
pub fn scan(
    text: &str,
    source_file: &str,
    consumer: &mut impl SampleConsumer,
) -> Result<(), ScanError> {
    let locator = Locator::new(text, source_file);
    let lines: Vec<&str> = text.lines().collect();
    let mut in_comment_block = false;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(id) = capture(&EXTRACT_ID, line) {
            consumer.set_next_id(id, i);
        } else if let Some(language) = capture(&EXTRACT_SOURCE, line) {
            consumer.set_next_language(Some(language));
        } else if let Some(header) = capture(&TOP_HEADER, line) {
            consumer.set_header(header);
        } else if let Some(directive) = capture(&EXTRACT_DIRECTIVE, line) {
            locator.locate(i, consumer.set_directive(directive))?;
        } else {
            if line == COMMENT_DELIMITER {
                in_comment_block = !in_comment_block;
                consumer.set_in_comment_block(in_comment_block);
            } else if line == BLOCK_DELIMITER {
                let start = i + 1;
                let end = find_closing(&lines, start, |l| l == BLOCK_DELIMITER);
                let content = lines[start.min(end)..end].join("\n");
                consumer.set_line_num(start);
                locator.locate(start, consumer.add_sample(&content))?;
                i = end;
            }
            consumer.reset_with_normal_line();
        }
        i += 1;
    }
    Ok(())
}
