use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScanError;
use crate::scanner::{Locator, SampleConsumer, find_closing};

static EXTRACT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!-- #([^ ]+) -->").unwrap());
static EXTRACT_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- verifier:(.*) -->").unwrap());
// Older documents mark ids and directives with bare line comments.
static LEGACY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^// #(\S+)\s*$").unwrap());
static LEGACY_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^// verifier:(.*)$").unwrap());
static TOP_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,3} (.*)$").unwrap());

const FENCE: &str = "```";

fn capture<'t>(re: &Regex, line: &'t str) -> Option<&'t str> {
    re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Scan a Markdown document.
pub fn scan(
    text: &str,
    source_file: &str,
    consumer: &mut impl SampleConsumer,
) -> Result<(), ScanError> {
    let locator = Locator::new(text, source_file);
    let lines: Vec<&str> = text.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(id) = capture(&EXTRACT_ID, line).or_else(|| capture(&LEGACY_ID, line)) {
            consumer.set_next_id(id, i);
        } else if let Some(header) = capture(&TOP_HEADER, line) {
            consumer.set_header(header);
        } else if let Some(directive) = capture(&EXTRACT_DIRECTIVE, line)
            .or_else(|| capture(&LEGACY_DIRECTIVE, line))
        {
            locator.locate(i, consumer.set_directive(directive))?;
        } else {
            if let Some(info) = line.strip_prefix(FENCE) {
                let language = info.split_whitespace().next();
                consumer.set_next_language(language);
                let start = i + 1;
                let end = find_closing(&lines, start, |l| l == FENCE);
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
