use std::sync::LazyLock;

use regex::Regex;

static HIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^ *// HIDE.*?^ *// END\n?").unwrap());
static LINE_COMPRESS_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *//) COMPRESS").unwrap());
static INLINE_COMPRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\* COMPRESS .*? END \*/").unwrap());
static MARKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*// (HIDE|END)\b").unwrap());

/// Reduce a full source to what a reader sees in print.
///
/// `// HIDE` .. `// END` regions disappear entirely. A `// COMPRESS` .. `// END`
/// region collapses to `// ...` at the indentation of its opening comment,
/// and an inline `/* COMPRESS */ .. /* END */` collapses to `/* ... */`.
pub fn strip_source(source: &str) -> String {
    let hidden = HIDE.replace_all(source, "");
    let compressed = compress_line_regions(&hidden);
    INLINE_COMPRESS.replace_all(&compressed, "/* ... */").into_owned()
}

/// A line-comment COMPRESS region only closes on an END comment with the
/// same indentation as its opener.
fn compress_line_regions(text: &str) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let opener = LINE_COMPRESS_START
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        let Some(opener) = opener else {
            out.push_str(line);
            i += 1;
            continue;
        };
        let closer = format!("{} END", opener);
        match (i + 1..lines.len()).find(|&j| lines[j].starts_with(&closer)) {
            Some(j) => {
                out.push_str(opener);
                out.push_str(" ...");
                out.push_str(&lines[j][closer.len()..]);
                i = j + 1;
            }
            None => {
                out.push_str(line);
                i += 1;
            }
        }
    }
    out
}

/// Drop the `// HIDE` and `// END` marker lines themselves, keeping what
/// they enclose.
pub fn strip_hide_markers(text: &str) -> String {
    text.split('\n')
        .filter(|line| !MARKER_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}
