//! Type assertions written as comments: `// type is T` and twoslash `// ^? T`.

use std::sync::LazyLock;

use regex::Regex;

use crate::backend::TypeQuery;

static TYPE_IS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//.*[tT]ype is (?:still )?(?:just )?(.*?)\.?$").unwrap());
static TWOSLASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^//\s*\^\? (.*)$").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PIPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\|\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAssertion {
    /// 0-based line of the code being asserted about.
    pub line: usize,
    /// Column the assertion points at; only twoslash assertions have one.
    pub character: Option<usize>,
    pub expected: String,
}

impl TypeAssertion {
    pub fn query(&self) -> TypeQuery {
        TypeQuery {
            line: self.line,
            character: self.character,
        }
    }
}

struct OpenAssertion {
    index: usize,
    comment_col: usize,
    caret_col: Option<usize>,
}

/// Find every type assertion in `content`.
///
/// A comment after code on the same line asserts about that line; a comment
/// on a line of its own asserts about the line above. Further comment lines
/// at the same column continue the expected type (for twoslash, only when
/// indented past the caret).
pub fn extract_type_assertions(content: &str) -> Vec<TypeAssertion> {
    let mut assertions: Vec<TypeAssertion> = Vec::new();
    let mut open: Option<OpenAssertion> = None;

    for (i, line) in content.split('\n').enumerate() {
        let Some(col) = find_line_comment(line) else {
            open = None;
            continue;
        };
        let leading = line[..col].trim().is_empty();
        let comment = &line[col..];
        let is_assertion = TWOSLASH.is_match(comment) || TYPE_IS.is_match(comment);

        if let Some(current) = &open {
            if leading && !is_assertion && col == current.comment_col {
                if let Some(text) = continuation_text(comment, col, current.caret_col) {
                    let expected = &mut assertions[current.index].expected;
                    expected.push(' ');
                    expected.push_str(text);
                    continue;
                }
            }
        }
        open = None;

        if let Some(caps) = TWOSLASH.captures(comment) {
            if !leading || i == 0 {
                continue;
            }
            let caret = col + comment.find('^').unwrap_or(0);
            assertions.push(TypeAssertion {
                line: i - 1,
                character: Some(caret),
                expected: caps[1].trim().to_string(),
            });
            open = Some(OpenAssertion {
                index: assertions.len() - 1,
                comment_col: col,
                caret_col: Some(caret),
            });
        } else if let Some(caps) = TYPE_IS.captures(comment) {
            let target = match (leading, i) {
                (true, 0) => continue,
                (true, _) => i - 1,
                (false, _) => i,
            };
            assertions.push(TypeAssertion {
                line: target,
                character: None,
                expected: caps[1].trim().to_string(),
            });
            open = Some(OpenAssertion {
                index: assertions.len() - 1,
                comment_col: col,
                caret_col: None,
            });
        }
    }
    assertions
}

fn continuation_text(comment: &str, col: usize, caret_col: Option<usize>) -> Option<&str> {
    let rest = comment.strip_prefix("//")?;
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    let text_col = col + 2 + (rest.len() - rest.trim_start().len());
    match caret_col {
        Some(caret) if text_col <= caret => None,
        _ => Some(text),
    }
}

/// Byte offset of a `//` comment that is not inside a string literal.
fn find_line_comment(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => return Some(i),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Whether the type the checker reports satisfies an assertion.
///
/// A trailing `!` on the expected type is ignored. An expected type ending
/// in `...` only needs to match the start of the actual one. Otherwise the
/// comparison is [`match_modulo_whitespace`].
pub fn types_match(expected: &str, actual: &str) -> bool {
    let expected = expected.strip_suffix('!').unwrap_or(expected);
    if expected == actual {
        return true;
    }
    if let Some(head) = expected.strip_suffix("...") {
        if actual.starts_with(head) {
            return true;
        }
    }
    match_modulo_whitespace(actual, expected)
}

/// Collapse whitespace, tighten parentheses and space out `|`.
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let piped = PIPE.replace_all(&collapsed, " | ");
    piped.replace("( ", "(").replace(" )", ")")
}

/// Compare two types, ignoring whitespace and the order of top-level union
/// members. `...` in the expected type matches anything.
pub fn match_modulo_whitespace(actual: &str, expected: &str) -> bool {
    let actual = normalize(actual);
    let expected = normalize(expected);
    if actual == expected {
        return true;
    }
    let sorted_actual = sort_declared_union(&actual);
    let sorted_expected = sort_declared_union(&expected);
    if sorted_actual == sorted_expected {
        return true;
    }
    expected.contains("...")
        && (wildcard_match(&actual, &expected) || wildcard_match(&sorted_actual, &sorted_expected))
}

fn wildcard_match(actual: &str, expected: &str) -> bool {
    let pattern = expected
        .split("...")
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?s)^{}$", pattern))
        .map(|re| re.is_match(actual))
        .unwrap_or(false)
}

/// Top-level positions in `text`, skipping anything nested in brackets.
fn top_level_indices(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut depth: i32 = 0;
    let mut indices = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'{' | b'[' | b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'=' => {}
            b')' | b'}' | b']' | b'>' => depth -= 1,
            _ if depth == 0 => indices.push(i),
            _ => {}
        }
    }
    indices
}

/// Sort the members of a top-level union, leaving nested unions alone.
pub fn sort_unions(text: &str) -> String {
    let splits: Vec<usize> = top_level_indices(text)
        .into_iter()
        .filter(|&i| text.as_bytes()[i] == b'|')
        .collect();
    if splits.is_empty() {
        return text.to_string();
    }
    let mut parts = Vec::with_capacity(splits.len() + 1);
    let mut start = 0;
    for split in splits {
        parts.push(text[start..split].trim());
        start = split + 1;
    }
    parts.push(text[start..].trim());
    parts.sort_unstable();
    parts.join(" | ")
}

/// Sort union members after a declaration head such as `const x: ` or
/// `type T = `, so the head itself is not treated as a union member.
fn sort_declared_union(text: &str) -> String {
    let head_end = top_level_indices(text).into_iter().find_map(|i| {
        let rest = &text[i..];
        if rest.starts_with(": ") {
            Some(i + 2)
        } else if rest.starts_with(" = ") {
            Some(i + 3)
        } else {
            None
        }
    });
    match head_end {
        Some(end) => format!("{}{}", &text[..end], sort_unions(&text[end..])),
        None => sort_unions(text),
    }
}
