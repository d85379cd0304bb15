//! JSON with comments.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsoncError {
    #[error("unexpected end of comment opened at line {line} column {column}")]
    UnterminatedComment { line: usize, column: usize },

    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
}

impl JsoncError {
    /// 1-based line of the error.
    pub fn line(&self) -> usize {
        match self {
            JsoncError::UnterminatedComment { line, .. } => *line,
            JsoncError::Syntax(error) => error.line(),
        }
    }

    /// 1-based column of the error.
    pub fn column(&self) -> usize {
        match self {
            JsoncError::UnterminatedComment { column, .. } => *column,
            JsoncError::Syntax(error) => error.column(),
        }
    }
}

/// Blank out `//` and `/* */` comments, keeping line and column positions.
pub fn strip_comments(text: &str) -> String {
    blank_comments(text).0
}

/// The blanked text, and the byte offset of a block comment that never closes.
fn blank_comments(text: &str) -> (String, Option<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;

    while let Some((offset, c)) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek().map(|&(_, next)| next)) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                out.push_str("  ");
                chars.next();
                while let Some(&(_, next)) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(if next == '\r' { '\r' } else { ' ' });
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        out.push(' ');
                        closed = true;
                        break;
                    }
                    out.push(if next == '\n' || next == '\r' { next } else { ' ' });
                    prev = next;
                }
                if !closed {
                    return (out, Some(offset));
                }
            }
            _ => out.push(c),
        }
    }
    (out, None)
}

/// Parse JSON that may contain comments.
pub fn parse(text: &str) -> Result<Value, JsoncError> {
    let (stripped, unterminated) = blank_comments(text);
    if let Some(offset) = unterminated {
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        return Err(JsoncError::UnterminatedComment {
            line,
            column: before[line_start..].chars().count() + 1,
        });
    }
    Ok(serde_json::from_str(&stripped)?)
}

/// Plain JSON for `text`, or the comment-stripped text if it does not parse.
pub fn to_json(text: &str) -> String {
    let stripped = strip_comments(text);
    serde_json::from_str::<Value>(&stripped)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or(stripped)
}
