//! Expected errors written under the code as `// ~~~ message` comments.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::backend::CompilerError;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( *//) (.*)$").unwrap());
static TILDES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" (~+)").unwrap());

/// Collect the errors a sample says the checker should report.
///
/// Tildes mark the span on the nearest code line above. The rest of the
/// comment is the message, which may continue on the following comment
/// lines as long as they use the same comment prefix.
pub fn extract_expected_errors(content: &str) -> Vec<CompilerError> {
    let mut errors: Vec<CompilerError> = Vec::new();
    let mut last_code_line: Option<usize> = None;
    // Errors from the latest tilde line, and its comment prefix.
    let mut open: Option<(Range<usize>, String)> = None;

    for (i, line) in content.split('\n').enumerate() {
        let Some(caps) = COMMENT.captures(line) else {
            last_code_line = Some(i);
            open = None;
            continue;
        };
        let prefix = &caps[1];
        let text = &caps[2];

        let spans: Vec<(usize, usize)> = TILDES
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(|m| (m.start(), m.end()))
            .collect();

        if let Some(&(_, last_end)) = spans.last() {
            let Some(code_line) = last_code_line else {
                open = None;
                continue;
            };
            let message = line[last_end..].trim().to_string();
            let first = errors.len();
            errors.extend(spans.iter().map(|&(start, end)| CompilerError {
                line: code_line,
                start,
                end,
                message: message.clone(),
            }));
            open = Some((first..errors.len(), prefix.to_string()));
            continue;
        }

        let continued = match &open {
            Some((range, open_prefix))
                if open_prefix == prefix && !text.trim_start().starts_with("^?") =>
            {
                Some(range.clone())
            }
            _ => None,
        };
        match continued {
            Some(range) => {
                for error in &mut errors[range] {
                    if !error.message.is_empty() {
                        error.message.push(' ');
                    }
                    error.message.push_str(text.trim());
                }
            }
            None => open = None,
        }
    }
    errors
}

/// How well an actual message agrees with an expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageMatch {
    Perfect,
    /// The author wrote no message.
    EmptyExpected,
    /// The expected message is a substring of the actual one.
    Subset,
    /// The expected message matches with `...` standing for anything.
    Wildcard,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMatch {
    pub expected: CompilerError,
    pub actual: CompilerError,
    pub message: MessageMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    pub matched: Vec<ErrorMatch>,
    /// Reported by the checker but not expected.
    pub unexpected: Vec<CompilerError>,
    /// Expected but not reported.
    pub missing: Vec<CompilerError>,
}

impl ErrorReport {
    pub fn is_ok(&self) -> bool {
        self.unexpected.is_empty()
            && self.missing.is_empty()
            && self.matched.iter().all(|m| m.message != MessageMatch::Mismatch)
    }
}

/// Drop diagnostics past the end of the unit, and keep only the last of
/// several diagnostics reported for the same span.
pub fn dedupe_diagnostics(actual: Vec<CompilerError>, num_lines: usize) -> Vec<CompilerError> {
    let mut kept: Vec<CompilerError> = Vec::new();
    for error in actual.into_iter().filter(|e| e.line < num_lines) {
        match kept
            .iter_mut()
            .find(|k| k.line == error.line && k.start == error.start && k.end == error.end)
        {
            Some(existing) => *existing = error,
            None => kept.push(error),
        }
    }
    kept
}

fn overlaps(a: &CompilerError, b: &CompilerError) -> bool {
    a.line == b.line && a.start <= b.end && b.start <= a.end
}

fn normalize(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn match_message(expected: &str, actual: &str) -> MessageMatch {
    let expected = normalize(expected);
    let actual = normalize(actual);
    if expected.is_empty() {
        return MessageMatch::EmptyExpected;
    }
    if expected == actual {
        return MessageMatch::Perfect;
    }
    if actual.contains(&expected) {
        return MessageMatch::Subset;
    }
    if expected.contains("...") {
        let mut rest = actual.as_str();
        let all_found = expected.split("...").map(str::trim).all(|part| match rest.find(part) {
            Some(pos) => {
                rest = &rest[pos + part.len()..];
                true
            }
            None => false,
        });
        if all_found {
            return MessageMatch::Wildcard;
        }
    }
    MessageMatch::Mismatch
}

/// Pair up expected and actual errors by overlapping spans.
pub fn check_matching_errors(expected: &[CompilerError], actual: &[CompilerError]) -> ErrorReport {
    let mut report = ErrorReport::default();
    let mut used = vec![false; actual.len()];

    for want in expected {
        let found = actual
            .iter()
            .enumerate()
            .find(|(i, got)| !used[*i] && overlaps(want, got));
        match found {
            Some((i, got)) => {
                used[i] = true;
                report.matched.push(ErrorMatch {
                    expected: want.clone(),
                    actual: got.clone(),
                    message: match_message(&want.message, &got.message),
                });
            }
            None => report.missing.push(want.clone()),
        }
    }
    report.unexpected = actual
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(error, _)| error.clone())
        .collect();
    report
}
