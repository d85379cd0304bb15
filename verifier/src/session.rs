//! Recorded interactive sessions (`node` blocks).
//!
//! A transcript looks like a terminal: `$ node` starts a fresh session,
//! `> ` prefixes a statement, `... ` continues it, and every other line is
//! output the statement is expected to print.

use literate::failure::Failure;
use literate::position::ContentLocation;
use literate::sample::Sample;

use crate::backend::SessionInput;

/// One statement of a transcript and the output written under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub statement: String,
    /// 0-based transcript line the statement starts on.
    pub line: usize,
    pub expected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub inputs: Vec<SessionInput>,
    pub steps: Vec<Step>,
}

pub fn parse_transcript(text: &str) -> Transcript {
    enum Event {
        Reset,
        Step(usize),
    }
    let mut steps: Vec<Step> = Vec::new();
    let mut expected: Vec<Vec<&str>> = Vec::new();
    let mut events = Vec::new();

    for (i, line) in text.split('\n').enumerate() {
        if line.starts_with("$ ") {
            events.push(Event::Reset);
        } else if let Some(statement) = line.strip_prefix("> ") {
            events.push(Event::Step(steps.len()));
            steps.push(Step {
                statement: statement.to_string(),
                line: i,
                expected: String::new(),
            });
            expected.push(Vec::new());
        } else if let Some(more) = line.strip_prefix("... ") {
            if let Some(step) = steps.last_mut() {
                step.statement.push('\n');
                step.statement.push_str(more);
            }
        } else if let Some(lines) = expected.last_mut() {
            lines.push(line);
        }
    }

    for (step, lines) in steps.iter_mut().zip(expected) {
        step.expected = lines.join("\n").trim().to_string();
    }
    let inputs = events
        .into_iter()
        .map(|event| match event {
            Event::Reset => SessionInput::Reset,
            Event::Step(i) => SessionInput::Statement(steps[i].statement.clone()),
        })
        .collect();
    Transcript { inputs, steps }
}

/// Whether a captured block agrees with the expected one. The REPL may echo
/// the statement first, and prints `undefined` after statements with no
/// value, which transcripts usually leave out.
pub fn outputs_match(statement: &str, expected: &str, actual: &str) -> bool {
    let expected = expected.trim();
    let lines: Vec<&str> = actual.trim().split('\n').collect();
    let echoed = lines.first().map(|l| l.trim()) == Some(statement.trim());
    let bodies = if echoed {
        vec![&lines[..], &lines[1..]]
    } else {
        vec![&lines[..]]
    };
    bodies.into_iter().any(|body| {
        let body = match body.split_last() {
            Some((&"undefined", rest)) if !expected.ends_with("undefined") => rest,
            _ => body,
        };
        body.join("\n").trim() == expected
    })
}

/// Compare each step with what the session printed for it.
pub fn check_transcript(sample: &Sample, transcript: &Transcript, actual: &[String]) -> Vec<Failure> {
    transcript
        .steps
        .iter()
        .enumerate()
        .filter_map(|(i, step)| {
            let got = actual.get(i).map(String::as_str).unwrap_or("");
            if outputs_match(&step.statement, &step.expected, got) {
                return None;
            }
            let first_line = step.statement.split('\n').next().unwrap_or("");
            let location = ContentLocation {
                line: sample.prefixes_length + step.line,
                start: 0,
                end: first_line.len() + 2,
            };
            Some(
                Failure::at(sample, "Session output did not match transcript", location)
                    .with_detail(format!("> {}", step.statement))
                    .with_detail(format!("Expected:\n{}", step.expected))
                    .with_detail(format!("Actual:\n{}", got)),
            )
        })
        .collect()
}
