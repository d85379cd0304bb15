//! Routing each composed sample to the check its kind calls for.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{info, warn};

use literate::compose::compose;
use literate::failure::Failure;
use literate::jsonc;
use literate::position::ContentLocation;
use literate::sample::{EMIT_JS_SUFFIX, Kind, OUTPUT_SUFFIX, Sample, SampleOutput};

use crate::assertions::{TypeAssertion, extract_type_assertions, types_match};
use crate::backend::{
    CheckRequest, CompilerError, OutputMode, ScriptRunner, SessionRunner, TypeChecker, TypeQuery,
};
use crate::error::{BackendError, FatalError};
use crate::errors::{
    ErrorReport, MessageMatch, check_matching_errors, dedupe_diagnostics, extract_expected_errors,
};
use crate::output::{check_emit_output, check_output};
use crate::scratch::Scratch;
use crate::session::{check_transcript, parse_transcript};
use crate::tracker::Tracker;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Only verify samples whose id starts with this.
    pub filter: Option<String>,
    /// Longest allowed displayed line, if line lengths are checked.
    pub print_width: Option<usize>,
}

/// Everything a sample can be checked against while its document is open.
struct DocumentState<'a> {
    ids: HashSet<&'a str>,
    outputs: HashMap<String, SampleOutput>,
    dir: &'a Path,
}

pub struct Verifier<C, R, S> {
    checker: C,
    runner: R,
    session: S,
    scratch: Scratch,
    settings: Settings,
}

impl<C: TypeChecker, R: ScriptRunner, S: SessionRunner> Verifier<C, R, S> {
    pub fn new(checker: C, runner: R, session: S, scratch: Scratch, settings: Settings) -> Self {
        Verifier {
            checker,
            runner,
            session,
            scratch,
            settings,
        }
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Extract, compose and check every sample of one document.
    ///
    /// Malformed documents abort with a [`FatalError`]; everything else is
    /// recorded in `tracker` and checking carries on.
    pub fn check_document(
        &mut self,
        path: &str,
        text: &str,
        sources: &HashMap<String, String>,
        tracker: &mut Tracker,
    ) -> Result<(), FatalError> {
        tracker.start_file(path);
        let samples = literate::extract_samples(text, path)?;
        info!("Found {} code samples in {}", samples.len(), path);

        let mut failures = Vec::new();
        let samples = compose(samples, sources, &mut failures)?;
        tracker.record_all(failures);

        let mut document = DocumentState {
            ids: samples.iter().map(|s| s.id.as_str()).collect(),
            outputs: HashMap::new(),
            dir: Path::new(path).parent().unwrap_or(Path::new(".")),
        };
        for sample in &samples {
            if sample.skip {
                continue;
            }
            if let Some(filter) = &self.settings.filter {
                if !sample.id.starts_with(filter.as_str()) {
                    continue;
                }
            }
            tracker.start_sample(sample);
            let failures = self.check_sample(sample, &mut document);
            tracker.record_all(failures);
            tracker.finish_sample();
        }
        Ok(())
    }

    fn check_sample(&mut self, sample: &Sample, document: &mut DocumentState<'_>) -> Vec<Failure> {
        let mut failures = Vec::new();
        if let Err(error) = self.dispatch(sample, document, &mut failures) {
            failures.push(Failure::new(sample, error.to_string()));
        }
        if let Some(width) = self.settings.print_width {
            failures.extend(check_line_lengths(sample, width));
        }
        failures
    }

    fn dispatch(
        &mut self,
        sample: &Sample,
        document: &mut DocumentState<'_>,
        failures: &mut Vec<Failure>,
    ) -> Result<(), BackendError> {
        match &sample.kind {
            Kind::TypeScript => self.check_typed(sample, document, failures),
            Kind::JavaScript if sample.check_js => self.check_typed(sample, document, failures),
            Kind::JavaScript => self.run_script(sample, document, failures),
            Kind::Session => self.check_session(sample, failures),
            Kind::Json => {
                failures.extend(check_json(sample));
                Ok(())
            }
            Kind::Untyped if sample.is_output() => {
                let input_id = sample.id.strip_suffix(OUTPUT_SUFFIX).unwrap_or(sample.id.as_str());
                match document.outputs.get(input_id) {
                    _ if !document.ids.contains(input_id) => {
                        failures.push(Failure::new(sample, format!("No paired input: #{}", input_id)));
                    }
                    None => failures.push(Failure::new(
                        sample,
                        format!("Sample {} was not run or produced no output.", input_id),
                    )),
                    Some(output) => {
                        let scratch = output.path.as_deref().and_then(Path::parent);
                        match check_output(&sample.content, output, scratch) {
                            Ok(()) => info!("Actual output matched expected."),
                            Err(mismatch) => failures.push(mismatch.into_failure(
                                sample,
                                "Actual output from Node did not match expected output.",
                            )),
                        }
                    }
                }
                Ok(())
            }
            Kind::Untyped | Kind::Other(_) => Ok(()),
        }
    }

    fn install_node_modules(&self, sample: &Sample, dir: &Path, failures: &mut Vec<Failure>) {
        for name in &sample.node_modules {
            if let Err(candidates) = self.scratch.install_node_module(name, dir) {
                let tried = candidates
                    .iter()
                    .map(|c| format!("  {}", c.display()))
                    .collect::<Vec<_>>()
                    .join("\n");
                failures.push(
                    Failure::new(sample, format!("Could not find requested node_module {}", name))
                        .with_detail(format!("Looked in:\n{}", tried)),
                );
            }
        }
    }

    fn check_typed(
        &mut self,
        sample: &Sample,
        document: &mut DocumentState<'_>,
        failures: &mut Vec<Failure>,
    ) -> Result<(), BackendError> {
        let should_run = document.ids.contains(format!("{}{}", sample.id, OUTPUT_SUFFIX).as_str());
        let should_emit = document.ids.contains(format!("{}{}", sample.id, EMIT_JS_SUFFIX).as_str());
        if should_run && should_emit {
            failures.push(Failure::new(sample, "Cannot both run and check emitted JS"));
        }
        let mode = match (should_run, should_emit) {
            (true, _) => OutputMode::Run,
            (false, true) => OutputMode::Emit,
            (false, false) => OutputMode::CheckOnly,
        };

        self.install_node_modules(sample, document.dir, failures);
        let dir = self.scratch.sample_dir(&sample.id)?;
        dir.write_auxiliary_files(&sample.auxiliary_files)?;

        let file_name = format!("{}.{}", sample.id, sample.kind.extension(sample.is_tsx));
        let assertions = extract_type_assertions(&sample.content);
        let queries: Vec<TypeQuery> = assertions.iter().map(TypeAssertion::query).collect();
        let request = CheckRequest {
            file_name: &file_name,
            content: &sample.content,
            jsx: sample.is_tsx,
            options: &sample.options,
            work_dir: dir.path(),
            mode,
            type_queries: &queries,
        };
        let result = self.checker.check(&request)?;

        let num_lines = sample.content.split('\n').count();
        let actual = dedupe_diagnostics(result.diagnostics, num_lines);
        let expected = extract_expected_errors(&sample.content);
        let report = check_matching_errors(&expected, &actual);
        failures.extend(error_failures(sample, &report, expected.len()));
        failures.extend(assertion_failures(sample, &assertions, result.types.as_deref()));

        match mode {
            OutputMode::Run => match result.output {
                Some(output) => {
                    document.outputs.insert(sample.id.clone(), output);
                }
                None => failures.push(Failure::new(sample, "Failed to emit JavaScript for TypeScript sample.")),
            },
            OutputMode::Emit => match result.emitted {
                Some(emitted) => {
                    document.outputs.insert(
                        sample.id.clone(),
                        SampleOutput {
                            stdout: emitted,
                            ..SampleOutput::default()
                        },
                    );
                }
                None => failures.push(Failure::new(sample, "Failed to emit JavaScript for TypeScript sample.")),
            },
            OutputMode::CheckOnly => {}
        }
        Ok(())
    }

    fn run_script(
        &mut self,
        sample: &Sample,
        document: &mut DocumentState<'_>,
        failures: &mut Vec<Failure>,
    ) -> Result<(), BackendError> {
        self.install_node_modules(sample, document.dir, failures);
        let dir = self.scratch.sample_dir(&sample.id)?;
        dir.write_auxiliary_files(&sample.auxiliary_files)?;
        let file_name = format!("{}.{}", sample.id, sample.kind.extension(sample.is_tsx));
        let path = dir.write_file(&file_name, &sample.content)?;
        let output = self.runner.run(&path)?;

        let paired = format!("{}{}", sample.id, OUTPUT_SUFFIX);
        if output.code != 0 && !document.ids.contains(paired.as_str()) {
            failures.push(Failure::new(
                sample,
                format!(
                    "Node exited with code {} but there is no corresponding -output sample.",
                    output.code
                ),
            ));
        } else {
            info!("Node exited with code {}", output.code);
        }
        document.outputs.insert(sample.id.clone(), output);

        if let Some(input_id) = sample.id.strip_suffix(EMIT_JS_SUFFIX) {
            match document.outputs.get(input_id) {
                _ if !document.ids.contains(input_id) => {
                    failures.push(Failure::new(sample, format!("No paired input: #{}", input_id)));
                }
                None => failures.push(Failure::new(
                    sample,
                    format!("Sample {} was not run or produced no output.", input_id),
                )),
                Some(emitted) => match check_emit_output(&sample.content, &emitted.stdout) {
                    Ok(()) => info!("Actual JS emit matched expected."),
                    Err(mismatch) => failures.push(
                        mismatch.into_failure(sample, "Actual JS emit did not match expected JS."),
                    ),
                },
            }
        }
        Ok(())
    }

    fn check_session(&mut self, sample: &Sample, failures: &mut Vec<Failure>) -> Result<(), BackendError> {
        let lines: Vec<&str> = sample.content.split('\n').collect();
        let split = sample.prefixes_length.min(lines.len());
        let preamble = if split > 0 {
            let dir = self.scratch.sample_dir(&sample.id)?;
            let name = format!("{}-preamble.js", sample.id);
            Some(dir.write_file(&name, &lines[..split].join("\n"))?)
        } else {
            None
        };
        let transcript = parse_transcript(&lines[split..].join("\n"));
        let actual = self.session.replay(&transcript.inputs, preamble.as_deref())?;
        failures.extend(check_transcript(sample, &transcript, &actual));
        Ok(())
    }
}

fn check_json(sample: &Sample) -> Option<Failure> {
    let error = jsonc::parse(&sample.content).err()?;
    let hint = if sample.prefixes_length > 0 {
        " (prefixes are active, try adding a reset)"
    } else {
        ""
    };
    let location = ContentLocation {
        line: error.line().saturating_sub(1),
        start: error.column().saturating_sub(1),
        end: error.column(),
    };
    Some(Failure::at(sample, format!("Invalid JSONC{}: {}", hint, error), location))
}

fn describe(error: &CompilerError) -> String {
    format!("{}:{}-{}: {}", error.line, error.start, error.end, error.message)
}

fn location(error: &CompilerError) -> ContentLocation {
    ContentLocation {
        line: error.line,
        start: error.start,
        end: error.end,
    }
}

fn error_failures(sample: &Sample, report: &ErrorReport, num_expected: usize) -> Vec<Failure> {
    let mut failures = Vec::new();
    for matched in &report.matched {
        info!(expected = %matched.expected.message, actual = %matched.actual.message, "matched errors");
        if matched.message == MessageMatch::Mismatch {
            failures.push(
                Failure::at(
                    sample,
                    format!("Error message did not match: {}", describe(&matched.actual)),
                    location(&matched.actual),
                )
                .with_detail(format!("Expected: {}", matched.expected.message))
                .with_detail(format!("  Actual: {}", matched.actual.message)),
            );
        } else {
            info!("  error messages match: {:?}", matched.message);
        }
    }
    for error in &report.unexpected {
        failures.push(Failure::at(
            sample,
            format!("Unexpected TypeScript error: {}", describe(error)),
            location(error),
        ));
    }
    for error in &report.missing {
        failures.push(Failure::at(
            sample,
            format!("Expected TypeScript error was not produced: {}", describe(error)),
            location(error),
        ));
    }
    if num_expected > 0 {
        info!("Matched {}/{} errors.", report.matched.len(), num_expected);
    } else if report.unexpected.is_empty() {
        info!("Code passed type checker.");
    }
    failures
}

fn assertion_failures(
    sample: &Sample,
    assertions: &[TypeAssertion],
    types: Option<&[Option<String>]>,
) -> Vec<Failure> {
    if assertions.is_empty() {
        return Vec::new();
    }
    let Some(types) = types else {
        warn!("{} type assertions not checked", assertions.len());
        return vec![Failure::new(
            sample,
            "Type checker could not answer type queries for this sample's assertions",
        )];
    };

    let lines: Vec<&str> = sample.content.split('\n').collect();
    let mut failures = Vec::new();
    let mut unattached = 0;
    let mut matched = 0;
    for (i, assertion) in assertions.iter().enumerate() {
        let Some(actual) = types.get(i).and_then(Option::as_deref) else {
            unattached += 1;
            continue;
        };
        let code = lines.get(assertion.line).map(|l| l.trim()).unwrap_or("");
        if types_match(&assertion.expected, actual) {
            info!("Type assertion match: {} => {}", code, assertion.expected);
            matched += 1;
        } else {
            let line_len = lines.get(assertion.line).map_or(0, |l| l.len());
            failures.push(
                Failure::at(
                    sample,
                    format!("Failed type assertion for {}", code),
                    ContentLocation {
                        line: assertion.line,
                        start: assertion.character.unwrap_or(0),
                        end: line_len,
                    },
                )
                .with_detail(format!("Expected: {}", assertion.expected))
                .with_detail(format!("  Actual: {}", actual)),
            );
        }
    }
    if unattached > 0 {
        failures.push(Failure::new(sample, "Unable to attach all assertions to nodes"));
    } else {
        info!("  {}/{} type assertions matched.", matched, assertions.len());
    }
    failures
}

/// Flag displayed lines longer than `width`. Samples inside comment blocks
/// are never shown to readers and are exempt.
pub fn check_line_lengths(sample: &Sample, width: usize) -> Vec<Failure> {
    if sample.in_comment_block {
        return Vec::new();
    }
    sample
        .displayed_content()
        .split('\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let len = line.trim_end().chars().count();
            (len > width).then(|| {
                Failure::at(
                    sample,
                    format!("Line too long: {} > {}", len, width),
                    ContentLocation {
                        line: i + sample.prefixes_length,
                        start: width,
                        end: len,
                    },
                )
            })
        })
        .collect()
}
