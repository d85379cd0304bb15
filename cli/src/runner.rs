use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::info;

use literate::Failure;
use literate::position::LineIndex;
use literate::replacements::load_sources;
use verifier::backend::TypeChecker;
use verifier::tracker::FileReport;
use verifier::{FatalError, NodeRepl, NodeRunner, Scratch, Settings, Tracker, TscChecker, Verifier};

use crate::config::Config;
use crate::logging;

/// Options of the `check` command after merging flags over the config file.
pub struct CheckOptions {
    pub files: Vec<PathBuf>,
    pub replacements: Option<PathBuf>,
    pub filter: Option<String>,
    pub print_width: Option<usize>,
    pub alsologtostderr: bool,
    pub no_color: bool,
}

fn pass_spec() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Green));
    spec
}

fn fail_spec() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red));
    spec
}

fn bold_spec() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    spec
}

/// Write `text` styled by `spec`; the style is dropped when color is off.
fn styled(out: &mut impl WriteColor, spec: &ColorSpec, text: &str) -> io::Result<()> {
    out.set_color(spec)?;
    write!(out, "{}", text)?;
    out.reset()
}

/// Renders diagnostics against the documents they came from.
struct Renderer {
    files: SimpleFiles<String, String>,
    ids: HashMap<String, usize>,
    indexes: HashMap<usize, LineIndex>,
    writer: StandardStream,
    config: term::Config,
}

impl Renderer {
    fn new(no_color: bool) -> Self {
        let color_choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Renderer {
            files: SimpleFiles::new(),
            ids: HashMap::new(),
            indexes: HashMap::new(),
            writer: StandardStream::stderr(color_choice),
            config: term::Config::default(),
        }
    }

    fn add(&mut self, name: &str, source: String) -> usize {
        let index = LineIndex::new(&source);
        let file_id = self.files.add(name.to_string(), source);
        self.ids.insert(name.to_string(), file_id);
        self.indexes.insert(file_id, index);
        file_id
    }

    fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit_to_write_style(&mut self.writer.lock(), &self.config, &self.files, diagnostic);
    }

    fn emit_failure(&self, failure: &Failure) {
        let Some(&file_id) = self.ids.get(&failure.source_file) else {
            eprintln!("error: {}", failure);
            return;
        };
        let line_span = failure.location.and_then(|location| {
            let index = self.indexes.get(&file_id)?;
            (location.line >= 1 && location.line <= index.line_count())
                .then(|| index.line_span(location.line - 1))
        });
        self.emit(&failure.to_diagnostic(file_id, line_span));
    }
}

fn report_file(file: &FileReport, renderer: &Renderer) -> io::Result<()> {
    for sample in file.failed() {
        for failure in &sample.failures {
            renderer.emit_failure(failure);
        }
    }
    let passed = file.passed();
    let total = file.samples.len();
    let mut out = renderer.writer.lock();
    write!(out, "  ")?;
    if passed == total {
        styled(&mut out, &pass_spec(), "PASS")?;
    } else {
        styled(&mut out, &fail_spec(), "FAIL")?;
    }
    writeln!(out, "  {}: {}/{} passed", file.path, passed, total)
}

fn print_summary(tracker: &Tracker, renderer: &Renderer) -> io::Result<()> {
    let mut out = renderer.writer.lock();
    writeln!(out)?;
    for file in tracker.files() {
        styled(&mut out, &bold_spec(), &file.path)?;
        writeln!(out, ": {}/{} passed", file.passed(), file.samples.len())?;
        for sample in file.failed() {
            write!(out, "  ")?;
            styled(&mut out, &fail_spec(), "FAIL")?;
            writeln!(out, "  {}", sample.descriptor)?;
        }
    }
    writeln!(out)?;
    let passed = tracker.passed();
    let failed = tracker.total() - passed;
    write!(out, "test result: ")?;
    if failed == 0 {
        styled(&mut out, &pass_spec(), "ok")?;
        writeln!(out, ". {} passed, 0 failed", passed)
    } else {
        styled(&mut out, &fail_spec(), "FAILED")?;
        writeln!(out, ". {} passed, {} failed (of {})", passed, failed, tracker.total())
    }
}

/// Verify every document. Returns the process exit code: 0 if every sample
/// passed, 1 if any failed or a document could not be processed.
pub fn run_check(options: CheckOptions, config: &Config) -> Result<i32> {
    let scratch = Scratch::kept().context("cannot create scratch directory")?;
    let log_path = scratch.path().join("log.txt");
    logging::init(&log_path, options.alsologtostderr, options.no_color)?;
    eprintln!("Logging details to {}", log_path.display());

    let sources = match &options.replacements {
        Some(dir) => {
            let sources = load_sources(dir)?;
            info!("Loaded {} replacement sources from {}", sources.len(), dir.display());
            sources
        }
        None => HashMap::new(),
    };

    let runner = NodeRunner::locate(config.tools.node.as_deref())?;
    let repl = NodeRepl::locate(config.tools.node.as_deref())?;
    let checker = TscChecker::locate(config.tools.tsc.as_deref(), runner.clone())?
        .with_base_options(config.compiler_options()?)
        .with_project_config(config.tools.tsconfig.clone());
    info!("Verifying with node {} and {}", runner.version()?, checker.version());

    let settings = Settings {
        filter: options.filter.clone(),
        print_width: options.print_width.or(config.print_width),
    };
    let mut verifier = Verifier::new(checker, runner, repl, scratch, settings);
    let mut tracker = Tracker::new();
    let mut renderer = Renderer::new(options.no_color);

    let total = options.files.len();
    for (n, path) in options.files.iter().enumerate() {
        let name = display_path(path);
        {
            let mut out = renderer.writer.lock();
            writeln!(out)?;
            styled(&mut out, &bold_spec(), &format!("{}/{}: {}", n + 1, total, name))?;
            writeln!(out)?;
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let file_id = renderer.add(&path.display().to_string(), text.clone());

        match verifier.check_document(&path.display().to_string(), &text, &sources, &mut tracker) {
            Ok(()) => {}
            Err(FatalError::Scan(error)) => {
                renderer.emit(&error.to_diagnostic(file_id));
                return Ok(1);
            }
            Err(error) => {
                eprintln!("error: {}", error);
                return Ok(1);
            }
        }
        if let Some(file) = tracker.current_file() {
            report_file(file, &renderer)?;
        }
    }

    print_summary(&tracker, &renderer)?;
    Ok(if tracker.has_failures() { 1 } else { 0 })
}

/// Print the samples of one document, optionally after composition.
pub fn run_extract(path: &Path, composed: bool, no_color: bool) -> Result<i32> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path.display().to_string();
    let mut renderer = Renderer::new(no_color);
    let file_id = renderer.add(&name, text.clone());

    let samples = match literate::extract_samples(&text, &name) {
        Ok(samples) => samples,
        Err(error) => {
            renderer.emit(&error.to_diagnostic(file_id));
            return Ok(1);
        }
    };
    if !composed {
        println!("{:#?}", samples);
        return Ok(0);
    }

    let mut failures = Vec::new();
    let samples = literate::compose::compose(samples, &HashMap::new(), &mut failures)?;
    println!("{:#?}", samples);
    for failure in &failures {
        renderer.emit_failure(failure);
    }
    Ok(if failures.is_empty() { 0 } else { 1 })
}

fn display_path(path: &Path) -> String {
    if path.is_absolute() || path.starts_with(".") {
        path.display().to_string()
    } else {
        format!("./{}", path.display())
    }
}
