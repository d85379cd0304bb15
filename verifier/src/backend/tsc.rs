use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use literate::options::CompilerOptions;

use crate::backend::node::{NodeRunner, locate};
use crate::backend::{
    CheckRequest, CheckResult, CompilerError, OutputMode, ScriptRunner, TypeChecker, TypeQuery,
};
use crate::error::BackendError;

const TYPE_QUERY_SCRIPT: &str = include_str!("type_query.cjs");
const TYPE_QUERY_FILE: &str = ".literate-type-query.cjs";

static DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)\((\d+),(\d+)\): error TS\d+: (.*)$").unwrap()
});

/// Checks units by running the TypeScript compiler CLI on a generated
/// project file.
///
/// The CLI reports where a diagnostic starts but not where it ends, so the
/// span is taken to cover the token at that position. Type queries are
/// answered by a helper script that loads the `typescript` package `tsc`
/// belongs to.
#[derive(Debug, Clone)]
pub struct TscChecker {
    tsc: PathBuf,
    /// `lib/typescript.js` next to `tsc`, if the install has one.
    typescript: Option<PathBuf>,
    runner: NodeRunner,
    base_options: CompilerOptions,
    project_config: Option<PathBuf>,
}

impl TscChecker {
    pub fn new(tsc: PathBuf, runner: NodeRunner) -> Self {
        TscChecker {
            typescript: typescript_module(&tsc),
            tsc,
            runner,
            base_options: CompilerOptions::new(),
            project_config: None,
        }
    }

    pub fn locate(explicit: Option<&Path>, runner: NodeRunner) -> Result<Self, BackendError> {
        locate("tsc", explicit).map(|tsc| TscChecker::new(tsc, runner))
    }

    /// Options applied to every unit, beneath per-sample options.
    pub fn with_base_options(mut self, options: CompilerOptions) -> Self {
        self.base_options = options;
        self
    }

    /// A project `tsconfig.json` that generated configurations extend.
    pub fn with_project_config(mut self, path: Option<PathBuf>) -> Self {
        self.project_config = path;
        self
    }

    fn config_for(&self, request: &CheckRequest<'_>) -> Value {
        let mut options = Map::new();
        for (key, value) in self.base_options.iter().chain(request.options.iter()) {
            options.insert(key.clone(), value.to_json());
        }
        match request.mode {
            OutputMode::CheckOnly => {
                options.insert("noEmit".into(), Value::Bool(true));
            }
            OutputMode::Run | OutputMode::Emit => {
                options.insert("noEmit".into(), Value::Bool(false));
                options.insert("outDir".into(), Value::String(".".into()));
                options.remove("declaration");
            }
        }
        if request.jsx && !options.contains_key("jsx") {
            options.insert("jsx".into(), Value::String("preserve".into()));
        }
        options.insert("pretty".into(), Value::Bool(false));

        let mut config = json!({
            "compilerOptions": options,
            "files": [request.file_name],
        });
        if let Some(project) = &self.project_config {
            config["extends"] = Value::String(project.display().to_string());
        }
        config
    }

    /// Ask the helper script for the type at each queried position. `None`
    /// if the helper could not run to completion.
    fn answer_queries(
        &self,
        request: &CheckRequest<'_>,
        config_path: &Path,
    ) -> Result<Option<Vec<Option<String>>>, BackendError> {
        let script = request.work_dir.join(TYPE_QUERY_FILE);
        write(&script, TYPE_QUERY_SCRIPT)?;
        let typescript = self
            .typescript
            .as_deref()
            .map_or(OsStr::new("typescript"), Path::as_os_str);
        let args = [typescript, config_path.as_os_str(), OsStr::new(request.file_name)];

        debug!(queries = request.type_queries.len(), "type queries");
        let output = self
            .runner
            .run_helper(&script, &args, &queries_json(request.type_queries))?;
        if output.code != 0 {
            warn!(code = output.code, stderr = %output.stderr.trim(), "type query helper failed");
            return Ok(None);
        }
        match parse_answers(&output.stdout, request.type_queries.len()) {
            Some(answers) => Ok(Some(answers)),
            None => {
                warn!(stdout = %output.stdout.trim(), "type query helper gave no usable answer");
                Ok(None)
            }
        }
    }
}

/// `lib/typescript.js` of the package whose `bin/tsc` is `tsc`, following
/// the `node_modules/.bin` symlink.
fn typescript_module(tsc: &Path) -> Option<PathBuf> {
    let real = std::fs::canonicalize(tsc).ok()?;
    let lib = real.parent()?.parent()?.join("lib").join("typescript.js");
    lib.is_file().then_some(lib)
}

fn queries_json(queries: &[TypeQuery]) -> String {
    Value::Array(
        queries
            .iter()
            .map(|q| json!({ "line": q.line, "character": q.character }))
            .collect(),
    )
    .to_string()
}

/// One answer per query, or `None` if the helper's output is malformed.
fn parse_answers(stdout: &str, expected: usize) -> Option<Vec<Option<String>>> {
    let answers: Vec<Option<String>> = serde_json::from_str(stdout.trim()).ok()?;
    (answers.len() == expected).then_some(answers)
}

impl TypeChecker for TscChecker {
    fn version(&self) -> String {
        Command::new(&self.tsc)
            .arg("--version")
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn check(&mut self, request: &CheckRequest<'_>) -> Result<CheckResult, BackendError> {
        let source_path = request.work_dir.join(request.file_name);
        write(&source_path, request.content)?;

        let stem = Path::new(request.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sample");
        let config_path = request.work_dir.join(format!("tsconfig.{}.json", stem));
        let config = serde_json::to_string_pretty(&self.config_for(request))
            .map_err(|e| BackendError::Protocol(e.to_string()))?;
        write(&config_path, &config)?;

        debug!(config = %config_path.display(), "tsc");
        let output = Command::new(&self.tsc)
            .arg("-p")
            .arg(&config_path)
            .current_dir(request.work_dir)
            .output()
            .map_err(|source| BackendError::Spawn {
                program: self.tsc.display().to_string(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics = parse_diagnostics(&stdout, request.file_name, request.content);

        let types = if request.type_queries.is_empty() {
            Some(Vec::new())
        } else {
            self.answer_queries(request, &config_path)?
        };
        let mut result = CheckResult {
            diagnostics,
            types,
            ..CheckResult::default()
        };
        if request.mode == OutputMode::CheckOnly {
            return Ok(result);
        }

        let emitted_path = request.work_dir.join(format!("{}.js", stem));
        if !emitted_path.exists() {
            warn!(file = %emitted_path.display(), "compiler did not emit JavaScript");
            return Ok(result);
        }
        match request.mode {
            OutputMode::Emit => {
                result.emitted = Some(std::fs::read_to_string(&emitted_path).map_err(|source| {
                    BackendError::Write {
                        path: emitted_path.clone(),
                        source,
                    }
                })?);
            }
            OutputMode::Run => result.output = Some(self.runner.run(&emitted_path)?),
            OutputMode::CheckOnly => {}
        }
        Ok(result)
    }
}

fn write(path: &Path, content: &str) -> Result<(), BackendError> {
    std::fs::write(path, content).map_err(|source| BackendError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `file(line,col): error TSnnnn: message` lines for `file_name`.
/// Indented lines that follow continue the previous message.
pub(crate) fn parse_diagnostics(stdout: &str, file_name: &str, content: &str) -> Vec<CompilerError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut errors: Vec<CompilerError> = Vec::new();
    let mut continuing = false;

    for line in stdout.lines() {
        if let Some(caps) = DIAGNOSTIC.captures(line) {
            continuing = Path::new(&caps[1]).file_name() == Path::new(file_name).file_name();
            if !continuing {
                continue;
            }
            let (Ok(line_no), Ok(col)) = (caps[2].parse::<usize>(), caps[3].parse::<usize>()) else {
                continue;
            };
            let line_no = line_no.saturating_sub(1);
            let start = col.saturating_sub(1);
            let end = start + token_len(lines.get(line_no).copied().unwrap_or(""), start);
            errors.push(CompilerError {
                line: line_no,
                start,
                end,
                message: caps[4].to_string(),
            });
        } else if continuing && line.starts_with("  ") {
            if let Some(last) = errors.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim());
            }
        } else {
            continuing = false;
        }
    }
    errors
}

/// Length of the token starting at `start`: an identifier or number, a
/// string literal, or a single character.
fn token_len(line: &str, start: usize) -> usize {
    let chars: Vec<char> = line.chars().skip(start).collect();
    let Some(&first) = chars.first() else {
        return 1;
    };
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    if is_word(first) {
        return chars.iter().take_while(|&&c| is_word(c)).count();
    }
    if matches!(first, '"' | '\'' | '`') {
        if let Some(close) = chars[1..].iter().position(|&c| c == first) {
            return close + 2;
        }
    }
    1
}
