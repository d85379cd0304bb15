use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use literate::sample::SampleOutput;

use crate::backend::{ScriptRunner, SessionInput, SessionRunner};
use crate::error::BackendError;

const PREAMBLE_MARKER: &str = "'--preamble-loaded--'";

/// Find an executable, preferring an explicitly configured path.
pub(crate) fn locate(tool: &str, explicit: Option<&Path>) -> Result<PathBuf, BackendError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => which::which(tool).map_err(|source| BackendError::ToolNotFound {
            tool: tool.to_string(),
            source,
        }),
    }
}

/// A node command whose output does not depend on the terminal.
pub(crate) fn node_command(node: &Path) -> Command {
    let mut command = Command::new(node);
    command
        .env("NO_COLOR", "1")
        .env("FORCE_COLOR", "0")
        .env("NODE_DISABLE_COLORS", "1");
    command
}

/// Runs scripts with `node`.
#[derive(Debug, Clone)]
pub struct NodeRunner {
    node: PathBuf,
}

impl NodeRunner {
    pub fn new(node: PathBuf) -> Self {
        NodeRunner { node }
    }

    pub fn locate(explicit: Option<&Path>) -> Result<Self, BackendError> {
        locate("node", explicit).map(NodeRunner::new)
    }

    pub fn version(&self) -> Result<String, BackendError> {
        let output = node_command(&self.node)
            .arg("--version")
            .output()
            .map_err(|source| BackendError::Spawn {
                program: self.node.display().to_string(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a helper script with `args`, feeding `input` on stdin.
    pub(crate) fn run_helper(
        &self,
        script: &Path,
        args: &[&OsStr],
        input: &str,
    ) -> Result<SampleOutput, BackendError> {
        let spawn_error = |source| BackendError::Spawn {
            program: format!("{} {}", self.node.display(), script.display()),
            source,
        };
        let mut child = node_command(&self.node)
            .arg(script)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        Ok(SampleOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            path: Some(script.to_path_buf()),
        })
    }
}

impl ScriptRunner for NodeRunner {
    fn run(&mut self, path: &Path) -> Result<SampleOutput, BackendError> {
        debug!(path = %path.display(), "node");
        let mut command = node_command(&self.node);
        command.arg(path);
        if let Some(dir) = path.parent() {
            command.current_dir(dir);
        }
        let output = command.output().map_err(|source| BackendError::Spawn {
            program: self.node.display().to_string(),
            source,
        })?;
        Ok(SampleOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// Replays sessions through `node --interactive` with stdin piped in.
#[derive(Debug, Clone)]
pub struct NodeRepl {
    node: PathBuf,
}

impl NodeRepl {
    pub fn new(node: PathBuf) -> Self {
        NodeRepl { node }
    }

    pub fn locate(explicit: Option<&Path>) -> Result<Self, BackendError> {
        locate("node", explicit).map(NodeRepl::new)
    }

    fn run_session(
        &self,
        statements: &[&str],
        preamble: Option<&Path>,
    ) -> Result<Vec<String>, BackendError> {
        let spawn_error = |source| BackendError::Spawn {
            program: format!("{} --interactive", self.node.display()),
            source,
        };

        let mut script = String::new();
        if let Some(preamble) = preamble {
            script.push_str(&format!(".load {}\n{}\n", preamble.display(), PREAMBLE_MARKER));
        }
        for statement in statements {
            script.push_str(statement);
            script.push('\n');
        }
        script.push_str(".exit\n");

        let mut child = node_command(&self.node)
            .arg("--interactive")
            .env("NODE_NO_READLINE", "1")
            .env("NODE_REPL_HISTORY", "")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let mut blocks = split_prompts(&stdout);
        if preamble.is_some() {
            let marker = blocks
                .iter()
                .position(|b| b.contains(PREAMBLE_MARKER))
                .ok_or_else(|| BackendError::Protocol("preamble did not finish loading".into()))?;
            blocks.drain(..=marker);
        }
        blocks.truncate(statements.len());
        Ok(blocks)
    }
}

impl SessionRunner for NodeRepl {
    fn replay(
        &mut self,
        inputs: &[SessionInput],
        preamble: Option<&Path>,
    ) -> Result<Vec<String>, BackendError> {
        let mut outputs = Vec::new();
        let mut segment: Vec<&str> = Vec::new();
        for input in inputs {
            match input {
                SessionInput::Statement(statement) => segment.push(statement),
                SessionInput::Reset => {
                    if !segment.is_empty() {
                        outputs.extend(self.run_session(&segment, preamble)?);
                        segment.clear();
                    }
                }
            }
        }
        if !segment.is_empty() {
            outputs.extend(self.run_session(&segment, preamble)?);
        }
        Ok(outputs)
    }
}

/// Split REPL output into the text printed after each `> ` prompt.
/// Anything before the first prompt is a banner and is dropped.
pub(crate) fn split_prompts(stdout: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in stdout.split('\n') {
        let mut rest = line;
        loop {
            if let Some(after) = rest.strip_prefix("> ") {
                blocks.push(Vec::new());
                rest = after;
            } else if let Some(after) = rest.strip_prefix("... ") {
                rest = after;
            } else {
                break;
            }
        }
        if let Some(block) = blocks.last_mut() {
            block.push(rest);
        }
    }
    blocks
        .into_iter()
        .map(|lines| lines.join("\n").trim_end().to_string())
        .collect()
}
