use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use literate::options::{CompilerOptions, parse_option_value};

/// Read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG: &str = "literate.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Longest allowed displayed line. Unset disables the check.
    #[serde(default)]
    pub print_width: Option<usize>,

    /// Compiler options applied to every typed sample, beneath the sample's
    /// own `tsconfig:` directives.
    #[serde(default)]
    pub compiler: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub tools: Tools,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tools {
    /// TypeScript compiler executable. Looked up on `PATH` if unset.
    #[serde(default)]
    pub tsc: Option<PathBuf>,

    /// Node.js executable. Looked up on `PATH` if unset.
    #[serde(default)]
    pub node: Option<PathBuf>,

    /// Project `tsconfig.json` that per-sample configurations extend.
    #[serde(default)]
    pub tsconfig: Option<PathBuf>,
}

impl Config {
    /// Load `explicit`, or `literate.toml` if present, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None if Path::new(DEFAULT_CONFIG).exists() => PathBuf::from(DEFAULT_CONFIG),
            None => return Ok(Config::default()),
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Config::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }

    /// The `[compiler]` table, converted the same way `tsconfig:` directives are.
    pub fn compiler_options(&self) -> Result<CompilerOptions> {
        self.compiler
            .iter()
            .map(|(key, value)| {
                let raw = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let value = parse_option_value(key, &raw)
                    .with_context(|| format!("in [compiler] table, key `{}`", key))?;
                Ok((key.clone(), value))
            })
            .collect()
    }
}
