mod context;

pub use context::{DirectiveContext, NextSample, PendingPrepend};

use crate::error::ExtractError;
use crate::options::{OptionValue, parse_option_value};
use crate::sample::LineRange;

/// One parsed `verifier:` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Reset,
    PrependToFollowing,
    PrependSubsetToFollowing(LineRange),
    PrependIdToFollowing(String),
    PrependSubsetOfIdToFollowing { id: String, lines: LineRange },
    PrependAsFile(String),
    Skip,
    DoneWithFile,
    TsConfig { key: String, value: OptionValue },
    IncludeNodeModule(String),
    NextIsTsx,
    CheckJs,
    ReplaceWithId(String),
}

impl Directive {
    /// Parse the text following `verifier:`.
    pub fn parse(text: &str) -> Result<Directive, ExtractError> {
        let text = text.trim();
        // `skip` may carry a free-form remark, e.g. "skip (not valid TypeScript)".
        if text.starts_with("skip") {
            return Ok(Directive::Skip);
        }

        let (name, args) = match text.split_once(':') {
            Some((name, args)) => (name, Some(args)),
            None => (text, None),
        };
        let arg = |what: &str| -> Result<String, ExtractError> {
            match args.map(str::trim) {
                Some(a) if !a.is_empty() => Ok(a.to_string()),
                _ => Err(ExtractError::malformed(text, format!("missing {}", what))),
            }
        };

        let directive = match name {
            "reset" => Directive::Reset,
            "prepend-to-following" => Directive::PrependToFollowing,
            "prepend-subset-to-following" => {
                Directive::PrependSubsetToFollowing(LineRange::parse(text, &arg("line range")?)?)
            }
            "prepend-id-to-following" => Directive::PrependIdToFollowing(arg("sample id")?),
            "prepend-subset-of-id-to-following" => {
                let args = arg("sample id and line range")?;
                let (id, range) = args
                    .rsplit_once(':')
                    .ok_or_else(|| ExtractError::malformed(text, "expected <id>:<start>-<end>"))?;
                Directive::PrependSubsetOfIdToFollowing {
                    id: id.to_string(),
                    lines: LineRange::parse(text, range)?,
                }
            }
            "prepend-as-file" => Directive::PrependAsFile(arg("file name")?),
            "done-with-file" => Directive::DoneWithFile,
            "tsconfig" => {
                let setting = arg("option")?;
                let (key, value) = setting
                    .split_once('=')
                    .ok_or_else(|| ExtractError::malformed(text, "expected <key>=<value>"))?;
                let key = key.trim().to_string();
                let value = parse_option_value(&key, value)?;
                Directive::TsConfig { key, value }
            }
            "include-node-module" => Directive::IncludeNodeModule(arg("module name")?),
            "next-is-tsx" => Directive::NextIsTsx,
            "check-js" => Directive::CheckJs,
            "replace-with-id" => Directive::ReplaceWithId(arg("sample id")?),
            _ => return Err(ExtractError::UnknownDirective(text.to_string())),
        };
        Ok(directive)
    }
}
