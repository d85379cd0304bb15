use crate::directive::Directive;
use crate::options::{CompilerOptions, OptionValue};
use crate::sample::{LineRange, Prefix};

/// The next sample becomes a prefix for the samples after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPrepend {
    pub lines: Option<LineRange>,
    /// Attach as an auxiliary file with this name instead of concatenating.
    pub as_file: Option<String>,
}

/// Directive state in effect at the current position of a document.
///
/// Prefixes, node modules and `done-with-file` stay in effect until a
/// `reset` (explicit or implied by a heading). Everything else applies to
/// the next sample only and is cleared by a normal line or once that sample
/// has been recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveContext {
    pub prefixes: Vec<Prefix>,
    pub node_modules: Vec<String>,
    pub done_with_file: bool,

    pub prepend: Option<PendingPrepend>,
    pub skip: bool,
    pub options: CompilerOptions,
    pub next_is_tsx: bool,
    pub check_js: bool,
    pub replacement_id: Option<String>,
}

/// The apply-once part of the context, handed to the sample being recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextSample {
    pub prepend: Option<PendingPrepend>,
    pub skip: bool,
    pub options: CompilerOptions,
    pub is_tsx: bool,
    pub check_js: bool,
    pub replacement_id: Option<String>,
}

impl DirectiveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Reset => self.reset(),
            Directive::PrependToFollowing => {
                self.prepend = Some(PendingPrepend::default());
            }
            Directive::PrependSubsetToFollowing(lines) => {
                self.prepend = Some(PendingPrepend {
                    lines: Some(lines),
                    as_file: None,
                });
            }
            Directive::PrependIdToFollowing(id) => {
                self.prefixes.push(Prefix { id, lines: None });
            }
            Directive::PrependSubsetOfIdToFollowing { id, lines } => {
                self.prefixes.push(Prefix {
                    id,
                    lines: Some(lines),
                });
            }
            Directive::PrependAsFile(filename) => {
                self.prepend = Some(PendingPrepend {
                    lines: None,
                    as_file: Some(filename),
                });
            }
            Directive::Skip => self.skip = true,
            Directive::DoneWithFile => self.done_with_file = true,
            Directive::TsConfig { key, value } => {
                self.options.insert(key, value);
            }
            Directive::IncludeNodeModule(name) => self.node_modules.push(name),
            Directive::NextIsTsx => self.next_is_tsx = true,
            Directive::CheckJs => {
                self.check_js = true;
                self.options
                    .insert("allowJs".to_string(), OptionValue::Bool(true));
                self.options
                    .insert("noEmit".to_string(), OptionValue::Bool(true));
            }
            Directive::ReplaceWithId(id) => self.replacement_id = Some(id),
        }
    }

    /// A line that is neither a directive nor structural was seen.
    ///
    /// A pending prepend survives: it waits for the next sample with an id.
    pub fn clear_next(&mut self) {
        self.skip = false;
        self.options.clear();
        self.next_is_tsx = false;
        self.check_js = false;
        self.replacement_id = None;
    }

    /// Take the apply-once state for the sample about to be recorded.
    pub fn take_next(&mut self) -> NextSample {
        NextSample {
            prepend: self.prepend.take(),
            skip: std::mem::take(&mut self.skip),
            options: std::mem::take(&mut self.options),
            is_tsx: std::mem::take(&mut self.next_is_tsx),
            check_js: std::mem::take(&mut self.check_js),
            replacement_id: self.replacement_id.take(),
        }
    }
}
