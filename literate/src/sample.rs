use std::fmt;
use std::path::PathBuf;

use crate::error::ExtractError;
use crate::options::CompilerOptions;

/// Id suffix of a block holding the expected output of its paired sample.
pub const OUTPUT_SUFFIX: &str = "-output";

/// Id suffix of a block holding the JavaScript emitted for its paired sample.
pub const EMIT_JS_SUFFIX: &str = "-emit-js";

/// What a code block contains, as declared by its language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Type-checked source (`ts`).
    TypeScript,
    /// Plain script (`js`); type-checked as well under `check-js`.
    JavaScript,
    /// A recorded interactive terminal session (`node`).
    Session,
    /// Structured data that may contain comments (`json`).
    Json,
    /// No language tag. Used for expected-output blocks.
    Untyped,
    /// Any other tag. Extracted, never verified.
    Other(String),
}

impl Kind {
    pub fn from_tag(tag: Option<&str>) -> Kind {
        let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return Kind::Untyped;
        };
        match tag.to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Kind::TypeScript,
            "js" | "javascript" => Kind::JavaScript,
            "node" => Kind::Session,
            "json" | "jsonc" => Kind::Json,
            _ => Kind::Other(tag.to_string()),
        }
    }

    /// Whether an untagged block of this kind still gets a synthesized id.
    pub fn is_checkable(&self, check_js: bool) -> bool {
        match self {
            Kind::TypeScript | Kind::Session | Kind::Json => true,
            Kind::JavaScript => check_js,
            Kind::Untyped | Kind::Other(_) => false,
        }
    }

    /// File extension used when the sample is written to disk.
    pub fn extension(&self, is_tsx: bool) -> &'static str {
        match self {
            Kind::TypeScript if is_tsx => "tsx",
            Kind::TypeScript => "ts",
            Kind::JavaScript if is_tsx => "jsx",
            Kind::JavaScript | Kind::Session => "js",
            Kind::Json => "json",
            Kind::Untyped | Kind::Other(_) => "txt",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::TypeScript => write!(f, "ts"),
            Kind::JavaScript => write!(f, "js"),
            Kind::Session => write!(f, "node"),
            Kind::Json => write!(f, "json"),
            Kind::Untyped => write!(f, "(none)"),
            Kind::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// A 1-based, inclusive range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Parse `<start>-<end>`.
    pub fn parse(directive: &str, text: &str) -> Result<LineRange, ExtractError> {
        let (start, end) = text
            .trim()
            .split_once('-')
            .ok_or_else(|| ExtractError::malformed(directive, "expected <start>-<end>"))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| ExtractError::malformed(directive, format!("`{}` is not a line number", s)))
        };
        let range = LineRange {
            start: parse(start)?,
            end: parse(end)?,
        };
        if range.start == 0 || range.start > range.end {
            return Err(ExtractError::malformed(
                directive,
                format!("invalid line range {}-{}", range.start, range.end),
            ));
        }
        Ok(range)
    }

    /// Slice `text` down to the lines this range covers.
    pub fn slice<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split('\n')
            .skip(self.start - 1)
            .take(self.end + 1 - self.start)
            .collect()
    }
}

/// A reference to another sample whose content (or part of it) comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub id: String,
    pub lines: Option<LineRange>,
}

/// A prefix materialized as its own file next to the sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryFile {
    pub filename: String,
    pub content: String,
}

/// What running a sample produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    /// The file that was executed.
    pub path: Option<PathBuf>,
}

/// One extracted code block and everything needed to verify it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    /// `file:line` label, fixed when the sample is created.
    pub descriptor: String,
    pub kind: Kind,
    pub content: String,
    pub section_header: Option<String>,
    pub options: CompilerOptions,
    pub node_modules: Vec<String>,
    pub is_tsx: bool,
    pub check_js: bool,
    pub source_file: String,
    /// 0-based document line of the first content line.
    pub line_number: usize,
    pub prefixes: Vec<Prefix>,
    /// Number of content lines contributed by concatenated prefixes.
    pub prefixes_length: usize,
    pub replacement_id: Option<String>,
    /// Set by `prepend-as-file`: this sample is written out under that name.
    pub target_filename: Option<String>,
    pub auxiliary_files: Vec<AuxiliaryFile>,
    pub skip: bool,
    pub in_comment_block: bool,
    /// Content as it appears in the document, before composition rewrote it.
    pub original_content: Option<String>,
    pub output: Option<SampleOutput>,
}

impl Sample {
    pub fn new(id: impl Into<String>, kind: Kind, content: impl Into<String>) -> Self {
        Sample {
            id: id.into(),
            descriptor: String::new(),
            kind,
            content: content.into(),
            section_header: None,
            options: CompilerOptions::new(),
            node_modules: Vec::new(),
            is_tsx: false,
            check_js: false,
            source_file: String::new(),
            line_number: 0,
            prefixes: Vec::new(),
            prefixes_length: 0,
            replacement_id: None,
            target_filename: None,
            auxiliary_files: Vec::new(),
            skip: false,
            in_comment_block: false,
            original_content: None,
            output: None,
        }
    }

    /// Whether this block holds the expected output of another sample.
    pub fn is_output(&self) -> bool {
        self.id.ends_with(OUTPUT_SUFFIX)
    }

    /// The text shown to readers, which line-based checks run over.
    pub fn displayed_content(&self) -> &str {
        self.original_content.as_deref().unwrap_or(&self.content)
    }
}

/// `descriptor` for a block whose marker sits at 0-based `line` of `source_file`.
pub fn descriptor_for(source_file: &str, line: usize) -> String {
    let file = if std::path::Path::new(source_file).is_absolute() || source_file.starts_with("./")
    {
        source_file.to_string()
    } else {
        format!("./{}", source_file)
    };
    format!("{}:{}", file, line + 1)
}
