use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::ExtractError;

/// Compiler options keyed by option name, in stable order.
pub type CompilerOptions = BTreeMap<String, OptionValue>;

/// A single compiler option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(i64),
    String(String),
    Enum(EnumSymbol),
}

/// A named member of one of the compiler's enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumSymbol {
    pub enum_name: &'static str,
    pub name: &'static str,
    pub value: i64,
}

impl OptionValue {
    /// Value as written into a JSON compiler configuration.
    pub fn to_json(&self) -> Value {
        match self {
            OptionValue::Bool(b) => Value::Bool(*b),
            OptionValue::Number(n) => Value::from(*n),
            OptionValue::String(s) => Value::String(s.clone()),
            OptionValue::Enum(symbol) => Value::String(symbol.name.to_string()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::String(s) => write!(f, "{}", s),
            OptionValue::Enum(symbol) => write!(f, "{}", symbol.name),
        }
    }
}

struct EnumTable {
    option: &'static str,
    enum_name: &'static str,
    members: &'static [(&'static str, i64)],
}

const ENUM_OPTIONS: &[EnumTable] = &[
    EnumTable {
        option: "target",
        enum_name: "ScriptTarget",
        members: &[
            ("ES3", 0),
            ("ES5", 1),
            ("ES2015", 2),
            ("ES6", 2),
            ("ES2016", 3),
            ("ES2017", 4),
            ("ES2018", 5),
            ("ES2019", 6),
            ("ES2020", 7),
            ("ES2021", 8),
            ("ES2022", 9),
            ("ES2023", 10),
            ("ESNext", 99),
            ("JSON", 100),
        ],
    },
    EnumTable {
        option: "module",
        enum_name: "ModuleKind",
        members: &[
            ("None", 0),
            ("CommonJS", 1),
            ("AMD", 2),
            ("UMD", 3),
            ("System", 4),
            ("ES2015", 5),
            ("ES6", 5),
            ("ES2020", 6),
            ("ES2022", 7),
            ("ESNext", 99),
            ("Node16", 100),
            ("NodeNext", 199),
            ("Preserve", 200),
        ],
    },
    EnumTable {
        option: "moduleResolution",
        enum_name: "ModuleResolutionKind",
        members: &[
            ("Classic", 1),
            ("Node", 2),
            ("Node10", 2),
            ("NodeJs", 2),
            ("Node16", 3),
            ("NodeNext", 99),
            ("Bundler", 100),
        ],
    },
    EnumTable {
        option: "jsx",
        enum_name: "JsxEmit",
        members: &[
            ("None", 0),
            ("Preserve", 1),
            ("React", 2),
            ("ReactNative", 3),
            ("ReactJSX", 4),
            ("ReactJSXDev", 5),
        ],
    },
    EnumTable {
        option: "moduleDetection",
        enum_name: "ModuleDetectionKind",
        members: &[("Legacy", 1), ("Auto", 2), ("Force", 3)],
    },
    EnumTable {
        option: "newLine",
        enum_name: "NewLineKind",
        members: &[("CRLF", 0), ("LF", 1)],
    },
];

impl EnumTable {
    fn resolve(&self, raw: &str) -> Result<EnumSymbol, ExtractError> {
        let found = match raw.parse::<i64>() {
            Ok(n) => self.members.iter().find(|(_, value)| *value == n),
            Err(_) => self
                .members
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(raw)),
        };
        match found {
            Some(&(name, value)) => Ok(EnumSymbol {
                enum_name: self.enum_name,
                name,
                value,
            }),
            None => {
                let mut values: Vec<i64> = self.members.iter().map(|(_, v)| *v).collect();
                values.dedup();
                Err(ExtractError::InvalidEnumValue {
                    enum_name: self.enum_name.to_string(),
                    value: raw.to_string(),
                    expected: values
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
            }
        }
    }
}

/// Whether `key` names an enum-valued option.
pub fn is_enum_option(key: &str) -> bool {
    ENUM_OPTIONS.iter().any(|t| t.option == key)
}

/// Interpret the textual value of `key=value`.
///
/// Booleans are recognised first, then enum-valued keys are resolved
/// against the option table (by symbol, case-insensitively, or by numeric
/// value). Other integers become numbers and everything else is kept as a
/// string.
pub fn parse_option_value(key: &str, raw: &str) -> Result<OptionValue, ExtractError> {
    let raw = raw.trim();
    match raw {
        "true" => return Ok(OptionValue::Bool(true)),
        "false" => return Ok(OptionValue::Bool(false)),
        _ => {}
    }
    if let Some(table) = ENUM_OPTIONS.iter().find(|t| t.option == key) {
        return table.resolve(raw).map(OptionValue::Enum);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(OptionValue::Number(n));
    }
    Ok(OptionValue::String(raw.to_string()))
}
