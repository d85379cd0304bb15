use std::collections::HashMap;

use literate::directive::{Directive, DirectiveContext};
use literate::error::ExtractError;
use literate::jsonc::{self, JsoncError};
use literate::options::{OptionValue, parse_option_value};
use literate::position::{LineIndex, remap_line};
use literate::replacements::load_sources;
use literate::sample::{LineRange, Prefix};

fn parse(text: &str) -> Directive {
    Directive::parse(text).unwrap_or_else(|e| panic!("{}: {}", text, e))
}

#[test]
fn directive_vocabulary() {
    assert_eq!(parse("reset"), Directive::Reset);
    assert_eq!(parse("prepend-to-following"), Directive::PrependToFollowing);
    assert_eq!(
        parse("prepend-subset-to-following:1-3"),
        Directive::PrependSubsetToFollowing(LineRange { start: 1, end: 3 })
    );
    assert_eq!(
        parse("prepend-id-to-following:ns:name"),
        Directive::PrependIdToFollowing("ns:name".to_string())
    );
    assert_eq!(
        parse("prepend-subset-of-id-to-following:ns:name:2-4"),
        Directive::PrependSubsetOfIdToFollowing {
            id: "ns:name".to_string(),
            lines: LineRange { start: 2, end: 4 },
        }
    );
    assert_eq!(
        parse("prepend-as-file:types.d.ts"),
        Directive::PrependAsFile("types.d.ts".to_string())
    );
    assert_eq!(parse("skip"), Directive::Skip);
    assert_eq!(parse("done-with-file"), Directive::DoneWithFile);
    assert_eq!(
        parse("tsconfig:strict=true"),
        Directive::TsConfig {
            key: "strict".to_string(),
            value: OptionValue::Bool(true),
        }
    );
    assert_eq!(
        parse("include-node-module:@types/node"),
        Directive::IncludeNodeModule("@types/node".to_string())
    );
    assert_eq!(parse("next-is-tsx"), Directive::NextIsTsx);
    assert_eq!(parse("check-js"), Directive::CheckJs);
    assert_eq!(
        parse("replace-with-id:full"),
        Directive::ReplaceWithId("full".to_string())
    );
}

#[test]
fn malformed_directives() {
    for text in [
        "prepend-subset-to-following:3-1",
        "prepend-subset-to-following:0-1",
        "prepend-subset-to-following:a-b",
        "prepend-id-to-following",
        "tsconfig:strict",
    ] {
        assert!(
            matches!(Directive::parse(text), Err(ExtractError::MalformedDirective { .. })),
            "{} should be malformed",
            text
        );
    }
    assert_eq!(
        Directive::parse("prepend-to-follow"),
        Err(ExtractError::UnknownDirective("prepend-to-follow".to_string()))
    );
}

#[test]
fn option_values() {
    assert_eq!(parse_option_value("strict", "false"), Ok(OptionValue::Bool(false)));
    assert_eq!(parse_option_value("maxNodeModuleJsDepth", "2"), Ok(OptionValue::Number(2)));
    assert_eq!(
        parse_option_value("lib", "es2020,dom"),
        Ok(OptionValue::String("es2020,dom".to_string()))
    );
    let Ok(OptionValue::Enum(module)) = parse_option_value("module", "commonjs") else {
        panic!("module should resolve to an enum");
    };
    assert_eq!((module.name, module.value), ("CommonJS", 1));
    let Ok(OptionValue::Enum(target)) = parse_option_value("target", "99") else {
        panic!("numeric enum values should resolve");
    };
    assert_eq!(target.name, "ESNext");
    assert!(parse_option_value("jsx", "vue").is_err());
    assert_eq!(
        OptionValue::Enum(target).to_json(),
        serde_json::Value::String("ESNext".to_string())
    );
}

fn context_with_everything() -> DirectiveContext {
    let mut context = DirectiveContext::new();
    for text in [
        "prepend-id-to-following:a",
        "prepend-to-following",
        "skip",
        "done-with-file",
        "tsconfig:strict=false",
        "include-node-module:lodash",
        "next-is-tsx",
        "check-js",
        "replace-with-id:b",
    ] {
        context.apply(parse(text));
    }
    context
}

#[test]
fn reset_clears_everything() {
    let mut context = context_with_everything();
    assert_eq!(
        context.prefixes,
        vec![Prefix {
            id: "a".to_string(),
            lines: None
        }]
    );
    context.apply(Directive::Reset);
    assert_eq!(context, DirectiveContext::new());
}

#[test]
fn reset_is_idempotent() {
    let mut once = context_with_everything();
    once.reset();
    let mut twice = context_with_everything();
    twice.reset();
    twice.reset();
    assert_eq!(once, twice);
}

#[test]
fn normal_line_clears_apply_once_state() {
    let mut context = context_with_everything();
    context.clear_next();
    assert!(!context.skip);
    assert!(!context.next_is_tsx);
    assert!(!context.check_js);
    assert!(context.options.is_empty());
    assert!(context.replacement_id.is_none());
    assert!(context.prepend.is_some());
    assert!(context.done_with_file);
    assert_eq!(context.node_modules, ["lodash"]);
}

#[test]
fn positions() {
    assert_eq!(remap_line(10, 0, 0), Some(11));
    assert_eq!(remap_line(10, 2, 3), Some(12));
    assert_eq!(remap_line(10, 2, 1), None);

    let index = LineIndex::new("ab\ncde\n\nf");
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.line_span(0), 0..2);
    assert_eq!(index.line_span(1), 3..6);
    assert_eq!(index.line_span(2), 7..7);
    assert_eq!(index.line_span(3), 8..9);
    assert_eq!(index.line_span(9), 9..9);
}

#[test]
fn jsonc_parsing() {
    let value = jsonc::parse("{\n  // comment\n  \"url\": \"http://x\", /* inline */ \"n\": 1\n}").unwrap();
    assert_eq!(value["url"], "http://x");
    assert_eq!(value["n"], 1);
    assert!(jsonc::parse("{\"a\": 1,}").is_err());
    assert_eq!(jsonc::strip_comments("1 // x\n2"), "1     \n2");
}

#[test]
fn unterminated_block_comment_is_an_error() {
    let error = jsonc::parse("{\"a\": 1}\n  /* never closed").unwrap_err();
    assert!(matches!(error, JsoncError::UnterminatedComment { .. }));
    assert_eq!((error.line(), error.column()), (2, 3));
    assert!(jsonc::parse("{\"a\": /* closed */ 1}").is_ok());
}

#[test]
fn replacement_sources_are_keyed_by_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("foo.ts"), "const foo = 1;").unwrap();
    std::fs::write(dir.path().join("bar.txt"), "bar").unwrap();
    std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
    std::fs::write(dir.path().join("x.test.ts"), "ignored").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("baz.js"), "baz()").unwrap();

    let sources = load_sources(dir.path()).unwrap();
    let expected: HashMap<String, String> = [
        ("foo", "const foo = 1;"),
        ("bar", "bar"),
        ("baz", "baz()"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(sources, expected);

    assert!(load_sources(&dir.path().join("missing")).is_err());
}
