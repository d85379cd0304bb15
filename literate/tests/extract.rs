use indoc::indoc;

use literate::error::ExtractError;
use literate::options::OptionValue;
use literate::sample::{Kind, LineRange, Prefix, Sample};
use literate::{Dialect, extract_samples, extract_with};

fn adoc(text: &str) -> Vec<Sample> {
    extract_with(Dialect::Asciidoc, text, "slug", "test.asciidoc").expect("extraction failed")
}

fn md(text: &str) -> Vec<Sample> {
    extract_with(Dialect::Markdown, text, "slug", "test.md").expect("extraction failed")
}

fn ids(samples: &[Sample]) -> Vec<&str> {
    samples.iter().map(|s| s.id.as_str()).collect()
}

fn by_id<'a>(samples: &'a [Sample], id: &str) -> &'a Sample {
    samples
        .iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| panic!("no sample {}", id))
}

#[test]
fn basic_asciidoc_sample() {
    let samples = adoc(indoc! {"
        = Title

        [[a]]
        [source,ts]
        ----
        const x = 1;
        ----
    "});
    assert_eq!(samples.len(), 1);
    let a = &samples[0];
    assert_eq!(a.id, "a");
    assert_eq!(a.kind, Kind::TypeScript);
    assert_eq!(a.content, "const x = 1;");
    assert_eq!(a.descriptor, "./test.asciidoc:3");
    assert_eq!(a.line_number, 5);
    assert_eq!(a.section_header.as_deref(), Some("Title"));
    assert!(!a.skip);
}

#[test]
fn untagged_typed_block_gets_synthesized_id() {
    let samples = md("Some prose.\n\n```ts\nconsole.log('hi')\n```\n");
    assert_eq!(samples.len(), 1);
    let s = &samples[0];
    assert_eq!(s.id, "slug-4");
    assert_eq!(s.kind, Kind::TypeScript);
    assert_eq!(s.content, "console.log('hi')");
    assert_eq!(s.line_number, 3);
    assert_eq!(s.descriptor, "./test.md:4");
}

#[test]
fn untagged_blocks_of_unchecked_kinds_are_dropped() {
    let samples = adoc(indoc! {"
        ----
        plain text
        ----

        [source,js]
        ----
        console.log(1);
        ----

        [source,python]
        ----
        print(1)
        ----
    "});
    assert!(samples.is_empty());
}

#[test]
fn check_js_makes_script_checkable() {
    let samples = adoc(indoc! {"
        // verifier:check-js
        [source,js]
        ----
        let x = 1;
        ----
    "});
    assert_eq!(ids(&samples), ["slug-4"]);
    let s = &samples[0];
    assert_eq!(s.kind, Kind::JavaScript);
    assert!(s.check_js);
    assert_eq!(s.options.get("allowJs"), Some(&OptionValue::Bool(true)));
    assert_eq!(s.options.get("noEmit"), Some(&OptionValue::Bool(true)));
}

#[test]
fn other_language_with_id_is_kept() {
    let samples = md("<!-- #py -->\n```python\nprint(1)\n```\n");
    assert_eq!(samples[0].kind, Kind::Other("python".to_string()));
}

#[test]
fn markdown_html_and_legacy_markers() {
    let samples = md(indoc! {"
        // verifier:prepend-to-following
        // #prefix
        ```ts
        type AB = 'a'|'b';
        ```

        <!-- #combined -->
        ```ts
        const a: AB = 'a';
        ```
    "});
    assert_eq!(ids(&samples), ["prefix", "combined"]);
    assert_eq!(samples[0].descriptor, "./test.md:2");
    assert_eq!(samples[1].descriptor, "./test.md:7");
    assert_eq!(
        samples[1].prefixes,
        vec![Prefix {
            id: "prefix".to_string(),
            lines: None
        }]
    );
}

#[test]
fn dialects_produce_equivalent_samples() {
    let from_adoc = adoc(indoc! {"
        == Section

        // verifier:prepend-to-following
        [[prefix]]
        [source,ts]
        ----
        type AB = 'a'|'b';
        ----

        // verifier:skip
        [[combined]]
        [source,ts]
        ----
        const a: AB = 'a';
        ----
    "});
    let from_md = md(indoc! {"
        ## Section

        <!-- verifier:prepend-to-following -->
        <!-- #prefix -->
        ```ts
        type AB = 'a'|'b';
        ```

        <!-- verifier:skip -->
        <!-- #combined -->
        ```ts
        const a: AB = 'a';
        ```
    "});
    let key = |s: &Sample| {
        (
            s.id.clone(),
            s.kind.clone(),
            s.content.clone(),
            s.prefixes.clone(),
            s.skip,
            s.section_header.clone(),
        )
    };
    let a: Vec<_> = from_adoc.iter().map(key).collect();
    let b: Vec<_> = from_md.iter().map(key).collect();
    assert_eq!(a, b);
    assert!(a[1].4, "skip should carry over");
}

#[test]
fn unterminated_block_runs_to_end_of_document() {
    let samples = adoc("[[a]]\n[source,ts]\n----\nlet x = 1;\nlet y = 2;");
    assert_eq!(samples[0].content, "let x = 1;\nlet y = 2;");

    let samples = md("<!-- #a -->\n```ts\nlet x = 1;\nlet y = 2;\n");
    assert_eq!(samples[0].content, "let x = 1;\nlet y = 2;");
}

#[test]
fn duplicate_ids_are_fatal() {
    let err = extract_with(
        Dialect::Asciidoc,
        indoc! {"
            [[dup]]
            [source,ts]
            ----
            let a = 1;
            ----

            [[dup]]
            [source,ts]
            ----
            let b = 2;
            ----
        "},
        "slug",
        "test.asciidoc",
    )
    .unwrap_err();
    assert_eq!(
        err.error,
        ExtractError::DuplicateId {
            id: "dup".to_string(),
            first: "./test.asciidoc:1".to_string(),
        }
    );
    assert_eq!(err.line, 9);
}

#[test]
fn extraction_is_repeatable_and_ids_unique() {
    let text = indoc! {"
        ```ts
        let a = 1;
        ```

        ```ts
        let b = 2;
        ```

        <!-- #named -->
        ```ts
        let c = 3;
        ```
    "};
    let first = md(text);
    let second = md(text);
    assert_eq!(first, second);
    let mut seen = ids(&first);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), first.len());
}

#[test]
fn unknown_directive_is_fatal() {
    let err = extract_with(
        Dialect::Asciidoc,
        "text\n// verifier:frobnicate\n",
        "slug",
        "test.asciidoc",
    )
    .unwrap_err();
    assert_eq!(err.error, ExtractError::UnknownDirective("frobnicate".to_string()));
    assert_eq!(err.line, 1);
    assert_eq!(err.span, 5..27);
}

#[test]
fn unknown_format_is_rejected() {
    let err = extract_samples("", "notes.txt").unwrap_err();
    assert!(matches!(err.error, ExtractError::UnknownFormat(_)));
}

#[test]
fn slug_comes_from_file_stem() {
    let samples = extract_samples("```ts\nlet a = 1;\n```\n", "chapter-02.md").unwrap();
    assert_eq!(ids(&samples), ["chapter-02-2"]);
}

#[test]
fn done_with_file_skips_until_reset() {
    let samples = adoc(indoc! {"
        // verifier:done-with-file
        [[a]]
        [source,ts]
        ----
        let a = 1;
        ----

        [source,ts]
        ----
        let b = 2;
        ----

        // verifier:reset
        [[c]]
        [source,ts]
        ----
        let c = 3;
        ----
    "});
    assert_eq!(ids(&samples), ["a", "slug-10", "c"]);
    assert!(by_id(&samples, "a").skip);
    assert!(by_id(&samples, "slug-10").skip);
    let live: Vec<&str> = samples.iter().filter(|s| !s.skip).map(|s| s.id.as_str()).collect();
    assert_eq!(live, ["c"]);
}

#[test]
fn heading_resets_done_with_file() {
    let samples = adoc(indoc! {"
        // verifier:done-with-file
        [[a]]
        [source,ts]
        ----
        let a = 1;
        ----

        == Next

        [[b]]
        [source,ts]
        ----
        let b = 1;
        ----
    "});
    assert!(by_id(&samples, "a").skip);
    assert!(!by_id(&samples, "b").skip);
}

#[test]
fn skip_accepts_a_remark() {
    let samples = adoc(indoc! {"
        // verifier:skip (not really TypeScript)
        [[a]]
        [source,ts]
        ----
        let a =
        ----

        [[b]]
        [source,ts]
        ----
        let b = 1;
        ----
    "});
    assert!(by_id(&samples, "a").skip);
    assert!(!by_id(&samples, "b").skip);
}

#[test]
fn tsconfig_applies_to_next_sample_only() {
    let samples = adoc(indoc! {"
        // verifier:tsconfig:strictNullChecks=false
        // verifier:tsconfig:target=es2020
        [[a]]
        [source,ts]
        ----
        let a = 1;
        ----

        [[b]]
        [source,ts]
        ----
        let b = 1;
        ----
    "});
    let a = by_id(&samples, "a");
    assert_eq!(a.options.get("strictNullChecks"), Some(&OptionValue::Bool(false)));
    match a.options.get("target") {
        Some(OptionValue::Enum(symbol)) => {
            assert_eq!(symbol.enum_name, "ScriptTarget");
            assert_eq!(symbol.name, "ES2020");
            assert_eq!(symbol.value, 7);
        }
        other => panic!("unexpected target {:?}", other),
    }
    assert!(by_id(&samples, "b").options.is_empty());
}

#[test]
fn invalid_enum_value_is_fatal() {
    let err = extract_with(
        Dialect::Asciidoc,
        "// verifier:tsconfig:target=ES2007\n",
        "slug",
        "test.asciidoc",
    )
    .unwrap_err();
    assert!(
        err.error
            .to_string()
            .starts_with("ES2007 is not a valid ScriptTarget. Expected one of: 0, 1, 2, 3"),
        "{}",
        err.error
    );
}

#[test]
fn ambient_state_lasts_until_reset() {
    let samples = adoc(indoc! {"
        // verifier:include-node-module:lodash
        // verifier:next-is-tsx
        [[a]]
        [source,ts]
        ----
        const el = <div />;
        ----

        [[b]]
        [source,ts]
        ----
        let b = 1;
        ----

        // verifier:reset
        [[c]]
        [source,ts]
        ----
        let c = 1;
        ----
    "});
    let a = by_id(&samples, "a");
    assert!(a.is_tsx);
    assert_eq!(a.node_modules, ["lodash"]);
    let b = by_id(&samples, "b");
    assert!(!b.is_tsx);
    assert_eq!(b.node_modules, ["lodash"]);
    assert!(by_id(&samples, "c").node_modules.is_empty());
}

#[test]
fn prepend_without_id_waits_for_identified_sample() {
    let samples = adoc(indoc! {"
        // verifier:prepend-subset-to-following:1-2
        ----
        not a sample
        ----

        [[a]]
        [source,ts]
        ----
        let a = 1;
        let b = 2;
        let c = 3;
        ----

        [[b]]
        [source,ts]
        ----
        a;
        ----
    "});
    assert_eq!(
        by_id(&samples, "b").prefixes,
        vec![Prefix {
            id: "a".to_string(),
            lines: Some(LineRange { start: 1, end: 2 }),
        }]
    );
    assert!(by_id(&samples, "a").prefixes.is_empty());
}

#[test]
fn prepend_as_file_sets_target_filename() {
    let samples = adoc(indoc! {"
        // verifier:prepend-as-file:data.json
        [[data]]
        [source,json]
        ----
        {}
        ----
    "});
    assert_eq!(samples[0].target_filename.as_deref(), Some("data.json"));
    assert_eq!(samples[0].kind, Kind::Json);
}

#[test]
fn comment_blocks_are_flagged() {
    let samples = adoc(indoc! {"
        ////
        [[hidden]]
        [source,ts]
        ----
        let a = 1;
        ----
        ////

        [[shown]]
        [source,ts]
        ----
        let b = 1;
        ----
    "});
    assert!(by_id(&samples, "hidden").in_comment_block);
    assert!(!by_id(&samples, "shown").in_comment_block);
}

#[test]
fn replace_with_id_is_recorded() {
    let samples = adoc(indoc! {"
        // verifier:replace-with-id:full
        [[short]]
        [source,ts]
        ----
        f();
        ----
    "});
    assert_eq!(samples[0].replacement_id.as_deref(), Some("full"));
}
