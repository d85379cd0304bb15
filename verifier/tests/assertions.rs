use indoc::indoc;

use verifier::assertions::{
    TypeAssertion, extract_type_assertions, match_modulo_whitespace, normalize, sort_unions,
    types_match,
};

fn assertion(line: usize, character: Option<usize>, expected: &str) -> TypeAssertion {
    TypeAssertion {
        line,
        character,
        expected: expected.to_string(),
    }
}

#[test]
fn same_line_assertion() {
    let found = extract_type_assertions(indoc! {"
        for (const x of xs) {
          x;  // type is number
        }"});
    assert_eq!(found, vec![assertion(1, None, "number")]);
}

#[test]
fn assertion_with_an_adjective() {
    let found = extract_type_assertions(indoc! {"
        for (const x of xs) {
          x;  // type is just number
        }"});
    assert_eq!(found, vec![assertion(1, None, "number")]);
}

#[test]
fn assertion_on_the_next_line() {
    let found = extract_type_assertions(indoc! {"
        type T = typeof document.getElementById;
          // type is (elementId: string) => HTMLElement | null
    "});
    assert_eq!(
        found,
        vec![assertion(0, None, "(elementId: string) => HTMLElement | null")]
    );
}

#[test]
fn multiline_assertion() {
    let found = extract_type_assertions(indoc! {"
        const o = {x: 1, y: 2};
        // type is {
        //   x: number;
        //   y: number;
        // }
        function addWithExtras(a: number, b: number) {
          const c = a + b;  // type is number
          // ...
          return c;
        }
    "});
    assert_eq!(
        found,
        vec![
            assertion(0, None, "{ x: number; y: number; }"),
            assertion(6, None, "number"),
        ]
    );
}

#[test]
fn possessive_phrasing() {
    let found = extract_type_assertions(indoc! {"
        const x = 2 + '3';  // ok, x's type is string
        const y = '2' + 3;  // ok, y's type is string.
    "});
    assert_eq!(
        found,
        vec![assertion(0, None, "string"), assertion(1, None, "string")]
    );
}

#[test]
fn plain_comments_are_not_assertions() {
    let found = extract_type_assertions(indoc! {"
        for (const x of xs) {
          x;  // number
        }"});
    assert!(found.is_empty());
}

#[test]
fn comment_markers_inside_strings_are_ignored() {
    let found = extract_type_assertions("const url = 'http://example.com';  // type is string");
    assert_eq!(found, vec![assertion(0, None, "string")]);
}

#[test]
fn twoslash_assertion() {
    let found = extract_type_assertions(indoc! {"
        for (const xValue of xs) {
          xValue;
          // ^? const xValue: number
        }"});
    assert_eq!(found, vec![assertion(1, Some(5), "const xValue: number")]);
}

#[test]
fn multiline_twoslash_assertion() {
    let found = extract_type_assertions(indoc! {"
        const o = {x: 1, y: 2};
        //    ^? const o: {
        //         x: number;
        //         y: number;
        //       }
        function addWithExtras(a: number, b: number) {
          const c = a + b;
          //    ^? const c: number
          // ...
          return c;
        }
    "});
    assert_eq!(
        found,
        vec![
            assertion(0, Some(6), "const o: { x: number; y: number; }"),
            assertion(6, Some(8), "const c: number"),
        ]
    );
}

#[test]
fn twoslash_after_trailing_comments() {
    let found = extract_type_assertions(indoc! {"
        const x = 2 + '3';  // OK
        //    ^? const x: string
        const y = '2' + 3;  // OK
        //    ^? const y: string
    "});
    assert_eq!(
        found,
        vec![
            assertion(0, Some(6), "const x: string"),
            assertion(2, Some(6), "const y: string"),
        ]
    );
}

#[test]
fn normalizes_whitespace() {
    assert_eq!(
        normalize("const pharaoh: {\n  start?: number;\n  end?: number;\n}"),
        "const pharaoh: { start?: number; end?: number; }"
    );
    assert_eq!(normalize("( a: string )=>void"), "(a: string)=>void");
    assert_eq!(normalize("A|B  |C"), "A | B | C");
}

#[test]
fn whitespace_inside_parentheses() {
    assert!(match_modulo_whitespace(
        "type T = <T extends object, K extends keyof T>(obj: T, ...keys: K[]) => Pick<T, K>",
        "type T = <T extends object, K extends keyof T>(\n  obj: T, ...keys: K[]\n) => Pick<T, K>",
    ));
}

#[test]
fn union_order_is_ignored() {
    assert!(match_modulo_whitespace("const ab: B | A", "const ab: A|B"));
}

#[test]
fn declaration_head_must_agree() {
    assert!(!match_modulo_whitespace(
        "BoundingBox | undefined",
        "const box: BoundingBox | undefined",
    ));
}

#[test]
fn ellipsis_is_a_wildcard() {
    assert!(match_modulo_whitespace(
        "(parameter) response: Response<any, unknown, {}>",
        "(parameter) response: Response<...>",
    ));
    assert!(!match_modulo_whitespace(
        "(parameter) response: Request<any, unknown, {}>",
        "(parameter) response: Response<...>",
    ));
}

#[test]
fn different_object_types_do_not_match() {
    assert!(!match_modulo_whitespace(
        "const pharaoh: { start?: number; end?: number; }",
        "const pharaoh: { start: number; end: number; }",
    ));
}

#[test]
fn spread_is_not_a_free_pass() {
    assert!(!match_modulo_whitespace(
        "const numArgsBetter: (...args: any[]) => number",
        "const numArgsBetter: (...args: any) => numberjsdklfjklsd",
    ));
}

#[test]
fn sorts_top_level_unions() {
    assert_eq!(sort_unions("C | B | A"), "A | B | C");
    assert_eq!(sort_unions("string | Date | number"), "Date | number | string");
}

#[test]
fn nested_unions_are_left_alone() {
    assert_eq!(sort_unions("{x:C|B|A}"), "{x:C|B|A}");
    assert_eq!(sort_unions("(x:C|B|A)=>void"), "(x:C|B|A)=>void");
    assert_eq!(sort_unions("Partial<C|B|A>"), "Partial<C|B|A>");
    assert_eq!(sort_unions("{foo:B|A} | {bar:C|D}"), "{bar:C|D} | {foo:B|A}");
}

#[test]
fn types_match_rules() {
    assert!(types_match("string!", "string"));
    assert!(types_match("Promise<...", "Promise<Response>"));
    assert!(types_match("A | B", "B|A"));
    assert!(!types_match("number", "string"));
}
