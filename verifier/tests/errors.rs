use indoc::indoc;

use verifier::backend::CompilerError;
use verifier::errors::{
    MessageMatch, check_matching_errors, dedupe_diagnostics, extract_expected_errors,
    match_message,
};

fn error(line: usize, start: usize, end: usize, message: &str) -> CompilerError {
    CompilerError {
        line,
        start,
        end,
        message: message.to_string(),
    }
}

#[test]
fn tildes_mark_the_line_above() {
    let errors = extract_expected_errors(indoc! {"
        const city = 'new york city';
        console.log(city.toUppercase());
                      // ~~~~~~~~~~~ Property 'toUppercase' does not exist.
        // 345678901234567890123456789
        //        1         2
    "});
    assert_eq!(
        errors,
        vec![error(1, 17, 28, "Property 'toUppercase' does not exist.")]
    );
}

#[test]
fn message_continues_on_aligned_comment_lines() {
    let errors = extract_expected_errors(indoc! {"
        const city = 'new york city';
        console.log(city.toUppercase());
                      // ~~~~~~~~~~~ Property 'toUppercase' does not exist.
                      //             Did you mean 'toUpperCase'?
    "});
    assert_eq!(
        errors,
        vec![error(
            1,
            17,
            28,
            "Property 'toUppercase' does not exist. Did you mean 'toUpperCase'?"
        )]
    );
}

#[test]
fn consecutive_tilde_lines_share_a_code_line() {
    let errors = extract_expected_errors(indoc! {"
        function add(a, b) {
                  // ~    Parameter 'a' implicitly has an 'any' type.
                  //    ~ Parameter 'b' implicitly has an 'any' type.
        // 345678901234567890123456789
        //        1         2
          return a + b;
        }
    "});
    assert_eq!(
        errors,
        vec![
            error(0, 13, 14, "Parameter 'a' implicitly has an 'any' type."),
            error(0, 16, 17, "Parameter 'b' implicitly has an 'any' type."),
        ]
    );
}

#[test]
fn several_spans_on_one_line_share_the_message() {
    let errors = extract_expected_errors(indoc! {"
        if (pt.x < box.x[0] || pt.x > box.x[1] ||
            //     ~~~                ~~~  Object is possibly undefined
        // 3456789012345678901234567890123
        //        1         2         3
    "});
    assert_eq!(
        errors,
        vec![
            error(0, 11, 14, "Object is possibly undefined"),
            error(0, 30, 33, "Object is possibly undefined"),
        ]
    );
}

#[test]
fn ordinary_comments_are_not_errors() {
    let errors = extract_expected_errors(indoc! {"
        // HIDE
        type Shape = null;
        // END
        function calculateArea(shape: Shape) {
          if ('height' in shape) {
            return shape.width * shape.height;  // shape's type is Rectangle
          } else {
            return shape.width * shape.width;  // shape's type is Square
          }
        }
    "});
    assert!(errors.is_empty());
}

#[test]
fn tildes_without_a_message() {
    let errors = extract_expected_errors(indoc! {"
        const states: State[] = [
          {name: 'Alaska',  capitol: 'Juneau'},
                         // ~~~~~~~~~~~~~~~~~
        // 3456789012345678901234567890123456789
        //        1         2         3
          {name: 'Arizona', capitol: 'Phoenix'},
                         // ~~~~~~~~~~~~~~~~~~ Object literal may only specify known
        ];
    "});
    assert_eq!(
        errors,
        vec![
            error(1, 20, 37, ""),
            error(5, 20, 38, "Object literal may only specify known"),
        ]
    );
}

#[test]
fn dedupe_keeps_last_error_per_span() {
    let actual = vec![
        error(0, 4, 5, "first"),
        error(0, 4, 5, "second"),
        error(1, 0, 3, "other"),
        error(7, 0, 1, "past the end"),
    ];
    assert_eq!(
        dedupe_diagnostics(actual, 3),
        vec![error(0, 4, 5, "second"), error(1, 0, 3, "other")]
    );
}

#[test]
fn message_classification() {
    assert_eq!(match_message("Type 'a' is bad.", "Type 'a' is bad."), MessageMatch::Perfect);
    assert_eq!(match_message("", "anything"), MessageMatch::EmptyExpected);
    assert_eq!(
        match_message("is not assignable", "Type 'x' is not assignable to type 'y'."),
        MessageMatch::Subset
    );
    assert_eq!(
        match_message("Type ... is not assignable to ... 'y'.", "Type 'x' is not assignable to type 'y'."),
        MessageMatch::Wildcard
    );
    assert_eq!(match_message("Cannot find name", "Type 'x' is bad."), MessageMatch::Mismatch);
}

#[test]
fn whitespace_does_not_affect_messages() {
    assert_eq!(
        match_message("Property 'x'  does\nnot exist.", "Property 'x' does not exist."),
        MessageMatch::Perfect
    );
}

#[test]
fn overlapping_spans_match_one_to_one() {
    let expected = vec![error(1, 17, 28, "does not exist"), error(3, 0, 2, "")];
    let actual = vec![
        error(1, 17, 28, "Property 'toUppercase' does not exist on type 'string'."),
        error(2, 4, 6, "Unexpected"),
    ];
    let report = check_matching_errors(&expected, &actual);

    assert_eq!(report.matched.len(), 1);
    assert_eq!(report.matched[0].message, MessageMatch::Subset);
    assert_eq!(report.unexpected, vec![error(2, 4, 6, "Unexpected")]);
    assert_eq!(report.missing, vec![error(3, 0, 2, "")]);
    assert!(!report.is_ok());
}

#[test]
fn disagreeing_message_fails_the_report() {
    let expected = vec![error(0, 0, 3, "Cannot find name 'foo'.")];
    let actual = vec![error(0, 1, 2, "Type 'string' is not assignable.")];
    let report = check_matching_errors(&expected, &actual);
    assert_eq!(report.matched[0].message, MessageMatch::Mismatch);
    assert!(report.unexpected.is_empty());
    assert!(report.missing.is_empty());
    assert!(!report.is_ok());
}

#[test]
fn clean_unit_is_ok() {
    let report = check_matching_errors(&[], &[]);
    assert!(report.is_ok());
}
