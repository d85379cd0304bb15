use std::sync::LazyLock;

use regex::Regex;

use crate::sample::Sample;

const RESOLVE_HELPER: &str =
    "type Resolve<Raw> = Raw extends Function ? Raw : {[K in keyof Raw]: Raw[K]};";

static TWOSLASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*//\s*)\^\? (.*)$").unwrap());
static EQUIVALENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)\s*\(equivalent to (.*)\)\s*$").unwrap());
static TYPE_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^type ([A-Za-z_$][\w$]*) = ").unwrap());
static VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:const|let|var|\((?:parameter|property|local var)\)) ([A-Za-z_$][\w$]*)\??: (.*)$")
        .unwrap()
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Split `X (equivalent to Z)` twoslash assertions into two checks.
///
/// The parenthetical is removed so the assertion checks the nominal type X,
/// and a declaration of `Resolve<X>` is appended with its own assertion for
/// the expanded type Z.
pub fn add_resolved_checks(mut sample: Sample) -> Sample {
    if !sample.content.contains("(equivalent to") {
        return sample;
    }
    if sample.original_content.is_none() {
        sample.original_content = Some(sample.content.clone());
    }

    let lines: Vec<&str> = sample.content.split('\n').collect();
    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    let mut synthesized: Vec<String> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(caps) = TWOSLASH.captures(lines[i]) else {
            kept.push(lines[i].to_string());
            i += 1;
            continue;
        };
        let caret_col = caps[1].len();
        let comment_col = lines[i].len() - lines[i].trim_start().len();

        let mut end = i + 1;
        let mut text = caps[2].to_string();
        while end < lines.len() {
            let Some(rest) = continuation(lines[end], comment_col, caret_col) else {
                break;
            };
            text.push(' ');
            text.push_str(rest.trim());
            end += 1;
        }

        let Some(eq) = EQUIVALENT.captures(&text) else {
            kept.extend(lines[i..end].iter().map(|l| l.to_string()));
            i = end;
            continue;
        };
        let nominal = eq[1].trim().to_string();
        let resolved = WHITESPACE.replace_all(eq[2].trim(), " ").into_owned();

        // Every line of the assertion stays, so later lines keep their numbers.
        let bare_comment = format!("{}//", &lines[i][..comment_col]);
        let mut in_parenthetical = false;
        for line in &lines[i..end] {
            if in_parenthetical {
                kept.push(bare_comment.clone());
                continue;
            }
            match line.find("(equivalent to") {
                Some(pos) => {
                    kept.push(line[..pos].trim_end().to_string());
                    in_parenthetical = true;
                }
                None => kept.push(line.to_string()),
            }
        }

        if let Some(check) = synthesize(&nominal, &resolved) {
            synthesized.push(check);
        }
        i = end;
    }

    if synthesized.is_empty() {
        sample.content = kept.join("\n");
        return sample;
    }
    let mut content = kept.join("\n");
    content.push('\n');
    content.push_str(RESOLVE_HELPER);
    for check in synthesized {
        content.push('\n');
        content.push_str(&check);
    }
    content.push('\n');
    sample.content = content;
    sample
}

/// Text of a comment line continuing a twoslash assertion, if it is one.
fn continuation(line: &str, comment_col: usize, caret_col: usize) -> Option<&str> {
    let indent = line.len() - line.trim_start().len();
    if indent != comment_col || TWOSLASH.is_match(line) {
        return None;
    }
    let rest = line.trim_start().strip_prefix("//")?;
    let text_col = indent + 2 + (rest.len() - rest.trim_start().len());
    (text_col > caret_col && !rest.trim().is_empty()).then_some(rest)
}

fn synthesize(nominal: &str, resolved: &str) -> Option<String> {
    if let Some(caps) = TYPE_ALIAS.captures(nominal) {
        let name = format!("Synth{}", &caps[1]);
        return Some(format!(
            "type {name} = Resolve<{}>;\n//   ^? type {name} = {resolved}",
            &caps[1]
        ));
    }
    let caps = VALUE.captures(nominal)?;
    let mut name = String::from("synth");
    let mut chars = caps[1].chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    Some(format!(
        "const {name} = null as unknown as Resolve<{}>;\n//    ^? const {name}: {resolved}",
        caps[2].trim()
    ))
}
