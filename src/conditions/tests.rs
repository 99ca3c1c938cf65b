use super::*;
use crate::error::{DavLockError, Result};
use crate::locks::LockToken;
use std::cell::Cell;
use std::collections::HashMap;

fn token(raw: &str) -> LockToken {
    LockToken::parse(raw).unwrap()
}

#[derive(Default)]
struct FakeState {
    tokens: HashMap<String, Vec<LockToken>>,
    etags: HashMap<String, String>,
    token_lookups: Cell<usize>,
}

impl FakeState {
    fn with_token(mut self, path: &str, raw: &str) -> Self {
        self.tokens
            .entry(path.to_string())
            .or_default()
            .push(token(raw));
        self
    }

    fn with_etag(mut self, path: &str, etag: &str) -> Self {
        self.etags.insert(path.to_string(), etag.to_string());
        self
    }
}

impl ConditionState for FakeState {
    fn valid_tokens(&self, path: &str) -> Result<Vec<LockToken>> {
        self.token_lookups.set(self.token_lookups.get() + 1);
        Ok(self.tokens.get(path).cloned().unwrap_or_default())
    }

    fn current_etag(&self, path: &str) -> Result<Option<String>> {
        Ok(self.etags.get(path).cloned())
    }
}

#[test]
fn parse_untagged_token_list() {
    let header = parse("(<opaquelocktoken:abc>)", "/test.txt").unwrap();
    assert_eq!(
        header,
        IfHeader {
            groups: vec![TaggedConditionList {
                path: "/test.txt".to_string(),
                tagged: false,
                lists: vec![ConditionList {
                    conditions: vec![Condition::token(token("opaquelocktoken:abc"))],
                }],
            }],
        }
    );
}

#[test]
fn parse_consecutive_untagged_lists_form_one_group() {
    let header = parse(
        "(<opaquelocktoken:a>) ([\"etag1\"])  (Not <opaquelocktoken:b>)",
        "/x",
    )
    .unwrap();
    assert_eq!(header.groups.len(), 1);
    let lists = &header.groups[0].lists;
    assert_eq!(lists.len(), 3);
    assert_eq!(lists[1].conditions, vec![Condition::etag("\"etag1\"")]);
    assert_eq!(
        lists[2].conditions,
        vec![Condition::token(token("opaquelocktoken:b")).negated()]
    );
}

#[test]
fn parse_tagged_lists_normalize_uri() {
    let header = parse(
        "<http://www.example.org/dir/> (<opaquelocktoken:a>) </other%20file> ([W/\"x\"])",
        "/dir/child.txt",
    )
    .unwrap();
    assert_eq!(header.groups.len(), 2);
    assert_eq!(header.groups[0].path, "/dir");
    assert!(header.groups[0].tagged);
    assert_eq!(header.groups[1].path, "/other file");
    assert_eq!(
        header.groups[1].lists[0].conditions,
        vec![Condition::etag("W/\"x\"")]
    );
}

#[test]
fn parse_multiple_conditions_in_one_list() {
    let header = parse("(<opaquelocktoken:a> [\"e\"] NOT<opaquelocktoken:b>)", "/x").unwrap();
    let conditions = &header.groups[0].lists[0].conditions;
    assert_eq!(conditions.len(), 3);
    assert!(!conditions[0].not);
    assert!(!conditions[1].not);
    assert!(conditions[2].not);
}

#[test]
fn parse_accepts_non_opaquelocktoken_coded_urls() {
    let header = parse("(<opaquelocktoken:token1>) (Not <DAV:no-lock>)", "/x").unwrap();
    assert_eq!(header.groups[0].lists.len(), 2);
}

#[test]
fn parse_rejects_malformed_headers() {
    for bad in [
        "",
        "   ",
        "opaquelocktoken:abc",
        "(opaquelocktoken:abc)",
        "(<opaquelocktoken:abc>",
        "(<opaquelocktoken:abc)",
        "()",
        "([\"etag\")",
        "([])",
        "</dir>",
        "</dir> </other> (<opaquelocktoken:a>)",
        "<> (<opaquelocktoken:a>)",
        "(<opaquelocktoken:a>) garbage",
    ] {
        assert!(
            matches!(parse(bad, "/x"), Err(DavLockError::BadRequest(_))),
            "expected BadRequest for {:?}",
            bad
        );
    }
}

#[test]
fn submitted_tokens_skip_negated_and_etags() {
    let header = parse(
        "</dir> (<opaquelocktoken:a> [\"e\"]) (Not <opaquelocktoken:b>)",
        "/x",
    )
    .unwrap();
    let submitted: Vec<(&str, &LockToken)> = header.submitted_tokens().collect();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, "/dir");
    assert_eq!(submitted[0].1.as_str(), "opaquelocktoken:a");
    assert!(header.submits(&token("opaquelocktoken:a")));
    assert!(!header.submits(&token("opaquelocktoken:b")));
}

#[test]
fn evaluate_token_must_be_valid_for_tag_path() {
    let state = FakeState::default().with_token("/dir", "opaquelocktoken:a");

    let header = parse("</dir> (<opaquelocktoken:a>)", "/dir/child.txt").unwrap();
    assert!(evaluate(&header, &state).unwrap());

    let header = parse("(<opaquelocktoken:a>)", "/dir/child.txt").unwrap();
    assert!(!evaluate(&header, &state).unwrap());

    let header = parse("</dir> (<opaquelocktoken:unknown>)", "/").unwrap();
    assert!(!evaluate(&header, &state).unwrap());
}

#[test]
fn evaluate_etag_compares_exact_value() {
    let state = FakeState::default().with_etag("/test.txt", "\"abc\"");

    let header = parse("([\"abc\"])", "/test.txt").unwrap();
    assert!(evaluate(&header, &state).unwrap());

    let header = parse("([\"etag1\"])", "/test.txt").unwrap();
    assert!(!evaluate(&header, &state).unwrap());

    let header = parse("([\"abc\"])", "/dir").unwrap();
    assert!(!evaluate(&header, &state).unwrap());
}

#[test]
fn evaluate_not_inverts_a_condition() {
    let state = FakeState::default().with_token("/x", "opaquelocktoken:a");

    let header = parse("(Not <opaquelocktoken:b>)", "/x").unwrap();
    assert!(evaluate(&header, &state).unwrap());

    let header = parse("(Not <opaquelocktoken:a>)", "/x").unwrap();
    assert!(!evaluate(&header, &state).unwrap());

    let header = parse("(<opaquelocktoken:a>) (Not <DAV:no-lock>)", "/y").unwrap();
    assert!(evaluate(&header, &state).unwrap());
}

#[test]
fn evaluate_lists_are_ored_and_conditions_anded() {
    let state = FakeState::default()
        .with_token("/x", "opaquelocktoken:a")
        .with_etag("/x", "\"e\"");

    let header = parse("(<opaquelocktoken:a> [\"other\"])", "/x").unwrap();
    assert!(!evaluate(&header, &state).unwrap());

    let header = parse("(<opaquelocktoken:a> [\"other\"]) ([\"e\"])", "/x").unwrap();
    assert!(evaluate(&header, &state).unwrap());
}

#[test]
fn evaluate_groups_are_anded() {
    let state = FakeState::default()
        .with_token("/a", "opaquelocktoken:a")
        .with_token("/b", "opaquelocktoken:b");

    let header = parse("</a> (<opaquelocktoken:a>) </b> (<opaquelocktoken:b>)", "/").unwrap();
    assert!(evaluate(&header, &state).unwrap());

    let header = parse("</a> (<opaquelocktoken:a>) </b> (<opaquelocktoken:a>)", "/").unwrap();
    assert!(!evaluate(&header, &state).unwrap());
}

#[test]
fn evaluate_looks_up_each_path_once() {
    let state = FakeState::default().with_token("/x", "opaquelocktoken:a");
    let header = parse(
        "(<opaquelocktoken:b>) (<opaquelocktoken:c>) (<opaquelocktoken:a>)",
        "/x",
    )
    .unwrap();
    assert!(evaluate(&header, &state).unwrap());
    assert_eq!(state.token_lookups.get(), 1);
}
