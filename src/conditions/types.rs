//! If-header AST.

use crate::locks::LockToken;

/// What a single condition tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    /// A state token (`<opaquelocktoken:...>` or any other coded URL).
    Token(LockToken),
    /// An entity tag, kept exactly as written between the brackets (quotes included).
    ETag(String),
}

/// One condition inside a parenthesized list, optionally negated with `Not`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub not: bool,
    pub kind: ConditionKind,
}

impl Condition {
    pub fn token(token: LockToken) -> Self {
        Self {
            not: false,
            kind: ConditionKind::Token(token),
        }
    }

    pub fn etag(etag: impl Into<String>) -> Self {
        Self {
            not: false,
            kind: ConditionKind::ETag(etag.into()),
        }
    }

    pub fn negated(mut self) -> Self {
        self.not = !self.not;
        self
    }
}

/// Conditions of one `( ... )` group; all must hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConditionList {
    pub conditions: Vec<Condition>,
}

/// Condition lists applying to one resource; at least one must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedConditionList {
    /// Normalized path the lists apply to. Untagged lists get the request path.
    pub path: String,
    /// Whether the path came from an explicit `<URI>` resource tag.
    pub tagged: bool,
    pub lists: Vec<ConditionList>,
}

/// A parsed `If` header; every group must hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IfHeader {
    pub groups: Vec<TaggedConditionList>,
}

impl IfHeader {
    /// Every non-negated state token in the header, paired with the path it was submitted for.
    pub fn submitted_tokens(&self) -> impl Iterator<Item = (&str, &LockToken)> {
        self.groups.iter().flat_map(|group| {
            group
                .lists
                .iter()
                .flat_map(|list| list.conditions.iter())
                .filter(|c| !c.not)
                .filter_map(move |c| match &c.kind {
                    ConditionKind::Token(token) => Some((group.path.as_str(), token)),
                    ConditionKind::ETag(_) => None,
                })
        })
    }

    /// Whether `token` was submitted (non-negated) anywhere in the header.
    pub fn submits(&self, token: &LockToken) -> bool {
        self.submitted_tokens().any(|(_, t)| t == token)
    }
}
