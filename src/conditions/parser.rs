//! If-header parser.
//!
//! ```text
//! If        = 1*( [ "<" URI ">" ] 1*List )
//! List      = "(" 1*Condition ")"
//! Condition = [ "Not" ] ( "<" Coded-URL ">" | "[" entity-tag "]" )
//! ```
//!
//! Lists that precede any resource tag apply to the request path. Lists that
//! follow a tag apply to that tag until the next one.

use super::types::{Condition, ConditionKind, ConditionList, IfHeader, TaggedConditionList};
use crate::error::{DavLockError, Result};
use crate::locks::LockToken;
use crate::paths;

/// Parse an `If` header sent with a request for `request_path`.
pub fn parse(header: &str, request_path: &str) -> Result<IfHeader> {
    let mut cursor = Cursor::new(header);
    let mut groups: Vec<TaggedConditionList> = Vec::new();

    cursor.skip_ws();
    if cursor.at_end() {
        return Err(malformed("empty header"));
    }

    while !cursor.at_end() {
        match cursor.peek() {
            Some('<') => {
                let uri = cursor.coded_url()?;
                if uri.trim().is_empty() {
                    return Err(malformed("empty resource tag"));
                }
                cursor.skip_ws();
                if cursor.peek() != Some('(') {
                    return Err(malformed(&format!("resource tag <{}> has no condition list", uri)));
                }
                groups.push(TaggedConditionList {
                    path: paths::normalize(uri),
                    tagged: true,
                    lists: Vec::new(),
                });
            }
            Some('(') => {
                let list = cursor.list()?;
                match groups.last_mut() {
                    Some(group) => group.lists.push(list),
                    None => groups.push(TaggedConditionList {
                        path: paths::normalize(request_path),
                        tagged: false,
                        lists: vec![list],
                    }),
                }
            }
            Some(other) => {
                return Err(malformed(&format!("unexpected character '{}'", other)));
            }
            None => break,
        }
        cursor.skip_ws();
    }

    Ok(IfHeader { groups })
}

fn malformed(detail: &str) -> DavLockError {
    DavLockError::BadRequest(format!("malformed If header: {}", detail))
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Consume up to and including `close`, returning what came before it.
    fn take_until(&mut self, close: char) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest.find(close)?;
        self.pos += end + close.len_utf8();
        Some(&rest[..end])
    }

    fn coded_url(&mut self) -> Result<&'a str> {
        self.bump();
        self.take_until('>')
            .ok_or_else(|| malformed("unterminated '<'"))
    }

    fn list(&mut self) -> Result<ConditionList> {
        self.bump();
        let mut conditions = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    break;
                }
                Some(_) => conditions.push(self.condition()?),
                None => return Err(malformed("unterminated '('")),
            }
        }

        if conditions.is_empty() {
            return Err(malformed("empty condition list"));
        }
        Ok(ConditionList { conditions })
    }

    fn condition(&mut self) -> Result<Condition> {
        let not = self
            .rest()
            .get(..3)
            .is_some_and(|word| word.eq_ignore_ascii_case("not"));
        if not {
            self.pos += 3;
            self.skip_ws();
        }

        let kind = match self.peek() {
            Some('<') => {
                let raw = self.coded_url()?;
                ConditionKind::Token(LockToken::parse(raw)?)
            }
            Some('[') => {
                self.bump();
                let etag = self
                    .take_until(']')
                    .ok_or_else(|| malformed("unterminated '['"))?
                    .trim();
                if etag.is_empty() {
                    return Err(malformed("empty entity tag"));
                }
                ConditionKind::ETag(etag.to_string())
            }
            Some(other) => {
                return Err(malformed(&format!(
                    "expected state token or entity tag, found '{}'",
                    other
                )));
            }
            None => return Err(malformed("unterminated '('")),
        };

        Ok(Condition { not, kind })
    }
}
