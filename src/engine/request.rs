//! Request and response values at the engine boundary.

use crate::error::{DavLockError, Result};
use crate::locks::LockScope;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// The body of a LOCK request (`lockinfo`), as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRequest {
    /// Local name of the `lockscope` child (`exclusive` or `shared`).
    pub scope: String,
    /// Local name of the `locktype` child (only `write` is defined).
    pub lock_type: String,
    /// Raw `owner` markup, echoed back verbatim. Namespaces the markup
    /// inherited from `lockinfo` are declared on its top-level elements.
    pub owner: Option<String>,
}

impl LockRequest {
    pub fn exclusive(owner: Option<String>) -> Self {
        Self {
            scope: "exclusive".to_string(),
            lock_type: "write".to_string(),
            owner,
        }
    }

    pub fn shared(owner: Option<String>) -> Self {
        Self {
            scope: "shared".to_string(),
            lock_type: "write".to_string(),
            owner,
        }
    }

    /// Check the requested scope and type.
    pub fn validate(&self) -> Result<LockScope> {
        if !self.lock_type.eq_ignore_ascii_case("write") {
            return Err(DavLockError::BadRequest(format!(
                "unsupported lock type '{}'",
                self.lock_type
            )));
        }
        LockScope::parse(&self.scope).ok_or_else(|| {
            DavLockError::BadRequest(format!("unsupported lock scope '{}'", self.scope))
        })
    }

    /// Parse a `lockinfo` XML body. An empty body is a refresh request and yields `None`.
    pub fn from_xml(body: &str) -> Result<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }

        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut scope = None;
        let mut lock_type = None;
        let mut owner = None;
        let mut saw_root = false;
        let mut root_decls = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| DavLockError::BadRequest(format!("malformed lock body: {}", e)))?;
            match event {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if stack.is_empty() {
                        check_root(&name)?;
                        saw_root = true;
                        root_decls = namespace_decls(&e)?;
                    } else if stack.len() == 1 && name == b"owner" {
                        let mut decls = root_decls.clone();
                        for (key, value) in namespace_decls(&e)? {
                            decls.retain(|(k, _)| *k != key);
                            decls.push((key, value));
                        }
                        let raw = reader.read_text(e.name()).map_err(|err| {
                            DavLockError::BadRequest(format!("malformed owner element: {}", err))
                        })?;
                        let raw = raw.trim();
                        if !raw.is_empty() {
                            owner = Some(bind_namespaces(raw, &decls)?);
                        }
                        continue;
                    } else {
                        record_choice(&stack, &name, &mut scope, &mut lock_type);
                    }
                    stack.push(name);
                }
                Event::Empty(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if stack.is_empty() {
                        check_root(&name)?;
                        saw_root = true;
                    } else {
                        record_choice(&stack, &name, &mut scope, &mut lock_type);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(DavLockError::BadRequest(
                "lock body has no lockinfo element".to_string(),
            ));
        }

        Ok(Some(Self {
            scope: scope.unwrap_or_default(),
            lock_type: lock_type.unwrap_or_default(),
            owner,
        }))
    }
}

/// `xmlns` / `xmlns:p` attributes declared on an element.
fn namespace_decls(element: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut decls = Vec::new();
    for attr in element.attributes() {
        let attr =
            attr.map_err(|e| DavLockError::BadRequest(format!("malformed attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            let value = attr
                .unescape_value()
                .map_err(|e| DavLockError::BadRequest(format!("malformed attribute: {}", e)))?;
            decls.push((key, value.into_owned()));
        }
    }
    Ok(decls)
}

/// Re-declare the namespaces an owner fragment inherited from `lockinfo` on
/// its top-level elements, so the fragment stays well-formed when echoed
/// inside a response that only binds `D:` to `DAV:`.
fn bind_namespaces(fragment: &str, decls: &[(String, String)]) -> Result<String> {
    let needed: Vec<&(String, String)> = decls
        .iter()
        .filter(|(key, value)| match key.strip_prefix("xmlns:") {
            Some("D") => value != "DAV:",
            Some(prefix) => fragment.contains(&format!("{}:", prefix)),
            None => true,
        })
        .collect();
    if needed.is_empty() || !fragment.contains('<') {
        return Ok(fragment.to_string());
    }

    let mut reader = Reader::from_str(fragment);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(malformed_owner)?;
        let event = match event {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    Event::Start(declare(e, &needed))
                } else {
                    Event::Start(e)
                }
            }
            Event::Empty(e) if depth == 0 => Event::Empty(declare(e, &needed)),
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                Event::End(e)
            }
            Event::Eof => break,
            other => other,
        };
        writer.write_event(event).map_err(malformed_owner)?;
    }

    String::from_utf8(writer.into_inner()).map_err(malformed_owner)
}

fn malformed_owner(e: impl std::fmt::Display) -> DavLockError {
    DavLockError::BadRequest(format!("malformed owner element: {}", e))
}

fn declare<'a>(mut element: BytesStart<'a>, decls: &[&(String, String)]) -> BytesStart<'a> {
    let own: Vec<Vec<u8>> = element
        .attributes()
        .flatten()
        .map(|a| a.key.as_ref().to_vec())
        .collect();
    for (key, value) in decls {
        if !own.iter().any(|k| k.as_slice() == key.as_bytes()) {
            element.push_attribute((key.as_str(), value.as_str()));
        }
    }
    element
}

fn check_root(name: &[u8]) -> Result<()> {
    if name == b"lockinfo" {
        Ok(())
    } else {
        Err(DavLockError::BadRequest(format!(
            "expected lockinfo element, found '{}'",
            String::from_utf8_lossy(name)
        )))
    }
}

fn record_choice(
    stack: &[Vec<u8>],
    name: &[u8],
    scope: &mut Option<String>,
    lock_type: &mut Option<String>,
) {
    let value = String::from_utf8_lossy(name).into_owned();
    match stack.last().map(Vec::as_slice) {
        Some(b"lockscope") if stack.len() == 2 => *scope = Some(value),
        Some(b"locktype") if stack.len() == 2 => *lock_type = Some(value),
        _ => {}
    }
}

/// A request as seen by the lock engine.
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub method: Method,
    /// Request path; normalized by the engine.
    pub path: String,
    pub headers: HeaderMap,
    /// Parsed LOCK body; `None` for an empty body.
    pub lock_body: Option<LockRequest>,
}

impl DavRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            lock_body: None,
        }
    }

    /// Builder-style header setter. Values that are not valid header text are a bad request.
    pub fn header(mut self, name: http::HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value).map_err(|_| {
            DavLockError::BadRequest(format!("invalid value for {} header", name))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_lock_body(mut self, body: LockRequest) -> Self {
        self.lock_body = Some(body);
        self
    }
}

/// The engine's answer to a LOCK or UNLOCK request.
#[derive(Debug, Clone)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// XML body; empty for `204 No Content`.
    pub body: String,
}

impl DavResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
