//! Request path normalization and hierarchy helpers.
//!
//! Every path handed to the lock store is normalized first: scheme and
//! authority are stripped, percent-escapes decoded, `.`/`..` segments and
//! duplicate or trailing slashes removed. The root is `/`.

use percent_encoding::percent_decode_str;

/// Normalize a request URI or path into the canonical lock-table key.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();

    // Absolute URIs (as found in If-header tags and Destination) carry an authority.
    let without_authority = match raw.find("://") {
        Some(idx) => {
            let rest = &raw[idx + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "/",
            }
        }
        None => raw,
    };

    let without_query = without_authority
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let decoded = percent_decode_str(without_query).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Parent of a normalized path, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(path[..idx].to_string()),
        None => Some("/".to_string()),
    }
}

/// All ancestors of a normalized path, nearest first, ending with `/`.
pub fn ancestors(path: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = parent(path);
    while let Some(p) = current {
        current = parent(&p);
        result.push(p);
    }
    result
}

/// True when `path` lies strictly beneath `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" {
        return path != "/";
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// True when `path` equals `root` or lies beneath it.
pub fn is_within(path: &str, root: &str) -> bool {
    path == root || is_descendant(path, root)
}
