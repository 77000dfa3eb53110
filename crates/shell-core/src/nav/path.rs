//! Location normalization
//!
//! Navigation hrefs and current locations are compared in a normalized form:
//! no query or fragment, a leading `/`, no trailing `/` (except the root), and
//! absolute URLs reduced to their path, relative to the application base when
//! the URL lies under it. Percent-escapes are decoded so an encoded URL path
//! and a raw href name the same location.

use url::{ParseError, Url};

/// Root path.
pub const ROOT: &str = "/";

/// Normalize a raw href or location.
///
/// Blank input is the root. Returns `None` for input that looks like an
/// absolute URL but cannot be parsed.
pub fn normalize_path(raw: &str, base: Option<&Url>) -> Option<String> {
    let stripped = raw
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default()
        .trim();
    if stripped.is_empty() {
        return Some(ROOT.to_string());
    }

    let mut path = match Url::parse(stripped) {
        Ok(absolute) => match base.and_then(|base| base_relative(base, &absolute)) {
            Some(relative) => format!("/{relative}"),
            None => absolute.path().to_string(),
        },
        Err(ParseError::RelativeUrlWithoutBase) => stripped.to_string(),
        Err(err) => {
            tracing::debug!(raw, error = %err, "unparseable location");
            return None;
        }
    };

    if !path.starts_with('/') {
        path.insert(0, '/');
    }

    if let Ok(decoded) = urlencoding::decode(&path) {
        path = decoded.into_owned();
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        Some(ROOT.to_string())
    } else {
        Some(trimmed.to_string())
    }
}

/// Lookup key for a normalized path. Href matching ignores ASCII case.
pub fn path_key(normalized: &str) -> String {
    normalized.to_ascii_lowercase()
}

/// Parent of a normalized path: drop the last `/`-delimited segment.
///
/// The parent of a top-level segment, and of the root itself, is the root.
pub fn parent_path(normalized: &str) -> &str {
    match normalized.rfind('/') {
        Some(cut) if cut > 0 => &normalized[..cut],
        _ => ROOT,
    }
}

/// Path of `absolute` relative to `base`, or `None` when it lies elsewhere.
fn base_relative<'a>(base: &Url, absolute: &'a Url) -> Option<&'a str> {
    let base = base.as_str();
    let base_prefix = base.strip_suffix('/').unwrap_or(base);
    let candidate = absolute.as_str();

    if candidate.len() < base_prefix.len()
        || !candidate.is_char_boundary(base_prefix.len())
        || !candidate[..base_prefix.len()].eq_ignore_ascii_case(base_prefix)
    {
        return None;
    }

    let rest = &candidate[base_prefix.len()..];
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}
