//! Pattern core - compiled matchers used on the request hot path.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::RouterError;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/:id/posts/:postId).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered `(name, value)` pairs captured from a path.
///
/// Names are `Arc<str>` because they come from the compiled pattern and are
/// shared by every request; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[allow(clippy::expect_used)]
static PARAM_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name regex should be valid")
});

/// A route pattern compiled into an anchored matcher.
///
/// Cloning is cheap: the regex and the name list are reference counted.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: Arc<str>,
    regex: Regex,
    param_names: Arc<[Arc<str>]>,
    shape: Arc<str>,
}

impl CompiledPattern {
    /// Compile a pattern such as `/users/:id`.
    ///
    /// A trailing slash is ignored (`/users/` compiles like `/users`), and the
    /// root pattern `/` matches only the root path.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MalformedPattern`] when the pattern does not start
    /// with `/`, contains an empty segment, an empty or invalid parameter
    /// name, a repeated parameter name, or a `{...}` placeholder.
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let malformed = |reason: &str| RouterError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(malformed("pattern must start with '/'"));
        }
        if pattern.contains("//") {
            return Err(malformed("empty path segment"));
        }

        let trimmed = pattern.trim_end_matches('/');
        let mut expr = String::with_capacity(trimmed.len() + 16);
        let mut shape = String::with_capacity(trimmed.len());
        let mut names: Vec<Arc<str>> = Vec::with_capacity(trimmed.matches(':').count());
        expr.push('^');

        // `trimmed` starts with '/', so the first split item is always empty
        for segment in trimmed.split('/').skip(1) {
            if segment.is_empty() {
                return Err(malformed("empty path segment"));
            }
            if segment.contains('{') || segment.contains('}') {
                return Err(malformed(
                    "brace placeholders are not supported, use ':name' segments",
                ));
            }

            expr.push('/');
            shape.push('/');

            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    return Err(malformed("empty parameter name"));
                }
                if !is_valid_param_name(name) {
                    return Err(RouterError::MalformedPattern {
                        pattern: pattern.to_string(),
                        reason: format!("invalid parameter name '{name}'"),
                    });
                }
                if names.iter().any(|n| n.as_ref() == name) {
                    return Err(RouterError::MalformedPattern {
                        pattern: pattern.to_string(),
                        reason: format!("duplicate parameter name '{name}'"),
                    });
                }
                expr.push_str("([^/]+)");
                shape.push(':');
                names.push(Arc::from(name));
            } else {
                expr.push_str(&regex::escape(segment));
                shape.push_str(segment);
            }
        }

        if shape.is_empty() {
            // root pattern
            expr.push('/');
            shape.push('/');
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| RouterError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let source = if trimmed.is_empty() { "/" } else { trimmed };

        Ok(Self {
            source: Arc::from(source),
            regex,
            param_names: names.into(),
            shape: Arc::from(shape),
        })
    }

    /// The pattern text this matcher was compiled from, without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn shared_source(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    /// Parameter names in left-to-right order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// The pattern with parameter names erased (`/users/:`), used to detect
    /// routes that can never be reached.
    #[must_use]
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// True when the whole of `path` matches.
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and zip captured values with parameter names.
    ///
    /// Returns `None` when the path does not match the whole pattern.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(val) = caps.get(i + 1) {
                params.push((Arc::clone(name), val.as_str().to_string()));
            }
        }
        Some(params)
    }
}

fn is_valid_param_name(name: &str) -> bool {
    PARAM_NAME.is_match(name)
}

/// Join group prefixes and a route path into one pattern.
///
/// Empty segments are dropped, so `"/v1/"`, `"/admin"` and `"users/:id"`
/// join to `/v1/admin/users/:id`. Joining nothing yields `/`.
#[must_use]
pub fn join_paths<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for part in parts {
        for segment in part.split('/').filter(|s| !s.is_empty()) {
            out.push('/');
            out.push_str(segment);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Normalize an inbound path before matching.
///
/// Drops any query string or fragment, strips `base_path` when the path is
/// mounted under it, and removes trailing slashes except on the root.
/// Returns `None` when a non-empty `base_path` is configured and the path lies
/// outside of it.
#[must_use]
pub fn normalize_path(raw_path: &str, base_path: &str) -> Option<String> {
    let path = raw_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let base = base_path.trim_end_matches('/');
    let path = if base.is_empty() {
        path
    } else {
        let rest = path.strip_prefix(base)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            // `/apiary` is not under `/api`
            return None;
        }
        rest
    };

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Some("/".to_string());
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}
