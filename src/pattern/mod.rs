//! # Pattern Module
//!
//! Compiles declarative route patterns such as `/users/:id/posts/:postId` into
//! anchored regex matchers plus the ordered list of parameter names.
//!
//! ## Compilation
//!
//! Each pattern is compiled once, when the route is registered:
//!
//! - literal segments are escaped with [`regex::escape`]
//! - each `:name` segment becomes a `([^/]+)` capture group
//! - the expression is anchored with `^...$`, so only whole paths match
//! - parameter names are recorded left to right
//!
//! ```rust
//! use routechain::pattern::CompiledPattern;
//!
//! let pattern = CompiledPattern::compile("/users/:id/posts/:postId").unwrap();
//! let params = pattern.captures("/users/42/posts/7").unwrap();
//! assert_eq!(params[0].1, "42");
//! assert_eq!(params[1].1, "7");
//! assert!(pattern.captures("/users/42").is_none());
//! ```
//!
//! Malformed patterns (empty or invalid parameter names, brace placeholders,
//! repeated names) are rejected with [`RouterError::MalformedPattern`](crate::error::RouterError::MalformedPattern).

mod core;

pub use core::{join_paths, normalize_path, CompiledPattern, ParamVec, MAX_INLINE_PARAMS};
