//! # Router Module
//!
//! The router holds the ordered route table and the group-scoping machinery
//! used to build it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Registering routes with their effective prefix and middleware
//! - Matching a normalized path against routes in registration order
//! - Extracting path parameters from the first matching route
//!
//! ## Group Scopes
//!
//! [`RouteTableBuilder::group`] pushes a [`GroupScope`] for the duration of a
//! closure. Every route registered inside gets the concatenation of the active
//! prefixes (outer to inner) and the active scopes' middleware ahead of its own:
//!
//! ```rust
//! use routechain::resolver::HandlerRef;
//! use routechain::router::{GroupScope, RouteTableBuilder};
//!
//! let mut builder = RouteTableBuilder::new();
//! builder
//!     .group(GroupScope::new("/v1"), |v1| {
//!         v1.group(GroupScope::new("/admin").with_middleware(["auth"]), |admin| {
//!             admin.get("/users/:id", "Users.show")?.with_middleware(["audit"]);
//!             Ok(())
//!         })
//!     })
//!     .unwrap();
//!
//! let table = builder.build();
//! let route = table.get(0).unwrap();
//! assert_eq!(route.pattern().as_str(), "/v1/admin/users/:id");
//! assert_eq!(route.middleware(), ["auth", "audit"]);
//! ```
//!
//! ## Precedence
//!
//! The first registered route whose method and pattern match wins. There is
//! no "most specific" ranking, so more specific routes must be registered
//! before the general ones that would also match them.

mod builder;
mod core;

pub use builder::{GroupScope, RouteHandle, RouteTableBuilder, SUPPORTED_METHODS};
pub use core::{Route, RouteMatch, RouteTable};
pub use crate::pattern::{ParamVec, MAX_INLINE_PARAMS};
