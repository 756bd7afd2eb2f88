//! # RHTMX Pathfinder
//!
//! A regex-backed path-pattern router with:
//! - Placeholders (`/users/{id}`) with optional regex constraints
//!   (`/users/{id: [0-9]+}`, braces inside the constraint must balance)
//! - Reusable regex tags (`[!:year:!]`) substituted before compilation
//! - Field validators checking caller-announced values (role, host, ...)
//!   against route properties
//! - Reverse path building from a route name and its variables
//!
//! ## Match Pipeline
//!
//! A query narrows the registered routes in two stages:
//! - **Path stage**: full, anchored regex match of the request path
//! - **Field stage**: every registered field validator must accept the
//!   announced value; an unannounced field rejects the route
//!
//! Routes are tried in registration order and the first survivor wins.
//!
//! ## Example
//!
//! ```
//! use rhtmx_pathfinder::{FieldValidator, RouteProperties, RouterBuilder};
//!
//! #[derive(Debug)]
//! struct Page {
//!     handler: &'static str,
//!     role: Option<&'static str>,
//! }
//!
//! impl RouteProperties for Page {
//!     const PROPERTIES: &'static [&'static str] = &["role"];
//!
//!     fn property(&self, name: &str) -> Option<String> {
//!         match name {
//!             "role" => self.role.map(str::to_string),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut builder = RouterBuilder::new();
//! builder.add_tag("year", "[0-9]{4}").unwrap();
//! builder.add_field(FieldValidator::new("role", |value, props| {
//!     props.get("role").map_or(true, |required| required == value)
//! }));
//!
//! builder
//!     .register("/posts/{year: [!:year:!]}/{slug}", Page { handler: "posts.show", role: None })
//!     .unwrap()
//!     .set_name("post.show");
//! builder
//!     .register("/admin", Page { handler: "admin", role: Some("admin") })
//!     .unwrap();
//!
//! let router = builder.build().unwrap();
//!
//! let post = router.dispatch("/posts/2024/hello", [("role", "guest")]).unwrap().unwrap();
//! assert_eq!(post.abstraction().handler, "posts.show");
//! assert_eq!(post.param("slug"), Some("hello"));
//!
//! assert!(router.dispatch("/admin", ()).unwrap().is_none());
//! assert!(router.dispatch("/admin", [("role", "guest")]).unwrap().is_none());
//! assert!(router.dispatch("/admin", [("role", "admin")]).unwrap().is_some());
//!
//! let url = router
//!     .build_path_params("post.show", &[("year", "2025"), ("slug", "news")])
//!     .unwrap();
//! assert_eq!(url, "/posts/2025/news");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod pattern;
pub mod route;
mod router;
pub mod tag;

// Re-export public types
pub use config::{HandlerRef, RouteTableConfig};
pub use entity::ResolvedRoute;
pub use error::{Result, RouterError, ValidationError};
pub use field::{BoundProperties, FieldAnnouncer, FieldRegistry, FieldValidator};
pub use filter::MatchCandidateSet;
pub use pattern::CompiledPattern;
pub use route::{Hook, RouteCollection, RouteDefinition, RouteHandle, RouteProperties, StoredRoute};
pub use router::{Query, Router, RouterBuilder};
pub use tag::TagRegistry;
