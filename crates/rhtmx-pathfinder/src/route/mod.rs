//! Route definitions and their storage.
//!
//! A [`RouteDefinition`] is the user-facing half of a registered route: a
//! stable handle, a name, an opaque abstraction payload and two append-only
//! hook lists. The compiled half lives next to it in the [`RouteStore`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod collection;
pub mod store;

pub use collection::RouteCollection;
pub use store::{RouteStore, StoredRoute};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique identity of a route definition.
///
/// Cloning a [`RouteDefinition`] keeps its handle, so registering both the
/// definition and its clone is a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteHandle(u64);

impl RouteHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds a handle from its raw value, e.g. one printed in a log line.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A before/after hook: an abstraction queued with a numeric priority.
///
/// Hooks are data only; this crate never executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook<A> {
    pub abstraction: A,
    pub priority: i32,
}

/// Fixed schema of properties a route payload exposes to field validators.
///
/// # Examples
///
/// ```
/// use rhtmx_pathfinder::RouteProperties;
///
/// struct Page {
///     handler: &'static str,
///     role: Option<&'static str>,
/// }
///
/// impl RouteProperties for Page {
///     const PROPERTIES: &'static [&'static str] = &["role"];
///
///     fn property(&self, name: &str) -> Option<String> {
///         match name {
///             "role" => self.role.map(str::to_string),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait RouteProperties {
    /// Names of the exposed properties.
    const PROPERTIES: &'static [&'static str];

    /// Current value of an exposed property; `None` when unset.
    fn property(&self, name: &str) -> Option<String>;
}

impl RouteProperties for () {
    const PROPERTIES: &'static [&'static str] = &[];

    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}

impl RouteProperties for String {
    const PROPERTIES: &'static [&'static str] = &[];

    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}

impl RouteProperties for &'static str {
    const PROPERTIES: &'static [&'static str] = &[];

    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Property every route exposes in addition to its payload's schema.
pub const NAME_PROPERTY: &str = "name";

/// A route's identity, payload and hooks.
#[derive(Debug, Clone)]
pub struct RouteDefinition<A> {
    handle: RouteHandle,
    name: String,
    abstraction: A,
    before: Vec<Hook<A>>,
    after: Vec<Hook<A>>,
}

impl<A> RouteDefinition<A> {
    /// Creates a definition with a fresh handle and a generated name.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pathfinder::RouteDefinition;
    ///
    /// let route = RouteDefinition::new("users.show");
    /// assert!(route.name().starts_with("route_"));
    ///
    /// let named = RouteDefinition::new("users.show").with_name("user.profile");
    /// assert_eq!(named.name(), "user.profile");
    /// ```
    pub fn new(abstraction: A) -> Self {
        let handle = RouteHandle::next();
        Self {
            handle,
            name: format!("route_{:08x}", handle.0),
            abstraction,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    // ========================================================================
    // Builder methods (consuming)
    // ========================================================================

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_before(mut self, abstraction: A, priority: i32) -> Self {
        self.push_before(abstraction, priority);
        self
    }

    pub fn with_after(mut self, abstraction: A, priority: i32) -> Self {
        self.push_after(abstraction, priority);
        self
    }

    // ========================================================================
    // In-place setters (for routes already held by a builder)
    // ========================================================================

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_abstraction(&mut self, abstraction: A) -> &mut Self {
        self.abstraction = abstraction;
        self
    }

    /// Appends to the before-queue.
    pub fn push_before(&mut self, abstraction: A, priority: i32) -> &mut Self {
        self.before.push(Hook {
            abstraction,
            priority,
        });
        self
    }

    /// Appends to the after-queue.
    pub fn push_after(&mut self, abstraction: A, priority: i32) -> &mut Self {
        self.after.push(Hook {
            abstraction,
            priority,
        });
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn handle(&self) -> RouteHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abstraction(&self) -> &A {
        &self.abstraction
    }

    /// Before-hooks in insertion order.
    pub fn before(&self) -> &[Hook<A>] {
        &self.before
    }

    /// After-hooks in insertion order.
    pub fn after(&self) -> &[Hook<A>] {
        &self.after
    }
}

impl<A: RouteProperties> RouteDefinition<A> {
    /// Whether `property` belongs to this route type's schema.
    pub fn exposes(property: &str) -> bool {
        property == NAME_PROPERTY || A::PROPERTIES.contains(&property)
    }

    /// Resolves an exposed property; `None` for unset or unknown names.
    pub fn property(&self, property: &str) -> Option<String> {
        if property == NAME_PROPERTY {
            Some(self.name.clone())
        } else {
            self.abstraction.property(property)
        }
    }
}
