//! Mountable route groups.
//!
//! A [`RouteCollection`] gathers route definitions with patterns relative to
//! a mount point. Nothing is compiled until the collection is mounted on a
//! [`crate::RouterBuilder`].

use super::RouteDefinition;

/// Joins a mount prefix and a relative pattern with exactly one `/`.
///
/// ```
/// use rhtmx_pathfinder::route::collection::join_pattern;
///
/// assert_eq!(join_pattern("/admin", "/users"), "/admin/users");
/// assert_eq!(join_pattern("/admin/", "users"), "/admin/users");
/// assert_eq!(join_pattern("", "/users"), "/users");
/// ```
pub fn join_pattern(prefix: &str, pattern: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        pattern.trim_start_matches('/')
    )
}

/// Routes waiting to be mounted under a prefix.
#[derive(Debug, Clone)]
pub struct RouteCollection<A> {
    routes: Vec<(RouteDefinition<A>, String)>,
}

impl<A> Default for RouteCollection<A> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<A> RouteCollection<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route for `pattern` and returns it for further configuration.
    pub fn register(&mut self, pattern: impl Into<String>, abstraction: A) -> &mut RouteDefinition<A> {
        self.register_route(pattern, RouteDefinition::new(abstraction))
    }

    /// Adds an existing definition for `pattern`.
    pub fn register_route(
        &mut self,
        pattern: impl Into<String>,
        definition: RouteDefinition<A>,
    ) -> &mut RouteDefinition<A> {
        let slot = self.routes.len();
        self.routes.push((definition, pattern.into()));
        &mut self.routes[slot].0
    }

    /// Nests another collection under `prefix`.
    pub fn mount(&mut self, prefix: &str, collection: RouteCollection<A>) -> &mut Self {
        self.routes.extend(
            collection
                .routes
                .into_iter()
                .map(|(definition, pattern)| (definition, join_pattern(prefix, &pattern))),
        );
        self
    }

    /// `(definition, relative pattern)` pairs in registration order.
    pub fn routes(&self) -> &[(RouteDefinition<A>, String)] {
        &self.routes
    }

    pub fn into_routes(self) -> Vec<(RouteDefinition<A>, String)> {
        self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
