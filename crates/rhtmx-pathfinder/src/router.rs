//! Router construction, matching and reverse path building.
//!
//! Routes, tags and field validators are registered on a mutable
//! [`RouterBuilder`]. [`RouterBuilder::build`] validates the whole table and
//! freezes it into a [`Router`], which only reads and can be shared across
//! threads when the route payload allows it.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::entity::ResolvedRoute;
use crate::error::{Result, RouterError, ValidationError};
use crate::field::{FieldAnnouncer, FieldRegistry, FieldValidator};
use crate::filter::{FieldPredicate, MatchCandidateSet, MatchPipeline, NamePredicate, PathPredicate};
use crate::pattern::{compile, CompiledPattern};
use crate::route::collection::join_pattern;
use crate::route::{RouteCollection, RouteDefinition, RouteHandle, RouteProperties, RouteStore, StoredRoute};
use crate::tag::TagRegistry;

// ============================================================================
// Builder
// ============================================================================

/// Mutable registration phase of a router.
///
/// # Examples
///
/// ```
/// use rhtmx_pathfinder::RouterBuilder;
///
/// let mut builder = RouterBuilder::new();
/// builder.add_tag("year", "[0-9]{4}").unwrap();
/// builder.register("/users/{id: [0-9]+}", "users.show").unwrap().set_name("user.show");
/// builder.register("/archive/{year: [!:year:!]}", "archive").unwrap();
///
/// let router = builder.build().unwrap();
/// assert_eq!(router.len(), 2);
/// ```
#[derive(Debug)]
pub struct RouterBuilder<A> {
    store: RouteStore<A>,
    tags: TagRegistry,
    fields: FieldRegistry,
    strict_names: bool,
}

impl<A> Default for RouterBuilder<A> {
    fn default() -> Self {
        Self {
            store: RouteStore::new(),
            tags: TagRegistry::new(),
            fields: FieldRegistry::new(),
            strict_names: false,
        }
    }
}

impl<A> RouterBuilder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing set of field validators.
    pub fn with_fields(mut self, fields: FieldRegistry) -> Self {
        self.fields.import(fields);
        self
    }

    /// Registers a tag for patterns compiled from now on.
    pub fn add_tag(&mut self, name: &str, partial_regex: &str) -> Result<&mut Self> {
        self.tags.add(name, partial_regex)?;
        Ok(self)
    }

    pub fn add_field(&mut self, validator: FieldValidator) -> &mut Self {
        debug!(field = validator.name(), binds = ?validator.binds(), "field registered");
        self.fields.add(validator);
        self
    }

    /// Rejects duplicate route names when the router is built.
    pub fn strict_names(&mut self, strict: bool) -> &mut Self {
        self.strict_names = strict;
        self
    }

    /// Creates and compiles a route, returning it for further configuration.
    pub fn register(&mut self, pattern: &str, abstraction: A) -> Result<&mut RouteDefinition<A>> {
        let handle = self.register_route(pattern, RouteDefinition::new(abstraction))?;
        self.route_mut(handle)
    }

    /// Compiles `pattern` and stores an existing definition under it.
    ///
    /// Registering the same definition (or a clone of it) twice fails with
    /// [`RouterError::Conflict`]. Nothing is stored when compilation fails.
    pub fn register_route(&mut self, pattern: &str, definition: RouteDefinition<A>) -> Result<RouteHandle> {
        let handle = definition.handle();
        if self.store.contains(handle) {
            return Err(RouterError::Conflict(handle));
        }

        let compiled = compile(pattern, &self.tags)?;
        debug!(
            route = %handle,
            name = definition.name(),
            pattern,
            regex = compiled.regex_source(),
            "route registered"
        );
        self.store.add(definition, compiled)?;
        Ok(handle)
    }

    /// Registers every route of `collection` under `prefix`.
    ///
    /// Either all routes are registered or none is.
    pub fn mount(&mut self, prefix: &str, collection: RouteCollection<A>) -> Result<Vec<RouteHandle>> {
        let routes = collection.into_routes();

        let mut seen = HashSet::new();
        for (definition, _) in &routes {
            let handle = definition.handle();
            if self.store.contains(handle) || !seen.insert(handle) {
                return Err(RouterError::Conflict(handle));
            }
        }

        let compiled = routes
            .iter()
            .map(|(_, pattern)| compile(&join_pattern(prefix, pattern), &self.tags))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut handles = Vec::with_capacity(routes.len());
        for ((definition, _), compiled) in routes.into_iter().zip(compiled) {
            handles.push(definition.handle());
            self.store.add(definition, compiled)?;
        }
        debug!(prefix, routes = handles.len(), "collection mounted");
        Ok(handles)
    }

    /// Recompiles an existing route for a new pattern.
    pub fn set_pattern(&mut self, handle: RouteHandle, pattern: &str) -> Result<()> {
        if !self.store.contains(handle) {
            return Err(RouterError::UnknownRoute(handle));
        }
        let compiled = compile(pattern, &self.tags)?;
        self.store.set_compiled(handle, compiled)
    }

    pub fn route_mut(&mut self, handle: RouteHandle) -> Result<&mut RouteDefinition<A>> {
        Ok(&mut self.store.get_mut(handle)?.definition)
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<A: RouteProperties> RouterBuilder<A> {
    /// Validates the table and freezes it.
    ///
    /// Fields are bound to the same-named route property when the route type
    /// exposes one; every binding must name an exposed property.
    pub fn build(mut self) -> Result<Router<A>> {
        self.fields.bind_same_named(RouteDefinition::<A>::exposes);
        self.fields.check_bindings(RouteDefinition::<A>::exposes)?;

        if self.strict_names {
            let mut names = HashSet::new();
            if let Some(duplicate) = self.store.iter().find(|route| !names.insert(route.name())) {
                return Err(RouterError::Conflict(duplicate.handle()));
            }
        }

        debug!(
            routes = self.store.len(),
            tags = self.tags.len(),
            fields = self.fields.len(),
            "router built"
        );
        Ok(Router {
            store: self.store,
            tags: self.tags,
            fields: self.fields,
        })
    }
}

// ============================================================================
// Router
// ============================================================================

/// A frozen route table.
#[derive(Debug, Clone)]
pub struct Router<A> {
    store: RouteStore<A>,
    tags: TagRegistry,
    fields: FieldRegistry,
}

impl<A> Router<A> {
    pub fn builder() -> RouterBuilder<A> {
        RouterBuilder::new()
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &StoredRoute<A>> {
        self.store.iter()
    }

    pub fn route(&self, handle: RouteHandle) -> Result<&StoredRoute<A>> {
        self.store.get(handle)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Registered field names, in registration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.field_names()
    }

    /// First route registered under `name`.
    pub fn route_by_name(&self, name: &str) -> Result<&StoredRoute<A>> {
        let candidates = MatchPipeline::<A>::new()
            .stage(NamePredicate::new(name))
            .run(self.store.iter())?;
        match candidates.first() {
            Some(handle) => self.store.get(handle),
            None => Err(RouterError::RouteNotFound(name.to_string())),
        }
    }

    /// Rebuilds a concrete path for the route named `name`.
    ///
    /// `vars` must hold exactly the route's placeholder names. Values are
    /// inserted as given; the rest of the pattern is copied verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use rhtmx_pathfinder::RouterBuilder;
    ///
    /// let mut builder = RouterBuilder::new();
    /// builder.register("/posts/{year: [0-9]{4}}/{slug}", ()).unwrap().set_name("post.show");
    /// let router = builder.build().unwrap();
    ///
    /// let vars = HashMap::from([
    ///     ("year".to_string(), "2024".to_string()),
    ///     ("slug".to_string(), "hello-world".to_string()),
    /// ]);
    /// assert_eq!(router.build_path("post.show", &vars).unwrap(), "/posts/2024/hello-world");
    /// ```
    pub fn build_path(&self, name: &str, vars: &HashMap<String, String>) -> Result<String> {
        let route = self.route_by_name(name)?;
        let compiled = &route.compiled;

        if let Some(tag) = compiled.literal_tags().first() {
            return Err(ValidationError::NotReversible {
                route: name.to_string(),
                tag: tag.clone(),
            }
            .into());
        }

        let declared: HashSet<&str> = compiled.variable_names().collect();
        let mut extraneous: Vec<String> = vars
            .keys()
            .filter(|key| !declared.contains(key.as_str()))
            .cloned()
            .collect();
        extraneous.sort();
        let missing: Vec<String> = compiled
            .variable_names()
            .filter(|var| !vars.contains_key(*var))
            .map(str::to_string)
            .collect();
        if !extraneous.is_empty() || !missing.is_empty() {
            return Err(ValidationError::ExtraneousOrMissingVariable {
                route: name.to_string(),
                extraneous,
                missing,
            }
            .into());
        }

        Ok(substitute_variables(compiled, vars))
    }

    /// [`Router::build_path`] with the variables given as pairs.
    pub fn build_path_params(&self, name: &str, vars: &[(&str, &str)]) -> Result<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.build_path(name, &vars)
    }
}

/// Replaces every placeholder of the source pattern with its value.
fn substitute_variables(compiled: &CompiledPattern, vars: &HashMap<String, String>) -> String {
    let source = compiled.pattern();
    let mut path = String::with_capacity(source.len());
    let mut cursor = 0;
    for var in compiled.variables() {
        path.push_str(&source[cursor..var.source_span.start]);
        if let Some(value) = vars.get(&var.name) {
            path.push_str(value);
        }
        cursor = var.source_span.end;
    }
    path.push_str(&source[cursor..]);
    path
}

impl<A: RouteProperties> Router<A> {
    /// Starts a query whose field values are announced one by one.
    pub fn query_builder(&self, path: &str) -> Query<'_, A> {
        Query {
            router: self,
            path: path.to_string(),
            values: HashMap::new(),
        }
    }

    /// All routes matching `path` and accepted by every registered field
    /// validator.
    pub fn query(&self, path: &str, announcer: impl FieldAnnouncer) -> Result<MatchCandidateSet> {
        let mut query = self.query_builder(path);
        query.announce_from(announcer)?;
        query.candidates()
    }

    /// The first matching route with its extracted values, `None` when no
    /// route matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pathfinder::RouterBuilder;
    ///
    /// let mut builder = RouterBuilder::new();
    /// builder.register("/users/{id: [0-9]+}", "users.show").unwrap();
    /// let router = builder.build().unwrap();
    ///
    /// let resolved = router.dispatch("/users/42", ()).unwrap().unwrap();
    /// assert_eq!(*resolved.abstraction(), "users.show");
    /// assert_eq!(resolved.param("id"), Some("42"));
    ///
    /// assert!(router.dispatch("/users/abc", ()).unwrap().is_none());
    /// ```
    pub fn dispatch(&self, path: &str, announcer: impl FieldAnnouncer) -> Result<Option<ResolvedRoute<'_, A>>> {
        let mut query = self.query_builder(path);
        query.announce_from(announcer)?;
        query.dispatch()
    }
}

// ============================================================================
// Query
// ============================================================================

/// A pending query against a [`Router`].
///
/// Every registered field validator runs against each path candidate; a
/// field without an announced value rejects the candidate.
#[derive(Debug)]
pub struct Query<'r, A> {
    router: &'r Router<A>,
    path: String,
    values: HashMap<String, String>,
}

impl<'r, A: RouteProperties> Query<'r, A> {
    /// Announces the value of a registered field.
    pub fn announce(&mut self, name: &str, value: impl Into<String>) -> Result<&mut Self> {
        self.router.fields.get(name)?;
        self.values.insert(name.to_string(), value.into());
        Ok(self)
    }

    /// Announces every value `announcer` supplies for the registered fields.
    pub fn announce_from(&mut self, announcer: impl FieldAnnouncer) -> Result<&mut Self> {
        let names = self.router.fields.field_names();
        for (name, value) in announcer.announce(&names) {
            self.announce(&name, value)?;
        }
        Ok(self)
    }

    /// Whether every registered field has an announced value.
    pub fn validate_route_values(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Registered fields still lacking a value.
    pub fn missing_fields(&self) -> Vec<&'r str> {
        self.router
            .fields
            .field_names()
            .into_iter()
            .filter(|name| !self.values.contains_key(*name))
            .collect()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Runs the match pipeline.
    pub fn candidates(&self) -> Result<MatchCandidateSet> {
        let pipeline = MatchPipeline::<A>::new()
            .stage(PathPredicate::new(&self.path))
            .stage(FieldPredicate::new(&self.router.fields, &self.values));

        let candidates = pipeline.run(self.router.store.iter())?;
        trace!(path = %self.path, candidates = candidates.len(), "query evaluated");
        Ok(candidates)
    }

    /// Resolves the first candidate.
    pub fn dispatch(&self) -> Result<Option<ResolvedRoute<'r, A>>> {
        let Some(handle) = self.candidates()?.first() else {
            debug!(path = %self.path, "no route matched");
            return Ok(None);
        };

        let route = self.router.store.get(handle)?;
        let Some(params) = route.compiled.captures(&self.path) else {
            return Ok(None);
        };
        debug!(path = %self.path, route = %handle, name = route.name(), "route dispatched");
        Ok(Some(ResolvedRoute::new(route, params)))
    }
}
