//! Match pipeline
//!
//! Narrows the registered routes to the candidates for one query. Stages run
//! in order over the routes in registration order; a route survives only if
//! every stage accepts it.

use std::collections::HashMap;

use tracing::trace;

use crate::error::Result;
use crate::field::FieldRegistry;
use crate::route::{RouteHandle, RouteProperties, StoredRoute};

/// One stage of the match pipeline.
pub trait RoutePredicate<A> {
    /// Short label used in trace output.
    fn label(&self) -> &'static str;

    fn accept(&self, route: &StoredRoute<A>) -> Result<bool>;
}

/// Full, anchored match of the compiled pattern against a path.
#[derive(Debug, Clone, Copy)]
pub struct PathPredicate<'p> {
    path: &'p str,
}

impl<'p> PathPredicate<'p> {
    pub fn new(path: &'p str) -> Self {
        Self { path }
    }
}

impl<A> RoutePredicate<A> for PathPredicate<'_> {
    fn label(&self) -> &'static str {
        "path"
    }

    fn accept(&self, route: &StoredRoute<A>) -> Result<bool> {
        Ok(route.compiled.is_match(self.path))
    }
}

/// Runs every registered field validator against the announced values.
///
/// A validator with no announced value rejects the route.
#[derive(Debug, Clone, Copy)]
pub struct FieldPredicate<'q> {
    fields: &'q FieldRegistry,
    values: &'q HashMap<String, String>,
}

impl<'q> FieldPredicate<'q> {
    pub fn new(fields: &'q FieldRegistry, values: &'q HashMap<String, String>) -> Self {
        Self { fields, values }
    }
}

impl<A: RouteProperties> RoutePredicate<A> for FieldPredicate<'_> {
    fn label(&self) -> &'static str {
        "field"
    }

    fn accept(&self, route: &StoredRoute<A>) -> Result<bool> {
        for validator in self.fields.iter() {
            let Some(value) = self.values.get(validator.name()) else {
                trace!(route = %route.handle(), field = validator.name(), "field not announced");
                return Ok(false);
            };
            if !validator.validate(value, &route.definition)? {
                trace!(route = %route.handle(), field = validator.name(), value = %value, "field rejected");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Exact match on the route name.
#[derive(Debug, Clone, Copy)]
pub struct NamePredicate<'n> {
    name: &'n str,
}

impl<'n> NamePredicate<'n> {
    pub fn new(name: &'n str) -> Self {
        Self { name }
    }
}

impl<A> RoutePredicate<A> for NamePredicate<'_> {
    fn label(&self) -> &'static str {
        "name"
    }

    fn accept(&self, route: &StoredRoute<A>) -> Result<bool> {
        Ok(route.name() == self.name)
    }
}

/// Ordered chain of predicates.
pub struct MatchPipeline<'q, A> {
    stages: Vec<Box<dyn RoutePredicate<A> + 'q>>,
}

impl<A> Default for MatchPipeline<'_, A> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<'q, A> MatchPipeline<'q, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage; stages run in the order they were added.
    pub fn stage(mut self, predicate: impl RoutePredicate<A> + 'q) -> Self {
        self.stages.push(Box::new(predicate));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Keeps the routes every stage accepts, preserving their order.
    pub fn run<'r>(&self, routes: impl IntoIterator<Item = &'r StoredRoute<A>>) -> Result<MatchCandidateSet>
    where
        A: 'r,
    {
        let mut handles = Vec::new();
        'routes: for route in routes {
            for stage in &self.stages {
                if !stage.accept(route)? {
                    trace!(route = %route.handle(), stage = stage.label(), "candidate dropped");
                    continue 'routes;
                }
            }
            handles.push(route.handle());
        }
        Ok(MatchCandidateSet { handles })
    }
}

/// Handles of the routes that survived a query, in registration order.
///
/// The first handle is the one dispatch resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCandidateSet {
    handles: Vec<RouteHandle>,
}

impl MatchCandidateSet {
    pub fn first(&self) -> Option<RouteHandle> {
        self.handles.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = RouteHandle> + '_ {
        self.handles.iter().copied()
    }

    pub fn contains(&self, handle: RouteHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn into_vec(self) -> Vec<RouteHandle> {
        self.handles
    }
}

impl IntoIterator for MatchCandidateSet {
    type Item = RouteHandle;
    type IntoIter = std::vec::IntoIter<RouteHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}
