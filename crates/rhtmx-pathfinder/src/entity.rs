//! The result of a successful dispatch.

use std::collections::{BTreeMap, HashMap};

use crate::pattern::CompiledPattern;
use crate::route::{Hook, RouteDefinition, RouteHandle, StoredRoute};

/// A matched route together with the values extracted from the path.
#[derive(Debug, Clone)]
pub struct ResolvedRoute<'r, A> {
    route: &'r StoredRoute<A>,
    params: Vec<(String, String)>,
}

impl<'r, A> ResolvedRoute<'r, A> {
    pub(crate) fn new(route: &'r StoredRoute<A>, params: Vec<(String, String)>) -> Self {
        Self { route, params }
    }

    pub fn handle(&self) -> RouteHandle {
        self.route.handle()
    }

    pub fn name(&self) -> &'r str {
        self.route.name()
    }

    pub fn abstraction(&self) -> &'r A {
        self.route.definition.abstraction()
    }

    pub fn before(&self) -> &'r [Hook<A>] {
        self.route.definition.before()
    }

    pub fn after(&self) -> &'r [Hook<A>] {
        self.route.definition.after()
    }

    /// Extracted values in placeholder declaration order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn params_map(&self) -> HashMap<String, String> {
        self.params.iter().cloned().collect()
    }

    pub fn replacer(&self) -> &'r BTreeMap<String, String> {
        self.route.compiled.replacer()
    }

    pub fn compiled(&self) -> &'r CompiledPattern {
        &self.route.compiled
    }

    pub fn definition(&self) -> &'r RouteDefinition<A> {
        &self.route.definition
    }
}
