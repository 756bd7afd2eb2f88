//! Route store: handle → (definition, compiled pattern), in registration order.

use std::collections::HashMap;

use super::{RouteDefinition, RouteHandle};
use crate::error::{Result, RouterError};
use crate::pattern::CompiledPattern;

/// A registered route: what the caller defined plus what the compiler built.
#[derive(Debug, Clone)]
pub struct StoredRoute<A> {
    pub definition: RouteDefinition<A>,
    pub compiled: CompiledPattern,
}

impl<A> StoredRoute<A> {
    pub fn handle(&self) -> RouteHandle {
        self.definition.handle()
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }
}

/// Ordered store of routes keyed by handle.
///
/// A handle is stored at most once; routes are never removed.
#[derive(Debug, Clone)]
pub struct RouteStore<A> {
    entries: Vec<StoredRoute<A>>,
    index: HashMap<RouteHandle, usize>,
}

impl<A> Default for RouteStore<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<A> RouteStore<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a route, failing with [`RouterError::Conflict`] if its handle
    /// is already present.
    pub fn add(&mut self, definition: RouteDefinition<A>, compiled: CompiledPattern) -> Result<()> {
        let handle = definition.handle();
        if self.index.contains_key(&handle) {
            return Err(RouterError::Conflict(handle));
        }

        self.index.insert(handle, self.entries.len());
        self.entries.push(StoredRoute {
            definition,
            compiled,
        });
        Ok(())
    }

    pub fn contains(&self, handle: RouteHandle) -> bool {
        self.index.contains_key(&handle)
    }

    pub fn get(&self, handle: RouteHandle) -> Result<&StoredRoute<A>> {
        self.index
            .get(&handle)
            .map(|&i| &self.entries[i])
            .ok_or(RouterError::UnknownRoute(handle))
    }

    pub fn get_mut(&mut self, handle: RouteHandle) -> Result<&mut StoredRoute<A>> {
        match self.index.get(&handle) {
            Some(&i) => Ok(&mut self.entries[i]),
            None => Err(RouterError::UnknownRoute(handle)),
        }
    }

    /// Replaces the compiled data of an existing route.
    pub fn set_compiled(&mut self, handle: RouteHandle, compiled: CompiledPattern) -> Result<()> {
        self.get_mut(handle)?.compiled = compiled;
        Ok(())
    }

    /// Routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredRoute<A>> {
        self.entries.iter()
    }

    /// Routes carrying `name`, in registration order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StoredRoute<A>> {
        self.entries.iter().filter(move |route| route.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;
    use crate::tag::TagRegistry;

    fn compiled(pattern: &str) -> CompiledPattern {
        compile(pattern, &TagRegistry::new()).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut store = RouteStore::new();
        let route = RouteDefinition::new("home");
        let handle = route.handle();

        store.add(route, compiled("/")).unwrap();
        assert!(store.contains(handle));
        assert_eq!(store.get(handle).unwrap().compiled.pattern(), "/");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_handle_conflicts() {
        let mut store = RouteStore::new();
        let route = RouteDefinition::new("home");

        store.add(route.clone(), compiled("/")).unwrap();
        let err = store.add(route, compiled("/other")).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_handle_is_not_found() {
        let mut store: RouteStore<()> = RouteStore::new();
        let stray = RouteDefinition::new(()).handle();

        assert!(store.get(stray).unwrap_err().is_not_found());
        assert!(store.set_compiled(stray, compiled("/")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_compiled_replaces_data() {
        let mut store = RouteStore::new();
        let route = RouteDefinition::new(());
        let handle = route.handle();
        store.add(route, compiled("/old")).unwrap();

        store.set_compiled(handle, compiled("/new/{id}")).unwrap();
        assert_eq!(store.get(handle).unwrap().compiled.pattern(), "/new/{id}");
    }

    #[test]
    fn test_iteration_and_name_lookup_keep_order() {
        let mut store = RouteStore::new();
        let first = RouteDefinition::new(1).with_name("dup");
        let second = RouteDefinition::new(2).with_name("other");
        let third = RouteDefinition::new(3).with_name("dup");
        store.add(first, compiled("/a")).unwrap();
        store.add(second, compiled("/b")).unwrap();
        store.add(third, compiled("/c")).unwrap();

        let patterns: Vec<_> = store.iter().map(|r| r.compiled.pattern()).collect();
        assert_eq!(patterns, vec!["/a", "/b", "/c"]);

        let dups: Vec<_> = store.find_by_name("dup").map(|r| *r.definition.abstraction()).collect();
        assert_eq!(dups, vec![1, 3]);
    }
}
