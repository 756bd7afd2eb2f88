//! Field validators
//!
//! A field is a named, caller-announced value (a role, a host, a locale...)
//! checked against every path candidate. Each [`FieldValidator`] receives the
//! announced value plus the route properties it declared bindings for, and
//! returns whether the route may serve the request.
//!
//! Bindings are checked against the route payload's static schema
//! ([`RouteProperties`]) when the router is built, and resolved again for
//! each candidate during matching.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::route::{RouteDefinition, RouteProperties};

/// Signature of a field validation callback.
pub type FieldCallback = dyn Fn(&str, &BoundProperties) -> bool + Send + Sync;

/// Route properties resolved for one validator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundProperties {
    values: BTreeMap<String, String>,
}

impl BoundProperties {
    /// Value of a bound property, `None` if the route leaves it unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named validation function with its property bindings.
#[derive(Clone)]
pub struct FieldValidator {
    name: String,
    binds: Vec<String>,
    callback: Arc<FieldCallback>,
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("name", &self.name)
            .field("binds", &self.binds)
            .finish()
    }
}

impl FieldValidator {
    /// Creates a validator for the field `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pathfinder::FieldValidator;
    ///
    /// let role = FieldValidator::new("role", |value, props| {
    ///     props.get("role").map_or(true, |required| required == value)
    /// })
    /// .bind("role");
    ///
    /// assert_eq!(role.binds(), ["role".to_string()]);
    /// ```
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str, &BoundProperties) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            binds: Vec::new(),
            callback: Arc::new(callback),
        }
    }

    /// Declares a dependency on a route property.
    pub fn bind(mut self, property: impl Into<String>) -> Self {
        let property = property.into();
        if !self.binds.contains(&property) {
            self.binds.push(property);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    /// Fails with [`ValidationError::UndeclaredProperty`] on the first
    /// binding that `exposes` rejects.
    pub fn check_bindings(&self, exposes: impl Fn(&str) -> bool) -> Result<(), ValidationError> {
        match self.binds.iter().find(|property| !exposes(property.as_str())) {
            Some(property) => Err(ValidationError::UndeclaredProperty {
                field: self.name.clone(),
                property: property.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Resolves this validator's bindings against a route.
    pub fn resolve<A: RouteProperties>(
        &self,
        route: &RouteDefinition<A>,
    ) -> Result<BoundProperties, ValidationError> {
        self.check_bindings(RouteDefinition::<A>::exposes)?;

        let values = self
            .binds
            .iter()
            .filter_map(|property| route.property(property).map(|value| (property.clone(), value)))
            .collect();
        Ok(BoundProperties { values })
    }

    /// Runs the callback for `value` against `route`.
    pub fn validate<A: RouteProperties>(
        &self,
        value: &str,
        route: &RouteDefinition<A>,
    ) -> Result<bool, ValidationError> {
        let properties = self.resolve(route)?;
        Ok((self.callback)(value, &properties))
    }
}

/// Validators keyed by field name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<FieldValidator>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validator, replacing any existing one with the same name.
    pub fn add(&mut self, validator: FieldValidator) -> &mut Self {
        match self.fields.iter_mut().find(|f| f.name == validator.name) {
            Some(existing) => *existing = validator,
            None => self.fields.push(validator),
        }
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&FieldValidator, ValidationError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ValidationError::UnknownFilterName(name.to_string()))
    }

    /// Merges `other` into this registry; its validators win on name clashes.
    pub fn import(&mut self, other: FieldRegistry) -> &mut Self {
        for validator in other.fields {
            self.add(validator);
        }
        self
    }

    /// Field names in registration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldValidator> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Binds every field to the route property of the same name, when the
    /// route schema exposes one.
    pub fn bind_same_named(&mut self, exposes: impl Fn(&str) -> bool) {
        for validator in &mut self.fields {
            if exposes(validator.name.as_str()) && !validator.binds.contains(&validator.name) {
                validator.binds.push(validator.name.clone());
            }
        }
    }

    /// Checks every validator's bindings against a route schema.
    pub fn check_bindings(&self, exposes: impl Fn(&str) -> bool) -> Result<(), ValidationError> {
        self.fields
            .iter()
            .try_for_each(|validator| validator.check_bindings(&exposes))
    }
}

/// Source of field values for a query.
///
/// Receives the registered field names. Every registered field needs an
/// announced value; a field left out rejects every route, so `()` only
/// matches routes when no fields are registered.
pub trait FieldAnnouncer {
    fn announce(&self, field_names: &[&str]) -> Vec<(String, String)>;
}

impl FieldAnnouncer for () {
    fn announce(&self, _field_names: &[&str]) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl<F> FieldAnnouncer for F
where
    F: Fn(&[&str]) -> Vec<(String, String)>,
{
    fn announce(&self, field_names: &[&str]) -> Vec<(String, String)> {
        self(field_names)
    }
}

impl FieldAnnouncer for HashMap<String, String> {
    fn announce(&self, _field_names: &[&str]) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl FieldAnnouncer for &HashMap<String, String> {
    fn announce(&self, field_names: &[&str]) -> Vec<(String, String)> {
        (*self).announce(field_names)
    }
}

impl FieldAnnouncer for Vec<(String, String)> {
    fn announce(&self, _field_names: &[&str]) -> Vec<(String, String)> {
        self.clone()
    }
}

impl<const N: usize> FieldAnnouncer for [(&str, &str); N] {
    fn announce(&self, _field_names: &[&str]) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
