use std::collections::HashMap;

use crate::component::Component;
use crate::error::SceneError;

type Constructor = Box<dyn Fn() -> anyhow::Result<Box<dyn Component>>>;

/// Name-keyed component constructors.
///
/// Scene loaders build actors through the same public API as runtime code;
/// this map lets them turn a type name from a file into a fresh instance.
pub struct ComponentFactories {
    map: HashMap<String, Constructor>,
}

impl ComponentFactories {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Register `T::default()` under `name`, replacing any previous entry.
    pub fn register<T: Component + Default>(&mut self, name: impl Into<String>) {
        self.map.insert(
            name.into(),
            Box::new(|| -> anyhow::Result<Box<dyn Component>> { Ok(Box::new(T::default())) }),
        );
    }

    /// Register a fallible constructor under `name`.
    pub fn register_with<T, F>(&mut self, name: impl Into<String>, constructor: F)
    where
        T: Component,
        F: Fn() -> anyhow::Result<T> + 'static,
    {
        self.map.insert(
            name.into(),
            Box::new(move || -> anyhow::Result<Box<dyn Component>> {
                Ok(Box::new(constructor()?))
            }),
        );
    }

    /// Build a new instance of the component registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>, SceneError> {
        let constructor = self
            .map
            .get(name)
            .ok_or_else(|| SceneError::UnknownComponentType(name.to_string()))?;
        constructor().map_err(|e| SceneError::ConstructionFailed {
            type_name: name.to_string(),
            reason: format!("{e:#}"),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Remove a registration. Returns `true` if it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ComponentFactories {
    fn default() -> Self {
        Self::new()
    }
}
