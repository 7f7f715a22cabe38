//! Action registry built and validated once at startup.

use crate::action::{Action, RESIZE, Resize, THUMBNAIL, Thumbnail};
use std::collections::HashMap;
use std::sync::Arc;
use thumbs_core::{Error, Result};
use tracing::debug;

/// Immutable mapping from action name to implementation.
#[derive(Clone)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Registry with `thumbnail` and `resize`.
    pub fn standard() -> Self {
        let mut actions: HashMap<String, Arc<dyn Action>> = HashMap::new();
        actions.insert(THUMBNAIL.to_string(), Arc::new(Thumbnail));
        actions.insert(RESIZE.to_string(), Arc::new(Resize));
        Self { actions }
    }

    /// Look up an action. Unknown names are never dispatched.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Action>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| Error::DisallowedAction(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collects actions and validates them into an [`ActionRegistry`].
#[derive(Default)]
pub struct ActionRegistryBuilder {
    entries: Vec<(String, Arc<dyn Action>)>,
}

impl ActionRegistryBuilder {
    pub fn register(mut self, name: impl Into<String>, action: impl Action + 'static) -> Self {
        self.entries.push((name.into(), Arc::new(action)));
        self
    }

    pub fn with_standard_actions(self) -> Self {
        self.register(THUMBNAIL, Thumbnail).register(RESIZE, Resize)
    }

    pub fn build(self) -> Result<ActionRegistry> {
        if self.entries.is_empty() {
            return Err(Error::InvalidRegistry("no actions registered".into()));
        }

        let mut actions = HashMap::with_capacity(self.entries.len());
        for (name, action) in self.entries {
            validate_name(&name)?;
            if actions.insert(name.clone(), action).is_some() {
                return Err(Error::InvalidRegistry(format!("duplicate action: {}", name)));
            }
            debug!(action = %name, "Registered action");
        }

        Ok(ActionRegistry { actions })
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidRegistry(format!("invalid action name: {:?}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbs_core::Geometry;

    fn echo(source: &[u8], _geometry: Geometry) -> Result<Vec<u8>> {
        Ok(source.to_vec())
    }

    #[test]
    fn test_standard_registry() {
        let registry = ActionRegistry::standard();
        assert_eq!(registry.names(), vec!["resize", "thumbnail"]);
        assert!(registry.get("thumbnail").is_ok());
    }

    #[test]
    fn test_unknown_action_is_disallowed() {
        let registry = ActionRegistry::standard();
        assert!(matches!(
            registry.get("__class__"),
            Err(Error::DisallowedAction(_))
        ));
    }

    #[test]
    fn test_builder_registers_custom_actions() {
        let registry = ActionRegistry::builder()
            .with_standard_actions()
            .register("echo", echo)
            .build()
            .unwrap();

        let geometry = Geometry::new(Some(1), None).unwrap();
        let out = registry.get("echo").unwrap().apply(b"abc", geometry).unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let result = ActionRegistry::builder()
            .with_standard_actions()
            .register("resize", echo)
            .build();
        assert!(matches!(result, Err(Error::InvalidRegistry(_))));
    }

    #[test]
    fn test_builder_rejects_bad_names() {
        for name in ["", "Resize", "../x", "a b"] {
            let result = ActionRegistry::builder().register(name, echo).build();
            assert!(matches!(result, Err(Error::InvalidRegistry(_))), "{name}");
        }
    }

    #[test]
    fn test_builder_rejects_empty() {
        assert!(ActionRegistry::builder().build().is_err());
    }
}
