//! Schema registry for looking up resource and property schemas.

use std::collections::HashMap;
use std::sync::Arc;

use shapekit_schema::Schema;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::provider::CloudProvider;
use crate::{aws_msk, google};

/// A registry of schema tables.
///
/// Schemas are keyed by name (`CfnCluster`, `CfnCluster.TlsProperty`).
/// Resource schemas can also be resolved by their resource type.
#[derive(Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    /// Resource type to the name of the schema it resolves to.
    resource_types: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            resource_types: HashMap::new(),
        }
    }

    /// A registry holding every built-in table.
    pub fn builtin() -> CatalogResult<Self> {
        let mut registry = Self::new();
        for schema in aws_msk::schemas().into_iter().chain(google::schemas()) {
            registry.register(schema)?;
        }
        debug!("Loaded {} built-in schemas", registry.len());
        Ok(registry)
    }

    /// Register a schema after validating it.
    ///
    /// Nested schemas that are not registered yet are registered too.
    /// A schema with an existing name replaces the previous one. A resource
    /// type resolves to the schema registered for it most recently.
    pub fn register(&mut self, schema: Arc<Schema>) -> CatalogResult<()> {
        schema.validate()?;
        self.register_nested(&schema);
        debug!("Registering schema: {}", schema.name());
        self.insert(schema, true);
        Ok(())
    }

    fn register_nested(&mut self, schema: &Arc<Schema>) {
        for nested in schema.nested_schemas() {
            if !self.schemas.contains_key(nested.name()) {
                self.register_nested(nested);
                self.insert(Arc::clone(nested), false);
            }
        }
    }

    fn insert(&mut self, schema: Arc<Schema>, claim_type: bool) {
        let name = schema.name().to_string();
        if let Some(previous) = self.schemas.insert(name.clone(), Arc::clone(&schema)) {
            if previous.resource_type() != schema.resource_type() {
                self.release_type(&previous);
            }
        }

        if let Some(resource_type) = schema.resource_type() {
            match self.resource_types.get(resource_type).cloned() {
                Some(owner) if owner == name => {}
                Some(owner) if !claim_type => {
                    debug!("{} keeps resource type {} over {}", owner, resource_type, name);
                }
                Some(owner) => {
                    warn!("Resource type {} now resolves to {} instead of {}", resource_type, name, owner);
                    self.resource_types.insert(resource_type.to_string(), name);
                }
                None => {
                    self.resource_types.insert(resource_type.to_string(), name);
                }
            }
        }
    }

    /// Drop `schema`'s claim on its resource type, handing the type to the
    /// remaining schema of that type with the smallest name.
    fn release_type(&mut self, schema: &Schema) {
        let Some(resource_type) = schema.resource_type() else {
            return;
        };
        if self.resource_types.get(resource_type).map(String::as_str) != Some(schema.name()) {
            return;
        }
        let successor = self
            .schemas
            .values()
            .filter(|s| s.resource_type() == Some(resource_type))
            .map(|s| s.name().to_string())
            .min();
        match successor {
            Some(name) => {
                self.resource_types.insert(resource_type.to_string(), name);
            }
            None => {
                self.resource_types.remove(resource_type);
            }
        }
    }

    /// Get a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Get a schema by name, returning an error if not found.
    pub fn get_required(&self, name: &str) -> CatalogResult<Arc<Schema>> {
        self.get(name)
            .ok_or_else(|| CatalogError::SchemaNotFound(name.to_string()))
    }

    /// Look a schema up by name or by resource type.
    pub fn resolve(&self, name_or_type: &str) -> CatalogResult<Arc<Schema>> {
        if let Some(schema) = self.get(name_or_type) {
            return Ok(schema);
        }
        self.resource_types
            .get(name_or_type)
            .and_then(|name| self.get(name))
            .ok_or_else(|| CatalogError::SchemaNotFound(name_or_type.to_string()))
    }

    /// Check if a schema is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// All registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Resource schemas, sorted by name.
    pub fn resources(&self) -> Vec<Arc<Schema>> {
        let mut resources: Vec<Arc<Schema>> = self
            .schemas
            .values()
            .filter(|s| s.is_resource())
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.name().cmp(b.name()));
        resources
    }

    /// Resource schemas belonging to `provider`.
    pub fn for_provider(&self, provider: CloudProvider) -> Vec<Arc<Schema>> {
        self.resources()
            .into_iter()
            .filter(|s| s.resource_type().and_then(CloudProvider::detect) == Some(provider))
            .collect()
    }

    /// Get the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Remove a schema from the registry.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Schema>> {
        debug!("Unregistering schema: {}", name);
        let removed = self.schemas.remove(name)?;
        self.release_type(&removed);
        Some(removed)
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.names())
            .finish()
    }
}
