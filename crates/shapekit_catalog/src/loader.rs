//! Loading schema tables from definition files.
//!
//! A definition file lists schemas and their fields:
//!
//! ```yaml
//! schemas:
//!   - name: TopicConfig
//!     resource_type: Custom::KafkaTopic
//!     fields:
//!       - name: partitions
//!         type: number
//!         required: true
//!       - name: retention
//!         type: resolvable<RetentionConfig>
//! ```
//!
//! Field types are written as `string`, `number`, `boolean`, `any`,
//! `enum<A,B>`, `list<T>`, `map<T>`, `resolvable<T>`, or the name of another
//! schema, defined in the same batch or already registered.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use shapekit_schema::{FieldSchema, FieldType, Schema};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CatalogError, CatalogResult};
use crate::registry::SchemaRegistry;

/// Serialization format of a definition or document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Deserialize `content` in this format.
    pub fn parse<T: serde::de::DeserializeOwned>(&self, content: &str) -> CatalogResult<T> {
        let parsed = match self {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        };
        Ok(parsed)
    }
}

/// Contents of one definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parsed field type expression, before schema names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    String,
    Number,
    Boolean,
    Any,
    Enum(Vec<String>),
    List(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    Resolvable(Box<TypeExpr>),
    Named(String),
}

fn generic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-z]+)\s*<(.*)>$").expect("generic pattern is valid"))
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").expect("name pattern is valid"))
}

/// Parse a type expression such as `list<resolvable<VpcConfig>>`.
pub fn parse_type(expr: &str) -> Result<TypeExpr, String> {
    let expr = expr.trim();
    match expr {
        "string" => return Ok(TypeExpr::String),
        "number" => return Ok(TypeExpr::Number),
        "boolean" | "bool" => return Ok(TypeExpr::Boolean),
        "any" => return Ok(TypeExpr::Any),
        _ => {}
    }

    if let Some(caps) = generic_pattern().captures(expr) {
        let inner = caps[2].trim();
        return match &caps[1] {
            "list" => Ok(TypeExpr::List(Box::new(parse_type(inner)?))),
            "map" => Ok(TypeExpr::Map(Box::new(parse_type(inner)?))),
            "resolvable" => Ok(TypeExpr::Resolvable(Box::new(parse_type(inner)?))),
            "enum" => {
                let values: Vec<String> = inner
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                if values.is_empty() {
                    Err(format!("enum without values in '{}'", expr))
                } else {
                    Ok(TypeExpr::Enum(values))
                }
            }
            other => Err(format!("unknown type constructor '{}'", other)),
        };
    }

    if name_pattern().is_match(expr) {
        Ok(TypeExpr::Named(expr.to_string()))
    } else {
        Err(format!("invalid type expression '{}'", expr))
    }
}

/// Loader for schema definition files.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load a definition file or every definition file under a directory.
    ///
    /// Returns the names of the schemas that were registered.
    pub fn load_path(path: impl AsRef<Path>, registry: &mut SchemaRegistry) -> CatalogResult<Vec<String>> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_dir(path, registry)
        } else {
            Self::load_file(path, registry)
        }
    }

    /// Load one definition file.
    pub fn load_file(path: impl AsRef<Path>, registry: &mut SchemaRegistry) -> CatalogResult<Vec<String>> {
        let path = path.as_ref();
        let file = Self::read_file(path)?;
        Self::load_definitions(&file.schemas, path, registry)
    }

    /// Load all definition files under `dir` as one batch.
    ///
    /// Schemas may refer to schemas defined in other files of the same tree.
    pub fn load_dir(dir: impl AsRef<Path>, registry: &mut SchemaRegistry) -> CatalogResult<Vec<String>> {
        let dir = dir.as_ref();
        let mut definitions = Vec::new();

        for path in Self::definition_files(dir) {
            let file = Self::read_file(&path)?;
            definitions.extend(file.schemas);
        }

        Self::load_definitions(&definitions, dir, registry)
    }

    /// Definition files under `dir`, in path order.
    pub fn definition_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && FileFormat::from_path(p).is_some())
            .collect();
        files.sort();
        files
    }

    /// Read and deserialize a definition file.
    pub fn read_file(path: &Path) -> CatalogResult<SchemaFile> {
        let format = FileFormat::from_path(path)
            .ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
        debug!("Reading schema definitions from {:?}", path);

        let content = fs::read_to_string(path)?;
        format.parse(&content)
    }

    /// Resolve and register a batch of definitions.
    ///
    /// Nothing is registered unless the whole batch resolves.
    pub fn load_definitions(
        definitions: &[SchemaDefinition],
        origin: &Path,
        registry: &mut SchemaRegistry,
    ) -> CatalogResult<Vec<String>> {
        let mut by_name: HashMap<&str, &SchemaDefinition> = HashMap::new();
        for definition in definitions {
            if by_name.insert(definition.name.as_str(), definition).is_some() {
                return Err(CatalogError::InvalidDefinition {
                    path: origin.to_path_buf(),
                    message: format!("schema '{}' is defined more than once", definition.name),
                });
            }
        }

        let built = {
            let mut resolver = Resolver {
                definitions: by_name,
                registry,
                built: HashMap::new(),
                stack: Vec::new(),
                origin,
            };
            definitions
                .iter()
                .map(|d| resolver.build(&d.name))
                .collect::<CatalogResult<Vec<_>>>()?
        };

        for schema in &built {
            schema.validate()?;
        }

        let mut names = Vec::with_capacity(built.len());
        for schema in built {
            names.push(schema.name().to_string());
            registry.register(schema)?;
        }

        info!("Loaded {} schema(s) from {:?}", names.len(), origin);
        Ok(names)
    }
}

struct Resolver<'a> {
    definitions: HashMap<&'a str, &'a SchemaDefinition>,
    registry: &'a SchemaRegistry,
    built: HashMap<String, Arc<Schema>>,
    stack: Vec<String>,
    origin: &'a Path,
}

impl<'a> Resolver<'a> {
    fn build(&mut self, name: &str) -> CatalogResult<Arc<Schema>> {
        if let Some(schema) = self.built.get(name) {
            return Ok(Arc::clone(schema));
        }
        if let Some(start) = self.stack.iter().position(|n| n == name) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(name.to_string());
            return Err(CatalogError::CyclicDefinition(chain.join(" -> ")));
        }
        let definition = self
            .definitions
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::SchemaNotFound(name.to_string()))?;

        self.stack.push(name.to_string());

        let mut schema = match &definition.resource_type {
            Some(resource_type) => Schema::resource(&definition.name, resource_type),
            None => Schema::new(&definition.name),
        };
        if let Some(description) = &definition.description {
            schema = schema.with_description(description);
        }

        for field in &definition.fields {
            let expr = parse_type(&field.type_expr).map_err(|message| CatalogError::InvalidDefinition {
                path: self.origin.to_path_buf(),
                message: format!("{}.{}: {}", definition.name, field.name, message),
            })?;

            let mut field_schema = FieldSchema::new(&field.name, self.resolve(&definition.name, &expr)?);
            if field.required {
                field_schema = field_schema.required();
            }
            if let Some(wire_name) = &field.wire_name {
                field_schema = field_schema.with_wire_name(wire_name);
            }
            if let Some(description) = &field.description {
                field_schema = field_schema.with_description(description);
            }
            schema = schema.field(field_schema);
        }

        self.stack.pop();

        let schema = schema.into_shared();
        self.built.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    fn resolve(&mut self, owner: &str, expr: &TypeExpr) -> CatalogResult<FieldType> {
        let field_type = match expr {
            TypeExpr::String => FieldType::String,
            TypeExpr::Number => FieldType::Number,
            TypeExpr::Boolean => FieldType::Boolean,
            TypeExpr::Any => FieldType::Any,
            TypeExpr::Enum(values) => FieldType::one_of(values.iter().cloned()),
            TypeExpr::List(inner) => FieldType::list(self.resolve(owner, inner)?),
            TypeExpr::Map(inner) => FieldType::map(self.resolve(owner, inner)?),
            TypeExpr::Resolvable(inner) => FieldType::resolvable(self.resolve(owner, inner)?),
            TypeExpr::Named(name) => {
                if self.definitions.contains_key(name.as_str()) {
                    FieldType::nested(self.build(name)?)
                } else if let Some(schema) = self.registry.get(name) {
                    FieldType::nested(schema)
                } else {
                    return Err(CatalogError::UnresolvedType {
                        schema: owner.to_string(),
                        type_name: name.clone(),
                    });
                }
            }
        };
        Ok(field_type)
    }
}
