use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pointer::ResourcePointer;

/// Error raised when a resource key string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceKeyError {
    /// The key is missing the `type:path` separator.
    #[error("resource key '{0}' is missing the ':' separating type from path")]
    MissingSeparator(String),
    /// The type portion before the `:` is empty.
    #[error("resource key '{0}' has an empty resource type")]
    EmptyType(String),
}

/// Identifies an addressable sub-resource of an entity: a resource type plus
/// a path within entities of that type, e.g. `thing:/features/lamp`.
///
/// Equality and ordering are by `(resource_type, path)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    resource_type: String,
    path: ResourcePointer,
}

impl ResourceKey {
    /// Build a key from an already-split type and path.
    pub fn new(resource_type: impl Into<String>, path: ResourcePointer) -> Result<Self, ResourceKeyError> {
        let resource_type = resource_type.into();
        if resource_type.is_empty() {
            return Err(ResourceKeyError::EmptyType(format!(":{path}")));
        }
        Ok(Self { resource_type, path })
    }

    /// Parse a `type:path` string such as `thing:/features/lamp`.
    pub fn parse(value: &str) -> Result<Self, ResourceKeyError> {
        let (resource_type, path) = value
            .split_once(':')
            .ok_or_else(|| ResourceKeyError::MissingSeparator(value.to_string()))?;
        if resource_type.is_empty() {
            return Err(ResourceKeyError::EmptyType(value.to_string()));
        }
        Ok(Self {
            resource_type: resource_type.to_string(),
            path: ResourcePointer::parse(path),
        })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn path(&self) -> &ResourcePointer {
        &self.path
    }

    /// A key of the same type addressing the field `name` as one opaque
    /// segment directly below this key's path, or `None` when the name
    /// cannot form a single path segment (empty, or containing `/`).
    pub fn child(&self, name: &str) -> Option<ResourceKey> {
        Some(ResourceKey {
            resource_type: self.resource_type.clone(),
            path: self.path.child(name)?,
        })
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.path)
    }
}

impl std::str::FromStr for ResourceKey {
    type Err = ResourceKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
