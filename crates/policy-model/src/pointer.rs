use serde::{Deserialize, Serialize};

/// A slash-delimited resource path, e.g. `/features/lamp/properties/on`.
///
/// The pointer is an ordered list of non-empty segments; `/` (no segments)
/// addresses the root of the entity. Parsing is lenient about a missing
/// leading slash and collapses empty segments, so `"features/lamp"`,
/// `"/features/lamp"` and `"/features//lamp"` all denote the same pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourcePointer {
    segments: Vec<String>,
}

impl ResourcePointer {
    /// The root pointer `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer from its slash-delimited form.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// True when the pointer addresses the entity root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate the segments root-first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// A new pointer with the sub-path `path` appended. The argument is
    /// parsed like [`ResourcePointer::parse`], so it may span several
    /// segments; to append exactly one opaque segment use
    /// [`ResourcePointer::child`].
    pub fn joined(&self, path: &str) -> ResourcePointer {
        let mut segments = self.segments.clone();
        segments.extend(path.split('/').filter(|s| !s.is_empty()).map(str::to_owned));
        ResourcePointer { segments }
    }

    /// A new pointer with `name` appended as one opaque segment.
    ///
    /// The name is never split: a name containing `/` or the empty string
    /// cannot form a segment and yields `None`.
    pub fn child(&self, name: &str) -> Option<ResourcePointer> {
        if name.is_empty() || name.contains('/') {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Some(ResourcePointer { segments })
    }
}

impl std::fmt::Display for ResourcePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ResourcePointer {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for ResourcePointer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourcePointer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
