//! Extension points and the contributions modules declare for them.
//!
//! A module ships an optional `META-INF/EXTENSIONS.MF` file. Every
//! blank-line separated block is one configuration element:
//!
//! ```text
//! point: org.example.ui.views
//! prefix: view
//! id: org.example.ui.console
//! label: Console
//!
//! point: org.example.ui.views
//! prefix: view
//! id: org.example.ui.outline
//! ```

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use modhost_manifest::{Dialect, parse_dialect};

use crate::error::{Error, Result};

pub const POINT_ATTRIBUTE: &str = "point";
pub const PREFIX_ATTRIBUTE: &str = "prefix";
pub const ID_ATTRIBUTE: &str = "id";

/// One contribution to an extension point.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfigurationElement {
    pub point: String,
    /// Element kind, such as `view` or `command`.
    pub prefix: String,
    /// Every attribute except `point` and `prefix`; always holds `id`.
    pub attributes: BTreeMap<String, String>,
    /// Symbolic name of the module that declared the element.
    pub contributor: String,
}

impl ConfigurationElement {
    pub fn id(&self) -> &str {
        self.attribute(ID_ATTRIBUTE).unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parse one module's extension file.
///
/// Any malformed element rejects the whole file.
pub fn parse_contributions(contributor: &str, text: &str) -> Result<Vec<ConfigurationElement>> {
    let document =
        parse_dialect(text, Dialect::Extensions).map_err(|source| Error::InvalidExtensions {
            contributor: contributor.to_string(),
            source,
        })?;
    let Some(document) = document else {
        return Ok(Vec::new());
    };

    let mut elements = Vec::new();
    for (index, block) in document.blocks().iter().enumerate() {
        let required = |attribute: &'static str| {
            block
                .get(attribute)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::MissingAttribute {
                    contributor: contributor.to_string(),
                    element: index + 1,
                    attribute,
                })
        };
        let point = required(POINT_ATTRIBUTE)?;
        let prefix = required(PREFIX_ATTRIBUTE)?;
        required(ID_ATTRIBUTE)?;

        for attribute in [POINT_ATTRIBUTE, PREFIX_ATTRIBUTE, ID_ATTRIBUTE] {
            let count = block
                .keys()
                .filter(|key| key.eq_ignore_ascii_case(attribute))
                .count();
            if count > 1 {
                return Err(Error::DuplicateAttribute {
                    contributor: contributor.to_string(),
                    element: index + 1,
                    attribute,
                });
            }
        }

        let mut attributes = BTreeMap::new();
        for chunk in block.chunks() {
            let key = chunk.key();
            if key.eq_ignore_ascii_case(POINT_ATTRIBUTE)
                || key.eq_ignore_ascii_case(PREFIX_ATTRIBUTE)
            {
                continue;
            }
            let key = if key.eq_ignore_ascii_case(ID_ATTRIBUTE) {
                ID_ATTRIBUTE.to_string()
            } else {
                key.to_string()
            };
            attributes
                .entry(key)
                .or_insert_with(|| chunk.value().to_string());
        }

        elements.push(ConfigurationElement {
            point,
            prefix,
            attributes,
            contributor: contributor.to_string(),
        });
    }
    Ok(elements)
}

/// All configuration elements contributed by loaded modules.
///
/// Shared as `Arc<ExtensionRegistry>` between the runtime and activators.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    elements: RwLock<Vec<ConfigurationElement>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the elements declared in `text` by `contributor`.
    ///
    /// Earlier contributions from the same module are replaced. On error
    /// nothing from `text` is registered. Returns the number of elements added.
    pub fn add_contributions(&self, contributor: &str, text: &str) -> Result<usize> {
        let parsed = parse_contributions(contributor, text)?;
        let count = parsed.len();

        let mut elements = self.write();
        elements.retain(|e| e.contributor != contributor);
        elements.extend(parsed);
        drop(elements);

        tracing::debug!(module = contributor, count, "registered extension contributions");
        Ok(count)
    }

    /// Every element contributed to `point`, in contribution order.
    pub fn configuration_elements(&self, point: &str) -> Vec<ConfigurationElement> {
        self.read()
            .iter()
            .filter(|e| e.point == point)
            .cloned()
            .collect()
    }

    /// Extension point ids with at least one contribution, sorted.
    pub fn extension_points(&self) -> Vec<String> {
        let mut points: Vec<String> = self.read().iter().map(|e| e.point.clone()).collect();
        points.sort();
        points.dedup();
        points
    }

    pub fn contributions_of(&self, contributor: &str) -> Vec<ConfigurationElement> {
        self.read()
            .iter()
            .filter(|e| e.contributor == contributor)
            .cloned()
            .collect()
    }

    /// Drop one module's contributions. Returns how many were removed.
    pub fn remove_contributions(&self, contributor: &str) -> usize {
        let mut elements = self.write();
        let before = elements.len();
        elements.retain(|e| e.contributor != contributor);
        before - elements.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<ConfigurationElement>> {
        self.elements.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<ConfigurationElement>> {
        self.elements.write().unwrap_or_else(PoisonError::into_inner)
    }
}
