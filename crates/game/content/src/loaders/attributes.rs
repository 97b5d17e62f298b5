//! Attribute set loader.
//!
//! An attribute set lists the attributes every spawned entity starts with.

use std::collections::BTreeMap;
use std::path::Path;

use gameplay_core::{AttributeInit, Tag};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Attribute set structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeSet {
    pub attributes: BTreeMap<Tag, AttributeInit>,
}

/// Loader for attribute sets from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Load an attribute set from a RON file, in tag order.
    pub fn load(path: &Path) -> LoadResult<Vec<(Tag, AttributeInit)>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<(Tag, AttributeInit)>> {
        let set: AttributeSet = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute set RON: {}", e))?;

        if let Some((tag, init)) = set
            .attributes
            .iter()
            .find(|(tag, init)| !tag.is_valid() || !init.initial_value.is_finite())
        {
            anyhow::bail!(
                "Invalid attribute '{}' with initial value {}",
                tag,
                init.initial_value
            );
        }
        Ok(set.attributes.into_iter().collect())
    }
}
