//! Modifier curve loader.

use std::collections::BTreeMap;
use std::path::Path;

use gameplay_core::{Curve, Tag};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Curve catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveCatalog {
    pub curves: BTreeMap<Tag, Curve>,
}

/// Loader for `SetByData` curves from RON files.
pub struct CurveLoader;

impl CurveLoader {
    /// Load a curve catalog from a RON file.
    ///
    /// Keys are re-sorted by time and non-finite keys dropped. A curve left
    /// without keys is an error.
    pub fn load(path: &Path) -> LoadResult<BTreeMap<Tag, Curve>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BTreeMap<Tag, Curve>> {
        let catalog: CurveCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse curve catalog RON: {}", e))?;

        let mut curves = BTreeMap::new();
        for (tag, curve) in catalog.curves {
            if !tag.is_valid() {
                anyhow::bail!("Curve with an empty tag");
            }
            let curve = Curve::new(curve.keys().to_vec());
            if curve.keys().is_empty() {
                anyhow::bail!("Curve {} has no usable keys", tag);
            }
            curves.insert(tag, curve);
        }
        Ok(curves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_keys() {
        let content = r#"(
            curves: {
                "Modifier.Curve.Bell": (keys: [(1.0, 0.0), (0.0, 0.0), (0.5, 1.0)]),
            },
        )"#;
        let curves = CurveLoader::parse(content).unwrap();
        let bell = &curves[&Tag::new("Modifier.Curve.Bell")];
        assert_eq!(bell.keys(), &[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        assert_eq!(bell.evaluate(0.25), 0.5);
    }

    #[test]
    fn empty_curve_is_rejected() {
        let content = r#"(curves: { "Modifier.Curve.Empty": (keys: []) })"#;
        assert!(CurveLoader::parse(content).is_err());
    }
}
