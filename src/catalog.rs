//! Region catalog data model.
//!
//! A [`Catalog`] maps region id to [`Region`]. It deserializes directly from
//! one page of the upstream `/regions` listing (a JSON object keyed by id) and
//! grows page by page through [`Catalog::merge`].

use std::collections::HashMap;
use std::collections::hash_map;

use serde::{Deserialize, Deserializer, Serialize};

/// Reference to an ancestor region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ancestor {
    /// Ancestor region id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Ancestor region type (e.g. `country`, `continent`).
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

/// A geographic region as served by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Region id, unique across the catalog.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Region type (e.g. `city`, `province_state`, `country`).
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    /// Short display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Fully qualified display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name_full: String,
    /// Upstream descriptor.
    #[serde(deserialize_with = "null_as_default")]
    pub descriptor: String,
    /// Ancestors, nearest first as delivered upstream.
    #[serde(deserialize_with = "null_as_default")]
    pub ancestors: Vec<Ancestor>,
    /// Descendant ids grouped by descendant type.
    #[serde(alias = "Descendants", deserialize_with = "null_as_default")]
    pub descendants: HashMap<String, Vec<String>>,
}

/// Accumulated mapping of region id to [`Region`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    regions: HashMap<String, Region>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges every entry of `page` into this catalog.
    ///
    /// Ids already present are overwritten (last write wins).
    pub fn merge(&mut self, page: Catalog) {
        self.regions.extend(page.regions);
    }

    /// Inserts a single region keyed by its own id.
    pub fn insert(&mut self, region: Region) -> Option<Region> {
        self.regions.insert(region.id.clone(), region)
    }

    /// Looks up a region by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Number of regions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns true when the catalog holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl FromIterator<Region> for Catalog {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for region in iter {
            catalog.insert(region);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a String, &'a Region);
    type IntoIter = hash_map::Iter<'a, String, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

// Upstream may send `null` for any field; it decodes as the empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
