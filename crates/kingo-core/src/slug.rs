use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Generate a URL-safe slug from a display name.
///
/// Lower-cases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and trims leading/trailing hyphens:
/// `"MERCEDES S-CLASS"` becomes `"mercedes-s-class"`.
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Known-correct vendor slugs keyed by vendor product ID.
///
/// The vendor's detail-page slugs do not always follow the display name
/// (product `1010` is listed as "MERCEDES S-CLASS" but lives at `tesla-y`),
/// so a configured mapping overrides [`generate_slug`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlugMap {
    #[serde(default)]
    slugs: BTreeMap<String, String>,
}

impl SlugMap {
    #[must_use]
    pub fn new(slugs: BTreeMap<String, String>) -> Self {
        Self { slugs }
    }

    #[must_use]
    pub fn get(&self, vendor_product_id: &str) -> Option<&str> {
        self.slugs.get(vendor_product_id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

impl FromIterator<(String, String)> for SlugMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            slugs: iter.into_iter().collect(),
        }
    }
}

/// Resolve the vendor detail-page slug for a product.
///
/// Order is fixed: explicit slug, then the [`SlugMap`] entry for
/// `vendor_product_id`, then a slug derived from `name`, then the raw ID.
/// Empty candidates are skipped.
#[must_use]
pub fn resolve_slug(
    explicit: Option<&str>,
    vendor_product_id: &str,
    name: Option<&str>,
    slug_map: &SlugMap,
) -> String {
    if let Some(slug) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return slug.to_string();
    }
    if let Some(slug) = slug_map.get(vendor_product_id) {
        return slug.to_string();
    }
    if let Some(derived) = name.map(generate_slug).filter(|s| !s.is_empty()) {
        return derived;
    }
    vendor_product_id.to_string()
}

/// Load and validate the slug mapping from a YAML file.
///
/// A missing file is not an error: the mapping is optional and an empty
/// [`SlugMap`] is returned.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_slug_map(path: &Path) -> Result<SlugMap, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SlugMap::default()),
        Err(e) => {
            return Err(ConfigError::SlugMapIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let slug_map: SlugMap = serde_yaml::from_str(&content)?;
    validate_slug_map(&slug_map)?;
    Ok(slug_map)
}

fn validate_slug_map(slug_map: &SlugMap) -> Result<(), ConfigError> {
    for (id, slug) in &slug_map.slugs {
        if id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "slug map product id must be non-empty".to_string(),
            ));
        }
        if generate_slug(slug) != *slug {
            return Err(ConfigError::Validation(format!(
                "slug '{slug}' for product '{id}' is not a valid slug; expected '{}'",
                generate_slug(slug)
            )));
        }
    }
    Ok(())
}
