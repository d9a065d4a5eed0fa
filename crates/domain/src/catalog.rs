/// One canonical resource declaration.
///
/// The catalog is configuration-as-code: the deployed list below is the
/// source of truth the store is forced into agreement with on every boot.
/// It is passed into the reconciler as a value so callers and tests can
/// supply alternative catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Unique resource name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl CatalogEntry {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Returns the resource catalog deployed with this build.
#[must_use]
pub fn builtin_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("project", "Project entity"),
        CatalogEntry::new("user", "User entity"),
        CatalogEntry::new("role", "Role entity"),
        CatalogEntry::new("policy", "Policy entity"),
        CatalogEntry::new("permission", "Permission entity"),
    ]
}

#[cfg(test)]
mod tests {
    use super::builtin_catalog;

    #[test]
    fn builtin_catalog_has_unique_names() {
        let catalog = builtin_catalog();
        let mut names: Vec<&str> = catalog.iter().map(|entry| entry.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }
}
