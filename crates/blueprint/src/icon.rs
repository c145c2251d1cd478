//! Category to glyph resolution.
//!
//! Nodes carry a free-form [`Category`]; the renderer asks an [`IconCatalog`]
//! for the image that represents it. Categories without an image fall back to
//! a plain rounded box and are reported once as [`Warning::IconNotFound`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, warn};

use blueprint_core::Category;

use crate::warning::Warning;

const ICON_EXTENSION: &str = "png";

/// Maps category keys to glyph image files.
pub trait IconCatalog: Send + Sync {
    /// Returns the image for `category`, if one is known.
    fn lookup(&self, category: &Category) -> Option<PathBuf>;
}

/// Looks icons up in a directory tree mirroring the category segments.
///
/// `aws.compute.ec2` resolves to `<root>/aws/compute/ec2.png` when that file
/// exists.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    /// Creates a catalog rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidate(&self, category: &Category) -> Option<PathBuf> {
        let mut segments = category.segments().peekable();
        segments.peek()?;

        let mut path = self.root.clone();
        for segment in segments {
            path.push(segment);
        }
        path.set_extension(ICON_EXTENSION);
        Some(path)
    }
}

impl IconCatalog for DirectoryCatalog {
    fn lookup(&self, category: &Category) -> Option<PathBuf> {
        self.candidate(category).filter(|path| path.is_file())
    }
}

/// An explicit category to image map.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    icons: HashMap<Category, PathBuf>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an icon, builder style.
    pub fn with(mut self, category: impl Into<Category>, path: impl Into<PathBuf>) -> Self {
        self.insert(category, path);
        self
    }

    /// Adds or replaces an icon.
    pub fn insert(&mut self, category: impl Into<Category>, path: impl Into<PathBuf>) {
        self.icons.insert(category.into(), path.into());
    }
}

impl IconCatalog for StaticCatalog {
    fn lookup(&self, category: &Category) -> Option<PathBuf> {
        self.icons.get(category).cloned()
    }
}

impl<C, P> FromIterator<(C, P)> for StaticCatalog
where
    C: Into<Category>,
    P: Into<PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (C, P)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (category, path) in iter {
            catalog.insert(category, path);
        }
        catalog
    }
}

/// Visual representation chosen for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Glyph {
    /// An image file.
    Image(PathBuf),
    /// No image is known; draw a labeled box.
    Fallback,
}

/// Resolves categories for one render, caching results and collecting
/// warnings.
pub struct Glyphs<'a> {
    catalog: &'a dyn IconCatalog,
    resolved: IndexMap<Category, Option<PathBuf>>,
}

impl<'a> Glyphs<'a> {
    pub fn new(catalog: &'a dyn IconCatalog) -> Self {
        Self {
            catalog,
            resolved: IndexMap::new(),
        }
    }

    /// Returns the glyph for `category`.
    pub fn resolve(&mut self, category: &Category) -> Glyph {
        let catalog = self.catalog;
        let path = self
            .resolved
            .entry(category.clone())
            .or_insert_with(|| {
                let path = catalog.lookup(category);
                match &path {
                    Some(path) => debug!(category:% = category, path:? = path; "Resolved icon"),
                    None => warn!(category:% = category; "No icon found, using fallback glyph"),
                }
                path
            });

        match path {
            Some(path) => Glyph::Image(path.clone()),
            None => Glyph::Fallback,
        }
    }

    /// One [`Warning::IconNotFound`] per unresolved category, in first-seen
    /// order.
    pub fn warnings(&self) -> Vec<Warning> {
        self.resolved
            .iter()
            .filter(|(_, path)| path.is_none())
            .map(|(category, _)| Warning::IconNotFound {
                category: category.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_directory_catalog_maps_segments_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("aws").join("compute").join("ec2.png");
        fs::create_dir_all(icon.parent().unwrap()).unwrap();
        fs::write(&icon, b"png").unwrap();

        let catalog = DirectoryCatalog::new(dir.path());

        assert_eq!(catalog.lookup(&"aws.compute.ec2".into()), Some(icon));
        assert_eq!(catalog.lookup(&"aws.compute.lambda".into()), None);
        assert_eq!(catalog.lookup(&"".into()), None);
    }

    #[test]
    fn test_static_catalog() {
        let catalog: StaticCatalog = [("svc", "/icons/svc.png")].into_iter().collect();

        assert_eq!(
            catalog.lookup(&"svc".into()),
            Some(PathBuf::from("/icons/svc.png"))
        );
        assert_eq!(catalog.lookup(&"db".into()), None);
    }

    #[test]
    fn test_glyphs_warn_once_per_category() {
        let catalog = StaticCatalog::new().with("svc", "/icons/svc.png");
        let mut glyphs = Glyphs::new(&catalog);

        assert_eq!(
            glyphs.resolve(&"svc".into()),
            Glyph::Image(PathBuf::from("/icons/svc.png"))
        );
        assert_eq!(glyphs.resolve(&"db".into()), Glyph::Fallback);
        assert_eq!(glyphs.resolve(&"db".into()), Glyph::Fallback);
        assert_eq!(glyphs.resolve(&"queue".into()), Glyph::Fallback);

        assert_eq!(
            glyphs.warnings(),
            vec![
                Warning::IconNotFound {
                    category: "db".into()
                },
                Warning::IconNotFound {
                    category: "queue".into()
                },
            ]
        );
    }
}
