//! Validated icon directory.

use crate::classify::Category;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A directory known to contain an icon for every category that has one.
///
/// Records only ever reference icons resolved through an `IconSet`, so a
/// non-empty icon reference always points at a file that existed when the
/// batch started.
#[derive(Debug, Clone)]
pub struct IconSet {
    dir: PathBuf,
}

impl IconSet {
    #[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref().to_path_buf();
        for file in Category::ALL.into_iter().filter_map(Category::icon_file) {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(ConfigError::MissingIcon(path));
            }
        }
        debug!("All category icons present");
        Ok(Self { dir })
    }

    /// Icon reference stored with a record; empty for [`Category::NoData`].
    pub fn icon_ref(&self, category: Category) -> String {
        category
            .icon_file()
            .map(|file| self.dir.join(file).to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) fn icon_dir_fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in Category::ALL.into_iter().filter_map(Category::icon_file) {
        std::fs::write(dir.path().join(file), b"\x89PNG fake icon").unwrap();
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_accepts_complete_directory() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let sun = icons.icon_ref(Category::Sunny);
        assert!(sun.ends_with("sun.png"));
        assert!(Path::new(&sun).is_file());
    }

    #[test]
    fn test_open_rejects_missing_icon() {
        let dir = icon_dir_fixture();
        std::fs::remove_file(dir.path().join("snow.png")).unwrap();
        match IconSet::open(dir.path()) {
            Err(ConfigError::MissingIcon(path)) => assert!(path.ends_with("snow.png")),
            other => panic!("expected missing icon, got {other:?}"),
        }
    }

    #[test]
    fn test_no_data_has_empty_icon_ref() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        assert_eq!(icons.icon_ref(Category::NoData), "");
    }
}
