//! Persistent front-end settings and the object filter they describe.
//!
//! Settings decide which objects a front end processes and which revision
//! it writes for. They never change how files are decoded or encoded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::file::LoadOptions;
use crate::meta::{ClassId, EngineVersion};
use crate::objects::AssetObject;
use crate::util::{Error, Result};

const MAX_RECENT_FILES: usize = 10;

/// Settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Loading
    pub eager: bool,
    pub parallel: bool,

    // Encoding, e.g. "2019.4.31f1"
    pub target_version: Option<String>,

    // Filters: class ids by number or name, names by regex
    pub ignore_class_ids: Vec<String>,
    pub exclusive_class_ids: Vec<String>,
    pub path_ids: Vec<i64>,
    pub name_filters: Vec<String>,

    // Recent inputs (most recent first, max 10)
    pub recent_files: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            eager: false,
            parallel: true,
            target_version: None,
            ignore_class_ids: Vec::new(),
            exclusive_class_ids: Vec::new(),
            path_ids: Vec::new(),
            name_filters: Vec::new(),
            recent_files: Vec::new(),
        }
    }
}

impl Settings {
    /// Settings file location in the platform config dir.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("assetgraph");
            p.push("settings.json");
            p
        })
    }

    /// Load from the default location; defaults when missing or unreadable.
    pub fn load() -> Self {
        Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
    }

    /// Load from `path`; defaults when missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| match serde_json::from_str(&s) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| Error::other("no config directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::other(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Add file to recent files list (moves to top if already present)
    pub fn add_recent(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions { eager: self.eager, parallel: self.parallel, ..LoadOptions::default() }
    }

    /// Configured target revision. Unparsable values are reported and ignored.
    pub fn target(&self) -> Option<EngineVersion> {
        let text = self.target_version.as_deref()?;
        match text.parse() {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!(target_version = text, error = %e, "ignoring target version");
                None
            }
        }
    }

    /// Filter described by these settings. Unknown class names and invalid
    /// name patterns are reported and skipped.
    pub fn filter(&self) -> ObjectFilter {
        ObjectFilter {
            ignore: parse_class_ids(&self.ignore_class_ids),
            exclusive: parse_class_ids(&self.exclusive_class_ids),
            path_ids: self.path_ids.iter().copied().collect(),
            names: compile_name_filters(&self.name_filters),
        }
    }
}

fn compile_name_filters(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "ignoring name filter");
                None
            }
        })
        .collect()
}

fn parse_class_ids(values: &[String]) -> HashSet<ClassId> {
    values
        .iter()
        .filter_map(|value| match value.parse() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(value = %value, error = %e, "ignoring class filter");
                None
            }
        })
        .collect()
}

/// Which objects a front end should process.
///
/// Empty sets do not restrict. Name filters are case-insensitive regexes
/// searched anywhere in the name; with any present, objects without a name
/// are rejected.
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    pub ignore: HashSet<ClassId>,
    pub exclusive: HashSet<ClassId>,
    pub path_ids: HashSet<i64>,
    pub names: Vec<Regex>,
}

impl ObjectFilter {
    /// Check what the directory knows, before decoding.
    pub fn accepts_entry(&self, class_id: ClassId, path_id: i64) -> bool {
        if self.ignore.contains(&class_id) {
            return false;
        }
        if !self.exclusive.is_empty() && !self.exclusive.contains(&class_id) {
            return false;
        }
        self.path_ids.is_empty() || self.path_ids.contains(&path_id)
    }

    /// Whether name matching needs the decoded object.
    #[inline]
    pub fn needs_name(&self) -> bool {
        !self.names.is_empty()
    }

    pub fn accepts(&self, object: &dyn AssetObject) -> bool {
        if !self.accepts_entry(object.class_id(), object.path_id()) {
            return false;
        }
        if !self.needs_name() {
            return true;
        }
        match object.name() {
            Some(name) => self.names.iter().any(|filter| filter.is_match(name)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{GameObject, RawObject};

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.eager = true;
        settings.target_version = Some("2019.4.31f1".into());
        settings.ignore_class_ids = vec!["Shader".into(), "28".into()];
        settings.add_recent(PathBuf::from("a.assets"));
        settings.add_recent(PathBuf::from("b.assets"));
        settings.add_recent(PathBuf::from("a.assets"));
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.recent_files, vec![PathBuf::from("a.assets"), PathBuf::from("b.assets")]);
        assert_eq!(loaded.target(), Some("2019.4.31f1".parse().unwrap()));
        assert!(loaded.load_options().eager);
    }

    #[test]
    fn test_missing_and_malformed_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_from(&path), Settings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());

        // Unknown fields and missing fields are tolerated.
        std::fs::write(&path, r#"{"parallel": false, "future_option": 3}"#).unwrap();
        let loaded = Settings::load_from(&path);
        assert!(!loaded.parallel);
        assert!(loaded.name_filters.is_empty());
    }

    #[test]
    fn test_filter_by_class_and_path() {
        let settings = Settings {
            ignore_class_ids: vec!["Shader".into(), "bogus".into()],
            exclusive_class_ids: vec!["GameObject".into(), "48".into(), "MeshFilter".into()],
            path_ids: vec![1, 2],
            ..Settings::default()
        };
        let filter = settings.filter();
        assert_eq!(filter.ignore.len(), 1);
        assert!(filter.accepts_entry(ClassId::GAME_OBJECT, 1));
        assert!(!filter.accepts_entry(ClassId::SHADER, 1));
        assert!(!filter.accepts_entry(ClassId::TRANSFORM, 1));
        assert!(!filter.accepts_entry(ClassId::MESH_FILTER, 3));
    }

    #[test]
    fn test_filter_by_name() {
        let filter = Settings { name_filters: vec!["HERO".into()], ..Settings::default() }.filter();
        let hero = GameObject::new("Hero_Body");
        let villain = GameObject::new("Villain");
        let raw = RawObject::new(ClassId::MESH, vec![]);
        assert!(filter.accepts(&hero));
        assert!(!filter.accepts(&villain));
        assert!(!filter.accepts(&raw));
        assert!(ObjectFilter::default().accepts(&raw));
    }

    #[test]
    fn test_name_filters_are_patterns() {
        let settings = Settings {
            name_filters: vec!["^hero_".into(), "(unclosed".into(), r"lod\d$".into()],
            ..Settings::default()
        };
        let filter = settings.filter();
        assert_eq!(filter.names.len(), 2);

        assert!(filter.accepts(&GameObject::new("HERO_Body")));
        assert!(!filter.accepts(&GameObject::new("Old_Hero_Body")));
        assert!(filter.accepts(&GameObject::new("Rock_LOD2")));
        assert!(!filter.accepts(&GameObject::new("Rock_LOD")));
    }
}
