//! Secondary font sources and system font list kinds (made by FontLab https://www.fontlab.com/)
//!
//! The scanned directory is the generic source. Two path lists add more full
//! names: stylish fonts, read from a visibility list on every scan, and
//! installed fonts, read from an install config on every lookup. Each keeps
//! its own full-name map; neither takes part in descriptor matching.

use std::collections::BTreeMap;
use std::fs;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::descriptor::FontDescriptor;

/// Which sources a system font list draws from.
///
/// `ALL` is a bit of its own and stands for the other three together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemFontType(u32);

impl SystemFontType {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(1 << 0);
    pub const GENERIC: Self = Self(1 << 1);
    pub const STYLISH: Self = Self(1 << 2);
    pub const INSTALLED: Self = Self(1 << 3);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Concrete source bits, with `ALL` expanded.
    pub fn sources(self) -> Self {
        if self.contains(Self::ALL) {
            Self::GENERIC | Self::STYLISH | Self::INSTALLED
        } else {
            self
        }
    }
}

impl BitOr for SystemFontType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SystemFontType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Descriptors keyed by full name. Faces without a full name are not kept.
#[derive(Debug, Clone, Default)]
pub struct FullNameMap {
    by_name: BTreeMap<String, Vec<FontDescriptor>>,
}

impl FullNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the descriptor has no full name.
    pub fn insert(&mut self, desc: FontDescriptor) -> bool {
        if desc.full_name.is_empty() {
            return false;
        }
        self.by_name
            .entry(desc.full_name.clone())
            .or_default()
            .push(desc);
        true
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// First descriptor filed under `full_name`.
    pub fn first(&self, full_name: &str) -> Option<&FontDescriptor> {
        self.by_name.get(full_name)?.first()
    }

    /// Number of distinct full names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FontPathList {
    Bare(Vec<FontPathEntry>),
    Listed { fontlist: Vec<FontPathEntry> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FontPathEntry {
    Path(PathBuf),
    Entry { fontfullpath: PathBuf },
}

impl FontPathEntry {
    fn into_path(self) -> PathBuf {
        match self {
            FontPathEntry::Path(path) | FontPathEntry::Entry { fontfullpath: path } => path,
        }
    }
}

/// Read a JSON font path list.
///
/// Accepts `{"fontlist": [{"fontfullpath": "..."}]}`, a bare array of path
/// strings, or a mix of strings and `fontfullpath` objects in either form.
pub fn read_font_path_list(path: &Path) -> Result<Vec<PathBuf>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading font list {}", path.display()))?;
    let list: FontPathList = serde_json::from_str(&raw)
        .with_context(|| format!("parsing font list {}", path.display()))?;

    let entries = match list {
        FontPathList::Bare(entries) | FontPathList::Listed { fontlist: entries } => entries,
    };
    Ok(entries
        .into_iter()
        .map(FontPathEntry::into_path)
        .filter(|p| !p.as_os_str().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn all_expands_to_every_source() {
        let all = SystemFontType::ALL.sources();
        assert!(all.contains(SystemFontType::GENERIC));
        assert!(all.contains(SystemFontType::STYLISH));
        assert!(all.contains(SystemFontType::INSTALLED));
        assert!(!all.contains(SystemFontType::ALL));

        let stylish = SystemFontType::STYLISH.sources();
        assert_eq!(stylish, SystemFontType::STYLISH);
        assert!(!SystemFontType::NONE.sources().contains(SystemFontType::GENERIC));
    }

    #[test]
    fn serializes_as_plain_bits() {
        let kind: SystemFontType = serde_json::from_str("12").expect("json");
        assert_eq!(kind, SystemFontType::STYLISH | SystemFontType::INSTALLED);
        assert_eq!(serde_json::to_string(&SystemFontType::GENERIC).expect("json"), "2");
    }

    #[test]
    fn full_name_map_keeps_first_and_skips_unnamed() {
        let mut map = FullNameMap::new();
        assert!(map.insert(FontDescriptor::new("A", "A Regular").with_path("/one.ttf")));
        assert!(map.insert(FontDescriptor::new("A", "A Regular").with_path("/two.ttf")));
        assert!(!map.insert(FontDescriptor::new("A", "")));

        assert_eq!(map.len(), 1);
        assert_eq!(map.first("A Regular").map(|d| d.path.as_str()), Some("/one.ttf"));
        assert!(map.first("").is_none());
    }

    #[test]
    fn reads_fontlist_objects_and_bare_arrays() {
        let tmp = tempdir().expect("tempdir");
        let listed = tmp.path().join("install.json");
        fs::write(
            &listed,
            r#"{ "fontlist": [ { "fontfullpath": "/data/fonts/a.ttf" }, "/data/fonts/b.ttc", { "fontfullpath": "" } ] }"#,
        )
        .expect("write");
        let bare = tmp.path().join("visibility.json");
        fs::write(&bare, r#"["/system/fonts/c.ttf"]"#).expect("write");

        assert_eq!(
            read_font_path_list(&listed).expect("listed"),
            vec![PathBuf::from("/data/fonts/a.ttf"), PathBuf::from("/data/fonts/b.ttc")]
        );
        assert_eq!(
            read_font_path_list(&bare).expect("bare"),
            vec![PathBuf::from("/system/fonts/c.ttf")]
        );
    }

    #[test]
    fn malformed_list_is_an_error() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("broken.json");
        fs::write(&path, r#"{ "fontlist": 3 }"#).expect("write");

        assert!(read_font_path_list(&path).is_err());
        assert!(read_font_path_list(&tmp.path().join("missing.json")).is_err());
    }
}
