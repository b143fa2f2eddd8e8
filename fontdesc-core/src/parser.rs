//! Font table parsing into descriptors (made by FontLab https://www.fontlab.com/)

use std::path::Path;

use anyhow::Result;

use crate::descriptor::FontDescriptor;

/// Turns font files into descriptors.
///
/// Single-face files go through [`parse_file`](FontParser::parse_file);
/// collections (`.ttc`) go through [`parse_collection`](FontParser::parse_collection).
pub trait FontParser: Send + Sync {
    fn parse_file(&self, path: &Path) -> Result<FontDescriptor>;

    fn parse_collection(&self, path: &Path) -> Result<Vec<FontDescriptor>>;
}

#[cfg(feature = "fontations")]
pub use self::fontations::OpenTypeParser;

#[cfg(feature = "fontations")]
mod fontations {
    use std::fs;
    use std::path::Path;

    use anyhow::{anyhow, Context, Result};
    use read_fonts::tables::cmap::PlatformId;
    use read_fonts::{FontRef, TableProvider};
    use skrifa::string::StringId;
    use skrifa::{FontRef as SkrifaFontRef, MetadataProvider};

    use super::FontParser;
    use crate::descriptor::FontDescriptor;

    /// Windows Symbol encoding within platform 3.
    const WINDOWS_SYMBOL_ENCODING: u16 = 0;
    /// fsSelection bit 0.
    const FS_SELECTION_ITALIC: u16 = 1 << 0;

    /// Reads `name`, `OS/2`, `post` and `cmap` via read-fonts and skrifa.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct OpenTypeParser;

    impl FontParser for OpenTypeParser {
        fn parse_file(&self, path: &Path) -> Result<FontDescriptor> {
            let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
            let font = FontRef::new(&data)
                .map_err(|e| anyhow!("parsing font {}: {e}", path.display()))?;
            let names = SkrifaFontRef::new(&data)
                .map_err(|e| anyhow!("parsing font {}: {e}", path.display()))?;
            Ok(describe(&font, &names, path))
        }

        fn parse_collection(&self, path: &Path) -> Result<Vec<FontDescriptor>> {
            let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
            let mut descriptors = Vec::new();

            for font in FontRef::fonts(&data) {
                let font = font.map_err(|e| anyhow!("parsing face in {}: {e}", path.display()))?;
                let names = match font.ttc_index() {
                    Some(idx) => SkrifaFontRef::from_index(&data, idx),
                    None => SkrifaFontRef::new(&data),
                }
                .map_err(|e| anyhow!("parsing face in {}: {e}", path.display()))?;
                descriptors.push(describe(&font, &names, path));
            }

            if descriptors.is_empty() {
                return Err(anyhow!("no faces found in {}", path.display()));
            }
            Ok(descriptors)
        }
    }

    fn describe(font: &FontRef, names: &SkrifaFontRef, path: &Path) -> FontDescriptor {
        let mut desc = FontDescriptor {
            path: path.display().to_string(),
            font_family: first_name(names, &[StringId::FAMILY_NAME, StringId::TYPOGRAPHIC_FAMILY_NAME]),
            font_subfamily: first_name(names, &[StringId::SUBFAMILY_NAME]),
            full_name: first_name(names, &[StringId::FULL_NAME]),
            post_script_name: first_name(names, &[StringId::POSTSCRIPT_NAME]),
            ..FontDescriptor::default()
        };

        if let Ok(os2) = font.os2() {
            desc.weight = os2.us_weight_class();
            desc.width = os2.us_width_class();
            if os2.fs_selection().bits() & FS_SELECTION_ITALIC != 0 {
                desc.italic = 1;
            }
        }
        if let Ok(post) = font.post() {
            desc.mono_space = post.is_fixed_pitch() != 0;
        }
        desc.symbolic = has_symbol_cmap(font);
        desc
    }

    fn first_name(font: &SkrifaFontRef, ids: &[StringId]) -> String {
        ids.iter()
            .find_map(|id| {
                font.localized_strings(*id)
                    .english_or_first()
                    .map(|s| s.to_string().trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_default()
    }

    fn has_symbol_cmap(font: &FontRef) -> bool {
        font.cmap()
            .map(|cmap| {
                cmap.encoding_records().iter().any(|rec| {
                    rec.platform_id() == PlatformId::Windows
                        && rec.encoding_id() == WINDOWS_SYMBOL_ENCODING
                })
            })
            .unwrap_or(false)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::fs;
        use tempfile::tempdir;

        #[test]
        fn rejects_non_font_bytes() {
            let tmp = tempdir().expect("tempdir");
            let path = tmp.path().join("broken.ttf");
            fs::write(&path, b"definitely not a font").expect("write");

            assert!(OpenTypeParser.parse_file(&path).is_err());
            assert!(OpenTypeParser.parse_collection(&path).is_err());
        }

        #[test]
        fn missing_file_reports_path() {
            let err = OpenTypeParser
                .parse_file(Path::new("/nonexistent/fontdesc/none.ttf"))
                .expect_err("missing file");
            assert!(err.to_string().contains("none.ttf"));
        }
    }
}
