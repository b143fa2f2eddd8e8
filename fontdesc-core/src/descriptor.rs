//! Font descriptor records (made by FontLab https://www.fontlab.com/)

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Weight classes strictly above this value count as bold.
pub const BOLD_WEIGHT_THRESHOLD: u16 = 400;

/// Stable handle of a descriptor inside a [`FontIndex`](crate::index::FontIndex).
pub type FontId = usize;

/// OR-able style shorthand carried next to the scalar weight/italic fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeStyle(u32);

impl TypeStyle {
    pub const NONE: TypeStyle = TypeStyle(0);
    pub const ITALIC: TypeStyle = TypeStyle(1 << 0);
    pub const BOLD: TypeStyle = TypeStyle(1 << 1);

    pub const fn from_bits(bits: u32) -> Self {
        TypeStyle(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: TypeStyle) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for TypeStyle {
    type Output = TypeStyle;

    fn bitor(self, rhs: TypeStyle) -> TypeStyle {
        TypeStyle(self.0 | rhs.0)
    }
}

impl BitOrAssign for TypeStyle {
    fn bitor_assign(&mut self, rhs: TypeStyle) {
        self.0 |= rhs.0;
    }
}

/// Identity and shape attributes of one font face.
///
/// Empty strings mean the attribute was absent from the font's tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    pub path: String,
    pub post_script_name: String,
    pub full_name: String,
    pub font_family: String,
    pub font_subfamily: String,
    pub weight: u16,
    pub width: u16,
    pub italic: i32,
    pub mono_space: bool,
    pub symbolic: bool,
    #[serde(default)]
    pub type_style: TypeStyle,
    #[serde(default)]
    pub size: f64,
}

impl FontDescriptor {
    pub fn new(font_family: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_post_script_name(mut self, name: impl Into<String>) -> Self {
        self.post_script_name = name.into();
        self
    }

    pub fn with_subfamily(mut self, subfamily: impl Into<String>) -> Self {
        self.font_subfamily = subfamily.into();
        self
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn with_italic(mut self, italic: i32) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_mono_space(mut self, yes: bool) -> Self {
        self.mono_space = yes;
        self
    }

    pub fn with_symbolic(mut self, yes: bool) -> Self {
        self.symbolic = yes;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.weight > BOLD_WEIGHT_THRESHOLD
    }

    pub fn is_italic(&self) -> bool {
        self.italic != 0
    }

    /// Key under which the index deduplicates records.
    pub fn dedup_key(&self) -> (String, String) {
        (self.font_family.clone(), self.full_name.clone())
    }

    /// Style bits implied by the scalar weight and italic fields.
    pub fn derived_type_style(&self) -> TypeStyle {
        let mut style = TypeStyle::NONE;
        if self.is_bold() {
            style |= TypeStyle::BOLD;
        }
        if self.is_italic() {
            style |= TypeStyle::ITALIC;
        }
        style
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.full_name.is_empty() {
            "(unnamed)"
        } else {
            &self.full_name
        };
        write!(f, "{name} [{}]", self.path)
    }
}
