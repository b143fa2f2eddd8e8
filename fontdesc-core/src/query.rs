//! Descriptor queries (made by FontLab https://www.fontlab.com/)

use crate::descriptor::{FontDescriptor, TypeStyle};

/// A partial descriptor: every `None` (or `false`, or empty style) leaves that
/// attribute unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorQuery {
    font_family: Option<String>,
    full_name: Option<String>,
    post_script_name: Option<String>,
    font_subfamily: Option<String>,
    weight: Option<u16>,
    width: Option<u16>,
    italic: Option<i32>,
    mono_space: bool,
    symbolic: bool,
    type_style: TypeStyle,
}

impl DescriptorQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_post_script_name(mut self, name: impl Into<String>) -> Self {
        self.post_script_name = Some(name.into());
        self
    }

    pub fn with_subfamily(mut self, subfamily: impl Into<String>) -> Self {
        self.font_subfamily = Some(subfamily.into());
        self
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_italic(mut self, italic: i32) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn require_mono_space(mut self, yes: bool) -> Self {
        self.mono_space = yes;
        self
    }

    pub fn require_symbolic(mut self, yes: bool) -> Self {
        self.symbolic = yes;
        self
    }

    pub fn with_type_style(mut self, style: TypeStyle) -> Self {
        self.type_style = style;
        self
    }

    /// Build a query from a descriptor, treating zero, empty and `false`
    /// fields as unconstrained.
    pub fn from_descriptor(desc: &FontDescriptor) -> Self {
        Self {
            font_family: non_empty(&desc.font_family),
            full_name: non_empty(&desc.full_name),
            post_script_name: non_empty(&desc.post_script_name),
            font_subfamily: non_empty(&desc.font_subfamily),
            weight: (desc.weight != 0).then_some(desc.weight),
            width: (desc.width != 0).then_some(desc.width),
            italic: (desc.italic != 0).then_some(desc.italic),
            mono_space: desc.mono_space,
            symbolic: desc.symbolic,
            type_style: desc.type_style,
        }
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref().filter(|s| !s.is_empty())
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn post_script_name(&self) -> Option<&str> {
        self.post_script_name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn font_subfamily(&self) -> Option<&str> {
        self.font_subfamily.as_deref().filter(|s| !s.is_empty())
    }

    pub fn weight(&self) -> Option<u16> {
        self.weight
    }

    pub fn width(&self) -> Option<u16> {
        self.width
    }

    pub fn italic(&self) -> Option<i32> {
        self.italic
    }

    pub fn mono_space(&self) -> bool {
        self.mono_space
    }

    pub fn symbolic(&self) -> bool {
        self.symbolic
    }

    pub fn type_style(&self) -> TypeStyle {
        self.type_style
    }

    /// True when no attribute is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.font_family().is_none()
            && self.full_name().is_none()
            && self.post_script_name().is_none()
            && self.font_subfamily().is_none()
            && self.weight.is_none()
            && self.width.is_none()
            && self.italic.is_none()
            && !self.mono_space
            && !self.symbolic
            && self.type_style.is_empty()
    }

    /// True when some filter ahead of the typeStyle step is constrained, i.e.
    /// the candidate set is already narrowed by the time the style bits apply.
    pub(crate) fn narrows_before_type_style(&self) -> bool {
        self.font_family().is_some()
            || self.full_name().is_some()
            || self.post_script_name().is_some()
            || self.font_subfamily().is_some()
            || self.weight.is_some()
            || self.width.is_some()
            || self.italic.is_some()
            || self.mono_space
            || self.symbolic
    }

    /// Check a single descriptor against the query without any index.
    ///
    /// Mirrors the index pipeline: the typeStyle bits are ANDed when they are
    /// the only constraint and ORed once another filter has narrowed the set.
    pub fn matches(&self, desc: &FontDescriptor) -> bool {
        let strings = [
            (self.font_family(), &desc.font_family),
            (self.full_name(), &desc.full_name),
            (self.post_script_name(), &desc.post_script_name),
            (self.font_subfamily(), &desc.font_subfamily),
        ];
        if strings
            .iter()
            .any(|(wanted, actual)| wanted.is_some_and(|w| w != actual.as_str()))
        {
            return false;
        }

        if self.weight.is_some_and(|w| w != desc.weight) {
            return false;
        }
        if self.width.is_some_and(|w| w != desc.width) {
            return false;
        }
        if self.italic.is_some_and(|i| i != desc.italic) {
            return false;
        }
        if self.mono_space && !desc.mono_space {
            return false;
        }
        if self.symbolic && !desc.symbolic {
            return false;
        }

        if self.type_style.is_empty() {
            return true;
        }
        let want_italic = self.type_style.contains(TypeStyle::ITALIC);
        let want_bold = self.type_style.contains(TypeStyle::BOLD);
        if !want_italic && !want_bold {
            // Unknown bits select nothing.
            return false;
        }
        if self.narrows_before_type_style() {
            (want_italic && desc.is_italic()) || (want_bold && desc.is_bold())
        } else {
            (!want_italic || desc.is_italic()) && (!want_bold || desc.is_bold())
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}
