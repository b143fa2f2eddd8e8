//! In-memory descriptor index and the narrowing matcher (made by FontLab https://www.fontlab.com/)
//!
//! Every descriptor lives once in an arena and is addressed by its [`FontId`].
//! Four group maps (family, full name, PostScript name, subfamily) and four
//! flag caches (bold, italic, monospace, symbolic) hold IDs only, so a record
//! referenced from several containers is still one record.
//!
//! Matching walks [`FilterStep::ORDER`]. Each step either skips (the query
//! leaves that attribute open), narrows the running candidate set, or rejects
//! the whole query. All steps AND together except [`FilterStep::TypeStyle`],
//! whose bits are ORed once an earlier step has produced candidates.
//!
//! Stylish and installed fonts sit beside the arena in their own full-name
//! maps. They show up in font lists and name lookups but never in matches.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::descriptor::{FontDescriptor, FontId, TypeStyle, BOLD_WEIGHT_THRESHOLD};
use crate::query::DescriptorQuery;
use crate::sources::{FullNameMap, SystemFontType};

/// String attributes that get a group map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameAttribute {
    Family,
    FullName,
    PostScriptName,
    Subfamily,
}

impl NameAttribute {
    pub const ALL: [NameAttribute; 4] = [
        NameAttribute::Family,
        NameAttribute::FullName,
        NameAttribute::PostScriptName,
        NameAttribute::Subfamily,
    ];

    fn value(self, desc: &FontDescriptor) -> &str {
        match self {
            NameAttribute::Family => &desc.font_family,
            NameAttribute::FullName => &desc.full_name,
            NameAttribute::PostScriptName => &desc.post_script_name,
            NameAttribute::Subfamily => &desc.font_subfamily,
        }
    }
}

/// Boolean properties with a precomputed member set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleFlag {
    Bold,
    Italic,
    MonoSpace,
    Symbolic,
}

impl StyleFlag {
    pub const ALL: [StyleFlag; 4] = [
        StyleFlag::Bold,
        StyleFlag::Italic,
        StyleFlag::MonoSpace,
        StyleFlag::Symbolic,
    ];

    pub fn holds_for(self, desc: &FontDescriptor) -> bool {
        match self {
            StyleFlag::Bold => desc.weight > BOLD_WEIGHT_THRESHOLD,
            StyleFlag::Italic => desc.italic != 0,
            StyleFlag::MonoSpace => desc.mono_space,
            StyleFlag::Symbolic => desc.symbolic,
        }
    }
}

/// How a step's predicate combines with the candidates it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    /// Keep a candidate when any of the requested sub-predicates holds.
    Or,
}

/// One stage of the matching pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    FontFamily,
    FullName,
    PostScriptName,
    FontSubfamily,
    Weight,
    Width,
    Italic,
    MonoSpace,
    Symbolic,
    TypeStyle,
}

impl FilterStep {
    /// Fixed evaluation order.
    pub const ORDER: [FilterStep; 10] = [
        FilterStep::FontFamily,
        FilterStep::FullName,
        FilterStep::PostScriptName,
        FilterStep::FontSubfamily,
        FilterStep::Weight,
        FilterStep::Width,
        FilterStep::Italic,
        FilterStep::MonoSpace,
        FilterStep::Symbolic,
        FilterStep::TypeStyle,
    ];

    /// Combinator applied once candidates exist. Before that, the typeStyle
    /// step intersects the italic and bold caches instead.
    pub fn combinator(self) -> Combinator {
        match self {
            FilterStep::TypeStyle => Combinator::Or,
            _ => Combinator::And,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterStep::FontFamily => "fontFamily",
            FilterStep::FullName => "fullName",
            FilterStep::PostScriptName => "postScriptName",
            FilterStep::FontSubfamily => "fontSubfamily",
            FilterStep::Weight => "weight",
            FilterStep::Width => "width",
            FilterStep::Italic => "italic",
            FilterStep::MonoSpace => "monoSpace",
            FilterStep::Symbolic => "symbolic",
            FilterStep::TypeStyle => "typeStyle",
        }
    }
}

enum StepOutcome {
    Skip,
    Narrow(BTreeSet<FontId>),
    Reject,
}

impl StepOutcome {
    fn from_set(set: BTreeSet<FontId>) -> Self {
        if set.is_empty() {
            StepOutcome::Reject
        } else {
            StepOutcome::Narrow(set)
        }
    }
}

/// Container sizes, logged after each scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub descriptors: usize,
    pub families: usize,
    pub full_names: usize,
    pub post_script_names: usize,
    pub subfamilies: usize,
    pub bold: usize,
    pub italic: usize,
    pub mono_space: usize,
    pub symbolic: usize,
    pub stylish: usize,
    pub installed: usize,
}

#[derive(Debug, Default)]
pub struct FontIndex {
    descriptors: Vec<FontDescriptor>,
    keys: HashMap<(String, String), FontId>,
    by_family: HashMap<String, BTreeSet<FontId>>,
    by_full_name: HashMap<String, BTreeSet<FontId>>,
    by_post_script_name: HashMap<String, BTreeSet<FontId>>,
    by_subfamily: HashMap<String, BTreeSet<FontId>>,
    bold: BTreeSet<FontId>,
    italic: BTreeSet<FontId>,
    mono_space: BTreeSet<FontId>,
    symbolic: BTreeSet<FontId>,
    stylish: FullNameMap,
    installed: FullNameMap,
}

impl FontIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, id: FontId) -> Option<&FontDescriptor> {
        self.descriptors.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FontId, &FontDescriptor)> {
        self.descriptors.iter().enumerate()
    }

    /// Insert a descriptor into the arena and every matching container.
    ///
    /// Returns `None` when a record with the same family and full name is
    /// already present; the new descriptor is dropped in that case.
    pub fn scatter(&mut self, mut desc: FontDescriptor) -> Option<FontId> {
        let key = desc.dedup_key();
        if self.keys.contains_key(&key) {
            debug!(family = %key.0, full_name = %key.1, "duplicate descriptor ignored");
            return None;
        }

        let id = self.descriptors.len();
        let derived = desc.derived_type_style();
        desc.type_style |= derived;

        for attr in NameAttribute::ALL {
            let value = attr.value(&desc).to_string();
            self.group_map_mut(attr).entry(value).or_default().insert(id);
        }
        for flag in StyleFlag::ALL {
            if flag.holds_for(&desc) {
                self.cache_mut(flag).insert(id);
            }
        }

        self.keys.insert(key, id);
        self.descriptors.push(desc);
        Some(id)
    }

    /// Drop every record and empty all group maps and caches.
    pub fn clear(&mut self) {
        self.descriptors.clear();
        self.keys.clear();
        self.by_family.clear();
        self.by_full_name.clear();
        self.by_post_script_name.clear();
        self.by_subfamily.clear();
        self.bold.clear();
        self.italic.clear();
        self.mono_space.clear();
        self.symbolic.clear();
        self.stylish.clear();
        self.installed.clear();
    }

    pub fn stylish(&self) -> &FullNameMap {
        &self.stylish
    }

    pub fn installed(&self) -> &FullNameMap {
        &self.installed
    }

    pub fn set_stylish(&mut self, fonts: FullNameMap) {
        self.stylish = fonts;
    }

    pub fn set_installed(&mut self, fonts: FullNameMap) {
        self.installed = fonts;
    }

    /// IDs stored under `key` in the group map for `attr`.
    pub fn group(&self, attr: NameAttribute, key: &str) -> Option<&BTreeSet<FontId>> {
        self.group_map(attr).get(key)
    }

    /// Members of the cache for `flag`.
    pub fn members(&self, flag: StyleFlag) -> &BTreeSet<FontId> {
        match flag {
            StyleFlag::Bold => &self.bold,
            StyleFlag::Italic => &self.italic,
            StyleFlag::MonoSpace => &self.mono_space,
            StyleFlag::Symbolic => &self.symbolic,
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            descriptors: self.descriptors.len(),
            families: self.by_family.len(),
            full_names: self.by_full_name.len(),
            post_script_names: self.by_post_script_name.len(),
            subfamilies: self.by_subfamily.len(),
            bold: self.bold.len(),
            italic: self.italic.len(),
            mono_space: self.mono_space.len(),
            symbolic: self.symbolic.len(),
            stylish: self.stylish.len(),
            installed: self.installed.len(),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            descriptors = stats.descriptors,
            families = stats.families,
            full_names = stats.full_names,
            post_script_names = stats.post_script_names,
            subfamilies = stats.subfamilies,
            bold = stats.bold,
            italic = stats.italic,
            mono_space = stats.mono_space,
            symbolic = stats.symbolic,
            stylish = stats.stylish,
            "font index populated"
        );
    }

    /// Every non-empty full name in the index, sorted.
    pub fn full_names(&self) -> BTreeSet<String> {
        self.by_full_name
            .keys()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect()
    }

    /// Full names from the sources selected by `kind`, merged and sorted.
    pub fn font_list(&self, kind: SystemFontType) -> BTreeSet<String> {
        let sources = kind.sources();
        let mut names = BTreeSet::new();
        if sources.contains(SystemFontType::GENERIC) {
            names.extend(self.full_names());
        }
        if sources.contains(SystemFontType::STYLISH) {
            names.extend(self.stylish.names().map(str::to_string));
        }
        if sources.contains(SystemFontType::INSTALLED) {
            names.extend(self.installed.names().map(str::to_string));
        }
        names
    }

    /// First record (in insertion order) carrying this full name.
    pub fn find_by_full_name(&self, full_name: &str) -> Option<&FontDescriptor> {
        if full_name.is_empty() {
            info!("empty full name provided");
            return None;
        }
        let id = self.by_full_name.get(full_name)?.first()?;
        self.descriptors.get(*id)
    }

    /// Look a full name up in the arena, then stylish fonts, then installed
    /// fonts.
    pub fn lookup_full_name(&self, full_name: &str) -> Option<&FontDescriptor> {
        let found = self
            .find_by_full_name(full_name)
            .or_else(|| self.stylish.first(full_name))
            .or_else(|| self.installed.first(full_name));
        if found.is_none() && !full_name.is_empty() {
            info!(full_name, "font descriptor not found");
        }
        found
    }

    /// Run the filter pipeline and return the IDs of every matching record.
    pub fn match_ids(&self, query: &DescriptorQuery) -> BTreeSet<FontId> {
        if query.is_unconstrained() {
            return self.all_ids().collect();
        }

        let mut candidates: Option<BTreeSet<FontId>> = None;
        for step in FilterStep::ORDER {
            match self.apply(step, query, candidates.as_ref()) {
                StepOutcome::Skip => {}
                StepOutcome::Narrow(set) => candidates = Some(set),
                StepOutcome::Reject => {
                    debug!(step = step.name(), "{} match failed", step.name());
                    return BTreeSet::new();
                }
            }
        }

        candidates.unwrap_or_default()
    }

    /// Same as [`match_ids`](Self::match_ids) but resolves the records.
    pub fn match_query(&self, query: &DescriptorQuery) -> Vec<&FontDescriptor> {
        self.match_ids(query)
            .into_iter()
            .filter_map(|id| self.descriptors.get(id))
            .collect()
    }

    fn apply(
        &self,
        step: FilterStep,
        query: &DescriptorQuery,
        candidates: Option<&BTreeSet<FontId>>,
    ) -> StepOutcome {
        match step {
            FilterStep::FontFamily => {
                self.narrow_by_name(NameAttribute::Family, query.font_family(), candidates)
            }
            FilterStep::FullName => {
                self.narrow_by_name(NameAttribute::FullName, query.full_name(), candidates)
            }
            FilterStep::PostScriptName => self.narrow_by_name(
                NameAttribute::PostScriptName,
                query.post_script_name(),
                candidates,
            ),
            FilterStep::FontSubfamily => {
                self.narrow_by_name(NameAttribute::Subfamily, query.font_subfamily(), candidates)
            }
            FilterStep::Weight => match query.weight() {
                None => StepOutcome::Skip,
                Some(weight) => {
                    let pool: Box<dyn Iterator<Item = FontId> + '_> = match candidates {
                        Some(set) => Box::new(set.iter().copied()),
                        None if weight > BOLD_WEIGHT_THRESHOLD => Box::new(self.bold.iter().copied()),
                        None => Box::new(self.all_ids()),
                    };
                    self.keep(pool, |desc| desc.weight == weight)
                }
            },
            FilterStep::Width => match query.width() {
                None => StepOutcome::Skip,
                Some(width) => {
                    let pool: Box<dyn Iterator<Item = FontId> + '_> = match candidates {
                        Some(set) => Box::new(set.iter().copied()),
                        None => Box::new(self.all_ids()),
                    };
                    self.keep(pool, |desc| desc.width == width)
                }
            },
            FilterStep::Italic => match query.italic() {
                None => StepOutcome::Skip,
                Some(italic) => {
                    let pool: Box<dyn Iterator<Item = FontId> + '_> = match candidates {
                        Some(set) => Box::new(set.iter().copied()),
                        // Zero asks for upright records, which the italic cache never holds.
                        None if italic == 0 => Box::new(self.all_ids()),
                        None => Box::new(self.italic.iter().copied()),
                    };
                    self.keep(pool, |desc| desc.italic == italic)
                }
            },
            FilterStep::MonoSpace => {
                self.narrow_by_flag(StyleFlag::MonoSpace, query.mono_space(), candidates)
            }
            FilterStep::Symbolic => {
                self.narrow_by_flag(StyleFlag::Symbolic, query.symbolic(), candidates)
            }
            FilterStep::TypeStyle => self.narrow_by_type_style(query.type_style(), candidates),
        }
    }

    fn narrow_by_name(
        &self,
        attr: NameAttribute,
        wanted: Option<&str>,
        candidates: Option<&BTreeSet<FontId>>,
    ) -> StepOutcome {
        let Some(wanted) = wanted else {
            return StepOutcome::Skip;
        };
        let Some(group) = self.group_map(attr).get(wanted) else {
            return StepOutcome::Reject;
        };
        match candidates {
            None => StepOutcome::from_set(group.clone()),
            Some(set) => StepOutcome::from_set(set.intersection(group).copied().collect()),
        }
    }

    fn narrow_by_flag(
        &self,
        flag: StyleFlag,
        required: bool,
        candidates: Option<&BTreeSet<FontId>>,
    ) -> StepOutcome {
        if !required {
            return StepOutcome::Skip;
        }
        match candidates {
            Some(set) => self.keep(set.iter().copied(), |desc| flag.holds_for(desc)),
            None => StepOutcome::from_set(self.members(flag).clone()),
        }
    }

    fn narrow_by_type_style(
        &self,
        style: TypeStyle,
        candidates: Option<&BTreeSet<FontId>>,
    ) -> StepOutcome {
        if style.is_empty() {
            return StepOutcome::Skip;
        }
        let want_italic = style.contains(TypeStyle::ITALIC);
        let want_bold = style.contains(TypeStyle::BOLD);

        if let Some(set) = candidates {
            // Combinator::Or: either requested property keeps the record.
            return self.keep(set.iter().copied(), |desc| {
                (want_italic && desc.is_italic()) || (want_bold && desc.is_bold())
            });
        }

        let mut seeded: Option<BTreeSet<FontId>> = None;
        if want_italic {
            if self.italic.is_empty() {
                debug!("italic cache is empty");
                return StepOutcome::Reject;
            }
            seeded = Some(self.italic.clone());
        }
        if want_bold {
            if self.bold.is_empty() {
                debug!("bold cache is empty");
                return StepOutcome::Reject;
            }
            seeded = Some(match seeded {
                None => self.bold.clone(),
                Some(italic) => italic.intersection(&self.bold).copied().collect(),
            });
        }

        match seeded {
            Some(set) => StepOutcome::from_set(set),
            None => StepOutcome::Reject,
        }
    }

    fn keep(
        &self,
        pool: impl Iterator<Item = FontId>,
        pred: impl Fn(&FontDescriptor) -> bool,
    ) -> StepOutcome {
        let kept: BTreeSet<FontId> = pool
            .filter(|id| self.descriptors.get(*id).is_some_and(&pred))
            .collect();
        StepOutcome::from_set(kept)
    }

    fn all_ids(&self) -> impl Iterator<Item = FontId> {
        0..self.descriptors.len()
    }

    fn group_map(&self, attr: NameAttribute) -> &HashMap<String, BTreeSet<FontId>> {
        match attr {
            NameAttribute::Family => &self.by_family,
            NameAttribute::FullName => &self.by_full_name,
            NameAttribute::PostScriptName => &self.by_post_script_name,
            NameAttribute::Subfamily => &self.by_subfamily,
        }
    }

    fn group_map_mut(&mut self, attr: NameAttribute) -> &mut HashMap<String, BTreeSet<FontId>> {
        match attr {
            NameAttribute::Family => &mut self.by_family,
            NameAttribute::FullName => &mut self.by_full_name,
            NameAttribute::PostScriptName => &mut self.by_post_script_name,
            NameAttribute::Subfamily => &mut self.by_subfamily,
        }
    }

    fn cache_mut(&mut self, flag: StyleFlag) -> &mut BTreeSet<FontId> {
        match flag {
            StyleFlag::Bold => &mut self.bold,
            StyleFlag::Italic => &mut self.italic,
            StyleFlag::MonoSpace => &mut self.mono_space,
            StyleFlag::Symbolic => &mut self.symbolic,
        }
    }
}
