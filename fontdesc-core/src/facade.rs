//! Caller-facing match requests (made by FontLab https://www.fontlab.com/)
//!
//! Requests arrive as partial descriptors in the binding encoding: every key
//! is optional and zero, `""` or `false` leave the attribute open.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::descriptor::{FontDescriptor, TypeStyle};
use crate::manager::IndexManager;
use crate::query::DescriptorQuery;
use crate::worker::TaskHandle;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchRequest {
    pub post_script_name: String,
    pub full_name: String,
    pub font_family: String,
    pub font_subfamily: String,
    pub weight: i32,
    pub width: i32,
    pub italic: i32,
    pub mono_space: bool,
    pub symbolic: bool,
    pub type_style: i32,
}

impl MatchRequest {
    /// Convert to a typed query. `None` means the request can never match
    /// (a negative weight, width or typeStyle).
    pub fn into_query(self) -> Option<DescriptorQuery> {
        if self.weight < 0 || self.width < 0 || self.type_style < 0 {
            info!(
                weight = self.weight,
                width = self.width,
                type_style = self.type_style,
                "negative attribute in match request"
            );
            return None;
        }

        let mut query = DescriptorQuery::new()
            .require_mono_space(self.mono_space)
            .require_symbolic(self.symbolic)
            .with_type_style(TypeStyle::from_bits(self.type_style as u32));
        if !self.font_family.is_empty() {
            query = query.with_family(self.font_family);
        }
        if !self.full_name.is_empty() {
            query = query.with_full_name(self.full_name);
        }
        if !self.post_script_name.is_empty() {
            query = query.with_post_script_name(self.post_script_name);
        }
        if !self.font_subfamily.is_empty() {
            query = query.with_subfamily(self.font_subfamily);
        }
        if self.weight != 0 {
            query = query.with_weight(u16::try_from(self.weight).ok()?);
        }
        if self.width != 0 {
            query = query.with_width(u16::try_from(self.width).ok()?);
        }
        if self.italic != 0 {
            query = query.with_italic(self.italic);
        }
        Some(query)
    }
}

/// Match a request against the managed index, waiting for any pending scan.
///
/// An absent request is rejected with an empty result. Results are sorted by
/// path, then full name.
pub fn matching_font_descriptors(
    manager: &IndexManager,
    request: Option<&MatchRequest>,
) -> Vec<FontDescriptor> {
    let Some(request) = request else {
        error!("match request is missing");
        return Vec::new();
    };
    let Some(query) = request.clone().into_query() else {
        return Vec::new();
    };

    let mut found = manager.match_query(&query);
    sort_descriptors(&mut found);
    found
}

/// Callback flavour of [`matching_font_descriptors`]; `notify` runs on a
/// query worker once the sorted result is complete.
pub fn matching_font_descriptors_with<F>(
    manager: &IndexManager,
    request: Option<MatchRequest>,
    notify: F,
) -> TaskHandle<()>
where
    F: FnOnce(Vec<FontDescriptor>) + Send + 'static,
{
    let Some(request) = request else {
        error!("match request is missing");
        notify(Vec::new());
        return TaskHandle::ready(());
    };
    let Some(query) = request.into_query() else {
        notify(Vec::new());
        return TaskHandle::ready(());
    };

    manager.match_with_callback(query, move |mut found| {
        sort_descriptors(&mut found);
        notify(found);
    })
}

pub fn sort_descriptors(descriptors: &mut [FontDescriptor]) {
    descriptors.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
}
