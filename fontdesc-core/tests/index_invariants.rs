/// Keeping the index honest
///
/// Scenario checks for the matcher plus property tests over random
/// descriptor sets: dedup keys stay unique, caches hold exactly the faces
/// they claim, adding a constraint never widens a result, and the first
/// failing filter empties the answer no matter what follows.
use std::collections::BTreeSet;

use proptest::prelude::*;

use fontdesc_core::index::{FontIndex, NameAttribute, StyleFlag};
use fontdesc_core::{DescriptorQuery, FontDescriptor, TypeStyle};

fn index_of(descs: &[FontDescriptor]) -> FontIndex {
    let mut index = FontIndex::new();
    for desc in descs {
        index.scatter(desc.clone());
    }
    index
}

#[test]
fn roboto_family_query_finds_roboto() {
    let index = index_of(&[FontDescriptor::new("Roboto", "Roboto Regular").with_weight(400)]);

    let found = index.match_query(&DescriptorQuery::new().with_family("Roboto"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].full_name, "Roboto Regular");

    assert!(index
        .match_query(&DescriptorQuery::new().with_family("Arial"))
        .is_empty());
}

#[test]
fn weight_picks_bold_sibling() {
    let index = index_of(&[
        FontDescriptor::new("X", "X-Bold").with_weight(700),
        FontDescriptor::new("X", "X-Italic")
            .with_weight(400)
            .with_italic(1),
    ]);

    let bold = index.match_query(&DescriptorQuery::new().with_family("X").with_weight(700));
    assert_eq!(bold.len(), 1);
    assert_eq!(bold[0].full_name, "X-Bold");

    assert_eq!(index.match_query(&DescriptorQuery::new()).len(), 2);
}

#[test]
fn bold_type_style_alone_returns_bold_cache() {
    let index = index_of(&[FontDescriptor::new("", "Nameless Heavy").with_weight(700)]);

    let found = index.match_ids(&DescriptorQuery::new().with_type_style(TypeStyle::BOLD));
    assert_eq!(&found, index.members(StyleFlag::Bold));
    assert_eq!(found.len(), 1);
}

#[test]
fn scattering_twice_keeps_one_record() {
    let desc = FontDescriptor::new("Dup", "Dup Regular");
    let index = index_of(&[desc.clone(), desc]);

    assert_eq!(index.len(), 1);
}

#[test]
fn failing_first_constraint_wins_over_later_ones() {
    let index = index_of(&[
        FontDescriptor::new("A", "A Bold").with_weight(700),
        FontDescriptor::new("B", "B Bold").with_weight(700),
    ]);

    // Weight and style alone would match everything.
    let query = DescriptorQuery::new()
        .with_family("Missing")
        .with_weight(700)
        .with_type_style(TypeStyle::BOLD);
    assert!(index.match_ids(&query).is_empty());
}

fn arb_descriptor() -> impl Strategy<Value = FontDescriptor> {
    (
        prop::sample::select(vec!["", "Alpha", "Beta", "Gamma"]),
        prop::sample::select(vec!["", "Regular", "Bold", "Italic", "Mono"]),
        prop::sample::select(vec!["", "PS-A", "PS-B"]),
        prop::sample::select(vec![0u16, 300, 400, 500, 700, 900]),
        prop::sample::select(vec![0u16, 3, 5, 7]),
        0i32..3,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(family, style, ps, weight, width, italic, mono, symbolic)| {
            FontDescriptor::new(family, format!("{family} {style}").trim().to_string())
                .with_post_script_name(ps)
                .with_subfamily(style)
                .with_weight(weight)
                .with_width(width)
                .with_italic(italic)
                .with_mono_space(mono)
                .with_symbolic(symbolic)
        })
}

fn arb_query() -> impl Strategy<Value = DescriptorQuery> {
    (
        prop::option::of(prop::sample::select(vec!["Alpha", "Beta", "Nope"])),
        prop::option::of(prop::sample::select(vec!["Regular", "Bold", "Italic"])),
        prop::option::of(prop::sample::select(vec![300u16, 400, 700])),
        prop::option::of(prop::sample::select(vec![3u16, 5])),
        prop::option::of(1i32..3),
        any::<bool>(),
        any::<bool>(),
        0u32..4,
    )
        .prop_map(|(family, sub, weight, width, italic, mono, symbolic, style)| {
            let mut q = DescriptorQuery::new()
                .require_mono_space(mono)
                .require_symbolic(symbolic)
                .with_type_style(TypeStyle::from_bits(style));
            if let Some(f) = family {
                q = q.with_family(f);
            }
            if let Some(s) = sub {
                q = q.with_subfamily(s);
            }
            if let Some(w) = weight {
                q = q.with_weight(w);
            }
            if let Some(w) = width {
                q = q.with_width(w);
            }
            if let Some(i) = italic {
                q = q.with_italic(i);
            }
            q
        })
}

/// One attribute added on top of an existing query.
#[derive(Debug, Clone)]
enum Extra {
    Family(&'static str),
    Subfamily(&'static str),
    Weight(u16),
    Width(u16),
    Mono,
    Symbolic,
}

impl Extra {
    fn is_unset_in(&self, query: &DescriptorQuery) -> bool {
        match self {
            Extra::Family(_) => query.font_family().is_none(),
            Extra::Subfamily(_) => query.font_subfamily().is_none(),
            Extra::Weight(_) => query.weight().is_none(),
            Extra::Width(_) => query.width().is_none(),
            Extra::Mono => !query.mono_space(),
            Extra::Symbolic => !query.symbolic(),
        }
    }

    fn apply(&self, query: DescriptorQuery) -> DescriptorQuery {
        match *self {
            Extra::Family(family) => query.with_family(family),
            Extra::Subfamily(sub) => query.with_subfamily(sub),
            Extra::Weight(weight) => query.with_weight(weight),
            Extra::Width(width) => query.with_width(width),
            Extra::Mono => query.require_mono_space(true),
            Extra::Symbolic => query.require_symbolic(true),
        }
    }
}

fn arb_extra() -> impl Strategy<Value = Extra> {
    prop_oneof![
        prop::sample::select(vec!["Alpha", "Beta", "Gamma", "Nope"]).prop_map(Extra::Family),
        prop::sample::select(vec!["Regular", "Bold", "Italic", "Mono"]).prop_map(Extra::Subfamily),
        prop::sample::select(vec![300u16, 400, 500, 700, 900]).prop_map(Extra::Weight),
        prop::sample::select(vec![3u16, 5, 7]).prop_map(Extra::Width),
        Just(Extra::Mono),
        Just(Extra::Symbolic),
    ]
}

proptest! {
    #[test]
    fn dedup_key_is_unique(descs in prop::collection::vec(arb_descriptor(), 0..40)) {
        let index = index_of(&descs);
        let keys: BTreeSet<(String, String)> =
            index.iter().map(|(_, d)| d.dedup_key()).collect();
        prop_assert_eq!(keys.len(), index.len());
    }

    #[test]
    fn caches_hold_exactly_their_members(descs in prop::collection::vec(arb_descriptor(), 0..40)) {
        let index = index_of(&descs);
        for flag in StyleFlag::ALL {
            let expected: BTreeSet<usize> = index
                .iter()
                .filter(|(_, d)| flag.holds_for(d))
                .map(|(id, _)| id)
                .collect();
            prop_assert_eq!(index.members(flag), &expected);
        }
    }

    #[test]
    fn every_record_sits_in_its_name_groups(descs in prop::collection::vec(arb_descriptor(), 0..40)) {
        let index = index_of(&descs);
        for (id, desc) in index.iter() {
            let keyed = [
                (NameAttribute::Family, &desc.font_family),
                (NameAttribute::FullName, &desc.full_name),
                (NameAttribute::PostScriptName, &desc.post_script_name),
                (NameAttribute::Subfamily, &desc.font_subfamily),
            ];
            for (attr, key) in keyed {
                let group = index.group(attr, key);
                prop_assert!(group.is_some_and(|g| g.contains(&id)));
            }
        }
    }

    #[test]
    fn matcher_agrees_with_per_record_check(
        descs in prop::collection::vec(arb_descriptor(), 0..40),
        query in arb_query(),
    ) {
        let index = index_of(&descs);
        let expected: BTreeSet<usize> = index
            .iter()
            .filter(|(_, d)| query.is_unconstrained() || query.matches(d))
            .map(|(id, _)| id)
            .collect();
        prop_assert_eq!(index.match_ids(&query), expected);
    }

    #[test]
    fn extra_constraint_never_widens(
        descs in prop::collection::vec(arb_descriptor(), 0..40),
        query in arb_query(),
        extra in arb_extra(),
    ) {
        // A constraint ahead of typeStyle can switch the style bits from AND
        // to OR; only compare queries without style bits.
        prop_assume!(extra.is_unset_in(&query));
        let query = query.with_type_style(TypeStyle::NONE);
        let index = index_of(&descs);
        let wide = index.match_ids(&query);
        let narrow = index.match_ids(&extra.apply(query.clone()));
        prop_assert!(narrow.is_subset(&wide), "{:?} widened {:?}", extra, query);
    }

    #[test]
    fn empty_query_returns_everything(descs in prop::collection::vec(arb_descriptor(), 0..40)) {
        let index = index_of(&descs);
        prop_assert_eq!(index.match_ids(&DescriptorQuery::new()).len(), index.len());
    }

    #[test]
    fn clearing_twice_leaves_empty_index(descs in prop::collection::vec(arb_descriptor(), 0..20)) {
        let mut index = index_of(&descs);
        index.clear();
        let once = index.stats();
        index.clear();
        prop_assert_eq!(once, index.stats());
        prop_assert!(index.is_empty());
    }
}
