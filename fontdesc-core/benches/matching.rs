//! Criterion benchmark for index population and query narrowing (made by FontLab https://www.fontlab.com/)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fontdesc_core::{DescriptorQuery, FontDescriptor, FontIndex, TypeStyle};

fn synthetic_faces(families: usize) -> Vec<FontDescriptor> {
    let styles = [
        ("Regular", 400, 0),
        ("Bold", 700, 0),
        ("Italic", 400, 1),
        ("Bold Italic", 700, 1),
        ("Light", 300, 0),
        ("Black", 900, 0),
    ];
    (0..families)
        .flat_map(|f| {
            styles.iter().map(move |(style, weight, italic)| {
                let family = format!("Family {f:04}");
                FontDescriptor::new(family.clone(), format!("{family} {style}"))
                    .with_path(format!("/fonts/family-{f:04}.ttc"))
                    .with_subfamily(*style)
                    .with_weight(*weight)
                    .with_width(5)
                    .with_italic(*italic)
                    .with_mono_space(f % 7 == 0)
            })
        })
        .collect()
}

fn populated(families: usize) -> FontIndex {
    let mut index = FontIndex::new();
    for desc in synthetic_faces(families) {
        index.scatter(desc);
    }
    index
}

fn bench_scatter(c: &mut Criterion) {
    let faces = synthetic_faces(500);

    c.bench_function("scatter 3000 faces", |b| {
        b.iter(|| {
            let mut index = FontIndex::new();
            for desc in faces.iter().cloned() {
                index.scatter(desc);
            }
            black_box(index.len())
        })
    });
}

fn bench_queries(c: &mut Criterion) {
    let index = populated(500);
    let by_family = DescriptorQuery::new()
        .with_family("Family 0250")
        .with_weight(700);
    let by_style = DescriptorQuery::new()
        .require_mono_space(true)
        .with_type_style(TypeStyle::BOLD | TypeStyle::ITALIC);
    let everything = DescriptorQuery::new();

    c.bench_function("family + weight", |b| {
        b.iter(|| index.match_ids(black_box(&by_family)))
    });

    c.bench_function("mono + style bits", |b| {
        b.iter(|| index.match_ids(black_box(&by_style)))
    });

    c.bench_function("unconstrained", |b| {
        b.iter(|| index.match_ids(black_box(&everything)))
    });
}

criterion_group!(benches, bench_scatter, bench_queries);
criterion_main!(benches);
