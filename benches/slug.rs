use criterion::{black_box, criterion_group, criterion_main, Criterion};

use invitation_service::services::slug::slugify;
use invitation_service::services::SlugGenerator;

fn bench_slugify(c: &mut Criterion) {
    let titles = [
        "Anna & Boris Wedding",
        "   ***   ",
        "Юбилей бабушки 80 лет",
        "A very long title for a corporate new year party with far too many words in it",
    ];

    c.bench_function("slugify", |b| {
        b.iter(|| {
            for title in titles {
                black_box(slugify(black_box(title)));
            }
        })
    });

    let generator = SlugGenerator::from_seed(Some(7), 10);
    c.bench_function("slug_candidate", |b| {
        b.iter(|| black_box(generator.candidate(black_box("Anna & Boris Wedding"))))
    });
}

criterion_group!(benches, bench_slugify);
criterion_main!(benches);
