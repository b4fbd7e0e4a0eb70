use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use places_engine::{
    recommend::{CollaborativeFilter, InteractionModelBuilder, PromotionRanker},
    search::{CosineSearcher, MatchScoreSearcher, Searcher, TextIndexBuilder},
    Corpus, Like, Place, Preprocessor,
};

const WORDS: &[&str] = &[
    "rooftop", "bar", "cocktails", "museum", "history", "park", "garden", "tacos", "coffee", "bakery",
    "jazz", "club", "beach", "market", "vegan", "brunch", "gallery", "cinema", "library", "ramen",
];

fn create_test_corpus(places: usize, users: usize) -> Corpus {
    let place_list: Vec<Place> = (0..places)
        .map(|i| {
            let name = format!("{} {}", WORDS[i % WORDS.len()], WORDS[(i * 7) % WORDS.len()]);
            let description = (0..8)
                .map(|j| WORDS[(i * 3 + j * 5) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ");
            Place::new(format!("p{}", i), name, description)
        })
        .collect();
    let user_list: Vec<String> = (0..users).map(|i| format!("u{}", i)).collect();

    let mut likes = Vec::new();
    for u in 0..users {
        for j in 0..6 {
            let p = (u * 13 + j * 29) % places;
            likes.push(Like::new(format!("u{}", u), format!("p{}", p)));
        }
    }

    Corpus::new(user_list, place_list, likes)
}

fn bench_search(c: &mut Criterion) {
    let preprocessor = Preprocessor::default();
    let mut group = c.benchmark_group("search");

    for size in [100, 1000] {
        let corpus = create_test_corpus(size, 10);
        let index = TextIndexBuilder::new(preprocessor.clone())
            .build(&corpus.places)
            .unwrap();
        let tokens = preprocessor.preprocess("rooftop cocktails with jazz");

        group.bench_with_input(BenchmarkId::new("cosine", size), &index, |b, index| {
            b.iter(|| black_box(CosineSearcher::new().search(index, &tokens, 10).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("match_score", size), &index, |b, index| {
            b.iter(|| black_box(MatchScoreSearcher::new().search(index, &tokens, 10).unwrap()));
        });
    }
    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let preprocessor = Preprocessor::default();

    c.bench_function("preprocess_sentence", |b| {
        b.iter(|| {
            black_box(preprocessor.preprocess("The cities' oldest bakeries were serving freshly baked breads"))
        });
    });
}

fn bench_recommend(c: &mut Criterion) {
    let corpus = create_test_corpus(300, 500);
    let model = InteractionModelBuilder::default().build(&corpus).unwrap();
    let filter = CollaborativeFilter::default();
    let ranker = PromotionRanker::default();

    c.bench_function("recommend_user", |b| {
        b.iter(|| black_box(filter.recommend(&model, "u42").unwrap()));
    });

    c.bench_function("promotion_rank", |b| {
        b.iter(|| black_box(ranker.rank(&model, "p17", "u3").unwrap()));
    });

    c.bench_function("interaction_model_build", |b| {
        b.iter(|| black_box(InteractionModelBuilder::default().build(&corpus).unwrap()));
    });
}

criterion_group!(benches, bench_search, bench_preprocess, bench_recommend);
criterion_main!(benches);
