use places_engine::{
    recommend::{InteractionModel, InteractionModelBuilder},
    search::{CosineSearcher, Searcher, TextIndexBuilder},
    ArtifactFamily, ArtifactStore, Corpus, EngineConfig, Like, Place, PlaceId, PlacesEngine, PlacesError,
    Preprocessor, RecommendationSource, SqliteArtifactStore,
};
use std::sync::Arc;

/// A and B share 8 of their 10 likers, C is liked by a separate crowd.
/// `alice` liked only A.
fn shared_likers_corpus() -> Corpus {
    let mut users: Vec<String> = (0..12).map(|i| format!("u{}", i)).collect();
    users.extend(["c0", "c1", "c2", "alice", "newbie"].map(String::from));

    let places = vec![
        Place::new("A", "Harbor oyster bar", "Fresh oysters and white wine by the docks"),
        Place::new("B", "Seaside fish market", "Grilled fish, clams and oysters at the harbor"),
        Place::new("C", "Mountain ski lodge", "Fondue and hot chocolate after a day on the slopes"),
    ];

    let mut likes = Vec::new();
    for i in 0..10 {
        likes.push(Like::new(format!("u{}", i), "A"));
    }
    for i in (0..8).chain(10..12) {
        likes.push(Like::new(format!("u{}", i), "B"));
    }
    for c in ["c0", "c1", "c2"] {
        likes.push(Like::new(c, "C"));
    }
    likes.push(Like::new("alice", "A"));

    Corpus::new(users, places, likes)
}

fn city_corpus() -> Corpus {
    let users: Vec<String> = (1..=8).map(|i| format!("user{}", i)).collect();
    let places = vec![
        Place::new("p1", "Blue Note Jazz Club", "Live jazz every night with cocktails"),
        Place::new("p2", "Green Park", "A quiet park with a pond and old trees"),
        Place::new("p3", "Sunset Rooftop Bar", "Cocktails and a view over the city"),
        Place::new("p4", "Old Town Museum", "History of the old town and its harbor"),
        Place::new("p5", "Corner Bakery", "Fresh bread and pastries baked every morning"),
        Place::new("p6", "Night Market", "Street food stalls open late"),
        Place::new("p7", "City Library", "Books, quiet rooms and free wifi"),
    ];
    let mut likes = Vec::new();
    for (u, p) in [
        (1, 1), (1, 3), (2, 1), (2, 3), (2, 6), (3, 2), (3, 7), (4, 4), (4, 7),
        (5, 1), (5, 6), (6, 5), (6, 2), (7, 3), (7, 6), (8, 4),
    ] {
        likes.push(Like::new(format!("user{}", u), format!("p{}", p)));
    }
    Corpus::new(users, places, likes)
}

async fn engine_with(corpus: Corpus) -> PlacesEngine {
    let engine = PlacesEngine::open(EngineConfig::in_memory()).await.unwrap();
    engine.rebuild_all(corpus).await.unwrap();
    engine
}

#[tokio::test]
async fn test_shared_likers_rank_above_unrelated() {
    let engine = engine_with(shared_likers_corpus()).await;

    let recs = engine.recommend_detailed("alice").unwrap();
    assert_eq!(recs.source, RecommendationSource::Neighbors);
    assert_eq!(recs.places.first().map(String::as_str), Some("B"));
    assert!(!recs.places.contains(&"C".to_string()));
    assert!(!recs.places.contains(&"A".to_string()));
}

#[tokio::test]
async fn test_zero_like_user_gets_single_fallback_place() {
    let engine = engine_with(shared_likers_corpus()).await;

    let recs = engine.recommend_detailed("newbie").unwrap();
    assert_eq!(recs.source, RecommendationSource::Fallback);
    assert_eq!(recs.places.len(), 1);
    assert!(["A", "B", "C"].contains(&recs.places[0].as_str()));
}

#[tokio::test]
async fn test_recommend_never_returns_liked_places() {
    let corpus = city_corpus();
    let engine = engine_with(corpus.clone()).await;

    for user in &corpus.users {
        let liked: Vec<&str> = corpus.likes_of(user).collect();
        let recs = engine.recommend(user).unwrap();
        assert!(recs.len() <= 5);
        assert!(recs.iter().all(|p| !liked.contains(&p.as_str())), "{} got {:?}", user, recs);
    }
}

#[tokio::test]
async fn test_recommend_unknown_user() {
    let engine = engine_with(city_corpus()).await;
    let err = engine.recommend("nobody").unwrap_err();
    assert!(matches!(err, PlacesError::NotFound { kind: "user", .. }));
}

#[tokio::test]
async fn test_exact_name_ranks_first() {
    let engine = engine_with(city_corpus()).await;

    let results = engine.search_scored("Sunset Rooftop Bar").unwrap();
    assert_eq!(results[0].place_id, "p3");
    assert!(results.len() <= 10);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_empty_query_does_not_fail() {
    let engine = engine_with(city_corpus()).await;

    let blank = engine.search("   ").unwrap();
    assert_eq!(blank, engine.search("").unwrap());
    assert_eq!(blank.len(), 7);
    assert!(engine.match_score("").unwrap().is_empty());
}

#[tokio::test]
async fn test_match_score_only_returns_matching_places() {
    let engine = engine_with(city_corpus()).await;

    let results = engine.match_score("cocktails").unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.place_id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"p1") && ids.contains(&"p3"));
}

#[tokio::test]
async fn test_promotion_excludes_requester() {
    let corpus = city_corpus();
    let engine = engine_with(corpus.clone()).await;

    for place in &corpus.places {
        for user in &corpus.users {
            let targets = engine.rank_promotion_targets(&place.id, user).unwrap();
            assert!(targets.len() <= 5);
            assert!(!targets.contains(user));
        }
    }

    // 8 users, so excluding the requester still leaves a full list
    let plan = engine.promote("p1", "user1").unwrap();
    assert_eq!(plan.sent, 5);
    assert_eq!(plan.targets.len(), 5);
}

#[tokio::test]
async fn test_rebuild_is_deterministic() {
    let corpus = city_corpus();

    let builder = TextIndexBuilder::new(Preprocessor::default());
    let first = builder.build(&corpus.places).unwrap();
    let second = builder.build(&corpus.places).unwrap();
    assert_eq!(first.vocabulary(), second.vocabulary());
    assert_eq!(first.place_ids(), second.place_ids());
    for doc in 0..first.len() {
        assert_eq!(first.weights_at(doc), second.weights_at(doc));
        assert_eq!(first.vector_at(doc), second.vector_at(doc));
    }

    let a = InteractionModelBuilder::default().build(&corpus).unwrap();
    let b = InteractionModelBuilder::default().build(&corpus).unwrap();
    assert_eq!(a.matrix(), b.matrix());
    assert_eq!(a.user_index(), b.user_index());
    assert_eq!(a.place_index(), b.place_index());
}

#[tokio::test]
async fn test_document_frequency_bounds() {
    let corpus = city_corpus();
    let index = TextIndexBuilder::new(Preprocessor::default())
        .build(&corpus.places)
        .unwrap();

    let n = corpus.places.len() as u32;
    for (_, df) in index.vocabulary().iter() {
        assert!(df >= 1 && df <= n);
    }
}

#[tokio::test]
async fn test_inconsistent_corpus_keeps_serving() {
    let engine = engine_with(city_corpus()).await;
    let before = engine.recommend("user1").unwrap();

    let mut broken = city_corpus();
    broken.likes.push(Like::new("user1", "p404"));
    let err = engine.rebuild_interactions(Arc::new(broken)).await.unwrap_err();
    assert!(matches!(err, PlacesError::InconsistentCorpus(_)));

    assert_eq!(engine.recommend("user1").unwrap(), before);
}

#[tokio::test]
async fn test_artifacts_loaded_on_start() {
    let path = std::env::temp_dir().join(format!("places-engine-test-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut config = EngineConfig::in_memory();
    config.db_path = path.to_string_lossy().to_string();

    {
        let engine = PlacesEngine::open(config.clone()).await.unwrap();
        engine.rebuild_all(city_corpus()).await.unwrap();
        assert_eq!(engine.store_stats().await.unwrap().total_artifacts, 2);
    }

    let reopened = PlacesEngine::open(config).await.unwrap();
    assert_eq!(reopened.search("jazz club").unwrap()[0], "p1");
    assert!(!reopened.recommend("user3").unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}

/// `u1` shares `p1` with `u2`, whose other like is `second`
fn swap_corpus(second: &str, names: [&str; 4]) -> Corpus {
    let users: Vec<String> = (1..=4).map(|i| format!("u{}", i)).collect();
    let places = names
        .iter()
        .enumerate()
        .map(|(i, name)| Place::new(format!("p{}", i + 1), *name, ""))
        .collect();
    let likes = vec![Like::new("u1", "p1"), Like::new("u2", "p1"), Like::new("u2", second)];
    Corpus::new(users, places, likes)
}

fn expected_search(corpus: &Corpus, query: &str) -> Vec<PlaceId> {
    let preprocessor = Preprocessor::default();
    let index = TextIndexBuilder::new(preprocessor.clone())
        .build(&corpus.places)
        .unwrap();
    CosineSearcher::new()
        .search(&index, &preprocessor.preprocess(query), 10)
        .unwrap()
        .into_iter()
        .map(|s| s.place_id)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rebuilds_publish_whole_snapshots() {
    let first = swap_corpus("p2", ["Jazz club", "Rooftop bar", "City museum", "Green park"]);
    let second = swap_corpus("p3", ["Rooftop bar", "Jazz club", "City museum", "Green park"]);

    let recommendations = [vec!["p2".to_string()], vec!["p3".to_string()]];
    let searches = [expected_search(&first, "jazz"), expected_search(&second, "jazz")];
    assert_ne!(searches[0], searches[1]);

    let store = Arc::new(SqliteArtifactStore::new(":memory:").await.unwrap());
    let engine = Arc::new(PlacesEngine::with_store(
        EngineConfig::in_memory(),
        store.clone(),
        Preprocessor::default(),
    ));
    engine.rebuild_all(first.clone()).await.unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let recommendations = recommendations.clone();
            let searches = searches.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let recs = engine.recommend("u1").unwrap();
                    assert!(recommendations.contains(&recs), "mixed recommendation {:?}", recs);
                    let found = engine.search("jazz").unwrap();
                    assert!(searches.contains(&found), "mixed search {:?}", found);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for round in 0..5 {
        let (a, b) = if round % 2 == 0 { (&first, &second) } else { (&second, &first) };
        let (ra, rb, ta, tb) = tokio::join!(
            engine.rebuild_interactions(Arc::new(a.clone())),
            engine.rebuild_interactions(Arc::new(b.clone())),
            engine.rebuild_text_index(Arc::new(a.places.clone())),
            engine.rebuild_text_index(Arc::new(b.places.clone())),
        );
        ra.unwrap();
        rb.unwrap();
        ta.unwrap();
        tb.unwrap();
    }

    for reader in readers {
        reader.await.unwrap();
    }

    // the last rebuild to take the family lock both saved and published
    let stored = store.load(ArtifactFamily::Interaction).await.unwrap().unwrap();
    let stored: InteractionModel = serde_json::from_str(&stored.payload).unwrap();
    let live = engine.interaction_model().unwrap();
    assert_eq!(stored.matrix(), live.matrix());
    assert_eq!(stored.built_at(), live.built_at());

    let stored = store.load(ArtifactFamily::Text).await.unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored.payload).unwrap();
    let live = engine.text_index().unwrap();
    assert_eq!(stored["place_ids"], serde_json::json!(live.place_ids()));
    assert_eq!(stored["built_at"], serde_json::json!(live.built_at()));
}
