use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::core::{Corpus, Place, PlaceId, UserId};
use crate::error::{PlacesError, Result};
use crate::recommend::{
    CollaborativeFilter, InteractionModel, InteractionModelBuilder, PromotionPlan, PromotionRanker,
    Recommendations,
};
use crate::search::{CosineSearcher, MatchScoreSearcher, ScoredPlace, Searcher, TextIndex, TextIndexBuilder};
use crate::store::{ArtifactFamily, ArtifactStore, SqliteArtifactStore, StoreStats};
use crate::text::{NormalizerKind, Preprocessor};

/// Main engine: owns the published artifact snapshots and answers queries.
///
/// Each artifact family sits behind its own `RwLock<Option<Arc<_>>>`. Queries
/// clone the `Arc` and run without holding the lock; rebuilds construct a new
/// artifact, persist it and swap the `Arc`, so readers see the old or the new
/// snapshot and never a mix. A failed rebuild leaves the old one in place.
pub struct PlacesEngine {
    config: EngineConfig,
    store: Arc<dyn ArtifactStore>,
    preprocessor: Preprocessor,
    searcher: Arc<dyn Searcher>,
    interactions: RwLock<Option<Arc<InteractionModel>>>,
    text: RwLock<Option<Arc<TextSnapshot>>>,
    interaction_build: Mutex<()>,
    text_build: Mutex<()>,
}

/// Published text index and the preprocessor its vocabulary was built with.
/// Queries always go through this preprocessor so they land in the same
/// token space as the index.
struct TextSnapshot {
    index: Arc<TextIndex>,
    preprocessor: Preprocessor,
}

/// Outcome of a rebuild
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub family: ArtifactFamily,
    pub item_count: u64,
    pub payload_bytes: usize,
    pub elapsed_ms: f64,
}

/// Which artifacts were found at load time
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub interaction: bool,
    pub text: bool,
    /// Stored families that failed to decode and stay unpublished
    pub rejected: Vec<(ArtifactFamily, String)>,
}

impl PlacesEngine {
    /// Open the SQLite store at `config.db_path` and load any persisted artifacts
    pub async fn open(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(SqliteArtifactStore::new(&config.db_path).await?);
        let preprocessor = Preprocessor::from_kind(config.normalizer);

        let engine = Self::with_store(config, store, preprocessor);
        engine.load_artifacts().await?;
        Ok(engine)
    }

    /// Engine over an explicit store and normalizer; nothing is loaded yet
    pub fn with_store(config: EngineConfig, store: Arc<dyn ArtifactStore>, preprocessor: Preprocessor) -> Self {
        Self {
            config,
            store,
            preprocessor,
            searcher: Arc::new(CosineSearcher::new()),
            interactions: RwLock::new(None),
            text: RwLock::new(None),
            interaction_build: Mutex::new(()),
            text_build: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load persisted artifacts, publishing each family that is present.
    ///
    /// Families load independently: a payload that fails to decode is logged,
    /// reported in [`LoadReport::rejected`] and leaves only its own slot empty.
    pub async fn load_artifacts(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        if let Some(stored) = self.store.load(ArtifactFamily::Interaction).await? {
            match serde_json::from_str::<InteractionModel>(&stored.payload) {
                Ok(model) => {
                    tracing::info!(
                        "📦 Loaded interaction model ({} places, {} users) built {}",
                        model.matrix().n_places(),
                        model.matrix().n_users(),
                        stored.built_at
                    );
                    publish(&self.interactions, model);
                    report.interaction = true;
                }
                Err(e) => {
                    tracing::warn!("⚠️ Stored interaction model rejected: {}", e);
                    report.rejected.push((ArtifactFamily::Interaction, e.to_string()));
                }
            }
        }

        if let Some(stored) = self.store.load(ArtifactFamily::Text).await? {
            match self.decode_text_snapshot(&stored.payload) {
                Ok(snapshot) => {
                    tracing::info!(
                        "📦 Loaded text index ({} places, {} terms) built {}",
                        snapshot.index.len(),
                        snapshot.index.vocabulary().len(),
                        stored.built_at
                    );
                    publish(&self.text, snapshot);
                    report.text = true;
                }
                Err(e) => {
                    tracing::warn!("⚠️ Stored text index rejected: {}", e);
                    report.rejected.push((ArtifactFamily::Text, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Decode a stored text index and pick the preprocessor it was built with
    fn decode_text_snapshot(&self, payload: &str) -> Result<TextSnapshot> {
        let index: TextIndex = serde_json::from_str(payload)?;

        let preprocessor = if index.normalizer() == self.preprocessor.normalizer_name() {
            self.preprocessor.clone()
        } else {
            let kind = NormalizerKind::from_normalizer_name(index.normalizer()).ok_or_else(|| {
                PlacesError::Config(format!(
                    "text index built with unknown normalizer '{}'",
                    index.normalizer()
                ))
            })?;
            tracing::warn!(
                "⚠️ Text index built with '{}' normalizer, engine uses '{}'; queries follow the index until the next rebuild",
                index.normalizer(),
                self.preprocessor.normalizer_name()
            );
            Preprocessor::from_kind(kind)
        };

        Ok(TextSnapshot {
            index: Arc::new(index),
            preprocessor,
        })
    }

    /// Rebuild and publish the interaction matrix and both neighbor indices
    pub async fn rebuild_interactions(&self, corpus: Arc<Corpus>) -> Result<BuildReport> {
        let _guard = self.interaction_build.lock().await;
        let start = Instant::now();

        let builder = InteractionModelBuilder::new(self.config.user_neighbors, self.config.place_neighbors);
        let model = tokio::task::spawn_blocking(move || builder.build(&corpus))
            .await
            .map_err(|e| PlacesError::Other(format!("interaction build task failed: {}", e)))?
            .map_err(|e| {
                tracing::warn!("Interaction rebuild aborted, keeping previous model: {}", e);
                e
            })?;

        let payload = serde_json::to_string(&model)?;
        let item_count = model.matrix().like_count() as u64;
        self.store.save(ArtifactFamily::Interaction, &payload, item_count).await?;
        publish(&self.interactions, model);

        let report = BuildReport {
            family: ArtifactFamily::Interaction,
            item_count,
            payload_bytes: payload.len(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::info!("✅ Published interaction model in {:.1}ms", report.elapsed_ms);
        Ok(report)
    }

    /// Rebuild and publish the vocabulary, weight table and document vectors
    pub async fn rebuild_text_index(&self, places: Arc<Vec<Place>>) -> Result<BuildReport> {
        let _guard = self.text_build.lock().await;
        let start = Instant::now();

        let builder = TextIndexBuilder::new(self.preprocessor.clone()).with_alpha(self.config.title_alpha);
        let index = tokio::task::spawn_blocking(move || builder.build(&places))
            .await
            .map_err(|e| PlacesError::Other(format!("text index build task failed: {}", e)))?
            .map_err(|e| {
                tracing::warn!("Text index rebuild aborted, keeping previous index: {}", e);
                e
            })?;

        let payload = serde_json::to_string(&index)?;
        let item_count = index.len() as u64;
        self.store.save(ArtifactFamily::Text, &payload, item_count).await?;
        publish(
            &self.text,
            TextSnapshot {
                index: Arc::new(index),
                preprocessor: self.preprocessor.clone(),
            },
        );

        let report = BuildReport {
            family: ArtifactFamily::Text,
            item_count,
            payload_bytes: payload.len(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::info!("✅ Published text index in {:.1}ms", report.elapsed_ms);
        Ok(report)
    }

    /// Rebuild both families from one snapshot
    pub async fn rebuild_all(&self, corpus: Corpus) -> Result<Vec<BuildReport>> {
        let places = Arc::new(corpus.places.clone());
        let interaction = self.rebuild_interactions(Arc::new(corpus)).await?;
        let text = self.rebuild_text_index(places).await?;
        Ok(vec![interaction, text])
    }

    /// Current interaction snapshot
    pub fn interaction_model(&self) -> Result<Arc<InteractionModel>> {
        current(&self.interactions).ok_or(PlacesError::ArtifactMissing("interaction"))
    }

    /// Current text snapshot
    pub fn text_index(&self) -> Result<Arc<TextIndex>> {
        Ok(self.text_snapshot()?.index.clone())
    }

    fn text_snapshot(&self) -> Result<Arc<TextSnapshot>> {
        current(&self.text).ok_or(PlacesError::ArtifactMissing("text"))
    }

    /// Top places for `query` by cosine similarity
    pub fn search(&self, query: &str) -> Result<Vec<PlaceId>> {
        Ok(self
            .search_scored(query)?
            .into_iter()
            .map(|s| s.place_id)
            .collect())
    }

    pub fn search_scored(&self, query: &str) -> Result<Vec<ScoredPlace>> {
        self.run_search(self.searcher.as_ref(), query)
    }

    /// Top places by summed TF-IDF weight of the query tokens they contain
    pub fn match_score(&self, query: &str) -> Result<Vec<ScoredPlace>> {
        self.run_search(&MatchScoreSearcher::new(), query)
    }

    fn run_search(&self, searcher: &dyn Searcher, query: &str) -> Result<Vec<ScoredPlace>> {
        let snapshot = self.text_snapshot()?;
        let start = Instant::now();

        let tokens = snapshot.preprocessor.preprocess(query);
        let results = searcher.search(&snapshot.index, &tokens, self.config.search_limit)?;

        tracing::debug!(
            "{} search {:?} → {} results ({} tokens, {:.2}ms)",
            searcher.name(),
            query,
            results.len(),
            tokens.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(results)
    }

    /// Up to `recommend_limit` places liked by similar users that `user` has not liked
    pub fn recommend(&self, user: &str) -> Result<Vec<PlaceId>> {
        Ok(self.recommend_detailed(user)?.places)
    }

    pub fn recommend_detailed(&self, user: &str) -> Result<Recommendations> {
        let model = self.interaction_model()?;
        CollaborativeFilter::new(self.config.recommend_limit, self.config.fallback_max_attempts)
            .recommend(&model, user)
    }

    /// Up to `promotion_limit` users most likely to be interested in `place`,
    /// never including `requesting_user`
    pub fn rank_promotion_targets(&self, place: &str, requesting_user: &str) -> Result<Vec<UserId>> {
        let model = self.interaction_model()?;
        PromotionRanker::new(self.config.promotion_limit).rank(&model, place, requesting_user)
    }

    pub fn promote(&self, place: &str, requesting_user: &str) -> Result<PromotionPlan> {
        let model = self.interaction_model()?;
        PromotionRanker::new(self.config.promotion_limit).plan(&model, place, requesting_user)
    }

    /// Get artifact store statistics
    pub async fn store_stats(&self) -> Result<StoreStats> {
        self.store.stats().await
    }
}

fn current<T>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

fn publish<T>(slot: &RwLock<Option<Arc<T>>>, artifact: T) {
    *slot.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(artifact));
}
