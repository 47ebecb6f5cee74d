use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use skillmentor_core::config::{expand_path, Settings};
use skillmentor_core::traits::Embedder;
use skillmentor_core::{Category, Document, Error, Result};
use skillmentor_text::QueryKey;
use skillmentor_vector::{RetrievedDocument, Retriever};

use crate::backend::OllamaBackend;
use crate::catalog::AdviceCatalog;
use crate::classifier::CategoryClassifier;
use crate::generator::{AdviceSource, Generator};
use crate::memory::AdviceMemory;
use crate::personalize::Personalizer;
use crate::selector::{Advice, AdviceSelector};

/// Everything produced for one question.
#[derive(Debug, Clone, Serialize)]
pub struct AdviceResponse {
    pub id: Uuid,
    pub query: String,
    pub query_key: QueryKey,
    pub category: Category,
    pub advice: String,
    pub source: AdviceSource,
    /// Pool advice behind a fallback answer; backend answers consume none.
    pub strategy: Option<Advice>,
    pub documents: Vec<RetrievedDocument>,
    pub response_time: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub request_id: Uuid,
    pub rating: u8,
    pub comments: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Mean wall time of `advise`, in seconds.
    pub avg_response_time: f64,
    pub num_queries: usize,
    pub query_distribution: BTreeMap<Category, usize>,
    pub avg_user_rating: f64,
    pub num_feedback: usize,
}

#[derive(Debug, Default)]
struct MetricsLog {
    response_times: Vec<Duration>,
    categories: BTreeMap<Category, usize>,
    feedback: Vec<Feedback>,
}

/// Request pipeline: classify, pick rotating advice, retrieve context and
/// compose the final answer.
pub struct SkillMentor {
    retriever: Arc<Retriever>,
    classifier: CategoryClassifier,
    selector: AdviceSelector,
    generator: Generator,
    top_k: usize,
    metrics: Mutex<MetricsLog>,
}

impl SkillMentor {
    pub fn new(retriever: Arc<Retriever>, classifier: CategoryClassifier, selector: AdviceSelector, generator: Generator) -> Self {
        Self { retriever, classifier, selector, generator, top_k: 3, metrics: Mutex::new(MetricsLog::default()) }
    }

    /// Wire the pipeline from configuration: open the saved index, load the
    /// advice catalog and attach the completion backend when enabled.
    pub fn from_settings(settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        settings.validate()?;
        let retriever = Retriever::open(
            embedder,
            &expand_path(&settings.data.index_path),
            &expand_path(&settings.data.documents_path),
        )
        .with_batch_size(settings.retrieval.batch_size)
        .with_progress(settings.retrieval.show_progress);

        let catalog_path = settings.advice.catalog_path.as_deref().map(expand_path);
        let catalog = Arc::new(AdviceCatalog::builtin_or_file(catalog_path.as_deref())?);
        let memory = Arc::new(AdviceMemory::new());
        let selector = match settings.advice.seed {
            Some(seed) => AdviceSelector::with_seed(Arc::clone(&catalog), memory, seed)?,
            None => AdviceSelector::from_entropy(Arc::clone(&catalog), memory)?,
        };

        let mut generator = Generator::new(Personalizer::new(Arc::clone(&catalog)));
        if settings.generator.enabled {
            let backend = OllamaBackend::from_settings(&settings.generator)?;
            info!(model = backend.model(), url = %settings.generator.base_url, "completion backend enabled");
            generator = generator.with_backend(Arc::new(backend), Duration::from_millis(settings.generator.timeout_ms));
        }

        let classifier = CategoryClassifier::with_min_keyword_len(settings.advice.min_keyword_len);
        Ok(Self::new(Arc::new(retriever), classifier, selector, generator).with_top_k(settings.retrieval.top_k))
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self { self.top_k = top_k.max(1); self }

    pub fn retriever(&self) -> &Arc<Retriever> { &self.retriever }

    pub fn selector(&self) -> &AdviceSelector { &self.selector }

    pub async fn advise(&self, query: &str) -> Result<AdviceResponse> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("query must not be blank".into()));
        }
        let start = Instant::now();
        let query_key = QueryKey::from_query(query);
        let category = self.classifier.classify(query);

        // Embedding is synchronous and may run a full transformer pass.
        let retriever = Arc::clone(&self.retriever);
        let owned_query = query.to_string();
        let top_k = self.top_k;
        let retrieved = tokio::task::spawn_blocking(move || retriever.retrieve_documents(&owned_query, top_k))
            .await
            .unwrap_or_else(|e| Err(Error::Embedding(format!("retrieval task failed: {}", e))));
        let documents = match retrieved {
            Ok(docs) => docs,
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "retrieval failed; answering without context");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let texts: Vec<String> = documents.iter().map(|d| d.document.text.clone()).collect();
        let generated = self.generator.generate(query, &texts, category, || self.selector.select(category, query_key)).await;

        let response_time = start.elapsed();
        {
            let mut log = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
            log.response_times.push(response_time);
            *log.categories.entry(category).or_insert(0) += 1;
        }
        info!(%category, source = ?generated.source, documents = documents.len(), ms = response_time.as_millis() as u64, "advice ready");

        Ok(AdviceResponse {
            id: Uuid::new_v4(),
            query: query.to_string(),
            query_key,
            category,
            advice: generated.text,
            source: generated.source,
            strategy: generated.strategy,
            documents,
            response_time,
            timestamp: Utc::now(),
        })
    }

    pub fn record_feedback(&self, request_id: Uuid, rating: u8, comments: Option<String>) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::InvalidArgument(format!("rating must be between 1 and 5, got {}", rating)));
        }
        let feedback = Feedback { request_id, rating, comments, timestamp: Utc::now() };
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner).feedback.push(feedback);
        info!(%request_id, rating, "feedback recorded");
        Ok(())
    }

    pub fn feedback(&self) -> Vec<Feedback> { self.metrics.lock().unwrap_or_else(PoisonError::into_inner).feedback.clone() }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        let log = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        let num_queries = log.response_times.len();
        let avg_response_time = if num_queries == 0 {
            0.0
        } else {
            log.response_times.iter().map(Duration::as_secs_f64).sum::<f64>() / num_queries as f64
        };
        let avg_user_rating = if log.feedback.is_empty() {
            0.0
        } else {
            log.feedback.iter().map(|f| f64::from(f.rating)).sum::<f64>() / log.feedback.len() as f64
        };
        PerformanceMetrics {
            avg_response_time,
            num_queries,
            query_distribution: log.categories.clone(),
            avg_user_rating,
            num_feedback: log.feedback.len(),
        }
    }

    /// Build the index from `documents` and, when paths are given, save it.
    pub fn initialize_dataset(&self, documents: Vec<Document>, index_path: Option<&Path>, documents_path: Option<&Path>) -> Result<usize> {
        let count = self.retriever.create_index(documents)?;
        if let (Some(index_path), Some(documents_path)) = (index_path, documents_path) {
            self.retriever.save(index_path, documents_path)?;
        }
        Ok(count)
    }
}
