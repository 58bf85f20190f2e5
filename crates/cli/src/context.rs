//! Service assembly shared by the commands.

use fastrag_core::{config::AppConfig, AppError, AppResult};
use fastrag_knowledge::{
    create_provider, load_pages, EmbeddingConfig, EmbeddingProvider, IndexOutcome, Indexer,
    Lifecycle, QueryService, SqliteVectorStore, VectorStore,
};
use fastrag_llm::{client_from_settings, GenerationConfig};
use fastrag_prompt::{resolve_prompt, PromptBuilder};
use std::sync::Arc;

/// Long-lived components built once per process from the configuration.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<SqliteVectorStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub lifecycle: Arc<Lifecycle>,
}

impl AppContext {
    /// Validate the configuration and open the vector store.
    pub fn open(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        config.ensure_fastrag_dir()?;

        let store_path = config.store_path();
        let store = Arc::new(SqliteVectorStore::open(&store_path)?);
        let embedder = create_provider(&EmbeddingConfig::from(&config.embedding))?;

        tracing::debug!(
            store = ?store_path,
            embedding_provider = embedder.provider_name(),
            embedding_model = embedder.model_name(),
            "Opened application context"
        );

        Ok(Self {
            config,
            store,
            embedder,
            lifecycle: Arc::new(Lifecycle::new()),
        })
    }

    /// Run startup indexing and mark the service ready.
    ///
    /// The corpus is only read when the store is still empty.
    pub async fn start(&self) -> AppResult<Option<IndexOutcome>> {
        let pages = if self.store.count()? > 0 {
            Vec::new()
        } else {
            let corpus = self.config.corpus.as_ref().ok_or_else(|| {
                AppError::Config(
                    "The store is empty and no corpus is configured. Use --corpus or set corpus.path in .fastrag/config.yaml".to_string(),
                )
            })?;
            load_pages(corpus)?
        };

        let indexer = Indexer::new(
            self.store.clone(),
            self.embedder.clone(),
            self.config.chunk_size,
        )
        .with_batch_size(self.config.embedding.batch_size);

        self.lifecycle.start(&indexer, &pages).await
    }

    /// Build the query service over this context.
    pub fn query_service(&self) -> AppResult<QueryService> {
        let definition =
            resolve_prompt(&self.config.workspace, self.config.prompt_id.as_deref())?;
        let generator = client_from_settings(&self.config.generation)?;

        Ok(QueryService::new(
            self.lifecycle.clone(),
            self.store.clone(),
            self.embedder.clone(),
            PromptBuilder::new(definition)?,
            generator,
            GenerationConfig::from(&self.config.generation),
        )
        .with_top_k(self.config.top_k))
    }
}
