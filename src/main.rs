use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use storyforge::application::ports::{ArtifactStore, JobRepository, LlmClient};
use storyforge::application::services::{MergeStrategy, PipelineService, PipelineWorker};
use storyforge::infrastructure::llm::{AnthropicClient, MockLlmClient};
use storyforge::infrastructure::observability::{init_tracing, TracingConfig};
use storyforge::infrastructure::persistence::{create_pool, PgJobRepository};
use storyforge::infrastructure::storage::ArtifactStoreFactory;
use storyforge::infrastructure::text_processing::{CompositeFileLoader, TextSplitterFactory};
use storyforge::presentation::config::{Environment, MergeStrategySetting, Settings};
use storyforge::presentation::state::AppState;
use storyforge::presentation::create_router;

const PIPELINE_QUEUE_DEPTH: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("failed to load configuration")?;

    init_tracing(
        TracingConfig {
            environment: environment.to_string(),
            json_format: settings.logging.enable_json,
            level: settings.logging.level.clone(),
        },
        settings.server.port,
    );

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    let job_repository: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(pool));

    let artifact_store: Arc<dyn ArtifactStore> = ArtifactStoreFactory::create(&settings.storage)
        .context("failed to initialize artifact store")?;

    let file_loader = Arc::new(CompositeFileLoader::standard());
    let text_splitter = TextSplitterFactory::create(
        settings.chunking.strategy,
        settings.chunking.chunk_size,
        settings.chunking.overlap,
    );

    let llm: Arc<dyn LlmClient> = if settings.llm.use_mock {
        tracing::warn!("Using mock LLM client; no model calls will be made");
        Arc::new(MockLlmClient)
    } else {
        match &settings.llm.base_url {
            Some(base_url) => Arc::new(AnthropicClient::with_base_url(
                settings.llm.api_key.clone(),
                settings.llm.model.clone(),
                settings.llm.temperature,
                base_url.clone(),
            )),
            None => Arc::new(AnthropicClient::new(
                settings.llm.api_key.clone(),
                settings.llm.model.clone(),
                settings.llm.temperature,
            )),
        }
    };

    let merge_strategy = match settings.merge.strategy {
        MergeStrategySetting::Heuristic => MergeStrategy::Heuristic,
        MergeStrategySetting::Scalable => MergeStrategy::Scalable,
    };

    let pipeline_service = Arc::new(PipelineService::new(
        file_loader,
        text_splitter,
        llm,
        Arc::clone(&artifact_store),
        merge_strategy,
    ));

    let (pipeline_sender, pipeline_receiver) = mpsc::channel(PIPELINE_QUEUE_DEPTH);
    let worker = PipelineWorker::new(
        pipeline_receiver,
        pipeline_service,
        Arc::clone(&job_repository),
        Arc::clone(&artifact_store),
    );
    tokio::spawn(worker.run());

    let state = AppState::new(
        job_repository,
        artifact_store,
        pipeline_sender,
        settings.clone(),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(address = %addr, "Listening");
    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}
