use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use storyforge::application::ports::{ArtifactStore, LlmClient};
use storyforge::application::services::{MergeStrategy, PipelineService};
use storyforge::domain::{ContentType, Document, JobId};
use storyforge::infrastructure::llm::{AnthropicClient, MockLlmClient};
use storyforge::infrastructure::observability::{init_tracing, TracingConfig};
use storyforge::infrastructure::storage::ObjectStoreAdapter;
use storyforge::infrastructure::text_processing::{CompositeFileLoader, TextSplitterFactory};
use storyforge::presentation::config::ChunkingStrategy;

/// Run the whole pipeline against one local file, without the HTTP
/// server or a database. Artifacts land under the output directory.
#[derive(Parser)]
#[command(name = "local_run", version, about)]
struct Args {
    /// Document to process (.pdf, .md, or .txt)
    input_file: PathBuf,

    /// Directory for staged chunks, per-chunk stories, and exports
    #[arg(long, default_value = "./data")]
    output_dir: PathBuf,

    /// Target chunk size in characters
    #[arg(long, default_value_t = 4000)]
    chunk_size: usize,

    /// Overlap carried between adjacent chunks, in characters
    #[arg(long, default_value_t = 200)]
    overlap: usize,

    /// Model name for story generation
    #[arg(long, default_value = "claude-3-5-sonnet-20241022")]
    model: String,

    /// Use canned responses instead of calling the model
    #[arg(long)]
    mock_llm: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(
        TracingConfig {
            environment: "local-cli".to_string(),
            json_format: false,
            level: "info".to_string(),
        },
        0,
    );

    let filename = args
        .input_file
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .with_context(|| format!("invalid input path: {}", args.input_file.display()))?;

    let Some(content_type) = ContentType::from_extension(&filename) else {
        bail!("unsupported file type: {}. Supported: .pdf, .md, .txt", filename);
    };

    let data = std::fs::read(&args.input_file)
        .with_context(|| format!("failed to read {}", args.input_file.display()))?;
    let document = Document::new(filename, content_type, data.len() as u64);

    let artifact_store: Arc<dyn ArtifactStore> =
        Arc::new(ObjectStoreAdapter::local(args.output_dir.clone())?);
    let file_loader = Arc::new(CompositeFileLoader::standard());
    let text_splitter =
        TextSplitterFactory::create(ChunkingStrategy::Section, args.chunk_size, args.overlap);

    let (llm, merge_strategy): (Arc<dyn LlmClient>, MergeStrategy) = if args.mock_llm {
        (Arc::new(MockLlmClient), MergeStrategy::Heuristic)
    } else {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY must be set unless --mock-llm is used")?;
        (
            Arc::new(AnthropicClient::new(api_key, args.model.clone(), 0.3)),
            MergeStrategy::Scalable,
        )
    };

    let service = PipelineService::new(
        file_loader,
        text_splitter,
        llm,
        Arc::clone(&artifact_store),
        merge_strategy,
    );

    let job_id = JobId::new();
    let outcome = service
        .run(job_id, &data, &document)
        .await
        .context("pipeline failed")?;

    println!("Generated {} stories.", outcome.story_count);
    println!("Exports:");
    for path in &outcome.output_files {
        println!("  {}", args.output_dir.join(path.as_str()).display());
    }

    Ok(())
}
