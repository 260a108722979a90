mod aggregation;
mod pipeline_service;
mod pipeline_worker;
mod scalable_merger;
mod story_generation;
mod story_merger;
mod token_counter;

pub use aggregation::{build_exports, process_stories, BacklogExports};
pub use pipeline_service::{MergeStrategy, PipelineError, PipelineOutcome, PipelineService};
pub use pipeline_worker::{PipelineMessage, PipelineWorker};
pub use scalable_merger::ScalableMerger;
pub use story_generation::{StoryGenerationError, StoryGenerator};
pub use story_merger::StoryMerger;
pub use token_counter::{count_tokens, truncate_to_budget};
