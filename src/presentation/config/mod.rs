mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkingSettings, ChunkingStrategy, DatabaseSettings, LlmSettings, LoggingSettings,
    MergeSettings, MergeStrategySetting, ServerSettings, Settings, StorageProviderSetting,
    StorageSettings,
};
