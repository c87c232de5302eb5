pub mod config;
pub mod error;
pub mod file_config;
pub mod prompt_registry;
pub mod template;

pub use config::AppConfig;
pub use error::{ConfigError, ConfigResult};
pub use file_config::{
    build_combined_query, load_config, load_toml_value, DeliveryConfig, FileConfig, PromptConfig,
    QueryConfig, SearchConfig,
};
pub use prompt_registry::PromptRegistry;
