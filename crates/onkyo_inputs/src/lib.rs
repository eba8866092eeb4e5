pub mod config;
pub mod eiscp;
pub mod inputs;
pub mod labels;
pub mod query;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use inputs::CustomNames;
pub use inputs::InputId;
pub use labels::DisplayOption;
pub use labels::LabelTable;
pub use query::QueryOptions;
pub use query::query_custom_names;
