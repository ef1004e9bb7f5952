mod environment;
mod settings;

pub use environment::{Environment, UnknownEnvironment};
pub use settings::{
    ContextSettings, LlmSettings, LoggingSettings, PricingSettings, ServerSettings, Settings,
    StorageSettings, WireFormat,
};
