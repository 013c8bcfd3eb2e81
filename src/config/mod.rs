//! Configuration document model, loading, and validation.

mod error;
mod loader;
mod types;

pub use error::{ConfigError, ValidationIssue};
pub use loader::load;
pub use types::{
    Configuration, EffectiveServiceConfig, ExpectedValidation, GlobalSettings, HeaderPair, Method,
    Protocol, ServiceDefinition,
};
