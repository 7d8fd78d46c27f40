// Environment selection and settings for Trellis applications

pub mod env;
pub mod environment;
pub mod error;
pub mod settings;

pub use env::EnvLoader;
pub use environment::ActiveEnvironment;
pub use error::{ConfigError, Result};
pub use settings::Settings;
