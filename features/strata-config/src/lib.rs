//! Strata Config provides a registry of configs that can be injected in the rest of the
//! modules.
//!
//! Strata Config is split into three major parts:
//! 1. ConfigProvider: Used to create the registry of all configs
//! 2. Config<T>: A wrapper type to be able to resolve and retrieve configs
//! 3. ConfigModule: Binds the registry in the container so constructors can import it
//!
//! # Examples
//!
//! ```rust
//! use strata_config::ConfigProvider;
//!
//! #[derive(Clone)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//!     app_name: String,
//! }
//!
//! let app_config = AppConfig {
//!     host: "localhost".to_string(),
//!     port: 8080_u16,
//!     app_name: "My Awesome App".to_string(),
//! };
//!
//! let mut config_provider = ConfigProvider::default();
//! config_provider.add_config(app_config.clone()).unwrap();
//!
//! let retrieved_config = config_provider.get::<AppConfig>().unwrap();
//!
//! assert_eq!(app_config.host, retrieved_config.host);
//! assert_eq!(app_config.port, retrieved_config.port);
//! assert_eq!(app_config.app_name, retrieved_config.app_name);
//! ```

pub mod config;
pub mod errors;
pub mod module;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use module::ConfigModule;
pub use provider::ConfigProvider;
