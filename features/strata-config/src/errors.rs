use strata_di::TypeInfo;

/// Errors when registering or acquiring a config
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The required Config is not known
    #[error("The config '{0}' is not registered")]
    Missing(TypeInfo),
    /// The Config type was registered before
    #[error("The config '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),
}
