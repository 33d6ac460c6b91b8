use anyhow::Result;

/// Trait for building configuration structs.
///
/// Implementors describe how their config is assembled (environment
/// variables, files, ...). The application initializes the config lazily
/// behind a `OnceCell` through this implementation.
pub trait ConfigBuilder: Clone + Send + Sync + 'static {
    /// Build the configuration instance.
    ///
    /// Missing required values are hard errors; optional values should fall
    /// back to documented defaults.
    fn build() -> Result<Self>;
}
