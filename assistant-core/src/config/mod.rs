use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load a settings struct from `<dir>/base.yaml` layered with `APP_`-prefixed
/// environment variables (`APP_SERVER__PORT=9000` overrides `server.port`).
pub fn load<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
