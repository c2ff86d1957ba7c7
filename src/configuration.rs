use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub store: StoreSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

/// Location of the durable user collection.
#[derive(serde::Deserialize, Clone)]
pub struct StoreSettings {
    pub users_file: String,
}

/// JWT signing settings.
///
/// Access and refresh tokens are signed with independent secrets so that
/// leaking one cannot forge the other token class. Secrets are supplied via
/// the configuration file or the `APP__JWT__*` environment variables and
/// must never be logged.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,  // seconds (30 in the reference flow)
    pub refresh_token_expiry: i64, // seconds (86400 = 1 day)
    pub issuer: String,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}
