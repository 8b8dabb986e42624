use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

#[derive(Deserialize, Debug)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// Credentials of the client allowed to use the password grant. The login endpoint presents
/// these on behalf of the user.
#[derive(Deserialize, Clone, Debug)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub database_url: String,
    pub signups_enabled: bool,
    pub honeycomb_api_key: Option<String>,
    pub oauth: OAuthConfig,
    pub ssl: Option<SSLConfig>,
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Config::parse(&config)
    }

    pub fn parse(config: &str) -> Result<Config, anyhow::Error> {
        let config: Config = toml::from_str(config).context("Unable to parse config")?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let signups_enabled = read_env("SIGNUPS_ENABLED")?;
        let signups_enabled = signups_enabled
            .parse()
            .context("Unable to parse SIGNUPS_ENABLED value")?;
        let database_url = read_env("DATABASE_URL")?;
        let oauth = OAuthConfig {
            client_id: read_env("OAUTH_CLIENT_ID")?,
            client_secret: read_env("OAUTH_CLIENT_SECRET")?,
        };
        let honeycomb_api_key = env::var("HONEYCOMB_API_KEY").ok();

        let config = Config {
            database_url,
            signups_enabled,
            honeycomb_api_key,
            oauth,
            ssl: None,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}
