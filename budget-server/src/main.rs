#[macro_use]
extern crate tracing;

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::App;
use actix_web::HttpServer;
use anyhow::Context;
use chrono::Utc;
use rand::Rng;
use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use budget_lib::config::Config;
use budget_lib::oauth::jwt::JWTAuth;
use budget_lib::AppState;
use budget_repo::token_repo::TokenRepo;

const SERVICE_NAME: &str = "budget-server";
const TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    let tracing_guard = tracing::subscriber::set_default(subscriber);
    info!("tracing initialized");

    let config = match get_config_file() {
        Some(config_path) => {
            info!(path = %config_path.display(), "Reading config file");
            Config::from_file(config_path)?
        }
        None => {
            info!("Config file not found, reading config from environment");
            Config::from_env()?
        }
    };

    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    match &config.honeycomb_api_key {
        Some(api_key) => {
            let telemetry_layer =
                budget_lib::tracing::create_opentelemetry_layer(SERVICE_NAME, api_key)?;
            tracing::subscriber::set_global_default(subscriber.with(telemetry_layer))?;
        }
        None => tracing::subscriber::set_global_default(subscriber)?,
    }
    drop(tracing_guard);

    let repos = budget_repo::sqlx_repo::create_repos(config.database_url.clone(), 10).await?;
    spawn_token_purge(repos.token_repo.clone());

    let secret = get_secret()?;
    let state = AppState {
        repos,
        jwt_auth: JWTAuth::from_secret(secret),
        oauth_client: config.oauth.clone(),
        signups_enabled: config.signups_enabled,
    };
    if state.signups_enabled {
        info!("Signups enabled");
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(budget_lib::tracing::create_middleware())
            .configure(|cfg| budget_lib::app_config_func(&state, cfg))
    });
    let server = match config.ssl {
        None => {
            warn!("Using http");
            server.bind("0.0.0.0:8000")?
        }
        Some(ssl_config) => {
            info!("Using https");

            let config = ServerConfig::builder()
                .with_safe_defaults()
                .with_no_client_auth();

            let mut cert_file = BufReader::new(
                File::open(ssl_config.certificate_chain_file)
                    .context("Error opening certificate chain file")?,
            );
            let mut key_file = BufReader::new(
                File::open(ssl_config.private_key_file)
                    .context("Error opening private key file")?,
            );

            let cert_chain = certs(&mut cert_file)
                .context("Unable to read certificate chain file")?
                .into_iter()
                .map(Certificate)
                .collect();
            let mut keys: Vec<PrivateKey> = pkcs8_private_keys(&mut key_file)
                .context("Unable to read private key file")?
                .into_iter()
                .map(PrivateKey)
                .collect();

            if keys.is_empty() {
                error!("No private key found in file");
                return Err("No private key found".into());
            }

            let config = config.with_single_cert(cert_chain, keys.remove(0))?;

            server.bind_rustls("0.0.0.0:8000", config)?
        }
    };
    server.run().await?;

    Ok(())
}

/// Deletes expired access tokens once at startup and then daily.
fn spawn_token_purge(token_repo: Arc<dyn TokenRepo>) {
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(TOKEN_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match token_repo.purge_tokens(Utc::now()).await {
                Ok(purged) => info!(purged, "Purged expired access tokens"),
                Err(e) => error!(error = %e, "Unable to purge access tokens"),
            }
        }
    });
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn get_state_dir() -> PathBuf {
    if let Ok(state_env) = std::env::var("STATE_DIRECTORY") {
        return PathBuf::from(state_env);
    }

    PathBuf::from("data")
}

/// Gets the JWT signing secret from file. If the file does not exist it will generate a new
/// secret and save it to the file
fn get_secret() -> Result<Vec<u8>, Box<dyn Error>> {
    let state_dir = get_state_dir();
    let secret_file = state_dir.join("secret");
    if secret_file.exists() {
        Ok(fs::read(secret_file)?)
    } else {
        let mut rng = rand::thread_rng();
        let mut secret: [u8; 128] = [0; 128];
        rng.fill(&mut secret);

        fs::create_dir_all(state_dir)?;
        fs::write(secret_file, secret)?;
        info!("Generated new secret");

        Ok(secret.to_vec())
    }
}
