use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use eduboard::auth::Authenticator;
use eduboard::config::Config;
use eduboard::file::DiskUploader;
use eduboard::web::{AppState, CookieSettings, WebServer};
use eduboard::{EduboardError, MemoryStore, Result};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn load_config(path: &Path) -> Config {
    match Config::load_with_env(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    let uploader = DiskUploader::new(&config.uploads.storage_path, &config.uploads.public_prefix)?
        .with_max_size(config.uploads.max_upload_size_mb * 1024 * 1024);
    let uploader = Arc::new(uploader);

    let authenticator = Authenticator::with_params(
        config.auth.argon2_memory_kib,
        config.auth.argon2_iterations,
        config.auth.argon2_parallelism,
    )?;

    let state = match config.database.backend.as_str() {
        "memory" => {
            info!("Using in-memory store; data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            AppState::new(store.clone(), store.clone(), store, uploader, authenticator)
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let db = eduboard::Database::open(&config.database.path).await?;
            info!(path = %config.database.path, "Database opened");
            AppState::new(
                Arc::new(db.users()),
                Arc::new(db.courses()),
                Arc::new(db.entries()),
                uploader,
                authenticator,
            )
        }
        other => {
            return Err(EduboardError::Config(format!(
                "database backend '{other}' is not available in this build"
            )))
        }
    };

    Ok(state
        .with_session_ttl(chrono::Duration::seconds(config.session.ttl_secs as i64))
        .with_cookie(CookieSettings {
            name: config.session.cookie_name.clone(),
            secure: config.session.secure_cookie,
        }))
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config(&config_path);

    if let Err(e) = eduboard::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        eduboard::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    info!("eduboard starting");

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize services: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, state) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        std::process::exit(1);
    }
}
