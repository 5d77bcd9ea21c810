use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use gymdesk::auth::{create_account, SessionKeys};
use gymdesk::db::UserRepository;
use gymdesk::web::{AppState, WebServer};
use gymdesk::{Config, Database, GymError, Role};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn load_config(path: &str) -> gymdesk::Result<Config> {
    match Config::load_with_env(path) {
        Err(GymError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("{path} not found, using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            Ok(config)
        }
        result => result,
    }
}

/// Create the initial administrator from the environment, if requested.
async fn seed_admin(db: &Database) -> gymdesk::Result<()> {
    let users = UserRepository::new(db.pool());

    let (Ok(email), Ok(password)) = (
        std::env::var("GYMDESK_ADMIN_EMAIL"),
        std::env::var("GYMDESK_ADMIN_PASSWORD"),
    ) else {
        if users.count().await? == 0 {
            warn!(
                "No accounts exist. Set GYMDESK_ADMIN_EMAIL and GYMDESK_ADMIN_PASSWORD \
                 to create an administrator."
            );
        }
        return Ok(());
    };

    if users.get_by_email(&email).await?.is_some() {
        info!("Administrator account already exists");
        return Ok(());
    }

    create_account(db.pool(), &email, &password, "Administrator", Role::Admin)
        .await
        .map_err(|e| GymError::Validation(format!("failed to seed administrator: {e}")))?;
    info!("Administrator account created");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn run(config: Config) -> gymdesk::Result<()> {
    let keys = SessionKeys::from_config(&config.session)
        .map_err(|e| GymError::Config(e.to_string()))?;

    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    let result = async {
        seed_admin(&db).await?;

        let state = AppState::from_config(db.clone(), Arc::new(keys), &config);
        WebServer::new(&config.server, state)?
            .run(shutdown_signal())
            .await
    }
    .await;

    db.close().await;
    info!("Database closed");
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = gymdesk::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        gymdesk::logging::init_console_only(&config.logging);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!(
        environment = ?config.server.environment,
        "gymdesk starting on {}:{}",
        config.server.host,
        config.server.port
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
