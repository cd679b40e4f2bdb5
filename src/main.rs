use std::sync::Arc;

use tracing::{error, info, warn};

use sharebox::{
    catalog, AccountRepository, AppState, CollectionStorage, Config, Database, JwtState,
    NewAccount, SessionRepository, WebServer,
};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = sharebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        sharebox::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> sharebox::Result<()> {
    config.validate()?;

    info!("Sharebox - per-account media collections");

    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    let storage = CollectionStorage::new(&config.storage.root)?;
    info!("Collection storage at {}", config.storage.root);

    bootstrap_admin(&db, &config).await?;

    let purged = SessionRepository::new(db.pool()).cleanup_expired().await?;
    if purged > 0 {
        info!(purged, "expired sessions removed");
    }

    let jwt = Arc::new(JwtState::from_config(&config.session));
    let mut state = AppState::new(db, storage, jwt);

    if !config.catalog.path.is_empty() {
        state = state.with_catalog(catalog::load(&config.catalog.path));
    }

    let server = WebServer::new(&config.server, state)?;
    server.run().await?;

    Ok(())
}

/// Create the first admin account on an empty database.
async fn bootstrap_admin(db: &Database, config: &Config) -> sharebox::Result<()> {
    let repo = AccountRepository::new(db.pool());
    if repo.count().await? > 0 {
        return Ok(());
    }

    let bootstrap = &config.bootstrap;
    if bootstrap.admin_password.is_empty() {
        warn!("No accounts exist. Set SHAREBOX_ADMIN_PASSWORD to create the first admin.");
        return Ok(());
    }

    let mut admin = NewAccount::admin(&bootstrap.admin_username, &bootstrap.admin_password);
    if let Some(display_name) = &bootstrap.admin_display_name {
        admin = admin.with_display_name(display_name);
    }

    let account = repo.create(&admin).await?;
    info!(account_id = account.id, username = %account.username, "bootstrap admin created");

    Ok(())
}
