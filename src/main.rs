use std::net::TcpListener;
use std::sync::Arc;

use snapvault::admin::AdminManager;
use snapvault::api_tokens::ApiTokenManager;
use snapvault::auth::TokenService;
use snapvault::configuration::get_configuration;
use snapvault::identity::PgIdentityStore;
use snapvault::ledger::{RedisLedgerStore, RevocationLedger};
use snapvault::startup::run;
use snapvault::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;
    tracing::info!("Identity store ready");

    let ledger_store = RedisLedgerStore::connect(&configuration.redis.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to ledger store: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Ledger connection error")
        })?;

    let identities = Arc::new(PgIdentityStore::new(pool));
    let ledger_store = Arc::new(ledger_store);

    // Bootstrap the configured SUPER_ADMIN before accepting traffic.
    let tokens = TokenService::new(
        configuration.jwt.clone(),
        RevocationLedger::new(ledger_store.clone()),
    );
    let admin = AdminManager::new(identities.clone());
    let api_tokens = ApiTokenManager::new(identities.clone(), tokens);
    admin
        .ensure_super_admin(&configuration.super_admin, &api_tokens)
        .await
        .map_err(|e| {
            tracing::error!("Super admin bootstrap failed: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Bootstrap error")
        })?;

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, identities, ledger_store, configuration.jwt)?;
    server.await
}
