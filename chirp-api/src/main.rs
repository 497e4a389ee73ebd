mod server;

use chirp_db::client::{DbClient, DbError};
use chirp_identity::client::{IdentityClient, IdentityError};
use serde::Deserialize;
use server::ServerState;
use sqlx::postgres::PgPoolOptions;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error connecting to database: {0}")]
    DatabaseConnect(sqlx::Error),
    #[error("Error migrating database: {0}")]
    DatabaseMigrate(DbError),
    #[error("Error building identity provider client: {0}")]
    IdentityClient(IdentityError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_identity_api_url() -> String {
    "https://api.clerk.com".to_owned()
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: String,
    #[serde(default = "default_database_max_connections")]
    database_max_connections: u32,
    #[serde(default = "default_identity_api_url")]
    identity_api_url: String,
    identity_secret_key: String,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chirp_api=debug,\
                chirp_db=debug,\
                chirp_identity=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "Could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(%err, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn spawn_shutdown_listener() -> CancellationToken {
    let token = CancellationToken::new();

    let child_token = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down");
        child_token.cancel();
    });

    token
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(env.database_max_connections)
        .connect(&env.database_url)
        .await
        .map_err(InitError::DatabaseConnect)?;
    let db_client = DbClient::new(pool);
    db_client
        .migrate()
        .await
        .map_err(InitError::DatabaseMigrate)?;

    let identity_client = IdentityClient::new(&env.identity_api_url, env.identity_secret_key)
        .map_err(InitError::IdentityClient)?;

    let state = ServerState::new(db_client, identity_client);
    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().with_state(state).layer(tracing_layer);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    let shutdown = spawn_shutdown_listener();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Env;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn env_with_defaults() {
        let env: Env = envy::from_iter(vars(&[
            ("SERVER_ADDRESS", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/chirp"),
            ("IDENTITY_SECRET_KEY", "sk_test"),
        ]))
        .unwrap();

        assert_eq!(env.server_address.to_string(), "127.0.0.1");
        assert_eq!(env.server_port, 8080);
        assert_eq!(env.database_max_connections, 5);
        assert_eq!(env.identity_api_url, "https://api.clerk.com");
        assert_eq!(env.identity_secret_key, "sk_test");
    }

    #[test]
    fn env_overrides() {
        let env: Env = envy::from_iter(vars(&[
            ("SERVER_ADDRESS", "::1"),
            ("SERVER_PORT", "3000"),
            ("DATABASE_URL", "postgres://localhost/chirp"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("IDENTITY_API_URL", "http://localhost:4000"),
            ("IDENTITY_SECRET_KEY", "sk_test"),
        ]))
        .unwrap();

        assert!(env.server_address.is_ipv6());
        assert_eq!(env.database_max_connections, 20);
        assert_eq!(env.identity_api_url, "http://localhost:4000");
    }

    #[test]
    fn env_requires_secret_key() {
        let result = envy::from_iter::<_, Env>(vars(&[
            ("SERVER_ADDRESS", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/chirp"),
        ]));

        assert!(result.is_err());
    }
}
