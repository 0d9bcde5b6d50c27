use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use koinonia_server::config::Config;
use koinonia_server::directory::PgEventDirectory;
use koinonia_server::notify::LogNotifier;
use koinonia_server::payments::CheckoutClient;
use koinonia_server::routes::create_routes;
use koinonia_server::state::AppState;
use koinonia_server::store::PgTicketStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store = Arc::new(PgTicketStore::new(pool.clone()));
    let directory = Arc::new(PgEventDirectory::new(pool));
    let gateway = Arc::new(CheckoutClient::new(
        config.checkout_base_url.clone(),
        config.checkout_secret.clone(),
        config.checkout_return_url.clone(),
    ));
    let notifier = Arc::new(LogNotifier);

    let port = config.port;
    let state = AppState::new(store, directory, gateway, notifier, config);
    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🎟️ Ticketing service running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
