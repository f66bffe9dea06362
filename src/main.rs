use rust_orders::api::routes::{app_router, AppState};
use rust_orders::config::Config;
use rust_orders::email::Mailer;
use rust_orders::payments::PaymentGateway;
use rust_orders::persistence;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("configuration");
    let pool = persistence::create_pool_and_migrate(&config.database_url, config.db_max_connections)
        .await
        .expect("database");

    let state = AppState {
        db: pool,
        payments: PaymentGateway::new(config.stripe_secret_key.clone(), config.stripe_base_url.clone()),
        mailer: Mailer::new(config.email_endpoint.clone(), config.email_from.clone()),
        jwt_secret: config.jwt_secret.clone().into_bytes(),
    };

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("bind address");
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await.expect("server");
}
