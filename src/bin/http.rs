use git_inner::config::AppConfig;
use git_inner::http::HttpServer;
use git_inner::serve::AppCore;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    let tracing_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(tracing_level));
    tracing_subscriber::registry().with(fmt_layer).init();

    let config = AppConfig::load()?;
    let server = HttpServer::new(config.http.clone(), AppCore::from_config(config));
    server.run().await?;
    info!("server stopped");
    Ok(())
}
