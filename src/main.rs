use coffee_shop::config::AppConfig;
use coffee_shop::{build_server, build_state};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let state = build_state(&config).map_err(std::io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} ({:?} storage, {} prices)",
        config.host,
        config.port,
        config.storage,
        config.currency
    );

    build_server(state, &config.host, config.port)?.await
}
