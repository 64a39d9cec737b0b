use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use tracing::info;

use geogate::api::middleware::GeoMiddleware;
use geogate::api::services::{admin_routes, debug_routes};
use geogate::config::AppConfig;
use geogate::services::geoip::GeoIpRegistry;
use geogate::system::logging::init_logging;

/// GeoIP resolution middleware service
#[derive(Parser, Debug)]
#[command(name = "geogate", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Print a sample configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", AppConfig::generate_sample_config());
        return Ok(());
    }

    let config = AppConfig::load(&cli.config);
    let _log_guard = init_logging(&config.logging);

    // resolver 构建失败（空链、数据库打不开）在这里直接终止启动，
    // 不允许服务以半配置状态运行
    let registry = Arc::new(
        GeoIpRegistry::from_config(&config.geoip)
            .context("Failed to initialize GeoIP resolvers")?,
    );
    let geo_middleware = GeoMiddleware::new(&config.geoip, registry.chain())
        .context("Failed to build geo middleware")?;
    let context_keys = config.geoip.context.clone();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting geogate at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(context_keys.clone()))
            .wrap(geo_middleware.clone())
            .service(debug_routes())
            .service(admin_routes())
    })
    .workers(config.server.cpu_count)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
