mod classifier;
mod cli;
mod config;
mod errors;
mod handlers;
mod model_store;
mod models;

use crate::cli::Cli;
use crate::config::{ModelSpec, ServiceConfig};
use crate::model_store::ModelStore;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    enable_logging(cli.verbose);

    let spec = match cli.model_spec_path.as_deref() {
        Some(path) => ModelSpec::from_path(path).map_err(fatal)?,
        None => ModelSpec::default(),
    };

    // The model loads exactly once; if it cannot, the process must not come
    // up and serve with a null model.
    let store = web::Data::new(ModelStore::load(&cli.model_path, spec).map_err(fatal)?);
    let service = web::Data::new(ServiceConfig {
        max_upload_bytes: cli.max_upload_bytes,
    });

    info!("server running at http://{}", cli.bind_addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(store.clone())
            .app_data(service.clone())
            .configure(handlers::configure)
    })
    .bind(cli.bind_addr.as_str())?
    .run()
    .await
}

fn fatal<E: std::fmt::Display>(err: E) -> std::io::Error {
    error!("startup failed: {err}");
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

fn enable_logging(verbose: u8) {
    let log_level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
