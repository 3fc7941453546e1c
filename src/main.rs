use std::{net::IpAddr, str::FromStr};

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::Uri, middleware::Logger, web};
use anyhow::{Context, Result, bail};
use dotenv::dotenv;
use env_logger::Env;
use jikan::JikanClient;
use log::info;

mod endpoints;
mod error;
mod jikan;
mod normalize;
mod requests;
mod response;

#[actix_web::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let client = web::Data::new(
        JikanClient::new(&config.jikan_base_url).context("Unable to build upstream client")?,
    );
    let address = std::net::SocketAddr::new(config.address, config.port);

    info!(
        "Starting api server on {} (upstream {})",
        address, config.jikan_base_url
    );

    let app_client = client.clone();
    let cors_origins = config.cors_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_origins))
            .wrap(Logger::default())
            .app_data(app_client.clone())
            .configure(endpoints::configure)
    })
    .bind(address)?
    .run()
    .await?;

    info!("Server stopped, releasing upstream client");
    drop(client);

    Ok(())
}

#[derive(Clone, Debug)]
struct Config {
    address: IpAddr,
    port: u16,
    jikan_base_url: String,
    cors_origins: CorsOrigins,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum CorsOrigins {
    Any,
    List(Vec<String>),
}

fn load_config() -> Result<Config> {
    let address = std::env::var("API_ADDRESS").unwrap_or("0.0.0.0".into());
    let port = match std::env::var("PORT") {
        Ok(port) => port
            .parse()
            .with_context(|| format!("Invalid PORT: {}", port))?,
        Err(_) => 8000,
    };

    Ok(Config {
        address: IpAddr::from_str(&address)
            .with_context(|| format!("Invalid API_ADDRESS: {}", address))?,
        port,
        jikan_base_url: std::env::var("JIKAN_BASE_URL")
            .unwrap_or(jikan::DEFAULT_BASE_URL.to_string()),
        cors_origins: parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or("*".into()))?,
    })
}

fn parse_origins(raw: &str) -> Result<CorsOrigins> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Ok(CorsOrigins::Any);
    }

    for origin in &origins {
        match Uri::from_str(origin) {
            Ok(uri) if uri.scheme().is_some() && uri.host().is_some() => {}
            _ => bail!("Invalid CORS_ORIGINS entry: {}", origin),
        }
    }

    Ok(CorsOrigins::List(origins))
}

fn cors(origins: &CorsOrigins) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    match origins {
        CorsOrigins::Any => cors.allow_any_origin(),
        CorsOrigins::List(origins) => origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin)),
    }
}
