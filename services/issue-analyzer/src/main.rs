//! HTTP service that classifies photos of civic issues and maps addresses to
//! Jharkhand districts.

use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use shared::analyzer::{AnalysisOutcome, Analyzer, AnalyzerOptions, FailureKind};
use shared::catalog::CategoryCatalog;
use shared::config::Settings;
use shared::district::{classify_location, District};
use shared::model_client::GeminiClient;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

mod upload;

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

#[derive(Deserialize)]
struct LocationQuery {
    address: String,
}

#[derive(Serialize)]
struct LocationResponse {
    address: String,
    district: District,
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Indian Civic Issue Analyzer API is running"
    }))
}

async fn health() -> impl Responder {
    "OK"
}

async fn analyze(payload: Multipart, analyzer: web::Data<Analyzer>) -> HttpResponse {
    let image = match upload::read_image(payload).await {
        Ok(image) => image,
        Err(e) => {
            warn!(%e, "upload rejected");
            return HttpResponse::BadRequest().json(ErrorBody {
                detail: &e.to_string(),
            });
        }
    };
    info!(bytes = image.bytes.len(), mime = %image.mime_type, "analysis request");

    match analyzer.analyze(&image).await {
        AnalysisOutcome::Success(record) => HttpResponse::Ok().json(record),
        AnalysisOutcome::Failure { kind, message } => {
            let mut res = match kind {
                FailureKind::Validation => HttpResponse::BadRequest(),
                FailureKind::Upstream => HttpResponse::InternalServerError(),
            };
            res.json(ErrorBody { detail: message })
        }
    }
}

async fn location(query: web::Query<LocationQuery>) -> HttpResponse {
    let LocationQuery { address } = query.into_inner();
    let district = classify_location(&address);
    info!(%district, "location classified");
    HttpResponse::Ok().json(LocationResponse { address, district })
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/analyze", web::post().to(analyze))
        .route("/location", web::get().to(location));
}

fn cors(origins: &[String]) -> Cors {
    if origins.iter().any(|o| o == "*") {
        return Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
    }
    origins
        .iter()
        .fold(Cors::default(), |c, o| c.allowed_origin(o))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;
    let api_key = settings.require_api_key()?;
    let catalog = Arc::new(CategoryCatalog::load(&settings.mapping_file)?);
    let model = Arc::new(GeminiClient::new(
        api_key,
        settings.gemini_model.as_str(),
        settings.gemini_api_base.as_str(),
    ));
    let analyzer = web::Data::new(Analyzer::new(
        catalog,
        model,
        AnalyzerOptions {
            timeout: settings.model_timeout(),
            retries: settings.model_retries,
        },
    ));
    let origins = settings.cors_origin_list();

    info!(
        model = %settings.gemini_model,
        bind = %settings.http_bind,
        port = settings.http_port,
        "starting issue-analyzer"
    );
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .app_data(analyzer.clone())
            .configure(routes)
    })
    .bind((settings.http_bind.as_str(), settings.http_port))?
    .run()
    .await?;
    Ok(())
}
