use crate::repository::entities::Event;
use crate::repository::interface::RepositoryProvider;
use crate::repository::sql::Warehouse;
use crate::repository::DEFAULT_RECENT_LIMIT;
use crate::settings::Setup;
use crate::status;
use actix_web::http::StatusCode;
use actix_web::{get, route, web, HttpResponse, Responder, ResponseError, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use web::{Data, Json, Query};

/// VERSION shall be updated before creating release.
pub static VERSION: &str = "Tally 0.1.0";

const GREETING: &str = "Bonjour tout le monde !";
const DEFAULT_MESSAGE: &str = "hello";

/// ServiceError is returned to the client as a JSON `{error}` body.
///
#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "storage unavailable: {}", _0)]
    Storage(String),
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        tracing::error!(error = %e, "storage failure");
        Self::Storage(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Greeting {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Added {
    pub status: String,
    pub timestamp: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Count {
    pub count: i64,
}

/// ServerActor is the state shared by all handlers.
///
pub struct ServerActor<T>
where
    T: RepositoryProvider + 'static,
{
    version: String,
    repo: Arc<T>,
    db_path: PathBuf,
    backup_dir: PathBuf,
}

impl<T> ServerActor<T>
where
    T: RepositoryProvider + 'static,
{
    pub fn new(repo: Arc<T>, setup: &Setup) -> Self {
        Self {
            version: VERSION.to_string(),
            repo,
            db_path: setup.get_db_path().to_path_buf(),
            backup_dir: setup.get_backup_dir().to_path_buf(),
        }
    }
}

impl<T> Clone for ServerActor<T>
where
    T: RepositoryProvider + 'static,
{
    fn clone(&self) -> Self {
        Self {
            version: self.version.clone(),
            repo: self.repo.clone(),
            db_path: self.db_path.clone(),
            backup_dir: self.backup_dir.clone(),
        }
    }
}

#[get("/")]
async fn hello() -> Result<impl Responder> {
    Ok(Json(Greeting {
        status: GREETING.to_string(),
    }))
}

#[get("/health")]
async fn health() -> Result<impl Responder> {
    Ok(Json(Greeting {
        status: "ok".to_string(),
    }))
}

#[get("/version")]
async fn version(state: Data<ServerActor<Warehouse>>) -> Result<impl Responder> {
    Ok(Json(Version {
        version: state.version.to_string(),
    }))
}

#[route("/add", method = "GET", method = "POST")]
async fn add_event(
    query: Query<Vec<(String, String)>>,
    state: Data<ServerActor<Warehouse>>,
) -> Result<impl Responder, ServiceError> {
    // A repeated `message` keeps its first value.
    let message = query
        .into_inner()
        .into_iter()
        .find(|(key, _)| key == "message")
        .map(|(_, value)| value)
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
    let event = state.repo.insert_event(&message).await?;
    tracing::debug!(id = event.id, "event added");

    Ok(Json(Added {
        status: "added".to_string(),
        timestamp: event.timestamp,
        message: event.message,
    }))
}

#[get("/consultation")]
async fn consultation(
    state: Data<ServerActor<Warehouse>>,
) -> Result<Json<Vec<Event>>, ServiceError> {
    let events = state.repo.recent_events(DEFAULT_RECENT_LIMIT).await?;
    Ok(Json(events))
}

#[get("/count")]
async fn event_count(
    state: Data<ServerActor<Warehouse>>,
) -> Result<impl Responder, ServiceError> {
    let count = state.repo.count_events().await?;
    Ok(Json(Count { count }))
}

#[get("/status")]
async fn status_report(
    state: Data<ServerActor<Warehouse>>,
) -> Result<impl Responder, ServiceError> {
    let report = status::report(
        state.repo.as_ref(),
        state.db_path.clone(),
        state.backup_dir.clone(),
    )
    .await?;
    Ok(Json(report))
}

/// Registers every route of the service.
///
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(health)
        .service(version)
        .service(add_event)
        .service(consultation)
        .service(event_count)
        .service(status_report);
}
