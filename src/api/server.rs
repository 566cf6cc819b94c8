use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::presenter::{
    bind, respond, DetermineRelationResponse, FamilyTreeResponse, KinshipDistanceResponse, PaternityRelationshipRequest,
    PaternityRelationshipResponse, PeopleResponse, PersonRequest, PersonResponse, RelationshipsResponse,
};
use super::ApiError;
use crate::config::HttpServerConfig;
use crate::error::{KintreeError, Result};
use crate::service::FamilyTreeService;

/// HTTP front end for a [`FamilyTreeService`].
pub struct HttpServer {
    service: FamilyTreeService,
    config: HttpServerConfig,
}

impl HttpServer {
    pub fn new(service: FamilyTreeService, config: HttpServerConfig) -> Self {
        Self { service, config }
    }

    /// Serve until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let app = create_router(self.service.clone(), &self.config.allowed_origins);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            KintreeError::Io(std::io::Error::new(e.kind(), format!("Failed to bind to {}: {}", addr, e)))
        })?;
        log::info!("Starting kintree HTTP server on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                KintreeError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("HTTP server error: {}", e),
                ))
            })?;

        log::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received, draining connections");
}

/// Build the router. An empty `allowed_origins` allows any origin.
pub fn create_router(service: FamilyTreeService, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(e) => {
                    log::warn!("Ignoring allowed origin {:?}: {}", o, e);
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/person", get(handle_list_people).post(handle_create_person))
        .route(
            "/api/v1/person/:id",
            get(handle_get_person).put(handle_update_person).delete(handle_delete_person),
        )
        .route(
            "/api/v1/relationship",
            post(handle_create_relationship).get(handle_list_relationships),
        )
        .route(
            "/api/v1/relationship/:id",
            get(handle_get_relationship)
                .put(handle_update_relationship)
                .delete(handle_delete_relationship),
        )
        .route("/api/v1/familytree/:name", get(handle_family_tree))
        .route("/api/v1/familytree/:first/relationship/:second", get(handle_relationship))
        .route("/api/v1/familytree/:first/distance/:second", get(handle_distance))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(AppState { service })
}

#[derive(Clone)]
struct AppState {
    service: FamilyTreeService,
}

/// Run a store-backed call on the blocking pool.
async fn blocking<F, T>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let joined = tokio::task::spawn_blocking(f).await.map_err(|e| {
        ApiError(KintreeError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("request task failed: {}", e),
        )))
    })?;
    Ok(joined?)
}

async fn handle_health() -> &'static str {
    "App is healthy"
}

async fn handle_family_tree(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let relatives = blocking(move || state.service.family_members(&name)).await?;
    Ok(respond(&headers, StatusCode::OK, &FamilyTreeResponse::from(relatives.as_slice())))
}

async fn handle_relationship(
    State(state): State<AppState>,
    Path((first, second)): Path<(String, String)>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let relationship = blocking(move || state.service.determine_relationship(&first, &second)).await?;
    Ok(respond(&headers, StatusCode::OK, &DetermineRelationResponse { relationship }))
}

async fn handle_distance(
    State(state): State<AppState>,
    Path((first, second)): Path<(String, String)>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let distance = blocking(move || state.service.kinship_distance(&first, &second)).await?;
    Ok(respond(&headers, StatusCode::OK, &KinshipDistanceResponse { distance }))
}

async fn handle_create_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let request: PersonRequest = bind(&headers, &body)?;
    let store = state.service.store().clone();
    let person = blocking(move || store.create_person(&request.name, &request.gender)).await?;
    Ok(respond(&headers, StatusCode::CREATED, &PersonResponse::from(person)))
}

async fn handle_list_people(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let store = state.service.store().clone();
    let persons = blocking(move || store.list_with_relationships()).await?;
    let people = persons.into_iter().map(PersonResponse::from).collect();
    Ok(respond(&headers, StatusCode::OK, &PeopleResponse { people }))
}

async fn handle_create_relationship(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let request: PaternityRelationshipRequest = bind(&headers, &body)?;
    request.validate()?;
    let store = state.service.store().clone();
    let edge = blocking(move || store.add_parent(&request.child, &request.parent)).await?;
    Ok(respond(&headers, StatusCode::CREATED, &PaternityRelationshipResponse::from(edge)))
}

async fn handle_get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let store = state.service.store().clone();
    let person = blocking(move || store.get_person(&id)).await?;
    Ok(respond(&headers, StatusCode::OK, &PersonResponse::from(person)))
}

async fn handle_update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let request: PersonRequest = bind(&headers, &body)?;
    let store = state.service.store().clone();
    let person = blocking(move || store.update_person(&id, &request.name, &request.gender)).await?;
    Ok(respond(&headers, StatusCode::OK, &PersonResponse::from(person)))
}

async fn handle_delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    let store = state.service.store().clone();
    blocking(move || store.delete_person(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_list_relationships(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let store = state.service.store().clone();
    let edges = blocking(move || store.list_edges()).await?;
    let relationships = edges.into_iter().map(PaternityRelationshipResponse::from).collect();
    Ok(respond(&headers, StatusCode::OK, &RelationshipsResponse { relationships }))
}

async fn handle_get_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let store = state.service.store().clone();
    let edge = blocking(move || store.get_edge(&id)).await?;
    Ok(respond(&headers, StatusCode::OK, &PaternityRelationshipResponse::from(edge)))
}

async fn handle_update_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let request: PaternityRelationshipRequest = bind(&headers, &body)?;
    request.validate()?;
    let store = state.service.store().clone();
    let edge = blocking(move || store.update_edge(&id, &request.child, &request.parent)).await?;
    Ok(respond(&headers, StatusCode::OK, &PaternityRelationshipResponse::from(edge)))
}

async fn handle_delete_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    let store = state.service.store().clone();
    blocking(move || store.delete_edge(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
