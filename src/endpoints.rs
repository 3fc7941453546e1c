use actix_web::{get, web};
use log::{debug, error, warn};

use crate::{
    error::ApiError,
    jikan::{JikanClient, UpstreamError},
    normalize::{self, JikanAnime, JikanCharacter, JikanManga, Resource},
    requests::{AnimeSearchQuery, SearchParams, SearchQuery},
    response::{
        AnimeDetail, AnimeListItem, ApiResponse, CharacterDetail, CharacterListItem, Health,
        MangaDetail, MangaListItem, SearchResult,
    },
};

/// Registers every route plus the extractor error handlers on `cfg`.
///
/// Search routes must be registered before the `{id}` routes sharing their
/// prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default().error_handler(|_, _| resource_not_found().into()),
    )
    .service(health)
    .service(search_anime)
    .service(anime_detail)
    .service(search_manga)
    .service(manga_detail)
    .service(search_characters)
    .service(character_detail)
    .default_service(web::to(unknown_route));
}

fn resource_not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}

async fn unknown_route() -> ApiResponse<()> {
    ApiResponse::new_error(resource_not_found())
}

#[get("/health")]
async fn health() -> ApiResponse<Health> {
    ApiResponse::new_success(Health { status: "ok" })
}

#[get("/api/anime/search")]
async fn search_anime(
    client: web::Data<JikanClient>,
    query: web::Query<AnimeSearchQuery>,
) -> ApiResponse<SearchResult<AnimeListItem>> {
    let params = match query.into_inner().resolve() {
        Ok(params) => params,
        Err(e) => return ApiResponse::new_error(e),
    };

    search::<JikanAnime>(&client, &params).await.into()
}

#[get("/api/anime/{id}")]
async fn anime_detail(
    client: web::Data<JikanClient>,
    id: web::Path<u64>,
) -> ApiResponse<AnimeDetail> {
    detail::<JikanAnime>(&client, id.into_inner()).await.into()
}

#[get("/api/manga/search")]
async fn search_manga(
    client: web::Data<JikanClient>,
    query: web::Query<SearchQuery>,
) -> ApiResponse<SearchResult<MangaListItem>> {
    let params = match query.into_inner().resolve() {
        Ok(params) => params,
        Err(e) => return ApiResponse::new_error(e),
    };

    search::<JikanManga>(&client, &params).await.into()
}

#[get("/api/manga/{id}")]
async fn manga_detail(
    client: web::Data<JikanClient>,
    id: web::Path<u64>,
) -> ApiResponse<MangaDetail> {
    detail::<JikanManga>(&client, id.into_inner()).await.into()
}

#[get("/api/characters/search")]
async fn search_characters(
    client: web::Data<JikanClient>,
    query: web::Query<SearchQuery>,
) -> ApiResponse<SearchResult<CharacterListItem>> {
    let params = match query.into_inner().resolve() {
        Ok(params) => params,
        Err(e) => return ApiResponse::new_error(e),
    };

    search::<JikanCharacter>(&client, &params).await.into()
}

#[get("/api/characters/{id}")]
async fn character_detail(
    client: web::Data<JikanClient>,
    id: web::Path<u64>,
) -> ApiResponse<CharacterDetail> {
    detail::<JikanCharacter>(&client, id.into_inner()).await.into()
}

async fn search<R: Resource>(
    client: &JikanClient,
    params: &SearchParams,
) -> Result<SearchResult<R::ListItem>, ApiError> {
    let path = format!("/{}", R::PATH);
    let body = client
        .get(&path, &params.to_query())
        .await
        .map_err(|e| upstream_failure(&path, e, R::SEARCH_NOT_FOUND))?;

    Ok(normalize::search_result::<R>(body, params.page))
}

async fn detail<R: Resource>(client: &JikanClient, id: u64) -> Result<R::Detail, ApiError> {
    let path = format!("/{}/{}", R::PATH, id);
    let body = client
        .get(&path, &[])
        .await
        .map_err(|e| upstream_failure(&path, e, R::DETAIL_NOT_FOUND))?;

    Ok(normalize::detail::<R>(body))
}

fn upstream_failure(path: &str, e: UpstreamError, not_found: &str) -> ApiError {
    match &e {
        UpstreamError::Status { status: 404, .. } => debug!("Upstream {} not found", path),
        UpstreamError::Status { status, .. } => warn!("Upstream {} answered {}", path, status),
        UpstreamError::Transport(err) => error!("Upstream {} unreachable: {:?}", path, err),
    }
    ApiError::from_upstream(e, not_found)
}
