use actix_web::{HttpResponse, Responder, ResponseError, body::BoxBody};
use serde::Serialize;
use serde_json::Number;

use crate::error::ApiError;

pub struct ApiResponse<T: Serialize> {
    data: Result<T, ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new_success(data: T) -> Self {
        Self { data: Ok(data) }
    }
    pub fn new_error(error: ApiError) -> Self {
        Self { data: Err(error) }
    }
}

impl<T: Serialize> From<Result<T, ApiError>> for ApiResponse<T> {
    fn from(data: Result<T, ApiError>) -> Self {
        Self { data }
    }
}

impl<T: Serialize> Responder for ApiResponse<T> {
    type Body = BoxBody;

    fn respond_to(self, _: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        match self.data {
            Ok(data) => HttpResponse::Ok().json(data),
            Err(error) => error.error_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
}

#[derive(Debug, Serialize)]
pub struct AnimeListItem {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub score: Option<Number>,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub episodes: Option<i64>,
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnimeDetail {
    #[serde(flatten)]
    pub summary: AnimeListItem,
    pub synopsis: Option<String>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
    pub duration: Option<String>,
    pub trailer: Trailer,
}

#[derive(Debug, Default, Serialize)]
pub struct Trailer {
    pub url: Option<String>,
    pub youtube_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MangaListItem {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub score: Option<Number>,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub chapters: Option<i64>,
    pub volumes: Option<i64>,
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MangaDetail {
    #[serde(flatten)]
    pub summary: MangaListItem,
    pub synopsis: Option<String>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CharacterListItem {
    pub id: Option<u64>,
    pub name: String,
    pub nicknames: Vec<String>,
    pub image: Option<String>,
    pub favorites: Option<i64>,
    pub about: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CharacterDetail {
    pub id: Option<u64>,
    pub name: String,
    pub nicknames: Vec<String>,
    pub about: Option<String>,
    pub image: Option<String>,
    pub favorites: Option<i64>,
}
