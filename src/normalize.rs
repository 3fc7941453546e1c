//! Projection of Jikan records onto the gateway's response shapes.
//!
//! Upstream records are decoded leniently: a missing field, a `null`, or a
//! value of the wrong JSON type all end up as `None` or an empty vector, so
//! normalization itself never fails.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Number, Value};

use crate::jikan::{JikanPage, JikanResponse, lenient, lenient_seq};
use crate::response::{
    AnimeDetail, AnimeListItem, CharacterDetail, CharacterListItem, MangaDetail, MangaListItem,
    SearchResult, Trailer,
};

/// A Jikan resource kind the gateway can search and look up.
pub trait Resource: DeserializeOwned + Default {
    /// Path segment under the upstream base URL, e.g. `anime`.
    const PATH: &'static str;
    const SEARCH_NOT_FOUND: &'static str;
    const DETAIL_NOT_FOUND: &'static str;

    type ListItem: Serialize;
    type Detail: Serialize;

    fn into_list_item(self) -> Self::ListItem;
    fn into_detail(self) -> Self::Detail;
}

pub fn search_result<R: Resource>(body: Value, requested_page: u32) -> SearchResult<R::ListItem> {
    let page = JikanPage::<R>::from_body(body);
    let pagination = page.pagination.unwrap_or_default();

    SearchResult {
        items: page.data.into_iter().map(R::into_list_item).collect(),
        page: pagination.current_page.unwrap_or(requested_page),
        has_next: pagination.has_next_page == Some(true),
    }
}

pub fn detail<R: Resource>(body: Value) -> R::Detail {
    JikanResponse::<R>::from_body(body)
        .data
        .unwrap_or_default()
        .into_detail()
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanImages {
    #[serde(default, deserialize_with = "lenient")]
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanImageSet {
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanGenre {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanTrailer {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub youtube_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanAnime {
    #[serde(default, deserialize_with = "lenient")]
    pub mal_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title_english: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title_japanese: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<JikanImages>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<i64>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub episodes: Option<i64>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub genres: Vec<JikanGenre>,
    #[serde(default, deserialize_with = "lenient")]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rank: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub popularity: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub trailer: Option<JikanTrailer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanManga {
    #[serde(default, deserialize_with = "lenient")]
    pub mal_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title_english: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title_japanese: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<JikanImages>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<i64>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub chapters: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub volumes: Option<i64>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub genres: Vec<JikanGenre>,
    #[serde(default, deserialize_with = "lenient")]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rank: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub popularity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JikanCharacter {
    #[serde(default, deserialize_with = "lenient")]
    pub mal_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub nicknames: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<JikanImages>,
    #[serde(default, deserialize_with = "lenient")]
    pub favorites: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub about: Option<String>,
}

/// First non-empty of `title`, `title_english`, `title_japanese`.
fn resolve_title(
    title: Option<String>,
    title_english: Option<String>,
    title_japanese: Option<String>,
) -> Option<String> {
    [title, title_english, title_japanese]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
}

fn image_url(images: Option<JikanImages>) -> Option<String> {
    images
        .and_then(|images| images.jpg)
        .and_then(|jpg| jpg.image_url)
}

fn genre_names(genres: Vec<JikanGenre>) -> Vec<String> {
    genres.into_iter().filter_map(|genre| genre.name).collect()
}

impl Resource for JikanAnime {
    const PATH: &'static str = "anime";
    const SEARCH_NOT_FOUND: &'static str = "Anime not found";
    const DETAIL_NOT_FOUND: &'static str = "Anime not found";

    type ListItem = AnimeListItem;
    type Detail = AnimeDetail;

    fn into_list_item(self) -> AnimeListItem {
        AnimeListItem {
            id: self.mal_id,
            title: resolve_title(self.title, self.title_english, self.title_japanese),
            image: image_url(self.images),
            score: self.score,
            year: self.year,
            kind: self.kind,
            episodes: self.episodes,
            genres: genre_names(self.genres),
        }
    }

    fn into_detail(mut self) -> AnimeDetail {
        let synopsis = self.synopsis.take();
        let rank = self.rank.take();
        let popularity = self.popularity.take();
        let duration = self.duration.take();
        let trailer = self.trailer.take().unwrap_or_default();

        AnimeDetail {
            summary: self.into_list_item(),
            synopsis,
            rank,
            popularity,
            duration,
            trailer: Trailer {
                url: trailer.url,
                youtube_id: trailer.youtube_id,
            },
        }
    }
}

impl Resource for JikanManga {
    const PATH: &'static str = "manga";
    const SEARCH_NOT_FOUND: &'static str = "Manga not found";
    const DETAIL_NOT_FOUND: &'static str = "Manga not found";

    type ListItem = MangaListItem;
    type Detail = MangaDetail;

    fn into_list_item(self) -> MangaListItem {
        MangaListItem {
            id: self.mal_id,
            title: resolve_title(self.title, self.title_english, self.title_japanese),
            image: image_url(self.images),
            score: self.score,
            year: self.year,
            kind: self.kind,
            chapters: self.chapters,
            volumes: self.volumes,
            genres: genre_names(self.genres),
        }
    }

    fn into_detail(mut self) -> MangaDetail {
        let synopsis = self.synopsis.take();
        let rank = self.rank.take();
        let popularity = self.popularity.take();

        MangaDetail {
            summary: self.into_list_item(),
            synopsis,
            rank,
            popularity,
        }
    }
}

impl Resource for JikanCharacter {
    const PATH: &'static str = "characters";
    const SEARCH_NOT_FOUND: &'static str = "Characters not found";
    const DETAIL_NOT_FOUND: &'static str = "Character not found";

    type ListItem = CharacterListItem;
    type Detail = CharacterDetail;

    fn into_list_item(self) -> CharacterListItem {
        CharacterListItem {
            id: self.mal_id,
            name: self.name.unwrap_or_default(),
            nicknames: self.nicknames,
            image: image_url(self.images),
            favorites: self.favorites,
            about: self.about,
        }
    }

    fn into_detail(self) -> CharacterDetail {
        CharacterDetail {
            id: self.mal_id,
            name: self.name.unwrap_or_default(),
            nicknames: self.nicknames,
            about: self.about,
            image: image_url(self.images),
            favorites: self.favorites,
        }
    }
}
