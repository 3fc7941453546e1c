use serde::{Deserialize, Deserializer};
use std::str::FromStr;

use crate::error::ApiError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 24;
pub const MAX_LIMIT: u32 = 25;

#[derive(Debug, Deserialize, Copy, Clone)]
pub struct Paginated {
    #[serde(default, deserialize_with = "option_from_str_or_number")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "option_from_str_or_number")]
    pub limit: Option<u32>,
}

impl Paginated {
    fn resolve(self) -> Result<(u32, u32), ApiError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(ApiError::Validation(
                "page must be greater than or equal to 1".to_string(),
            ));
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok((page, limit))
    }
}

fn option_from_str_or_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + serde::Deserialize<'de>,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(s) => {
            let parsed = s.parse::<T>().map_err(serde::de::Error::custom)?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn option_bool_from_str<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|s| match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(serde::de::Error::custom(format!(
            "invalid boolean value `{}`",
            s
        ))),
    })
    .transpose()
}

/// Query string of the manga and character search routes.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(flatten)]
    pub pages: Paginated,
}

impl SearchQuery {
    pub fn resolve(self) -> Result<SearchParams, ApiError> {
        let (page, limit) = self.pages.resolve()?;
        Ok(SearchParams {
            q: self.q.unwrap_or_default(),
            page,
            limit,
            sfw: None,
        })
    }
}

/// Query string of the anime search route, which also forwards the SFW filter.
#[derive(Debug, Deserialize, Clone)]
pub struct AnimeSearchQuery {
    pub q: Option<String>,
    #[serde(default, deserialize_with = "option_bool_from_str")]
    pub sfw: Option<bool>,
    #[serde(flatten)]
    pub pages: Paginated,
}

impl AnimeSearchQuery {
    pub fn resolve(self) -> Result<SearchParams, ApiError> {
        let (page, limit) = self.pages.resolve()?;
        Ok(SearchParams {
            q: self.q.unwrap_or_default(),
            page,
            limit,
            sfw: Some(self.sfw.unwrap_or(true)),
        })
    }
}

/// Validated search parameters, ready to be forwarded upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub q: String,
    pub page: u32,
    pub limit: u32,
    pub sfw: Option<bool>,
}

impl SearchParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", self.q.clone()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(sfw) = self.sfw {
            query.push(("sfw", sfw.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use actix_web::web;

    use super::*;

    fn anime(query: &str) -> Result<SearchParams, ApiError> {
        web::Query::<AnimeSearchQuery>::from_query(query)
            .map_err(|e| ApiError::Validation(e.to_string()))?
            .into_inner()
            .resolve()
    }

    fn search(query: &str) -> Result<SearchParams, ApiError> {
        web::Query::<SearchQuery>::from_query(query)
            .map_err(|e| ApiError::Validation(e.to_string()))?
            .into_inner()
            .resolve()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            anime("").unwrap(),
            SearchParams {
                q: String::new(),
                page: 1,
                limit: 24,
                sfw: Some(true),
            }
        );
        assert_eq!(
            search("").unwrap(),
            SearchParams {
                q: String::new(),
                page: 1,
                limit: 24,
                sfw: None,
            }
        );
    }

    #[test]
    fn test_explicit_values() {
        let params = anime("q=one%20piece&page=3&limit=25&sfw=false").unwrap();
        assert_eq!(params.q, "one piece");
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, 25);
        assert_eq!(params.sfw, Some(false));
    }

    #[test]
    fn test_query_is_not_sanitized() {
        let params = search("q=%3Cscript%3E%20%20").unwrap();
        assert_eq!(params.q, "<script>  ");
    }

    #[test]
    fn test_sfw_spellings() {
        for raw in ["1", "true", "TRUE", "yes", "on"] {
            assert_eq!(anime(&format!("sfw={raw}")).unwrap().sfw, Some(true), "{raw}");
        }
        for raw in ["0", "false", "False", "no", "off"] {
            assert_eq!(anime(&format!("sfw={raw}")).unwrap().sfw, Some(false), "{raw}");
        }
        assert!(matches!(anime("sfw=maybe"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_sfw_is_ignored_outside_anime() {
        assert_eq!(search("sfw=false").unwrap().sfw, None);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(anime("page=0"), Err(ApiError::Validation(_))));
        assert!(matches!(anime("limit=0"), Err(ApiError::Validation(_))));
        assert!(matches!(search("limit=26"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_rejects_unparsable_numbers() {
        assert!(matches!(anime("page=abc"), Err(ApiError::Validation(_))));
        assert!(matches!(search("limit=-3"), Err(ApiError::Validation(_))));
        assert!(matches!(search("page="), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_to_query() {
        let params = anime("q=naruto&limit=2").unwrap();
        assert_eq!(
            params.to_query(),
            vec![
                ("q", "naruto".to_string()),
                ("page", "1".to_string()),
                ("limit", "2".to_string()),
                ("sfw", "true".to_string()),
            ]
        );

        let params = search("q=naruto").unwrap();
        assert!(params.to_query().iter().all(|(key, _)| *key != "sfw"));
    }
}
