// Movie API module: a small blocking HTTP client for The Movie Database.
// It covers the two calls the application makes: the discover search that
// feeds the result list, and the single-movie lookup used to turn stored
// watchlist ids back into titles.

use anyhow::{Context, Result};
use chrono::Datelike;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_VOTE_THRESHOLD: u32 = 2500;
const DEFAULT_VOTE_SCORE: f64 = 8.0;

/// Blocking client holding the base URL and the TMDB bearer token.
#[derive(Clone)]
pub struct MovieApi {
    client: Client,
    base_url: String,
    token: String,
}

/// One movie as returned by the discover endpoint. Only the fields the
/// UI renders are kept.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub vote_average: f64,
}

#[derive(Deserialize, Debug)]
struct DiscoverResponse {
    results: Vec<Movie>,
}

#[derive(Deserialize, Debug)]
struct MovieDetails {
    title: String,
}

/// The four tunable search filters, plus which of the advanced ones the
/// user has switched on. Owned by the session; nothing here is global.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub year: i32,
    pub language: String,
    pub vote_threshold: u32,
    pub vote_score: f64,
    pub language_enabled: bool,
    pub threshold_enabled: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            year: chrono::Utc::now().year(),
            language: DEFAULT_LANGUAGE.to_string(),
            vote_threshold: DEFAULT_VOTE_THRESHOLD,
            vote_score: DEFAULT_VOTE_SCORE,
            language_enabled: false,
            threshold_enabled: false,
        }
    }
}

impl SearchOptions {
    /// Query parameters for the discover call, fixed filters included.
    fn discover_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("include_adult", "false".into()),
            ("include_video", "false".into()),
            ("language", "en-US".into()),
            ("page", "1".into()),
            ("primary_release_year", self.year.to_string()),
            ("sort_by", "vote_average.desc".into()),
            ("vote_average.gte", self.vote_score.to_string()),
            ("vote_count.gte", self.vote_threshold.to_string()),
            ("with_original_language", self.language.clone()),
        ]
    }
}

impl MovieApi {
    /// Create a client from the environment: `API_KEY` holds the TMDB
    /// bearer token (required), `TMDB_BASE_URL` overrides the API root.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("API_KEY")
            .context("API_KEY must be set to a TMDB API read access token")?;
        let base_url = std::env::var("TMDB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(MovieApi {
            client,
            base_url,
            token,
        })
    }

    /// Headers sent with every call: JSON accept plus the bearer token.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let val = format!("Bearer {}", self.token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&val).unwrap());
        headers
    }

    /// Run a discover search with the given filters and return the
    /// result page.
    pub fn discover(&self, options: &SearchOptions) -> Result<Vec<Movie>> {
        let url = format!("{}/discover/movie", &self.base_url);
        let res = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(&options.discover_params())
            .send()
            .context("Failed to send discover request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Discover failed: {} - {}", status, txt);
        }
        let resp: DiscoverResponse = res.json().context("Parsing discover response json")?;
        Ok(resp.results)
    }

    /// Resolve a movie id to its title via the single-movie endpoint.
    /// Used per entry when rendering a watchlist; a failure here only
    /// costs the one row.
    pub fn movie_title(&self, movie_id: u64) -> Result<String> {
        let url = format!("{}/movie/{}", &self.base_url, movie_id);
        let res = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(&[("language", "en-US")])
            .send()
            .context("Failed to send movie lookup request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Movie lookup failed: {} - {}", status, txt);
        }
        let details: MovieDetails = res.json().context("Parsing movie lookup json")?;
        Ok(details.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_the_documented_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.language, "en");
        assert_eq!(options.vote_threshold, 2500);
        assert_eq!(options.vote_score, 8.0);
        assert!(options.year >= 2024);
        assert!(!options.language_enabled);
        assert!(!options.threshold_enabled);
    }

    #[test]
    fn discover_params_carry_the_selected_filters() {
        let options = SearchOptions {
            year: 1994,
            language: "fr".into(),
            vote_threshold: 500,
            vote_score: 7.5,
            language_enabled: true,
            threshold_enabled: true,
        };
        let params = options.discover_params();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("primary_release_year"), "1994");
        assert_eq!(get("with_original_language"), "fr");
        assert_eq!(get("vote_count.gte"), "500");
        assert_eq!(get("vote_average.gte"), "7.5");
        assert_eq!(get("sort_by"), "vote_average.desc");
        assert_eq!(get("include_adult"), "false");
    }

    #[test]
    fn discover_response_parses_a_result_page() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 278, "title": "The Shawshank Redemption", "vote_average": 8.7},
                {"id": 238, "title": "The Godfather"}
            ],
            "total_pages": 1
        }"#;
        let resp: DiscoverResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].id, 278);
        assert_eq!(resp.results[0].title, "The Shawshank Redemption");
        assert_eq!(resp.results[1].vote_average, 0.0);
    }
}
