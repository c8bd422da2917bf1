use anyhow::anyhow;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Slim search hit used by the add-movie picker.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataCandidate {
    pub title: String,
    pub poster: String,
    pub imdb_id: String,
}

/// Everything the external service knows about one title; the shape a fresh
/// `MovieRecord` is seeded from.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub title: String,
    pub year: String,
    pub rated: String,
    pub genres: Vec<String>,
    pub director: Vec<String>,
    pub writer: Vec<String>,
    pub plot: String,
    pub runtime: String,
    pub poster: String,
}

/// External movie-metadata lookup. Only consulted when a title is first
/// logged; failures propagate to the caller, no retries.
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn lookup_by_title(&self, title: &str) -> Result<Vec<MetadataCandidate>, Error>;

    async fn lookup_by_id(&self, external_id: &str) -> Result<MetadataRecord, Error>;
}

pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OmdbClient {
    pub fn new(base_url: String, api_key: SecretString) -> Self {
        OmdbClient {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[derive(serde::Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search")]
    search: Option<Vec<OmdbSearchItem>>,
}

#[derive(serde::Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Poster")]
    poster: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type")]
    kind: String,
}

#[derive(serde::Deserialize)]
struct OmdbMovieResponse {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Rated")]
    rated: String,
    #[serde(rename = "Genre")]
    genre: String,
    #[serde(rename = "Director")]
    director: String,
    #[serde(rename = "Writer")]
    writer: String,
    #[serde(rename = "Plot")]
    plot: String,
    #[serde(rename = "Runtime")]
    runtime: String,
    #[serde(rename = "Poster")]
    poster: String,
}

fn split_list(value: &str) -> Vec<String> {
    value.split(", ").map(str::to_string).collect()
}

/// The service hands out 300px poster art; the UI wants the 600px rendition
/// that lives next to it.
fn enlarge_poster(poster: &str) -> String {
    match poster.strip_suffix("300.jpg") {
        Some(prefix) => format!("{prefix}600.jpg"),
        None => poster.to_string(),
    }
}

#[async_trait]
impl MetadataService for OmdbClient {
    #[tracing::instrument(name = "metadata search", skip_all, fields(title))]
    async fn lookup_by_title(&self, title: &str) -> Result<Vec<MetadataCandidate>, Error> {
        let response: OmdbSearchResponse = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.expose_secret()), ("s", title)])
            .send()
            .await
            .map_err(|e| Error::UpstreamLookup(e.into()))?
            .json()
            .await
            .map_err(|e| Error::UpstreamLookup(e.into()))?;

        let Some(hits) = response.search else {
            return Err(Error::UpstreamLookup(anyhow!("no results")));
        };

        Ok(hits
            .into_iter()
            .filter(|hit| hit.kind == "movie")
            .map(|hit| MetadataCandidate {
                title: hit.title,
                poster: hit.poster,
                imdb_id: hit.imdb_id,
            })
            .collect())
    }

    #[tracing::instrument(name = "metadata by id", skip_all, fields(external_id))]
    async fn lookup_by_id(&self, external_id: &str) -> Result<MetadataRecord, Error> {
        let response: OmdbMovieResponse = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.expose_secret()), ("i", external_id)])
            .send()
            .await
            .map_err(|e| Error::UpstreamLookup(e.into()))?
            .json()
            .await
            .map_err(|e| Error::UpstreamLookup(e.into()))?;

        Ok(MetadataRecord {
            title: response.title,
            year: response.year,
            rated: response.rated,
            genres: split_list(&response.genre),
            director: split_list(&response.director),
            writer: split_list(&response.writer),
            plot: response.plot,
            runtime: response.runtime,
            poster: enlarge_poster(&response.poster),
        })
    }
}
