use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "defaultDatasetId", default)]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    /// Wall-clock time between start and finish, once both are known.
    pub fn runtime(&self) -> Option<std::time::Duration> {
        let (started, finished) = (self.started_at?, self.finished_at?);
        (finished - started).to_std().ok()
    }
}

/// Input for the compass/crawler-google-places actor.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleMapsScraperInput {
    #[serde(rename = "searchStringsArray")]
    pub search_strings: Vec<String>,
    #[serde(rename = "maxCrawledPlacesPerSearch")]
    pub max_places_per_search: u32,
    pub language: String,
    #[serde(rename = "includeHistogram")]
    pub include_histogram: bool,
    #[serde(rename = "includeOpeningHours")]
    pub include_opening_hours: bool,
    #[serde(rename = "includePeopleAlsoSearch")]
    pub include_people_also_search: bool,
    #[serde(rename = "includeImages")]
    pub include_images: bool,
    #[serde(rename = "includeReviews")]
    pub include_reviews: bool,
    #[serde(rename = "includeBasicInfo")]
    pub include_basic_info: bool,
    #[serde(rename = "includeContactInfo")]
    pub include_contact_info: bool,
    #[serde(rename = "includeMoreInfo")]
    pub include_more_info: bool,
}

impl GoogleMapsScraperInput {
    /// Contact-oriented defaults: basic, contact and extended info on;
    /// histograms, hours, images, reviews and related searches off.
    pub fn contact_scrape(search_strings: Vec<String>, max_places_per_search: u32, language: &str) -> Self {
        Self {
            search_strings,
            max_places_per_search,
            language: language.to_string(),
            include_histogram: false,
            include_opening_hours: false,
            include_people_also_search: false,
            include_images: false,
            include_reviews: false,
            include_basic_info: true,
            include_contact_info: true,
            include_more_info: true,
        }
    }
}

/// A single place from the Google Maps scraper dataset.
///
/// Field names and shapes vary between actor versions, so every field is kept
/// as a raw JSON value and interpreted by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleMapsPlace {
    pub title: Option<Value>,
    pub name: Option<Value>,
    pub phone: Option<Value>,
    pub address: Option<Value>,
    pub location: Option<Value>,
    pub category: Option<Value>,
    #[serde(rename = "categoryName")]
    pub category_name: Option<Value>,
    #[serde(rename = "type")]
    pub place_type: Option<Value>,
    pub rating: Option<Value>,
    #[serde(rename = "totalScore")]
    pub total_score: Option<Value>,
    pub reviews: Option<Value>,
    #[serde(rename = "reviewsCount")]
    pub reviews_count: Option<Value>,
    pub website: Option<Value>,
    pub email: Option<Value>,
    #[serde(rename = "openingHours")]
    pub opening_hours: Option<Value>,
    pub description: Option<Value>,
}
