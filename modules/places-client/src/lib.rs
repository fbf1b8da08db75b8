pub mod error;
pub mod types;

pub use error::{PlacesError, Result};
pub use types::{DetailsResponse, ListingDetail, ListingStub, PhotoRef, SearchResponse};

use std::time::Duration;

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Statuses that indicate a usable response. `ZERO_RESULTS` is an empty
/// page, not a failure.
const OK_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

pub struct PlacesClient {
    client: reqwest::Client,
    api_key: String,
}

impl PlacesClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, api_key }
    }

    /// Fetch one page of a text search around a point. Pass the previous
    /// page's `next_page_token` to fetch the following page; the token needs
    /// a short warm-up delay before it is accepted upstream.
    pub async fn text_search(
        &self,
        query: &str,
        lat: f64,
        lng: f64,
        radius_m: u32,
        page_token: Option<&str>,
    ) -> Result<SearchResponse> {
        let url = format!("{BASE_URL}/textsearch/json");
        let location = format!("{lat},{lng}");
        let radius = radius_m.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("query", query),
            ("location", &location),
            ("radius", &radius),
            ("key", &self.api_key),
        ];
        if let Some(token) = page_token {
            params.push(("pagetoken", token));
        }

        tracing::debug!(lat, lng, page = page_token.is_some(), "Places text search");
        let resp = self.client.get(&url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlacesError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let search: SearchResponse = resp.json().await?;
        check_status(&search.status)?;
        Ok(search)
    }

    /// Fetch the full details record for one listing.
    pub async fn place_details(&self, place_id: &str) -> Result<ListingDetail> {
        let url = format!("{BASE_URL}/details/json");
        let params = [("place_id", place_id), ("key", &self.api_key)];

        tracing::debug!(place_id, "Places details");
        let resp = self.client.get(&url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlacesError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let details: DetailsResponse = resp.json().await?;
        check_status(&details.status)?;
        details
            .result
            .ok_or_else(|| PlacesError::Parse(format!("details response for {place_id} has no result")))
    }

    /// Deterministic photo retrieval URL for a photo reference. The image is
    /// never fetched here; the URL is handed straight to text detection.
    pub fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        format!(
            "{BASE_URL}/photo?maxwidth={max_width}&photo_reference={photo_reference}&key={}",
            self.api_key
        )
    }
}

fn check_status(status: &str) -> Result<()> {
    if OK_STATUSES.contains(&status) {
        return Ok(());
    }
    Err(PlacesError::Status(
        status.to_string(),
        "request rejected by the Places API".to_string(),
    ))
}
