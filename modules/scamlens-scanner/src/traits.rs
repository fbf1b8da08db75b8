use anyhow::Result;
use async_trait::async_trait;

use places_client::{ListingDetail, PlacesClient, PlacesError, SearchResponse};
use scamlens_common::ScamLensError;
use vision_client::{TextAnnotation, VisionClient, VisionError};

/// Seam over the places API so pipeline stages can run against fakes.
#[async_trait]
pub trait PlaceSearcher: Send + Sync {
    async fn text_search(
        &self,
        query: &str,
        lat: f64,
        lng: f64,
        radius_m: u32,
        page_token: Option<&str>,
    ) -> Result<SearchResponse>;

    async fn place_details(&self, place_id: &str) -> Result<ListingDetail>;

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String;
}

/// Seam over the text-detection API.
#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect_text(&self, image_uri: &str) -> Result<Vec<TextAnnotation>>;
}

/// Fold client-crate errors into the run-level taxonomy: malformed bodies
/// are parse errors, everything else is an upstream failure.
fn places_error(err: PlacesError) -> ScamLensError {
    match err {
        PlacesError::Parse(message) => ScamLensError::Parse(message),
        other => ScamLensError::Upstream(other.to_string()),
    }
}

fn vision_error(err: VisionError) -> ScamLensError {
    match err {
        VisionError::Parse(message) => ScamLensError::Parse(message),
        other => ScamLensError::Upstream(other.to_string()),
    }
}

#[async_trait]
impl PlaceSearcher for PlacesClient {
    async fn text_search(
        &self,
        query: &str,
        lat: f64,
        lng: f64,
        radius_m: u32,
        page_token: Option<&str>,
    ) -> Result<SearchResponse> {
        Ok(PlacesClient::text_search(self, query, lat, lng, radius_m, page_token)
            .await
            .map_err(places_error)?)
    }

    async fn place_details(&self, place_id: &str) -> Result<ListingDetail> {
        Ok(PlacesClient::place_details(self, place_id)
            .await
            .map_err(places_error)?)
    }

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        PlacesClient::photo_url(self, photo_reference, max_width)
    }
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_text(&self, image_uri: &str) -> Result<Vec<TextAnnotation>> {
        Ok(VisionClient::detect_text(self, image_uri)
            .await
            .map_err(vision_error)?)
    }
}
