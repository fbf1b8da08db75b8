//! Fakes and fixture builders shared by unit and integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use places_client::{ListingDetail, ListingStub, PhotoRef, SearchResponse};
use scamlens_common::{find_phone_numbers, Config};
use vision_client::TextAnnotation;

use crate::detection::DetectionRecord;
use crate::traits::{PlaceSearcher, TextDetector};

pub fn test_config() -> Config {
    Config {
        places_api_key: "places-key".into(),
        vision_api_key: "vision-key".into(),
        postcode_file: "postcodes.txt".into(),
        region: "Delhi".into(),
        query: "wine shop".into(),
        output_dir: "data".into(),
        detail_concurrency: 4,
        detection_concurrency: 4,
        max_pages: 3,
        page_token_delay_ms: 0,
        photos_per_listing: 3,
        search_radius_m: 5000,
        http_timeout_secs: 30,
    }
}

pub fn stub(place_id: &str, name: &str) -> ListingStub {
    ListingStub {
        place_id: place_id.to_string(),
        name: Some(name.to_string()),
        formatted_address: None,
    }
}

pub fn detail(
    place_id: &str,
    name: Option<&str>,
    phone: Option<&str>,
    photo_refs: &[&str],
) -> ListingDetail {
    ListingDetail {
        place_id: place_id.to_string(),
        name: name.map(String::from),
        formatted_address: Some(format!("{place_id} street, Delhi")),
        formatted_phone_number: phone.map(String::from),
        website: None,
        url: Some(format!("https://maps.test/{place_id}")),
        photos: photo_refs
            .iter()
            .map(|r| PhotoRef {
                photo_reference: r.to_string(),
            })
            .collect(),
    }
}

pub fn record(place_id: &str, photo_url: &str, photo_text: &str) -> DetectionRecord {
    let phone_matches = find_phone_numbers(photo_text);
    let has_match = !phone_matches.is_empty();
    DetectionRecord {
        place_id: place_id.to_string(),
        photo_url: photo_url.to_string(),
        photo_text: photo_text.to_string(),
        phone_matches,
        has_match,
    }
}

/// In-memory places API. Search pages are keyed by "lat,lng" and served in
/// insertion order; with an endless token every response carries a
/// next-page token that never expires.
#[derive(Default)]
pub struct FakePlaces {
    pages: Mutex<HashMap<String, VecDeque<SearchResponse>>>,
    details: Mutex<HashMap<String, ListingDetail>>,
    failing_details: Mutex<HashSet<String>>,
    failing_points: Mutex<HashSet<String>>,
    failing_tokens: Mutex<HashSet<String>>,
    search_count: AtomicU32,
    endless_token: bool,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endless_token() -> Self {
        Self {
            endless_token: true,
            ..Self::default()
        }
    }

    pub fn add_page(&self, point_key: &str, results: Vec<ListingStub>, token: Option<&str>) {
        self.pages
            .lock()
            .unwrap()
            .entry(point_key.to_string())
            .or_default()
            .push_back(SearchResponse {
                results,
                next_page_token: token.map(String::from),
                status: "OK".to_string(),
            });
    }

    pub fn add_detail(&self, detail: ListingDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.place_id.clone(), detail);
    }

    pub fn fail_details_for(&self, place_id: &str) {
        self.failing_details
            .lock()
            .unwrap()
            .insert(place_id.to_string());
    }

    /// Every search at this "lat,lng" point fails.
    pub fn fail_search_at(&self, point_key: &str) {
        self.failing_points
            .lock()
            .unwrap()
            .insert(point_key.to_string());
    }

    /// Any search carrying this pagination token fails.
    pub fn fail_search_token(&self, token: &str) {
        self.failing_tokens.lock().unwrap().insert(token.to_string());
    }

    pub fn search_calls(&self) -> u32 {
        self.search_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceSearcher for FakePlaces {
    async fn text_search(
        &self,
        _query: &str,
        lat: f64,
        lng: f64,
        _radius_m: u32,
        page_token: Option<&str>,
    ) -> Result<SearchResponse> {
        self.search_count.fetch_add(1, Ordering::SeqCst);

        let key = format!("{lat},{lng}");
        if self.failing_points.lock().unwrap().contains(&key) {
            anyhow::bail!("synthetic search failure at {key}");
        }
        if let Some(token) = page_token {
            if self.failing_tokens.lock().unwrap().contains(token) {
                anyhow::bail!("synthetic pagination failure for token {token}");
            }
        }

        if self.endless_token {
            return Ok(SearchResponse {
                results: vec![],
                next_page_token: Some("warm-token".to_string()),
                status: "OK".to_string(),
            });
        }

        let page = self.pages.lock().unwrap().get_mut(&key).and_then(VecDeque::pop_front);
        Ok(page.unwrap_or(SearchResponse {
            results: vec![],
            next_page_token: None,
            status: "ZERO_RESULTS".to_string(),
        }))
    }

    async fn place_details(&self, place_id: &str) -> Result<ListingDetail> {
        if self.failing_details.lock().unwrap().contains(place_id) {
            anyhow::bail!("synthetic detail failure for {place_id}");
        }
        self.details
            .lock()
            .unwrap()
            .get(place_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no detail configured for {place_id}"))
    }

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        format!("https://photos.test/{photo_reference}?w={max_width}")
    }
}

/// In-memory text-detection API. Photo URLs without configured text return
/// zero annotations; URLs in the failure set error out.
#[derive(Default)]
pub struct FakeDetector {
    texts: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    call_count: AtomicU32,
}

impl FakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text(&self, photo_url: &str, text: &str) {
        self.texts
            .lock()
            .unwrap()
            .insert(photo_url.to_string(), text.to_string());
    }

    pub fn fail_for(&self, photo_url: &str) {
        self.failing.lock().unwrap().insert(photo_url.to_string());
    }

    pub fn calls(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextDetector for FakeDetector {
    async fn detect_text(&self, image_uri: &str) -> Result<Vec<TextAnnotation>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(image_uri) {
            anyhow::bail!("synthetic detection failure for {image_uri}");
        }

        Ok(self
            .texts
            .lock()
            .unwrap()
            .get(image_uri)
            .map(|text| {
                vec![TextAnnotation {
                    description: text.clone(),
                }]
            })
            .unwrap_or_default())
    }
}
