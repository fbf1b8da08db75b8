use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use places_client::{ListingDetail, ListingStub};
use scamlens_common::Config;

use crate::traits::PlaceSearcher;

/// Requested width for photo retrieval URLs.
const PHOTO_MAX_WIDTH: u32 = 1600;

/// Fetch full details for every deduplicated stub, `detail_concurrency`
/// requests in flight at a time. One listing's failure never aborts the
/// others; failed listings are counted and dropped. Returns
/// (details keyed by place_id, failure count).
pub async fn fetch_details(
    searcher: &dyn PlaceSearcher,
    config: &Config,
    stubs: &[ListingStub],
) -> (HashMap<String, ListingDetail>, u32) {
    let results: Vec<(String, anyhow::Result<ListingDetail>)> =
        stream::iter(stubs.iter().map(|stub| {
            let place_id = stub.place_id.clone();
            async move {
                let result = searcher.place_details(&place_id).await;
                (place_id, result)
            }
        }))
        .buffer_unordered(config.detail_concurrency)
        .collect()
        .await;

    let mut details = HashMap::new();
    let mut failed = 0u32;
    for (place_id, result) in results {
        match result {
            Ok(detail) => {
                details.insert(place_id, detail);
            }
            Err(e) => {
                warn!(place_id = place_id.as_str(), error = %e, "Detail fetch failed, dropping listing");
                failed += 1;
            }
        }
    }

    info!(fetched = details.len(), failed, "Detail fetch finished");
    (details, failed)
}

/// Build per-listing photo URLs for text detection. Listings that already
/// expose a structured phone number are skipped: the number is in the data,
/// so there is nothing to dig out of the photos. Listings without photos
/// are skipped too. Returns (candidate URLs keyed by place_id, count
/// skipped for a known phone).
pub fn build_photo_candidates(
    searcher: &dyn PlaceSearcher,
    details: &HashMap<String, ListingDetail>,
) -> (HashMap<String, Vec<String>>, u32) {
    let mut candidates = HashMap::new();
    let mut skipped_known_phone = 0u32;

    for (place_id, detail) in details {
        if detail.formatted_phone_number.is_some() {
            skipped_known_phone += 1;
            continue;
        }
        if detail.photos.is_empty() {
            continue;
        }
        let urls: Vec<String> = detail
            .photos
            .iter()
            .map(|photo| searcher.photo_url(&photo.photo_reference, PHOTO_MAX_WIDTH))
            .collect();
        candidates.insert(place_id.clone(), urls);
    }

    (candidates, skipped_known_phone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detail, stub, test_config, FakePlaces};

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_rest() {
        let places = FakePlaces::new();
        places.add_detail(detail("a", Some("Shop A"), None, &["p1"]));
        places.add_detail(detail("c", Some("Shop C"), None, &[]));
        places.fail_details_for("b");

        let config = test_config();
        let stubs = vec![stub("a", "Shop A"), stub("b", "Shop B"), stub("c", "Shop C")];
        let (details, failed) = fetch_details(&places, &config, &stubs).await;

        assert_eq!(details.len(), 2);
        assert_eq!(failed, 1);
        assert!(details.contains_key("a"));
        assert!(details.contains_key("c"));
    }

    #[test]
    fn test_structured_phone_skips_photo_candidates() {
        let places = FakePlaces::new();
        let mut details = HashMap::new();
        details.insert(
            "a".to_string(),
            detail("a", Some("Shop A"), Some("987-654-3210"), &["p1", "p2"]),
        );

        let (candidates, skipped) = build_photo_candidates(&places, &details);
        assert!(candidates.is_empty());
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_photoless_listing_yields_no_candidates() {
        let places = FakePlaces::new();
        let mut details = HashMap::new();
        details.insert("a".to_string(), detail("a", Some("Shop A"), None, &[]));

        let (candidates, skipped) = build_photo_candidates(&places, &details);
        assert!(candidates.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_eligible_listing_gets_one_url_per_photo() {
        let places = FakePlaces::new();
        let mut details = HashMap::new();
        details.insert(
            "a".to_string(),
            detail("a", Some("Shop A"), None, &["p1", "p2", "p3", "p4"]),
        );

        let (candidates, _) = build_photo_candidates(&places, &details);
        assert_eq!(candidates["a"].len(), 4);
        assert!(candidates["a"][0].contains("p1"));
    }
}
