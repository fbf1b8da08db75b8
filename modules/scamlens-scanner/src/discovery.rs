use std::collections::HashSet;
use std::time::Duration;

use tracing::{info, warn};

use places_client::ListingStub;
use scamlens_common::{Config, Result};

use crate::areas::QueryPoint;
use crate::scanner::RunStats;
use crate::traits::PlaceSearcher;

/// Paginated text search across every query point, concatenated in
/// first-seen order. A failing query point is logged and skipped; only the
/// very first search call of the run failing is fatal, since that means the
/// upstream is unreachable or the key is bad.
pub async fn discover_listings(
    searcher: &dyn PlaceSearcher,
    config: &Config,
    points: &[QueryPoint],
    stats: &mut RunStats,
) -> Result<Vec<ListingStub>> {
    let mut stubs = Vec::new();

    for (index, point) in points.iter().enumerate() {
        match search_point(searcher, config, point, stats).await {
            Ok(mut point_stubs) => stubs.append(&mut point_stubs),
            Err(e) if index == 0 => {
                return Err(e
                    .context("first search call failed, upstream unavailable")
                    .into());
            }
            Err(e) => {
                warn!(postcode = point.postcode.as_str(), error = %e, "Query point failed, skipping");
                stats.points_failed += 1;
            }
        }
    }

    info!(stubs = stubs.len(), "Discovery finished");
    Ok(stubs)
}

/// One query point: an initial search plus up to `max_pages` token-driven
/// follow-up pages. Pagination stops early when the token disappears or a
/// page fails; stubs from earlier pages are kept either way.
async fn search_point(
    searcher: &dyn PlaceSearcher,
    config: &Config,
    point: &QueryPoint,
    stats: &mut RunStats,
) -> anyhow::Result<Vec<ListingStub>> {
    let mut page = searcher
        .text_search(
            &config.query,
            point.latitude,
            point.longitude,
            config.search_radius_m,
            None,
        )
        .await?;
    stats.pages_fetched += 1;
    let mut stubs = std::mem::take(&mut page.results);

    let mut pages_followed = 0;
    while pages_followed < config.max_pages {
        let Some(token) = page.next_page_token.take() else {
            break;
        };

        // The token only becomes valid a moment after the page that issued
        // it; using it immediately gets rejected upstream.
        tokio::time::sleep(Duration::from_millis(config.page_token_delay_ms)).await;

        page = match searcher
            .text_search(
                &config.query,
                point.latitude,
                point.longitude,
                config.search_radius_m,
                Some(&token),
            )
            .await
        {
            Ok(next) => next,
            Err(e) => {
                warn!(postcode = point.postcode.as_str(), error = %e, "Pagination failed, dropping remaining pages");
                break;
            }
        };
        stats.pages_fetched += 1;
        stubs.append(&mut page.results);
        pages_followed += 1;
    }

    Ok(stubs)
}

/// First occurrence per place_id wins. Later duplicates come from
/// overlapping query-point radii and pagination overlap; dropping them is
/// policy, not a defect.
pub fn dedup_stubs(stubs: Vec<ListingStub>) -> Vec<ListingStub> {
    let mut seen = HashSet::new();
    stubs
        .into_iter()
        .filter(|stub| seen.insert(stub.place_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{stub, test_config, FakePlaces};

    fn point(postcode: &str, latitude: f64, longitude: f64) -> QueryPoint {
        QueryPoint {
            postcode: postcode.into(),
            state: "Delhi".into(),
            district: "Central Delhi".into(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let stubs = vec![
            stub("a", "Shop A"),
            stub("b", "Shop B"),
            stub("a", "Shop A again"),
            stub("c", "Shop C"),
            stub("b", "Shop B again"),
        ];
        let unique = dedup_stubs(stubs);
        let ids: Vec<&str> = unique.iter().map(|s| s.place_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(unique[0].name.as_deref(), Some("Shop A"));
    }

    #[tokio::test]
    async fn test_pagination_is_bounded_when_token_never_disappears() {
        let places = FakePlaces::with_endless_token();
        let mut config = test_config();
        config.max_pages = 3;

        let mut stats = RunStats::default();
        search_point(&places, &config, &point("110001", 28.6, 77.2), &mut stats)
            .await
            .unwrap();

        // Initial request plus at most max_pages follow-ups.
        assert_eq!(places.search_calls(), 4);
        assert_eq!(stats.pages_fetched, 4);
    }

    #[tokio::test]
    async fn test_pagination_stops_when_token_absent() {
        let places = FakePlaces::new();
        places.add_page("28.6,77.2", vec![stub("a", "Shop A")], None);

        let config = test_config();
        let mut stats = RunStats::default();
        let stubs = search_point(&places, &config, &point("110001", 28.6, 77.2), &mut stats)
            .await
            .unwrap();

        assert_eq!(stubs.len(), 1);
        assert_eq!(places.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_first_search_failure_aborts_the_run() {
        let places = FakePlaces::new();
        places.fail_search_at("28.6,77.2");

        let config = test_config();
        let points = vec![point("110001", 28.6, 77.2), point("110092", 28.7, 77.3)];
        let mut stats = RunStats::default();
        let result = discover_listings(&places, &config, &points, &mut stats).await;

        assert!(result.is_err());
        // The second point is never attempted.
        assert_eq!(places.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_later_point_failure_is_skipped_and_counted() {
        let places = FakePlaces::new();
        places.add_page("28.6,77.2", vec![stub("a", "Shop A")], None);
        places.fail_search_at("28.7,77.3");

        let config = test_config();
        let points = vec![point("110001", 28.6, 77.2), point("110092", 28.7, 77.3)];
        let mut stats = RunStats::default();
        let stubs = discover_listings(&places, &config, &points, &mut stats)
            .await
            .unwrap();

        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].place_id, "a");
        assert_eq!(stats.points_failed, 1);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_earlier_stubs() {
        let places = FakePlaces::new();
        places.add_page("28.6,77.2", vec![stub("a", "Shop A")], Some("t1"));
        places.fail_search_token("t1");

        let config = test_config();
        let mut stats = RunStats::default();
        let stubs = search_point(&places, &config, &point("110001", 28.6, 77.2), &mut stats)
            .await
            .unwrap();

        assert_eq!(stubs.len(), 1);
        assert_eq!(places.search_calls(), 2);
        assert_eq!(stats.pages_fetched, 1);
    }
}
