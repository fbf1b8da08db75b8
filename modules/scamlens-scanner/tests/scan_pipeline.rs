//! Full pipeline runs against in-memory places and detection fakes.

use std::fs;
use std::io::Write;

use scamlens_scanner::scanner::Scanner;
use scamlens_scanner::testing::{detail, stub, test_config, FakeDetector, FakePlaces};

const POSTCODES: &str = "\
IN\t110001\tDelhi Circle\tDelhi\tDL\tCentral Delhi\t\t\t\t28.61\t77.21\t4
IN\t110092\tDelhi Circle\tDelhi\tDL\tEast Delhi\t\t\t\t28.65\t77.31\t4
";

fn write_postcodes() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(POSTCODES.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn overlapping_query_points_produce_one_row_per_unique_listing() {
    let postcodes = write_postcodes();
    let output_dir = tempfile::tempdir().unwrap();

    let mut config = test_config();
    config.postcode_file = postcodes.path().to_string_lossy().into_owned();
    config.output_dir = output_dir.path().to_string_lossy().into_owned();

    // Both points return the same "shared" listing; radii overlap.
    let places = FakePlaces::new();
    places.add_page(
        "28.61,77.21",
        vec![stub("shared", "Shared Wines"), stub("shop-a", "Wine Shop A")],
        None,
    );
    places.add_page(
        "28.65,77.31",
        vec![stub("shared", "Shared Wines"), stub("shop-b", "Wine Shop B")],
        None,
    );
    places.add_detail(detail("shared", Some("Shared Wines"), None, &["s1", "s2"]));
    places.add_detail(detail("shop-a", Some("Wine Shop A"), None, &["a1"]));
    // shop-b already exposes a structured phone number, so its photos are
    // never scanned.
    places.add_detail(detail(
        "shop-b",
        Some("Wine Shop B"),
        Some("011-234-5678"),
        &["b1"],
    ));

    let detector = FakeDetector::new();
    detector.fail_for("https://photos.test/s1?w=1600");
    detector.add_text(
        "https://photos.test/s2?w=1600",
        "SHARED WINES\ncall 987-654-3210",
    );
    detector.add_text(
        "https://photos.test/a1?w=1600",
        "best deals +91 98765 43210",
    );

    let scanner = Scanner::new(&places, &detector, &config);
    let stats = scanner.run().await.unwrap();

    assert_eq!(stats.query_points, 2);
    assert_eq!(stats.stubs_seen, 4);
    assert_eq!(stats.unique_listings, 3);
    assert_eq!(stats.details_fetched, 3);
    assert_eq!(stats.skipped_known_phone, 1);
    assert_eq!(stats.listings_scanned, 2);
    // s1 failed but s2 still produced a record for the same listing.
    assert_eq!(stats.photos_failed, 1);
    assert_eq!(stats.detection_records, 2);
    assert_eq!(stats.records_with_match, 2);
    assert_eq!(stats.rows_written, 2);

    let final_table = fs::read_to_string(output_dir.path().join("wine_shop.csv")).unwrap();
    let rows: Vec<&str> = final_table.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.contains("shared")));
    assert!(rows.iter().any(|r| r.contains("shop-a")));
    assert!(!final_table.contains("shop-b"));

    // Dropped from the final table, still present in the details export.
    let details_table =
        fs::read_to_string(output_dir.path().join("listing_details_wine_shop.csv")).unwrap();
    assert!(details_table.contains("shop-b"));
    assert!(details_table.contains("011-234-5678"));

    let detections_table =
        fs::read_to_string(output_dir.path().join("detections_wine_shop.csv")).unwrap();
    assert!(detections_table.contains("987-654-3210"));
}

#[tokio::test]
async fn detail_fetch_failure_drops_listing_but_run_completes() {
    let postcodes = write_postcodes();
    let output_dir = tempfile::tempdir().unwrap();

    let mut config = test_config();
    config.postcode_file = postcodes.path().to_string_lossy().into_owned();
    config.output_dir = output_dir.path().to_string_lossy().into_owned();

    let places = FakePlaces::new();
    places.add_page(
        "28.61,77.21",
        vec![stub("good", "Good Wines"), stub("flaky", "Flaky Wines")],
        None,
    );
    places.add_detail(detail("good", Some("Good Wines"), None, &["g1"]));
    places.fail_details_for("flaky");

    let detector = FakeDetector::new();
    detector.add_text("https://photos.test/g1?w=1600", "ring 987-654-3210");

    let scanner = Scanner::new(&places, &detector, &config);
    let stats = scanner.run().await.unwrap();

    assert_eq!(stats.details_fetched, 1);
    assert_eq!(stats.details_failed, 1);
    assert_eq!(stats.rows_written, 1);

    let details_table =
        fs::read_to_string(output_dir.path().join("listing_details_wine_shop.csv")).unwrap();
    assert!(details_table.contains("good"));
    assert!(!details_table.contains("flaky"));
}

#[tokio::test]
async fn paginated_pages_feed_the_same_dedup_pass() {
    let postcodes = write_postcodes();
    let output_dir = tempfile::tempdir().unwrap();

    let mut config = test_config();
    config.postcode_file = postcodes.path().to_string_lossy().into_owned();
    config.output_dir = output_dir.path().to_string_lossy().into_owned();

    // Page two repeats a stub from page one.
    let places = FakePlaces::new();
    places.add_page("28.61,77.21", vec![stub("a", "Shop A")], Some("t1"));
    places.add_page(
        "28.61,77.21",
        vec![stub("a", "Shop A"), stub("b", "Shop B")],
        None,
    );
    places.add_detail(detail("a", Some("Shop A"), None, &[]));
    places.add_detail(detail("b", Some("Shop B"), None, &[]));

    let detector = FakeDetector::new();
    let scanner = Scanner::new(&places, &detector, &config);
    let stats = scanner.run().await.unwrap();

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.stubs_seen, 3);
    assert_eq!(stats.unique_listings, 2);
    // No photos anywhere, so the final table only has its header.
    assert_eq!(stats.rows_written, 0);
    let final_table = fs::read_to_string(output_dir.path().join("wine_shop.csv")).unwrap();
    assert_eq!(final_table.lines().count(), 1);
}
