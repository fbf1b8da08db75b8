use std::path::Path;

use tracing::info;

use scamlens_common::{Config, Result};

use crate::areas::PostcodeTable;
use crate::report::ReportWriter;
use crate::traits::{PlaceSearcher, TextDetector};
use crate::{detection, details, discovery, report};

/// Counters for one scan run. Logged at the end so skipped and failed work
/// is visible, never silently swallowed.
#[derive(Debug, Default)]
pub struct RunStats {
    pub query_points: u32,
    pub points_failed: u32,
    pub pages_fetched: u32,
    pub stubs_seen: u32,
    pub unique_listings: u32,
    pub details_fetched: u32,
    pub details_failed: u32,
    pub skipped_known_phone: u32,
    pub listings_scanned: u32,
    pub photos_failed: u32,
    pub detection_records: u32,
    pub records_with_match: u32,
    pub rows_written: u32,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Scan Complete ===")?;
        writeln!(f, "Query points:        {} ({} failed)", self.query_points, self.points_failed)?;
        writeln!(f, "Pages fetched:       {}", self.pages_fetched)?;
        writeln!(f, "Stubs seen:          {}", self.stubs_seen)?;
        writeln!(f, "Unique listings:     {}", self.unique_listings)?;
        writeln!(f, "Details fetched:     {} ({} failed)", self.details_fetched, self.details_failed)?;
        writeln!(f, "Phone already known: {}", self.skipped_known_phone)?;
        writeln!(f, "Listings scanned:    {}", self.listings_scanned)?;
        writeln!(f, "Photos failed:       {}", self.photos_failed)?;
        writeln!(f, "Detection records:   {} ({} with a match)", self.detection_records, self.records_with_match)?;
        writeln!(f, "Final rows written:  {}", self.rows_written)
    }
}

/// One batch run: enumerate query points, discover listings, fetch details,
/// detect photo text, reconcile, write reports. Strictly staged; each phase
/// drains before the next starts.
pub struct Scanner<'a> {
    searcher: &'a dyn PlaceSearcher,
    detector: &'a dyn TextDetector,
    config: &'a Config,
}

impl<'a> Scanner<'a> {
    pub fn new(
        searcher: &'a dyn PlaceSearcher,
        detector: &'a dyn TextDetector,
        config: &'a Config,
    ) -> Self {
        Self {
            searcher,
            detector,
            config,
        }
    }

    pub async fn run(&self) -> Result<RunStats> {
        let mut stats = RunStats::default();

        let table = PostcodeTable::load(Path::new(&self.config.postcode_file))?;
        let points = table.query_points(&self.config.region)?;
        stats.query_points = points.len() as u32;
        info!(
            region = self.config.region.as_str(),
            points = points.len(),
            "Enumerated query points"
        );

        let stubs =
            discovery::discover_listings(self.searcher, self.config, &points, &mut stats).await?;
        stats.stubs_seen = stubs.len() as u32;
        let unique = discovery::dedup_stubs(stubs);
        stats.unique_listings = unique.len() as u32;
        info!(
            unique = unique.len(),
            duplicates = stats.stubs_seen - stats.unique_listings,
            "Listings deduplicated"
        );

        let (listing_details, details_failed) =
            details::fetch_details(self.searcher, self.config, &unique).await;
        stats.details_fetched = listing_details.len() as u32;
        stats.details_failed = details_failed;

        let (candidates, skipped_known_phone) =
            details::build_photo_candidates(self.searcher, &listing_details);
        stats.skipped_known_phone = skipped_known_phone;
        stats.listings_scanned = candidates.len() as u32;

        let (records, photos_failed) =
            detection::detect_listing_photos(self.detector, self.config, &candidates).await;
        stats.detection_records = records.len() as u32;
        stats.records_with_match = records.iter().filter(|r| r.has_match).count() as u32;
        stats.photos_failed = photos_failed;

        let rows = report::reconcile(&listing_details, &records);
        stats.rows_written = rows.len() as u32;

        // Partial results are still worth writing; failures above only ever
        // dropped individual listings or photos.
        let writer = ReportWriter::new(self.config);
        writer.write_all(&listing_details, &records, &rows)?;

        Ok(stats)
    }
}
