use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::info;

use places_client::ListingDetail;
use scamlens_common::{Config, Result};

use crate::detection::DetectionRecord;

/// Final deliverable row: one listing paired with one photo that produced
/// detected text.
#[derive(Debug, Clone)]
pub struct ReconciledRow {
    pub name: String,
    pub phone_matches: String,
    pub photo_text: String,
    pub maps_url: String,
    pub photo_url: String,
    pub photo_count: usize,
    pub place_id: String,
    pub formatted_address: String,
}

/// Inner join of details and detection records on place id. Listings with
/// zero detection records drop out here; they remain in the details export.
pub fn reconcile(
    details: &HashMap<String, ListingDetail>,
    records: &[DetectionRecord],
) -> Vec<ReconciledRow> {
    let mut rows = Vec::new();
    for record in records {
        let Some(detail) = details.get(&record.place_id) else {
            continue;
        };
        rows.push(ReconciledRow {
            name: detail.name.clone().unwrap_or_default(),
            phone_matches: record.phone_matches.join(", "),
            photo_text: record.photo_text.clone(),
            maps_url: detail.url.clone().unwrap_or_default(),
            photo_url: record.photo_url.clone(),
            photo_count: detail.photos.len(),
            place_id: record.place_id.clone(),
            formatted_address: detail.formatted_address.clone().unwrap_or_default(),
        });
    }
    // Stable order across runs; buffer_unordered hands records back in
    // completion order.
    rows.sort_by(|a, b| (&a.place_id, &a.photo_url).cmp(&(&b.place_id, &b.photo_url)));
    rows
}

/// Paths of the three per-run output files.
#[derive(Debug)]
pub struct ReportPaths {
    pub detections: PathBuf,
    pub listing_details: PathBuf,
    pub reconciled: PathBuf,
}

/// Writes the `;`-delimited output tables. Filenames derive from the search
/// query; each run overwrites the previous one, nothing is read back.
pub struct ReportWriter {
    output_dir: PathBuf,
    slug: String,
}

impl ReportWriter {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            slug: config.query_slug(),
        }
    }

    pub fn write_all(
        &self,
        details: &HashMap<String, ListingDetail>,
        records: &[DetectionRecord],
        rows: &[ReconciledRow],
    ) -> Result<ReportPaths> {
        fs::create_dir_all(&self.output_dir)?;

        let paths = ReportPaths {
            detections: self.output_dir.join(format!("detections_{}.csv", self.slug)),
            listing_details: self
                .output_dir
                .join(format!("listing_details_{}.csv", self.slug)),
            reconciled: self.output_dir.join(format!("{}.csv", self.slug)),
        };

        self.write_detections(&paths.detections, records)?;
        self.write_details(&paths.listing_details, details)?;
        self.write_reconciled(&paths.reconciled, rows)?;

        info!(dir = %self.output_dir.display(), "Reports written");
        Ok(paths)
    }

    fn write_detections(&self, path: &PathBuf, records: &[DetectionRecord]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        writer.write_record(["place_id", "photo_url", "photo_text", "phone_matches", "has_match"])?;

        let mut sorted: Vec<&DetectionRecord> = records.iter().collect();
        sorted.sort_by(|a, b| (&a.place_id, &a.photo_url).cmp(&(&b.place_id, &b.photo_url)));
        for record in sorted {
            let matches = record.phone_matches.join(", ");
            writer.write_record([
                record.place_id.as_str(),
                record.photo_url.as_str(),
                record.photo_text.as_str(),
                matches.as_str(),
                if record.has_match { "true" } else { "false" },
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_details(
        &self,
        path: &PathBuf,
        details: &HashMap<String, ListingDetail>,
    ) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        writer.write_record([
            "place_id",
            "name",
            "formatted_address",
            "formatted_phone_number",
            "website",
            "url",
            "photo_count",
        ])?;

        let mut sorted: Vec<&ListingDetail> = details.values().collect();
        sorted.sort_by(|a, b| a.place_id.cmp(&b.place_id));
        for detail in sorted {
            let photo_count = detail.photos.len().to_string();
            writer.write_record([
                detail.place_id.as_str(),
                detail.name.as_deref().unwrap_or(""),
                detail.formatted_address.as_deref().unwrap_or(""),
                detail.formatted_phone_number.as_deref().unwrap_or(""),
                detail.website.as_deref().unwrap_or(""),
                detail.url.as_deref().unwrap_or(""),
                photo_count.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_reconciled(&self, path: &PathBuf, rows: &[ReconciledRow]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        writer.write_record([
            "name",
            "phone_matches",
            "photo_text",
            "url",
            "photo_url",
            "photo_count",
            "place_id",
            "formatted_address",
        ])?;
        for row in rows {
            let photo_count = row.photo_count.to_string();
            writer.write_record([
                row.name.as_str(),
                row.phone_matches.as_str(),
                row.photo_text.as_str(),
                row.maps_url.as_str(),
                row.photo_url.as_str(),
                photo_count.as_str(),
                row.place_id.as_str(),
                row.formatted_address.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
