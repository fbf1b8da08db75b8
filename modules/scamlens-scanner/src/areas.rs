use std::path::Path;

use tracing::{info, warn};

use scamlens_common::{Result, ScamLensError};

// Column indexes in the tab-separated postcode dataset.
const COL_POSTCODE: usize = 1;
const COL_STATE: usize = 3;
const COL_DISTRICT: usize = 5;
const COL_LATITUDE: usize = 9;
const COL_LONGITUDE: usize = 10;

/// One row of the postcode reference table: the center of a radius search.
#[derive(Debug, Clone)]
pub struct QueryPoint {
    pub postcode: String,
    pub state: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Static postcode reference table, loaded once per run. Read-only; no
/// network access.
pub struct PostcodeTable {
    points: Vec<QueryPoint>,
}

impl PostcodeTable {
    /// Load the tab-separated postcode dataset. Rows without usable
    /// coordinates are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                ScamLensError::Config(format!("cannot read postcode file {}: {e}", path.display()))
            })?;

        let mut points = Vec::new();
        let mut skipped = 0u32;
        for record in reader.records() {
            let record = record?;
            match parse_row(&record) {
                Some(point) => points.push(point),
                None => skipped += 1,
            }
        }

        if points.is_empty() {
            return Err(ScamLensError::Config(format!(
                "postcode file {} contains no usable rows",
                path.display()
            )));
        }
        if skipped > 0 {
            warn!(skipped, "Postcode rows without coordinates skipped");
        }
        info!(rows = points.len(), "Postcode table loaded");

        Ok(Self { points })
    }

    /// All query points whose state matches `region`. An empty result is a
    /// configuration error, not a silent no-op.
    pub fn query_points(&self, region: &str) -> Result<Vec<QueryPoint>> {
        let points: Vec<QueryPoint> = self
            .points
            .iter()
            .filter(|p| p.state == region)
            .cloned()
            .collect();

        if points.is_empty() {
            return Err(ScamLensError::Config(format!(
                "no postcode rows match region '{region}'"
            )));
        }
        Ok(points)
    }
}

fn parse_row(record: &csv::StringRecord) -> Option<QueryPoint> {
    let latitude: f64 = record.get(COL_LATITUDE)?.trim().parse().ok()?;
    let longitude: f64 = record.get(COL_LONGITUDE)?.trim().parse().ok()?;
    Some(QueryPoint {
        postcode: record.get(COL_POSTCODE)?.to_string(),
        state: record.get(COL_STATE)?.to_string(),
        district: record.get(COL_DISTRICT)?.to_string(),
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
IN\t110001\tDelhi Circle\tDelhi\tDL\tCentral Delhi\t\t\t\t28.6139\t77.2090\t4
IN\t110092\tDelhi Circle\tDelhi\tDL\tEast Delhi\t\t\t\t28.6508\t77.3152\t4
IN\t400001\tMaharashtra Circle\tMaharashtra\tMH\tMumbai\t\t\t\t18.9388\t72.8354\t4
IN\t999999\tBad Circle\tDelhi\tDL\tNowhere\t\t\t\t\t\t4
";

    fn sample_table() -> PostcodeTable {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        PostcodeTable::load(file.path()).unwrap()
    }

    #[test]
    fn test_rows_without_coordinates_are_skipped() {
        let table = sample_table();
        assert_eq!(table.points.len(), 3);
    }

    #[test]
    fn test_region_filter() {
        let table = sample_table();
        let points = table.query_points("Delhi").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].postcode, "110001");
        assert!((points[0].latitude - 28.6139).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_region_is_config_error() {
        let table = sample_table();
        assert!(matches!(
            table.query_points("Atlantis"),
            Err(ScamLensError::Config(_))
        ));
    }
}
