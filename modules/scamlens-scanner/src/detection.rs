use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use scamlens_common::{find_phone_numbers, Config};

use crate::traits::TextDetector;

/// Text detection outcome for one photo of one listing.
#[derive(Debug, Clone)]
pub struct DetectionRecord {
    pub place_id: String,
    pub photo_url: String,
    /// Full-image text body, newlines flattened to spaces.
    pub photo_text: String,
    pub phone_matches: Vec<String>,
    pub has_match: bool,
}

/// Run text detection over each eligible listing's first few photos.
/// Listings run concurrently at `detection_concurrency`; photos within a
/// listing run in sequence. A failed detection skips that photo only — it
/// never takes down the listing's other photos or other listings. Returns
/// (records, failed photo count).
pub async fn detect_listing_photos(
    detector: &dyn TextDetector,
    config: &Config,
    candidates: &HashMap<String, Vec<String>>,
) -> (Vec<DetectionRecord>, u32) {
    let per_listing: Vec<(Vec<DetectionRecord>, u32)> =
        stream::iter(candidates.iter().map(|(place_id, urls)| async move {
            let mut records = Vec::new();
            let mut failed = 0u32;

            for url in urls.iter().take(config.photos_per_listing) {
                let annotations = match detector.detect_text(url).await {
                    Ok(annotations) => annotations,
                    Err(e) => {
                        warn!(place_id = place_id.as_str(), url = url.as_str(), error = %e, "Text detection failed, skipping photo");
                        failed += 1;
                        continue;
                    }
                };

                // First annotation spans the whole image; per-word
                // annotations follow and are redundant here.
                let Some(first) = annotations.first() else {
                    continue;
                };
                let photo_text = first.description.replace('\n', " ");
                let phone_matches = find_phone_numbers(&photo_text);
                let has_match = !phone_matches.is_empty();
                records.push(DetectionRecord {
                    place_id: place_id.clone(),
                    photo_url: url.clone(),
                    photo_text,
                    phone_matches,
                    has_match,
                });
            }

            (records, failed)
        }))
        .buffer_unordered(config.detection_concurrency)
        .collect()
        .await;

    let mut all = Vec::new();
    let mut photos_failed = 0u32;
    for (records, failed) in per_listing {
        all.extend(records);
        photos_failed += failed;
    }

    info!(records = all.len(), photos_failed, "Text detection finished");
    (all, photos_failed)
}
