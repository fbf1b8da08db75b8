use serde::Deserialize;

/// One raw search result from a text-search page. The same place can show
/// up on several pages and across nearby query points; dedup on `place_id`
/// before fetching details.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingStub {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
}

/// One page of text-search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ListingStub>,
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRef {
    pub photo_reference: String,
}

/// Full details record for one listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingDetail {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    /// Structured phone number. When present there is nothing to extract
    /// from the photos.
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    /// Link back to the listing page.
    pub url: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailsResponse {
    pub result: Option<ListingDetail>,
    #[serde(default)]
    pub status: String,
}
