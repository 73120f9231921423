use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

use crate::error::SearchError;

pub const CATALOG_URL: &str = "https://catalogue.dataspace.copernicus.eu/odata/v1/Products";

const COLLECTION_NAME: &str = "SENTINEL-2";
const CLOUD_COVER_ATTRIBUTE: &str = "cloudCover";
const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Exclusive ceiling, percent.
    pub max_cloud_cover: f64,
    /// EPSG:4326 polygon, shapely-style WKT.
    pub aoi_wkt: String,
}

impl SearchCriteria {
    /// OData $filter expression: sensor family, acquisition window, cloud
    /// ceiling and AOI intersection, conjoined. The end date is inclusive
    /// through its last instant.
    pub fn filter(&self) -> String {
        let clauses = [
            format!("Collection/Name eq '{}'", COLLECTION_NAME),
            format!("ContentDate/Start gt {}T00:00:00.000Z", self.start_date),
            format!("ContentDate/Start lt {}T23:59:59.999Z", self.end_date),
            format!(
                "Attributes/OData.CSC.DoubleAttribute/any(a:a/Name eq '{}' and a/OData.CSC.DoubleAttribute/Value lt {})",
                CLOUD_COVER_ATTRIBUTE, self.max_cloud_cover
            ),
            format!(
                "OData.CSC.Intersects(area=geography'SRID=4326;{}')",
                self.aoi_wkt
            ),
        ];
        clauses.join(" and ")
    }

    /// Full query URL: filtered, most recent first, capped server-side.
    pub fn query_url(&self) -> Url {
        let top = PAGE_SIZE.to_string();
        Url::parse_with_params(
            CATALOG_URL,
            &[
                ("$filter", self.filter().as_str()),
                ("$orderby", "ContentDate/Start desc"),
                ("$top", top.as_str()),
            ],
        )
        .expect("catalog base URL should always parse")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub acquisition_date: NaiveDate,
}

#[derive(Deserialize)]
struct CatalogResponse {
    // A body without a result array means zero results, not an error.
    #[serde(default)]
    value: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct CatalogEntry {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ContentDate")]
    content_date: ContentDate,
}

#[derive(Deserialize)]
struct ContentDate {
    #[serde(rename = "Start")]
    start: String,
}

impl CatalogEntry {
    fn into_record(self) -> Result<ProductRecord, SearchError> {
        // "2024-01-28T10:30:21.024Z" -- the leading 10 characters are the date
        let acquisition_date = self
            .content_date
            .start
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| {
                SearchError::Product(format!(
                    "unparseable acquisition timestamp '{}' for {}",
                    self.content_date.start, self.name
                ))
            })?;
        Ok(ProductRecord {
            id: self.id,
            name: self.name,
            acquisition_date,
        })
    }
}

pub(crate) fn parse_search_response(body: &str) -> Result<Vec<ProductRecord>, SearchError> {
    let response: CatalogResponse = serde_json::from_str(body)?;
    response
        .value
        .into_iter()
        .map(CatalogEntry::into_record)
        .collect()
}

pub trait ProductCatalog {
    async fn search(&self, criteria: &SearchCriteria)
        -> Result<Vec<ProductRecord>, SearchError>;
}
