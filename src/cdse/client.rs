use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client;

use super::auth::AccessToken;
use super::catalog::{self, ProductCatalog, ProductRecord, SearchCriteria};
use crate::download::{ArchiveSource, ArchiveStream};
use crate::error::{DownloadError, SearchError};

pub const ARCHIVE_URL_BASE: &str = "https://zipper.dataspace.copernicus.eu/odata/v1/Products";

/// Authenticated CDSE client. Holds the one access token of the run and
/// presents the catalog and archive endpoints behind their trait seams.
pub struct CdseClient {
    http: Client,
    token: AccessToken,
}

impl CdseClient {
    pub fn new(http: Client, token: AccessToken) -> Self {
        Self { http, token }
    }

    fn archive_url(product_id: &str) -> String {
        format!("{}({})/$value", ARCHIVE_URL_BASE, product_id)
    }
}

impl ProductCatalog for CdseClient {
    async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ProductRecord>, SearchError> {
        let response = self
            .http
            .get(criteria.query_url())
            .bearer_auth(self.token.secret())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }
        let body = response.text().await?;
        catalog::parse_search_response(&body)
    }
}

impl ArchiveSource for CdseClient {
    async fn open_archive(&self, product_id: &str) -> Result<ArchiveStream, DownloadError> {
        let response = self
            .http
            .get(Self::archive_url(product_id))
            .bearer_auth(self.token.secret())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                product_id: product_id.to_owned(),
                status,
            });
        }
        Ok(response.bytes_stream().map_err(DownloadError::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_url_shape() {
        let url = CdseClient::archive_url("5ac99618-9e21-4ea9-b4f2-f1b1c4d0f5e6");
        assert_eq!(
            url,
            "https://zipper.dataspace.copernicus.eu/odata/v1/Products(5ac99618-9e21-4ea9-b4f2-f1b1c4d0f5e6)/$value"
        );
    }
}
