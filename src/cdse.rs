//! Client surface for the Copernicus Data Space Ecosystem: OAuth token
//! exchange, OData product catalog queries and archive retrieval.
mod auth;
mod catalog;
mod client;

pub use auth::{authenticate, AccessToken, Credentials};
pub use catalog::{ProductCatalog, ProductRecord, SearchCriteria, CATALOG_URL};
pub use client::CdseClient;
