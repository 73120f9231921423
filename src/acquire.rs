//! Wires one acquisition run: catalog search, operator selection, plan
//! generation and batch download.

use std::fs;

use anyhow::Result;

use crate::cdse::{ProductCatalog, SearchCriteria};
use crate::config::DownloadSettings;
use crate::download::{ArchiveSource, DownloadOutcome, DownloadPlan, DownloadTask};
use crate::selection::SelectionSource;

pub const PLAN_FILE_NAME: &str = "download_plan.json";

#[derive(Debug)]
pub enum AcquisitionOutcome {
    /// The catalog returned nothing for the given filters; clean early exit.
    NoProducts,
    /// Candidates were found but the selection resolved to none of them.
    NothingSelected,
    Downloaded(Vec<DownloadOutcome>),
}

pub async fn run_acquisition<C, A, S>(
    catalog: &C,
    archives: &A,
    selector: &S,
    criteria: &SearchCriteria,
    settings: &DownloadSettings,
) -> Result<AcquisitionOutcome>
where
    C: ProductCatalog,
    A: ArchiveSource + Sync,
    S: SelectionSource + ?Sized,
{
    log::info!(
        "searching Sentinel-2 products, {} to {}, cloud cover < {}",
        criteria.start_date,
        criteria.end_date,
        criteria.max_cloud_cover
    );
    let products = catalog.search(criteria).await?;
    if products.is_empty() {
        return Ok(AcquisitionOutcome::NoProducts);
    }
    log::info!("found {} product(s)", products.len());

    let selected = selector.resolve(&products)?;
    if selected.is_empty() {
        return Ok(AcquisitionOutcome::NothingSelected);
    }

    let tasks = selected
        .iter()
        .filter_map(|&i| products.get(i))
        .map(|product| DownloadTask::for_product(product, &settings.output_dir))
        .collect::<Vec<_>>();
    let plan = DownloadPlan::new(tasks);

    fs::create_dir_all(&settings.output_dir)?;
    plan.write(settings.output_dir.join(PLAN_FILE_NAME))?;

    let outcomes = plan
        .execute(archives, settings.on_failure, settings.concurrency)
        .await?;
    Ok(AcquisitionOutcome::Downloaded(outcomes))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use bytes::Bytes;
    use chrono::NaiveDate;
    use futures_util::{stream, StreamExt};
    use tempfile::tempdir;

    use super::*;
    use crate::cdse::ProductRecord;
    use crate::download::{ArchiveStream, OnFailure};
    use crate::error::{DownloadError, SearchError};
    use crate::selection::IndexList;

    struct FixedCatalog(Vec<ProductRecord>);

    impl ProductCatalog for FixedCatalog {
        async fn search(
            &self,
            _criteria: &SearchCriteria,
        ) -> Result<Vec<ProductRecord>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct StaticArchives;

    impl ArchiveSource for StaticArchives {
        async fn open_archive(&self, _product_id: &str) -> Result<ArchiveStream, DownloadError> {
            let chunks: Vec<Result<Bytes, DownloadError>> =
                vec![Ok(Bytes::from_static(b"PK\x03\x04 fake archive"))];
            Ok(stream::iter(chunks).boxed())
        }
    }

    /// Fails the run if the selection stage is ever reached.
    struct Untouchable;

    impl SelectionSource for Untouchable {
        fn resolve(&self, _products: &[ProductRecord]) -> io::Result<Vec<usize>> {
            panic!("selection must not run when the catalog is empty")
        }
    }

    fn two_products() -> Vec<ProductRecord> {
        vec![
            ProductRecord {
                id: "5ac99618-9e21-4ea9-b4f2-f1b1c4d0f5e6".to_string(),
                name: "S2A_MSIL2A_20240130T103201_N0510_R108_T32TQM_20240130T141201.SAFE"
                    .to_string(),
                acquisition_date: NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
            },
            ProductRecord {
                id: "c2f7c6f0-13af-44e4-b54a-0a6c0f9a6b8e".to_string(),
                name: "S2B_MSIL2A_20240112T103329_N0510_R108_T32TQM_20240112T122354.SAFE"
                    .to_string(),
                acquisition_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            },
        ]
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            max_cloud_cover: 20.0,
            aoi_wkt: "POLYGON ((101 0.5, 102 0.5, 102 1.5, 101 0.5))".to_string(),
        }
    }

    fn settings(output_dir: PathBuf) -> DownloadSettings {
        DownloadSettings {
            output_dir,
            concurrency: 1,
            on_failure: OnFailure::Continue,
        }
    }

    #[tokio::test]
    async fn test_second_candidate_only_scenario() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("downloads");
        let catalog = FixedCatalog(two_products());
        let selector = IndexList::new("2");

        let outcome = run_acquisition(
            &catalog,
            &StaticArchives,
            &selector,
            &criteria(),
            &settings(output_dir.clone()),
        )
        .await
        .unwrap();

        let outcomes = match outcome {
            AcquisitionOutcome::Downloaded(outcomes) => outcomes,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].product_name, two_products()[1].name);
        assert!(outcomes[0].result.is_ok());

        let expected = output_dir.join(format!("{}.zip", two_products()[1].name));
        assert!(expected.exists());
        assert!(output_dir.join(PLAN_FILE_NAME).exists());

        let archives = fs::read_dir(&output_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.path().extension().map(|ext| ext == "zip").unwrap_or(false)
            })
            .count();
        assert_eq!(archives, 1);
    }

    #[tokio::test]
    async fn test_no_products_short_circuits() {
        let dir = tempdir().unwrap();
        let catalog = FixedCatalog(vec![]);

        let outcome = run_acquisition(
            &catalog,
            &StaticArchives,
            &Untouchable,
            &criteria(),
            &settings(dir.path().join("downloads")),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, AcquisitionOutcome::NoProducts));
    }

    #[tokio::test]
    async fn test_empty_selection_downloads_nothing() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("downloads");
        let catalog = FixedCatalog(two_products());
        let selector = IndexList::new("abc, 17");

        let outcome = run_acquisition(
            &catalog,
            &StaticArchives,
            &selector,
            &criteria(),
            &settings(output_dir.clone()),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, AcquisitionOutcome::NothingSelected));
        assert!(!output_dir.exists());
    }
}
