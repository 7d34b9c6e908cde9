//! Model read-back endpoints

use tracing::info;
use vepi_core::domain::export::{HierarchyMember, IntersectionTable, distinct_dimensions};
use vepi_core::dto::export::{HierarchyResponse, IntersectionsPage};

use crate::EtlClient;
use crate::error::{EtlError, Result};

/// Default number of intersections requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100_000;

impl EtlClient {
    // =============================================================================
    // Model Export
    // =============================================================================

    /// Export every intersection of the configured model
    ///
    /// Follows `metadata.nextPage` until it is absent. Each page's first row
    /// repeats the headers and is dropped; column names come from the last
    /// page fetched.
    ///
    /// # Arguments
    /// * `page_size` - Records requested per page
    pub async fn export_intersections(&self, page_size: usize) -> Result<IntersectionTable> {
        let model_id = self.config.require_model("export data")?;
        if page_size == 0 {
            return Err(EtlError::Validation("page_size must be greater than 0".to_string()));
        }

        let first_url = self.model_url(model_id, "intersections");
        let mut table = IntersectionTable::default();
        let mut page: IntersectionsPage = self
            .fetch(
                self.client.get(&first_url).query(&[("pageSize", page_size)]),
                "intersections page",
            )
            .await?;

        loop {
            let next = page.metadata.next_page.take().filter(|url| !url.is_empty());
            table.absorb(page);

            let Some(next_url) = next else {
                break;
            };

            info!("Fetching next page... ({} records so far)", table.len());
            page = self
                .fetch(self.client.get(&next_url), "intersections page")
                .await?;
        }

        info!("Total records fetched: {}", table.len());
        Ok(table)
    }

    /// Get the dimension hierarchies of the configured model
    pub async fn get_dimension_hierarchy(&self) -> Result<Vec<HierarchyMember>> {
        let model_id = self.config.require_model("get dimension hierarchies")?;
        let url = self.model_url(model_id, "hierarchy");

        let response: HierarchyResponse = self
            .fetch(self.client.get(&url), "dimension hierarchy")
            .await?;

        info!(
            "Retrieved {} dimension hierarchy members across dimensions: {}",
            response.data.len(),
            distinct_dimensions(&response.data).join(", ")
        );

        Ok(response.data)
    }
}
