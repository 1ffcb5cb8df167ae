//! Upstream data seams of the resolver.
//!
//! Each trait is implemented by the matching HTTP client in
//! [`crate::services`]; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::FixedOffset;

use crate::error::AppError;
use crate::hours::RawClosureAlert;
use crate::locations::branches::Branch;
use crate::services::core_objects::{CoreObjectsClient, SierraLocations};
use crate::services::recap_alerts::RecapAlertsClient;
use crate::services::refinery::{Address, RawDayHours, RefineryClient};
use crate::services::url_table::{UrlTable, UrlTableClient};

/// Address, weekly hours and current closure alerts of one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchData {
    pub address: Address,
    pub regular_hours: Vec<RawDayHours>,
    pub alerts: Vec<RawClosureAlert>,
}

#[async_trait]
pub trait ReferenceDataProvider {
    async fn fetch_sierra_locations(&self) -> Result<SierraLocations, AppError>;
}

#[async_trait]
pub trait UrlTableProvider {
    async fn fetch_url_table(&self) -> Result<UrlTable, AppError>;
}

#[async_trait]
pub trait BranchDataProvider {
    async fn fetch_branch_data(&self, branch: Branch) -> Result<BranchData, AppError>;
}

#[async_trait]
pub trait ClosureFeedProvider {
    async fn fetch_closures(&self, offset: FixedOffset) -> Result<Vec<RawClosureAlert>, AppError>;
}

#[async_trait]
impl ReferenceDataProvider for CoreObjectsClient {
    async fn fetch_sierra_locations(&self) -> Result<SierraLocations, AppError> {
        CoreObjectsClient::fetch_sierra_locations(self).await
    }
}

#[async_trait]
impl UrlTableProvider for UrlTableClient {
    async fn fetch_url_table(&self) -> Result<UrlTable, AppError> {
        UrlTableClient::fetch_url_table(self).await
    }
}

#[async_trait]
impl BranchDataProvider for RefineryClient {
    async fn fetch_branch_data(&self, branch: Branch) -> Result<BranchData, AppError> {
        let location = self.fetch_location(branch.slug()).await?;
        Ok(BranchData {
            address: location.address(),
            alerts: location.closure_alerts(),
            regular_hours: location.weekly_hours(),
        })
    }
}

#[async_trait]
impl ClosureFeedProvider for RecapAlertsClient {
    async fn fetch_closures(&self, offset: FixedOffset) -> Result<Vec<RawClosureAlert>, AppError> {
        RecapAlertsClient::fetch_closures(self, offset).await
    }
}
