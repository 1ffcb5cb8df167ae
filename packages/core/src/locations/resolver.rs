use std::collections::BTreeMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheStatus, Clock, TtlCache};
use crate::error::AppError;
use crate::hours::{
    apply_closure_alerts, build_weekly_schedule, collect_alerts, mark_next_business_day, HoursError,
    RawClosureAlert, ScheduleDay, WeekdayHours,
};
use crate::locations::branches::{Branch, BranchRules};
use crate::locations::providers::{
    BranchData, BranchDataProvider, ClosureFeedProvider, ReferenceDataProvider, UrlTableProvider,
};
use crate::locations::query::LocationQuery;
use crate::metrics::AppMetrics;
use crate::services::core_objects::SierraLocations;
use crate::services::refinery::{Address, RawDayHours};
use crate::services::url_table::UrlTable;

const REFERENCE_DATA: &str = "core_objects";
const URL_TABLE: &str = "url_table";
const BRANCH_DATA: &str = "refinery";
const RECAP_ALERTS: &str = "recap_alerts";

/// One entry of the lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRecord {
    /// The requested code when a URL rule matched it.
    pub code: Option<String>,
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Vec<ScheduleDay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Requested code to a one-element list of records.
pub type LocationsResponse = BTreeMap<String, Vec<LocationRecord>>;

#[derive(Clone)]
pub struct Providers {
    pub reference_data: Arc<dyn ReferenceDataProvider + Send + Sync>,
    pub url_table: Arc<dyn UrlTableProvider + Send + Sync>,
    pub branch_data: Arc<dyn BranchDataProvider + Send + Sync>,
    pub closure_feed: Arc<dyn ClosureFeedProvider + Send + Sync>,
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub cache_ttl: Duration,
    pub utc_offset: FixedOffset,
    pub rules: BranchRules,
}

/// Answers lookups by combining reference data, the URL table and branch
/// facilities data, the latter three behind TTL caches.
pub struct LocationResolver {
    providers: Providers,
    utc_offset: FixedOffset,
    rules: BranchRules,
    clock: Arc<dyn Clock>,
    metrics: Arc<AppMetrics>,
    reference_data: TtlCache<(), Arc<SierraLocations>>,
    url_table: TtlCache<(), Arc<UrlTable>>,
    branch_data: TtlCache<Branch, Arc<BranchData>>,
}

impl LocationResolver {
    pub fn new(
        providers: Providers,
        settings: ResolverSettings,
        clock: Arc<dyn Clock>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            providers,
            utc_offset: settings.utc_offset,
            rules: settings.rules,
            clock,
            metrics,
            reference_data: TtlCache::new(settings.cache_ttl),
            url_table: TtlCache::new(settings.cache_ttl),
            branch_data: TtlCache::new(settings.cache_ttl),
        }
    }

    /// "Now" in the service's local offset; every schedule is anchored here.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.utc_offset)
    }

    pub async fn resolve(&self, query: &LocationQuery) -> Result<LocationsResponse, AppError> {
        let labels = self.sierra_locations().await?;
        let url_table = self.url_table().await?;
        let today = self.local_now();

        let mut recap_closures: Option<Vec<RawClosureAlert>> = None;
        let mut response = LocationsResponse::new();

        for code in &query.codes {
            let url_rule = url_table.resolve(code);

            let mut record = LocationRecord {
                code: url_rule.map(|_| code.clone()),
                label: labels.get(code).and_then(|location| location.label.clone()),
                url: None,
                location: None,
                hours: None,
                error: None,
            };

            if query.fields.url {
                record.url = Some(url_rule.map(|rule| rule.url.clone()));
            }

            let branch_rule = match self.rules.resolve(code) {
                Some(rule) if query.fields.needs_branch_data() => rule,
                _ => {
                    response.insert(code.clone(), vec![record]);
                    continue;
                }
            };

            let data = self.branch_data(branch_rule.branch).await?;

            if query.fields.location {
                record.location = Some(data.address.clone());
            }

            if query.fields.hours {
                let mut raw_alerts = data.alerts.clone();
                if branch_rule.recap_closures {
                    if recap_closures.is_none() {
                        recap_closures = Some(self.recap_closures().await?);
                    }
                    raw_alerts.extend(recap_closures.iter().flatten().cloned());
                }

                match self.compute_hours(&data.regular_hours, &raw_alerts, today) {
                    Ok(hours) => record.hours = Some(hours),
                    Err(err) => {
                        warn!("Failed to compute hours for {}: {}", code, err);
                        record.error = Some(err.to_string());
                    }
                }
            }

            response.insert(code.clone(), vec![record]);
        }

        Ok(response)
    }

    /// Weekly schedule from regular hours, narrowed by the alerts. Alerts
    /// that fail validation are logged and dropped.
    pub fn compute_hours(
        &self,
        regular_hours: &[RawDayHours],
        raw_alerts: &[RawClosureAlert],
        today: DateTime<FixedOffset>,
    ) -> Result<Vec<ScheduleDay>, HoursError> {
        let weekly = regular_hours
            .iter()
            .map(weekday_hours)
            .collect::<Result<Vec<_>, _>>()?;
        let schedule = build_weekly_schedule(&weekly, today)?;

        let (alerts, rejected) = collect_alerts(raw_alerts);
        for err in &rejected {
            warn!("Dropping closure alert: {}", err);
            self.metrics.closure_alerts_dropped_total.inc();
        }

        let mut adjusted = apply_closure_alerts(&schedule, &alerts);
        mark_next_business_day(&mut adjusted);
        Ok(adjusted)
    }

    async fn sierra_locations(&self) -> Result<Arc<SierraLocations>, AppError> {
        let provider = Arc::clone(&self.providers.reference_data);
        self.cached(&self.reference_data, REFERENCE_DATA, (), move || async move {
            provider.fetch_sierra_locations().await
        })
        .await
    }

    async fn url_table(&self) -> Result<Arc<UrlTable>, AppError> {
        let provider = Arc::clone(&self.providers.url_table);
        self.cached(&self.url_table, URL_TABLE, (), move || async move {
            provider.fetch_url_table().await
        })
        .await
    }

    async fn branch_data(&self, branch: Branch) -> Result<Arc<BranchData>, AppError> {
        let provider = Arc::clone(&self.providers.branch_data);
        self.cached(&self.branch_data, BRANCH_DATA, branch, move || async move {
            provider.fetch_branch_data(branch).await
        })
        .await
    }

    async fn recap_closures(&self) -> Result<Vec<RawClosureAlert>, AppError> {
        let result = self.providers.closure_feed.fetch_closures(self.utc_offset).await;
        self.metrics.record_upstream(RECAP_ALERTS, result.is_ok());
        result
    }

    async fn cached<K, T, F, Fut>(
        &self,
        cache: &TtlCache<K, Arc<T>>,
        source: &str,
        key: K,
        fetch: F,
    ) -> Result<Arc<T>, AppError>
    where
        K: Eq + Hash + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let metrics = &self.metrics;
        let (value, status) = cache
            .get_or_fetch(key, self.clock.now(), move || async move {
                let result = fetch().await;
                metrics.record_upstream(source, result.is_ok());
                result.map(Arc::new)
            })
            .await?;

        if status == CacheStatus::Hit {
            debug!("Serving {} from cache", source);
            metrics.record_cache_hit(source);
        }
        Ok(value)
    }
}

/// A bad weekday label or a half-open window fails the whole schedule;
/// unreadable times only close that day.
fn weekday_hours(raw: &RawDayHours) -> Result<WeekdayHours, HoursError> {
    let day = raw.weekday()?;
    let (open, close) = raw.times().unwrap_or_else(|err| {
        warn!("Treating {} as closed: {}", raw.day, err);
        (None, None)
    });
    WeekdayHours::from_times(day, open, close)
}
