//! The write path: fetch → classify → aggregate → persist.

use crate::domain::{
    board::BoardConfig,
    classifier::Classifier,
    issue::RawIssue,
    rules::{compile, StateIndex},
    snapshot::Snapshot,
    ticket::Ticket,
    ticket_map::TicketMap,
};
use crate::error::{FlightboardError, Result};
use crate::storage::SnapshotStore;
use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Source of raw issues, typically a tracker REST client
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetches every issue of `project` whose status is one of `statuses`
    async fn get_by_status(&self, project: &str, statuses: &[String]) -> anyhow::Result<Vec<RawIssue>>;
}

/// Outcome of one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Statuses the issue source was queried with
    pub statuses: Vec<String>,
    pub fetched: usize,
    pub included: usize,
    /// Classified, but rejected by their field's inclusion rules
    pub excluded: usize,
    /// Could not be classified at all
    pub skipped: usize,
}

/// Statuses to query: the configured base list, then the names of the current
/// and the next calendar month (boards may use month names as statuses for
/// "due this month" style lanes).
pub fn query_statuses(base: &[String], today: NaiveDate) -> Vec<String> {
    let mut statuses = base.to_vec();
    statuses.push(today.format("%B").to_string());
    statuses.push(one_month_later(today).format("%B").to_string());
    statuses
}

/// Same day number one month on, overflowing into the following month when
/// that day does not exist (Jan 31 → Mar 3 in a non-leap year).
fn one_month_later(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.checked_add_signed(Duration::days(i64::from(date.day0()))))
        .unwrap_or(date)
}

/// Classifies raw issues and orders the included ones for display
pub fn build_ticket_list(
    config: &BoardConfig,
    index: &StateIndex,
    raw_issues: &[RawIssue],
    today: NaiveDate,
) -> (Vec<Ticket>, SyncReport) {
    let classifier = Classifier::new(config, index, today);
    let mut map = TicketMap::new(config);
    let mut report = SyncReport {
        fetched: raw_issues.len(),
        ..SyncReport::default()
    };

    for raw in raw_issues {
        match classifier.classify(raw) {
            Ok(ticket) => {
                if map.add_ticket(ticket) {
                    report.included += 1;
                } else {
                    report.excluded += 1;
                }
            }
            Err(reason) => {
                debug!(key = %raw.key, status = %raw.status, %reason, "skipping issue");
                report.skipped += 1;
            }
        }
    }

    (map.into_list(), report)
}

/// Drives a sync run and persists its result.
///
/// Runs through one orchestrator are serialized; readers never wait on them.
pub struct SyncOrchestrator {
    config: BoardConfig,
    source: Arc<dyn IssueSource>,
    store: Arc<dyn SnapshotStore>,
    lock: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        config: BoardConfig,
        source: Arc<dyn IssueSource>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            store,
            lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Syncs for the process's local date
    pub async fn sync(&self) -> Result<SyncReport> {
        self.sync_on(Local::now().date_naive()).await
    }

    /// Syncs as of `today`.
    ///
    /// A failing fetch aborts the run before storage is touched, leaving the
    /// previous snapshot in place.
    pub async fn sync_on(&self, today: NaiveDate) -> Result<SyncReport> {
        let _guard = self.lock.lock().await;

        let epics = &self.config.epics;
        let index = compile(&epics.fields, &epics.delayed);

        let statuses = query_statuses(&epics.status, today);
        info!(project = %epics.project, ?statuses, "fetching issues");

        let raw_issues = self
            .source
            .get_by_status(&epics.project, &statuses)
            .await
            .map_err(|err| {
                warn!(project = %epics.project, error = %format!("{:#}", err), "fetch failed, keeping previous snapshot");
                FlightboardError::FetchError(format!("{:#}", err))
            })?;

        let (tickets, mut report) = build_ticket_list(&self.config, &index, &raw_issues, today);
        report.statuses = statuses;

        let snapshot = Snapshot::new(tickets);
        self.store.put(&snapshot.to_blob()?).await?;

        info!(
            fetched = report.fetched,
            included = report.included,
            excluded = report.excluded,
            skipped = report.skipped,
            "snapshot replaced"
        );
        Ok(report)
    }
}
