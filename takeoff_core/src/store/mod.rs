//! # Report Stores
//!
//! Persistence for [`CostReport`] documents. A store supports two things:
//! inserting one whole report (items embedded) and querying reports by a
//! [`ReportFilter`], newest first.
//!
//! - [`MemoryReportStore`] - process-local, for tests and ephemeral servers
//! - [`FileReportStore`] - a single JSON file with atomic saves and locking

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

use uuid::Uuid;

use crate::errors::CalcResult;
use crate::report::CostReport;

pub use memory::MemoryReportStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileReportStore;

/// Which reports a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
    /// Filed under any of these identifiers, canonical or legacy
    Project(Vec<String>),
    /// Written by this engineer
    Engineer(String),
    /// Visible to this owner
    Owner(String),
    /// Exactly this report
    Id(Uuid),
}

impl ReportFilter {
    pub fn matches(&self, report: &CostReport) -> bool {
        match self {
            ReportFilter::Project(ids) => {
                let own = report.project.identifiers();
                ids.iter().any(|id| own.contains(&id.as_str()))
            }
            ReportFilter::Engineer(id) => report.engineer_id == *id,
            ReportFilter::Owner(id) => report.owner_id.as_deref() == Some(id.as_str()),
            ReportFilter::Id(id) => report.id == *id,
        }
    }
}

/// Storage backend for cost reports.
///
/// Implementations must write a report as one unit: after `insert` returns
/// `Ok`, queries see the whole report; after it returns `Err`, they see none
/// of it.
pub trait ReportStore: Send + Sync {
    /// Store a new report.
    fn insert(&self, report: &CostReport) -> CalcResult<()>;

    /// Reports matching `filter`, sorted by creation time descending.
    fn query(&self, filter: &ReportFilter) -> CalcResult<Vec<CostReport>>;
}

/// Filter reports (given in insertion order) and sort them newest first.
///
/// Reports created at the same instant come out most recently inserted first.
pub(crate) fn select_newest_first<'a>(
    reports: impl DoubleEndedIterator<Item = &'a CostReport>,
    filter: &ReportFilter,
) -> Vec<CostReport> {
    let mut selected: Vec<CostReport> = reports
        .rev()
        .filter(|report| filter.matches(report))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectRef;
    use crate::report::{build_report, CreateReportRequest, NewCostReportItem};
    use chrono::{Duration, Utc};

    fn report(project: ProjectRef, minutes_ago: i64) -> CostReport {
        let request = CreateReportRequest::new(project, "eng-1")
            .with_item(NewCostReportItem::new("a", "A", 1.0, "ea", 1.0));
        build_report(request, Utc::now() - Duration::minutes(minutes_ago)).unwrap()
    }

    #[test]
    fn test_project_filter_matches_both_forms() {
        let filter = ReportFilter::Project(vec!["p-1".to_string()]);
        assert!(filter.matches(&report(ProjectRef::canonical("p-1"), 0)));
        assert!(filter.matches(&report(ProjectRef::legacy("p-1"), 0)));
        assert!(!filter.matches(&report(ProjectRef::canonical("p-2"), 0)));
    }

    #[test]
    fn test_select_newest_first() {
        let a = report(ProjectRef::canonical("p"), 30);
        let b = report(ProjectRef::canonical("p"), 10);
        let c = report(ProjectRef::canonical("p"), 20);
        let all = vec![a.clone(), b.clone(), c.clone()];

        let selected = select_newest_first(all.iter(), &ReportFilter::Project(vec!["p".to_string()]));
        let ids: Vec<_> = selected.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[test]
    fn test_same_instant_most_recent_insert_first() {
        let first = report(ProjectRef::canonical("p"), 0);
        let mut second = report(ProjectRef::canonical("p"), 0);
        second.created_at = first.created_at;

        let all = vec![first.clone(), second.clone()];
        let selected = select_newest_first(all.iter(), &ReportFilter::Engineer("eng-1".to_string()));
        assert_eq!(selected[0].id, second.id);
        assert_eq!(selected[1].id, first.id);
    }
}
