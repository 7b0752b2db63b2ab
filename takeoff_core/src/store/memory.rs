//! In-process report store.

use std::sync::Mutex;

use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::report::CostReport;

use super::{select_newest_first, ReportFilter, ReportStore};

/// Reports kept in a mutex-guarded vector, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<CostReport>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(operation: &str) -> CalcError {
    CalcError::store_error(operation, "memory", "store mutex poisoned")
}

impl ReportStore for MemoryReportStore {
    fn insert(&self, report: &CostReport) -> CalcResult<()> {
        let mut reports = self.reports.lock().map_err(|_| poisoned("insert"))?;
        reports.push(report.clone());
        debug!(report_id = %report.id, stored = reports.len(), "report inserted");
        Ok(())
    }

    fn query(&self, filter: &ReportFilter) -> CalcResult<Vec<CostReport>> {
        let reports = self.reports.lock().map_err(|_| poisoned("query"))?;
        let selected = select_newest_first(reports.iter(), filter);
        debug!(?filter, matched = selected.len(), "reports queried");
        Ok(selected)
    }
}
