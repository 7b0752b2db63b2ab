//! # Cost Reports
//!
//! A cost report is an ordered list of priced line items filed under one
//! project by an engineer. Reports are written once and never updated.
//!
//! ## Totals
//!
//! Callers may send `totalCost` on items and on the report itself. Both are
//! ignored: every item total is recomputed as `quantity × pricePerUnit` and the
//! report total is the sum of the recomputed item totals.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::project::ProjectRef;
//! use takeoff_core::report::{create_report, CreateReportRequest, NewCostReportItem};
//! use takeoff_core::store::MemoryReportStore;
//!
//! let store = MemoryReportStore::new();
//! let request = CreateReportRequest::new(ProjectRef::canonical("p-1"), "eng-7")
//!     .with_item(NewCostReportItem::new("c1", "Ready-mix C30", 146.08, "m³", 500.0))
//!     .with_item(NewCostReportItem::new("s1", "Rebar B500", 11686.4, "kg", 5.0));
//!
//! let report = create_report(&store, request).unwrap();
//! assert_eq!(report.total_cost, 131472.0);
//! ```

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::project::{Identity, ProjectRef};
use crate::store::{ReportFilter, ReportStore};

/// A priced line item as stored on a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostReportItem {
    /// Unique within its report
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
    /// Always `quantity × price_per_unit`
    pub total_cost: f64,
}

/// A line item as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCostReportItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    pub price_per_unit: f64,
    /// Ignored; recomputed on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl NewCostReportItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        price_per_unit: f64,
    ) -> Self {
        NewCostReportItem {
            id: id.into(),
            name: name.into(),
            quantity,
            unit: unit.into(),
            price_per_unit,
            total_cost: None,
        }
    }

    fn priced(self, index: usize) -> CalcResult<CostReportItem> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(CalcError::missing_field(format!("items[{}].id", index)));
        }
        check_amount(index, "quantity", self.quantity)?;
        check_amount(index, "pricePerUnit", self.price_per_unit)?;

        Ok(CostReportItem {
            id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            price_per_unit: self.price_per_unit,
            total_cost: self.quantity * self.price_per_unit,
        })
    }
}

fn check_amount(index: usize, field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(
            format!("items[{}].{}", index, field),
            value.to_string(),
            "must be a non-negative number",
        ));
    }
    Ok(())
}

/// Body of a create-report request.
///
/// ## JSON Example
///
/// ```json
/// {
///   "projectId": "p-1",
///   "reportName": "Shell & core",
///   "engineerId": "eng-7",
///   "engineerName": "Sara",
///   "ownerId": "own-3",
///   "items": [
///     { "id": "c1", "name": "Concrete", "quantity": 146.08, "unit": "m³", "pricePerUnit": 500 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[serde(flatten)]
    pub project: ProjectRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,

    #[serde(default)]
    pub engineer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineer_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(default)]
    pub items: Vec<NewCostReportItem>,

    /// Ignored; recomputed on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl CreateReportRequest {
    pub fn new(project: ProjectRef, engineer_id: impl Into<String>) -> Self {
        CreateReportRequest {
            project,
            report_name: None,
            engineer_id: engineer_id.into(),
            engineer_name: None,
            owner_id: None,
            owner_name: None,
            items: Vec::new(),
            total_cost: None,
        }
    }

    pub fn with_item(mut self, item: NewCostReportItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    pub fn with_engineer(mut self, engineer: Identity) -> Self {
        self.engineer_id = engineer.id;
        self.engineer_name = engineer.name;
        self
    }

    pub fn with_owner(mut self, owner: Identity) -> Self {
        self.owner_id = Some(owner.id);
        self.owner_name = owner.name;
        self
    }

    /// Parse a raw JSON body. Shape errors become validation errors.
    pub fn from_json(raw: Value) -> CalcResult<Self> {
        serde_json::from_value(raw).map_err(|e| CalcError::invalid_input("body", "", e.to_string()))
    }
}

/// A stored cost report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,

    #[serde(flatten)]
    pub project: ProjectRef,

    pub engineer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineer_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    pub items: Vec<CostReportItem>,

    /// Always the sum of `items[].total_cost`
    pub total_cost: f64,

    pub created_at: DateTime<Utc>,
}

impl CostReport {
    /// Check whether this report is filed under any identifier of `reference`.
    pub fn belongs_to(&self, reference: &ProjectRef) -> bool {
        let own = self.project.identifiers();
        reference.identifiers().iter().any(|id| own.contains(id))
    }

    pub fn engineer(&self) -> Identity {
        Identity {
            id: self.engineer_id.clone(),
            name: self.engineer_name.clone(),
        }
    }

    pub fn owner(&self) -> Option<Identity> {
        self.owner_id.as_ref().map(|id| Identity {
            id: id.clone(),
            name: self.owner_name.clone(),
        })
    }

    /// Recompute the grand total from the items.
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|item| item.total_cost).sum()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut quantity_by_unit = BTreeMap::new();
        for item in &self.items {
            *quantity_by_unit.entry(item.unit.clone()).or_insert(0.0) += item.quantity;
        }
        ReportSummary {
            item_count: self.items.len(),
            quantity_by_unit,
            total_cost: self.total_cost,
        }
    }
}

/// Condensed view of a report for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub item_count: usize,
    /// Summed quantity per unit label
    pub quantity_by_unit: BTreeMap<String, f64>,
    pub total_cost: f64,
}

/// Validate a request and assemble the report without storing it.
///
/// Fails on a missing project reference, a missing engineer id, an empty item
/// list, a blank or duplicate item id, or a negative quantity or price.
pub fn build_report(request: CreateReportRequest, created_at: DateTime<Utc>) -> CalcResult<CostReport> {
    let project = request.project.normalized()?;

    let engineer_id = request.engineer_id.trim().to_string();
    if engineer_id.is_empty() {
        return Err(CalcError::missing_field("engineerId"));
    }

    if request.items.is_empty() {
        return Err(CalcError::invalid_input("items", "[]", "at least one item is required"));
    }

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(request.items.len());
    for (index, item) in request.items.into_iter().enumerate() {
        let item = item.priced(index)?;
        if !seen.insert(item.id.clone()) {
            return Err(CalcError::duplicate_item_id(item.id));
        }
        items.push(item);
    }

    let total_cost = items.iter().map(|item| item.total_cost).sum();

    Ok(CostReport {
        id: Uuid::new_v4(),
        report_name: request.report_name.filter(|n| !n.trim().is_empty()),
        project,
        engineer_id,
        engineer_name: request.engineer_name,
        owner_id: request.owner_id.filter(|o| !o.trim().is_empty()),
        owner_name: request.owner_name,
        items,
        total_cost,
        created_at,
    })
}

/// Validate, total and store a new report in one write.
pub fn create_report(store: &dyn ReportStore, request: CreateReportRequest) -> CalcResult<CostReport> {
    if let Some(claimed) = request.total_cost {
        debug!(claimed, "ignoring caller-supplied report total");
    }

    let report = build_report(request, Utc::now())?;
    store.insert(&report)?;

    let project = report.project.key().map(|k| k.as_str().to_string()).unwrap_or_default();
    info!(
        report_id = %report.id,
        project = %project,
        items = report.items.len(),
        total_cost = report.total_cost,
        "cost report created"
    );
    Ok(report)
}

/// Reports filed under either identifier of `reference`, newest first.
pub fn list_reports_for_project(store: &dyn ReportStore, reference: &ProjectRef) -> CalcResult<Vec<CostReport>> {
    let identifiers: Vec<String> = reference.identifiers().into_iter().map(str::to_string).collect();
    if identifiers.is_empty() {
        return Err(CalcError::MissingProjectReference);
    }
    store.query(&ReportFilter::Project(identifiers))
}

/// Reports written by an engineer, newest first.
pub fn list_reports_for_engineer(store: &dyn ReportStore, engineer_id: &str) -> CalcResult<Vec<CostReport>> {
    let engineer_id = engineer_id.trim();
    if engineer_id.is_empty() {
        return Err(CalcError::missing_field("engineerId"));
    }
    store.query(&ReportFilter::Engineer(engineer_id.to_string()))
}

/// Reports visible to an owner, newest first.
pub fn list_reports_for_owner(store: &dyn ReportStore, owner_id: &str) -> CalcResult<Vec<CostReport>> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(CalcError::missing_field("ownerId"));
    }
    store.query(&ReportFilter::Owner(owner_id.to_string()))
}

/// Fetch one report by id.
pub fn get_report(store: &dyn ReportStore, id: &Uuid) -> CalcResult<CostReport> {
    store
        .query(&ReportFilter::Id(*id))?
        .into_iter()
        .next()
        .ok_or_else(|| CalcError::report_not_found(id.to_string()))
}
