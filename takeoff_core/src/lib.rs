//! # takeoff_core - Construction Quantity & Cost Engine
//!
//! `takeoff_core` turns a handful of planning parameters into material
//! quantities (concrete volume, steel weight) and a cost estimate, and keeps
//! per-project cost reports made of priced line items.
//!
//! ## Design Philosophy
//!
//! - **Stateless estimators**: pure functions from input to rounded output
//! - **JSON-First**: all inputs and outputs implement Serialize/Deserialize
//!   with the camelCase field names used on the wire
//! - **Rich Errors**: structured, bilingual error types, not just strings
//! - **Pluggable storage**: reports go through the [`store::ReportStore`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use takeoff_core::calculations::{estimate_concrete, ConcreteInput};
//!
//! let input = ConcreteInput {
//!     area: 100.0,
//!     floors: 1.0,
//!     foundation_depth: 1.0,
//!     wall_thickness: 0.2,
//!     slab_thickness: 0.15,
//! };
//! let breakdown = estimate_concrete(&input).unwrap();
//! assert_eq!(breakdown.total_volume, 146.08);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Concrete, steel, cost, block and rebar estimators
//! - [`validation`] - Geometry validator for raw request bodies
//! - [`report`] - Cost report creation and listing
//! - [`project`] - Canonical/legacy project references
//! - [`store`] - Report persistence (memory, JSON file)
//! - [`units`] - Type-safe unit wrappers and rounding
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod project;
pub mod report;
pub mod store;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult, ErrorKind};
pub use project::{Identity, ProjectKey, ProjectRef};
pub use report::{
    create_report, get_report, list_reports_for_engineer, list_reports_for_owner, list_reports_for_project,
    CostReport, CostReportItem, CreateReportRequest, NewCostReportItem, ReportSummary,
};
pub use store::{MemoryReportStore, ReportFilter, ReportStore};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileReportStore;
