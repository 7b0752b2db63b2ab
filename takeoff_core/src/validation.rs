//! # Geometry Validation
//!
//! The gate every calculation request passes before an estimator runs.
//!
//! Each [`CalculationKind`] declares the numeric fields it needs and a
//! [`Rule`] for each one. [`validate`] checks a raw JSON object against that
//! declaration and returns normalized [`Measurements`], or the first
//! [`CalcError`] encountered.
//!
//! ## Normalization
//!
//! - JSON numbers are taken as-is
//! - JSON strings holding a decimal number (form posts) are trimmed and parsed
//! - `null` and absent keys are both "missing"
//! - NaN and infinities are non-numeric
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::validation::{validate, CalculationKind};
//! use serde_json::json;
//!
//! let raw = json!({ "length": 2, "width": "1.5", "height": 0.2 });
//! let m = validate(CalculationKind::Block, &raw).unwrap();
//! assert_eq!(m.required("width").unwrap(), 1.5);
//!
//! let bad = json!({ "length": 2, "width": 0, "height": 0.2 });
//! assert!(validate(CalculationKind::Block, &bad).is_err());
//! ```

use serde_json::Value;

use crate::errors::{CalcError, CalcResult};

/// How a single field is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Required, strictly greater than zero
    Positive,
    /// Required, at least 1 (floor counts)
    Count,
    /// May be absent; strictly greater than zero when present
    OptionalPositive,
}

/// A named field and the rule it must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
}

const fn field(name: &'static str, rule: Rule) -> FieldSpec {
    FieldSpec { name, rule }
}

const CONCRETE_FIELDS: &[FieldSpec] = &[
    field("projectArea", Rule::Positive),
    field("floors", Rule::Count),
    field("foundationDepth", Rule::Positive),
    field("wallThickness", Rule::Positive),
    field("slabThickness", Rule::Positive),
];

const STEEL_FIELDS: &[FieldSpec] = &[
    field("concreteVolume", Rule::Positive),
    field("steelRatio", Rule::OptionalPositive),
];

const COST_FIELDS: &[FieldSpec] = &[
    field("concreteVolume", Rule::Positive),
    field("steelWeight", Rule::Positive),
    field("concretePricePerCubicMeter", Rule::Positive),
    field("steelPricePerKg", Rule::Positive),
];

const BLOCK_FIELDS: &[FieldSpec] = &[
    field("length", Rule::Positive),
    field("width", Rule::Positive),
    field("height", Rule::Positive),
];

const REBAR_FIELDS: &[FieldSpec] = &[
    field("length", Rule::Positive),
    field("width", Rule::Positive),
    field("height", Rule::Positive),
    field("density", Rule::OptionalPositive),
    field("percentage", Rule::OptionalPositive),
];

const BUILDING_FIELDS: &[FieldSpec] = &[
    field("projectArea", Rule::Positive),
    field("floors", Rule::Count),
    field("foundationDepth", Rule::Positive),
    field("wallThickness", Rule::Positive),
    field("slabThickness", Rule::Positive),
    field("steelRatio", Rule::OptionalPositive),
    field("concretePricePerCubicMeter", Rule::Positive),
    field("steelPricePerKg", Rule::Positive),
];

/// The calculation request shapes the validator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationKind {
    /// Whole-building concrete breakdown
    Concrete,
    /// Steel breakdown from a concrete volume
    Steel,
    /// Cost breakdown from quantities and unit prices
    Cost,
    /// Single block volume with truck count
    Block,
    /// Rebar weight from raw dimensions
    Rebar,
    /// Concrete, steel and cost in one request
    Building,
}

impl CalculationKind {
    /// Fields this kind reads, in the order they are checked.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            CalculationKind::Concrete => CONCRETE_FIELDS,
            CalculationKind::Steel => STEEL_FIELDS,
            CalculationKind::Cost => COST_FIELDS,
            CalculationKind::Block => BLOCK_FIELDS,
            CalculationKind::Rebar => REBAR_FIELDS,
            CalculationKind::Building => BUILDING_FIELDS,
        }
    }
}

/// Validated, normalized field values for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    values: Vec<(&'static str, Option<f64>)>,
}

impl Measurements {
    /// Value of a required field.
    pub fn required(&self, name: &str) -> CalcResult<f64> {
        self.optional(name).ok_or_else(|| CalcError::missing_field(name))
    }

    /// Value of an optional field, `None` when the caller omitted it.
    pub fn optional(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| *v)
    }
}

/// Validate a raw request body for the given calculation kind.
///
/// Fields are checked in declaration order and the first failure is returned.
/// Keys not declared by the kind are ignored.
pub fn validate(kind: CalculationKind, raw: &Value) -> CalcResult<Measurements> {
    let object = raw
        .as_object()
        .ok_or_else(|| CalcError::invalid_input("body", raw.to_string(), "request body must be a JSON object"))?;

    let mut values = Vec::with_capacity(kind.fields().len());
    for spec in kind.fields() {
        let parsed = numeric(spec.name, object.get(spec.name))?;
        let checked = match (spec.rule, parsed) {
            (Rule::OptionalPositive, None) => None,
            (Rule::OptionalPositive | Rule::Positive, Some(v)) => Some(require_positive(spec.name, v)?),
            (Rule::Count, Some(v)) => Some(require_count(spec.name, v)?),
            (Rule::Positive | Rule::Count, None) => return Err(CalcError::missing_field(spec.name)),
        };
        values.push((spec.name, checked));
    }

    Ok(Measurements { values })
}

/// Interpret a JSON value as a number.
///
/// Returns `Ok(None)` for absent or `null` values.
pub fn numeric(name: &str, value: Option<&Value>) -> CalcResult<Option<f64>> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(CalcError::invalid_input(
            name,
            value.map(Value::to_string).unwrap_or_default(),
            "must be a number",
        )),
    }
}

/// Check that a dimension is strictly positive.
pub fn require_positive(name: &str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(name, value.to_string(), "must be a number"));
    }
    if value <= 0.0 {
        return Err(CalcError::invalid_input(name, value.to_string(), "must be greater than zero"));
    }
    Ok(value)
}

/// Check that a count is at least one.
pub fn require_count(name: &str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(name, value.to_string(), "must be a number"));
    }
    if value < 1.0 {
        return Err(CalcError::invalid_input(name, value.to_string(), "must be at least 1"));
    }
    Ok(value)
}
