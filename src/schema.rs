//! Feature record schemas and request coercion
//!
//! Each prediction task carries a fixed, ordered field table. An incoming
//! JSON object is coerced into exactly one numeric row: absent fields take
//! their declared default, unrecognized fields are ignored, and only the
//! fields flagged non-negative are range-checked. Field declaration order
//! is the order the trained model expects its columns in.

use serde_json::{Map, Value};

use crate::config::PredictionTask;
use crate::error::{PredecirError, Result};

/// Declared numeric type of a feature field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer-valued field. Accepts JSON integers and integral floats.
    Int,
    /// Float-valued field. Accepts any JSON number.
    Float,
}

/// Declaration of a single feature field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name as it appears in the request body
    pub name: &'static str,
    /// Declared numeric type
    pub kind: FieldKind,
    /// Value substituted when the field is absent
    pub default: f64,
    /// Whether the value must be >= 0
    pub non_negative: bool,
}

impl FieldSpec {
    const fn int(name: &'static str, default: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Int,
            default,
            non_negative: false,
        }
    }

    const fn float(name: &'static str, default: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Float,
            default,
            non_negative: false,
        }
    }

    const fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }
}

/// Credit-default schema: 23 fields in model column order.
///
/// Defaults mirror the deployed service's documented example record.
/// `PAY_1` is absent by design; the upstream dataset names the first
/// repayment-status column `PAY_0`.
pub const CREDIT_DEFAULT_FIELDS: [FieldSpec; 23] = [
    FieldSpec::float("LIMIT_BAL", 80000.0).non_negative(),
    FieldSpec::int("SEX", 2.0),
    FieldSpec::int("EDUCATION", 2.0),
    FieldSpec::int("MARRIAGE", 1.0),
    FieldSpec::int("AGE", 34.0),
    FieldSpec::int("PAY_0", 0.0),
    FieldSpec::int("PAY_2", 0.0),
    FieldSpec::int("PAY_3", 0.0),
    FieldSpec::int("PAY_4", 0.0),
    FieldSpec::int("PAY_5", -1.0),
    FieldSpec::int("PAY_6", -1.0),
    FieldSpec::float("BILL_AMT1", 55933.0),
    FieldSpec::float("BILL_AMT2", 11865.0),
    FieldSpec::float("BILL_AMT3", 4602.0),
    FieldSpec::float("BILL_AMT4", 34197.0),
    FieldSpec::float("BILL_AMT5", 27398.0),
    FieldSpec::float("BILL_AMT6", 28646.0),
    FieldSpec::float("PAY_AMT1", 4000.0),
    FieldSpec::float("PAY_AMT2", 2333.0),
    FieldSpec::float("PAY_AMT3", 3032.0),
    FieldSpec::float("PAY_AMT4", 28298.0),
    FieldSpec::float("PAY_AMT5", 2000.0),
    FieldSpec::float("PAY_AMT6", 2000.0),
];

/// Diabetes schema: 8 fields in model column order (Pima dataset layout).
pub const DIABETES_FIELDS: [FieldSpec; 8] = [
    FieldSpec::int("Pregnancies", 3.0).non_negative(),
    FieldSpec::int("Glucose", 117.0),
    FieldSpec::int("BloodPressure", 72.0),
    FieldSpec::int("SkinThickness", 23.0),
    FieldSpec::int("Insulin", 30.0),
    FieldSpec::float("BMI", 32.0),
    FieldSpec::float("DiabetesPedigreeFunction", 0.3725),
    FieldSpec::int("Age", 29.0),
];

/// Field table for a prediction task
#[must_use]
pub fn fields_for(task: PredictionTask) -> &'static [FieldSpec] {
    match task {
        PredictionTask::DefaultPayment => &CREDIT_DEFAULT_FIELDS,
        PredictionTask::HasDiabetes => &DIABETES_FIELDS,
    }
}

/// Coerce a JSON request body into one ordered feature row
///
/// The body must be a JSON object. Fields are processed in declaration
/// order; anything not in the table is ignored.
///
/// # Errors
///
/// Returns `Validation` naming the first field that fails type coercion
/// or a non-negativity constraint. The body itself failing to be an
/// object is reported under the pseudo-field `body`.
pub fn coerce_row(fields: &[FieldSpec], body: &Value) -> Result<Vec<f64>> {
    let map = body
        .as_object()
        .ok_or_else(|| PredecirError::validation("body", "request body must be a JSON object"))?;

    let mut row = Vec::with_capacity(fields.len());
    for spec in fields {
        row.push(coerce_field(spec, map)?);
    }
    Ok(row)
}

fn coerce_field(spec: &FieldSpec, map: &Map<String, Value>) -> Result<f64> {
    let value = match map.get(spec.name) {
        None => spec.default,
        Some(value) => coerce_number(spec, value)?,
    };

    if spec.non_negative && value < 0.0 {
        return Err(PredecirError::validation(
            spec.name,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(value)
}

fn coerce_number(spec: &FieldSpec, value: &Value) -> Result<f64> {
    let number = value.as_f64().ok_or_else(|| {
        PredecirError::validation(
            spec.name,
            format!("expected a number, got {}", type_name(value)),
        )
    })?;

    if spec.kind == FieldKind::Int && number.fract() != 0.0 {
        return Err(PredecirError::validation(
            spec.name,
            format!("expected an integer, got {number}"),
        ));
    }
    Ok(number)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
