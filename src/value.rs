//! Typed cell values and the parsing rules shared by validation and commit.

use chrono::NaiveDate;
use serde::Serialize;

use crate::schema::FieldType;

/// Date formats accepted for `date` fields, tried in order.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%d-%B-%Y", "%m/%d/%Y", "%Y/%m/%d"];

/// Format dates are stored in
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source tokens read as null
pub const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NULL", "null", "NaN", "nan"];

/// A typed value, as committed to and read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Converts a raw cell to a value of the declared type.
    ///
    /// Returns `None` if a non-null cell does not parse as `ty`.
    pub fn parse(raw: Option<&str>, ty: FieldType) -> Option<Value> {
        let Some(raw) = raw else {
            return Some(Value::Null);
        };

        match ty {
            FieldType::Integer => parse_integer(raw).map(Value::Integer),
            FieldType::Decimal => parse_decimal(raw).map(Value::Decimal),
            FieldType::Date => parse_date(raw).map(Value::Date),
            FieldType::Text => Some(Value::Text(raw.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The semantic type of this value, `None` for null
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(FieldType::Integer),
            Value::Decimal(_) => Some(FieldType::Decimal),
            Value::Text(_) => Some(FieldType::Text),
            Value::Date(_) => Some(FieldType::Date),
        }
    }

    /// Canonical text form, used to compare values across sources
    pub fn canonical(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format(STORED_DATE_FORMAT).to_string(),
        }
    }
}

pub fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw)
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|d| d.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Narrowest type a single non-null cell fits.
pub fn infer_type(raw: &str) -> FieldType {
    if parse_integer(raw).is_some() {
        FieldType::Integer
    } else if parse_decimal(raw).is_some() {
        FieldType::Decimal
    } else if parse_date(raw).is_some() {
        FieldType::Date
    } else {
        FieldType::Text
    }
}

/// Narrowest type two cells of one column both fit.
fn widen(a: FieldType, b: FieldType) -> FieldType {
    use FieldType::*;
    match (a, b) {
        _ if a == b => a,
        (Integer, Decimal) | (Decimal, Integer) => Decimal,
        _ => Text,
    }
}

/// Observed type of a column.
///
/// If every non-null cell parses as `declared`, the observed type is
/// `declared`; otherwise it is the narrowest type all non-null cells fit.
/// A column without non-null cells has no observed type.
pub fn observed_type<'a>(
    cells: impl IntoIterator<Item = &'a str>,
    declared: Option<FieldType>,
) -> Option<FieldType> {
    let cells: Vec<&str> = cells.into_iter().collect();
    if cells.is_empty() {
        return None;
    }

    if let Some(ty) = declared {
        if cells.iter().all(|raw| Value::parse(Some(*raw), ty).is_some()) {
            return Some(ty);
        }
    }

    cells.into_iter().map(infer_type).reduce(widen)
}

/// Canonical form of a raw cell under a declared type. Cells that do not
/// parse keep their raw text.
pub fn canonical_key(raw: Option<&str>, ty: FieldType) -> String {
    match Value::parse(raw, ty) {
        Some(value) => value.canonical(),
        None => raw.unwrap_or_default().to_string(),
    }
}
