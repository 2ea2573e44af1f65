//! Typed cell values for rows returned by the gateway.
//!
//! Rows keep their column order and serialize as JSON objects. NUMERIC
//! columns are decoded to their exact decimal text so `DECIMAL(5, 2)` prices
//! survive without float rounding.

use crate::error::ExecutionError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres_types::{FromSql, Type};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::error::Error;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
}

/// A result row: column name to value, in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.cells.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Convert a driver row, decoding each column by its Postgres type.
    /// Fails on column types without a lossless mapping.
    pub fn from_pg(row: &tokio_postgres::Row) -> Result<Self, ExecutionError> {
        let mut out = Row::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let raw: RawCell = row.try_get(idx)?;
            let value = decode_cell(column.type_(), raw.0).map_err(|e| {
                ExecutionError::new(format!("Cannot decode column {}: {}", column.name(), e))
            })?;
            out.push(column.name(), value);
        }
        Ok(out)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

type DecodeError = Box<dyn Error + Sync + Send>;

/// Undecoded wire bytes of one cell; `None` for SQL NULL.
struct RawCell<'a>(Option<&'a [u8]>);

impl<'a> FromSql<'a> for RawCell<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, DecodeError> {
        Ok(RawCell(Some(raw)))
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, DecodeError> {
        Ok(RawCell(None))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn decode_cell(ty: &Type, raw: Option<&[u8]>) -> Result<SqlValue, DecodeError> {
    let Some(raw) = raw else {
        return Ok(SqlValue::Null);
    };

    let value = match *ty {
        Type::BOOL => SqlValue::Bool(bool::from_sql(ty, raw)?),
        Type::INT2 => SqlValue::Int(i16::from_sql(ty, raw)?.into()),
        Type::INT4 => SqlValue::Int(i32::from_sql(ty, raw)?.into()),
        Type::INT8 => SqlValue::Int(i64::from_sql(ty, raw)?),
        Type::FLOAT4 => SqlValue::Float(f32::from_sql(ty, raw)?.into()),
        Type::FLOAT8 => SqlValue::Float(f64::from_sql(ty, raw)?),
        Type::NUMERIC => SqlValue::Decimal(PgNumeric::from_sql(ty, raw)?.0),
        Type::DATE => SqlValue::Date(NaiveDate::from_sql(ty, raw)?),
        Type::TIME => SqlValue::Time(NaiveTime::from_sql(ty, raw)?),
        Type::TIMESTAMP => SqlValue::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
        Type::TIMESTAMPTZ => SqlValue::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
        Type::JSON | Type::JSONB => SqlValue::Json(serde_json::Value::from_sql(ty, raw)?),
        _ if <String as FromSql>::accepts(ty) => SqlValue::Text(String::from_sql(ty, raw)?),
        _ => return Err(format!("unsupported column type {}", ty).into()),
    };

    Ok(value)
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Exact text rendering of a binary-format Postgres NUMERIC.
#[derive(Debug, Clone, PartialEq)]
pub struct PgNumeric(pub String);

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, DecodeError> {
        if raw.len() < 8 {
            return Err("numeric header truncated".into());
        }

        let read_u16 = |at: usize| u16::from_be_bytes([raw[at], raw[at + 1]]);
        let ndigits = read_u16(0) as usize;
        let weight = read_u16(2) as i16 as i32;
        let sign = read_u16(4);
        let dscale = read_u16(6) as usize;

        match sign {
            NUMERIC_NAN => return Ok(PgNumeric("NaN".to_string())),
            NUMERIC_PINF => return Ok(PgNumeric("Infinity".to_string())),
            NUMERIC_NINF => return Ok(PgNumeric("-Infinity".to_string())),
            _ => {}
        }
        if raw.len() < 8 + ndigits * 2 {
            return Err("numeric digits truncated".into());
        }

        // base-10000 digit groups; position i is worth 10000^(weight - i)
        let digits: Vec<u16> = (0..ndigits).map(|i| read_u16(8 + i * 2)).collect();
        let group = |i: i32| -> u16 {
            if i < 0 {
                0
            } else {
                digits.get(i as usize).copied().unwrap_or(0)
            }
        };

        let mut out = String::new();
        if sign == NUMERIC_NEG && digits.iter().any(|d| *d != 0) {
            out.push('-');
        }

        if weight < 0 {
            out.push('0');
        } else {
            for i in 0..=weight {
                if i == 0 {
                    write!(out, "{}", group(i))?;
                } else {
                    write!(out, "{:04}", group(i))?;
                }
            }
        }

        if dscale > 0 {
            let mut frac = String::new();
            let mut i = weight + 1;
            while frac.len() < dscale {
                write!(frac, "{:04}", group(i))?;
                i += 1;
            }
            frac.truncate(dscale);
            out.push('.');
            out.push_str(&frac);
        }

        Ok(PgNumeric(out))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}
