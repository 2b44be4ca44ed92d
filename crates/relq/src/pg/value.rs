//! Conversions between [`Value`] and the PostgreSQL binary protocol.

use crate::error::DriverError;
use crate::value::{Record, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_datetime(s: &str) -> Result<NaiveDateTime, BoxError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| format!("malformed timestamp {s:?}: {e}").into())
}

/// Values are encoded according to the parameter type the server inferred,
/// so `Text` storage values of the timestamp and json types bind to native
/// columns. A value with no encoding for the inferred type is rejected.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => match *ty {
                Type::INT2 | Type::INT4 | Type::INT8 => Value::Int(i64::from(*v)).to_sql(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::OID => u32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                Type::BOOL => (*v != 0).to_sql(ty, out),
                Type::TIMESTAMP => DateTime::from_timestamp(*v, 0)
                    .ok_or_else(|| format!("timestamp out of range: {v}"))?
                    .naive_utc()
                    .to_sql(ty, out),
                Type::TIMESTAMPTZ => DateTime::<Utc>::from_timestamp(*v, 0)
                    .ok_or_else(|| format!("timestamp out of range: {v}"))?
                    .to_sql(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    v.to_string().to_sql(ty, out)
                }
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Text(s) => match *ty {
                Type::TIMESTAMP => parse_datetime(s)?.to_sql(ty, out),
                Type::TIMESTAMPTZ => parse_datetime(s)?.and_utc().to_sql(ty, out),
                Type::DATE => NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .or_else(|_| parse_datetime(s).map(|dt| dt.date()))?
                    .to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::from_str::<JsonValue>(s)?.to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 => Value::Int(s.trim().parse()?).to_sql(ty, out),
                Type::NUMERIC => s.trim().parse::<Decimal>()?.to_sql(ty, out),
                // enum labels travel as their text
                _ if matches!(ty.kind(), Kind::Enum(_)) => {
                    out.extend_from_slice(s.as_bytes());
                    Ok(IsNull::No)
                }
                _ => s.as_str().to_sql_checked(ty, out),
            },
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Array(_) => Err("array values are expanded into one parameter per element".into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Label of a user-defined enum.
struct EnumLabel(String);

impl<'a> FromSql<'a> for EnumLabel {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(EnumLabel(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

fn decode_column(row: &Row, idx: usize, ty: &Type) -> Result<Value, tokio_postgres::Error> {
    Ok(match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.into(),
        Type::OID => row.try_get::<_, Option<u32>>(idx)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.into(),
        Type::NUMERIC => row
            .try_get::<_, Option<Decimal>>(idx)?
            .map(|d| d.to_string())
            .into(),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|t| t.format(DATETIME_FORMAT).to_string())
            .into(),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|t| t.naive_utc().format(DATETIME_FORMAT).to_string())
            .into(),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|d| d.format(DATE_FORMAT).to_string())
            .into(),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<JsonValue>>(idx)?.into(),
        _ if matches!(ty.kind(), Kind::Enum(_)) => {
            row.try_get::<_, Option<EnumLabel>>(idx)?.map(|l| l.0).into()
        }
        _ => row.try_get::<_, Option<String>>(idx)?.into(),
    })
}

/// Decode a row into a [`Record`] keyed by column name.
pub(super) fn decode_row(row: &Row) -> Result<Record, DriverError> {
    let mut record = Record::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_()).map_err(|e| {
            DriverError::new(format!("column `{}` ({}): {e}", column.name(), column.type_()))
        })?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value, ty: &Type) -> Result<BytesMut, BoxError> {
        let mut out = BytesMut::new();
        value.to_sql(ty, &mut out)?;
        Ok(out)
    }

    fn numeric(value: &Value) -> Decimal {
        let raw = encode(value, &Type::NUMERIC).unwrap();
        Decimal::from_sql(&Type::NUMERIC, &raw).unwrap()
    }

    #[test]
    fn numeric_parameters_use_decimal_encoding() {
        assert_eq!(numeric(&Value::Int(5)), Decimal::from(5));
        assert_eq!(numeric(&Value::Int(-12)), Decimal::from(-12));
        assert_eq!(numeric(&Value::from("3.14")), Decimal::new(314, 2));
        assert_eq!(numeric(&Value::Float(0.5)), Decimal::new(5, 1));
        assert!(encode(&Value::from("abc"), &Type::NUMERIC).is_err());
    }

    #[test]
    fn mismatched_parameter_types_are_rejected() {
        assert!(encode(&Value::Int(1), &Type::BYTEA).is_err());
        assert!(encode(&Value::Bool(true), &Type::TEXT).is_err());
        assert!(encode(&Value::Float(1.5), &Type::INT4).is_err());
        assert!(encode(&Value::from("x"), &Type::UUID).is_err());
        assert!(encode(&Value::Int(1), &Type::INT8).is_ok());
    }

    #[test]
    fn storage_values_bind_to_native_types() {
        let mut out = BytesMut::new();
        let ts = Value::from("2015-11-04 14:40:52");
        assert!(matches!(ts.to_sql(&Type::TIMESTAMP, &mut out), Ok(IsNull::No)));

        let mut expected = BytesMut::new();
        NaiveDateTime::parse_from_str("2015-11-04 14:40:52", "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .to_sql(&Type::TIMESTAMP, &mut expected)
            .unwrap();
        assert_eq!(out, expected);

        let mut out = BytesMut::new();
        assert!(Value::Int(70_000).to_sql(&Type::INT2, &mut out).is_err());
        assert!(matches!(Value::Null.to_sql(&Type::INT4, &mut out), Ok(IsNull::Yes)));
        assert!(Value::from(vec![1]).to_sql(&Type::INT4, &mut out).is_err());
    }
}
