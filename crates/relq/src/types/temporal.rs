use super::{Type, names};
use crate::error::{DbError, DbResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_datetime(type_name: &str, s: &str) -> DbResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| DbError::conversion(type_name, format!("malformed timestamp {s:?}: {e}")))
}

fn from_unix(type_name: &str, secs: i64) -> DbResult<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| DbError::conversion(type_name, format!("timestamp out of range: {secs}")))
}

/// Unix timestamp (seconds, UTC) stored as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampType;

impl Type for TimestampType {
    fn name(&self) -> &str {
        names::TIMESTAMP
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Int(secs) => {
                let dt = from_unix(self.name(), *secs)?;
                Ok(Value::Text(dt.format(DATETIME_FORMAT).to_string()))
            }
            other => Err(DbError::conversion(
                self.name(),
                format!("expected unix timestamp, got {}", other.type_name()),
            )),
        }
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Int(_) => Ok(value.clone()),
            Value::Text(s) => Ok(Value::Int(parse_datetime(self.name(), s)?.and_utc().timestamp())),
            other => Err(DbError::conversion(
                self.name(),
                format!("expected timestamp string, got {}", other.type_name()),
            )),
        }
    }
}

/// Unix timestamp stored as `YYYY-MM-DD`.
///
/// Lossy: the time of day is truncated on the way in, so reading a value back
/// yields midnight UTC of the same day.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl Type for DateType {
    fn name(&self) -> &str {
        names::DATE
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Int(secs) => {
                let dt = from_unix(self.name(), *secs)?;
                Ok(Value::Text(dt.format(DATE_FORMAT).to_string()))
            }
            other => Err(DbError::conversion(
                self.name(),
                format!("expected unix timestamp, got {}", other.type_name()),
            )),
        }
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Int(_) => Ok(value.clone()),
            Value::Text(s) => {
                let date = match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                    Ok(date) => date,
                    Err(_) => parse_datetime(self.name(), s)?.date(),
                };
                let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
                    DbError::conversion(self.name(), format!("invalid date {s:?}"))
                })?;
                Ok(Value::Int(midnight.and_utc().timestamp()))
            }
            other => Err(DbError::conversion(
                self.name(),
                format!("expected date string, got {}", other.type_name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trip() {
        let storage = TimestampType.to_storage(&Value::Int(1446648052)).unwrap();
        assert_eq!(storage, Value::Text("2015-11-04 14:40:52".into()));
        assert_eq!(TimestampType.to_native(&storage).unwrap(), Value::Int(1446648052));
    }

    #[test]
    fn timestamp_accepts_fractional_seconds() {
        let native = TimestampType
            .to_native(&Value::Text("2015-11-04 14:40:52.250".into()))
            .unwrap();
        assert_eq!(native, Value::Int(1446648052));
    }

    #[test]
    fn malformed_timestamp_is_a_conversion_error() {
        let err = TimestampType.to_native(&Value::Text("yesterday".into())).unwrap_err();
        assert!(matches!(err, DbError::Conversion { .. }));
    }

    #[test]
    fn date_truncates_time_of_day() {
        let storage = DateType.to_storage(&Value::Int(1446648052)).unwrap();
        assert_eq!(storage, Value::Text("2015-11-04".into()));
        assert_eq!(DateType.to_native(&storage).unwrap(), Value::Int(1446595200));
    }
}
