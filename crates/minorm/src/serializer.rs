//! Model instances to and from JSON.
//!
//! One instance is one flat JSON object keyed by field name (`id` included); a query
//! result is a JSON array of such objects in result order. Temporal values are written as
//! ISO-8601 strings.

use crate::error::OrmResult;
use crate::model::Model;
use crate::record::Record;

/// Serialize one instance as a JSON object string.
pub fn to_json<M: Model>(instance: &M) -> OrmResult<String> {
    Ok(serde_json::to_string(&instance.to_record())?)
}

/// Serialize instances as a JSON array string, preserving order.
pub fn to_json_array<M: Model>(instances: &[M]) -> OrmResult<String> {
    let records: Vec<Record> = instances.iter().map(Model::to_record).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Decode a JSON object string into an instance. Unknown keys are dropped.
pub fn from_json<M: Model>(raw: &str) -> OrmResult<M> {
    M::from_record(&Record::from_json(raw)?)
}

/// Serialize a single value, formatting dates as ISO-8601 instead of failing.
pub fn value_to_json(value: &crate::Value) -> OrmResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::HelperModel;
    use crate::value::Value;
    use chrono::NaiveDate;

    #[test]
    fn empty_result_set_is_an_empty_array() {
        assert_eq!(to_json_array::<HelperModel>(&[]).unwrap(), "[]");
    }

    #[test]
    fn dates_become_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2015, 2, 15).unwrap();
        assert_eq!(
            value_to_json(&Value::Date(date)).unwrap(),
            serde_json::json!("2015-02-15")
        );
        let at = date.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(
            value_to_json(&Value::DateTime(at)).unwrap(),
            serde_json::json!("2015-02-15T09:30:00")
        );
        assert_eq!(value_to_json(&Value::Null).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = from_json::<HelperModel>("{not json").unwrap_err();
        assert!(matches!(err, crate::OrmError::Serialization(_)));
    }
}
