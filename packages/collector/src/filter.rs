//! Column filtering.
//!
//! Filtering removes fields, never records: the output has exactly as many
//! records as the input, each holding only keys from the column list, in
//! the order the upstream API sent them. An empty column list means no
//! filtering.

use crate::Record;

/// Keeps only the fields of `record` named in `columns`.
#[must_use]
pub fn filter_record(record: Record, columns: &[String]) -> Record {
    if columns.is_empty() {
        return record;
    }
    record
        .into_iter()
        .filter(|(key, _)| columns.iter().any(|column| column == key))
        .collect()
}

/// Applies [`filter_record`] to every record, preserving order.
#[must_use]
pub fn filter_records(records: Vec<Record>, columns: &[String]) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| filter_record(record, columns))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn drops_unconfigured_fields() {
        let input = record(json!({"year": "2023", "state": "OH", "deaths": "5", "extra": "x"}));
        let filtered = filter_record(input, &columns(&["year", "state", "deaths"]));
        assert_eq!(
            serde_json::Value::Object(filtered),
            json!({"year": "2023", "state": "OH", "deaths": "5"})
        );
    }

    #[test]
    fn keeps_record_count_and_restricts_keys() {
        let cols = columns(&["year", "illnesses"]);
        let input = vec![
            record(json!({"year": "2020", "illnesses": "3", "etiology": "Norovirus"})),
            record(json!({"state": "OH"})),
            record(json!({})),
        ];

        let output = filter_records(input, &cols);

        assert_eq!(output.len(), 3);
        for rec in &output {
            assert!(rec.keys().all(|k| cols.contains(k)));
        }
        assert!(output[1].is_empty());
    }

    #[test]
    fn kept_fields_stay_in_upstream_order() {
        let input = record(json!({"state": "OH", "year": "2023", "extra": "x", "deaths": "5"}));
        let filtered = filter_record(input, &columns(&["deaths", "year", "state"]));
        let keys: Vec<&str> = filtered.keys().map(String::as_str).collect();
        assert_eq!(keys, ["state", "year", "deaths"]);

        let written = serde_json::to_string(&filtered).unwrap();
        assert_eq!(written, r#"{"state":"OH","year":"2023","deaths":"5"}"#);
    }

    #[test]
    fn empty_column_list_keeps_everything() {
        let input = record(json!({"a": 1, "b": 2}));
        let filtered = filter_record(input.clone(), &[]);
        assert_eq!(filtered, input);
    }
}
