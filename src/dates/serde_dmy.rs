//! Serde adapters for `DD-MM-YYYY` date strings
//!
//! Use with `#[serde(with = "crate::dates::serde_dmy")]` and the `option` /
//! `vec` submodules for optional and repeated dates.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%d-%m-%Y";

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(FORMAT).to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

pub mod vec {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(dates: &[NaiveDate], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(dates.len()))?;
        for d in dates {
            seq.serialize_element(&d.format(FORMAT).to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveDate>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|s| NaiveDate::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dated {
        #[serde(with = "crate::dates::serde_dmy")]
        on: NaiveDate,
        #[serde(default, with = "crate::dates::serde_dmy::option")]
        until: Option<NaiveDate>,
        #[serde(default, with = "crate::dates::serde_dmy::vec")]
        skipped: Vec<NaiveDate>,
    }

    #[test]
    fn test_dmy_json_shape() {
        let json = r#"{"on":"01-02-2024","until":null,"skipped":["05-03-2024"]}"#;
        let parsed: Dated = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.on, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(parsed.until, None);
        assert_eq!(parsed.skipped, vec![NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()]);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }

    #[test]
    fn test_missing_optional_fields() {
        let parsed: Dated = serde_json::from_str(r#"{"on":"01-02-2024"}"#).unwrap();
        assert!(parsed.until.is_none());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_rejects_iso_dates() {
        assert!(serde_json::from_str::<Dated>(r#"{"on":"2024-02-01"}"#).is_err());
    }
}
