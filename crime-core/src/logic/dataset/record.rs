use serde::{Deserialize, Deserializer, Serialize};

use crate::logic::features::{observation, Observation};

/// One crime incident, as exported by the historical incident report.
///
/// Every column is optional: the export has gaps, and documents written by
/// older loaders store numbers as floats or strings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CrimeRecord {
    #[serde(rename = "INCIDENT_NUMBER", default, deserialize_with = "lenient::text")]
    pub incident_number: Option<String>,
    #[serde(rename = "OFFENSE_CODE", default, deserialize_with = "lenient::text")]
    pub offense_code: Option<String>,
    #[serde(rename = "OFFENSE_CODE_GROUP", default, deserialize_with = "lenient::text")]
    pub offense_code_group: Option<String>,
    #[serde(rename = "OFFENSE_DESCRIPTION", default, deserialize_with = "lenient::text")]
    pub offense_description: Option<String>,
    #[serde(rename = "DISTRICT", default, deserialize_with = "lenient::text")]
    pub district: Option<String>,
    #[serde(rename = "REPORTING_AREA", default, deserialize_with = "lenient::text")]
    pub reporting_area: Option<String>,
    #[serde(rename = "SHOOTING", default, deserialize_with = "lenient::text")]
    pub shooting: Option<String>,
    #[serde(rename = "OCCURRED_ON_DATE", default, deserialize_with = "lenient::text")]
    pub occurred_on_date: Option<String>,
    #[serde(rename = "YEAR", default, deserialize_with = "lenient::integer")]
    pub year: Option<i32>,
    #[serde(rename = "MONTH", default, deserialize_with = "lenient::integer")]
    pub month: Option<i32>,
    #[serde(rename = "DAY_OF_WEEK", default, deserialize_with = "lenient::text")]
    pub day_of_week: Option<String>,
    #[serde(rename = "HOUR", default, deserialize_with = "lenient::integer")]
    pub hour: Option<i32>,
    #[serde(rename = "UCR_PART", default, deserialize_with = "lenient::text")]
    pub ucr_part: Option<String>,
    #[serde(rename = "STREET", default, deserialize_with = "lenient::text")]
    pub street: Option<String>,
    #[serde(rename = "Lat", default, deserialize_with = "lenient::float")]
    pub lat: Option<f64>,
    #[serde(rename = "Long", default, deserialize_with = "lenient::float")]
    pub long: Option<f64>,
}

impl CrimeRecord {
    /// Whether the export column `name` has a value
    pub fn has_field(&self, name: &str) -> bool {
        match name {
            "INCIDENT_NUMBER" => self.incident_number.is_some(),
            "OFFENSE_CODE" => self.offense_code.is_some(),
            "OFFENSE_CODE_GROUP" => self.offense_code_group.is_some(),
            "OFFENSE_DESCRIPTION" => self.offense_description.is_some(),
            "DISTRICT" => self.district.is_some(),
            "REPORTING_AREA" => self.reporting_area.is_some(),
            "SHOOTING" => self.shooting.is_some(),
            "OCCURRED_ON_DATE" => self.occurred_on_date.is_some(),
            "YEAR" => self.year.is_some(),
            "MONTH" => self.month.is_some(),
            "DAY_OF_WEEK" => self.day_of_week.is_some(),
            "HOUR" => self.hour.is_some(),
            "UCR_PART" => self.ucr_part.is_some(),
            "STREET" => self.street.is_some(),
            "Lat" => self.lat.is_some(),
            "Long" => self.long.is_some(),
            _ => false,
        }
    }

    /// `(lat, long)` when both are present
    pub fn location(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.long?))
    }

    /// Predictor fields of the crime model, if all are present
    pub fn observation(&self) -> Option<Observation> {
        Some(
            Observation::new()
                .with(observation::DISTRICT, self.district.clone()?)
                .with(observation::DAY_OF_WEEK, self.day_of_week.clone()?)
                .with(observation::HOUR, i64::from(self.hour?)),
        )
    }
}

/// Deserializers accepting numbers, numeric strings, blanks and nulls
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Bool(bool),
        Text(String),
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            None => None,
            Some(Raw::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
            }
            Some(Raw::Int(i)) => Some(i.to_string()),
            Some(Raw::Float(f)) if f.is_nan() => None,
            Some(Raw::Float(f)) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
            Some(Raw::Float(f)) => Some(f.to_string()),
            Some(Raw::Bool(b)) => Some(b.to_string()),
        })
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        use serde::de::Error;

        let value = match Option::<Raw>::deserialize(d)? {
            None => return Ok(None),
            Some(Raw::Int(i)) => i as f64,
            Some(Raw::Float(f)) if f.is_nan() => return Ok(None),
            Some(Raw::Float(f)) => f,
            Some(Raw::Text(s)) if s.trim().is_empty() => return Ok(None),
            Some(Raw::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected an integer, got `{}`", s)))?,
            Some(Raw::Bool(b)) => return Err(D::Error::custom(format!("expected an integer, got `{}`", b))),
        };

        if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
            return Err(D::Error::custom(format!("expected an integer, got {}", value)));
        }
        Ok(Some(value as i32))
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        use serde::de::Error;

        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Int(i)) => Ok(Some(i as f64)),
            Some(Raw::Float(f)) if f.is_nan() => Ok(None),
            Some(Raw::Float(f)) => Ok(Some(f)),
            Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Raw::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got `{}`", s))),
            Some(Raw::Bool(b)) => Err(D::Error::custom(format!("expected a number, got `{}`", b))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_with_mixed_numeric_types() {
        let record: CrimeRecord = serde_json::from_value(json!({
            "INCIDENT_NUMBER": "I182070945",
            "OFFENSE_CODE": 619,
            "OFFENSE_CODE_GROUP": "Larceny",
            "DISTRICT": "D14",
            "YEAR": 2018.0,
            "MONTH": "9",
            "DAY_OF_WEEK": "Sunday",
            "HOUR": 13,
            "Lat": 42.35779134,
            "Long": "-71.13937053",
            "Location": "(42.35779134, -71.13937053)"
        }))
        .unwrap();

        assert_eq!(record.offense_code.as_deref(), Some("619"));
        assert_eq!(record.year, Some(2018));
        assert_eq!(record.month, Some(9));
        assert_eq!(record.hour, Some(13));
        assert_eq!(record.location(), Some((42.35779134, -71.13937053)));
    }

    #[test]
    fn test_blanks_and_nulls_are_missing() {
        let record: CrimeRecord = serde_json::from_value(json!({
            "DISTRICT": "  ",
            "SHOOTING": null,
            "Lat": ""
        }))
        .unwrap();

        assert!(record.district.is_none());
        assert!(record.shooting.is_none());
        assert!(record.lat.is_none());
        assert!(!record.has_field("DISTRICT"));
        assert!(record.location().is_none());
    }

    #[test]
    fn test_fractional_hour_rejected() {
        let result: Result<CrimeRecord, _> = serde_json::from_value(json!({ "HOUR": 13.5 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_observation_requires_all_predictors() {
        let mut record = CrimeRecord {
            district: Some("B2".into()),
            day_of_week: Some("Friday".into()),
            hour: Some(22),
            ..Default::default()
        };
        let obs = record.observation().unwrap();
        assert_eq!(obs.get("HOUR").and_then(|v| v.as_number()), Some(22.0));

        record.hour = None;
        assert!(record.observation().is_none());
    }
}
