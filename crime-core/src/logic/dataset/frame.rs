use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::CrimeRecord;
use super::DatasetError;
use crate::logic::stats::CrimeFilter;

/// Field the document store adds to every record
pub const DOCUMENT_ID_FIELD: &str = "_id";

/// In-memory incident table, loaded once per session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrimeFrame {
    records: Vec<CrimeRecord>,
}

/// Distinct values offered by the dashboard filter widgets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub districts: Vec<String>,
    pub offense_groups: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<i32>,
}

impl CrimeFrame {
    pub fn new(records: Vec<CrimeRecord>) -> Self {
        Self { records }
    }

    /// Decode raw store documents. The store's `_id` is removed first.
    pub fn from_documents(documents: Vec<serde_json::Value>) -> Result<Self, DatasetError> {
        let mut records = Vec::with_capacity(documents.len());

        for (i, doc) in documents.into_iter().enumerate() {
            let mut doc = match doc {
                serde_json::Value::Object(map) => map,
                other => {
                    return Err(DatasetError::Malformed(format!(
                        "document {} is not an object: {}",
                        i, other
                    )))
                }
            };
            doc.remove(DOCUMENT_ID_FIELD);

            let record = serde_json::from_value(serde_json::Value::Object(doc))
                .map_err(|e| DatasetError::Malformed(format!("document {}: {}", i, e)))?;
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CrimeRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[CrimeRecord] {
        &self.records
    }

    pub fn filter<'a>(&'a self, filter: &CrimeFilter) -> Vec<&'a CrimeRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn options(&self) -> FilterOptions {
        let mut districts = BTreeSet::new();
        let mut offense_groups = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();

        for record in &self.records {
            if let Some(d) = &record.district {
                districts.insert(d.clone());
            }
            if let Some(g) = &record.offense_code_group {
                offense_groups.insert(g.clone());
            }
            if let Some(y) = record.year {
                years.insert(y);
            }
            if let Some(m) = record.month {
                months.insert(m);
            }
        }

        FilterOptions {
            districts: districts.into_iter().collect(),
            offense_groups: offense_groups.into_iter().collect(),
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CrimeFrame {
    type Item = &'a CrimeRecord;
    type IntoIter = std::slice::Iter<'a, CrimeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
