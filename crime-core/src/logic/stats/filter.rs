use serde::{Deserialize, Serialize};

use crate::logic::dataset::CrimeRecord;

/// Sidebar filter. An empty list places no constraint on its column;
/// a record with no value never satisfies a non-empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrimeFilter {
    pub districts: Vec<String>,
    pub offense_groups: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<i32>,
}

fn allows<T: PartialEq>(allowed: &[T], value: Option<&T>) -> bool {
    allowed.is_empty() || value.map_or(false, |v| allowed.contains(v))
}

impl CrimeFilter {
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
            && self.offense_groups.is_empty()
            && self.years.is_empty()
            && self.months.is_empty()
    }

    pub fn matches(&self, record: &CrimeRecord) -> bool {
        allows(&self.districts, record.district.as_ref())
            && allows(&self.offense_groups, record.offense_code_group.as_ref())
            && allows(&self.years, record.year.as_ref())
            && allows(&self.months, record.month.as_ref())
    }
}
