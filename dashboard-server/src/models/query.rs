//! Crime query model

use serde::Deserialize;

use crime_core::logic::stats::{CrimeFilter, DEFAULT_TOP_OFFENSES};

use crate::AppError;

/// Upper bound for `limit` on ranked lists
pub const MAX_LIMIT: usize = 100;

/// Sidebar filter as query parameters. List values are comma separated:
/// `?districts=B2,D4&years=2017,2018`.
#[derive(Debug, Deserialize, Default)]
pub struct CrimeQuery {
    pub districts: Option<String>,
    pub offenses: Option<String>,
    pub years: Option<String>,
    pub months: Option<String>,
    pub limit: Option<usize>,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_numbers(param: &str, raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    split_list(raw)
        .into_iter()
        .map(|v| {
            v.parse::<i32>()
                .map_err(|_| AppError::ValidationError(format!("{}: `{}` is not a number", param, v)))
        })
        .collect()
}

impl CrimeQuery {
    pub fn filter(&self) -> Result<CrimeFilter, AppError> {
        Ok(CrimeFilter {
            districts: split_list(self.districts.as_deref()),
            offense_groups: split_list(self.offenses.as_deref()),
            years: parse_numbers("years", self.years.as_deref())?,
            months: parse_numbers("months", self.months.as_deref())?,
        })
    }

    pub fn limit(&self) -> Result<usize, AppError> {
        match self.limit {
            None => Ok(DEFAULT_TOP_OFFENSES),
            Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
            Some(n) => Err(AppError::ValidationError(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, n
            ))),
        }
    }
}
