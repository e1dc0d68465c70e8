//! Key statistics, monthly trends and top offenses over a filtered view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::dataset::CrimeRecord;

/// Shown in place of a statistic when the filtered view is empty
pub const NO_DATA: &str = "No data";

pub const DEFAULT_TOP_OFFENSES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub most_common_offense: Option<String>,
    pub busiest_month: Option<i32>,
}

/// One bar of the grouped monthly histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: i32,
    pub offense_group: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseCount {
    pub offense_group: String,
    pub count: usize,
}

/// Most frequent value, smallest value on ties. Missing values are ignored.
pub fn mode<'a, T, I>(values: I) -> Option<T>
where
    T: Ord + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts: BTreeMap<&T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut best: Option<(&T, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

pub fn summary(records: &[&CrimeRecord]) -> Summary {
    Summary {
        total: records.len(),
        most_common_offense: mode(records.iter().filter_map(|r| r.offense_code_group.as_ref())),
        busiest_month: mode(records.iter().filter_map(|r| r.month.as_ref())),
    }
}

/// Incident counts per `(month, offense group)`, ordered by month then group
pub fn monthly_trends(records: &[&CrimeRecord]) -> Vec<TrendPoint> {
    let mut counts: BTreeMap<(i32, &str), usize> = BTreeMap::new();
    for record in records {
        if let (Some(month), Some(group)) = (record.month, record.offense_code_group.as_deref()) {
            *counts.entry((month, group)).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((month, group), count)| TrendPoint {
            month,
            offense_group: group.to_string(),
            count,
        })
        .collect()
}

/// The `limit` most frequent offense groups, descending, ties alphabetical
pub fn top_offenses(records: &[&CrimeRecord], limit: usize) -> Vec<OffenseCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for group in records.iter().filter_map(|r| r.offense_code_group.as_deref()) {
        *counts.entry(group).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // stable sort keeps the alphabetical order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .map(|(group, count)| OffenseCount { offense_group: group.to_string(), count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(group: Option<&str>, month: Option<i32>) -> CrimeRecord {
        CrimeRecord {
            offense_code_group: group.map(String::from),
            month,
            ..Default::default()
        }
    }

    fn sample() -> Vec<CrimeRecord> {
        vec![
            record(Some("Larceny"), Some(6)),
            record(Some("Larceny"), Some(7)),
            record(Some("Vandalism"), Some(7)),
            record(Some("Vandalism"), Some(6)),
            record(Some("Towed"), Some(6)),
            record(None, Some(7)),
            record(Some("Towed"), None),
        ]
    }

    #[test]
    fn test_mode_ties_take_smallest() {
        assert_eq!(mode([3, 1, 3, 1, 2].iter()), Some(1));
        assert_eq!(mode(["b", "a", "b"].iter()), Some("b"));
        assert_eq!(mode(Vec::<i32>::new().iter()), None);
    }

    #[test]
    fn test_summary() {
        let records = sample();
        let view: Vec<&CrimeRecord> = records.iter().collect();
        let summary = summary(&view);

        assert_eq!(summary.total, 7);
        // Larceny, Towed and Vandalism all appear twice
        assert_eq!(summary.most_common_offense.as_deref(), Some("Larceny"));
        // 6 and 7 both appear three times
        assert_eq!(summary.busiest_month, Some(6));
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = summary(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.most_common_offense.is_none());
        assert!(summary.busiest_month.is_none());
    }

    #[test]
    fn test_monthly_trends() {
        let records = sample();
        let view: Vec<&CrimeRecord> = records.iter().collect();
        let trends = monthly_trends(&view);

        let flat: Vec<(i32, &str, usize)> = trends
            .iter()
            .map(|p| (p.month, p.offense_group.as_str(), p.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                (6, "Larceny", 1),
                (6, "Towed", 1),
                (6, "Vandalism", 1),
                (7, "Larceny", 1),
                (7, "Vandalism", 1),
            ]
        );
    }

    #[test]
    fn test_top_offenses() {
        let mut records = sample();
        records.push(record(Some("Vandalism"), Some(8)));
        let view: Vec<&CrimeRecord> = records.iter().collect();

        let top = top_offenses(&view, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], OffenseCount { offense_group: "Vandalism".into(), count: 3 });
        assert_eq!(top[1], OffenseCount { offense_group: "Larceny".into(), count: 2 });

        assert_eq!(top_offenses(&view, DEFAULT_TOP_OFFENSES).len(), 3);
    }
}
