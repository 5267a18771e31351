//! Query functions for the dashboard contract.
//!
//! Every function accepts anything that iterates over borrowed
//! [`UnifiedRecord`]s, so callers can pass the whole table or the output
//! of [`filter_records`] without cloning.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use safecity_analytics_models::{DepartmentRanking, Filter, Headline, YearlyTotal};
use safecity_crime_models::{UnifiedRecord, crime_rate};
use safecity_geography_models::DepartmentId;

/// Returns the rows matching `filter`, in table order.
#[must_use]
pub fn filter_records<'a>(records: &'a [UnifiedRecord], filter: &Filter) -> Vec<&'a UnifiedRecord> {
    records
        .iter()
        .filter(|r| filter.year.is_none_or(|year| r.year == year))
        .filter(|r| {
            filter
                .department
                .as_ref()
                .is_none_or(|department| &r.department_id == department)
        })
        .collect()
}

/// Distinct years present in the table, ascending.
#[must_use]
pub fn available_years<'a>(records: impl IntoIterator<Item = &'a UnifiedRecord>) -> Vec<i32> {
    records
        .into_iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Ranks departments by mean crime rate, highest first.
///
/// Ties are broken by department code so the ranking is stable.
#[must_use]
pub fn top_departments<'a>(
    records: impl IntoIterator<Item = &'a UnifiedRecord>,
    n: usize,
) -> Vec<DepartmentRanking> {
    let mut by_department: BTreeMap<&DepartmentId, (&str, f64, u32)> = BTreeMap::new();
    for record in records {
        let entry = by_department
            .entry(&record.department_id)
            .or_insert((record.name.as_str(), 0.0, 0));
        entry.1 += record.crime_rate;
        entry.2 += 1;
    }

    let mut rankings: Vec<DepartmentRanking> = by_department
        .into_iter()
        .map(|(department_id, (name, rate_sum, rows))| DepartmentRanking {
            department_id: department_id.clone(),
            name: name.to_string(),
            mean_crime_rate: rate_sum / f64::from(rows),
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.mean_crime_rate
            .total_cmp(&a.mean_crime_rate)
            .then_with(|| a.department_id.cmp(&b.department_id))
    });
    rankings.truncate(n);
    rankings
}

/// Per-year totals, ascending by year.
///
/// The rate is recomputed from the summed counts and populations rather
/// than averaged.
#[must_use]
pub fn yearly_series<'a>(records: impl IntoIterator<Item = &'a UnifiedRecord>) -> Vec<YearlyTotal> {
    let mut by_year: BTreeMap<i32, (u64, f64)> = BTreeMap::new();
    for record in records {
        let entry = by_year.entry(record.year).or_default();
        entry.0 += record.crime_count;
        entry.1 += record.population;
    }

    by_year
        .into_iter()
        .map(|(year, (crime_count, population))| YearlyTotal {
            year,
            crime_count,
            population,
            crime_rate: crime_rate(crime_count, population),
        })
        .collect()
}

/// Headline metrics of `filtered` measured against the whole table.
///
/// The evolution is 0 when the whole-table mean rate is 0.
#[must_use]
pub fn headline<'a, 'b>(
    filtered: impl IntoIterator<Item = &'a UnifiedRecord>,
    all: impl IntoIterator<Item = &'b UnifiedRecord>,
) -> Headline {
    let mut total_crimes = 0_u64;
    let rates: Vec<f64> = filtered
        .into_iter()
        .map(|r| {
            total_crimes += r.crime_count;
            r.crime_rate
        })
        .collect();
    let mean_crime_rate = mean(&rates);

    let baseline = mean(&all.into_iter().map(|r| r.crime_rate).collect::<Vec<_>>());
    let evolution_percent = if baseline > 0.0 {
        (mean_crime_rate - baseline) / baseline * 100.0
    } else {
        0.0
    };

    Headline {
        total_crimes,
        mean_crime_rate,
        evolution_percent,
    }
}

/// Renders the rows as a fixed-width text table of name, crime count and
/// population, used as context for the language model.
#[must_use]
pub fn data_summary<'a>(records: impl IntoIterator<Item = &'a UnifiedRecord>) -> String {
    let rows: Vec<(&str, String, String)> = records
        .into_iter()
        .map(|r| {
            (
                r.name.as_str(),
                r.crime_count.to_string(),
                format!("{:.0}", r.population),
            )
        })
        .collect();

    let name_width = rows
        .iter()
        .map(|(name, _, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .max("name".len());
    let count_width = rows
        .iter()
        .map(|(_, count, _)| count.len())
        .max()
        .unwrap_or(0)
        .max("crime_count".len());
    let population_width = rows
        .iter()
        .map(|(_, _, population)| population.len())
        .max()
        .unwrap_or(0)
        .max("population".len());

    let mut out = String::new();
    let _ = write!(
        out,
        "{:<name_width$}  {:>count_width$}  {:>population_width$}",
        "name", "crime_count", "population"
    );
    for (name, count, population) in &rows {
        let _ = write!(
            out,
            "\n{name:<name_width$}  {count:>count_width$}  {population:>population_width$}"
        );
    }

    log::debug!("Data summary covers {} rows", rows.len());
    out
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;

    fn record(code: &str, name: &str, year: i32, population: f64, crime_count: u64) -> UnifiedRecord {
        UnifiedRecord::new(
            DepartmentId::normalize(code).unwrap(),
            name.to_string(),
            year,
            population,
            crime_count,
            MultiPolygon(vec![]),
        )
    }

    fn table() -> Vec<UnifiedRecord> {
        vec![
            record("01", "Ain", 2019, 100_000.0, 100),
            record("01", "Ain", 2020, 100_000.0, 300),
            record("75", "Paris", 2019, 200_000.0, 1_000),
            record("75", "Paris", 2020, 200_000.0, 600),
            record("2A", "Corse-du-Sud", 2019, 0.0, 40),
            record("2A", "Corse-du-Sud", 2020, 0.0, 0),
        ]
    }

    #[test]
    fn filters_by_year_and_department() {
        let records = table();

        assert_eq!(filter_records(&records, &Filter::default()).len(), 6);
        assert_eq!(filter_records(&records, &Filter::for_year(2020)).len(), 3);

        let filter = Filter {
            year: Some(2019),
            department: DepartmentId::normalize("75"),
        };
        let rows = filter_records(&records, &filter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crime_count, 1_000);

        assert!(filter_records(&records, &Filter::for_year(1999)).is_empty());
    }

    #[test]
    fn lists_years_ascending() {
        let mut records = table();
        records.reverse();
        assert_eq!(available_years(&records), vec![2019, 2020]);
    }

    #[test]
    fn ranks_by_mean_rate() {
        let records = table();
        let top = top_departments(&records, 10);

        let codes: Vec<&str> = top.iter().map(|r| r.department_id.as_str()).collect();
        assert_eq!(codes, vec!["75", "01", "2A"]);
        assert!((top[0].mean_crime_rate - 400.0).abs() < 1e-9);
        assert!((top[1].mean_crime_rate - 200.0).abs() < 1e-9);
        assert_eq!(top[0].name, "Paris");
    }

    #[test]
    fn ranking_ties_break_on_code_and_truncate() {
        let records = vec![
            record("13", "Bouches-du-Rhône", 2020, 100.0, 1),
            record("06", "Alpes-Maritimes", 2020, 100.0, 1),
            record("33", "Gironde", 2020, 100.0, 1),
        ];
        let top = top_departments(&records, 2);

        let codes: Vec<&str> = top.iter().map(|r| r.department_id.as_str()).collect();
        assert_eq!(codes, vec!["06", "13"]);
    }

    #[test]
    fn yearly_series_recomputes_rate() {
        let records = table();
        let series = yearly_series(&records);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].year, 2019);
        assert_eq!(series[0].crime_count, 1_140);
        assert!((series[0].population - 300_000.0).abs() < f64::EPSILON);
        assert!((series[0].crime_rate - 380.0).abs() < 1e-9);
        assert_eq!(series[1].crime_count, 900);
    }

    #[test]
    fn headline_against_whole_table() {
        let records = table();
        let year = filter_records(&records, &Filter::for_year(2019));
        let result = headline(year, &records);

        // 2019 rates: 100, 500, 0 -> mean 200; whole table mean 200.
        assert_eq!(result.total_crimes, 1_140);
        assert!((result.mean_crime_rate - 200.0).abs() < 1e-9);
        assert!(result.evolution_percent.abs() < 1e-9);

        let paris = filter_records(
            &records,
            &Filter {
                year: None,
                department: DepartmentId::normalize("75"),
            },
        );
        let result = headline(paris, &records);
        assert!((result.evolution_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn headline_zero_baseline() {
        let records = vec![record("2B", "Haute-Corse", 2020, 0.0, 12)];
        let result = headline(&records, &records);

        assert_eq!(result.total_crimes, 12);
        assert!(result.mean_crime_rate.abs() < f64::EPSILON);
        assert!(result.evolution_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn headline_of_nothing_is_zero() {
        let records = table();
        let result = headline(std::iter::empty(), &records);
        assert_eq!(result.total_crimes, 0);
        assert!(result.mean_crime_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn summary_is_aligned_table() {
        let records = vec![
            record("01", "Ain", 2020, 650_000.0, 17),
            record("75", "Paris", 2020, 2_100_000.0, 123_456),
        ];
        let summary = data_summary(&records);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name   crime_count  population");
        assert_eq!(lines[1], "Ain             17      650000");
        assert_eq!(lines[2], "Paris       123456     2100000");
    }

    #[test]
    fn summary_of_empty_table_is_header_only() {
        assert_eq!(
            data_summary(std::iter::empty()),
            "name  crime_count  population"
        );
    }
}
