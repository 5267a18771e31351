//! Read-only views over the merged table.
//!
//! Every view asks for a year and a department first, then works on the
//! filtered rows the same way the map dashboard does.

use dialoguer::{Input, Select};
use safecity_ai::analysis::analyze;
use safecity_ai::providers::create_provider;
use safecity_analytics::{available_years, filter_records, headline, top_departments, yearly_series};
use safecity_analytics_models::Filter;
use safecity_crime_models::UnifiedRecord;
use safecity_generate::{PipelineConfig, persist};
use safecity_geography_models::DepartmentId;

const ALL_YEARS: &str = "All years";
const ALL_DEPARTMENTS: &str = "All departments";

/// Prints the headline figures and the departments with the highest mean
/// crime rate.
///
/// # Errors
///
/// Returns an error if the merged table cannot be read or a prompt fails.
pub fn top(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let all = persist::read_unified(&config.output_path)?;
    let filter = prompt_filter(&all, false)?;

    let n: usize = Input::new()
        .with_prompt("How many departments?")
        .default(10)
        .interact_text()?;

    let records = filter_records(&all, &filter);
    let metrics = headline(records.iter().copied(), &all);

    println!();
    println!("{}", filter.describe());
    println!(
        "Total crimes: {}  Mean rate: {:.2}  Evolution: {:.2}%",
        metrics.total_crimes, metrics.mean_crime_rate, metrics.evolution_percent
    );
    println!();
    for (rank, entry) in top_departments(records.iter().copied(), n).iter().enumerate() {
        println!(
            "{:>3}. {} {:<28} {:>10.2}",
            rank + 1,
            entry.department_id,
            entry.name,
            entry.mean_crime_rate
        );
    }

    Ok(())
}

/// Prints crime and population totals per year.
///
/// # Errors
///
/// Returns an error if the merged table cannot be read or a prompt fails.
pub fn yearly(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let all = persist::read_unified(&config.output_path)?;
    let filter = prompt_filter(&all, true)?;
    let records = filter_records(&all, &filter);

    println!();
    println!("{}", filter.describe());
    println!("{:>6} {:>12} {:>14} {:>10}", "year", "crimes", "population", "rate");
    for total in yearly_series(records.iter().copied()) {
        println!(
            "{:>6} {:>12} {:>14.0} {:>10.2}",
            total.year, total.crime_count, total.population, total.crime_rate
        );
    }

    Ok(())
}

/// Sends the filtered rows to the language model, either for a report or
/// with a user question, and prints the answer.
///
/// # Errors
///
/// Returns an error if the merged table cannot be read, no API key is
/// configured, or a prompt fails.
#[allow(clippy::future_not_send)]
pub async fn ask(
    config: &PipelineConfig,
    with_question: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let all = persist::read_unified(&config.output_path)?;
    let filter = prompt_filter(&all, false)?;

    let question = if with_question {
        let text: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()?;
        Some(text)
    } else {
        None
    };

    let provider = create_provider(&config.ai)?;
    let records = filter_records(&all, &filter);

    log::info!("Querying {} for {}", config.ai.model, filter.describe());
    let answer = analyze(provider.as_ref(), records, question.as_deref()).await;

    println!();
    println!("{answer}");
    Ok(())
}

fn prompt_filter(
    records: &[UnifiedRecord],
    every_year: bool,
) -> Result<Filter, dialoguer::Error> {
    let year = if every_year {
        None
    } else {
        let years = available_years(records);
        let idx = Select::new()
            .with_prompt("Year")
            .items(&year_labels(&years))
            .default(0)
            .interact()?;
        choice(&years, idx)
    };

    let departments = departments(records);
    let labels: Vec<String> = std::iter::once(ALL_DEPARTMENTS.to_string())
        .chain(departments.iter().map(|(id, name)| format!("{id} {name}")))
        .collect();
    let idx = Select::new()
        .with_prompt("Department")
        .items(&labels)
        .default(0)
        .interact()?;
    let department = choice(&departments, idx).map(|(id, _)| id);

    Ok(Filter { year, department })
}

fn year_labels(years: &[i32]) -> Vec<String> {
    std::iter::once(ALL_YEARS.to_string())
        .chain(years.iter().map(ToString::to_string))
        .collect()
}

/// Maps a menu index to a value; index 0 is the "all" entry.
fn choice<T: Clone>(values: &[T], idx: usize) -> Option<T> {
    idx.checked_sub(1).and_then(|i| values.get(i)).cloned()
}

/// Distinct departments in code order, labelled with their official names
/// where the table has one.
fn departments(records: &[UnifiedRecord]) -> Vec<(DepartmentId, String)> {
    let mut departments: Vec<(DepartmentId, String)> = Vec::new();
    for record in records {
        if !departments.iter().any(|(id, _)| *id == record.department_id) {
            let name = record
                .department_id
                .official_name()
                .map_or_else(|| record.name.clone(), ToString::to_string);
            departments.push((record.department_id.clone(), name));
        }
    }
    departments.sort_by(|a, b| a.0.cmp(&b.0));
    departments
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use super::*;

    fn record(code: &str, name: &str, year: i32) -> UnifiedRecord {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        UnifiedRecord::new(
            DepartmentId::normalize(code).unwrap(),
            name.to_string(),
            year,
            1000.0,
            10,
            MultiPolygon(vec![square]),
        )
    }

    #[test]
    fn first_entry_means_no_restriction() {
        let years = vec![2019, 2020];

        assert_eq!(year_labels(&years), vec!["All years", "2019", "2020"]);
        assert_eq!(choice(&years, 0), None);
        assert_eq!(choice(&years, 2), Some(2020));
        assert_eq!(choice(&years, 3), None);
    }

    #[test]
    fn departments_are_distinct_and_ordered() {
        let records = vec![
            record("75", "Paris", 2019),
            record("2A", "Corse-du-Sud", 2019),
            record("75", "Paris", 2020),
            record("01", "01", 2019),
        ];

        let names: Vec<String> = departments(&records)
            .into_iter()
            .map(|(id, name)| format!("{id} {name}"))
            .collect();

        assert_eq!(names, vec!["01 Ain", "2A Corse-du-Sud", "75 Paris"]);
    }
}
