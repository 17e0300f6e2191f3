use crate::error::Result;
use crate::models::{DailyAverage, EmittedRecord};
use crate::pipeline::DATE_FORMAT;
use chrono::{NaiveDate, NaiveDateTime};
use csv::Writer;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

pub fn write_records<P: AsRef<Path>>(records: &[EmittedRecord], path: P) -> Result<()> {
    let mut writer = Writer::from_path(path.as_ref())?;
    if records.is_empty() {
        writer.write_record(["Date", "College Name", "Acceptance Rate"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Wrote {} records to {}", records.len(), path.as_ref().display());
    Ok(())
}

pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<EmittedRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize::<EmittedRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Mean acceptance rate per calendar day, truncated toward zero. Records with
/// no date or a non-numeric rate are skipped.
pub fn daily_averages(records: &[EmittedRecord]) -> Vec<DailyAverage> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();

    for record in records {
        let Ok(timestamp) = NaiveDateTime::parse_from_str(&record.date, DATE_FORMAT) else {
            warn!("Skipping record with unusable date {:?}", record.date);
            continue;
        };
        let Ok(rate) = record.acceptance_rate.trim().trim_end_matches('%').parse::<f64>() else {
            warn!(
                "Skipping non-numeric acceptance rate {:?} for {}",
                record.acceptance_rate, record.college_name
            );
            continue;
        };
        by_day
            .entry(timestamp.date())
            .or_insert_with(Vec::new)
            .push(rate);
    }

    by_day
        .into_iter()
        .map(|(day, rates)| {
            let mean = rates.iter().sum::<f64>() / rates.len() as f64;
            DailyAverage {
                date: day.format("%Y-%m-%d").to_string(),
                acceptance_rate: mean.trunc() as i64,
            }
        })
        .collect()
}

pub fn write_daily_averages<P: AsRef<Path>>(averages: &[DailyAverage], path: P) -> Result<()> {
    let mut writer = Writer::from_path(path.as_ref())?;
    if averages.is_empty() {
        writer.write_record(["Date", "Acceptance Rate"])?;
    }
    for average in averages {
        writer.serialize(average)?;
    }
    writer.flush()?;
    Ok(())
}
