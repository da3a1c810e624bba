//! Risk-free rate series, quoted in percent (e.g. 5.3 = 5.3%).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::panel::DataIntegrityError;

/// Date-indexed scalar risk-free rate.
///
/// Stored as an ordered map so lookups by date are direct; the signal
/// engine reads the rate at each window-end date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSeries {
    rates: BTreeMap<NaiveDate, f64>,
}

impl RateSeries {
    pub fn new(entries: Vec<(NaiveDate, f64)>) -> Result<Self, DataIntegrityError> {
        if entries.is_empty() {
            return Err(DataIntegrityError::EmptyDates);
        }
        let mut rates = BTreeMap::new();
        for (i, (date, rate)) in entries.iter().enumerate() {
            if rates.insert(*date, *rate).is_some() {
                return Err(DataIntegrityError::NonMonotonicDates {
                    position: i,
                    prev: *date,
                    next: *date,
                });
            }
        }
        Ok(Self { rates })
    }

    /// Rate in percent at `date`, if quoted.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.rates.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
