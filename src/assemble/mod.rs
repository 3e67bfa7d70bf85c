// src/assemble/mod.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{
    COLUMN_CURRENCY, COLUMN_DATE, COLUMN_METRO_NAME, COLUMN_STATE_ABBREVIATION, COLUMN_STATE_NAME, COLUMN_UNIT,
    CURRENCY, UNIT,
};
use crate::extractors::JurisdictionRef;

/// Which table a run produces; also names its output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DatasetKind {
    /// One row per state
    State,
    /// One row per metro area, across every state
    Metro,
}

impl DatasetKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            DatasetKind::State => "state-daily-averages",
            DatasetKind::Metro => "metro-daily-averages",
        }
    }

    pub fn identity_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::State => &[COLUMN_STATE_NAME, COLUMN_STATE_ABBREVIATION],
            DatasetKind::Metro => &[COLUMN_STATE_NAME, COLUMN_STATE_ABBREVIATION, COLUMN_METRO_NAME],
        }
    }
}

/// The one header rename the source needs.
pub fn normalize_grade_label(label: &str) -> String {
    match label {
        "Mid" => "Mid-Grade".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct PriceRecord {
    pub jurisdiction: JurisdictionRef,
    pub metro: Option<String>,
    pub prices: Vec<(String, Decimal)>, // grade label -> price, header order
    pub currency: String,
    pub unit: String,
    pub date: NaiveDate,
}

impl PriceRecord {
    /// Zips grade labels with prices (the shorter side wins) and attaches the
    /// fixed currency/unit labels.
    pub fn assemble(
        jurisdiction: &JurisdictionRef,
        metro: Option<&str>,
        grades: &[String],
        prices: &[Decimal],
        date: NaiveDate,
    ) -> Self {
        if grades.len() != prices.len() {
            tracing::debug!(
                "{}{}: {} grade labels for {} prices",
                jurisdiction.abbreviation,
                metro.map(|m| format!(" / {}", m)).unwrap_or_default(),
                grades.len(),
                prices.len()
            );
        }

        Self {
            jurisdiction: jurisdiction.clone(),
            metro: metro.map(str::to_string),
            prices: grades
                .iter()
                .zip(prices)
                .map(|(grade, price)| (normalize_grade_label(grade), *price))
                .collect(),
            currency: CURRENCY.to_string(),
            unit: UNIT.to_string(),
            date,
        }
    }

    pub fn price(&self, grade: &str) -> Option<Decimal> {
        self.prices.iter().find(|(label, _)| label == grade).map(|(_, price)| *price)
    }

    /// Cell text for a column, `None` when this record has no such column.
    pub fn value(&self, column: &str) -> Option<String> {
        match column {
            COLUMN_STATE_NAME => Some(self.jurisdiction.name.clone()),
            COLUMN_STATE_ABBREVIATION => Some(self.jurisdiction.abbreviation.clone()),
            COLUMN_METRO_NAME => self.metro.clone(),
            COLUMN_CURRENCY => Some(self.currency.clone()),
            COLUMN_UNIT => Some(self.unit.clone()),
            COLUMN_DATE => Some(self.date.format("%Y-%m-%d").to_string()),
            grade => self.price(grade).map(|price| price.to_string()),
        }
    }
}

/// All records of one run; they share the effective date.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub date: NaiveDate,
    pub records: Vec<PriceRecord>,
}

impl Dataset {
    pub fn new(kind: DatasetKind, date: NaiveDate) -> Self {
        Self {
            kind,
            date,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: PriceRecord) {
        debug_assert_eq!(record.date, self.date);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identity columns, every grade label in first-seen order, then the context columns.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.kind.identity_columns().iter().map(|c| c.to_string()).collect();
        for record in &self.records {
            for (grade, _) in &record.prices {
                if !columns.contains(grade) {
                    columns.push(grade.clone());
                }
            }
        }
        columns.extend([COLUMN_CURRENCY, COLUMN_UNIT, COLUMN_DATE].map(String::from));
        columns
    }
}
