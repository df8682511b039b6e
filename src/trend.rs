//! Illustrative trend series for the "Tendencias Históricas" tab.
//!
//! This is decoration, not analysis: only one real value exists, so the
//! three earlier quarterly points are fabricated around it and the chart
//! caption says so. Only the first chartable key analyte is plotted.

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::models::Analyte;

/// Analytes worth charting. Case-insensitive substring match against the
/// extracted name, so "Colesterol Total (suero)" still qualifies.
pub const KEY_CHART_ANALYTES: &[&str] = &[
    "Glucose",
    "Cholesterol, Total",
    "LDL",
    "HDL",
    "Triglycerides",
    "Hemoglobin A1c",
    "Glucosa",
    "Colesterol Total",
];

/// Number of quarterly points in the synthetic series.
pub const TREND_POINTS: usize = 4;

/// Shown when nothing in the report matches [`KEY_CHART_ANALYTES`].
pub const NO_CHART_DATA_MESSAGE: &str =
    "Las tendencias históricas se pueden mostrar para analitos clave como Glucosa, \
     Colesterol, etc. No se encontraron en este informe.";

/// Spanish month abbreviations, es-ES style.
const SPANISH_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// One synthetic point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Quarter label, e.g. "sept 2025".
    pub date: String,
    pub value: f64,
}

/// A single-analyte synthetic series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub analyte_name: String,
    pub unit: String,
    pub points: Vec<TrendPoint>,
}

/// Build the synthetic series for the first chartable analyte, or `None`
/// when the report has no chartable data.
pub fn synthesize_trend(
    analytes: &[Analyte],
    today: NaiveDate,
    rng: &mut impl Rng,
) -> Option<TrendSeries> {
    let (analyte, current_value) = analytes.iter().find_map(|a| {
        let matches_key = KEY_CHART_ANALYTES
            .iter()
            .any(|key| a.name.to_lowercase().contains(&key.to_lowercase()));
        let value = parse_leading_f64(&a.value)?;
        matches_key.then_some((a, value))
    })?;

    let mut points = Vec::with_capacity(TREND_POINTS);
    for i in (0..TREND_POINTS).rev() {
        let date = today
            .checked_sub_months(Months::new(3 * i as u32))
            .unwrap_or(today);

        // Fabricated fluctuation, shrinking toward the present; the last
        // point is the real value, untouched.
        let value = if i == 0 {
            current_value
        } else {
            let fluctuation = (rng.gen::<f64>() - 0.5) * (current_value * 0.1);
            let raw = current_value + fluctuation * (TREND_POINTS - i) as f64;
            (raw * 100.0).round() / 100.0
        };

        points.push(TrendPoint {
            date: quarter_label(date),
            value,
        });
    }

    Some(TrendSeries {
        analyte_name: analyte.name.clone(),
        unit: analyte.unit.clone(),
        points,
    })
}

/// "sept 2025"-style label.
fn quarter_label(date: NaiveDate) -> String {
    let month = SPANISH_MONTHS[date.month0() as usize];
    format!("{month} {}", date.year())
}

/// Parse the leading numeric prefix of a value string, `parseFloat`-style:
/// "110 mg/dL" → 110, "5.4*" → 5.4. Qualitative results yield `None`.
fn parse_leading_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        let acceptable = ch.is_ascii_digit()
            || ch == '.'
            || (idx == 0 && (ch == '-' || ch == '+'));
        if acceptable {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse().ok()
}
