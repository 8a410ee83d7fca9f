//! Day × hour staffing-demand heatmap.
//!
//! Demand per cell is a fixed weekday/weekend shape with a small random
//! jitter, scaled by the peak factor and an optional Ramadan shift. Staff
//! counts are read off the adjusted demand at 15 FOH / 10 BOH per unit.

use crate::calendar::{day_name, WEEK};
use crate::insight::percent_of;
use crate::EngineError;
use chrono::Weekday;
use outlet_core::ValidationError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

/// Opening hours covered by the heatmap, 08:00 to 23:00.
pub const HOURS: RangeInclusive<u32> = 8..=23;

const JITTER: f64 = 0.1;
const FOH_PER_UNIT: f64 = 15.0;
const BOH_PER_UNIT: f64 = 10.0;
const CORE_SHARE: f64 = 0.7;

/// Hours that keep most of their demand during Ramadan.
const RAMADAN_EVENING: RangeInclusive<u32> = 19..=23;
const RAMADAN_EVENING_FACTOR: f64 = 0.9;
const RAMADAN_DAYTIME_FACTOR: f64 = 0.6;

const LUNCH_HOURS: RangeInclusive<u32> = 12..=14;
const DINNER_HOURS: RangeInclusive<u32> = 18..=21;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakHourParams {
    /// Display filters; the grid always covers every day and staff type.
    #[serde(default)]
    pub selected_day: Option<String>,
    #[serde(default)]
    pub selected_staff_type: Option<String>,
    pub peak_factor: f64,
    #[serde(default)]
    pub apply_ramadan: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub hour: u32,
    pub value: f64,
    pub adjusted_value: f64,
    pub foh: u32,
    pub boh: u32,
}

impl HeatCell {
    pub fn total(&self) -> u32 {
        self.foh + self.boh
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    pub day: String,
    pub cells: Vec<HeatCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub day: String,
    pub foh: u32,
    pub boh: u32,
    pub total: u32,
    pub peak: u32,
}

/// Seven-day average for one hour, plus that hour's busiest cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HourAverages {
    pub hour: u32,
    pub foh: u32,
    pub boh: u32,
    pub total: u32,
    pub peak: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallRequirement {
    pub foh: u32,
    pub boh: u32,
    pub total: u32,
    pub peak_foh: u32,
    pub peak_boh: u32,
    pub peak_total: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakHourReport {
    pub heatmap: Vec<DayRow>,
    pub by_day: Vec<DayTotals>,
    pub by_hour: Vec<HourAverages>,
    pub overall: OverallRequirement,
    pub peak_day: String,
    pub peak_hour: u32,
    pub insights: Vec<String>,
    pub optimization_opportunities: Vec<String>,
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

/// Unjittered demand for a cell.
fn base_demand(day: Weekday, hour: u32) -> f64 {
    if is_weekend(day) {
        match hour {
            11..=15 => 0.85,
            18..=22 => 1.0,
            _ => 0.5,
        }
    } else {
        match hour {
            12..=14 => 0.8,
            18..=21 => 0.9,
            _ => 0.4,
        }
    }
}

fn adjust(value: f64, hour: u32, p: &PeakHourParams) -> f64 {
    let mut adjusted = value * p.peak_factor;
    if p.apply_ramadan {
        adjusted *= if RAMADAN_EVENING.contains(&hour) {
            RAMADAN_EVENING_FACTOR
        } else {
            RAMADAN_DAYTIME_FACTOR
        };
    }
    adjusted.clamp(0.0, 1.0)
}

fn rounded_mean(sum: u32, n: u32) -> u32 {
    (f64::from(sum) / f64::from(n)).round() as u32
}

/// Index of the first maximal element.
fn first_max<I: IntoIterator<Item = u32>>(values: I) -> usize {
    let mut best = (0, None);
    for (i, v) in values.into_iter().enumerate() {
        if best.1.map_or(true, |b| v > b) {
            best = (i, Some(v));
        }
    }
    best.0
}

/// Build the heatmap and its aggregates.
///
/// Draws one value from `rng` per cell, Monday 08:00 first, hour-major
/// within each day.
pub fn analyze_peak_hours<R: Rng + ?Sized>(
    p: &PeakHourParams,
    rng: &mut R,
) -> Result<PeakHourReport, EngineError> {
    if !p.peak_factor.is_finite() {
        return Err(ValidationError::NonFinite("peak_factor").into());
    }
    if p.peak_factor < 0.0 {
        return Err(ValidationError::Negative("peak_factor").into());
    }

    let heatmap: Vec<DayRow> = WEEK
        .iter()
        .map(|&day| DayRow {
            day: day_name(day).to_string(),
            cells: HOURS
                .map(|hour| {
                    let jitter = rng.gen::<f64>() * JITTER * 2.0 - JITTER;
                    let value = (base_demand(day, hour) + jitter).clamp(0.0, 1.0);
                    let adjusted_value = adjust(value, hour, p);
                    HeatCell {
                        hour,
                        value,
                        adjusted_value,
                        foh: (adjusted_value * FOH_PER_UNIT).round() as u32,
                        boh: (adjusted_value * BOH_PER_UNIT).round() as u32,
                    }
                })
                .collect(),
        })
        .collect();

    let by_day: Vec<DayTotals> = heatmap
        .iter()
        .map(|row| DayTotals {
            day: row.day.clone(),
            foh: row.cells.iter().map(|c| c.foh).sum(),
            boh: row.cells.iter().map(|c| c.boh).sum(),
            total: row.cells.iter().map(HeatCell::total).sum(),
            peak: row.cells.iter().map(HeatCell::total).max().unwrap_or(0),
        })
        .collect();

    let days = heatmap.len() as u32;
    let mut hour_sums = Vec::new();
    let by_hour: Vec<HourAverages> = HOURS
        .enumerate()
        .map(|(slot, hour)| {
            let cells = || heatmap.iter().map(move |row| row.cells[slot]);
            let total: u32 = cells().map(|c| c.total()).sum();
            hour_sums.push(total);
            HourAverages {
                hour,
                foh: rounded_mean(cells().map(|c| c.foh).sum(), days),
                boh: rounded_mean(cells().map(|c| c.boh).sum(), days),
                total: rounded_mean(total, days),
                peak: cells().map(|c| c.total()).max().unwrap_or(0),
            }
        })
        .collect();

    let hours = by_hour.len() as u32;
    let all_cells = || heatmap.iter().flat_map(|row| row.cells.iter());
    let foh = rounded_mean(by_hour.iter().map(|h| h.foh).sum(), hours);
    let boh = rounded_mean(by_hour.iter().map(|h| h.boh).sum(), hours);
    let overall = OverallRequirement {
        foh,
        boh,
        total: foh + boh,
        peak_foh: all_cells().map(|c| c.foh).max().unwrap_or(0),
        peak_boh: all_cells().map(|c| c.boh).max().unwrap_or(0),
        peak_total: all_cells().map(HeatCell::total).max().unwrap_or(0),
    };

    let peak_day = by_day[first_max(by_day.iter().map(|d| d.peak))].day.clone();
    let peak_hour = by_hour[first_max(hour_sums.iter().copied())].hour;

    debug!(
        peak_factor = p.peak_factor,
        ramadan = p.apply_ramadan,
        %peak_day,
        peak_hour,
        "peak hours analyzed"
    );

    let insights = insights(&by_day, &by_hour, &overall, &peak_day, peak_hour);
    let optimization_opportunities = opportunities(&overall);

    Ok(PeakHourReport {
        heatmap,
        by_day,
        by_hour,
        overall,
        peak_day,
        peak_hour,
        insights,
        optimization_opportunities,
    })
}

fn mean_total<'a, I: Iterator<Item = &'a u32>>(totals: I) -> f64 {
    let (sum, n) = totals.fold((0u32, 0u32), |(s, n), t| (s + t, n + 1));
    if n == 0 {
        0.0
    } else {
        f64::from(sum) / f64::from(n)
    }
}

fn window_average(by_hour: &[HourAverages], window: RangeInclusive<u32>) -> u32 {
    mean_total(
        by_hour
            .iter()
            .filter(|h| window.contains(&h.hour))
            .map(|h| &h.total),
    )
    .round() as u32
}

fn insights(
    by_day: &[DayTotals],
    by_hour: &[HourAverages],
    overall: &OverallRequirement,
    peak_day: &str,
    peak_hour: u32,
) -> Vec<String> {
    let weekend = mean_total(
        WEEK.iter()
            .zip(by_day)
            .filter(|(d, _)| is_weekend(**d))
            .map(|(_, t)| &t.total),
    );
    let weekday = mean_total(
        WEEK.iter()
            .zip(by_day)
            .filter(|(d, _)| !is_weekend(**d))
            .map(|(_, t)| &t.total),
    );
    let uplift = match percent_of(weekend - weekday, weekday) {
        Some(v) => format!("{v:.0}"),
        None => "n/a".to_string(),
    };
    let ratio = if overall.foh == 0 {
        "n/a".to_string()
    } else {
        format!("{:.2}", f64::from(overall.boh) / f64::from(overall.foh))
    };

    vec![
        format!("Peak staffing requirements occur on {peak_day} at {peak_hour}:00"),
        format!("Weekend staffing needs are {uplift}% higher than weekdays"),
        format!(
            "Lunch peak requires {} staff on average",
            window_average(by_hour, LUNCH_HOURS)
        ),
        format!(
            "Dinner peak requires {} staff on average",
            window_average(by_hour, DINNER_HOURS)
        ),
        format!("The ratio of BOH to FOH staff is {ratio}"),
    ]
}

fn opportunities(overall: &OverallRequirement) -> Vec<String> {
    let core_exact = f64::from(overall.total) * CORE_SHARE;
    let core = core_exact.round() as i64;
    let flex = (f64::from(overall.peak_total) - core_exact).round() as i64;
    vec![
        "Consider staggered shifts to cover peak hours more efficiently".to_string(),
        "Implement split shifts for staff during lunch and dinner peaks".to_string(),
        "Cross-train staff to flex between positions during peak hours".to_string(),
        format!("Schedule {core} core staff for all shifts and {flex} flex staff for peak hours"),
        "Adjust BOH prep schedule to align with peak service hours".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    fn params(peak_factor: f64, apply_ramadan: bool) -> PeakHourParams {
        PeakHourParams {
            selected_day: None,
            selected_staff_type: None,
            peak_factor,
            apply_ramadan,
        }
    }

    /// A generator whose `gen::<f64>()` is always 0.5, i.e. zero jitter.
    fn no_jitter() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    #[test]
    fn grid_is_seven_by_sixteen() {
        let r = analyze_peak_hours(&params(1.0, false), &mut seeded_rng(42)).unwrap();
        assert_eq!(r.heatmap.len(), 7);
        assert!(r.heatmap.iter().all(|d| d.cells.len() == 16));
        assert_eq!(r.heatmap[0].day, "Monday");
        assert_eq!(r.heatmap[0].cells[0].hour, 8);
        assert_eq!(r.heatmap[6].cells[15].hour, 23);
    }

    #[test]
    fn unjittered_cells_follow_day_shapes() {
        let r = analyze_peak_hours(&params(1.0, false), &mut no_jitter()).unwrap();
        let monday = &r.heatmap[0].cells;
        let friday = &r.heatmap[4].cells;
        // 08:00 weekday, 12:00 weekday lunch, 19:00 weekday dinner
        assert!((monday[0].value - 0.4).abs() < 1e-9);
        assert_eq!((monday[4].foh, monday[4].boh), (12, 8));
        assert_eq!((monday[11].foh, monday[11].boh), (14, 9));
        // 11:00 weekend lunch, 22:00 weekend dinner
        assert_eq!((friday[3].foh, friday[3].boh), (13, 9));
        assert_eq!((friday[14].foh, friday[14].boh), (15, 10));
        assert_eq!(r.peak_day, "Friday");
        assert_eq!(r.peak_hour, 18);
    }

    #[test]
    fn ramadan_shifts_demand_to_evening() {
        let r = analyze_peak_hours(&params(1.0, true), &mut no_jitter()).unwrap();
        let friday = &r.heatmap[4].cells;
        // 12:00 weekend lunch 0.85 × 0.6, 20:00 weekend dinner 1.0 × 0.9
        assert!((friday[4].adjusted_value - 0.51).abs() < 1e-9);
        assert!((friday[12].adjusted_value - 0.9).abs() < 1e-9);
        assert_eq!(r.peak_hour, 19);
    }

    #[test]
    fn aggregates_are_consistent() {
        let r = analyze_peak_hours(&params(1.2, false), &mut seeded_rng(5)).unwrap();
        for (row, totals) in r.heatmap.iter().zip(&r.by_day) {
            let sum: u32 = row.cells.iter().map(HeatCell::total).sum();
            assert_eq!(totals.total, sum);
            assert_eq!(totals.foh + totals.boh, totals.total);
        }
        assert_eq!(r.overall.total, r.overall.foh + r.overall.boh);
        assert!(r.overall.peak_total <= 25);
        assert_eq!(r.by_hour.len(), 16);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let a = analyze_peak_hours(&params(1.0, true), &mut seeded_rng(9)).unwrap();
        let b = analyze_peak_hours(&params(1.0, true), &mut seeded_rng(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_peak_factor_yields_na_ratios() {
        let r = analyze_peak_hours(&params(0.0, false), &mut seeded_rng(1)).unwrap();
        assert_eq!(r.overall.peak_total, 0);
        assert_eq!(r.insights[1], "Weekend staffing needs are n/a% higher than weekdays");
        assert_eq!(r.insights[4], "The ratio of BOH to FOH staff is n/a");
        assert_eq!(r.peak_day, "Monday");
        assert_eq!(r.peak_hour, 8);
    }

    #[test]
    fn invalid_peak_factor_is_rejected() {
        assert!(matches!(
            analyze_peak_hours(&params(-1.0, false), &mut seeded_rng(1)),
            Err(EngineError::Validation(ValidationError::Negative("peak_factor")))
        ));
        assert!(analyze_peak_hours(&params(f64::INFINITY, false), &mut seeded_rng(1)).is_err());
    }

    #[test]
    fn core_and_flex_split() {
        let o = OverallRequirement {
            foh: 6,
            boh: 4,
            total: 10,
            peak_foh: 15,
            peak_boh: 10,
            peak_total: 25,
        };
        assert_eq!(
            opportunities(&o)[3],
            "Schedule 7 core staff for all shifts and 18 flex staff for peak hours"
        );
    }

    proptest! {
        #[test]
        fn cells_stay_in_unit_range(seed in any::<u64>(),
                                    peak in 0.0f64..3.0,
                                    ramadan in any::<bool>()) {
            let r = analyze_peak_hours(&params(peak, ramadan), &mut seeded_rng(seed)).unwrap();
            for c in r.heatmap.iter().flat_map(|d| d.cells.iter()) {
                prop_assert!((0.0..=1.0).contains(&c.value));
                prop_assert!((0.0..=1.0).contains(&c.adjusted_value));
                prop_assert!(c.foh <= 15 && c.boh <= 10);
            }
        }
    }
}
