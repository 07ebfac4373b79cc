//! Modified Julian Date conversion and time-axis attachment.
//!
//! A dataset's time column moves through
//! `unpopulated → datetime → MJD` (and back via [`TimeConverter::revert_to_datetime`]).
//! The current state is tracked in [`FrequencyDataset::time_repr`] so a column
//! is never converted twice.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, Timelike, Weekday};

use super::error::TimeError;
use super::model::{
    FrequencyDataset, Series, TimeRepresentation, FREQUENCY_COLUMN, INDEX_LABEL, TIME_COLUMN,
};

/// JD of the MJD epoch (1858-11-17 00:00).
pub const MJD_OFFSET: f64 = 2_400_000.5;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;
const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for the wall-clock dependent operations.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Pure date arithmetic
// ---------------------------------------------------------------------------

/// Default start of the synthetic time axis: 1997-01-01 08:00:00.
pub fn default_anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1997, 1, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("1997-01-01 08:00:00 is a valid timestamp")
}

fn mjd_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1858, 11, 17)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("1858-11-17 00:00:00 is a valid timestamp")
}

/// Rounded MJD of `now` from the navipedia approximation
/// `JD = ⌊365.25·Y⌋ + ⌊30.6001·(M+1)⌋ + D + H/24 + 1720981.5`.
///
/// Only the hour enters the formula and January/February are not shifted
/// into the previous year, so this is a coarse "current day" bound rather
/// than an exact date conversion. Halves round to even.
pub fn today_mjd_at(now: NaiveDateTime) -> i64 {
    let year = f64::from(now.year());
    let month = f64::from(now.month());
    let jd = (365.25 * year).floor()
        + (30.6001 * (month + 1.0)).floor()
        + f64::from(now.day())
        + f64::from(now.hour()) / 24.0
        + 1_720_981.5;
    (jd - MJD_OFFSET).round_ties_even() as i64
}

/// Fractional Julian Date of a proleptic Gregorian timestamp.
pub fn julian_date(dt: NaiveDateTime) -> f64 {
    let (mut year, mut month) = (i64::from(dt.year()), i64::from(dt.month()));
    if month < 3 {
        year -= 1;
        month += 12;
    }
    let whole_days = i64::from(dt.day())
        + (153 * month - 457) / 5
        + 365 * year
        + year.div_euclid(4)
        - year.div_euclid(100)
        + year.div_euclid(400);
    let hours = f64::from(dt.hour())
        + f64::from(dt.minute()) / 60.0
        + (f64::from(dt.second()) + f64::from(dt.nanosecond()) / 1e9) / 3600.0;
    whole_days as f64 + 1_721_118.5 + hours / 24.0
}

/// MJD of a timestamp.
///
/// Equal to `julian_date(dt) − 2400000.5`, but counted from the MJD epoch so
/// the fraction keeps sub-microsecond precision.
pub fn mjd_from_datetime(dt: NaiveDateTime) -> f64 {
    let elapsed = dt.signed_duration_since(mjd_epoch());
    let days = elapsed.num_days();
    let rest = elapsed - Duration::days(days);
    days as f64 + rest.num_nanoseconds().unwrap_or_default() as f64 / NANOS_PER_DAY
}

/// Timestamp of an MJD value, at microsecond resolution.
pub fn mjd_to_datetime(mjd: f64) -> Result<NaiveDateTime, TimeError> {
    if !mjd.is_finite() {
        return Err(TimeError::OutOfRange(mjd));
    }
    let micros = (mjd * MICROS_PER_DAY).round();
    if micros.abs() > i64::MAX as f64 {
        return Err(TimeError::OutOfRange(mjd));
    }
    mjd_epoch()
        .checked_add_signed(Duration::microseconds(micros as i64))
        .ok_or(TimeError::OutOfRange(mjd))
}

/// Julian Dates of a datetime series.
///
/// Numeric input is rejected: an MJD float is indistinguishable from any
/// other number, so it is never reinterpreted as a timestamp here.
pub fn to_julian_dates(column: &str, series: &Series) -> Result<Vec<f64>, TimeError> {
    Ok(datetimes(column, series)?.iter().map(|&dt| julian_date(dt)).collect())
}

fn datetimes<'a>(column: &str, series: &'a Series) -> Result<&'a [NaiveDateTime], TimeError> {
    match series {
        Series::Datetime(values) => Ok(values),
        other => Err(TimeError::TypeConversion {
            column: column.to_string(),
            expected: "datetime",
            found: other.dtype(),
        }),
    }
}

fn first_business_day(year: i32, month: u32) -> Option<NaiveDate> {
    let mut day = NaiveDate::from_ymd_opt(year, month, 1)?;
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day = day.succ_opt()?;
    }
    Some(day)
}

/// `periods` timestamps on the first weekday of successive months, keeping
/// the time of day of `start`.
///
/// `start` itself is used when it already falls on its month's first
/// weekday; otherwise the sequence rolls forward to the next month start.
pub fn business_month_starts(start: NaiveDateTime, periods: usize) -> Vec<NaiveDateTime> {
    let Some(mut month) = start.date().with_day(1) else {
        return Vec::new();
    };
    let on_or_before_first = first_business_day(start.year(), start.month())
        .is_some_and(|first| start.date() <= first);
    if !on_or_before_first {
        month = match month.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => return Vec::new(),
        };
    }

    let mut out = Vec::with_capacity(periods);
    while out.len() < periods {
        let Some(day) = first_business_day(month.year(), month.month()) else {
            break;
        };
        out.push(day.and_time(start.time()));
        month = match month.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    out
}

/// Rescale values that lost their decimal place on load.
///
/// All below 1 are multiplied by 10; then, independently, all above 10 are
/// multiplied by 0.01. Returns whether anything changed.
pub fn normalize_scale(values: &mut [f64]) -> bool {
    let mut changed = false;
    if values.iter().all(|&v| v < 1.0) {
        values.iter_mut().for_each(|v| *v *= 1e1);
        changed = true;
    }
    if values.iter().all(|&v| v > 10.0) {
        values.iter_mut().for_each(|v| *v *= 1e-2);
        changed = true;
    }
    changed
}

// ---------------------------------------------------------------------------
// TimeConverter
// ---------------------------------------------------------------------------

/// Time-axis operations over a [`FrequencyDataset`].
#[derive(Debug, Clone)]
pub struct TimeConverter<C = SystemClock> {
    clock: C,
    anchor: NaiveDateTime,
}

impl TimeConverter<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TimeConverter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimeConverter<C> {
    pub fn with_clock(clock: C) -> Self {
        TimeConverter {
            clock,
            anchor: default_anchor(),
        }
    }

    /// Start the synthetic time axis at `anchor` instead of the default.
    pub fn with_anchor(mut self, anchor: NaiveDateTime) -> Self {
        self.anchor = anchor;
        self
    }

    /// Today's MJD from this converter's clock.
    pub fn today_mjd(&self) -> i64 {
        today_mjd_at(self.clock.now())
    }

    /// Whether every value of a numeric series lies in `(0, today_mjd]`.
    ///
    /// Non-numeric and empty series are never MJD.
    pub fn is_mjd(&self, series: &Series) -> bool {
        if !series.is_numeric() || series.is_empty() {
            return false;
        }
        let Some(values) = series.as_f64_vec() else {
            return false;
        };
        let today = self.today_mjd() as f64;
        values.iter().all(|&v| v > 0.0 && v <= today)
    }

    /// Normalize the first column's scale, attach the synthetic `time`
    /// column and label the index `DataPoint`.
    pub fn populate(&self, dataset: &mut FrequencyDataset) -> Result<(), TimeError> {
        let first = dataset
            .columns
            .first()
            .ok_or_else(|| TimeError::MissingColumn(FREQUENCY_COLUMN.to_string()))?;
        let mut values = first
            .values
            .as_f64_vec()
            .ok_or_else(|| TimeError::TypeConversion {
                column: first.name.clone(),
                expected: "numeric",
                found: first.values.dtype(),
            })?;
        let rescaled = normalize_scale(&mut values);

        // Nothing is written until the whole time axis fits.
        let rows = values.len();
        let times = business_month_starts(self.anchor, rows);
        if times.len() != rows {
            return Err(TimeError::TimeAxisOverflow {
                anchor: self.anchor,
                rows,
                available: times.len(),
            });
        }

        if rescaled {
            log::debug!("Rescaled column '{}' ({rows} rows)", first.name);
            dataset.columns[0].values = Series::Float(values);
        }
        dataset.set_column(TIME_COLUMN, Series::Datetime(times));
        dataset.index_name = Some(INDEX_LABEL.to_string());
        dataset.time_repr = Some(TimeRepresentation::Datetime);
        Ok(())
    }

    /// Replace the datetime `time` column with MJD floats.
    pub fn convert_to_mjd(&self, dataset: &mut FrequencyDataset) -> Result<(), TimeError> {
        if dataset.time_repr == Some(TimeRepresentation::Mjd) {
            return Err(TimeError::AlreadyInRepresentation {
                column: TIME_COLUMN.to_string(),
                representation: TimeRepresentation::Mjd,
            });
        }
        let series = dataset
            .column(TIME_COLUMN)
            .ok_or_else(|| TimeError::MissingColumn(TIME_COLUMN.to_string()))?;

        let mjd: Vec<f64> = datetimes(TIME_COLUMN, series)?
            .iter()
            .map(|&dt| mjd_from_datetime(dt))
            .collect();
        log::info!("Converted {} timestamps to MJD", mjd.len());

        dataset.set_column(TIME_COLUMN, Series::Float(mjd));
        dataset.time_repr = Some(TimeRepresentation::Mjd);
        Ok(())
    }

    /// Turn an MJD `time` column back into timestamps.
    pub fn revert_to_datetime(&self, dataset: &mut FrequencyDataset) -> Result<(), TimeError> {
        if dataset.time_repr == Some(TimeRepresentation::Datetime) {
            return Err(TimeError::AlreadyInRepresentation {
                column: TIME_COLUMN.to_string(),
                representation: TimeRepresentation::Datetime,
            });
        }
        let series = dataset
            .column(TIME_COLUMN)
            .ok_or_else(|| TimeError::MissingColumn(TIME_COLUMN.to_string()))?;
        let values = series.as_f64_vec().ok_or_else(|| TimeError::TypeConversion {
            column: TIME_COLUMN.to_string(),
            expected: "numeric",
            found: series.dtype(),
        })?;

        let times = values
            .into_iter()
            .map(mjd_to_datetime)
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Reverted {} MJD values to timestamps", times.len());

        dataset.set_column(TIME_COLUMN, Series::Datetime(times));
        dataset.time_repr = Some(TimeRepresentation::Datetime);
        Ok(())
    }
}
