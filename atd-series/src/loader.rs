//! Series Loader: raw ride rows to a clean, fixed-cadence history series.

use crate::config::LoaderConfig;
use crate::error::{Result, SeriesError};
use crate::grid::GridRange;
use crate::model::{DemandPoint, DemandSeries, RawRideRow, RideRecord, CATEGORY_COUNT};
use crate::repair::{repair, CategoryRow};
use crate::smoother::{clip_negative, smooth};
use crate::source::RideSource;
use atd_utils::dates::floor_to_step;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Load the observed demand for the window ending one step before
/// `reference_time`.
///
/// The returned series covers `[reference - window - step, reference - step]`
/// with exactly `window / step + 1` points. Per-category bucket values
/// above the outlier threshold are treated as missing, gaps are forward
/// filled (using `lookback_hours` of older rows), the categories are summed,
/// optionally smoothed and finally clipped at zero. A final bucket without
/// rows is reported as zero.
pub fn load_history<S: RideSource + ?Sized>(
    source: &S,
    reference_time: NaiveDateTime,
    config: &LoaderConfig,
) -> Result<DemandSeries> {
    let step = config.step();
    let reference_time = floor_to_step(reference_time, config.step_minutes);
    let end = reference_time - step;
    let start = end - config.window();
    let fetch_start = start - config.lookback();

    let rows = source.fetch_rides(fetch_start.date())?;
    log::info!(
        "[ATD] loader: fetched {} ride rows since {}",
        rows.len(),
        fetch_start.date()
    );

    let records = parse_sorted(&rows)?;
    let buckets = aggregate(&records, fetch_start, end, config.step_minutes);

    if buckets.range(start..=end).next().is_none() {
        log::warn!("[ATD] loader: no ride rows between {} and {}", start, end);
        return Err(SeriesError::DataUnavailable { start, end });
    }

    let grid: Vec<NaiveDateTime> = GridRange::new(fetch_start, end, step).collect();
    let table: Vec<CategoryRow> = grid
        .iter()
        .map(|t| match buckets.get(t) {
            Some(counts) => counts.map(Some),
            None => [None; CATEGORY_COUNT],
        })
        .collect();
    let repaired = repair(&table, config.outlier_threshold);

    let mut points: Vec<DemandPoint> = grid
        .iter()
        .zip(repaired.iter())
        .filter(|(t, _)| **t >= start)
        .map(|(t, counts)| DemandPoint::new(*t, counts.iter().map(|&c| f64::from(c)).sum()))
        .collect();

    if !buckets.contains_key(&end) {
        log::debug!("[ATD] loader: no rows for final bucket {}, using zero", end);
        if let Some(last) = points.last_mut() {
            last.value = 0.0;
        }
    }

    let mut values: Vec<f64> = points.iter().map(|p| p.value).collect();
    if config.smoothing.is_enabled() {
        values = smooth(&values, config.smoothing)?;
    }
    clip_negative(&mut values);
    for (point, value) in points.iter_mut().zip(values) {
        point.value = value;
    }

    let series = DemandSeries::from_points(step, points)?;
    log::debug!(
        "[ATD] loader: history series {} .. {} ({} points)",
        start,
        end,
        series.len()
    );
    Ok(series)
}

/// Parse every row and sort chronologically. Rows repeating an earlier
/// date and time are dropped (first occurrence wins).
fn parse_sorted(rows: &[RawRideRow]) -> Result<Vec<RideRecord>> {
    let mut records = rows
        .iter()
        .map(RideRecord::try_from)
        .collect::<Result<Vec<_>>>()?;

    // Stable, so the first occurrence of a timestamp stays first.
    records.sort_by_key(|r| r.time);
    let before = records.len();
    records.dedup_by_key(|r| r.time);
    if records.len() < before {
        log::warn!(
            "[ATD] loader: dropped {} duplicate ride rows",
            before - records.len()
        );
    }
    Ok(records)
}

/// Sum each category per bucket for records falling in `[from, to]`.
/// Sums saturate at `u32::MAX`, which the outlier rule then discards.
fn aggregate(
    records: &[RideRecord],
    from: NaiveDateTime,
    to: NaiveDateTime,
    step_minutes: u32,
) -> BTreeMap<NaiveDateTime, [u32; CATEGORY_COUNT]> {
    let mut buckets: BTreeMap<NaiveDateTime, [u32; CATEGORY_COUNT]> = BTreeMap::new();
    for record in records {
        let bucket = floor_to_step(record.time, step_minutes);
        if bucket < from || bucket > to {
            continue;
        }
        let entry = buckets.entry(bucket).or_insert([0; CATEGORY_COUNT]);
        for (total, count) in entry.iter_mut().zip(record.counts.iter()) {
            *total = total.saturating_add(*count);
        }
    }
    buckets
}
