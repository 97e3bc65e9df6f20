//! Regular grid resampling of profile tables.
//!
//! A depth cast logs readings at whatever depths the sonde passed through.
//! This module lays a uniform grid over the observed index range, averages
//! readings that share an index value and interpolates every numeric
//! column linearly onto the grid. Grid points outside the observed range
//! are left null.

use crate::config::ResampleOptions;
use crate::constants::MAX_GRID_POINTS;
use crate::error::{KorexoError, Result};
use polars::prelude::*;
use tracing::debug;

/// Resample every numeric column of `df` onto a regular grid of `index_column`.
///
/// The output starts with the grid itself under the index column name,
/// followed by one Float64 column per numeric input column. Non-numeric
/// columns are dropped.
pub fn resample(df: &DataFrame, index_column: &str, options: &ResampleOptions) -> Result<DataFrame> {
    options.validate()?;

    let index = df
        .column(index_column)
        .map_err(|_| KorexoError::MissingColumn {
            name: index_column.to_string(),
        })?
        .as_materialized_series();

    if !index.dtype().is_primitive_numeric() {
        return Err(KorexoError::invalid_resample(format!(
            "index column '{}' has non-numeric type {}",
            index_column,
            index.dtype()
        )));
    }

    let index_values = finite_values(index)?;
    let (min, max) = observed_range(&index_values).ok_or_else(|| {
        KorexoError::invalid_resample(format!(
            "index column '{}' has no finite values",
            index_column
        ))
    })?;

    let grid = build_grid(min, max, options)?;
    debug!(
        "Resampling on '{}': observed [{}, {}], grid [{}, {}] with {} points",
        index_column,
        min,
        max,
        grid.first().copied().unwrap_or(f64::NAN),
        grid.last().copied().unwrap_or(f64::NAN),
        grid.len()
    );

    let mut columns = vec![Column::new(index_column.into(), grid.as_slice())];

    for column in df.get_columns() {
        if column.name().as_str() == index_column || !column.dtype().is_primitive_numeric() {
            continue;
        }

        let values = finite_values(column.as_materialized_series())?;
        let (xs, ys) = group_means(&index_values, &values);
        let resampled: Vec<Option<f64>> = grid.iter().map(|&x| interpolate(&xs, &ys, x)).collect();

        columns.push(Column::new(column.name().clone(), resampled));
    }

    Ok(DataFrame::new(columns)?)
}

/// Values as f64, with nulls and non-finite entries as `None`
fn finite_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn observed_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |range, &v| match range {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Round half to even at `precision` decimal places
fn round_to(value: f64, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    (value * scale).round_ties_even() / scale
}

/// Step-aligned grid bounds enclosing `[min, max]`.
///
/// Starting one unit outside the rounded extreme, walk towards the data
/// in `step` increments until reaching it, then step back out once.
pub fn grid_bounds(min: f64, max: f64, options: &ResampleOptions) -> Result<(f64, f64)> {
    let step = options.step;
    let lo_start = min.round_ties_even() - 1.0;
    let hi_start = max.round_ties_even() + 1.0;
    check_walk(lo_start, hi_start, step)?;

    let mut lo = lo_start;
    while lo < min {
        lo += step;
    }
    let lo = round_to(lo - step, options.precision);

    let mut hi = hi_start;
    while hi > max {
        hi -= step;
    }
    let hi = round_to(hi + step, options.precision);

    Ok((lo, hi))
}

/// Both walks must move at every step and stay within the grid size limit
fn check_walk(lo_start: f64, hi_start: f64, step: f64) -> Result<()> {
    if lo_start + step == lo_start || hi_start - step == hi_start {
        return Err(KorexoError::invalid_resample(format!(
            "step {} is below the resolution of index values near {}",
            step,
            lo_start.abs().max(hi_start.abs())
        )));
    }

    let points = (hi_start - lo_start) / step;
    if points > MAX_GRID_POINTS as f64 {
        return Err(KorexoError::invalid_resample(format!(
            "step {} over [{}, {}] needs more than {} grid points",
            step, lo_start, hi_start, MAX_GRID_POINTS
        )));
    }
    Ok(())
}

/// Evenly spaced grid from the aligned bounds, both ends included
pub fn build_grid(min: f64, max: f64, options: &ResampleOptions) -> Result<Vec<f64>> {
    let (lo, hi) = grid_bounds(min, max, options)?;

    // The bounds sit on the step lattice, so the ratio is integral up to rounding error
    let intervals = ((hi - lo) / options.step).round().max(0.0) as usize;
    if intervals == 0 {
        return Ok(vec![lo]);
    }

    let spacing = (hi - lo) / intervals as f64;
    let mut grid: Vec<f64> = (0..intervals).map(|i| lo + i as f64 * spacing).collect();
    grid.push(hi);
    Ok(grid)
}

/// Mean of `values` per distinct index value, sorted by index
fn group_means(index: &[Option<f64>], values: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = index
        .iter()
        .zip(values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        let x = pairs[i].0;
        let mut sum = 0.0;
        let mut count = 0usize;
        while i < pairs.len() && pairs[i].0 == x {
            sum += pairs[i].1;
            count += 1;
            i += 1;
        }
        xs.push(x);
        ys.push(sum / count as f64);
    }
    (xs, ys)
}

/// Linear interpolation at `x`; `None` outside `[xs[0], xs[last]]`
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let (&first, &last) = (xs.first()?, xs.last()?);
    if !(first..=last).contains(&x) {
        return None;
    }

    let upper = xs.partition_point(|&v| v < x);
    if xs[upper] == x {
        return Some(ys[upper]);
    }

    let lower = upper - 1;
    let fraction = (x - xs[lower]) / (xs[upper] - xs[lower]);
    Some(ys[lower] + fraction * (ys[upper] - ys[lower]))
}
