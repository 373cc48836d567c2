//! Reassembles parsed fragments into the final outputs: a (location,
//! time)-indexed table for point queries, or a `(time, y, x)` gridded
//! dataset for region queries.

use crate::error::NldasError;
use crate::forcing::response::Fragment;
use crate::types::catalog::ForcingVariable;
use crate::types::coords::LonLat;
use crate::types::dataset::{ForcingDataset, GridVariable};
use chrono::NaiveDateTime;
use ndarray::Array3;
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// CRS of the service grid's spatial axes.
pub(crate) const GRID_CRS: &str = "EPSG:4326";

/// Timezone all timestamps represent.
pub(crate) const GRID_TZ: &str = "UTC";

/// Builds the point-mode table.
///
/// `fragments` holds one entry per (location, chunk, variable) in request
/// order, so each location owns an equal-sized consecutive slice. Within
/// a location, fragments are regrouped by name and concatenated in time
/// order, then laid side by side on the union of their time stamps;
/// stamps missing from a series become nulls. Location blocks are stacked
/// in input order and the time axis is clipped to `[start, end)`.
pub(crate) fn assemble_table(
    locations: &[LonLat],
    fragments: Vec<Fragment>,
    variables: &[ForcingVariable],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<DataFrame, NldasError> {
    if locations.is_empty() {
        return Ok(DataFrame::empty());
    }
    let per_location = fragments.len() / locations.len();
    if per_location == 0 {
        return Ok(DataFrame::empty());
    }

    let mut combined: Option<DataFrame> = None;
    for (location, slice) in locations.iter().zip(fragments.chunks(per_location)) {
        let frame = location_frame(*location, slice, variables)?;
        combined = Some(match combined {
            Some(acc) => acc.vstack(&frame)?,
            None => frame,
        });
    }

    let Some(table) = combined else {
        return Ok(DataFrame::empty());
    };
    clip_window(table, start, end)
}

/// One location's table: `lon`, `lat`, `time`, then one column per
/// selected variable under its short name.
fn location_frame(
    location: LonLat,
    fragments: &[Fragment],
    variables: &[ForcingVariable],
) -> Result<DataFrame, NldasError> {
    // Group by fragment name; the time-keyed map concatenates chunks in
    // time order no matter how many chunks there were, and makes
    // duplicate stamps last-write-wins.
    let mut by_name: HashMap<&str, BTreeMap<NaiveDateTime, f64>> = HashMap::new();
    for fragment in fragments {
        let series = by_name.entry(fragment.name.as_str()).or_default();
        for (time, value) in fragment.times.iter().zip(&fragment.values) {
            series.insert(*time, *value);
        }
    }

    let mut axis: Vec<NaiveDateTime> = by_name
        .values()
        .flat_map(|series| series.keys().copied())
        .collect();
    axis.sort_unstable();
    axis.dedup();

    let height = axis.len();
    let mut columns: Vec<Column> = Vec::with_capacity(variables.len() + 3);
    columns.push(Column::new("lon".into(), vec![location.lon(); height]));
    columns.push(Column::new("lat".into(), vec![location.lat(); height]));
    columns.push(time_column(&axis)?);
    for variable in variables {
        let series = by_name.get(variable.service_identifier());
        let values: Vec<Option<f64>> = axis
            .iter()
            .map(|time| series.and_then(|s| s.get(time).copied()))
            .collect();
        columns.push(Column::new(variable.short_name().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

fn time_column(axis: &[NaiveDateTime]) -> Result<Column, NldasError> {
    let millis: Vec<i64> = axis.iter().map(|t| t.and_utc().timestamp_millis()).collect();
    let column = Column::new("time".into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(column)
}

/// Clips the table's time axis to `[start, end)`, discarding chunk
/// overshoot.
fn clip_window(
    table: DataFrame,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<DataFrame, NldasError> {
    let clipped = table
        .lazy()
        .filter(
            col("time")
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .gt_eq(lit(start))
                .and(
                    col("time")
                        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                        .lt(lit(end)),
                ),
        )
        .collect()?;
    Ok(clipped)
}

/// Builds the gridded dataset for region queries (and for point queries
/// assembled as a grid).
///
/// Spatial axes are the ascending unique longitudes and latitudes seen
/// across the fragments; the time axis is the union of stamps inside
/// `[start, end)`. Cells no fragment wrote stay `NaN`; duplicate writes
/// are last-write-wins.
pub(crate) fn assemble_grid(
    fragments: Vec<Fragment>,
    variables: &[ForcingVariable],
    start: NaiveDateTime,
    end: NaiveDateTime,
    cell_size: f64,
) -> ForcingDataset {
    let mut x_axis: Vec<f64> = fragments.iter().map(|f| f.location.lon()).collect();
    let mut y_axis: Vec<f64> = fragments.iter().map(|f| f.location.lat()).collect();
    sort_dedup(&mut x_axis);
    sort_dedup(&mut y_axis);

    let mut time_index: BTreeMap<NaiveDateTime, usize> = BTreeMap::new();
    for fragment in &fragments {
        for time in &fragment.times {
            if *time >= start && *time < end {
                let next = time_index.len();
                time_index.entry(*time).or_insert(next);
            }
        }
    }
    // BTreeMap iteration is time order; renumber so indices follow it.
    let time_axis: Vec<NaiveDateTime> = time_index.keys().copied().collect();
    for (idx, slot) in time_index.values_mut().enumerate() {
        *slot = idx;
    }

    let shape = (time_axis.len(), y_axis.len(), x_axis.len());
    let var_slot: HashMap<&str, usize> = variables
        .iter()
        .enumerate()
        .map(|(idx, v)| (v.service_identifier(), idx))
        .collect();
    let mut cubes: Vec<Array3<f64>> = variables
        .iter()
        .map(|_| Array3::from_elem(shape, f64::NAN))
        .collect();

    for fragment in &fragments {
        let Some(&slot) = var_slot.get(fragment.name.as_str()) else {
            continue;
        };
        let Some(x_idx) = x_axis.iter().position(|x| *x == fragment.location.lon()) else {
            continue;
        };
        let Some(y_idx) = y_axis.iter().position(|y| *y == fragment.location.lat()) else {
            continue;
        };
        for (time, value) in fragment.times.iter().zip(&fragment.values) {
            if let Some(&t_idx) = time_index.get(time) {
                cubes[slot][[t_idx, y_idx, x_idx]] = *value;
            }
        }
    }

    let transform = ForcingDataset::affine(&x_axis, &y_axis, cell_size);
    let grid_variables = variables
        .iter()
        .zip(cubes)
        .map(|(variable, values)| GridVariable {
            name: variable.short_name(),
            long_name: variable.long_name(),
            units: variable.units(),
            values,
        })
        .collect();

    ForcingDataset {
        time: time_axis,
        y: y_axis,
        x: x_axis,
        variables: grid_variables,
        crs: GRID_CRS.to_string(),
        transform,
        tz: GRID_TZ.to_string(),
    }
}

fn sort_dedup(values: &mut Vec<f64>) {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    values.dedup();
}
