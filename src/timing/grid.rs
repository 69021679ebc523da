//! Measure/beat grid walking over the measure map.
//!
//! Each measure segment `[start, end)` is walked from its start tick. A step
//! moves to the next boundary inside the current measure, where the position
//! in the measure is the absolute tick modulo the measure length. Numerator
//! steps advance one beat unit, beat steps advance a whole measure. Only
//! boundaries strictly inside the segment are listed, so segment starts,
//! tick 0 and `end_tick` never are.

use crate::chart::Info;
use crate::error::ChartError;
use crate::validate::validate_info;

/// Direction of a nearest-grid-tick query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Nearest grid tick at or after the query tick.
    Next,
    /// Nearest grid tick strictly before the query tick.
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLineKind {
    Beat,
    Numerator,
}

/// One grid line for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLine {
    pub tick: i32,
    pub kind: GridLineKind,
}

/// One measure segment `[start, end)` with a constant time signature.
/// Widened to `i64` so stepping past the last tick cannot overflow.
#[derive(Debug, Clone, Copy)]
struct MeasureSegment {
    start: i64,
    end: i64,
    numerator: i64,
    ticks_per_beat: i64,
    measure_length: i64,
}

fn measure_segments(info: &Info) -> Vec<MeasureSegment> {
    assert!(
        !info.measure_map.is_empty(),
        "grid queries need a non-empty measure map; validate the chart first"
    );
    let map = &info.measure_map;
    map.iter()
        .enumerate()
        .filter_map(|(i, measure)| {
            let lengths = (
                measure.ticks_per_beat(info.time_unit),
                measure.measure_length(info.time_unit),
            );
            let (Some(ticks_per_beat @ 1..), Some(measure_length @ 1..)) = lengths else {
                log::warn!("measure at tick {} has no usable length, skipping its grid", measure.tick);
                return None;
            };
            let end = map
                .get(i + 1)
                .map_or(info.end_tick, |next| next.tick)
                .min(info.end_tick);
            Some(MeasureSegment {
                start: i64::from(measure.tick),
                end: i64::from(end),
                numerator: i64::from(measure.numerator),
                ticks_per_beat: i64::from(ticks_per_beat),
                measure_length: i64::from(measure_length),
            })
        })
        .collect()
}

/// Walk one segment, advancing `stride` beat units per step.
fn walk_segment(segment: &MeasureSegment, stride: i64, ticks: &mut Vec<i32>) {
    let mut current = segment.start;
    while current < segment.end {
        let position = current.rem_euclid(segment.measure_length);
        let next_position = (position / segment.ticks_per_beat + stride) * segment.ticks_per_beat;
        let next = current + (next_position - position);
        if next >= segment.end {
            break;
        }
        // below the segment end, so within i32
        ticks.push(next as i32);
        current = next;
    }
}

/// Measure-boundary ticks ("beat" grid lines), strictly ascending.
///
/// # Example
/// ```rust
/// use seq9::{all_beat_ticks, Info, MeasurePoint, TempoPoint};
///
/// let info = Info {
///     time_unit: 480,
///     end_tick: 7680,
///     tempo_map: vec![TempoPoint { tick: 0, bpm: 120.0 }],
///     measure_map: vec![MeasurePoint { tick: 0, numerator: 4, denominator: 4 }],
/// };
/// assert_eq!(all_beat_ticks(&info), vec![1920, 3840, 5760]);
/// ```
pub fn all_beat_ticks(info: &Info) -> Vec<i32> {
    let mut ticks = Vec::new();
    for segment in &measure_segments(info) {
        walk_segment(segment, segment.numerator, &mut ticks);
    }
    ticks
}

/// Subdivision ticks ("numerator" grid lines), strictly ascending.
/// Every beat tick is also a numerator tick.
pub fn all_numerator_ticks(info: &Info) -> Vec<i32> {
    let mut ticks = Vec::new();
    for segment in &measure_segments(info) {
        walk_segment(segment, 1, &mut ticks);
    }
    ticks
}

/// Every numerator tick, marked [`GridLineKind::Beat`] where it is also a
/// beat tick.
///
/// The timing header is checked first, so this is safe on a chart decoded
/// without validation.
pub fn grid_lines(info: &Info) -> Result<Vec<GridLine>, ChartError> {
    validate_info(info)?;
    let beats = all_beat_ticks(info);
    Ok(all_numerator_ticks(info)
        .into_iter()
        .map(|tick| GridLine {
            tick,
            kind: if beats.binary_search(&tick).is_ok() {
                GridLineKind::Beat
            } else {
                GridLineKind::Numerator
            },
        })
        .collect())
}

/// Nearest subdivision-grid tick to `tick` in `direction`.
///
/// `Next` returns the smallest numerator tick `>= tick`, falling back to
/// `end_tick`. `Prev` returns the largest numerator tick strictly `< tick`,
/// falling back to 0, so a query exactly on a grid tick (a measure start
/// included) steps back one full subdivision.
pub fn nearest_grid_tick(tick: i32, info: &Info, direction: Direction) -> i32 {
    let segments = measure_segments(info);
    let end_tick = i64::from(info.end_tick);
    let tick = i64::from(tick);

    // a segment's grid is the multiples of its beat unit strictly inside it
    let found = match direction {
        Direction::Next => {
            if tick <= 0 {
                return 0;
            }
            if tick >= end_tick {
                return info.end_tick;
            }
            segments
                .iter()
                .filter(|s| s.end > tick)
                .find_map(|s| {
                    let from = tick.max(s.start + 1);
                    let candidate = (from + s.ticks_per_beat - 1) / s.ticks_per_beat * s.ticks_per_beat;
                    (candidate < s.end).then_some(candidate)
                })
                .unwrap_or(end_tick)
        }
        Direction::Prev => {
            if tick <= 0 {
                return 0;
            }
            if tick > end_tick {
                return info.end_tick;
            }
            segments
                .iter()
                .rev()
                .filter(|s| s.start < tick)
                .find_map(|s| {
                    let upto = (tick - 1).min(s.end - 1);
                    let candidate = upto / s.ticks_per_beat * s.ticks_per_beat;
                    (candidate > s.start).then_some(candidate)
                })
                .unwrap_or(0)
        }
    };
    // between 0 and end_tick
    found as i32
}
