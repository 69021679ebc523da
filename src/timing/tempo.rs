//! Tick ↔ real time ↔ screen offset conversion over the tempo map.

use crate::chart::Info;

/// Absorbs floating-point error before a tick is floored, so that
/// `time_to_tick(tick_to_time(t)) == t` holds inside a tempo segment.
const TICK_EPSILON: f64 = 1e-6;

/// Milliseconds per tick at `bpm` with `time_unit` ticks per quarter note.
pub fn ms_per_tick(bpm: f64, time_unit: i32) -> f64 {
    60_000.0 / (bpm * f64::from(time_unit))
}

/// One tempo segment `[start, end)` at a constant rate. Tempo points at or
/// past `end_tick` produce no segment.
struct TempoSegment {
    start: i32,
    end: i32,
    /// `bpm × time_unit`: ticks per minute.
    ticks_per_minute: f64,
}

impl TempoSegment {
    fn ticks_to_ms(&self, ticks: f64) -> f64 {
        ticks * 60_000.0 / self.ticks_per_minute
    }

    fn ms_to_ticks(&self, ms: f64) -> f64 {
        ms * self.ticks_per_minute / 60_000.0
    }
}

fn tempo_segments(info: &Info) -> impl Iterator<Item = TempoSegment> + '_ {
    assert!(
        !info.tempo_map.is_empty(),
        "timing queries need a non-empty tempo map; validate the chart first"
    );
    let map = &info.tempo_map;
    map.iter()
        .enumerate()
        .take_while(|(_, point)| point.tick < info.end_tick)
        .map(move |(i, point)| TempoSegment {
            start: point.tick,
            end: map
                .get(i + 1)
                .map_or(info.end_tick, |next| next.tick)
                .min(info.end_tick),
            ticks_per_minute: point.bpm * f64::from(info.time_unit),
        })
}

/// Real time in milliseconds at `tick`.
///
/// Ticks past `end_tick` clamp to the time of `end_tick`.
///
/// # Example
/// ```rust
/// use seq9::{tick_to_time, Info, MeasurePoint, TempoPoint};
///
/// let info = Info {
///     time_unit: 480,
///     end_tick: 1920,
///     tempo_map: vec![TempoPoint { tick: 0, bpm: 120.0 }],
///     measure_map: vec![MeasurePoint { tick: 0, numerator: 4, denominator: 4 }],
/// };
/// assert_eq!(tick_to_time(480, &info), 500.0);
/// ```
pub fn tick_to_time(tick: i32, info: &Info) -> f64 {
    let tick = tick.min(info.end_tick);
    let mut time = 0.0;
    for segment in tempo_segments(info) {
        let ticks_in_segment = tick.min(segment.end) - segment.start;
        time += segment.ticks_to_ms(f64::from(ticks_in_segment));
        if tick <= segment.end {
            break;
        }
    }
    time
}

/// Tick at real time `time` (ms), truncated toward the start of its tempo
/// segment. Times past the end of the chart clamp to `end_tick`; negative
/// times give negative ticks.
pub fn time_to_tick(time: f64, info: &Info) -> i32 {
    let mut elapsed = 0.0;
    for segment in tempo_segments(info) {
        let segment_ms = segment.ticks_to_ms(f64::from(segment.end - segment.start));
        if elapsed + segment_ms >= time {
            let remaining = time - elapsed;
            let ticks = (segment.ms_to_ticks(remaining) + TICK_EPSILON).floor();
            return segment.start + ticks as i32;
        }
        elapsed += segment_ms;
    }
    info.end_tick
}

pub fn time_to_screen_offset(time: f64, speed: f64) -> f64 {
    time / 1000.0 * speed
}

pub fn screen_offset_to_time(offset: f64, speed: f64) -> f64 {
    offset * 1000.0 / speed
}

pub fn tick_to_screen_offset(tick: i32, info: &Info, speed: f64) -> f64 {
    time_to_screen_offset(tick_to_time(tick, info), speed)
}

pub fn screen_offset_to_tick(offset: f64, info: &Info, speed: f64) -> i32 {
    time_to_tick(screen_offset_to_time(offset, speed), info)
}

/// Screen offset of `end_tick`: the scrolling length of the whole chart.
pub fn chart_screen_length(info: &Info, speed: f64) -> f64 {
    tick_to_screen_offset(info.end_tick, info, speed)
}
