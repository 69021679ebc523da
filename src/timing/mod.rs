//! # Timing Module
//!
//! Converts between ticks, real time and screen offsets, and walks the
//! measure grid used for snapping and grid lines.
//!
//! ## Sub-modules
//! - `tempo` - piecewise-tempo tick ↔ milliseconds ↔ screen offset conversion
//! - `grid` - beat/numerator grid walking and nearest-grid-tick queries
//!
//! ## Tempo segments
//! Each tempo point starts a segment that lasts until the next point (or
//! `end_tick`). Within a segment one tick lasts
//! `60_000 / (bpm × time_unit)` milliseconds, i.e. `6_000_000 / (wire_bpm ×
//! time_unit)` with the hundredths-of-BPM wire value.
//!
//! ## Screen offsets
//! `offset = ms / 1000 × speed`. The rendering layer places a note at the
//! offset of its start tick; the chart is `chart_screen_length` long.
//!
//! ## Preconditions
//! Every function here assumes a validated chart (non-empty tempo and
//! measure maps starting at tick 0). An empty map panics. [`grid_lines`]
//! checks the timing header first and is the entry point for charts decoded
//! without validation.

mod grid;
mod tempo;

#[cfg(test)]
mod tests;

pub use grid::{
    all_beat_ticks, all_numerator_ticks, grid_lines, nearest_grid_tick, Direction, GridLine,
    GridLineKind,
};
pub use tempo::{
    chart_screen_length, ms_per_tick, screen_offset_to_tick, screen_offset_to_time,
    tick_to_screen_offset, tick_to_time, time_to_screen_offset, time_to_tick,
};
