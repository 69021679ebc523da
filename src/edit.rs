//! # Drag Edit Module
//!
//! Turns a pointer drag on one note into a validated tick/position move.
//!
//! ## Pipeline
//! 1. Vertical pixels → screen offset → tick offset (via the tempo map)
//! 2. Reject moves that leave `[0, end_tick]`
//! 3. Snap the start edge (or, for Left/Right notes, the end edge) to the
//!    subdivision grid when it is within `tick_tolerance`
//! 4. Horizontal pixels → lateral offset (zero for Down/Jump)
//! 5. Reject moves that leave `[0, 65536]`
//! 6. Snap the left (or else right) edge to the lane gridlines
//! 7. Round every coordinate half away from zero
//! 8. Validate the note and every long-path point; any failure rejects the
//!    whole drag
//!
//! The input document is never modified. An accepted drag returns a new
//! [`Document`] snapshot with exactly one note changed.
//!
//! ## Example
//! ```rust
//! use seq9::edit::{apply_drag, ContainerGeometry, PixelDelta};
//! use seq9::{Document, SnapConfig};
//!
//! /// Drag the first note 200px down a 3200px-tall container.
//! fn nudge_first_note(doc: &Document) -> Option<Document> {
//!     apply_drag(
//!         doc,
//!         0,
//!         PixelDelta { dx: 0.0, dy: 200.0 },
//!         ContainerGeometry { width: 1000.0, height: 3200.0 },
//!         4.0,
//!         &SnapConfig::default(),
//!     )
//!     .document()
//!     .cloned()
//! }
//! ```

use crate::chart::{Document, LongPath, Note, Point, LANE_WIDTH};
use crate::config::SnapConfig;
use crate::timing::{
    chart_screen_length, nearest_grid_tick, screen_offset_to_tick, tick_to_screen_offset,
    Direction,
};
use crate::validate::validate_note;

/// Pointer movement in pixels since the drag began (or since the last sample,
/// depending on the caller).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelDelta {
    pub dx: f64,
    pub dy: f64,
}

/// Pixel size of the note container. `height` spans the whole chart, from
/// tick 0 to `end_tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerGeometry {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    NoSuchNote(usize),
    InvalidGeometry,
    /// The moved note would start before 0 or end after `end_tick`.
    TickOutOfRange { start_tick: i64, end_tick: i64 },
    /// The moved note would leave the lane.
    PositionOutOfRange { left_pos: f64, right_pos: f64 },
    /// The rounded note or one of its long-path points breaks an invariant.
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Accepted(Document),
    Rejected(RejectReason),
}

impl DragOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DragOutcome::Accepted(_))
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            DragOutcome::Accepted(doc) => Some(doc),
            DragOutcome::Rejected(_) => None,
        }
    }
}

/// Coordinates are rounded half away from zero.
fn round_coord(value: f64) -> i32 {
    value.round() as i32
}

/// Grid tick within `tolerance` of `tick`, preferring the previous one on ties.
fn snap_tick(tick: i32, doc: &Document, tolerance: i32) -> Option<i32> {
    let prev = nearest_grid_tick(tick, &doc.info, Direction::Prev);
    let next = nearest_grid_tick(tick, &doc.info, Direction::Next);
    let (grid, distance) = if tick - prev <= next - tick {
        (prev, tick - prev)
    } else {
        (next, next - tick)
    };
    (distance <= tolerance).then_some(grid)
}

/// Lane gridline within `tolerance` of `pos`.
fn snap_position(pos: f64, lane_width: f64, tolerance: f64) -> Option<f64> {
    let grid = (pos / lane_width).round() * lane_width;
    ((pos - grid).abs() <= tolerance).then_some(grid)
}

/// Move the note at `note_index` by `delta` pixels.
///
/// Returns [`DragOutcome::Accepted`] with the updated snapshot, or
/// [`DragOutcome::Rejected`] when any coordinate of the note or its long
/// path would leave its domain. Rejection is the normal result of dragging
/// past an edge.
pub fn apply_drag(
    doc: &Document,
    note_index: usize,
    delta: PixelDelta,
    geometry: ContainerGeometry,
    speed: f64,
    snap: &SnapConfig,
) -> DragOutcome {
    let outcome = compute_drag(doc, note_index, delta, geometry, speed, snap);
    if let DragOutcome::Rejected(reason) = &outcome {
        log::trace!("drag of note {} rejected: {:?}", note_index, reason);
    }
    outcome
}

fn compute_drag(
    doc: &Document,
    note_index: usize,
    delta: PixelDelta,
    geometry: ContainerGeometry,
    speed: f64,
    snap: &SnapConfig,
) -> DragOutcome {
    let Some(note) = doc.note(note_index) else {
        return DragOutcome::Rejected(RejectReason::NoSuchNote(note_index));
    };
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !(usable(geometry.width) && usable(geometry.height) && usable(speed)) {
        return DragOutcome::Rejected(RejectReason::InvalidGeometry);
    }

    let info = &doc.info;
    let end_limit = i64::from(info.end_tick);

    // vertical pixels → tick offset
    let units_per_px = chart_screen_length(info, speed) / geometry.height;
    let old_top = tick_to_screen_offset(note.start_tick, info, speed);
    let new_start = screen_offset_to_tick(old_top + delta.dy * units_per_px, info, speed);
    let mut tick_offset = i64::from(new_start) - i64::from(note.start_tick);

    let start = i64::from(note.start_tick) + tick_offset;
    let end = i64::from(note.end_tick) + tick_offset;
    if start < 0 || end > end_limit {
        return DragOutcome::Rejected(RejectReason::TickOutOfRange {
            start_tick: start,
            end_tick: end,
        });
    }

    // start edge first; end edge only for notes with a duration
    if let Some(grid) = snap_tick(start as i32, doc, snap.tick_tolerance) {
        log::trace!("start edge {} snapped to {}", start, grid);
        tick_offset = i64::from(grid) - i64::from(note.start_tick);
    } else if !note.kind.is_instantaneous() {
        if let Some(grid) = snap_tick(end as i32, doc, snap.tick_tolerance) {
            log::trace!("end edge {} snapped to {}", end, grid);
            tick_offset = i64::from(grid) - i64::from(note.end_tick);
        }
    }

    // horizontal pixels → lateral offset
    let lane_width = f64::from(LANE_WIDTH);
    let mut pos_offset = if note.kind.is_instantaneous() {
        0.0
    } else {
        delta.dx / geometry.width * lane_width
    };

    let left = f64::from(note.left_pos) + pos_offset;
    let right = f64::from(note.right_pos) + pos_offset;
    if left < 0.0 || right > lane_width {
        return DragOutcome::Rejected(RejectReason::PositionOutOfRange {
            left_pos: left,
            right_pos: right,
        });
    }

    if !note.kind.is_instantaneous() {
        let gridline = lane_width / f64::from(snap.lane_divisions);
        let tolerance = snap.position_tolerance_px / geometry.width * lane_width;
        if let Some(grid) = snap_position(left, gridline, tolerance) {
            pos_offset = grid - f64::from(note.left_pos);
        } else if let Some(grid) = snap_position(right, gridline, tolerance) {
            pos_offset = grid - f64::from(note.right_pos);
        }
    }

    let moved = shift_note(note, tick_offset as f64, pos_offset);
    if let Err(e) = validate_note(&moved, info.end_tick, &format!("step[{}]", note_index)) {
        return DragOutcome::Rejected(RejectReason::Invalid(e.to_string()));
    }

    let mut next = doc.clone();
    next.replace_note(note_index, moved);
    DragOutcome::Accepted(next)
}

/// The note (and its long path) moved by the finalized offsets, rounded.
fn shift_note(note: &Note, tick_offset: f64, pos_offset: f64) -> Note {
    let tick = |t: i32| round_coord(f64::from(t) + tick_offset);
    let pos = |p: i32| round_coord(f64::from(p) + pos_offset);

    Note {
        start_tick: tick(note.start_tick),
        end_tick: tick(note.end_tick),
        left_pos: pos(note.left_pos),
        right_pos: pos(note.right_pos),
        kind: note.kind,
        player_id: note.player_id,
        long_path: note.long_path.as_ref().map(|path| LongPath {
            points: path
                .points
                .iter()
                .map(|point| Point {
                    tick: tick(point.tick),
                    left_pos: pos(point.left_pos),
                    right_pos: pos(point.right_pos),
                    left_end_pos: point.left_end_pos.map(pos),
                    right_end_pos: point.right_end_pos.map(pos),
                })
                .collect(),
        }),
    }
}

/// One drag gesture on one note.
///
/// Every update re-applies the accumulated gesture delta to the snapshot
/// taken when the gesture began, so a snapped edge can always be pulled
/// away from the grid again.
#[derive(Debug, Clone)]
pub struct DragSession {
    origin: Document,
    note_index: usize,
    current: Document,
}

impl DragSession {
    /// Start dragging `note_index`. Returns `None` if there is no such note.
    pub fn begin(document: Document, note_index: usize) -> Option<Self> {
        document.note(note_index)?;
        Some(Self {
            current: document.clone(),
            origin: document,
            note_index,
        })
    }

    /// Apply the total pointer movement since [`DragSession::begin`].
    /// Returns whether the move was accepted; a rejected move keeps the last
    /// accepted snapshot.
    pub fn update(
        &mut self,
        total: PixelDelta,
        geometry: ContainerGeometry,
        speed: f64,
        snap: &SnapConfig,
    ) -> bool {
        match apply_drag(&self.origin, self.note_index, total, geometry, speed, snap) {
            DragOutcome::Accepted(doc) => {
                self.current = doc;
                true
            }
            DragOutcome::Rejected(_) => false,
        }
    }

    pub fn note_index(&self) -> usize {
        self.note_index
    }

    pub fn current(&self) -> &Document {
        &self.current
    }

    pub fn finish(self) -> Document {
        self.current
    }
}
