//! # Document Validation Module
//!
//! Checks the data-model invariants of a decoded chart.
//!
//! ## Purpose
//! The schema-aware decoder only guarantees that every required element is
//! present and typed. A chart can still be unusable: an empty tempo map makes
//! every timing query meaningless, and a long-note point outside its note
//! breaks drag editing. The timing engine assumes these checks have passed.
//!
//! ## Validation Rules
//!
//! ### Info
//! - `time_unit > 0`, `end_tick >= 0`
//! - tempo and measure maps are non-empty, start at tick 0 and strictly ascend
//! - every `bpm > 0`
//! - every measure has `numerator >= 1` and a beat unit of at least one tick
//!
//! ### Notes
//! - `0 <= start_tick <= end_tick <= info.end_tick`
//! - `0 <= left_pos <= right_pos <= 65536`
//! - long-path points strictly ascend inside `(start_tick, end_tick]`,
//!   positions stay in range, and a tail has `left_end_pos <= right_end_pos`
//!
//! ## Entry Point
//! `validate(doc: &Document) -> Result<(), ChartError>`

use crate::chart::*;
use crate::error::ChartError;

/// Validate a decoded chart against the data-model invariants.
pub fn validate(doc: &Document) -> Result<(), ChartError> {
    validate_info(&doc.info)?;
    for (i, note) in doc.notes.iter().enumerate() {
        validate_note(note, doc.info.end_tick, &format!("data/sequence_data/step[{}]", i))?;
    }
    Ok(())
}

/// Check the timing header on its own; the timing engine needs only this.
pub(crate) fn validate_info(info: &Info) -> Result<(), ChartError> {
    if info.time_unit <= 0 {
        return Err(ChartError::invalid_document(
            "data/info/time_unit",
            format!("time unit must be positive, got {}", info.time_unit),
        ));
    }
    if info.end_tick < 0 {
        return Err(ChartError::invalid_document(
            "data/info/end_tick",
            format!("end tick must not be negative, got {}", info.end_tick),
        ));
    }

    let tempo_ticks: Vec<i32> = info.tempo_map.iter().map(|t| t.tick).collect();
    validate_map_ticks(&tempo_ticks, "data/info/bpm_info/bpm", "tempo")?;
    for (i, tempo) in info.tempo_map.iter().enumerate() {
        if !(tempo.bpm > 0.0 && tempo.bpm.is_finite()) {
            return Err(ChartError::invalid_document(
                format!("data/info/bpm_info/bpm[{}]/bpm", i),
                format!("bpm must be positive, got {}", tempo.bpm),
            ));
        }
    }

    let measure_ticks: Vec<i32> = info.measure_map.iter().map(|m| m.tick).collect();
    validate_map_ticks(&measure_ticks, "data/info/measure_info/measure", "measure")?;
    for (i, measure) in info.measure_map.iter().enumerate() {
        let path = format!("data/info/measure_info/measure[{}]", i);
        if measure.numerator < 1 {
            return Err(ChartError::invalid_document(
                path,
                format!("numerator must be at least 1, got {}", measure.numerator),
            ));
        }
        match measure.ticks_per_beat(info.time_unit) {
            Some(ticks) if ticks >= 1 => {}
            _ => {
                return Err(ChartError::invalid_document(
                    path,
                    format!(
                        "denominator {} gives no whole tick per beat at time unit {}",
                        measure.denominator, info.time_unit
                    ),
                ))
            }
        }
        if measure.measure_length(info.time_unit).is_none() {
            return Err(ChartError::invalid_document(
                path,
                format!(
                    "{}/{} at time unit {} is longer than the tick range",
                    measure.numerator, measure.denominator, info.time_unit
                ),
            ));
        }
    }

    Ok(())
}

fn validate_map_ticks(ticks: &[i32], path: &str, what: &str) -> Result<(), ChartError> {
    match ticks.first() {
        None => {
            return Err(ChartError::invalid_document(
                path,
                format!("{} map must have at least one entry", what),
            ))
        }
        Some(&first) if first != 0 => {
            return Err(ChartError::invalid_document(
                format!("{}[0]/tick", path),
                format!("first {} point must be at tick 0, got {}", what, first),
            ))
        }
        Some(_) => {}
    }
    for (i, pair) in ticks.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(ChartError::invalid_document(
                format!("{}[{}]/tick", path, i + 1),
                format!(
                    "{} points must strictly ascend, tick {} follows {}",
                    what, pair[1], pair[0]
                ),
            ));
        }
    }
    Ok(())
}

/// Check one note (and its long path) against the chart length.
///
/// Shared with the edit engine so a drag can never produce a note the
/// decoder would refuse.
pub(crate) fn validate_note(note: &Note, end_tick: i32, path: &str) -> Result<(), ChartError> {
    if note.start_tick < 0 || note.start_tick > note.end_tick || note.end_tick > end_tick {
        return Err(ChartError::invalid_document(
            path,
            format!(
                "ticks {}..{} outside chart range 0..{}",
                note.start_tick, note.end_tick, end_tick
            ),
        ));
    }
    if note.left_pos < 0 || note.left_pos > note.right_pos || note.right_pos > LANE_WIDTH {
        return Err(ChartError::invalid_document(
            path,
            format!(
                "positions {}..{} outside lane range 0..{}",
                note.left_pos, note.right_pos, LANE_WIDTH
            ),
        ));
    }

    let Some(long_path) = &note.long_path else {
        return Ok(());
    };
    if long_path.points.is_empty() {
        return Err(ChartError::invalid_document(
            format!("{}/long_point", path),
            "long path must have at least one point",
        ));
    }

    let mut previous_tick = note.start_tick;
    for (i, point) in long_path.points.iter().enumerate() {
        let point_path = format!("{}/long_point/point[{}]", path, i);
        if point.tick <= previous_tick || point.tick > note.end_tick {
            return Err(ChartError::invalid_document(
                point_path,
                format!(
                    "tick {} must be after {} and at most {}",
                    point.tick, previous_tick, note.end_tick
                ),
            ));
        }
        previous_tick = point.tick;

        let positions = [
            Some(point.left_pos),
            Some(point.right_pos),
            point.left_end_pos,
            point.right_end_pos,
        ];
        if let Some(bad) = positions
            .iter()
            .flatten()
            .find(|pos| !(0..=LANE_WIDTH).contains(*pos))
        {
            return Err(ChartError::invalid_document(
                point_path,
                format!("position {} outside lane range 0..{}", bad, LANE_WIDTH),
            ));
        }
        if let (Some(left), Some(right)) = (point.left_end_pos, point.right_end_pos) {
            if left > right {
                return Err(ChartError::invalid_document(
                    point_path,
                    format!("tail left {} is right of tail right {}", left, right),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_document() -> Document {
        Document {
            version: 9,
            info: Info {
                time_unit: 480,
                end_tick: 7680,
                tempo_map: vec![TempoPoint { tick: 0, bpm: 120.0 }],
                measure_map: vec![MeasurePoint { tick: 0, numerator: 4, denominator: 4 }],
            },
            notes: vec![Note {
                start_tick: 480,
                end_tick: 960,
                left_pos: 0,
                right_pos: 16384,
                kind: StepKind::Left,
                player_id: PlayerId::Player1,
                long_path: Some(LongPath {
                    points: vec![
                        Point { tick: 720, left_pos: 4096, right_pos: 20480, left_end_pos: None, right_end_pos: None },
                        Point { tick: 960, left_pos: 8192, right_pos: 24576, left_end_pos: Some(0), right_end_pos: Some(8192) },
                    ],
                }),
            }],
            effects: vec![],
            clip: ClipInfo { start_time: 0, end_time: 16000 },
            recorded_effects: vec![],
        }
    }

    #[test]
    fn test_valid_document() {
        assert!(validate(&base_document()).is_ok());
    }

    #[test]
    fn test_empty_tempo_map() {
        let mut doc = base_document();
        doc.info.tempo_map.clear();
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("tempo map must have at least one entry"));
        assert!(err.is_malformed_document());
    }

    #[test]
    fn test_tempo_map_must_start_at_zero() {
        let mut doc = base_document();
        doc.info.tempo_map[0].tick = 10;
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("must be at tick 0"));
    }

    #[test]
    fn test_measure_map_must_ascend() {
        let mut doc = base_document();
        doc.info.measure_map.push(MeasurePoint { tick: 1920, numerator: 3, denominator: 4 });
        doc.info.measure_map.push(MeasurePoint { tick: 1920, numerator: 4, denominator: 4 });
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("strictly ascend"));
    }

    #[test]
    fn test_zero_bpm_rejected() {
        let mut doc = base_document();
        doc.info.tempo_map[0].bpm = 0.0;
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_huge_denominator_rejected() {
        let mut doc = base_document();
        doc.info.measure_map[0].denominator = 4096;
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("no whole tick per beat"));
    }

    #[test]
    fn test_overflowing_measure_length_rejected() {
        let mut doc = base_document();
        doc.info.measure_map[0].numerator = i32::MAX;
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("longer than the tick range"));
    }

    #[test]
    fn test_huge_time_unit_rejected() {
        let mut doc = base_document();
        doc.info.time_unit = 1_000_000_000;
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("measure[0]"));
    }

    #[test]
    fn test_note_past_end_tick() {
        let mut doc = base_document();
        doc.notes[0].end_tick = 8000;
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("step[0]"));
    }

    #[test]
    fn test_inverted_positions() {
        let mut doc = base_document();
        doc.notes[0].left_pos = 30000;
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_long_point_before_start() {
        let mut doc = base_document();
        doc.notes[0].long_path.as_mut().unwrap().points[0].tick = 480;
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("point[0]"));
    }

    #[test]
    fn test_long_points_out_of_order() {
        let mut doc = base_document();
        let points = &mut doc.notes[0].long_path.as_mut().unwrap().points;
        points[0].tick = 960;
        points[1].tick = 900;
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_inverted_tail() {
        let mut doc = base_document();
        let points = &mut doc.notes[0].long_path.as_mut().unwrap().points;
        points[1].left_end_pos = Some(9000);
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("tail left"));
    }

    #[test]
    fn test_empty_long_path() {
        let mut doc = base_document();
        doc.notes[0].long_path = Some(LongPath { points: vec![] });
        assert!(validate(&doc).is_err());
    }
}
