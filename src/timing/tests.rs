use super::*;
use crate::chart::{Info, MeasurePoint, TempoPoint};

fn info(end_tick: i32, tempo: &[(i32, f64)], measures: &[(i32, i32, i32)]) -> Info {
    Info {
        time_unit: 480,
        end_tick,
        tempo_map: tempo
            .iter()
            .map(|&(tick, bpm)| TempoPoint { tick, bpm })
            .collect(),
        measure_map: measures
            .iter()
            .map(|&(tick, numerator, denominator)| MeasurePoint { tick, numerator, denominator })
            .collect(),
    }
}

fn common_time(end_tick: i32) -> Info {
    info(end_tick, &[(0, 120.0)], &[(0, 4, 4)])
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_quarter_note_at_120_bpm_is_500ms() {
    let info = common_time(1920);
    assert_close(tick_to_time(480, &info), 500.0);
    assert_close(tick_to_time(1920, &info), 2000.0);
    assert_eq!(tick_to_time(0, &info), 0.0);
}

#[test]
fn test_ms_per_tick() {
    assert_close(ms_per_tick(120.0, 480), 60_000.0 / 57_600.0);
    assert_close(ms_per_tick(60.0, 1), 1000.0);
}

#[test]
fn test_tempo_change_accumulates_segments() {
    // 960 ticks at 120 BPM (1000ms), then 60 BPM: 480 ticks = 1000ms
    let info = info(3840, &[(0, 120.0), (960, 60.0)], &[(0, 4, 4)]);
    assert_close(tick_to_time(960, &info), 1000.0);
    assert_close(tick_to_time(1440, &info), 2000.0);
    assert_close(tick_to_time(3840, &info), 1000.0 + 2880.0 * 60_000.0 / (60.0 * 480.0));
}

#[test]
fn test_tick_past_end_clamps() {
    let info = common_time(1920);
    assert_close(tick_to_time(5000, &info), tick_to_time(1920, &info));
}

#[test]
fn test_time_to_tick_inverts_within_segment() {
    let info = common_time(1920);
    assert_eq!(time_to_tick(500.0, &info), 480);
    assert_eq!(time_to_tick(0.0, &info), 0);
    for tick in 0..=1920 {
        assert_eq!(time_to_tick(tick_to_time(tick, &info), &info), tick, "tick {}", tick);
    }
}

#[test]
fn test_time_to_tick_truncates_toward_segment_start() {
    let info = common_time(1920);
    // one tick is 1.0416.. ms
    assert_eq!(time_to_tick(1.0, &info), 0);
    assert_eq!(time_to_tick(2.1, &info), 2);
}

#[test]
fn test_time_to_tick_across_tempo_change() {
    let info = info(3840, &[(0, 120.0), (960, 60.0)], &[(0, 4, 4)]);
    assert_eq!(time_to_tick(1000.0, &info), 960);
    assert_eq!(time_to_tick(1500.0, &info), 1200);
    assert_eq!(time_to_tick(2000.0, &info), 1440);
}

#[test]
fn test_time_to_tick_clamps_past_end() {
    let info = common_time(1920);
    assert_eq!(time_to_tick(60_000.0, &info), 1920);
}

#[test]
fn test_negative_time_gives_negative_tick() {
    let info = common_time(1920);
    assert!(time_to_tick(-10.0, &info) < 0);
}

#[test]
fn test_screen_offset_round_trip() {
    assert_close(time_to_screen_offset(2000.0, 4.0), 8.0);
    assert_close(screen_offset_to_time(8.0, 4.0), 2000.0);
    let info = common_time(1920);
    assert_close(tick_to_screen_offset(480, &info, 4.0), 2.0);
    assert_eq!(screen_offset_to_tick(2.0, &info, 4.0), 480);
    assert_close(chart_screen_length(&info, 2.0), 4.0);
}

#[test]
#[should_panic(expected = "non-empty tempo map")]
fn test_empty_tempo_map_panics() {
    let info = info(1920, &[], &[(0, 4, 4)]);
    tick_to_time(10, &info);
}

#[test]
#[should_panic(expected = "non-empty measure map")]
fn test_empty_measure_map_panics() {
    let info = info(1920, &[(0, 120.0)], &[]);
    all_numerator_ticks(&info);
}

#[test]
fn test_grid_single_measure_excludes_end() {
    let info = common_time(1920);
    assert_eq!(all_numerator_ticks(&info), vec![480, 960, 1440]);
    assert_eq!(all_beat_ticks(&info), Vec::<i32>::new());
}

#[test]
fn test_grid_four_measures() {
    let info = common_time(7680);
    assert_eq!(all_beat_ticks(&info), vec![1920, 3840, 5760]);
    let numerators = all_numerator_ticks(&info);
    assert_eq!(numerators.len(), 15);
    assert_eq!(numerators.first(), Some(&480));
    assert_eq!(numerators.last(), Some(&7200));
}

#[test]
fn test_grid_time_signature_change() {
    // 4/4 for one measure, then 3/8 (240-tick beats, 720-tick measures)
    let info = info(3360, &[(0, 120.0)], &[(0, 4, 4), (1920, 3, 8)]);
    assert_eq!(
        all_numerator_ticks(&info),
        vec![480, 960, 1440, 2160, 2400, 2640, 2880, 3120]
    );
    // 1920 sits 480 ticks into a 3/8 measure counted from tick 0
    assert_eq!(all_beat_ticks(&info), vec![2640]);
}

#[test]
fn test_grid_measured_on_absolute_ticks() {
    // 1000 is not on the 480-tick beat; the 2/4 grid keeps to multiples of 480
    let info = info(4000, &[(0, 120.0)], &[(0, 4, 4), (1000, 2, 4)]);
    assert_eq!(
        all_numerator_ticks(&info),
        vec![480, 960, 1440, 1920, 2400, 2880, 3360, 3840]
    );
    assert_eq!(all_beat_ticks(&info), vec![1920, 2880, 3840]);
}

#[test]
fn test_segment_starts_are_not_grid_lines() {
    let info = info(3360, &[(0, 120.0)], &[(0, 4, 4), (1920, 3, 8)]);
    let numerators = all_numerator_ticks(&info);
    assert!(!numerators.contains(&1920));
    assert!(!all_beat_ticks(&info).contains(&1920));
}

#[test]
fn test_beats_are_subset_of_numerators() {
    let info = info(9000, &[(0, 120.0)], &[(0, 4, 4), (1920, 7, 8), (5280, 5, 4)]);
    let numerators = all_numerator_ticks(&info);
    for beat in all_beat_ticks(&info) {
        assert!(numerators.contains(&beat), "beat {} missing", beat);
    }
    assert!(numerators.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_nearest_next() {
    let info = common_time(7680);
    assert_eq!(nearest_grid_tick(500, &info, Direction::Next), 960);
    assert_eq!(nearest_grid_tick(960, &info, Direction::Next), 960);
    assert_eq!(nearest_grid_tick(0, &info, Direction::Next), 0);
    assert_eq!(nearest_grid_tick(7500, &info, Direction::Next), 7680);
    assert_eq!(nearest_grid_tick(9000, &info, Direction::Next), 7680);
}

#[test]
fn test_nearest_prev_is_strict() {
    let info = common_time(7680);
    assert_eq!(nearest_grid_tick(500, &info, Direction::Prev), 480);
    assert_eq!(nearest_grid_tick(960, &info, Direction::Prev), 480);
    assert_eq!(nearest_grid_tick(100, &info, Direction::Prev), 0);
    assert_eq!(nearest_grid_tick(0, &info, Direction::Prev), 0);
}

#[test]
fn test_prev_at_measure_start_steps_back_a_subdivision() {
    let info = common_time(7680);
    assert_eq!(nearest_grid_tick(1920, &info, Direction::Prev), 1440);
}

#[test]
fn test_nearest_across_segment_boundary() {
    let info = info(3360, &[(0, 120.0)], &[(0, 4, 4), (1920, 3, 8)]);
    // inside the 3/8 segment the subdivision is 240 ticks
    assert_eq!(nearest_grid_tick(2000, &info, Direction::Next), 2160);
    assert_eq!(nearest_grid_tick(2000, &info, Direction::Prev), 1440);
    // the segment start is not a grid tick
    assert_eq!(nearest_grid_tick(1920, &info, Direction::Prev), 1440);
    assert_eq!(nearest_grid_tick(1920, &info, Direction::Next), 2160);
    assert_eq!(nearest_grid_tick(1500, &info, Direction::Next), 2160);
}

#[test]
fn test_nearest_skips_segment_start_off_the_beat() {
    let info = info(4000, &[(0, 120.0)], &[(0, 4, 4), (1000, 2, 4)]);
    assert_eq!(nearest_grid_tick(970, &info, Direction::Next), 1440);
    assert_eq!(nearest_grid_tick(1001, &info, Direction::Prev), 960);
    assert_eq!(nearest_grid_tick(1440, &info, Direction::Next), 1440);
    assert_eq!(nearest_grid_tick(3900, &info, Direction::Next), 4000);
}

#[test]
fn test_grid_lines_mark_beats() {
    let info = common_time(3840);
    let lines = grid_lines(&info).unwrap();
    let ticks: Vec<i32> = lines.iter().map(|l| l.tick).collect();
    assert_eq!(ticks, vec![480, 960, 1440, 1920, 2400, 2880, 3360]);
    let beats: Vec<i32> = lines
        .iter()
        .filter(|l| l.kind == GridLineKind::Beat)
        .map(|l| l.tick)
        .collect();
    assert_eq!(beats, vec![1920]);
}

#[test]
fn test_grid_lines_reject_empty_maps() {
    let no_measures = info(1920, &[(0, 120.0)], &[]);
    assert!(grid_lines(&no_measures).unwrap_err().is_malformed_document());
    let no_tempo = info(1920, &[], &[(0, 4, 4)]);
    assert!(grid_lines(&no_tempo).is_err());
}

#[test]
fn test_tempo_points_past_end_are_ignored() {
    let info = info(960, &[(0, 120.0), (1920, 60.0)], &[(0, 4, 4)]);
    assert_close(tick_to_time(960, &info), 1000.0);
    assert_close(tick_to_time(3000, &info), 1000.0);
    assert_eq!(time_to_tick(5000.0, &info), 960);
}
