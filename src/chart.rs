//! # Chart Document Model
//!
//! In-memory representation of a seq9 chart.
//!
//! ## Type Hierarchy
//! ```text
//! Document
//!   ├── version
//!   ├── Info
//!   │     ├── time_unit (ticks per quarter note)
//!   │     ├── end_tick
//!   │     ├── Vec<TempoPoint>   (tick, bpm)
//!   │     └── Vec<MeasurePoint> (tick, numerator, denominator)
//!   ├── Vec<Note>
//!   │     ├── start/end tick, left/right position
//!   │     ├── kind: StepKind (Left | Right | Down | Jump)
//!   │     ├── player_id: PlayerId
//!   │     └── long_path: Option<LongPath> → Vec<Point>
//!   ├── Vec<EffectCue>  (VfxKind, Lane, Option<Color>)
//!   ├── ClipInfo
//!   └── Vec<RecordedEffect> (EffectCommand)
//! ```
//!
//! ## Key Concepts
//!
//! ### Ticks
//! A single integer timeline `[0, end_tick]`; `time_unit` ticks make one
//! quarter note.
//!
//! ### Lateral positions
//! Fixed-point lane coordinates in `[0, LANE_WIDTH]` (65536 = full width).
//!
//! The model performs no validation. Invariants are checked by
//! [`validate`](crate::validate::validate) when the codec loads a chart, and by the edit engine
//! before it produces a new snapshot.

use serde::{Deserialize, Serialize};

/// Full lane width in lateral position units.
pub const LANE_WIDTH: i32 = 65536;

/// A complete seq9 chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: i32,
    pub info: Info,
    pub notes: Vec<Note>,
    pub effects: Vec<EffectCue>,
    pub clip: ClipInfo,
    pub recorded_effects: Vec<RecordedEffect>,
}

impl Document {
    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Notes of the given kind, in document order, paired with their index.
    pub fn notes_of_kind(&self, kind: StepKind) -> impl Iterator<Item = (usize, &Note)> {
        self.notes
            .iter()
            .enumerate()
            .filter(move |(_, note)| note.kind == kind)
    }

    /// Replace the note at `index`, returning the previous value.
    /// Returns `None` (and changes nothing) when the index is out of range.
    pub fn replace_note(&mut self, index: usize, note: Note) -> Option<Note> {
        let slot = self.notes.get_mut(index)?;
        Some(std::mem::replace(slot, note))
    }
}

/// Timing header: resolution, length, tempo map and measure map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub time_unit: i32,
    pub end_tick: i32,
    pub tempo_map: Vec<TempoPoint>,
    pub measure_map: Vec<MeasurePoint>,
}

/// Tempo change. `bpm` is the decoded value (wire value / 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoPoint {
    pub tick: i32,
    pub bpm: f64,
}

/// Time signature change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurePoint {
    pub tick: i32,
    pub numerator: i32,
    pub denominator: i32,
}

impl MeasurePoint {
    /// Length of one beat unit in ticks: `floor(time_unit * 4 / denominator)`.
    /// `None` when the denominator is not positive or the length does not
    /// fit in a tick.
    pub fn ticks_per_beat(&self, time_unit: i32) -> Option<i32> {
        if self.denominator < 1 {
            return None;
        }
        i32::try_from(i64::from(time_unit) * 4 / i64::from(self.denominator)).ok()
    }

    /// Length of one full measure in ticks, `None` on overflow.
    pub fn measure_length(&self, time_unit: i32) -> Option<i32> {
        self.ticks_per_beat(time_unit)?.checked_mul(self.numerator)
    }
}

/// Note kind. Wire codes are 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    Left,
    Right,
    Down,
    Jump,
}

impl StepKind {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(StepKind::Left),
            2 => Some(StepKind::Right),
            3 => Some(StepKind::Down),
            4 => Some(StepKind::Jump),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            StepKind::Left => 1,
            StepKind::Right => 2,
            StepKind::Down => 3,
            StepKind::Jump => 4,
        }
    }

    /// Down/Jump markers have no visual duration and never move laterally.
    pub fn is_instantaneous(self) -> bool {
        match self {
            StepKind::Left | StepKind::Right => false,
            StepKind::Down | StepKind::Jump => true,
        }
    }
}

/// Owning player. Codes 2..=4 appear in shipped charts but have no known meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    Player1,
    Player2,
    Auxiliary1,
    Auxiliary2,
    Auxiliary3,
}

impl PlayerId {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PlayerId::Player1),
            1 => Some(PlayerId::Player2),
            2 => Some(PlayerId::Auxiliary1),
            3 => Some(PlayerId::Auxiliary2),
            4 => Some(PlayerId::Auxiliary3),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            PlayerId::Player1 => 0,
            PlayerId::Player2 => 1,
            PlayerId::Auxiliary1 => 2,
            PlayerId::Auxiliary2 => 3,
            PlayerId::Auxiliary3 => 4,
        }
    }
}

/// A lane-position note ("step").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub start_tick: i32,
    pub end_tick: i32,
    pub left_pos: i32,
    pub right_pos: i32,
    pub kind: StepKind,
    pub player_id: PlayerId,
    pub long_path: Option<LongPath>,
}

impl Note {
    pub fn tick_span(&self) -> i32 {
        self.end_tick - self.start_tick
    }

    /// Leftmost and rightmost lateral position the note covers, including
    /// every long-path point and tail.
    pub fn lateral_extent(&self) -> (i32, i32) {
        let mut left = self.left_pos;
        let mut right = self.right_pos;
        if let Some(path) = &self.long_path {
            for point in &path.points {
                left = left.min(point.left_pos);
                right = right.max(point.right_pos);
                if let Some(end) = point.left_end_pos {
                    left = left.min(end);
                }
                if let Some(end) = point.right_end_pos {
                    right = right.max(end);
                }
            }
        }
        (left, right)
    }
}

/// Control points of a long note, ordered by tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongPath {
    pub points: Vec<Point>,
}

impl LongPath {
    /// `(left_end_pos, right_end_pos)` of the final point when both are present.
    pub fn last_tail(&self) -> Option<(i32, i32)> {
        let last = self.points.last()?;
        Some((last.left_end_pos?, last.right_end_pos?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub tick: i32,
    pub left_pos: i32,
    pub right_pos: i32,
    pub left_end_pos: Option<i32>,
    pub right_end_pos: Option<i32>,
}

/// Visual effect cue ("extend" element, wire type `Vfx`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectCue {
    pub tick: i32,
    pub kind: VfxKind,
    pub time: i32,
    pub layer_name: String,
    pub id: i32,
    pub lane: Lane,
    pub speed: i32,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VfxKind {
    Background,
    OverEffect,
    MiddleEffect,
}

impl VfxKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Background" => Some(VfxKind::Background),
            "OverEffect" => Some(VfxKind::OverEffect),
            "MiddleEffect" => Some(VfxKind::MiddleEffect),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            VfxKind::Background => "Background",
            VfxKind::OverEffect => "OverEffect",
            VfxKind::MiddleEffect => "MiddleEffect",
        }
    }
}

/// Effect lane, always in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Lane(u8);

impl Lane {
    pub const MAX: u8 = 3;

    pub fn new(index: i32) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i <= Self::MAX)
            .map(Lane)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Lane {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Lane::new(value).ok_or_else(|| format!("lane {} out of range 0..=3", value))
    }
}

impl From<Lane> for i32 {
    fn from(lane: Lane) -> i32 {
        lane.0 as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

/// Recorded clip window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub start_time: i32,
    pub end_time: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEffect {
    pub tick: i32,
    pub time: i32,
    pub command: EffectCommand,
}

/// Recorded effect command. Each variant maps to a fixed short wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCommand {
    JumpRightToLeft,
    JumpCenterToLeft,
    JumpLeftToLeft,
    JumpLeftSide,
    JumpCenterSide,
    JumpRightSide,
    DownLeft1,
    DownLeft2,
    DownRight1,
    DownRight2,
    DownCenter1,
    DownCenter2,
    TapCenterToLeft,
    TapLeftToLeft,
    TapRightToLeft,
    TapRightSide,
    TapLeftSide,
    TapCenterSide,
    SlideRightToLeft1,
    SlideRightToLeft2,
    SlideLeftToRight1,
    SlideLeftToRight2,
    SlideRightToRight1,
    SlideRightToRight2,
    SlideLeftToLeft1,
    SlideLeftToLeft2,
    SlideCenterToLeft1,
    SlideCenterToLeft2,
    SlideCenterToRight1,
    SlideCenterToRight2,
    SoftFlickLeft1,
    SoftFlickLeft2,
    SoftFlickRight1,
    SoftFlickRight2,
    LiftDownEast1,
    LiftDownEast2,
    LiftDownSouth1,
    LiftDownSouth2,
}

impl EffectCommand {
    pub const ALL: [EffectCommand; 38] = [
        EffectCommand::JumpRightToLeft,
        EffectCommand::JumpCenterToLeft,
        EffectCommand::JumpLeftToLeft,
        EffectCommand::JumpLeftSide,
        EffectCommand::JumpCenterSide,
        EffectCommand::JumpRightSide,
        EffectCommand::DownLeft1,
        EffectCommand::DownLeft2,
        EffectCommand::DownRight1,
        EffectCommand::DownRight2,
        EffectCommand::DownCenter1,
        EffectCommand::DownCenter2,
        EffectCommand::TapCenterToLeft,
        EffectCommand::TapLeftToLeft,
        EffectCommand::TapRightToLeft,
        EffectCommand::TapRightSide,
        EffectCommand::TapLeftSide,
        EffectCommand::TapCenterSide,
        EffectCommand::SlideRightToLeft1,
        EffectCommand::SlideRightToLeft2,
        EffectCommand::SlideLeftToRight1,
        EffectCommand::SlideLeftToRight2,
        EffectCommand::SlideRightToRight1,
        EffectCommand::SlideRightToRight2,
        EffectCommand::SlideLeftToLeft1,
        EffectCommand::SlideLeftToLeft2,
        EffectCommand::SlideCenterToLeft1,
        EffectCommand::SlideCenterToLeft2,
        EffectCommand::SlideCenterToRight1,
        EffectCommand::SlideCenterToRight2,
        EffectCommand::SoftFlickLeft1,
        EffectCommand::SoftFlickLeft2,
        EffectCommand::SoftFlickRight1,
        EffectCommand::SoftFlickRight2,
        EffectCommand::LiftDownEast1,
        EffectCommand::LiftDownEast2,
        EffectCommand::LiftDownSouth1,
        EffectCommand::LiftDownSouth2,
    ];

    pub fn code(self) -> &'static str {
        match self {
            EffectCommand::JumpRightToLeft => "Njmprl",
            EffectCommand::JumpCenterToLeft => "Njmpcl",
            EffectCommand::JumpLeftToLeft => "Njmpll",
            EffectCommand::JumpLeftSide => "Njmpls",
            EffectCommand::JumpCenterSide => "Njmpcs",
            EffectCommand::JumpRightSide => "Njmprs",
            EffectCommand::DownLeft1 => "Ndwnl1",
            EffectCommand::DownLeft2 => "Ndwnl2",
            EffectCommand::DownRight1 => "Ndwnr1",
            EffectCommand::DownRight2 => "Ndwnr2",
            EffectCommand::DownCenter1 => "Ndwnc1",
            EffectCommand::DownCenter2 => "Ndwnc2",
            EffectCommand::TapCenterToLeft => "Ntapcl",
            EffectCommand::TapLeftToLeft => "Ntapll",
            EffectCommand::TapRightToLeft => "Ntaprl",
            EffectCommand::TapRightSide => "Ntaprs",
            EffectCommand::TapLeftSide => "Ntapls",
            EffectCommand::TapCenterSide => "Ntapcs",
            EffectCommand::SlideRightToLeft1 => "Nsldrl1",
            EffectCommand::SlideRightToLeft2 => "Nsldrl2",
            EffectCommand::SlideLeftToRight1 => "Nsldlr1",
            EffectCommand::SlideLeftToRight2 => "Nsldlr2",
            EffectCommand::SlideRightToRight1 => "Nsldrr1",
            EffectCommand::SlideRightToRight2 => "Nsldrr2",
            EffectCommand::SlideLeftToLeft1 => "Nsldll1",
            EffectCommand::SlideLeftToLeft2 => "Nsldll2",
            EffectCommand::SlideCenterToLeft1 => "Nsldcl1",
            EffectCommand::SlideCenterToLeft2 => "Nsldcl2",
            EffectCommand::SlideCenterToRight1 => "Nsldcr1",
            EffectCommand::SlideCenterToRight2 => "Nsldcr2",
            EffectCommand::SoftFlickLeft1 => "Nsftl1",
            EffectCommand::SoftFlickLeft2 => "Nsftl2",
            EffectCommand::SoftFlickRight1 => "Nsftr1",
            EffectCommand::SoftFlickRight2 => "Nsftr2",
            EffectCommand::LiftDownEast1 => "Nldne1",
            EffectCommand::LiftDownEast2 => "Nldne2",
            EffectCommand::LiftDownSouth1 => "Nldns1",
            EffectCommand::LiftDownSouth2 => "Nldns2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|command| command.code() == code)
    }
}
