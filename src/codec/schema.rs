//! Schema-aware decoder: fixed element paths into the chart model.
//!
//! Required scalars that are missing are errors, never defaults. Repeated
//! collections (`bpm`, `measure`, `step`, `point`, `extend`, `effect`) are
//! optional: an absent container decodes as an empty list.

use super::xml::XmlElement;
use crate::chart::*;
use crate::error::ChartError;

/// A borrowed element plus the path used to reach it, for error messages.
#[derive(Clone)]
struct Node<'a> {
    element: &'a XmlElement,
    path: String,
}

impl<'a> Node<'a> {
    fn root(element: &'a XmlElement) -> Self {
        Self {
            element,
            path: element.name.clone(),
        }
    }

    fn optional(&self, name: &str) -> Option<Node<'a>> {
        self.element.child(name).map(|element| Node {
            element,
            path: format!("{}/{}", self.path, name),
        })
    }

    fn required(&self, name: &str) -> Result<Node<'a>, ChartError> {
        self.optional(name).ok_or_else(|| ChartError::MissingElement {
            path: format!("{}/{}", self.path, name),
        })
    }

    /// Every `container/item` element in document order; missing container is empty.
    fn list(&self, container: &str, item: &str) -> Vec<Node<'a>> {
        match self.optional(container) {
            Some(parent) => parent.repeated(item),
            None => Vec::new(),
        }
    }

    fn repeated(&self, name: &str) -> Vec<Node<'a>> {
        self.element
            .children_named(name)
            .enumerate()
            .map(|(i, element)| Node {
                element,
                path: format!("{}/{}[{}]", self.path, name, i),
            })
            .collect()
    }

    fn as_int(&self) -> Result<i32, ChartError> {
        let raw = self.element.text.trim();
        raw.parse::<i32>().map_err(|_| ChartError::InvalidValue {
            path: self.path.clone(),
            value: raw.to_string(),
            expected: "a base-10 s32 integer".to_string(),
        })
    }

    fn int(&self, name: &str) -> Result<i32, ChartError> {
        self.required(name)?.as_int()
    }

    fn optional_int(&self, name: &str) -> Result<Option<i32>, ChartError> {
        self.optional(name).map(|node| node.as_int()).transpose()
    }

    fn string(&self, name: &str) -> Result<String, ChartError> {
        Ok(self.required(name)?.element.text.clone())
    }

    fn invalid(&self, value: impl Into<String>, expected: &str) -> ChartError {
        ChartError::InvalidValue {
            path: self.path.clone(),
            value: value.into(),
            expected: expected.to_string(),
        }
    }
}

/// Decode a parsed element tree into a [`Document`] without invariant checks.
pub fn decode_document(root: &XmlElement) -> Result<Document, ChartError> {
    let data = Node::root(root);

    let version = data.int("seq_version")?;
    let info = decode_info(&data.required("info")?)?;

    let notes = data
        .list("sequence_data", "step")
        .iter()
        .map(decode_note)
        .collect::<Result<Vec<_>, _>>()?;

    let effects = data
        .list("extend_data", "extend")
        .iter()
        .map(decode_effect_cue)
        .collect::<Result<Vec<_>, _>>()?;

    let rec_data = data.required("rec_data")?;
    let clip_node = rec_data.required("clip")?;
    let clip = ClipInfo {
        start_time: clip_node.int("start_time")?,
        end_time: clip_node.int("end_time")?,
    };
    let recorded_effects = rec_data
        .repeated("effect")
        .iter()
        .map(decode_recorded_effect)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Document {
        version,
        info,
        notes,
        effects,
        clip,
        recorded_effects,
    })
}

fn decode_info(info: &Node) -> Result<Info, ChartError> {
    let tempo_map = info
        .list("bpm_info", "bpm")
        .iter()
        .map(|bpm| {
            Ok(TempoPoint {
                tick: bpm.int("tick")?,
                bpm: f64::from(bpm.int("bpm")?) / 100.0,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    let measure_map = info
        .list("measure_info", "measure")
        .iter()
        .map(|measure| {
            Ok(MeasurePoint {
                tick: measure.int("tick")?,
                numerator: measure.int("num")?,
                denominator: measure.int("denomi")?,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(Info {
        time_unit: info.int("time_unit")?,
        end_tick: info.int("end_tick")?,
        tempo_map,
        measure_map,
    })
}

fn decode_note(step: &Node) -> Result<Note, ChartError> {
    let kind_node = step.required("kind")?;
    let kind_code = kind_node.as_int()?;
    let kind = StepKind::from_code(kind_code)
        .ok_or_else(|| kind_node.invalid(kind_code.to_string(), "a step kind code 1..=4"))?;

    let player_node = step.required("player_id")?;
    let player_code = player_node.as_int()?;
    let player_id = PlayerId::from_code(player_code)
        .ok_or_else(|| player_node.invalid(player_code.to_string(), "a player id 0..=4"))?;

    let long_path = match step.optional("long_point") {
        Some(long_point) => {
            let points = long_point
                .repeated("point")
                .iter()
                .map(decode_point)
                .collect::<Result<Vec<_>, _>>()?;
            Some(LongPath { points })
        }
        None => None,
    };

    Ok(Note {
        start_tick: step.int("start_tick")?,
        end_tick: step.int("end_tick")?,
        left_pos: step.int("left_pos")?,
        right_pos: step.int("right_pos")?,
        kind,
        player_id,
        long_path,
    })
}

fn decode_point(point: &Node) -> Result<Point, ChartError> {
    Ok(Point {
        tick: point.int("tick")?,
        left_pos: point.int("left_pos")?,
        right_pos: point.int("right_pos")?,
        left_end_pos: point.optional_int("left_end_pos")?,
        right_end_pos: point.optional_int("right_end_pos")?,
    })
}

fn decode_effect_cue(extend: &Node) -> Result<EffectCue, ChartError> {
    let type_node = extend.required("type")?;
    if type_node.element.text != super::EXTEND_TYPE {
        return Err(type_node.invalid(type_node.element.text.clone(), "extend type 'Vfx'"));
    }

    let param = extend.required("param")?;

    let kind_node = param.required("kind")?;
    let kind = VfxKind::from_code(&kind_node.element.text).ok_or_else(|| {
        kind_node.invalid(
            kind_node.element.text.clone(),
            "one of Background, OverEffect, MiddleEffect",
        )
    })?;

    let lane_node = param.required("lane")?;
    let lane_index = lane_node.as_int()?;
    let lane = Lane::new(lane_index)
        .ok_or_else(|| lane_node.invalid(lane_index.to_string(), "a lane index 0..=3"))?;

    let color = match param.optional("color") {
        Some(color) => Some(Color {
            red: color.int("red")?,
            green: color.int("green")?,
            blue: color.int("blue")?,
        }),
        None => None,
    };

    Ok(EffectCue {
        tick: extend.int("tick")?,
        kind,
        time: param.int("time")?,
        layer_name: param.string("layer_name")?,
        id: param.int("id")?,
        lane,
        speed: param.int("speed")?,
        color,
    })
}

fn decode_recorded_effect(effect: &Node) -> Result<RecordedEffect, ChartError> {
    let command_node = effect.required("command")?;
    let command = EffectCommand::from_code(&command_node.element.text).ok_or_else(|| {
        command_node.invalid(command_node.element.text.clone(), "a recorded effect command code")
    })?;

    Ok(RecordedEffect {
        tick: effect.int("tick")?,
        time: effect.int("time")?,
        command,
    })
}
