use super::tree::{TYPE_S32, TYPE_STR};
use super::xml::TYPE_ATTRIBUTE;
use crate::chart::*;
use quick_xml::escape::escape;

/// Indented element writer. Every scalar leaf gets an explicit `__type`.
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        out.push('\n');
        Self { out, depth: 0 }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn open(&mut self, name: &str) {
        self.indent();
        self.out.push_str(&format!("<{}>\n", name));
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth -= 1;
        self.indent();
        self.out.push_str(&format!("</{}>\n", name));
    }

    fn leaf(&mut self, name: &str, type_tag: &str, text: &str) {
        self.indent();
        self.out.push_str(&format!(
            "<{name} {attr}=\"{type_tag}\">{text}</{name}>\n",
            name = name,
            attr = TYPE_ATTRIBUTE,
            type_tag = type_tag,
            text = escape(text),
        ));
    }

    fn s32(&mut self, name: &str, value: impl Into<i64>) {
        self.leaf(name, TYPE_S32, &value.into().to_string());
    }

    fn str(&mut self, name: &str, value: &str) {
        self.leaf(name, TYPE_STR, value);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Wire value of a decoded BPM (hundredths, rounded).
pub fn bpm_to_wire(bpm: f64) -> i64 {
    (bpm * 100.0).round() as i64
}

/// Serialize a document to seq9 XML.
pub fn encode_document(doc: &Document) -> String {
    let mut w = XmlWriter::new();
    w.open("data");
    w.s32("seq_version", doc.version);

    write_info(&mut w, &doc.info);

    w.open("sequence_data");
    for note in &doc.notes {
        write_note(&mut w, note);
    }
    w.close("sequence_data");

    w.open("extend_data");
    for cue in &doc.effects {
        write_effect_cue(&mut w, cue);
    }
    w.close("extend_data");

    w.open("rec_data");
    w.open("clip");
    w.s32("start_time", doc.clip.start_time);
    w.s32("end_time", doc.clip.end_time);
    w.close("clip");
    for effect in &doc.recorded_effects {
        w.open("effect");
        w.s32("tick", effect.tick);
        w.s32("time", effect.time);
        w.str("command", effect.command.code());
        w.close("effect");
    }
    w.close("rec_data");

    w.close("data");
    w.finish()
}

fn write_info(w: &mut XmlWriter, info: &Info) {
    w.open("info");
    w.s32("time_unit", info.time_unit);
    w.s32("end_tick", info.end_tick);

    w.open("bpm_info");
    for tempo in &info.tempo_map {
        w.open("bpm");
        w.s32("tick", tempo.tick);
        w.s32("bpm", bpm_to_wire(tempo.bpm));
        w.close("bpm");
    }
    w.close("bpm_info");

    w.open("measure_info");
    for measure in &info.measure_map {
        w.open("measure");
        w.s32("tick", measure.tick);
        w.s32("num", measure.numerator);
        w.s32("denomi", measure.denominator);
        w.close("measure");
    }
    w.close("measure_info");

    w.close("info");
}

fn write_note(w: &mut XmlWriter, note: &Note) {
    w.open("step");
    w.s32("start_tick", note.start_tick);
    w.s32("end_tick", note.end_tick);
    w.s32("left_pos", note.left_pos);
    w.s32("right_pos", note.right_pos);
    w.s32("kind", note.kind.code());
    w.s32("player_id", note.player_id.code());

    if let Some(path) = &note.long_path {
        w.open("long_point");
        for point in &path.points {
            w.open("point");
            w.s32("tick", point.tick);
            w.s32("left_pos", point.left_pos);
            w.s32("right_pos", point.right_pos);
            if let Some(left_end) = point.left_end_pos {
                w.s32("left_end_pos", left_end);
            }
            if let Some(right_end) = point.right_end_pos {
                w.s32("right_end_pos", right_end);
            }
            w.close("point");
        }
        w.close("long_point");
    }

    w.close("step");
}

fn write_effect_cue(w: &mut XmlWriter, cue: &EffectCue) {
    w.open("extend");
    w.str("type", super::EXTEND_TYPE);
    w.s32("tick", cue.tick);

    w.open("param");
    w.s32("time", cue.time);
    w.str("kind", cue.kind.code());
    w.str("layer_name", &cue.layer_name);
    w.s32("id", cue.id);
    w.s32("lane", i32::from(cue.lane));
    w.s32("speed", cue.speed);
    if let Some(color) = &cue.color {
        w.open("color");
        w.s32("red", color.red);
        w.s32("green", color.green);
        w.s32("blue", color.blue);
        w.close("color");
    }
    w.close("param");

    w.close("extend");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_to_wire_rounds() {
        assert_eq!(bpm_to_wire(120.0), 12000);
        assert_eq!(bpm_to_wire(150.5), 15050);
        assert_eq!(bpm_to_wire(128.125), 12813);
    }

    #[test]
    fn test_leaf_is_escaped_and_typed() {
        let mut w = XmlWriter::new();
        w.str("layer_name", "a<b & \"c\"");
        w.s32("id", -3);
        let out = w.finish();
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(out.contains(r#"<layer_name __type="str">a&lt;b &amp; &quot;c&quot;</layer_name>"#));
        assert!(out.contains(r#"<id __type="s32">-3</id>"#));
    }
}
