//! Generic, schema-less tree decoder.
//!
//! Every element becomes an [`XmlValue`]: leaves are typed by their `__type`
//! attribute, elements with children become maps, and a tag repeated among
//! siblings becomes a sequence. Leaves with an unknown or missing type tag
//! are skipped.

use super::xml::XmlElement;
use crate::error::ChartError;
use serde::{Serialize, Serializer};

/// Type tag of integer leaves.
pub const TYPE_S32: &str = "s32";
/// Type tag of string leaves.
pub const TYPE_STR: &str = "str";

/// A decoded value of the generic tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XmlValue {
    Int(i64),
    Str(String),
    Seq(Vec<XmlValue>),
    Map(XmlMap),
}

impl XmlValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            XmlValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            XmlValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&XmlMap> {
        match self {
            XmlValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The value as a slice: a sequence as-is, any other value as one element.
    pub fn as_slice(&self) -> &[XmlValue] {
        match self {
            XmlValue::Seq(items) => items,
            other => std::slice::from_ref(other),
        }
    }
}

/// Tag → value mapping that keeps first-occurrence order of tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlMap {
    entries: Vec<(String, XmlValue)>,
}

impl XmlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&XmlValue> {
        self.entries.iter().find(|(k, _)| k == tag).map(|(_, v)| v)
    }

    /// Follow a `/`-separated tag path through nested maps.
    pub fn get_path(&self, path: &str) -> Option<&XmlValue> {
        let mut segments = path.split('/');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value; a repeated tag promotes the existing value into a
    /// sequence and appends.
    pub fn push(&mut self, tag: impl Into<String>, value: XmlValue) {
        let tag = tag.into();
        match self.entries.iter_mut().find(|(k, _)| *k == tag) {
            Some((_, XmlValue::Seq(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, XmlValue::Seq(Vec::new()));
                *existing = XmlValue::Seq(vec![first, value]);
            }
            None => self.entries.push((tag, value)),
        }
    }
}

impl Serialize for XmlMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

/// Convert the children of `element` into a map.
pub fn element_to_map(element: &XmlElement) -> Result<XmlMap, ChartError> {
    convert_children(element, &element.name)
}

fn convert_children(element: &XmlElement, path: &str) -> Result<XmlMap, ChartError> {
    let mut map = XmlMap::new();
    for child in &element.children {
        let child_path = format!("{}/{}", path, child.name);
        if !child.is_leaf() {
            map.push(child.name.clone(), XmlValue::Map(convert_children(child, &child_path)?));
            continue;
        }
        match child.type_tag.as_deref() {
            Some(TYPE_S32) => {
                let raw = child.text.trim();
                let value = raw.parse::<i64>().map_err(|_| ChartError::InvalidValue {
                    path: child_path.clone(),
                    value: raw.to_string(),
                    expected: "a base-10 s32 integer".to_string(),
                })?;
                map.push(child.name.clone(), XmlValue::Int(value));
            }
            Some(TYPE_STR) => map.push(child.name.clone(), XmlValue::Str(child.text.clone())),
            _ => log::trace!("skipping untyped leaf {}", child_path),
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::xml::parse_element_tree;

    fn tree(xml: &str) -> XmlMap {
        element_to_map(&parse_element_tree(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_typed_leaves() {
        let map = tree(r#"<data><a __type="s32">-12</a><b __type="str">hi</b><c __type="str"/></data>"#);
        assert_eq!(map.get("a"), Some(&XmlValue::Int(-12)));
        assert_eq!(map.get("b"), Some(&XmlValue::Str("hi".to_string())));
        assert_eq!(map.get("c"), Some(&XmlValue::Str(String::new())));
    }

    #[test]
    fn test_untyped_leaf_skipped() {
        let map = tree(r#"<data><a>1</a><b __type="u8">2</b></data>"#);
        assert!(map.is_empty());
    }

    #[test]
    fn test_repeated_tags_become_sequence() {
        let map = tree(
            r#"<data><list>
                <bpm><tick __type="s32">0</tick></bpm>
                <bpm><tick __type="s32">960</tick></bpm>
                <bpm><tick __type="s32">1920</tick></bpm>
            </list></data>"#,
        );
        let bpms = map.get_path("list/bpm").unwrap();
        let items = bpms.as_slice();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_map().unwrap().get("tick"), Some(&XmlValue::Int(960)));
    }

    #[test]
    fn test_single_occurrence_stays_scalar() {
        let map = tree(r#"<data><list><bpm><tick __type="s32">0</tick></bpm></list></data>"#);
        let bpm = map.get_path("list/bpm").unwrap();
        assert!(matches!(bpm, XmlValue::Map(_)));
        assert_eq!(bpm.as_slice().len(), 1);
    }

    #[test]
    fn test_repeated_leaves_promote() {
        let map = tree(r#"<data><x __type="s32">1</x><x __type="s32">2</x></data>"#);
        assert_eq!(
            map.get("x"),
            Some(&XmlValue::Seq(vec![XmlValue::Int(1), XmlValue::Int(2)]))
        );
    }

    #[test]
    fn test_bad_integer() {
        let root = parse_element_tree(r#"<data><x __type="s32">abc</x></data>"#).unwrap();
        let err = element_to_map(&root).unwrap_err();
        assert!(err.to_string().contains("data/x"));
    }
}
