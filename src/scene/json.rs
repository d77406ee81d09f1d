//! Scene descriptions in JSON.
//!
//! ```json
//! {"prims": [
//!   {"path": "/World/Cube", "type": "mesh",
//!    "data": {"visibility": {"visibility": true},
//!             "mesh": {"topology": {"faceVertexCounts": [4]}}}}
//! ]}
//! ```
//!
//! Objects become containers. Leaves map as: bool, integer (`int`), other
//! number (`float`), string (`token`, or `path` when it is an absolute
//! path), and homogeneous arrays of those or of 3-element number arrays
//! (`float3[]`).

use std::rc::Rc;

use serde_json::Value as Json;

use super::{AddedPrimEntry, RetainedSceneIndex};
use crate::core::{retained_container, retained_value, ContainerHandle, DataSource};
use crate::util::{Error, Result, ScenePath, Token, Value, Vec3};

/// Parse a JSON scene description into a new retained scene index.
pub fn load_scene_json(text: &str) -> Result<Rc<RetainedSceneIndex>> {
    let scene = RetainedSceneIndex::new();
    scene.add_prims(&parse_scene_json(text)?);
    Ok(scene)
}

/// Parse a JSON scene description into added-prim entries.
pub fn parse_scene_json(text: &str) -> Result<Vec<AddedPrimEntry>> {
    let root: Json = serde_json::from_str(text)?;
    let prims = root
        .get("prims")
        .and_then(Json::as_array)
        .ok_or_else(|| Error::InvalidScene("expected a top-level \"prims\" array".into()))?;

    let mut entries = Vec::with_capacity(prims.len());
    for (i, prim) in prims.iter().enumerate() {
        let path_text = prim
            .get("path")
            .and_then(Json::as_str)
            .ok_or_else(|| Error::InvalidScene(format!("prim {i}: missing \"path\"")))?;
        let path = ScenePath::parse(path_text)?;
        if !path.is_absolute() {
            return Err(Error::InvalidScene(format!("prim {i}: path '{path}' is not absolute")));
        }
        let prim_type = prim.get("type").and_then(Json::as_str).unwrap_or_default();
        let data_source = match prim.get("data") {
            None | Some(Json::Null) => None,
            Some(data @ Json::Object(_)) => container_from_json(data, path_text),
            Some(_) => {
                return Err(Error::InvalidScene(format!(
                    "prim {i}: \"data\" must be an object"
                )))
            }
        };
        entries.push(AddedPrimEntry {
            prim_path: path,
            prim_type: Token::new(prim_type),
            data_source,
        });
    }
    Ok(entries)
}

fn container_from_json(json: &Json, context: &str) -> Option<ContainerHandle> {
    match node_from_json(json, context)? {
        DataSource::Container(c) => Some(c),
        _ => None,
    }
}

fn node_from_json(json: &Json, context: &str) -> Option<DataSource> {
    match json {
        Json::Object(map) => {
            let children: Vec<(Token, DataSource)> = map
                .iter()
                .filter_map(|(k, v)| node_from_json(v, context).map(|ds| (Token::new(k), ds)))
                .collect();
            Some(retained_container(children))
        }
        Json::Null => None,
        other => match leaf_value(other) {
            Some(value) => Some(retained_value(value)),
            None => {
                tracing::warn!(prim = context, json = %other, "unsupported JSON value skipped");
                None
            }
        },
    }
}

fn leaf_value(json: &Json) -> Option<Value> {
    Some(match json {
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64()? as f32),
        },
        Json::String(s) => string_value(s),
        Json::Array(items) => array_value(items)?,
        _ => return None,
    })
}

fn string_value(s: &str) -> Value {
    if s.starts_with('/') {
        if let Ok(path) = ScenePath::parse(s) {
            return Value::Path(path);
        }
    }
    Value::Token(Token::new(s))
}

fn array_value(items: &[Json]) -> Option<Value> {
    if items.iter().all(|v| v.as_i64().is_some_and(|i| i32::try_from(i).is_ok())) {
        return Some(Value::IntArray(
            items.iter().filter_map(|v| v.as_i64()).map(|i| i as i32).collect(),
        ));
    }
    if items.iter().all(Json::is_number) {
        return Some(Value::FloatArray(
            items.iter().filter_map(Json::as_f64).map(|f| f as f32).collect(),
        ));
    }
    if items.iter().all(Json::is_string) {
        return Some(Value::TokenArray(
            items.iter().filter_map(Json::as_str).map(Token::new).collect(),
        ));
    }
    items
        .iter()
        .map(|v| match v.as_array()?.as_slice() {
            [x, y, z] => Some(Vec3::new(x.as_f64()? as f32, y.as_f64()? as f32, z.as_f64()? as f32)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(Value::Vec3fArray)
}
