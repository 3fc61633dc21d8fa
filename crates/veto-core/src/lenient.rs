// Serde helpers for fields the backend has shipped in more than one shape.
//
// Each helper reads the raw JSON value and keeps what it can understand;
// anything else becomes `None` instead of failing the whole snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::action::{Action, ActionType, Team};

/// Any `T`, or `None` when the value does not have `T`'s shape.
pub(crate) fn opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// `"A"` / `"B"` (any case); numeric team ids and other shapes are dropped.
pub(crate) fn team<'de, D>(deserializer: D) -> Result<Option<Team>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(Team::parse))
}

/// Unknown or missing action types read as `Other`.
pub(crate) fn action_type<'de, D>(deserializer: D) -> Result<ActionType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(ActionType::parse).unwrap_or_default())
}

/// A team name given as a string, a bare id, or an object with a `name`
/// (falling back to its `id` / `pk`).
pub(crate) fn team_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(display_text(&value))
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => ["name", "id", "pk"]
            .iter()
            .filter_map(|key| obj.get(*key))
            .find_map(|v| match v {
                Value::Object(_) => None,
                other => display_text(other),
            }),
        _ => None,
    }
}

/// The action log. An entry that is not even an object still takes its
/// place in the log (as an `Other` action), so log indices stay stable.
pub(crate) fn actions<'de, D>(deserializer: D) -> Result<Vec<Action>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        _ => return Ok(Vec::new()),
    };
    Ok(values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|_| Action::new(ActionType::Other))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "team")]
        team: Option<Team>,
        #[serde(default, deserialize_with = "team_name")]
        name: Option<String>,
        #[serde(default, deserialize_with = "opt")]
        id: Option<u64>,
    }

    fn read(value: Value) -> Fields {
        serde_json::from_value(value).expect("lenient fields never fail")
    }

    #[test]
    fn team_side_accepts_letters_only() {
        assert_eq!(read(json!({ "team": "a" })).team, Some(Team::A));
        assert_eq!(read(json!({ "team": " B " })).team, Some(Team::B));
        assert_eq!(read(json!({ "team": 12 })).team, None);
        assert_eq!(read(json!({ "team": { "id": 3 } })).team, None);
        assert_eq!(read(json!({ "team": null })).team, None);
        assert_eq!(read(json!({})).team, None);
    }

    #[test]
    fn team_name_shapes() {
        assert_eq!(read(json!({ "name": "Optic" })).name.as_deref(), Some("Optic"));
        assert_eq!(read(json!({ "name": 7 })).name.as_deref(), Some("7"));
        assert_eq!(
            read(json!({ "name": { "id": 3, "name": "Cloud9" } })).name.as_deref(),
            Some("Cloud9")
        );
        assert_eq!(read(json!({ "name": { "pk": 4 } })).name.as_deref(), Some("4"));
        assert_eq!(read(json!({ "name": "  " })).name, None);
        assert_eq!(read(json!({ "name": [1] })).name, None);
    }

    #[test]
    fn opt_drops_mismatched_shapes() {
        assert_eq!(read(json!({ "id": 41 })).id, Some(41));
        assert_eq!(read(json!({ "id": "41" })).id, None);
        assert_eq!(read(json!({ "id": -1 })).id, None);
    }
}
