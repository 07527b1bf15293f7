// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role attached to a user account. New accounts default to `User`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// A user account. Passwords are stored in plaintext because this backs a
/// demo application; do not put real credentials in here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// A client record owned by a user. The email is optional; an empty string
/// coming off the wire collapses to None.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Client {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    #[serde(default, with = "opt_string")]
    pub email: Option<String>,
}

/// Task priority. Legacy records can carry arbitrary strings here, so
/// anything unrecognized deserializes to `Medium` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank used by the display ordering: High > Medium > Low.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "High" => Priority::High,
            "Low" => Priority::Low,
            _ => Priority::Medium,
        })
    }
}

/// A task embedded in a project. Tasks are not a top-level collection; they
/// only travel as part of a project's `tasks` array. The id is generated by
/// the caller (a random identifier), never by the store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, with = "opt_date")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
}

#[allow(clippy::doc_overindented_list_items)]
/// A project owned by a user.
///
/// Field notes:
/// - `folder` is a free-form label; the folder list itself lives on the
///    client side and is never validated here, so a project may reference a
///    folder name that no longer exists.
/// - `client_id`/`client_name` are a denormalized reference to a `Client`
///    row. The stored name can drift after a client rename; reads resolve
///    the live name when the id still points at a client.
/// - `tasks` is kept in insertion order. Display ordering is recomputed on
///    every read and never written back.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Project {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "opt_date")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub done: bool,
    #[serde(rename = "clientId", default)]
    pub client_id: Option<i64>,
    #[serde(rename = "clientName", default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

// --- API payloads ---
// It's a good practice to separate the stored models from the API models:
// creation payloads have no id (the store assigns one), and update payloads
// use optional fields so absent keys leave the record untouched.

#[derive(Deserialize, Debug)]
pub struct CreateUserPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateUserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug)]
pub struct CreateClientPayload {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    #[serde(default, with = "opt_string")]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateClientPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateProjectPayload {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "opt_date")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(rename = "clientId", default)]
    pub client_id: Option<i64>,
    #[serde(rename = "clientName", default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
}

/// Partial update for a project. `due` distinguishes "leave unchanged"
/// (absent key) from "clear the date" (explicit null or empty string).
#[derive(Deserialize, Debug, Default)]
pub struct UpdateProjectPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_date::deserialize_patch")]
    pub due: Option<Option<NaiveDate>>,
    pub folder: Option<String>,
    pub done: Option<bool>,
    pub tasks: Option<Vec<Task>>,
}

/// Serde helpers for optional dates. Legacy records hold an empty string
/// where a date was never picked, so "" reads back as None.
pub mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        parse_raw(raw).map_err(serde::de::Error::custom)
    }

    /// Double-optional variant for PATCH bodies: an absent key never reaches
    /// this function (serde `default` yields the outer None), while null and
    /// "" become Some(None).
    pub fn deserialize_patch<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        parse_raw(raw).map(Some).map_err(serde::de::Error::custom)
    }

    fn parse_raw(raw: Option<String>) -> Result<Option<NaiveDate>, String> {
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => s
                .parse::<NaiveDate>()
                .map(Some)
                .map_err(|e| format!("invalid date {s:?}: {e}")),
        }
    }
}

// Optional strings share the empty-string tolerance of dates.
mod opt_string {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_priority_reads_as_medium() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","text":"call back","done":false,"due":null,"priority":"Urgent"}"#,
        )
        .unwrap();
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn missing_priority_defaults_to_medium() {
        let task: Task = serde_json::from_str(r#"{"id":"t1","text":"call back"}"#).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due, None);
        assert!(!task.done);
    }

    #[test]
    fn empty_string_due_reads_as_none() {
        let project: Project = serde_json::from_str(
            r#"{"id":1,"userId":7,"name":"Site refresh","due":"","folder":"Tech"}"#,
        )
        .unwrap();
        assert_eq!(project.due, None);
    }

    #[test]
    fn patch_due_distinguishes_absent_from_null() {
        let unchanged: UpdateProjectPayload = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(unchanged.due.is_none());

        let cleared: UpdateProjectPayload = serde_json::from_str(r#"{"due":null}"#).unwrap();
        assert_eq!(cleared.due, Some(None));

        let set: UpdateProjectPayload = serde_json::from_str(r#"{"due":"2025-06-01"}"#).unwrap();
        assert_eq!(
            set.due,
            Some(Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()))
        );
    }

    #[test]
    fn priority_round_trips_canonical_strings() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"Low\"");
        let p: Priority = serde_json::from_str("\"Low\"").unwrap();
        assert_eq!(p, Priority::Low);
    }
}
