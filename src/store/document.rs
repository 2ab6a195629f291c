//! Wire representation of routine documents.
//!
//! The store declares `dayOfWeek` as a textual attribute: it is transmitted
//! as its decimal string representation and parsed back to an integer on
//! read. Responses from older writers may carry it as a number, so the
//! deserializer tolerates both.

use crate::routine::{Routine, RoutineFields};
use serde::{Deserialize, Serialize};

/// One routine document as returned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutineDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(rename = "courseName", default)]
    pub course_name: String,
    #[serde(rename = "courseCode", default)]
    pub course_code: String,
    #[serde(rename = "teacherName", default)]
    pub teacher_name: String,
    #[serde(rename = "teacherAvatar", default)]
    pub teacher_avatar: Option<String>,
    #[serde(rename = "dayOfWeek", default)]
    pub day_of_week: DayOfWeekField,
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    #[serde(rename = "endTime", default)]
    pub end_time: String,
}

/// `dayOfWeek` as it appears on the wire: a decimal string, tolerating a
/// plain number from older writers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DayOfWeekField {
    Text(String),
    Number(i64),
}

impl Default for DayOfWeekField {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl DayOfWeekField {
    /// Parse to the in-memory day index. Unparseable text counts as zero
    /// (Sunday); the value is not range-checked here.
    #[must_use]
    pub fn as_day(&self) -> u8 {
        match self {
            Self::Text(s) => s.trim().parse().unwrap_or(0),
            Self::Number(n) => u8::try_from(*n).unwrap_or(0),
        }
    }
}

impl From<RoutineDocument> for Routine {
    fn from(doc: RoutineDocument) -> Self {
        let day_of_week = doc.day_of_week.as_day();
        Self {
            id: Some(doc.id),
            course_name: doc.course_name,
            course_code: doc.course_code,
            teacher_name: doc.teacher_name,
            teacher_avatar: doc.teacher_avatar.filter(|s| !s.is_empty()),
            day_of_week,
            start_time: doc.start_time,
            end_time: doc.end_time,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// List response envelope.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub documents: Vec<RoutineDocument>,
}

/// Mutable routine attributes as submitted on create/update.
#[derive(Debug, Serialize)]
pub struct DocumentData<'a> {
    #[serde(rename = "courseName")]
    pub course_name: &'a str,
    #[serde(rename = "courseCode")]
    pub course_code: &'a str,
    #[serde(rename = "teacherName")]
    pub teacher_name: &'a str,
    #[serde(rename = "teacherAvatar")]
    pub teacher_avatar: &'a str,
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: String,
    #[serde(rename = "startTime")]
    pub start_time: &'a str,
    #[serde(rename = "endTime")]
    pub end_time: &'a str,
}

impl<'a> From<&'a RoutineFields> for DocumentData<'a> {
    fn from(fields: &'a RoutineFields) -> Self {
        Self {
            course_name: &fields.course_name,
            course_code: &fields.course_code,
            teacher_name: &fields.teacher_name,
            teacher_avatar: fields.teacher_avatar.as_deref().unwrap_or(""),
            day_of_week: fields.day_of_week.to_string(),
            start_time: &fields.start_time,
            end_time: &fields.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn document_with_textual_day_parses() {
        let json = serde_json::json!({
            "$id": "doc-1",
            "$createdAt": "2024-01-01T00:00:00.000+00:00",
            "courseName": "Algorithms",
            "courseCode": "CS301",
            "teacherName": "Prof. Karp",
            "teacherAvatar": "",
            "dayOfWeek": "3",
            "startTime": "09:00",
            "endTime": "10:00"
        });
        let doc: RoutineDocument = serde_json::from_value(json).expect("parse");
        let routine = Routine::from(doc);
        assert_eq!(routine.id.as_deref(), Some("doc-1"));
        assert_eq!(routine.day_of_week, 3);
        assert_eq!(routine.teacher_avatar, None);
    }

    #[test]
    fn document_with_numeric_day_parses() {
        let json = serde_json::json!({
            "$id": "doc-2",
            "courseName": "Biology",
            "courseCode": "BIO1",
            "teacherName": "Dr. Mendel",
            "dayOfWeek": 5,
            "startTime": "11:00",
            "endTime": "12:00"
        });
        let doc: RoutineDocument = serde_json::from_value(json).expect("parse");
        assert_eq!(Routine::from(doc).day_of_week, 5);
    }

    #[test]
    fn unparseable_day_counts_as_sunday() {
        assert_eq!(DayOfWeekField::Text("banana".to_owned()).as_day(), 0);
        assert_eq!(DayOfWeekField::Number(-3).as_day(), 0);
    }

    #[test]
    fn document_data_serializes_day_as_string() {
        let fields = RoutineFields {
            course_name: "Algorithms".to_owned(),
            course_code: "CS301".to_owned(),
            teacher_name: "Prof. Karp".to_owned(),
            teacher_avatar: None,
            day_of_week: 1,
            start_time: "09:00".to_owned(),
            end_time: "10:00".to_owned(),
        };
        let value = serde_json::to_value(DocumentData::from(&fields)).expect("encode");
        assert_eq!(value["dayOfWeek"], serde_json::json!("1"));
        assert_eq!(value["teacherAvatar"], serde_json::json!(""));
        assert_eq!(value["courseName"], serde_json::json!("Algorithms"));
    }
}
