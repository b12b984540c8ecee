//! Lesson domain model.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LecternError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    #[default]
    Video,
    Text,
    Quiz,
    Assignment,
}

impl LessonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Text => "text",
            Self::Quiz => "quiz",
            Self::Assignment => "assignment",
        }
    }
}

impl FromStr for LessonType {
    type Err = LecternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "text" => Ok(Self::Text),
            "quiz" => Ok(Self::Quiz),
            "assignment" => Ok(Self::Assignment),
            other => Err(LecternError::Validation {
                message: format!("unknown lesson type: {other}"),
            }),
        }
    }
}

/// A unit of course content. Lessons are owned transitively through
/// their course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    /// Display order within the course, ascending. Not required to be
    /// unique.
    pub position: u32,
    pub lesson_type: LessonType,
    /// Length in minutes.
    pub duration: Option<u32>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLesson {
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub position: u32,
    pub lesson_type: LessonType,
    pub duration: Option<u32>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub content: Option<String>,
    pub position: Option<u32>,
    pub lesson_type: Option<LessonType>,
    pub duration: Option<Option<u32>>,
    pub video_url: Option<Option<String>>,
}
