use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter as StrumEnumIter, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Kanban lane for team notes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    StrumEnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Backlog,
    InProgress,
    Done,
}

/// A kanban note on the team board.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    pub body: Option<String>,

    /// One of [`Lane`], stored as its snake_case string
    pub lane: String,

    /// Zero-based position within the lane, contiguous
    pub position: i32,

    pub color: Option<String>,
    pub author_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn lane(&self) -> Result<Lane, strum::ParseError> {
        self.lane.parse()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_parses_from_snake_case() {
        assert_eq!("in_progress".parse::<Lane>().unwrap(), Lane::InProgress);
        assert_eq!(Lane::Backlog.to_string(), "backlog");
    }
}
