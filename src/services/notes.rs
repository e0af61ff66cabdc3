use crate::{
    entities::note::{self, Lane},
    errors::ServiceError,
    events::EventSender,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for the team kanban board.
///
/// Positions within a lane are a contiguous 0..n sequence; every move or
/// delete re-sequences the affected lanes in memory and writes the changed
/// rows back.
#[derive(Clone)]
pub struct NoteService {
    db: Arc<DatabaseConnection>,
    #[allow(dead_code)]
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateNoteInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub body: Option<String>,
    #[serde(default = "default_lane")]
    #[schema(value_type = String)]
    pub lane: Lane,
    pub color: Option<String>,
}

fn default_lane() -> Lane {
    Lane::Backlog
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateNoteInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub body: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub color: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct MoveNoteInput {
    #[schema(value_type = String)]
    pub lane: Lane,
    /// Target position within the lane; clamped to the lane's length
    pub position: u32,
}

/// One lane of the notes board.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NoteLane {
    #[schema(value_type = String)]
    pub lane: Lane,
    #[schema(value_type = Vec<Object>)]
    pub notes: Vec<note::Model>,
}

impl NoteService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    async fn lane_notes(&self, lane: Lane) -> Result<Vec<note::Model>, ServiceError> {
        Ok(note::Entity::find()
            .filter(note::Column::Lane.eq(lane.to_string()))
            .order_by_asc(note::Column::Position)
            .all(&*self.db)
            .await?)
    }

    /// Persist contiguous positions for a lane's notes, skipping unchanged
    /// rows.
    async fn resequence(&self, notes: Vec<note::Model>) -> Result<(), ServiceError> {
        for (idx, entry) in notes.into_iter().enumerate() {
            let wanted = idx as i32;
            if entry.position != wanted {
                let mut model: note::ActiveModel = entry.into();
                model.position = Set(wanted);
                model.updated_at = Set(Some(Utc::now()));
                model.update(&*self.db).await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_note(
        &self,
        input: CreateNoteInput,
        author_id: Option<Uuid>,
    ) -> Result<note::Model, ServiceError> {
        input.validate()?;

        // Append to the end of the lane
        let position = note::Entity::find()
            .filter(note::Column::Lane.eq(input.lane.to_string()))
            .count(&*self.db)
            .await? as i32;

        let model = note::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            body: Set(input.body),
            lane: Set(input.lane.to_string()),
            position: Set(position),
            color: Set(input.color),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "note created"; "note_id" => %created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_note(&self, id: Uuid) -> Result<note::Model, ServiceError> {
        note::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Note {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update_note(
        &self,
        id: Uuid,
        input: UpdateNoteInput,
    ) -> Result<note::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_note(id).await?;

        let mut model: note::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(body) = input.body {
            model.body = Set(body);
        }
        if let Some(color) = input.color {
            model.color = Set(color);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_note(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_note(id).await?;
        let lane = existing
            .lane()
            .map_err(|_| ServiceError::InternalError(format!("bad note lane: {}", existing.lane)))?;

        note::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;

        // Close the gap the deleted note left behind
        let remaining = self.lane_notes(lane).await?;
        self.resequence(remaining).await?;
        Ok(())
    }

    /// The whole board, lanes in fixed order, notes by position.
    #[instrument(skip(self))]
    pub async fn board(&self) -> Result<Vec<NoteLane>, ServiceError> {
        let mut lanes = Vec::new();
        for lane in Lane::iter() {
            lanes.push(NoteLane {
                lane,
                notes: self.lane_notes(lane).await?,
            });
        }
        Ok(lanes)
    }

    /// Move a note to a lane/position, re-sequencing both affected lanes.
    #[instrument(skip(self))]
    pub async fn move_note(
        &self,
        id: Uuid,
        input: MoveNoteInput,
    ) -> Result<note::Model, ServiceError> {
        let existing = self.get_note(id).await?;
        let source_lane = existing
            .lane()
            .map_err(|_| ServiceError::InternalError(format!("bad note lane: {}", existing.lane)))?;

        let mut target: Vec<note::Model> = self
            .lane_notes(input.lane)
            .await?
            .into_iter()
            .filter(|n| n.id != id)
            .collect();

        let slot = (input.position as usize).min(target.len());
        let mut moved = existing.clone();
        moved.lane = input.lane.to_string();
        target.insert(slot, moved);

        // Write the moved note's lane first so resequencing sees it there
        let mut model: note::ActiveModel = existing.into();
        model.lane = Set(input.lane.to_string());
        model.updated_at = Set(Some(Utc::now()));
        model.update(&*self.db).await?;

        self.resequence(target).await?;

        if source_lane != input.lane {
            let source_remaining = self.lane_notes(source_lane).await?;
            self.resequence(source_remaining).await?;
        }

        self.get_note(id).await
    }
}
