use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database entity for API tokens used by external integrations.
///
/// Only the SHA-256 digest of the minted token is stored; `prefix` keeps the
/// first characters for display in token lists.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub token_hash: String,

    /// First characters of the plaintext token, for identification
    pub prefix: String,

    pub user_id: Uuid,

    /// JSON array of permission strings granted to this token
    #[sea_orm(column_type = "Json")]
    pub permissions: Json,

    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
