use chrono::Utc;
use sea_orm::{entity::prelude::*, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{db_err, ModelError};
use crate::haircut;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "haircut_image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub haircut_id: Uuid,
    /// Blob store key.
    pub image: Option<String>,
    #[sea_orm(column_name = "default")]
    #[serde(rename = "default")]
    pub is_default: bool,
    pub created: DateTimeWithTimeZone,
    pub updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    HairCut,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::HairCut => Entity::belongs_to(haircut::Entity)
                .from(Column::HaircutId)
                .to(haircut::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<haircut::Entity> for Entity {
    fn to() -> RelationDef { Relation::HairCut.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(db: &C, haircut_id: Uuid, image: &str, is_default: bool) -> Result<Model, ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        haircut_id: Set(haircut_id),
        image: Set(Some(image.to_string())),
        is_default: Set(is_default),
        created: Set(now),
        updated: Set(now),
    };
    am.insert(db).await.map_err(db_err)
}

pub async fn for_haircut<C: ConnectionTrait>(db: &C, haircut_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::HaircutId.eq(haircut_id))
        .order_by_desc(Column::IsDefault)
        .order_by_asc(Column::Created)
        .all(db)
        .await
        .map_err(db_err)
}

pub async fn for_haircuts<C: ConnectionTrait>(db: &C, haircut_ids: &[Uuid]) -> Result<Vec<Model>, ModelError> {
    if haircut_ids.is_empty() {
        return Ok(Vec::new());
    }
    Entity::find()
        .filter(Column::HaircutId.is_in(haircut_ids.iter().copied()))
        .order_by_desc(Column::IsDefault)
        .order_by_asc(Column::Created)
        .all(db)
        .await
        .map_err(db_err)
}

/// Remove every image row of a haircut, returning the removed rows.
pub async fn delete_for_haircut<C: ConnectionTrait>(db: &C, haircut_id: Uuid) -> Result<Vec<Model>, ModelError> {
    let existing = for_haircut(db, haircut_id).await?;
    Entity::delete_many()
        .filter(Column::HaircutId.eq(haircut_id))
        .exec(db)
        .await
        .map_err(db_err)?;
    Ok(existing)
}
