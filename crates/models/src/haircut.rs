use chrono::Utc;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Alias, Expr, Func},
    Condition, PaginatorTrait, QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{db_err, ModelError};
use crate::{haircut_image, search};

pub const CODE_MAX_LEN: usize = 20;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const DEFAULT_MINUTES: i32 = 10;
/// Total digits allowed for `price`, two of them after the point.
pub const PRICE_MAX_DIGITS: u32 = 22;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "haircut")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: Option<String>,
    #[sea_orm(unique)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((22, 2)))")]
    pub price: Decimal,
    pub minutes: i32,
    pub is_active: bool,
    pub created: DateTimeWithTimeZone,
    pub updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Images,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Images => Entity::has_many(haircut_image::Entity).into() }
    }
}

impl Related<haircut_image::Entity> for Entity {
    fn to() -> RelationDef { Relation::Images.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for create (missing values take defaults) and update
/// (missing values are left unchanged).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HairCutFields {
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub minutes: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct HairCutFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub minutes: Option<i32>,
}

fn clean(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Price with exactly two decimal places.
pub fn money(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(2);
    value
}

pub fn validate(fields: &HairCutFields) -> Result<(), ModelError> {
    if let Some(code) = clean(fields.code.as_deref()) {
        if code.chars().count() > CODE_MAX_LEN {
            return Err(ModelError::Validation(format!("code: ensure this field has no more than {} characters", CODE_MAX_LEN)));
        }
    }
    if let Some(description) = clean(fields.description.as_deref()) {
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(ModelError::Validation(format!(
                "description: ensure this field has no more than {} characters",
                DESCRIPTION_MAX_LEN
            )));
        }
    }
    if let Some(price) = fields.price {
        if price.normalize().scale() > 2 {
            return Err(ModelError::Validation("price: ensure that there are no more than 2 decimal places".into()));
        }
        if price.trunc().abs().to_string().len() > (PRICE_MAX_DIGITS - 2) as usize {
            return Err(ModelError::Validation(format!(
                "price: ensure that there are no more than {} digits in total",
                PRICE_MAX_DIGITS
            )));
        }
    }
    if let Some(minutes) = fields.minutes {
        if minutes <= 0 {
            return Err(ModelError::Validation("minutes: ensure this value is greater than 0".into()));
        }
    }
    Ok(())
}

async fn ensure_unique<C: ConnectionTrait>(db: &C, id: Option<Uuid>, fields: &HairCutFields) -> Result<(), ModelError> {
    let checks = [
        (Column::Code, clean(fields.code.as_deref()), "code"),
        (Column::Description, clean(fields.description.as_deref()), "description"),
    ];
    for (column, value, label) in checks {
        let Some(value) = value else { continue };
        let mut query = Entity::find().filter(column.eq(value));
        if let Some(id) = id {
            query = query.filter(Column::Id.ne(id));
        }
        if query.one(db).await.map_err(db_err)?.is_some() {
            return Err(ModelError::Validation(format!("haircut with this {} already exists.", label)));
        }
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, fields: &HairCutFields) -> Result<Model, ModelError> {
    validate(fields)?;
    ensure_unique(db, None, fields).await?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(clean(fields.code.as_deref())),
        description: Set(clean(fields.description.as_deref())),
        price: Set(money(fields.price.unwrap_or_default())),
        minutes: Set(fields.minutes.unwrap_or(DEFAULT_MINUTES)),
        is_active: Set(fields.is_active.unwrap_or(true)),
        created: Set(now),
        updated: Set(now),
    };
    let created = am.insert(db).await.map_err(db_err)?;
    debug!(haircut_id = %created.id, "haircut_inserted");
    Ok(created)
}

pub async fn update<C: ConnectionTrait>(db: &C, id: Uuid, fields: &HairCutFields) -> Result<Model, ModelError> {
    validate(fields)?;
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ModelError::not_found("haircut"))?
        .into();
    ensure_unique(db, Some(id), fields).await?;
    if let Some(code) = fields.code.as_deref() {
        am.code = Set(clean(Some(code)));
    }
    if let Some(description) = fields.description.as_deref() {
        am.description = Set(clean(Some(description)));
    }
    if let Some(price) = fields.price {
        am.price = Set(money(price));
    }
    if let Some(minutes) = fields.minutes {
        am.minutes = Set(minutes);
    }
    if let Some(is_active) = fields.is_active {
        am.is_active = Set(is_active);
    }
    am.updated = Set(Utc::now().into());
    am.update(db).await.map_err(db_err)
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(db_err)
}

/// Haircut together with its images, default image first.
pub async fn find_with_images<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<(Model, Vec<haircut_image::Model>)>, ModelError> {
    let Some(found) = find(db, id).await? else { return Ok(None) };
    let images = haircut_image::for_haircut(db, id).await?;
    Ok(Some((found, images)))
}

/// Hard delete; image rows go with the haircut through the FK cascade.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    if res.rows_affected == 0 {
        return Err(ModelError::not_found("haircut"));
    }
    debug!(haircut_id = %id, "haircut_deleted");
    Ok(())
}

/// Every term must match description, price or minutes as a
/// case-insensitive substring.
pub fn search_condition(terms: &[String]) -> Condition {
    terms.iter().fold(Condition::all(), |all, term| {
        let pattern = search::contains(term);
        let any = [Column::Description, Column::Price, Column::Minutes]
            .into_iter()
            .fold(Condition::any(), |any, column| {
                any.add(Expr::expr(Func::lower(Expr::col(column).cast_as(Alias::new("text")))).like(pattern.clone()))
            });
        all.add(any)
    })
}

fn filtered(filter: &HairCutFilter) -> Select<Entity> {
    let mut query = Entity::find();
    if let Some(search) = filter.search.as_deref() {
        let terms = search::terms(search);
        if !terms.is_empty() {
            query = query.filter(search_condition(&terms));
        }
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(Column::IsActive.eq(is_active));
    }
    if let Some(minutes) = filter.minutes {
        query = query.filter(Column::Minutes.eq(minutes));
    }
    query.order_by_asc(Column::Created).order_by_asc(Column::Id)
}

pub async fn list<C: ConnectionTrait>(db: &C, filter: &HairCutFilter) -> Result<Vec<Model>, ModelError> {
    filtered(filter).all(db).await.map_err(db_err)
}

/// One page (0-based index) plus the total number of matching rows.
pub async fn list_page<C: ConnectionTrait>(
    db: &C,
    filter: &HairCutFilter,
    page_idx: u64,
    per_page: u64,
) -> Result<(Vec<Model>, u64), ModelError> {
    let paginator = filtered(filter).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(db_err)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(db_err)?;
    Ok((rows, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validate_rejects_non_positive_minutes() {
        let fields = HairCutFields { minutes: Some(0), ..Default::default() };
        assert!(matches!(validate(&fields), Err(ModelError::Validation(_))));
    }

    #[test]
    fn validate_rejects_three_decimal_places() {
        let fields = HairCutFields { price: Some(Decimal::from_str("1.005").unwrap()), ..Default::default() };
        assert!(validate(&fields).is_err());
        let fields = HairCutFields { price: Some(Decimal::from_str("1.50").unwrap()), ..Default::default() };
        assert!(validate(&fields).is_ok());
    }

    #[test]
    fn validate_rejects_long_code() {
        let fields = HairCutFields { code: Some("x".repeat(21)), ..Default::default() };
        assert!(validate(&fields).is_err());
    }

    #[test]
    fn money_has_two_places() {
        assert_eq!(money(Decimal::from(15)).to_string(), "15.00");
    }
}
