use chrono::Utc;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Func},
    Condition, PaginatorTrait, QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{db_err, ModelError};
use crate::{photo_user, search};

pub const USERNAME_MAX_LEN: usize = 255;
pub const NAME_MAX_LEN: usize = 255;
pub const PHONE_MAX_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[sea_orm(num_value = 0)]
    Inactive,
    #[sea_orm(num_value = 1)]
    Active,
    #[sea_orm(num_value = 2)]
    Suspended,
}

impl UserStatus {
    pub fn code(self) -> i16 {
        match self {
            UserStatus::Inactive => 0,
            UserStatus::Active => 1,
            UserStatus::Suspended => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(UserStatus::Inactive),
            1 => Some(UserStatus::Active),
            2 => Some(UserStatus::Suspended),
            _ => None,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            UserStatus::Inactive => "inactive",
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
        }
    }
}

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ModelError::Validation("point: latitude must be within [-90, 90] and longitude within [-180, 180]".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub direction: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: UserStatus,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub info: Json,
    pub jwt_id: Uuid,
    pub last_login: Option<DateTimeWithTimeZone>,
    pub last_password_change: Option<DateTimeWithTimeZone>,
    pub last_sync_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(indexed)]
    pub current_photo_id: Option<Uuid>,
    pub created: DateTimeWithTimeZone,
    pub updated: DateTimeWithTimeZone,
}

impl Model {
    /// `"{name} {last_name}"`, leaving out whichever part is blank.
    pub fn full_name(&self) -> String {
        [self.name.as_deref().unwrap_or_default(), self.last_name.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
            _ => None,
        }
    }

    /// Whether the account may log in.
    pub fn can_authenticate(&self) -> bool {
        self.is_active && self.status == UserStatus::Active
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Photos,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Photos => Entity::has_many(photo_user::Entity).into() }
    }
}

impl Related<photo_user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Photos.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Values for a new account. `password_hash` must already be hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub point: Option<GeoPoint>,
    pub status: Option<UserStatus>,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub info: Option<Json>,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub point: Option<GeoPoint>,
    pub status: Option<UserStatus>,
    pub is_barber: Option<bool>,
    pub is_superuser: Option<bool>,
    pub info: Option<Json>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub is_barber: Option<bool>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn clean(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(ModelError::Validation("email: enter a valid email address".into())),
    }
}

fn validate_len(label: &str, value: Option<&str>, max: usize) -> Result<(), ModelError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ModelError::Validation(format!(
            "{}: ensure this field has no more than {} characters",
            label, max
        ))),
        _ => Ok(()),
    }
}

fn validate_info(info: Option<&Json>) -> Result<(), ModelError> {
    match info {
        Some(v) if !v.is_object() => Err(ModelError::Validation("info: must be a JSON object".into())),
        _ => Ok(()),
    }
}

/// Email is stored lower-cased; usernames keep their case but are unique
/// ignoring it, matching the lookup in `find_by_username`.
async fn ensure_unique<C: ConnectionTrait>(
    db: &C,
    id: Option<Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), ModelError> {
    let checks = [
        (username.map(|u| Expr::expr(Func::lower(Expr::col(Column::Username))).eq(u.to_lowercase())), "username"),
        (email.map(|e| Column::Email.eq(e)), "email"),
    ];
    for (condition, label) in checks {
        let Some(condition) = condition else { continue };
        let mut query = Entity::find().filter(condition);
        if let Some(id) = id {
            query = query.filter(Column::Id.ne(id));
        }
        if query.one(db).await.map_err(db_err)?.is_some() {
            return Err(ModelError::Validation(format!("user with this {} already exists.", label)));
        }
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<Model, ModelError> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    let username = clean(input.username.as_deref());
    validate_len("username", username.as_deref(), USERNAME_MAX_LEN)?;
    validate_len("name", input.name.as_deref(), NAME_MAX_LEN)?;
    validate_len("last_name", input.last_name.as_deref(), NAME_MAX_LEN)?;
    validate_len("phone", input.phone.as_deref(), PHONE_MAX_LEN)?;
    validate_info(input.info.as_ref())?;
    if let Some(point) = &input.point {
        point.validate()?;
    }
    ensure_unique(db, None, username.as_deref(), Some(&email)).await?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(email),
        name: Set(clean(input.name.as_deref())),
        last_name: Set(input.last_name.unwrap_or_default().trim().to_string()),
        password: Set(input.password_hash),
        direction: Set(clean(input.direction.as_deref())),
        phone: Set(clean(input.phone.as_deref())),
        about: Set(clean(input.about.as_deref())),
        latitude: Set(input.point.map(|p| p.latitude)),
        longitude: Set(input.point.map(|p| p.longitude)),
        status: Set(input.status.unwrap_or(UserStatus::Active)),
        is_barber: Set(input.is_barber),
        is_superuser: Set(input.is_superuser),
        is_active: Set(true),
        info: Set(input.info.unwrap_or_else(|| serde_json::json!({}))),
        jwt_id: Set(Uuid::new_v4()),
        last_login: Set(None),
        last_password_change: Set(Some(now)),
        last_sync_date: Set(None),
        current_photo_id: Set(None),
        created: Set(now),
        updated: Set(now),
    };
    let created = am.insert(db).await.map_err(db_err)?;
    debug!(user_id = %created.id, "user_inserted");
    Ok(created)
}

async fn load<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Model, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(db_err)?.ok_or_else(|| ModelError::not_found("user"))
}

pub async fn update<C: ConnectionTrait>(db: &C, id: Uuid, changes: UserChanges) -> Result<Model, ModelError> {
    let email = changes.email.as_deref().map(normalize_email);
    if let Some(email) = email.as_deref() {
        validate_email(email)?;
    }
    let username = changes.username.as_deref().map(str::trim).map(str::to_string);
    validate_len("username", username.as_deref(), USERNAME_MAX_LEN)?;
    validate_len("name", changes.name.as_deref(), NAME_MAX_LEN)?;
    validate_len("last_name", changes.last_name.as_deref(), NAME_MAX_LEN)?;
    validate_len("phone", changes.phone.as_deref(), PHONE_MAX_LEN)?;
    validate_info(changes.info.as_ref())?;
    if let Some(point) = &changes.point {
        point.validate()?;
    }

    let mut am: ActiveModel = load(db, id).await?.into();
    ensure_unique(db, Some(id), username.as_deref().filter(|u| !u.is_empty()), email.as_deref()).await?;

    let now = Utc::now().into();
    if let Some(username) = username {
        am.username = Set(clean(Some(&username)));
    }
    if let Some(email) = email {
        am.email = Set(email);
    }
    if let Some(name) = changes.name {
        am.name = Set(clean(Some(&name)));
    }
    if let Some(last_name) = changes.last_name {
        am.last_name = Set(last_name.trim().to_string());
    }
    if let Some(hash) = changes.password_hash {
        am.password = Set(hash);
        am.last_password_change = Set(Some(now));
        am.jwt_id = Set(Uuid::new_v4());
    }
    if let Some(direction) = changes.direction {
        am.direction = Set(clean(Some(&direction)));
    }
    if let Some(phone) = changes.phone {
        am.phone = Set(clean(Some(&phone)));
    }
    if let Some(about) = changes.about {
        am.about = Set(clean(Some(&about)));
    }
    if let Some(point) = changes.point {
        am.latitude = Set(Some(point.latitude));
        am.longitude = Set(Some(point.longitude));
    }
    if let Some(status) = changes.status {
        am.status = Set(status);
    }
    if let Some(is_barber) = changes.is_barber {
        am.is_barber = Set(is_barber);
    }
    if let Some(is_superuser) = changes.is_superuser {
        am.is_superuser = Set(is_superuser);
    }
    if let Some(info) = changes.info {
        am.info = Set(info);
    }
    am.updated = Set(now);
    am.update(db).await.map_err(db_err)
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(db_err)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(db_err)
}

/// Case-insensitive lookup on the trimmed username.
pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    let wanted = username.trim().to_lowercase();
    if wanted.is_empty() {
        return Ok(None);
    }
    Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(Column::Username))).eq(wanted))
        .one(db)
        .await
        .map_err(db_err)
}

/// Point the weak `current_photo_id` reference at one of the user's photos.
pub async fn set_current_photo<C: ConnectionTrait>(db: &C, id: Uuid, photo_id: Option<Uuid>) -> Result<Model, ModelError> {
    let mut am: ActiveModel = load(db, id).await?.into();
    am.current_photo_id = Set(photo_id);
    am.updated = Set(Utc::now().into());
    am.update(db).await.map_err(db_err)
}

/// Store a new password hash and revoke outstanding tokens.
pub async fn set_password<C: ConnectionTrait>(db: &C, id: Uuid, password_hash: &str) -> Result<Model, ModelError> {
    let now = Utc::now().into();
    let mut am: ActiveModel = load(db, id).await?.into();
    am.password = Set(password_hash.to_string());
    am.last_password_change = Set(Some(now));
    am.jwt_id = Set(Uuid::new_v4());
    am.updated = Set(now);
    am.update(db).await.map_err(db_err)
}

/// New token nonce; tokens carrying the old one stop verifying.
pub async fn rotate_jwt_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Uuid, ModelError> {
    let next = Uuid::new_v4();
    let mut am: ActiveModel = load(db, id).await?.into();
    am.jwt_id = Set(next);
    am.updated = Set(Utc::now().into());
    am.update(db).await.map_err(db_err)?;
    debug!(user_id = %id, "jwt_id_rotated");
    Ok(next)
}

pub async fn touch_last_login<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ModelError> {
    let mut am: ActiveModel = load(db, id).await?.into();
    am.last_login = Set(Some(Utc::now().into()));
    am.update(db).await.map_err(db_err)?;
    Ok(())
}

/// Flip the account to inactive; the row stays.
pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Model, ModelError> {
    let mut am: ActiveModel = load(db, id).await?.into();
    am.status = Set(UserStatus::Inactive);
    am.updated = Set(Utc::now().into());
    let deactivated = am.update(db).await.map_err(db_err)?;
    debug!(user_id = %id, "user_deactivated");
    Ok(deactivated)
}

fn filtered(filter: &UserFilter) -> Select<Entity> {
    let mut query = Entity::find();
    if let Some(search) = filter.search.as_deref() {
        for term in search::terms(search) {
            let pattern = search::contains(&term);
            let any = [Column::Username, Column::Email, Column::Name, Column::LastName]
                .into_iter()
                .fold(Condition::any(), |any, column| {
                    any.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
                });
            query = query.filter(any);
        }
    }
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status));
    }
    if let Some(is_barber) = filter.is_barber {
        query = query.filter(Column::IsBarber.eq(is_barber));
    }
    query.order_by_asc(Column::Created).order_by_asc(Column::Id)
}

pub async fn list<C: ConnectionTrait>(db: &C, filter: &UserFilter) -> Result<Vec<Model>, ModelError> {
    filtered(filter).all(db).await.map_err(db_err)
}

pub async fn list_page<C: ConnectionTrait>(
    db: &C,
    filter: &UserFilter,
    page_idx: u64,
    per_page: u64,
) -> Result<(Vec<Model>, u64), ModelError> {
    let paginator = filtered(filter).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(db_err)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(db_err)?;
    Ok((rows, total))
}
