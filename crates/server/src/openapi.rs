use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct TokenRequestDoc {
    /// Username, or the email address.
    pub username: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct RefreshRequestDoc { pub refresh: String }

#[derive(ToSchema)]
pub struct RefreshedTokenDoc { pub token: String }

#[derive(ToSchema)]
pub struct ChangePasswordDoc { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct ClaimsDoc {
    pub token: String,
    pub refresh: String,
    pub jwt_id: Uuid,
    #[schema(value_type = Object)]
    pub info: serde_json::Value,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub name: String,
    pub danger: Option<String>,
    pub warn: Vec<String>,
}

#[derive(ToSchema)]
pub struct HairCutImageDoc { pub id: Uuid, pub image: Option<String>, pub default: bool }

#[derive(ToSchema)]
pub struct HairCutDoc {
    pub id: Uuid,
    pub code: Option<String>,
    pub description: Option<String>,
    #[schema(example = "15.00")]
    pub price: String,
    pub minutes: i32,
    pub is_active: bool,
    pub images: Vec<HairCutImageDoc>,
    pub images_display: Vec<String>,
    pub created: String,
    pub updated: String,
}

#[derive(ToSchema)]
pub struct HairCutPageDoc { pub count: u64, pub page: u64, pub per_page: u64, pub results: Vec<HairCutDoc> }

#[derive(ToSchema)]
pub struct HairCutFormDoc {
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub minutes: Option<i32>,
    pub is_active: Option<bool>,
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<String>,
}

#[derive(ToSchema)]
pub struct PointDoc { pub latitude: f64, pub longitude: f64 }

#[derive(ToSchema)]
pub struct PhotoDoc { pub id: Uuid, pub photo: Option<String>, pub created: String }

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub point: Option<PointDoc>,
    pub status: i16,
    pub status_display: String,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    #[schema(value_type = Object)]
    pub info: serde_json::Value,
    pub last_login: Option<String>,
    pub created: String,
    pub updated: String,
    pub photo: Option<String>,
    pub current_photo: Option<PhotoDoc>,
}

#[derive(ToSchema)]
pub struct UserPageDoc { pub count: u64, pub page: u64, pub per_page: u64, pub results: Vec<UserDoc> }

#[derive(ToSchema)]
pub struct UserFormDoc {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub point: Option<PointDoc>,
    pub status: Option<i16>,
    pub is_barber: Option<bool>,
    pub is_superuser: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub info: Option<serde_json::Value>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub photo: Option<String>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::haircuts::list,
        crate::routes::haircuts::create,
        crate::routes::haircuts::get,
        crate::routes::haircuts::update,
        crate::routes::haircuts::delete,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::auth::obtain_token,
        crate::routes::auth::refresh_token,
        crate::routes::auth::change_password,
    ),
    components(
        schemas(
            HealthResponse,
            TokenRequestDoc,
            RefreshRequestDoc,
            RefreshedTokenDoc,
            ChangePasswordDoc,
            ClaimsDoc,
            HairCutImageDoc,
            HairCutDoc,
            HairCutPageDoc,
            HairCutFormDoc,
            PointDoc,
            PhotoDoc,
            UserDoc,
            UserPageDoc,
            UserFormDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "haircut"),
        (name = "user"),
        (name = "auth")
    )
)]
pub struct ApiDoc;
