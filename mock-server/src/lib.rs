//! In-memory stand-in for the events backend.
//!
//! Every response uses the `{code, message, data}` envelope; errors carry the
//! HTTP status in `code` and a null `data`.

mod error;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub use error::ServerError;

pub const MAX_PAGE_SIZE: u32 = 100;
pub const NICKNAME_MAX_CHARS: usize = 20;
const NICKNAME_PREFIXES: &[&str] = &["Striker", "Keeper", "Winger", "Captain", "Playmaker"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub view_count: u64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Banner {
    pub id: i64,
    pub image_url: String,
    pub title: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerServiceConfig {
    pub id: i64,
    pub qr_code_url: String,
    pub online_time: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub open_id: String,
    pub nick_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_login_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListEvents {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListBanners {
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub code: String,
    pub nick_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub open_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NicknameQuery {
    pub open_id: String,
    pub nick_name: String,
}

#[derive(Debug, Default)]
pub struct Store {
    pub events: Vec<Event>,
    pub banners: Vec<Banner>,
    pub users: HashMap<String, User>,
    pub customer_service: Option<CustomerServiceConfig>,
    next_user_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<Json<Envelope<T>>, ServerError>;

fn ok<T>(message: &str, data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        code: 200,
        message: message.to_string(),
        data: Some(data),
    }))
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .unwrap_or_default()
}

fn default_customer_service() -> CustomerServiceConfig {
    CustomerServiceConfig {
        id: 1,
        qr_code_url: "/uploads/customer-service-qr.png".to_string(),
        online_time: "09:00-21:00".to_string(),
        updated_at: at(2024, 6, 1, 9),
    }
}

impl Store {
    /// Empty apart from the customer-service config.
    pub fn new() -> Self {
        Self {
            customer_service: Some(default_customer_service()),
            next_user_id: 1,
            ..Self::default()
        }
    }

    /// Sample events, banners (one inactive) and the customer-service config.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.events = vec![
            Event {
                id: 1,
                title: "Opening match: Germany vs Scotland".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap_or_default(),
                content: Some(
                    "## Kick-off\n\nThe tournament opens in Munich.\n\n![stadium](/uploads/munich.png)"
                        .to_string(),
                ),
                cover_image: Some("/uploads/opening.png".to_string()),
                view_count: 12_345,
                created_at: at(2024, 6, 10, 8),
                updated_at: at(2024, 6, 10, 8),
            },
            Event {
                id: 2,
                title: "Group stage recap".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 6, 27).unwrap_or_default(),
                content: Some("All **36** group games in one place.".to_string()),
                cover_image: None,
                view_count: 980,
                created_at: at(2024, 6, 27, 22),
                updated_at: at(2024, 6, 27, 22),
            },
            Event {
                id: 3,
                title: "Final: Spain vs England".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 7, 14).unwrap_or_default(),
                content: None,
                cover_image: Some("https://cdn.example.com/final.png".to_string()),
                view_count: 0,
                created_at: at(2024, 7, 1, 12),
                updated_at: at(2024, 7, 1, 12),
            },
        ];
        store.banners = vec![
            Banner {
                id: 1,
                image_url: "/uploads/banner-final.png".to_string(),
                title: Some("The final".to_string()),
                link_url: Some("/pages/event-detail/index?id=3".to_string()),
                sort_order: 1,
                is_active: true,
                created_at: at(2024, 6, 1, 9),
                updated_at: at(2024, 6, 1, 9),
            },
            Banner {
                id: 2,
                image_url: "/uploads/banner-groups.png".to_string(),
                title: None,
                link_url: None,
                sort_order: 2,
                is_active: true,
                created_at: at(2024, 6, 1, 9),
                updated_at: at(2024, 6, 1, 9),
            },
            Banner {
                id: 3,
                image_url: "/uploads/banner-old.png".to_string(),
                title: Some("Qualifiers".to_string()),
                link_url: None,
                sort_order: 0,
                is_active: false,
                created_at: at(2023, 11, 1, 9),
                updated_at: at(2023, 11, 1, 9),
            },
        ];
        store
    }
}

fn router(db: Db) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/events", get(list_events))
        .route("/api/events/{id}", get(get_event))
        .route("/api/events/{id}/view", post(increment_view))
        .route("/api/banners", get(list_banners))
        .route("/api/config/customer-service", get(customer_service))
        .route("/api/auth/login", post(login))
        .route("/api/auth/user", get(get_user))
        .route("/api/auth/user/nickname", put(update_nickname))
        .with_state(db)
}

pub fn app() -> Router {
    router(Arc::new(RwLock::new(Store::new())))
}

pub fn seeded() -> Router {
    router(Arc::new(RwLock::new(Store::seeded())))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, seeded()).await
}

async fn health() -> ApiResult<serde_json::Value> {
    ok("ok", serde_json::json!({ "status": "healthy" }))
}

async fn list_events(
    State(db): State<Db>,
    Query(params): Query<ListEvents>,
) -> ApiResult<Page<Event>> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(10);
    if page < 1 {
        return Err(ServerError::BadRequest("page must be at least 1".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ServerError::BadRequest(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let keyword = params.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());

    let store = db.read().await;
    let mut matching: Vec<&Event> = store
        .events
        .iter()
        .filter(|e| keyword.is_none_or(|k| e.title.contains(k)))
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let total = matching.len() as u64;
    let offset = (page as usize - 1) * page_size as usize;
    let items = matching
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .cloned()
        .collect();
    debug!(page, page_size, ?keyword, total, "list events");
    ok(
        "success",
        Page {
            items,
            total,
            page,
            page_size,
            has_more: u64::from(page) * u64::from(page_size) < total,
        },
    )
}

async fn get_event(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Event> {
    let store = db.read().await;
    let event = store
        .events
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .ok_or_else(|| ServerError::NotFound("event not found".to_string()))?;
    ok("success", event)
}

async fn increment_view(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Event> {
    let mut store = db.write().await;
    let event = store
        .events
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| ServerError::NotFound("event not found".to_string()))?;
    event.view_count += 1;
    ok("view recorded", event.clone())
}

async fn list_banners(
    State(db): State<Db>,
    Query(params): Query<ListBanners>,
) -> ApiResult<Vec<Banner>> {
    let store = db.read().await;
    let mut banners: Vec<Banner> = store
        .banners
        .iter()
        .filter(|b| params.is_active.is_none_or(|active| b.is_active == active))
        .cloned()
        .collect();
    banners.sort_by_key(|b| (b.sort_order, b.id));
    ok("success", banners)
}

async fn customer_service(State(db): State<Db>) -> ApiResult<CustomerServiceConfig> {
    let store = db.read().await;
    let config = store
        .customer_service
        .clone()
        .ok_or_else(|| ServerError::NotFound("customer service not configured".to_string()))?;
    ok("success", config)
}

fn random_nickname() -> String {
    let mut rng = rand::thread_rng();
    let prefix = NICKNAME_PREFIXES.choose(&mut rng).copied().unwrap_or("Fan");
    format!("{prefix}{}", rng.gen_range(1000..10000))
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> ApiResult<User> {
    let code = input.code.trim();
    if code.is_empty() {
        return Err(ServerError::BadRequest("code is required".to_string()));
    }
    let open_id = format!("mock-openid-{code}");
    let now = Utc::now().naive_utc();

    let mut store = db.write().await;
    if let Some(user) = store.users.get_mut(&open_id) {
        if input.nick_name.is_some() {
            user.nick_name = input.nick_name;
        }
        if input.avatar_url.is_some() {
            user.avatar_url = input.avatar_url;
        }
        user.last_login_at = now;
        debug!(%open_id, "returning user");
        return ok("login succeeded", user.clone());
    }

    let id = store.next_user_id;
    store.next_user_id += 1;
    let user = User {
        id,
        open_id: open_id.clone(),
        nick_name: Some(input.nick_name.unwrap_or_else(random_nickname)),
        avatar_url: input.avatar_url,
        created_at: now,
        last_login_at: now,
    };
    store.users.insert(open_id.clone(), user.clone());
    info!(%open_id, "user created");
    ok("login succeeded", user)
}

async fn get_user(State(db): State<Db>, Query(query): Query<UserQuery>) -> ApiResult<User> {
    let store = db.read().await;
    let user = store
        .users
        .get(&query.open_id)
        .cloned()
        .ok_or_else(|| ServerError::NotFound("user not found".to_string()))?;
    ok("success", user)
}

async fn update_nickname(
    State(db): State<Db>,
    Query(query): Query<NicknameQuery>,
) -> ApiResult<User> {
    let nick_name = query.nick_name.trim();
    if nick_name.is_empty() {
        return Err(ServerError::BadRequest("nickname cannot be empty".to_string()));
    }
    if nick_name.chars().count() > NICKNAME_MAX_CHARS {
        return Err(ServerError::BadRequest(format!(
            "nickname cannot exceed {NICKNAME_MAX_CHARS} characters"
        )));
    }
    let mut store = db.write().await;
    let user = store
        .users
        .get_mut(&query.open_id)
        .ok_or_else(|| ServerError::NotFound("user not found".to_string()))?;
    user.nick_name = Some(nick_name.to_string());
    ok("nickname updated", user.clone())
}
