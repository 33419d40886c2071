//! Typed, stateless services over the `Requester`, one per resource family.
//!
//! # Design
//! Services hold no business logic of their own beyond client-side
//! validation and the session side effects of login and nickname updates.
//! They are cheap to clone and are handed to screens explicitly.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::host::{Platform, PlatformError};
use crate::request::{CallOptions, Requester};
use crate::session::Session;
use crate::types::{
    Banner, CustomerServiceConfig, Event, EventListQuery, LoginRequest, PaginatedList, User,
    UserProfile,
};
use crate::validate::validate_nickname;

/// Reason shown by the host when asking to share the profile.
pub const PROFILE_REASON: &str = "Used to complete your profile";

#[derive(Clone)]
pub struct EventService {
    client: ApiClient,
    requester: Arc<Requester>,
}

impl EventService {
    pub fn new(client: ApiClient, requester: Arc<Requester>) -> Self {
        Self { client, requester }
    }

    pub async fn list_events(
        &self,
        query: &EventListQuery,
    ) -> Result<PaginatedList<Event>, ApiError> {
        self.requester
            .call(self.client.build_list_events(query), CallOptions::default())
            .await
    }

    /// Opening a detail page is a primary navigation, so this shows the
    /// loading mask.
    pub async fn get_event(&self, id: i64) -> Result<Event, ApiError> {
        self.requester
            .call(self.client.build_get_event(id), CallOptions::with_loading())
            .await
    }

    pub async fn increment_view_count(&self, id: i64) -> Result<Event, ApiError> {
        self.requester
            .call(self.client.build_increment_view_count(id), CallOptions::default())
            .await
    }

    /// Fire-and-forget view increment. Failure is logged and dropped.
    pub fn spawn_view_increment(&self, id: i64) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.increment_view_count(id).await {
                warn!(event_id = id, error = %e, "view count increment failed");
            }
        })
    }
}

#[derive(Clone)]
pub struct BannerService {
    client: ApiClient,
    requester: Arc<Requester>,
}

impl BannerService {
    pub fn new(client: ApiClient, requester: Arc<Requester>) -> Self {
        Self { client, requester }
    }

    /// Active banners only.
    pub async fn list_banners(&self) -> Result<Vec<Banner>, ApiError> {
        self.requester
            .call(self.client.build_list_banners(), CallOptions::default())
            .await
    }
}

#[derive(Clone)]
pub struct ConfigService {
    client: ApiClient,
    requester: Arc<Requester>,
}

impl ConfigService {
    pub fn new(client: ApiClient, requester: Arc<Requester>) -> Self {
        Self { client, requester }
    }

    pub async fn customer_service(&self) -> Result<CustomerServiceConfig, ApiError> {
        self.requester
            .call(self.client.build_customer_service(), CallOptions::default())
            .await
    }
}

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    requester: Arc<Requester>,
    session: Session,
    platform: Arc<dyn Platform>,
}

impl AuthService {
    pub fn new(
        client: ApiClient,
        requester: Arc<Requester>,
        session: Session,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            client,
            requester,
            session,
            platform,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchange a platform login code for a user and cache it.
    pub async fn login(&self, code: &str, profile: Option<UserProfile>) -> Result<User, ApiError> {
        let profile = profile.unwrap_or_default();
        let input = LoginRequest {
            code: code.to_string(),
            nick_name: profile.nick_name,
            avatar_url: profile.avatar_url,
        };
        let request = self.client.build_login(&input)?;
        let user: User = self.requester.call(request, CallOptions::with_loading()).await?;
        self.cache_user(&user);
        info!(open_id = %user.open_id, "logged in");
        Ok(user)
    }

    /// Obtain a login code from the platform, then `login`.
    pub async fn wx_login(&self, profile: Option<UserProfile>) -> Result<User, ApiError> {
        let code = match self.platform.login_code().await {
            Ok(code) if !code.is_empty() => code,
            Ok(_) | Err(PlatformError::Failed(_)) => {
                return Err(ApiError::Transport("platform login failed".to_string()))
            }
            Err(PlatformError::Denied(reason)) => return Err(ApiError::PermissionDenied(reason)),
        };
        self.login(&code, profile).await
    }

    /// Ask the user to share nickname and avatar. Any refusal is reported as
    /// `PermissionDenied` so callers can skip the failure toast.
    pub async fn request_profile(&self) -> Result<UserProfile, ApiError> {
        self.platform
            .user_profile(PROFILE_REASON)
            .await
            .map_err(|e| ApiError::PermissionDenied(e.to_string()))
    }

    pub async fn get_user(&self, open_id: &str) -> Result<User, ApiError> {
        self.requester
            .call(self.client.build_get_user(open_id), CallOptions::default())
            .await
    }

    /// Validate locally, then update. Invalid input never reaches the network.
    pub async fn update_nickname(&self, open_id: &str, raw: &str) -> Result<User, ApiError> {
        let nick_name = validate_nickname(raw)?;
        let request = self.client.build_update_nickname(open_id, &nick_name);
        let user: User = self.requester.call(request, CallOptions::with_loading()).await?;
        self.cache_user(&user);
        Ok(user)
    }

    /// The server already accepted the change, so a local write failure
    /// only costs the cache.
    fn cache_user(&self, user: &User) {
        if let Err(e) = self.session.save_user(user) {
            warn!(open_id = %user.open_id, error = %e, "caching user failed");
        }
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()
    }
}

/// All services wired over one requester.
#[derive(Clone)]
pub struct Services {
    pub events: EventService,
    pub banners: BannerService,
    pub config: ConfigService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(
        client: ApiClient,
        requester: Arc<Requester>,
        session: Session,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            events: EventService::new(client.clone(), requester.clone()),
            banners: BannerService::new(client.clone(), requester.clone()),
            config: ConfigService::new(client.clone(), requester.clone()),
            auth: AuthService::new(client, requester, session, platform),
        }
    }
}
