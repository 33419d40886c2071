use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::components::{QrCodeModal, SaveOutcome};
use crate::error::ApiError;
use crate::host::{Feedback, Platform, Toast};
use crate::markdown::resolve_asset_url;
use crate::services::{AuthService, ConfigService};
use crate::types::{CustomerServiceConfig, User};
use crate::validate::validate_nickname;

pub const GUEST_NAME: &str = "Not signed in";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Guest,
    SignedIn,
}

/// User card, login, nickname editing and the customer-service QR code.
pub struct ProfileScreen {
    auth: AuthService,
    config: ConfigService,
    platform: Arc<dyn Platform>,
    feedback: Arc<dyn Feedback>,
    base_url: String,
    user: Option<User>,
    customer_service: Option<CustomerServiceConfig>,
    qr_modal: Option<QrCodeModal>,
    nickname_draft: Option<String>,
}

impl ProfileScreen {
    pub fn new(
        auth: AuthService,
        config: ConfigService,
        platform: Arc<dyn Platform>,
        feedback: Arc<dyn Feedback>,
        base_url: &str,
    ) -> Self {
        Self {
            auth,
            config,
            platform,
            feedback,
            base_url: base_url.to_string(),
            user: None,
            customer_service: None,
            qr_modal: None,
            nickname_draft: None,
        }
    }

    /// Mount: restore the cached user, then fetch the customer-service
    /// config. A config failure only leaves the QR entry unavailable.
    pub async fn load(&mut self) {
        self.user = self.auth.session().current_user();
        match self.config.customer_service().await {
            Ok(config) => {
                self.qr_modal = Some(QrCodeModal::new(config.qr_code_url.clone()));
                self.customer_service = Some(config);
            }
            Err(e) => warn!(error = %e, "customer service config unavailable"),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        if self.user.is_some() {
            AuthState::SignedIn
        } else {
            AuthState::Guest
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.nick_name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(GUEST_NAME)
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.avatar_url.as_deref())
            .filter(|a| !a.is_empty())
            .map(|a| resolve_asset_url(&self.base_url, a))
    }

    /// Profile consent followed by platform login. Refusing consent is
    /// silent; any other failure toasts.
    pub async fn authorize(&mut self) -> Result<(), ApiError> {
        let result = match self.auth.request_profile().await {
            Ok(profile) => self.auth.wx_login(Some(profile)).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(user) => {
                info!(open_id = %user.open_id, "profile authorized");
                self.user = Some(user);
                self.feedback.show_toast(&Toast::success("login succeeded"));
                Ok(())
            }
            Err(e) if e.is_permission_denied() => {
                debug!(error = %e, "authorization declined");
                Err(e)
            }
            Err(e) => {
                self.feedback.show_toast(&Toast::info("login failed"));
                Err(e)
            }
        }
    }

    pub fn customer_service(&self) -> Option<&CustomerServiceConfig> {
        self.customer_service.as_ref()
    }

    pub fn show_qr_code(&mut self) {
        match &mut self.qr_modal {
            Some(modal) => modal.open(),
            None => self
                .feedback
                .show_toast(&Toast::info("customer service info loading")),
        }
    }

    pub fn close_qr_code(&mut self) {
        if let Some(modal) = &mut self.qr_modal {
            modal.close();
        }
    }

    pub fn qr_modal(&self) -> Option<&QrCodeModal> {
        self.qr_modal.as_ref()
    }

    pub async fn save_qr_code(&self) -> Option<SaveOutcome> {
        let modal = self.qr_modal.as_ref().filter(|m| m.is_visible())?;
        Some(
            modal
                .long_press_save(&self.base_url, self.platform.as_ref(), self.feedback.as_ref())
                .await,
        )
    }

    /// Open the nickname editor pre-filled with the current nickname.
    pub fn start_edit_nickname(&mut self) {
        if let Some(user) = &self.user {
            self.nickname_draft = Some(user.nick_name.clone().unwrap_or_default());
        }
    }

    pub fn is_editing_nickname(&self) -> bool {
        self.nickname_draft.is_some()
    }

    pub fn nickname_draft(&self) -> Option<&str> {
        self.nickname_draft.as_deref()
    }

    pub fn set_nickname_draft(&mut self, text: &str) {
        if let Some(draft) = &mut self.nickname_draft {
            *draft = text.to_string();
        }
    }

    /// Invalid drafts toast the validation message and keep the editor open.
    /// A failed request keeps it open as well; the requester has already
    /// toasted.
    pub async fn save_nickname(&mut self) -> Result<(), ApiError> {
        let (Some(draft), Some(user)) = (&self.nickname_draft, &self.user) else {
            return Ok(());
        };
        let nick_name = match validate_nickname(draft) {
            Ok(nick_name) => nick_name,
            Err(e) => {
                self.feedback.show_toast(&Toast::info(e.to_string()));
                return Err(e.into());
            }
        };
        let open_id = user.open_id.clone();
        let updated = self.auth.update_nickname(&open_id, &nick_name).await?;
        self.user = Some(updated);
        self.nickname_draft = None;
        self.feedback.show_toast(&Toast::success("nickname updated"));
        Ok(())
    }

    pub fn cancel_edit_nickname(&mut self) {
        self.nickname_draft = None;
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.auth.logout()?;
        self.user = None;
        self.nickname_draft = None;
        Ok(())
    }
}
