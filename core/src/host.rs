//! Seams to the host mini-program platform.
//!
//! # Design
//! Rendering, navigation, login codes and album access belong to the host.
//! The core only talks to it through two traits: [`Feedback`] for the
//! synchronous UI side effects (loading mask, toasts, pull-to-refresh) and
//! [`Platform`] for the asynchronous, possibly permission-gated calls.
//! `RecordingFeedback` and `ScriptedPlatform` are in-memory implementations
//! for headless hosts and tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::UserProfile;

pub const TOAST_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastIcon {
    Success,
    None,
}

/// A short, non-blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub icon: ToastIcon,
    pub duration: Duration,
}

impl Toast {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: ToastIcon::None,
            duration: TOAST_DURATION,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self {
            icon: ToastIcon::Success,
            ..Self::info(title)
        }
    }
}

/// A blocking confirm dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub content: String,
    pub confirm_text: Option<String>,
}

impl Modal {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            confirm_text: None,
        }
    }

    pub fn with_confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }
}

/// Synchronous UI side effects.
pub trait Feedback: Send + Sync {
    fn show_loading(&self, text: &str);
    fn hide_loading(&self);
    fn show_toast(&self, toast: &Toast);
    /// Tell the host's pull-to-refresh control the refresh finished.
    fn stop_pull_down_refresh(&self);
    fn navigate_to(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The user or the OS declined (profile sharing, album write...).
    #[error("denied: {0}")]
    Denied(String),

    #[error("platform call failed: {0}")]
    Failed(String),
}

/// Asynchronous host platform calls.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Obtain a one-time login code from the host platform.
    async fn login_code(&self) -> Result<String, PlatformError>;
    /// Ask the user to share profile details; `reason` is shown in the prompt.
    async fn user_profile(&self, reason: &str) -> Result<UserProfile, PlatformError>;
    /// Show a modal and report whether the user confirmed.
    async fn confirm(&self, modal: &Modal) -> bool;
    async fn save_image_to_album(&self, url: &str) -> Result<(), PlatformError>;
    async fn open_setting(&self);
}

/// Shows the loading mask on creation and hides it on drop, so every exit
/// path of a request (success, error, cancellation) dismisses it.
pub struct LoadingGuard<'a> {
    feedback: &'a dyn Feedback,
}

impl<'a> LoadingGuard<'a> {
    pub fn show(feedback: &'a dyn Feedback, text: &str) -> Self {
        feedback.show_loading(text);
        Self { feedback }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.feedback.hide_loading();
    }
}

/// One recorded `Feedback` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    ShowLoading(String),
    HideLoading,
    Toast(Toast),
    StopPullDownRefresh,
    NavigateTo(String),
}

/// `Feedback` that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    events: Mutex<Vec<FeedbackEvent>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: FeedbackEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// True when every shown loading mask was hidden again.
    pub fn loading_balanced(&self) -> bool {
        let events = self.events();
        let shown = events
            .iter()
            .filter(|e| matches!(e, FeedbackEvent::ShowLoading(_)))
            .count();
        let hidden = events
            .iter()
            .filter(|e| matches!(e, FeedbackEvent::HideLoading))
            .count();
        shown == hidden
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Feedback for RecordingFeedback {
    fn show_loading(&self, text: &str) {
        self.record(FeedbackEvent::ShowLoading(text.to_string()));
    }

    fn hide_loading(&self) {
        self.record(FeedbackEvent::HideLoading);
    }

    fn show_toast(&self, toast: &Toast) {
        self.record(FeedbackEvent::Toast(toast.clone()));
    }

    fn stop_pull_down_refresh(&self) {
        self.record(FeedbackEvent::StopPullDownRefresh);
    }

    fn navigate_to(&self, url: &str) {
        self.record(FeedbackEvent::NavigateTo(url.to_string()));
    }
}

/// `Platform` answering from pre-loaded scripts. Unscripted login codes and
/// profiles fail; unscripted confirms answer `false`; saves succeed.
#[derive(Debug, Default)]
pub struct ScriptedPlatform {
    login_codes: Mutex<VecDeque<Result<String, PlatformError>>>,
    profiles: Mutex<VecDeque<Result<UserProfile, PlatformError>>>,
    confirms: Mutex<VecDeque<bool>>,
    saves: Mutex<VecDeque<Result<(), PlatformError>>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login_code(&self, code: Result<String, PlatformError>) {
        if let Ok(mut q) = self.login_codes.lock() {
            q.push_back(code);
        }
    }

    pub fn push_profile(&self, profile: Result<UserProfile, PlatformError>) {
        if let Ok(mut q) = self.profiles.lock() {
            q.push_back(profile);
        }
    }

    pub fn push_confirm(&self, answer: bool) {
        if let Ok(mut q) = self.confirms.lock() {
            q.push_back(answer);
        }
    }

    pub fn push_save(&self, result: Result<(), PlatformError>) {
        if let Ok(mut q) = self.saves.lock() {
            q.push_back(result);
        }
    }

    /// Names of the platform calls made so far, e.g. `confirm:Save QR code`.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn note(&self, call: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(call);
        }
    }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().ok().and_then(|mut q| q.pop_front())
}

#[async_trait]
impl Platform for ScriptedPlatform {
    async fn login_code(&self) -> Result<String, PlatformError> {
        self.note("login_code".to_string());
        pop(&self.login_codes)
            .unwrap_or_else(|| Err(PlatformError::Failed("no login code scripted".to_string())))
    }

    async fn user_profile(&self, reason: &str) -> Result<UserProfile, PlatformError> {
        self.note(format!("user_profile:{reason}"));
        pop(&self.profiles)
            .unwrap_or_else(|| Err(PlatformError::Failed("no profile scripted".to_string())))
    }

    async fn confirm(&self, modal: &Modal) -> bool {
        self.note(format!("confirm:{}", modal.title));
        pop(&self.confirms).unwrap_or(false)
    }

    async fn save_image_to_album(&self, url: &str) -> Result<(), PlatformError> {
        self.note(format!("save_image:{url}"));
        pop(&self.saves).unwrap_or(Ok(()))
    }

    async fn open_setting(&self) {
        self.note("open_setting".to_string());
    }
}
