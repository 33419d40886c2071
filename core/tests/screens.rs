//! Screen state machines driven against a scripted backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    banner_json, customer_service_json, event_json, page_json, user_json, Harness,
    ReadOnlyStorage, BASE_URL,
};
use matchday_core::host::{FeedbackEvent, PlatformError};
use matchday_core::screens::{
    AuthState, DetailView, EventDetailScreen, HomeScreen, ListView, ProfileScreen, SearchScreen,
    INVALID_EVENT_ID,
};
use matchday_core::{Toast, User, UserProfile};

fn home(h: &Harness) -> HomeScreen {
    HomeScreen::new(
        h.services.events.clone(),
        h.services.banners.clone(),
        h.feedback.clone(),
        BASE_URL,
        20,
    )
}

fn search(h: &Harness) -> SearchScreen {
    SearchScreen::new(h.services.events.clone(), h.feedback.clone(), BASE_URL, 20)
}

fn detail(h: &Harness) -> EventDetailScreen {
    EventDetailScreen::new(h.services.events.clone(), h.services.config.clone(), BASE_URL)
}

fn profile(h: &Harness) -> ProfileScreen {
    ProfileScreen::new(
        h.services.auth.clone(),
        h.services.config.clone(),
        h.platform.clone(),
        h.feedback.clone(),
        BASE_URL,
    )
}

// --- home ---

#[tokio::test]
async fn home_banner_failure_keeps_event_list() {
    let h = Harness::new();
    h.backend.unreachable("GET", "/api/banners");
    h.backend
        .ok("GET", "/api/events", page_json(vec![event_json(1, "Opening match", 10)]));

    let mut screen = home(&h);
    screen.load().await;

    match screen.view() {
        ListView::Populated(events) => assert_eq!(events[0].title, "Opening match"),
        other => panic!("expected populated list, got {other:?}"),
    }
    assert!(screen.banners().is_empty());
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn home_requests_first_page_and_active_banners() {
    let h = Harness::new();
    h.backend.ok(
        "GET",
        "/api/banners",
        serde_json::json!([banner_json(1, "/uploads/b1.png"), banner_json(2, "https://cdn/b2.png")]),
    );
    h.backend.ok("GET", "/api/events", page_json(vec![]));

    let mut screen = home(&h);
    screen.load().await;

    let mut paths = h.backend.paths();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "GET /api/banners?is_active=true",
            "GET /api/events?page=1&page_size=20",
        ]
    );
    assert_eq!(
        screen.banner_images(),
        vec!["http://stub/uploads/b1.png", "https://cdn/b2.png"]
    );
}

#[tokio::test]
async fn home_empty_then_populated_on_retry() {
    let h = Harness::new();
    h.backend.ok("GET", "/api/banners", serde_json::json!([]));
    h.backend.ok("GET", "/api/events", page_json(vec![]));

    let mut screen = home(&h);
    screen.load().await;
    assert_eq!(screen.view(), ListView::Empty { searching: false });

    h.backend
        .ok("GET", "/api/events", page_json(vec![event_json(2, "Recap", 3)]));
    screen.retry().await;
    assert!(matches!(screen.view(), ListView::Populated(events) if events.len() == 1));
    let cards = screen.cards();
    assert_eq!(cards[0].cover_url.as_deref(), Some("http://stub/uploads/cover.png"));
    assert_eq!(cards[0].date, "06-14");
}

#[tokio::test]
async fn home_event_failure_shows_error_until_retry() {
    let h = Harness::new();
    h.backend.ok("GET", "/api/banners", serde_json::json!([]));
    h.backend.business_error("GET", "/api/events", 500, "database unavailable");

    let mut screen = home(&h);
    screen.load().await;
    assert_eq!(screen.view(), ListView::Error("database unavailable"));
    assert!(h
        .feedback
        .toasts()
        .contains(&Toast::info("database unavailable")));

    h.backend
        .ok("GET", "/api/events", page_json(vec![event_json(1, "Back", 0)]));
    screen.retry().await;
    assert!(matches!(screen.view(), ListView::Populated(_)));
}

#[tokio::test]
async fn home_refresh_always_stops_indicator() {
    let h = Harness::new();
    h.backend.unreachable("GET", "/api/banners");
    h.backend.unreachable("GET", "/api/events");

    let mut screen = home(&h);
    screen.on_pull_down_refresh().await;

    assert_eq!(screen.view(), ListView::Error("load failed"));
    assert_eq!(
        h.feedback.events().last(),
        Some(&FeedbackEvent::StopPullDownRefresh)
    );
}

// --- search ---

#[tokio::test]
async fn search_distinguishes_no_matches_from_no_events() {
    let h = Harness::new();
    h.backend.ok("GET", "/api/events", page_json(vec![]));

    let mut screen = search(&h);
    screen.load().await;
    assert_eq!(screen.view(), ListView::Empty { searching: false });
    assert_eq!(screen.empty_message(), "No events yet");

    screen.on_search("final").await;
    assert_eq!(screen.view(), ListView::Empty { searching: true });
    assert_eq!(screen.empty_message(), "No matching events");

    screen.on_clear().await;
    assert_eq!(screen.keyword(), "");
    assert_eq!(
        h.backend.paths(),
        vec![
            "GET /api/events?page=1&page_size=20",
            "GET /api/events?page=1&page_size=20&keyword=final",
            "GET /api/events?page=1&page_size=20",
        ]
    );
}

#[tokio::test]
async fn search_refresh_reuses_committed_keyword() {
    let h = Harness::new();
    h.backend
        .ok("GET", "/api/events", page_json(vec![event_json(3, "Final", 5)]));

    let mut screen = search(&h);
    screen.on_search("final").await;
    h.backend.clear_requests();
    screen.on_pull_down_refresh().await;

    assert_eq!(
        h.backend.paths(),
        vec!["GET /api/events?page=1&page_size=20&keyword=final"]
    );
    assert_eq!(
        h.feedback.events().last(),
        Some(&FeedbackEvent::StopPullDownRefresh)
    );
}

#[tokio::test(start_paused = true)]
async fn search_bar_keystrokes_issue_one_request() {
    let h = Harness::new();
    h.backend.ok("GET", "/api/events", page_json(vec![]));
    let mut screen = search(&h);
    let (mut bar, mut searches) = SearchScreen::search_bar(Duration::from_millis(500));

    bar.on_input("f");
    tokio::time::sleep(Duration::from_millis(100)).await;
    bar.on_input("fi");
    tokio::time::sleep(Duration::from_millis(100)).await;
    bar.on_input("final");
    assert!(!screen.drain_searches(&mut searches).await);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(screen.drain_searches(&mut searches).await);
    assert_eq!(screen.keyword(), "final");
    assert_eq!(
        h.backend.paths(),
        vec!["GET /api/events?page=1&page_size=20&keyword=final"]
    );
}

// --- detail ---

#[tokio::test]
async fn detail_rejects_bad_route_ids() {
    let h = Harness::new();
    let mut screen = detail(&h);
    for id in [None, Some("abc"), Some("12abc"), Some("0"), Some("-4")] {
        screen.load_from_route(id).await;
        assert_eq!(screen.view(), DetailView::Error(INVALID_EVENT_ID), "{id:?}");
    }
    assert!(h.backend.requests().is_empty());
}

#[tokio::test]
async fn detail_loads_content_and_counts_view() {
    let h = Harness::new();
    h.backend
        .ok("GET", "/api/events/1", event_json(1, "Opening match", 12_345));
    h.backend
        .ok("GET", "/api/config/customer-service", customer_service_json());
    h.backend
        .ok("POST", "/api/events/1/view", event_json(1, "Opening match", 12_346));

    let mut screen = detail(&h);
    screen.load_from_route(Some("1")).await;

    let DetailView::Content(content) = screen.view() else {
        panic!("expected content, got {:?}", screen.view());
    };
    assert_eq!(content.title, "Opening match");
    assert_eq!(content.published_at, "2024-06-10 08:00");
    assert_eq!(content.views, "12345 views");
    assert_eq!(content.qr_code_url, "http://stub/uploads/qr.png");
    assert!(content.body_html.contains("<strong>21:00</strong>"));
    assert!(content
        .body_html
        .contains(r#"src="http://stub/uploads/pitch.png" style="width: 100%"#));

    screen.take_view_increment().unwrap().await.unwrap();
    assert!(h
        .backend
        .paths()
        .contains(&"POST /api/events/1/view".to_string()));
    assert!(h.feedback.loading_balanced());
}

#[tokio::test]
async fn detail_fails_when_config_fails() {
    let h = Harness::new();
    h.backend.ok("GET", "/api/events/1", event_json(1, "Opening match", 1));
    h.backend
        .business_error("GET", "/api/config/customer-service", 500, "config missing");

    let mut screen = detail(&h);
    screen.load(1).await;
    assert_eq!(screen.view(), DetailView::Error("config missing"));
    assert!(screen.take_view_increment().is_none());

    h.backend
        .ok("GET", "/api/config/customer-service", customer_service_json());
    screen.retry().await;
    assert!(matches!(screen.view(), DetailView::Content(_)));
}

#[tokio::test]
async fn detail_view_increment_failure_keeps_content() {
    let h = Harness::new();
    h.backend.ok("GET", "/api/events/2", event_json(2, "Recap", 1));
    h.backend
        .ok("GET", "/api/config/customer-service", customer_service_json());
    h.backend.unreachable("POST", "/api/events/2/view");

    let mut screen = detail(&h);
    screen.load(2).await;
    screen.take_view_increment().unwrap().await.unwrap();

    let DetailView::Content(content) = screen.view() else {
        panic!("expected content");
    };
    assert_eq!(content.views, "1 view");
}

// --- profile ---

#[tokio::test]
async fn profile_authorize_signs_in() {
    let h = Harness::new();
    h.backend
        .ok("GET", "/api/config/customer-service", customer_service_json());
    h.backend
        .ok("POST", "/api/auth/login", user_json("mock-openid-c1", "Kaiser"));
    h.platform.push_profile(Ok(UserProfile {
        nick_name: Some("Kaiser".to_string()),
        avatar_url: None,
    }));
    h.platform.push_login_code(Ok("c1".to_string()));

    let mut screen = profile(&h);
    screen.load().await;
    assert_eq!(screen.auth_state(), AuthState::Guest);
    assert_eq!(screen.display_name(), "Not signed in");

    screen.authorize().await.unwrap();
    assert_eq!(screen.auth_state(), AuthState::SignedIn);
    assert_eq!(screen.display_name(), "Kaiser");
    assert_eq!(h.session.open_id().as_deref(), Some("mock-openid-c1"));
    assert_eq!(h.feedback.toasts(), vec![Toast::success("login succeeded")]);

    let login = h
        .backend
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/api/auth/login"))
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(login.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({"code": "c1", "nick_name": "Kaiser"}));
}

#[tokio::test]
async fn profile_denial_is_silent() {
    let h = Harness::new();
    h.platform
        .push_profile(Err(PlatformError::Denied("getUserProfile:fail auth deny".to_string())));

    let mut screen = profile(&h);
    let err = screen.authorize().await.unwrap_err();
    assert!(err.is_permission_denied());
    assert!(h.feedback.toasts().is_empty());
    assert!(h.backend.requests().is_empty());
    assert_eq!(screen.auth_state(), AuthState::Guest);
}

#[tokio::test]
async fn profile_login_failure_toasts() {
    let h = Harness::new();
    h.platform.push_profile(Ok(UserProfile::default()));
    h.platform.push_login_code(Ok("c2".to_string()));
    h.backend.business_error("POST", "/api/auth/login", 500, "wechat unavailable");

    let mut screen = profile(&h);
    assert!(screen.authorize().await.is_err());
    assert_eq!(
        h.feedback.toasts(),
        vec![Toast::info("wechat unavailable"), Toast::info("login failed")]
    );
    assert!(!h.session.is_logged_in());
}

#[tokio::test]
async fn profile_sign_in_survives_cache_write_failure() {
    let h = Harness::with_storage(Arc::new(ReadOnlyStorage));
    h.backend
        .ok("POST", "/api/auth/login", user_json("mock-openid-c3", "Kaiser"));
    h.backend
        .ok("PUT", "/api/auth/user/nickname", user_json("mock-openid-c3", "Der Bomber"));
    h.platform.push_profile(Ok(UserProfile::default()));
    h.platform.push_login_code(Ok("c3".to_string()));

    let mut screen = profile(&h);
    screen.authorize().await.unwrap();
    assert_eq!(screen.auth_state(), AuthState::SignedIn);
    assert_eq!(screen.user().unwrap().open_id, "mock-openid-c3");
    assert_eq!(h.feedback.toasts(), vec![Toast::success("login succeeded")]);
    assert!(!h.session.is_logged_in());

    h.feedback.clear();
    screen.start_edit_nickname();
    screen.set_nickname_draft("Der Bomber");
    screen.save_nickname().await.unwrap();
    assert_eq!(screen.display_name(), "Der Bomber");
    assert_eq!(h.feedback.toasts(), vec![Toast::success("nickname updated")]);
}

#[tokio::test]
async fn profile_qr_code_needs_config() {
    let h = Harness::new();
    h.backend.unreachable("GET", "/api/config/customer-service");

    let mut screen = profile(&h);
    screen.load().await;
    h.feedback.clear();
    screen.show_qr_code();
    assert!(screen.qr_modal().is_none());
    assert_eq!(
        h.feedback.toasts(),
        vec![Toast::info("customer service info loading")]
    );

    h.backend
        .ok("GET", "/api/config/customer-service", customer_service_json());
    screen.load().await;
    screen.show_qr_code();
    assert!(screen.qr_modal().unwrap().is_visible());
    screen.close_qr_code();
    assert!(!screen.qr_modal().unwrap().is_visible());
}

#[tokio::test]
async fn profile_nickname_editing() {
    let h = Harness::new();
    h.session
        .save_user(&serde_json::from_value::<User>(user_json("u1", "Kaiser")).unwrap())
        .unwrap();
    h.backend
        .ok("GET", "/api/config/customer-service", customer_service_json());
    h.backend
        .ok("PUT", "/api/auth/user/nickname", user_json("u1", "Der Bomber"));

    let mut screen = profile(&h);
    screen.load().await;
    assert_eq!(screen.auth_state(), AuthState::SignedIn);

    screen.start_edit_nickname();
    assert_eq!(screen.nickname_draft(), Some("Kaiser"));

    screen.set_nickname_draft(&"x".repeat(21));
    assert!(screen.save_nickname().await.is_err());
    assert!(screen.is_editing_nickname());
    assert_eq!(
        h.feedback.toasts(),
        vec![Toast::info("nickname cannot exceed 20 characters")]
    );

    screen.set_nickname_draft("  Der Bomber ");
    screen.save_nickname().await.unwrap();
    assert!(!screen.is_editing_nickname());
    assert_eq!(screen.display_name(), "Der Bomber");
    assert_eq!(
        h.session.current_user().unwrap().nick_name.as_deref(),
        Some("Der Bomber")
    );

    let puts: Vec<String> = h
        .backend
        .paths()
        .into_iter()
        .filter(|p| p.starts_with("PUT"))
        .collect();
    assert_eq!(
        puts,
        vec!["PUT /api/auth/user/nickname?open_id=u1&nick_name=Der+Bomber"]
    );
}

#[tokio::test]
async fn profile_logout_clears_session() {
    let h = Harness::new();
    h.session
        .save_user(&serde_json::from_value::<User>(user_json("u1", "Kaiser")).unwrap())
        .unwrap();

    let mut screen = profile(&h);
    screen.load().await;
    screen.start_edit_nickname();
    screen.logout().unwrap();

    assert_eq!(screen.auth_state(), AuthState::Guest);
    assert!(!screen.is_editing_nickname());
    assert!(!h.session.is_logged_in());
}
