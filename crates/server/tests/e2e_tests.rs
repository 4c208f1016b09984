//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full router in-process with mock implementations of
//! the platform bridge, the media resolver and the status prober.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use steward_core::{platform::VoicePermissions, ChannelId, MediaError, TenantId};

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("secret")).await;
    let response = fixture.get_with_key("/api/v1/config", "secret").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["auth"]["method"], "api_key");
    assert_eq!(response.body["auth"]["api_key_configured"], true);
    assert!(!response.body.to_string().contains("secret"));
}

#[tokio::test]
async fn test_api_key_guards_commands_but_not_health() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("secret")).await;

    assert_status!(fixture.get("/api/v1/health").await, StatusCode::OK);
    assert_status!(fixture.get("/api/v1/status").await, StatusCode::UNAUTHORIZED);
    assert_status!(
        fixture.get_with_key("/api/v1/status", "wrong").await,
        StatusCode::UNAUTHORIZED
    );

    let response = fixture.get_with_key("/api/v1/status", "secret").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status_loop_running"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, text) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("steward_http_requests_total"));
    assert!(text.contains("steward_configured_tenants"));
}

// =============================================================================
// Playback
// =============================================================================

#[tokio::test]
async fn test_play_queue_skip_stop() {
    let fixture = TestFixture::new().await;
    fixture.resolver.add("first song", fixtures::media("A")).await;
    fixture.resolver.add("second song", fixtures::media("B")).await;

    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "first song" }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["outcome"], "started");
    assert_eq!(response.body["entry"]["title"], "A");

    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "second song" }),
        )
        .await;
    assert_eq!(response.body["outcome"], "queued");
    assert_eq!(response.body["position"], 1);
    assert_eq!(fixture.voice.connect_count().await, 1);

    let queue = fixture.get("/api/v1/tenants/t1/playback/queue").await;
    assert_eq!(queue.body["state"], "playing");
    assert_eq!(queue.body["now_playing"]["title"], "A");
    assert_eq!(queue.body["upcoming"][0]["title"], "B");

    let skipped = fixture.post_empty("/api/v1/tenants/t1/playback/skip").await;
    assert_status!(skipped, StatusCode::OK);
    assert_eq!(skipped.body["now_playing"]["title"], "B");

    let stopped = fixture.post_empty("/api/v1/tenants/t1/playback/stop").await;
    assert_eq!(stopped.body["discarded"], 0);

    let queue = fixture.get("/api/v1/tenants/t1/playback/queue").await;
    assert_eq!(queue.body["state"], "idle");
    assert_eq!(queue.body["channel"], "v1");
}

#[tokio::test]
async fn test_play_without_voice_permission_is_forbidden() {
    let fixture = TestFixture::new().await;
    fixture.resolver.add("song", fixtures::media("A")).await;
    fixture
        .voice
        .set_permissions(VoicePermissions {
            connect: true,
            speak: false,
        })
        .await;

    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "song" }),
        )
        .await;
    assert_status!(response, StatusCode::FORBIDDEN);
    assert!(response.body["error"].is_string());
    assert!(fixture.resolver.queries().await.is_empty());
}

#[tokio::test]
async fn test_play_unknown_query_is_unprocessable() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "nothing matches" }),
        )
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "   " }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resolver_timeout_is_bad_gateway() {
    let fixture = TestFixture::new().await;
    fixture.resolver.add("song", fixtures::media("A")).await;
    fixture.resolver.set_next_error(MediaError::Timeout(30)).await;

    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "song" }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_GATEWAY);

    // The session stays up; a retry plays.
    let response = fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "song" }),
        )
        .await;
    assert_eq!(response.body["outcome"], "started");
    assert_eq!(fixture.voice.connect_count().await, 1);
}

#[tokio::test]
async fn test_commands_without_session_conflict() {
    let fixture = TestFixture::new().await;

    for command in ["pause", "resume", "skip", "stop"] {
        let response = fixture
            .post_empty(&format!("/api/v1/tenants/t1/playback/{}", command))
            .await;
        assert_status!(response, StatusCode::CONFLICT);
    }
}

#[tokio::test]
async fn test_pause_resume() {
    let fixture = TestFixture::new().await;
    fixture.resolver.add("song", fixtures::media("A")).await;
    fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "song" }),
        )
        .await;

    assert_status!(
        fixture.post_empty("/api/v1/tenants/t1/playback/resume").await,
        StatusCode::CONFLICT
    );
    assert_status!(
        fixture.post_empty("/api/v1/tenants/t1/playback/pause").await,
        StatusCode::NO_CONTENT
    );
    let queue = fixture.get("/api/v1/tenants/t1/playback/queue").await;
    assert_eq!(queue.body["state"], "paused");
    assert_status!(
        fixture.post_empty("/api/v1/tenants/t1/playback/resume").await,
        StatusCode::NO_CONTENT
    );
}

// =============================================================================
// Platform events
// =============================================================================

#[tokio::test]
async fn test_playback_finished_advances_only_for_current_token() {
    let fixture = TestFixture::new().await;
    let tenant = TenantId::from("t1");
    fixture.resolver.add("a", fixtures::media("A")).await;
    fixture.resolver.add("b", fixtures::media("B")).await;
    for query in ["a", "b"] {
        fixture
            .post(
                "/api/v1/tenants/t1/playback/play",
                json!({ "voice_channel_id": "v1", "query": query }),
            )
            .await;
    }
    let token = fixture.voice.last_token(&tenant).await.unwrap();

    let stale = fixture
        .post(
            "/api/v1/tenants/t1/events/playback-finished",
            json!({ "token": token.0 + 100 }),
        )
        .await;
    assert!(stale.body["next"].is_null());

    let current = fixture
        .post(
            "/api/v1/tenants/t1/events/playback-finished",
            json!({ "token": token.0 }),
        )
        .await;
    assert_eq!(current.body["next"]["title"], "B");
    assert_eq!(fixture.voice.played(&tenant).await.len(), 2);
}

#[tokio::test]
async fn test_voice_state_tears_down_empty_session() {
    let fixture = TestFixture::new().await;
    fixture.resolver.add("song", fixtures::media("A")).await;
    fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "song" }),
        )
        .await;

    fixture
        .voice
        .set_members(
            &ChannelId::from("v1"),
            vec![fixtures::participant("alice", false)],
        )
        .await;
    let response = fixture
        .post_empty("/api/v1/tenants/t1/events/voice-state")
        .await;
    assert_eq!(response.body["torn_down"], false);

    fixture.voice.set_members(&ChannelId::from("v1"), vec![]).await;
    let response = fixture
        .post_empty("/api/v1/tenants/t1/events/voice-state")
        .await;
    assert_eq!(response.body["torn_down"], true);

    let queue = fixture.get("/api/v1/tenants/t1/playback/queue").await;
    assert!(queue.body["channel"].is_null());
}

#[tokio::test]
async fn test_voice_disconnected_discards_session() {
    let fixture = TestFixture::new().await;
    fixture.resolver.add("song", fixtures::media("A")).await;
    fixture
        .post(
            "/api/v1/tenants/t1/playback/play",
            json!({ "voice_channel_id": "v1", "query": "song" }),
        )
        .await;

    let response = fixture
        .post_empty("/api/v1/tenants/t1/events/voice-disconnected")
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);
    assert_status!(
        fixture.post_empty("/api/v1/tenants/t1/playback/skip").await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_member_join_with_auto_role_and_announcement() {
    let fixture = TestFixture::new().await;

    assert_status!(
        fixture
            .put("/api/v1/tenants/t1/auto-role", json!({ "role_id": "r1" }))
            .await,
        StatusCode::NO_CONTENT
    );
    assert_status!(
        fixture
            .put(
                "/api/v1/tenants/t1/announcements/join",
                json!({ "channel_id": "lobby", "message": "Welcome {member}!" }),
            )
            .await,
        StatusCode::NO_CONTENT
    );

    let response = fixture
        .post(
            "/api/v1/tenants/t1/events/member-joined",
            json!({ "user_id": "u1", "display_name": "Ann" }),
        )
        .await;
    assert_eq!(response.body["role_assigned"], true);
    assert_eq!(response.body["announced"], true);

    let sent = fixture.platform.sent_messages().await;
    assert_eq!(sent[0].channel, ChannelId::from("lobby"));
    assert_eq!(
        sent[0].content.embed.as_ref().unwrap().description.as_deref(),
        Some("Welcome <@u1>!")
    );

    let bot = fixture
        .post(
            "/api/v1/tenants/t1/events/member-joined",
            json!({ "user_id": "b1", "automated": true }),
        )
        .await;
    assert_eq!(bot.body["role_assigned"], false);
    assert_eq!(fixture.platform.assigned_roles().await.len(), 1);
}

#[tokio::test]
async fn test_member_left_without_announcement() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/tenants/t1/events/member-left",
            json!({ "user_id": "u1", "display_name": "Ann" }),
        )
        .await;
    assert_eq!(response.body["announced"], false);
}

// =============================================================================
// Settings and status display
// =============================================================================

#[tokio::test]
async fn test_status_target_drives_display_cycle() {
    let fixture = TestFixture::new().await;
    fixture
        .prober
        .set_status("mc.example.com", fixtures::online_status(4, 20))
        .await;

    let response = fixture
        .put(
            "/api/v1/tenants/t1/status-target",
            json!({ "address": "mc.example.com", "channel_id": "status" }),
        )
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let settings = fixture.get("/api/v1/tenants/t1/settings").await;
    assert_eq!(settings.body["status"]["port"], 25565);
    assert_eq!(fixture.store.save_count(), 1);

    let report = fixture.engine.status_displays.run_cycle().await;
    assert_eq!(report.created, 1);
    assert_eq!(fixture.platform.sent_messages().await.len(), 1);

    // Clearing the target stops further updates.
    fixture
        .put("/api/v1/tenants/t1/status-target", json!(null))
        .await;
    let report = fixture.engine.status_displays.run_cycle().await;
    assert_eq!(report.tenants, 0);
}

#[tokio::test]
async fn test_status_target_validation() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .put(
            "/api/v1/tenants/t1/status-target",
            json!({ "address": "", "channel_id": "status" }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.store.save_count(), 0);
}

// =============================================================================
// Drawings
// =============================================================================

#[tokio::test]
async fn test_create_and_list_drawings() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tenants/t1/drawings",
            json!({ "channel": "events", "prize": "Nitro", "duration_minutes": 5 }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["prize"], "Nitro");
    assert_eq!(response.body["state"], "pending");
    let id = response.body["id"].as_str().unwrap().to_string();

    let list = fixture.get("/api/v1/tenants/t1/drawings").await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);
    assert_eq!(list.body[0]["id"], id.as_str());

    let other = fixture.get("/api/v1/tenants/t2/drawings").await;
    assert!(other.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_drawing_with_invalid_duration_is_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tenants/t1/drawings",
            json!({ "channel": "events", "prize": "Nitro", "duration_minutes": 0 }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(fixture.platform.sent_messages().await.is_empty());
}

// =============================================================================
// Warns
// =============================================================================

#[tokio::test]
async fn test_warns_escalate_at_three() {
    let fixture = TestFixture::new().await;

    for expected in 1..=3 {
        let response = fixture
            .post(
                "/api/v1/tenants/t1/warns/u1",
                json!({ "reason": format!("spam #{}", expected) }),
            )
            .await;
        assert_status!(response, StatusCode::OK);
        assert_eq!(response.body["count"], expected);
        assert_eq!(response.body["escalate"], expected >= 3);
    }

    let list = fixture.get("/api/v1/tenants/t1/warns/u1").await;
    assert_eq!(list.body["warns"].as_array().unwrap().len(), 3);
    assert_eq!(list.body["warns"][0]["reason"], "spam #1");

    let cleared = fixture.delete("/api/v1/tenants/t1/warns/u1").await;
    assert_eq!(cleared.body["cleared"], 3);

    let list = fixture.get("/api/v1/tenants/t1/warns/u1").await;
    assert!(list.body["warns"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_warn_requires_reason() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/tenants/t1/warns/u1", json!({ "reason": " " }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}
