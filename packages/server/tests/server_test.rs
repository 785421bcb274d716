use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use blackout_server::{
    app,
    models::{
        config::ServerConfig,
        game::{GamePhase, Team},
        role::Role,
        view::{GameView, PlayerView},
    },
};
use serde_json::{json, Value};
use tower::ServiceExt;

// the flow below drives every phase change itself
fn slow_clock_config() -> ServerConfig {
    ServerConfig {
        tick_interval_ms: 3_600_000,
        ..ServerConfig::default()
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_room(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/room/create", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["room_code"].as_str().unwrap().to_string()
}

async fn join(app: &Router, room_code: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/room/{}/join", room_code),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room_code"], room_code);
    body["player_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_list_rooms() {
    let app = app::create_app(slow_clock_config());
    let room_code = create_room(&app).await;
    assert_eq!(room_code.len(), 4);

    let (status, rooms) = send(&app, "GET", "/api/room/rooms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["phase"], "LOBBY");

    let (status, _) = send(&app, "DELETE", &format!("/api/room/{}/delete", room_code), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/room/{}", room_code), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_join_rejects_blank_names() {
    let app = app::create_app(slow_clock_config());
    let room_code = create_room(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/room/{}/join", room_code),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_full_game_over_http() {
    let app = app::create_app(slow_clock_config());
    let room_code = create_room(&app).await;

    // lowercase codes are accepted
    let mut ids = Vec::new();
    for name in ["Ana", "Ben", "Cleo", "Dmitri"] {
        ids.push(join(&app, &room_code.to_lowercase(), name).await);
    }

    let (status, body) = send(&app, "POST", &format!("/api/game/{}/start", room_code), None).await;
    assert_eq!(status, StatusCode::OK);
    let view: GameView = serde_json::from_value(body).unwrap();
    assert_eq!(view.phase, GamePhase::RoleAssignment);
    assert_eq!(view.players.len(), 4);

    let mut saboteurs = Vec::new();
    let mut investigators = Vec::new();
    for id in &ids {
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/game/{}/state/{}", room_code, id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let view: PlayerView = serde_json::from_value(body).unwrap();
        match view.role {
            Role::Saboteur => {
                assert!(view.partner_name.is_some());
                saboteurs.push(id.clone());
            }
            Role::Investigator => {
                assert!(view.partner_name.is_none());
                investigators.push(id.clone());
            }
            Role::Pending => panic!("role was not dealt"),
        }
    }
    assert_eq!(saboteurs.len(), 2);
    assert_eq!(investigators.len(), 2);

    let (status, body) = send(&app, "POST", &format!("/api/game/{}/phase/action", room_code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "ACTION");
    assert_eq!(body["round"], 1);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/sabotage", room_code),
        Some(json!({ "target_id": investigators[0] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "DISCUSSION");
    assert_eq!(body["timer"], 120);
    assert!(!body["current_clue"].as_str().unwrap().is_empty());

    // a second sabotage in the same round is out of phase
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/sabotage", room_code),
        Some(json!({ "target_id": investigators[1] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", &format!("/api/game/{}/phase/skip", room_code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase_change"]["to"], "VOTE");

    // the disabled player sits this vote out
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/vote", room_code),
        Some(json!({ "voter_id": investigators[0], "target_id": saboteurs[0] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let votes = [
        (&investigators[1], &saboteurs[0]),
        (&saboteurs[1], &saboteurs[0]),
        (&saboteurs[0], &investigators[1]),
    ];
    let mut last = Value::Null;
    for (voter, target) in votes {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/game/{}/actions/vote", room_code),
            Some(json!({ "voter_id": voter, "target_id": target })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["votes_received"], 3);
    assert_eq!(last["active_voters"], 3);
    assert_eq!(last["resolved"]["player_id"], saboteurs[0].as_str());
    assert_eq!(last["resolved"]["role"], "SABOTEUR");
    assert!(last["resolved"]["winner"].is_null());

    let (_, state) = send(&app, "GET", &format!("/api/game/{}/state", room_code), None).await;
    assert_eq!(state["phase"], "REVEAL");
    assert_eq!(state["timer"], 10);
    assert!(state["players"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["has_voted"] == false));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/finalize", room_code),
        Some(json!({ "target_id": saboteurs[1] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner"], "INVESTIGATORS");

    let (status, body) = send(&app, "GET", &format!("/api/game/{}/check-winner", room_code), None).await;
    assert_eq!(status, StatusCode::OK);
    let winner: Option<Team> = serde_json::from_value(body["winner"].clone()).unwrap();
    assert_eq!(winner, Some(Team::Investigators));

    // every role is public once the game is over
    let (_, state) = send(&app, "GET", &format!("/api/game/{}/state", room_code), None).await;
    assert_eq!(state["phase"], "GAME_OVER");
    assert!(state["players"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| !p["role"].is_null()));
}

#[tokio::test]
async fn test_unknown_room_and_player() {
    let app = app::create_app(slow_clock_config());
    let room_code = create_room(&app).await;

    let (status, _) = send(&app, "GET", "/api/game/QQQQ/state", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/game/{}/state/not-a-player", room_code),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/finalize", room_code),
        Some(json!({ "target_id": "not-a-player" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
