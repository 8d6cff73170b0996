//! Integration Tests for Gridmark Server
//!
//! These tests verify the full flow of the HTTP and WebSocket endpoints,
//! testing the system as a whole rather than individual units.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

mod common;
use common::*;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

// ============================================================================
// HTTP Route Integration Tests
// ============================================================================

mod http_routes {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint_returns_ok() {
        let fixture = Fixture::new("health");
        let app = create_test_app(&fixture);

        let (status, json) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["image_loaded"], false);
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_waypoint_routes_require_image() {
        let fixture = Fixture::new("require_image");
        let app = create_test_app(&fixture);

        let (status, json) =
            send(&app, "PUT", "/api/waypoints/A", Some(json!({"x": 1.0, "y": 2.0}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "no_image");

        let (status, _) = send(&app, "GET", "/api/image", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, "POST", "/api/save", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_load_image_and_place_waypoint() {
        let fixture = Fixture::new("load_place");
        let app = create_test_app(&fixture);

        let (status, json) =
            send(&app, "POST", "/api/image", Some(json!({"path": fixture.map1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["width"], 800);
        assert_eq!(json["height"], 600);
        assert_eq!(json["reference"]["pxscale"], 10.0);

        let (status, json) = send(
            &app,
            "PUT",
            "/api/waypoints/A",
            Some(json!({"x": 150.0, "y": 200.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["key"], "A");
        assert_eq!(json["label"], "18S UJ 23485 06460");

        let (status, json) = send(&app, "GET", "/api/waypoints/A", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["x"], 150.0);
        assert_eq!(json["y"], 200.0);

        let (_, json) = send(&app, "GET", "/health", None).await;
        assert_eq!(json["image_loaded"], true);
    }

    #[tokio::test]
    async fn test_place_errors_map_to_statuses() {
        let fixture = Fixture::new("place_errors");
        let app = create_test_app(&fixture);
        send(&app, "POST", "/api/image", Some(json!({"path": fixture.map1}))).await;

        let point = json!({"x": 10.0, "y": 10.0});
        let (status, _) = send(&app, "PUT", "/api/waypoints/1", Some(point.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(&app, "PUT", "/api/waypoints/1", Some(point.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "duplicate_key");

        let (status, json) = send(&app, "PUT", "/api/waypoints/ab", Some(point.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "invalid_key");

        let (status, _) = send(&app, "DELETE", "/api/waypoints/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(&app, "DELETE", "/api/waypoints/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "not_found");
    }

    #[tokio::test]
    async fn test_place_next_assigns_keys_in_legend_order() {
        let fixture = Fixture::new("place_next");
        let app = create_test_app(&fixture);
        send(&app, "POST", "/api/image", Some(json!({"path": fixture.scan}))).await;

        let (_, first) = send(&app, "POST", "/api/waypoints", Some(json!({"x": 1, "y": 1}))).await;
        let (_, second) = send(&app, "POST", "/api/waypoints", Some(json!({"x": 2, "y": 2}))).await;
        assert_eq!(first["key"], "A");
        assert_eq!(second["key"], "B");

        let (status, list) = send(&app, "GET", "/api/waypoints", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);
        // No geo-reference: labels are absent
        assert!(list[0]["label"].is_null());
    }

    #[tokio::test]
    async fn test_load_failures() {
        let fixture = Fixture::new("load_failures");
        let app = create_test_app(&fixture);

        let (status, json) =
            send(&app, "POST", "/api/image", Some(json!({"path": fixture.missing()}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "image_load_failure");

        let (status, json) = send(
            &app,
            "POST",
            "/api/image",
            Some(json!({"path": fixture.map1, "restore": true})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "missing_save_file");

        // Neither failure opened anything
        let (status, _) = send(&app, "GET", "/api/image", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_sidecar_error_opens_image_without_reference() {
        let fixture = Fixture::new("sidecar_error");
        let app = create_test_app(&fixture);

        let (status, json) =
            send(&app, "POST", "/api/image", Some(json!({"path": fixture.blank}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.get("reference").is_none());
        assert!(
            json["reference_error"]
                .as_str()
                .unwrap()
                .contains("no geo-metadata")
        );

        let (status, json) = send(&app, "GET", "/api/grid/label?x=1&y=1", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "no_reference");
    }

    #[tokio::test]
    async fn test_save_and_restore_session() {
        let fixture = Fixture::new("save_restore");
        let app = create_test_app(&fixture);
        send(&app, "POST", "/api/image", Some(json!({"path": fixture.map1}))).await;
        send(&app, "PUT", "/api/waypoints/C", Some(json!({"x": 150.4, "y": 199.5}))).await;
        send(&app, "PUT", "/api/waypoints/9", Some(json!({"x": 300, "y": 400}))).await;

        let (status, json) = send(&app, "POST", "/api/save", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["waypoint_count"], 2);
        let saved_path = json["path"].as_str().unwrap().to_string();
        assert!(saved_path.ends_with("map1_waypoints.txt"));

        let contents = std::fs::read_to_string(&saved_path).unwrap();
        assert_eq!(contents, format!("{}\n150,200\n300,400\n", fixture.map1));

        // Opening another image drops the waypoints
        send(&app, "POST", "/api/image", Some(json!({"path": fixture.scan}))).await;
        let (_, list) = send(&app, "GET", "/api/waypoints", None).await;
        assert!(list.as_array().unwrap().is_empty());

        let (status, json) = send(
            &app,
            "POST",
            "/api/image",
            Some(json!({"path": fixture.map1, "restore": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["waypoint_count"], 2);

        // Keys come back in legend order
        let (_, list) = send(&app, "GET", "/api/waypoints", None).await;
        assert_eq!(list[0]["key"], "A");
        assert_eq!(list[0]["label"], "18S UJ 23485 06460");
        assert_eq!(list[1]["key"], "B");
    }

    #[tokio::test]
    async fn test_grid_queries() {
        let fixture = Fixture::new("grid_queries");
        let app = create_test_app(&fixture);
        send(&app, "POST", "/api/image", Some(json!({"path": fixture.map1}))).await;

        let (status, json) = send(&app, "GET", "/api/grid/label?x=150&y=200", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["label"], "18S UJ 23485 06460");

        let (status, json) = send(
            &app,
            "GET",
            "/api/grid/pixel?label=18SUJ2348506460",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["x"], 150.0);
        assert_eq!(json["y"], 200.0);

        let (status, json) = send(&app, "GET", "/api/grid/pixel?label=garbage", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "invalid_label");

        let (status, json) = send(
            &app,
            "GET",
            "/api/grid/pixel?label=17S%20NA%2000000%2000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "zone_mismatch");

        let (status, json) = send(&app, "GET", "/api/grid/lines", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["spacing_m"], 10);
        assert!(!json["lines"].as_array().unwrap().is_empty());

        let (status, json) = send(&app, "GET", "/api/grid/lines?spacing=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "invalid_grid_request");
    }
}

// ============================================================================
// WebSocket Integration Tests
// ============================================================================

mod websocket {
    use super::*;
    use futures_util::StreamExt;
    use gridmark_server::OverlayEvent;
    use gridmark_server::overlay::LoadOrigin;
    use gridmark_server::server::AppState;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

    type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

    /// Start a test server on a random port
    async fn start_test_server(
        fixture: &Fixture,
    ) -> (SocketAddr, AppState, tokio::task::JoinHandle<()>) {
        let (app, state) = create_test_app_with_state(fixture);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        (addr, state, handle)
    }

    async fn next_event(ws: &mut Client) -> OverlayEvent {
        let result = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(msg) = ws.next().await {
                if let Ok(Message::Text(text)) = msg {
                    return serde_json::from_str::<OverlayEvent>(&text).unwrap();
                }
            }
            panic!("WebSocket closed before an event arrived");
        })
        .await;
        result.expect("timed out waiting for an event")
    }

    #[tokio::test]
    async fn test_websocket_streams_overlay_events() {
        let fixture = Fixture::new("ws_stream");
        let (addr, state, server_handle) = start_test_server(&fixture).await;

        let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
        // Let the server finish subscribing
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let mut controller = state.overlay.controller.lock().await;
            controller
                .load_image(&fixture.map1, LoadOrigin::Fresh)
                .unwrap();
            controller.place('A', 150.0, 200.0).unwrap();
            controller.remove('A').unwrap();
        }

        assert!(matches!(
            next_event(&mut ws).await,
            OverlayEvent::ImageLoaded { width: 800, height: 600, has_reference: true, .. }
        ));
        match next_event(&mut ws).await {
            OverlayEvent::Placed { key, label, .. } => {
                assert_eq!(key.as_char(), 'A');
                assert_eq!(label.as_deref(), Some("18S UJ 23485 06460"));
            }
            other => panic!("expected placed event, got {:?}", other),
        }
        assert!(matches!(
            next_event(&mut ws).await,
            OverlayEvent::Deleted { x, y, .. } if x == 150.0 && y == 200.0
        ));

        server_handle.abort();
    }

    #[tokio::test]
    async fn test_websocket_snapshot_on_connect() {
        let fixture = Fixture::new("ws_snapshot");
        let (addr, state, server_handle) = start_test_server(&fixture).await;

        {
            let mut controller = state.overlay.controller.lock().await;
            controller
                .load_image(&fixture.scan, LoadOrigin::Fresh)
                .unwrap();
            controller.place('B', 5.0, 6.0).unwrap();
        }

        let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

        assert!(matches!(
            next_event(&mut ws).await,
            OverlayEvent::ImageLoaded { has_reference: false, .. }
        ));
        assert!(matches!(
            next_event(&mut ws).await,
            OverlayEvent::Placed { label: None, .. }
        ));

        server_handle.abort();
    }
}
