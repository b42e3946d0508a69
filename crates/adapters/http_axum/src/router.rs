//! Axum router assembly.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};

use crate::api::measurements;
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves API routes under `/api` plus the sensor push endpoint `/measure`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<M, R, L, W, F>(state: AppState<M, R, L, W, F>) -> Router
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/measure", post(measurements::measure::<M, R, L, W, F>))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::test_state;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn booking(start: &str, end: &str) -> Value {
        json!({
            "room_id": 1,
            "user_name": "M. Martin",
            "title": "Cours de Maths",
            "start": start,
            "end": end,
            "people_count": 28,
        })
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn should_list_rooms_in_id_order() {
        let app = build(test_state());

        let (status, body) = send(&app, Method::GET, "/api/rooms", None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["A101", "A102"]);
    }

    #[tokio::test]
    async fn should_return_404_when_room_unknown() {
        let app = build(test_state());

        let (status, body) = send(&app, Method::GET, "/api/rooms/42", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("42"));
    }

    #[tokio::test]
    async fn should_return_400_when_room_id_not_numeric() {
        let app = build(test_state());

        let (status, _) = send(&app, Method::GET, "/api/rooms/A101/status", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_create_reservation_then_reject_overlap() {
        let app = build(test_state());

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/reservations",
            Some(booking("2026-03-02T08:00:00Z", "2026-03-02T10:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["people_count"], 28);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/reservations",
            Some(booking("2026-03-02T09:30:00Z", "2026-03-02T11:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn should_accept_back_to_back_reservations() {
        let app = build(test_state());

        let (first, _) = send(
            &app,
            Method::POST,
            "/api/reservations",
            Some(booking("2026-03-02T08:00:00", "2026-03-02T10:00:00")),
        )
        .await;
        let (second, _) = send(
            &app,
            Method::POST,
            "/api/reservations",
            Some(booking("2026-03-02T10:00:00", "2026-03-02T12:00:00")),
        )
        .await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn should_return_400_when_interval_inverted() {
        let app = build(test_state());

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/reservations",
            Some(booking("2026-03-02T10:00:00Z", "2026-03-02T08:00:00Z")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_404_when_booking_unknown_room() {
        let app = build(test_state());
        let mut body = booking("2026-03-02T08:00:00Z", "2026-03-02T10:00:00Z");
        body["room_id"] = json!(99);

        let (status, _) = send(&app, Method::POST, "/api/reservations", Some(body)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_filter_reservations_by_day_and_delete_idempotently() {
        let app = build(test_state());
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/reservations",
            Some(booking("2026-03-02T08:00:00Z", "2026-03-02T10:00:00Z")),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_owned();

        let (status, same_day) =
            send(&app, Method::GET, "/api/reservations?date=2026-03-02", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(same_day.as_array().unwrap().len(), 1);

        let (_, other_day) =
            send(&app, Method::GET, "/api/reservations?date=2026-03-03", None).await;
        assert!(other_day.as_array().unwrap().is_empty());

        let uri = format!("/api/reservations/{id}");
        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Cours de Maths");

        let (first, _) = send(&app, Method::DELETE, &uri, None).await;
        let (second, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(first, StatusCode::NO_CONTENT);
        assert_eq!(second, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_400_when_date_malformed() {
        let app = build(test_state());

        let (status, body) =
            send(&app, Method::GET, "/api/reservations?date=02/03/2026", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("02/03/2026"));
    }

    #[tokio::test]
    async fn should_return_503_when_forecast_model_missing() {
        let app = build(test_state());

        let (status, _) = send(&app, Method::GET, "/api/rooms/1/forecast", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn should_report_standby_status_for_idle_room() {
        let app = build(test_state());

        let (status, body) = send(&app, Method::GET, "/api/rooms/status", None).await;

        assert_eq!(status, StatusCode::OK);
        let statuses = body.as_array().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s["current_temp"].is_null()));
    }

    #[tokio::test]
    async fn should_ingest_measurement_with_derived_context() {
        let app = build(test_state());

        let (status, stored) = send(
            &app,
            Method::POST,
            "/measure",
            Some(json!({
                "room_id": 1,
                "sensor_id": "esp32-a101",
                "temperature": 18.4,
                "humidity": 52.0,
                "co2": 640.0,
                "motion": true,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stored["occupancy"]["room_capacity"], 30);
        assert_eq!(stored["occupancy"]["minutes_to_start"], 999);
        assert_eq!(stored["weather"]["outdoor_temp"], 10.0);

        let (status, last) = send(&app, Method::GET, "/api/last", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(last["sensor_id"], "esp32-a101");

        let (_, listed) =
            send(&app, Method::GET, "/api/rooms/1/measurements?limit=5", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_store_context_of_generated_dataset_line() {
        let app = build(test_state());
        let line = r#"{"room_id": 1, "sensor_id": "rpi5-room-1", "temp": 19.87, "hum": 47.3, "co2": 812.0, "motion": true, "hour": 8, "weekday": 0, "is_weekend": 0, "people_count": 25, "room_capacity": 30, "occupancy_rate": 0.83, "minutes_to_start": 999, "is_occupied": 1, "res_duration_min": 120, "outdoor_temp": 6.4, "outdoor_hum": 81.0, "wind_speed": 12.5, "timestamp": "2026-03-02T08:05:00Z"}"#;

        let (status, stored) = send(
            &app,
            Method::POST,
            "/measure",
            Some(serde_json::from_str(line).unwrap()),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stored["reading"]["temperature"], 19.87);
        assert_eq!(stored["reading"]["humidity"], 47.3);
        assert_eq!(stored["occupancy"]["people_count"], 25);
        assert_eq!(stored["occupancy"]["occupancy_rate"], 0.83);
        assert_eq!(stored["occupancy"]["is_occupied"], true);
        assert_eq!(stored["occupancy"]["res_duration_min"], 120);
        assert_eq!(stored["weather"]["outdoor_temp"], 6.4);
        assert_eq!(stored["weather"]["wind_speed"], 12.5);
    }

    #[tokio::test]
    async fn should_accept_sensor_reader_field_names() {
        let app = build(test_state());

        let (status, stored) = send(
            &app,
            Method::POST,
            "/measure",
            Some(json!({
                "room_id": 2,
                "sensor_id": "rpi5-room-2",
                "temp": 21.5,
                "hum": 44.0,
                "co2": 530.0,
                "motion": false,
                "timestamp": "2026-03-02T10:00:00Z",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stored["reading"]["temperature"], 21.5);
        assert_eq!(stored["occupancy"]["room_capacity"], 20);
    }

    #[tokio::test]
    async fn should_reject_partial_occupancy_context() {
        let app = build(test_state());

        let (status, body) = send(
            &app,
            Method::POST,
            "/measure",
            Some(json!({
                "room_id": 1,
                "temperature": 19.0,
                "humidity": 50.0,
                "co2": 600.0,
                "people_count": 12,
                "is_occupied": 1,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("room_capacity"));
    }

    #[tokio::test]
    async fn should_reject_partial_weather_context() {
        let app = build(test_state());

        let (status, _) = send(
            &app,
            Method::POST,
            "/measure",
            Some(json!({
                "room_id": 1,
                "temperature": 19.0,
                "humidity": 50.0,
                "co2": 600.0,
                "outdoor_temp": 4.0,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_404_when_no_measurement_recorded() {
        let app = build(test_state());

        let (status, _) = send(&app, Method::GET, "/api/last", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_serve_default_weather_when_provider_offline() {
        let app = build(test_state());

        let (status, body) = send(&app, Method::GET, "/api/weather", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outdoor_temp"], 10.0);
        assert_eq!(body["outdoor_hum"], 60.0);
        assert_eq!(body["wind_speed"], 5.0);
        assert!(body["captured_at"].is_string());
    }
}
