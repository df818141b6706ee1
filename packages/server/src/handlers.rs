//! HTTP handler functions for the hazard map API.

use actix_web::{HttpResponse, web};
use hazard_map_geography::GeoError;
use hazard_map_reports::ReportError;
use hazard_map_reports::validate::REQUIRED_FIELDS;
use hazard_map_server_models::{
    ApiCleanup, ApiError, ApiHazard, ApiHazardCreated, ApiHazardDeleted, ApiHazardList,
    ApiHealth, ApiServiceInfo, ApiStats, HazardQueryParams, ReportHazardRequest, SERVICE_NAME,
};

use crate::AppState;

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(ApiServiceInfo {
        status: "online".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /health`
///
/// Reports whether the store is reachable.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.service.health().await {
        Ok(()) => HttpResponse::Ok().json(ApiHealth {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            error: None,
        }),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::InternalServerError().json(ApiHealth {
                status: "unhealthy".to_string(),
                database: "disconnected".to_string(),
                error: Some(e.to_string()),
            })
        }
    }
}

/// `GET /api/hazards`
///
/// Returns active hazards within `radius` km (default 50) of `lat`/`lng`.
pub async fn list_hazards(
    state: web::Data<AppState>,
    params: web::Query<HazardQueryParams>,
) -> HttpResponse {
    let result = state
        .service
        .nearby_raw(
            params.lat.as_deref(),
            params.lng.as_deref(),
            params.radius.as_deref(),
        )
        .await;

    match result {
        Ok(nearby) => {
            let hazards: Vec<ApiHazard> = nearby.hazards.into_iter().map(ApiHazard::from).collect();
            HttpResponse::Ok().json(ApiHazardList {
                count: hazards.len(),
                hazards,
                radius_km: nearby.area.radius_km,
            })
        }
        Err(e) => error_response(&e, "Failed to fetch hazards"),
    }
}

/// `POST /api/hazards`
pub async fn report_hazard(
    state: web::Data<AppState>,
    body: web::Json<ReportHazardRequest>,
) -> HttpResponse {
    match state.service.report(&body).await {
        Ok(row) => HttpResponse::Created().json(ApiHazardCreated {
            message: "Hazard reported successfully".to_string(),
            hazard: row.into(),
        }),
        Err(e) => error_response(&e, "Failed to report hazard"),
    }
}

/// `DELETE /api/hazards/{id}`
///
/// An id that is not an integer can never match a hazard, so it is
/// reported as not found.
pub async fn delete_hazard(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Ok(id) = path.trim().parse::<i64>() else {
        log::debug!("Delete requested for non-numeric id {:?}", path.as_str());
        return HttpResponse::NotFound().json(ApiError::new("Hazard not found"));
    };

    match state.service.delete(id).await {
        Ok(id) => HttpResponse::Ok().json(ApiHazardDeleted {
            message: "Hazard deleted successfully".to_string(),
            id,
        }),
        Err(e) => error_response(&e, "Failed to delete hazard"),
    }
}

/// `POST /api/hazards/cleanup`
pub async fn cleanup(state: web::Data<AppState>) -> HttpResponse {
    match state.service.cleanup().await {
        Ok(deleted_count) => HttpResponse::Ok().json(ApiCleanup {
            message: "Cleanup completed".to_string(),
            deleted_count,
        }),
        Err(e) => error_response(&e, "Failed to cleanup hazards"),
    }
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    match state.service.stats().await {
        Ok(stats) => HttpResponse::Ok().json(ApiStats::from(stats)),
        Err(e) => error_response(&e, "Failed to fetch statistics"),
    }
}

/// Maps a [`ReportError`] to its HTTP status and JSON body.
///
/// `context` is the summary used for store failures.
fn error_response(err: &ReportError, context: &str) -> HttpResponse {
    match err {
        ReportError::MissingField { missing } => HttpResponse::BadRequest().json(ApiError {
            required: Some(REQUIRED_FIELDS.iter().map(ToString::to_string).collect()),
            missing: Some(missing.iter().map(ToString::to_string).collect()),
            ..ApiError::new("Missing required fields")
        }),
        ReportError::InvalidType { valid_types, .. } => HttpResponse::BadRequest().json(ApiError {
            valid_types: Some(valid_types.iter().map(ToString::to_string).collect()),
            ..ApiError::new("Invalid hazard type").with_message(err.to_string())
        }),
        ReportError::InvalidCoordinates { message } => HttpResponse::BadRequest()
            .json(ApiError::new("Invalid coordinates").with_message(message.clone())),
        ReportError::InvalidReporter { .. } => HttpResponse::BadRequest()
            .json(ApiError::new("Invalid reporter").with_message(err.to_string())),
        ReportError::DuplicateReport { .. } => HttpResponse::Conflict().json(
            ApiError::new("Duplicate report detected")
                .with_message("Similar hazard already reported nearby"),
        ),
        ReportError::NotFound { .. } => {
            HttpResponse::NotFound().json(ApiError::new("Hazard not found"))
        }
        ReportError::Search(GeoError::MissingCoordinates) => {
            HttpResponse::BadRequest().json(ApiError::new(GeoError::MissingCoordinates.to_string()))
        }
        ReportError::Search(GeoError::InvalidCoordinates { message }) => HttpResponse::BadRequest()
            .json(ApiError::new("Invalid coordinates").with_message(message.clone())),
        ReportError::Search(GeoError::InvalidRadius { message }) => HttpResponse::BadRequest()
            .json(ApiError::new("Invalid radius").with_message(message.clone())),
        ReportError::Store(e) => {
            log::error!("{context}: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::new(context).with_message(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use chrono::TimeDelta;
    use hazard_map_database::MemoryHazardStore;
    use hazard_map_reports::HazardService;
    use serde_json::{Value, json};

    use crate::{AppState, configure};

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new(HazardService::new(
                        $store.clone(),
                    ))))
                    .configure(configure),
            )
            .await
        };
    }

    fn report(hazard_type: &str, latitude: f64, longitude: f64) -> Value {
        json!({ "type": hazard_type, "latitude": latitude, "longitude": longitude })
    }

    #[actix_web::test]
    async fn index_and_health_report_online() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert!(body.get("error").is_none());
    }

    #[actix_web::test]
    async fn london_report_is_found_nearby() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(json!({
                "type": "Police",
                "latitude": 51.5074,
                "longitude": -0.1278,
                "reported_by": "commuter"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["message"], "Hazard reported successfully");
        assert_eq!(created["hazard"]["type"], "Police");
        assert_eq!(created["hazard"]["reported_by"], "commuter");

        let req = test::TestRequest::get()
            .uri("/api/hazards?lat=51.5&lng=-0.12&radius=10")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["radius_km"], 10.0);
        assert_eq!(body["hazards"][0]["id"], created["hazard"]["id"]);
        assert!(body["hazards"][0]["age_minutes"].is_number());

        let req = test::TestRequest::get()
            .uri("/api/hazards?lat=48.8566&lng=2.3522")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 0);
        assert_eq!(body["radius_km"], 50.0);
    }

    #[actix_web::test]
    async fn string_coordinates_and_road_closure_are_accepted() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(json!({ "type": "Road Closure", "latitude": "0", "longitude": "0" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["hazard"]["type"], "Road Closure");
        assert_eq!(created["hazard"]["reported_by"], "anonymous");
    }

    #[actix_web::test]
    async fn immediate_duplicate_is_conflict() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Accident", 40.0, -73.0))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Accident", 40.0, -73.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Duplicate report detected");
        assert_eq!(store.len(), 1);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Accident", 40.001, -73.0))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        store.advance(TimeDelta::minutes(6));
        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Accident", 40.0, -73.0))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn invalid_reports_are_bad_requests() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(json!({ "type": "Police", "longitude": 1.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["required"], json!(["type", "latitude", "longitude"]));
        assert_eq!(body["missing"], json!(["latitude"]));

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Pothole", 1.0, 1.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid hazard type");
        assert_eq!(body["validTypes"].as_array().map(Vec::len), Some(6));

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Police", 1.0, 181.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid coordinates");

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(store.is_empty());
    }

    #[actix_web::test]
    async fn listing_requires_valid_centre() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/api/hazards?lng=1.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Latitude and longitude are required");

        let req = test::TestRequest::get()
            .uri("/api/hazards?lat=abc&lng=1.0")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/hazards?lat=1.0&lng=1.0&radius=-5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid radius");
    }

    #[actix_web::test]
    async fn delete_twice_is_not_found() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/hazards")
            .set_json(report("Debris", 1.0, 1.0))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["hazard"]["id"].as_i64().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/hazards/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Hazard deleted successfully");
        assert_eq!(body["id"], id);

        for _ in 0..2 {
            let req = test::TestRequest::delete()
                .uri(&format!("/api/hazards/{id}"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Hazard not found");
        }

        let req = test::TestRequest::delete()
            .uri("/api/hazards/not-a-number")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn cleanup_and_stats_track_active_window() {
        let store = Arc::new(MemoryHazardStore::new());
        let app = app!(store);

        for (t, lat) in [("Police", 1.0), ("Police", 2.0), ("Weather", 3.0)] {
            let req = test::TestRequest::post()
                .uri("/api/hazards")
                .set_json(report(t, lat, 1.0))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_active_hazards"], 3);
        assert_eq!(body["by_type"][0], json!({ "type": "Police", "count": 2 }));
        assert_eq!(body["by_type"][1], json!({ "type": "Weather", "count": 1 }));

        store.advance(TimeDelta::hours(24));

        let req = test::TestRequest::post()
            .uri("/api/hazards/cleanup")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Cleanup completed");
        assert_eq!(body["deleted_count"], 3);

        let req = test::TestRequest::post()
            .uri("/api/hazards/cleanup")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["deleted_count"], 0);

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_active_hazards"], 0);
        assert_eq!(body["by_type"], json!([]));
    }
}
