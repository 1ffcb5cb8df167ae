//! Location lookup endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::locations::{LocationParams, LocationQuery, LocationResolver, LocationsResponse};

pub type LocationsState = Arc<LocationResolver>;

pub fn create_locations_router(resolver: LocationsState) -> Router {
    Router::new()
        .route("/locations", get(get_locations).fallback(not_implemented))
        .route(
            "/api/v0.1/locations",
            get(get_locations).fallback(not_implemented),
        )
        .route("/docs/locations", get(docs).fallback(not_implemented))
        .with_state(resolver)
}

/// `GET /locations?location_codes=mal82,scff2&fields=url,location,hours`
pub async fn get_locations(
    State(resolver): State<LocationsState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<LocationsResponse>, AppError> {
    let query = LocationQuery::from_params(&params)?;
    tracing::info!("Looking up {} location code(s): {:?}", query.codes.len(), query.codes);

    let response = resolver.resolve(&query).await?;
    Ok(Json(response))
}

pub async fn not_implemented() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "error": "LocationsService only implements GET endpoints" })),
    )
        .into_response()
}

/// `GET /docs/locations`
pub async fn docs() -> Json<Value> {
    Json(openapi_document())
}

fn openapi_document() -> Value {
    let schedule_day = json!({
        "type": "object",
        "properties": {
            "day": { "type": "string", "example": "Saturday" },
            "startTime": { "type": "string", "format": "date-time", "x-nullable": true },
            "endTime": { "type": "string", "format": "date-time", "x-nullable": true },
            "today": { "type": "boolean" },
            "nextBusinessDay": { "type": "boolean" }
        }
    });

    json!({
        "swagger": "2.0",
        "info": {
            "title": "Locations Service",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Labels, URLs, addresses and seven-day opening hours for Sierra location codes"
        },
        "basePath": "/api/v0.1",
        "paths": {
            "/locations": {
                "get": {
                    "tags": ["locations"],
                    "summary": "Look up locations by code",
                    "produces": ["application/json"],
                    "parameters": [
                        {
                            "name": "location_codes",
                            "in": "query",
                            "required": true,
                            "type": "string",
                            "description": "Comma separated location codes, e.g. mal82,scff2"
                        },
                        {
                            "name": "fields",
                            "in": "query",
                            "required": false,
                            "type": "string",
                            "description": "Comma separated subset of url, location, hours. Defaults to url."
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "Records keyed by requested code",
                            "schema": {
                                "type": "object",
                                "additionalProperties": {
                                    "type": "array",
                                    "items": { "$ref": "#/definitions/Location" }
                                }
                            }
                        },
                        "400": { "description": "No location codes provided" },
                        "500": { "description": "Failed to fetch locations by code." }
                    }
                }
            }
        },
        "definitions": {
            "Location": {
                "type": "object",
                "properties": {
                    "code": { "type": "string", "x-nullable": true },
                    "label": { "type": "string", "x-nullable": true },
                    "url": { "type": "string", "x-nullable": true },
                    "location": { "$ref": "#/definitions/Address" },
                    "hours": { "type": "array", "items": schedule_day },
                    "error": { "type": "string" }
                }
            },
            "Address": {
                "type": "object",
                "properties": {
                    "line1": { "type": "string" },
                    "city": { "type": "string" },
                    "state": { "type": "string" },
                    "postal_code": { "type": "string" }
                }
            }
        }
    })
}
