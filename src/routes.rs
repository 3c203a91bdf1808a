use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::auth::{get_current_session, login, logout};
use crate::controllers::calendar::get_calendar;
use crate::controllers::healthcheck;
use crate::controllers::incident::{create_incident, get_incidents};
use crate::controllers::lab::{create_lab, get_labs};
use crate::controllers::mail::relay_mail;
use crate::controllers::quarter::{get_quarters, upsert_quarter};
use crate::controllers::reservation::{
	check_admission,
	create_reservation,
	get_my_reservations,
	get_reservations,
	update_reservation_state,
};
use crate::controllers::statistics::get_reservations_per_lab;
use crate::controllers::time_slot::{create_time_slot, get_time_slots};
use crate::controllers::usage::get_usage;
use crate::middleware::{AdminLayer, AuthLayer};

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/auth", auth_routes(&state))
		.nest("/labs", lab_routes(&state))
		.nest("/time-slots", time_slot_routes(&state))
		.nest("/reservations", reservation_routes(&state))
		.nest("/statistics", statistics_routes(&state))
		.nest("/quarters", quarter_routes(&state))
		.nest("/incidents", incident_routes(&state))
		.route(
			"/calendar",
			get(get_calendar).route_layer(AuthLayer::new(state.clone())),
		)
		.route(
			"/usage",
			get(get_usage)
				.route_layer(AdminLayer::new(state.clone()))
				.route_layer(AuthLayer::new(state.clone())),
		)
		.route(
			"/mail",
			post(relay_mail)
				.route_layer(AdminLayer::new(state.clone()))
				.route_layer(AuthLayer::new(state.clone())),
		);

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(10)))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/logout", post(logout))
		.route("/me", get(get_current_session))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new().route("/login", post(login)).merge(authenticated)
}

/// Lab routes, creating a lab requires an admin
fn lab_routes(state: &AppState) -> Router<AppState> {
	let protected = Router::new()
		.route("/", post(create_lab))
		.route_layer(AdminLayer::new(state.clone()))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new().route("/", get(get_labs)).merge(protected)
}

/// Time slot routes, creating a time slot requires an admin
fn time_slot_routes(state: &AppState) -> Router<AppState> {
	let protected = Router::new()
		.route("/", post(create_time_slot))
		.route_layer(AdminLayer::new(state.clone()))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new().route("/", get(get_time_slots)).merge(protected)
}

/// Reservation routes
fn reservation_routes(state: &AppState) -> Router<AppState> {
	let protected = Router::new()
		.route("/", get(get_reservations))
		.route("/state", post(update_reservation_state))
		.route_layer(AdminLayer::new(state.clone()));

	Router::new()
		.route("/", post(create_reservation))
		.route("/me", get(get_my_reservations))
		.route("/admission", get(check_admission))
		.merge(protected)
		.route_layer(AuthLayer::new(state.clone()))
}

/// Statistics routes
fn statistics_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/reservations-per-lab", get(get_reservations_per_lab))
		.route_layer(AdminLayer::new(state.clone()))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Quarter routes
fn quarter_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/", get(get_quarters))
		.route("/{quarter}", put(upsert_quarter))
		.route_layer(AdminLayer::new(state.clone()))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Incident routes, listing incidents requires an admin
fn incident_routes(state: &AppState) -> Router<AppState> {
	let protected = Router::new()
		.route("/", get(get_incidents))
		.route_layer(AdminLayer::new(state.clone()));

	Router::new()
		.route("/", post(create_incident))
		.merge(protected)
		.route_layer(AuthLayer::new(state.clone()))
}
