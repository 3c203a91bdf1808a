mod common;

use axum::http::StatusCode;
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestEnv, assert_error_code};
use serde_json::{Value, json};

#[tokio::test(flavor = "multi_thread")]
async fn login_institutional_email() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": "Ana.Reyes@unitec.edu" }))
		.await;

	response.assert_status_ok();
	let _access_token = response.cookie("lab_access_token");

	let body: Value = response.json();
	assert_eq!(body["email"], "ana.reyes@unitec.edu");
	assert_eq!(body["isAdmin"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_honduras_domain() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": "luis@unitec.edu.hn" }))
		.await;

	response.assert_status_ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn login_foreign_email() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": "ana@example.com" }))
		.await;

	assert_error_code(&response, StatusCode::UNPROCESSABLE_ENTITY, 6);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_malformed_email() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": "not an email" }))
		.await;

	assert_error_code(&response, StatusCode::UNPROCESSABLE_ENTITY, 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_requires_password() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": ADMIN_EMAIL }))
		.await;

	assert_error_code(&response, StatusCode::FORBIDDEN, 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_wrong_password() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": ADMIN_EMAIL, "password": "hunter2" }))
		.await;

	assert_error_code(&response, StatusCode::FORBIDDEN, 8);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_login() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/auth/login")
		.json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
		.await;

	response.assert_status_ok();

	let body: Value = response.json();
	assert_eq!(body["isAdmin"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn current_session() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	let response = env.app.get("/auth/me").await;

	response.assert_status_ok();

	let body: Value = response.json();
	assert_eq!(body["email"], "ana@unitec.edu");
}

#[tokio::test(flavor = "multi_thread")]
async fn current_session_without_login() {
	let env = TestEnv::new().await;

	let response = env.app.get("/auth/me").await;

	assert_error_code(&response, StatusCode::UNAUTHORIZED, 9);
}

#[tokio::test(flavor = "multi_thread")]
async fn logout() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	let response = env.app.post("/auth/logout").await;
	response.assert_status(StatusCode::NO_CONTENT);

	let response = env.app.get("/auth/me").await;
	response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn regular_user_is_not_admin() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	let response = env.app.get("/reservations").await;

	assert_error_code(&response, StatusCode::FORBIDDEN, 2);
}
