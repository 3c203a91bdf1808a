mod common;

use axum::http::StatusCode;
use common::{TestEnv, assert_error_code};
use serde_json::{Value, json};

/// Report an incident as the currently logged in user
async fn report(env: &TestEnv, lab_id: i32, description: &str, at: &str) {
	env.app
		.post("/incidents")
		.json(&json!({
			"labId": lab_id,
			"description": description,
			"occurredAt": at,
		}))
		.await
		.assert_status(StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_incident() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	let response = env
		.app
		.post("/incidents")
		.json(&json!({
			"labId": env.lab_ids[0],
			"description": "Projector does not turn on",
			"reportUrl": "https://forms.unitec.edu/incidents/17",
		}))
		.await;

	response.assert_status(StatusCode::CREATED);

	let incident: Value = response.json();
	assert_eq!(incident["lab"]["name"], "Lab A");
	assert_eq!(incident["incident"]["reporterEmail"], "ana@unitec.edu");
	assert!(incident["incident"]["occurredAt"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_incident_invalid() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	let response = env
		.app
		.post("/incidents")
		.json(&json!({ "labId": env.lab_ids[0], "description": "" }))
		.await;

	assert_error_code(&response, StatusCode::UNPROCESSABLE_ENTITY, 25);

	let response = env
		.app
		.post("/incidents")
		.json(&json!({ "labId": 4242, "description": "Broken chair" }))
		.await;

	response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_incidents_requires_admin() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	let response = env.app.get("/incidents").await;

	response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_incidents() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;
	let (lab_a, lab_b) = (env.lab_ids[0], env.lab_ids[1]);

	report(&env, lab_a, "Projector does not turn on", "2025-06-02T08:00:00")
		.await;
	report(&env, lab_b, "Network switch down", "2025-06-03T10:15:00").await;
	report(&env, lab_b, "Broken projector cable", "2025-06-04T14:30:00").await;

	let env = env.login_admin().await;

	let response = env.app.get("/incidents").await;
	response.assert_status_ok();

	let page: Value = response.json();
	assert_eq!(page["total"], 3);
	assert_eq!(page["perPage"], 8);

	let descriptions: Vec<&str> = page["data"]
		.as_array()
		.unwrap()
		.iter()
		.map(|i| i["incident"]["description"].as_str().unwrap())
		.collect();
	assert_eq!(
		descriptions,
		[
			"Broken projector cable",
			"Network switch down",
			"Projector does not turn on"
		]
	);

	// Case insensitive over the description
	let page: Value = env
		.app
		.get("/incidents")
		.add_query_params(json!({ "search": "PROJECTOR" }))
		.await
		.json();
	assert_eq!(page["total"], 2);

	// Matches the lab name
	let page: Value = env
		.app
		.get("/incidents")
		.add_query_params(json!({ "search": "lab b" }))
		.await
		.json();
	assert_eq!(page["total"], 2);

	// Matches the reporter
	let page: Value = env
		.app
		.get("/incidents")
		.add_query_params(json!({ "search": "nobody@unitec.edu" }))
		.await
		.json();
	assert_eq!(page["total"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn paginate_incidents() {
	let env = TestEnv::new().await.login("ana@unitec.edu").await;

	for day in 1..=10 {
		report(
			&env,
			env.lab_ids[0],
			&format!("Incident {day}"),
			&format!("2025-06-{day:02}T09:00:00"),
		)
		.await;
	}

	let env = env.login_admin().await;

	let page: Value = env
		.app
		.get("/incidents")
		.add_query_params(json!({ "page": 2, "perPage": 4 }))
		.await
		.json();

	assert_eq!(page["total"], 10);
	assert_eq!(page["page"], 2);

	let data = page["data"].as_array().unwrap();
	assert_eq!(data.len(), 4);
	assert_eq!(data[0]["incident"]["description"], "Incident 6");

	let response = env
		.app
		.get("/incidents")
		.add_query_params(json!({ "perPage": 51 }))
		.await;

	response.assert_status(StatusCode::BAD_REQUEST);
}
