use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use axum::http::StatusCode;
use axum_extra::extract::cookie::Key;
use axum_test::TestServer;
use chrono::NaiveDate;
use common::DbPool;
use db::{ParticipantRole, QuarterId, ReservationState};
use labreserve::mailer::{Mailer, StubMailbox};
use labreserve::{AppState, Config, routes};
use mock_redis::{RedisUrlGuard, RedisUrlLock};
use models::{NewBooking, NewLab, NewParticipant, NewTimeSlot, Quarter, Reservation};
use serde_json::json;

pub mod wrappers;

mod mock_db;
mod mock_redis;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};

pub const ADMIN_EMAIL: &str = "admin@unitec.edu";
pub const ADMIN_PASSWORD: &str = "laboratorios1234!";

pub const TEST_LABS: [&str; 2] = ["Lab A", "Lab B"];
pub const TEST_TIME_SLOTS: [&str; 3] =
	["07:00 am - 08:20 am", "08:30 am - 09:50 am", "10:00 am - 11:20 am"];

#[allow(dead_code)]
pub struct TestEnv {
	pub app:          TestServer,
	pub db_guard:     DatabaseGuard,
	pub redis_guard:  RedisUrlGuard,
	pub stub_mailbox: Arc<StubMailbox>,
	pub pool:         DbPool,
	pub lab_ids:      Vec<i32>,
	pub slot_ids:     Vec<i32>,
}

impl TestEnv {
	/// Get a test environment with mocked resources for running tests
	///
	/// # Panics
	/// Panics if building a test server or mailbox fails
	pub async fn new() -> Self {
		let mut config = Config::from_env();

		let salt = SaltString::generate(&mut OsRng);
		let password_hash = Argon2::default()
			.hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
			.unwrap()
			.to_string();

		config.admin_emails = vec![ADMIN_EMAIL.to_string()];
		config.admin_password_hash = Some(password_hash);
		config.email_smtp_server = "stub".to_string();

		let test_pool_guard = (*DATABASE_PROVIDER).acquire().await;
		let test_pool = test_pool_guard.create_pool().await;

		let (lab_ids, slot_ids) = Self::seed(&test_pool).await;

		let redis_url_guard = RedisUrlLock::get();
		let redis_connection = redis_url_guard.connect().await;

		let cookie_jar_key = Key::from(&[0u8; 64]);

		let stub_mailbox = config.create_stub_mailbox();

		let mailer = Mailer::new(&config, stub_mailbox.clone());

		let state = AppState {
			config,
			database_pool: test_pool.clone(),
			redis_connection,
			cookie_jar_key,
			mailer,
		};
		let app = routes::get_app_router(state);

		let test_server =
			TestServer::builder().save_cookies().build(app).unwrap();

		TestEnv {
			app: test_server,
			db_guard: test_pool_guard,
			redis_guard: redis_url_guard,
			stub_mailbox: stub_mailbox.unwrap(),
			pool: test_pool,
			lab_ids,
			slot_ids,
		}
	}

	/// Insert the labs, time slots and quarters every test relies on
	async fn seed(pool: &DbPool) -> (Vec<i32>, Vec<i32>) {
		let conn = pool.get().await.unwrap();

		let mut lab_ids = vec![];
		for name in TEST_LABS {
			let lab =
				NewLab { name: name.to_string() }.insert(&conn).await.unwrap();
			lab_ids.push(lab.id);
		}

		let mut slot_ids = vec![];
		for label in TEST_TIME_SLOTS {
			let slot = NewTimeSlot { label: label.to_string() }
				.insert(&conn)
				.await
				.unwrap();
			slot_ids.push(slot.id);
		}

		let quarters = [
			(QuarterId::Q1, (2025, 1, 13), (2025, 4, 4)),
			(QuarterId::Q2, (2025, 5, 5), (2025, 7, 25)),
			(QuarterId::Q3, (2025, 8, 11), (2025, 10, 31)),
			(QuarterId::Q4, (2025, 11, 3), (2026, 1, 23)),
		];

		for (id, (sy, sm, sd), (ey, em, ed)) in quarters {
			Quarter {
				id,
				starts_on: NaiveDate::from_ymd_opt(sy, sm, sd).unwrap(),
				ends_on: NaiveDate::from_ymd_opt(ey, em, ed).unwrap(),
			}
			.upsert(&conn)
			.await
			.unwrap();
		}

		(lab_ids, slot_ids)
	}

	/// Log in as a regular institutional user
	pub async fn login(self, email: &str) -> Self {
		self.app
			.post("/auth/login")
			.json(&json!({ "email": email }))
			.await
			.assert_status_ok();

		self
	}

	/// Log in as the configured administrator
	pub async fn login_admin(self) -> Self {
		self.app
			.post("/auth/login")
			.json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
			.await
			.assert_status_ok();

		self
	}

	/// Write a pending single-slot booking straight to the database
	pub async fn pending_booking(
		&self,
		role: ParticipantRole,
		email: &str,
		lab_id: i32,
		date: NaiveDate,
		time_slot_id: i32,
	) -> i32 {
		let conn = self.pool.get().await.unwrap();

		let booking = NewBooking {
			group_id: None,
			lab_id,
			dates: vec![date],
			time_slot_ids: vec![time_slot_id],
			purpose: "seeded booking".to_string(),
			repeat_days: vec![],
			requester: NewParticipant {
				name:           format!("seeded {role}"),
				account_number: "00000000".to_string(),
				email:          Some(email.to_string()),
				role,
			},
			members: vec![],
		};

		let rows = booking.insert(&conn).await.unwrap();

		rows[0].reservation.id
	}

	/// Write an approved single-slot booking straight to the database
	pub async fn approved_booking(
		&self,
		role: ParticipantRole,
		lab_id: i32,
		date: NaiveDate,
		time_slot_id: i32,
	) -> i32 {
		let id = self
			.pending_booking(role, "seed@unitec.edu", lab_id, date, time_slot_id)
			.await;

		let conn = self.pool.get().await.unwrap();
		Reservation::set_state(vec![id], ReservationState::Approved, &conn)
			.await
			.unwrap();

		id
	}
}

/// Assert the error code of a failed response
#[allow(dead_code)]
pub fn assert_error_code(
	response: &axum_test::TestResponse,
	status: StatusCode,
	code: u64,
) {
	response.assert_status(status);

	let body: serde_json::Value = response.json();
	assert_eq!(body["code"], code, "unexpected error body {body}");
}
