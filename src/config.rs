use std::sync::Arc;

use booking::admission::FailurePolicy;
use booking::usage::DEFAULT_MAX_HOURS_PER_DAY;
use common::{DbPool, RedisConn};
use deadpool_diesel::postgres::Manager;
use lettre::Address;
use regex::Regex;
use time::Duration;

use crate::mailer::StubMailbox;

const DEFAULT_INSTITUTIONAL_EMAIL: &str = r"^[^\s@]+@unitec\.edu(\.hn)?$";

#[derive(Clone, Debug)]
pub struct Config {
	/// Whether the app is running in production, controls secure cookies
	pub production:     bool,
	pub server_address: String,

	pub database_url: String,
	pub redis_url:    String,

	pub access_cookie_name:     String,
	pub access_cookie_lifetime: Duration,
	pub cookie_jar_key_path:    String,

	/// Emails allowed to log in at all
	pub institutional_email: Regex,
	/// Emails that log in as administrator and must supply a password
	pub admin_emails:        Vec<String>,
	pub admin_password_hash: Option<String>,

	pub admission_failure_policy: FailurePolicy,
	pub max_hours_per_day:        f64,

	pub email_address:            Address,
	pub email_operations_address: Address,
	pub email_queue_size:         usize,
	pub email_smtp_server:        String,
	pub email_smtp_password:      String,
}

impl Config {
	fn get_env(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} MUST BE SET"))
	}

	fn get_env_default(var: &str, default: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| default.to_string())
	}

	fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> T {
		value.parse().unwrap_or_else(|_| panic!("{var} IS NOT VALID: {value}"))
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if an environment variable is missing or invalid
	#[must_use]
	pub fn from_env() -> Self {
		let production =
			Self::get_env_default("PRODUCTION", "false").to_lowercase() == "true";
		let server_address = Self::get_env_default("SERVER_ADDRESS", "0.0.0.0:80");

		let database_url = Self::get_env("DATABASE_URL");
		let redis_url = Self::get_env("REDIS_URL");

		let access_cookie_name =
			Self::get_env_default("ACCESS_COOKIE_NAME", "lab_access_token");
		let access_cookie_lifetime = Duration::minutes(Self::parse_env(
			"ACCESS_COOKIE_LIFETIME_MINUTES",
			&Self::get_env_default("ACCESS_COOKIE_LIFETIME_MINUTES", "480"),
		));
		let cookie_jar_key_path = Self::get_env_default(
			"COOKIE_JAR_KEY_PATH",
			"/run/secrets/cookie-jar-key",
		);

		let institutional_email = Regex::new(&Self::get_env_default(
			"INSTITUTIONAL_EMAIL_REGEX",
			DEFAULT_INSTITUTIONAL_EMAIL,
		))
		.expect("INSTITUTIONAL_EMAIL_REGEX IS NOT A VALID REGEX");

		let admin_emails = Self::get_env_default("ADMIN_EMAILS", "")
			.split(',')
			.map(|e| e.trim().to_lowercase())
			.filter(|e| !e.is_empty())
			.collect();
		let admin_password_hash = std::env::var("ADMIN_PASSWORD_HASH").ok();

		let admission_failure_policy = Self::parse_env(
			"ADMISSION_FAILURE_POLICY",
			&Self::get_env_default("ADMISSION_FAILURE_POLICY", "open"),
		);
		let max_hours_per_day = Self::parse_env(
			"MAX_HOURS_PER_DAY",
			&Self::get_env_default(
				"MAX_HOURS_PER_DAY",
				&DEFAULT_MAX_HOURS_PER_DAY.to_string(),
			),
		);

		let email_address =
			Self::parse_env("EMAIL_ADDRESS", &Self::get_env("EMAIL_ADDRESS"));
		let email_operations_address = Self::parse_env(
			"EMAIL_OPERATIONS_ADDRESS",
			&Self::get_env("EMAIL_OPERATIONS_ADDRESS"),
		);
		let email_queue_size = Self::parse_env(
			"EMAIL_QUEUE_SIZE",
			&Self::get_env_default("EMAIL_QUEUE_SIZE", "64"),
		);
		let email_smtp_server = Self::get_env("EMAIL_SMTP_SERVER");
		let email_smtp_password =
			Self::get_env_default("EMAIL_SMTP_PASSWORD", "");

		Self {
			production,
			server_address,
			database_url,
			redis_url,
			access_cookie_name,
			access_cookie_lifetime,
			cookie_jar_key_path,
			institutional_email,
			admin_emails,
			admin_password_hash,
			admission_failure_policy,
			max_hours_per_day,
			email_address,
			email_operations_address,
			email_queue_size,
			email_smtp_server,
			email_smtp_password,
		}
	}

	/// Whether an email belongs to an administrator
	#[must_use]
	pub fn is_admin_email(&self, email: &str) -> bool {
		self.admin_emails.iter().any(|e| e.eq_ignore_ascii_case(email))
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> DbPool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		DbPool::builder(manager).build().unwrap()
	}

	/// Create a redis connection for the given config
	///
	/// # Panics
	/// Panics if connecting fails
	pub async fn create_redis_connection(&self) -> RedisConn {
		let client = redis::Client::open(self.redis_url.as_str())
			.expect("COULD NOT CREATE REDIS CLIENT");

		client
			.get_multiplexed_async_connection()
			.await
			.expect("COULD NOT CONNECT TO REDIS")
	}

	/// Create a stub mailbox if the stub mailer is configured
	#[must_use]
	pub fn create_stub_mailbox(&self) -> Option<Arc<StubMailbox>> {
		if self.email_smtp_server == "stub" {
			Some(Arc::new(StubMailbox::default()))
		} else {
			None
		}
	}
}
