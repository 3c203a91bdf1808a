use std::sync::LazyLock;

use common::{DbConn, DbPool};
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::prelude::*;
use diesel_migrations::{
	EmbeddedMigrations,
	MigrationHarness,
	embed_migrations,
};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Global test database provider
pub static DATABASE_PROVIDER: LazyLock<DatabaseProvider> =
	LazyLock::new(DatabaseProvider::new);

/// Hands out throwaway databases on the server behind `DATABASE_URL`
pub struct DatabaseProvider {
	base_url:  String,
	root_pool: DbPool,
}

/// A temporary database, dropped together with the guard
pub struct DatabaseGuard {
	root_conn:     DbConn,
	database_name: String,
	database_url:  String,
}

impl DatabaseProvider {
	fn new() -> Self {
		if std::env::var("CI").is_ok_and(|ci| ci == "true") {
			tracing_subscriber::fmt()
				.pretty()
				.with_thread_names(true)
				.with_max_level(tracing::Level::DEBUG)
				.init();
		}

		let database_url = std::env::var("DATABASE_URL").unwrap();
		let (base_url, _) = database_url.rsplit_once('/').unwrap();

		let manager =
			Manager::new(database_url.clone(), deadpool_diesel::Runtime::Tokio1);
		let root_pool = Pool::builder(manager).build().unwrap();

		Self { base_url: base_url.to_string(), root_pool }
	}

	/// Create a fresh database and return a guard owning it
	///
	/// # Panics
	/// Panics if creating the database fails
	pub async fn acquire(&self) -> DatabaseGuard {
		let database_name = format!("test_{}", Uuid::new_v4().simple());
		let database_url = format!("{}/{database_name}", self.base_url);

		let root_conn = self
			.root_pool
			.get()
			.await
			.expect("could not get root pool connection");

		let query = format!("CREATE DATABASE {database_name};");

		root_conn
			.interact(|conn| diesel::sql_query(query).execute(conn))
			.await
			.expect("could not interact with root connection")
			.expect("could not create test database");

		DatabaseGuard { root_conn, database_name, database_url }
	}
}

impl DatabaseGuard {
	/// Create a pool for this database with every migration applied
	///
	/// # Panics
	/// Panics if creating the pool or migrating fails
	pub async fn create_pool(&self) -> DbPool {
		let manager = Manager::new(
			self.database_url.clone(),
			deadpool_diesel::Runtime::Tokio1,
		);

		let pool = Pool::builder(manager).build().unwrap();

		let conn = pool.get().await.unwrap();
		conn.interact(|conn| conn.run_pending_migrations(MIGRATIONS).map(|_| ()))
			.await
			.unwrap()
			.unwrap();

		pool
	}
}

impl Drop for DatabaseGuard {
	fn drop(&mut self) {
		let query =
			format!("DROP DATABASE {} WITH (FORCE);", self.database_name);

		futures::executor::block_on(async move {
			self.root_conn
				.interact(|conn| diesel::sql_query(query).execute(conn))
				.await
				.expect("could not interact with root connection")
				.expect("could not drop test database");
		});
	}
}
