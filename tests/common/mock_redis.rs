use std::sync::{LazyLock, Mutex, MutexGuard};

use common::RedisConn;
use redis::cmd;

/// Number of logical databases a default redis instance exposes
const REDIS_DATABASES: usize = 16;

/// One lockable URL per logical redis database, tests holding the same URL
/// would otherwise see each others sessions
pub static REDIS_DATABASE_URLS: LazyLock<[Mutex<&'static str>; REDIS_DATABASES]> =
	LazyLock::new(|| {
		let redis_url = std::env::var("REDIS_URL").unwrap();

		std::array::from_fn(|db| {
			Mutex::new(&*format!("{redis_url}/{db}").leak())
		})
	});

pub struct RedisUrlLock;

/// Exclusive access to one logical redis database, flushed when dropped
pub struct RedisUrlGuard(MutexGuard<'static, &'static str>);

impl RedisUrlLock {
	/// Spin over all databases until a free one is found
	pub fn get() -> RedisUrlGuard {
		let mut db = 0;

		loop {
			if let Ok(lock) = REDIS_DATABASE_URLS[db].try_lock() {
				return RedisUrlGuard(lock);
			}

			db = (db + 1) % REDIS_DATABASES;
		}
	}
}

impl RedisUrlGuard {
	pub async fn connect(&self) -> RedisConn {
		let client = redis::Client::open(*self.0).unwrap();
		client.get_multiplexed_async_connection().await.unwrap()
	}
}

impl Drop for RedisUrlGuard {
	fn drop(&mut self) {
		futures::executor::block_on(async {
			let mut conn = self.connect().await;

			let _: () = cmd("FLUSHDB").query_async(&mut conn).await.unwrap();
		});
	}
}
