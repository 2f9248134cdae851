//! Fixed-size round-robin pool of SQLite connections.
//!
//! `SqliteConnection` is `Send` but not `Sync`, so each connection is wrapped
//! in a `Mutex`. The pool hands out connections round-robin via an atomic
//! counter, allowing concurrent requests to query on different connections.
//! The store is read-only once seeding has finished, so readers never contend
//! on SQLite's write lock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use diesel::prelude::*;
use diesel::ConnectionError;

pub struct DbPool {
    connections: Vec<Mutex<SqliteConnection>>,
    next: AtomicUsize,
}

impl DbPool {
    /// Opens `size` connections (at least one) to the database at
    /// `database_url`.
    pub fn connect(database_url: &str, size: usize) -> Result<Self, ConnectionError> {
        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(Mutex::new(SqliteConnection::establish(database_url)?));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Acquires the next connection from the pool (round-robin). The guard is
    /// held for the duration of one request and released on drop, on every
    /// exit path.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    pub fn acquire(&self) -> MutexGuard<'_, SqliteConnection> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx].lock().expect("connection pool mutex poisoned")
    }
}
