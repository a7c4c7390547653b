//! Helpers for integration tests.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::NamedTempFile;
use testset_admin::db::{DbPool, establish_connection_pool};
use testset_admin::domain::types::TestSetId;
use testset_admin::schema::evaluations;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Attach an evaluation to `test_set_id`, the way the evaluation runner
    /// would.
    pub fn add_evaluation(&self, test_set_id: TestSetId, created_at: NaiveDateTime) {
        let mut conn = self.pool.get().expect("should acquire DB connection");
        diesel::insert_into(evaluations::table)
            .values((
                evaluations::test_set_id.eq(test_set_id.get()),
                evaluations::owner.eq("admin@example.com"),
                evaluations::name.eq("nightly run"),
                evaluations::status.eq("completed"),
                evaluations::system_prompt.eq("Grade the answer."),
                evaluations::model_used.eq("test-model"),
                evaluations::created_at.eq(created_at),
                evaluations::updated_at.eq(created_at),
            ))
            .execute(&mut conn)
            .expect("should insert evaluation");
    }
}
