#![allow(dead_code)]

use childes_db::prelude::*;
use tempfile::TempDir;

/// Load the fixture into a fresh mirror file. The directory must outlive every
/// connection to it.
pub fn fixture_path() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("childes.sqlite3");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../sqlite/childes_fixture.sql"))
        .unwrap();
    (dir, path.to_string_lossy().into_owned())
}

pub async fn open_fixture() -> (TempDir, ChildesConnection) {
    let (dir, path) = fixture_path();
    let conn = ChildesConnection::open_sqlite(&SqliteOptions::new(path))
        .await
        .unwrap();
    (dir, conn)
}

/// The `id` column, sorted.
pub fn ids(rs: &ResultSet) -> Vec<i64> {
    let mut ids: Vec<i64> = rs
        .column_values("id")
        .unwrap()
        .into_iter()
        .map(|v| *v.as_int().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

pub fn texts(rs: &ResultSet, column: &str) -> Vec<Option<String>> {
    rs.column_values(column)
        .unwrap()
        .into_iter()
        .map(|v| v.as_text().map(str::to_string))
        .collect()
}
