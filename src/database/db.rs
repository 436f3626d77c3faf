//! SQLite persistence for the trainer.
//!
//! Profiles are identity rows; each profile's progress lives as one JSON
//! document in its own row, so learner namespaces never mix. The teacher
//! panel keeps its imported documents in a separate table. An app_state
//! key/value table remembers which profile was active last.

use crate::models::{Profile, Progress};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result};

const DB_FILE: &str = "math_trails.sqlite3";

/// Opens the database file and creates missing tables.
pub fn init_database() -> Result<Connection> {
    let conn = Connection::open(DB_FILE)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            profile_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            grade_year INTEGER NOT NULL,
            class_group TEXT NOT NULL,
            school_name TEXT NOT NULL,
            start_entry INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS progress (
            profile_id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            FOREIGN KEY (profile_id) REFERENCES profiles(profile_id) ON DELETE CASCADE
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher_imports (
            profile_id TEXT PRIMARY KEY,
            school TEXT NOT NULL,
            class_group TEXT NOT NULL,
            data TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn ser_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

fn de_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
}

pub fn insert_profile(conn: &Connection, profile: &Profile) -> Result<()> {
    conn.execute(
        "INSERT INTO profiles (profile_id, first_name, grade_year, class_group, school_name, start_entry, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            profile.profile_id,
            profile.first_name,
            profile.grade_year,
            profile.class_group,
            profile.school_name,
            profile.start_entry,
            profile.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>> {
    let mut stmt = conn.prepare(
        "SELECT profile_id, first_name, grade_year, class_group, school_name, start_entry, created_at
         FROM profiles ORDER BY created_at DESC",
    )?;
    let profiles = stmt
        .query_map([], |row| {
            let created: String = row.get(6)?;
            Ok(Profile {
                profile_id: row.get(0)?,
                first_name: row.get(1)?,
                grade_year: row.get(2)?,
                class_group: row.get(3)?,
                school_name: row.get(4)?,
                start_entry: row.get(5)?,
                created_at: created
                    .parse()
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
            })
        })?
        .collect::<Result<Vec<Profile>>>()?;
    Ok(profiles)
}

/// Deletes a profile and everything stored under its namespace.
pub fn delete_profile(conn: &Connection, profile_id: &str) -> Result<()> {
    conn.execute("DELETE FROM progress WHERE profile_id = ?1", params![profile_id])?;
    conn.execute("DELETE FROM profiles WHERE profile_id = ?1", params![profile_id])?;
    if get_active_profile_id(conn)?.as_deref() == Some(profile_id) {
        conn.execute("DELETE FROM app_state WHERE key = 'active_profile_id'", ())?;
    }
    Ok(())
}

pub fn save_progress(conn: &Connection, progress: &Progress) -> Result<()> {
    let data = serde_json::to_string(progress).map_err(ser_err)?;
    conn.execute(
        "INSERT OR REPLACE INTO progress (profile_id, data) VALUES (?1, ?2)",
        params![progress.profile_id, data],
    )?;
    Ok(())
}

/// Best-effort save: a failing write is logged, never fatal, so the current
/// sitting keeps working from memory.
pub fn save_progress_best_effort(conn: &Connection, progress: &Progress) {
    if let Err(e) = save_progress(conn, progress) {
        log::warn!("could not save progress for {}: {}", progress.profile_id, e);
    }
}

pub fn load_progress(conn: &Connection, profile_id: &str) -> Result<Option<Progress>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM progress WHERE profile_id = ?1",
            params![profile_id],
            |row| row.get(0),
        )
        .optional()?;
    match data {
        Some(json) => Ok(Some(serde_json::from_str(&json).map_err(de_err)?)),
        None => Ok(None),
    }
}

pub fn set_active_profile_id(conn: &Connection, profile_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_state (key, value) VALUES ('active_profile_id', ?1)",
        params![profile_id],
    )?;
    Ok(())
}

pub fn get_active_profile_id(conn: &Connection) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM app_state WHERE key = 'active_profile_id'",
        [],
        |row| row.get(0),
    )
    .optional()
}

/// Stores one validated export document for the teacher panel.
pub fn upsert_teacher_import(
    conn: &Connection,
    profile_id: &str,
    school: &str,
    class_group: &str,
    document_json: &str,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO teacher_imports (profile_id, school, class_group, data)
         VALUES (?1, ?2, ?3, ?4)",
        params![profile_id, school, class_group, document_json],
    )?;
    Ok(())
}

/// All stored teacher imports as raw JSON documents.
pub fn load_teacher_imports(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT data FROM teacher_imports ORDER BY school, class_group")?;
    let docs = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(docs)
}

pub fn clear_teacher_imports(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM teacher_imports", ())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn test_profile(id: &str) -> Profile {
        Profile {
            profile_id: id.to_string(),
            first_name: "Sam".to_string(),
            grade_year: 7,
            class_group: "7A".to_string(),
            school_name: "Riverside".to_string(),
            start_entry: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_round_trip() {
        let conn = test_conn();
        insert_profile(&conn, &test_profile("p_db000001")).unwrap();
        let profiles = list_profiles(&conn).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].profile_id, "p_db000001");
        assert_eq!(profiles[0].grade_year, 7);
    }

    #[test]
    fn test_progress_round_trip() {
        let conn = test_conn();
        let profile = test_profile("p_db000002");
        insert_profile(&conn, &profile).unwrap();
        let mut progress = Progress::new_for_profile(&profile, Utc::now());
        progress.xp = 120;
        save_progress(&conn, &progress).unwrap();

        let loaded = load_progress(&conn, "p_db000002").unwrap().unwrap();
        assert_eq!(loaded.xp, 120);
        assert_eq!(loaded.current_track, "g1");
    }

    #[test]
    fn test_missing_progress_is_none() {
        let conn = test_conn();
        assert!(load_progress(&conn, "p_nobody").unwrap().is_none());
    }

    #[test]
    fn test_delete_profile_cascades_and_clears_active() {
        let conn = test_conn();
        let profile = test_profile("p_db000003");
        insert_profile(&conn, &profile).unwrap();
        save_progress(&conn, &Progress::new_for_profile(&profile, Utc::now())).unwrap();
        set_active_profile_id(&conn, "p_db000003").unwrap();

        delete_profile(&conn, "p_db000003").unwrap();
        assert!(list_profiles(&conn).unwrap().is_empty());
        assert!(load_progress(&conn, "p_db000003").unwrap().is_none());
        assert!(get_active_profile_id(&conn).unwrap().is_none());
    }

    #[test]
    fn test_teacher_imports_round_trip() {
        let conn = test_conn();
        upsert_teacher_import(&conn, "p_a", "Riverside", "7A", "{\"x\":1}").unwrap();
        upsert_teacher_import(&conn, "p_a", "Riverside", "7A", "{\"x\":2}").unwrap();
        let docs = load_teacher_imports(&conn).unwrap();
        assert_eq!(docs, vec!["{\"x\":2}".to_string()]);
        clear_teacher_imports(&conn).unwrap();
        assert!(load_teacher_imports(&conn).unwrap().is_empty());
    }
}
