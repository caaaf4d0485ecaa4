//! SQLite-backed metadata store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};

use super::{
    MetadataError, MetadataStore, NewOriginalFile, NewTranslatedFile, OriginalFileFilter,
    OriginalFileMetadata, TranslatedFileFilter, TranslatedFileMetadata,
};

const ORIGINAL_COLUMNS: &str = "id, sha256, filename, file_type, file_size, source_language, token_count, created_at, updated_at, created_by";

const TRANSLATED_COLUMNS: &str = "id, original_file_id, filename, target_language, cost, time_taken_ms, created_at, updated_at, created_by";

/// SQLite-backed metadata store.
pub struct SqliteMetadataStore {
    conn: Mutex<Connection>,
}

impl SqliteMetadataStore {
    /// Open the database at `path`, creating the file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, MetadataError> {
        let conn = Connection::open(path).map_err(|e| MetadataError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, MetadataError> {
        let conn =
            Connection::open_in_memory().map_err(|e| MetadataError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), MetadataError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS original_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sha256 TEXT NOT NULL,
                filename TEXT NOT NULL,
                file_type TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                source_language TEXT NOT NULL,
                token_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                created_by TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_original_files_owner
                ON original_files(created_by, filename);

            CREATE TABLE IF NOT EXISTS translated_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                original_file_id INTEGER NOT NULL,
                filename TEXT NOT NULL,
                target_language TEXT NOT NULL,
                cost REAL NOT NULL DEFAULT 0,
                time_taken_ms INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                created_by TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_translated_files_owner
                ON translated_files(created_by);
            CREATE INDEX IF NOT EXISTS idx_translated_files_original
                ON translated_files(original_file_id);
            "#,
        )
        .map_err(|e| MetadataError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, MetadataError> {
        self.conn
            .lock()
            .map_err(|_| MetadataError::Database("connection lock poisoned".to_string()))
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_original(row: &rusqlite::Row) -> rusqlite::Result<OriginalFileMetadata> {
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;

        Ok(OriginalFileMetadata {
            id: row.get(0)?,
            sha256: row.get(1)?,
            filename: row.get(2)?,
            file_type: row.get(3)?,
            file_size: row.get::<_, i64>(4)?.max(0) as u64,
            source_language: row.get(5)?,
            token_count: row.get::<_, i64>(6)?.max(0) as u64,
            created_at: Self::parse_timestamp(&created_at),
            updated_at: Self::parse_timestamp(&updated_at),
            created_by: row.get(9)?,
        })
    }

    fn row_to_translated(row: &rusqlite::Row) -> rusqlite::Result<TranslatedFileMetadata> {
        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;

        Ok(TranslatedFileMetadata {
            id: row.get(0)?,
            original_file_id: row.get(1)?,
            filename: row.get(2)?,
            target_language: row.get(3)?,
            cost: row.get(4)?,
            time_taken_ms: row.get::<_, i64>(5)?.max(0) as u64,
            created_at: Self::parse_timestamp(&created_at),
            updated_at: Self::parse_timestamp(&updated_at),
            created_by: row.get(8)?,
        })
    }

    /// Append an `id IN (...)` condition for the given ids.
    fn push_ids(
        ids: &[i64],
        conditions: &mut Vec<String>,
        params: &mut Vec<Box<dyn rusqlite::ToSql>>,
    ) {
        let placeholders = vec!["?"; ids.len()].join(", ");
        conditions.push(format!("id IN ({})", placeholders));
        for id in ids {
            params.push(Box::new(*id));
        }
    }

    fn where_clause(conditions: &[String]) -> String {
        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        }
    }

    fn query_rows<T>(
        conn: &Connection,
        sql: &str,
        params: Vec<Box<dyn rusqlite::ToSql>>,
        map: fn(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, MetadataError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| MetadataError::Database(e.to_string()))?;

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), map)
            .map_err(|e| MetadataError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for row_result in rows {
            items.push(row_result.map_err(|e| MetadataError::Database(e.to_string()))?);
        }
        Ok(items)
    }

    fn delete_by_ids(&self, table: &str, ids: &[i64]) -> Result<usize, MetadataError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.lock()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM {} WHERE id IN ({})", table, placeholders);

        conn.execute(&sql, params_from_iter(ids.iter()))
            .map_err(|e| MetadataError::Database(e.to_string()))
    }
}

impl MetadataStore for SqliteMetadataStore {
    fn create_original(
        &self,
        request: NewOriginalFile,
    ) -> Result<OriginalFileMetadata, MetadataError> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO original_files (sha256, filename, file_type, file_size, source_language, token_count, created_at, updated_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                request.sha256,
                request.filename,
                request.file_type,
                request.file_size as i64,
                request.source_language,
                request.token_count as i64,
                now.to_rfc3339(),
                now.to_rfc3339(),
                request.created_by,
            ],
        )
        .map_err(|e| MetadataError::Database(e.to_string()))?;

        Ok(OriginalFileMetadata {
            id: conn.last_insert_rowid(),
            sha256: request.sha256,
            filename: request.filename,
            file_type: request.file_type,
            file_size: request.file_size,
            source_language: request.source_language,
            token_count: request.token_count,
            created_at: now,
            updated_at: now,
            created_by: request.created_by,
        })
    }

    fn get_original(&self, id: i64) -> Result<Option<OriginalFileMetadata>, MetadataError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            &format!("SELECT {} FROM original_files WHERE id = ?", ORIGINAL_COLUMNS),
            params![id],
            Self::row_to_original,
        );

        match result {
            Ok(file) => Ok(Some(file)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(MetadataError::Database(e.to_string())),
        }
    }

    fn list_originals(
        &self,
        filter: &OriginalFileFilter,
    ) -> Result<Vec<OriginalFileMetadata>, MetadataError> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref created_by) = filter.created_by {
            conditions.push("created_by = ?".to_string());
            params.push(Box::new(created_by.clone()));
        }
        if let Some(ref filename) = filter.filename {
            conditions.push("filename = ?".to_string());
            params.push(Box::new(filename.clone()));
        }
        if let Some(ref ids) = filter.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            Self::push_ids(ids, &mut conditions, &mut params);
        }

        let sql = format!(
            "SELECT {} FROM original_files {} ORDER BY id ASC",
            ORIGINAL_COLUMNS,
            Self::where_clause(&conditions)
        );

        let conn = self.lock()?;
        Self::query_rows(&conn, &sql, params, Self::row_to_original)
    }

    fn delete_originals(&self, ids: &[i64]) -> Result<usize, MetadataError> {
        self.delete_by_ids("original_files", ids)
    }

    fn create_translated(
        &self,
        request: NewTranslatedFile,
    ) -> Result<TranslatedFileMetadata, MetadataError> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO translated_files (original_file_id, filename, target_language, cost, time_taken_ms, created_at, updated_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                request.original_file_id,
                request.filename,
                request.target_language,
                request.cost,
                request.time_taken_ms as i64,
                now.to_rfc3339(),
                now.to_rfc3339(),
                request.created_by,
            ],
        )
        .map_err(|e| MetadataError::Database(e.to_string()))?;

        Ok(TranslatedFileMetadata {
            id: conn.last_insert_rowid(),
            original_file_id: request.original_file_id,
            filename: request.filename,
            target_language: request.target_language,
            cost: request.cost,
            time_taken_ms: request.time_taken_ms,
            created_at: now,
            updated_at: now,
            created_by: request.created_by,
        })
    }

    fn get_translated(&self, id: i64) -> Result<Option<TranslatedFileMetadata>, MetadataError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            &format!(
                "SELECT {} FROM translated_files WHERE id = ?",
                TRANSLATED_COLUMNS
            ),
            params![id],
            Self::row_to_translated,
        );

        match result {
            Ok(file) => Ok(Some(file)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(MetadataError::Database(e.to_string())),
        }
    }

    fn list_translated(
        &self,
        filter: &TranslatedFileFilter,
    ) -> Result<Vec<TranslatedFileMetadata>, MetadataError> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref created_by) = filter.created_by {
            conditions.push("created_by = ?".to_string());
            params.push(Box::new(created_by.clone()));
        }
        if let Some(ref filename) = filter.filename {
            conditions.push("filename = ?".to_string());
            params.push(Box::new(filename.clone()));
        }
        if let Some(original_file_id) = filter.original_file_id {
            conditions.push("original_file_id = ?".to_string());
            params.push(Box::new(original_file_id));
        }
        if let Some(ref ids) = filter.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            Self::push_ids(ids, &mut conditions, &mut params);
        }

        let sql = format!(
            "SELECT {} FROM translated_files {} ORDER BY id ASC",
            TRANSLATED_COLUMNS,
            Self::where_clause(&conditions)
        );

        let conn = self.lock()?;
        Self::query_rows(&conn, &sql, params, Self::row_to_translated)
    }

    fn update_translated(
        &self,
        id: i64,
        cost: f64,
        time_taken_ms: u64,
    ) -> Result<TranslatedFileMetadata, MetadataError> {
        let conn = self.lock()?;
        let now = Utc::now();

        let updated = conn
            .execute(
                "UPDATE translated_files SET cost = ?, time_taken_ms = ?, updated_at = ? WHERE id = ?",
                params![cost, time_taken_ms as i64, now.to_rfc3339(), id],
            )
            .map_err(|e| MetadataError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(MetadataError::NotFound(id));
        }

        conn.query_row(
            &format!(
                "SELECT {} FROM translated_files WHERE id = ?",
                TRANSLATED_COLUMNS
            ),
            params![id],
            Self::row_to_translated,
        )
        .map_err(|e| MetadataError::Database(e.to_string()))
    }

    fn delete_translated(&self, ids: &[i64]) -> Result<usize, MetadataError> {
        self.delete_by_ids("translated_files", ids)
    }
}
