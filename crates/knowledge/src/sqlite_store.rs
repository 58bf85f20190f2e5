//! SQLite-backed vector store.

use crate::store::{cosine_similarity, rank, validate_batch, VectorStore};
use crate::types::{Embedding, RecordMetadata, ScoredRecord, StoreStats, VectorRecord};
use chrono::{DateTime, Utc};
use fastrag_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const META_DIMENSIONS: &str = "dimensions";
const META_INDEXED_AT: &str = "last_indexed_at";

/// Persistent vector store in a single SQLite file.
///
/// Similarity search is a full scan; records keep their insertion order in
/// `seq`, which breaks score ties.
#[derive(Debug)]
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("Failed to create store directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite store: {}", e)))?;

        let store = Self::init(conn)?;
        tracing::debug!("Opened vector store at {:?}", db_path);
        Ok(store)
    }

    /// Open a transient store; its contents vanish on drop.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open in-memory store: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                embedding BLOB NOT NULL,
                content TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("Store connection lock poisoned".to_string()))
    }

    /// Fetch a single record by id.
    pub fn get(&self, id: &str) -> AppResult<Option<VectorRecord>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, embedding, content FROM records WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| AppError::Store(format!("Failed to read record '{}': {}", id, e)))?;

        row.map(|(id, bytes, content)| {
            Ok(VectorRecord {
                id,
                embedding: bytes_to_embedding(&bytes)?,
                metadata: RecordMetadata { content },
            })
        })
        .transpose()
    }
}

fn read_meta(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    conn.query_row(
        "SELECT value FROM store_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| AppError::Store(format!("Failed to read store metadata '{}': {}", key, e)))
}

fn stored_dimensions(conn: &Connection) -> AppResult<Option<usize>> {
    read_meta(conn, META_DIMENSIONS)?
        .map(|v| {
            v.parse::<usize>()
                .map_err(|e| AppError::Store(format!("Corrupt stored dimension '{}': {}", v, e)))
        })
        .transpose()
}

impl VectorStore for SqliteVectorStore {
    fn count(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(|e| AppError::Store(format!("Failed to count records: {}", e)))?;
        Ok(count as usize)
    }

    fn add(
        &self,
        ids: &[String],
        embeddings: &[Embedding],
        metadatas: &[RecordMetadata],
    ) -> AppResult<()> {
        let Some(dimension) = validate_batch(ids, embeddings, metadatas)? else {
            return Ok(());
        };

        let mut conn = self.lock()?;

        if let Some(stored) = stored_dimensions(&conn)? {
            if stored != dimension {
                return Err(AppError::Validation(format!(
                    "Embedding dimension {} does not match store dimension {}",
                    dimension, stored
                )));
            }
        }

        // Dropping the transaction without commit rolls back every insert
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO records (id, embedding, content) VALUES (?1, ?2, ?3)")
                .map_err(|e| AppError::Store(format!("Failed to prepare insert: {}", e)))?;

            for ((id, embedding), metadata) in ids.iter().zip(embeddings).zip(metadatas) {
                stmt.execute(params![id, embedding_to_bytes(embedding), metadata.content])
                    .map_err(|e| {
                        AppError::Store(format!("Failed to insert record '{}': {}", id, e))
                    })?;
            }
        }

        tx.execute(
            "INSERT OR IGNORE INTO store_meta (key, value) VALUES (?1, ?2)",
            params![META_DIMENSIONS, dimension.to_string()],
        )
        .map_err(|e| AppError::Store(format!("Failed to record dimension: {}", e)))?;

        tx.execute(
            "INSERT OR REPLACE INTO store_meta (key, value) VALUES (?1, ?2)",
            params![META_INDEXED_AT, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AppError::Store(format!("Failed to record index time: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Store(format!("Failed to commit records: {}", e)))?;

        tracing::debug!("Stored {} records ({} dimensions)", ids.len(), dimension);
        Ok(())
    }

    fn query(&self, embedding: &[f32], n_results: usize) -> AppResult<Vec<ScoredRecord>> {
        if n_results == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;

        match stored_dimensions(&conn)? {
            None => return Ok(Vec::new()),
            Some(stored) if stored != embedding.len() => {
                return Err(AppError::Validation(format!(
                    "Query embedding has {} dimensions, store holds {}",
                    embedding.len(),
                    stored
                )));
            }
            Some(_) => {}
        }

        let mut stmt = conn
            .prepare("SELECT id, embedding, content FROM records ORDER BY seq")
            .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| AppError::Store(format!("Failed to query records: {}", e)))?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, bytes, content) =
                row.map_err(|e| AppError::Store(format!("Failed to read record: {}", e)))?;
            let stored = bytes_to_embedding(&bytes)?;
            scored.push(ScoredRecord {
                id,
                score: cosine_similarity(embedding, &stored),
                metadata: RecordMetadata { content },
            });
        }

        let results = rank(scored, n_results);

        tracing::debug!(
            "Retrieved {} records (requested top-{})",
            results.len(),
            n_results
        );

        Ok(results)
    }

    fn stats(&self) -> AppResult<StoreStats> {
        let records = self.count()?;
        let conn = self.lock()?;

        let last_indexed_at = read_meta(&conn, META_INDEXED_AT)?
            .map(|v| {
                DateTime::parse_from_rfc3339(&v)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| AppError::Store(format!("Corrupt index timestamp '{}': {}", v, e)))
            })
            .transpose()?;

        Ok(StoreStats {
            records,
            dimensions: stored_dimensions(&conn)?,
            last_indexed_at,
        })
    }
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Embedding> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Store(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
