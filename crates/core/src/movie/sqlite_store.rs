//! SQLite-backed movie store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{functions::FunctionFlags, params, Connection, ErrorCode};

use super::{
    normalize_title, Movie, MovieFilter, MoviePatch, MovieRecord, MovieSort, MovieStore,
    StoreError, UniqueField, MANUAL_ENTRY,
};

const SELECT_COLUMNS: &str = "id, external_id, title, episode_number, director, producer, release_date, opening_text, created_at, updated_at";

/// SQLite-backed movie store.
pub struct SqliteMovieStore {
    conn: Mutex<Connection>,
}

impl SqliteMovieStore {
    /// Create a new SQLite movie store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite movie store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// SQLite's own `lower()` and `LIKE` only fold ASCII letters.
    fn register_functions(conn: &Connection) -> Result<(), StoreError> {
        conn.create_scalar_function(
            "unicode_lower",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS movies (
                id TEXT PRIMARY KEY,
                external_id TEXT NOT NULL,
                title TEXT NOT NULL,
                title_key TEXT NOT NULL,
                episode_number INTEGER NOT NULL,
                director TEXT NOT NULL,
                producer TEXT NOT NULL,
                release_date TEXT NOT NULL,
                opening_text TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Uniqueness backstop for concurrent writers
            CREATE UNIQUE INDEX IF NOT EXISTS idx_movies_title_key ON movies(title_key);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_movies_episode_number ON movies(episode_number);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_movies_external_id
                ON movies(external_id) WHERE external_id != '{}';
            "#,
            MANUAL_ENTRY
        ))
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Map a write error, recognizing unique constraint violations.
    fn map_write_error(e: rusqlite::Error) -> StoreError {
        if let rusqlite::Error::SqliteFailure(ref err, Some(ref msg)) = e {
            if err.code == ErrorCode::ConstraintViolation {
                if msg.contains("movies.title_key") {
                    return StoreError::UniqueViolation {
                        field: UniqueField::Title,
                    };
                }
                if msg.contains("movies.episode_number") {
                    return StoreError::UniqueViolation {
                        field: UniqueField::EpisodeNumber,
                    };
                }
                if msg.contains("movies.external_id") {
                    return StoreError::UniqueViolation {
                        field: UniqueField::ExternalId,
                    };
                }
            }
        }
        StoreError::Database(e.to_string())
    }

    fn build_where_clause(filter: &MovieFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let clause = match filter {
            MovieFilter::All => String::new(),
            MovieFilter::TitleKey(key) => {
                params.push(Box::new(key.clone()));
                "WHERE title_key = ?".to_string()
            }
            MovieFilter::EpisodeNumber(n) => {
                params.push(Box::new(*n));
                "WHERE episode_number = ?".to_string()
            }
            MovieFilter::Search(term) => {
                // Literal substring match, no wildcards
                params.push(Box::new(term.to_lowercase()));
                "WHERE instr(unicode_lower(title), ?1) > 0 \
                 OR instr(unicode_lower(director), ?1) > 0 \
                 OR instr(unicode_lower(producer), ?1) > 0"
                    .to_string()
            }
        };

        (clause, params)
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_movie(row: &rusqlite::Row) -> rusqlite::Result<Movie> {
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        Ok(Movie {
            id: row.get(0)?,
            external_id: row.get(1)?,
            title: row.get(2)?,
            episode_number: row.get(3)?,
            director: row.get(4)?,
            producer: row.get(5)?,
            release_date: row.get(6)?,
            opening_text: row.get(7)?,
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn query_one(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Option<Movie>, StoreError> {
        match conn.query_row(sql, params, Self::row_to_movie) {
            Ok(movie) => Ok(Some(movie)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    fn get_locked(conn: &Connection, id: &str) -> Result<Option<Movie>, StoreError> {
        let sql = format!("SELECT {} FROM movies WHERE id = ?", SELECT_COLUMNS);
        Self::query_one(conn, &sql, params![id])
    }
}

impl MovieStore for SqliteMovieStore {
    fn create(&self, record: MovieRecord) -> Result<Movie, StoreError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let movie = record.movie;

        conn.execute(
            "INSERT INTO movies (id, external_id, title, title_key, episode_number, director, producer, release_date, opening_text, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                record.external_id,
                movie.title,
                normalize_title(&movie.title),
                movie.episode_number,
                movie.director,
                movie.producer,
                movie.release_date,
                movie.opening_text,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(Self::map_write_error)?;

        Ok(Movie {
            id,
            external_id: record.external_id,
            title: movie.title,
            episode_number: movie.episode_number,
            director: movie.director,
            producer: movie.producer,
            release_date: movie.release_date,
            opening_text: movie.opening_text,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::get_locked(&conn, id)
    }

    fn get_by_external_id(&self, external_id: &str) -> Result<Option<Movie>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM movies WHERE external_id = ? LIMIT 1",
            SELECT_COLUMNS
        );
        Self::query_one(&conn, &sql, params![external_id])
    }

    fn find_one(&self, filter: &MovieFilter) -> Result<Option<Movie>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT {} FROM movies {} ORDER BY id ASC LIMIT 1",
            SELECT_COLUMNS, where_clause
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        Self::query_one(&conn, &sql, param_refs.as_slice())
    }

    fn count(&self, filter: &MovieFilter) -> Result<u64, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM movies {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(count as u64)
    }

    fn scan(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Movie>, StoreError> {
        // SQLite reads a negative OFFSET as zero, so never let one through
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        // Search uses numbered parameter ?1, so limit/offset must be numbered too
        let next = params.len() + 1;
        let sql = format!(
            "SELECT {} FROM movies {} ORDER BY {} {}, id ASC LIMIT ?{} OFFSET ?{}",
            SELECT_COLUMNS,
            where_clause,
            sort.field.column(),
            sort.direction.sql(),
            next,
            next + 1
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(limit));
        all_params.push(Box::new(offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_movie)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut movies = Vec::new();
        for row in rows {
            movies.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }

        Ok(movies)
    }

    fn update(&self, id: &str, patch: &MoviePatch) -> Result<Movie, StoreError> {
        let conn = self.conn.lock().unwrap();

        let current =
            Self::get_locked(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if patch.is_empty() {
            return Ok(current);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = patch.title {
            assignments.push("title = ?");
            values.push(Box::new(title.clone()));
            assignments.push("title_key = ?");
            values.push(Box::new(normalize_title(title)));
        }
        if let Some(episode_number) = patch.episode_number {
            assignments.push("episode_number = ?");
            values.push(Box::new(episode_number));
        }
        if let Some(ref director) = patch.director {
            assignments.push("director = ?");
            values.push(Box::new(director.clone()));
        }
        if let Some(ref producer) = patch.producer {
            assignments.push("producer = ?");
            values.push(Box::new(producer.clone()));
        }
        if let Some(ref release_date) = patch.release_date {
            assignments.push("release_date = ?");
            values.push(Box::new(release_date.clone()));
        }
        if let Some(ref opening_text) = patch.opening_text {
            assignments.push("opening_text = ?");
            values.push(Box::new(opening_text.clone()));
        }

        assignments.push("updated_at = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id.to_string()));

        let sql = format!("UPDATE movies SET {} WHERE id = ?", assignments.join(", "));
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();

        conn.execute(&sql, param_refs.as_slice())
            .map_err(Self::map_write_error)?;

        Self::get_locked(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let affected = conn
            .execute("DELETE FROM movies WHERE id = ?", params![id])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
