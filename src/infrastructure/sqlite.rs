//! SQLite 存储网关

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::infrastructure::gateway::{Deletion, StorageGateway};
use crate::models::question::{Category, NewQuestion, Question};

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY,
        type TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        category INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        difficulty INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
";

/// 基于单个 SQLite 连接的网关
pub struct SqliteGateway {
    conn: Mutex<Connection>,
}

impl SqliteGateway {
    /// 打开（或创建）数据库文件
    pub fn open(path: &Path) -> StorageResult<Self> {
        debug!("打开 SQLite 数据库: {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// 打开内存数据库
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn query_questions(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<Question>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let questions = stmt
            .query_map(params, row_to_question)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(questions)
    }
}

fn row_to_question(row: &Row) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get("id")?,
        question: row.get("question")?,
        answer: row.get("answer")?,
        category: row.get("category")?,
        difficulty: row.get("difficulty")?,
    })
}

fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        kind: row.get("type")?,
    })
}

/// 约束冲突单独归类，其余保持原样
fn classify(err: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(e, message) = &err {
        if e.code == ErrorCode::ConstraintViolation {
            return StorageError::Constraint(message.clone().unwrap_or_else(|| e.to_string()));
        }
    }
    StorageError::Sqlite(err)
}

impl StorageGateway for SqliteGateway {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    fn list_questions(&self) -> StorageResult<Vec<Question>> {
        self.query_questions(
            "SELECT id, question, answer, category, difficulty FROM questions ORDER BY id",
            [],
        )
    }

    fn list_questions_by_category(&self, category_id: i64) -> StorageResult<Vec<Question>> {
        self.query_questions(
            "SELECT id, question, answer, category, difficulty FROM questions
             WHERE category = ?1 ORDER BY id",
            params![category_id],
        )
    }

    fn get_category(&self, id: i64) -> StorageResult<Option<Category>> {
        let conn = self.conn.lock()?;
        let category = conn
            .query_row(
                "SELECT id, type FROM categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    fn list_categories(&self) -> StorageResult<Vec<Category>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT id, type FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn upsert_category(&self, category: Category) -> StorageResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO categories (id, type) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET type = excluded.type",
            params![category.id, category.kind],
        )
        .map_err(classify)?;
        Ok(())
    }

    fn insert_question(&self, question: NewQuestion) -> StorageResult<i64> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO questions (question, answer, category, difficulty)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                question.question,
                question.answer,
                question.category,
                question.difficulty
            ],
        )
        .map_err(classify)?;
        Ok(conn.last_insert_rowid())
    }

    fn delete_question(&self, id: i64) -> StorageResult<Deletion> {
        let conn = self.conn.lock()?;
        let affected = conn
            .execute("DELETE FROM questions WHERE id = ?1", params![id])
            .map_err(classify)?;
        if affected == 0 {
            Ok(Deletion::NotFound)
        } else {
            Ok(Deletion::Deleted)
        }
    }
}
