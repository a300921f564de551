//! User and roster repository.

use sqlx::PgPool;
use uuid::Uuid;

use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;
use mathquest_entity::User;

const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, u.role, u.last_active";

/// Repository for user lookups and the teacher/student assignment table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Students assigned to a teacher, ordered by name.
    pub async fn find_students_of(&self, teacher_id: Uuid) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u \
             JOIN teacher_students ts ON ts.student_id = u.id \
             WHERE ts.teacher_id = $1 \
             ORDER BY u.first_name, u.last_name, u.email"
        ))
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list students", e))
    }

    /// Teachers a student is assigned to, ordered by name.
    pub async fn find_teachers_of(&self, student_id: Uuid) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u \
             JOIN teacher_students ts ON ts.teacher_id = u.id \
             WHERE ts.student_id = $1 \
             ORDER BY u.first_name, u.last_name, u.email"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list teachers", e))
    }
}
