use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A physical hole on a course; shotgun events start two groups per hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Hole {
    pub id: i64,
    pub course_id: i64,
    pub number: i32,
}

impl Hole {
    pub async fn find_by_course(pool: &PgPool, course_id: i64) -> Result<Vec<Hole>, sqlx::Error> {
        sqlx::query_as::<_, Hole>(
            r#"
            SELECT id, course_id, number
            FROM holes
            WHERE course_id = $1
            ORDER BY number
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
