use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{
        Favorite, ListCounts, ListEntry, ListKind, MediaType, NewFavorite, NewUser, RecentEntry,
        TmdbId, User,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    id: Uuid,
    user_id: Uuid,
    tmdb_id: i64,
    media_type: String,
    label: Option<String>,
    position: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = AppError;

    fn try_from(row: FavoriteRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            tmdb_id: from_db_id(row.tmdb_id)?,
            media_type: parse_media_type(&row.media_type)?,
            label: row.label,
            position: row.position,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListEntryRow {
    id: Uuid,
    user_id: Uuid,
    tmdb_id: i64,
    label: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ListEntryRow> for ListEntry {
    type Error = AppError;

    fn try_from(row: ListEntryRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            tmdb_id: from_db_id(row.tmdb_id)?,
            label: row.label,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecentRow {
    id: Uuid,
    user_id: Uuid,
    tmdb_id: i64,
    media_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecentRow> for RecentEntry {
    type Error = AppError;

    fn try_from(row: RecentRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            tmdb_id: from_db_id(row.tmdb_id)?,
            media_type: parse_media_type(&row.media_type)?,
            created_at: row.created_at,
        })
    }
}

fn to_db_id(tmdb_id: TmdbId) -> AppResult<i64> {
    i64::try_from(tmdb_id)
        .map_err(|_| AppError::InvalidInput(format!("TMDB ID out of range: {}", tmdb_id)))
}

fn from_db_id(tmdb_id: i64) -> AppResult<TmdbId> {
    TmdbId::try_from(tmdb_id)
        .map_err(|_| AppError::Internal(format!("Negative TMDB ID stored: {}", tmdb_id)))
}

fn parse_media_type(raw: &str) -> AppResult<MediaType> {
    raw.parse().map_err(AppError::Internal)
}

fn collect_rows<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// User store backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn list_table(kind: ListKind) -> &'static str {
        match kind {
            ListKind::Movies => "user_movies",
            ListKind::Series => "user_series",
        }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict("Username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT id, user_id, tmdb_id, media_type, label, position, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        collect_rows(rows)
    }

    async fn put_favorite(&self, user_id: Uuid, favorite: NewFavorite) -> AppResult<Favorite> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            r#"
            INSERT INTO favorites (id, user_id, tmdb_id, media_type, label, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, position) DO UPDATE
            SET id = EXCLUDED.id,
                tmdb_id = EXCLUDED.tmdb_id,
                media_type = EXCLUDED.media_type,
                label = EXCLUDED.label,
                created_at = NOW()
            RETURNING id, user_id, tmdb_id, media_type, label, position, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(to_db_id(favorite.tmdb_id)?)
        .bind(favorite.media_type.as_str())
        .bind(&favorite.label)
        .bind(favorite.position)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_entries(&self, user_id: Uuid, kind: ListKind) -> AppResult<Vec<ListEntry>> {
        let sql = format!(
            "SELECT id, user_id, tmdb_id, label, created_at FROM {} \
             WHERE user_id = $1 ORDER BY created_at DESC",
            Self::list_table(kind)
        );

        let rows = sqlx::query_as::<_, ListEntryRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        collect_rows(rows)
    }

    async fn has_list_entry(
        &self,
        user_id: Uuid,
        kind: ListKind,
        tmdb_id: TmdbId,
    ) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND tmdb_id = $2)",
            Self::list_table(kind)
        );

        let (exists,) = sqlx::query_as::<_, (bool,)>(&sql)
            .bind(user_id)
            .bind(to_db_id(tmdb_id)?)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn add_list_entry(
        &self,
        user_id: Uuid,
        kind: ListKind,
        tmdb_id: TmdbId,
        label: Option<String>,
    ) -> AppResult<ListEntry> {
        let sql = format!(
            "INSERT INTO {} (id, user_id, tmdb_id, label) VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, tmdb_id, label, created_at",
            Self::list_table(kind)
        );

        let result = sqlx::query_as::<_, ListEntryRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(to_db_id(tmdb_id)?)
            .bind(label)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => row.try_into(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::InvalidInput(kind.duplicate_message().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn recents(
        &self,
        user_id: Uuid,
        media_type: Option<MediaType>,
        limit: Option<i64>,
    ) -> AppResult<Vec<RecentEntry>> {
        let rows = sqlx::query_as::<_, RecentRow>(
            r#"
            SELECT id, user_id, tmdb_id, media_type, created_at
            FROM recents
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR media_type = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(media_type.map(|m| m.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        collect_rows(rows)
    }

    async fn add_recent(
        &self,
        user_id: Uuid,
        tmdb_id: TmdbId,
        media_type: MediaType,
    ) -> AppResult<RecentEntry> {
        let row = sqlx::query_as::<_, RecentRow>(
            r#"
            INSERT INTO recents (id, user_id, tmdb_id, media_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, tmdb_id, media_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(to_db_id(tmdb_id)?)
        .bind(media_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn counts(&self, user_id: Uuid) -> AppResult<ListCounts> {
        let (movie_count, series_count, favorite_count) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM user_movies WHERE user_id = $1),
                    (SELECT COUNT(*) FROM user_series WHERE user_id = $1),
                    (SELECT COUNT(*) FROM favorites WHERE user_id = $1)
                "#,
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(ListCounts {
            movie_count,
            series_count,
            favorite_count,
        })
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
