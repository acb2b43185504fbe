//! PostgreSQL-backed recipe store and startup DDL.

use super::RecipeStore;
use crate::error::{AppError, ConfigError};
use crate::model::{NewRecipe, Page, PageRequest, Recipe, RecipeChanges};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

const RECIPE_COLUMNS: &str = "id, title, ingredients, instructions, image, created_at, updated_at";

/// Create the `recipes` table and its listing index if missing. Idempotent.
pub async fn ensure_recipe_table(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL CHECK (title <> ''),
            ingredients TEXT[] NOT NULL CHECK (cardinality(ingredients) > 0),
            instructions TEXT NOT NULL CHECK (instructions <> ''),
            image TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS recipes_created_at_idx ON recipes (created_at DESC, id DESC)")
        .execute(pool)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn list(&self, page: PageRequest) -> Result<Page, AppError> {
        let sql = format!(
            "SELECT {} FROM recipes ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            RECIPE_COLUMNS
        );
        tracing::debug!(sql = %sql, page = page.page, limit = page.limit, "query");
        let items: Vec<Recipe> = sqlx::query_as(&sql)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;
        Ok(Page {
            items,
            total: total.max(0) as u64,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipe>, AppError> {
        let sql = format!("SELECT {} FROM recipes WHERE id = $1", RECIPE_COLUMNS);
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn insert(&self, recipe: NewRecipe, image: Option<String>) -> Result<Recipe, AppError> {
        let sql = format!(
            "INSERT INTO recipes (id, title, ingredients, instructions, image, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {}",
            RECIPE_COLUMNS
        );
        let id = Uuid::new_v4();
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as(&sql)
            .bind(id)
            .bind(recipe.title)
            .bind(recipe.ingredients)
            .bind(recipe.instructions)
            .bind(image)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: RecipeChanges) -> Result<Option<Recipe>, AppError> {
        let sql = format!(
            "UPDATE recipes SET title = $2, ingredients = $3, instructions = $4, image = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            RECIPE_COLUMNS
        );
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.ingredients)
            .bind(changes.instructions)
            .bind(changes.image)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Recipe>, AppError> {
        let sql = format!("DELETE FROM recipes WHERE id = $1 RETURNING {}", RECIPE_COLUMNS);
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database, with the URL's host and TLS options, to run CREATE DATABASE.
/// Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = admin_options(database_url)?;
    let Some(db_name) = db_name.filter(|name| !name.is_empty() && name != "postgres") else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the `postgres` maintenance database plus the database named in the URL.
fn admin_options(url: &str) -> Result<(PgConnectOptions, Option<String>), ConfigError> {
    let opts = PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let db_name = opts.get_database().map(str::to_string);
    Ok((opts.database("postgres"), db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_options_target_postgres_and_keep_the_host() {
        let (admin, name) = admin_options("postgres://u:p@localhost:5432/recipes?sslmode=disable").unwrap();
        assert_eq!(name.as_deref(), Some("recipes"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
    }

    #[test]
    fn slashes_in_query_values_do_not_leak_into_the_name() {
        let (admin, name) =
            admin_options("postgres://u:p@db:5432/recipes?sslmode=verify-full&sslrootcert=/etc/ssl/ca.pem").unwrap();
        assert_eq!(name.as_deref(), Some("recipes"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "db");
    }

    #[test]
    fn url_without_path_names_no_database() {
        let (admin, name) = admin_options("postgres://u:p@db:5432").unwrap();
        assert_ne!(name.as_deref(), Some("u:p@db:5432"));
        assert_eq!(admin.get_host(), "db");
        assert_eq!(admin.get_database(), Some("postgres"));
    }

    #[test]
    fn unparseable_url_is_a_config_error() {
        let err = admin_options("postgres://u:p@db:notaport/recipes").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_URL", .. }));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }
}
