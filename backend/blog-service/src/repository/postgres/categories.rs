use super::PgRepository;
use crate::error::Result;
use crate::models::Category;
use crate::repository::CategoryRepository;
use async_trait::async_trait;

#[async_trait]
impl CategoryRepository for PgRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT slug, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    async fn find_category(&self, slug: &str) -> Result<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT slug, name FROM categories WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }

    async fn upsert_category(&self, category: &Category) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (slug, name)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING slug, name
            "#,
        )
        .bind(&category.slug)
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }
}
