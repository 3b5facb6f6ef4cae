use std::time::Instant;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::film::{CreateFilmRequest, Film, FilmListQuery, UpdateFilmRequest, FILM_SELECT};

/// Escape `%`, `_` and `\` so `term` matches literally inside `ILIKE`.
fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Append the category join + ILIKE filter shared by the count and page queries.
fn push_category_filter(qb: &mut QueryBuilder<'_, Postgres>, category: Option<&str>) {
    if let Some(category) = category {
        qb.push(
            " JOIN film_category fc ON fc.film_id = f.film_id
              JOIN category c ON c.category_id = fc.category_id
              WHERE c.name ILIKE ",
        );
        qb.push_bind(like_contains(category));
    }
}

fn count_query(category: Option<&str>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(f.film_id) FROM film f");
    push_category_filter(&mut qb, category);
    qb
}

fn page_query(category: Option<&str>, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(FILM_SELECT);
    push_category_filter(&mut qb, category);
    qb.push(" ORDER BY f.film_id LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);
    qb
}

pub struct FilmService;

impl FilmService {
    /// One page of films ordered by id, plus the total matching count.
    pub async fn list(pool: &PgPool, query: &FilmListQuery) -> anyhow::Result<(Vec<Film>, i64)> {
        let start = Instant::now();
        let category = query.category_filter();

        let total: i64 = count_query(category)
            .build_query_scalar()
            .fetch_one(pool)
            .await?;

        let films = page_query(category, query.page_size, query.offset())
            .build_query_as::<Film>()
            .fetch_all(pool)
            .await?;

        tracing::info!(
            page = query.page,
            page_size = query.page_size,
            category,
            count = films.len(),
            total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed films"
        );
        Ok((films, total))
    }

    pub async fn get(pool: &PgPool, film_id: i32) -> anyhow::Result<Option<Film>> {
        let film = sqlx::query_as::<_, Film>(&format!("{FILM_SELECT} WHERE f.film_id = $1"))
            .bind(film_id)
            .fetch_optional(pool)
            .await?;
        if film.is_none() {
            tracing::warn!(film_id, "Film not found");
        }
        Ok(film)
    }

    /// First film (by title) whose title contains `title`, case-insensitive.
    pub async fn find_by_title(pool: &PgPool, title: &str) -> anyhow::Result<Option<Film>> {
        let film = sqlx::query_as::<_, Film>(&format!(
            "{FILM_SELECT} WHERE f.title ILIKE $1 ORDER BY f.title LIMIT 1"
        ))
        .bind(like_contains(title))
        .fetch_optional(pool)
        .await?;
        Ok(film)
    }

    pub async fn categories(pool: &PgPool) -> anyhow::Result<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM category ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(names)
    }

    pub async fn create(pool: &PgPool, req: &CreateFilmRequest) -> anyhow::Result<i32> {
        let film_id: i32 = sqlx::query_scalar(
            "INSERT INTO film (title, description, release_year, language_id, original_language_id,
                rental_duration, rental_rate, length, replacement_cost, rating,
                special_features, streaming_available, fulltext)
             VALUES ($1, $2, $3, $4, $5, $6, $7::NUMERIC, $8, $9::NUMERIC, $10::mpaa_rating,
                $11, $12, to_tsvector('english', $1 || ' ' || COALESCE($2, '')))
             RETURNING film_id::INT4",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.release_year)
        .bind(req.language_id)
        .bind(req.original_language_id)
        .bind(req.rental_duration)
        .bind(req.rental_rate)
        .bind(req.length)
        .bind(req.replacement_cost)
        .bind(&req.rating)
        .bind(&req.special_features)
        .bind(req.streaming_available)
        .fetch_one(pool)
        .await?;

        tracing::info!(film_id, title = %req.title, "Film created");
        Ok(film_id)
    }

    /// Apply the provided fields; returns `None` when the film does not exist.
    pub async fn update(
        pool: &PgPool,
        film_id: i32,
        req: &UpdateFilmRequest,
    ) -> anyhow::Result<Option<Film>> {
        let updated: Option<i32> = sqlx::query_scalar(
            "UPDATE film
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 release_year = COALESCE($3, release_year),
                 language_id = COALESCE($4, language_id),
                 original_language_id = COALESCE($5, original_language_id),
                 rental_duration = COALESCE($6, rental_duration),
                 rental_rate = COALESCE($7::NUMERIC, rental_rate),
                 length = COALESCE($8, length),
                 replacement_cost = COALESCE($9::NUMERIC, replacement_cost),
                 rating = COALESCE($10::mpaa_rating, rating),
                 special_features = COALESCE($11, special_features),
                 streaming_available = COALESCE($12, streaming_available),
                 last_update = NOW()
             WHERE film_id = $13
             RETURNING film_id::INT4",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.release_year)
        .bind(req.language_id)
        .bind(req.original_language_id)
        .bind(req.rental_duration)
        .bind(req.rental_rate)
        .bind(req.length)
        .bind(req.replacement_cost)
        .bind(&req.rating)
        .bind(&req.special_features)
        .bind(req.streaming_available)
        .bind(film_id)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => {
                tracing::info!(film_id = id, "Film updated");
                Self::get(pool, id).await
            }
            None => {
                tracing::warn!(film_id, "Film not found for update");
                Ok(None)
            }
        }
    }

    /// Returns `false` when nothing was deleted.
    pub async fn delete(pool: &PgPool, film_id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM film WHERE film_id = $1")
            .bind(film_id)
            .execute(pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        tracing::info!(film_id, deleted, "Film delete");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_queries_have_no_join() {
        assert_eq!(count_query(None).sql(), "SELECT COUNT(f.film_id) FROM film f");

        let page = page_query(None, 10, 20);
        let sql = page.sql();
        assert!(!sql.contains("film_category"));
        assert!(sql.ends_with(" ORDER BY f.film_id LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn category_filter_applies_to_count_and_page() {
        let count = count_query(Some("act"));
        assert!(count.sql().contains("JOIN film_category fc"));
        assert!(count.sql().ends_with("WHERE c.name ILIKE $1"));

        let page = page_query(Some("act"), 10, 0);
        let sql = page.sql();
        assert!(sql.contains("WHERE c.name ILIKE $1"));
        assert!(sql.ends_with(" ORDER BY f.film_id LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn search_terms_match_literally() {
        assert_eq!(like_contains("ACADEMY"), "%ACADEMY%");
        assert_eq!(like_contains("100%"), "%100\\%%");
        assert_eq!(like_contains("A_B"), "%A\\_B%");
        assert_eq!(like_contains(r"C:\X"), r"%C:\\X%");
        assert_eq!(like_contains(""), "%%");
    }
}
