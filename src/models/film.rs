use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MpaaRating {
    G,
    #[serde(rename = "PG")]
    Pg,
    #[serde(rename = "PG-13")]
    Pg13,
    R,
    #[serde(rename = "NC-17")]
    Nc17,
}

impl std::str::FromStr for MpaaRating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "G" => Ok(MpaaRating::G),
            "PG" => Ok(MpaaRating::Pg),
            "PG-13" => Ok(MpaaRating::Pg13),
            "R" => Ok(MpaaRating::R),
            "NC-17" => Ok(MpaaRating::Nc17),
            _ => Err(anyhow::anyhow!(
                "Rating must be one of: G, PG, PG-13, R, NC-17 (got {s})"
            )),
        }
    }
}

/// DB row struct joined with its language. `rating` is fetched as TEXT and
/// numeric columns as FLOAT8 so no extra sqlx type features are needed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Film {
    pub film_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub language_id: i32,
    pub language_name: Option<String>,
    pub rental_duration: i32,
    pub rental_rate: f64,
    pub length: Option<i32>,
    pub replacement_cost: f64,
    pub rating: Option<String>,
    pub special_features: Option<Vec<String>>,
    pub last_update: DateTime<Utc>,
    pub streaming_available: bool,
}

/// SELECT prefix for [`Film`] rows; callers append WHERE / ORDER BY.
pub const FILM_SELECT: &str = "SELECT f.film_id::INT4 AS film_id, f.title, f.description,
        f.release_year::INT4 AS release_year, f.language_id::INT4 AS language_id,
        TRIM(l.name) AS language_name, f.rental_duration::INT4 AS rental_duration,
        f.rental_rate::FLOAT8 AS rental_rate, f.length::INT4 AS length,
        f.replacement_cost::FLOAT8 AS replacement_cost, f.rating::TEXT AS rating,
        f.special_features, f.last_update, f.streaming_available
     FROM film f
     LEFT JOIN language l ON l.language_id = f.language_id";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilmResponse {
    pub film_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub language_id: i32,
    pub language_name: Option<String>,
    pub rental_duration: i32,
    pub rental_rate: f64,
    pub length: Option<i32>,
    pub replacement_cost: f64,
    pub rating: Option<MpaaRating>,
    pub special_features: Option<Vec<String>>,
    pub last_update: DateTime<Utc>,
    pub streaming_available: bool,
}

impl From<Film> for FilmResponse {
    fn from(f: Film) -> Self {
        Self {
            film_id: f.film_id,
            title: f.title,
            description: f.description,
            release_year: f.release_year,
            language_id: f.language_id,
            language_name: f.language_name,
            rental_duration: f.rental_duration,
            rental_rate: f.rental_rate,
            length: f.length,
            replacement_cost: f.replacement_cost,
            rating: f.rating.and_then(|r| r.parse().ok()),
            special_features: f.special_features,
            last_update: f.last_update,
            streaming_available: f.streaming_available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilmListResponse {
    pub films: Vec<FilmResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct FilmCreateResponse {
    pub film_id: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FilmListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub category: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

impl FilmListQuery {
    pub const MAX_PAGE_SIZE: i64 = 100;
    /// Largest page whose offset still fits in an i64 at `MAX_PAGE_SIZE`.
    pub const MAX_PAGE: i64 = i64::MAX / Self::MAX_PAGE_SIZE;

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=Self::MAX_PAGE).contains(&self.page) {
            return Err(format!("page must be between 1 and {}", Self::MAX_PAGE));
        }
        if !(1..=Self::MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(format!("page_size must be between 1 and {}", Self::MAX_PAGE_SIZE));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Blank category strings are treated as no filter.
    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFilmRequest {
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub language_id: i32,
    pub original_language_id: Option<i32>,
    #[serde(default = "default_rental_duration")]
    pub rental_duration: i32,
    #[serde(default = "default_rental_rate")]
    pub rental_rate: f64,
    pub length: Option<i32>,
    #[serde(default = "default_replacement_cost")]
    pub replacement_cost: f64,
    pub rating: Option<String>,
    pub special_features: Option<Vec<String>>,
    #[serde(default)]
    pub streaming_available: bool,
}

fn default_rental_duration() -> i32 {
    3
}

fn default_rental_rate() -> f64 {
    4.99
}

fn default_replacement_cost() -> f64 {
    19.99
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFilmRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub language_id: Option<i32>,
    pub original_language_id: Option<i32>,
    pub rental_duration: Option<i32>,
    pub rental_rate: Option<f64>,
    pub length: Option<i32>,
    pub replacement_cost: Option<f64>,
    pub rating: Option<String>,
    pub special_features: Option<Vec<String>>,
    pub streaming_available: Option<bool>,
}

fn check_title(title: &str) -> Result<(), String> {
    let len = title.chars().count();
    if len == 0 || len > 255 {
        return Err("title must be between 1 and 255 characters".into());
    }
    Ok(())
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{field} must be between {min} and {max}"));
    }
    Ok(())
}

fn check_optional_fields(
    description: Option<&str>,
    release_year: Option<i32>,
    original_language_id: Option<i32>,
    length: Option<i32>,
    rating: Option<&str>,
) -> Result<(), String> {
    if let Some(d) = description {
        if d.chars().count() > 1000 {
            return Err("description must be at most 1000 characters".into());
        }
    }
    if let Some(y) = release_year {
        check_range("release_year", y, 1901, 2155)?;
    }
    if let Some(id) = original_language_id {
        if id <= 0 {
            return Err("original_language_id must be > 0".into());
        }
    }
    if let Some(l) = length {
        check_range("length", l, 1, 1000)?;
    }
    if let Some(r) = rating {
        r.parse::<MpaaRating>().map_err(|e| e.to_string())?;
    }
    Ok(())
}

impl CreateFilmRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_title(&self.title)?;
        if self.language_id <= 0 {
            return Err("language_id must be > 0".into());
        }
        check_range("rental_duration", self.rental_duration, 1, 365)?;
        check_range("rental_rate", self.rental_rate, 0.0, 999.99)?;
        check_range("replacement_cost", self.replacement_cost, 0.0, 999.99)?;
        check_optional_fields(
            self.description.as_deref(),
            self.release_year,
            self.original_language_id,
            self.length,
            self.rating.as_deref(),
        )
    }
}

impl UpdateFilmRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(t) = &self.title {
            check_title(t)?;
        }
        if let Some(id) = self.language_id {
            if id <= 0 {
                return Err("language_id must be > 0".into());
            }
        }
        if let Some(d) = self.rental_duration {
            check_range("rental_duration", d, 1, 365)?;
        }
        if let Some(r) = self.rental_rate {
            check_range("rental_rate", r, 0.0, 999.99)?;
        }
        if let Some(c) = self.replacement_cost {
            check_range("replacement_cost", c, 0.0, 999.99)?;
        }
        check_optional_fields(
            self.description.as_deref(),
            self.release_year,
            self.original_language_id,
            self.length,
            self.rating.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct FilmSummaryRequest {
    pub film_id: i32,
}

/// Structured output requested from the chat model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmSummaryResponse {
    pub title: String,
    pub rating: String,
    pub recommended: bool,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateFilmRequest {
        serde_json::from_value(serde_json::json!({
            "title": "ACADEMY DINOSAUR",
            "language_id": 1
        }))
        .unwrap()
    }

    #[test]
    fn create_request_defaults() {
        let req = create_request();
        assert_eq!(req.rental_duration, 3);
        assert_eq!(req.rental_rate, 4.99);
        assert_eq!(req.replacement_cost, 19.99);
        assert!(!req.streaming_available);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_unknown_rating() {
        let mut req = create_request();
        req.rating = Some("X".into());
        assert!(req.validate().is_err());
        req.rating = Some("PG-13".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_out_of_range_values() {
        let mut req = create_request();
        req.title = String::new();
        assert!(req.validate().is_err());

        let mut req = create_request();
        req.release_year = Some(1900);
        assert!(req.validate().is_err());

        let mut req = create_request();
        req.rental_duration = 366;
        assert!(req.validate().is_err());

        let mut req = create_request();
        req.language_id = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_only_checks_present_fields() {
        assert!(UpdateFilmRequest::default().validate().is_ok());
        let req = UpdateFilmRequest {
            length: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn list_query_bounds_and_offset() {
        let q: FilmListQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!((q.page, q.page_size), (1, 10));
        assert_eq!(q.offset(), 0);

        let q = FilmListQuery { page: 3, page_size: 25, category: Some("  ".into()) };
        assert!(q.validate().is_ok());
        assert_eq!(q.offset(), 50);
        assert_eq!(q.category_filter(), None);

        let q = FilmListQuery { page: 0, page_size: 10, category: None };
        assert!(q.validate().is_err());
        let q = FilmListQuery { page: 1, page_size: 101, category: None };
        assert!(q.validate().is_err());
    }

    #[test]
    fn list_query_rejects_page_past_offset_range() {
        let q = FilmListQuery { page: i64::MAX / 50, page_size: 100, category: None };
        assert!(q.validate().is_err());

        let q = FilmListQuery {
            page: FilmListQuery::MAX_PAGE,
            page_size: FilmListQuery::MAX_PAGE_SIZE,
            category: None,
        };
        assert!(q.validate().is_ok());
        assert!(q.offset() > 0);
    }

    #[test]
    fn rating_round_trips_through_its_wire_name() {
        let r: MpaaRating = "NC-17".parse().unwrap();
        assert_eq!(r, MpaaRating::Nc17);
        assert_eq!(serde_json::to_value(r).unwrap(), "NC-17");
        assert_eq!(serde_json::to_value(MpaaRating::Pg13).unwrap(), "PG-13");
    }
}
