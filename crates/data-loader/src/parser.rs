//! Parsers for the CSV input datasets.
//!
//! Three files are understood:
//! - movies.csv: `movieId,title,genres` (genres pipe-delimited)
//! - ratings.csv: `userId,movieId,rating,timestamp`
//! - imdb_data.csv: `movieId,title_cast,director,runtime,budget,plot_keywords`

use crate::error::{DataLoadError, Result};
use crate::types::{MovieDetails, MovieId, MovieRecord, RatingEvent, UserId};
use serde::Deserialize;
use std::path::Path;

/// Placeholder the dataset uses for movies without genre tags
const NO_GENRES: &str = "(no genres listed)";

#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    genres: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct DetailsRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title_cast: Option<String>,
    director: Option<String>,
    runtime: Option<String>,
    budget: Option<String>,
    plot_keywords: Option<String>,
}

/// Run a CSV file through serde row by row, attaching file/line context to
/// any row that fails to deserialize.
fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        // Line 1 is the header row
        let line = idx + 2;
        let row = result.map_err(|e| DataLoadError::ParseError {
            file: file_name.clone(),
            line,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Parse movies.csv into catalog records.
///
/// The year is taken from the "Title (YYYY)" suffix when present; titles
/// without one simply have no year.
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let rows: Vec<MovieRow> = read_rows(path)?;
    let movies = rows
        .into_iter()
        .map(|row| {
            let title = row.title.trim().to_string();
            MovieRecord {
                id: row.movie_id,
                year: extract_year_from_title(&title),
                genres: split_genres(&row.genres),
                title,
            }
        })
        .collect();
    Ok(movies)
}

/// Parse ratings.csv into rating events
pub fn parse_ratings(path: &Path) -> Result<Vec<RatingEvent>> {
    let rows: Vec<RatingRow> = read_rows(path)?;
    let ratings = rows
        .into_iter()
        .map(|row| RatingEvent {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            timestamp: row.timestamp,
        })
        .collect();
    Ok(ratings)
}

/// Parse imdb_data.csv into per-movie descriptive metadata
pub fn parse_details(path: &Path) -> Result<Vec<MovieDetails>> {
    let rows: Vec<DetailsRow> = read_rows(path)?;
    let details = rows
        .into_iter()
        .map(|row| MovieDetails {
            movie_id: row.movie_id,
            title_cast: split_tokens(row.title_cast.as_deref()),
            director: row
                .director
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            runtime: row.runtime.as_deref().and_then(parse_leading_number),
            budget: row.budget.as_deref().and_then(parse_budget),
            plot_keywords: split_tokens(row.plot_keywords.as_deref()),
        })
        .collect();
    Ok(details)
}

/// Extract year from a movie title suffix
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
pub fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        let year_str = title[start + 1..end].trim();
        if year_str.len() == 4
            && let Ok(year) = year_str.parse::<u16>()
        {
            return Some(year);
        }
    }
    None
}

/// Split a pipe-delimited genre column, dropping the dataset's
/// "(no genres listed)" placeholder
fn split_genres(raw: &str) -> Vec<String> {
    if raw.trim() == NO_GENRES {
        return Vec::new();
    }
    split_tokens(Some(raw))
}

/// Split a pipe-delimited column into trimmed, non-empty tokens
fn split_tokens(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) => s
            .split('|')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

/// Reduce a currency-formatted budget string to a plain amount.
///
/// The source data mixes formats ("$21,347,000", "GBP12,000,000", "21347000").
/// Commas are stripped and the first contiguous digit run is kept.
fn parse_budget(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    parse_leading_number(&cleaned)
}

/// Pull the first contiguous digit run out of a string and parse it
fn parse_leading_number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &raw[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}
