//! Movie ratings dataset
//!
//! Loads `user,movie,date,stars` rows from a CSV source and answers
//! "how many ratings of movie M have at least S stars" counts.

use crate::dataset::{Dataset, DatasetError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Lowest star value accepted in a rating
pub const MIN_STARS: u8 = 1;

/// Highest star value accepted in a rating
pub const MAX_STARS: u8 = 5;

/// A single movie rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Rater identifier (e.g., an email address)
    pub user: String,
    pub movie: String,
    /// Date as written in the source
    pub date: String,
    pub stars: u8,
}

/// Ratings of `movie` with at least `min_stars` stars
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingPredicate {
    pub movie: String,
    pub min_stars: u8,
}

impl RatingPredicate {
    pub fn new(movie: impl Into<String>, min_stars: u8) -> Self {
        Self {
            movie: movie.into(),
            min_stars,
        }
    }

    fn check(&self) -> Result<(), DatasetError> {
        if self.movie.is_empty() {
            return Err(DatasetError::MalformedPredicate(
                "movie name must not be empty".to_string(),
            ));
        }
        if !(MIN_STARS..=MAX_STARS).contains(&self.min_stars) {
            return Err(DatasetError::MalformedPredicate(format!(
                "star threshold {} outside {}..={}",
                self.min_stars, MIN_STARS, MAX_STARS
            )));
        }
        Ok(())
    }

    fn matches(&self, rating: &Rating) -> bool {
        rating.movie == self.movie && rating.stars >= self.min_stars
    }
}

/// In-memory ratings table
#[derive(Debug, Clone, Default)]
pub struct RatingsDataset {
    entries: Vec<Rating>,
}

impl RatingsDataset {
    /// Build a dataset from already parsed ratings
    pub fn from_ratings(entries: Vec<Rating>) -> Self {
        Self { entries }
    }

    /// Load a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV rows of `user,movie,date,stars`
    ///
    /// Fields may be wrapped in double quotes; a doubled quote inside a quoted
    /// field is a literal quote. Blank lines are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let reader = BufReader::new(reader);
        let mut entries = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_rating(&line, line_no)?);
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.entries
    }
}

impl Dataset for RatingsDataset {
    type Predicate = RatingPredicate;

    fn count(&self, predicate: &RatingPredicate) -> Result<u64, DatasetError> {
        predicate.check()?;
        Ok(self.entries.iter().filter(|r| predicate.matches(r)).count() as u64)
    }
}

fn parse_rating(line: &str, line_no: usize) -> Result<Rating, DatasetError> {
    let malformed = |reason: String| DatasetError::MalformedRecord {
        line: line_no,
        reason,
    };

    let fields = split_fields(line).map_err(malformed)?;
    let [user, movie, date, stars]: [String; 4] = fields
        .try_into()
        .map_err(|f: Vec<String>| malformed(format!("expected 4 fields, found {}", f.len())))?;

    let stars: u8 = stars
        .trim()
        .parse()
        .map_err(|_| malformed(format!("stars '{}' is not an integer", stars)))?;
    if !(MIN_STARS..=MAX_STARS).contains(&stars) {
        return Err(malformed(format!(
            "stars {} outside {}..={}",
            stars, MIN_STARS, MAX_STARS
        )));
    }

    Ok(Rating {
        user,
        movie,
        date,
        stars,
    })
}

/// Split one CSV line on commas, honoring double-quoted fields
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
alice@example.com,Seven Samurai,2021-03-01,5
bob@example.com,Seven Samurai,2021-03-02,3
carol@example.com,\"Crouching Tiger, Hidden Dragon\",2021-03-03,4

dave@example.com,Seven Samurai,2021-03-04,2
";

    fn sample() -> RatingsDataset {
        RatingsDataset::from_reader(Cursor::new(SAMPLE)).unwrap()
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dataset = sample();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.ratings()[2].movie, "Crouching Tiger, Hidden Dragon");
    }

    #[test]
    fn test_count_with_threshold() {
        let dataset = sample();
        assert_eq!(dataset.count(&RatingPredicate::new("Seven Samurai", 1)).unwrap(), 3);
        assert_eq!(dataset.count(&RatingPredicate::new("Seven Samurai", 3)).unwrap(), 2);
        assert_eq!(dataset.count(&RatingPredicate::new("Seven Samurai", 5)).unwrap(), 1);
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let dataset = sample();
        assert_eq!(dataset.count(&RatingPredicate::new("Rashomon", 1)).unwrap(), 0);
    }

    #[test]
    fn test_malformed_predicate() {
        let dataset = sample();
        assert!(matches!(
            dataset.count(&RatingPredicate::new("Seven Samurai", 0)),
            Err(DatasetError::MalformedPredicate(_))
        ));
        assert!(matches!(
            dataset.count(&RatingPredicate::new("Seven Samurai", 6)),
            Err(DatasetError::MalformedPredicate(_))
        ));
        assert!(matches!(
            dataset.count(&RatingPredicate::new("", 3)),
            Err(DatasetError::MalformedPredicate(_))
        ));
    }

    #[test]
    fn test_malformed_record_reports_line() {
        let source = "a@x.com,Ran,2020-01-01,4\nb@x.com,Ran,2020-01-02,many\n";
        let err = RatingsDataset::from_reader(Cursor::new(source)).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = RatingsDataset::from_reader(Cursor::new("a@x.com,Ran,4\n")).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_out_of_range_stars() {
        let err = RatingsDataset::from_reader(Cursor::new("a@x.com,Ran,2020-01-01,9\n")).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { .. }));
    }

    #[test]
    fn test_split_fields_quotes() {
        assert_eq!(
            split_fields("\"say \"\"hi\"\"\",b").unwrap(),
            vec!["say \"hi\"".to_string(), "b".to_string()]
        );
        assert!(split_fields("\"open,b").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RatingsDataset::from_path("/nonexistent/ratings.csv").unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
