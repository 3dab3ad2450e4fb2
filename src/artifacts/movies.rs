//! Item table: the ordered list of movies the feature matrix was built from.
//!
//! Position `i` in the table is row `i` of the feature matrix. The table is
//! read from a CSV file with a header row; only `title`, `cast`, `director`
//! and `genres` are kept, other columns are ignored.

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// A single movie record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cast: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub genres: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemTable {
    movies: Vec<Movie>,
}

impl ItemTable {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Decode a CSV document. Empty cells become empty strings.
    pub fn from_csv(data: &[u8]) -> Result<Self, csv::Error> {
        let now = Instant::now();
        let mut reader = csv::Reader::from_reader(data);

        let mut movies = vec![];
        for record in reader.deserialize::<Movie>() {
            movies.push(record?);
        }

        log::debug!(
            "took {}ms to read {} movies",
            now.elapsed().as_micros() as f64 / 1000.0,
            movies.len()
        );

        Ok(Self { movies })
    }

    /// Encode back to CSV with the four known columns.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(vec![]);
        for movie in &self.movies {
            writer.serialize(movie)?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Movie> {
        self.movies.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    /// Sorted, de-duplicated list of non-empty titles.
    pub fn sorted_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self
            .movies
            .iter()
            .map(|m| m.title.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect();
        titles.sort_unstable();
        titles.dedup();
        titles
    }

    /// Number of distinct non-empty directors.
    pub fn distinct_directors(&self) -> usize {
        self.movies
            .iter()
            .map(|m| m.director.trim())
            .filter(|d| !d.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, director: &str) -> Movie {
        Movie {
            title: title.to_string(),
            director: director.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_csv_keeps_order_and_ignores_extra_columns() {
        let data = "\
index,title,cast,director,genres,overview
0,Avatar,Sam Worthington,James Cameron,Action Adventure,blue people
1,Spectre,Daniel Craig,Sam Mendes,Action Thriller,spy
";
        let table = ItemTable::from_csv(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().title, "Avatar");
        assert_eq!(table.get(1).unwrap().director, "Sam Mendes");
        assert_eq!(table.get(1).unwrap().genres, "Action Thriller");
    }

    #[test]
    fn test_from_csv_empty_cells() {
        let data = "title,cast,director,genres\nNo Cast,,,Drama\n";
        let table = ItemTable::from_csv(data.as_bytes()).unwrap();

        let movie = table.get(0).unwrap();
        assert_eq!(movie.cast, "");
        assert_eq!(movie.director, "");
        assert_eq!(movie.genres, "Drama");
    }

    #[test]
    fn test_from_csv_missing_columns_default_to_empty() {
        let data = "title,genres\nOnly Title,Comedy\n";
        let table = ItemTable::from_csv(data.as_bytes()).unwrap();

        assert_eq!(table.get(0).unwrap().title, "Only Title");
        assert_eq!(table.get(0).unwrap().director, "");
    }

    #[test]
    fn test_from_csv_rejects_ragged_rows() {
        let data = "title,cast,director,genres\nA,b,c\n";
        assert!(ItemTable::from_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let table = ItemTable::new(vec![
            Movie {
                title: "Heat".to_string(),
                cast: "Al Pacino, Robert De Niro".to_string(),
                director: "Michael Mann".to_string(),
                genres: "Crime".to_string(),
            },
            movie("Ronin", "John Frankenheimer"),
        ]);

        let data = table.to_csv().unwrap();
        assert_eq!(ItemTable::from_csv(&data).unwrap(), table);
    }

    #[test]
    fn test_sorted_titles_dedups_and_skips_blank() {
        let table = ItemTable::new(vec![
            movie("Zodiac", ""),
            movie("", ""),
            movie("Alien", ""),
            movie("Zodiac", ""),
            movie("  ", ""),
        ]);

        assert_eq!(table.sorted_titles(), vec!["Alien", "Zodiac"]);
    }

    #[test]
    fn test_distinct_directors() {
        let table = ItemTable::new(vec![
            movie("Alien", "Ridley Scott"),
            movie("Gladiator", "Ridley Scott"),
            movie("Heat", "Michael Mann"),
            movie("Unknown", ""),
        ]);

        assert_eq!(table.distinct_directors(), 2);
    }
}
