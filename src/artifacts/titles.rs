//! Title -> row position lookup.
//!
//! Titles are not unique across the dataset. When the same title is
//! registered twice the later position replaces the earlier one, both when
//! building from a table and when decoding a JSON object with repeated keys.

use std::collections::HashMap;

use crate::artifacts::movies::ItemTable;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TitleIndex {
    positions: HashMap<String, usize>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `title` at `position`, replacing any earlier registration.
    pub fn insert(&mut self, title: impl Into<String>, position: usize) {
        self.positions.insert(title.into(), position);
    }

    /// Index every row of `table` by title, last occurrence wins.
    pub fn from_table(table: &ItemTable) -> Self {
        let mut index = Self::new();
        for (position, movie) in table.iter().enumerate() {
            index.insert(movie.title.clone(), position);
        }
        index
    }

    /// Decode a JSON object of `{"title": position}` pairs.
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        let positions: HashMap<String, usize> = serde_json::from_slice(data)?;
        Ok(Self { positions })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.positions)
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, title: &str) -> Option<usize> {
        self.positions.get(title).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::movies::Movie;

    fn titled(title: &str) -> Movie {
        Movie {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let mut index = TitleIndex::new();
        index.insert("The Matrix", 3);

        assert_eq!(index.get("The Matrix"), Some(3));
        assert_eq!(index.get("the matrix"), None);
        assert_eq!(index.get("The Matrix "), None);
    }

    #[test]
    fn test_from_table_last_duplicate_wins() {
        let table = ItemTable::new(vec![
            titled("Solaris"),
            titled("Heat"),
            titled("Solaris"),
        ]);

        let index = TitleIndex::from_table(&table);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Solaris"), Some(2));
        assert_eq!(index.get("Heat"), Some(1));
    }

    #[test]
    fn test_from_json() {
        let index = TitleIndex::from_json(br#"{"Avatar": 0, "Spectre": 1}"#).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Spectre"), Some(1));
    }

    #[test]
    fn test_from_json_repeated_key_last_wins() {
        let index = TitleIndex::from_json(br#"{"Solaris": 4, "Solaris": 9}"#).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Solaris"), Some(9));
    }

    #[test]
    fn test_from_json_rejects_negative_position() {
        assert!(TitleIndex::from_json(br#"{"Avatar": -1}"#).is_err());
        assert!(TitleIndex::from_json(b"[1, 2]").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut index = TitleIndex::new();
        index.insert("Alien", 0);
        index.insert("Aliens", 1);

        let data = index.to_json().unwrap();
        assert_eq!(TitleIndex::from_json(&data).unwrap(), index);
    }
}
