//! Content-based movie recommendations.
//!
//! Movies are represented by precomputed TF-IDF feature vectors. Given a
//! title, the engine scores every movie with cosine similarity and returns
//! the closest ones.
//!
//! - `artifacts`: item table, feature matrix and title index, loaded once
//! - `engine`: exact top-N retrieval
//! - `display`: text rendering for the command line
//! - `config`: `config.yaml` handling
//! - `storage`: file access used by the above

pub mod artifacts;
pub mod config;
pub mod display;
pub mod engine;
pub mod storage;
