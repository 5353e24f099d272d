//! Ingestion and recommendation boundary around the [`DifficultyIndex`].
//!
//! A catalog is built from a JSON problem listing (an array of problem
//! records) and indexes every record by its difficulty score. Recommendation
//! is a windowed range query around a user's skill level; the result is
//! handed back verbatim, without secondary sorting or deduplication.

use crate::index::DifficultyIndex;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Failures while reading a problem listing.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read problem listing: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed problem listing: {0}")]
    Json(#[from] serde_json::Error),
}

/// One record of the problem listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub difficulty: i64,
}

/// An indexed problem catalog with an explicitly owned lifecycle; there is no
/// shared global instance.
#[derive(Debug, Default)]
pub struct Catalog {
    index: DifficultyIndex<Problem>,
}

impl Catalog {
    #[inline]
    pub fn new() -> Self {
        Self {
            index: DifficultyIndex::new(),
        }
    }

    /// Load and index a JSON problem listing from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load and index a JSON problem listing from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let problems: Vec<Problem> = serde_json::from_reader(reader)?;
        Ok(Self::from_problems(problems))
    }

    /// Parse and index a JSON problem listing held in memory.
    pub fn from_json(listing: &str) -> Result<Self, CatalogError> {
        let problems: Vec<Problem> = serde_json::from_str(listing)?;
        Ok(Self::from_problems(problems))
    }

    /// Index an already-parsed problem listing.
    pub fn from_problems(problems: Vec<Problem>) -> Self {
        let mut catalog = Self::new();
        for problem in problems {
            catalog.insert(problem);
        }

        info!(
            "loaded {} problems across {} difficulty levels",
            catalog.len(),
            catalog.index.levels()
        );

        catalog
    }

    /// Index a single problem, e.g. on a catalog update.
    pub fn insert(&mut self, problem: Problem) {
        debug!(
            "indexing problem {} at difficulty {}",
            problem.id, problem.difficulty
        );
        self.index.insert(problem.difficulty, problem);
    }

    /// Problems within `window` of the user's skill level, grouped by
    /// difficulty in ascending order.
    #[inline]
    pub fn recommend(&self, skill: i64, window: i64) -> Vec<&Problem> {
        self.index.range_query(skill, window)
    }

    /// Problems at exactly the given difficulty, in the order the listing
    /// provided them.
    #[inline]
    pub fn at_difficulty(&self, difficulty: i64) -> &[Problem] {
        self.index.search(difficulty)
    }

    /// Total number of indexed problems.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Return the underlying [`DifficultyIndex`] for this catalog.
    #[inline]
    pub fn index(&self) -> &DifficultyIndex<Problem> {
        &self.index
    }
}
