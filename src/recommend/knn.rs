use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{PlacesError, Result};
use crate::search::cosine_similarity;

/// One neighbor of a row: its position and cosine distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// `1 - cosine similarity`; a zero vector is at distance 1 from everything
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Exhaustive cosine k-NN fit.
///
/// `k` counts the row itself, as in "k = 5 is 4 neighbors + self". The row is
/// excluded by identity rather than by assuming it sorts first, so all-zero
/// rows still get `k - 1` real neighbors.
#[derive(Debug, Clone)]
pub struct NeighborIndexBuilder {
    k: usize,
}

impl NeighborIndexBuilder {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Builder returning `neighbors` other rows per row (k = neighbors + 1)
    pub fn with_neighbors(neighbors: usize) -> Self {
        Self::new(neighbors + 1)
    }

    pub fn fit(&self, labels: Vec<String>, rows: &[Vec<f64>]) -> Result<NeighborIndex> {
        if labels.len() != rows.len() {
            return Err(PlacesError::Other(format!(
                "{} labels for {} rows",
                labels.len(),
                rows.len()
            )));
        }

        let wanted = self.k.saturating_sub(1);

        let neighbors: Vec<Vec<Neighbor>> = rows
            .par_iter()
            .enumerate()
            .map(|(i, row)| {
                let mut candidates: Vec<Neighbor> = rows
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(j, other)| Neighbor {
                        index: j,
                        distance: cosine_distance(row, other),
                    })
                    .collect();

                candidates.sort_by(|a, b| {
                    a.distance
                        .partial_cmp(&b.distance)
                        .unwrap_or(Ordering::Equal)
                        .then(a.index.cmp(&b.index))
                });
                candidates.truncate(wanted);
                candidates
            })
            .collect();

        let positions = labels.iter().enumerate().map(|(i, l)| (l.clone(), i)).collect();

        Ok(NeighborIndex {
            k: self.k,
            labels,
            positions,
            neighbors,
        })
    }
}

/// Immutable fitted neighbor lists, queried by label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NeighborParts", into = "NeighborParts")]
pub struct NeighborIndex {
    k: usize,
    labels: Vec<String>,
    positions: HashMap<String, usize>,
    neighbors: Vec<Vec<Neighbor>>,
}

#[derive(Serialize, Deserialize)]
struct NeighborParts {
    k: usize,
    labels: Vec<String>,
    neighbors: Vec<Vec<Neighbor>>,
}

impl TryFrom<NeighborParts> for NeighborIndex {
    type Error = PlacesError;

    fn try_from(parts: NeighborParts) -> Result<Self> {
        let n = parts.labels.len();
        if parts.neighbors.len() != n {
            return Err(PlacesError::InconsistentCorpus(format!(
                "neighbor index has {} lists for {} labels",
                parts.neighbors.len(),
                n
            )));
        }
        if let Some(bad) = parts.neighbors.iter().flatten().find(|nb| nb.index >= n) {
            return Err(PlacesError::InconsistentCorpus(format!(
                "neighbor index references row {} of {}",
                bad.index, n
            )));
        }

        let mut positions = HashMap::with_capacity(n);
        for (i, label) in parts.labels.iter().enumerate() {
            if positions.insert(label.clone(), i).is_some() {
                return Err(PlacesError::InconsistentCorpus(format!(
                    "duplicate neighbor index label '{}'",
                    label
                )));
            }
        }

        Ok(Self {
            k: parts.k,
            labels: parts.labels,
            positions,
            neighbors: parts.neighbors,
        })
    }
}

impl From<NeighborIndex> for NeighborParts {
    fn from(index: NeighborIndex) -> Self {
        Self {
            k: index.k,
            labels: index.labels,
            neighbors: index.neighbors,
        }
    }
}

impl NeighborIndex {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.positions.contains_key(label)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    /// Row labels in fit order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Nearest other rows of `label`, closest first (self excluded)
    pub fn neighbors_of(&self, label: &str) -> Option<&[Neighbor]> {
        self.position(label).map(|i| self.neighbors[i].as_slice())
    }

    /// Nearest other labels of `label`, closest first
    pub fn neighbor_labels(&self, label: &str) -> Option<Vec<&str>> {
        self.neighbors_of(label)
            .map(|ns| ns.iter().map(|n| self.labels[n.index].as_str()).collect())
    }
}
