use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::{Corpus, Like, Place, PlaceId, UserId};
use crate::error::{PlacesError, Result};

/// Dense boolean places × users like matrix.
///
/// Rows are places and columns users, both in snapshot order. Every place and
/// user of the snapshot has a row/column, including those with zero likes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts", into = "MatrixParts")]
pub struct InteractionMatrix {
    place_ids: Vec<PlaceId>,
    user_ids: Vec<UserId>,
    place_pos: HashMap<PlaceId, usize>,
    user_pos: HashMap<UserId, usize>,
    /// Row-major, `place * n_users + user`
    cells: Vec<bool>,
}

/// Serialized form: ids plus the liked cells of each place row
#[derive(Serialize, Deserialize)]
struct MatrixParts {
    places: Vec<PlaceId>,
    users: Vec<UserId>,
    rows: Vec<Vec<usize>>,
}

impl From<InteractionMatrix> for MatrixParts {
    fn from(matrix: InteractionMatrix) -> Self {
        let rows = (0..matrix.n_places())
            .map(|p| matrix.users_who_liked(p).collect())
            .collect();
        Self {
            places: matrix.place_ids,
            users: matrix.user_ids,
            rows,
        }
    }
}

impl TryFrom<MatrixParts> for InteractionMatrix {
    type Error = PlacesError;

    fn try_from(parts: MatrixParts) -> Result<Self> {
        if parts.rows.len() != parts.places.len() {
            return Err(PlacesError::InconsistentCorpus(format!(
                "matrix has {} rows for {} places",
                parts.rows.len(),
                parts.places.len()
            )));
        }

        let mut matrix = Self::empty(parts.users, parts.places)?;
        let n_users = matrix.n_users();
        for (place, row) in parts.rows.iter().enumerate() {
            for &user in row {
                if user >= n_users {
                    return Err(PlacesError::InconsistentCorpus(format!(
                        "matrix cell references user column {} of {}",
                        user, n_users
                    )));
                }
                matrix.cells[place * n_users + user] = true;
            }
        }
        Ok(matrix)
    }
}

impl InteractionMatrix {
    /// All-false matrix; rejects duplicate ids
    fn empty(users: Vec<UserId>, places: Vec<PlaceId>) -> Result<Self> {
        let user_pos = index_ids(&users, "user")?;
        let place_pos = index_ids(&places, "place")?;

        Ok(Self {
            cells: vec![false; places.len() * users.len()],
            place_ids: places,
            user_ids: users,
            place_pos,
            user_pos,
        })
    }

    /// Build from consistent snapshots of users, places and likes.
    ///
    /// Fails with `InconsistentCorpus` if a like references an unknown user or
    /// place, or if an id appears twice. Repeated like edges collapse to one cell.
    pub fn build(users: &[UserId], places: &[Place], likes: &[Like]) -> Result<Self> {
        let mut matrix = Self::empty(
            users.to_vec(),
            places.iter().map(|p| p.id.clone()).collect(),
        )?;

        for like in likes {
            let user = *matrix.user_pos.get(&like.user).ok_or_else(|| {
                PlacesError::InconsistentCorpus(format!(
                    "like ({}, {}) references unknown user",
                    like.user, like.place
                ))
            })?;
            let place = *matrix.place_pos.get(&like.place).ok_or_else(|| {
                PlacesError::InconsistentCorpus(format!(
                    "like ({}, {}) references unknown place",
                    like.user, like.place
                ))
            })?;
            let n_users = matrix.n_users();
            matrix.cells[place * n_users + user] = true;
        }

        Ok(matrix)
    }

    pub fn from_corpus(corpus: &Corpus) -> Result<Self> {
        Self::build(&corpus.users, &corpus.places, &corpus.likes)
    }

    pub fn n_places(&self) -> usize {
        self.place_ids.len()
    }

    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn place_ids(&self) -> &[PlaceId] {
        &self.place_ids
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn place_index(&self, place: &str) -> Option<usize> {
        self.place_pos.get(place).copied()
    }

    pub fn user_index(&self, user: &str) -> Option<usize> {
        self.user_pos.get(user).copied()
    }

    pub fn is_liked(&self, place: usize, user: usize) -> bool {
        self.cells[place * self.n_users() + user]
    }

    /// Place row (one cell per user)
    pub fn place_row(&self, place: usize) -> &[bool] {
        let n = self.n_users();
        &self.cells[place * n..(place + 1) * n]
    }

    /// User indices that liked `place`, in column order
    pub fn users_who_liked(&self, place: usize) -> impl Iterator<Item = usize> + '_ {
        self.place_row(place)
            .iter()
            .enumerate()
            .filter_map(|(u, liked)| liked.then_some(u))
    }

    /// Place indices liked by `user`, in row order
    pub fn places_liked_by(&self, user: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_places()).filter(move |&p| self.is_liked(p, user))
    }

    pub fn like_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Place rows as 0/1 vectors (place space)
    pub fn place_vectors(&self) -> Vec<Vec<f64>> {
        (0..self.n_places())
            .map(|p| self.place_row(p).iter().map(|&c| if c { 1.0 } else { 0.0 }).collect())
            .collect()
    }

    /// User rows of the transposed matrix as 0/1 vectors (user space)
    pub fn user_vectors(&self) -> Vec<Vec<f64>> {
        (0..self.n_users())
            .map(|u| {
                (0..self.n_places())
                    .map(|p| if self.is_liked(p, u) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect()
    }

    /// CSV export: `places,<user ids...>` header then one 0/1 row per place
    pub fn to_csv_string(&self) -> String {
        let mut out = String::from("places");
        for user in &self.user_ids {
            out.push(',');
            out.push_str(user);
        }
        out.push('\n');

        for (p, place) in self.place_ids.iter().enumerate() {
            out.push_str(place);
            for &cell in self.place_row(p) {
                out.push_str(if cell { ",1" } else { ",0" });
            }
            out.push('\n');
        }
        out
    }
}

fn index_ids(ids: &[String], kind: &str) -> Result<HashMap<String, usize>> {
    let mut positions = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if positions.insert(id.clone(), i).is_some() {
            return Err(PlacesError::InconsistentCorpus(format!("duplicate {} id '{}'", kind, id)));
        }
    }
    Ok(positions)
}
