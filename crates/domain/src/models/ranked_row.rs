use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DomainError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRow {
    pub row_id: String,
    /// 1-based position in the ranking list.
    pub rank: u32,
}

/// A manual ranking list for one game.
///
/// Ranks are always exactly `1..=N` in list order; every mutation renumbers
/// the whole list before returning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingList {
    rows: Vec<RankedRow>,
}

impl RankingList {
    pub fn from_row_ids<I, S>(row_ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for row_id in row_ids {
            let row_id = row_id.into();
            if !seen.insert(row_id.clone()) {
                return Err(DomainError::DuplicateRow(row_id));
            }
            rows.push(RankedRow { row_id, rank: 0 });
        }

        let mut list = Self { rows };
        list.renumber();
        Ok(list)
    }

    pub fn rows(&self) -> &[RankedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rank_of(&self, row_id: &str) -> Option<u32> {
        self.rows
            .iter()
            .find(|row| row.row_id == row_id)
            .map(|row| row.rank)
    }

    pub fn order(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.row_id.as_str()).collect()
    }

    /// Replaces the order with `new_order`, which must be a permutation of the
    /// current rows. On error the list is left untouched.
    pub fn reorder<S: AsRef<str>>(&mut self, new_order: &[S]) -> Result<&[RankedRow]> {
        if new_order.len() != self.rows.len() {
            return Err(DomainError::RowCountMismatch {
                expected: self.rows.len(),
                actual: new_order.len(),
            });
        }

        let known: HashSet<&str> = self.rows.iter().map(|row| row.row_id.as_str()).collect();
        let mut seen = HashSet::new();
        for row_id in new_order {
            let row_id = row_id.as_ref();
            if !known.contains(row_id) {
                return Err(DomainError::UnknownRow(row_id.to_string()));
            }
            if !seen.insert(row_id) {
                return Err(DomainError::DuplicateRow(row_id.to_string()));
            }
        }

        self.rows = new_order
            .iter()
            .map(|row_id| RankedRow {
                row_id: row_id.as_ref().to_string(),
                rank: 0,
            })
            .collect();
        self.renumber();

        Ok(&self.rows)
    }

    /// Moves the row at `from` to `to`, the way a drag-and-drop drop event reports it.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<&[RankedRow]> {
        if from >= self.rows.len() {
            return Err(DomainError::PositionOutOfRange(from));
        }
        if to >= self.rows.len() {
            return Err(DomainError::PositionOutOfRange(to));
        }

        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        self.renumber();

        Ok(&self.rows)
    }

    fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.rank = index as u32 + 1;
        }
    }
}
