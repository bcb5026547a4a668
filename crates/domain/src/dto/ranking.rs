use serde::{Deserialize, Serialize};

use crate::models::RankedRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub result_id: String,
    pub rank: u32,
}

/// Body of the manual ranking endpoint: the full list, never a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRankingRequest {
    pub rankings: Vec<RankingEntry>,
}

impl From<&[RankedRow]> for UpdateRankingRequest {
    fn from(rows: &[RankedRow]) -> Self {
        Self {
            rankings: rows
                .iter()
                .map(|row| RankingEntry {
                    result_id: row.row_id.clone(),
                    rank: row.rank,
                })
                .collect(),
        }
    }
}
