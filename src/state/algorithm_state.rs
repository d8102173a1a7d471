//! Trading algorithm state.

use crate::api::types::{AlgoRunResult, AlgorithmRecord};
use chrono::{DateTime, Utc};

/// State for the user's algorithms.
#[derive(Debug, Default)]
pub struct AlgorithmState {
    pub algorithms: Vec<AlgorithmRecord>,
    /// Currently selected algorithm index.
    pub selected: Option<usize>,
    /// Result of the last crossover run.
    pub last_run: Option<AlgoRunResult>,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl AlgorithmState {
    /// Get the currently selected algorithm.
    pub fn selected_algorithm(&self) -> Option<&AlgorithmRecord> {
        self.selected.and_then(|i| self.algorithms.get(i))
    }

    /// Replace an algorithm in place after a status change.
    pub fn upsert(&mut self, algorithm: AlgorithmRecord) {
        match self.algorithms.iter_mut().find(|a| a.id == algorithm.id) {
            Some(existing) => *existing = algorithm,
            None => self.algorithms.push(algorithm),
        }
    }

    pub fn active_count(&self) -> usize {
        self.algorithms.iter().filter(|a| a.is_active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn algorithm(id: i64, active: bool) -> AlgorithmRecord {
        serde_json::from_value(json!({
            "id": id,
            "user_id": "u1",
            "symbol": "AAPL",
            "type": "moving_average_crossover",
            "parameters": {},
            "is_active": active,
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-01-01T00:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut state = AlgorithmState {
            algorithms: vec![algorithm(1, false), algorithm(2, false)],
            ..Default::default()
        };

        state.upsert(algorithm(2, true));
        assert_eq!(state.algorithms.len(), 2);
        assert_eq!(state.active_count(), 1);

        state.upsert(algorithm(3, true));
        assert_eq!(state.algorithms.len(), 3);
        assert_eq!(state.active_count(), 2);
    }
}
