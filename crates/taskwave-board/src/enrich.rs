//! Column Enrichment
//!
//! Builds the renderer's view: each column with its tasks, sorted by
//! position. Pure; recomputed whenever the raw collections change.

use std::collections::HashMap;

use crate::models::{Column, EnrichedColumn, Task};

/// Columns keep their input order; each gets its own tasks sorted by
/// position (stable for ties). Tasks pointing at unknown columns are dropped.
pub fn derive_enriched_columns(columns: &[Column], tasks: &[Task]) -> Vec<EnrichedColumn> {
    let mut by_column: HashMap<&str, Vec<Task>> = HashMap::with_capacity(columns.len());
    for task in tasks {
        by_column.entry(task.column_id.as_str()).or_default().push(task.clone());
    }

    columns
        .iter()
        .map(|column| {
            let mut column_tasks = by_column.remove(column.id.as_str()).unwrap_or_default();
            column_tasks.sort_by_key(|task| task.position);
            EnrichedColumn {
                column: column.clone(),
                tasks: column_tasks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_inputs() -> (Vec<Column>, Vec<Task>) {
        let columns = vec![Column::new("c2", "b1", "Doing", 2), Column::new("c1", "b1", "Todo", 1)];
        let tasks = vec![
            Task::new("t3", "c1", "third", 2),
            Task::new("t1", "c1", "first", 0),
            Task::new("t4", "c2", "only", 0),
            Task::new("t2", "c1", "second", 1),
            Task::new("orphan", "gone", "orphan", 0),
        ];
        (columns, tasks)
    }

    #[test]
    fn test_tasks_sorted_and_partitioned() {
        let (columns, tasks) = make_inputs();
        let enriched = derive_enriched_columns(&columns, &tasks);

        assert_eq!(enriched.iter().map(|c| c.id()).collect::<Vec<_>>(), vec!["c2", "c1"]);
        let c1: Vec<&str> = enriched[1].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(c1, vec!["t1", "t2", "t3"]);
        assert_eq!(enriched[0].tasks.len(), 1);
    }

    #[test]
    fn test_inputs_untouched_and_repeatable() {
        let (columns, tasks) = make_inputs();
        let columns_before = columns.clone();
        let tasks_before = tasks.clone();

        let first = derive_enriched_columns(&columns, &tasks);
        let second = derive_enriched_columns(&columns, &tasks);

        assert_eq!(first, second);
        assert_eq!(columns, columns_before);
        assert_eq!(tasks, tasks_before);
    }

    #[test]
    fn test_empty_column_gets_empty_tasks() {
        let columns = vec![Column::new("c1", "b1", "Todo", 1)];
        let enriched = derive_enriched_columns(&columns, &[]);
        assert!(enriched[0].tasks.is_empty());
    }
}
