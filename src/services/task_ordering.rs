use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::models::planning::DependencyMode;
use crate::models::task::Task;

/// Deadline ascending (none last), priority descending, title, then id.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    compare_deadline(a, b)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_deadline(a: &Task, b: &Task) -> Ordering {
    match (&a.deadline, &b.deadline) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn order_tasks(tasks: &[Task], mode: DependencyMode) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|a, b| compare_tasks(a, b));

    match mode {
        DependencyMode::BestEffort => ordered,
        DependencyMode::Topological => topological_order(ordered),
    }
}

/// Kahn's algorithm over `dependencies`, always releasing the highest-ranked ready task.
/// Dependencies on ids outside the request are ignored; tasks stuck in a cycle keep
/// their ranked order at the end.
fn topological_order(ranked: Vec<&Task>) -> Vec<&Task> {
    let mut rank_by_id: HashMap<&str, usize> = HashMap::new();
    for (rank, task) in ranked.iter().enumerate() {
        rank_by_id.entry(task.id.as_str()).or_insert(rank);
    }

    let mut in_degree = vec![0usize; ranked.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); ranked.len()];
    for (rank, task) in ranked.iter().enumerate() {
        let mut seen = BTreeSet::new();
        for dependency in task.dependencies.as_deref().unwrap_or_default() {
            if let Some(&dep_rank) = rank_by_id.get(dependency.as_str()) {
                if dep_rank != rank && seen.insert(dep_rank) {
                    in_degree[rank] += 1;
                    dependents[dep_rank].push(rank);
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(rank, _)| rank)
        .collect();
    let mut emitted = vec![false; ranked.len()];
    let mut result = Vec::with_capacity(ranked.len());

    while let Some(rank) = ready.pop_first() {
        emitted[rank] = true;
        result.push(ranked[rank]);
        for &dependent in &dependents[rank] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if result.len() < ranked.len() {
        let stuck: Vec<&str> = ranked
            .iter()
            .enumerate()
            .filter(|(rank, _)| !emitted[*rank])
            .map(|(_, task)| task.id.as_str())
            .collect();
        warn!(target: "app::planning", tasks = ?stuck, "dependency cycle detected, falling back to deadline order");
        result.extend(
            ranked
                .iter()
                .enumerate()
                .filter(|(rank, _)| !emitted[*rank])
                .map(|(_, task)| *task),
        );
    }

    result
}
