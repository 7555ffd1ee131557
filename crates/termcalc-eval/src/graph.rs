//! Equation dependency graph.
//!
//! Edges point from an equation to the equations its body references.
//! Cycles are found with Kahn's algorithm: whatever cannot be peeled off
//! in topological order is on a cycle or downstream of one, and a
//! reachability check separates the two.

use indexmap::{IndexMap, IndexSet};
use termcalc_core::EquationId;

/// Which equations reference which.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: IndexMap<EquationId, IndexSet<EquationId>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equation without dependencies.
    pub fn add_equation(&mut self, id: EquationId) {
        self.edges.entry(id).or_default();
    }

    /// Records that `from` references `to`.
    pub fn add_dependency(&mut self, from: EquationId, to: EquationId) {
        self.edges.entry(from).or_default().insert(to);
        self.add_equation(to);
    }

    /// Returns the equations `id` references directly.
    pub fn dependencies(&self, id: EquationId) -> impl Iterator<Item = EquationId> + '_ {
        self.edges.get(&id).into_iter().flatten().copied()
    }

    /// Number of equations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns every equation that lies on a reference cycle, in insertion order.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<EquationId> {
        let mut in_degree: IndexMap<EquationId, usize> =
            self.edges.keys().map(|&id| (id, 0)).collect();
        for targets in self.edges.values() {
            for target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree += 1;
                }
            }
        }

        let mut queue: Vec<EquationId> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&id, _)| id)
            .collect();
        while let Some(id) = queue.pop() {
            for target in self.dependencies(id) {
                if let Some(degree) = in_degree.get_mut(&target) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push(target);
                    }
                }
            }
        }

        let remaining: IndexSet<EquationId> = in_degree
            .into_iter()
            .filter(|&(_, d)| d > 0)
            .map(|(id, _)| id)
            .collect();
        remaining
            .iter()
            .copied()
            .filter(|&id| self.reaches(id, id, &remaining))
            .collect()
    }

    /// Returns true if the reference `from → to` closes a cycle.
    #[must_use]
    pub fn is_cyclic_edge(&self, from: EquationId, to: EquationId) -> bool {
        let all: IndexSet<EquationId> = self.edges.keys().copied().collect();
        to == from || self.path_exists(to, from, &all)
    }

    /// Returns every equation that depends on `id`, directly or transitively.
    #[must_use]
    pub fn dependents_of(&self, id: EquationId) -> IndexSet<EquationId> {
        let mut found = IndexSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for (&from, targets) in &self.edges {
                if targets.contains(&current) && found.insert(from) {
                    stack.push(from);
                }
            }
        }
        found.shift_remove(&id);
        found
    }

    /// Path of at least one edge from `from` to `to` within `within`.
    fn reaches(&self, from: EquationId, to: EquationId, within: &IndexSet<EquationId>) -> bool {
        self.dependencies(from)
            .filter(|t| within.contains(t))
            .any(|t| t == to || self.path_exists(t, to, within))
    }

    /// Path of zero or more edges from `from` to `to` within `within`.
    fn path_exists(&self, from: EquationId, to: EquationId, within: &IndexSet<EquationId>) -> bool {
        let mut seen = IndexSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(self.dependencies(current).filter(|t| within.contains(t)));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> EquationId {
        EquationId::new(n)
    }

    #[test]
    fn test_acyclic() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(id(0), id(1));
        graph.add_dependency(id(1), id(2));
        graph.add_dependency(id(0), id(2));
        assert!(graph.find_cycles().is_empty());
        assert_eq!(graph.len(), 3);
        assert!(!graph.is_cyclic_edge(id(0), id(1)));
    }

    #[test]
    fn test_cycle_excludes_downstream() {
        // 0 → 1 → 2 → 1, 3 → 0
        let mut graph = DependencyGraph::new();
        graph.add_dependency(id(0), id(1));
        graph.add_dependency(id(1), id(2));
        graph.add_dependency(id(2), id(1));
        graph.add_dependency(id(3), id(0));

        assert_eq!(graph.find_cycles(), vec![id(1), id(2)]);
        assert!(graph.is_cyclic_edge(id(1), id(2)));
        assert!(graph.is_cyclic_edge(id(2), id(1)));
        assert!(!graph.is_cyclic_edge(id(0), id(1)));
    }

    #[test]
    fn test_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(id(1), id(0));
        graph.add_dependency(id(2), id(1));
        graph.add_equation(id(3));

        let dependents: Vec<_> = graph.dependents_of(id(0)).into_iter().collect();
        assert_eq!(dependents, vec![id(1), id(2)]);
        assert!(graph.dependents_of(id(3)).is_empty());
    }
}
