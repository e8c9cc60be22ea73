// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The switch dependency graph.
//!
//! Pure state and traversal; no locking or notification here. The board
//! clones the current graph, mutates the clone, and swaps it in, so every
//! method on `Graph` may assume exclusive access.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cell {
    value: bool,
    /// Unset cells read as false but have never been written or derived.
    assigned: bool,
    expr: Option<Expr>,
}

impl Cell {
    fn leaf() -> Self {
        Self { value: false, assigned: false, expr: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Graph {
    cells: HashMap<String, Cell>,
    /// Reverse edges: dependency name to the derived cells that use it.
    dependents: HashMap<String, Vec<String>>,
}

impl Graph {
    pub(crate) fn is_leaf(&self, name: &str) -> Option<bool> {
        self.cells.get(name).map(|cell| cell.expr.is_none())
    }

    /// Effective value: unset cells read as false.
    pub(crate) fn value(&self, name: &str) -> Option<bool> {
        self.cells.get(name).map(|cell| cell.value)
    }

    /// Create a leaf cell if absent. Idempotent; never downgrades a
    /// derived cell.
    pub(crate) fn register_leaf(&mut self, name: &str) {
        self.cells.entry(name.to_string()).or_insert_with(Cell::leaf);
    }

    /// Would wiring `name` to `deps` close a loop through existing
    /// expression edges?
    pub(crate) fn would_cycle(&self, name: &str, deps: &BTreeSet<String>) -> bool {
        let mut stack: Vec<&str> = deps.iter().map(String::as_str).collect();
        let mut visited = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if current == name {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(Cell { expr: Some(expr), .. }) = self.cells.get(current) {
                for dep in expr.deps() {
                    if dep == name {
                        return true;
                    }
                    if !visited.contains(dep.as_str()) {
                        if let Some((key, _)) = self.cells.get_key_value(dep.as_str()) {
                            stack.push(key.as_str());
                        }
                    }
                }
            }
        }
        false
    }

    /// Install (or replace) the expression of a derived cell. The caller
    /// has already rejected cycles; missing dependencies are created as
    /// unset leaves.
    pub(crate) fn set_expr(&mut self, name: &str, expr: Expr) {
        let deps = expr.deps();
        for dep in &deps {
            self.register_leaf(dep);
        }

        // Drop reverse edges from a previous expression, then add the new ones.
        let old_deps = self
            .cells
            .get(name)
            .and_then(|cell| cell.expr.as_ref())
            .map(Expr::deps)
            .unwrap_or_default();
        for dep in &old_deps {
            if let Some(users) = self.dependents.get_mut(dep) {
                users.retain(|user| user != name);
            }
        }
        for dep in &deps {
            self.dependents.entry(dep.clone()).or_default().push(name.to_string());
        }

        let cell = self.cells.entry(name.to_string()).or_insert_with(Cell::leaf);
        cell.expr = Some(expr);
    }

    /// Assign a leaf cell; the caller has already verified it is a leaf.
    /// Returns the old effective value.
    pub(crate) fn assign(&mut self, name: &str, value: bool) -> bool {
        let cell = self.cells.entry(name.to_string()).or_insert_with(Cell::leaf);
        let old = cell.value;
        cell.value = value;
        cell.assigned = true;
        old
    }

    /// Evaluate one derived cell in place. Returns `(name, old, new)` if
    /// the effective value changed. Used when an expression is first
    /// installed; steady-state recomputation goes through
    /// [`Graph::recompute_from`].
    pub(crate) fn recompute_cell(&mut self, name: &str) -> Option<(String, bool, bool)> {
        let new = {
            let Cell { expr: Some(expr), .. } = self.cells.get(name)? else { return None };
            expr.eval(&|dep| self.value(dep).unwrap_or(false))
        };
        let cell = self.cells.get_mut(name)?;
        let old = cell.value;
        cell.value = new;
        cell.assigned = true;
        (old != new).then(|| (name.to_string(), old, new))
    }

    /// Recompute every derived cell transitively dependent on `roots`,
    /// each exactly once, in topological order. Returns the committed
    /// changes as `(name, old, new)` in evaluation order.
    pub(crate) fn recompute_from(&mut self, roots: &[String]) -> Vec<(String, bool, bool)> {
        let affected = self.affected_in_topo_order(roots);
        let mut changes = Vec::new();
        for name in affected {
            let new = {
                let Some(Cell { expr: Some(expr), .. }) = self.cells.get(&name) else { continue };
                expr.eval(&|dep| self.value(dep).unwrap_or(false))
            };
            if let Some(cell) = self.cells.get_mut(&name) {
                let old = cell.value;
                cell.value = new;
                cell.assigned = true;
                if old != new {
                    changes.push((name, old, new));
                }
            }
        }
        changes
    }

    /// Derived cells reachable from `roots` via reverse edges, ordered so
    /// every cell appears after all of its affected dependencies.
    fn affected_in_topo_order(&self, roots: &[String]) -> Vec<String> {
        let mut affected: Vec<String> = Vec::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut frontier: VecDeque<&str> = roots.iter().map(String::as_str).collect();
        while let Some(current) = frontier.pop_front() {
            if let Some(users) = self.dependents.get(current) {
                for user in users {
                    if seen.insert(user.as_str()) {
                        affected.push(user.clone());
                        frontier.push_back(user.as_str());
                    }
                }
            }
        }

        // Kahn over the affected subgraph only: edges from dependencies
        // inside the set to their users.
        let in_set: BTreeSet<String> = affected.iter().cloned().collect();
        let mut remaining: Vec<String> = affected;
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut done: BTreeSet<String> = BTreeSet::new();
        while !remaining.is_empty() {
            let mut progressed = false;
            let mut next_round = Vec::new();
            for name in remaining {
                let ready = self
                    .cells
                    .get(&name)
                    .and_then(|cell| cell.expr.as_ref())
                    .map(Expr::deps)
                    .unwrap_or_default()
                    .iter()
                    .all(|dep| !in_set.contains(dep.as_str()) || done.contains(dep));
                if ready {
                    done.insert(name.clone());
                    ordered.push(name);
                    progressed = true;
                } else {
                    next_round.push(name);
                }
            }
            // The graph is acyclic by construction, so progress is
            // guaranteed; bail rather than loop if that ever breaks.
            if !progressed {
                ordered.extend(next_round);
                break;
            }
            remaining = next_round;
        }
        ordered
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
