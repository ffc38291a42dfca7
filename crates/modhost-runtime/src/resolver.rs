//! Dependency resolution and activation ordering.
//!
//! Edges point from dependent to dependency: if A depends on B the edge is
//! `A -> B`. A module resolves when every dependency is present and resolves
//! itself. Cycles are found with Tarjan's strongly connected components, so
//! every member of a cycle is reported, not just the node where a walk
//! happened to stop. The activation order comes from Kahn's algorithm with a
//! min-heap keyed by discovery index, which makes it deterministic.
//!
//! # Example
//!
//! ```
//! use modhost_manifest::ModuleDescriptor;
//! use modhost_runtime::resolver::resolve;
//!
//! let a = ModuleDescriptor::from_text("symbolicName: a\nversion: 1\ndependencies: b").unwrap();
//! let b = ModuleDescriptor::from_text("symbolicName: b\nversion: 1").unwrap();
//!
//! let resolution = resolve(&[&a, &b]);
//! assert_eq!(resolution.order, vec!["b", "a"]);
//! ```

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use modhost_manifest::ModuleDescriptor;

use crate::error::Error;
use crate::record::ResolutionFailure;

/// Outcome of resolving a set of modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Resolvable modules, dependencies strictly before dependents.
    pub order: Vec<String>,
    /// Unresolvable modules and why, in discovery order.
    pub failures: Vec<(String, ResolutionFailure)>,
    /// Each dependency cycle once, members in discovery order.
    pub cycles: Vec<Vec<String>>,
}

impl Resolution {
    pub fn is_resolved(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }

    pub fn failure(&self, name: &str) -> Option<&ResolutionFailure> {
        self.failures
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, failure)| failure)
    }

    /// One error per cycle, then one per unresolved module.
    pub fn errors(&self) -> Vec<Error> {
        let cycles = self.cycles.iter().map(|members| Error::CyclicDependency {
            members: members.clone(),
        });
        let unresolved = self.failures.iter().filter_map(|(name, failure)| match failure {
            ResolutionFailure::Unresolved { .. } => Some(failure.to_error(name)),
            ResolutionFailure::Cyclic { .. } => None,
        });
        cycles.chain(unresolved).collect()
    }
}

/// Resolve `modules`, given in discovery order.
///
/// Symbolic names are expected to be unique; a repeated name shadows later
/// occurrences.
pub fn resolve(modules: &[&ModuleDescriptor]) -> Resolution {
    let graph = Graph::new(modules);
    let cycles = graph.cycles();

    let mut failed: Vec<Option<ResolutionFailure>> = vec![None; graph.len()];
    for cycle in &cycles {
        let members: Vec<String> = cycle.iter().map(|&i| graph.name(i).to_string()).collect();
        for &i in cycle {
            failed[i] = Some(ResolutionFailure::Cyclic {
                members: members.clone(),
            });
        }
    }

    // Unresolvability spreads to dependents until nothing changes.
    loop {
        let mut changed = false;
        for node in 0..graph.len() {
            if failed[node].is_some() {
                continue;
            }
            let missing: Vec<String> = graph.nodes[node]
                .dependencies
                .iter()
                .filter(|dep| match dep {
                    Dependency::Absent(_) => true,
                    Dependency::Present(i) => failed[*i].is_some(),
                })
                .map(|dep| dep.name(&graph).to_string())
                .collect();
            if !missing.is_empty() {
                failed[node] = Some(ResolutionFailure::Unresolved { missing });
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let order = graph.activation_order(&failed);
    let failures = failed
        .into_iter()
        .enumerate()
        .filter_map(|(i, failure)| failure.map(|f| (graph.name(i).to_string(), f)))
        .collect();

    let resolution = Resolution {
        order,
        failures,
        cycles: cycles
            .iter()
            .map(|c| c.iter().map(|&i| graph.name(i).to_string()).collect())
            .collect(),
    };
    tracing::debug!(
        resolved = resolution.order.len(),
        failed = resolution.failures.len(),
        cycles = resolution.cycles.len(),
        "resolved module graph"
    );
    resolution
}

enum Dependency<'a> {
    Present(usize),
    Absent(&'a str),
}

impl<'a> Dependency<'a> {
    fn name(&self, graph: &Graph<'a>) -> &'a str {
        match self {
            Self::Present(i) => graph.name(*i),
            Self::Absent(name) => name,
        }
    }
}

struct Node<'a> {
    name: &'a str,
    dependencies: Vec<Dependency<'a>>,
}

struct Graph<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Graph<'a> {
    fn new(modules: &[&'a ModuleDescriptor]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut unique: Vec<&'a ModuleDescriptor> = Vec::new();
        for &module in modules {
            if !index.contains_key(module.symbolic_name.as_str()) {
                index.insert(&module.symbolic_name, unique.len());
                unique.push(module);
            }
        }

        let nodes = unique
            .iter()
            .map(|&module| Node {
                name: &module.symbolic_name,
                dependencies: module
                    .dependencies
                    .iter()
                    .map(|dep| match index.get(dep.as_str()) {
                        Some(&i) => Dependency::Present(i),
                        None => Dependency::Absent(dep),
                    })
                    .collect(),
            })
            .collect();
        Self { nodes }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn name(&self, node: usize) -> &'a str {
        self.nodes[node].name
    }

    fn present_dependencies(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes[node].dependencies.iter().filter_map(|d| match d {
            Dependency::Present(i) => Some(*i),
            Dependency::Absent(_) => None,
        })
    }

    /// Strongly connected components that form a cycle: more than one member,
    /// or a single module depending on itself. Sorted by first member.
    fn cycles(&self) -> Vec<Vec<usize>> {
        let mut tarjan = Tarjan::new(self.len());
        for node in 0..self.len() {
            if tarjan.index[node].is_none() {
                tarjan.visit(self, node);
            }
        }

        let mut cycles: Vec<Vec<usize>> = tarjan
            .components
            .into_iter()
            .filter(|c| c.len() > 1 || self.present_dependencies(c[0]).any(|d| d == c[0]))
            .map(|mut c| {
                c.sort_unstable();
                c
            })
            .collect();
        cycles.sort_unstable_by_key(|c| c[0]);
        cycles
    }

    fn activation_order(&self, failed: &[Option<ResolutionFailure>]) -> Vec<String> {
        let mut pending = vec![0usize; self.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        for node in (0..self.len()).filter(|&n| failed[n].is_none()) {
            for dep in self.present_dependencies(node) {
                pending[node] += 1;
                dependents[dep].push(node);
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..self.len())
            .filter(|&n| failed[n].is_none() && pending[n] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::new();
        while let Some(Reverse(node)) = ready.pop() {
            order.push(self.name(node).to_string());
            for &dependent in &dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }
        order
    }
}

struct Tarjan {
    next: usize,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl Tarjan {
    fn new(len: usize) -> Self {
        Self {
            next: 0,
            index: vec![None; len],
            lowlink: vec![0; len],
            on_stack: vec![false; len],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn visit(&mut self, graph: &Graph<'_>, node: usize) {
        self.index[node] = Some(self.next);
        self.lowlink[node] = self.next;
        self.next += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        for dep in graph.present_dependencies(node) {
            match self.index[dep] {
                None => {
                    self.visit(graph, dep);
                    self.lowlink[node] = self.lowlink[node].min(self.lowlink[dep]);
                }
                Some(dep_index) if self.on_stack[dep] => {
                    self.lowlink[node] = self.lowlink[node].min(dep_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlink[node]) == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
