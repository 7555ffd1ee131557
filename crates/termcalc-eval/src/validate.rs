//! Document validation.
//!
//! Validation resolves every call, index and variable reference, records
//! the dependency graph, rejects reference cycles and ranks derivative
//! loops. Evaluation only reads the resulting [`ValidationReport`]; the
//! term tree itself is never annotated.

use termcalc_core::{
    DifferentiabilityType, Document, EquationId, EquationKind, FxHashMap, SymbolId, TermField,
    TermHandle, TermNode, UserFunctionKind,
};
use tracing::debug;

use crate::error::{ContentError, ContentIssue};
use crate::graph::DependencyGraph;
use crate::rank::Ranker;
use crate::resolver::{search_linked_equation, Arity, Resolution};

/// Resolved references and content issues of one document version.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    version: u64,
    links: FxHashMap<TermHandle, EquationId>,
    variables: FxHashMap<(EquationId, SymbolId), EquationId>,
    derivative_ranks: FxHashMap<TermHandle, DifferentiabilityType>,
    issues: Vec<ContentIssue>,
    graph: DependencyGraph,
}

impl ValidationReport {
    /// The document version this report describes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns true if no issue was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// All issues in discovery order.
    #[must_use]
    pub fn issues(&self) -> &[ContentIssue] {
        &self.issues
    }

    /// Issues found in the body of one equation.
    pub fn issues_for(&self, equation: EquationId) -> impl Iterator<Item = &ContentIssue> + '_ {
        self.issues.iter().filter(move |i| i.equation == equation)
    }

    /// The equation a call or index node refers to.
    #[must_use]
    pub fn link(&self, term: TermHandle) -> Option<EquationId> {
        self.links.get(&term).copied()
    }

    /// The equation `name` refers to inside the body of `equation`.
    #[must_use]
    pub fn variable(&self, equation: EquationId, name: SymbolId) -> Option<EquationId> {
        self.variables.get(&(equation, name)).copied()
    }

    /// How the body of a derivative loop can be differentiated.
    #[must_use]
    pub fn derivative_rank(&self, term: TermHandle) -> Option<DifferentiabilityType> {
        self.derivative_ranks.get(&term).copied()
    }

    /// The dependency graph between equations.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

/// Validates every equation of `document`.
#[must_use]
pub fn validate(document: &Document) -> ValidationReport {
    let mut walker = Walker {
        document,
        report: ValidationReport {
            version: document.version(),
            ..ValidationReport::default()
        },
        root: EquationId::new(0),
        scope: Vec::new(),
        link_sources: Vec::new(),
        derivatives: Vec::new(),
    };

    for equation in document.equations() {
        walker.root = equation.id;
        walker.scope.clear();
        walker.scope.extend(equation.params.iter().copied());
        walker.report.graph.add_equation(equation.id);
        match &equation.kind {
            EquationKind::Interval { min, step, max } => {
                for field in [min, step, max] {
                    walker.walk(field, None);
                }
            }
            EquationKind::Function | EquationKind::Array => walker.walk(&equation.body, None),
        }
    }
    walker.reject_cycles();
    walker.rank_derivatives();

    let report = walker.report;
    debug!(
        version = report.version,
        links = report.links.len(),
        variables = report.variables.len(),
        issues = report.issues.len(),
        "document validated"
    );
    report
}

struct Walker<'a> {
    document: &'a Document,
    report: ValidationReport,
    root: EquationId,
    scope: Vec<SymbolId>,
    link_sources: Vec<(TermHandle, EquationId)>,
    derivatives: Vec<(TermHandle, EquationId, SymbolId, TermField)>,
}

impl<'a> Walker<'a> {
    fn issue(&mut self, equation: EquationId, term: Option<TermHandle>, error: ContentError) {
        debug!(
            equation = self.document.equation_name(equation),
            term = ?term,
            %error,
            "content issue"
        );
        self.report.issues.push(ContentIssue {
            equation,
            term,
            error,
        });
    }

    fn search(&self, name: SymbolId, arity: Arity) -> Resolution {
        search_linked_equation(self.document, name, arity, self.root)
    }

    fn walk(&mut self, field: &TermField, parent: Option<TermHandle>) {
        match *field {
            TermField::Empty | TermField::Number(_) => {}
            TermField::Argument(name) => {
                if !self.scope.contains(&name) {
                    self.issue(self.root, parent, ContentError::UnknownVariable);
                }
            }
            TermField::Variable(name) => self.resolve_variable(name, parent),
            TermField::Term(handle) => self.walk_node(handle),
        }
    }

    fn walk_node(&mut self, handle: TermHandle) {
        let document: &'a Document = self.document;
        match document.arena().get(handle) {
            TermNode::Operator { left, right, .. } => {
                self.walk(left, Some(handle));
                self.walk(right, Some(handle));
            }
            TermNode::Function { args, .. } => {
                for arg in args {
                    self.walk(arg, Some(handle));
                }
            }
            TermNode::UserFunction { kind, name, args } => {
                for arg in args {
                    self.walk(arg, Some(handle));
                }
                if *kind != UserFunctionKind::Identity {
                    self.resolve_call(handle, *kind, *name, args.len());
                }
            }
            TermNode::Loop {
                kind,
                index,
                min,
                max,
                body,
            } => {
                for bound in min.iter().chain(max.iter()) {
                    self.walk(bound, Some(handle));
                }
                if !kind.has_bounds() {
                    if !self.scope.contains(index) {
                        self.resolve_variable(*index, Some(handle));
                    }
                    self.derivatives.push((handle, self.root, *index, *body));
                }
                self.scope.push(*index);
                self.walk(body, Some(handle));
                self.scope.pop();
            }
        }
    }

    fn resolve_variable(&mut self, name: SymbolId, term: Option<TermHandle>) {
        if self.report.variables.contains_key(&(self.root, name)) {
            return;
        }
        let resolution = match self.search(name, Arity::Exact(0)) {
            Resolution::Unknown => self.search(name, Arity::Interval),
            found => found,
        };
        match resolution {
            Resolution::Resolved(target) => {
                self.report.variables.insert((self.root, name), target);
                if self.document.equation(target).is_ok_and(|e| !e.is_interval()) {
                    self.report.graph.add_dependency(self.root, target);
                }
            }
            Resolution::Recursive => self.issue(self.root, term, ContentError::RecursiveCall),
            Resolution::Unknown => self.issue(self.root, term, ContentError::UnknownVariable),
        }
    }

    fn resolve_call(
        &mut self,
        handle: TermHandle,
        kind: UserFunctionKind,
        name: Option<SymbolId>,
        arg_count: usize,
    ) {
        let unknown = if kind == UserFunctionKind::Link {
            ContentError::UnknownFunction
        } else {
            ContentError::UnknownArray
        };
        let Some(name) = name else {
            self.issue(self.root, Some(handle), unknown);
            return;
        };
        let resolution = match self.search(name, Arity::Exact(arg_count)) {
            Resolution::Unknown if arg_count == 1 => self.search(name, Arity::Interval),
            found => found,
        };
        let target = match resolution {
            Resolution::Resolved(target) => self.document.equation(target).ok(),
            Resolution::Recursive => {
                self.issue(self.root, Some(handle), ContentError::RecursiveCall);
                return;
            }
            Resolution::Unknown => None,
        };
        let Some(target) = target else {
            if let Some(other) = self.search(name, Arity::Any).equation() {
                debug!(
                    name = self.document.equation_name(other),
                    found = arg_count,
                    expected = self.document.equation(other).map_or(0, |e| e.arity()),
                    "argument count does not match any definition"
                );
            }
            self.issue(self.root, Some(handle), unknown);
            return;
        };

        let mismatch = match (kind, &target.kind) {
            (UserFunctionKind::Link, EquationKind::Array | EquationKind::Interval { .. }) => {
                Some(ContentError::NotAFunction)
            }
            (UserFunctionKind::Index, EquationKind::Function) => Some(ContentError::NotAnArray),
            _ => None,
        };
        if let Some(error) = mismatch {
            self.issue(self.root, Some(handle), error);
            return;
        }
        self.report.links.insert(handle, target.id);
        self.link_sources.push((handle, self.root));
        if !target.is_interval() {
            self.report.graph.add_dependency(self.root, target.id);
        }
    }

    /// Drops every reference that closes a cycle between equations.
    fn reject_cycles(&mut self) {
        let cyclic = self.report.graph.find_cycles();
        if cyclic.is_empty() {
            return;
        }
        debug!(equations = cyclic.len(), "reference cycle found");

        let graph = &self.report.graph;
        let on_cycle = |from: EquationId, to: EquationId| {
            cyclic.contains(&from) && cyclic.contains(&to) && graph.is_cyclic_edge(from, to)
        };
        let mut rejected = Vec::new();
        for &(handle, from) in &self.link_sources {
            if let Some(&to) = self.report.links.get(&handle) {
                if on_cycle(from, to) {
                    rejected.push((from, handle));
                }
            }
        }
        let mut variables: Vec<_> = self
            .report
            .variables
            .iter()
            .filter(|(&(from, _), &to)| on_cycle(from, to))
            .map(|(&key, _)| key)
            .collect();
        variables.sort_unstable();

        for (_, handle) in &rejected {
            self.report.links.remove(handle);
        }
        for key in &variables {
            self.report.variables.remove(key);
        }
        for (from, handle) in rejected {
            self.issue(from, Some(handle), ContentError::RecursiveCall);
        }
        for (from, _) in variables {
            self.issue(from, None, ContentError::RecursiveCall);
        }
    }

    fn rank_derivatives(&mut self) {
        let ranker = Ranker::new(self.document, &self.report);
        let ranks: Vec<_> = self
            .derivatives
            .iter()
            .map(|&(handle, equation, index, body)| (handle, equation, ranker.rank(&body, index)))
            .collect();
        for (handle, equation, rank) in ranks {
            debug!(term = %handle, %rank, "derivative ranked");
            if rank == DifferentiabilityType::None {
                self.issue(equation, Some(handle), ContentError::NotDifferentiable);
            }
            self.report.derivative_ranks.insert(handle, rank);
        }
    }
}
