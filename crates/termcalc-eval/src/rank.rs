//! Differentiability ranking of terms.
//!
//! A term's rank with respect to a variable is the weakest rank of the
//! parts that depend on it. Terms that do not mention the variable are
//! [`DifferentiabilityType::Independent`].

use termcalc_core::{
    DifferentiabilityType as D, Document, LoopKind, SymbolId, TermField, TermHandle, TermNode,
    UserFunctionKind,
};

use crate::validate::ValidationReport;

/// Ranks terms of one document against its validation report.
#[derive(Debug, Clone, Copy)]
pub struct Ranker<'a> {
    document: &'a Document,
    report: &'a ValidationReport,
}

impl<'a> Ranker<'a> {
    /// Creates a ranker.
    #[must_use]
    pub fn new(document: &'a Document, report: &'a ValidationReport) -> Self {
        Self { document, report }
    }

    /// How `field` can be differentiated with respect to `var`.
    #[must_use]
    pub fn rank(&self, field: &TermField, var: SymbolId) -> D {
        match *field {
            TermField::Empty | TermField::Number(_) | TermField::Variable(_) => D::Independent,
            TermField::Argument(name) if name == var => D::Analytical,
            TermField::Argument(_) => D::Independent,
            TermField::Term(handle) => self.node_rank(handle, var),
        }
    }

    fn all(&self, fields: &[TermField], var: SymbolId) -> D {
        D::combine_all(fields.iter().map(|f| self.rank(f, var)))
    }

    fn node_rank(&self, handle: TermHandle, var: SymbolId) -> D {
        match self.document.arena().get(handle) {
            TermNode::Operator { left, right, .. } => {
                self.rank(left, var).combine(self.rank(right, var))
            }
            TermNode::Function { kind, args } => {
                let rank = self.all(args, var);
                if kind.is_smooth() || rank == D::Independent {
                    rank
                } else {
                    D::Numerical.combine(rank)
                }
            }
            TermNode::UserFunction { kind, args, .. } => match kind {
                UserFunctionKind::Identity => self.all(args, var),
                UserFunctionKind::Index => match self.all(args, var) {
                    D::Independent => D::Independent,
                    _ => D::None,
                },
                UserFunctionKind::Link => self.link_rank(handle, args, var),
            },
            TermNode::Loop {
                kind,
                index,
                min,
                max,
                body,
            } => {
                // A derivative is taken at the current value of its index,
                // so the index is not a fresh binding.
                if *kind == LoopKind::Derivative {
                    let body = self.rank(body, var);
                    return if *index == var || body != D::Independent {
                        D::Numerical.combine(body)
                    } else {
                        D::Independent
                    };
                }
                let body = if *index == var {
                    D::Independent
                } else {
                    self.rank(body, var)
                };
                let bounds = D::combine_all(
                    min.iter().chain(max.iter()).map(|f| self.rank(f, var)),
                );
                if body == D::Independent && bounds == D::Independent {
                    return D::Independent;
                }
                match kind {
                    LoopKind::Summation | LoopKind::Product if bounds == D::Independent => body,
                    _ => D::Numerical.combine(body).combine(bounds),
                }
            }
        }
    }

    /// Rank of a call: each argument that depends on `var` contributes the
    /// weaker of its own rank and the callee's rank in the matching parameter.
    fn link_rank(&self, handle: TermHandle, args: &[TermField], var: SymbolId) -> D {
        let Some(target) = self
            .report
            .link(handle)
            .and_then(|id| self.document.equation(id).ok())
        else {
            return D::None;
        };
        let mut rank = D::Independent;
        for (position, arg) in args.iter().enumerate() {
            let arg_rank = self.rank(arg, var);
            if arg_rank == D::Independent {
                continue;
            }
            let Some(&param) = target.params.get(position) else {
                return D::None;
            };
            let body_rank = self.rank(&target.body, param);
            if body_rank != D::Independent {
                rank = rank.combine(arg_rank).combine(body_rank);
            }
        }
        rank
    }
}
