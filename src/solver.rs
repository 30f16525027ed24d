//! Incremental adapter over the `cassowary` solver.
//!
//! A [`BoundarySolver`] remembers which constraints it has installed and only
//! submits the difference on every update. Failed updates are rolled back by
//! rebuilding the solver from the last applied set, so a boundary never keeps
//! a partially applied system.

use alloc::{string::String, vec::Vec};
use core::fmt;
use std::collections::{HashMap, HashSet};

use cassowary::{
    AddConstraintError, Expression, RelationalOperator, Solver, Term, Variable, strength,
};

use crate::{Constraint, ConstraintVariable, Relation, Strength};

/// A variable held at a suggested value with a non-required strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edit {
    /// The pinned variable.
    pub variable: ConstraintVariable,
    /// The suggested value.
    pub value: f64,
    /// How strongly the suggestion holds. Required is treated as strong.
    pub strength: Strength,
}

/// What an update changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Constraints newly installed.
    pub added: usize,
    /// Constraints taken out.
    pub removed: usize,
    /// Constraints installed after the update.
    pub installed: usize,
}

/// Why an update was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// Adding these required constraints made the system infeasible.
    Unsatisfiable(Vec<Constraint>),
    /// The solver reported an internal error.
    Internal(String),
}

/// The persistent solver of one layout boundary.
pub struct BoundarySolver {
    solver: Solver,
    variables: HashMap<ConstraintVariable, Variable>,
    installed: HashMap<Constraint, cassowary::Constraint>,
    order: Vec<Constraint>,
    edits: HashMap<ConstraintVariable, (Strength, f64)>,
    rebuilds: usize,
}

impl Default for BoundarySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BoundarySolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundarySolver")
            .field("variables", &self.variables.len())
            .field("installed", &self.order.len())
            .field("edits", &self.edits.len())
            .field("rebuilds", &self.rebuilds)
            .finish_non_exhaustive()
    }
}

/// Largest multiplier a weight may apply inside its tier.
const MAX_WEIGHT: f64 = 999.0;

/// Smallest multiplier; a constraint that is not ignored always counts.
const MIN_WEIGHT: f64 = 1e-3;

/// Solver weight of a strength, scaled by `weight` within its tier.
fn solver_strength(strength: Strength, weight: f64) -> f64 {
    let weight = weight.clamp(MIN_WEIGHT, MAX_WEIGHT);
    match strength {
        Strength::Required => strength::REQUIRED,
        Strength::Strong => strength::create(1.0, 0.0, 0.0, weight),
        Strength::Medium => strength::create(0.0, 1.0, 0.0, weight),
        Strength::Weak => strength::create(0.0, 0.0, 1.0, weight),
        Strength::Ignore => 0.0,
    }
}

const fn operator(relation: Relation) -> RelationalOperator {
    match relation {
        Relation::Eq => RelationalOperator::Equal,
        Relation::Le => RelationalOperator::LessOrEqual,
        Relation::Ge => RelationalOperator::GreaterOrEqual,
    }
}

impl BoundarySolver {
    /// Creates an empty solver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variables: HashMap::new(),
            installed: HashMap::new(),
            order: Vec::new(),
            edits: HashMap::new(),
            rebuilds: 0,
        }
    }

    /// The current value of `variable`, `0` if the solver has never seen it.
    #[must_use]
    pub fn value(&self, variable: ConstraintVariable) -> f64 {
        self.variables
            .get(&variable)
            .map_or(0.0, |&var| self.solver.get_value(var))
    }

    /// The constraints currently installed, in submission order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.order
    }

    /// How many times a failed update forced a rebuild.
    #[must_use]
    pub const fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// The values of `variables` with every edit pulled down to zero, so the
    /// edited variables are as small as the other constraints allow. The
    /// suggestions are restored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SolveFailure::Internal`] if the solver rejects a suggestion.
    pub fn minimum(&mut self, variables: &[ConstraintVariable]) -> Result<Vec<f64>, SolveFailure> {
        let internal = |error: &dyn fmt::Debug| SolveFailure::Internal(alloc::format!("{error:?}"));
        let suggested: Vec<(Variable, f64)> = self
            .edits
            .iter()
            .filter_map(|(variable, &(_, value))| {
                self.variables.get(variable).map(|&var| (var, value))
            })
            .collect();

        for &(var, _) in &suggested {
            self.solver
                .suggest_value(var, 0.0)
                .map_err(|error| internal(&error))?;
        }
        let values = variables.iter().map(|&variable| self.value(variable)).collect();
        for &(var, value) in &suggested {
            self.solver
                .suggest_value(var, value)
                .map_err(|error| internal(&error))?;
        }
        Ok(values)
    }

    fn variable(&mut self, variable: ConstraintVariable) -> Variable {
        *self.variables.entry(variable).or_insert_with(Variable::new)
    }

    fn convert(&mut self, constraint: &Constraint) -> cassowary::Constraint {
        let expression = constraint.expression();
        let terms = expression
            .terms()
            .iter()
            .map(|term| Term {
                variable: self.variable(term.variable),
                coefficient: term.coefficient,
            })
            .collect();
        cassowary::Constraint::new(
            Expression::new(terms, expression.constant_part()),
            operator(constraint.relation()),
            solver_strength(constraint.strength(), constraint.weight()),
        )
    }

    /// Brings the solver in line with `constraints` and `edits`.
    ///
    /// Ignored constraints and duplicates are dropped. Constraints are added
    /// in the given order, which keeps ties between equally good solutions
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`SolveFailure`] if the system cannot be solved. The solver is
    /// then back to the state of the last successful update.
    pub fn update(
        &mut self,
        constraints: &[Constraint],
        edits: &[Edit],
    ) -> Result<SolveStats, SolveFailure> {
        let mut seen = HashSet::with_capacity(constraints.len());
        let desired: Vec<Constraint> = constraints
            .iter()
            .filter(|constraint| constraint.strength() != Strength::Ignore)
            .filter(|constraint| seen.insert(*constraint))
            .cloned()
            .collect();

        let previous_order = self.order.clone();
        let previous_edits: Vec<Edit> = self
            .edits
            .iter()
            .map(|(&variable, &(strength, value))| Edit {
                variable,
                value,
                strength,
            })
            .collect();

        match self.apply(&desired, edits) {
            Ok(stats) => Ok(stats),
            Err(failure) => {
                tracing::debug!(?failure, "rolling back boundary solver");
                self.rebuild(&previous_order, &previous_edits)?;
                Err(failure)
            }
        }
    }

    fn apply(
        &mut self,
        desired: &[Constraint],
        edits: &[Edit],
    ) -> Result<SolveStats, SolveFailure> {
        let mut stats = SolveStats::default();
        let wanted: HashSet<&Constraint> = desired.iter().collect();

        let stale: Vec<Constraint> = self
            .order
            .iter()
            .filter(|constraint| !wanted.contains(constraint))
            .cloned()
            .collect();
        for constraint in &stale {
            if let Some(installed) = self.installed.remove(constraint) {
                self.solver
                    .remove_constraint(&installed)
                    .map_err(|error| SolveFailure::Internal(alloc::format!("{error:?}")))?;
                tracing::trace!(%constraint, "constraint removed");
                stats.removed += 1;
            }
        }
        self.order.retain(|constraint| wanted.contains(constraint));

        for constraint in desired {
            if self.installed.contains_key(constraint) {
                continue;
            }
            let converted = self.convert(constraint);
            match self.solver.add_constraint(converted.clone()) {
                Ok(()) => {
                    tracing::trace!(%constraint, "constraint added");
                    self.installed.insert(constraint.clone(), converted);
                    self.order.push(constraint.clone());
                    stats.added += 1;
                }
                Err(AddConstraintError::UnsatisfiableConstraint) => {
                    return Err(SolveFailure::Unsatisfiable(alloc::vec![constraint.clone()]));
                }
                Err(error) => {
                    return Err(SolveFailure::Internal(alloc::format!("{error:?}")));
                }
            }
        }

        self.apply_edits(edits)?;
        stats.installed = self.order.len();
        Ok(stats)
    }

    fn apply_edits(&mut self, edits: &[Edit]) -> Result<(), SolveFailure> {
        let internal = |error: &dyn fmt::Debug| SolveFailure::Internal(alloc::format!("{error:?}"));
        let strength_of = |edit: &Edit| match edit.strength {
            Strength::Required => Strength::Strong,
            other => other,
        };

        let stale: Vec<ConstraintVariable> = self
            .edits
            .iter()
            .filter(|&(variable, &(strength, _))| {
                !edits
                    .iter()
                    .any(|edit| edit.variable == *variable && strength_of(edit) == strength)
            })
            .map(|(&variable, _)| variable)
            .collect();
        for variable in stale {
            let var = self.variable(variable);
            self.solver
                .remove_edit_variable(var)
                .map_err(|error| internal(&error))?;
            self.edits.remove(&variable);
        }

        for edit in edits {
            let strength = strength_of(edit);
            if strength == Strength::Ignore {
                continue;
            }
            let var = self.variable(edit.variable);
            if !self.edits.contains_key(&edit.variable) {
                self.solver
                    .add_edit_variable(var, solver_strength(strength, 1.0))
                    .map_err(|error| internal(&error))?;
            }
            self.solver
                .suggest_value(var, edit.value)
                .map_err(|error| internal(&error))?;
            self.edits.insert(edit.variable, (strength, edit.value));
        }
        Ok(())
    }

    fn rebuild(&mut self, constraints: &[Constraint], edits: &[Edit]) -> Result<(), SolveFailure> {
        self.rebuilds += 1;
        self.solver = Solver::new();
        self.installed.clear();
        self.order.clear();
        self.edits.clear();
        self.apply(constraints, edits).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::{ExpressionExt, Symbols, WidgetId};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn stronger_constraint_wins() {
        let symbols = Symbols::new(WidgetId::new(1));
        let mut solver = BoundarySolver::new();

        solver
            .update(
                &[
                    symbols.width().equal_to(50.0).with_strength(Strength::Strong),
                    symbols.width().equal_to(80.0).with_strength(Strength::Weak),
                ],
                &[],
            )
            .unwrap();

        assert!(approx(solver.value(symbols.width()), 50.0));
    }

    #[test]
    fn ignored_and_duplicate_constraints_are_dropped() {
        let symbols = Symbols::new(WidgetId::new(1));
        let width = symbols.width().equal_to(10.0);
        let mut solver = BoundarySolver::new();

        let stats = solver
            .update(
                &[
                    width.clone(),
                    width.clone(),
                    symbols.height().equal_to(5.0).with_strength(Strength::Ignore),
                ],
                &[],
            )
            .unwrap();

        assert_eq!(stats.added, 1);
        assert_eq!(solver.constraints(), &[width]);
    }

    #[test]
    fn updates_are_incremental() {
        let symbols = Symbols::new(WidgetId::new(1));
        let keep = symbols.height().equal_to(20.0);
        let mut solver = BoundarySolver::new();
        solver
            .update(&[keep.clone(), symbols.width().equal_to(10.0)], &[])
            .unwrap();

        let stats = solver
            .update(&[keep, symbols.width().equal_to(30.0)], &[])
            .unwrap();

        assert_eq!(stats, SolveStats { added: 1, removed: 1, installed: 2 });
        assert_eq!(solver.rebuilds(), 0);
        assert!(approx(solver.value(symbols.width()), 30.0));
    }

    #[test]
    fn infeasible_update_rolls_back() {
        let symbols = Symbols::new(WidgetId::new(1));
        let ten = symbols.width().equal_to(10.0);
        let twenty = symbols.width().equal_to(20.0);
        let mut solver = BoundarySolver::new();
        solver.update(&[ten.clone()], &[]).unwrap();

        let failure = solver.update(&[ten.clone(), twenty.clone()], &[]).unwrap_err();

        assert_eq!(failure, SolveFailure::Unsatisfiable(vec![twenty]));
        assert_eq!(solver.constraints(), &[ten]);
        assert_eq!(solver.rebuilds(), 1);
        assert!(approx(solver.value(symbols.width()), 10.0));
    }

    #[test]
    fn edits_follow_suggestions() {
        let symbols = Symbols::new(WidgetId::new(1));
        let mut solver = BoundarySolver::new();
        let edit = |value| Edit {
            variable: symbols.width(),
            value,
            strength: Strength::Strong,
        };

        solver
            .update(&[symbols.width().at_least(0.0)], &[edit(100.0)])
            .unwrap();
        assert!(approx(solver.value(symbols.width()), 100.0));

        solver
            .update(&[symbols.width().at_least(0.0)], &[edit(40.0)])
            .unwrap();
        assert!(approx(solver.value(symbols.width()), 40.0));
    }

    #[test]
    fn weights_stay_within_their_tier() {
        let symbols = Symbols::new(WidgetId::new(1));
        let mut solver = BoundarySolver::new();

        solver
            .update(
                &[
                    symbols.width().equal_to(10.0).with_strength(Strength::Strong),
                    symbols
                        .width()
                        .equal_to(90.0)
                        .with_strength(Strength::Medium)
                        .with_weight(1e9),
                ],
                &[],
            )
            .unwrap();

        assert!(approx(solver.value(symbols.width()), 10.0));
    }

    #[test]
    fn non_positive_weights_still_count() {
        let symbols = Symbols::new(WidgetId::new(1));
        let mut solver = BoundarySolver::new();

        solver
            .update(
                &[
                    symbols
                        .width()
                        .equal_to(30.0)
                        .with_strength(Strength::Weak)
                        .with_weight(0.0),
                    symbols.width().at_least(0.0),
                ],
                &[],
            )
            .unwrap();

        assert!(approx(solver.value(symbols.width()), 30.0));
    }

    #[test]
    fn minimum_pulls_edits_down_and_restores_them() {
        let outer = Symbols::new(WidgetId::new(1));
        let inner = Symbols::new(WidgetId::new(2));
        let mut solver = BoundarySolver::new();
        let constraints = [
            outer.width().at_least(inner.width() + 20.0),
            inner.width().equal_to(50.0).with_strength(Strength::Strong),
            inner.width().at_least(50.0).with_strength(Strength::Strong),
        ];
        let edit = Edit {
            variable: outer.width(),
            value: 200.0,
            strength: Strength::Strong,
        };
        solver.update(&constraints, &[edit]).unwrap();
        assert!(approx(solver.value(outer.width()), 200.0));

        let minimum = solver.minimum(&[outer.width()]).unwrap();

        assert!(approx(minimum[0], 70.0));
        assert!(approx(solver.value(outer.width()), 200.0));
        assert!(approx(solver.value(inner.width()), 50.0));
    }
}
