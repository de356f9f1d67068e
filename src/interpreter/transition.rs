//  TRANSITION.rs
//    by Lut99
//
//  Created:
//    07 Mar 2025, 13:40:16
//  Last edited:
//    21 Mar 2025, 10:05:44
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the application of grounded actions to world states.
//!
//!   An application is one atomic batch: the precondition is re-checked, every (quantified,
//!   guarded) effect is expanded against the _pre-transition_ view, and only then are all deletions
//!   applied, followed by all additions. Nothing is mutated until everything succeeded.
//

use std::collections::BTreeSet;

use super::View;
use super::eval::{Bindings, evaluate, ground_atom, resolve_binders, resolve_term};
use crate::engine::Engine;
use crate::errors::{CostError, Error, FormulaError, InapplicableActionError};
use crate::formula::{CostExpr, Effect, Ident};
use crate::ids::{ObjectId, TypeId};
use crate::log::debug;
use crate::schema::ActionDef;
use crate::state::{Fact, GroundAction, WorldState};


/***** HELPERS *****/
/// Collects the effects of one action before they're applied.
#[derive(Debug, Default)]
struct Batch {
    deletions: BTreeSet<Fact>,
    additions: BTreeSet<Fact>,
}

/// Expands one effect by recursively binding its quantified variables.
fn expand(view: &View, vars: &[(Ident, TypeId)], effect: &Effect, bindings: &mut Bindings, batch: &mut Batch) -> Result<(), FormulaError> {
    let engine: &Engine = view.engine();
    let Some(((var, ty), rest)) = vars.split_first() else {
        // Base case: check the guard and queue the literal
        if let Some(guard) = &effect.when {
            if !evaluate(engine, view, guard, bindings)? {
                return Ok(());
            }
        }
        let fact: Fact = ground_atom(engine, &effect.literal.atom, bindings)?;
        if effect.literal.positive {
            batch.additions.insert(fact);
        } else {
            batch.deletions.insert(fact);
        }
        return Ok(());
    };

    for obj in engine.universe().pool(*ty) {
        bindings.push(var.clone(), *obj);
        let res: Result<(), FormulaError> = expand(view, rest, effect, bindings, batch);
        bindings.pop();
        res?;
    }
    Ok(())
}

/// Computes the cost increment of an action.
fn increment(engine: &Engine, def: &ActionDef, action: &GroundAction, bindings: &Bindings) -> Result<u64, Error> {
    let value: i64 = match &def.cost {
        CostExpr::Constant(value) => *value,
        CostExpr::Distance(from, to) => {
            let from: ObjectId = resolve_term(engine, from, bindings)?;
            let to: ObjectId = resolve_term(engine, to, bindings)?;
            engine.distances().get(from, to).ok_or_else(|| CostError::MissingDistance {
                from: engine.universe().name(from).to_string(),
                to:   engine.universe().name(to).to_string(),
            })?
        },
    };
    u64::try_from(value).map_err(|_| CostError::Negative { action: engine.display(action).to_string(), value }.into())
}





/***** LIBRARY *****/
/// The result of applying an action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    /// The successor state.
    pub state:   WorldState,
    /// The cost of the action.
    pub cost:    u64,
    /// The facts that hold in the successor but not in the predecessor, in order.
    pub added:   Vec<Fact>,
    /// The facts that held in the predecessor but not in the successor, in order.
    pub deleted: Vec<Fact>,
}



impl<'e> View<'e> {
    /// Decides whether the precondition of a grounded action holds in this view.
    ///
    /// # Arguments
    /// - `action`: The [`GroundAction`] to check.
    ///
    /// # Returns
    /// True if the action is applicable, false otherwise.
    ///
    /// # Errors
    /// This function errors if the action does not fit its schema or if its precondition cannot
    /// be evaluated.
    pub fn precondition_holds(&self, action: &GroundAction) -> Result<bool, FormulaError> {
        let engine: &Engine = self.engine();
        engine.check_action(action)?;
        let def: &ActionDef = engine.schema().action(action.action);
        let mut bindings: Bindings = Bindings::from_params(&def.params, &action.args);
        evaluate(engine, self, &def.precondition, &mut bindings)
    }

    /// Applies a grounded action to the state of this view.
    ///
    /// The view (and its state) are left untouched; the successor is returned in a
    /// [`Transition`]. It has no derived facts computed yet.
    ///
    /// # Arguments
    /// - `action`: The [`GroundAction`] to apply.
    ///
    /// # Returns
    /// A [`Transition`] describing the successor.
    ///
    /// # Errors
    /// This function errors if the action's precondition does not hold
    /// ([`InapplicableActionError`]), if an effect or the precondition cannot be evaluated
    /// ([`FormulaError`]) or if its cost is undefined or negative ([`CostError`]).
    pub fn apply(&self, action: &GroundAction) -> Result<Transition, Error> {
        let engine: &Engine = self.engine();
        if !self.precondition_holds(action)? {
            return Err(InapplicableActionError { action: engine.display(action).to_string() }.into());
        }
        let def: &ActionDef = engine.schema().action(action.action);
        let mut bindings: Bindings = Bindings::from_params(&def.params, &action.args);

        // Queue every effect against the pre-transition view
        let mut batch = Batch::default();
        for effect in &def.effects {
            let vars: Vec<(Ident, TypeId)> = resolve_binders(engine, &effect.forall)?;
            expand(self, &vars, effect, &mut bindings, &mut batch)?;
        }

        // Compute the cost before touching anything
        let cost: u64 = increment(engine, def, action, &bindings)?;
        let total: u64 = self.state().cost().checked_add(cost).ok_or_else(|| CostError::Overflow { action: engine.display(action).to_string() })?;

        // Apply; deletions first, then additions
        debug!(
            "Applying '{}' (cost {cost}): deleting {} fact(s), adding {} fact(s)",
            engine.display(action),
            batch.deletions.len(),
            batch.additions.len()
        );
        let mut facts: BTreeSet<Fact> = self.state().fact_set().clone();
        for fact in &batch.deletions {
            facts.remove(fact);
        }
        for fact in &batch.additions {
            facts.insert(fact.clone());
        }

        // Compute the net difference
        let added: Vec<Fact> = batch.additions.into_iter().filter(|f| !self.state().contains(f)).collect();
        let deleted: Vec<Fact> = batch.deletions.into_iter().filter(|f| self.state().contains(f) && !facts.contains(f)).collect();
        Ok(Transition { state: WorldState::from_parts(facts, total), cost, added, deleted })
    }
}
