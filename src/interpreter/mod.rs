//  MOD.rs
//    by Lut99
//
//  Created:
//    26 Mar 2024, 19:36:31
//  Last edited:
//    21 Mar 2025, 15:27:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the semantics of a planning domain: deriving derived
//!   predicates, evaluating formulas, grounding actions and applying them.
//!
//!   The central type is the [`View`]: a [`WorldState`] together with the derived facts that
//!   hold in it. Views are computed on demand by [`Engine::view()`] and are never carried over to
//!   successor states; every successor gets its own view once someone asks for it.
//!
//!   The semantics follow those of planning-domain descriptions with `:derived` predicates,
//!   `forall`/`when` effects and `(increase (total-cost) ...)`. In particular, derived predicates
//!   are evaluated as _stratified_ least fixpoints (see [`derive`]).
//

// Nested modules
mod derive;
pub mod eval;
mod ground;
pub mod quantify;
mod transition;

// Imports
use std::fmt::{Display, Formatter, Result as FResult};

pub use derive::{DerivedFacts, derive};
pub use eval::Bindings;
pub use ground::Groundings;
pub use transition::Transition;

use crate::engine::Engine;
use crate::errors::{Error, FormulaError, ReplayError};
use crate::formula::Formula;
use crate::ids::ActionId;
use crate::log::debug;
use crate::state::{Fact, GroundAction, WorldState};


/***** INTERFACES *****/
/// Decides which ground facts hold.
pub trait Interpretation {
    /// Decides whether a fact holds.
    ///
    /// # Arguments
    /// - `fact`: The (well-typed) [`Fact`] to decide.
    ///
    /// # Returns
    /// True if it holds, false otherwise.
    fn holds(&self, fact: &Fact) -> bool;
}





/***** LIBRARY *****/
/// A [`WorldState`] together with the derived facts that hold in it.
#[derive(Clone, Debug)]
pub struct View<'e> {
    /// The engine defining the semantics.
    engine:  &'e Engine,
    /// The base facts.
    state:   &'e WorldState,
    /// The derived facts.
    derived: DerivedFacts,
}
impl<'e> View<'e> {
    /// Constructor for the View that derives everything that holds in the given state.
    ///
    /// # Arguments
    /// - `engine`: The [`Engine`] defining the semantics.
    /// - `state`: The [`WorldState`] to view.
    ///
    /// # Returns
    /// A new View.
    ///
    /// # Errors
    /// This function errors if derivation fails. See [`derive()`].
    #[inline]
    pub fn new(engine: &'e Engine, state: &'e WorldState) -> Result<Self, Error> { Ok(Self { engine, state, derived: derive(engine, state)? }) }

    /// Decides whether a base or derived fact holds.
    #[inline]
    pub fn holds(&self, fact: &Fact) -> bool { <Self as Interpretation>::holds(self, fact) }

    /// Evaluates a closed formula (e.g., a goal).
    ///
    /// # Arguments
    /// - `formula`: The [`Formula`] to evaluate. Must not have free variables.
    ///
    /// # Returns
    /// Whether it holds in this view.
    ///
    /// # Errors
    /// This function errors if the formula cannot be evaluated. See [`eval::evaluate()`].
    #[inline]
    pub fn evaluate(&self, formula: &Formula) -> Result<bool, FormulaError> { self.evaluate_with(formula, &mut Bindings::new()) }

    /// Evaluates a formula with some variables already bound.
    ///
    /// # Arguments
    /// - `formula`: The [`Formula`] to evaluate.
    /// - `bindings`: The [`Bindings`] of its free variables.
    ///
    /// # Returns
    /// Whether it holds in this view.
    ///
    /// # Errors
    /// This function errors if the formula cannot be evaluated. See [`eval::evaluate()`].
    #[inline]
    pub fn evaluate_with(&self, formula: &Formula, bindings: &mut Bindings) -> Result<bool, FormulaError> {
        eval::evaluate(self.engine, self, formula, bindings)
    }

    /// Lazily enumerates the groundings of an action schema that are applicable in this view.
    ///
    /// # Arguments
    /// - `action`: The action schema to ground.
    ///
    /// # Returns
    /// A restartable [`Groundings`] iterator.
    ///
    /// # Panics
    /// This function panics if the action identifier was not produced by the engine's schema.
    #[inline]
    pub fn ground(&self, action: ActionId) -> Groundings<'_> { Groundings::new(self, action) }

    /// Lazily enumerates the applicable groundings of every action schema, in declaration order.
    ///
    /// # Returns
    /// An iterator over [`GroundAction`]s (or errors evaluating their preconditions).
    #[inline]
    pub fn ground_all(&self) -> impl '_ + Clone + Iterator<Item = Result<GroundAction, FormulaError>> {
        (0..self.engine.schema().actions().len()).flat_map(move |i| self.ground(ActionId(i)))
    }



    /// Returns the engine defining the semantics of this view.
    #[inline]
    pub fn engine(&self) -> &'e Engine { self.engine }

    /// Returns the viewed state.
    #[inline]
    pub fn state(&self) -> &'e WorldState { self.state }

    /// Returns the derived facts.
    #[inline]
    pub fn derived(&self) -> &DerivedFacts { &self.derived }
}
impl<'e> Interpretation for View<'e> {
    #[inline]
    fn holds(&self, fact: &Fact) -> bool {
        match self.engine.schema().get_predicate(fact.predicate) {
            Some(def) if def.is_derived() => self.derived.contains(fact),
            Some(_) => self.state.contains(fact),
            None => false,
        }
    }
}
impl<'e> Display for View<'e> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        writeln!(f, "World state (cost {}) {{", self.state.cost())?;
        write!(f, "    base:")?;
        if !self.state.is_empty() {
            writeln!(f)?;
            for fact in self.state {
                writeln!(f, "      + {}", self.engine.display(fact))?;
            }
        } else {
            writeln!(f, " <none>")?;
        }
        write!(f, "    derived:")?;
        if !self.derived.is_empty() {
            writeln!(f)?;
            for fact in &self.derived {
                writeln!(f, "      ~ {}", self.engine.display(fact))?;
            }
        } else {
            writeln!(f, " <none>")?;
        }
        write!(f, "}}")
    }
}



/// Describes one replayed step of a plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    /// The action that was applied.
    pub action:  GroundAction,
    /// Its cost.
    pub cost:    u64,
    /// The facts it made true.
    pub added:   Vec<Fact>,
    /// The facts it made false.
    pub deleted: Vec<Fact>,
}



// Semantics
impl Engine {
    /// Computes the [`View`] of a state.
    ///
    /// # Arguments
    /// - `state`: The [`WorldState`] to view.
    ///
    /// # Returns
    /// A new [`View`] with all derived facts computed.
    ///
    /// # Errors
    /// This function errors if derivation fails. See [`derive()`].
    #[inline]
    pub fn view<'e>(&'e self, state: &'e WorldState) -> Result<View<'e>, Error> { View::new(self, state) }

    /// Computes only the derived facts of a state.
    ///
    /// # Errors
    /// This function errors if derivation fails. See [`derive()`].
    #[inline]
    pub fn derive(&self, state: &WorldState) -> Result<DerivedFacts, Error> { derive(self, state) }

    /// Decides whether a closed formula (e.g., a goal) holds in a state.
    ///
    /// # Errors
    /// This function errors if derivation fails or if the formula cannot be evaluated.
    #[inline]
    pub fn satisfies(&self, state: &WorldState, goal: &Formula) -> Result<bool, Error> { Ok(self.view(state)?.evaluate(goal)?) }

    /// Applies a grounded action to a state.
    ///
    /// Shorthand for computing a [`View`] and calling [`View::apply()`].
    ///
    /// # Errors
    /// This function errors if derivation fails or if the action cannot be applied.
    #[inline]
    pub fn apply(&self, state: &WorldState, action: &GroundAction) -> Result<Transition, Error> { self.view(state)?.apply(action) }

    /// Replays a sequence of grounded actions, one step at a time.
    ///
    /// # Arguments
    /// - `state`: The [`WorldState`] to start in.
    /// - `plan`: The [`GroundAction`]s to apply, in order.
    ///
    /// # Returns
    /// The final [`WorldState`] and one [`Step`] per applied action.
    ///
    /// # Errors
    /// This function errors if any of the actions cannot be applied in the state reached so far.
    /// The error names the offending step; nothing before it is undone, but nothing is returned
    /// either.
    pub fn replay<'a>(&self, state: &WorldState, plan: impl IntoIterator<Item = &'a GroundAction>) -> Result<(WorldState, Vec<Step>), ReplayError> {
        let mut state: WorldState = state.clone();
        let mut steps: Vec<Step> = Vec::new();
        for (i, action) in plan.into_iter().enumerate() {
            let trans: Transition =
                self.apply(&state, action).map_err(|error| ReplayError { step: i, action: self.display(action).to_string(), error })?;
            debug!("Replayed step {i}: '{}' (cost {}, total {})", self.display(action), trans.cost, trans.state.cost());
            steps.push(Step { action: action.clone(), cost: trans.cost, added: trans.added, deleted: trans.deleted });
            state = trans.state;
        }
        Ok((state, steps))
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CostError, InapplicableActionError, SchemaError};
    use crate::formula::{CostExpr, Effect};
    use crate::schema::{ActionDecl, ROOT_TYPE, SchemaBuilder};
    use crate::universe::{Distances, Universe};

    /// Makes a line of rooms `a - b - c - d` with a robot in `a`, where the link between `c` and
    /// `d` is blocked.
    fn corridor() -> (Engine, WorldState) {
        let schema = SchemaBuilder::new()
            .ty("Room", ROOT_TYPE)
            .ty("Robot", ROOT_TYPE)
            .base("link", [("?a", "Room"), ("?b", "Room")])
            .base("blocked", [("?a", "Room"), ("?b", "Room")])
            .base("at", [("?r", "Robot"), ("?x", "Room")])
            .base("marked", [("?x", "Room")])
            .derived(
                "open",
                [("?a", "Room"), ("?b", "Room")],
                Formula::and([Formula::atom("link", ["?a", "?b"]), Formula::not(Formula::atom("blocked", ["?a", "?b"]))]),
            )
            .derived(
                "reach",
                [("?a", "Room"), ("?b", "Room")],
                Formula::or([
                    Formula::atom("open", ["?a", "?b"]),
                    Formula::exists([("?m", "Room")], Formula::and([Formula::atom("open", ["?a", "?m"]), Formula::atom("reach", ["?m", "?b"])])),
                ]),
            )
            .derived("isolated", [("?a", "Room")], Formula::not(Formula::exists([("?b", "Room")], Formula::atom("reach", ["?b", "?a"]))))
            .action(
                ActionDecl::new("go", [("?r", "Robot"), ("?from", "Room"), ("?to", "Room")])
                    .precondition(Formula::and([Formula::atom("at", ["?r", "?from"]), Formula::atom("open", ["?from", "?to"])]))
                    .effect(Effect::del("at", ["?r", "?from"]))
                    .effect(Effect::add("at", ["?r", "?to"]))
                    .cost(CostExpr::distance("?from", "?to")),
            )
            .action(
                ActionDecl::new("mark-all", [("?r", "Robot")])
                    .effect(Effect::add("marked", ["?x"]).when(Formula::not(Formula::atom("marked", ["?x"]))).forall([("?x", "Room")]))
                    .effect(Effect::del("marked", ["?x"]).when(Formula::atom("marked", ["?x"])).forall([("?x", "Room")]))
                    .cost(CostExpr::Constant(3)),
            )
            .action(ActionDecl::new("refund", [("?r", "Robot")]).cost(CostExpr::Constant(-1)))
            .action(ActionDecl::new("stay", [("?r", "Robot")]).effect(Effect::del("at", ["?r", "a"])).effect(Effect::add("at", ["?r", "a"])))
            .build()
            .unwrap();
        let universe = Universe::new(&schema, [("a", "Room"), ("b", "Room"), ("c", "Room"), ("d", "Room"), ("r1", "Robot")]).unwrap();
        let distances = Distances::from_names(&universe, [("a", "b", 4), ("b", "a", 4), ("b", "c", 1)]).unwrap();
        let engine = Engine::new(schema, universe).unwrap().with_distances(distances);

        let facts = [
            engine.fact("link", ["a", "b"]).unwrap(),
            engine.fact("link", ["b", "a"]).unwrap(),
            engine.fact("link", ["b", "c"]).unwrap(),
            engine.fact("link", ["c", "b"]).unwrap(),
            engine.fact("link", ["c", "d"]).unwrap(),
            engine.fact("blocked", ["c", "d"]).unwrap(),
            engine.fact("at", ["r1", "a"]).unwrap(),
            engine.fact("marked", ["b"]).unwrap(),
        ];
        let state = engine.state(facts).unwrap();
        (engine, state)
    }


    #[test]
    fn test_derive() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = corridor();
        let view = engine.view(&state).unwrap();
        let fact = |p: &str, args: &[&str]| engine.fact(p, args).unwrap();

        assert!(view.holds(&fact("open", &["a", "b"])));
        assert!(!view.holds(&fact("open", &["c", "d"])));
        assert!(view.holds(&fact("reach", &["a", "c"])));
        assert!(view.holds(&fact("reach", &["a", "a"])));
        assert!(!view.holds(&fact("reach", &["a", "d"])));
        assert!(view.holds(&fact("isolated", &["d"])));
        assert!(!view.holds(&fact("isolated", &["c"])));

        // Derived facts never leak into the base facts
        assert!(!state.contains(&fact("open", &["a", "b"])));
        assert_eq!(view.state(), &state);

        // Idempotent
        assert_eq!(engine.derive(&state).unwrap(), engine.derive(&state).unwrap());
        assert_eq!(view.derived(), &engine.derive(&state).unwrap());
    }

    #[test]
    fn test_ground() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = corridor();
        let view = engine.view(&state).unwrap();
        let go = engine.schema().action_id("go").unwrap();

        let groundings: Vec<GroundAction> = view.ground(go).collect::<Result<_, _>>().unwrap();
        assert_eq!(groundings, vec![engine.action("go", ["r1", "a", "b"]).unwrap()]);

        // Restartable
        let iter = view.ground(go);
        assert_eq!(iter.clone().count(), iter.count());

        // Every action at once, in declaration order
        let all: Vec<String> = view.ground_all().map(|a| engine.display(&a.unwrap()).to_string()).collect();
        assert_eq!(all, vec!["(go r1 a b)", "(mark-all r1)", "(refund r1)", "(stay r1)"]);
    }

    #[test]
    fn test_apply() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = corridor();
        let fact = |p: &str, args: &[&str]| engine.fact(p, args).unwrap();

        let trans = engine.apply(&state, &engine.action("go", ["r1", "a", "b"]).unwrap()).unwrap();
        assert_eq!(trans.cost, 4);
        assert_eq!(trans.state.cost(), 4);
        assert_eq!(trans.added, vec![fact("at", &["r1", "b"])]);
        assert_eq!(trans.deleted, vec![fact("at", &["r1", "a"])]);
        assert!(trans.state.contains(&fact("at", &["r1", "b"])));
        assert!(!trans.state.contains(&fact("at", &["r1", "a"])));
        // The predecessor is untouched
        assert!(state.contains(&fact("at", &["r1", "a"])));
        assert_eq!(state.cost(), 0);

        // Guards are evaluated in the pre-state, so marks are toggled instead of all removed
        let trans = engine.apply(&state, &engine.action("mark-all", ["r1"]).unwrap()).unwrap();
        assert_eq!(trans.cost, 3);
        assert_eq!(trans.added, vec![fact("marked", &["a"]), fact("marked", &["c"]), fact("marked", &["d"])]);
        assert_eq!(trans.deleted, vec![fact("marked", &["b"])]);

        // Deleting and adding the same fact keeps it
        let trans = engine.apply(&state, &engine.action("stay", ["r1"]).unwrap()).unwrap();
        assert!(trans.state.contains(&fact("at", &["r1", "a"])));
        assert!(trans.added.is_empty());
        assert!(trans.deleted.is_empty());
        assert_eq!(trans.state.fact_set(), state.fact_set());
    }

    #[test]
    fn test_apply_errors() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = corridor();

        // Inapplicable
        let err = engine.apply(&state, &engine.action("go", ["r1", "c", "d"]).unwrap()).unwrap_err();
        assert_eq!(err, Error::Inapplicable(InapplicableActionError { action: "(go r1 c d)".into() }));

        // Negative cost
        let err = engine.apply(&state, &engine.action("refund", ["r1"]).unwrap()).unwrap_err();
        assert_eq!(err, Error::Cost(CostError::Negative { action: "(refund r1)".into(), value: -1 }));

        // Missing distance; there's only one from `c` to `b`
        let (_, steps) =
            engine.replay(&state, &[engine.action("go", ["r1", "a", "b"]).unwrap(), engine.action("go", ["r1", "b", "c"]).unwrap()]).unwrap();
        assert_eq!(steps.iter().map(|s| s.cost).sum::<u64>(), 5);
        let plan: Vec<GroundAction> =
            [["r1", "a", "b"], ["r1", "b", "c"], ["r1", "c", "b"]].into_iter().map(|args| engine.action("go", args).unwrap()).collect();
        let err = engine.replay(&state, &plan).unwrap_err();
        assert_eq!(err.step, 2);
        assert_eq!(err.error, Error::Cost(CostError::MissingDistance { from: "c".into(), to: "b".into() }));
    }

    #[test]
    fn test_fixpoint_limit() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        // A chain of `n` rooms needs `n - 1` passes to saturate; well below the limit
        let mut builder = SchemaBuilder::new().ty("Room", ROOT_TYPE).base("next", [("?a", "Room"), ("?b", "Room")]).derived(
            "after",
            [("?a", "Room"), ("?b", "Room")],
            Formula::or([
                Formula::atom("next", ["?a", "?b"]),
                Formula::exists([("?m", "Room")], Formula::and([Formula::atom("after", ["?a", "?m"]), Formula::atom("next", ["?m", "?b"])])),
            ]),
        );
        builder = builder.action(ActionDecl::new("noop", [("?a", "Room")]));
        let schema = builder.build().unwrap();
        let names: Vec<String> = (0..6).map(|i| format!("r{i}")).collect();
        let universe = Universe::new(&schema, names.iter().map(|n| (n.as_str(), "Room"))).unwrap();
        let engine = Engine::new(schema, universe).unwrap();
        let state = engine.state(names.windows(2).map(|w| engine.fact("next", [&w[0], &w[1]]).unwrap())).unwrap();

        let derived = engine.derive(&state).unwrap();
        assert_eq!(derived.len(), 15);
        assert!(!matches!(engine.derive(&state), Err(Error::Schema(SchemaError::FixpointDiverged { .. }))));
    }

    #[test]
    fn test_view_display() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = corridor();
        let view = engine.view(&state).unwrap();
        let text: String = view.to_string();
        assert!(text.starts_with("World state (cost 0) {\n    base:\n      + (link a b)\n"));
        assert!(text.contains("      ~ (open a b)\n"));
        assert!(text.ends_with("}"));
    }
}
