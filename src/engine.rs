//  ENGINE.rs
//    by Lut99
//
//  Created:
//    05 Mar 2025, 11:30:19
//  Last edited:
//    21 Mar 2025, 14:08:33
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the [`Engine`], which ties a [`Schema`] to the objects and
//!   distances of one world.
//!
//!   The engine itself only validates and names things. The semantics (derivation, evaluation,
//!   grounding and transitions) live in the [`interpreter`](crate::interpreter).
//

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FResult};

use crate::errors::{FormulaError, SchemaError, StateError};
use crate::formula::Ident;
use crate::ids::{ObjectId, PredicateId};
use crate::log::debug;
use crate::schema::{PredicateDef, Schema};
use crate::state::{Fact, GroundAction, WorldState};
use crate::universe::{Distances, Universe};


/***** FORMATTERS *****/
/// Displays a fact, grounded action or world state by name.
///
/// Obtained through [`Engine::display()`].
#[derive(Clone, Copy, Debug)]
pub struct Named<'e, T: ?Sized> {
    engine: &'e Engine,
    what:   &'e T,
}
impl<'e, T: ?Sized> Named<'e, T> {
    /// Writes the name of an object, or its identifier if it's unknown.
    #[inline]
    fn fmt_obj(&self, id: ObjectId, f: &mut Formatter<'_>) -> FResult {
        match self.engine.universe.get_object(id) {
            Some(obj) => write!(f, "{}", obj.name),
            None => write!(f, "#{}", id.index()),
        }
    }
}
impl<'e> Display for Named<'e, Fact> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self.engine.schema.get_predicate(self.what.predicate) {
            Some(def) => write!(f, "({}", def.name)?,
            None => write!(f, "(#{}", self.what.predicate.index())?,
        }
        for arg in &self.what.args {
            write!(f, " ")?;
            self.fmt_obj(*arg, f)?;
        }
        write!(f, ")")
    }
}
impl<'e> Display for Named<'e, GroundAction> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self.engine.schema.get_action(self.what.action) {
            Some(def) => write!(f, "({}", def.name)?,
            None => write!(f, "(#{}", self.what.action.index())?,
        }
        for arg in &self.what.args {
            write!(f, " ")?;
            self.fmt_obj(*arg, f)?;
        }
        write!(f, ")")
    }
}
impl<'e> Display for Named<'e, WorldState> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        writeln!(f, "World state (cost {}) {{", self.what.cost())?;
        for fact in self.what {
            writeln!(f, "    {}", self.engine.display(fact))?;
        }
        write!(f, "}}")
    }
}





/***** LIBRARY *****/
/// Combines a [`Schema`] with the [`Universe`] and [`Distances`] of a world.
///
/// Holds no interior mutability, so it can be shared freely between threads that explore
/// different states.
#[derive(Clone, Debug)]
pub struct Engine {
    /// The schema of the domain.
    schema:    Schema,
    /// The objects in the world.
    universe:  Universe,
    /// The static distance table.
    distances: Distances,
}

// Constructors
impl Engine {
    /// Constructor for the Engine.
    ///
    /// # Arguments
    /// - `schema`: The [`Schema`] of the domain.
    /// - `universe`: The [`Universe`] of objects, built for `schema`.
    ///
    /// # Returns
    /// A new Engine with an empty distance table.
    ///
    /// # Errors
    /// This function errors if the universe was built for another schema, or if the schema uses
    /// object constants that are not in the universe or that have the wrong type for where
    /// they're used.
    pub fn new(schema: Schema, universe: Universe) -> Result<Self, SchemaError> {
        if !universe.is_built_for(&schema) {
            return Err(SchemaError::ForeignUniverse { types: universe.n_types(), expected: schema.types().len() });
        }
        schema.check_constants(&universe)?;
        debug!("Created engine over {} objects", universe.len());
        Ok(Self { schema, universe, distances: Distances::new() })
    }

    /// Sets the distance table of the engine.
    ///
    /// # Arguments
    /// - `distances`: The static [`Distances`] used by `(distance a b)` cost expressions.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn with_distances(mut self, distances: Distances) -> Self {
        self.distances = distances;
        self
    }
}

// Names
impl Engine {
    /// Resolves and validates a fact by name.
    ///
    /// The fact may be over a derived predicate, which is useful for
    /// [querying](crate::interpreter::View::holds()) them. Derived facts are rejected when building
    /// a [`WorldState`], though.
    ///
    /// # Arguments
    /// - `predicate`: The name of the predicate.
    /// - `args`: The names of the objects.
    ///
    /// # Returns
    /// A new [`Fact`].
    ///
    /// # Errors
    /// This function errors if any name is unknown, or if the arity or types don't match.
    pub fn fact<S: AsRef<str>>(&self, predicate: &str, args: impl IntoIterator<Item = S>) -> Result<Fact, StateError> {
        let pred: PredicateId = self.schema.predicate_id(predicate).ok_or_else(|| StateError::UnknownPredicate { name: predicate.into() })?;
        let args: Vec<ObjectId> = args
            .into_iter()
            .map(|arg| {
                let arg: &str = arg.as_ref();
                self.universe.object_id(arg).ok_or_else(|| StateError::UnknownObject { name: arg.into() })
            })
            .collect::<Result<_, _>>()?;
        let fact = Fact { predicate: pred, args };
        self.check_fact(&fact)?;
        Ok(fact)
    }

    /// Checks that a fact has the arity and types declared by its predicate.
    fn check_fact(&self, fact: &Fact) -> Result<&PredicateDef, StateError> {
        let def: &PredicateDef = self
            .schema
            .get_predicate(fact.predicate)
            .ok_or_else(|| StateError::UnknownPredicate { name: format!("#{}", fact.predicate.index()) })?;
        if def.params.len() != fact.args.len() {
            return Err(StateError::ArityMismatch { predicate: def.name.to_string(), expected: def.params.len(), got: fact.args.len() });
        }
        for (i, (arg, param)) in fact.args.iter().zip(def.params.iter()).enumerate() {
            let obj = self.universe.get_object(*arg).ok_or_else(|| StateError::UnknownObject { name: format!("#{}", arg.index()) })?;
            if !self.schema.is_subtype(obj.ty, param.ty) {
                return Err(StateError::IllTyped {
                    predicate: def.name.to_string(),
                    index:     i,
                    object:    obj.name.to_string(),
                    expected:  self.schema.type_name(param.ty).to_string(),
                });
            }
        }
        Ok(def)
    }

    /// Builds a validated [`WorldState`] with zero cost.
    ///
    /// # Arguments
    /// - `facts`: The base [`Fact`]s that are true in it.
    ///
    /// # Returns
    /// A new [`WorldState`].
    ///
    /// # Errors
    /// This function errors if any fact is over a derived predicate or does not fit its
    /// predicate's signature.
    #[inline]
    pub fn state(&self, facts: impl IntoIterator<Item = Fact>) -> Result<WorldState, StateError> { self.state_with_cost(facts, 0) }

    /// Builds a validated [`WorldState`] with some cost already spent.
    ///
    /// # Arguments
    /// - `facts`: The base [`Fact`]s that are true in it.
    /// - `cost`: The total cost spent to get there.
    ///
    /// # Returns
    /// A new [`WorldState`].
    ///
    /// # Errors
    /// This function errors if any fact is over a derived predicate or does not fit its
    /// predicate's signature.
    pub fn state_with_cost(&self, facts: impl IntoIterator<Item = Fact>, cost: u64) -> Result<WorldState, StateError> {
        let mut set: BTreeSet<Fact> = BTreeSet::new();
        for fact in facts {
            let def: &PredicateDef = self.check_fact(&fact)?;
            if def.is_derived() {
                return Err(StateError::DerivedFact { predicate: def.name.to_string() });
            }
            set.insert(fact);
        }
        Ok(WorldState::from_parts(set, cost))
    }

    /// Resolves and validates a grounded action by name.
    ///
    /// # Arguments
    /// - `action`: The name of the action.
    /// - `args`: The names of the objects to bind to its parameters.
    ///
    /// # Returns
    /// A new [`GroundAction`]. Whether it's applicable is up to the state it's applied in.
    ///
    /// # Errors
    /// This function errors if any name is unknown, or if the arity or types don't match.
    pub fn action<S: AsRef<str>>(&self, action: &str, args: impl IntoIterator<Item = S>) -> Result<GroundAction, FormulaError> {
        let id = self.schema.action_id(action).ok_or_else(|| FormulaError::UnknownAction { name: action.into() })?;
        let args: Vec<ObjectId> = args
            .into_iter()
            .map(|arg| {
                let arg: &str = arg.as_ref();
                self.universe.object_id(arg).ok_or_else(|| FormulaError::UnknownObject { name: arg.into() })
            })
            .collect::<Result<_, _>>()?;
        let action = GroundAction { action: id, args };
        self.check_action(&action)?;
        Ok(action)
    }

    /// Checks that a grounded action has the arity and types declared by its schema.
    ///
    /// # Errors
    /// This function errors if the action or any of its objects is unknown, or if the arity or
    /// types don't match.
    pub fn check_action(&self, action: &GroundAction) -> Result<(), FormulaError> {
        let def = self.schema.get_action(action.action).ok_or_else(|| FormulaError::UnknownAction { name: format!("#{}", action.action.index()) })?;
        if def.params.len() != action.args.len() {
            return Err(FormulaError::ArityMismatch { name: def.name.to_string(), expected: def.params.len(), got: action.args.len() });
        }
        for (i, (arg, param)) in action.args.iter().zip(def.params.iter()).enumerate() {
            let obj = self.universe.get_object(*arg).ok_or_else(|| FormulaError::UnknownObject { name: format!("#{}", arg.index()) })?;
            if !self.schema.is_subtype(obj.ty, param.ty) {
                return Err(FormulaError::IllTyped {
                    name:     def.name.to_string(),
                    index:    i,
                    object:   obj.name.to_string(),
                    expected: self.schema.type_name(param.ty).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Wraps a fact, grounded action or world state such that it is [displayed](Display) by name.
    ///
    /// # Arguments
    /// - `what`: The thing to display.
    ///
    /// # Returns
    /// A [`Named`] formatter.
    #[inline]
    pub fn display<'e, T: ?Sized>(&'e self, what: &'e T) -> Named<'e, T> { Named { engine: self, what } }

    /// Returns the name of the given object.
    #[inline]
    pub fn object_name(&self, id: ObjectId) -> Option<&Ident> { self.universe.get_object(id).map(|o| &o.name) }
}

// Accessors
impl Engine {
    /// Returns the schema of the domain.
    #[inline]
    pub fn schema(&self) -> &Schema { &self.schema }

    /// Returns the objects in the world.
    #[inline]
    pub fn universe(&self) -> &Universe { &self.universe }

    /// Returns the static distance table.
    #[inline]
    pub fn distances(&self) -> &Distances { &self.distances }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;
    use crate::schema::{ActionDecl, ROOT_TYPE, SchemaBuilder};

    /// Makes a tiny engine.
    fn engine() -> Engine {
        let schema = SchemaBuilder::new()
            .ty("Location", ROOT_TYPE)
            .ty("Space", "Location")
            .ty("Robot", ROOT_TYPE)
            .base("at", [("?r", "Robot"), ("?s", "Space")])
            .derived("placed", [("?r", "Robot")], Formula::exists([("?s", "Space")], Formula::atom("at", ["?r", "?s"])))
            .action(ActionDecl::new("wait", [("?r", "Robot")]))
            .build()
            .unwrap();
        let universe = Universe::new(&schema, [("r1", "Robot"), ("kitchen", "Space")]).unwrap();
        Engine::new(schema, universe).unwrap()
    }


    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_facts() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let engine = engine();
        let fact = engine.fact("at", ["r1", "kitchen"]).unwrap();
        assert_eq!(engine.display(&fact).to_string(), "(at r1 kitchen)");

        assert_eq!(engine.fact("at", ["r1"]).unwrap_err(), StateError::ArityMismatch { predicate: "at".into(), expected: 2, got: 1 });
        assert_eq!(engine.fact("at", ["r1", "r2"]).unwrap_err(), StateError::UnknownObject { name: "r2".into() });
        assert_eq!(engine.fact("on", ["r1"]).unwrap_err(), StateError::UnknownPredicate { name: "on".into() });
        assert!(matches!(engine.fact("at", ["kitchen", "kitchen"]), Err(StateError::IllTyped { index: 0, .. })));

        // Derived facts can be resolved, but never asserted
        let placed = engine.fact("placed", ["r1"]).unwrap();
        assert_eq!(engine.state([placed]).unwrap_err(), StateError::DerivedFact { predicate: "placed".into() });

        let state = engine.state([fact.clone(), fact]).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.cost(), 0);
        assert_eq!(engine.display(&state).to_string(), "World state (cost 0) {\n    (at r1 kitchen)\n}");
    }

    #[test]
    fn test_actions() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let engine = engine();
        let action = engine.action("wait", ["r1"]).unwrap();
        assert_eq!(engine.display(&action).to_string(), "(wait r1)");
        assert_eq!(engine.action("sleep", ["r1"]).unwrap_err(), FormulaError::UnknownAction { name: "sleep".into() });
        assert_eq!(engine.action("wait", ["r1", "r1"]).unwrap_err(), FormulaError::ArityMismatch { name: "wait".into(), expected: 1, got: 2 });
        assert!(matches!(engine.action("wait", ["kitchen"]), Err(FormulaError::IllTyped { index: 0, .. })));
    }

    #[test]
    fn test_unknown_constant() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let schema = SchemaBuilder::new()
            .ty("Space", ROOT_TYPE)
            .base("lit", [("?s", "Space")])
            .action(ActionDecl::new("light", [("?s", "Space")]).precondition(Formula::atom("lit", ["attic"])))
            .build()
            .unwrap();
        let universe = Universe::new(&schema, [("kitchen", "Space")]).unwrap();
        assert!(matches!(Engine::new(schema, universe), Err(SchemaError::UnknownConstant { object, .. }) if object == "attic"));
    }

    #[test]
    fn test_foreign_universe() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let big = SchemaBuilder::new().ty("A", ROOT_TYPE).ty("B", "A").ty("C", "B").base("p", [("?x", "A")]).build().unwrap();
        let small = SchemaBuilder::new().ty("A", ROOT_TYPE).base("p", [("?x", "A")]).build().unwrap();
        let universe = Universe::new(&big, [("c1", "C")]).unwrap();
        assert_eq!(Engine::new(small, universe.clone()).unwrap_err(), SchemaError::ForeignUniverse { types: 4, expected: 2 });

        // Same number of types is not enough; they have to be the same ones
        let other = SchemaBuilder::new().ty("A", ROOT_TYPE).ty("B", "A").ty("D", "B").base("p", [("?x", "A")]).build().unwrap();
        assert_eq!(Engine::new(other, universe.clone()).unwrap_err(), SchemaError::ForeignUniverse { types: 4, expected: 4 });

        // The original is fine
        let engine = Engine::new(big, universe).unwrap();
        assert!(engine.fact("p", ["c1"]).is_ok());
    }
}
