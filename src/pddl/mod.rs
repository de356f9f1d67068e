//  MOD.rs
//    by Lut99
//
//  Created:
//    10 Mar 2025, 09:47:13
//  Last edited:
//    21 Mar 2025, 11:30:59
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the text interchange with external solvers that read
//!   planning-domain descriptions.
//!
//!   The writers produce a domain text (from the [`Schema`] of an [`Engine`]) and a problem text
//!   (from an [`Engine`], a [`WorldState`] and a goal [`Formula`]) with the same semantics as the
//!   engine: `:derived` predicates, `forall`/`when` effects and `(increase (total-cost) ...)`. The
//!   readers parse goal formulas and the plans that solvers return.
//

// Nested modules
pub mod goal;
pub mod plan;
pub mod sexpr;

// Imports
use std::fmt::{Display, Formatter, Result as FResult};

use indexmap::IndexSet;
use itertools::Itertools as _;

pub use goal::read_formula;
pub use plan::{Plan, PlanError, read_plan};
pub use sexpr::{ParseError, ParseErrorKind};

use crate::engine::Engine;
use crate::formula::{CostExpr, Formula, Ident};
use crate::schema::{Param, PredicateKind, Schema};
use crate::state::WorldState;


/***** CONSTANTS *****/
/// The requirements that every written domain declares.
pub const REQUIREMENTS: &[&str] = &[
    ":typing",
    ":negative-preconditions",
    ":equality",
    ":existential-preconditions",
    ":universal-preconditions",
    ":conditional-effects",
    ":derived-predicates",
    ":action-costs",
];





/***** HELPERS *****/
/// Writes a list of parameters as `?a - A ?b - B`.
struct Params<'s> {
    schema: &'s Schema,
    params: &'s [Param],
}
impl<'s> Display for Params<'s> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}", self.params.iter().map(|p| format!("?{} - {}", p.var, self.schema.type_name(p.ty))).join(" "))
    }
}





/// Writes the objects of an engine as `a b - A` lines, grouped by their most specific type.
///
/// Only objects for which `keep` returns true are written.
fn fmt_objects(engine: &Engine, keep: impl Fn(&Ident) -> bool, f: &mut Formatter<'_>) -> FResult {
    for (ty, def) in engine.schema().types() {
        let objs: Vec<&str> = engine.universe().objects().filter(|(_, o)| o.ty == ty && keep(&o.name)).map(|(_, o)| o.name.as_str()).collect();
        if !objs.is_empty() {
            writeln!(f, "    {} - {}", objs.join(" "), def.name)?;
        }
    }
    Ok(())
}





/***** FORMATTERS *****/
/// Writes the [`Schema`] of an [`Engine`] as a domain text.
///
/// Obtained through [`domain()`].
#[derive(Clone, Copy, Debug)]
pub struct DomainFormatter<'e> {
    engine: &'e Engine,
    name:   &'e str,
}
impl<'e> Display for DomainFormatter<'e> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        let schema: &Schema = self.engine.schema();
        writeln!(f, "(define (domain {})", self.name)?;
        writeln!(f, "  (:requirements {})", REQUIREMENTS.iter().join(" "))?;

        // Types, grouped by their parent
        writeln!(f)?;
        writeln!(f, "  (:types")?;
        for (parent, def) in schema.types() {
            let children: Vec<&str> = schema.types().filter(|(_, t)| t.parent == Some(parent)).map(|(_, t)| t.name.as_str()).collect();
            if !children.is_empty() {
                writeln!(f, "    {} - {}", children.join(" "), def.name)?;
            }
        }
        writeln!(f, "  )")?;

        // Objects named in the domain itself
        let constants: IndexSet<&Ident> = schema.constants();
        if !constants.is_empty() {
            writeln!(f)?;
            writeln!(f, "  (:constants")?;
            fmt_objects(self.engine, |name| constants.contains(name), f)?;
            writeln!(f, "  )")?;
        }

        // Predicates (derived ones included, as required)
        writeln!(f)?;
        writeln!(f, "  (:predicates")?;
        for (_, def) in schema.predicates() {
            if def.params.is_empty() {
                writeln!(f, "    ({})", def.name)?;
            } else {
                writeln!(f, "    ({} {})", def.name, Params { schema, params: &def.params })?;
            }
        }
        writeln!(f, "  )")?;

        // Functions
        writeln!(f)?;
        writeln!(f, "  (:functions")?;
        writeln!(f, "    (distance ?from - {} ?to - {})", schema.type_name(schema.root_type()), schema.type_name(schema.root_type()))?;
        writeln!(f, "    (total-cost)")?;
        writeln!(f, "  )")?;

        // Derived predicates
        for (_, def) in schema.predicates() {
            let PredicateKind::Derived(definition) = &def.kind else { continue };
            writeln!(f)?;
            if def.params.is_empty() {
                writeln!(f, "  (:derived ({})", def.name)?;
            } else {
                writeln!(f, "  (:derived ({} {})", def.name, Params { schema, params: &def.params })?;
            }
            writeln!(f, "    {definition}")?;
            writeln!(f, "  )")?;
        }

        // Actions
        for (_, def) in schema.actions() {
            writeln!(f)?;
            writeln!(f, "  (:action {}", def.name)?;
            writeln!(f, "    :parameters ({})", Params { schema, params: &def.params })?;
            writeln!(f, "    :precondition {}", def.precondition)?;
            writeln!(f, "    :effect (and")?;
            for effect in &def.effects {
                writeln!(f, "      {effect}")?;
            }
            match &def.cost {
                CostExpr::Constant(0) => {},
                cost => writeln!(f, "      (increase (total-cost) {cost})")?,
            }
            writeln!(f, "    )")?;
            writeln!(f, "  )")?;
        }
        write!(f, ")")
    }
}



/// Writes a world state and goal as a problem text.
///
/// Obtained through [`problem()`].
#[derive(Clone, Copy, Debug)]
pub struct ProblemFormatter<'e> {
    engine: &'e Engine,
    state:  &'e WorldState,
    goal:   &'e Formula,
    name:   &'e str,
    domain: &'e str,
}
impl<'e> Display for ProblemFormatter<'e> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        let engine: &Engine = self.engine;
        let schema: &Schema = engine.schema();
        writeln!(f, "(define (problem {})", self.name)?;
        writeln!(f, "  (:domain {})", self.domain)?;

        // Objects, grouped by their (most specific) type. Those named by the domain are declared
        // there as constants.
        writeln!(f)?;
        writeln!(f, "  (:objects")?;
        let constants: IndexSet<&Ident> = schema.constants();
        fmt_objects(engine, |name| !constants.contains(name), f)?;
        writeln!(f, "  )")?;

        // The initial state
        writeln!(f)?;
        writeln!(f, "  (:init")?;
        writeln!(f, "    (= (total-cost) {})", self.state.cost())?;
        let mut facts: Vec<String> = self.state.facts().map(|fact| engine.display(fact).to_string()).collect();
        facts.sort();
        for fact in facts {
            writeln!(f, "    {fact}")?;
        }
        for (from, to, dist) in engine.distances().entries() {
            writeln!(f, "    (= (distance {} {}) {dist})", engine.universe().name(from), engine.universe().name(to))?;
        }
        writeln!(f, "  )")?;

        // The goal and the metric
        writeln!(f)?;
        writeln!(f, "  (:goal {})", self.goal)?;
        writeln!(f, "  (:metric minimize (total-cost))")?;
        write!(f, ")")
    }
}





/***** LIBRARY *****/
/// Writes the schema of an engine as a domain text.
///
/// Objects that the schema refers to directly are declared as `:constants`, typed by the
/// engine's universe.
///
/// # Arguments
/// - `engine`: The [`Engine`] whose [`Schema`] to write.
/// - `name`: The name of the domain.
///
/// # Returns
/// A [`DomainFormatter`] that implements [`Display`].
#[inline]
pub fn domain<'e>(engine: &'e Engine, name: &'e str) -> DomainFormatter<'e> { DomainFormatter { engine, name } }

/// Writes a state and goal as a problem text.
///
/// Derived facts are never written; the solver derives them itself.
///
/// # Arguments
/// - `engine`: The [`Engine`] providing the objects and distances.
/// - `state`: The initial [`WorldState`].
/// - `goal`: The goal [`Formula`].
/// - `name`: The name of the problem.
/// - `domain`: The name of the domain it's a problem of.
///
/// # Returns
/// A [`ProblemFormatter`] that implements [`Display`].
#[inline]
pub fn problem<'e>(engine: &'e Engine, state: &'e WorldState, goal: &'e Formula, name: &'e str, domain: &'e str) -> ProblemFormatter<'e> {
    ProblemFormatter { engine, state, goal, name, domain }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Effect;
    use crate::schema::{ActionDecl, ROOT_TYPE, SchemaBuilder};
    use crate::universe::{Distances, Universe};

    fn small() -> Engine {
        let schema = SchemaBuilder::new()
            .ty("Location", ROOT_TYPE)
            .ty("Space", "Location")
            .ty("Door", "Location")
            .ty("Robot", ROOT_TYPE)
            .base("hasPathTo", [("?a", "Location"), ("?b", "Location")])
            .base("robotIsInSpace", [("?r", "Robot"), ("?s", "Space")])
            .base("isOpenDoor", [("?d", "Door")])
            .derived("isClosedDoor", [("?d", "Door")], Formula::not(Formula::atom("isOpenDoor", ["?d"])))
            .action(
                ActionDecl::new("move", [("?r", "Robot"), ("?from", "Space"), ("?to", "Space")])
                    .precondition(Formula::atom("robotIsInSpace", ["?r", "?from"]))
                    .effect(Effect::del("robotIsInSpace", ["?r", "?from"]))
                    .effect(Effect::add("robotIsInSpace", ["?r", "?to"]))
                    .cost(CostExpr::distance("?from", "?to")),
            )
            .action(ActionDecl::new("wait", [("?r", "Robot")]))
            .build()
            .unwrap();
        let universe = Universe::new(&schema, [("hall", "Space"), ("kitchen", "Space"), ("d1", "Door"), ("r1", "Robot")]).unwrap();
        let distances = Distances::from_names(&universe, [("kitchen", "hall", 2)]).unwrap();
        Engine::new(schema, universe).unwrap().with_distances(distances)
    }

    #[test]
    fn test_domain() {
        let engine = small();
        let text: String = domain(&engine, "robot").to_string();
        assert!(text.starts_with("(define (domain robot)\n  (:requirements :typing "));
        assert!(text.contains("    Location Robot - object\n    Space Door - Location\n"));
        assert!(text.contains("    (hasPathTo ?a - Location ?b - Location)\n"));
        assert!(text.contains("    (isClosedDoor ?d - Door)\n"));
        assert!(text.contains("  (:derived (isClosedDoor ?d - Door)\n    (not (isOpenDoor ?d))\n  )"));
        assert!(text.contains("    :parameters (?r - Robot ?from - Space ?to - Space)\n"));
        assert!(text.contains("      (not (robotIsInSpace ?r ?from))\n      (robotIsInSpace ?r ?to)\n      (increase (total-cost) (distance ?from ?to))\n"));
        // Free actions don't increase anything
        assert!(text.contains("  (:action wait\n    :parameters (?r - Robot)\n    :precondition (and)\n    :effect (and\n    )\n"));
        assert!(text.ends_with(")"));
        assert!(!text.contains(":constants"));

        // The definitions read back the same
        let def = read_formula("(not (isOpenDoor ?d))").unwrap();
        assert_eq!(engine.schema().get_predicate(engine.schema().predicate_id("isClosedDoor").unwrap()).unwrap().kind, PredicateKind::Derived(def));
    }

    #[test]
    fn test_problem() {
        let engine = small();
        let state = engine
            .state_with_cost([engine.fact("robotIsInSpace", ["r1", "kitchen"]).unwrap(), engine.fact("hasPathTo", ["kitchen", "d1"]).unwrap()], 3)
            .unwrap();
        let goal = Formula::atom("robotIsInSpace", ["r1", "hall"]);
        let text: String = problem(&engine, &state, &goal, "go-to-hall", "robot").to_string();
        assert_eq!(
            text,
            "(define (problem go-to-hall)
  (:domain robot)

  (:objects
    hall kitchen - Space
    d1 - Door
    r1 - Robot
  )

  (:init
    (= (total-cost) 3)
    (hasPathTo kitchen d1)
    (robotIsInSpace r1 kitchen)
    (= (distance kitchen hall) 2)
  )

  (:goal (robotIsInSpace r1 hall))
  (:metric minimize (total-cost))
)"
        );
    }

    #[test]
    fn test_constants() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let schema = SchemaBuilder::new()
            .ty("Space", ROOT_TYPE)
            .ty("Robot", ROOT_TYPE)
            .base("robotIsInSpace", [("?r", "Robot"), ("?s", "Space")])
            .action(
                ActionDecl::new("return-home", [("?r", "Robot"), ("?s", "Space")])
                    .precondition(Formula::and([Formula::atom("robotIsInSpace", ["?r", "?s"]), Formula::not(Formula::atom("robotIsInSpace", ["?r", "dock"]))]))
                    .effect(Effect::del("robotIsInSpace", ["?r", "?s"]))
                    .effect(Effect::add("robotIsInSpace", ["?r", "dock"])),
            )
            .build()
            .unwrap();
        let universe = Universe::new(&schema, [("dock", "Space"), ("hall", "Space"), ("r1", "Robot")]).unwrap();
        let engine = Engine::new(schema, universe).unwrap();
        assert_eq!(engine.schema().constants().into_iter().map(Ident::as_str).collect::<Vec<_>>(), vec!["dock"]);

        // The domain declares it...
        let text: String = domain(&engine, "robot").to_string();
        assert!(text.contains("  (:constants\n    dock - Space\n  )\n"));
        assert!(text.contains("(not (robotIsInSpace ?r dock))"));

        // ...so the problem must not declare it again
        let state = engine.state([engine.fact("robotIsInSpace", ["r1", "hall"]).unwrap()]).unwrap();
        let goal = Formula::atom("robotIsInSpace", ["r1", "dock"]);
        let text: String = problem(&engine, &state, &goal, "go-home", "robot").to_string();
        assert!(text.contains("  (:objects\n    hall - Space\n    r1 - Robot\n  )\n"));
    }
}
