//  ROBOT.rs
//    by Lut99
//
//  Created:
//    12 Mar 2025, 14:05:38
//  Last edited:
//    24 Mar 2025, 15:51:20
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the built-in robot manipulation domain.
//!
//!   A robot with hands moves between spaces connected through portals (doors, stairs and
//!   openings), and picks, places, opens, unlocks and powers artifacts. Where an artifact is is
//!   _derived_: it is in a space if it lies on its floor, sits in or on another artifact that is in
//!   that space, or is carried by a robot in that space. Hence moving a box moves the key inside it
//!   without any effect mentioning the key.
//!
//!   [`propagating_schema()`] provides the alternative where the location of an artifact is a
//!   base fact, which `move` copies along for everything the robot transports.
//

use crate::engine::Engine;
use crate::errors::{Error, SchemaError};
use crate::formula::{Atom, CostExpr, Effect, Formula, Quantified};
use crate::schema::{ActionDecl, ROOT_TYPE, Schema, SchemaBuilder};
use crate::state::{Fact, WorldState};
use crate::universe::{Distances, Universe};


/***** CONSTANTS *****/
/// The predicates of the domain (in either variant).
pub const PREDICATES: &[&str] = &[
    "hasPathTo",
    "hasHand",
    "robotIsInSpace",
    "artifactIsOnFloorOf",
    "isInsideOf",
    "isOntopOf",
    "isHeldBy",
    "isOpenDoor",
    "isOpen",
    "isON",
    "isLocked",
    "unlocks",
    "hasRequiredKey",
    "Affordance_PickupOneHand",
    "Affordance_PickupTwoHands",
    "Affordance_PlaceOn",
    "Affordance_PlaceIn",
    "Affordance_Open",
    "Affordance_Power",
    "handIsEmpty",
    "isCarriedBy",
    "artifactIsInSpace",
    "isTransportedBy",
    "isPassable",
    "hasOpenPathTo",
    "isReachable",
];

/// The name under which the domain is written.
pub const DOMAIN_NAME: &str = "robot";

/// The base facts of the [`kitchen_world()`].
const KITCHEN_FACTS: &[(&str, &[&str])] = &[
    ("hasHand", &["r1", "left"]),
    ("hasHand", &["r1", "right"]),
    ("robotIsInSpace", &["r1", "kitchen"]),
    ("hasPathTo", &["kitchen", "d1"]),
    ("hasPathTo", &["d1", "kitchen"]),
    ("hasPathTo", &["hall", "d1"]),
    ("hasPathTo", &["d1", "hall"]),
    ("hasPathTo", &["kitchen", "o1"]),
    ("hasPathTo", &["o1", "kitchen"]),
    ("hasPathTo", &["pantry", "o1"]),
    ("hasPathTo", &["o1", "pantry"]),
    ("hasPathTo", &["hall", "s1"]),
    ("hasPathTo", &["s1", "hall"]),
    ("hasPathTo", &["attic", "s1"]),
    ("hasPathTo", &["s1", "attic"]),
    ("artifactIsOnFloorOf", &["table", "kitchen"]),
    ("artifactIsOnFloorOf", &["fridge", "kitchen"]),
    ("artifactIsOnFloorOf", &["lamp", "kitchen"]),
    ("artifactIsOnFloorOf", &["box", "hall"]),
    ("artifactIsOnFloorOf", &["safe", "pantry"]),
    ("isOntopOf", &["cup", "table"]),
    ("isInsideOf", &["key", "box"]),
    ("isLocked", &["safe"]),
    ("unlocks", &["key", "safe"]),
    ("Affordance_PickupOneHand", &["cup"]),
    ("Affordance_PickupOneHand", &["key"]),
    ("Affordance_PickupTwoHands", &["box"]),
    ("Affordance_PlaceOn", &["table"]),
    ("Affordance_PlaceIn", &["box"]),
    ("Affordance_PlaceIn", &["fridge"]),
    ("Affordance_PlaceIn", &["safe"]),
    ("Affordance_Open", &["fridge"]),
    ("Affordance_Open", &["safe"]),
    ("Affordance_Power", &["lamp"]),
];

/// The locations of the artifacts in the [`kitchen_world()`], for when they are base facts.
const KITCHEN_LOCATIONS: &[(&str, &[&str])] = &[
    ("artifactIsInSpace", &["cup", "kitchen"]),
    ("artifactIsInSpace", &["table", "kitchen"]),
    ("artifactIsInSpace", &["fridge", "kitchen"]),
    ("artifactIsInSpace", &["lamp", "kitchen"]),
    ("artifactIsInSpace", &["box", "hall"]),
    ("artifactIsInSpace", &["key", "hall"]),
    ("artifactIsInSpace", &["safe", "pantry"]),
];





/***** HELPERS *****/
/// Robot `r` is in the same space as artifact `a`.
fn near(r: &str, a: &str) -> Formula {
    Formula::exists(
        [("?here", "Space")],
        Formula::and([Formula::atom("robotIsInSpace", [r, "?here"]), Formula::atom("artifactIsInSpace", [a, "?here"])]),
    )
}

/// Robot `r` has some empty hand.
fn has_free_hand(r: &str) -> Formula {
    Formula::exists([("?free", "Hand")], Formula::and([Formula::atom("hasHand", [r, "?free"]), Formula::atom("handIsEmpty", ["?free"])]))
}

/// Robot `r` stands next to portal `p`.
fn next_to(r: &str, p: &str) -> Formula {
    Formula::exists([("?here", "Space")], Formula::and([Formula::atom("robotIsInSpace", [r, "?here"]), Formula::atom("hasPathTo", ["?here", p])]))
}

/// Nobody holds artifact `a`.
fn not_held(a: &str) -> Formula { Formula::not(Formula::exists([("?holder", "Hand")], Formula::atom("isHeldBy", [a, "?holder"]))) }

/// Removes artifact `a` from wherever it lies.
fn lift(a: &str) -> [Effect; 3] {
    [
        Effect::del("artifactIsOnFloorOf", [a, "?s"]).when(Formula::atom("artifactIsOnFloorOf", [a, "?s"])).forall([("?s", "Space")]),
        Effect::del("isInsideOf", [a, "?c"]).when(Formula::atom("isInsideOf", [a, "?c"])).forall([("?c", "Artifact")]),
        Effect::del("isOntopOf", [a, "?c"]).when(Formula::atom("isOntopOf", [a, "?c"])).forall([("?c", "Artifact")]),
    ]
}

/// Releases artifact `a` from every hand holding it.
fn release(a: &str) -> Effect { Effect::del("isHeldBy", [a, "?holder"]).when(Formula::atom("isHeldBy", [a, "?holder"])).forall([("?holder", "Hand")]) }

/// Declares the domain in one of its two variants.
fn declare(propagating: bool) -> SchemaBuilder {
    let mut builder = SchemaBuilder::new()
        .ty("Location", ROOT_TYPE)
        .ty("Space", "Location")
        .ty("Portal", "Location")
        .ty("Door", "Portal")
        .ty("Stairs", "Portal")
        .ty("Opening", "Portal")
        .ty("Robot", ROOT_TYPE)
        .ty("Hand", ROOT_TYPE)
        .ty("Artifact", ROOT_TYPE)
        // Topology and state
        .base("hasPathTo", [("?from", "Location"), ("?to", "Location")])
        .base("hasHand", [("?r", "Robot"), ("?h", "Hand")])
        .base("robotIsInSpace", [("?r", "Robot"), ("?s", "Space")])
        .base("artifactIsOnFloorOf", [("?a", "Artifact"), ("?s", "Space")])
        .base("isInsideOf", [("?a", "Artifact"), ("?c", "Artifact")])
        .base("isOntopOf", [("?a", "Artifact"), ("?c", "Artifact")])
        .base("isHeldBy", [("?a", "Artifact"), ("?h", "Hand")])
        .base("isOpenDoor", [("?d", "Door")])
        .base("isOpen", [("?a", "Artifact")])
        .base("isON", [("?a", "Artifact")])
        .base("isLocked", [("?a", "Artifact")])
        .base("unlocks", [("?k", "Artifact"), ("?a", "Artifact")])
        .base("hasRequiredKey", [("?a", "Artifact"), ("?k", "Artifact")])
        // Affordances
        .base("Affordance_PickupOneHand", [("?a", "Artifact")])
        .base("Affordance_PickupTwoHands", [("?a", "Artifact")])
        .base("Affordance_PlaceOn", [("?a", "Artifact")])
        .base("Affordance_PlaceIn", [("?a", "Artifact")])
        .base("Affordance_Open", [("?a", "Artifact")])
        .base("Affordance_Power", [("?a", "Artifact")])
        // Derived
        .derived("handIsEmpty", [("?h", "Hand")], Formula::not(Formula::exists([("?a", "Artifact")], Formula::atom("isHeldBy", ["?a", "?h"]))))
        .derived(
            "isCarriedBy",
            [("?a", "Artifact"), ("?r", "Robot")],
            Formula::exists([("?h", "Hand")], Formula::and([Formula::atom("hasHand", ["?r", "?h"]), Formula::atom("isHeldBy", ["?a", "?h"])])),
        )
        .derived(
            "isPassable",
            [("?p", "Portal")],
            Formula::not(Formula::exists(
                [("?d", "Door")],
                Formula::and([Formula::equal("?d", "?p"), Formula::not(Formula::atom("isOpenDoor", ["?d"]))]),
            )),
        )
        .derived(
            "hasOpenPathTo",
            [("?from", "Space"), ("?to", "Space")],
            Formula::and([
                Formula::not(Formula::equal("?from", "?to")),
                Formula::exists(
                    [("?p", "Portal")],
                    Formula::and([
                        Formula::atom("hasPathTo", ["?from", "?p"]),
                        Formula::atom("hasPathTo", ["?p", "?to"]),
                        Formula::atom("isPassable", ["?p"]),
                    ]),
                ),
            ]),
        )
        .derived(
            "isReachable",
            [("?from", "Space"), ("?to", "Space")],
            Formula::or([
                Formula::atom("hasOpenPathTo", ["?from", "?to"]),
                Formula::exists(
                    [("?via", "Space")],
                    Formula::and([Formula::atom("hasOpenPathTo", ["?from", "?via"]), Formula::atom("isReachable", ["?via", "?to"])]),
                ),
            ]),
        );

    // The location of artifacts
    let rests_on = |a: &str, c: &str| Formula::or([Formula::atom("isInsideOf", [a, c]), Formula::atom("isOntopOf", [a, c])]);
    builder = if propagating {
        builder.base("artifactIsInSpace", [("?a", "Artifact"), ("?s", "Space")]).derived(
            "isTransportedBy",
            [("?a", "Artifact"), ("?r", "Robot")],
            Formula::or([
                Formula::atom("isCarriedBy", ["?a", "?r"]),
                Formula::exists([("?c", "Artifact")], Formula::and([rests_on("?a", "?c"), Formula::atom("isTransportedBy", ["?c", "?r"])])),
            ]),
        )
    } else {
        builder.derived(
            "artifactIsInSpace",
            [("?a", "Artifact"), ("?s", "Space")],
            Formula::or([
                Formula::atom("artifactIsOnFloorOf", ["?a", "?s"]),
                Formula::exists([("?c", "Artifact")], Formula::and([rests_on("?a", "?c"), Formula::atom("artifactIsInSpace", ["?c", "?s"])])),
                Formula::exists([("?r", "Robot")], Formula::and([Formula::atom("isCarriedBy", ["?a", "?r"]), Formula::atom("robotIsInSpace", ["?r", "?s"])])),
            ]),
        )
    };

    // Moving
    let mut moving = ActionDecl::new("move", [("?r", "Robot"), ("?from", "Space"), ("?to", "Space")])
        .precondition(Formula::and([Formula::atom("robotIsInSpace", ["?r", "?from"]), Formula::atom("hasOpenPathTo", ["?from", "?to"])]))
        .effect(Effect::del("robotIsInSpace", ["?r", "?from"]))
        .effect(Effect::add("robotIsInSpace", ["?r", "?to"]))
        .cost(CostExpr::distance("?from", "?to"));
    if propagating {
        moving = moving
            .effect(Effect::del("artifactIsInSpace", ["?a", "?from"]).when(Formula::atom("isTransportedBy", ["?a", "?r"])).forall([("?a", "Artifact")]))
            .effect(Effect::add("artifactIsInSpace", ["?a", "?to"]).when(Formula::atom("isTransportedBy", ["?a", "?r"])).forall([("?a", "Artifact")]));
    }

    builder
        .action(moving)
        .action(
            ActionDecl::new("open-door", [("?r", "Robot"), ("?d", "Door")])
                .precondition(Formula::and([next_to("?r", "?d"), Formula::not(Formula::atom("isOpenDoor", ["?d"])), has_free_hand("?r")]))
                .effect(Effect::add("isOpenDoor", ["?d"]))
                .cost(CostExpr::Constant(2)),
        )
        .action(
            ActionDecl::new("close-door", [("?r", "Robot"), ("?d", "Door")])
                .precondition(Formula::and([next_to("?r", "?d"), Formula::atom("isOpenDoor", ["?d"]), has_free_hand("?r")]))
                .effect(Effect::del("isOpenDoor", ["?d"]))
                .cost(CostExpr::Constant(2)),
        )
        // Picking and placing
        .action(
            ActionDecl::new("pick-one-hand", [("?r", "Robot"), ("?a", "Artifact"), ("?h", "Hand")])
                .precondition(Formula::and([
                    Formula::atom("hasHand", ["?r", "?h"]),
                    Formula::atom("handIsEmpty", ["?h"]),
                    Formula::atom("Affordance_PickupOneHand", ["?a"]),
                    not_held("?a"),
                    near("?r", "?a"),
                    Formula::not(Formula::exists(
                        [("?c", "Artifact")],
                        Formula::and([Formula::atom("isInsideOf", ["?a", "?c"]), Formula::atom("Affordance_Open", ["?c"]), Formula::not(Formula::atom("isOpen", ["?c"]))]),
                    )),
                ]))
                .effect(Effect::add("isHeldBy", ["?a", "?h"]))
                .effects(lift("?a"))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("pick-two-hands", [("?r", "Robot"), ("?a", "Artifact"), ("?h1", "Hand"), ("?h2", "Hand")])
                .precondition(Formula::and([
                    Formula::not(Formula::equal("?h1", "?h2")),
                    Formula::atom("hasHand", ["?r", "?h1"]),
                    Formula::atom("hasHand", ["?r", "?h2"]),
                    Formula::atom("handIsEmpty", ["?h1"]),
                    Formula::atom("handIsEmpty", ["?h2"]),
                    Formula::atom("Affordance_PickupTwoHands", ["?a"]),
                    not_held("?a"),
                    near("?r", "?a"),
                ]))
                .effect(Effect::add("isHeldBy", ["?a", "?h1"]))
                .effect(Effect::add("isHeldBy", ["?a", "?h2"]))
                .effects(lift("?a"))
                .cost(CostExpr::Constant(2)),
        )
        .action(
            ActionDecl::new("place-on", [("?r", "Robot"), ("?a", "Artifact"), ("?h", "Hand"), ("?t", "Artifact")])
                .precondition(Formula::and([
                    Formula::not(Formula::equal("?a", "?t")),
                    Formula::atom("hasHand", ["?r", "?h"]),
                    Formula::atom("isHeldBy", ["?a", "?h"]),
                    Formula::atom("Affordance_PlaceOn", ["?t"]),
                    not_held("?t"),
                    near("?r", "?t"),
                ]))
                .effect(release("?a"))
                .effect(Effect::add("isOntopOf", ["?a", "?t"]))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("place-in", [("?r", "Robot"), ("?a", "Artifact"), ("?h", "Hand"), ("?c", "Artifact")])
                .precondition(Formula::and([
                    Formula::not(Formula::equal("?a", "?c")),
                    Formula::atom("hasHand", ["?r", "?h"]),
                    Formula::atom("isHeldBy", ["?a", "?h"]),
                    Formula::atom("Affordance_PlaceIn", ["?c"]),
                    Formula::or([Formula::not(Formula::atom("Affordance_Open", ["?c"])), Formula::atom("isOpen", ["?c"])]),
                    not_held("?c"),
                    near("?r", "?c"),
                ]))
                .effect(release("?a"))
                .effect(Effect::add("isInsideOf", ["?a", "?c"]))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("place-on-floor", [("?r", "Robot"), ("?a", "Artifact"), ("?h", "Hand"), ("?s", "Space")])
                .precondition(Formula::and([
                    Formula::atom("hasHand", ["?r", "?h"]),
                    Formula::atom("isHeldBy", ["?a", "?h"]),
                    Formula::atom("robotIsInSpace", ["?r", "?s"]),
                ]))
                .effect(release("?a"))
                .effect(Effect::add("artifactIsOnFloorOf", ["?a", "?s"]))
                .cost(CostExpr::Constant(1)),
        )
        // Manipulating
        .action(
            ActionDecl::new("open-container", [("?r", "Robot"), ("?c", "Artifact")])
                .precondition(Formula::and([
                    Formula::atom("Affordance_Open", ["?c"]),
                    Formula::not(Formula::atom("isOpen", ["?c"])),
                    Formula::not(Formula::atom("isLocked", ["?c"])),
                    has_free_hand("?r"),
                    near("?r", "?c"),
                ]))
                .effect(Effect::add("isOpen", ["?c"]))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("close-container", [("?r", "Robot"), ("?c", "Artifact")])
                .precondition(Formula::and([
                    Formula::atom("Affordance_Open", ["?c"]),
                    Formula::atom("isOpen", ["?c"]),
                    has_free_hand("?r"),
                    near("?r", "?c"),
                ]))
                .effect(Effect::del("isOpen", ["?c"]))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("unlock", [("?r", "Robot"), ("?c", "Artifact"), ("?k", "Artifact")])
                .precondition(Formula::and([
                    Formula::atom("isLocked", ["?c"]),
                    Formula::atom("isCarriedBy", ["?k", "?r"]),
                    Formula::or([Formula::atom("unlocks", ["?k", "?c"]), Formula::atom("hasRequiredKey", ["?c", "?k"])]),
                    near("?r", "?c"),
                ]))
                .effect(Effect::del("isLocked", ["?c"]))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("power-on", [("?r", "Robot"), ("?a", "Artifact")])
                .precondition(Formula::and([
                    Formula::atom("Affordance_Power", ["?a"]),
                    Formula::not(Formula::atom("isON", ["?a"])),
                    has_free_hand("?r"),
                    near("?r", "?a"),
                ]))
                .effect(Effect::add("isON", ["?a"]))
                .cost(CostExpr::Constant(1)),
        )
        .action(
            ActionDecl::new("power-off", [("?r", "Robot"), ("?a", "Artifact")])
                .precondition(Formula::and([Formula::atom("Affordance_Power", ["?a"]), Formula::atom("isON", ["?a"]), has_free_hand("?r"), near("?r", "?a")]))
                .effect(Effect::del("isON", ["?a"]))
                .cost(CostExpr::Constant(1)),
        )
}

/// Rewrites one goal atom.
fn normalize_atom(atom: &Atom) -> Formula {
    let rename = |name: &str| Formula::Atom(Atom { predicate: name.into(), args: atom.args.clone() });
    match (atom.predicate.to_lowercase().as_str(), atom.args.len()) {
        ("isinspace", 2) => rename("artifactIsInSpace"),
        ("isontopof", 2) => rename("isOntopOf"),
        ("isontop", 1) => rename("isON"),
        ("isclosed", 1) => Formula::not(rename("isOpen")),
        _ => match PREDICATES.iter().find(|name| name.eq_ignore_ascii_case(&atom.predicate)) {
            Some(name) => rename(name),
            None => Formula::Atom(atom.clone()),
        },
    }
}





/***** LIBRARY *****/
/// Builds the robot domain where the location of artifacts is derived.
///
/// # Returns
/// A new [`Schema`].
///
/// # Errors
/// This function does not error in practice, but propagates the [`SchemaError`] of validating
/// it.
#[inline]
pub fn schema() -> Result<Schema, SchemaError> { declare(false).build() }

/// Builds the robot domain where the location of artifacts is a base fact.
///
/// `move` then carries the location of everything the robot transports (i.e., carries, or what's
/// in or on something it transports) from the old space to the new one, through quantified
/// conditional effects.
///
/// # Returns
/// A new [`Schema`].
///
/// # Errors
/// This function does not error in practice, but propagates the [`SchemaError`] of validating
/// it.
#[inline]
pub fn propagating_schema() -> Result<Schema, SchemaError> { declare(true).build() }



/// Rewrites the aliases that goal descriptions tend to use into predicates of this domain.
///
/// In particular:
/// - `(isInSpace a s)` becomes `(artifactIsInSpace a s)`;
/// - `(isOnTopOf a b)` becomes `(isOntopOf a b)`;
/// - `(isOnTop a)` becomes `(isON a)`;
/// - `(isClosed a)` becomes `(not (isOpen a))`; and
/// - predicates of the domain written in the wrong case get their proper case.
///
/// # Arguments
/// - `goal`: The goal [`Formula`] to rewrite.
///
/// # Returns
/// A new [`Formula`] over the predicates of this domain.
pub fn normalize_goal(goal: &Formula) -> Formula {
    match goal {
        Formula::Atom(atom) => normalize_atom(atom),
        Formula::Eq(lhs, rhs) => Formula::Eq(lhs.clone(), rhs.clone()),
        Formula::Not(formula) => Formula::not(normalize_goal(formula)),
        Formula::And(formulas) => Formula::And(formulas.iter().map(normalize_goal).collect()),
        Formula::Or(formulas) => Formula::Or(formulas.iter().map(normalize_goal).collect()),
        Formula::Exists(quant) => Formula::Exists(Quantified { binders: quant.binders.clone(), body: Box::new(normalize_goal(&quant.body)) }),
        Formula::Forall(quant) => Formula::Forall(Quantified { binders: quant.binders.clone(), body: Box::new(normalize_goal(&quant.body)) }),
    }
}



/// Builds a small household world over the given variant of the domain.
///
/// Robot `r1` (with hands `left` and `right`) stands in the `kitchen`. The kitchen connects to
/// the `hall` through the closed door `d1` and to the `pantry` through the opening `o1`; the hall
/// connects to the `attic` through stairs `s1`. The `cup` sits on the `table`, the `key` lies in
/// the `box` in the hall, and it unlocks the `safe` in the pantry. There is no distance known to
/// the attic.
///
/// # Arguments
/// - `schema`: Either [`schema()`] or [`propagating_schema()`].
///
/// # Returns
/// An [`Engine`] for the world and its initial [`WorldState`].
///
/// # Errors
/// This function errors if the schema is not (a variant of) the robot domain.
pub fn kitchen_world(schema: Schema) -> Result<(Engine, WorldState), Error> {
    let universe = Universe::new(&schema, [
        ("r1", "Robot"),
        ("left", "Hand"),
        ("right", "Hand"),
        ("kitchen", "Space"),
        ("hall", "Space"),
        ("pantry", "Space"),
        ("attic", "Space"),
        ("d1", "Door"),
        ("o1", "Opening"),
        ("s1", "Stairs"),
        ("cup", "Artifact"),
        ("table", "Artifact"),
        ("fridge", "Artifact"),
        ("lamp", "Artifact"),
        ("box", "Artifact"),
        ("key", "Artifact"),
        ("safe", "Artifact"),
    ])?;
    let distances = Distances::from_names(&universe, [
        ("kitchen", "hall", 2),
        ("hall", "kitchen", 2),
        ("kitchen", "pantry", 2),
        ("pantry", "kitchen", 2),
    ])?;
    let propagating: bool = schema.predicate_id("artifactIsInSpace").is_some_and(|id| !schema.predicate(id).is_derived());
    let engine: Engine = Engine::new(schema, universe)?.with_distances(distances);

    // The initial facts
    let locations: &[(&str, &[&str])] = if propagating { KITCHEN_LOCATIONS } else { &[] };
    let facts: Vec<Fact> = KITCHEN_FACTS.iter().chain(locations).map(|(pred, args)| engine.fact(pred, *args)).collect::<Result<_, _>>()?;
    let state: WorldState = engine.state(facts)?;
    Ok((engine, state))
}





/***** TESTS *****/
#[cfg(all(test, feature = "interpreter"))]
mod tests {
    use super::*;
    use crate::errors::{CostError, InapplicableActionError};
    use crate::state::GroundAction;
    use crate::tests::kitchen;

    /// Resolves a bunch of actions by name.
    fn actions(engine: &Engine, plan: &[(&str, &[&str])]) -> Vec<GroundAction> {
        plan.iter().map(|(name, args)| engine.action(name, *args).unwrap()).collect()
    }

    /// Fetches the box from the hall and brings it to the kitchen.
    const FETCH_BOX: &[(&str, &[&str])] = &[
        ("open-door", &["r1", "d1"]),
        ("move", &["r1", "kitchen", "hall"]),
        ("pick-two-hands", &["r1", "box", "left", "right"]),
        ("move", &["r1", "hall", "kitchen"]),
    ];

    /// Continues after [`FETCH_BOX`] by unlocking and opening the safe in the pantry.
    const OPEN_SAFE: &[(&str, &[&str])] = &[
        ("place-on-floor", &["r1", "box", "left", "kitchen"]),
        ("pick-one-hand", &["r1", "key", "left"]),
        ("move", &["r1", "kitchen", "pantry"]),
        ("unlock", &["r1", "safe", "key"]),
        ("open-container", &["r1", "safe"]),
    ];


    #[test]
    fn test_schema() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let derived = schema().unwrap();
        let propagating = propagating_schema().unwrap();
        for name in PREDICATES {
            assert!(derived.predicate_id(name).is_some() || propagating.predicate_id(name).is_some(), "Unknown predicate \"{name}\"");
        }
        assert!(derived.get_predicate(derived.predicate_id("artifactIsInSpace").unwrap()).unwrap().is_derived());
        assert!(!propagating.get_predicate(propagating.predicate_id("artifactIsInSpace").unwrap()).unwrap().is_derived());
        assert_eq!(derived.actions().len(), 13);
    }

    #[test]
    fn test_open_door() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = kitchen();
        let open_door = engine.schema().action_id("open-door").unwrap();
        let moving = engine.schema().action_id("move").unwrap();
        let fact = |p: &str, args: &[&str]| engine.fact(p, args).unwrap();

        // The door is closed, so we can open it but not walk through it
        let view = engine.view(&state).unwrap();
        assert!(!view.holds(&fact("hasOpenPathTo", &["kitchen", "hall"])));
        assert!(view.holds(&fact("hasOpenPathTo", &["kitchen", "pantry"])));
        assert_eq!(view.ground(open_door).collect::<Result<Vec<_>, _>>().unwrap(), vec![engine.action("open-door", ["r1", "d1"]).unwrap()]);
        let moves: Vec<GroundAction> = view.ground(moving).collect::<Result<_, _>>().unwrap();
        assert_eq!(moves, vec![engine.action("move", ["r1", "kitchen", "pantry"]).unwrap()]);

        // Open it
        let trans = view.apply(&engine.action("open-door", ["r1", "d1"]).unwrap()).unwrap();
        assert_eq!(trans.cost, 2);
        assert_eq!(trans.state.cost(), 2);
        assert_eq!(trans.added, vec![fact("isOpenDoor", &["d1"])]);
        assert!(trans.deleted.is_empty());

        // Now we can walk through it, but not open it again
        let view = engine.view(&trans.state).unwrap();
        assert!(view.holds(&fact("hasOpenPathTo", &["kitchen", "hall"])));
        assert!(view.holds(&fact("isReachable", &["kitchen", "attic"])));
        assert!(view.ground(moving).any(|a| a.unwrap() == engine.action("move", ["r1", "kitchen", "hall"]).unwrap()));
        assert_eq!(view.ground(open_door).count(), 0);
    }

    #[test]
    fn test_location_follows_container() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = kitchen();
        let fact = |p: &str, args: &[&str]| engine.fact(p, args).unwrap();

        let view = engine.view(&state).unwrap();
        assert!(view.holds(&fact("artifactIsInSpace", &["key", "hall"])));
        assert!(view.holds(&fact("artifactIsInSpace", &["cup", "kitchen"])));

        // Fetch the box; the key comes along without being touched
        let (end, steps) = engine.replay(&state, &actions(&engine, FETCH_BOX)).unwrap();
        assert!(steps.iter().all(|s| s.added.iter().chain(s.deleted.iter()).all(|f| !f.args.contains(&engine.universe().object_id("key").unwrap()))));
        let view = engine.view(&end).unwrap();
        assert!(view.holds(&fact("artifactIsInSpace", &["key", "kitchen"])));
        assert!(!view.holds(&fact("artifactIsInSpace", &["key", "hall"])));
        assert!(view.holds(&fact("isCarriedBy", &["box", "r1"])));
        assert!(!view.holds(&fact("handIsEmpty", &["left"])));

        // Putting it down releases both hands
        let trans = view.apply(&engine.action("place-on-floor", ["r1", "box", "left", "kitchen"]).unwrap()).unwrap();
        assert_eq!(trans.deleted, vec![fact("isHeldBy", &["box", "left"]), fact("isHeldBy", &["box", "right"])]);
        let view = engine.view(&trans.state).unwrap();
        assert!(view.holds(&fact("handIsEmpty", &["left"])));
        assert!(view.holds(&fact("handIsEmpty", &["right"])));
        assert!(view.holds(&fact("artifactIsInSpace", &["key", "kitchen"])));
    }

    #[test]
    fn test_location_propagates() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = kitchen_world(propagating_schema().unwrap()).unwrap();
        let fact = |p: &str, args: &[&str]| engine.fact(p, args).unwrap();

        let (end, steps) = engine.replay(&state, &actions(&engine, FETCH_BOX)).unwrap();
        assert!(end.contains(&fact("artifactIsInSpace", &["key", "kitchen"])));
        assert!(end.contains(&fact("artifactIsInSpace", &["box", "kitchen"])));
        assert!(!end.contains(&fact("artifactIsInSpace", &["key", "hall"])));
        assert!(end.contains(&fact("artifactIsInSpace", &["safe", "pantry"])));
        assert!(steps[3].added.contains(&fact("artifactIsInSpace", &["key", "kitchen"])));
        assert!(steps[3].deleted.contains(&fact("artifactIsInSpace", &["key", "hall"])));
    }

    #[test]
    fn test_two_hands_distinct() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = kitchen();
        let (state, _) = engine.replay(&state, &actions(&engine, &FETCH_BOX[..2])).unwrap();
        let view = engine.view(&state).unwrap();
        let picks: Vec<GroundAction> = view.ground(engine.schema().action_id("pick-two-hands").unwrap()).collect::<Result<_, _>>().unwrap();
        assert_eq!(picks, vec![
            engine.action("pick-two-hands", ["r1", "box", "left", "right"]).unwrap(),
            engine.action("pick-two-hands", ["r1", "box", "right", "left"]).unwrap(),
        ]);
        assert!(picks.iter().all(|a| a.args[2] != a.args[3]));
        assert!(!view.precondition_holds(&engine.action("pick-two-hands", ["r1", "box", "left", "left"]).unwrap()).unwrap());
    }

    #[test]
    fn test_atomic_and_costs() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, state) = kitchen();
        let before = state.clone();

        // The door is closed
        let err = engine.apply(&state, &engine.action("move", ["r1", "kitchen", "hall"]).unwrap()).unwrap_err();
        assert_eq!(err, Error::Inapplicable(InapplicableActionError { action: "(move r1 kitchen hall)".into() }));
        assert_eq!(state, before);

        // Costs add up
        let (end, steps) = engine.replay(&state, &actions(&engine, FETCH_BOX)).unwrap();
        assert_eq!(steps.iter().map(|s| s.cost).collect::<Vec<_>>(), vec![2, 2, 2, 2]);
        assert_eq!(end.cost(), steps.iter().map(|s| s.cost).sum::<u64>());

        // There's no distance to the attic
        let (hall, _) = engine.replay(&state, &actions(&engine, &FETCH_BOX[..2])).unwrap();
        let err = engine.apply(&hall, &engine.action("move", ["r1", "hall", "attic"]).unwrap()).unwrap_err();
        assert_eq!(err, Error::Cost(CostError::MissingDistance { from: "hall".into(), to: "attic".into() }));
        assert_eq!(hall.cost(), 4);
    }

    #[test]
    fn test_normalize_goal() {
        let goal = Formula::and([
            Formula::atom("isInSpace", ["key", "kitchen"]),
            Formula::atom("isClosed", ["fridge"]),
            Formula::atom("ISON", ["lamp"]),
            Formula::exists([("?a", "Artifact")], Formula::atom("isOnTopOf", ["?a", "table"])),
        ]);
        assert_eq!(
            normalize_goal(&goal),
            Formula::and([
                Formula::atom("artifactIsInSpace", ["key", "kitchen"]),
                Formula::not(Formula::atom("isOpen", ["fridge"])),
                Formula::atom("isON", ["lamp"]),
                Formula::exists([("?a", "Artifact")], Formula::atom("isOntopOf", ["?a", "table"])),
            ])
        );
    }

    #[cfg(feature = "pddl")]
    #[test]
    fn test_solver_round_trip() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        use crate::pddl::{Plan, domain, problem, read_formula, read_plan};

        let (engine, state) = kitchen();
        let goal = normalize_goal(&read_formula("(and (not (isLocked safe)) (isOpen safe) (isCarriedBy key r1))").unwrap());
        assert!(!engine.satisfies(&state, &goal).unwrap());

        // The texts a solver gets
        let domain_text: String = domain(&engine, DOMAIN_NAME).to_string();
        assert!(domain_text.contains("(:derived (artifactIsInSpace ?a - Artifact ?s - Space)"));
        assert!(domain_text.contains("(increase (total-cost) (distance ?from ?to))"));
        let problem_text: String = problem(&engine, &state, &goal, "open-safe", DOMAIN_NAME).to_string();
        assert!(problem_text.contains("    (isInsideOf key box)\n"));
        assert!(problem_text.contains("    (= (distance kitchen hall) 2)\n"));
        assert!(!problem_text.contains("artifactIsInSpace"));

        // What it returns
        let mut plan = Plan { actions: actions(&engine, FETCH_BOX), cost: Some(14) };
        plan.actions.extend(actions(&engine, OPEN_SAFE));
        let text: String = plan.display(&engine).to_string().to_lowercase();
        let read = read_plan(&engine, &text).unwrap();
        assert_eq!(read, plan);

        // Replaying it reaches the goal at the promised cost
        let (end, steps) = engine.replay(&state, &read.actions).unwrap();
        assert_eq!(steps.len(), 9);
        assert_eq!(Some(end.cost()), read.cost);
        assert!(engine.satisfies(&end, &goal).unwrap());
    }
}
