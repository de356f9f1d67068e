//  LIB.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 10:12:44
//  Last edited:
//    24 Mar 2025, 16:02:19
//  Auto updated?
//    Yes
//
//  Description:
//!   A symbolic state-transition engine for robot manipulation planning
//!   domains.
//!
//!   The engine implements the semantics that a planner (internal or external) relies on:
//!   - A typed [`Schema`](schema::Schema) of base and _derived_ predicates and action schemas;
//!   - Stratified fixpoint evaluation of derived predicates (the `interpreter`-feature);
//!   - Evaluation of quantified first-order [`Formula`](formula::Formula)s;
//!   - Grounding of actions against their preconditions; and
//!   - Atomic application of (quantified, conditional) effects with a scalar action cost.
//

// Declare modules
pub mod engine;
pub mod errors;
pub mod formula;
mod ids;
#[cfg(feature = "interpreter")]
pub mod interpreter;
mod log;
#[cfg(feature = "pddl")]
pub mod pddl;
#[cfg(feature = "robot")]
pub mod robot;
pub mod schema;
pub mod state;
pub mod universe;

// Re-exports
pub use engine::Engine;
pub use ids::{ActionId, ObjectId, PredicateId, TypeId};
