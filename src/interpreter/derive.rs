//  DERIVE.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 14:02:51
//  Last edited:
//    20 Mar 2025, 15:48:26
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the derivation of all derived facts from the base facts of
//!   a [`WorldState`].
//!
//!   Derivation proceeds stratum by stratum in dependency-first order. Each stratum is saturated by
//!   repeatedly evaluating the definitions of its predicates for every well-typed argument tuple
//!   until a full pass derives nothing new. Because a stratum only refers to itself positively
//!   (and to lower strata, which are already fixed), this is monotonic and therefore reaches the
//!   least fixpoint.
//

use std::collections::BTreeSet;
use std::collections::btree_set::Iter;
use std::fmt::{Display, Formatter, Result as FResult};

use super::eval::{Bindings, evaluate};
use super::quantify::Product;
use super::Interpretation;
use crate::engine::Engine;
use crate::errors::{Error, SchemaError};
use crate::ids::PredicateId;
use crate::log::{debug, trace};
use crate::schema::{PredicateDef, PredicateKind};
use crate::state::{Fact, WorldState};


/***** HELPERS *****/
/// The interpretation used while deriving: base facts plus whatever was derived so far.
struct Partial<'a> {
    state:   &'a WorldState,
    derived: &'a BTreeSet<Fact>,
}
impl<'a> Interpretation for Partial<'a> {
    #[inline]
    fn holds(&self, fact: &Fact) -> bool { self.state.contains(fact) || self.derived.contains(fact) }
}





/***** LIBRARY *****/
/// An immutable snapshot of the derived facts that hold in some [`WorldState`].
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DerivedFacts {
    facts: BTreeSet<Fact>,
}
impl DerivedFacts {
    /// Returns whether the given derived fact holds.
    #[inline]
    pub fn contains(&self, fact: &Fact) -> bool { self.facts.contains(fact) }

    /// Returns the derived facts, in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, Fact> { self.facts.iter() }

    /// Returns the number of derived facts.
    #[inline]
    pub fn len(&self) -> usize { self.facts.len() }

    /// Returns whether nothing was derived.
    #[inline]
    pub fn is_empty(&self) -> bool { self.facts.is_empty() }
}
impl<'s> IntoIterator for &'s DerivedFacts {
    type IntoIter = Iter<'s, Fact>;
    type Item = &'s Fact;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.facts.iter() }
}
impl Display for DerivedFacts {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "<{} derived facts>", self.facts.len()) }
}



/// Computes all derived facts that hold in the given state.
///
/// # Arguments
/// - `engine`: The [`Engine`] whose schema defines the derived predicates.
/// - `state`: The [`WorldState`] providing the base facts.
///
/// # Returns
/// A fresh [`DerivedFacts`].
///
/// # Errors
/// This function errors with [`SchemaError::FixpointDiverged`] if some stratum does not saturate
/// within its pass limit. Formula errors cannot occur for a schema validated by an [`Engine`],
/// but are propagated if they do.
#[inline]
pub fn derive(engine: &Engine, state: &WorldState) -> Result<DerivedFacts, Error> { derive_with_limit(engine, state, None) }

/// Computes all derived facts that hold in the given state, with an explicit pass limit.
///
/// # Arguments
/// - `engine`: The [`Engine`] whose schema defines the derived predicates.
/// - `state`: The [`WorldState`] providing the base facts.
/// - `limit`: The maximum number of passes per stratum. If [`None`], it is the number of
///   candidate tuples in the stratum plus one, which a stratified schema never exceeds.
///
/// # Returns
/// A fresh [`DerivedFacts`].
///
/// # Errors
/// This function errors with [`SchemaError::FixpointDiverged`] if some stratum does not saturate
/// within the limit.
#[cfg_attr(not(feature = "log"), allow(unused_variables))]
pub(crate) fn derive_with_limit(engine: &Engine, state: &WorldState, limit: Option<usize>) -> Result<DerivedFacts, Error> {
    let schema = engine.schema();
    let universe = engine.universe();

    let mut derived: BTreeSet<Fact> = BTreeSet::new();
    for (s, stratum) in schema.strata().iter().enumerate() {
        // Collect what we iterate over
        let defs: Vec<(PredicateId, &PredicateDef)> = stratum.iter().map(|id| (*id, schema.predicate(*id))).collect();
        let candidates: usize =
            defs.iter().fold(0usize, |acc, (_, def)| acc.saturating_add(Product::new(universe, def.params.iter().map(|p| p.ty)).len()));
        let max_passes: usize = limit.unwrap_or_else(|| candidates.saturating_add(1));
        trace!("Deriving stratum {s} ({} predicate(s), {candidates} candidate tuple(s))", defs.len());

        // Saturate the stratum
        let mut updates: Vec<Fact> = Vec::new();
        let mut pass: usize = 0;
        loop {
            pass += 1;
            if pass > max_passes {
                return Err(SchemaError::FixpointDiverged { predicates: defs.iter().map(|(_, def)| def.name.to_string()).collect(), passes: max_passes }
                    .into());
            }
            trace!("Derivation pass {pass} of stratum {s} starting");

            // Go thru da predicates to collect updates
            let int = Partial { state, derived: &derived };
            for (id, def) in &defs {
                let PredicateKind::Derived(definition) = &def.kind else { continue };
                for args in Product::new(universe, def.params.iter().map(|p| p.ty)) {
                    let fact = Fact { predicate: *id, args };
                    if derived.contains(&fact) {
                        continue;
                    }
                    let mut bindings: Bindings = Bindings::from_params(&def.params, &fact.args);
                    if evaluate(engine, &int, definition, &mut bindings)? {
                        trace!("--> Deriving '{}'", engine.display(&fact));
                        updates.push(fact);
                    }
                }
            }

            // Apply the updates
            if updates.is_empty() {
                break;
            }
            derived.extend(updates.drain(..));
        }
        trace!("Done saturating stratum {s} (took {pass} passes)");
    }

    // Done!
    debug!("Derived {} fact(s) from {} base fact(s)", derived.len(), state.len());
    Ok(DerivedFacts { facts: derived })
}





/***** TESTS *****/
