//  STATE.rs
//    by Lut99
//
//  Created:
//    05 Mar 2025, 10:44:02
//  Last edited:
//    19 Mar 2025, 16:11:58
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines ground facts, grounded actions and the [`WorldState`] that
//!   collects the base facts true in one moment.
//!
//!   Everything in here refers to the schema and universe by identifier. Use
//!   [`Engine::display()`](crate::Engine::display()) to show them by name.
//

use std::collections::BTreeSet;
use std::collections::btree_set::Iter;

use crate::ids::{ActionId, ObjectId, PredicateId};


/***** LIBRARY *****/
/// A predicate applied to objects.
///
/// Ordered by predicate first, then by arguments, which gives world states a deterministic order.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fact {
    /// The predicate that holds.
    pub predicate: PredicateId,
    /// The objects for which it holds.
    pub args:      Vec<ObjectId>,
}
impl Fact {
    /// Constructor for the Fact.
    ///
    /// Note that this does not validate it. See [`Engine::fact()`](crate::Engine::fact()) for
    /// building validated facts by name.
    ///
    /// # Arguments
    /// - `predicate`: The predicate that holds.
    /// - `args`: The objects for which it holds.
    ///
    /// # Returns
    /// A new Fact.
    #[inline]
    pub fn new(predicate: PredicateId, args: impl IntoIterator<Item = ObjectId>) -> Self { Self { predicate, args: args.into_iter().collect() } }
}



/// An action schema with an object for every parameter.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GroundAction {
    /// The action schema.
    pub action: ActionId,
    /// The objects bound to its parameters, in order.
    pub args:   Vec<ObjectId>,
}
impl GroundAction {
    /// Constructor for the GroundAction.
    ///
    /// Note that this does not validate it. See [`Engine::action()`](crate::Engine::action()) for
    /// building validated actions by name.
    #[inline]
    pub fn new(action: ActionId, args: impl IntoIterator<Item = ObjectId>) -> Self { Self { action, args: args.into_iter().collect() } }
}



/// The base facts that are true in some world, together with the cost spent to get there.
///
/// World states are values: [applying](crate::interpreter::View::apply()) an action produces a
/// new one and leaves the old one untouched. They never contain derived facts.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct WorldState {
    /// The true base facts.
    facts: BTreeSet<Fact>,
    /// The total cost so far.
    cost:  u64,
}
impl WorldState {
    /// Constructor for the WorldState that does not validate its facts.
    #[inline]
    pub(crate) fn from_parts(facts: BTreeSet<Fact>, cost: u64) -> Self { Self { facts, cost } }

    /// Returns whether the given fact is true in this state.
    #[inline]
    pub fn contains(&self, fact: &Fact) -> bool { self.facts.contains(fact) }

    /// Returns the true facts, in order.
    #[inline]
    pub fn facts(&self) -> Iter<'_, Fact> { self.facts.iter() }

    /// Returns the true facts as a set.
    #[inline]
    pub fn fact_set(&self) -> &BTreeSet<Fact> { &self.facts }

    /// Returns the total cost spent to reach this state.
    #[inline]
    pub fn cost(&self) -> u64 { self.cost }

    /// Returns the number of true facts.
    #[inline]
    pub fn len(&self) -> usize { self.facts.len() }

    /// Returns whether no facts are true.
    #[inline]
    pub fn is_empty(&self) -> bool { self.facts.is_empty() }
}
impl<'s> IntoIterator for &'s WorldState {
    type IntoIter = Iter<'s, Fact>;
    type Item = &'s Fact;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.facts.iter() }
}
