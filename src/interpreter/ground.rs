//  GROUND.rs
//    by Lut99
//
//  Created:
//    07 Mar 2025, 10:18:33
//  Last edited:
//    19 Mar 2025, 09:50:07
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the lazy enumeration of the applicable groundings of an
//!   action schema.
//

use super::View;
use super::quantify::Product;
use crate::errors::FormulaError;
use crate::ids::{ActionId, ObjectId};
use crate::log::trace;
use crate::state::GroundAction;


/***** LIBRARY *****/
/// Lazily enumerates the groundings of one action schema whose precondition holds in a
/// [`View`].
///
/// Every well-typed argument tuple is considered exactly once, in lexicographic order of the
/// parameter pools. Cloning the iterator gives an independent copy that continues from the same
/// point.
///
/// Obtained through [`View::ground()`].
#[derive(Clone, Debug)]
pub struct Groundings<'v> {
    /// The view to evaluate preconditions in.
    view:   &'v View<'v>,
    /// The action to ground.
    action: ActionId,
    /// The remaining candidate tuples.
    tuples: Product<'v>,
}
impl<'v> Groundings<'v> {
    /// Constructor for the Groundings.
    ///
    /// # Arguments
    /// - `view`: The [`View`] to evaluate the precondition in.
    /// - `action`: The action schema to ground. Must be from the view's schema.
    ///
    /// # Returns
    /// A new Groundings that starts at the first candidate tuple.
    #[inline]
    pub(crate) fn new(view: &'v View<'v>, action: ActionId) -> Self {
        let def = view.engine().schema().action(action);
        Self { view, action, tuples: Product::new(view.engine().universe(), def.params.iter().map(|p| p.ty)) }
    }
}
impl<'v> Iterator for Groundings<'v> {
    type Item = Result<GroundAction, FormulaError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let args: Vec<ObjectId> = self.tuples.next()?;
            let action = GroundAction { action: self.action, args };
            trace!("--> Considering grounding '{}'", self.view.engine().display(&action));
            match self.view.precondition_holds(&action) {
                Ok(true) => return Some(Ok(action)),
                Ok(false) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) { (0, self.tuples.size_hint().1) }
}
