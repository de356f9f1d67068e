//  QUANTIFY.rs
//    by Lut99
//
//  Created:
//    03 Dec 2024, 17:58:01
//  Last edited:
//    13 Mar 2025, 10:21:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the enumeration of typed argument tuples, once and for all.
//!
//!   Both derivation and grounding range over the Cartesian product of the object pools of some
//!   list of parameter types. That product is produced lazily by a [`Product`].
//

use std::iter::Copied;
use std::slice::Iter;

use crate::ids::{ObjectId, TypeId};
use crate::universe::Universe;


/***** LIBRARY *****/
/// Iterates over some iterator, repeating its element and repeating the whole sequence.
///
/// Specifically:
/// - _inner_ repetition means every element in constant set is repeated (e.g., `111222333` instead
///   of `123`); and
/// - _outer_ repetition means the whole constant set is repeated (e.g., `123123123` instead of
///   `123`).
///
/// Combining these repetitions leads to us being able to do binary-counting-like enumeration of
/// multiple variables. For example, with three `CycleRepeat`s, we can iterate like:
/// ```plain
/// 1 -> 111111111222222222333333333 (inner: 9, outer: 1)
/// 2 -> 111222333111222333111222333 (inner: 3, outer: 3)
/// 3 -> 123123123123123123123123123 (inner: 1, outer: 9)
/// ```
#[derive(Clone, Debug)]
pub struct CycleRepeat<I>
where
    I: Iterator,
{
    /// The set of objects we will iterate over.
    iter_template: I,
    /// The set of objects that we actually iterate over.
    iter: I,
    /// The element we're currently returning.
    elem: Option<I::Item>,
    /// The total number of inner reptitions.
    inner_max: usize,
    /// The total number of outer reptitions.
    outer_max: usize,
    /// The current index of inner repetitions.
    inner_i: usize,
    /// The current index of outer repetitions.
    outer_i: usize,
}
impl<I: Clone + Iterator> CycleRepeat<I> {
    /// Constructor for the CycleRepeat.
    ///
    /// # Arguments
    /// - `into_iter`: The set of objects to enumerate and repeat.
    /// - `inner_max`: The number of _inner_ repetitions.
    /// - `outer_max`: The number of _outer_ repetitions.
    ///
    /// # Returns
    /// A new CycleRepeat that will enumerate from the start.
    #[inline]
    pub fn new(into_iter: impl IntoIterator<IntoIter = I>, inner_max: usize, outer_max: usize) -> Self {
        let iter = into_iter.into_iter();
        let iter_template = iter.clone();
        Self { iter_template, iter, elem: None, inner_max, outer_max, inner_i: 0, outer_i: 0 }
    }
}
impl<I> Iterator for CycleRepeat<I>
where
    I: Clone + Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // See if we need to (continue) repeating the current element
            if self.elem.is_some() && self.inner_i < self.inner_max {
                self.inner_i += 1;
                return self.elem.clone();
            }

            // Move to the next element
            self.inner_i = 0;
            match self.iter.next() {
                Some(elem) => self.elem = Some(elem),
                None => {
                    // There isn't; repeat the iterator
                    // NOTE: The `+1` is necessary because outer_max is 1-indexed (e.g., 2 for two
                    // repetitions), but outer_i is not (1 _after_ the second repetition)
                    if self.outer_i + 1 < self.outer_max {
                        self.outer_i += 1;
                        self.iter = self.iter_template.clone();
                        self.elem = None;
                    } else {
                        // Truly nothing more for us to iterate
                        self.elem = None;
                        return None;
                    }
                },
            }
        }
    }
}



/// Lazily enumerates the Cartesian product of the object pools of a list of types.
///
/// Tuples are produced in lexicographic order of the pools (i.e., the last position changes
/// fastest). An empty list of types produces exactly one empty tuple; any empty pool produces
/// none.
#[derive(Clone, Debug)]
pub struct Product<'u> {
    /// One repeating iterator per position.
    iters: Vec<CycleRepeat<Copied<Iter<'u, ObjectId>>>>,
    /// The number of tuples that are still to come.
    remaining: usize,
}
impl<'u> Product<'u> {
    /// Constructor for the Product.
    ///
    /// # Arguments
    /// - `universe`: The [`Universe`] providing the pools.
    /// - `types`: The types of the positions in the tuple.
    ///
    /// # Returns
    /// A new Product, ready to combinatorially explode under your nose.
    pub fn new(universe: &'u Universe, types: impl IntoIterator<Item = TypeId>) -> Self {
        let pools: Vec<&'u [ObjectId]> = types.into_iter().map(|ty| universe.pool(ty)).collect();

        // We scale from essentially doing `111111...333333`, to `111222...222333`, to `123123...123123`,
        // except that every position may have its own pool size. So the inner repetitions are the
        // product of the sizes after a position, and the outer those of the sizes before it.
        let total: usize = pools.iter().fold(1usize, |acc, pool| acc.saturating_mul(pool.len()));
        let mut iters: Vec<CycleRepeat<Copied<Iter<'u, ObjectId>>>> = Vec::with_capacity(pools.len());
        let mut n_outer: usize = 1;
        for (i, pool) in pools.iter().enumerate() {
            let n_inner: usize = pools[i + 1..].iter().fold(1usize, |acc, pool| acc.saturating_mul(pool.len()));
            iters.push(CycleRepeat::new(pool.iter().copied(), n_inner, n_outer));
            n_outer = n_outer.saturating_mul(pool.len());
        }

        // OK, return self
        Self { iters, remaining: total }
    }
}
impl<'u> Iterator for Product<'u> {
    type Item = Vec<ObjectId>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        // Get the next element of every position
        let mut values: Vec<ObjectId> = Vec::with_capacity(self.iters.len());
        for iter in &mut self.iters {
            values.push(iter.next()?);
        }
        Some(values)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}
impl<'u> ExactSizeIterator for Product<'u> {}





/***** TESTS *****/
