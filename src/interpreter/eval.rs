//  EVAL.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 09:55:40
//  Last edited:
//    20 Mar 2025, 11:37:02
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the evaluation of [`Formula`]s against some
//!   [`Interpretation`].
//!
//!   Evaluation is a plain structural recursion. Quantifiers range over the pool of their bound
//!   type in the [`Universe`](crate::universe::Universe), so an empty pool makes `exists` false
//!   and `forall` true. Connectives short-circuit left to right.
//

use std::fmt::{Display, Formatter, Result as FResult};

use super::Interpretation;
use crate::engine::Engine;
use crate::errors::FormulaError;
use crate::formula::{Atom, Binder, Formula, Ident, Term};
use crate::ids::{ObjectId, PredicateId, TypeId};
use crate::schema::{Param, PredicateDef};
use crate::state::Fact;


/***** LIBRARY *****/
/// A stack of variable bindings.
///
/// Later bindings shadow earlier ones with the same name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bindings {
    vars: Vec<(Ident, ObjectId)>,
}
impl Bindings {
    /// Constructor for the Bindings that initializes it empty.
    #[inline]
    pub fn new() -> Self { Self::default() }

    /// Binds the parameters of a predicate or action to the given objects.
    ///
    /// # Arguments
    /// - `params`: The parameters to bind.
    /// - `args`: The objects to bind them to, in order.
    ///
    /// # Returns
    /// A new Bindings.
    #[inline]
    pub fn from_params(params: &[Param], args: &[ObjectId]) -> Self {
        Self { vars: params.iter().zip(args.iter()).map(|(p, a)| (p.var.clone(), *a)).collect() }
    }

    /// Binds a variable.
    #[inline]
    pub fn push(&mut self, var: Ident, obj: ObjectId) { self.vars.push((var, obj)); }

    /// Unbinds the most recently bound variable.
    #[inline]
    pub fn pop(&mut self) { self.vars.pop(); }

    /// Returns the object bound to the given variable, if any.
    #[inline]
    pub fn get(&self, var: &str) -> Option<ObjectId> { self.vars.iter().rev().find(|(v, _)| v.as_str() == var).map(|(_, o)| *o) }

    /// Returns the number of bindings on the stack.
    #[inline]
    pub fn len(&self) -> usize { self.vars.len() }

    /// Returns whether nothing is bound.
    #[inline]
    pub fn is_empty(&self) -> bool { self.vars.is_empty() }
}
impl Display for Bindings {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{{")?;
        for (i, (var, obj)) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{var} := #{}", obj.index())?;
        }
        write!(f, "}}")
    }
}



/// Resolves a term to an object.
///
/// # Errors
/// This function errors if the term is an unbound variable or an unknown object.
pub fn resolve_term(engine: &Engine, term: &Term, bindings: &Bindings) -> Result<ObjectId, FormulaError> {
    match term {
        Term::Var(var) => bindings.get(var).ok_or_else(|| FormulaError::UnboundVariable { var: var.to_string() }),
        Term::Object(name) => engine.universe().object_id(name).ok_or_else(|| FormulaError::UnknownObject { name: name.to_string() }),
    }
}

/// Grounds an atom to a fact under the given bindings.
///
/// # Arguments
/// - `engine`: The [`Engine`] to resolve names in.
/// - `atom`: The [`Atom`] to ground.
/// - `bindings`: The [`Bindings`] of its variables.
///
/// # Returns
/// A [`Fact`] that is well-typed according to the atom's predicate.
///
/// # Errors
/// This function errors if the predicate is unknown, the arity is wrong, a term cannot be
/// resolved or an object has the wrong type for its slot.
pub fn ground_atom(engine: &Engine, atom: &Atom, bindings: &Bindings) -> Result<Fact, FormulaError> {
    let schema = engine.schema();
    let pred: PredicateId = schema.predicate_id(&atom.predicate).ok_or_else(|| FormulaError::UnknownPredicate { name: atom.predicate.to_string() })?;
    let def: &PredicateDef = schema.predicate(pred);
    if def.params.len() != atom.args.len() {
        return Err(FormulaError::ArityMismatch { name: def.name.to_string(), expected: def.params.len(), got: atom.args.len() });
    }

    let mut args: Vec<ObjectId> = Vec::with_capacity(atom.args.len());
    for (i, (arg, param)) in atom.args.iter().zip(def.params.iter()).enumerate() {
        let obj: ObjectId = resolve_term(engine, arg, bindings)?;
        if !schema.is_subtype(engine.universe().type_of(obj), param.ty) {
            return Err(FormulaError::IllTyped {
                name:     def.name.to_string(),
                index:    i,
                object:   engine.universe().name(obj).to_string(),
                expected: schema.type_name(param.ty).to_string(),
            });
        }
        args.push(obj);
    }
    Ok(Fact { predicate: pred, args })
}

/// Resolves the types of some binders.
///
/// # Errors
/// This function errors if any of the types is unknown.
pub fn resolve_binders(engine: &Engine, binders: &[Binder]) -> Result<Vec<(Ident, TypeId)>, FormulaError> {
    binders
        .iter()
        .map(|b| engine.schema().type_id(&b.ty).map(|ty| (b.var.clone(), ty)).ok_or_else(|| FormulaError::UnknownType { name: b.ty.to_string() }))
        .collect()
}



/// Evaluates a quantifier by recursively binding the given variables.
///
/// If `exists`, returns true as soon as the body holds for some binding; otherwise, returns false
/// as soon as it fails for some binding.
fn quantify<I: Interpretation>(
    engine: &Engine,
    int: &I,
    vars: &[(Ident, TypeId)],
    body: &Formula,
    bindings: &mut Bindings,
    exists: bool,
) -> Result<bool, FormulaError> {
    let Some(((var, ty), rest)) = vars.split_first() else { return evaluate(engine, int, body, bindings) };
    for obj in engine.universe().pool(*ty) {
        bindings.push(var.clone(), *obj);
        let res: Result<bool, FormulaError> = quantify(engine, int, rest, body, bindings, exists);
        bindings.pop();
        if res? == exists {
            return Ok(exists);
        }
    }
    Ok(!exists)
}

/// Decides a formula against some interpretation.
///
/// # Arguments
/// - `engine`: The [`Engine`] to resolve names in.
/// - `int`: The [`Interpretation`] that decides which facts hold.
/// - `formula`: The [`Formula`] to evaluate.
/// - `bindings`: The [`Bindings`] of its free variables. Restored to its original state when this
///   function returns.
///
/// # Returns
/// Whether the formula holds.
///
/// # Errors
/// This function errors if the formula uses an unbound variable or an unknown name, or if it
/// applies a predicate to the wrong number or type of objects.
pub fn evaluate<I: Interpretation>(engine: &Engine, int: &I, formula: &Formula, bindings: &mut Bindings) -> Result<bool, FormulaError> {
    match formula {
        Formula::Atom(atom) => {
            let fact: Fact = ground_atom(engine, atom, bindings)?;
            Ok(int.holds(&fact))
        },
        Formula::Eq(lhs, rhs) => Ok(resolve_term(engine, lhs, bindings)? == resolve_term(engine, rhs, bindings)?),
        Formula::Not(formula) => Ok(!evaluate(engine, int, formula, bindings)?),
        Formula::And(formulas) => {
            for formula in formulas {
                if !evaluate(engine, int, formula, bindings)? {
                    return Ok(false);
                }
            }
            Ok(true)
        },
        Formula::Or(formulas) => {
            for formula in formulas {
                if evaluate(engine, int, formula, bindings)? {
                    return Ok(true);
                }
            }
            Ok(false)
        },
        Formula::Exists(quant) => {
            let vars: Vec<(Ident, TypeId)> = resolve_binders(engine, &quant.binders)?;
            quantify(engine, int, &vars, &quant.body, bindings, true)
        },
        Formula::Forall(quant) => {
            let vars: Vec<(Ident, TypeId)> = resolve_binders(engine, &quant.binders)?;
            quantify(engine, int, &vars, &quant.body, bindings, false)
        },
    }
}





/***** TESTS *****/
