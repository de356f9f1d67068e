//  FORMULA.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 11:48:09
//  Last edited:
//    20 Mar 2025, 10:27:36
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the (closed) grammar of first-order formulas, effects and cost
//!   expressions that action schemas and derived predicates are written in.
//!
//!   Formulas refer to everything by name. They are checked against a
//!   [`Schema`](crate::schema::Schema) when it is built, and resolved whenever they are
//!   evaluated.
//!
//!   The [`Display`]-implementations of the types in this module render them as planning-domain
//!   s-expressions, e.g.,
//!   ```plain
//!   (exists (?h - Hand) (and (hasHand ?r ?h) (isHeldBy ?a ?h)))
//!   ```
//

use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FResult};
use std::ops::Deref;
use std::sync::Arc;

use itertools::Itertools as _;


/***** HELPER FUNCTIONS *****/
/// Strips the leading `?` off a variable name, if any.
#[inline]
fn strip_var(name: &str) -> &str { name.strip_prefix('?').unwrap_or(name) }

/// Writes a list of binders as `(?a - A ?b - B)`.
#[inline]
fn fmt_binders(binders: &[Binder], f: &mut Formatter<'_>) -> FResult { write!(f, "({})", binders.iter().join(" ")) }

/// Writes an `and`/`or` connective.
#[inline]
fn fmt_connective(name: &str, args: &[Formula], f: &mut Formatter<'_>) -> FResult {
    if args.is_empty() { write!(f, "({name})") } else { write!(f, "({name} {})", args.iter().join(" ")) }
}





/***** LIBRARY *****/
/// A cheaply clonable name of a type, predicate, action, object or variable.
///
/// Variables are stored _without_ their leading `?`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident(Arc<str>);
impl Ident {
    /// Constructor for the Ident.
    ///
    /// # Arguments
    /// - `name`: The name to wrap.
    ///
    /// # Returns
    /// A new Ident.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self { Self(Arc::from(name.as_ref())) }

    /// Returns the name as a [`str`].
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}
impl Display for Ident {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.0) }
}
impl Borrow<str> for Ident {
    #[inline]
    fn borrow(&self) -> &str { &self.0 }
}
impl Deref for Ident {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target { &self.0 }
}
impl From<&str> for Ident {
    #[inline]
    fn from(value: &str) -> Self { Self::new(value) }
}
impl From<String> for Ident {
    #[inline]
    fn from(value: String) -> Self { Self(Arc::from(value)) }
}
impl From<&Ident> for Ident {
    #[inline]
    fn from(value: &Ident) -> Self { value.clone() }
}



/// An argument to an atom: either a variable or an object constant.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term {
    /// A variable, bound by a parameter or a quantifier.
    Var(Ident),
    /// A constant referring to an object in the universe.
    Object(Ident),
}
impl Term {
    /// Creates a new variable term.
    ///
    /// # Arguments
    /// - `name`: The name of the variable. A leading `?` is optional.
    ///
    /// # Returns
    /// A new [`Term::Var`].
    #[inline]
    pub fn var(name: impl AsRef<str>) -> Self { Self::Var(Ident::new(strip_var(name.as_ref()))) }

    /// Creates a new object term.
    ///
    /// # Arguments
    /// - `name`: The name of the object.
    ///
    /// # Returns
    /// A new [`Term::Object`].
    #[inline]
    pub fn object(name: impl AsRef<str>) -> Self { Self::Object(Ident::new(name.as_ref())) }
}
impl Display for Term {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Var(name) => write!(f, "?{name}"),
            Self::Object(name) => write!(f, "{name}"),
        }
    }
}
impl From<&str> for Term {
    /// Parses a term from a string, where names starting with `?` are variables.
    #[inline]
    fn from(value: &str) -> Self { if value.starts_with('?') { Self::var(value) } else { Self::object(value) } }
}
impl From<&String> for Term {
    #[inline]
    fn from(value: &String) -> Self { Self::from(value.as_str()) }
}



/// A predicate applied to some terms.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Atom {
    /// The name of the predicate.
    pub predicate: Ident,
    /// The arguments to the predicate.
    pub args:      Vec<Term>,
}
impl Atom {
    /// Constructor for the Atom.
    ///
    /// # Arguments
    /// - `predicate`: The name of the predicate.
    /// - `args`: The arguments, where anything starting with a `?` is a variable.
    ///
    /// # Returns
    /// A new Atom.
    #[inline]
    pub fn new<T: Into<Term>>(predicate: impl Into<Ident>, args: impl IntoIterator<Item = T>) -> Self {
        Self { predicate: predicate.into(), args: args.into_iter().map(Into::into).collect() }
    }
}
impl Display for Atom {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}



/// A typed variable introduced by a quantifier or an action parameter.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Binder {
    /// The name of the variable (without `?`).
    pub var: Ident,
    /// The name of its type.
    pub ty:  Ident,
}
impl Binder {
    /// Constructor for the Binder.
    ///
    /// # Arguments
    /// - `var`: The name of the variable. A leading `?` is optional.
    /// - `ty`: The name of the variable's type.
    ///
    /// # Returns
    /// A new Binder.
    #[inline]
    pub fn new(var: impl AsRef<str>, ty: impl Into<Ident>) -> Self { Self { var: Ident::new(strip_var(var.as_ref())), ty: ty.into() } }
}
impl Display for Binder {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "?{} - {}", self.var, self.ty) }
}
impl<V: AsRef<str>, T: Into<Ident>> From<(V, T)> for Binder {
    #[inline]
    fn from(value: (V, T)) -> Self { Self::new(value.0, value.1) }
}



/// The body of a quantified formula.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Quantified {
    /// The variables bound by the quantifier.
    pub binders: Vec<Binder>,
    /// The formula in which they are bound.
    pub body:    Box<Formula>,
}



/// A first-order formula over a finite, typed universe.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Formula {
    /// A predicate applied to terms.
    Atom(Atom),
    /// Two terms referring to the same object.
    Eq(Term, Term),
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction. Empty is true.
    And(Vec<Formula>),
    /// Disjunction. Empty is false.
    Or(Vec<Formula>),
    /// Existential quantification over typed object pools.
    Exists(Quantified),
    /// Universal quantification over typed object pools.
    Forall(Quantified),
}
impl Formula {
    /// Returns the trivially true formula, `(and)`.
    #[inline]
    pub const fn top() -> Self { Self::And(Vec::new()) }

    /// Creates an atomic formula.
    ///
    /// # Arguments
    /// - `predicate`: The name of the predicate.
    /// - `args`: The arguments, where anything starting with a `?` is a variable.
    ///
    /// # Returns
    /// A new [`Formula::Atom`].
    #[inline]
    pub fn atom<T: Into<Term>>(predicate: impl Into<Ident>, args: impl IntoIterator<Item = T>) -> Self {
        Self::Atom(Atom::new(predicate, args))
    }

    /// Creates an equality between two terms.
    #[inline]
    pub fn equal(lhs: impl Into<Term>, rhs: impl Into<Term>) -> Self { Self::Eq(lhs.into(), rhs.into()) }

    /// Negates the given formula.
    #[inline]
    pub fn not(formula: Formula) -> Self { Self::Not(Box::new(formula)) }

    /// Creates a conjunction of the given formulas.
    #[inline]
    pub fn and(formulas: impl IntoIterator<Item = Formula>) -> Self { Self::And(formulas.into_iter().collect()) }

    /// Creates a disjunction of the given formulas.
    #[inline]
    pub fn or(formulas: impl IntoIterator<Item = Formula>) -> Self { Self::Or(formulas.into_iter().collect()) }

    /// Creates an existentially quantified formula.
    ///
    /// # Arguments
    /// - `binders`: The typed variables to quantify over, e.g., `[("?h", "Hand")]`.
    /// - `body`: The formula in which they are bound.
    ///
    /// # Returns
    /// A new [`Formula::Exists`].
    #[inline]
    pub fn exists<B: Into<Binder>>(binders: impl IntoIterator<Item = B>, body: Formula) -> Self {
        Self::Exists(Quantified { binders: binders.into_iter().map(Into::into).collect(), body: Box::new(body) })
    }

    /// Creates a universally quantified formula.
    ///
    /// # Arguments
    /// - `binders`: The typed variables to quantify over, e.g., `[("?c", "Artifact")]`.
    /// - `body`: The formula in which they are bound.
    ///
    /// # Returns
    /// A new [`Formula::Forall`].
    #[inline]
    pub fn forall<B: Into<Binder>>(binders: impl IntoIterator<Item = B>, body: Formula) -> Self {
        Self::Forall(Quantified { binders: binders.into_iter().map(Into::into).collect(), body: Box::new(body) })
    }



    /// Visits every atom in this formula together with its polarity.
    ///
    /// Only `not` flips the polarity; quantifiers preserve it.
    ///
    /// # Arguments
    /// - `positive`: The polarity of this formula itself (usually `true`).
    /// - `visit`: Some closure called for every [`Atom`] and whether it occurs positively.
    pub fn visit_atoms<'s>(&'s self, positive: bool, visit: &mut impl FnMut(&'s Atom, bool)) {
        match self {
            Self::Atom(atom) => visit(atom, positive),
            Self::Eq(_, _) => {},
            Self::Not(formula) => formula.visit_atoms(!positive, visit),
            Self::And(formulas) | Self::Or(formulas) => {
                for formula in formulas {
                    formula.visit_atoms(positive, visit);
                }
            },
            Self::Exists(quant) | Self::Forall(quant) => quant.body.visit_atoms(positive, visit),
        }
    }

    /// Calls a closure for every [`Term`] in this formula, in order.
    pub fn visit_terms<'s>(&'s self, visit: &mut impl FnMut(&'s Term)) {
        match self {
            Self::Atom(atom) => atom.args.iter().for_each(|t| visit(t)),
            Self::Eq(lhs, rhs) => {
                visit(lhs);
                visit(rhs);
            },
            Self::Not(formula) => formula.visit_terms(visit),
            Self::And(formulas) | Self::Or(formulas) => {
                for formula in formulas {
                    formula.visit_terms(visit);
                }
            },
            Self::Exists(quant) | Self::Forall(quant) => quant.body.visit_terms(visit),
        }
    }
}
impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Atom(atom) => atom.fmt(f),
            Self::Eq(lhs, rhs) => write!(f, "(= {lhs} {rhs})"),
            Self::Not(formula) => write!(f, "(not {formula})"),
            Self::And(formulas) => fmt_connective("and", formulas, f),
            Self::Or(formulas) => fmt_connective("or", formulas, f),
            Self::Exists(quant) => {
                write!(f, "(exists ")?;
                fmt_binders(&quant.binders, f)?;
                write!(f, " {})", quant.body)
            },
            Self::Forall(quant) => {
                write!(f, "(forall ")?;
                fmt_binders(&quant.binders, f)?;
                write!(f, " {})", quant.body)
            },
        }
    }
}
impl From<Atom> for Formula {
    #[inline]
    fn from(value: Atom) -> Self { Self::Atom(value) }
}



/// An atom that is either asserted or retracted by an effect.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Literal {
    /// Whether the atom is added (true) or deleted (false).
    pub positive: bool,
    /// The atom itself.
    pub atom:     Atom,
}
impl Display for Literal {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { if self.positive { self.atom.fmt(f) } else { write!(f, "(not {})", self.atom) } }
}



/// One effect of an action, i.e., `(forall (?v - T) (when φ L))`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Effect {
    /// Variables over which the effect is repeated. Empty for unquantified effects.
    pub forall:  Vec<Binder>,
    /// A guard that must hold in the state _before_ the transition.
    pub when:    Option<Formula>,
    /// The literal to assert or retract.
    pub literal: Literal,
}
impl Effect {
    /// Creates an unconditional effect that adds the given atom.
    #[inline]
    pub fn add<T: Into<Term>>(predicate: impl Into<Ident>, args: impl IntoIterator<Item = T>) -> Self {
        Self { forall: Vec::new(), when: None, literal: Literal { positive: true, atom: Atom::new(predicate, args) } }
    }

    /// Creates an unconditional effect that deletes the given atom.
    #[inline]
    pub fn del<T: Into<Term>>(predicate: impl Into<Ident>, args: impl IntoIterator<Item = T>) -> Self {
        Self { forall: Vec::new(), when: None, literal: Literal { positive: false, atom: Atom::new(predicate, args) } }
    }

    /// Guards this effect by the given formula.
    ///
    /// # Arguments
    /// - `guard`: The formula that must hold in the pre-transition state for this effect to fire.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn when(mut self, guard: Formula) -> Self {
        self.when = Some(guard);
        self
    }

    /// Quantifies this effect universally over the given binders.
    ///
    /// # Arguments
    /// - `binders`: The typed variables to repeat the effect for, e.g., `[("?c", "Artifact")]`.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn forall<B: Into<Binder>>(mut self, binders: impl IntoIterator<Item = B>) -> Self {
        self.forall.extend(binders.into_iter().map(Into::into));
        self
    }
}
impl Display for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        if !self.forall.is_empty() {
            write!(f, "(forall ")?;
            fmt_binders(&self.forall, f)?;
            write!(f, " ")?;
        }
        match &self.when {
            Some(guard) => write!(f, "(when {guard} {})", self.literal)?,
            None => write!(f, "{}", self.literal)?,
        }
        if !self.forall.is_empty() {
            write!(f, ")")?;
        }
        Ok(())
    }
}



/// The cost of applying an action.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CostExpr {
    /// A fixed amount.
    Constant(i64),
    /// The distance between two terms, looked up in the static distance table.
    Distance(Term, Term),
}
impl CostExpr {
    /// Creates a distance lookup.
    #[inline]
    pub fn distance(from: impl Into<Term>, to: impl Into<Term>) -> Self { Self::Distance(from.into(), to.into()) }
}
impl Default for CostExpr {
    #[inline]
    fn default() -> Self { Self::Constant(0) }
}
impl Display for CostExpr {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Constant(value) => write!(f, "{value}"),
            Self::Distance(from, to) => write!(f, "(distance {from} {to})"),
        }
    }
}





/***** TESTS *****/
