//  ERRORS.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 11:02:17
//  Last edited:
//    21 Mar 2025, 13:40:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the errors raised by the engine.
//!
//!   Every error names the offending declarations by their (human-readable) names instead of by
//!   their identifiers, such that they can be shown without access to the schema that produced
//!   them.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};


/***** HELPERS *****/
/// A neat formatter for lists of names.
pub(crate) struct FancyList<'a, T>(pub(crate) &'a [T]);
impl<'a, T: Display> Display for FancyList<'a, T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        if self.0.is_empty() {
            return write!(f, "<empty>");
        }
        for (i, elem) in self.0.iter().enumerate() {
            if i > 0 && i < self.0.len() - 1 {
                write!(f, ", ")?;
            } else if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "\"{elem}\"")?;
        }
        Ok(())
    }
}





/***** AUXILLARY *****/
/// Names the declaration in which a [`SchemaError`] was found.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Origin {
    /// It was found in the definition of a derived predicate.
    Predicate(String),
    /// It was found in an action schema.
    Action(String),
}
impl Display for Origin {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Predicate(name) => write!(f, "predicate \"{name}\""),
            Self::Action(name) => write!(f, "action \"{name}\""),
        }
    }
}





/***** LIBRARY *****/
/// Defines errors that occur when loading a [`Schema`](crate::schema::Schema) or a
/// [`Universe`](crate::universe::Universe), or when the schema turns out to misbehave while
/// deriving.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaError {
    /// A type was declared twice.
    DuplicateType { name: String },
    /// A predicate was declared twice.
    DuplicatePredicate { name: String },
    /// An action was declared twice.
    DuplicateAction { name: String },
    /// A parameter (or bound variable) was declared twice in the same signature.
    DuplicateParameter { origin: Origin, param: String },
    /// An object was declared twice.
    DuplicateObject { name: String },
    /// Something referred to a type that was never declared.
    UndeclaredType { context: String, ty: String },
    /// The type hierarchy isn't a tree.
    CyclicType { name: String },
    /// A formula referred to a predicate that was never declared.
    UndeclaredPredicate { origin: Origin, predicate: String },
    /// A predicate was used with the wrong number of arguments.
    ArityMismatch { origin: Origin, predicate: String, expected: usize, got: usize },
    /// An argument was given to a predicate slot of an incompatible type.
    IllTypedArgument { origin: Origin, predicate: String, index: usize, expected: String, got: String },
    /// A formula used a variable that isn't a parameter nor bound by a quantifier.
    FreeVariable { origin: Origin, var: String },
    /// A formula or cost expression referred to an object that isn't in the universe.
    UnknownConstant { origin: Origin, object: String },
    /// An effect tried to assert or retract a derived predicate.
    EffectOnDerived { action: String, predicate: String },
    /// An action declared more parameters than the engine supports.
    TooManyParameters { action: String, got: usize, max: usize },
    /// The given derived predicates depend negatively on each other.
    NotStratifiable { predicates: Vec<String> },
    /// A stratum did not reach its fixpoint within the maximum number of passes.
    FixpointDiverged { predicates: Vec<String>, passes: usize },
    /// A universe was combined with a schema other than the one it was built for.
    ForeignUniverse { types: usize, expected: usize },
}
impl Display for SchemaError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::DuplicateType { name } => write!(f, "Type \"{name}\" is declared more than once"),
            Self::DuplicatePredicate { name } => write!(f, "Predicate \"{name}\" is declared more than once"),
            Self::DuplicateAction { name } => write!(f, "Action \"{name}\" is declared more than once"),
            Self::DuplicateParameter { origin, param } => write!(f, "Variable \"?{param}\" is declared more than once in {origin}"),
            Self::DuplicateObject { name } => write!(f, "Object \"{name}\" is declared more than once"),
            Self::UndeclaredType { context, ty } => write!(f, "Undeclared type \"{ty}\" used in {context}"),
            Self::CyclicType { name } => write!(f, "Type \"{name}\" is its own ancestor"),
            Self::UndeclaredPredicate { origin, predicate } => write!(f, "Undeclared predicate \"{predicate}\" used in {origin}"),
            Self::ArityMismatch { origin, predicate, expected, got } => {
                write!(f, "Predicate \"{predicate}\" expects {expected} argument(s), but is given {got} in {origin}")
            },
            Self::IllTypedArgument { origin, predicate, index, expected, got } => write!(
                f,
                "Argument {} of predicate \"{predicate}\" expects a \"{expected}\", but is given a \"{got}\" in {origin}",
                index + 1
            ),
            Self::FreeVariable { origin, var } => write!(f, "Variable \"?{var}\" is not bound in {origin}"),
            Self::UnknownConstant { origin, object } => write!(f, "Unknown object \"{object}\" used in {origin}"),
            Self::EffectOnDerived { action, predicate } => {
                write!(f, "Action \"{action}\" has an effect on derived predicate \"{predicate}\"")
            },
            Self::TooManyParameters { action, got, max } => {
                write!(f, "Action \"{action}\" has {got} parameters, but at most {max} are supported")
            },
            Self::NotStratifiable { predicates } => {
                write!(f, "Derived predicates {} depend negatively on each other (not stratifiable)", FancyList(predicates))
            },
            Self::FixpointDiverged { predicates, passes } => {
                write!(f, "Derivation of {} did not reach a fixpoint within {passes} passes", FancyList(predicates))
            },
            Self::ForeignUniverse { types, expected } => write!(
                f,
                "Universe was built for a different schema (with {types} type(s)) than the one it is used with (with {expected} type(s))"
            ),
        }
    }
}
impl error::Error for SchemaError {}



/// Defines errors that occur when evaluating a [`Formula`](crate::formula::Formula) or when
/// resolving the names in a grounded action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormulaError {
    /// A variable was used without it being bound.
    UnboundVariable { var: String },
    /// A predicate was not declared in the schema.
    UnknownPredicate { name: String },
    /// An object was not declared in the universe.
    UnknownObject { name: String },
    /// A type was not declared in the schema.
    UnknownType { name: String },
    /// An action was not declared in the schema.
    UnknownAction { name: String },
    /// A predicate or action was given the wrong number of arguments.
    ArityMismatch { name: String, expected: usize, got: usize },
    /// An object of the wrong type was given to a predicate or action slot.
    IllTyped { name: String, index: usize, object: String, expected: String },
}
impl Display for FormulaError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::UnboundVariable { var } => write!(f, "Variable \"?{var}\" is not bound"),
            Self::UnknownPredicate { name } => write!(f, "Unknown predicate \"{name}\""),
            Self::UnknownObject { name } => write!(f, "Unknown object \"{name}\""),
            Self::UnknownType { name } => write!(f, "Unknown type \"{name}\""),
            Self::UnknownAction { name } => write!(f, "Unknown action \"{name}\""),
            Self::ArityMismatch { name, expected, got } => write!(f, "\"{name}\" expects {expected} argument(s), but is given {got}"),
            Self::IllTyped { name, index, object, expected } => {
                write!(f, "Argument {} of \"{name}\" expects a \"{expected}\", but object \"{object}\" is not one", index + 1)
            },
        }
    }
}
impl error::Error for FormulaError {}



/// Defines errors that occur when building a [`WorldState`](crate::state::WorldState) from facts
/// that don't fit the schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StateError {
    /// The fact's predicate was not declared.
    UnknownPredicate { name: String },
    /// One of the fact's objects was not declared.
    UnknownObject { name: String },
    /// The fact asserts a derived predicate.
    DerivedFact { predicate: String },
    /// The fact has the wrong number of arguments.
    ArityMismatch { predicate: String, expected: usize, got: usize },
    /// One of the fact's objects has the wrong type.
    IllTyped { predicate: String, index: usize, object: String, expected: String },
}
impl Display for StateError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::UnknownPredicate { name } => write!(f, "Unknown predicate \"{name}\" in fact"),
            Self::UnknownObject { name } => write!(f, "Unknown object \"{name}\" in fact"),
            Self::DerivedFact { predicate } => write!(f, "Cannot assert derived predicate \"{predicate}\" as a fact"),
            Self::ArityMismatch { predicate, expected, got } => {
                write!(f, "Predicate \"{predicate}\" expects {expected} argument(s), but fact has {got}")
            },
            Self::IllTyped { predicate, index, object, expected } => {
                write!(f, "Argument {} of predicate \"{predicate}\" expects a \"{expected}\", but object \"{object}\" is not one", index + 1)
            },
        }
    }
}
impl error::Error for StateError {}



/// Represents that an action was applied (or replayed) while its precondition does not hold.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InapplicableActionError {
    /// The grounded action, as `(name arg ...)`.
    pub action: String,
}
impl Display for InapplicableActionError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "Precondition of action {} does not hold", self.action) }
}
impl error::Error for InapplicableActionError {}



/// Defines errors that occur when computing the cost increment of an action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CostError {
    /// There is no distance between the given objects.
    MissingDistance { from: String, to: String },
    /// The increment was negative.
    Negative { action: String, value: i64 },
    /// The running total would no longer fit.
    Overflow { action: String },
}
impl Display for CostError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::MissingDistance { from, to } => write!(f, "No distance defined between \"{from}\" and \"{to}\""),
            Self::Negative { action, value } => write!(f, "Action {action} has negative cost {value}"),
            Self::Overflow { action } => write!(f, "Applying action {action} overflows the total cost"),
        }
    }
}
impl error::Error for CostError {}



/// Umbrella error for operations that may fail in more than one way.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The schema misbehaved.
    Schema(SchemaError),
    /// A formula could not be evaluated.
    Formula(FormulaError),
    /// A fact did not fit the schema.
    State(StateError),
    /// An action was not applicable.
    Inapplicable(InapplicableActionError),
    /// An action's cost could not be computed.
    Cost(CostError),
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Schema(_) => write!(f, "Schema error"),
            Self::Formula(_) => write!(f, "Failed to evaluate formula"),
            Self::State(_) => write!(f, "Invalid fact"),
            Self::Inapplicable(_) => write!(f, "Action is not applicable"),
            Self::Cost(_) => write!(f, "Failed to compute action cost"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Formula(err) => Some(err),
            Self::State(err) => Some(err),
            Self::Inapplicable(err) => Some(err),
            Self::Cost(err) => Some(err),
        }
    }
}
impl From<SchemaError> for Error {
    #[inline]
    fn from(value: SchemaError) -> Self { Self::Schema(value) }
}
impl From<FormulaError> for Error {
    #[inline]
    fn from(value: FormulaError) -> Self { Self::Formula(value) }
}
impl From<StateError> for Error {
    #[inline]
    fn from(value: StateError) -> Self { Self::State(value) }
}
impl From<InapplicableActionError> for Error {
    #[inline]
    fn from(value: InapplicableActionError) -> Self { Self::Inapplicable(value) }
}
impl From<CostError> for Error {
    #[inline]
    fn from(value: CostError) -> Self { Self::Cost(value) }
}



/// Represents that replaying a plan failed at some step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplayError {
    /// The (zero-indexed) step at which the plan failed.
    pub step: usize,
    /// The grounded action at that step, as `(name arg ...)`.
    pub action: String,
    /// What went wrong.
    pub error: Error,
}
impl Display for ReplayError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "Failed to replay step {} ({})", self.step, self.action) }
}
impl error::Error for ReplayError {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> { Some(&self.error) }
}





/***** TESTS *****/
