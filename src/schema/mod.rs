//  MOD.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 13:41:27
//  Last edited:
//    21 Mar 2025, 13:52:10
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the static [`Schema`] of a planning domain: its type tree,
//!   predicate signatures and action schemas.
//!
//!   Schemas are built once through a [`SchemaBuilder`], which validates everything that can be
//!   validated without knowing the objects in the world. Formulas are checked for scoping, arity
//!   and typing (a variable may be given to a slot if its type is a subtype of the slot's type),
//!   and the derived predicates are [stratified](strata).
//

// Nested modules
mod strata;

// Imports
use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use indexmap::map::Entry;

use crate::errors::{Origin, SchemaError};
use crate::formula::{Atom, Binder, CostExpr, Effect, Formula, Ident, Term};
use crate::ids::{ActionId, PredicateId, TypeId};
use crate::log::debug;
use crate::universe::Universe;


/***** CONSTANTS *****/
/// The name of the implicit root of every type tree.
pub const ROOT_TYPE: &str = "object";

/// The maximum number of parameters an action schema may declare.
///
/// Grounding enumerates the Cartesian product of all parameter pools, so this bounds its
/// dimensionality.
pub const MAX_ACTION_PARAMS: usize = 8;





/***** AUXILLARY *****/
/// A declared type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDef {
    /// The name of the type.
    pub name:   Ident,
    /// Its parent in the type tree. Only [`ROOT_TYPE`] has none.
    pub parent: Option<TypeId>,
}

/// A resolved, typed parameter of a predicate or action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    /// The name of the variable (without `?`).
    pub var: Ident,
    /// Its type.
    pub ty:  TypeId,
}

/// Whether a predicate is asserted or derived.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PredicateKind {
    /// It is asserted and retracted directly.
    Base,
    /// It holds exactly when its defining formula holds over its parameters.
    Derived(Formula),
}

/// A declared predicate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PredicateDef {
    /// The name of the predicate.
    pub name:   Ident,
    /// Its typed parameters.
    pub params: Vec<Param>,
    /// Whether it's base or derived.
    pub kind:   PredicateKind,
}
impl PredicateDef {
    /// Returns whether this is a derived predicate.
    #[inline]
    pub fn is_derived(&self) -> bool { matches!(self.kind, PredicateKind::Derived(_)) }
}

/// A declared action schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionDef {
    /// The name of the action.
    pub name: Ident,
    /// Its typed parameters.
    pub params: Vec<Param>,
    /// The formula that must hold for it to be applicable.
    pub precondition: Formula,
    /// What it changes.
    pub effects: Vec<Effect>,
    /// What it costs.
    pub cost: CostExpr,
}



/// Declares an action schema for a [`SchemaBuilder`].
#[derive(Clone, Debug)]
pub struct ActionDecl {
    name: Ident,
    params: Vec<Binder>,
    precondition: Formula,
    effects: Vec<Effect>,
    cost: CostExpr,
}
impl ActionDecl {
    /// Constructor for the ActionDecl.
    ///
    /// By default, the action has a trivially true precondition, no effects and costs nothing.
    ///
    /// # Arguments
    /// - `name`: The name of the action.
    /// - `params`: Its typed parameters, e.g., `[("?r", "Robot"), ("?d", "Door")]`.
    ///
    /// # Returns
    /// A new ActionDecl.
    #[inline]
    pub fn new<B: Into<Binder>>(name: impl Into<Ident>, params: impl IntoIterator<Item = B>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            precondition: Formula::top(),
            effects: Vec::new(),
            cost: CostExpr::default(),
        }
    }

    /// Sets the precondition of the action.
    #[inline]
    pub fn precondition(mut self, precondition: Formula) -> Self {
        self.precondition = precondition;
        self
    }

    /// Adds an effect to the action.
    #[inline]
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Adds multiple effects to the action.
    #[inline]
    pub fn effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Sets the cost of the action.
    #[inline]
    pub fn cost(mut self, cost: CostExpr) -> Self {
        self.cost = cost;
        self
    }
}

/// Declares a predicate for a [`SchemaBuilder`].
#[derive(Clone, Debug)]
struct PredicateDecl {
    name: Ident,
    params: Vec<Binder>,
    definition: Option<Formula>,
}





/***** HELPERS *****/
/// Tracks the variables in scope while checking a formula.
type Scope = Vec<(Ident, TypeId)>;

/// Looks up the type of a variable in scope.
#[inline]
fn lookup<'s>(scope: &'s Scope, var: &str) -> Option<&'s TypeId> { scope.iter().rev().find(|(v, _)| v.as_str() == var).map(|(_, ty)| ty) }





/***** LIBRARY *****/
/// Builds a [`Schema`], validating it on [`SchemaBuilder::build()`].
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<(Ident, Ident)>,
    predicates: Vec<PredicateDecl>,
    actions: Vec<ActionDecl>,
}
impl SchemaBuilder {
    /// Constructor for the SchemaBuilder that initializes it empty (except for the implicit
    /// [`ROOT_TYPE`]).
    ///
    /// # Returns
    /// A new SchemaBuilder.
    #[inline]
    pub fn new() -> Self { Self::default() }

    /// Declares a new type.
    ///
    /// # Arguments
    /// - `name`: The name of the type.
    /// - `parent`: The name of its parent type. Use [`ROOT_TYPE`] for top-level types.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn ty(mut self, name: impl Into<Ident>, parent: impl Into<Ident>) -> Self {
        self.types.push((name.into(), parent.into()));
        self
    }

    /// Declares a new base predicate.
    ///
    /// # Arguments
    /// - `name`: The name of the predicate.
    /// - `params`: Its typed parameters, e.g., `[("?r", "Robot"), ("?s", "Space")]`.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn base<B: Into<Binder>>(mut self, name: impl Into<Ident>, params: impl IntoIterator<Item = B>) -> Self {
        self.predicates.push(PredicateDecl { name: name.into(), params: params.into_iter().map(Into::into).collect(), definition: None });
        self
    }

    /// Declares a new derived predicate.
    ///
    /// # Arguments
    /// - `name`: The name of the predicate.
    /// - `params`: Its typed parameters, e.g., `[("?h", "Hand")]`.
    /// - `definition`: The formula over `params` that defines when it holds. May refer to the
    ///   predicate itself (or others that refer to it), as long as it does so positively.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn derived<B: Into<Binder>>(mut self, name: impl Into<Ident>, params: impl IntoIterator<Item = B>, definition: Formula) -> Self {
        self.predicates.push(PredicateDecl {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            definition: Some(definition),
        });
        self
    }

    /// Declares a new action schema.
    #[inline]
    pub fn action(mut self, action: ActionDecl) -> Self {
        self.actions.push(action);
        self
    }

    /// Validates the declarations and builds the [`Schema`].
    ///
    /// Object constants in formulas cannot be checked yet; that happens once the schema is
    /// combined with a [`Universe`] in an [`Engine`](crate::Engine).
    ///
    /// # Returns
    /// A new [`Schema`].
    ///
    /// # Errors
    /// This function errors if any of the declarations is malformed, or if the derived predicates
    /// are not stratifiable.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut schema: Schema = Schema { types: IndexMap::new(), predicates: IndexMap::new(), actions: IndexMap::new(), strata: Vec::new() };

        // Types first; parents may be declared in any order
        schema.types.insert(Ident::new(ROOT_TYPE), TypeDef { name: Ident::new(ROOT_TYPE), parent: None });
        for (name, _) in &self.types {
            match schema.types.entry(name.clone()) {
                Entry::Occupied(_) => return Err(SchemaError::DuplicateType { name: name.to_string() }),
                Entry::Vacant(entry) => {
                    entry.insert(TypeDef { name: name.clone(), parent: None });
                },
            }
        }
        for (i, (name, parent)) in self.types.iter().enumerate() {
            let parent: TypeId = schema
                .type_id(parent)
                .ok_or_else(|| SchemaError::UndeclaredType { context: format!("type \"{name}\""), ty: parent.to_string() })?;
            // NOTE: Offset by one for the root type
            schema.types[i + 1].parent = Some(parent);
        }
        for (id, def) in schema.types.values().enumerate() {
            let mut steps: usize = 0;
            let mut current: Option<TypeId> = Some(TypeId(id));
            while let Some(ty) = current {
                if steps > schema.types.len() {
                    return Err(SchemaError::CyclicType { name: def.name.to_string() });
                }
                current = schema.types[ty.0].parent;
                steps += 1;
            }
        }

        // Then all predicate signatures, such that definitions may refer to any of them
        let mut definitions: Vec<Option<Formula>> = Vec::with_capacity(self.predicates.len());
        for decl in self.predicates {
            if schema.predicates.contains_key(decl.name.as_str()) {
                return Err(SchemaError::DuplicatePredicate { name: decl.name.to_string() });
            }
            let origin = Origin::Predicate(decl.name.to_string());
            let params: Vec<Param> = schema.resolve_params(&origin, &decl.params)?;
            schema.predicates.insert(decl.name.clone(), PredicateDef { name: decl.name, params, kind: PredicateKind::Base });
            definitions.push(decl.definition);
        }
        for (i, definition) in definitions.into_iter().enumerate() {
            let Some(definition) = definition else { continue };
            let def: &PredicateDef = &schema.predicates[i];
            let origin = Origin::Predicate(def.name.to_string());
            let mut scope: Scope = def.params.iter().map(|p| (p.var.clone(), p.ty)).collect();
            schema.check_formula(&origin, &mut scope, &definition)?;
            schema.predicates[i].kind = PredicateKind::Derived(definition);
        }

        // Then the actions
        for decl in self.actions {
            if schema.actions.contains_key(decl.name.as_str()) {
                return Err(SchemaError::DuplicateAction { name: decl.name.to_string() });
            }
            if decl.params.len() > MAX_ACTION_PARAMS {
                return Err(SchemaError::TooManyParameters { action: decl.name.to_string(), got: decl.params.len(), max: MAX_ACTION_PARAMS });
            }
            let def: ActionDef = schema.check_action(decl)?;
            schema.actions.insert(def.name.clone(), def);
        }

        // Finally, stratify
        schema.strata = strata::stratify(&schema.predicates)?;
        debug!(
            "Built schema with {} types, {} predicates, {} actions and {} strata",
            schema.types.len(),
            schema.predicates.len(),
            schema.actions.len(),
            schema.strata.len()
        );
        Ok(schema)
    }
}



/// The static description of a planning domain.
///
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct Schema {
    /// The types, with the root type at index 0.
    types: IndexMap<Ident, TypeDef>,
    /// The predicates.
    predicates: IndexMap<Ident, PredicateDef>,
    /// The action schemas.
    actions: IndexMap<Ident, ActionDef>,
    /// The strata of derived predicates, dependency-first.
    strata: Vec<Vec<PredicateId>>,
}

// Validation
impl Schema {
    /// Resolves the types of a list of parameters.
    fn resolve_params(&self, origin: &Origin, params: &[Binder]) -> Result<Vec<Param>, SchemaError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(params.len());
        let mut res: Vec<Param> = Vec::with_capacity(params.len());
        for param in params {
            if !seen.insert(param.var.as_str()) {
                return Err(SchemaError::DuplicateParameter { origin: origin.clone(), param: param.var.to_string() });
            }
            let ty: TypeId =
                self.type_id(&param.ty).ok_or_else(|| SchemaError::UndeclaredType { context: origin.to_string(), ty: param.ty.to_string() })?;
            res.push(Param { var: param.var.clone(), ty });
        }
        Ok(res)
    }

    /// Checks an atom for arity and typing of its variables.
    fn check_atom(&self, origin: &Origin, scope: &Scope, atom: &Atom) -> Result<&PredicateDef, SchemaError> {
        let def: &PredicateDef = self
            .predicates
            .get(atom.predicate.as_str())
            .ok_or_else(|| SchemaError::UndeclaredPredicate { origin: origin.clone(), predicate: atom.predicate.to_string() })?;
        if def.params.len() != atom.args.len() {
            return Err(SchemaError::ArityMismatch {
                origin:    origin.clone(),
                predicate: def.name.to_string(),
                expected:  def.params.len(),
                got:       atom.args.len(),
            });
        }
        for (i, (arg, param)) in atom.args.iter().zip(def.params.iter()).enumerate() {
            // Constants are checked when we know the universe
            let Term::Var(var) = arg else { continue };
            let ty: TypeId = *lookup(scope, var).ok_or_else(|| SchemaError::FreeVariable { origin: origin.clone(), var: var.to_string() })?;
            if !self.is_subtype(ty, param.ty) {
                return Err(SchemaError::IllTypedArgument {
                    origin:    origin.clone(),
                    predicate: def.name.to_string(),
                    index:     i,
                    expected:  self.types[param.ty.0].name.to_string(),
                    got:       self.types[ty.0].name.to_string(),
                });
            }
        }
        Ok(def)
    }

    /// Pushes the binders of a quantifier onto the scope.
    fn bind(&self, origin: &Origin, scope: &mut Scope, binders: &[Binder]) -> Result<(), SchemaError> {
        for param in self.resolve_params(origin, binders)? {
            scope.push((param.var, param.ty));
        }
        Ok(())
    }

    /// Checks a formula for scoping, arity and typing.
    fn check_formula(&self, origin: &Origin, scope: &mut Scope, formula: &Formula) -> Result<(), SchemaError> {
        match formula {
            Formula::Atom(atom) => self.check_atom(origin, scope, atom).map(|_| ()),
            Formula::Eq(lhs, rhs) => {
                for term in [lhs, rhs] {
                    if let Term::Var(var) = term {
                        if lookup(scope, var).is_none() {
                            return Err(SchemaError::FreeVariable { origin: origin.clone(), var: var.to_string() });
                        }
                    }
                }
                Ok(())
            },
            Formula::Not(formula) => self.check_formula(origin, scope, formula),
            Formula::And(formulas) | Formula::Or(formulas) => formulas.iter().try_for_each(|f| self.check_formula(origin, scope, f)),
            Formula::Exists(quant) | Formula::Forall(quant) => {
                let len: usize = scope.len();
                self.bind(origin, scope, &quant.binders)?;
                let res = self.check_formula(origin, scope, &quant.body);
                scope.truncate(len);
                res
            },
        }
    }

    /// Checks and resolves an action declaration.
    fn check_action(&self, decl: ActionDecl) -> Result<ActionDef, SchemaError> {
        let origin = Origin::Action(decl.name.to_string());
        let params: Vec<Param> = self.resolve_params(&origin, &decl.params)?;
        let mut scope: Scope = params.iter().map(|p| (p.var.clone(), p.ty)).collect();
        self.check_formula(&origin, &mut scope, &decl.precondition)?;

        for effect in &decl.effects {
            let len: usize = scope.len();
            self.bind(&origin, &mut scope, &effect.forall)?;
            if let Some(guard) = &effect.when {
                self.check_formula(&origin, &mut scope, guard)?;
            }
            let def: &PredicateDef = self.check_atom(&origin, &scope, &effect.literal.atom)?;
            if def.is_derived() {
                return Err(SchemaError::EffectOnDerived { action: decl.name.to_string(), predicate: def.name.to_string() });
            }
            scope.truncate(len);
        }

        if let CostExpr::Distance(from, to) = &decl.cost {
            for term in [from, to] {
                if let Term::Var(var) = term {
                    if lookup(&scope, var).is_none() {
                        return Err(SchemaError::FreeVariable { origin: origin.clone(), var: var.to_string() });
                    }
                }
            }
        }

        Ok(ActionDef { name: decl.name, params, precondition: decl.precondition, effects: decl.effects, cost: decl.cost })
    }

    /// Checks that the object constants in an atom exist and fit their slots.
    fn check_atom_constants(&self, universe: &Universe, origin: &Origin, atom: &Atom) -> Result<(), SchemaError> {
        // NOTE: Only called after the schema validated the atom, so the predicate exists
        let Some(def) = self.predicates.get(atom.predicate.as_str()) else { return Ok(()) };
        for (i, (arg, param)) in atom.args.iter().zip(def.params.iter()).enumerate() {
            let Term::Object(name) = arg else { continue };
            let obj = universe.object_id(name).ok_or_else(|| SchemaError::UnknownConstant { origin: origin.clone(), object: name.to_string() })?;
            let ty: TypeId = universe.type_of(obj);
            if !self.is_subtype(ty, param.ty) {
                return Err(SchemaError::IllTypedArgument {
                    origin:    origin.clone(),
                    predicate: def.name.to_string(),
                    index:     i,
                    expected:  self.types[param.ty.0].name.to_string(),
                    got:       self.types[ty.0].name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Checks that the object constants in a formula exist and fit their slots.
    fn check_formula_constants(&self, universe: &Universe, origin: &Origin, formula: &Formula) -> Result<(), SchemaError> {
        match formula {
            Formula::Atom(atom) => self.check_atom_constants(universe, origin, atom),
            Formula::Eq(lhs, rhs) => check_term_constants(universe, origin, [lhs, rhs]),
            Formula::Not(formula) => self.check_formula_constants(universe, origin, formula),
            Formula::And(formulas) | Formula::Or(formulas) => formulas.iter().try_for_each(|f| self.check_formula_constants(universe, origin, f)),
            Formula::Exists(quant) | Formula::Forall(quant) => self.check_formula_constants(universe, origin, &quant.body),
        }
    }

    /// Checks that every object constant used in this schema exists in the given universe and
    /// fits the slot it is used in.
    ///
    /// # Arguments
    /// - `universe`: The [`Universe`] to check against.
    ///
    /// # Errors
    /// This function errors with [`SchemaError::UnknownConstant`] or
    /// [`SchemaError::IllTypedArgument`] if a constant doesn't fit.
    pub fn check_constants(&self, universe: &Universe) -> Result<(), SchemaError> {
        for def in self.predicates.values() {
            if let PredicateKind::Derived(definition) = &def.kind {
                self.check_formula_constants(universe, &Origin::Predicate(def.name.to_string()), definition)?;
            }
        }
        for def in self.actions.values() {
            let origin = Origin::Action(def.name.to_string());
            self.check_formula_constants(universe, &origin, &def.precondition)?;
            for effect in &def.effects {
                if let Some(guard) = &effect.when {
                    self.check_formula_constants(universe, &origin, guard)?;
                }
                self.check_atom_constants(universe, &origin, &effect.literal.atom)?;
            }
            if let CostExpr::Distance(from, to) = &def.cost {
                check_term_constants(universe, &origin, [from, to])?;
            }
        }
        Ok(())
    }
}

// Lookup
impl Schema {
    /// Returns the names of the objects that the schema refers to directly.
    ///
    /// These are found in derived definitions, preconditions, effects and cost expressions.
    ///
    /// # Returns
    /// The names in order of first use, each once.
    pub fn constants(&self) -> IndexSet<&Ident> {
        let mut terms: Vec<&Term> = Vec::new();
        for def in self.predicates.values() {
            if let PredicateKind::Derived(definition) = &def.kind {
                definition.visit_terms(&mut |term| terms.push(term));
            }
        }
        for def in self.actions.values() {
            def.precondition.visit_terms(&mut |term| terms.push(term));
            for effect in &def.effects {
                if let Some(guard) = &effect.when {
                    guard.visit_terms(&mut |term| terms.push(term));
                }
                terms.extend(effect.literal.atom.args.iter());
            }
            if let CostExpr::Distance(from, to) = &def.cost {
                terms.extend([from, to]);
            }
        }
        terms
            .into_iter()
            .filter_map(|term| match term {
                Term::Object(name) => Some(name),
                Term::Var(_) => None,
            })
            .collect()
    }

    /// Returns the root of the type tree.
    #[inline]
    pub const fn root_type(&self) -> TypeId { TypeId(0) }

    /// Returns the identifier of the type with the given name, if any.
    #[inline]
    pub fn type_id(&self, name: &str) -> Option<TypeId> { self.types.get_index_of(name).map(TypeId) }

    /// Returns the definition of the given type.
    #[inline]
    pub fn type_def(&self, id: TypeId) -> &TypeDef { &self.types[id.0] }

    /// Returns the name of the given type.
    #[inline]
    pub fn type_name(&self, id: TypeId) -> &Ident { &self.types[id.0].name }

    /// Returns all types in declaration order (starting with [`ROOT_TYPE`]).
    #[inline]
    pub fn types(&self) -> impl '_ + ExactSizeIterator<Item = (TypeId, &TypeDef)> { self.types.values().enumerate().map(|(i, t)| (TypeId(i), t)) }

    /// Decides whether one type is (reflexively) a subtype of another.
    ///
    /// # Arguments
    /// - `sub`: The candidate subtype.
    /// - `sup`: The candidate supertype.
    ///
    /// # Returns
    /// True if `sup` is `sub` or one of its ancestors.
    #[inline]
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        let mut current: Option<TypeId> = Some(sub);
        while let Some(ty) = current {
            if ty == sup {
                return true;
            }
            current = self.types[ty.0].parent;
        }
        false
    }

    /// Returns the identifier of the predicate with the given name, if any.
    #[inline]
    pub fn predicate_id(&self, name: &str) -> Option<PredicateId> { self.predicates.get_index_of(name).map(PredicateId) }

    /// Returns the definition of the given predicate.
    ///
    /// # Panics
    /// This function panics if the identifier was not produced by this schema.
    #[inline]
    pub fn predicate(&self, id: PredicateId) -> &PredicateDef { &self.predicates[id.0] }

    /// Returns the definition of the given predicate, if the identifier is valid.
    #[inline]
    pub fn get_predicate(&self, id: PredicateId) -> Option<&PredicateDef> { self.predicates.get_index(id.0).map(|(_, def)| def) }

    /// Returns all predicates in declaration order.
    #[inline]
    pub fn predicates(&self) -> impl '_ + ExactSizeIterator<Item = (PredicateId, &PredicateDef)> {
        self.predicates.values().enumerate().map(|(i, p)| (PredicateId(i), p))
    }

    /// Returns the identifier of the action with the given name, if any.
    #[inline]
    pub fn action_id(&self, name: &str) -> Option<ActionId> { self.actions.get_index_of(name).map(ActionId) }

    /// Returns the identifier of the action with the given name, ignoring case.
    ///
    /// External solvers tend to lowercase names in their output.
    #[inline]
    pub fn action_id_ignore_case(&self, name: &str) -> Option<ActionId> {
        self.action_id(name).or_else(|| self.actions.keys().position(|n| n.eq_ignore_ascii_case(name)).map(ActionId))
    }

    /// Returns the definition of the given action.
    ///
    /// # Panics
    /// This function panics if the identifier was not produced by this schema.
    #[inline]
    pub fn action(&self, id: ActionId) -> &ActionDef { &self.actions[id.0] }

    /// Returns the definition of the given action, if the identifier is valid.
    #[inline]
    pub fn get_action(&self, id: ActionId) -> Option<&ActionDef> { self.actions.get_index(id.0).map(|(_, def)| def) }

    /// Returns all actions in declaration order.
    #[inline]
    pub fn actions(&self) -> impl '_ + ExactSizeIterator<Item = (ActionId, &ActionDef)> {
        self.actions.values().enumerate().map(|(i, a)| (ActionId(i), a))
    }

    /// Returns the strata of derived predicates, dependency-first.
    #[inline]
    pub fn strata(&self) -> &[Vec<PredicateId>] { &self.strata }
}



/// Checks that object constants in plain terms exist.
fn check_term_constants<'t>(universe: &Universe, origin: &Origin, terms: impl IntoIterator<Item = &'t Term>) -> Result<(), SchemaError> {
    for term in terms {
        if let Term::Object(name) = term {
            if universe.object_id(name).is_none() {
                return Err(SchemaError::UnknownConstant { origin: origin.clone(), object: name.to_string() });
            }
        }
    }
    Ok(())
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    /// Makes a builder with a small type tree.
    fn types() -> SchemaBuilder {
        SchemaBuilder::new().ty("Location", ROOT_TYPE).ty("Space", "Location").ty("Door", "Location").ty("Robot", ROOT_TYPE)
    }


    #[test]
    fn test_types() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let schema: Schema = types().build().unwrap();
        let loc = schema.type_id("Location").unwrap();
        let space = schema.type_id("Space").unwrap();
        let robot = schema.type_id("Robot").unwrap();
        assert_eq!(schema.type_def(space).parent, Some(loc));
        assert!(schema.is_subtype(space, loc));
        assert!(schema.is_subtype(space, schema.root_type()));
        assert!(schema.is_subtype(space, space));
        assert!(!schema.is_subtype(loc, space));
        assert!(!schema.is_subtype(robot, loc));

        // Parents may come later
        let schema: Schema = SchemaBuilder::new().ty("Space", "Location").ty("Location", ROOT_TYPE).build().unwrap();
        assert!(schema.is_subtype(schema.type_id("Space").unwrap(), schema.type_id("Location").unwrap()));
    }

    #[test]
    fn test_type_errors() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        assert_eq!(types().ty("Space", ROOT_TYPE).build().unwrap_err(), SchemaError::DuplicateType { name: "Space".into() });
        assert_eq!(SchemaBuilder::new().ty(ROOT_TYPE, ROOT_TYPE).build().unwrap_err(), SchemaError::DuplicateType { name: ROOT_TYPE.into() });
        assert!(matches!(types().ty("Stairs", "Portal").build(), Err(SchemaError::UndeclaredType { ty, .. }) if ty == "Portal"));
        assert!(matches!(SchemaBuilder::new().ty("A", "B").ty("B", "A").build(), Err(SchemaError::CyclicType { .. })));
        assert!(matches!(types().base("at", [("?r", "Robot"), ("?s", "Room")]).build(), Err(SchemaError::UndeclaredType { ty, .. }) if ty == "Room"));
    }

    #[test]
    fn test_predicate_errors() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let base = || types().base("at", [("?r", "Robot"), ("?s", "Space")]).base("path", [("?a", "Location"), ("?b", "Location")]);

        assert_eq!(base().base("at", [("?r", "Robot")]).build().unwrap_err(), SchemaError::DuplicatePredicate { name: "at".into() });
        assert!(matches!(
            types().base("path", [("?a", "Location"), ("?a", "Location")]).build(),
            Err(SchemaError::DuplicateParameter { param, .. }) if param == "a"
        ));
        assert!(matches!(
            base().derived("here", [("?r", "Robot")], Formula::atom("there", ["?r"])).build(),
            Err(SchemaError::UndeclaredPredicate { predicate, .. }) if predicate == "there"
        ));
        assert!(matches!(
            base().derived("here", [("?r", "Robot")], Formula::atom("at", ["?r"])).build(),
            Err(SchemaError::ArityMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            base().derived("here", [("?r", "Robot")], Formula::atom("at", ["?r", "?s"])).build(),
            Err(SchemaError::FreeVariable { var, .. }) if var == "s"
        ));
        // A location is not necessarily a space
        assert!(matches!(
            base().derived("here", [("?r", "Robot"), ("?l", "Location")], Formula::atom("at", ["?r", "?l"])).build(),
            Err(SchemaError::IllTypedArgument { index: 1, expected, got, .. }) if expected == "Space" && got == "Location"
        ));
        // ...but a space is a location
        assert!(
            base()
                .derived("linked", [("?a", "Space"), ("?b", "Space")], Formula::exists([("?d", "Door")], Formula::and([
                    Formula::atom("path", ["?a", "?d"]),
                    Formula::atom("path", ["?d", "?b"])
                ])))
                .build()
                .is_ok()
        );
        // Quantified variables go out of scope
        assert!(matches!(
            base()
                .derived(
                    "here",
                    [("?r", "Robot")],
                    Formula::and([Formula::exists([("?s", "Space")], Formula::atom("at", ["?r", "?s"])), Formula::atom("at", ["?r", "?s"])])
                )
                .build(),
            Err(SchemaError::FreeVariable { var, .. }) if var == "s"
        ));
    }

    #[test]
    fn test_action_errors() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let base = || {
            types()
                .base("at", [("?r", "Robot"), ("?s", "Space")])
                .derived("placed", [("?r", "Robot")], Formula::exists([("?s", "Space")], Formula::atom("at", ["?r", "?s"])))
        };

        let err = base().action(ActionDecl::new("teleport", [("?r", "Robot")]).effect(Effect::add("placed", ["?r"]))).build().unwrap_err();
        assert_eq!(err, SchemaError::EffectOnDerived { action: "teleport".into(), predicate: "placed".into() });

        let err = base()
            .action(ActionDecl::new("go", [("?r", "Robot"), ("?to", "Space")]).cost(CostExpr::distance("?from", "?to")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::FreeVariable { var, .. } if var == "from"));

        let err = base()
            .action(ActionDecl::new("go", [("?r", "Robot")]))
            .action(ActionDecl::new("go", [("?r", "Robot")]))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateAction { name: "go".into() });

        let params: Vec<(String, &str)> = (0..=MAX_ACTION_PARAMS).map(|i| (format!("?s{i}"), "Space")).collect();
        let err = base().action(ActionDecl::new("wide", params)).build().unwrap_err();
        assert_eq!(err, SchemaError::TooManyParameters { action: "wide".into(), got: MAX_ACTION_PARAMS + 1, max: MAX_ACTION_PARAMS });

        // Quantified effect variables are in scope for the guard and the literal only
        let schema = base()
            .action(ActionDecl::new("evict", [("?r", "Robot")]).effect(
                Effect::del("at", ["?r", "?s"]).when(Formula::atom("at", ["?r", "?s"])).forall([("?s", "Space")]),
            ))
            .build()
            .unwrap();
        assert_eq!(schema.actions().len(), 1);
    }

    #[test]
    fn test_strata() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let schema = types()
            .base("path", [("?a", "Space"), ("?b", "Space")])
            .derived(
                "reach",
                [("?a", "Space"), ("?b", "Space")],
                Formula::or([
                    Formula::atom("path", ["?a", "?b"]),
                    Formula::exists([("?m", "Space")], Formula::and([Formula::atom("path", ["?a", "?m"]), Formula::atom("reach", ["?m", "?b"])])),
                ]),
            )
            .derived("stuck", [("?a", "Space")], Formula::not(Formula::exists([("?b", "Space")], Formula::atom("reach", ["?a", "?b"]))))
            .build()
            .unwrap();
        let reach = schema.predicate_id("reach").unwrap();
        let stuck = schema.predicate_id("stuck").unwrap();
        assert_eq!(schema.strata(), &[vec![reach], vec![stuck]]);
    }

    #[test]
    fn test_not_stratifiable() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        // Direct negative recursion
        let err = types()
            .derived("odd", [("?s", "Space")], Formula::not(Formula::atom("odd", ["?s"])))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::NotStratifiable { predicates: vec!["odd".into()] });

        // Through another predicate; quantifiers don't flip polarity but `not` does
        let err = types()
            .derived("a", [("?s", "Space")], Formula::forall([("?t", "Space")], Formula::atom("b", ["?t"])))
            .derived("b", [("?s", "Space")], Formula::not(Formula::exists([("?t", "Space")], Formula::atom("a", ["?t"]))))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::NotStratifiable { predicates: vec!["a".into(), "b".into()] });

        // Double negation is positive
        assert!(
            types()
                .derived("a", [("?s", "Space")], Formula::not(Formula::not(Formula::atom("a", ["?s"]))))
                .build()
                .is_ok()
        );
    }
}
