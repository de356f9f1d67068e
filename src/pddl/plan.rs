//  PLAN.rs
//    by Lut99
//
//  Created:
//    11 Mar 2025, 09:31:02
//  Last edited:
//    21 Mar 2025, 11:18:47
//  Auto updated?
//    Yes
//
//  Description:
//!   Reads and writes the plans that external solvers produce.
//!
//!   A plan is one grounded action per line, e.g., `(move r1 kitchen hall)`, optionally followed
//!   by a comment like `; cost = 4 (general cost)`. Solvers tend to lowercase everything, so names
//!   are matched ignoring case.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use super::sexpr::{ParseError, ParseErrorKind, SExpr, read_all};
use crate::engine::Engine;
use crate::errors::FormulaError;
use crate::ids::{ActionId, ObjectId};
use crate::log::debug;
use crate::state::GroundAction;


/***** ERRORS *****/
/// Defines the errors that occur when reading a plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanError {
    /// Some line is not a well-formed action.
    Parse(ParseError),
    /// Some action does not fit the domain.
    Formula { line: usize, err: FormulaError },
}
impl Display for PlanError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Parse(_) => write!(f, "Failed to parse plan"),
            Self::Formula { line, .. } => write!(f, "Action on line {line} does not fit the domain"),
        }
    }
}
impl error::Error for PlanError {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Formula { err, .. } => Some(err),
        }
    }
}
impl From<ParseError> for PlanError {
    #[inline]
    fn from(value: ParseError) -> Self { Self::Parse(value) }
}





/***** HELPERS *****/
/// Finds a `cost = N` in a comment, if any.
fn parse_cost(comment: &str) -> Option<u64> {
    let lower: String = comment.to_lowercase();
    for (i, _) in lower.match_indices("cost") {
        let rest: &str = lower[i + 4..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else { continue };
        let rest: &str = rest.trim_start();
        let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())];
        if let Ok(cost) = digits.parse() {
            return Some(cost);
        }
    }
    None
}

/// Resolves one action expression.
fn resolve_action(engine: &Engine, expr: &SExpr) -> Result<GroundAction, PlanError> {
    let line: usize = expr.line();
    let items: &[SExpr] = expr.list()?;
    let Some((head, args)) = items.split_first() else {
        return Err(ParseError { line, kind: ParseErrorKind::Empty }.into());
    };
    let name: &str = head.symbol()?;
    let args: Vec<&str> = args.iter().map(SExpr::symbol).collect::<Result<_, _>>()?;

    // Resolve the names
    let action: ActionId = engine
        .schema()
        .action_id_ignore_case(name)
        .ok_or_else(|| PlanError::Formula { line, err: FormulaError::UnknownAction { name: name.into() } })?;
    let args: Vec<ObjectId> = args
        .into_iter()
        .map(|arg| {
            engine.universe().object_id_ignore_case(arg).ok_or_else(|| PlanError::Formula { line, err: FormulaError::UnknownObject { name: arg.into() } })
        })
        .collect::<Result<_, _>>()?;
    let action = GroundAction::new(action, args);
    engine.check_action(&action).map_err(|err| PlanError::Formula { line, err })?;
    Ok(action)
}





/***** LIBRARY *****/
/// A sequence of grounded actions as returned by a solver.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Plan {
    /// The actions, in order.
    pub actions: Vec<GroundAction>,
    /// The total cost the solver reported, if any.
    pub cost:    Option<u64>,
}
impl Plan {
    /// Returns a formatter that writes this plan in the same format as it is read.
    ///
    /// # Arguments
    /// - `engine`: The [`Engine`] whose names to use.
    ///
    /// # Returns
    /// A [`PlanFormatter`] that implements [`Display`].
    #[inline]
    pub fn display<'p>(&'p self, engine: &'p Engine) -> PlanFormatter<'p> { PlanFormatter { engine, plan: self } }

    /// Returns whether this plan contains the given action at least once.
    #[inline]
    pub fn uses(&self, action: ActionId) -> bool { self.actions.iter().any(|a| a.action == action) }
}

/// Writes a [`Plan`] as text.
///
/// Obtained through [`Plan::display()`].
#[derive(Clone, Copy, Debug)]
pub struct PlanFormatter<'p> {
    engine: &'p Engine,
    plan:   &'p Plan,
}
impl<'p> Display for PlanFormatter<'p> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        for action in &self.plan.actions {
            writeln!(f, "{}", self.engine.display(action))?;
        }
        if let Some(cost) = self.plan.cost {
            writeln!(f, "; cost = {cost} (general cost)")?;
        }
        Ok(())
    }
}



/// Reads a plan from solver output.
///
/// Lines starting with `(` are actions; lines starting with `;` are comments, of which the one
/// containing `cost = N` provides the reported cost. Anything else is ignored.
///
/// # Arguments
/// - `engine`: The [`Engine`] to resolve names with.
/// - `text`: The solver output.
///
/// # Returns
/// A new [`Plan`].
///
/// # Errors
/// This function errors if an action line is malformed, or if it names an unknown action or
/// object, or does not fit the action's signature.
pub fn read_plan(engine: &Engine, text: &str) -> Result<Plan, PlanError> {
    let mut plan = Plan::default();
    for (i, line) in text.lines().enumerate() {
        let line_nr: usize = i + 1;
        let trimmed: &str = line.trim();
        if let Some(comment) = trimmed.strip_prefix(';') {
            if let Some(cost) = parse_cost(comment) {
                plan.cost = Some(cost);
            }
            continue;
        } else if !trimmed.starts_with('(') {
            continue;
        }

        // Read the action
        let mut exprs: Vec<SExpr> = read_all(trimmed, line_nr)?;
        if exprs.len() > 1 {
            return Err(ParseError { line: line_nr, kind: ParseErrorKind::TrailingInput }.into());
        }
        let Some(expr) = exprs.pop() else { continue };
        plan.actions.push(resolve_action(engine, &expr)?);
    }
    debug!("Read plan of {} action(s) (reported cost: {:?})", plan.actions.len(), plan.cost);
    Ok(plan)
}





/***** TESTS *****/
#[cfg(all(test, feature = "robot"))]
mod tests {
    use super::*;
    use crate::tests::kitchen;

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost(" cost = 7 (general cost)"), Some(7));
        assert_eq!(parse_cost("Cost=12"), Some(12));
        assert_eq!(parse_cost(" no costs here"), None);
        assert_eq!(parse_cost(" cost = unknown"), None);
    }

    #[test]
    fn test_read_plan() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, _) = kitchen();
        let text = "(open-door r1 d1)\n(MOVE r1 kitchen hall)\n\n; cost = 4 (general cost)\n";
        let plan = read_plan(&engine, text).unwrap();
        assert_eq!(plan.actions, vec![
            engine.action("open-door", ["r1", "d1"]).unwrap(),
            engine.action("move", ["r1", "kitchen", "hall"]).unwrap(),
        ]);
        assert_eq!(plan.cost, Some(4));
        assert!(plan.uses(engine.schema().action_id("move").unwrap()));

        // Writing it gives the same plan back
        assert_eq!(read_plan(&engine, &plan.display(&engine).to_string()).unwrap(), plan);
    }

    #[test]
    fn test_read_plan_errors() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let (engine, _) = kitchen();
        assert_eq!(
            read_plan(&engine, "(open-door r1 d1)\n(fly r1 hall)").unwrap_err(),
            PlanError::Formula { line: 2, err: FormulaError::UnknownAction { name: "fly".into() } }
        );
        assert_eq!(
            read_plan(&engine, "(move r1 kitchen garage)").unwrap_err(),
            PlanError::Formula { line: 1, err: FormulaError::UnknownObject { name: "garage".into() } }
        );
        assert!(matches!(read_plan(&engine, "(move r1 kitchen)"), Err(PlanError::Formula { line: 1, err: FormulaError::ArityMismatch { .. } })));
        assert!(matches!(read_plan(&engine, "(move r1 kitchen hall"), Err(PlanError::Parse(ParseError { kind: ParseErrorKind::UnclosedList, .. }))));
    }
}
