//  GOAL.rs
//    by Lut99
//
//  Created:
//    10 Mar 2025, 11:14:50
//  Last edited:
//    18 Mar 2025, 17:40:12
//  Auto updated?
//    Yes
//
//  Description:
//!   Reads goal formulas written as planning-domain s-expressions.
//!
//!   Supported are atoms, `(= a b)`, `(not φ)`, `(and ...)`, `(or ...)`, `(imply φ ψ)` and
//!   `(exists|forall (?x - T ...) φ)`. Untyped variables in binder lists have the root type.
//

use super::sexpr::{ParseError, ParseErrorKind, SExpr, read_one};
use crate::formula::{Atom, Binder, Formula, Term};
use crate::schema::ROOT_TYPE;


/***** HELPERS *****/
/// Builds an arity error.
#[inline]
fn arity(line: usize, what: &str, expected: usize, got: usize) -> ParseError {
    ParseError { line, kind: ParseErrorKind::Arity { what: what.into(), expected, got } }
}

/// Parses a symbol as a [`Term`].
#[inline]
fn term(expr: &SExpr) -> Result<Term, ParseError> {
    let text: &str = expr.symbol()?;
    if text.starts_with('?') { Ok(Term::var(text)) } else { Ok(Term::object(text)) }
}

/// Parses a typed variable list, e.g., `(?a ?b - Space ?h - Hand ?x)`.
pub(crate) fn binders(expr: &SExpr) -> Result<Vec<Binder>, ParseError> {
    let items: &[SExpr] = expr.list()?;
    let mut res: Vec<Binder> = Vec::with_capacity(items.len());
    let mut pending: Vec<&str> = Vec::new();
    let mut i: usize = 0;
    while i < items.len() {
        let text: &str = items[i].symbol()?;
        if text == "-" {
            let Some(ty) = items.get(i + 1) else {
                return Err(ParseError { line: items[i].line(), kind: ParseErrorKind::DanglingType });
            };
            let ty: &str = ty.symbol()?;
            res.extend(pending.drain(..).map(|var| Binder::new(var, ty)));
            i += 2;
            continue;
        }
        if !text.starts_with('?') {
            return Err(ParseError { line: items[i].line(), kind: ParseErrorKind::ExpectedVariable { got: text.into() } });
        }
        pending.push(text);
        i += 1;
    }
    res.extend(pending.drain(..).map(|var| Binder::new(var, ROOT_TYPE)));
    Ok(res)
}





/***** LIBRARY *****/
/// Converts an already-read s-expression into a [`Formula`].
///
/// # Arguments
/// - `expr`: The [`SExpr`] to convert.
///
/// # Returns
/// The [`Formula`] it encodes. Names are not resolved; that happens when it is evaluated.
///
/// # Errors
/// This function errors if the expression is not a well-formed formula.
pub fn formula(expr: &SExpr) -> Result<Formula, ParseError> {
    let items: &[SExpr] = expr.list()?;
    let line: usize = expr.line();
    let Some((head, args)) = items.split_first() else {
        // `()` is the empty conjunction
        return Ok(Formula::top());
    };
    let head: &str = head.symbol()?;
    match head {
        "and" => Ok(Formula::And(args.iter().map(formula).collect::<Result<_, _>>()?)),
        "or" => Ok(Formula::Or(args.iter().map(formula).collect::<Result<_, _>>()?)),
        "not" => match args {
            [arg] => Ok(Formula::not(formula(arg)?)),
            _ => Err(arity(line, head, 1, args.len())),
        },
        "imply" => match args {
            [lhs, rhs] => Ok(Formula::or([Formula::not(formula(lhs)?), formula(rhs)?])),
            _ => Err(arity(line, head, 2, args.len())),
        },
        "=" => match args {
            [lhs, rhs] => Ok(Formula::Eq(term(lhs)?, term(rhs)?)),
            _ => Err(arity(line, head, 2, args.len())),
        },
        "exists" | "forall" => match args {
            [vars, body] => {
                let binders: Vec<Binder> = binders(vars)?;
                let body: Formula = formula(body)?;
                Ok(if head == "exists" { Formula::exists(binders, body) } else { Formula::forall(binders, body) })
            },
            _ => Err(arity(line, head, 2, args.len())),
        },
        _ => Ok(Formula::Atom(Atom { predicate: head.into(), args: args.iter().map(term).collect::<Result<_, _>>()? })),
    }
}

/// Reads a goal formula from text.
///
/// # Arguments
/// - `text`: The text to read. Must contain exactly one formula.
///
/// # Returns
/// The [`Formula`] read.
///
/// # Errors
/// This function errors if the text is not exactly one well-formed formula.
///
/// # Example
/// ```rust
/// use roboplan::formula::Formula;
/// use roboplan::pddl::read_formula;
///
/// let goal = read_formula("(and (isOpen fridge) (not (isON lamp)))").unwrap();
/// assert_eq!(goal, Formula::and([Formula::atom("isOpen", ["fridge"]), Formula::not(Formula::atom("isON", ["lamp"]))]));
/// ```
#[inline]
pub fn read_formula(text: &str) -> Result<Formula, ParseError> { formula(&read_one(text)?) }





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_formula() {
        assert_eq!(read_formula("(isOpen fridge)").unwrap(), Formula::atom("isOpen", ["fridge"]));
        assert_eq!(read_formula("()").unwrap(), Formula::top());
        assert_eq!(read_formula("(= ?a b)").unwrap(), Formula::equal(Term::var("a"), Term::object("b")));
        assert_eq!(
            read_formula("(exists (?h1 ?h2 - Hand ?x) (and (isHeldBy cup ?h1) (not (= ?h1 ?h2))))").unwrap(),
            Formula::exists(
                [("?h1", "Hand"), ("?h2", "Hand"), ("?x", ROOT_TYPE)],
                Formula::and([Formula::atom("isHeldBy", ["cup", "?h1"]), Formula::not(Formula::equal("?h1", "?h2"))])
            )
        );
        assert_eq!(
            read_formula("(imply (isON lamp) (isOpen fridge))").unwrap(),
            Formula::or([Formula::not(Formula::atom("isON", ["lamp"])), Formula::atom("isOpen", ["fridge"])])
        );

        // Displaying and reading again gives the same formula
        let goal = Formula::forall(
            [("?a", "Artifact")],
            Formula::or([Formula::not(Formula::atom("isON", ["?a"])), Formula::atom("artifactIsInSpace", ["?a", "kitchen"])]),
        );
        assert_eq!(read_formula(&goal.to_string()).unwrap(), goal);
    }

    #[test]
    fn test_read_formula_errors() {
        assert!(matches!(read_formula("(not a b)"), Err(ParseError { kind: ParseErrorKind::Arity { expected: 1, got: 2, .. }, .. })));
        assert!(matches!(read_formula("(exists (?a -) (p ?a))"), Err(ParseError { kind: ParseErrorKind::DanglingType, .. })));
        assert!(matches!(read_formula("(exists (a) (p ?a))"), Err(ParseError { kind: ParseErrorKind::ExpectedVariable { .. }, .. })));
        assert!(matches!(read_formula("isOpen"), Err(ParseError { kind: ParseErrorKind::ExpectedList { .. }, .. })));
        assert!(matches!(read_formula("((p) a)"), Err(ParseError { kind: ParseErrorKind::ExpectedSymbol, .. })));
    }
}
