//  SEXPR.rs
//    by Lut99
//
//  Created:
//    10 Mar 2025, 10:02:37
//  Last edited:
//    18 Mar 2025, 17:21:05
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a small reader for the s-expressions that planning-domain
//!   texts consist of.
//!
//!   Comments start with `;` and run to the end of the line. Everything that is not whitespace, a
//!   parenthesis or a comment is part of a symbol.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use nom::branch::alt;
use nom::bytes::complete::{is_not, take_while1};
use nom::character::complete::{char as pchar, multispace1};
use nom::combinator::{map, opt, value};
use nom::multi::many0;
use nom::sequence::pair;
use nom::IResult;


/***** CONSTANTS *****/
/// The maximum number of lists that may be nested in one another.
pub const MAX_DEPTH: usize = 256;





/***** ERRORS *****/
/// Describes what went wrong in a [`ParseError`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// A list was opened but never closed.
    UnclosedList,
    /// A list was closed that was never opened.
    UnexpectedClose,
    /// There was no expression at all.
    Empty,
    /// There was more than the one expected expression.
    TrailingInput,
    /// Expected a list, but got a symbol.
    ExpectedList { got: String },
    /// Expected a symbol, but got a list.
    ExpectedSymbol,
    /// Expected a variable (`?x`), but got something else.
    ExpectedVariable { got: String },
    /// A connective or quantifier got the wrong number of arguments.
    Arity { what: String, expected: usize, got: usize },
    /// A typed list ended in a dangling `-`.
    DanglingType,
    /// Lists were nested more deeply than [`MAX_DEPTH`].
    TooDeep { max: usize },
    /// Some input could not be read as a token.
    InvalidToken { got: String },
}
impl Display for ParseErrorKind {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::UnclosedList => write!(f, "Unclosed list"),
            Self::UnexpectedClose => write!(f, "Unexpected ')'"),
            Self::Empty => write!(f, "Expected an expression, found nothing"),
            Self::TrailingInput => write!(f, "Unexpected input after expression"),
            Self::ExpectedList { got } => write!(f, "Expected a list, found symbol \"{got}\""),
            Self::ExpectedSymbol => write!(f, "Expected a symbol, found a list"),
            Self::ExpectedVariable { got } => write!(f, "Expected a variable, found \"{got}\""),
            Self::Arity { what, expected, got } => write!(f, "\"{what}\" expects {expected} argument(s), found {got}"),
            Self::DanglingType => write!(f, "Expected a type name after '-'"),
            Self::TooDeep { max } => write!(f, "Lists are nested more than {max} levels deep"),
            Self::InvalidToken { got } => write!(f, "Unexpected input \"{got}\""),
        }
    }
}

/// Represents that planning-domain text is malformed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    /// The (one-indexed) line where the problem is.
    pub line: usize,
    /// What the problem is.
    pub kind: ParseErrorKind,
}
impl Display for ParseError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{} (line {})", self.kind, self.line) }
}
impl error::Error for ParseError {}





/***** HELPERS *****/
/// The tokens that s-expressions consist of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Token<'t> {
    /// `(`
    Open,
    /// `)`
    Close,
    /// Anything else that is not whitespace or a comment.
    Symbol(&'t str),
}



/// Skips whitespace and `;`-comments.
fn trivia(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((value((), multispace1), value((), pair(pchar(';'), opt(is_not("\n"))))))))(input)
}

/// Reads one token.
fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::Open, pchar('(')),
        value(Token::Close, pchar(')')),
        map(take_while1(|c: char| !c.is_whitespace() && c != '(' && c != ')' && c != ';'), Token::Symbol),
    ))(input)
}

/// Reads the next token after any trivia.
///
/// # Arguments
/// - `input`: The text still to read.
/// - `line`: The line at the start of `input`. Advanced to the line of the returned token.
///
/// # Returns
/// The remaining input and the token (or [`None`] at the end).
fn next_token<'t>(input: &'t str, line: &mut usize) -> Result<(&'t str, Option<Token<'t>>), ParseError> {
    let invalid = |rest: &str, line: usize| ParseError {
        line,
        kind: ParseErrorKind::InvalidToken { got: rest.split_whitespace().next().unwrap_or_default().to_string() },
    };
    let (rest, ()) = trivia(input).map_err(|_| invalid(input, *line))?;
    *line += input[..input.len() - rest.len()].matches('\n').count();
    let (rest, tok) = opt(token)(rest).map_err(|_| invalid(rest, *line))?;
    Ok((rest, tok))
}





/***** LIBRARY *****/
/// A parsed s-expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SExpr {
    /// A bare symbol, e.g., `?x` or `isOpen`.
    Symbol { text: String, line: usize },
    /// A parenthesized list.
    List { items: Vec<SExpr>, line: usize },
}
impl SExpr {
    /// Returns the line on which this expression starts.
    #[inline]
    pub fn line(&self) -> usize {
        match self {
            Self::Symbol { line, .. } | Self::List { line, .. } => *line,
        }
    }

    /// Returns this expression as a symbol.
    ///
    /// # Errors
    /// This function errors if it's a list.
    #[inline]
    pub fn symbol(&self) -> Result<&str, ParseError> {
        match self {
            Self::Symbol { text, .. } => Ok(text),
            Self::List { line, .. } => Err(ParseError { line: *line, kind: ParseErrorKind::ExpectedSymbol }),
        }
    }

    /// Returns this expression as a list.
    ///
    /// # Errors
    /// This function errors if it's a symbol.
    #[inline]
    pub fn list(&self) -> Result<&[SExpr], ParseError> {
        match self {
            Self::List { items, .. } => Ok(items),
            Self::Symbol { text, line } => Err(ParseError { line: *line, kind: ParseErrorKind::ExpectedList { got: text.clone() } }),
        }
    }
}
impl Display for SExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Symbol { text, .. } => write!(f, "{text}"),
            Self::List { items, .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            },
        }
    }
}



/// Reads all top-level expressions in a text.
///
/// # Arguments
/// - `text`: The text to read, starting at line `first_line`.
/// - `first_line`: The (one-indexed) line number of the start of `text`, used in errors.
///
/// # Returns
/// A list of [`SExpr`]s.
///
/// # Errors
/// This function errors if the parentheses in the text are unbalanced, or if lists are nested
/// more than [`MAX_DEPTH`] levels deep.
pub fn read_all(text: &str, first_line: usize) -> Result<Vec<SExpr>, ParseError> {
    let mut res: Vec<SExpr> = Vec::new();
    // The lists that are still open, with the line they started on
    let mut open: Vec<(Vec<SExpr>, usize)> = Vec::new();
    let mut rest: &str = text;
    let mut line: usize = first_line;
    loop {
        let (next, tok) = next_token(rest, &mut line)?;
        rest = next;
        let expr: SExpr = match tok {
            Some(Token::Open) => {
                if open.len() >= MAX_DEPTH {
                    return Err(ParseError { line, kind: ParseErrorKind::TooDeep { max: MAX_DEPTH } });
                }
                open.push((Vec::new(), line));
                continue;
            },
            Some(Token::Close) => match open.pop() {
                Some((items, line)) => SExpr::List { items, line },
                None => return Err(ParseError { line, kind: ParseErrorKind::UnexpectedClose }),
            },
            Some(Token::Symbol(text)) => SExpr::Symbol { text: text.to_string(), line },
            None => match open.pop() {
                Some((_, line)) => return Err(ParseError { line, kind: ParseErrorKind::UnclosedList }),
                None => return Ok(res),
            },
        };

        // Add it to the innermost open list, or to the result if there is none
        match open.last_mut() {
            Some((items, _)) => items.push(expr),
            None => res.push(expr),
        }
    }
}

/// Reads exactly one expression from a text.
///
/// # Errors
/// This function errors if the parentheses in the text are unbalanced, or if there is not
/// exactly one expression.
pub fn read_one(text: &str) -> Result<SExpr, ParseError> {
    let mut exprs: Vec<SExpr> = read_all(text, 1)?;
    match exprs.len() {
        0 => Err(ParseError { line: 1, kind: ParseErrorKind::Empty }),
        1 => Ok(exprs.swap_remove(0)),
        _ => Err(ParseError { line: exprs[1].line(), kind: ParseErrorKind::TrailingInput }),
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read() {
        let exprs = read_all("; header\n(a ?b (c))  ; trailing\nd", 1).unwrap();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0].to_string(), "(a ?b (c))");
        assert_eq!(exprs[0].line(), 2);
        assert_eq!(exprs[1].symbol().unwrap(), "d");
        assert_eq!(exprs[1].line(), 3);
        assert_eq!(read_one("()").unwrap().list().unwrap().len(), 0);
        assert_eq!(read_one("(is-open d1)").unwrap().list().unwrap()[0].symbol().unwrap(), "is-open");
    }

    #[test]
    fn test_read_errors() {
        assert_eq!(read_one("(a (b)").unwrap_err(), ParseError { line: 1, kind: ParseErrorKind::UnclosedList });
        assert_eq!(read_one("a)").unwrap_err(), ParseError { line: 1, kind: ParseErrorKind::UnexpectedClose });
        assert_eq!(read_one(")").unwrap_err(), ParseError { line: 1, kind: ParseErrorKind::UnexpectedClose });
        assert_eq!(read_one("  ; nothing").unwrap_err(), ParseError { line: 1, kind: ParseErrorKind::Empty });
        assert_eq!(read_one("a\nb").unwrap_err(), ParseError { line: 2, kind: ParseErrorKind::TrailingInput });
        assert!(matches!(read_one("a").unwrap().list(), Err(ParseError { kind: ParseErrorKind::ExpectedList { .. }, .. })));
    }

    #[test]
    fn test_read_depth() {
        // Exactly at the limit is fine
        let text: String = format!("{}{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let mut expr: &SExpr = &read_one(&text).unwrap();
        for _ in 1..MAX_DEPTH {
            expr = &expr.list().unwrap()[0];
        }
        assert!(expr.list().unwrap().is_empty());

        // One more is not, and neither is a flood of unclosed lists
        let text: String = format!("{}{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(read_one(&text).unwrap_err(), ParseError { line: 1, kind: ParseErrorKind::TooDeep { max: MAX_DEPTH } });
        assert_eq!(read_all(&"(".repeat(200_000), 1).unwrap_err(), ParseError { line: 1, kind: ParseErrorKind::TooDeep { max: MAX_DEPTH } });
        assert_eq!(read_all("(a\n(b", 4).unwrap_err(), ParseError { line: 5, kind: ParseErrorKind::UnclosedList });
    }
}
