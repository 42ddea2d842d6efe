//! Minimal S-expression parser for tunefiles.
//!
//! Parses source like:
//! ```lisp
//! (name "zlib")
//! (version "1.3.1")
//! (url "https://zlib.net/zlib-1.3.1.tar.gz")
//! (checksum "f535367b1a11e2f9ac3bec723fb007fbc0d189e5")
//! (depends-on "make" "gcc")
//! ```

use crate::ast::Expr;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected ')' at line {line}, column {column}")]
    UnexpectedClose { line: usize, column: usize },
    #[error("unclosed string starting at line {line}, column {column}")]
    UnclosedString { line: usize, column: usize },
    #[error("unclosed list starting at line {line}, column {column}")]
    UnclosedList { line: usize, column: usize },
    #[error("invalid number '{atom}' at line {line}, column {column}")]
    InvalidNumber {
        atom: String,
        line: usize,
        column: usize,
    },
    #[error("lists nested deeper than {} levels at line {line}, column {column}", MAX_DEPTH)]
    TooDeep { line: usize, column: usize },
}

/// Deepest list nesting accepted.
pub const MAX_DEPTH: usize = 256;

/// Parse a whole tunefile into its top-level forms.
pub fn parse(input: &str) -> Result<Vec<Expr>, ParseError> {
    let mut cursor = Cursor::new(input);
    let mut forms = Vec::new();

    loop {
        cursor.skip_whitespace_and_comments();
        match cursor.peek() {
            None => return Ok(forms),
            Some(')') => {
                return Err(ParseError::UnexpectedClose {
                    line: cursor.line,
                    column: cursor.column,
                });
            }
            Some(_) => forms.push(parse_expr(&mut cursor)?),
        }
    }
}

/// Tracks line/column so errors point at the offending input.
struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.next();
            }
            // Line comments start with ';'
            if self.peek() == Some(';') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.next();
                }
            } else {
                break;
            }
        }
    }
}

fn parse_expr(cursor: &mut Cursor<'_>) -> Result<Expr, ParseError> {
    match cursor.peek() {
        Some('(') => parse_list(cursor),
        Some('"') => parse_string(cursor),
        _ => parse_atom(cursor),
    }
}

fn parse_list(cursor: &mut Cursor<'_>) -> Result<Expr, ParseError> {
    let (line, column) = (cursor.line, cursor.column);
    if cursor.depth >= MAX_DEPTH {
        return Err(ParseError::TooDeep { line, column });
    }
    cursor.next(); // consume '('
    cursor.depth += 1;
    let mut items = Vec::new();

    loop {
        cursor.skip_whitespace_and_comments();
        match cursor.peek() {
            None => return Err(ParseError::UnclosedList { line, column }),
            Some(')') => {
                cursor.next();
                cursor.depth -= 1;
                return Ok(Expr::List(items));
            }
            Some(_) => items.push(parse_expr(cursor)?),
        }
    }
}

fn parse_string(cursor: &mut Cursor<'_>) -> Result<Expr, ParseError> {
    let (line, column) = (cursor.line, cursor.column);
    cursor.next(); // consume opening '"'
    let mut s = String::new();

    loop {
        match cursor.next() {
            None => return Err(ParseError::UnclosedString { line, column }),
            Some('"') => return Ok(Expr::Str(s)),
            Some('\\') => match cursor.next() {
                Some('n') => s.push('\n'),
                Some('t') => s.push('\t'),
                Some('\\') => s.push('\\'),
                Some('"') => s.push('"'),
                Some(c) => {
                    s.push('\\');
                    s.push(c);
                }
                None => return Err(ParseError::UnclosedString { line, column }),
            },
            Some(c) => s.push(c),
        }
    }
}

/// Atoms are never empty here: the caller has already ruled out
/// whitespace, '(', ')', '"' and ';'.
fn parse_atom(cursor: &mut Cursor<'_>) -> Result<Expr, ParseError> {
    let (line, column) = (cursor.line, cursor.column);
    let mut s = String::new();

    while let Some(c) = cursor.peek() {
        if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';') {
            break;
        }
        s.push(c);
        cursor.next();
    }

    Ok(match s.as_str() {
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        "nil" => Expr::Nil,
        _ if looks_numeric(&s) => match parse_number(&s) {
            Some(n) => Expr::Number(n),
            None => {
                return Err(ParseError::InvalidNumber {
                    atom: s,
                    line,
                    column,
                });
            }
        },
        _ => Expr::Symbol(s),
    })
}

/// An optional sign followed by a digit, or by '.' and a digit.
/// `-`, `inf` and `NaN` stay symbols.
fn looks_numeric(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Plain decimal literals only; exponents and hex are rejected.
fn parse_number(s: &str) -> Option<f64> {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    if !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Expr {
        let mut forms = parse(input).unwrap();
        assert_eq!(forms.len(), 1, "expected one form in {:?}", input);
        forms.remove(0)
    }

    #[test]
    fn test_symbol() {
        assert_eq!(parse_one("foo"), Expr::Symbol("foo".into()));
        assert_eq!(parse_one("depends-on"), Expr::Symbol("depends-on".into()));
    }

    #[test]
    fn test_string() {
        assert_eq!(parse_one(r#""hello""#), Expr::Str("hello".into()));
    }

    #[test]
    fn test_string_with_escape() {
        assert_eq!(
            parse_one(r#""hello\nworld \"q\"""#),
            Expr::Str("hello\nworld \"q\"".into())
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_one("42"), Expr::Number(42.0));
        assert_eq!(parse_one("-1.5"), Expr::Number(-1.5));
        assert_eq!(parse_one("true"), Expr::Bool(true));
        assert_eq!(parse_one("false"), Expr::Bool(false));
        assert_eq!(parse_one("nil"), Expr::Nil);
    }

    #[test]
    fn test_sign_and_words_stay_symbols() {
        assert_eq!(parse_one("-"), Expr::Symbol("-".into()));
        assert_eq!(parse_one("-foo"), Expr::Symbol("-foo".into()));
        assert_eq!(parse_one("inf"), Expr::Symbol("inf".into()));
        assert_eq!(parse_one(".hidden"), Expr::Symbol(".hidden".into()));
        assert_eq!(parse_one(".5"), Expr::Number(0.5));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        for atom in ["1..2", "-1.2.3", "1.2.3", "2nd", "0x10", "1e5"] {
            let err = parse(&format!("(version {})", atom)).unwrap_err();
            assert_eq!(
                err,
                ParseError::InvalidNumber {
                    atom: atom.to_string(),
                    line: 1,
                    column: 10
                }
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let err = parse(&"(".repeat(100_000)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TooDeep {
                line: 1,
                column
            } if column == MAX_DEPTH + 1
        ));

        let ok = format!("{}{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&ok).unwrap().len(), 1);
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            parse_one("(foo (bar \"baz\"))"),
            Expr::List(vec![
                Expr::Symbol("foo".into()),
                Expr::List(vec![Expr::Symbol("bar".into()), Expr::Str("baz".into())])
            ])
        );
    }

    #[test]
    fn test_multiple_forms_and_comments() {
        let forms = parse("; header\n(name \"a\") ; trailing\n(version \"1\")\n").unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].as_list().map(|l| &l[0]), Some(&Expr::Symbol("name".into())));
        assert_eq!(forms[1].as_list().map(|l| &l[0]), Some(&Expr::Symbol("version".into())));
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  ; only a comment").unwrap().is_empty());
    }

    #[test]
    fn test_unclosed_list_reports_position() {
        let err = parse("(name \"a\")\n  (url \"x\"").unwrap_err();
        assert_eq!(err, ParseError::UnclosedList { line: 2, column: 3 });
    }

    #[test]
    fn test_unexpected_close() {
        let err = parse("(name \"a\"))").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedClose { line: 1, .. }));
    }

    #[test]
    fn test_unclosed_string() {
        let err = parse("(name \"abc)").unwrap_err();
        assert_eq!(err, ParseError::UnclosedString { line: 1, column: 7 });
    }
}
