//! Abstract syntax tree for tunefile forms.

/// A parsed tunefile expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare name, resolved against the environment when evaluated.
    /// Examples: `name`, `depends-on`, `pkg-url`
    Symbol(String),

    /// A double-quoted string literal.
    Str(String),

    /// A numeric literal such as `3` or `1.5`.
    Number(f64),

    /// `true` or `false`.
    Bool(bool),

    /// `nil`
    Nil,

    /// A parenthesized form.
    /// Example: `(url "https://example.com/foo-1.0.tar.gz")`
    List(Vec<Expr>),
}

impl Expr {
    /// Returns the symbol name if this is a Symbol, None otherwise.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list if this is a List, None otherwise.
    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Nil => write!(f, "nil"),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
