//! A minimal, serde-(de)serializable syntax tree.
//!
//! This is not a general Go AST. It models exactly the shapes the
//! recognition rules in [`crate::tracker`] and [`crate::analyzer`]
//! pattern-match against: assignments, returns, guarded ifs, selector
//! chains, calls, and map-literal arguments. A real front-end (outside
//! this crate's scope) is responsible for producing these nodes from
//! actual Go source.

use serde::{Deserialize, Serialize};

/// One source file's worth of top-level declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct File {
    /// File base name without extension, used for the usecase-method
    /// convention: an entry point's method name matches its file's name.
    pub name: String,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    /// A `type X interface { ... }` declaration, used by the declared
    /// error catalog.
    InterfaceType(InterfaceDecl),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    /// `Some(receiver_var_name)` for a method, `None` for a plain function.
    pub receiver: Option<String>,
    pub body: Vec<Stmt>,
}

impl FuncDecl {
    /// The key a caller's selector chain resolves through:
    /// `receiver.Method` for methods, bare `name` for functions.
    pub fn call_key(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{recv}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Assign(AssignStmt),
    Return(ReturnStmt),
    If(IfStmt),
    Expr(Expr),
    /// Any other statement shape (for, switch, block, ...). Carries no
    /// payload: unrecognized constructs are walked for nested expressions
    /// only when explicitly unpacked by a caller, never pattern-matched.
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
    /// The `else` branch, if any. An `else if` is represented as a single
    /// `Stmt::If` element, mirroring how a plain `else { ... }` block would
    /// otherwise hold a sequence of statements.
    #[serde(default)]
    pub else_body: Vec<Stmt>,
}

impl IfStmt {
    pub fn new(cond: Expr, body: Vec<Stmt>) -> Self {
        IfStmt { cond, body, else_body: Vec::new() }
    }

    pub fn with_else(cond: Expr, body: Vec<Stmt>, else_body: Vec<Stmt>) -> Self {
        IfStmt { cond, body, else_body }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Ident(String),
    /// `x.sel`
    Selector { x: Box<Expr>, sel: String },
    Call { func: Box<Expr>, args: Vec<Expr> },
    Unary { op: UnaryOp, x: Box<Expr> },
    Binary { op: BinaryOp, x: Box<Expr>, y: Box<Expr> },
    /// A map composite literal, e.g. `map[string]string{"foo": "bar"}`.
    MapLit { value_type: MapValueType, entries: Vec<(MapKey, Expr)> },
    BasicString(String),
    /// Anything else (numeric literals, struct literals, index exprs...).
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    LogicalAnd,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MapValueType {
    /// A primitive/basic type identifier, e.g. `string`.
    Basic(String),
    /// A package-qualified type, e.g. `time.Time`.
    Qualified { pkg: String, name: String },
    Unknown,
}

impl MapValueType {
    pub fn display_name(&self) -> String {
        match self {
            MapValueType::Basic(name) => name.clone(),
            MapValueType::Qualified { pkg, name } => format!("{pkg}.{name}"),
            MapValueType::Unknown => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MapKey {
    /// A string literal key, e.g. `"foo"`.
    StringLit(String),
    /// A bare identifier key (untyped constant reference).
    Ident(String),
    /// Anything else — non-literal keys are skipped rather than guessed at.
    Other,
}

/// Renders an identifier/selector chain as dotted text, e.g. `u.Providers`.
/// Anything else (calls, literals...) renders as `?`, mirroring the
/// original's catch-all `fmt.Sprintf("%T", t)` fallback.
pub fn expr_to_dotted(e: &Expr) -> String {
    match e {
        Expr::Ident(name) => name.clone(),
        Expr::Selector { x, sel } => format!("{}.{sel}", expr_to_dotted(x)),
        _ => "?".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Builder-style constructors, used heavily by tests and by hand-assembled
// fixtures where no JSON front-end is involved.
// ---------------------------------------------------------------------------

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn selector(x: Expr, sel: impl Into<String>) -> Self {
        Expr::Selector { x: Box::new(x), sel: sel.into() }
    }

    /// `errsPkg.CodeError` shorthand.
    pub fn errs_selector(pkg: impl Into<String>, sel: impl Into<String>) -> Self {
        Expr::selector(Expr::ident(pkg.into()), sel.into())
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call { func: Box::new(func), args }
    }

    pub fn not(x: Expr) -> Self {
        Expr::Unary { op: UnaryOp::Not, x: Box::new(x) }
    }

    pub fn and(x: Expr, y: Expr) -> Self {
        Expr::Binary { op: BinaryOp::LogicalAnd, x: Box::new(x), y: Box::new(y) }
    }

    /// `u.Providers.<provider>.<method>(args)`
    pub fn provider_call(
        receiver: impl Into<String>,
        provider: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Expr>,
    ) -> Self {
        let chain = Expr::selector(
            Expr::selector(Expr::ident(receiver.into()), "Providers"),
            provider.into(),
        );
        Expr::call(Expr::selector(chain, method.into()), args)
    }
}
