//! First-order formulas and terms.
//!
//! e ::= ⊥
//!     | x | f(e₁, ⋯, eₙ)
//!     | e₁ = e₂
//!     | ¬e
//!     | e₁ ∧ e₂ | e₁ ∨ e₂ | e₁ → e₂ | e₁ ↔ e₂
//!     | ∀x. e | ∃x. e
//!
//! Terms and atomic predicates share the `Id` node; which one a node is
//! depends only on where it occurs.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Bot,
    Id(Box<ExprId>),
    Equality(Box<ExprEquality>),
    Unary(Box<ExprUnary>),
    Binary(Box<ExprBinary>),
    Quantifier(Box<ExprQuantifier>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprId {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprEquality {
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprUnary {
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Imp,
    Iff,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprBinary {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierOp {
    Forall,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprQuantifier {
    pub op: QuantifierOp,
    pub var: String,
    pub body: Expr,
}

/// A parallel substitution `[x₁ ↦ t₁, ⋯, xₙ ↦ tₙ]`.
pub type Subst = [(String, Expr)];

pub fn mk_bot() -> Expr {
    Expr::Bot
}

pub fn mk_var(name: impl Into<String>) -> Expr {
    mk_app(name, vec![])
}

pub fn mk_app(name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::Id(Box::new(ExprId {
        name: name.into(),
        args,
    }))
}

pub fn mk_equality(left: Expr, right: Expr) -> Expr {
    Expr::Equality(Box::new(ExprEquality { left, right }))
}

pub fn mk_not(operand: Expr) -> Expr {
    Expr::Unary(Box::new(ExprUnary {
        op: UnaryOp::Not,
        operand,
    }))
}

pub fn mk_binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(Box::new(ExprBinary { op, left, right }))
}

pub fn mk_and(left: Expr, right: Expr) -> Expr {
    mk_binary(BinaryOp::And, left, right)
}

pub fn mk_or(left: Expr, right: Expr) -> Expr {
    mk_binary(BinaryOp::Or, left, right)
}

pub fn mk_imp(left: Expr, right: Expr) -> Expr {
    mk_binary(BinaryOp::Imp, left, right)
}

pub fn mk_iff(left: Expr, right: Expr) -> Expr {
    mk_binary(BinaryOp::Iff, left, right)
}

pub fn mk_quantifier(op: QuantifierOp, var: impl Into<String>, body: Expr) -> Expr {
    Expr::Quantifier(Box::new(ExprQuantifier {
        op,
        var: var.into(),
        body,
    }))
}

pub fn mk_forall(var: impl Into<String>, body: Expr) -> Expr {
    mk_quantifier(QuantifierOp::Forall, var, body)
}

pub fn mk_exists(var: impl Into<String>, body: Expr) -> Expr {
    mk_quantifier(QuantifierOp::Exists, var, body)
}

impl Expr {
    pub fn as_binary(&self, op: BinaryOp) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::Binary(e) if e.op == op => Some((&e.left, &e.right)),
            _ => None,
        }
    }

    pub fn as_and(&self) -> Option<(&Expr, &Expr)> {
        self.as_binary(BinaryOp::And)
    }

    pub fn as_or(&self) -> Option<(&Expr, &Expr)> {
        self.as_binary(BinaryOp::Or)
    }

    pub fn as_imp(&self) -> Option<(&Expr, &Expr)> {
        self.as_binary(BinaryOp::Imp)
    }

    pub fn as_iff(&self) -> Option<(&Expr, &Expr)> {
        self.as_binary(BinaryOp::Iff)
    }

    pub fn as_not(&self) -> Option<&Expr> {
        match self {
            Expr::Unary(e) if e.op == UnaryOp::Not => Some(&e.operand),
            _ => None,
        }
    }

    pub fn as_quantifier(&self, op: QuantifierOp) -> Option<(&str, &Expr)> {
        match self {
            Expr::Quantifier(e) if e.op == op => Some((&e.var, &e.body)),
            _ => None,
        }
    }

    pub fn as_forall(&self) -> Option<(&str, &Expr)> {
        self.as_quantifier(QuantifierOp::Forall)
    }

    pub fn as_exists(&self) -> Option<(&str, &Expr)> {
        self.as_quantifier(QuantifierOp::Exists)
    }

    pub fn as_equality(&self) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::Equality(e) => Some((&e.left, &e.right)),
            _ => None,
        }
    }

    /// Returns the name of a zero-arity identifier.
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Expr::Id(e) if e.args.is_empty() => Some(&e.name),
            _ => None,
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Expr::Id(_))
    }

    /// Substitutes every free occurrence of the variables in `subst` at once.
    pub fn subst(&self, subst: &Subst) -> Expr {
        substitute(self, subst, &mut vec![])
    }
}

/// Parallel substitution of free variables.
///
/// `bound` holds the variables bound by the quantifiers crossed so far; their
/// occurrences are left alone. No renaming is performed, so a substituted
/// term may still be captured by an enclosing binder.
pub fn substitute(expr: &Expr, subst: &Subst, bound: &mut Vec<String>) -> Expr {
    match expr {
        Expr::Bot => mk_bot(),
        Expr::Id(e) => {
            if e.args.is_empty() {
                if !bound.contains(&e.name) {
                    if let Some((_, t)) = subst.iter().find(|(x, _)| *x == e.name) {
                        return t.clone();
                    }
                }
                return expr.clone();
            }
            let args = e
                .args
                .iter()
                .map(|arg| substitute(arg, subst, bound))
                .collect();
            mk_app(e.name.clone(), args)
        }
        Expr::Equality(e) => mk_equality(
            substitute(&e.left, subst, bound),
            substitute(&e.right, subst, bound),
        ),
        Expr::Unary(e) => Expr::Unary(Box::new(ExprUnary {
            op: e.op,
            operand: substitute(&e.operand, subst, bound),
        })),
        Expr::Binary(e) => mk_binary(
            e.op,
            substitute(&e.left, subst, bound),
            substitute(&e.right, subst, bound),
        ),
        Expr::Quantifier(e) => {
            bound.push(e.var.clone());
            let body = substitute(&e.body, subst, bound);
            bound.pop();
            mk_quantifier(e.op, e.var.clone(), body)
        }
    }
}

/// Structural equality.
pub fn equal(a: &Expr, b: &Expr) -> bool {
    Matcher { rewrite: None }.matches(a, b, &mut vec![])
}

/// Equality up to rewriting: `a` equals `b` when some of the free
/// occurrences of `from` in `a` can be replaced by `to` so that the result is
/// structurally equal to `b`.
pub fn equal_modulo(a: &Expr, b: &Expr, from: &Expr, to: &Expr) -> bool {
    Matcher {
        rewrite: Some((from, to)),
    }
    .matches(a, b, &mut vec![])
}

struct Matcher<'a> {
    rewrite: Option<(&'a Expr, &'a Expr)>,
}

impl Matcher<'_> {
    fn matches(&self, a: &Expr, b: &Expr, bound: &mut Vec<String>) -> bool {
        if let Some((from, to)) = self.rewrite {
            if a == from {
                let captured = match a {
                    Expr::Id(e) => bound.contains(&e.name),
                    _ => false,
                };
                if !captured && (Matcher { rewrite: None }).matches(to, b, bound) {
                    return true;
                }
            }
        }

        match (a, b) {
            (Expr::Bot, Expr::Bot) => true,
            (Expr::Id(a), Expr::Id(b)) => {
                a.name == b.name
                    && a.args.len() == b.args.len()
                    && a.args
                        .iter()
                        .zip(&b.args)
                        .all(|(a, b)| self.matches(a, b, bound))
            }
            (Expr::Equality(a), Expr::Equality(b)) => {
                self.matches(&a.left, &b.left, bound) && self.matches(&a.right, &b.right, bound)
            }
            (Expr::Unary(a), Expr::Unary(b)) => {
                a.op == b.op && self.matches(&a.operand, &b.operand, bound)
            }
            (Expr::Binary(a), Expr::Binary(b)) => {
                a.op == b.op
                    && self.matches(&a.left, &b.left, bound)
                    && self.matches(&a.right, &b.right, bound)
            }
            (Expr::Quantifier(a), Expr::Quantifier(b)) => {
                if a.op != b.op || a.var != b.var {
                    return false;
                }
                bound.push(a.var.clone());
                let res = self.matches(&a.body, &b.body, bound);
                bound.pop();
                res
            }
            _ => false,
        }
    }
}

pub fn is_contradiction(e: &Expr) -> bool {
    matches!(e, Expr::Bot)
}

pub fn is_atom(e: &Expr) -> bool {
    matches!(e, Expr::Id(_) | Expr::Equality(_))
}

/// Whether the top connective belongs to propositional logic.
pub fn is_propositional(e: &Expr) -> bool {
    matches!(
        e,
        Expr::Bot | Expr::Id(_) | Expr::Unary(_) | Expr::Binary(_)
    )
}

/// A catamorphism over [Expr]: one combinator per node kind, children are
/// reduced before their parent.
pub trait Fold {
    type Output;

    fn bot(&mut self) -> Self::Output;
    fn equality(&mut self, left: Self::Output, right: Self::Output) -> Self::Output;
    fn id(&mut self, name: &str, args: Vec<Self::Output>) -> Self::Output;
    fn unary(&mut self, op: UnaryOp, operand: Self::Output) -> Self::Output;
    fn binary(&mut self, op: BinaryOp, left: Self::Output, right: Self::Output)
        -> Self::Output;
    fn quantifier(&mut self, op: QuantifierOp, var: &str, body: Self::Output) -> Self::Output;

    fn fold(&mut self, expr: &Expr) -> Self::Output {
        match expr {
            Expr::Bot => self.bot(),
            Expr::Id(e) => {
                let args = e.args.iter().map(|arg| self.fold(arg)).collect();
                self.id(&e.name, args)
            }
            Expr::Equality(e) => {
                let left = self.fold(&e.left);
                let right = self.fold(&e.right);
                self.equality(left, right)
            }
            Expr::Unary(e) => {
                let operand = self.fold(&e.operand);
                self.unary(e.op, operand)
            }
            Expr::Binary(e) => {
                let left = self.fold(&e.left);
                let right = self.fold(&e.right);
                self.binary(e.op, left, right)
            }
            Expr::Quantifier(e) => {
                let body = self.fold(&e.body);
                self.quantifier(e.op, &e.var, body)
            }
        }
    }
}

const PREC_QUANTIFIER: u8 = 1;
const PREC_IMP: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_ATOM: u8 = 5;

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "~",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "v",
            BinaryOp::Imp => "->",
            BinaryOp::Iff => "<->",
        }
    }

    fn prec(self) -> u8 {
        match self {
            BinaryOp::And | BinaryOp::Or => PREC_AND,
            BinaryOp::Imp | BinaryOp::Iff => PREC_IMP,
        }
    }
}

impl QuantifierOp {
    pub fn symbol(self) -> &'static str {
        match self {
            QuantifierOp::Forall => "A",
            QuantifierOp::Exists => "E",
        }
    }
}

/// Renders a formula in the ASCII syntax accepted by the parser.
struct Pretty;

fn paren((prec, doc): (u8, String), min: u8) -> String {
    if prec < min {
        format!("({doc})")
    } else {
        doc
    }
}

impl Fold for Pretty {
    type Output = (u8, String);

    fn bot(&mut self) -> Self::Output {
        (PREC_ATOM, "_|_".to_owned())
    }

    fn equality(&mut self, left: Self::Output, right: Self::Output) -> Self::Output {
        let doc = format!("{} = {}", paren(left, PREC_ATOM), paren(right, PREC_ATOM));
        (PREC_NOT, doc)
    }

    fn id(&mut self, name: &str, args: Vec<Self::Output>) -> Self::Output {
        if args.is_empty() {
            return (PREC_ATOM, name.to_owned());
        }
        let args = args
            .into_iter()
            .map(|(_, doc)| doc)
            .collect::<Vec<_>>()
            .join(", ");
        (PREC_ATOM, format!("{name}({args})"))
    }

    fn unary(&mut self, op: UnaryOp, operand: Self::Output) -> Self::Output {
        (PREC_NOT, format!("{}{}", op.symbol(), paren(operand, PREC_NOT)))
    }

    fn binary(&mut self, op: BinaryOp, left: Self::Output, right: Self::Output) -> Self::Output {
        let prec = op.prec();
        let doc = format!(
            "{} {} {}",
            paren(left, prec + 1),
            op.symbol(),
            paren(right, prec)
        );
        (prec, doc)
    }

    fn quantifier(&mut self, op: QuantifierOp, var: &str, body: Self::Output) -> Self::Output {
        let doc = format!("{}{}.{}", op.symbol(), var, paren(body, PREC_QUANTIFIER));
        (PREC_QUANTIFIER, doc)
    }
}

pub fn pretty(expr: &Expr) -> String {
    Pretty.fold(expr).1
}

pub fn pretty_subst(subst: &Subst) -> String {
    subst
        .iter()
        .map(|(x, t)| format!("{x}/{}", pretty(t)))
        .collect::<Vec<_>>()
        .join(";")
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", pretty(self))
    }
}
