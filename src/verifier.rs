//! Step-by-step verification of a flattened proof.

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::expr::{BinaryOp, Expr, Fold, QuantifierOp, UnaryOp};
use crate::lex::{is_identifier, SourceInfo};
use crate::proof::{preprocess, Node, Proof};
use crate::rules::{lookup, RuleKind, Side};

/// Restrictions applied to every sentence of a proof.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Reject quantifiers, equality and applied symbols.
    pub propositional: bool,
    /// Whitespace separated `id/arity` declarations, e.g. `"b/3 c/0 A/2"`.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub valid: bool,
    pub message: String,
    /// 1-based.
    pub error_step: Option<usize>,
    pub error_loc: Option<SourceInfo>,
    pub remaining_sorries: usize,
}

impl Report {
    fn new() -> Self {
        Report {
            valid: true,
            message: "Proof is valid.".to_owned(),
            error_step: None,
            error_loc: None,
            remaining_sorries: 0,
        }
    }

    fn fail(&mut self, message: String, step: Option<usize>, loc: Option<SourceInfo>) {
        self.valid = false;
        self.message = message;
        self.error_step = step.map(|step| step + 1);
        self.error_loc = loc;
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error_step {
            Some(step) => write!(f, "Step {}: {}", step, self.message)?,
            None => write!(f, "{}", self.message)?,
        }
        if let Some(loc) = &self.error_loc {
            write!(f, "\n{}", loc)?;
        }
        if self.remaining_sorries > 0 {
            write!(f, "\n{} sorry step(s) remaining.", self.remaining_sorries)?;
        }
        Ok(())
    }
}

/// Raised when the rule table cannot serve a well-formed request. This is a
/// bug in the table, not a fault of the proof.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifierError {
    #[error("rule {rule} has no {side} check")]
    MissingSide { rule: &'static str, side: Side },
    #[error("rule {rule} has no check")]
    MissingVerifier { rule: &'static str },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("`{0}` has no arity, expected the form id/arity")]
    MissingArity(String),
    #[error("`{0}` has an invalid arity")]
    InvalidArity(String),
    #[error("`{0}` is declared more than once")]
    Duplicate(String),
    #[error("`{0}` is not an identifier")]
    InvalidIdentifier(String),
}

/// Declared arities of predicate and function symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    arities: HashMap<String, usize>,
}

impl Signature {
    pub fn arity(&self, name: &str) -> Option<usize> {
        self.arities.get(name).copied()
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut arities = HashMap::new();
        for decl in s.split_whitespace() {
            let (name, arity) = decl
                .split_once('/')
                .ok_or_else(|| SignatureError::MissingArity(decl.to_owned()))?;
            if !is_identifier(name) {
                return Err(SignatureError::InvalidIdentifier(name.to_owned()));
            }
            let arity = arity
                .parse::<usize>()
                .map_err(|_| SignatureError::InvalidArity(decl.to_owned()))?;
            if arities.insert(name.to_owned(), arity).is_some() {
                return Err(SignatureError::Duplicate(name.to_owned()));
            }
        }
        Ok(Signature { arities })
    }
}

type Check = Result<(), String>;

struct PropositionalCheck;

impl Fold for PropositionalCheck {
    type Output = Check;

    fn bot(&mut self) -> Check {
        Ok(())
    }

    fn equality(&mut self, left: Check, right: Check) -> Check {
        left.and(right)?;
        Err("Propositional logic: equality is not allowed.".to_owned())
    }

    fn id(&mut self, name: &str, args: Vec<Check>) -> Check {
        if !args.is_empty() {
            return Err(format!(
                "Propositional logic: {} must be a propositional variable, but is applied to {} argument(s).",
                name,
                args.len()
            ));
        }
        Ok(())
    }

    fn unary(&mut self, _op: UnaryOp, operand: Check) -> Check {
        operand
    }

    fn binary(&mut self, _op: BinaryOp, left: Check, right: Check) -> Check {
        left.and(right)
    }

    fn quantifier(&mut self, op: QuantifierOp, var: &str, _body: Check) -> Check {
        Err(format!(
            "Propositional logic: quantifier {}{}. is not allowed.",
            op.symbol(),
            var
        ))
    }
}

struct SignatureCheck<'a> {
    signature: &'a Signature,
}

impl Fold for SignatureCheck<'_> {
    type Output = Check;

    fn bot(&mut self) -> Check {
        Ok(())
    }

    fn equality(&mut self, left: Check, right: Check) -> Check {
        left.and(right)
    }

    fn id(&mut self, name: &str, args: Vec<Check>) -> Check {
        let used = args.len();
        args.into_iter().collect::<Check>()?;
        match self.signature.arity(name) {
            Some(declared) if declared != used => Err(format!(
                "Signature: {name} is declared with arity {declared}, but used with arity {used}."
            )),
            None if used > 0 => Err(format!(
                "Signature: {name} is not declared, but used with arity {used}."
            )),
            _ => Ok(()),
        }
    }

    fn unary(&mut self, _op: UnaryOp, operand: Check) -> Check {
        operand
    }

    fn binary(&mut self, _op: BinaryOp, left: Check, right: Check) -> Check {
        left.and(right)
    }

    fn quantifier(&mut self, _op: QuantifierOp, _var: &str, body: Check) -> Check {
        body
    }
}

struct Verifier<'a> {
    proof: &'a Proof,
    propositional: bool,
    signature: Option<Signature>,
    premise_allowed: bool,
    remaining_sorries: usize,
}

impl Verifier<'_> {
    fn restrictions(&self, sentence: &Expr) -> Check {
        if self.propositional {
            PropositionalCheck.fold(sentence)?;
        }
        if let Some(signature) = &self.signature {
            SignatureCheck { signature }.fold(sentence)?;
        }
        Ok(())
    }

    /// The outer error is a broken rule table, the inner one an invalid step.
    fn step(&mut self, step: usize) -> Result<Check, VerifierError> {
        let proof = self.proof;
        let stmt = &proof.steps[step];
        if let Some(error) = &stmt.syntax_error {
            log::debug!("step {}: syntax error: {}", step + 1, error);
            return Ok(Err("Proof invalid due to syntax errors.".to_owned()));
        }
        log::debug!(
            "step {}: {} by {}",
            step + 1,
            stmt.sentence,
            stmt.justification
        );

        if let Err(message) = self.restrictions(&stmt.sentence) {
            return Ok(Err(message));
        }

        let justification = &stmt.justification;
        let name = justification.rule_name();
        if name == "premise" {
            if !self.premise_allowed {
                return Ok(Err(
                    "Introducing premises is only allowed at the start of a proof.".to_owned(),
                ));
            }
        } else {
            self.premise_allowed = false;
        }
        if name == "sorry" {
            self.remaining_sorries += 1;
        }

        let Some(rule) = lookup(&name) else {
            return Ok(Err(format!("Cannot find rule: {name}")));
        };
        let justifier = match rule.kind {
            RuleKind::Simple | RuleKind::Derived => rule
                .verifier
                .as_ref()
                .ok_or(VerifierError::MissingVerifier { rule: rule.name })?,
            RuleKind::Normal => {
                let Some(selector) = &justification.selector else {
                    return Ok(Err(format!("Unrecognized rule: {justification}")));
                };
                let Some(side) = Side::from_selector(selector) else {
                    return Ok(Err(format!(
                        "Cannot determine elim/intro rule type from {}",
                        selector.to_lowercase()
                    )));
                };
                rule.side(side).ok_or(VerifierError::MissingSide {
                    rule: rule.name,
                    side,
                })?
            }
        };
        Ok(justifier.exec(proof, step, justification))
    }
}

pub fn verify(proof: &Proof, options: &Options) -> Result<Report, VerifierError> {
    let mut report = Report::new();

    let signature = match options.signature.as_deref().map(str::parse).transpose() {
        Ok(signature) => signature,
        Err(err) => {
            report.fail(format!("Invalid signature restriction: {err}"), None, None);
            return Ok(report);
        }
    };

    let mut verifier = Verifier {
        proof,
        propositional: options.propositional,
        signature,
        premise_allowed: true,
        remaining_sorries: 0,
    };
    for step in 0..proof.len() {
        let result = verifier.step(step)?;
        report.remaining_sorries = verifier.remaining_sorries;
        if let Err(message) = result {
            log::debug!("step {} failed: {}", step + 1, message);
            report.fail(message, Some(step), proof.steps[step].loc.clone());
            break;
        }
    }
    Ok(report)
}

pub fn verify_from_ast(ast: &[Node], options: &Options) -> Result<Report, VerifierError> {
    verify(&preprocess(ast), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{mk_app, mk_equality, mk_forall, mk_imp, mk_var};
    use crate::proof::{mk_box, mk_error, mk_rule, Justification};

    fn premise(e: Expr) -> Node {
        mk_rule(e, Justification::new("premise"))
    }

    fn run(ast: &[Node]) -> Report {
        verify_from_ast(ast, &Options::default()).unwrap()
    }

    #[test]
    fn modus_ponens() {
        let ast = [
            premise(mk_imp(mk_var("a"), mk_var("b"))),
            premise(mk_var("a")),
            mk_rule(
                mk_var("b"),
                Justification::new("->").with_selector("e").with_refs(["1", "2"]),
            ),
        ];
        let report = run(&ast);
        assert!(report.valid, "{}", report.message);
        assert_eq!(report.message, "Proof is valid.");
        assert_eq!(report.error_step, None);
    }

    #[test]
    fn failures_carry_the_step_number() {
        let ast = [
            premise(mk_imp(mk_var("a"), mk_var("b"))),
            premise(mk_var("c")),
            mk_rule(
                mk_var("b"),
                Justification::new("->").with_selector("e").with_refs(["1", "2"]),
            ),
        ];
        let report = run(&ast);
        assert!(!report.valid);
        assert_eq!(report.error_step, Some(3));
        assert_eq!(
            report.message,
            "Implies-Elim: The implication's left side does not match the referenced step."
        );
    }

    #[test]
    fn premises_only_at_the_start() {
        let ast = [
            premise(mk_var("a")),
            mk_rule(mk_var("a"), Justification::new("copy").with_refs(["1"])),
            premise(mk_var("b")),
        ];
        let report = run(&ast);
        assert!(!report.valid);
        assert_eq!(report.error_step, Some(3));
        assert_eq!(
            report.message,
            "Introducing premises is only allowed at the start of a proof."
        );
    }

    #[test]
    fn sorries_are_counted_but_accepted() {
        let ast = [
            premise(mk_var("a")),
            mk_rule(mk_var("b"), Justification::new("sorry")),
            mk_rule(mk_var("c"), Justification::new("Sorry")),
        ];
        let report = run(&ast);
        assert!(report.valid);
        assert_eq!(report.remaining_sorries, 2);

        let ast = [
            mk_rule(mk_var("b"), Justification::new("sorry")),
            mk_rule(mk_var("c"), Justification::new("copy").with_refs(["1"])),
            mk_rule(mk_var("d"), Justification::new("sorry")),
        ];
        let report = run(&ast);
        assert!(!report.valid);
        assert_eq!(report.error_step, Some(2));
        assert_eq!(report.remaining_sorries, 1);
    }

    #[test]
    fn syntax_errors_stop_verification() {
        let ast = [premise(mk_var("a")), mk_error("bad"), premise(mk_var("b"))];
        let report = run(&ast);
        assert!(!report.valid);
        assert_eq!(report.message, "Proof invalid due to syntax errors.");
        assert_eq!(report.error_step, Some(2));
    }

    #[test]
    fn unknown_rules_and_selectors() {
        let report = run(&[mk_rule(mk_var("a"), Justification::new("magic"))]);
        assert_eq!(report.message, "Cannot find rule: magic");

        let ast = [
            premise(mk_var("a")),
            premise(mk_var("b")),
            mk_rule(
                mk_and_ab(),
                Justification::new("and").with_refs(["1", "2"]),
            ),
        ];
        let report = run(&ast);
        assert_eq!(report.message, "Unrecognized rule: and 1,2");

        let ast = [
            premise(mk_var("a")),
            premise(mk_var("b")),
            mk_rule(
                mk_and_ab(),
                Justification::new("and").with_selector("x").with_refs(["1", "2"]),
            ),
        ];
        let report = run(&ast);
        assert_eq!(report.message, "Cannot determine elim/intro rule type from x");

        let ast = [
            premise(mk_var("a")),
            premise(mk_var("b")),
            mk_rule(
                mk_and_ab(),
                Justification::new("AND").with_selector("Intro").with_refs(["1", "2"]),
            ),
        ];
        assert!(run(&ast).valid);
    }

    fn mk_and_ab() -> Expr {
        crate::expr::mk_and(mk_var("a"), mk_var("b"))
    }

    #[test]
    fn unwired_side_is_an_internal_error() {
        let ast = [
            premise(crate::expr::mk_bot()),
            mk_rule(
                mk_var("a"),
                Justification::new("bot").with_selector("i").with_refs(["1"]),
            ),
        ];
        assert_eq!(
            verify_from_ast(&ast, &Options::default()),
            Err(VerifierError::MissingSide {
                rule: "⊥",
                side: Side::Introduction
            })
        );
    }

    #[test]
    fn propositional_restriction() {
        let options = Options {
            propositional: true,
            signature: None,
        };
        let ok = [premise(mk_imp(mk_var("a"), mk_var("b")))];
        assert!(verify_from_ast(&ok, &options).unwrap().valid);

        let px = mk_app("P", vec![mk_var("x")]);
        let report = verify_from_ast(&[premise(mk_forall("x", px.clone()))], &options).unwrap();
        assert_eq!(report.message, "Propositional logic: quantifier Ax. is not allowed.");
        assert_eq!(report.error_step, Some(1));

        let report = verify_from_ast(&[premise(px)], &options).unwrap();
        assert!(!report.valid);

        let eq = mk_equality(mk_var("a"), mk_var("b"));
        let report = verify_from_ast(&[premise(eq)], &options).unwrap();
        assert_eq!(report.message, "Propositional logic: equality is not allowed.");
    }

    #[test]
    fn signature_restriction() {
        let options = Options {
            propositional: false,
            signature: Some("P/1 f/2 c/0".to_owned()),
        };
        let good = mk_app("P", vec![mk_app("f", vec![mk_var("c"), mk_var("x")])]);
        assert!(verify_from_ast(&[premise(good)], &options).unwrap().valid);

        let report = verify_from_ast(&[premise(mk_app("Q", vec![mk_var("c")]))], &options).unwrap();
        assert_eq!(report.message, "Signature: Q is not declared, but used with arity 1.");

        let report = verify_from_ast(&[premise(mk_app("f", vec![mk_var("c")]))], &options).unwrap();
        assert_eq!(
            report.message,
            "Signature: f is declared with arity 2, but used with arity 1."
        );

        let report = verify_from_ast(&[premise(mk_app("P", vec![mk_app("c", vec![mk_var("x")])]))], &options).unwrap();
        assert_eq!(
            report.message,
            "Signature: c is declared with arity 0, but used with arity 1."
        );
    }

    #[test]
    fn malformed_signatures() {
        assert_eq!("b/3 c/0 A/2".parse::<Signature>().unwrap().arity("A"), Some(2));
        assert_eq!(
            "b".parse::<Signature>(),
            Err(SignatureError::MissingArity("b".to_owned()))
        );
        assert_eq!(
            "b/x".parse::<Signature>(),
            Err(SignatureError::InvalidArity("b/x".to_owned()))
        );
        assert_eq!(
            "b/1 b/2".parse::<Signature>(),
            Err(SignatureError::Duplicate("b".to_owned()))
        );

        let options = Options {
            propositional: false,
            signature: Some("b/1 b".to_owned()),
        };
        let report = verify_from_ast(&[premise(mk_var("a"))], &options).unwrap();
        assert!(!report.valid);
        assert_eq!(report.error_step, None);
        assert!(report.message.starts_with("Invalid signature restriction"));
    }

    #[test]
    fn verification_is_repeatable() {
        let ast = [
            premise(mk_var("a")),
            mk_box(vec![mk_rule(mk_var("b"), Justification::new("hypothesis"))]),
            mk_rule(mk_var("b"), Justification::new("copy").with_refs(["2"])),
        ];
        let first = run(&ast);
        let second = run(&ast);
        assert!(!first.valid);
        assert_eq!(first, second);
    }
}
