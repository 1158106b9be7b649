//! The rule table.
//!
//! Each entry pairs a parameter shape with the check deciding whether a step
//! follows from the steps it references. Checks report a failing step with a
//! message naming the rule; they never panic on a well-formed proof.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::expr::{equal, equal_modulo, is_atom, is_contradiction, mk_imp, pretty_subst, Expr};
use crate::justifier::{Justifier, ParamSpec, Params, Part, RefKind};
use crate::proof::{Proof, ScopeFrame};

macro_rules! reject {
    ($($arg:tt)*) => {
        return Err(format!($($arg)*))
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Bookkeeping lines: premises, hypotheses, ...
    Simple,
    /// Rules derivable from the others, with a single check.
    Derived,
    /// Rules with separate introduction and elimination checks.
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Introduction,
    Elimination,
}

impl Side {
    /// Accepts any prefix of `introduction` / `elimination`, e.g. `i`, `elim`.
    pub fn from_selector(selector: &str) -> Option<Side> {
        let selector = selector.to_lowercase();
        if selector.is_empty() {
            None
        } else if "introduction".starts_with(&selector) {
            Some(Side::Introduction)
        } else if "elimination".starts_with(&selector) {
            Some(Side::Elimination)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Introduction => write!(f, "introduction"),
            Side::Elimination => write!(f, "elimination"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub kind: RuleKind,
    pub verifier: Option<Justifier>,
    pub introduction: Option<Justifier>,
    pub elimination: Option<Justifier>,
}

impl Rule {
    fn single(name: &'static str, kind: RuleKind, verifier: Justifier) -> Self {
        Rule {
            name,
            kind,
            verifier: Some(verifier),
            introduction: None,
            elimination: None,
        }
    }

    fn normal(
        name: &'static str,
        introduction: Option<Justifier>,
        elimination: Option<Justifier>,
    ) -> Self {
        Rule {
            name,
            kind: RuleKind::Normal,
            verifier: None,
            introduction,
            elimination,
        }
    }

    pub fn side(&self, side: Side) -> Option<&Justifier> {
        match side {
            Side::Introduction => self.introduction.as_ref(),
            Side::Elimination => self.elimination.as_ref(),
        }
    }
}

const NUM: &[RefKind] = &[RefKind::Num];
const NUM_NUM: &[RefKind] = &[RefKind::Num, RefKind::Num];
const RANGE: &[RefKind] = &[RefKind::Range];
const NUM_RANGE: &[RefKind] = &[RefKind::Num, RefKind::Range];
const NUM_RANGE_RANGE: &[RefKind] = &[RefKind::Num, RefKind::Range, RefKind::Range];
const NUM_NUMS: &[RefKind] = &[RefKind::Num, RefKind::Nums];

static RULES: Lazy<HashMap<&'static str, Rule>> = Lazy::new(|| {
    use RuleKind::*;

    let j = Justifier::new;
    let none = ParamSpec::NONE;
    let refs = ParamSpec::refs;

    HashMap::from([
        ("with", Rule::single("Var. Assum.", Simple, j(none, var_assumption))),
        ("premise", Rule::single("Premise", Simple, j(none, always))),
        ("sorry", Rule::single("Sorry", Simple, j(none, always))),
        ("hypothesis", Rule::single("Hypothesis", Simple, j(none, hypothesis))),
        ("lem", Rule::single("LEM", Derived, j(none, lem))),
        ("copy", Rule::single("Copy", Derived, j(refs(NUM), copy))),
        ("assum", Rule::single("Assum.", Derived, j(refs(NUM), assum))),
        ("mt", Rule::single("MT", Derived, j(refs(NUM_NUM), modus_tollens))),
        ("contra", Rule::single("Contra", Derived, j(refs(RANGE), contra))),
        (
            "b",
            Rule::single("B", Derived, j(refs(NUM_NUMS).with_subst(), backchain)),
        ),
        ("bot", Rule::normal("⊥", None, Some(j(refs(NUM), bot_elim)))),
        ("notnot", Rule::normal("DN", None, Some(j(refs(NUM), notnot_elim)))),
        (
            "->",
            Rule::normal(
                "→",
                Some(j(refs(RANGE), imp_intro)),
                Some(j(refs(NUM_NUM), imp_elim)),
            ),
        ),
        (
            "and",
            Rule::normal(
                "∧",
                Some(j(refs(NUM_NUM), and_intro)),
                Some(j(refs(NUM).with_part(), and_elim)),
            ),
        ),
        (
            "or",
            Rule::normal(
                "∨",
                Some(j(refs(NUM).with_part(), or_intro)),
                Some(j(refs(NUM_RANGE_RANGE), or_elim)),
            ),
        ),
        (
            "neg",
            Rule::normal(
                "¬",
                Some(j(refs(RANGE), neg_intro)),
                Some(j(refs(NUM_NUM), neg_elim)),
            ),
        ),
        (
            "<->",
            Rule::normal(
                "↔",
                Some(j(refs(NUM_NUM), iff_intro)),
                Some(j(refs(NUM).with_part(), iff_elim)),
            ),
        ),
        (
            "a",
            Rule::normal(
                "∀",
                Some(j(refs(RANGE).with_subst(), forall_intro)),
                Some(j(refs(NUM).with_subst(), forall_elim)),
            ),
        ),
        (
            "e",
            Rule::normal(
                "∃",
                Some(j(refs(NUM).with_subst(), exists_intro)),
                Some(j(refs(NUM_RANGE).with_subst(), exists_elim)),
            ),
        ),
        (
            "=",
            Rule::normal(
                "=",
                Some(j(none, eq_intro)),
                Some(j(refs(NUM_NUM), eq_elim)),
            ),
        ),
    ])
});

/// Alternative spellings, mostly the symbols proofs are rendered with.
const ALIASES: &[(&str, &str)] = &[
    ("∧", "and"),
    ("&", "and"),
    ("∨", "or"),
    ("v", "or"),
    ("¬", "neg"),
    ("~", "neg"),
    ("not", "neg"),
    ("→", "->"),
    ("↔", "<->"),
    ("∀", "a"),
    ("forall", "a"),
    ("∃", "e"),
    ("exists", "e"),
    ("⊥", "bot"),
    ("_|_", "bot"),
    ("dn", "notnot"),
];

/// Finds a rule by name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static Rule> {
    let name = name.to_lowercase();
    let key = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name.as_str(), |(_, key)| *key);
    RULES.get(key)
}

fn always(_proof: &Proof, _step: usize, _params: &Params) -> Result<(), String> {
    Ok(())
}

fn var_assumption(proof: &Proof, step: usize, _params: &Params) -> Result<(), String> {
    let stmt = &proof.steps[step];
    if !stmt.is_first || stmt.boxes.is_empty() {
        reject!("Var. Assum.: 'with' can only open an assumption box.");
    }
    let Some(var) = stmt.scope.last().and_then(ScopeFrame::fresh_var) else {
        reject!("Var. Assum.: The box does not introduce a fresh variable.");
    };
    if stmt.sentence.as_var() != Some(var) {
        reject!(
            "Var. Assum.: Step must name the fresh variable {var}, but got {} instead.",
            stmt.sentence
        );
    }
    Ok(())
}

fn hypothesis(proof: &Proof, step: usize, _params: &Params) -> Result<(), String> {
    let stmt = &proof.steps[step];
    let after_with = step > 0 && {
        let prev = &proof.steps[step - 1];
        prev.is_first && prev.opens_fresh_scope() && prev.boxes == stmt.boxes
    };
    if stmt.is_first || after_with {
        return Ok(());
    }
    reject!("Hypotheses can only be made at the start of an assumption box.")
}

fn lem(proof: &Proof, step: usize, _params: &Params) -> Result<(), String> {
    let Some((left, right)) = proof.sentence(step).as_or() else {
        reject!("LEM: must be phi or not phi.");
    };
    match right.as_not() {
        Some(neg) if equal(left, neg) => Ok(()),
        _ => reject!("LEM: right side must be negation of left."),
    }
}

fn copy(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    if !equal(proof.sentence(step), proof.sentence(params.num(0))) {
        reject!("Copy: Current step is not semantically equal to the referenced step.");
    }
    Ok(())
}

fn assum(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    if !equal(proof.sentence(step), proof.sentence(params.num(0))) {
        reject!("Assum: Current step is not semantically equal to the referenced step.");
    }
    Ok(())
}

fn modus_tollens(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((left, right)) = proof.sentence(params.num(0)).as_imp() else {
        reject!("MT: 1st referenced step must be implication.");
    };
    match proof.sentence(params.num(1)).as_not() {
        Some(neg) if equal(neg, right) => {}
        _ => reject!("MT: 2nd ref step must be negation of right side of 1st ref step."),
    }
    match proof.sentence(step).as_not() {
        Some(neg) if equal(left, neg) => Ok(()),
        _ => reject!("MT: current step must be negation of left side of ref step."),
    }
}

fn contra(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let range = params.range(0);
    if !is_contradiction(proof.sentence(range.1)) {
        reject!("Contra: Final step in range must be a contradiction.");
    }
    let Some(neg) = proof.assumption(range).and_then(Expr::as_not) else {
        reject!("Contra: Hypothesis is not a negation. Might you be thinking of not-introduction?");
    };
    if !equal(neg, proof.sentence(step)) {
        reject!("Contra: Negation of assumption doesn't match current step.");
    }
    Ok(())
}

fn bot_elim(proof: &Proof, _step: usize, params: &Params) -> Result<(), String> {
    let reference = proof.sentence(params.num(0));
    if !is_contradiction(reference) {
        reject!("Bot-Elim: Referenced step is not absurdity, but got {reference} instead.");
    }
    Ok(())
}

fn notnot_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let reference = proof.sentence(params.num(0));
    let Some(inner) = reference.as_not().and_then(Expr::as_not) else {
        reject!("Notnot-Elim: Referenced step is not a double-negation, but got {reference} instead.");
    };
    if !equal(inner, proof.sentence(step)) {
        reject!("Notnot-Elim: Does not result in current step.");
    }
    Ok(())
}

fn imp_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let range = params.range(0);
    let current = proof.sentence(step);
    let Some((left, right)) = current.as_imp() else {
        reject!("Implies-Intro: Current step is not an implication, but got {current} instead.");
    };
    let Some(assumption) = proof.assumption(range) else {
        reject!("Implies-Intro: The box opened at step {} has no assumption.", range.0 + 1);
    };
    log::debug!(
        "->-intro: assumption {} result {}",
        assumption,
        proof.sentence(range.1)
    );
    if !equal(left, assumption) {
        reject!("Implies-Intro: The left side does not match the assumption.");
    }
    if !equal(right, proof.sentence(range.1)) {
        reject!("Implies-Intro: The result does not match the right side.");
    }
    Ok(())
}

fn imp_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((left, right)) = proof.sentence(params.num(0)).as_imp() else {
        reject!("Implies-Elim: Step {} is not an implication.", params.num(0) + 1);
    };
    if !equal(left, proof.sentence(params.num(1))) {
        reject!("Implies-Elim: The implication's left side does not match the referenced step.");
    }
    if !equal(right, proof.sentence(step)) {
        reject!("Implies-Elim: The left side does not imply this result.");
    }
    Ok(())
}

fn and_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let current = proof.sentence(step);
    let Some((left, right)) = current.as_and() else {
        reject!("And-Intro: Current step is not an 'and'-expression, but got {current} instead.");
    };
    if !equal(left, proof.sentence(params.num(0))) {
        reject!("And-Intro: Left side doesn't match referenced step.");
    }
    if !equal(right, proof.sentence(params.num(1))) {
        reject!("And-Intro: Right side doesn't match referenced step.");
    }
    Ok(())
}

fn and_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((left, right)) = proof.sentence(params.num(0)).as_and() else {
        reject!("And-Elim: Referenced step is not an 'and' expression.");
    };
    let part = params.part();
    if !equal(part.pick(left, right), proof.sentence(step)) {
        reject!("And-Elim: In referenced line, side {part} does not match current step.");
    }
    Ok(())
}

fn or_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((left, right)) = proof.sentence(step).as_or() else {
        reject!("Or-Intro: Current step is not an 'or'-expression.");
    };
    let part = params.part();
    if !equal(part.pick(left, right), proof.sentence(params.num(0))) {
        reject!("Or-Intro: Side {part} doesn't match referenced step.");
    }
    Ok(())
}

fn or_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((left, right)) = proof.sentence(params.num(0)).as_or() else {
        reject!("Or-Elim: First referenced step is not an 'or'-expression.");
    };
    let (first, second) = (params.range(1), params.range(2));
    match proof.assumption(first) {
        Some(assumption) if equal(left, assumption) => {}
        _ => reject!("Or-Elim: First range intro doesn't match left side of 'or'."),
    }
    match proof.assumption(second) {
        Some(assumption) if equal(right, assumption) => {}
        _ => reject!("Or-Elim: Second range intro doesn't match right side of 'or'."),
    }
    let conclusion = proof.sentence(first.1);
    if !equal(conclusion, proof.sentence(second.1)) {
        reject!("Or-Elim: Step range conclusions don't match.");
    }
    if !equal(conclusion, proof.sentence(step)) {
        reject!("Or-Elim: Current step doesn't match step range conclusions.");
    }
    Ok(())
}

fn neg_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let range = params.range(0);
    if !is_contradiction(proof.sentence(range.1)) {
        reject!("Neg-Intro: Final step in range must be absurdity.");
    }
    let Some(inner) = proof.sentence(step).as_not() else {
        reject!("Neg-Intro: Current step is not a negation. Might you be thinking of Contra?");
    };
    match proof.assumption(range) {
        Some(assumption) if equal(assumption, inner) => Ok(()),
        _ => reject!("Neg-Intro: Negation of assumption doesn't match current step."),
    }
}

fn neg_elim(proof: &Proof, _step: usize, params: &Params) -> Result<(), String> {
    let first = proof.sentence(params.num(0));
    let second = proof.sentence(params.num(1));
    let refutes = |neg: &Expr, other: &Expr| neg.as_not().map(|inner| equal(inner, other));
    match (refutes(first, second), refutes(second, first)) {
        (None, None) => {
            reject!("Neg-Elim: Neither referenced proof step is a 'not' expression.")
        }
        (Some(true), _) | (_, Some(true)) => Ok(()),
        _ => reject!("Neg-Elim: Subexpression in not-expr does not match other expr."),
    }
}

fn iff_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let current = proof.sentence(step);
    let Some((left, right)) = current.as_iff() else {
        reject!("Bi-Implication-Intro: Current step is not an '<->'-expression, but got {current} instead.");
    };
    let forward = mk_imp(left.clone(), right.clone());
    let backward = mk_imp(right.clone(), left.clone());
    let first = proof.sentence(params.num(0));
    if !equal(&forward, first) {
        reject!("Bi-Implication-Intro: Left side doesn't match referenced step: {forward} != {first}");
    }
    let second = proof.sentence(params.num(1));
    if !equal(&backward, second) {
        reject!("Bi-Implication-Intro: Right side doesn't match referenced step: {backward} != {second}");
    }
    Ok(())
}

fn iff_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let reference = proof.sentence(params.num(0));
    let Some((left, right)) = reference.as_iff() else {
        reject!("Bi-Implication-Elim: Referenced step is not an '<->' expression, but got {reference} instead.");
    };
    let part = params.part();
    let (premise, conclusion) = match part {
        Part::Left => (left, right),
        Part::Right => (right, left),
    };
    if !equal(&mk_imp(premise.clone(), conclusion.clone()), proof.sentence(step)) {
        reject!("Bi-Implication-Elim: In referenced line, side {part} does not match current step.");
    }
    Ok(())
}

fn scope_vars(scope: &[ScopeFrame]) -> String {
    scope
        .iter()
        .filter_map(ScopeFrame::fresh_var)
        .collect::<Vec<_>>()
        .join(", ")
}

fn forall_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((_, body)) = proof.sentence(step).as_forall() else {
        reject!("All-x-Intro: Current step is not a 'for-all' expression.");
    };
    let (start, end) = params.range(0);
    let scope = &proof.steps[start].scope;
    let Some(fresh) = scope.last().and_then(ScopeFrame::fresh_var) else {
        reject!(
            "All-x-Intro: The provided range does not have a scoping assumption (e.g., an x0 box started by 'with') in step {}.",
            start + 1
        );
    };
    let subst = params.subst();
    if subst.len() > 1 {
        reject!("All-x-Intro: Introducing more than one quantifier at the same time is currently not supported.");
    }
    let term = &subst[0].1;
    let in_scope = match term.as_var() {
        Some(t) => t == fresh || scope.iter().any(|frame| frame.fresh_var() == Some(t)),
        None => false,
    };
    if !in_scope {
        reject!(
            "All-x-Intro: Substitution {} doesn't match scope: {}.",
            pretty_subst(subst),
            scope_vars(scope)
        );
    }
    let instance = body.subst(subst);
    log::debug!("forall-intro: {} against step {}", instance, end + 1);
    let last = proof.sentence(end);
    if !equal(last, &instance) {
        reject!(
            "All-x-Intro: Last step in range doesn't match current step after {}: {} != {}.",
            pretty_subst(subst),
            last,
            instance
        );
    }
    Ok(())
}

fn forall_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let reference = params.num(0);
    let Some((var, body)) = proof.sentence(reference).as_forall() else {
        reject!("All-x-Elim: Referenced step is not a for-all expression.");
    };
    let subst = params.subst();
    if subst.len() > 1 {
        reject!("All-x-Elim: Eliminating more than one quantifier at the same time is currently not supported.");
    }
    if subst[0].0 != var {
        reject!(
            "All-x-Elim: The substitution variable ({}) does not match the quantified variable ({}).",
            subst[0].0,
            var
        );
    }
    let instance = body.subst(subst);
    let current = proof.sentence(step);
    if !equal(&instance, current) {
        reject!(
            "All-x-Elim: Referenced step {} did not match current step after {}: {} != {}.",
            reference + 1,
            pretty_subst(subst),
            instance,
            current
        );
    }
    Ok(())
}

fn exists_intro(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((var, body)) = proof.sentence(step).as_exists() else {
        reject!("Exists-x-Intro: Current step is not an 'exists' expression.");
    };
    let subst = params.subst();
    if subst.len() > 1 {
        reject!("Exists-x-Intro: Introducing more than one quantifier at the same time is currently not supported.");
    }
    if subst[0].0 != var {
        reject!(
            "Exists-x-Intro: The substitution variable ({}) does not match the quantified variable ({}).",
            subst[0].0,
            var
        );
    }
    let reference = params.num(0);
    let instance = body.subst(subst);
    if !equal(proof.sentence(reference), &instance) {
        reject!(
            "Exists-x-Intro: Referenced step {} did not match current step after {} substitution: {} != {}.",
            reference + 1,
            pretty_subst(subst),
            proof.sentence(reference),
            instance
        );
    }
    Ok(())
}

fn exists_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((_, body)) = proof.sentence(params.num(0)).as_exists() else {
        reject!("Exists-x-Elim: Referenced step is not an 'exists' expression.");
    };
    let range = params.range(1);
    let Some(fresh) = proof.steps[range.0]
        .scope
        .last()
        .and_then(ScopeFrame::fresh_var)
    else {
        reject!("Exists-x-Elim: Range must be within an assumption scope (e.g., an x0 box).");
    };
    let subst = params.subst();
    if subst.len() > 1 {
        reject!("Exists-x-Elim: Eliminating more than one quantifier at the same time is currently not supported.");
    }
    if subst[0].1.as_var() != Some(fresh) {
        reject!(
            "Exists-x-Elim: Substitution {} must replace the quantified variable by {}.",
            pretty_subst(subst),
            fresh
        );
    }
    let instance = body.subst(subst);
    match proof.assumption(range) {
        Some(assumption) if equal(&instance, assumption) => {}
        _ => reject!("Exists-x-Elim: assumption beginning step doesn't match ref step for {fresh}."),
    }
    let last = proof.sentence(range.1);
    let current = proof.sentence(step);
    if !equal(last, current) {
        reject!(
            "Exists-x-Elim: assumption ending step {} does not match current step: {} != {}.",
            range.1 + 1,
            last,
            current
        );
    }
    Ok(())
}

/// `∀x̄. A₁ ∧ ⋯ ∧ Aₙ → C` with the quantifiers stripped. The conjuncts are
/// called the head and `C` the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HornClause {
    pub vars: Vec<String>,
    pub head: Vec<Expr>,
    pub tail: Expr,
}

fn split_head(e: &Expr) -> Option<Vec<Expr>> {
    if is_atom(e) {
        return Some(vec![e.clone()]);
    }
    let (left, right) = e.as_and()?;
    let mut head = split_head(left)?;
    head.extend(split_head(right)?);
    Some(head)
}

pub fn open_horn_clause(e: &Expr) -> Result<HornClause, String> {
    let mut vars = vec![];
    let mut e = e;
    while let Some((var, body)) = e.as_forall() {
        vars.push(var.to_owned());
        e = body;
    }
    if let Some((left, right)) = e.as_imp() {
        let Some(head) = split_head(left) else {
            reject!("Not a valid head in Horn clause: {left}");
        };
        return Ok(HornClause {
            vars,
            head,
            tail: right.clone(),
        });
    }
    if is_atom(e) {
        return Ok(HornClause {
            vars,
            head: vec![],
            tail: e.clone(),
        });
    }
    reject!("Not a valid Horn clause: {e}")
}

fn backchain(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let refs = params.nums();
    let clause_expr = proof.sentence(refs[0]);
    let clause = open_horn_clause(clause_expr).map_err(|err| format!("Backchaining: {err}"))?;
    let facts = &refs[1..];
    if clause.head.len() != facts.len() {
        reject!(
            "Backchaining: {} proof steps provided, but {} required to match the head of the Horn clause {}.",
            facts.len(),
            clause.head.len(),
            clause_expr
        );
    }

    let subst = params.subst();
    let tail = clause.tail.subst(subst);
    log::debug!("backchaining over {:?}: tail {}", clause.vars, tail);
    let current = proof.sentence(step);
    if !equal(&tail, current) {
        reject!(
            "Backchaining: Tail of Horn clause in step {} does not match current step: {} != {}",
            refs[0] + 1,
            tail,
            current
        );
    }
    for (i, (formula, &fact)) in clause.head.iter().zip(facts).enumerate() {
        let formula = formula.subst(subst);
        if !equal(&formula, proof.sentence(fact)) {
            reject!(
                "Backchaining: Head formula {} of Horn clause in step {} does not match step {}: {} != {}.",
                i + 1,
                refs[0] + 1,
                fact + 1,
                formula,
                proof.sentence(fact)
            );
        }
    }
    Ok(())
}

fn eq_intro(proof: &Proof, step: usize, _params: &Params) -> Result<(), String> {
    let current = proof.sentence(step);
    let Some((left, right)) = current.as_equality() else {
        reject!("Equality-Intro: Current step is not an equality, but got {current} instead.");
    };
    if !equal(left, right) {
        reject!("Equality-Intro: Left and right sides do not match.");
    }
    Ok(())
}

fn eq_elim(proof: &Proof, step: usize, params: &Params) -> Result<(), String> {
    let Some((from, to)) = proof.sentence(params.num(0)).as_equality() else {
        reject!("Equality-Elim: First referenced step is not an equality.");
    };
    let source = proof.sentence(params.num(1));
    let current = proof.sentence(step);
    if !equal_modulo(source, current, from, to) {
        reject!(
            "Equality-Elim: Substituting in step {} does not result in current step: formula {} != {} when replacing {} by {}",
            params.num(1) + 1,
            source,
            current,
            from,
            to
        );
    }
    Ok(())
}
