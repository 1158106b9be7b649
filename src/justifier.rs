//! Shape checking of rule invocations.
//!
//! Every rule side declares a [ParamSpec]. Before the rule's own check runs,
//! the raw justification is validated against it and resolved into [Params]
//! with 0-based step indices and parsed substitution terms.

use crate::expr::{pretty_subst, Expr};
use crate::lex::is_identifier;
use crate::parse::parse_sentence;
use crate::proof::{Justification, Proof};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A single earlier line.
    Num,
    /// A whole closed box `a-b`.
    Range,
    /// Any number of further single lines. Only valid last.
    Nums,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub has_part: bool,
    pub refs: Option<&'static [RefKind]>,
    pub subst: bool,
}

impl ParamSpec {
    pub const NONE: ParamSpec = ParamSpec {
        has_part: false,
        refs: None,
        subst: false,
    };

    pub const fn refs(refs: &'static [RefKind]) -> Self {
        ParamSpec {
            has_part: false,
            refs: Some(refs),
            subst: false,
        }
    }

    pub const fn with_part(self) -> Self {
        ParamSpec {
            has_part: true,
            ..self
        }
    }

    pub const fn with_subst(self) -> Self {
        ParamSpec {
            subst: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Left,
    Right,
}

impl Part {
    pub fn pick<'a, T>(self, left: &'a T, right: &'a T) -> &'a T {
        match self {
            Part::Left => left,
            Part::Right => right,
        }
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Part::Left => write!(f, "1"),
            Part::Right => write!(f, "2"),
        }
    }
}

/// A resolved, 0-based step reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRef {
    Num(usize),
    Range(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub part: Option<Part>,
    pub refs: Vec<StepRef>,
    pub subst: Option<Vec<(String, Expr)>>,
}

impl Params {
    fn empty() -> Self {
        Params {
            part: None,
            refs: vec![],
            subst: None,
        }
    }

    /// The `i`-th reference, declared as `num`.
    pub fn num(&self, i: usize) -> usize {
        match self.refs[i] {
            StepRef::Num(n) => n,
            StepRef::Range(..) => panic!("reference #{} is declared as a single step", i + 1),
        }
    }

    /// The `i`-th reference, declared as `range`.
    pub fn range(&self, i: usize) -> (usize, usize) {
        match self.refs[i] {
            StepRef::Range(a, b) => (a, b),
            StepRef::Num(_) => panic!("reference #{} is declared as a range", i + 1),
        }
    }

    pub fn nums(&self) -> Vec<usize> {
        (0..self.refs.len()).map(|i| self.num(i)).collect()
    }

    pub fn part(&self) -> Part {
        self.part.expect("part is declared")
    }

    pub fn subst(&self) -> &[(String, Expr)] {
        self.subst.as_deref().expect("substitution is declared")
    }
}

pub type Check = fn(&Proof, usize, &Params) -> Result<(), String>;

/// A declared parameter shape together with the semantic check it guards.
#[derive(Clone, Copy)]
pub struct Justifier {
    pub spec: ParamSpec,
    pub check: Check,
}

impl std::fmt::Debug for Justifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Justifier").field("spec", &self.spec).finish()
    }
}

impl Justifier {
    pub const fn new(spec: ParamSpec, check: Check) -> Self {
        Self { spec, check }
    }

    pub fn exec(&self, proof: &Proof, step: usize, justification: &Justification) -> Result<(), String> {
        let params = check_params(&self.spec, proof, step, justification)?;
        log::debug!("step {}: checked parameters {:?}", step + 1, params);
        (self.check)(proof, step, &params)
    }
}

/// Validates the raw fields of `justification` against `spec`.
pub fn check_params(
    spec: &ParamSpec,
    proof: &Proof,
    step: usize,
    justification: &Justification,
) -> Result<Params, String> {
    if !spec.has_part && justification.part.is_some() {
        return Err("Step part (e.g., 2 in 'and e2') is not applicable here.".to_owned());
    }
    if spec.refs.is_none() && justification.refs.is_some() {
        return Err("Step references are not applicable here.".to_owned());
    }
    if !spec.subst && justification.subst.is_some() {
        return Err("Substitution is not applicable here.".to_owned());
    }

    let mut params = Params::empty();

    if spec.has_part {
        let part = justification
            .part
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .ok_or("Part number (1 for left, 2 for right) is missing or not a number.")?;
        params.part = Some(match part {
            1 => Part::Left,
            2 => Part::Right,
            _ => return Err("Part number must be 1 (for left) or 2 (for right).".to_owned()),
        });
    }

    if let Some(kinds) = spec.refs {
        let refs = justification
            .refs
            .as_deref()
            .ok_or("Step reference required.")?;
        params.refs = check_refs(kinds, proof, step, refs)?;
    }

    if spec.subst {
        let subst = match justification.subst.as_deref() {
            Some(subst) if !subst.is_empty() => subst,
            _ => {
                return Err(
                    "Substitution specification required (e.g., A.x/x0 intro n-m).".to_owned(),
                )
            }
        };
        let subst = subst
            .iter()
            .map(|(x, t)| parse_subst(x, t))
            .collect::<Result<Vec<_>, _>>()?;
        log::trace!("substitution {}", pretty_subst(&subst));
        params.subst = Some(subst);
    }

    Ok(params)
}

fn check_refs(
    kinds: &[RefKind],
    proof: &Proof,
    step: usize,
    refs: &[String],
) -> Result<Vec<StepRef>, String> {
    let mut format = kinds.to_vec();
    if format.last() == Some(&RefKind::Nums) {
        format.pop();
        let extra = refs.len().saturating_sub(format.len());
        format.extend(std::iter::repeat(RefKind::Num).take(extra));
    }

    if refs.len() != format.len() {
        let expected = format
            .iter()
            .map(|kind| match kind {
                RefKind::Range => "n-m",
                _ => "n",
            })
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!("Step reference mismatch; required format: {expected}."));
    }

    let current = &proof.steps[step];
    let mut resolved = vec![];
    for (i, (kind, raw)) in format.iter().zip(refs).enumerate() {
        match kind {
            RefKind::Range => {
                let (a, b) = parse_range(raw)
                    .filter(|&(a, b)| 1 <= a && a <= b && b <= step)
                    .ok_or_else(|| {
                        format!(
                            "Range reference #{} ({}) must be a range a-b with 1 <= a <= b <= {}.",
                            i + 1,
                            raw,
                            step
                        )
                    })?;
                let (start, end) = (&proof.steps[a - 1], &proof.steps[b - 1]);
                let whole_box = start.is_first
                    && end.is_last
                    && !start.boxes.is_empty()
                    && start.boxes == end.boxes;
                if !whole_box {
                    return Err(format!(
                        "Range reference #{} ({}) must be to the opening and closing of a flag.",
                        i + 1,
                        raw
                    ));
                }
                let parent = &start.boxes[..start.boxes.len() - 1];
                if !current.boxes.starts_with(parent) {
                    return Err(format!(
                        "Range reference #{} ({}) is not visible from the current step.",
                        i + 1,
                        raw
                    ));
                }
                resolved.push(StepRef::Range(a - 1, b - 1));
            }
            _ => {
                let n = raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| 1 <= n && n <= step)
                    .ok_or_else(|| {
                        format!(
                            "Step reference #{} ({}) must be in [1-{}].",
                            i + 1,
                            raw,
                            step
                        )
                    })?;
                if !proof.steps[n - 1].is_visible_from(current) {
                    return Err(format!(
                        "Step reference #{} ({}) is inside a closed assumption box.",
                        i + 1,
                        n
                    ));
                }
                resolved.push(StepRef::Num(n - 1));
            }
        }
    }
    Ok(resolved)
}

fn parse_range(raw: &str) -> Option<(usize, usize)> {
    let (a, b) = raw.trim().split_once('-')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_subst(var: &str, term: &str) -> Result<(String, Expr), String> {
    if !is_identifier(var) {
        return Err(format!(
            "Substitution must substitute for a variable, but got {var}."
        ));
    }
    match parse_sentence(term) {
        Ok(expr) if expr.is_id() => Ok((var.to_owned(), expr)),
        Ok(_) => Err(format!(
            "Substitution does not have a valid term, should be of the form x/f(c), but got {term}."
        )),
        Err(err) => Err(format!("Substitution term {term} does not parse: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{mk_app, mk_var};
    use crate::proof::{mk_box, mk_rule, preprocess};

    fn line(name: &str) -> crate::proof::Node {
        mk_rule(mk_var(name), Justification::new("premise"))
    }

    // 1 a
    // 2 | b
    // 3 | c
    // 4 d
    // 5 e
    fn sample() -> Proof {
        preprocess(&[
            line("a"),
            mk_box(vec![line("b"), line("c")]),
            line("d"),
            line("e"),
        ])
    }

    fn refs(refs: &[&str]) -> Justification {
        Justification::new("r").with_refs(refs.iter().copied())
    }

    const NUM: ParamSpec = ParamSpec::refs(&[RefKind::Num]);
    const NUM_RANGE: ParamSpec = ParamSpec::refs(&[RefKind::Num, RefKind::Range]);

    #[test]
    fn inapplicable_fields() {
        let proof = sample();
        let j = Justification::new("r").with_part("1");
        assert_eq!(
            check_params(&ParamSpec::NONE, &proof, 4, &j),
            Err("Step part (e.g., 2 in 'and e2') is not applicable here.".to_owned())
        );
        assert_eq!(
            check_params(&ParamSpec::NONE, &proof, 4, &refs(&["1"])),
            Err("Step references are not applicable here.".to_owned())
        );
        let j = Justification::new("r").with_refs(["1"]).with_subst([("x", "a")]);
        assert_eq!(
            check_params(&NUM, &proof, 4, &j),
            Err("Substitution is not applicable here.".to_owned())
        );
        assert_eq!(
            check_params(&ParamSpec::NONE, &proof, 4, &Justification::new("r")),
            Ok(Params::empty())
        );
    }

    #[test]
    fn part_numbers() {
        let proof = sample();
        let spec = NUM.with_part();
        let j = refs(&["1"]);
        assert!(check_params(&spec, &proof, 4, &j)
            .unwrap_err()
            .starts_with("Part number (1 for left, 2 for right)"));
        let j = refs(&["1"]).with_part("3");
        assert_eq!(
            check_params(&spec, &proof, 4, &j),
            Err("Part number must be 1 (for left) or 2 (for right).".to_owned())
        );
        let j = refs(&["1"]).with_part("2");
        let params = check_params(&spec, &proof, 4, &j).unwrap();
        assert_eq!(params.part, Some(Part::Right));
        assert_eq!(params.refs, vec![StepRef::Num(0)]);
    }

    #[test]
    fn references_must_precede_the_step() {
        let proof = sample();
        assert_eq!(
            check_params(&NUM, &proof, 3, &Justification::new("r")),
            Err("Step reference required.".to_owned())
        );
        assert_eq!(
            check_params(&NUM, &proof, 3, &refs(&["4"])),
            Err("Step reference #1 (4) must be in [1-3].".to_owned())
        );
        assert_eq!(
            check_params(&NUM, &proof, 3, &refs(&["0"])),
            Err("Step reference #1 (0) must be in [1-3].".to_owned())
        );
        assert_eq!(
            check_params(&NUM, &proof, 3, &refs(&["x"])),
            Err("Step reference #1 (x) must be in [1-3].".to_owned())
        );
        assert_eq!(
            check_params(&NUM, &proof, 3, &refs(&["1", "2"])),
            Err("Step reference mismatch; required format: n.".to_owned())
        );
        assert_eq!(
            check_params(&NUM_RANGE, &proof, 3, &refs(&["1"])),
            Err("Step reference mismatch; required format: n, n-m.".to_owned())
        );
    }

    #[test]
    fn references_into_closed_boxes() {
        let proof = sample();
        assert_eq!(
            check_params(&NUM, &proof, 4, &refs(&["2"])),
            Err("Step reference #1 (2) is inside a closed assumption box.".to_owned())
        );
        // still open
        assert!(check_params(&NUM, &proof, 2, &refs(&["2"])).is_ok());
    }

    #[test]
    fn ranges_must_cover_a_box() {
        let proof = sample();
        let ok = check_params(&NUM_RANGE, &proof, 4, &refs(&["1", "2-3"])).unwrap();
        assert_eq!(ok.refs, vec![StepRef::Num(0), StepRef::Range(1, 2)]);
        assert_eq!(ok.range(1), (1, 2));

        assert_eq!(
            check_params(&NUM_RANGE, &proof, 4, &refs(&["1", "1-4"])),
            Err("Range reference #2 (1-4) must be to the opening and closing of a flag.".to_owned())
        );
        assert_eq!(
            check_params(&NUM_RANGE, &proof, 4, &refs(&["1", "2-2"])),
            Err("Range reference #2 (2-2) must be to the opening and closing of a flag.".to_owned())
        );
        assert_eq!(
            check_params(&NUM_RANGE, &proof, 4, &refs(&["1", "3-2"])),
            Err(
                "Range reference #2 (3-2) must be a range a-b with 1 <= a <= b <= 4.".to_owned()
            )
        );
        assert_eq!(
            check_params(&NUM_RANGE, &proof, 4, &refs(&["1", "2"])),
            Err("Range reference #2 (2) must be a range a-b with 1 <= a <= b <= 4.".to_owned())
        );
    }

    #[test]
    fn variadic_references() {
        let proof = sample();
        let spec = ParamSpec::refs(&[RefKind::Num, RefKind::Nums]);
        let params = check_params(&spec, &proof, 4, &refs(&["1", "4", "4"])).unwrap();
        assert_eq!(params.nums(), vec![0, 3, 3]);
        let params = check_params(&spec, &proof, 4, &refs(&["1"])).unwrap();
        assert_eq!(params.nums(), vec![0]);
    }

    #[test]
    fn substitutions() {
        let proof = sample();
        let spec = NUM.with_subst();
        assert_eq!(
            check_params(&spec, &proof, 4, &refs(&["1"])),
            Err("Substitution specification required (e.g., A.x/x0 intro n-m).".to_owned())
        );
        let j = refs(&["1"]).with_subst([("2x", "a")]);
        assert_eq!(
            check_params(&spec, &proof, 4, &j),
            Err("Substitution must substitute for a variable, but got 2x.".to_owned())
        );
        let j = refs(&["1"]).with_subst([("x", "a -> b")]);
        assert_eq!(
            check_params(&spec, &proof, 4, &j),
            Err("Substitution does not have a valid term, should be of the form x/f(c), but got a -> b.".to_owned())
        );
        let j = refs(&["1"]).with_subst([("x", "f(a, c)"), ("y", "b")]);
        let params = check_params(&spec, &proof, 4, &j).unwrap();
        assert_eq!(
            params.subst(),
            &[
                ("x".to_owned(), mk_app("f", vec![mk_var("a"), mk_var("c")])),
                ("y".to_owned(), mk_var("b")),
            ]
        );
    }
}
