//! Proof trees as produced by the front end, and their flattening into a
//! linear sequence of steps.

use crate::expr::{mk_bot, Expr};
use crate::lex::SourceInfo;

/// The annotation on a proof line, kept in its raw textual form. Shapes are
/// validated later against the rule it names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Justification {
    pub rule: String,
    /// `i`, `intro`, `e`, `elim`, ...
    pub selector: Option<String>,
    /// `1` or `2` in `and e1`.
    pub part: Option<String>,
    /// `3`, `4-7`, ...
    pub refs: Option<Vec<String>>,
    /// `(x, f(c))` for `x/f(c)`.
    pub subst: Option<Vec<(String, String)>>,
}

impl Justification {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            ..Default::default()
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.part = Some(part.into());
        self
    }

    pub fn with_refs<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refs = Some(refs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_subst<I, S, T>(mut self, subst: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        self.subst = Some(
            subst
                .into_iter()
                .map(|(x, t)| (x.into(), t.into()))
                .collect(),
        );
        self
    }

    /// Case-folded rule name with any `.subst` suffix removed.
    pub fn rule_name(&self) -> String {
        let name = match self.rule.find('.') {
            Some(i) => &self.rule[..i],
            None => &self.rule,
        };
        name.to_lowercase()
    }
}

impl std::fmt::Display for Justification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rule)?;
        if let Some(subst) = &self.subst {
            let items = subst
                .iter()
                .map(|(x, t)| format!("{x}/{t}"))
                .collect::<Vec<_>>();
            write!(f, ".{}", items.join(";"))?;
        }
        if let Some(selector) = &self.selector {
            write!(f, " {selector}")?;
        }
        if let Some(part) = &self.part {
            write!(f, "{part}")?;
        }
        if let Some(refs) = &self.refs {
            write!(f, " {}", refs.join(","))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Rule(NodeRule),
    Box(NodeBox),
    FolBox(NodeFolBox),
    Error(NodeError),
}

#[derive(Debug, Clone)]
pub struct NodeRule {
    pub sentence: Expr,
    pub justification: Justification,
    pub loc: Option<SourceInfo>,
}

#[derive(Debug, Clone)]
pub struct NodeBox {
    pub children: Vec<Node>,
    pub loc: Option<SourceInfo>,
}

/// A box opened by `with x0`. The first child is the `with` line itself.
#[derive(Debug, Clone)]
pub struct NodeFolBox {
    pub var: String,
    pub children: Vec<Node>,
    pub loc: Option<SourceInfo>,
}

#[derive(Debug, Clone)]
pub struct NodeError {
    pub message: String,
    pub loc: Option<SourceInfo>,
}

pub fn mk_rule(sentence: Expr, justification: Justification) -> Node {
    Node::Rule(NodeRule {
        sentence,
        justification,
        loc: None,
    })
}

pub fn mk_box(children: Vec<Node>) -> Node {
    Node::Box(NodeBox {
        children,
        loc: None,
    })
}

pub fn mk_folbox(var: impl Into<String>, children: Vec<Node>) -> Node {
    Node::FolBox(NodeFolBox {
        var: var.into(),
        children,
        loc: None,
    })
}

pub fn mk_error(message: impl Into<String>) -> Node {
    Node::Error(NodeError {
        message: message.into(),
        loc: None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFrame {
    /// A box introducing the fresh variable.
    Fresh(String),
    Plain,
}

impl ScopeFrame {
    pub fn fresh_var(&self) -> Option<&str> {
        match self {
            ScopeFrame::Fresh(var) => Some(var),
            ScopeFrame::Plain => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub sentence: Expr,
    pub justification: Justification,
    /// Innermost box last.
    pub scope: Vec<ScopeFrame>,
    /// Ids of the enclosing boxes, innermost last. Ids are unique per proof.
    pub boxes: Vec<usize>,
    pub loc: Option<SourceInfo>,
    pub is_first: bool,
    pub is_last: bool,
    /// Set for placeholders standing in for lines that failed to parse.
    pub syntax_error: Option<String>,
}

impl Statement {
    /// The `with x0` line opening a fresh-variable box.
    pub fn opens_fresh_scope(&self) -> bool {
        self.justification.rule_name() == "with"
    }

    /// Whether `self` can still be seen from `other`, i.e. every box around
    /// `self` is still open at `other`.
    pub fn is_visible_from(&self, other: &Statement) -> bool {
        other.boxes.starts_with(&self.boxes)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Proof {
    pub steps: Vec<Statement>,
}

impl Proof {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn sentence(&self, step: usize) -> &Expr {
        &self.steps[step].sentence
    }

    /// The assumption of the box spanning `start..=end`, skipping a leading
    /// `with` line. `None` if the box holds nothing but the `with` line.
    pub fn assumption(&self, (start, end): (usize, usize)) -> Option<&Expr> {
        let stmt = &self.steps[start];
        if stmt.opens_fresh_scope() {
            if start < end {
                Some(&self.steps[start + 1].sentence)
            } else {
                None
            }
        } else {
            Some(&stmt.sentence)
        }
    }
}

struct Preprocessor {
    steps: Vec<Statement>,
    next_box: usize,
}

impl Preprocessor {
    /// Flattens `nodes` and returns the index of the next step.
    fn preprocess_box(&mut self, nodes: &[Node], scope: &[ScopeFrame], boxes: &[usize]) -> usize {
        let last = nodes.len().saturating_sub(1);
        for (i, node) in nodes.iter().enumerate() {
            match node {
                Node::Rule(node) => {
                    self.steps.push(Statement {
                        sentence: node.sentence.clone(),
                        justification: node.justification.clone(),
                        scope: scope.to_vec(),
                        boxes: boxes.to_vec(),
                        loc: node.loc.clone(),
                        is_first: i == 0,
                        is_last: i == last,
                        syntax_error: None,
                    });
                }
                Node::Box(node) => {
                    self.enter(&node.children, scope, boxes, ScopeFrame::Plain);
                }
                Node::FolBox(node) => {
                    self.enter(
                        &node.children,
                        scope,
                        boxes,
                        ScopeFrame::Fresh(node.var.clone()),
                    );
                }
                Node::Error(node) => {
                    self.steps.push(Statement {
                        sentence: mk_bot(),
                        justification: Justification::default(),
                        scope: scope.to_vec(),
                        boxes: boxes.to_vec(),
                        loc: node.loc.clone(),
                        is_first: i == 0,
                        is_last: i == last,
                        syntax_error: Some(node.message.clone()),
                    });
                }
            }
        }
        self.steps.len()
    }

    fn enter(&mut self, nodes: &[Node], scope: &[ScopeFrame], boxes: &[usize], frame: ScopeFrame) {
        let id = self.next_box;
        self.next_box += 1;
        log::trace!("box #{id} {frame:?} at step {}", self.steps.len() + 1);

        let mut scope = scope.to_vec();
        scope.push(frame);
        let mut boxes = boxes.to_vec();
        boxes.push(id);
        self.preprocess_box(nodes, &scope, &boxes);
    }
}

/// Flattens a proof tree into 0-indexed steps, recording the scope and the
/// first/last-in-box position of every line.
pub fn preprocess(ast: &[Node]) -> Proof {
    let mut this = Preprocessor {
        steps: vec![],
        next_box: 0,
    };
    let count = this.preprocess_box(ast, &[], &[]);
    log::debug!("preprocessed {count} steps");
    Proof { steps: this.steps }
}
