// Purpose: Read a source file's build-constraint header and decide whether excluded tags rule the file out.
// Inputs/Outputs: Source text in, optional constraint expression out; expression + excluded tags in, verdict out.
// Invariants: A file is dropped only when no assignment of its remaining tags can satisfy the constraint.
// Gotchas: Unparseable constraints count as "no constraint", so the file stays in and its imports still matter.

/// Upper bound on free tags tried exhaustively; beyond it the file is kept.
const MAX_FREE_TAGS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval<F: Fn(&str) -> bool>(&self, on: &F) -> bool {
        match self {
            Expr::Tag(t) => on(t),
            Expr::Not(e) => !e.eval(on),
            Expr::And(a, b) => a.eval(on) && b.eval(on),
            Expr::Or(a, b) => a.eval(on) || b.eval(on),
        }
    }

    fn collect_tags<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Tag(t) => {
                if !out.contains(&t.as_str()) {
                    out.push(t);
                }
            }
            Expr::Not(e) => e.collect_tags(out),
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_tags(out);
                b.collect_tags(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn tokenize(s: &str) -> Option<Vec<Tok>> {
    let mut toks = vec![];
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '!' => {
                chars.next();
                toks.push(Tok::Not);
            }
            '(' => {
                chars.next();
                toks.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                toks.push(Tok::RParen);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return None;
                }
                toks.push(if c == '&' { Tok::And } else { Tok::Or });
            }
            c if is_tag_char(c) => {
                let mut id = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_tag_char(n) {
                        break;
                    }
                    id.push(n);
                    chars.next();
                }
                toks.push(Tok::Ident(id));
            }
            _ => return None,
        }
    }
    Some(toks)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn eat(&mut self, t: &Tok) -> bool {
        if self.peek() == Some(t) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Tok::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        while self.eat(&Tok::And) {
            let rhs = self.parse_unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        if self.eat(&Tok::Not) {
            return Some(Expr::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Tok::LParen) {
            let e = self.parse_or()?;
            return self.eat(&Tok::RParen).then_some(e);
        }
        match self.peek().cloned() {
            Some(Tok::Ident(id)) => {
                self.pos += 1;
                Some(Expr::Tag(id))
            }
            _ => None,
        }
    }
}

/// Parse the expression after `//go:build`.
pub fn parse_go_build(expr: &str) -> Option<Expr> {
    let toks = tokenize(expr)?;
    let mut p = Parser { toks, pos: 0 };
    let e = p.parse_or()?;
    (p.pos == p.toks.len()).then_some(e)
}

/// Parse the operands of one `// +build` line: spaces separate alternatives,
/// commas join requirements, and a leading `!` negates a tag.
pub fn parse_plus_build(line: &str) -> Option<Expr> {
    let mut alternatives: Option<Expr> = None;
    for term in line.split_whitespace() {
        let mut all: Option<Expr> = None;
        for factor in term.split(',') {
            let (neg, tag) = match factor.strip_prefix('!') {
                Some(t) => (true, t),
                None => (false, factor),
            };
            if tag.is_empty() || !tag.chars().all(is_tag_char) {
                return None;
            }
            let mut e = Expr::Tag(tag.to_string());
            if neg {
                e = Expr::Not(Box::new(e));
            }
            all = Some(match all {
                Some(prev) => Expr::And(Box::new(prev), Box::new(e)),
                None => e,
            });
        }
        let all = all?;
        alternatives = Some(match alternatives {
            Some(prev) => Expr::Or(Box::new(prev), Box::new(all)),
            None => all,
        });
    }
    alternatives
}

fn directive<'a>(comment: &'a str, name: &str) -> Option<&'a str> {
    let rest = comment.strip_prefix(name)?;
    (rest.is_empty() || rest.starts_with([' ', '\t'])).then_some(rest)
}

/// Build constraint declared in the header of `src`, the comment block
/// before the package clause. `//go:build` takes precedence over `// +build`
/// lines, which are combined with "and".
pub fn file_constraint(src: &str) -> Option<Expr> {
    let mut plus: Vec<Expr> = vec![];
    let mut in_block = false;
    for line in src.lines() {
        let t = line.trim();
        if in_block {
            if let Some(i) = t.find("*/") {
                in_block = false;
                if !t[i + 2..].trim().is_empty() {
                    break;
                }
            }
            continue;
        }
        if t.is_empty() {
            continue;
        }
        if let Some(rest) = t.strip_prefix("/*") {
            match rest.find("*/") {
                Some(i) if !rest[i + 2..].trim().is_empty() => break,
                Some(_) => {}
                None => in_block = true,
            }
            continue;
        }
        let Some(comment) = t.strip_prefix("//") else {
            break;
        };
        if let Some(expr) = directive(comment, "go:build") {
            return parse_go_build(expr);
        }
        if let Some(expr) = directive(comment.trim_start(), "+build") {
            match parse_plus_build(expr) {
                Some(e) => plus.push(e),
                None => return None,
            }
        }
    }
    plus.into_iter()
        .reduce(|a, b| Expr::And(Box::new(a), Box::new(b)))
}

/// True when `expr` cannot hold while every tag in `excluded` is off,
/// whatever the other tags are set to.
pub fn excluded_by(expr: &Expr, excluded: &[String]) -> bool {
    let mut tags = vec![];
    expr.collect_tags(&mut tags);
    let free: Vec<&str> = tags
        .into_iter()
        .filter(|t| !excluded.iter().any(|x| x == t))
        .collect();
    if free.len() > MAX_FREE_TAGS {
        return false;
    }
    for mask in 0u32..(1u32 << free.len()) {
        let on = |tag: &str| {
            free.iter()
                .position(|f| *f == tag)
                .is_some_and(|i| mask & (1 << i) != 0)
        };
        if expr.eval(&on) {
            return false;
        }
    }
    true
}
