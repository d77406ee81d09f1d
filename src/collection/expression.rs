//! Path expressions: set algebra over path patterns.
//!
//! ```text
//! //{hdPurpose:food and hdHasPrimvar:fresh}
//! /World//*Light - //{hdVisible:false}
//! ~(/A/B// + /A/C)
//! ```
//!
//! A pattern is a `/`-separated list of components. `//` is a stretch that
//! matches zero or more components; a trailing `//` therefore also
//! matches every descendant. A component is a glob (`*`, `?`, `[a-z]`,
//! literal text, empty for any name) optionally followed by a
//! `{predicate}`. Patterns combine with `+` or whitespace (union), `&`
//! (intersection), `-` (difference), `~` (complement) and parentheses.

use std::fmt;
use std::str::FromStr;

use super::predicate::{CallArg, PredicateLibrary, PredicateResult};
use crate::scene::SceneIndexPrim;
use crate::util::{Error, Result, Token, Value};

// ============================================================================
// Globs
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum GlobItem {
    Literal(char),
    AnyChar,
    AnyRun,
    /// `[...]`; ranges are inclusive, `negated` for `[!...]`.
    Class { ranges: Vec<(char, char)>, negated: bool },
}

/// A shell-style name glob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glob {
    text: String,
    items: Vec<GlobItem>,
}

impl Glob {
    fn parse(text: &str, offset: usize) -> Result<Self> {
        let mut items = Vec::new();
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '*' => {
                    if items.last() != Some(&GlobItem::AnyRun) {
                        items.push(GlobItem::AnyRun);
                    }
                }
                '?' => items.push(GlobItem::AnyChar),
                '[' => {
                    let mut ranges = Vec::new();
                    let negated = chars.next_if(|&(_, c)| c == '!' || c == '^').is_some();
                    let mut closed = false;
                    while let Some((_, c)) = chars.next() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        if chars.peek().is_some_and(|&(_, d)| d == '-') {
                            chars.next();
                            match chars.next() {
                                Some((_, hi)) if hi != ']' => ranges.push((c, hi)),
                                Some(_) => {
                                    ranges.push((c, c));
                                    ranges.push(('-', '-'));
                                    closed = true;
                                    break;
                                }
                                None => break,
                            }
                        } else {
                            ranges.push((c, c));
                        }
                    }
                    if !closed {
                        return Err(Error::parse(offset + i, "unterminated '[' in glob"));
                    }
                    items.push(GlobItem::Class { ranges, negated });
                }
                c => items.push(GlobItem::Literal(c)),
            }
        }
        Ok(Self {
            text: text.to_string(),
            items,
        })
    }

    /// True when the glob has no wildcards.
    pub fn is_literal(&self) -> bool {
        self.items.iter().all(|i| matches!(i, GlobItem::Literal(_)))
    }

    pub fn matches(&self, name: &str) -> bool {
        let chars: Vec<char> = name.chars().collect();
        glob_match(&self.items, &chars)
    }
}

fn glob_match(items: &[GlobItem], name: &[char]) -> bool {
    let Some((first, rest)) = items.split_first() else {
        return name.is_empty();
    };
    match first {
        GlobItem::AnyRun => (0..=name.len()).any(|skip| glob_match(rest, &name[skip..])),
        GlobItem::AnyChar => !name.is_empty() && glob_match(rest, &name[1..]),
        GlobItem::Literal(c) => name.first() == Some(c) && glob_match(rest, &name[1..]),
        GlobItem::Class { ranges, negated } => match name.first() {
            Some(&c) => {
                let inside = ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
                inside != *negated && glob_match(rest, &name[1..])
            }
            None => false,
        },
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Predicate expressions
// ============================================================================

/// Boolean combination of predicate calls.
#[derive(Clone, Debug, PartialEq)]
pub enum PredicateExpr {
    Call { name: Token, args: Vec<CallArg> },
    Not(Box<PredicateExpr>),
    And(Box<PredicateExpr>, Box<PredicateExpr>),
    Or(Box<PredicateExpr>, Box<PredicateExpr>),
}

impl PredicateExpr {
    pub fn evaluate(&self, library: &PredicateLibrary, prim: &SceneIndexPrim) -> PredicateResult {
        match self {
            PredicateExpr::Call { name, args } => library.call(name, args, prim),
            PredicateExpr::Not(e) => e.evaluate(library, prim).not(),
            PredicateExpr::And(a, b) => a
                .evaluate(library, prim)
                .and(|| b.evaluate(library, prim)),
            PredicateExpr::Or(a, b) => a
                .evaluate(library, prim)
                .or(|| b.evaluate(library, prim)),
        }
    }

    /// Names of every predicate this expression calls.
    pub fn called_names(&self, out: &mut Vec<Token>) {
        match self {
            PredicateExpr::Call { name, .. } => out.push(name.clone()),
            PredicateExpr::Not(e) => e.called_names(out),
            PredicateExpr::And(a, b) | PredicateExpr::Or(a, b) => {
                a.called_names(out);
                b.called_names(out);
            }
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// One component of a [`PathPattern`].
#[derive(Clone, Debug, PartialEq)]
pub enum PatternComponent {
    /// `//`: zero or more path elements.
    Stretch,
    /// One path element. `glob == None` accepts any name.
    Element {
        glob: Option<Glob>,
        predicate: Option<PredicateExpr>,
    },
}

/// An absolute path pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPattern {
    components: Vec<PatternComponent>,
    text: String,
}

impl PathPattern {
    pub fn components(&self) -> &[PatternComponent] {
        &self.components
    }

    /// True when the last component is a stretch, i.e. every descendant
    /// of a match also matches.
    pub fn ends_with_stretch(&self) -> bool {
        matches!(self.components.last(), Some(PatternComponent::Stretch))
    }

    pub fn has_predicates(&self) -> bool {
        self.components.iter().any(|c| {
            matches!(
                c,
                PatternComponent::Element {
                    predicate: Some(_),
                    ..
                }
            )
        })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression tree over patterns.
#[derive(Clone, Debug, PartialEq)]
pub enum ExpressionNode {
    Pattern(PathPattern),
    Complement(Box<ExpressionNode>),
    Union(Box<ExpressionNode>, Box<ExpressionNode>),
    Intersection(Box<ExpressionNode>, Box<ExpressionNode>),
    Difference(Box<ExpressionNode>, Box<ExpressionNode>),
}

impl ExpressionNode {
    fn visit_patterns<'a>(&'a self, f: &mut impl FnMut(&'a PathPattern)) {
        match self {
            ExpressionNode::Pattern(p) => f(p),
            ExpressionNode::Complement(e) => e.visit_patterns(f),
            ExpressionNode::Union(a, b)
            | ExpressionNode::Intersection(a, b)
            | ExpressionNode::Difference(a, b) => {
                a.visit_patterns(f);
                b.visit_patterns(f);
            }
        }
    }
}

/// A parsed path expression. The default expression is empty and matches
/// nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathExpression {
    root: Option<ExpressionNode>,
    text: String,
}

impl PathExpression {
    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = Parser::new(text);
        parser.skip_ws();
        if parser.at_end() {
            return Ok(Self::default());
        }
        let root = parser.expression()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self {
            root: Some(root),
            text: text.trim().to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&ExpressionNode> {
        self.root.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Predicate names referenced anywhere in the expression.
    pub fn predicate_names(&self) -> Vec<Token> {
        let mut names = Vec::new();
        if let Some(root) = &self.root {
            root.visit_patterns(&mut |pattern| {
                for component in &pattern.components {
                    if let PatternComponent::Element {
                        predicate: Some(p), ..
                    } = component
                    {
                        p.called_names(&mut names);
                    }
                }
            });
        }
        names.sort();
        names.dedup();
        names
    }
}

impl FromStr for PathExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn error(&self, message: &str) -> Error {
        Error::parse(self.pos, message)
    }

    // expression := term (('+' | '-' | <ws>) term)*
    fn expression(&mut self) -> Result<ExpressionNode> {
        let mut lhs = self.term()?;
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    self.skip_ws();
                    let rhs = self.term()?;
                    lhs = ExpressionNode::Union(Box::new(lhs), Box::new(rhs));
                }
                Some('-') => {
                    self.bump();
                    self.skip_ws();
                    let rhs = self.term()?;
                    lhs = ExpressionNode::Difference(Box::new(lhs), Box::new(rhs));
                }
                Some('/' | '~' | '(') if had_ws => {
                    let rhs = self.term()?;
                    lhs = ExpressionNode::Union(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    // term := factor ('&' factor)*
    fn term(&mut self) -> Result<ExpressionNode> {
        let mut lhs = self.factor()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.peek() == Some('&') {
                self.bump();
                self.skip_ws();
                let rhs = self.factor()?;
                lhs = ExpressionNode::Intersection(Box::new(lhs), Box::new(rhs));
            } else {
                self.pos = save;
                return Ok(lhs);
            }
        }
    }

    // factor := '~' factor | '(' expression ')' | pattern
    fn factor(&mut self) -> Result<ExpressionNode> {
        match self.peek() {
            Some('~') => {
                self.bump();
                self.skip_ws();
                Ok(ExpressionNode::Complement(Box::new(self.factor()?)))
            }
            Some('(') => {
                self.bump();
                self.skip_ws();
                let inner = self.expression()?;
                self.skip_ws();
                if self.bump() != Some(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some('/') => Ok(ExpressionNode::Pattern(self.pattern()?)),
            Some(_) => Err(self.error("expected an absolute path pattern")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn pattern(&mut self) -> Result<PathPattern> {
        let start = self.pos;
        let mut components = Vec::new();
        loop {
            if self.rest().starts_with("//") {
                self.pos += 2;
                if self.peek() == Some('/') {
                    return Err(self.error("too many '/' in pattern"));
                }
                components.push(PatternComponent::Stretch);
            } else if self.peek() == Some('/') {
                self.bump();
            } else {
                break;
            }
            match self.peek() {
                Some(c) if c == '{' || is_glob_char(c) => components.push(self.element()?),
                _ => {}
            }
        }
        Ok(PathPattern {
            components,
            text: self.src[start..self.pos].to_string(),
        })
    }

    fn element(&mut self) -> Result<PatternComponent> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                c if depth == 0 && !is_glob_char(c) => break,
                _ => {}
            }
            self.bump();
        }
        let text = &self.src[start..self.pos];
        let glob = if text.is_empty() {
            None
        } else {
            Some(Glob::parse(text, start)?)
        };
        let predicate = if self.peek() == Some('{') {
            self.bump();
            self.skip_ws();
            let expr = self.predicate_or()?;
            self.skip_ws();
            if self.bump() != Some('}') {
                return Err(self.error("expected '}' closing predicate"));
            }
            Some(expr)
        } else {
            None
        };
        Ok(PatternComponent::Element { glob, predicate })
    }

    fn at_keyword(&self, word: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(word) && !rest[word.len()..].chars().next().is_some_and(is_word_char)
    }

    fn keyword(&mut self, word: &str) -> bool {
        if self.at_keyword(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    // or := and ('or' and)*
    fn predicate_or(&mut self) -> Result<PredicateExpr> {
        let mut lhs = self.predicate_and()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.keyword("or") {
                self.skip_ws();
                let rhs = self.predicate_and()?;
                lhs = PredicateExpr::Or(Box::new(lhs), Box::new(rhs));
            } else {
                self.pos = save;
                return Ok(lhs);
            }
        }
    }

    // and := unary (['and'] unary)*
    fn predicate_and(&mut self) -> Result<PredicateExpr> {
        let mut lhs = self.predicate_unary()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.keyword("and") {
                self.skip_ws();
            } else if matches!(self.peek(), Some('}' | ')') | None) || self.at_keyword("or") {
                self.pos = save;
                return Ok(lhs);
            }
            let rhs = self.predicate_unary()?;
            lhs = PredicateExpr::And(Box::new(lhs), Box::new(rhs));
        }
    }

    // unary := 'not' unary | '(' or ')' | call
    fn predicate_unary(&mut self) -> Result<PredicateExpr> {
        if self.keyword("not") {
            self.skip_ws();
            return Ok(PredicateExpr::Not(Box::new(self.predicate_unary()?)));
        }
        if self.peek() == Some('(') {
            self.bump();
            self.skip_ws();
            let inner = self.predicate_or()?;
            self.skip_ws();
            if self.bump() != Some(')') {
                return Err(self.error("expected ')'"));
            }
            return Ok(inner);
        }
        self.predicate_call()
    }

    // call := name [':' value | '(' args ')']
    fn predicate_call(&mut self) -> Result<PredicateExpr> {
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected predicate name"));
        }
        let name = Token::new(&self.src[start..self.pos]);
        let mut args = Vec::new();
        match self.peek() {
            Some(':') => {
                self.bump();
                args.push(CallArg {
                    name: None,
                    value: self.value()?,
                });
            }
            Some('(') => {
                self.bump();
                loop {
                    self.skip_ws();
                    if self.peek() == Some(')') {
                        self.bump();
                        break;
                    }
                    args.push(self.call_arg()?);
                    self.skip_ws();
                    match self.bump() {
                        Some(',') => continue,
                        Some(')') => break,
                        _ => return Err(self.error("expected ',' or ')' in predicate arguments")),
                    }
                }
            }
            _ => {}
        }
        Ok(PredicateExpr::Call { name, args })
    }

    fn call_arg(&mut self) -> Result<CallArg> {
        let save = self.pos;
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }
        if self.pos > start && self.peek() == Some('=') {
            let name = Token::new(&self.src[start..self.pos]);
            self.bump();
            return Ok(CallArg {
                name: Some(name),
                value: self.value()?,
            });
        }
        self.pos = save;
        Ok(CallArg {
            name: None,
            value: self.value()?,
        })
    }

    fn value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == q {
                        let text = &self.src[start..self.pos];
                        self.bump();
                        return Ok(Value::String(text.to_string()));
                    }
                    self.bump();
                }
                Err(self.error("unterminated string"))
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && !matches!(c, '}' | ')' | ','))
                {
                    self.bump();
                }
                let word = &self.src[start..self.pos];
                if word.is_empty() {
                    return Err(self.error("expected a value"));
                }
                Ok(parse_word(word))
            }
        }
    }
}

fn is_glob_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '*' | '?' | '[' | ']' | '!' | ':' | '.')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn parse_word(word: &str) -> Value {
    match word {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(i) = word.parse::<i32>() {
                Value::Int(i)
            } else if let Ok(d) = word.parse::<f64>() {
                Value::Double(d)
            } else {
                Value::Token(Token::new(word))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_of(text: &str) -> PathPattern {
        match PathExpression::parse(text).unwrap().root {
            Some(ExpressionNode::Pattern(p)) => p,
            other => panic!("not a single pattern: {other:?}"),
        }
    }

    #[test]
    fn test_glob() {
        let g = Glob::parse("*bar", 0).unwrap();
        assert!(g.matches("foobar"));
        assert!(g.matches("bar"));
        assert!(!g.matches("baz"));

        let g = Glob::parse("Chair[0-9]?", 0).unwrap();
        assert!(g.matches("Chair1a"));
        assert!(!g.matches("Chair1"));
        assert!(!g.matches("ChairX1"));

        let g = Glob::parse("[!A]*", 0).unwrap();
        assert!(g.matches("Bob"));
        assert!(!g.matches("Alice"));
        assert!(Glob::parse("Tab", 0).unwrap().is_literal());
        assert!(Glob::parse("[ab", 0).is_err());
    }

    #[test]
    fn test_pattern_components() {
        let p = pattern_of("//x//a//");
        assert_eq!(p.components().len(), 5);
        assert!(p.ends_with_stretch());
        assert!(!p.has_predicates());

        let p = pattern_of("/A/B");
        assert_eq!(p.components().len(), 2);
        assert!(!p.ends_with_stretch());

        let p = pattern_of("//B/{type:fruit}");
        assert!(p.has_predicates());
        assert_eq!(p.components().len(), 3);
    }

    #[test]
    fn test_predicate_grammar() {
        let p = pattern_of("//{hdPurpose:food and hdHasPrimvar:fresh}");
        let PatternComponent::Element {
            glob: None,
            predicate: Some(PredicateExpr::And(a, b)),
        } = &p.components()[1]
        else {
            panic!("unexpected {:?}", p.components());
        };
        assert!(matches!(&**a, PredicateExpr::Call { name, .. } if name == "hdPurpose"));
        assert!(matches!(&**b, PredicateExpr::Call { name, .. } if name == "hdHasPrimvar"));

        let p = pattern_of("//{hasPrimvar:'foo:glossy'}");
        let PatternComponent::Element {
            predicate: Some(PredicateExpr::Call { args, .. }),
            ..
        } = &p.components()[1]
        else {
            panic!("unexpected {:?}", p.components());
        };
        assert_eq!(args[0].value, Value::String("foo:glossy".into()));

        let expr = PathExpression::parse("//{not hdVisible or eatable(isEatable=false) hdType:mesh}")
            .unwrap();
        assert_eq!(
            expr.predicate_names(),
            vec![Token::new("eatable"), Token::new("hdType"), Token::new("hdVisible")]
        );
    }

    #[test]
    fn test_set_operations() {
        let e = PathExpression::parse("/A + /B & /C - ~/D").unwrap();
        let Some(ExpressionNode::Difference(lhs, rhs)) = e.root() else {
            panic!("unexpected {e:?}");
        };
        assert!(matches!(&**lhs, ExpressionNode::Union(_, r) if matches!(&**r, ExpressionNode::Intersection(_, _))));
        assert!(matches!(&**rhs, ExpressionNode::Complement(_)));

        let e = PathExpression::parse("/A /B").unwrap();
        assert!(matches!(e.root(), Some(ExpressionNode::Union(_, _))));
        let e = PathExpression::parse("(/A//)").unwrap();
        assert!(matches!(e.root(), Some(ExpressionNode::Pattern(_))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(PathExpression::parse("").unwrap().is_empty());
        assert!(PathExpression::parse("   ").unwrap().is_empty());
        let err = PathExpression::parse("A/B").unwrap_err();
        assert!(matches!(err, Error::ExpressionParse { offset: 0, .. }));
        assert!(PathExpression::parse("/A/{hdType:mesh").is_err());
        assert!(PathExpression::parse("(/A").is_err());
        assert!(PathExpression::parse("///A").is_err());
    }
}
