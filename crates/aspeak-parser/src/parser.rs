//! Recursive-descent parser for agent programs.
//!
//! The grammar is a conventional precedence ladder (loosest to tightest):
//! `|`, `&`, prefix `not`, chained comparisons, additive, multiplicative,
//! prefix sign, right-associative `**`, primaries. Comparison chains like
//! `A < B < C` fold pairwise under `&`. Every operator application goes
//! through the smart constructors, so expressions partially evaluate while
//! being parsed and malformed operand types are rejected at load time.

use aspeak_core::ops;
use aspeak_core::{
    AgentProgram, BeliefAtom, BodyFormula, FormulaKind, GoalKind, Plan, Rule, Term, TermError,
    TriggerKind, Variable,
};

use crate::error::{Location, ParseError};
use crate::lexer::{tokenize, Spanned, Token};

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn location(&self) -> Location {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|s| s.location)
            .unwrap_or(Location { line: 1, column: 1 })
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: spanned.token.to_string(),
                location: spanned.location,
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn term_error(&self, source: TermError) -> ParseError {
        ParseError::Term {
            source,
            location: self.location(),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self) -> Result<Term, ParseError> {
        let mut value = self.parse_and()?;
        while self.eat(&Token::Pipe) {
            let rhs = self.parse_and()?;
            value = ops::or(value, rhs).map_err(|e| self.term_error(e))?;
        }
        Ok(value)
    }

    fn parse_and(&mut self) -> Result<Term, ParseError> {
        let mut value = self.parse_not()?;
        while self.eat(&Token::Amp) {
            let rhs = self.parse_not()?;
            value = ops::and(value, rhs).map_err(|e| self.term_error(e))?;
        }
        Ok(value)
    }

    fn parse_not(&mut self) -> Result<Term, ParseError> {
        if self.eat(&Token::Not) {
            let operand = self.parse_not()?;
            ops::not(operand).map_err(|e| self.term_error(e))
        } else {
            self.parse_comparison()
        }
    }

    /// Comparison chains fold pairwise: `A < B =.. C` becomes
    /// `(A < B) & (B =.. C)` with each link built from the previous
    /// right-hand side.
    fn parse_comparison(&mut self) -> Result<Term, ParseError> {
        let first = self.parse_arith()?;

        let mut value = first;
        let mut last: Option<Term> = None;
        let mut acc = Term::Bool(true);

        loop {
            let op = match self.peek() {
                Some(Token::Lte) => Token::Lte,
                Some(Token::Gte) => Token::Gte,
                Some(Token::Eq) => Token::Eq,
                Some(Token::Neq) => Token::Neq,
                Some(Token::Deconstruct) => Token::Deconstruct,
                Some(Token::Unify) => Token::Unify,
                Some(Token::Lt) => Token::Lt,
                Some(Token::Gt) => Token::Gt,
                _ => break,
            };
            self.pos += 1;

            let lhs = last.take().unwrap_or_else(|| value.clone());
            let rhs = self.parse_arith()?;

            let link = match op {
                Token::Lte => ops::lte(lhs, rhs.clone()),
                Token::Gte => ops::lte(rhs.clone(), lhs),
                Token::Eq => ops::eq(lhs, rhs.clone()),
                Token::Neq => ops::neq(lhs, rhs.clone()),
                Token::Deconstruct => ops::deconstruct(lhs, rhs.clone()),
                Token::Unify => ops::unifies(lhs, rhs.clone()),
                Token::Lt => ops::lt(lhs, rhs.clone()),
                Token::Gt => ops::lt(rhs.clone(), lhs),
                _ => unreachable!(),
            }
            .map_err(|e| self.term_error(e))?;

            acc = ops::and(acc, link).map_err(|e| self.term_error(e))?;
            value = acc.clone();
            last = Some(rhs);
        }

        Ok(value)
    }

    fn parse_arith(&mut self) -> Result<Term, ParseError> {
        let mut value = self.parse_product()?;
        loop {
            if self.eat(&Token::Plus) {
                let rhs = self.parse_product()?;
                value = ops::add(value, rhs).map_err(|e| self.term_error(e))?;
            } else if self.eat(&Token::Minus) {
                let rhs = self.parse_product()?;
                value = ops::sub(value, rhs).map_err(|e| self.term_error(e))?;
            } else if self.eat(&Token::MinusPlus) {
                // `a -+ b` is a subtraction with an explicit unary plus.
                let rhs = self.parse_product()?;
                let rhs = ops::pos(rhs).map_err(|e| self.term_error(e))?;
                value = ops::sub(value, rhs).map_err(|e| self.term_error(e))?;
            } else {
                break;
            }
        }
        Ok(value)
    }

    fn parse_product(&mut self) -> Result<Term, ParseError> {
        let mut value = self.parse_factor()?;
        loop {
            if self.eat(&Token::Star) {
                let rhs = self.parse_factor()?;
                value = ops::mul(value, rhs).map_err(|e| self.term_error(e))?;
            } else if self.eat(&Token::Slash) {
                let rhs = self.parse_factor()?;
                value = ops::div(value, rhs).map_err(|e| self.term_error(e))?;
            } else if self.eat(&Token::Div) {
                let rhs = self.parse_factor()?;
                value = ops::idiv(value, rhs).map_err(|e| self.term_error(e))?;
            } else if self.eat(&Token::Mod) {
                let rhs = self.parse_factor()?;
                value = ops::modulo(value, rhs).map_err(|e| self.term_error(e))?;
            } else {
                break;
            }
        }
        Ok(value)
    }

    fn parse_factor(&mut self) -> Result<Term, ParseError> {
        if self.eat(&Token::Minus) {
            let operand = self.parse_factor()?;
            ops::neg(operand).map_err(|e| self.term_error(e))
        } else if self.eat(&Token::Plus) {
            let operand = self.parse_factor()?;
            ops::pos(operand).map_err(|e| self.term_error(e))
        } else {
            self.parse_power()
        }
    }

    fn parse_power(&mut self) -> Result<Term, ParseError> {
        let mut value = self.parse_primary()?;
        while self.eat(&Token::StarStar) {
            // The right side is a factor, so `2 ** -3` and chained powers
            // associate to the right.
            let rhs = self.parse_factor()?;
            value = ops::pow(value, rhs).map_err(|e| self.term_error(e))?;
        }
        Ok(value)
    }

    fn parse_primary(&mut self) -> Result<Term, ParseError> {
        match self.peek().cloned() {
            Some(Token::Variable(name)) => {
                self.pos += 1;
                Ok(Term::Var(Variable::new(name)))
            }
            Some(Token::Number(value)) => {
                self.pos += 1;
                Ok(Term::Num(value))
            }
            Some(Token::Bool(value)) => {
                self.pos += 1;
                Ok(Term::Bool(value))
            }
            Some(Token::Str(value)) => {
                self.pos += 1;
                Ok(Term::Str(value))
            }
            Some(Token::LBracket) => self.parse_list(),
            Some(Token::Functor(_)) => Ok(Term::Atom(self.parse_belief_atom()?)),
            Some(Token::LParen) => {
                self.pos += 1;
                let value = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            _ => Err(self.unexpected("a term")),
        }
    }

    fn parse_list(&mut self) -> Result<Term, ParseError> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();

        if self.peek() != Some(&Token::RBracket) {
            loop {
                items.push(self.parse_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::RBracket)?;
        Ok(Term::List(items))
    }

    fn parse_belief_atom(&mut self) -> Result<BeliefAtom, ParseError> {
        let functor = match self.peek() {
            Some(Token::Functor(name)) => name.clone(),
            _ => return Err(self.unexpected("a functor")),
        };
        self.pos += 1;

        let mut terms = Vec::new();
        if self.eat(&Token::LParen) {
            loop {
                terms.push(self.parse_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }

        Ok(BeliefAtom::new(functor, terms))
    }

    // ------------------------------------------------------------------
    // Program statements
    // ------------------------------------------------------------------

    fn check_context(&self, term: &Term) -> Result<(), ParseError> {
        if term.is_valid_context() {
            Ok(())
        } else {
            Err(ParseError::InvalidContext {
                term: term.to_string(),
                location: self.location(),
            })
        }
    }

    fn parse_plan(&mut self) -> Result<Plan, ParseError> {
        let trigger = if self.eat(&Token::Plus) {
            TriggerKind::Add
        } else if self.eat(&Token::Minus) {
            TriggerKind::Remove
        } else {
            return Err(self.unexpected("'+' or '-'"));
        };

        let goal = if self.eat(&Token::Bang) {
            GoalKind::Achieve
        } else if self.eat(&Token::Question) {
            GoalKind::Test
        } else {
            GoalKind::Belief
        };

        let head = self.parse_belief_atom()?;

        let context = if self.eat(&Token::Colon) {
            let context = self.parse_expr()?;
            self.check_context(&context)?;
            context
        } else {
            Term::Bool(true)
        };

        let body = if self.eat(&Token::Arrow) {
            let mut body = vec![self.parse_body_formula()?];
            while self.eat(&Token::Semicolon) {
                body.push(self.parse_body_formula()?);
            }
            body
        } else {
            // An empty concrete body runs the no-op term formula.
            vec![BodyFormula::default()]
        };

        Ok(Plan {
            trigger,
            goal,
            head,
            context,
            body,
        })
    }

    fn parse_body_formula(&mut self) -> Result<BodyFormula, ParseError> {
        let kind = if self.eat(&Token::Question) {
            FormulaKind::Test
        } else if self.eat(&Token::BangBang) {
            FormulaKind::AchieveLater
        } else if self.eat(&Token::Bang) {
            FormulaKind::Achieve
        } else if self.eat(&Token::Plus) {
            FormulaKind::Add
        } else if self.eat(&Token::MinusPlus) {
            FormulaKind::Replace
        } else if self.eat(&Token::Minus) {
            FormulaKind::Remove
        } else {
            FormulaKind::Term
        };

        let term = self.parse_expr()?;
        Ok(BodyFormula { kind, term })
    }

    /// A belief statement: ground atoms go to the belief base, non-ground
    /// but unifiable atoms become implicit rules asserting `true`.
    fn load_belief(&self, program: &mut AgentProgram, atom: BeliefAtom) -> Result<(), ParseError> {
        if atom.is_ground() {
            program.beliefs.push(atom);
        } else if Term::Atom(atom.clone()).is_unifiable() {
            program.rules.push(Rule {
                lhs: atom,
                rhs: Term::Bool(true),
            });
        } else {
            return Err(ParseError::InvalidBelief {
                atom: atom.to_string(),
                location: self.location(),
            });
        }
        Ok(())
    }

    fn parse_program(&mut self) -> Result<AgentProgram, ParseError> {
        let mut program = AgentProgram::default();

        while self.peek().is_some() {
            match self.peek() {
                Some(Token::Functor(_)) => {
                    let atom = self.parse_belief_atom()?;
                    if self.eat(&Token::RuleArrow) {
                        if !Term::Atom(atom.clone()).is_unifiable() {
                            return Err(ParseError::InvalidRuleHead {
                                atom: atom.to_string(),
                                location: self.location(),
                            });
                        }
                        let rhs = self.parse_expr()?;
                        self.check_context(&rhs)?;
                        program.rules.push(Rule { lhs: atom, rhs });
                    } else {
                        self.load_belief(&mut program, atom)?;
                    }
                }
                Some(Token::Bang) => {
                    self.pos += 1;
                    let goal = self.parse_belief_atom()?;
                    program.goals.push(goal);
                }
                Some(Token::Plus | Token::Minus) => {
                    program.plans.push(self.parse_plan()?);
                }
                _ => return Err(self.unexpected("a belief, rule, goal, or plan")),
            }

            self.expect(Token::Dot)?;
        }

        Ok(program)
    }
}

/// Parses a complete agent program.
pub fn parse_program(source: &str) -> Result<AgentProgram, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    parser.parse_program()
}

/// Parses a single term (used by tests and diagnostics).
pub fn parse_term(source: &str) -> Result<Term, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let term = parser.parse_expr()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(term)
}
