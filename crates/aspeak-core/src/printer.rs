//! Canonical source-form rendering of terms, plans, and programs.
//!
//! The output round-trips through the concrete grammar: operators are
//! parenthesized infix, strings are quoted with `"` and `\` escaped, and
//! plans are laid out the way they are written in source files.

use std::fmt;

use crate::program::{AgentProgram, BodyFormula, FormulaKind, GoalKind, Plan, Rule, TriggerKind};
use crate::term::{BeliefAtom, BinaryOp, Term, UnaryOp, Variable};

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Pos => write!(f, "+"),
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Pow => "**",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IDiv => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Unify => "=",
            BinaryOp::Deconstruct => "=..",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "\\==",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for BeliefAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.functor)?;

        if !self.terms.is_empty() {
            write!(f, "(")?;
            for (i, term) in self.terms.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{term}")?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Bool(true) => write!(f, "true"),
            Term::Bool(false) => write!(f, "false"),
            Term::Num(n) => write!(f, "{n}"),
            Term::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' | '\\' => write!(f, "\\{c}")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            Term::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Term::Atom(atom) => write!(f, "{atom}"),
            Term::Var(var) => write!(f, "{var}"),
            Term::Unary(UnaryOp::Not, operand) => write!(f, "not {operand}"),
            Term::Unary(op, operand) => write!(f, "({op}{operand})"),
            Term::Binary(BinaryOp::Pow, left, right) => write!(f, "({left}**{right})"),
            Term::Binary(op, left, right) => write!(f, "({left} {op} {right})"),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- {}", self.lhs, self.rhs)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Add => write!(f, "+"),
            TriggerKind::Remove => write!(f, "-"),
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalKind::Achieve => write!(f, "!"),
            GoalKind::Test => write!(f, "?"),
            GoalKind::Belief => Ok(()),
        }
    }
}

impl fmt::Display for BodyFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            FormulaKind::Term => "",
            FormulaKind::Test => "?",
            FormulaKind::Achieve => "!",
            FormulaKind::AchieveLater => "!!",
            FormulaKind::Add => "+",
            FormulaKind::Remove => "-",
            FormulaKind::Replace => "-+",
        };
        write!(f, "{marker}{}", self.term)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.trigger, self.goal, self.head)?;
        write!(f, " : {}", self.context)?;
        writeln!(f, " <-")?;

        for (i, formula) in self.body.iter().enumerate() {
            write!(f, "    {formula}")?;
            if i + 1 < self.body.len() {
                writeln!(f, ";")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for AgentProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for belief in &self.beliefs {
            writeln!(f, "{belief}.")?;
        }
        writeln!(f)?;

        for rule in &self.rules {
            writeln!(f, "{rule}.")?;
        }
        writeln!(f)?;

        for goal in &self.goals {
            writeln!(f, "!{goal}.")?;
        }
        writeln!(f)?;

        for (i, plan) in self.plans.iter().enumerate() {
            writeln!(f, "{plan}.")?;
            if i + 1 < self.plans.len() {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
