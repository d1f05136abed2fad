use super::cell::CellValue;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Text(String),
    Number(i64),
}

/// Boolean predicate over a table's columns.
///
/// `Display` renders the formula syntax of the hosted table store
/// (`AND(CurrentValue.[finish_week] >= 1, ...)`); in-process adapters evaluate it with
/// [`FilterExpr::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Compare {
        field: String,
        op: CompareOp,
        operand: Operand,
    },
}

impl FilterExpr {
    pub fn text_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Compare {
            field: field.into(),
            op: CompareOp::Eq,
            operand: Operand::Text(value.into()),
        }
    }

    pub fn number(field: impl Into<String>, op: CompareOp, value: i64) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            operand: Operand::Number(value),
        }
    }

    /// Evaluates the predicate, resolving columns by name through `lookup`.
    /// A comparison against a missing cell is false.
    pub fn matches<'a, F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<&'a CellValue>,
    {
        match self {
            Self::And(items) => items.iter().all(|item| item.matches(lookup)),
            Self::Or(items) => items.iter().any(|item| item.matches(lookup)),
            Self::Compare { field, op, operand } => match lookup(field) {
                Some(cell) => compare(cell, *op, operand),
                None => false,
            },
        }
    }
}

fn compare(cell: &CellValue, op: CompareOp, operand: &Operand) -> bool {
    match operand {
        Operand::Number(expected) => match cell.number() {
            Some(actual) => match op {
                CompareOp::Eq => actual == *expected,
                CompareOp::Gt => actual > *expected,
                CompareOp::Gte => actual >= *expected,
                CompareOp::Lt => actual < *expected,
                CompareOp::Lte => actual <= *expected,
            },
            None => false,
        },
        Operand::Text(expected) => {
            if op != CompareOp::Eq {
                return false;
            }
            cell.label().as_deref() == Some(expected.as_str())
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(items) => write_call(f, "AND", items),
            Self::Or(items) => write_call(f, "OR", items),
            Self::Compare { field, op, operand } => {
                write!(f, "CurrentValue.[{field}] {} ", op.symbol())?;
                match operand {
                    Operand::Number(value) => write!(f, "{value}"),
                    Operand::Text(value) => write!(f, "\"{}\"", value.replace('"', "\\\"")),
                }
            }
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, items: &[FilterExpr]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}
