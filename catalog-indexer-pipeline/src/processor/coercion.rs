//! Declared per-field coercion rules.
//!
//! Each indexed field has exactly one rule naming its target type and what
//! happens to nulls. A column is coerced as a whole: the first cell that
//! cannot be cast, or a null where nulls are not allowed, fails the column.

use rust_decimal::prelude::ToPrimitive;

use crate::errors::PipelineError;
use crate::source::{Cell, ColumnKind};
use catalog_indexer_shared::fields;

/// Type a field is cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Integer,
    Float,
    Text,
}

impl From<TargetKind> for ColumnKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Integer => ColumnKind::Integer,
            TargetKind::Float => ColumnKind::Float,
            TargetKind::Text => ColumnKind::Text,
        }
    }
}

/// What a rule does with a null cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Nulls stay null and the field is left out of the document.
    PropagateNull,
    /// A null fails the run.
    FailOnNull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionRule {
    pub field: String,
    pub target: TargetKind,
    pub null_policy: NullPolicy,
}

impl CoercionRule {
    pub fn new(field: impl Into<String>, target: TargetKind, null_policy: NullPolicy) -> Self {
        Self {
            field: field.into(),
            target,
            null_policy,
        }
    }

    /// Cast one cell. `row` is only used for the error message.
    pub fn apply(&self, row: usize, cell: Cell) -> Result<Cell, PipelineError> {
        if cell.is_null() {
            return match self.null_policy {
                NullPolicy::PropagateNull => Ok(Cell::Null),
                NullPolicy::FailOnNull => Err(PipelineError::coercion(
                    &self.field,
                    format!("row {}: null value not allowed", row),
                )),
            };
        }

        let fail = |reason: String| PipelineError::coercion(&self.field, format!("row {}: {}", row, reason));

        match self.target {
            TargetKind::Float => match cell {
                Cell::Float(f) => Ok(Cell::Float(f)),
                Cell::Integer(i) => Ok(Cell::Float(i as f64)),
                Cell::Decimal(d) => d
                    .to_f64()
                    .map(Cell::Float)
                    .ok_or_else(|| fail(format!("decimal {} is out of float range", d))),
                Cell::Text(s) => match s.trim().parse::<f64>() {
                    Ok(f) if !f.is_nan() => Ok(Cell::Float(f)),
                    _ => Err(fail(format!("'{}' is not a number", s))),
                },
                Cell::Bool(b) => Err(fail(format!("boolean {} cannot be cast to float", b))),
                Cell::Null => Ok(Cell::Null),
            },
            TargetKind::Integer => match cell {
                Cell::Integer(i) => Ok(Cell::Integer(i)),
                Cell::Float(f) => {
                    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                        Ok(Cell::Integer(f as i64))
                    } else {
                        Err(fail(format!("{} is not an integer", f)))
                    }
                }
                Cell::Decimal(d) => {
                    if d.fract().is_zero() {
                        d.to_i64()
                            .map(Cell::Integer)
                            .ok_or_else(|| fail(format!("decimal {} is out of integer range", d)))
                    } else {
                        Err(fail(format!("{} is not an integer", d)))
                    }
                }
                Cell::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Cell::Integer)
                    .map_err(|_| fail(format!("'{}' is not an integer", s))),
                Cell::Bool(b) => Err(fail(format!("boolean {} cannot be cast to integer", b))),
                Cell::Null => Ok(Cell::Null),
            },
            TargetKind::Text => Ok(match cell {
                Cell::Text(s) => Cell::Text(s),
                Cell::Integer(i) => Cell::Text(i.to_string()),
                Cell::Float(f) => Cell::Text(f.to_string()),
                Cell::Decimal(d) => Cell::Text(d.to_string()),
                Cell::Bool(b) => Cell::Text(b.to_string()),
                Cell::Null => Cell::Null,
            }),
        }
    }
}

/// The full rule table, one rule per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionRules {
    rules: Vec<CoercionRule>,
}

impl CoercionRules {
    /// Rules for the indexed product fields.
    ///
    /// `list_price` and `weight` are non-null by the view filter. `stock_level`
    /// has no such guarantee and a null one fails the run.
    pub fn products() -> Self {
        use NullPolicy::*;
        use TargetKind::*;

        Self {
            rules: vec![
                CoercionRule::new(fields::PRODUCT_ID, Integer, FailOnNull),
                CoercionRule::new(fields::NAME, Text, PropagateNull),
                CoercionRule::new(fields::PRODUCT_NUMBER, Text, PropagateNull),
                CoercionRule::new(fields::COLOR, Text, PropagateNull),
                CoercionRule::new(fields::LIST_PRICE, Float, FailOnNull),
                CoercionRule::new(fields::SIZE, Text, PropagateNull),
                CoercionRule::new(fields::WEIGHT, Float, PropagateNull),
                CoercionRule::new(fields::STOCK_LEVEL, Integer, FailOnNull),
                CoercionRule::new(fields::PRODUCT_MODEL_ID, Integer, PropagateNull),
            ],
        }
    }

    /// Replace the rule for `rule.field`, or add it if the field has none.
    ///
    /// A replacement may change the null policy but not the target type: the
    /// document field a column lands in has a fixed type, and a cell of any
    /// other type would be dropped from the document.
    pub fn with_rule(mut self, rule: CoercionRule) -> Result<Self, PipelineError> {
        match self.rules.iter_mut().find(|r| r.field == rule.field) {
            Some(existing) if existing.target != rule.target => {
                return Err(PipelineError::coercion(
                    &rule.field,
                    format!(
                        "rule targets {:?} but the document field is {:?}",
                        rule.target, existing.target
                    ),
                ));
            }
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&CoercionRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoercionRule> {
        self.rules.iter()
    }
}

impl Default for CoercionRules {
    fn default() -> Self {
        Self::products()
    }
}
