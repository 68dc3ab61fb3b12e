use std::rc::Rc;

use lore_core::Value;
use lore_syntax::{ScriptError, ScriptErrorKind};

use crate::context::ScriptVars;
use crate::holder::ScriptHolder;
use crate::node::Node;
use crate::tree::NodeId;

impl ScriptHolder {
    /// First run of a `random` expression. Constant operands let the node
    /// specialize to a pre-computed picker; a degenerate constant range
    /// collapses to its single value node outright.
    pub(super) fn run_lazy_random(
        &self,
        id: NodeId,
        values: &[NodeId],
        odds: &[NodeId],
        simple: bool,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let pos = self.tree.pos(id);
        vars.engine.note_resolution();

        if simple {
            let lo_val = self.roll_bound(id, values[0], vars)?;
            let hi_val = self.roll_bound(id, values[1], vars)?;
            let (min, max) = if hi_val < lo_val {
                (hi_val, lo_val)
            } else {
                (lo_val, hi_val)
            };
            if self.tree.is_const(values[0]) && self.tree.is_const(values[1]) {
                if min == max {
                    // No randomness at all; the bound node takes this place.
                    let keep = values[0];
                    self.tree.replace_self(id, keep);
                    return Ok(Value::Int(max));
                }
                let new = self
                    .tree
                    .alloc(Node::RandomRange { lo: min, hi: max }, self.tree.parent(id), pos);
                self.tree.replace_self(id, new);
                return self.run_node(new, vars);
            }
            let new = self.tree.alloc(
                Node::RandomRangeVar {
                    lo: values[0],
                    hi: values[1],
                },
                self.tree.parent(id),
                pos,
            );
            self.tree.set_parent(values[0], new);
            self.tree.set_parent(values[1], new);
            self.tree.replace_self(id, new);
            return Ok(Value::Int(vars.engine.roll(min, max)));
        }

        let mut cumulative = Vec::with_capacity(odds.len());
        let mut total = 0i64;
        let mut constant_odds = true;
        for &odd in odds {
            total += self.roll_bound(id, odd, vars)?;
            cumulative.push(total);
            if !self.tree.is_const(odd) {
                constant_odds = false;
            }
        }

        if constant_odds {
            let new = self.tree.alloc(
                Node::RandomConst {
                    values: values.to_vec(),
                    cumulative: Rc::from(cumulative),
                    total,
                },
                self.tree.parent(id),
                pos,
            );
            for &value in values {
                self.tree.set_parent(value, new);
            }
            self.tree.replace_self(id, new);
            return self.run_node(new, vars);
        }

        let new = self.tree.alloc(
            Node::RandomVar {
                values: values.to_vec(),
                odds: odds.to_vec(),
            },
            self.tree.parent(id),
            pos,
        );
        for &child in values.iter().chain(odds) {
            self.tree.set_parent(child, new);
        }
        self.tree.replace_self(id, new);
        let chosen = pick(&cumulative, vars.engine.roll(1, total.max(1)));
        self.run_node(values[chosen], vars)
    }

    pub(super) fn run_random_range_var(
        &self,
        id: NodeId,
        lo: NodeId,
        hi: NodeId,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let lo_val = self.roll_bound(id, lo, vars)?;
        let hi_val = self.roll_bound(id, hi, vars)?;
        let (min, max) = if hi_val < lo_val {
            (hi_val, lo_val)
        } else {
            (lo_val, hi_val)
        };
        Ok(Value::Int(vars.engine.roll(min, max)))
    }

    pub(super) fn run_random_const(
        &self,
        values: &[NodeId],
        cumulative: &[i64],
        total: i64,
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let chosen = pick(cumulative, vars.engine.roll(1, total.max(1)));
        self.run_node(values[chosen], vars)
    }

    pub(super) fn run_random_var(
        &self,
        id: NodeId,
        values: &[NodeId],
        odds: &[NodeId],
        vars: &mut ScriptVars<'_>,
    ) -> Result<Value, ScriptError> {
        let mut cumulative = Vec::with_capacity(odds.len());
        let mut total = 0i64;
        for &odd in odds {
            total += self.roll_bound(id, odd, vars)?;
            cumulative.push(total);
        }
        let chosen = pick(&cumulative, vars.engine.roll(1, total.max(1)));
        self.run_node(values[chosen], vars)
    }

    fn roll_bound(
        &self,
        id: NodeId,
        bound: NodeId,
        vars: &mut ScriptVars<'_>,
    ) -> Result<i64, ScriptError> {
        let value = self.run_node(bound, vars)?;
        value.to_i64().ok_or_else(|| {
            self.err(
                self.tree.pos(id),
                ScriptErrorKind::Raw(format!(
                    "Random expression operand must be numeric, got {}",
                    value.type_name()
                )),
            )
        })
    }
}

fn pick(cumulative: &[i64], rolled: i64) -> usize {
    for (index, &bound) in cumulative.iter().enumerate() {
        if rolled <= bound {
            return index;
        }
    }
    cumulative.len().saturating_sub(1)
}
