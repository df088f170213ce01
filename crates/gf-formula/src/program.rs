// Copyright 2025 the gf-sdk authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Compiled tuning formulas and their stack-machine evaluator.

use std::collections::HashMap;

use gf_core::{GfError, Tuning};
use log::debug;

use crate::error::{FormulaError, FormulaResult};
use crate::parser::{parse, BinOp, Builtin, Expr, Statement};
use crate::token::tokenize;

/// The tunable outputs a formula may assign, in slot order.
const OUTPUTS: [&str; 3] = ["target_fps", "drop_fps", "ema_alpha"];

/// One stack-machine instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    /// Push a literal.
    Push(f64),
    /// Push the value of a variable slot.
    Load(usize),
    /// Pop into a variable slot.
    Store(usize),
    /// Negate the top of stack.
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    /// Pop two, push the smaller.
    Min,
    /// Pop two, push the larger.
    Max,
    /// Pop `x, lo, hi`, push `x` limited to `[lo, hi]`.
    Clamp,
}

/// A compiled tuning formula.
///
/// Compilation resolves every identifier to a variable slot: the three
/// tunable outputs occupy the first slots and double as inputs seeded
/// from the current [`Tuning`]; every other name is a parameter that
/// must be bound through [`Program::set_param`] before it is read.
/// Evaluation is a plain f64 stack machine with no recursion and no
/// allocation beyond the value stack.
#[derive(Debug, Clone)]
pub struct Program {
    ops: Vec<Op>,
    names: Vec<String>,
    params: HashMap<String, f64>,
}

impl Program {
    /// Compiles formula source into a runnable program.
    pub fn compile(source: &str) -> FormulaResult<Self> {
        let tokens = tokenize(source)?;
        let statements = parse(&tokens)?;

        let mut ops = Vec::new();
        let mut names: Vec<String> = OUTPUTS.iter().map(|name| name.to_string()).collect();
        for statement in &statements {
            let Statement {
                target,
                line,
                column,
                expr,
            } = statement;
            if !OUTPUTS.contains(&target.as_str()) {
                return Err(FormulaError::UnknownOutput {
                    name: target.clone(),
                    line: *line,
                    column: *column,
                });
            }
            emit(expr, &mut ops, &mut names);
            let slot = slot_of(&mut names, target);
            ops.push(Op::Store(slot));
        }
        debug!(
            "compiled formula: {} statements, {} ops, {} names",
            statements.len(),
            ops.len(),
            names.len()
        );
        Ok(Self {
            ops,
            names,
            params: HashMap::new(),
        })
    }

    /// Binds or rebinds a named parameter for subsequent applies.
    ///
    /// Binding a name the program never reads is harmless.
    pub fn set_param(&mut self, name: &str, value: f64) {
        self.params.insert(name.to_string(), value);
    }

    /// Names the program reads that are neither outputs nor bound yet.
    pub fn unbound_params(&self) -> Vec<&str> {
        self.names
            .iter()
            .skip(OUTPUTS.len())
            .filter(|name| !self.params.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Evaluates the program against the current tuning and returns the
    /// adjusted one.
    ///
    /// The three outputs start at their current values, so a formula
    /// that assigns only `drop_fps` leaves the other knobs untouched.
    /// Outputs are checked against the tuning range rules before being
    /// returned; the current tuning is never modified.
    pub fn apply(&self, current: &Tuning) -> FormulaResult<Tuning> {
        let mut env: Vec<Option<f64>> = self
            .names
            .iter()
            .map(|name| match name.as_str() {
                "target_fps" => Some(f64::from(current.target_fps)),
                "drop_fps" => Some(f64::from(current.drop_fps)),
                "ema_alpha" => Some(f64::from(current.ema_alpha)),
                other => self.params.get(other).copied(),
            })
            .collect();

        let mut stack: Vec<f64> = Vec::with_capacity(8);
        for op in &self.ops {
            match *op {
                Op::Push(value) => stack.push(value),
                Op::Load(slot) => match env[slot] {
                    Some(value) => stack.push(value),
                    None => {
                        return Err(FormulaError::UnboundParameter {
                            name: self.names[slot].clone(),
                        })
                    }
                },
                Op::Store(slot) => env[slot] = Some(pop(&mut stack)),
                Op::Neg => {
                    let value = pop(&mut stack);
                    stack.push(-value);
                }
                Op::Add => {
                    let (lhs, rhs) = pop2(&mut stack);
                    stack.push(lhs + rhs);
                }
                Op::Sub => {
                    let (lhs, rhs) = pop2(&mut stack);
                    stack.push(lhs - rhs);
                }
                Op::Mul => {
                    let (lhs, rhs) = pop2(&mut stack);
                    stack.push(lhs * rhs);
                }
                Op::Div => {
                    let (lhs, rhs) = pop2(&mut stack);
                    if rhs == 0.0 {
                        return Err(FormulaError::DivisionByZero);
                    }
                    stack.push(lhs / rhs);
                }
                Op::Min => {
                    let (lhs, rhs) = pop2(&mut stack);
                    stack.push(lhs.min(rhs));
                }
                Op::Max => {
                    let (lhs, rhs) = pop2(&mut stack);
                    stack.push(lhs.max(rhs));
                }
                Op::Clamp => {
                    let hi = pop(&mut stack);
                    let lo = pop(&mut stack);
                    let value = pop(&mut stack);
                    // Inverted bounds resolve to the upper bound rather
                    // than trapping.
                    stack.push(value.max(lo).min(hi));
                }
            }
        }

        // Saturating float-to-int casts; the validation below rejects
        // anything the saturation distorted.
        let candidate = Tuning {
            target_fps: output(&env, 0).round() as u32,
            drop_fps: output(&env, 1).round() as u32,
            ema_alpha: output(&env, 2) as f32,
        };
        if let Err(err) = candidate.validate() {
            let (field, reason) = match err {
                GfError::InvalidTuning { field, reason } => (field, reason),
                other => ("tuning", other.to_string()),
            };
            let value = match field {
                "target_fps" => output(&env, 0),
                "drop_fps" => output(&env, 1),
                _ => output(&env, 2),
            };
            return Err(FormulaError::OutOfRange {
                field,
                value,
                reason,
            });
        }
        Ok(candidate)
    }
}

fn emit(expr: &Expr, ops: &mut Vec<Op>, names: &mut Vec<String>) {
    match expr {
        Expr::Number(value) => ops.push(Op::Push(*value)),
        Expr::Ident(name) => {
            let slot = slot_of(names, name);
            ops.push(Op::Load(slot));
        }
        Expr::Neg(inner) => {
            emit(inner, ops, names);
            ops.push(Op::Neg);
        }
        Expr::Binary { op, lhs, rhs } => {
            emit(lhs, ops, names);
            emit(rhs, ops, names);
            ops.push(match op {
                BinOp::Add => Op::Add,
                BinOp::Sub => Op::Sub,
                BinOp::Mul => Op::Mul,
                BinOp::Div => Op::Div,
            });
        }
        Expr::Call { builtin, args } => {
            for arg in args {
                emit(arg, ops, names);
            }
            ops.push(match builtin {
                Builtin::Min => Op::Min,
                Builtin::Max => Op::Max,
                Builtin::Clamp => Op::Clamp,
            });
        }
    }
}

fn slot_of(names: &mut Vec<String>, name: &str) -> usize {
    if let Some(slot) = names.iter().position(|known| known == name) {
        slot
    } else {
        names.push(name.to_string());
        names.len() - 1
    }
}

/// The first three slots are seeded from the current tuning and can
/// never be unbound.
fn output(env: &[Option<f64>], slot: usize) -> f64 {
    env[slot].unwrap_or(f64::NAN)
}

// Compilation emits balanced ops; an underflow here is a compiler bug.
fn pop(stack: &mut Vec<f64>) -> f64 {
    debug_assert!(!stack.is_empty(), "value stack underflow");
    stack.pop().unwrap_or(0.0)
}

fn pop2(stack: &mut Vec<f64>) -> (f64, f64) {
    let rhs = pop(stack);
    let lhs = pop(stack);
    (lhs, rhs)
}
