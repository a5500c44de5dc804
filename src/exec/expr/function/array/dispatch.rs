// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::collections::HashMap;

use arrow::datatypes::DataType;

use crate::arrayfn_logging::{debug, warn};
use crate::common::config::log_function_calls;
use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::{Chunk, Column};
use crate::exec::expr::function::{FunctionKind, lookup_function};

use super::array_pop::PopSide;
use super::array_push::PushSide;

#[derive(Clone, Copy, Debug)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
}

impl FunctionMeta {
    fn expected_args(&self) -> String {
        if self.min_args == self.max_args {
            self.min_args.to_string()
        } else if self.max_args == usize::MAX {
            format!("at least {}", self.min_args)
        } else if self.max_args == self.min_args + 1 {
            format!("{} or {}", self.min_args, self.max_args)
        } else {
            format!("from {} to {}", self.min_args, self.max_args)
        }
    }

    fn check_arity(&self, passed: usize) -> Result<()> {
        if passed < self.min_args || passed > self.max_args {
            return Err(FunctionError::NumberOfArgumentsMismatch {
                name: self.name.to_string(),
                passed,
                expected: self.expected_args(),
            });
        }
        Ok(())
    }
}

pub fn register(map: &mut HashMap<&'static str, FunctionKind>) {
    for (name, canonical) in ARRAY_FUNCTIONS {
        map.insert(*name, FunctionKind::Array(*canonical));
    }
}

pub fn metadata(name: &str) -> Option<FunctionMeta> {
    ARRAY_METADATA.iter().find(|m| m.name == name).copied()
}

/// Resolves a user-facing name (any case, any alias) to its metadata.
fn resolve(name: &str) -> Result<FunctionMeta> {
    let Some(FunctionKind::Array(canonical)) = lookup_function(name) else {
        return Err(FunctionError::logical(format!("Unknown array function {}", name)));
    };
    metadata(canonical)
        .ok_or_else(|| FunctionError::logical(format!("no metadata for function {}", canonical)))
}

/// Output type of `name` applied to `args`. Only argument types and the
/// values of constant arguments are consulted.
pub fn return_type(name: &str, args: &[Column]) -> Result<DataType> {
    let meta = resolve(name)?;
    meta.check_arity(args.len())?;
    match meta.name {
        "array" => super::array_construct::return_type_array(args),
        "arrayElement" => super::array_element::return_type_array_element(args),
        "arrayEnumerate" => super::array_enumerate::return_type_array_enumerate(args),
        "arrayUniq" => super::array_uniq::return_type_array_uniq(args),
        "arrayEnumerateUniq" => {
            super::array_enumerate_uniq::return_type_array_enumerate_uniq(args)
        }
        "arrayConcat" => super::array_concat::return_type_array_concat(args),
        "arraySlice" => super::array_slice::return_type_array_slice(args),
        "arrayPushBack" => super::array_push::return_type_array_push(args, PushSide::Back),
        "arrayPushFront" => super::array_push::return_type_array_push(args, PushSide::Front),
        "arrayPopBack" => super::array_pop::return_type_array_pop(args, PopSide::Back),
        "arrayPopFront" => super::array_pop::return_type_array_pop(args, PopSide::Front),
        "arrayReverse" => super::array_reverse::return_type_array_reverse(args),
        "emptyArrayToSingle" => {
            super::empty_array_to_single::return_type_empty_array_to_single(args)
        }
        "range" => super::range::return_type_range(args),
        "arrayReduce" => super::array_reduce::return_type_array_reduce(args),
        other => Err(FunctionError::logical(format!(
            "unsupported array function: {}",
            other
        ))),
    }
}

/// Evaluates `name` over `rows` rows. `result_type` must come from
/// [`return_type`] for the same arguments.
pub fn eval_array_function(
    name: &str,
    args: &[Column],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    let meta = resolve(name)?;
    meta.check_arity(args.len())?;
    if let Some(pos) = args.iter().position(|arg| arg.len() != rows) {
        return Err(FunctionError::logical(format!(
            "argument {} of {} has {} rows, expected {}",
            pos + 1,
            meta.name,
            args[pos].len(),
            rows
        )));
    }
    if log_function_calls() {
        debug!(
            "eval {} rows={} args={} result_type={}",
            meta.name,
            rows,
            args.len(),
            result_type
        );
    }

    let result = eval_canonical(meta.name, args, result_type, rows);
    match result {
        Ok(column) if column.len() != rows => Err(FunctionError::logical(format!(
            "{} produced {} rows, expected {}",
            meta.name,
            column.len(),
            rows
        ))),
        Ok(column) => Ok(column),
        Err(err) => {
            warn!("{} failed: {} ({})", meta.name, err, err.kind());
            Err(err)
        }
    }
}

fn eval_canonical(
    canonical: &str,
    args: &[Column],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    match canonical {
        "array" => super::array_construct::eval_array(args, result_type, rows),
        "arrayElement" => super::array_element::eval_array_element(args, result_type, rows),
        "arrayEnumerate" => super::array_enumerate::eval_array_enumerate(args, result_type, rows),
        "arrayUniq" => super::array_uniq::eval_array_uniq(args, result_type, rows),
        "arrayEnumerateUniq" => {
            super::array_enumerate_uniq::eval_array_enumerate_uniq(args, result_type, rows)
        }
        "arrayConcat" => super::array_concat::eval_array_concat(args, result_type, rows),
        "arraySlice" => super::array_slice::eval_array_slice(args, result_type, rows),
        "arrayPushBack" => {
            super::array_push::eval_array_push(args, result_type, rows, PushSide::Back)
        }
        "arrayPushFront" => {
            super::array_push::eval_array_push(args, result_type, rows, PushSide::Front)
        }
        "arrayPopBack" => super::array_pop::eval_array_pop(args, result_type, rows, PopSide::Back),
        "arrayPopFront" => {
            super::array_pop::eval_array_pop(args, result_type, rows, PopSide::Front)
        }
        "arrayReverse" => super::array_reverse::eval_array_reverse(args, result_type, rows),
        "emptyArrayToSingle" => {
            super::empty_array_to_single::eval_empty_array_to_single(args, result_type, rows)
        }
        "range" => super::range::eval_range(args, result_type, rows),
        "arrayReduce" => super::array_reduce::eval_array_reduce(args, result_type, rows),
        other => Err(FunctionError::logical(format!(
            "unsupported array function: {}",
            other
        ))),
    }
}

/// Runs `name` over the chunk columns at `arg_positions` and appends the
/// result. Returns the position of the new column.
pub fn execute(name: &str, chunk: &mut Chunk, arg_positions: &[usize]) -> Result<usize> {
    let args = arg_positions
        .iter()
        .map(|pos| chunk.column(*pos).cloned())
        .collect::<Result<Vec<_>>>()?;
    let result_type = return_type(name, &args)?;
    let column = eval_array_function(name, &args, &result_type, chunk.len())?;
    chunk.push_column(column)
}

/// Lowercase lookup keys and the canonical name each resolves to.
static ARRAY_FUNCTIONS: &[(&str, &str)] = &[
    ("array", "array"),
    ("array_construct", "array"),
    ("arrayelement", "arrayElement"),
    ("array_element", "arrayElement"),
    ("element_at", "arrayElement"),
    ("arrayenumerate", "arrayEnumerate"),
    ("array_enumerate", "arrayEnumerate"),
    ("arrayuniq", "arrayUniq"),
    ("array_uniq", "arrayUniq"),
    ("arrayenumerateuniq", "arrayEnumerateUniq"),
    ("array_enumerate_uniq", "arrayEnumerateUniq"),
    ("arrayconcat", "arrayConcat"),
    ("array_concat", "arrayConcat"),
    ("arrayslice", "arraySlice"),
    ("array_slice", "arraySlice"),
    ("arraypushback", "arrayPushBack"),
    ("array_push_back", "arrayPushBack"),
    ("arraypushfront", "arrayPushFront"),
    ("array_push_front", "arrayPushFront"),
    ("arraypopback", "arrayPopBack"),
    ("array_pop_back", "arrayPopBack"),
    ("arraypopfront", "arrayPopFront"),
    ("array_pop_front", "arrayPopFront"),
    ("arrayreverse", "arrayReverse"),
    ("array_reverse", "arrayReverse"),
    ("emptyarraytosingle", "emptyArrayToSingle"),
    ("empty_array_to_single", "emptyArrayToSingle"),
    ("range", "range"),
    ("array_range", "range"),
    ("arrayreduce", "arrayReduce"),
    ("array_reduce", "arrayReduce"),
];

static ARRAY_METADATA: &[FunctionMeta] = &[
    FunctionMeta {
        name: "array",
        min_args: 1,
        max_args: usize::MAX,
    },
    FunctionMeta {
        name: "arrayElement",
        min_args: 2,
        max_args: 2,
    },
    FunctionMeta {
        name: "arrayEnumerate",
        min_args: 1,
        max_args: 1,
    },
    FunctionMeta {
        name: "arrayUniq",
        min_args: 1,
        max_args: usize::MAX,
    },
    FunctionMeta {
        name: "arrayEnumerateUniq",
        min_args: 1,
        max_args: usize::MAX,
    },
    FunctionMeta {
        name: "arrayConcat",
        min_args: 1,
        max_args: usize::MAX,
    },
    FunctionMeta {
        name: "arraySlice",
        min_args: 2,
        max_args: 3,
    },
    FunctionMeta {
        name: "arrayPushBack",
        min_args: 2,
        max_args: 2,
    },
    FunctionMeta {
        name: "arrayPushFront",
        min_args: 2,
        max_args: 2,
    },
    FunctionMeta {
        name: "arrayPopBack",
        min_args: 1,
        max_args: 1,
    },
    FunctionMeta {
        name: "arrayPopFront",
        min_args: 1,
        max_args: 1,
    },
    FunctionMeta {
        name: "arrayReverse",
        min_args: 1,
        max_args: 1,
    },
    FunctionMeta {
        name: "emptyArrayToSingle",
        min_args: 1,
        max_args: 1,
    },
    FunctionMeta {
        name: "range",
        min_args: 1,
        max_args: 1,
    },
    FunctionMeta {
        name: "arrayReduce",
        min_args: 2,
        max_args: usize::MAX,
    },
];
