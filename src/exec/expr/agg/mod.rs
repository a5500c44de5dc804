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
//! Aggregate functions consumed by `arrayReduce`.
//!
//! An aggregate is resolved once per call from its name and argument types,
//! then folds one array row at a time into a fresh state. States are
//! released through [`AggStateGuard`], so a failing `add` still destroys
//! the state it was working on.

mod functions;

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayBuilder, ArrayRef};
use arrow::datatypes::DataType;

pub(crate) use functions::canonical_agg_name;

const STATE_SUFFIX: &str = "State";

/// A resolved aggregate: name, argument types and output type are fixed.
pub trait AggregateFunction: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn return_type(&self) -> DataType;

    /// Whether results are serialized states rather than final values.
    fn is_state(&self) -> bool {
        false
    }

    fn size_of_data(&self) -> usize;

    /// Whether a state owns allocations beyond `size_of_data`.
    fn allocates_memory_in_arena(&self) -> bool {
        false
    }

    fn create(&self) -> Box<dyn AggregateState>;

    fn destroy(&self, state: Box<dyn AggregateState>) {
        drop(state);
    }
}

/// Per-group state of an aggregate.
pub trait AggregateState: Send {
    /// Folds position `row` of the flattened argument columns.
    fn add(&mut self, columns: &[ArrayRef], row: usize) -> Result<(), String>;

    /// Combines another state of the same aggregate into this one.
    fn merge(&mut self, other: &dyn AggregateState) -> Result<(), String>;

    fn serialize(&self) -> Vec<u8>;

    fn insert_result_into(&self, out: &mut dyn ArrayBuilder) -> Result<(), String>;

    fn as_any(&self) -> &dyn std::any::Any;
}

/// Owns one live state and destroys it on every exit path.
pub struct AggStateGuard<'a> {
    function: &'a dyn AggregateFunction,
    state: Option<Box<dyn AggregateState>>,
}

impl<'a> AggStateGuard<'a> {
    pub fn new(function: &'a dyn AggregateFunction) -> Self {
        Self {
            function,
            state: Some(function.create()),
        }
    }

    pub fn state(&self) -> Result<&dyn AggregateState, String> {
        self.state
            .as_deref()
            .ok_or_else(|| "aggregate state already released".to_string())
    }

    pub fn state_mut(&mut self) -> Result<&mut (dyn AggregateState + 'static), String> {
        self.state
            .as_deref_mut()
            .ok_or_else(|| "aggregate state already released".to_string())
    }
}

impl Drop for AggStateGuard<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            self.function.destroy(state);
        }
    }
}

/// `<name>State`: runs `inner` but yields its serialized state as Binary.
#[derive(Debug)]
struct StateCombinator {
    name: String,
    inner: Arc<dyn AggregateFunction>,
}

impl AggregateFunction for StateCombinator {
    fn name(&self) -> &str {
        &self.name
    }

    fn return_type(&self) -> DataType {
        DataType::Binary
    }

    fn is_state(&self) -> bool {
        true
    }

    fn size_of_data(&self) -> usize {
        self.inner.size_of_data()
    }

    fn allocates_memory_in_arena(&self) -> bool {
        self.inner.allocates_memory_in_arena()
    }

    fn create(&self) -> Box<dyn AggregateState> {
        self.inner.create()
    }

    fn destroy(&self, state: Box<dyn AggregateState>) {
        self.inner.destroy(state);
    }
}

/// Resolves `name` (with an optional `State` suffix) for `arg_types`.
pub fn resolve(name: &str, arg_types: &[DataType]) -> Result<Arc<dyn AggregateFunction>, String> {
    if name.is_empty() {
        return Err("aggregate function name is empty".to_string());
    }
    if let Some(base) = name.strip_suffix(STATE_SUFFIX)
        && !base.is_empty()
        && canonical_agg_name(base).is_some()
    {
        let inner = functions::resolve_by_name(base, arg_types)?;
        return Ok(Arc::new(StateCombinator {
            name: name.to_string(),
            inner,
        }));
    }
    functions::resolve_by_name(name, arg_types)
}
