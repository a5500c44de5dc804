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
use arrow::array::{ArrayBuilder, ArrayRef};
use arrow::datatypes::DataType;

use super::common::{NumericValue, append_numeric, numeric_value_at, single_numeric_input};
use crate::exec::expr::agg::{AggregateFunction, AggregateState};

/// `min(x)` / `max(x)` over numeric input. The result keeps the input type;
/// an empty input yields the type's default.
#[derive(Debug)]
pub(super) struct MinMaxAgg {
    input_type: DataType,
    is_max: bool,
}

impl MinMaxAgg {
    pub(super) fn try_new(arg_types: &[DataType], is_max: bool) -> Result<Self, String> {
        let name = if is_max { "max" } else { "min" };
        let input_type = single_numeric_input(name, arg_types)?.clone();
        Ok(Self { input_type, is_max })
    }
}

struct MinMaxState {
    best: Option<NumericValue>,
    input_type: DataType,
    is_max: bool,
}

impl MinMaxState {
    fn offer(&mut self, value: NumericValue) {
        let replace = match self.best {
            None => true,
            Some(best) if self.is_max => best.less_than(value),
            Some(best) => value.less_than(best),
        };
        if replace {
            self.best = Some(value);
        }
    }
}

impl AggregateState for MinMaxState {
    fn add(&mut self, columns: &[ArrayRef], row: usize) -> Result<(), String> {
        let column = columns
            .first()
            .ok_or_else(|| "min/max input missing".to_string())?;
        if let Some(value) = numeric_value_at(column, row)? {
            self.offer(value);
        }
        Ok(())
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<(), String> {
        let other = other
            .as_any()
            .downcast_ref::<MinMaxState>()
            .ok_or_else(|| "min/max cannot merge a foreign state".to_string())?;
        if let Some(value) = other.best {
            self.offer(value);
        }
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        match self.best {
            Some(value) => {
                let mut out = vec![1u8];
                out.extend_from_slice(&value.to_le_bytes());
                out
            }
            None => vec![0u8],
        }
    }

    fn insert_result_into(&self, out: &mut dyn ArrayBuilder) -> Result<(), String> {
        append_numeric(out, &self.input_type, self.best)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AggregateFunction for MinMaxAgg {
    fn name(&self) -> &str {
        if self.is_max { "max" } else { "min" }
    }

    fn return_type(&self) -> DataType {
        self.input_type.clone()
    }

    fn size_of_data(&self) -> usize {
        std::mem::size_of::<Option<NumericValue>>()
    }

    fn create(&self) -> Box<dyn AggregateState> {
        Box::new(MinMaxState {
            best: None,
            input_type: self.input_type.clone(),
            is_max: self.is_max,
        })
    }
}
