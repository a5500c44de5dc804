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
use arrow::array::{ArrayBuilder, ArrayRef, Float64Builder};
use arrow::datatypes::DataType;

use super::common::{numeric_value_at, single_numeric_input};
use crate::exec::expr::agg::{AggregateFunction, AggregateState};

/// `avg(x)` as Float64. An empty input averages to NaN.
#[derive(Debug)]
pub(super) struct AvgAgg;

impl AvgAgg {
    pub(super) fn try_new(arg_types: &[DataType]) -> Result<Self, String> {
        single_numeric_input("avg", arg_types)?;
        Ok(Self)
    }
}

#[derive(Default)]
struct AvgState {
    sum: f64,
    count: u64,
}

impl AggregateState for AvgState {
    fn add(&mut self, columns: &[ArrayRef], row: usize) -> Result<(), String> {
        let column = columns
            .first()
            .ok_or_else(|| "avg input missing".to_string())?;
        if let Some(value) = numeric_value_at(column, row)? {
            self.sum += value.as_f64();
            self.count += 1;
        }
        Ok(())
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<(), String> {
        let other = other
            .as_any()
            .downcast_ref::<AvgState>()
            .ok_or_else(|| "avg cannot merge a foreign state".to_string())?;
        self.sum += other.sum;
        self.count += other.count;
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend_from_slice(&self.sum.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out
    }

    fn insert_result_into(&self, out: &mut dyn ArrayBuilder) -> Result<(), String> {
        let value = if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        };
        out.as_any_mut()
            .downcast_mut::<Float64Builder>()
            .ok_or_else(|| "avg result builder must be Float64".to_string())?
            .append_value(value);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AggregateFunction for AvgAgg {
    fn name(&self) -> &str {
        "avg"
    }

    fn return_type(&self) -> DataType {
        DataType::Float64
    }

    fn size_of_data(&self) -> usize {
        std::mem::size_of::<AvgState>()
    }

    fn create(&self) -> Box<dyn AggregateState> {
        Box::new(AvgState::default())
    }
}
