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
use arrow::array::{Array, ArrayBuilder, ArrayRef, UInt64Builder};
use arrow::datatypes::DataType;

use crate::exec::expr::agg::{AggregateFunction, AggregateState};

/// `count()` counts rows; `count(x)` counts rows where `x` is not null.
#[derive(Debug)]
pub(super) struct CountAgg {
    count_all: bool,
}

impl CountAgg {
    pub(super) fn try_new(arg_types: &[DataType]) -> Result<Self, String> {
        if arg_types.len() > 1 {
            return Err(format!(
                "count expects at most one argument, got {}",
                arg_types.len()
            ));
        }
        Ok(Self {
            count_all: arg_types.is_empty(),
        })
    }
}

struct CountState {
    count: u64,
    count_all: bool,
}

impl AggregateState for CountState {
    fn add(&mut self, columns: &[ArrayRef], row: usize) -> Result<(), String> {
        let counted = match columns.first() {
            Some(column) if !self.count_all => {
                !matches!(column.data_type(), DataType::Null) && column.is_valid(row)
            }
            _ => true,
        };
        if counted {
            self.count += 1;
        }
        Ok(())
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<(), String> {
        let other = other
            .as_any()
            .downcast_ref::<CountState>()
            .ok_or_else(|| "count cannot merge a foreign state".to_string())?;
        self.count += other.count;
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        self.count.to_le_bytes().to_vec()
    }

    fn insert_result_into(&self, out: &mut dyn ArrayBuilder) -> Result<(), String> {
        out.as_any_mut()
            .downcast_mut::<UInt64Builder>()
            .ok_or_else(|| "count result builder must be UInt64".to_string())?
            .append_value(self.count);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AggregateFunction for CountAgg {
    fn name(&self) -> &str {
        "count"
    }

    fn return_type(&self) -> DataType {
        DataType::UInt64
    }

    fn size_of_data(&self) -> usize {
        std::mem::size_of::<u64>()
    }

    fn create(&self) -> Box<dyn AggregateState> {
        Box::new(CountState {
            count: 0,
            count_all: self.count_all,
        })
    }
}
