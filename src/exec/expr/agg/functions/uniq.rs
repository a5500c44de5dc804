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
use arrow::array::{Array, ArrayBuilder, ArrayRef, AsArray, UInt64Builder};
use arrow::datatypes::DataType;
use hashbrown::HashSet;

use super::common::{is_numeric_type, numeric_value_at};
use crate::exec::expr::agg::{AggregateFunction, AggregateState};
use crate::exec::hash_table::hash::{combine_hash128, hash128_bytes};

/// `uniq(x, ...)`: number of distinct argument tuples. Tuples are keyed by
/// a 128-bit hash, so distinct tuples sharing a hash are counted once. A
/// tuple with any NULL component is skipped.
#[derive(Debug)]
pub(super) struct UniqAgg;

impl UniqAgg {
    pub(super) fn try_new(arg_types: &[DataType]) -> Result<Self, String> {
        if arg_types.is_empty() {
            return Err("uniq expects at least one argument".to_string());
        }
        if let Some(bad) = arg_types.iter().find(|t| !is_hashable(t)) {
            return Err(format!("uniq unsupported input type: {:?}", bad));
        }
        Ok(Self)
    }
}

fn is_hashable(data_type: &DataType) -> bool {
    is_numeric_type(data_type)
        || matches!(
            data_type,
            DataType::Boolean
                | DataType::Utf8
                | DataType::Binary
                | DataType::FixedSizeBinary(_)
                | DataType::Null
        )
}

fn is_null_at(column: &ArrayRef, row: usize) -> bool {
    matches!(column.data_type(), DataType::Null) || column.is_null(row)
}

fn value_hash(column: &ArrayRef, row: usize) -> Result<u128, String> {
    let hash = match column.data_type() {
        DataType::Boolean => hash128_bytes(&[column.as_boolean().value(row) as u8]),
        DataType::Utf8 => hash128_bytes(column.as_string::<i32>().value(row).as_bytes()),
        DataType::Binary => hash128_bytes(column.as_binary::<i32>().value(row)),
        DataType::FixedSizeBinary(_) => hash128_bytes(column.as_fixed_size_binary().value(row)),
        _ => {
            let value = numeric_value_at(column, row)?
                .ok_or_else(|| "uniq lost a non-null value".to_string())?;
            hash128_bytes(&value.to_le_bytes())
        }
    };
    Ok(hash)
}

#[derive(Default)]
struct UniqState {
    seen: HashSet<u128>,
}

impl AggregateState for UniqState {
    fn add(&mut self, columns: &[ArrayRef], row: usize) -> Result<(), String> {
        if columns.iter().any(|column| is_null_at(column, row)) {
            return Ok(());
        }
        let mut key = 0u128;
        for column in columns {
            key = combine_hash128(key, value_hash(column, row)?);
        }
        self.seen.insert(key);
        Ok(())
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<(), String> {
        let other = other
            .as_any()
            .downcast_ref::<UniqState>()
            .ok_or_else(|| "uniq cannot merge a foreign state".to_string())?;
        self.seen.extend(other.seen.iter().copied());
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        let mut keys = self.seen.iter().copied().collect::<Vec<_>>();
        keys.sort_unstable();
        let mut out = Vec::with_capacity(8 + keys.len() * 16);
        out.extend_from_slice(&(keys.len() as u64).to_le_bytes());
        for key in keys {
            out.extend_from_slice(&key.to_le_bytes());
        }
        out
    }

    fn insert_result_into(&self, out: &mut dyn ArrayBuilder) -> Result<(), String> {
        out.as_any_mut()
            .downcast_mut::<UInt64Builder>()
            .ok_or_else(|| "uniq result builder must be UInt64".to_string())?
            .append_value(self.seen.len() as u64);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AggregateFunction for UniqAgg {
    fn name(&self) -> &str {
        "uniq"
    }

    fn return_type(&self) -> DataType {
        DataType::UInt64
    }

    fn size_of_data(&self) -> usize {
        std::mem::size_of::<UniqState>()
    }

    fn allocates_memory_in_arena(&self) -> bool {
        true
    }

    fn create(&self) -> Box<dyn AggregateState> {
        Box::new(UniqState::default())
    }
}
