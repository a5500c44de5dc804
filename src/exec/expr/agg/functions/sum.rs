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

/// `sum(x)`: signed integers accumulate in Int64, unsigned in UInt64 and
/// floats in Float64. Integer sums wrap on overflow.
#[derive(Debug)]
pub(super) struct SumAgg {
    output_type: DataType,
}

impl SumAgg {
    pub(super) fn try_new(arg_types: &[DataType]) -> Result<Self, String> {
        let input = single_numeric_input("sum", arg_types)?;
        let output_type = match input {
            DataType::Float32 | DataType::Float64 => DataType::Float64,
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
                DataType::UInt64
            }
            _ => DataType::Int64,
        };
        Ok(Self { output_type })
    }

    fn zero(&self) -> NumericValue {
        match self.output_type {
            DataType::Float64 => NumericValue::Float(0.0),
            DataType::UInt64 => NumericValue::UInt(0),
            _ => NumericValue::Int(0),
        }
    }
}

struct SumState {
    acc: NumericValue,
    output_type: DataType,
}

impl SumState {
    fn accumulate(&mut self, value: NumericValue) {
        self.acc = match (self.acc, value) {
            (NumericValue::Int(a), NumericValue::Int(b)) => NumericValue::Int(a.wrapping_add(b)),
            (NumericValue::UInt(a), NumericValue::UInt(b)) => {
                NumericValue::UInt(a.wrapping_add(b))
            }
            (acc, value) => NumericValue::Float(acc.as_f64() + value.as_f64()),
        };
    }
}

impl AggregateState for SumState {
    fn add(&mut self, columns: &[ArrayRef], row: usize) -> Result<(), String> {
        let column = columns
            .first()
            .ok_or_else(|| "sum input missing".to_string())?;
        if let Some(value) = numeric_value_at(column, row)? {
            self.accumulate(value);
        }
        Ok(())
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<(), String> {
        let other = other
            .as_any()
            .downcast_ref::<SumState>()
            .ok_or_else(|| "sum cannot merge a foreign state".to_string())?;
        self.accumulate(other.acc);
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        self.acc.to_le_bytes().to_vec()
    }

    fn insert_result_into(&self, out: &mut dyn ArrayBuilder) -> Result<(), String> {
        append_numeric(out, &self.output_type, Some(self.acc))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AggregateFunction for SumAgg {
    fn name(&self) -> &str {
        "sum"
    }

    fn return_type(&self) -> DataType {
        self.output_type.clone()
    }

    fn size_of_data(&self) -> usize {
        std::mem::size_of::<NumericValue>()
    }

    fn create(&self) -> Box<dyn AggregateState> {
        Box::new(SumState {
            acc: self.zero(),
            output_type: self.output_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray, Float32Array, Int8Array, make_builder};
    use arrow::datatypes::{Float64Type, Int64Type};
    use std::sync::Arc;

    fn fold(func: &SumAgg, column: ArrayRef) -> ArrayRef {
        let mut state = func.create();
        for row in 0..column.len() {
            state.add(&[column.clone()], row).unwrap();
        }
        let mut out = make_builder(&func.return_type(), 1);
        state.insert_result_into(out.as_mut()).unwrap();
        out.finish()
    }

    #[test]
    fn test_sum_widens_and_skips_nulls() {
        let func = SumAgg::try_new(&[DataType::Int8]).unwrap();
        let out = fold(&func, Arc::new(Int8Array::from(vec![Some(100), None, Some(100)])));
        assert_eq!(out.as_primitive::<Int64Type>().value(0), 200);
    }

    #[test]
    fn test_sum_float() {
        let func = SumAgg::try_new(&[DataType::Float32]).unwrap();
        let out = fold(&func, Arc::new(Float32Array::from(vec![0.5, 1.0])));
        assert_eq!(out.as_primitive::<Float64Type>().value(0), 1.5);
    }

    #[test]
    fn test_sum_merge() {
        let func = SumAgg::try_new(&[DataType::Int32]).unwrap();
        let column = Arc::new(arrow::array::Int32Array::from(vec![2, 5])) as ArrayRef;
        let mut a = func.create();
        let mut b = func.create();
        a.add(&[column.clone()], 0).unwrap();
        b.add(&[column], 1).unwrap();
        a.merge(b.as_ref()).unwrap();
        assert_eq!(a.serialize(), 7i64.to_le_bytes().to_vec());
    }
}
