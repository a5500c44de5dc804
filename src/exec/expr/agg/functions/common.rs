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
use arrow::array::{
    Array, ArrayBuilder, ArrayRef, AsArray, Float32Builder, Float64Builder, Int8Builder,
    Int16Builder, Int32Builder, Int64Builder, UInt8Builder, UInt16Builder, UInt32Builder,
    UInt64Builder,
};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};

/// One numeric input value widened to its family's 64-bit representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum NumericValue {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl NumericValue {
    pub(super) fn as_f64(self) -> f64 {
        match self {
            NumericValue::Int(v) => v as f64,
            NumericValue::UInt(v) => v as f64,
            NumericValue::Float(v) => v,
        }
    }

    pub(super) fn to_le_bytes(self) -> [u8; 8] {
        match self {
            NumericValue::Int(v) => v.to_le_bytes(),
            NumericValue::UInt(v) => v.to_le_bytes(),
            NumericValue::Float(v) => v.to_le_bytes(),
        }
    }

    /// Ordering within one family. Floats compare with `total_cmp` so NaN
    /// has a stable place.
    pub(super) fn less_than(self, other: Self) -> bool {
        match (self, other) {
            (NumericValue::Int(a), NumericValue::Int(b)) => a < b,
            (NumericValue::UInt(a), NumericValue::UInt(b)) => a < b,
            (NumericValue::Float(a), NumericValue::Float(b)) => a.total_cmp(&b).is_lt(),
            (a, b) => a.as_f64() < b.as_f64(),
        }
    }
}

pub(super) fn is_numeric_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub(super) fn single_numeric_input<'a>(
    name: &str,
    arg_types: &'a [DataType],
) -> Result<&'a DataType, String> {
    match arg_types {
        [data_type] if is_numeric_type(data_type) => Ok(data_type),
        [other] => Err(format!("{} unsupported input type: {:?}", name, other)),
        _ => Err(format!(
            "{} expects exactly one argument, got {}",
            name,
            arg_types.len()
        )),
    }
}

/// Value at `row`, `None` when null.
pub(super) fn numeric_value_at(array: &ArrayRef, row: usize) -> Result<Option<NumericValue>, String> {
    if array.is_null(row) {
        return Ok(None);
    }
    let value = match array.data_type() {
        DataType::Int8 => NumericValue::Int(array.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => NumericValue::Int(array.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => NumericValue::Int(array.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => NumericValue::Int(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => NumericValue::UInt(array.as_primitive::<UInt8Type>().value(row) as u64),
        DataType::UInt16 => {
            NumericValue::UInt(array.as_primitive::<UInt16Type>().value(row) as u64)
        }
        DataType::UInt32 => {
            NumericValue::UInt(array.as_primitive::<UInt32Type>().value(row) as u64)
        }
        DataType::UInt64 => NumericValue::UInt(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => {
            NumericValue::Float(array.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => NumericValue::Float(array.as_primitive::<Float64Type>().value(row)),
        other => return Err(format!("unsupported numeric input type: {:?}", other)),
    };
    Ok(Some(value))
}

fn downcast_builder<'a, B: 'static>(
    out: &'a mut dyn ArrayBuilder,
    data_type: &DataType,
) -> Result<&'a mut B, String> {
    out.as_any_mut()
        .downcast_mut::<B>()
        .ok_or_else(|| format!("result builder does not match {:?}", data_type))
}

/// Appends `value` narrowed back to `data_type`. `None` appends the type's
/// default, which is what an aggregate over no rows yields.
pub(super) fn append_numeric(
    out: &mut dyn ArrayBuilder,
    data_type: &DataType,
    value: Option<NumericValue>,
) -> Result<(), String> {
    let (int, uint, float) = match value {
        Some(NumericValue::Int(v)) => (v, v as u64, v as f64),
        Some(NumericValue::UInt(v)) => (v as i64, v, v as f64),
        Some(NumericValue::Float(v)) => (v as i64, v as u64, v),
        None => (0, 0, 0.0),
    };
    match data_type {
        DataType::Int8 => downcast_builder::<Int8Builder>(out, data_type)?.append_value(int as i8),
        DataType::Int16 => {
            downcast_builder::<Int16Builder>(out, data_type)?.append_value(int as i16)
        }
        DataType::Int32 => {
            downcast_builder::<Int32Builder>(out, data_type)?.append_value(int as i32)
        }
        DataType::Int64 => downcast_builder::<Int64Builder>(out, data_type)?.append_value(int),
        DataType::UInt8 => {
            downcast_builder::<UInt8Builder>(out, data_type)?.append_value(uint as u8)
        }
        DataType::UInt16 => {
            downcast_builder::<UInt16Builder>(out, data_type)?.append_value(uint as u16)
        }
        DataType::UInt32 => {
            downcast_builder::<UInt32Builder>(out, data_type)?.append_value(uint as u32)
        }
        DataType::UInt64 => downcast_builder::<UInt64Builder>(out, data_type)?.append_value(uint),
        DataType::Float32 => {
            downcast_builder::<Float32Builder>(out, data_type)?.append_value(float as f32)
        }
        DataType::Float64 => {
            downcast_builder::<Float64Builder>(out, data_type)?.append_value(float)
        }
        other => return Err(format!("unsupported numeric output type: {:?}", other)),
    }
    Ok(())
}
