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
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array};
use arrow::datatypes::{DataType, FieldRef};

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;

use super::common::{expect_array_type, int64_values, is_integer_type};
use super::gather::{
    ArraySource, slice_dynamic_offset_bounded, slice_dynamic_offset_unbounded,
    slice_from_left_constant_offset_bounded, slice_from_left_constant_offset_unbounded,
    slice_from_right_constant_offset_bounded, slice_from_right_constant_offset_unbounded,
};

const FN_NAME: &str = "arraySlice";

pub(super) fn return_type_array_slice(args: &[Column]) -> Result<DataType> {
    if args[0].is_null_type() {
        return Ok(DataType::Null);
    }
    expect_array_type(args[0].data_type(), FN_NAME, 1)?;
    for (pos, arg) in args.iter().enumerate().skip(1) {
        if !arg.is_null_type() && !is_integer_type(arg.data_type()) {
            return Err(FunctionError::illegal_type(format!(
                "Argument {} for function {} must be integer but it has type {}.",
                pos + 1,
                FN_NAME,
                arg.data_type()
            )));
        }
    }
    Ok(args[0].data_type().clone())
}

/// A bound argument: absent, typed `Null`, a constant or per-row values.
enum Bound {
    Absent,
    Null,
    Const(Option<i64>),
    PerRow(Int64Array),
}

impl Bound {
    fn of(column: Option<&Column>) -> Result<Self> {
        let Some(column) = column else {
            return Ok(Bound::Absent);
        };
        if column.is_null_type() {
            return Ok(Bound::Null);
        }
        let values = int64_values(column.data(), FN_NAME)?;
        if column.is_const() {
            Ok(Bound::Const(values.is_valid(0).then(|| values.value(0))))
        } else {
            Ok(Bound::PerRow(values))
        }
    }

    fn is_varying(&self) -> bool {
        matches!(self, Bound::PerRow(_))
    }

    /// Per-row view; a constant becomes a one-element column.
    fn per_row(&self, null_value: Option<i64>) -> Int64Array {
        match self {
            Bound::PerRow(values) => values.clone(),
            Bound::Const(value) => Int64Array::from(vec![*value]),
            Bound::Absent | Bound::Null => Int64Array::from(vec![null_value]),
        }
    }
}

/// `arraySlice(arr, offset[, length])`: 1-based `offset`, negative from the
/// end; `length` negative stops that many elements before the end.
pub(super) fn eval_array_slice(args: &[Column], result_type: &DataType, rows: usize) -> Result<Column> {
    if args[0].is_null_type() {
        return Ok(args[0].clone());
    }
    let DataType::List(field) = result_type else {
        return Err(FunctionError::logical(format!(
            "{} expects a list result type, got {}",
            FN_NAME, result_type
        )));
    };
    let offset = Bound::of(args.get(1))?;
    let length = Bound::of(args.get(2))?;

    if matches!(offset, Bound::Null) && matches!(length, Bound::Absent | Bound::Null) {
        return Ok(args[0].clone());
    }

    let source = ArraySource::from_column(&args[0], FN_NAME)?;
    let all_const = source.is_const() && !offset.is_varying() && !length.is_varying();
    let physical_rows = if all_const { 1 } else { rows };
    let out = slice_rows(source, Arc::clone(field), physical_rows, &offset, &length)?;
    if all_const {
        Column::constant(out, rows)
    } else {
        Ok(Column::full(out))
    }
}

fn slice_rows(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offset: &Bound,
    length: &Bound,
) -> Result<ArrayRef> {
    match (offset, length) {
        (Bound::Null, Bound::Const(Some(length))) => {
            slice_from_left_constant_offset_bounded(source, field, rows, 0, *length)
        }
        (Bound::Null, _) => slice_dynamic_offset_bounded(
            source,
            field,
            rows,
            &offset.per_row(Some(1)),
            &length.per_row(None),
        ),
        (Bound::Const(Some(offset)), Bound::Absent | Bound::Null | Bound::Const(None)) => {
            if *offset > 0 {
                slice_from_left_constant_offset_unbounded(source, field, rows, (*offset - 1) as usize)
            } else {
                let from_end = usize::try_from(offset.unsigned_abs()).unwrap_or(usize::MAX);
                slice_from_right_constant_offset_unbounded(source, field, rows, from_end)
            }
        }
        (Bound::Const(Some(offset)), Bound::Const(Some(length))) => {
            if *offset > 0 {
                slice_from_left_constant_offset_bounded(
                    source,
                    field,
                    rows,
                    (*offset - 1) as usize,
                    *length,
                )
            } else {
                let from_end = usize::try_from(offset.unsigned_abs()).unwrap_or(usize::MAX);
                slice_from_right_constant_offset_bounded(source, field, rows, from_end, *length)
            }
        }
        (_, Bound::Absent | Bound::Null) => {
            slice_dynamic_offset_unbounded(source, field, rows, &offset.per_row(None))
        }
        _ => slice_dynamic_offset_bounded(
            source,
            field,
            rows,
            &offset.per_row(None),
            &length.per_row(None),
        ),
    }
}
