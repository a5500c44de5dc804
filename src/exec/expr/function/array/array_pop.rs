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

use arrow::datatypes::DataType;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;

use super::common::expect_array_type;
use super::gather::{
    ArraySource, slice_from_left_constant_offset_bounded,
    slice_from_left_constant_offset_unbounded,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum PopSide {
    Front,
    Back,
}

impl PopSide {
    fn fn_name(self) -> &'static str {
        match self {
            PopSide::Front => "arrayPopFront",
            PopSide::Back => "arrayPopBack",
        }
    }
}

pub(super) fn return_type_array_pop(args: &[Column], side: PopSide) -> Result<DataType> {
    if args[0].is_null_type() {
        return Ok(DataType::Null);
    }
    expect_array_type(args[0].data_type(), side.fn_name(), 1)?;
    Ok(args[0].data_type().clone())
}

/// Drops the first (front) or last (back) element of every row; empty rows
/// stay empty.
pub(super) fn eval_array_pop(
    args: &[Column],
    result_type: &DataType,
    rows: usize,
    side: PopSide,
) -> Result<Column> {
    if args[0].is_null_type() {
        return Ok(args[0].clone());
    }
    let fn_name = side.fn_name();
    let DataType::List(field) = result_type else {
        return Err(FunctionError::logical(format!(
            "{} expects a list result type, got {}",
            fn_name, result_type
        )));
    };
    let source = ArraySource::from_column(&args[0], fn_name)?;
    let physical_rows = if source.is_const() { 1 } else { rows };
    let out = match side {
        PopSide::Front => {
            slice_from_left_constant_offset_unbounded(source, Arc::clone(field), physical_rows, 1)?
        }
        PopSide::Back => slice_from_left_constant_offset_bounded(
            source,
            Arc::clone(field),
            physical_rows,
            0,
            -1,
        )?,
    };
    args[0].with_data(out)
}
