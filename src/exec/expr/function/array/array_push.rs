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
use arrow::array::Array;
use arrow::compute::cast;
use arrow::datatypes::DataType;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::{list_field, wrap_single_element_rows};

use super::common::{cast_list_column, expect_array_type, least_common_element_type};
use super::gather::{ArraySource, concat};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum PushSide {
    Front,
    Back,
}

impl PushSide {
    fn fn_name(self) -> &'static str {
        match self {
            PushSide::Front => "arrayPushFront",
            PushSide::Back => "arrayPushBack",
        }
    }
}

pub(super) fn return_type_array_push(args: &[Column], side: PushSide) -> Result<DataType> {
    if args[0].is_null_type() {
        return Ok(DataType::Null);
    }
    let fn_name = side.fn_name();
    let field = expect_array_type(args[0].data_type(), fn_name, 1)?;
    let candidates = [
        (field.data_type().clone(), field.is_nullable()),
        (args[1].data_type().clone(), args[1].data().null_count() > 0),
    ];
    let (element_type, nullable) = least_common_element_type(&candidates, fn_name)?;
    Ok(DataType::List(list_field(element_type, nullable)))
}

/// Appends (or prepends) the per-row value as one more element. The value
/// column is wrapped into single-element rows and concatenated.
pub(super) fn eval_array_push(
    args: &[Column],
    result_type: &DataType,
    rows: usize,
    side: PushSide,
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
    let array = cast_list_column(&args[0], field)?;
    let value = cast(args[1].data(), field.data_type())?;
    let appended = args[1].with_data(wrap_single_element_rows(field.clone(), value)?)?;

    let (first, second) = match side {
        PushSide::Back => (&array, &appended),
        PushSide::Front => (&appended, &array),
    };
    let sources = [
        ArraySource::from_column(first, fn_name)?,
        ArraySource::from_column(second, fn_name)?,
    ];
    if array.is_const() && appended.is_const() {
        let literal = concat(&sources, field.clone(), 1)?;
        return Column::constant(literal, rows);
    }
    Ok(Column::full(concat(&sources, field.clone(), rows)?))
}
