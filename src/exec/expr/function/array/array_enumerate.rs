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

use arrow::array::{ArrayRef, UInt32Array};
use arrow::datatypes::DataType;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::{list_field, list_with_offsets};

use super::common::{array_column, expect_array_type};

const FN_NAME: &str = "arrayEnumerate";

pub(super) fn return_type_array_enumerate(args: &[Column]) -> Result<DataType> {
    expect_array_type(args[0].data_type(), FN_NAME, 1)?;
    Ok(DataType::List(list_field(DataType::UInt32, false)))
}

/// Row `i` becomes `[1, 2, ..., len_i]`.
pub(super) fn eval_array_enumerate(
    args: &[Column],
    _result_type: &DataType,
    _rows: usize,
) -> Result<Column> {
    let column = array_column(&args[0], FN_NAME)?;
    let offsets = column.offsets();
    let base = offsets[0];
    let mut values = Vec::with_capacity((offsets[offsets.len() - 1] - base) as usize);
    for row in offsets.windows(2) {
        let len = u32::try_from(row[1] - row[0])
            .map_err(|_| FunctionError::logical("negative array row length"))?;
        values.extend(1..=len);
    }
    let relative = offsets.iter().map(|o| o - base).collect::<Vec<_>>();
    let out = list_with_offsets(
        list_field(DataType::UInt32, false),
        relative,
        Arc::new(UInt32Array::from(values)) as ArrayRef,
    )?;
    args[0].with_data(out)
}
