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

use arrow::array::{Array, ArrayRef, new_null_array};
use arrow::compute::{cast, concat, interleave};
use arrow::datatypes::DataType;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::{list_field, list_with_offsets};

use super::common::least_common_element_type;

const FN_NAME: &str = "array";

pub(super) fn return_type_array(args: &[Column]) -> Result<DataType> {
    let candidates = args
        .iter()
        .map(|c| (c.data_type().clone(), c.data().null_count() > 0))
        .collect::<Vec<_>>();
    let (element_type, nullable) = least_common_element_type(&candidates, FN_NAME)?;
    Ok(DataType::List(list_field(element_type, nullable)))
}

/// `array(x1, ..., xn)`: row `i` is `[x1[i], ..., xn[i]]`.
pub(super) fn eval_array(args: &[Column], result_type: &DataType, rows: usize) -> Result<Column> {
    let DataType::List(field) = result_type else {
        return Err(FunctionError::logical(format!(
            "array expects a list result type, got {}",
            result_type
        )));
    };
    let element_type = field.data_type();
    let width = args.len();

    if args.iter().all(Column::is_const) {
        let values = args
            .iter()
            .map(|c| cast(c.data(), element_type))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let refs = values.iter().map(|v| v.as_ref()).collect::<Vec<&dyn Array>>();
        let row = concat(&refs)?;
        let offsets = vec![0, width as i32];
        let literal = list_with_offsets(Arc::clone(field), offsets, row)?;
        return Column::constant(literal, rows);
    }

    let total = rows
        .checked_mul(width)
        .filter(|total| i32::try_from(*total).is_ok())
        .ok_or_else(|| {
            FunctionError::logical(format!("array of {} x {} elements is too large", rows, width))
        })?;
    let values = if matches!(element_type, DataType::Null) {
        new_null_array(element_type, total)
    } else {
        let columns = args
            .iter()
            .map(|c| Ok(cast(&c.to_full()?, element_type)?))
            .collect::<Result<Vec<ArrayRef>>>()?;
        let refs = columns.iter().map(|c| c.as_ref()).collect::<Vec<&dyn Array>>();
        let indices = (0..rows)
            .flat_map(|row| (0..width).map(move |arg| (arg, row)))
            .collect::<Vec<_>>();
        interleave(&refs, &indices)?
    };
    let offsets = (0..=rows).map(|row| (row * width) as i32).collect::<Vec<_>>();
    Ok(Column::full(list_with_offsets(
        Arc::clone(field),
        offsets,
        values,
    )?))
}
