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
use arrow::datatypes::DataType;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;

use super::common::{cast_list_column, common_list_field};
use super::gather::{ArraySource, concat};

const FN_NAME: &str = "arrayConcat";

pub(super) fn return_type_array_concat(args: &[Column]) -> Result<DataType> {
    let columns = args.iter().collect::<Vec<_>>();
    Ok(DataType::List(common_list_field(&columns, FN_NAME)?))
}

/// Row `i` holds row `i` of every argument, in argument order. Arguments
/// are first cast to the common element type.
pub(super) fn eval_array_concat(
    args: &[Column],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    let DataType::List(field) = result_type else {
        return Err(FunctionError::logical(format!(
            "{} expects a list result type, got {}",
            FN_NAME, result_type
        )));
    };
    let casted = args
        .iter()
        .map(|column| cast_list_column(column, field))
        .collect::<Result<Vec<_>>>()?;
    if let [single] = casted.as_slice() {
        return Ok(single.clone());
    }
    let sources = casted
        .iter()
        .map(|column| ArraySource::from_column(column, FN_NAME))
        .collect::<Result<Vec<_>>>()?;
    if casted.iter().all(Column::is_const) {
        let literal = concat(&sources, field.clone(), 1)?;
        return Column::constant(literal, rows);
    }
    Ok(Column::full(concat(&sources, field.clone(), rows)?))
}
