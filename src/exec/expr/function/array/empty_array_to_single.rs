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
use crate::exec::chunk::{ArrayColumn, Column};
use crate::exec::chunk::array_column::{default_array, list_with_offsets};

use super::common::{array_column, expect_array_type};
use super::gather::{ArraySink, ArraySource, ElementSink, GatherOp, gather};

const FN_NAME: &str = "emptyArrayToSingle";

pub(super) fn return_type_empty_array_to_single(args: &[Column]) -> Result<DataType> {
    expect_array_type(args[0].data_type(), FN_NAME, 1)?;
    Ok(args[0].data_type().clone())
}

/// Source 0 is the input, source 1 a one-row literal holding the default.
struct EmptyToSingleOp;

impl GatherOp for EmptyToSingleOp {
    fn run<S: ElementSink>(
        &self,
        sources: &[ArraySource<'_>],
        sink: &mut ArraySink<S>,
        rows: usize,
    ) -> Result<()> {
        let (input, default) = (&sources[0], &sources[1]);
        for row in 0..rows {
            let (start, end) = input.row_span(row);
            if start == end {
                let (start, end) = default.row_span(row);
                sink.append_range(1, start, end);
            } else {
                sink.append_range(0, start, end);
            }
            sink.next_row()?;
        }
        Ok(())
    }
}

/// Empty rows become `[default]`, with the default marked not-null.
pub(super) fn eval_empty_array_to_single(
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
    let input = array_column(&args[0], FN_NAME)?;
    if args[0].is_const() && input.row_len(0) > 0 {
        return Ok(args[0].clone());
    }

    let default = list_with_offsets(
        Arc::clone(field),
        vec![0, 1],
        default_array(field.data_type(), 1)?,
    )?;
    let sources = [
        ArraySource::new(input, args[0].is_const()),
        ArraySource::new(ArrayColumn::try_new(&default, FN_NAME)?, true),
    ];
    let physical_rows = if args[0].is_const() { 1 } else { rows };
    let out = gather(&sources, Arc::clone(field), physical_rows, &EmptyToSingleOp)?;
    args[0].with_data(out)
}
