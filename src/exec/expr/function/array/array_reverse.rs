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
use super::gather::{ArraySink, ArraySource, ElementSink, GatherOp, gather};

const FN_NAME: &str = "arrayReverse";

pub(super) fn return_type_array_reverse(args: &[Column]) -> Result<DataType> {
    expect_array_type(args[0].data_type(), FN_NAME, 1)?;
    Ok(args[0].data_type().clone())
}

/// Copies each row back to front, one element at a time, so values and
/// their null bits move together.
struct ReverseOp;

impl GatherOp for ReverseOp {
    fn run<S: ElementSink>(
        &self,
        sources: &[ArraySource<'_>],
        sink: &mut ArraySink<S>,
        rows: usize,
    ) -> Result<()> {
        let source = &sources[0];
        for row in 0..rows {
            let (start, end) = source.row_span(row);
            for pos in (start..end).rev() {
                sink.append_range(0, pos, pos + 1);
            }
            sink.next_row()?;
        }
        Ok(())
    }
}

pub(super) fn eval_array_reverse(
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
    let source = ArraySource::from_column(&args[0], FN_NAME)?;
    let physical_rows = if source.is_const() { 1 } else { rows };
    let out = gather(&[source], Arc::clone(field), physical_rows, &ReverseOp)?;
    args[0].with_data(out)
}
