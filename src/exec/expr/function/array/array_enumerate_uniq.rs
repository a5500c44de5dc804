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

use crate::common::error::Result;
use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::list_field;

use super::common::expect_array_type;
use super::dedup::{DedupOutput, eval_dedup};

const FN_NAME: &str = "arrayEnumerateUniq";

pub(super) fn return_type_array_enumerate_uniq(args: &[Column]) -> Result<DataType> {
    for (pos, arg) in args.iter().enumerate() {
        expect_array_type(arg.data_type(), FN_NAME, pos + 1)?;
    }
    Ok(DataType::List(list_field(DataType::UInt32, false)))
}

/// Each element becomes the number of times its value (or zipped tuple)
/// has appeared so far in the row, itself included.
pub(super) fn eval_array_enumerate_uniq(
    args: &[Column],
    _result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    eval_dedup(args, rows, FN_NAME, DedupOutput::Enumerate)
}
