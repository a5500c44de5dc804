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

use arrow::array::{
    Array, ArrayRef, AsArray, FixedSizeBinaryArray, Int64Array, ListArray, StringArray,
};
use arrow::datatypes::{DataType, Int32Type};

use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::{list_field, list_with_offsets};

pub(super) fn int_list(rows: Vec<Vec<Option<i32>>>) -> ArrayRef {
    let rows = rows.into_iter().map(Some).collect::<Vec<_>>();
    Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(rows)) as ArrayRef
}

/// `List(Int32)` without element nullability.
pub(super) fn plain_int_list(rows: Vec<Vec<i32>>) -> ArrayRef {
    let mut offsets = vec![0i32];
    let mut values = Vec::new();
    for row in rows {
        values.extend(row);
        offsets.push(values.len() as i32);
    }
    let values = Arc::new(arrow::array::Int32Array::from(values)) as ArrayRef;
    list_with_offsets(list_field(DataType::Int32, false), offsets, values).unwrap()
}

pub(super) fn int_list_column(rows: Vec<Vec<Option<i32>>>) -> Column {
    Column::full(int_list(rows))
}

pub(super) fn const_int_list(row: Vec<Option<i32>>, rows: usize) -> Column {
    Column::constant(int_list(vec![row]), rows).unwrap()
}

pub(super) fn string_list_column(rows: Vec<Vec<Option<&str>>>) -> Column {
    let mut offsets = vec![0i32];
    let mut values = Vec::new();
    for row in rows {
        values.extend(row);
        offsets.push(values.len() as i32);
    }
    let values = Arc::new(StringArray::from(values)) as ArrayRef;
    Column::full(list_with_offsets(list_field(DataType::Utf8, true), offsets, values).unwrap())
}

/// `List(FixedSizeBinary(width))` with nullable elements.
pub(super) fn fixed_string_list_column(rows: Vec<Vec<Option<&str>>>, width: i32) -> Column {
    let mut offsets = vec![0i32];
    let mut values = Vec::new();
    for row in rows {
        values.extend(row.into_iter().map(|v| v.map(str::as_bytes)));
        offsets.push(values.len() as i32);
    }
    let values = FixedSizeBinaryArray::try_from_sparse_iter_with_size(values.into_iter(), width)
        .unwrap();
    let field = list_field(DataType::FixedSizeBinary(width), true);
    Column::full(list_with_offsets(field, offsets, Arc::new(values) as ArrayRef).unwrap())
}

pub(super) fn const_i64(value: i64, rows: usize) -> Column {
    Column::constant(Arc::new(Int64Array::from(vec![value])) as ArrayRef, rows).unwrap()
}

pub(super) fn i64_column(values: Vec<Option<i64>>) -> Column {
    Column::full(Arc::new(Int64Array::from(values)) as ArrayRef)
}

/// Rows of an Int32 list result, broadcasting constants.
pub(super) fn int_rows(column: &Column) -> Vec<Vec<Option<i32>>> {
    let full = column.to_full().unwrap();
    let list = full.as_list::<i32>();
    (0..list.len())
        .map(|i| list.value(i).as_primitive::<Int32Type>().iter().collect())
        .collect()
}

pub(super) fn string_rows(column: &Column) -> Vec<Vec<Option<String>>> {
    let full = column.to_full().unwrap();
    let list = full.as_list::<i32>();
    (0..list.len())
        .map(|i| {
            list.value(i)
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(str::to_string))
                .collect()
        })
        .collect()
}

pub(super) fn fixed_string_rows(column: &Column) -> Vec<Vec<Option<String>>> {
    let full = column.to_full().unwrap();
    let list = full.as_list::<i32>();
    (0..list.len())
        .map(|i| {
            list.value(i)
                .as_fixed_size_binary()
                .iter()
                .map(|v| v.map(|bytes| String::from_utf8_lossy(bytes).into_owned()))
                .collect()
        })
        .collect()
}
