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
//! Common utilities and helpers for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Int32Array, Int64Array, ListArray, StringArray, UInt32Array,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Int32Type, UInt32Type};
use tempfile::TempDir;

use arrayfn::{Column, arrayfn_config, arrayfn_logging, eval_array_function, return_type};

/// Test configuration for integration tests.
pub struct TestConfig {
    /// Temporary directory for test artifacts
    pub temp_dir: TempDir,
    /// Test config path
    pub config_path: PathBuf,
}

impl TestConfig {
    /// Create a new test configuration with default settings.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("test_arrayfn.toml");

        let config_content = r#"
log_level = "debug"

[runtime]
dedup_initial_capacity = 8

[debug]
log_function_calls = true
"#;

        std::fs::write(&config_path, config_content)?;

        Ok(Self {
            temp_dir,
            config_path,
        })
    }

    /// Initialize logging for tests from the test configuration.
    pub fn init_logging(&self) {
        // A config that fails to load still leaves logging at the default level.
        let _ = self.load_config();
        arrayfn_logging::init_from_config();
    }

    /// Load the test configuration.
    pub fn load_config(&self) -> anyhow::Result<&'static arrayfn_config::ArrayFnConfig> {
        arrayfn_config::init_from_path(&self.config_path)
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new().expect("Failed to create test config")
    }
}

fn list_of(element_type: DataType, offsets: Vec<i32>, values: ArrayRef) -> ArrayRef {
    list_with_nullability(element_type, true, offsets, values)
}

fn list_with_nullability(
    element_type: DataType,
    nullable: bool,
    offsets: Vec<i32>,
    values: ArrayRef,
) -> ArrayRef {
    let field = Arc::new(Field::new("item", element_type, nullable));
    Arc::new(ListArray::new(
        field,
        OffsetBuffer::new(offsets.into()),
        values,
        None,
    ))
}

/// `Array(Nullable(Int32))` column, one inner vec per row.
pub fn int_arrays(rows: Vec<Vec<Option<i32>>>) -> Column {
    let mut offsets = vec![0i32];
    let mut values = Vec::new();
    for row in rows {
        values.extend(row);
        offsets.push(values.len() as i32);
    }
    let values = Arc::new(Int32Array::from(values)) as ArrayRef;
    Column::full(list_of(DataType::Int32, offsets, values))
}

/// Same, without nulls in the input literal.
pub fn ints(rows: Vec<Vec<i32>>) -> Column {
    int_arrays(
        rows.into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect(),
    )
}

/// `Array(Int32)` column whose elements are not nullable.
pub fn plain_ints(rows: Vec<Vec<i32>>) -> Column {
    let mut offsets = vec![0i32];
    let mut values = Vec::new();
    for row in rows {
        values.extend(row);
        offsets.push(values.len() as i32);
    }
    let values = Arc::new(Int32Array::from(values)) as ArrayRef;
    Column::full(list_with_nullability(DataType::Int32, false, offsets, values))
}

pub fn string_arrays(rows: Vec<Vec<Option<&str>>>) -> Column {
    let mut offsets = vec![0i32];
    let mut values = Vec::new();
    for row in rows {
        values.extend(row);
        offsets.push(values.len() as i32);
    }
    let values = Arc::new(StringArray::from(values)) as ArrayRef;
    Column::full(list_of(DataType::Utf8, offsets, values))
}

/// One array literal broadcast over `rows` rows.
pub fn const_ints(row: Vec<i32>, rows: usize) -> Column {
    let column = ints(vec![row]);
    Column::constant(Arc::clone(column.data()), rows).expect("single row")
}

pub fn const_i64(value: i64, rows: usize) -> Column {
    Column::constant(Arc::new(Int64Array::from(vec![value])) as ArrayRef, rows).expect("single row")
}

pub fn const_i32(value: i32, rows: usize) -> Column {
    Column::constant(Arc::new(Int32Array::from(vec![value])) as ArrayRef, rows).expect("single row")
}

pub fn const_str(value: &str, rows: usize) -> Column {
    Column::constant(Arc::new(StringArray::from(vec![value])) as ArrayRef, rows).expect("single row")
}

pub fn i64s(values: Vec<Option<i64>>) -> Column {
    Column::full(Arc::new(Int64Array::from(values)) as ArrayRef)
}

/// Resolves the result type, then evaluates.
pub fn call(name: &str, args: &[Column], rows: usize) -> arrayfn::Result<Column> {
    let result_type = return_type(name, args)?;
    eval_array_function(name, args, &result_type, rows)
}

pub fn int_rows(column: &Column) -> Vec<Vec<Option<i32>>> {
    let full = column.to_full().expect("materialize");
    let list = full.as_list::<i32>();
    (0..list.len())
        .map(|i| list.value(i).as_primitive::<Int32Type>().iter().collect())
        .collect()
}

pub fn u32_rows(column: &Column) -> Vec<Vec<u32>> {
    let full = column.to_full().expect("materialize");
    let list = full.as_list::<i32>();
    (0..list.len())
        .map(|i| list.value(i).as_primitive::<UInt32Type>().values().to_vec())
        .collect()
}

pub fn string_rows(column: &Column) -> Vec<Vec<Option<String>>> {
    let full = column.to_full().expect("materialize");
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

pub fn u32_values(column: &Column) -> Vec<u32> {
    let full = column.to_full().expect("materialize");
    full.as_any()
        .downcast_ref::<UInt32Array>()
        .expect("UInt32 column")
        .values()
        .to_vec()
}
