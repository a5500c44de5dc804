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

use arrow::array::{Array, ArrayRef, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::DataType;

use crate::common::error::{FunctionError, Result};

/// A batch column: either one value per row, or a single value broadcast
/// over `rows` rows.
#[derive(Debug, Clone)]
pub enum Column {
    Full(ArrayRef),
    Const { value: ArrayRef, rows: usize },
}

impl Column {
    pub fn full(array: ArrayRef) -> Self {
        Column::Full(array)
    }

    /// `value` must hold exactly one row.
    pub fn constant(value: ArrayRef, rows: usize) -> Result<Self> {
        if value.len() != 1 {
            return Err(FunctionError::logical(format!(
                "constant column expects a single value, got {} rows",
                value.len()
            )));
        }
        Ok(Column::Const { value, rows })
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Full(array) => array.len(),
            Column::Const { rows, .. } => *rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Column::Const { .. })
    }

    pub fn data_type(&self) -> &DataType {
        self.data().data_type()
    }

    pub fn is_null_type(&self) -> bool {
        matches!(self.data_type(), DataType::Null)
    }

    /// Underlying storage: the full array, or the single constant value.
    pub fn data(&self) -> &ArrayRef {
        match self {
            Column::Full(array) => array,
            Column::Const { value, .. } => value,
        }
    }

    /// Physical position of logical row `row` inside [`Column::data`].
    pub fn row_index(&self, row: usize) -> usize {
        if self.is_const() { 0 } else { row }
    }

    /// Materializes a constant into a varying column.
    pub fn to_full(&self) -> Result<ArrayRef> {
        match self {
            Column::Full(array) => Ok(Arc::clone(array)),
            Column::Const { value, rows } => {
                let indices = UInt32Array::from(vec![0u32; *rows]);
                Ok(take(value.as_ref(), &indices, None)?)
            }
        }
    }

    /// Same shape, different storage; keeps constness.
    pub fn with_data(&self, data: ArrayRef) -> Result<Self> {
        match self {
            Column::Full(_) => Ok(Column::Full(data)),
            Column::Const { rows, .. } => Column::constant(data, *rows),
        }
    }
}
