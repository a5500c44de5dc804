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
pub mod array_column;
pub mod column;
pub mod element_kind;

pub use array_column::ArrayColumn;
pub use column::Column;

use crate::common::error::{FunctionError, Result};

/// A chunk of data, consisting of multiple rows.
/// Functions read argument columns by position and append their result as
/// a new column.
#[derive(Debug, Clone)]
pub struct Chunk {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Chunk {
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().position(|c| c.len() != num_rows) {
            return Err(FunctionError::logical(format!(
                "chunk column {} has {} rows, expected {}",
                bad,
                columns[bad].len(),
                num_rows
            )));
        }
        Ok(Self { columns, num_rows })
    }

    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Result<&Column> {
        self.columns.get(idx).ok_or_else(|| {
            FunctionError::logical(format!(
                "column position {} out of range (num_columns={})",
                idx,
                self.columns.len()
            ))
        })
    }

    /// Appends a column and returns its position.
    pub fn push_column(&mut self, column: Column) -> Result<usize> {
        if column.len() != self.num_rows {
            return Err(FunctionError::logical(format!(
                "result column has {} rows, chunk has {}",
                column.len(),
                self.num_rows
            )));
        }
        self.columns.push(column);
        Ok(self.columns.len() - 1)
    }
}
