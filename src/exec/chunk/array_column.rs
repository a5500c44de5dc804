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

use arrow::array::{Array, ArrayRef, ListArray, StructArray, make_array, new_empty_array};
use arrow::datatypes::{DataType, Field, FieldRef};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_data::ArrayData;

use crate::common::error::{FunctionError, Result};

/// Read-only view over an offset-delimited array column.
///
/// Row `i` occupies `values[offsets[i]..offsets[i + 1]]`. List-level validity
/// is ignored: a row is its span, and spans of null rows are empty in
/// practice.
#[derive(Clone, Copy, Debug)]
pub struct ArrayColumn<'a> {
    list: &'a ListArray,
}

impl<'a> ArrayColumn<'a> {
    pub fn new(list: &'a ListArray) -> Self {
        Self { list }
    }

    pub fn try_new(array: &'a ArrayRef, fn_name: &str) -> Result<Self> {
        array
            .as_any()
            .downcast_ref::<ListArray>()
            .map(Self::new)
            .ok_or_else(|| {
                FunctionError::illegal_column(format!(
                    "Illegal column {} of argument of function {}",
                    array.data_type(),
                    fn_name
                ))
            })
    }

    pub fn list(&self) -> &'a ListArray {
        self.list
    }

    pub fn row_count(&self) -> usize {
        self.list.len()
    }

    pub fn offsets(&self) -> &'a [i32] {
        self.list.value_offsets()
    }

    pub fn row_span(&self, row: usize) -> (usize, usize) {
        let offsets = self.list.value_offsets();
        (offsets[row] as usize, offsets[row + 1] as usize)
    }

    pub fn row_len(&self, row: usize) -> usize {
        let (start, end) = self.row_span(row);
        end - start
    }

    /// Flat element storage, null overlay included.
    pub fn values(&self) -> &'a ArrayRef {
        self.list.values()
    }

    pub fn element_field(&self) -> &'a FieldRef {
        match self.list.data_type() {
            DataType::List(field) => field,
            // ListArray always carries a List data type.
            _ => unreachable!("ListArray with non-list data type"),
        }
    }

    pub fn element_type(&self) -> &'a DataType {
        self.element_field().data_type()
    }

    /// Whether the element type is `Nullable(T)`.
    pub fn is_nullable(&self) -> bool {
        self.element_field().is_nullable()
    }

    pub fn null_bitmap(&self) -> Option<&'a NullBuffer> {
        self.list.values().nulls()
    }

    /// Element storage with the null overlay stripped.
    pub fn nested_column(&self) -> Result<ArrayRef> {
        strip_nulls(self.list.values())
    }

    pub fn clone_empty(&self) -> ArrayRef {
        new_empty_array(self.list.data_type())
    }
}

pub fn list_field(element_type: DataType, nullable: bool) -> FieldRef {
    Arc::new(Field::new("item", element_type, nullable))
}

pub fn element_field_of(data_type: &DataType) -> Option<&FieldRef> {
    match data_type {
        DataType::List(field) => Some(field),
        _ => None,
    }
}

/// Builds a list over `values` without copying them.
pub fn list_with_offsets(
    field: FieldRef,
    offsets: Vec<i32>,
    values: ArrayRef,
) -> Result<ArrayRef> {
    let list = ListArray::try_new(field, OffsetBuffer::new(offsets.into()), values, None)?;
    Ok(Arc::new(list) as ArrayRef)
}

/// Wraps every element of `values` into its own single-element row.
pub fn wrap_single_element_rows(field: FieldRef, values: ArrayRef) -> Result<ArrayRef> {
    let len = i32::try_from(values.len())
        .map_err(|_| FunctionError::logical("too many elements for i32 offsets"))?;
    list_with_offsets(field, (0..=len).collect(), values)
}

pub fn strip_nulls(array: &ArrayRef) -> Result<ArrayRef> {
    if array.nulls().is_none() || matches!(array.data_type(), DataType::Null) {
        return Ok(Arc::clone(array));
    }
    let data = array.to_data().into_builder().nulls(None).build()?;
    Ok(make_array(data))
}

pub fn with_nulls(array: ArrayRef, nulls: Option<NullBuffer>) -> Result<ArrayRef> {
    if matches!(array.data_type(), DataType::Null) {
        return Ok(array);
    }
    if nulls.is_none() && array.nulls().is_none() {
        return Ok(array);
    }
    let data = array.to_data().into_builder().nulls(nulls).build()?;
    Ok(make_array(data))
}

/// `len` copies of the type's default value: zero, empty string, zeroed
/// fixed string, empty list, or a tuple of defaults.
pub fn default_array(data_type: &DataType, len: usize) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(arrow::array::new_null_array(data_type, len)),
        DataType::Struct(fields) => {
            let children = fields
                .iter()
                .map(|f| default_array(f.data_type(), len))
                .collect::<Result<Vec<_>>>()?;
            if fields.is_empty() {
                return Ok(Arc::new(StructArray::new_empty_fields(len, None)) as ArrayRef);
            }
            let array = StructArray::try_new(fields.clone(), children, None)?;
            Ok(Arc::new(array) as ArrayRef)
        }
        _ => {
            let data = ArrayData::new_null(data_type, len)
                .into_builder()
                .nulls(None)
                .build()?;
            Ok(make_array(data))
        }
    }
}
