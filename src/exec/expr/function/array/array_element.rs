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
//! `arrayElement(arr, n)`: 1-based access, negative `n` counting from the
//! end. A miss yields the element type's default, or null when the element
//! type is nullable.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, FixedSizeBinaryBuilder, PrimitiveArray, StringBuilder,
    StructArray, make_array,
};
use arrow::datatypes::{ArrowPrimitiveType, DataType};
use arrow_buffer::{NullBuffer, NullBufferBuilder};
use arrow_data::transform::MutableArrayData;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::{default_array, with_nulls};
use crate::exec::chunk::element_kind::{ElementVisitor, dispatch_element};

use super::common::{expect_array_type, int64_values, is_integer_type};
use super::gather::ArraySource;

const FN_NAME: &str = "arrayElement";

pub(super) fn return_type_array_element(args: &[Column]) -> Result<DataType> {
    let field = expect_array_type(args[0].data_type(), FN_NAME, 1)?;
    if !is_integer_type(args[1].data_type()) {
        return Err(FunctionError::illegal_type(format!(
            "Second argument for function {} must be integer, got {} instead.",
            FN_NAME,
            args[1].data_type()
        )));
    }
    Ok(field.data_type().clone())
}

/// Position inside a row of `len` elements, if `index` hits it.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    if index > 0 {
        let k = usize::try_from(index).ok()?;
        (k <= len).then(|| k - 1)
    } else if index < 0 {
        let k = usize::try_from(index.unsigned_abs()).ok()?;
        (k <= len).then(|| len - k)
    } else {
        None
    }
}

/// Tracks output validity in lock-step with the gathered positions.
struct NullMapBuilder<'a> {
    source: Option<&'a NullBuffer>,
    nulls: Option<NullBufferBuilder>,
}

impl<'a> NullMapBuilder<'a> {
    fn new(values: &'a ArrayRef, nullable: bool, capacity: usize) -> Self {
        Self {
            source: values.nulls(),
            nulls: nullable.then(|| NullBufferBuilder::new(capacity)),
        }
    }

    fn observe(&mut self, position: Option<usize>) {
        if let Some(nulls) = self.nulls.as_mut() {
            let valid = match (position, self.source) {
                (None, _) => false,
                (Some(pos), Some(source)) => source.is_valid(pos),
                (Some(_), None) => true,
            };
            nulls.append(valid);
        }
    }

    fn finish(self) -> Option<NullBuffer> {
        self.nulls.and_then(|mut nulls| nulls.finish())
    }
}

/// Gathers `values[positions[i]]`, or a default on a miss.
struct ElementGather<'a> {
    values: &'a ArrayRef,
    positions: &'a [Option<usize>],
    nullable: bool,
}

impl ElementGather<'_> {
    fn null_map(&self) -> NullMapBuilder<'_> {
        NullMapBuilder::new(self.values, self.nullable, self.positions.len())
    }
}

impl ElementVisitor for ElementGather<'_> {
    type Output = Result<ArrayRef>;

    fn visit_primitive<T: ArrowPrimitiveType>(self) -> Self::Output {
        let source = self.values.as_primitive_opt::<T>().ok_or_else(|| {
            FunctionError::illegal_column(format!(
                "Illegal column {} of first argument of function {}",
                self.values.data_type(),
                FN_NAME
            ))
        })?;
        let mut null_map = self.null_map();
        let mut out = Vec::with_capacity(self.positions.len());
        for position in self.positions {
            out.push(position.map_or(T::Native::default(), |pos| source.value(pos)));
            null_map.observe(*position);
        }
        let array = PrimitiveArray::<T>::new(out.into(), null_map.finish());
        Ok(Arc::new(array) as ArrayRef)
    }

    fn visit_fixed_string(self, width: i32) -> Self::Output {
        let source = self.values.as_fixed_size_binary();
        let zeros = vec![0u8; width.max(0) as usize];
        let mut null_map = self.null_map();
        let mut builder = FixedSizeBinaryBuilder::with_capacity(self.positions.len(), width);
        for position in self.positions {
            match position {
                Some(pos) => builder.append_value(source.value(*pos))?,
                None => builder.append_value(&zeros)?,
            }
            null_map.observe(*position);
        }
        let array = builder.finish();
        with_nulls(Arc::new(array) as ArrayRef, null_map.finish())
    }

    fn visit_string(self) -> Self::Output {
        let source = self.values.as_string::<i32>();
        let mut null_map = self.null_map();
        let mut builder = StringBuilder::with_capacity(self.positions.len(), 0);
        for position in self.positions {
            match position {
                Some(pos) => builder.append_value(source.value(*pos)),
                None => builder.append_value(""),
            }
            null_map.observe(*position);
        }
        with_nulls(Arc::new(builder.finish()) as ArrayRef, null_map.finish())
    }

    fn visit_generic(self) -> Self::Output {
        if matches!(self.values.data_type(), DataType::Struct(_)) {
            return gather_tuple(self);
        }
        let default = default_array(self.values.data_type(), 1)?;
        let sources = [self.values.to_data(), default.to_data()];
        let mut data = MutableArrayData::new(sources.iter().collect(), true, self.positions.len());
        let mut null_map = self.null_map();
        for position in self.positions {
            match position {
                Some(pos) => data.extend(0, *pos, *pos + 1),
                None => data.extend(1, 0, 1),
            }
            null_map.observe(*position);
        }
        let array = make_array(data.freeze());
        if self.nullable {
            with_nulls(array, null_map.finish())
        } else {
            Ok(array)
        }
    }
}

/// Tuples are gathered field by field with shared positions, then
/// reassembled.
fn gather_tuple(gather: ElementGather<'_>) -> Result<ArrayRef> {
    let tuple = gather.values.as_struct();
    let mut children = Vec::with_capacity(tuple.num_columns());
    for (field, child) in tuple.fields().iter().zip(tuple.columns()) {
        let child = dispatch_element(
            child.data_type(),
            ElementGather {
                values: child,
                positions: gather.positions,
                nullable: field.is_nullable(),
            },
        )?;
        children.push(child);
    }
    let nulls = gather.null_map().finish();
    if tuple.fields().is_empty() {
        return Ok(Arc::new(StructArray::new_empty_fields(gather.positions.len(), nulls)) as ArrayRef);
    }
    let array = StructArray::try_new(tuple.fields().clone(), children, nulls)?;
    Ok(Arc::new(array) as ArrayRef)
}

fn gather_elements(values: &ArrayRef, positions: &[Option<usize>], nullable: bool) -> Result<ArrayRef> {
    dispatch_element(
        values.data_type(),
        ElementGather {
            values,
            positions,
            nullable,
        },
    )
}

fn const_index(column: &Column) -> Result<Option<i64>> {
    let values = int64_values(column.data(), FN_NAME)?;
    Ok(values.is_valid(0).then(|| values.value(0)))
}

pub(super) fn eval_array_element(
    args: &[Column],
    _result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    let source = ArraySource::from_column(&args[0], FN_NAME)?;
    let nullable = source.is_nullable();
    let index = &args[1];

    if index.is_const() {
        let Some(k) = const_index(index)? else {
            let positions = vec![None; if source.is_const() { 1 } else { rows }];
            let out = gather_elements(source.values(), &positions, nullable)?;
            return wrap(out, source.is_const(), rows);
        };
        if k == 0 {
            return Err(FunctionError::ZeroIndex("Array indices is 1-based".to_string()));
        }
        let physical_rows = if source.is_const() { 1 } else { rows };
        let positions = (0..physical_rows)
            .map(|row| {
                let (start, end) = source.row_span(row);
                resolve_index(end - start, k).map(|offset| start + offset)
            })
            .collect::<Vec<_>>();
        let out = gather_elements(source.values(), &positions, nullable)?;
        return wrap(out, source.is_const(), rows);
    }

    let indices = int64_values(index.data(), FN_NAME)?;
    let positions = (0..rows)
        .map(|row| {
            if indices.is_null(row) {
                return None;
            }
            let (start, end) = source.row_span(row);
            resolve_index(end - start, indices.value(row)).map(|offset| start + offset)
        })
        .collect::<Vec<_>>();
    let out = gather_elements(source.values(), &positions, nullable)?;
    Ok(Column::full(out))
}

fn wrap(out: ArrayRef, is_const: bool, rows: usize) -> Result<Column> {
    if is_const {
        Column::constant(out, rows)
    } else {
        Ok(Column::full(out))
    }
}
