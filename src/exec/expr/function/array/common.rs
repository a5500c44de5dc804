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

use arrow::array::{Array, ArrayRef, AsArray, Int64Array};
use arrow::compute::{CastOptions, cast, cast_with_options};
use arrow::datatypes::{DataType, FieldRef};

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::{ArrayColumn, Column};
use crate::exec::chunk::array_column::{element_field_of, list_field};
use crate::exec::chunk::element_kind::ElementKind;

/// Element field of argument `pos`, which must be an array.
pub(super) fn expect_array_type<'a>(
    data_type: &'a DataType,
    fn_name: &str,
    pos: usize,
) -> Result<&'a FieldRef> {
    element_field_of(data_type).ok_or_else(|| {
        FunctionError::illegal_type(format!(
            "Argument {} of function {} must be array. Found {} instead.",
            pos, fn_name, data_type
        ))
    })
}

/// Array view of an argument column (the single stored row for a constant).
pub(super) fn array_column<'a>(column: &'a Column, fn_name: &str) -> Result<ArrayColumn<'a>> {
    ArrayColumn::try_new(column.data(), fn_name)
}

pub(super) fn is_integer_type(data_type: &DataType) -> bool {
    ElementKind::of(data_type).is_integral()
}

pub(super) fn is_number_type(data_type: &DataType) -> bool {
    ElementKind::of(data_type).is_numeric()
}

/// Integer column widened to Int64. UInt64 values above `i64::MAX` become
/// null, which every caller reads as out of range.
pub(super) fn int64_values(array: &ArrayRef, fn_name: &str) -> Result<Int64Array> {
    if !is_integer_type(array.data_type()) && !matches!(array.data_type(), DataType::Null) {
        return Err(FunctionError::illegal_column(format!(
            "Illegal column {} of argument of function {}",
            array.data_type(),
            fn_name
        )));
    }
    let options = CastOptions {
        safe: true,
        ..Default::default()
    };
    let casted = cast_with_options(array, &DataType::Int64, &options)?;
    Ok(casted.as_primitive::<arrow::datatypes::Int64Type>().clone())
}

/// Element type candidate: `(type, nullable)`.
pub(super) type ElementCandidate = (DataType, bool);

fn int_bits(data_type: &DataType) -> u32 {
    match data_type {
        DataType::Int8 | DataType::UInt8 => 8,
        DataType::Int16 | DataType::UInt16 => 16,
        DataType::Int32 | DataType::UInt32 => 32,
        _ => 64,
    }
}

fn signed_of_bits(bits: u32) -> DataType {
    match bits {
        8 => DataType::Int8,
        16 => DataType::Int16,
        32 => DataType::Int32,
        _ => DataType::Int64,
    }
}

fn unsigned_of_bits(bits: u32) -> DataType {
    match bits {
        8 => DataType::UInt8,
        16 => DataType::UInt16,
        32 => DataType::UInt32,
        _ => DataType::UInt64,
    }
}

fn least_common_numeric(types: &[&DataType], fn_name: &str) -> Result<DataType> {
    let no_common = || {
        FunctionError::illegal_type(format!(
            "There is no supertype for types {} of function {}",
            types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            fn_name
        ))
    };
    let mut max_signed = 0u32;
    let mut max_unsigned = 0u32;
    let mut has_float = false;
    let mut all_narrow = true;
    for data_type in types {
        let kind = ElementKind::of(data_type);
        match kind {
            ElementKind::Float32 => has_float = true,
            ElementKind::Float64 => {
                has_float = true;
                all_narrow = false;
            }
            _ if kind.is_unsigned() => {
                let bits = int_bits(data_type);
                max_unsigned = max_unsigned.max(bits);
                all_narrow &= bits <= 16;
            }
            _ => {
                let bits = int_bits(data_type);
                max_signed = max_signed.max(bits);
                all_narrow &= bits <= 16;
            }
        }
    }
    if has_float {
        if max_signed == 64 || max_unsigned == 64 {
            return Err(no_common());
        }
        return Ok(if all_narrow {
            DataType::Float32
        } else {
            DataType::Float64
        });
    }
    match (max_signed, max_unsigned) {
        (0, bits) => Ok(unsigned_of_bits(bits)),
        (bits, 0) => Ok(signed_of_bits(bits)),
        (_, 64) => Err(no_common()),
        (signed, unsigned) => Ok(signed_of_bits(signed.max(unsigned * 2))),
    }
}

/// Least common element type of `candidates`, with its nullability.
pub(super) fn least_common_element_type(
    candidates: &[ElementCandidate],
    fn_name: &str,
) -> Result<ElementCandidate> {
    let nullable = candidates
        .iter()
        .any(|(t, nullable)| *nullable || matches!(t, DataType::Null));
    let concrete = candidates
        .iter()
        .map(|(t, _)| t)
        .filter(|t| !matches!(t, DataType::Null))
        .collect::<Vec<_>>();
    let Some(first) = concrete.first() else {
        return Ok((DataType::Null, true));
    };
    if concrete.iter().any(|t| is_number_type(t)) {
        if let Some(bad) = concrete.iter().find(|t| !is_number_type(t)) {
            return Err(FunctionError::illegal_type(format!(
                "There is no supertype for types {} and {} of function {}: some of them are numbers and some are not",
                first, bad, fn_name
            )));
        }
        return Ok((least_common_numeric(&concrete, fn_name)?, nullable));
    }
    if let Some(bad) = concrete.iter().find(|t| !same_type_ignoring_nullability(t, first)) {
        return Err(FunctionError::illegal_type(format!(
            "There is no supertype for types {} and {} of function {}",
            first, bad, fn_name
        )));
    }
    Ok(((*first).clone(), nullable))
}

fn same_type_ignoring_nullability(left: &DataType, right: &DataType) -> bool {
    match (left, right) {
        (DataType::List(l), DataType::List(r)) => {
            same_type_ignoring_nullability(l.data_type(), r.data_type())
        }
        (DataType::Struct(l), DataType::Struct(r)) => {
            l.len() == r.len()
                && l.iter().zip(r.iter()).all(|(a, b)| {
                    a.name() == b.name()
                        && same_type_ignoring_nullability(a.data_type(), b.data_type())
                })
        }
        _ => left == right,
    }
}

/// Casts every row of a list column to `List(field)`, keeping constness.
pub(super) fn cast_list_column(column: &Column, field: &FieldRef) -> Result<Column> {
    let target = DataType::List(Arc::clone(field));
    if column.data_type() == &target {
        return Ok(column.clone());
    }
    let casted = cast(column.data(), &target)?;
    column.with_data(casted)
}

/// Common element field of the array arguments `columns`.
pub(super) fn common_list_field(columns: &[&Column], fn_name: &str) -> Result<FieldRef> {
    let mut candidates = Vec::with_capacity(columns.len());
    for (pos, column) in columns.iter().enumerate() {
        let field = expect_array_type(column.data_type(), fn_name, pos + 1)?;
        candidates.push((field.data_type().clone(), field.is_nullable()));
    }
    let (element_type, nullable) = least_common_element_type(&candidates, fn_name)?;
    Ok(list_field(element_type, nullable))
}

/// Zipped array arguments, materialized and aligned so that position `k`
/// of every values array belongs to the same element.
pub(super) struct ZippedArrays {
    /// Row boundaries relative to the start of `values`, `rows + 1` long.
    pub(super) offsets: Vec<usize>,
    pub(super) values: Vec<ArrayRef>,
}

/// Materializes every argument and checks that all of them have the same
/// length in every row.
pub(super) fn zip_array_arguments(args: &[Column], fn_name: &str) -> Result<ZippedArrays> {
    let full = args
        .iter()
        .map(Column::to_full)
        .collect::<Result<Vec<_>>>()?;
    let columns = full
        .iter()
        .map(|array| ArrayColumn::try_new(array, fn_name))
        .collect::<Result<Vec<_>>>()?;
    let Some(first) = columns.first() else {
        return Err(FunctionError::logical(format!(
            "{} called without array arguments",
            fn_name
        )));
    };

    let base = first.offsets()[0] as usize;
    let offsets = first
        .offsets()
        .iter()
        .map(|o| *o as usize - base)
        .collect::<Vec<_>>();
    for column in &columns[1..] {
        let other = column.offsets();
        let other_base = other[0] as usize;
        let same = column.row_count() == first.row_count()
            && other
                .iter()
                .zip(&offsets)
                .all(|(o, expected)| *o as usize - other_base == *expected);
        if !same {
            return Err(FunctionError::SizesOfArraysDoNotMatch(format!(
                "Lengths of all arrays passed to {} must be equal.",
                fn_name
            )));
        }
    }

    let total = offsets.last().copied().unwrap_or(0);
    let values = columns
        .iter()
        .map(|column| column.values().slice(column.offsets()[0] as usize, total))
        .collect();
    Ok(ZippedArrays { offsets, values })
}
