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
//! Per-row distinct counting and occurrence ranking over one or more
//! zipped arrays.
//!
//! One scratch table serves a whole call. It is cleared, never
//! reallocated, at every row boundary.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, UInt32Array};
use arrow::datatypes::{ArrowPrimitiveType, DataType};
use arrow::row::{RowConverter, Rows, SortField};
use hashbrown::HashMap;

use crate::arrayfn_logging::trace;
use crate::common::config::dedup_initial_capacity;
use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::{ArrayColumn, Column};
use crate::exec::chunk::array_column::{list_field, list_with_offsets};
use crate::exec::chunk::element_kind::{ElementVisitor, dispatch_element};
use crate::exec::hash_table::hash::{combine_hash128, hash128_bytes};
use crate::exec::hash_table::key_layout::{PackedKeyLayout, native_bits};
use crate::exec::hash_table::key_strategy::{DedupKeyStrategy, pick_dedup_key_strategy};

use super::common::{array_column, zip_array_arguments};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DedupOutput {
    /// One distinct count per row.
    Count,
    /// One 1-based occurrence rank per element.
    Enumerate,
}

/// Row-scoped occurrence counters. `reset` keeps the allocation.
struct DedupScratch<K> {
    seen: HashMap<K, u32>,
    null_count: u32,
}

impl<K: Hash + Eq> DedupScratch<K> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashMap::with_capacity(capacity),
            null_count: 0,
        }
    }

    fn reset(&mut self) {
        self.seen.clear();
        self.null_count = 0;
    }

    fn observe(&mut self, key: K) -> u32 {
        let count = self.seen.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    fn observe_null(&mut self) -> u32 {
        self.null_count += 1;
        self.null_count
    }

    /// Distinct keys so far, with all nulls counted as one.
    fn distinct(&self) -> u32 {
        self.seen.len() as u32 + u32::from(self.null_count > 0)
    }
}

/// Collected per-row counts or per-element ranks.
struct DedupResult {
    mode: DedupOutput,
    values: Vec<u32>,
}

/// Runs the per-row loop. `key_at(pos)` returns `None` for a null that
/// goes to the separate null bucket.
fn run_rows<K, F>(offsets: &[usize], mode: DedupOutput, mut key_at: F) -> DedupResult
where
    K: Hash + Eq,
    F: FnMut(usize) -> Option<K>,
{
    let rows = offsets.len().saturating_sub(1);
    let total = offsets.last().copied().unwrap_or(0);
    let mut scratch = DedupScratch::with_capacity(dedup_initial_capacity());
    let mut values = Vec::with_capacity(match mode {
        DedupOutput::Count => rows,
        DedupOutput::Enumerate => total,
    });
    for row in 0..rows {
        scratch.reset();
        for pos in offsets[row]..offsets[row + 1] {
            let rank = match key_at(pos) {
                Some(key) => scratch.observe(key),
                None => scratch.observe_null(),
            };
            if mode == DedupOutput::Enumerate {
                values.push(rank);
            }
        }
        if mode == DedupOutput::Count {
            values.push(scratch.distinct());
        }
    }
    DedupResult { mode, values }
}

struct NumberKeysVisitor<'a> {
    array: &'a ArrayRef,
}

impl ElementVisitor for NumberKeysVisitor<'_> {
    type Output = Result<Vec<u64>>;

    fn visit_primitive<T: ArrowPrimitiveType>(self) -> Self::Output {
        let typed = self.array.as_primitive_opt::<T>().ok_or_else(|| {
            FunctionError::illegal_column(format!(
                "Illegal column {} for distinct keys",
                self.array.data_type()
            ))
        })?;
        Ok(typed.values().iter().map(|v| native_bits(*v)).collect())
    }

    fn visit_fixed_string(self, _width: i32) -> Self::Output {
        Err(FunctionError::logical("fixed string is not a numeric key"))
    }

    fn visit_string(self) -> Self::Output {
        Err(FunctionError::logical("string is not a numeric key"))
    }

    fn visit_generic(self) -> Self::Output {
        Err(FunctionError::logical(format!(
            "{} is not a numeric key",
            self.array.data_type()
        )))
    }
}

fn row_bytes(array: &ArrayRef) -> Result<Rows> {
    let converter = RowConverter::new(vec![SortField::new(array.data_type().clone())])?;
    Ok(converter.convert_columns(&[Arc::clone(array)])?)
}

fn dedup_over_keys(
    arrays: &[ArrayRef],
    offsets: &[usize],
    mode: DedupOutput,
    fn_name: &str,
) -> Result<DedupResult> {
    let types = arrays
        .iter()
        .map(|a| a.data_type().clone())
        .collect::<Vec<_>>();
    let has_nullable = arrays.iter().any(|a| a.null_count() > 0);
    let strategy = pick_dedup_key_strategy(&types, has_nullable);
    trace!(
        "{}: {:?} keys over {} column(s), nullable={}",
        fn_name,
        strategy,
        arrays.len(),
        has_nullable
    );
    let result = match strategy {
        DedupKeyStrategy::OneNumber => {
            let array = &arrays[0];
            let keys = dispatch_element(array.data_type(), NumberKeysVisitor { array })?;
            run_rows(offsets, mode, |pos| array.is_valid(pos).then(|| keys[pos]))
        }
        DedupKeyStrategy::OneString => {
            let array = &arrays[0];
            match array.data_type() {
                DataType::Utf8 => {
                    let strings = array.as_string::<i32>();
                    run_rows(offsets, mode, |pos| {
                        strings.is_valid(pos).then(|| strings.value(pos).as_bytes())
                    })
                }
                _ => {
                    let fixed = array.as_fixed_size_binary_opt().ok_or_else(|| {
                        FunctionError::illegal_column(format!(
                            "Illegal column {} of argument of function {}",
                            array.data_type(),
                            fn_name
                        ))
                    })?;
                    run_rows(offsets, mode, |pos| fixed.is_valid(pos).then(|| fixed.value(pos)))
                }
            }
        }
        DedupKeyStrategy::Packed128 => {
            let layout = PackedKeyLayout::try_new(arrays, has_nullable)
                .map_err(FunctionError::logical)?;
            run_rows(offsets, mode, |pos| Some(layout.pack(pos)))
        }
        DedupKeyStrategy::Hashed => {
            let rows = arrays.iter().map(row_bytes).collect::<Result<Vec<_>>>()?;
            run_rows(offsets, mode, |pos| {
                Some(rows.iter().fold(0u128, |acc, column| {
                    combine_hash128(acc, hash128_bytes(column.row(pos).as_ref()))
                }))
            })
        }
    };
    Ok(result)
}

/// Single constant array: an ordered set over the literal's encoded rows.
fn dedup_constant(view: ArrayColumn<'_>, mode: DedupOutput) -> Result<DedupResult> {
    let (start, end) = view.row_span(0);
    let values = view.values().slice(start, end - start);
    let rows = row_bytes(&values)?;
    let mut seen = BTreeMap::new();
    let mut ranks = Vec::with_capacity(values.len());
    for row in rows.iter() {
        let count = seen.entry(row).or_insert(0u32);
        *count += 1;
        ranks.push(*count);
    }
    let values = match mode {
        DedupOutput::Count => vec![seen.len() as u32],
        DedupOutput::Enumerate => ranks,
    };
    Ok(DedupResult { mode, values })
}

fn into_array(result: DedupResult, offsets: &[usize]) -> Result<ArrayRef> {
    match result.mode {
        DedupOutput::Count => Ok(Arc::new(UInt32Array::from(result.values)) as ArrayRef),
        DedupOutput::Enumerate => {
            let offsets = offsets
                .iter()
                .map(|o| {
                    i32::try_from(*o)
                        .map_err(|_| FunctionError::logical("too many elements for i32 offsets"))
                })
                .collect::<Result<Vec<_>>>()?;
            let values = Arc::new(UInt32Array::from(result.values)) as ArrayRef;
            list_with_offsets(list_field(DataType::UInt32, false), offsets, values)
        }
    }
}

pub(super) fn eval_dedup(
    args: &[Column],
    rows: usize,
    fn_name: &str,
    mode: DedupOutput,
) -> Result<Column> {
    if args.is_empty() {
        return Err(FunctionError::logical(format!(
            "{} called without arguments",
            fn_name
        )));
    }
    if let [column] = args
        && column.is_const()
    {
        let view = array_column(column, fn_name)?;
        let row_len = view.row_len(0);
        let result = dedup_constant(view, mode)?;
        let array = into_array(result, &[0, row_len])?;
        return Column::constant(array, rows);
    }

    let zipped = zip_array_arguments(args, fn_name)?;
    let result = dedup_over_keys(&zipped.values, &zipped.offsets, mode, fn_name)?;
    Ok(Column::full(into_array(result, &zipped.offsets)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, ListArray, StringArray};
    use arrow::datatypes::{Float64Type, Int32Type, Int64Type};

    fn ints(rows: Vec<Vec<Option<i32>>>) -> Column {
        let rows = rows.into_iter().map(Some).collect::<Vec<_>>();
        Column::full(Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(rows)) as ArrayRef)
    }

    fn i64s(rows: Vec<Vec<Option<i64>>>) -> Column {
        let rows = rows.into_iter().map(Some).collect::<Vec<_>>();
        Column::full(Arc::new(ListArray::from_iter_primitive::<Int64Type, _, _>(rows)) as ArrayRef)
    }

    fn ranks(column: &Column) -> Vec<u32> {
        column
            .data()
            .as_list::<i32>()
            .values()
            .as_primitive::<arrow::datatypes::UInt32Type>()
            .values()
            .to_vec()
    }

    fn counts(column: &Column) -> Vec<u32> {
        column
            .data()
            .as_primitive::<arrow::datatypes::UInt32Type>()
            .values()
            .to_vec()
    }

    #[test]
    fn test_scratch_reset_keeps_capacity() {
        let mut scratch = DedupScratch::with_capacity(4);
        for key in 0..100u64 {
            scratch.observe(key);
        }
        let capacity = scratch.seen.capacity();
        scratch.observe_null();
        assert_eq!(scratch.distinct(), 101);
        scratch.reset();
        assert_eq!(scratch.distinct(), 0);
        assert_eq!(scratch.seen.capacity(), capacity);
    }

    #[test]
    fn test_count_single_numeric() {
        let column = ints(vec![
            vec![Some(1), None, Some(1), None, Some(2)],
            vec![],
            vec![Some(5), Some(5)],
        ]);
        let out = eval_dedup(&[column], 3, "arrayUniq", DedupOutput::Count).unwrap();
        assert_eq!(counts(&out), vec![3, 0, 1]);
    }

    #[test]
    fn test_enumerate_multi_packed() {
        let a = ints(vec![vec![Some(1), Some(1), Some(1)], vec![Some(2)]]);
        let b = ints(vec![vec![Some(7), Some(7), Some(8)], vec![Some(2)]]);
        let out = eval_dedup(&[a, b], 2, "arrayEnumerateUniq", DedupOutput::Enumerate).unwrap();
        let list = out.data().as_list::<i32>();
        let ranks = list
            .values()
            .as_primitive::<arrow::datatypes::UInt32Type>()
            .values()
            .to_vec();
        assert_eq!(ranks, vec![1, 2, 1, 1]);
        assert_eq!(list.value_offsets(), &[0, 3, 4]);
    }

    #[test]
    fn test_multi_arg_length_mismatch() {
        let a = ints(vec![vec![Some(1), Some(2)]]);
        let b = ints(vec![vec![Some(1)]]);
        let err = eval_dedup(&[a, b], 1, "arrayUniq", DedupOutput::Count).unwrap_err();
        assert_eq!(err.kind(), "SIZES_OF_ARRAYS_DOESNT_MATCH");
    }

    #[test]
    fn test_strings_and_booleans() {
        let values = Arc::new(StringArray::from(vec![Some("a"), Some("b"), Some("a"), None]))
            as ArrayRef;
        let strings = Column::full(
            list_with_offsets(list_field(DataType::Utf8, true), vec![0, 4], values).unwrap(),
        );
        let out = eval_dedup(&[strings], 1, "arrayUniq", DedupOutput::Count).unwrap();
        assert_eq!(counts(&out), vec![3]);

        let flags = Arc::new(BooleanArray::from(vec![true, false, true])) as ArrayRef;
        let flags = Column::full(
            list_with_offsets(list_field(DataType::Boolean, false), vec![0, 3], flags).unwrap(),
        );
        let out = eval_dedup(&[flags], 1, "arrayUniq", DedupOutput::Count).unwrap();
        assert_eq!(counts(&out), vec![2]);
    }

    #[test]
    fn test_hashed_path_for_wide_keys() {
        let a = ints(vec![vec![Some(1), Some(1), Some(2)]]);
        let values = Arc::new(StringArray::from(vec!["x", "x", "x"])) as ArrayRef;
        let b = Column::full(
            list_with_offsets(list_field(DataType::Utf8, false), vec![0, 3], values).unwrap(),
        );
        let out = eval_dedup(&[a, b], 1, "arrayUniq", DedupOutput::Count).unwrap();
        assert_eq!(counts(&out), vec![2]);
    }

    #[test]
    fn test_packed_path_with_nulls() {
        let a = ints(vec![vec![Some(1), None, None, Some(0)]]);
        let b = ints(vec![vec![Some(1), Some(2), Some(2), Some(2)]]);
        let types = [DataType::Int32, DataType::Int32];
        assert_eq!(
            pick_dedup_key_strategy(&types, true),
            DedupKeyStrategy::Packed128
        );
        let args = [a, b];
        let out = eval_dedup(&args, 1, "arrayUniq", DedupOutput::Count).unwrap();
        // (NULL, 2) and (0, 2) are different tuples.
        assert_eq!(counts(&out), vec![3]);
        let out = eval_dedup(&args, 1, "arrayEnumerateUniq", DedupOutput::Enumerate).unwrap();
        assert_eq!(ranks(&out), vec![1, 1, 2, 1]);
    }

    #[test]
    fn test_hashed_path_with_nulls() {
        let a = i64s(vec![vec![Some(1), None, None, Some(0)], vec![None]]);
        let b = i64s(vec![vec![Some(1), Some(2), Some(2), Some(2)], vec![Some(0)]]);
        let types = [DataType::Int64, DataType::Int64];
        assert_eq!(
            pick_dedup_key_strategy(&types, true),
            DedupKeyStrategy::Hashed
        );
        let args = [a, b];
        let out = eval_dedup(&args, 2, "arrayUniq", DedupOutput::Count).unwrap();
        assert_eq!(counts(&out), vec![3, 1]);
        let out = eval_dedup(&args, 2, "arrayEnumerateUniq", DedupOutput::Enumerate).unwrap();
        assert_eq!(ranks(&out), vec![1, 1, 2, 1, 1]);
    }

    #[test]
    fn test_floats_compare_by_bits() {
        let rows = vec![Some(vec![
            Some(0.0),
            Some(-0.0),
            Some(f64::NAN),
            Some(f64::NAN),
            Some(0.0),
        ])];
        let list = ListArray::from_iter_primitive::<Float64Type, _, _>(rows);
        let column = Column::full(Arc::new(list) as ArrayRef);
        let out = eval_dedup(&[column.clone()], 1, "arrayUniq", DedupOutput::Count).unwrap();
        assert_eq!(counts(&out), vec![3]);
        let out = eval_dedup(&[column], 1, "arrayEnumerateUniq", DedupOutput::Enumerate).unwrap();
        assert_eq!(ranks(&out), vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_constant_single_array() {
        let literal = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![Some(vec![
            Some(3),
            None,
            Some(3),
            None,
        ])]);
        let column = Column::constant(Arc::new(literal) as ArrayRef, 5).unwrap();
        let out = eval_dedup(&[column.clone()], 5, "arrayUniq", DedupOutput::Count).unwrap();
        assert!(out.is_const());
        assert_eq!(counts(&out), vec![2]);
        let out = eval_dedup(&[column], 5, "arrayEnumerateUniq", DedupOutput::Enumerate).unwrap();
        let ranks = out.data().as_list::<i32>().value(0);
        assert_eq!(
            ranks
                .as_primitive::<arrow::datatypes::UInt32Type>()
                .values()
                .to_vec(),
            vec![1, 1, 2, 2]
        );
    }
}
