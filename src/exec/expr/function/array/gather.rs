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
//! Row-wise copying between array columns.
//!
//! An [`ArraySource`] gives random access to row spans of one input, and an
//! [`ArraySink`] appends elements and closes rows. Each [`GatherOp`]
//! (concat, the slice family) is written once against these two and runs on
//! every element representation through [`gather`]. Element sinks copy the
//! null overlay together with the values.

use arrow::array::{
    Array, ArrayRef, AsArray, FixedSizeBinaryArray, Int64Array, PrimitiveArray,
    StringArray, StringBuilder, make_array,
};
use arrow::datatypes::{ArrowPrimitiveType, FieldRef};
use arrow_buffer::NullBufferBuilder;
use arrow_data::ArrayData;
use arrow_data::transform::MutableArrayData;
use std::sync::Arc;

use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::array_column::list_with_offsets;
use crate::exec::chunk::element_kind::{ElementVisitor, dispatch_element};
use crate::exec::chunk::{ArrayColumn, Column};

use super::common::array_column;

/// Random-access reader over the rows of one array argument. A constant
/// argument answers every row with its single stored row.
#[derive(Clone, Copy, Debug)]
pub(super) struct ArraySource<'a> {
    column: ArrayColumn<'a>,
    is_const: bool,
}

impl<'a> ArraySource<'a> {
    pub(super) fn new(column: ArrayColumn<'a>, is_const: bool) -> Self {
        Self { column, is_const }
    }

    pub(super) fn from_column(column: &'a Column, fn_name: &str) -> Result<Self> {
        let view = array_column(column, fn_name)?;
        Ok(Self::new(view, column.is_const()))
    }

    pub(super) fn is_const(&self) -> bool {
        self.is_const
    }

    pub(super) fn row_span(&self, row: usize) -> (usize, usize) {
        self.column.row_span(if self.is_const { 0 } else { row })
    }

    pub(super) fn row_len(&self, row: usize) -> usize {
        let (start, end) = self.row_span(row);
        end - start
    }

    pub(super) fn values(&self) -> &'a ArrayRef {
        self.column.values()
    }

    /// Whether elements are `Nullable(T)`.
    pub(super) fn is_nullable(&self) -> bool {
        self.column.is_nullable()
    }
}

/// Append-only element storage of an [`ArraySink`].
pub(super) trait ElementSink {
    /// Copies `values[start..end]` of source `source`, nulls included.
    fn extend(&mut self, source: usize, start: usize, end: usize);

    fn finish(self) -> Result<ArrayRef>;
}

pub(super) struct ArraySink<S> {
    elements: S,
    offsets: Vec<i32>,
    current: usize,
}

impl<S: ElementSink> ArraySink<S> {
    fn new(elements: S, rows: usize) -> Self {
        let mut offsets = Vec::with_capacity(rows + 1);
        offsets.push(0);
        Self {
            elements,
            offsets,
            current: 0,
        }
    }

    pub(super) fn append_range(&mut self, source: usize, start: usize, end: usize) {
        if end > start {
            self.elements.extend(source, start, end);
            self.current += end - start;
        }
    }

    /// Closes the row being written.
    pub(super) fn next_row(&mut self) -> Result<()> {
        let offset = i32::try_from(self.current).map_err(|_| {
            FunctionError::logical(format!(
                "array result has {} elements, exceeding the i32 offset range",
                self.current
            ))
        })?;
        self.offsets.push(offset);
        Ok(())
    }

    fn finish(self, field: FieldRef) -> Result<ArrayRef> {
        let values = self.elements.finish()?;
        list_with_offsets(field, self.offsets, values)
    }
}

struct PrimitiveElementSink<'a, T: ArrowPrimitiveType> {
    sources: Vec<&'a PrimitiveArray<T>>,
    values: Vec<T::Native>,
    nulls: NullBufferBuilder,
}

impl<T: ArrowPrimitiveType> ElementSink for PrimitiveElementSink<'_, T> {
    fn extend(&mut self, source: usize, start: usize, end: usize) {
        let array = self.sources[source];
        self.values.extend_from_slice(&array.values()[start..end]);
        match array.nulls() {
            Some(nulls) => (start..end).for_each(|i| self.nulls.append(nulls.is_valid(i))),
            None => self.nulls.append_n_non_nulls(end - start),
        }
    }

    fn finish(mut self) -> Result<ArrayRef> {
        let array = PrimitiveArray::<T>::new(self.values.into(), self.nulls.finish());
        Ok(Arc::new(array) as ArrayRef)
    }
}

struct StringElementSink<'a> {
    sources: Vec<&'a StringArray>,
    builder: StringBuilder,
}

impl ElementSink for StringElementSink<'_> {
    fn extend(&mut self, source: usize, start: usize, end: usize) {
        let array = self.sources[source];
        for i in start..end {
            if array.is_null(i) {
                self.builder.append_null();
            } else {
                self.builder.append_value(array.value(i));
            }
        }
    }

    fn finish(mut self) -> Result<ArrayRef> {
        Ok(Arc::new(self.builder.finish()) as ArrayRef)
    }
}

struct FixedStringElementSink<'a> {
    sources: Vec<&'a FixedSizeBinaryArray>,
    values: Vec<u8>,
    nulls: NullBufferBuilder,
    width: i32,
}

impl ElementSink for FixedStringElementSink<'_> {
    fn extend(&mut self, source: usize, start: usize, end: usize) {
        let array = self.sources[source];
        for i in start..end {
            self.values.extend_from_slice(array.value(i));
        }
        match array.nulls() {
            Some(nulls) => (start..end).for_each(|i| self.nulls.append(nulls.is_valid(i))),
            None => self.nulls.append_n_non_nulls(end - start),
        }
    }

    fn finish(mut self) -> Result<ArrayRef> {
        let array =
            FixedSizeBinaryArray::try_new(self.width, self.values.into(), self.nulls.finish())?;
        Ok(Arc::new(array) as ArrayRef)
    }
}

struct GenericElementSink<'a> {
    inner: MutableArrayData<'a>,
}

impl ElementSink for GenericElementSink<'_> {
    fn extend(&mut self, source: usize, start: usize, end: usize) {
        self.inner.extend(source, start, end);
    }

    fn finish(self) -> Result<ArrayRef> {
        Ok(make_array(self.inner.freeze()))
    }
}

/// A row-wise copy from sources into a sink.
pub(super) trait GatherOp {
    fn run<S: ElementSink>(
        &self,
        sources: &[ArraySource<'_>],
        sink: &mut ArraySink<S>,
        rows: usize,
    ) -> Result<()>;
}

struct GatherVisitor<'s, 'a, O> {
    sources: &'s [ArraySource<'a>],
    field: FieldRef,
    rows: usize,
    op: &'s O,
    capacity: usize,
}

impl<O: GatherOp> GatherVisitor<'_, '_, O> {
    fn drive<S: ElementSink>(self, elements: S) -> Result<ArrayRef> {
        let mut sink = ArraySink::new(elements, self.rows);
        self.op.run(self.sources, &mut sink, self.rows)?;
        sink.finish(self.field)
    }

    fn mismatch(&self) -> FunctionError {
        FunctionError::illegal_column(format!(
            "array sources do not share element type {}",
            self.field.data_type()
        ))
    }
}

impl<O: GatherOp> ElementVisitor for GatherVisitor<'_, '_, O> {
    type Output = Result<ArrayRef>;

    fn visit_primitive<T: ArrowPrimitiveType>(self) -> Self::Output {
        let sources = self
            .sources
            .iter()
            .map(|s| s.values().as_primitive_opt::<T>())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.mismatch())?;
        let elements = PrimitiveElementSink {
            sources,
            values: Vec::with_capacity(self.capacity),
            nulls: NullBufferBuilder::new(self.capacity),
        };
        self.drive(elements)
    }

    fn visit_fixed_string(self, width: i32) -> Self::Output {
        let sources = self
            .sources
            .iter()
            .map(|s| s.values().as_fixed_size_binary_opt())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.mismatch())?;
        let elements = FixedStringElementSink {
            sources,
            values: Vec::with_capacity(self.capacity * width.max(0) as usize),
            nulls: NullBufferBuilder::new(self.capacity),
            width,
        };
        self.drive(elements)
    }

    fn visit_string(self) -> Self::Output {
        let sources = self
            .sources
            .iter()
            .map(|s| s.values().as_string_opt::<i32>())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.mismatch())?;
        let elements = StringElementSink {
            sources,
            builder: StringBuilder::with_capacity(self.capacity, self.capacity * 8),
        };
        self.drive(elements)
    }

    fn visit_generic(self) -> Self::Output {
        let data = self
            .sources
            .iter()
            .map(|s| s.values().to_data())
            .collect::<Vec<ArrayData>>();
        let refs = data.iter().collect::<Vec<_>>();
        let elements = GenericElementSink {
            inner: MutableArrayData::new(refs, true, self.capacity),
        };
        self.drive(elements)
    }
}

/// Runs `op` over `sources` and returns a `List(field)` of `rows` rows.
pub(super) fn gather<O: GatherOp>(
    sources: &[ArraySource<'_>],
    field: FieldRef,
    rows: usize,
    op: &O,
) -> Result<ArrayRef> {
    if sources.is_empty() {
        return Err(FunctionError::logical("gather needs at least one source"));
    }
    let capacity = sources
        .iter()
        .map(|s| {
            if s.is_const() {
                s.row_len(0).saturating_mul(rows)
            } else {
                s.values().len()
            }
        })
        .fold(0usize, usize::saturating_add)
        .min(1 << 20);
    let data_type = field.data_type().clone();
    dispatch_element(
        &data_type,
        GatherVisitor {
            sources,
            field,
            rows,
            op,
            capacity,
        },
    )
}

/// Row `i` is the concatenation of row `i` of every source.
pub(super) struct ConcatOp;

impl GatherOp for ConcatOp {
    fn run<S: ElementSink>(
        &self,
        sources: &[ArraySource<'_>],
        sink: &mut ArraySink<S>,
        rows: usize,
    ) -> Result<()> {
        for row in 0..rows {
            for (idx, source) in sources.iter().enumerate() {
                let (start, end) = source.row_span(row);
                sink.append_range(idx, start, end);
            }
            sink.next_row()?;
        }
        Ok(())
    }
}

pub(super) fn concat(sources: &[ArraySource<'_>], field: FieldRef, rows: usize) -> Result<ArrayRef> {
    gather(sources, field, rows, &ConcatOp)
}

/// Selected `[start, end)` inside a row of length `len`, for a 1-based
/// `offset` (negative counts from the end, zero selects nothing) and an
/// optional `length` (negative stops that many elements before the end).
pub(super) fn slice_bounds(len: usize, offset: i64, length: Option<i64>) -> (usize, usize) {
    if offset == 0 {
        return (0, 0);
    }
    let n = len as i128;
    let offset = offset as i128;
    let virtual_start = if offset > 0 { offset - 1 } else { n + offset };
    let virtual_end = match length {
        None => n,
        Some(length) if length >= 0 => virtual_start + length as i128,
        Some(length) => n + length as i128,
    };
    let start = virtual_start.clamp(0, n);
    let end = virtual_end.clamp(start, n);
    (start as usize, end as usize)
}

enum SliceShape<'a> {
    /// Constant 0-based offset from the row start.
    FromLeft { offset: usize, length: Option<i64> },
    /// Constant element count taken from the row end.
    FromRight { offset: usize, length: Option<i64> },
    /// Per-row 1-based offsets, optionally with per-row lengths.
    Dynamic {
        offsets: &'a Int64Array,
        lengths: Option<&'a Int64Array>,
    },
}

struct SliceOp<'a> {
    shape: SliceShape<'a>,
}

fn per_row(values: &Int64Array, row: usize) -> Option<i64> {
    let row = if values.len() == 1 { 0 } else { row };
    values.is_valid(row).then(|| values.value(row))
}

impl SliceOp<'_> {
    fn bounds(&self, row: usize, len: usize) -> (usize, usize) {
        match &self.shape {
            SliceShape::FromLeft { offset, length } => {
                slice_bounds(len, (*offset as i64).saturating_add(1), *length)
            }
            SliceShape::FromRight { offset, length } => {
                slice_bounds(len, (*offset as i64).saturating_neg(), *length)
            }
            SliceShape::Dynamic { offsets, lengths } => {
                let offset = per_row(offsets, row).unwrap_or(1);
                let length = lengths.and_then(|lengths| per_row(lengths, row));
                slice_bounds(len, offset, length)
            }
        }
    }
}

impl GatherOp for SliceOp<'_> {
    fn run<S: ElementSink>(
        &self,
        sources: &[ArraySource<'_>],
        sink: &mut ArraySink<S>,
        rows: usize,
    ) -> Result<()> {
        let source = &sources[0];
        for row in 0..rows {
            let (row_start, row_end) = source.row_span(row);
            let (start, end) = self.bounds(row, row_end - row_start);
            sink.append_range(0, row_start + start, row_start + end);
            sink.next_row()?;
        }
        Ok(())
    }
}

fn run_slice(source: ArraySource<'_>, field: FieldRef, rows: usize, shape: SliceShape<'_>) -> Result<ArrayRef> {
    gather(&[source], field, rows, &SliceOp { shape })
}

/// Drops the first `offset` elements of every row.
pub(super) fn slice_from_left_constant_offset_unbounded(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offset: usize,
) -> Result<ArrayRef> {
    run_slice(source, field, rows, SliceShape::FromLeft { offset, length: None })
}

/// Skips `offset` elements, then keeps `length` (negative: stop `-length`
/// before the end).
pub(super) fn slice_from_left_constant_offset_bounded(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offset: usize,
    length: i64,
) -> Result<ArrayRef> {
    run_slice(
        source,
        field,
        rows,
        SliceShape::FromLeft {
            offset,
            length: Some(length),
        },
    )
}

/// Keeps the last `offset` elements of every row.
pub(super) fn slice_from_right_constant_offset_unbounded(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offset: usize,
) -> Result<ArrayRef> {
    run_slice(source, field, rows, SliceShape::FromRight { offset, length: None })
}

pub(super) fn slice_from_right_constant_offset_bounded(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offset: usize,
    length: i64,
) -> Result<ArrayRef> {
    run_slice(
        source,
        field,
        rows,
        SliceShape::FromRight {
            offset,
            length: Some(length),
        },
    )
}

pub(super) fn slice_dynamic_offset_unbounded(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offsets: &Int64Array,
) -> Result<ArrayRef> {
    run_slice(
        source,
        field,
        rows,
        SliceShape::Dynamic {
            offsets,
            lengths: None,
        },
    )
}

pub(super) fn slice_dynamic_offset_bounded(
    source: ArraySource<'_>,
    field: FieldRef,
    rows: usize,
    offsets: &Int64Array,
    lengths: &Int64Array,
) -> Result<ArrayRef> {
    run_slice(
        source,
        field,
        rows,
        SliceShape::Dynamic {
            offsets,
            lengths: Some(lengths),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::chunk::array_column::list_field;
    use arrow::array::{ListArray, StringArray};
    use arrow::datatypes::{DataType, Int32Type};

    fn rows_of(array: &ArrayRef) -> Vec<Option<Vec<Option<i32>>>> {
        let list = array.as_list::<i32>();
        (0..list.len())
            .map(|i| {
                let row = list.value(i);
                Some(row.as_primitive::<Int32Type>().iter().collect())
            })
            .collect()
    }

    fn sample() -> ListArray {
        ListArray::from_iter_primitive::<Int32Type, _, _>(vec![
            Some(vec![Some(1), Some(2), None, Some(4), Some(5)]),
            Some(vec![]),
            Some(vec![Some(7)]),
        ])
    }

    #[test]
    fn test_slice_bounds_model() {
        assert_eq!(slice_bounds(5, 2, None), (1, 5));
        assert_eq!(slice_bounds(5, -2, None), (3, 5));
        assert_eq!(slice_bounds(5, 0, None), (0, 0));
        assert_eq!(slice_bounds(5, 2, Some(2)), (1, 3));
        assert_eq!(slice_bounds(5, 2, Some(-1)), (1, 4));
        assert_eq!(slice_bounds(5, -7, Some(3)), (0, 1));
        assert_eq!(slice_bounds(5, 9, Some(3)), (5, 5));
        assert_eq!(slice_bounds(5, 1, Some(-9)), (0, 0));
    }

    #[test]
    fn test_constant_paths_match_dynamic() {
        let list = sample();
        let field = list_field(DataType::Int32, true);
        let source = ArraySource::new(ArrayColumn::new(&list), false);
        for offset in -7i64..=7 {
            for length in [None, Some(-6), Some(-1), Some(0), Some(2), Some(9)] {
                let offsets = Int64Array::from(vec![offset; 3]);
                let dynamic = match length {
                    None => slice_dynamic_offset_unbounded(source, field.clone(), 3, &offsets),
                    Some(l) => slice_dynamic_offset_bounded(
                        source,
                        field.clone(),
                        3,
                        &offsets,
                        &Int64Array::from(vec![l; 3]),
                    ),
                }
                .unwrap();
                if offset == 0 {
                    continue;
                }
                let specialized = match (offset > 0, length) {
                    (true, None) => slice_from_left_constant_offset_unbounded(
                        source,
                        field.clone(),
                        3,
                        (offset - 1) as usize,
                    ),
                    (true, Some(l)) => slice_from_left_constant_offset_bounded(
                        source,
                        field.clone(),
                        3,
                        (offset - 1) as usize,
                        l,
                    ),
                    (false, None) => slice_from_right_constant_offset_unbounded(
                        source,
                        field.clone(),
                        3,
                        (-offset) as usize,
                    ),
                    (false, Some(l)) => slice_from_right_constant_offset_bounded(
                        source,
                        field.clone(),
                        3,
                        (-offset) as usize,
                        l,
                    ),
                }
                .unwrap();
                assert_eq!(
                    rows_of(&dynamic),
                    rows_of(&specialized),
                    "offset={} length={:?}",
                    offset,
                    length
                );
            }
        }
    }

    #[test]
    fn test_source_from_columns() {
        let literal = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![Some(vec![
            Some(3),
            None,
        ])]);
        let constant = Column::constant(Arc::new(literal) as ArrayRef, 4).unwrap();
        let source = ArraySource::from_column(&constant, "arraySlice").unwrap();
        assert!(source.is_const());
        assert!(source.is_nullable());
        assert_eq!(source.row_span(3), (0, 2));
        assert_eq!(source.values().len(), 2);

        let full = Column::full(Arc::new(sample()) as ArrayRef);
        let source = ArraySource::from_column(&full, "arraySlice").unwrap();
        assert!(!source.is_const());
        assert_eq!(source.row_span(2), (5, 6));
        assert_eq!(source.row_len(1), 0);

        let scalar = Column::full(Arc::new(Int64Array::from(vec![1])) as ArrayRef);
        let err = ArraySource::from_column(&scalar, "arraySlice").unwrap_err();
        assert_eq!(err.kind(), "ILLEGAL_COLUMN");
    }

    #[test]
    fn test_concat_keeps_null_overlay() {
        let list = sample();
        let field = list_field(DataType::Int32, true);
        let sources = [
            ArraySource::new(ArrayColumn::new(&list), false),
            ArraySource::new(ArrayColumn::new(&list), false),
        ];
        let out = concat(&sources, field, 3).unwrap();
        let rows = rows_of(&out);
        assert_eq!(
            rows[0],
            Some(vec![
                Some(1),
                Some(2),
                None,
                Some(4),
                Some(5),
                Some(1),
                Some(2),
                None,
                Some(4),
                Some(5)
            ])
        );
        assert_eq!(rows[1], Some(vec![]));
        assert_eq!(rows[2], Some(vec![Some(7), Some(7)]));
    }

    #[test]
    fn test_concat_strings_with_const_source() {
        let values = Arc::new(StringArray::from(vec![Some("a"), None, Some("b")])) as ArrayRef;
        let field = list_field(DataType::Utf8, true);
        let varying = ListArray::try_new(
            field.clone(),
            arrow_buffer::OffsetBuffer::new(vec![0, 2, 3].into()),
            values,
            None,
        )
        .unwrap();
        let literal = ListArray::try_new(
            field.clone(),
            arrow_buffer::OffsetBuffer::new(vec![0, 1].into()),
            Arc::new(StringArray::from(vec!["z"])) as ArrayRef,
            None,
        )
        .unwrap();
        let sources = [
            ArraySource::new(ArrayColumn::new(&varying), false),
            ArraySource::new(ArrayColumn::new(&literal), true),
        ];
        let out = concat(&sources, field, 2).unwrap();
        let list = out.as_list::<i32>();
        let row0 = list.value(0);
        let row0 = row0.as_string::<i32>();
        assert_eq!(row0.len(), 3);
        assert!(row0.is_null(1));
        assert_eq!(row0.value(2), "z");
        assert_eq!(list.value(1).as_string::<i32>().value(1), "z");
    }
}
