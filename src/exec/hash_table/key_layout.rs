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
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, FixedSizeBinaryArray};
use arrow::datatypes::{ArrowNativeType, ArrowPrimitiveType, DataType};
use arrow_buffer::{NullBuffer, ToByteSlice};

use crate::exec::chunk::element_kind::{ElementVisitor, dispatch_element};

use super::key_strategy::{PACKED_KEY_BYTES, null_bitmap_bytes};

/// Raw element bytes of one key column.
enum KeyBytesView<'a> {
    Fixed { bytes: &'a [u8], width: usize },
    Boolean(&'a BooleanArray),
}

impl KeyBytesView<'_> {
    fn width(&self) -> usize {
        match self {
            KeyBytesView::Fixed { width, .. } => *width,
            KeyBytesView::Boolean(_) => 1,
        }
    }
}

struct KeyBytesVisitor<'a> {
    array: &'a ArrayRef,
}

impl<'a> ElementVisitor for KeyBytesVisitor<'a> {
    type Output = Result<KeyBytesView<'a>, String>;

    fn visit_primitive<T: ArrowPrimitiveType>(self) -> Self::Output {
        let typed = self
            .array
            .as_primitive_opt::<T>()
            .ok_or_else(|| format!("failed to downcast {:?} key column", T::DATA_TYPE))?;
        Ok(KeyBytesView::Fixed {
            bytes: typed.values().inner().as_slice(),
            width: std::mem::size_of::<T::Native>(),
        })
    }

    fn visit_fixed_string(self, width: i32) -> Self::Output {
        let typed = self
            .array
            .as_any()
            .downcast_ref::<FixedSizeBinaryArray>()
            .ok_or_else(|| "failed to downcast FixedSizeBinaryArray key column".to_string())?;
        Ok(KeyBytesView::Fixed {
            bytes: typed.value_data(),
            width: usize::try_from(width).map_err(|_| "negative fixed string width".to_string())?,
        })
    }

    fn visit_string(self) -> Self::Output {
        Err("variable-width strings cannot be packed into a fixed key".to_string())
    }

    fn visit_generic(self) -> Self::Output {
        match self.array.data_type() {
            DataType::Boolean => Ok(KeyBytesView::Boolean(self.array.as_boolean())),
            other => Err(format!("{:?} cannot be packed into a fixed key", other)),
        }
    }
}

/// Zipped fixed-width columns packed into one u128 per position.
///
/// Layout, low byte first: the optional null bitmap (bit `i` set when
/// column `i` is null), then each column's little-endian value bytes in
/// argument order. A null column contributes zero value bytes.
pub(crate) struct PackedKeyLayout<'a> {
    columns: Vec<KeyBytesView<'a>>,
    nulls: Vec<Option<&'a NullBuffer>>,
    value_shifts: Vec<usize>,
    with_null_bitmap: bool,
}

impl<'a> PackedKeyLayout<'a> {
    pub(crate) fn try_new(arrays: &'a [ArrayRef], with_null_bitmap: bool) -> Result<Self, String> {
        let mut columns = Vec::with_capacity(arrays.len());
        let mut nulls = Vec::with_capacity(arrays.len());
        let mut value_shifts = Vec::with_capacity(arrays.len());
        let mut offset = if with_null_bitmap {
            null_bitmap_bytes(arrays.len())
        } else {
            0
        };
        for array in arrays {
            let view = dispatch_element(array.data_type(), KeyBytesVisitor { array })?;
            value_shifts.push(offset * 8);
            offset += view.width();
            columns.push(view);
            nulls.push(if with_null_bitmap { array.nulls() } else { None });
        }
        if offset > PACKED_KEY_BYTES {
            return Err(format!("packed key needs {} bytes, limit is 16", offset));
        }
        Ok(Self {
            columns,
            nulls,
            value_shifts,
            with_null_bitmap,
        })
    }

    pub(crate) fn pack(&self, pos: usize) -> u128 {
        let mut key = 0u128;
        for (idx, column) in self.columns.iter().enumerate() {
            if self.with_null_bitmap
                && let Some(nulls) = self.nulls[idx]
                && nulls.is_null(pos)
            {
                key |= 1u128 << idx;
                continue;
            }
            let shift = self.value_shifts[idx];
            match column {
                KeyBytesView::Fixed { bytes, width } => {
                    let start = pos * width;
                    for (k, byte) in bytes[start..start + width].iter().enumerate() {
                        key |= (*byte as u128) << (shift + 8 * k);
                    }
                }
                KeyBytesView::Boolean(array) => {
                    key |= (array.value(pos) as u128) << shift;
                }
            }
        }
        key
    }
}

/// Bits of a single numeric value, zero-extended to 64 bits.
pub(crate) fn native_bits<N: ArrowNativeType>(value: N) -> u64 {
    let mut bits = 0u64;
    for (k, byte) in value.to_byte_slice().iter().take(8).enumerate() {
        bits |= (*byte as u64) << (8 * k);
    }
    bits
}
