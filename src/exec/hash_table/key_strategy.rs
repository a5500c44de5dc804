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
use arrow::datatypes::DataType;

use crate::exec::chunk::element_kind::ElementKind;

/// Width of a packed key.
pub(crate) const PACKED_KEY_BYTES: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DedupKeyStrategy {
    /// Single numeric column keyed by its raw bits.
    OneNumber,
    /// Single string or fixed-string column keyed by its bytes.
    OneString,
    /// Fixed-width columns packed, with an optional null bitmap, into a u128.
    Packed128,
    /// Per-column 128-bit hashes folded together. Two tuples with the same
    /// combined hash count as equal.
    Hashed,
}

pub(crate) fn pick_dedup_key_strategy(types: &[DataType], has_nullable: bool) -> DedupKeyStrategy {
    if types.len() == 1 {
        let kind = ElementKind::of(&types[0]);
        if kind.is_numeric() {
            return DedupKeyStrategy::OneNumber;
        }
        if matches!(kind, ElementKind::String | ElementKind::FixedString(_)) {
            return DedupKeyStrategy::OneString;
        }
    }
    if can_apply_fixed_size_key(types, has_nullable) {
        return DedupKeyStrategy::Packed128;
    }
    DedupKeyStrategy::Hashed
}

pub(crate) fn null_bitmap_bytes(columns: usize) -> usize {
    columns.div_ceil(8)
}

pub(crate) fn can_apply_fixed_size_key(types: &[DataType], has_nullable: bool) -> bool {
    let mut total = if has_nullable {
        null_bitmap_bytes(types.len())
    } else {
        0
    };
    for data_type in types {
        let Some(width) = fixed_width_size(data_type) else {
            return false;
        };
        total = total.saturating_add(width);
        if total > PACKED_KEY_BYTES {
            return false;
        }
    }
    true
}

pub(crate) fn fixed_width_size(data_type: &DataType) -> Option<usize> {
    match data_type {
        DataType::Boolean => Some(1),
        other => ElementKind::of(other).fixed_width(),
    }
}
