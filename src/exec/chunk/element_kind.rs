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
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};

/// Physical element representations with a specialized code path.
///
/// Everything that is not listed here is `Generic` and goes through
/// `MutableArrayData`/`take`, which only need copy-range and default
/// insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    FixedString(i32),
    String,
    Generic,
}

impl ElementKind {
    pub fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::UInt8 => ElementKind::UInt8,
            DataType::UInt16 => ElementKind::UInt16,
            DataType::UInt32 => ElementKind::UInt32,
            DataType::UInt64 => ElementKind::UInt64,
            DataType::Int8 => ElementKind::Int8,
            DataType::Int16 => ElementKind::Int16,
            DataType::Int32 => ElementKind::Int32,
            DataType::Int64 => ElementKind::Int64,
            DataType::Float32 => ElementKind::Float32,
            DataType::Float64 => ElementKind::Float64,
            DataType::FixedSizeBinary(width) => ElementKind::FixedString(*width),
            DataType::Utf8 => ElementKind::String,
            _ => ElementKind::Generic,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ElementKind::UInt8
                | ElementKind::UInt16
                | ElementKind::UInt32
                | ElementKind::UInt64
                | ElementKind::Int8
                | ElementKind::Int16
                | ElementKind::Int32
                | ElementKind::Int64
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            ElementKind::UInt8 | ElementKind::UInt16 | ElementKind::UInt32 | ElementKind::UInt64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral() || matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }

    /// Byte width of one element, if fixed.
    pub fn fixed_width(&self) -> Option<usize> {
        let width = match self {
            ElementKind::UInt8 | ElementKind::Int8 => 1,
            ElementKind::UInt16 | ElementKind::Int16 => 2,
            ElementKind::UInt32 | ElementKind::Int32 | ElementKind::Float32 => 4,
            ElementKind::UInt64 | ElementKind::Int64 | ElementKind::Float64 => 8,
            ElementKind::FixedString(width) => usize::try_from(*width).ok()?,
            ElementKind::String | ElementKind::Generic => return None,
        };
        Some(width)
    }
}

/// One algorithm, specialized per representation.
pub trait ElementVisitor {
    type Output;

    fn visit_primitive<T: ArrowPrimitiveType>(self) -> Self::Output;
    fn visit_fixed_string(self, width: i32) -> Self::Output;
    fn visit_string(self) -> Self::Output;
    fn visit_generic(self) -> Self::Output;
}

/// Runs `visitor` on the branch matching `data_type`.
pub fn dispatch_element<V: ElementVisitor>(data_type: &DataType, visitor: V) -> V::Output {
    match ElementKind::of(data_type) {
        ElementKind::UInt8 => visitor.visit_primitive::<UInt8Type>(),
        ElementKind::UInt16 => visitor.visit_primitive::<UInt16Type>(),
        ElementKind::UInt32 => visitor.visit_primitive::<UInt32Type>(),
        ElementKind::UInt64 => visitor.visit_primitive::<UInt64Type>(),
        ElementKind::Int8 => visitor.visit_primitive::<Int8Type>(),
        ElementKind::Int16 => visitor.visit_primitive::<Int16Type>(),
        ElementKind::Int32 => visitor.visit_primitive::<Int32Type>(),
        ElementKind::Int64 => visitor.visit_primitive::<Int64Type>(),
        ElementKind::Float32 => visitor.visit_primitive::<Float32Type>(),
        ElementKind::Float64 => visitor.visit_primitive::<Float64Type>(),
        ElementKind::FixedString(width) => visitor.visit_fixed_string(width),
        ElementKind::String => visitor.visit_string(),
        ElementKind::Generic => visitor.visit_generic(),
    }
}
