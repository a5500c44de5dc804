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

use arrow::array::{Array, ArrayRef, AsArray, PrimitiveArray};
use arrow::datatypes::{
    ArrowNativeType, ArrowPrimitiveType, DataType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};

use crate::arrayfn_logging::warn;
use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;
use crate::exec::chunk::array_column::{list_field, list_with_offsets};

const FN_NAME: &str = "range";

/// Hard ceiling on the elements one call may produce.
pub(super) const MAX_RANGE_ELEMENTS: usize = 100_000_000;

fn is_unsigned_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
    )
}

pub(super) fn return_type_range(args: &[Column]) -> Result<DataType> {
    let data_type = args[0].data_type();
    if !is_unsigned_integer(data_type) {
        return Err(FunctionError::illegal_type(format!(
            "Illegal type {} of argument of function {}",
            data_type, FN_NAME
        )));
    }
    Ok(DataType::List(list_field(data_type.clone(), false)))
}

fn overflow() -> FunctionError {
    FunctionError::ArgumentOutOfBound(format!(
        "A call to function {} overflows, investigate the values of arguments you are passing",
        FN_NAME
    ))
}

/// Total output length, checked before anything is allocated.
fn checked_total(lengths: impl Iterator<Item = usize>) -> Result<usize> {
    let mut total = 0usize;
    for len in lengths {
        total = total.checked_add(len).ok_or_else(overflow)?;
    }
    if total > MAX_RANGE_ELEMENTS {
        warn!(
            "{} refused to produce {} elements (limit {})",
            FN_NAME, total, MAX_RANGE_ELEMENTS
        );
        return Err(FunctionError::ArgumentOutOfBound(format!(
            "A call to function {} would produce {} array elements, which is greater than the allowed maximum of {}",
            FN_NAME, total, MAX_RANGE_ELEMENTS
        )));
    }
    Ok(total)
}

fn length_of<N: ArrowNativeType>(value: N) -> Result<usize> {
    value.to_usize().ok_or_else(overflow)
}

fn range_of<T: ArrowPrimitiveType>(column: &Column, rows: usize) -> Result<ArrayRef> {
    let bounds = column.data().as_primitive_opt::<T>().ok_or_else(|| {
        FunctionError::illegal_column(format!(
            "Illegal column {} of argument of function {}",
            column.data_type(),
            FN_NAME
        ))
    })?;
    let bound_at = |row: usize| -> Result<usize> {
        let row = column.row_index(row);
        if bounds.is_null(row) {
            Ok(0)
        } else {
            length_of(bounds.value(row))
        }
    };

    let total = if column.is_const() {
        checked_total(std::iter::once(
            bound_at(0)?.checked_mul(rows).ok_or_else(overflow)?,
        ))?
    } else {
        let lengths = (0..rows).map(bound_at).collect::<Result<Vec<_>>>()?;
        checked_total(lengths.into_iter())?
    };

    let mut values = Vec::with_capacity(total);
    let mut offsets = Vec::with_capacity(rows + 1);
    offsets.push(0i32);
    for row in 0..rows {
        let n = bound_at(row)?;
        values.extend((0..n).map(T::Native::usize_as));
        offsets.push(values.len() as i32);
    }
    let values = Arc::new(PrimitiveArray::<T>::new(values.into(), None)) as ArrayRef;
    list_with_offsets(list_field(T::DATA_TYPE, false), offsets, values)
}

/// `range(n)`: row `i` is `[0, 1, ..., n_i - 1]`. A null bound yields an
/// empty row.
pub(super) fn eval_range(args: &[Column], _result_type: &DataType, rows: usize) -> Result<Column> {
    let column = &args[0];
    let out = match column.data_type() {
        DataType::UInt8 => range_of::<UInt8Type>(column, rows)?,
        DataType::UInt16 => range_of::<UInt16Type>(column, rows)?,
        DataType::UInt32 => range_of::<UInt32Type>(column, rows)?,
        DataType::UInt64 => range_of::<UInt64Type>(column, rows)?,
        other => {
            return Err(FunctionError::illegal_column(format!(
                "Illegal column {} of argument of function {}",
                other, FN_NAME
            )));
        }
    };
    Ok(Column::full(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, UInt8Array, UInt32Array, UInt64Array};

    fn rows_of(column: &Column) -> Vec<Vec<u64>> {
        let list = column.data().as_list::<i32>();
        (0..list.len())
            .map(|i| {
                let row = list.value(i);
                let row = arrow::compute::cast(&row, &DataType::UInt64).unwrap();
                row.as_primitive::<UInt64Type>().values().to_vec()
            })
            .collect()
    }

    #[test]
    fn test_range_rows() {
        let column = Column::full(Arc::new(UInt32Array::from(vec![5, 0, 3])) as ArrayRef);
        let result_type = return_type_range(&[column.clone()]).unwrap();
        assert_eq!(result_type, DataType::List(list_field(DataType::UInt32, false)));
        let out = eval_range(&[column], &result_type, 3).unwrap();
        assert_eq!(rows_of(&out), vec![vec![0, 1, 2, 3, 4], vec![], vec![0, 1, 2]]);
    }

    #[test]
    fn test_range_constant_materializes() {
        let column = Column::constant(Arc::new(UInt8Array::from(vec![2])) as ArrayRef, 2).unwrap();
        let out = eval_range(&[column], &DataType::Null, 2).unwrap();
        assert!(!out.is_const());
        assert_eq!(rows_of(&out), vec![vec![0, 1], vec![0, 1]]);
    }

    #[test]
    fn test_range_ceiling() {
        let column = Column::full(Arc::new(UInt64Array::from(vec![
            MAX_RANGE_ELEMENTS as u64,
            1,
        ])) as ArrayRef);
        let err = eval_range(&[column], &DataType::Null, 2).unwrap_err();
        assert_eq!(err.kind(), "ARGUMENT_OUT_OF_BOUND");
        assert!(err.to_string().contains("greater than the allowed maximum of 100000000"));
    }

    #[test]
    fn test_range_sum_overflow() {
        let column = Column::full(Arc::new(UInt64Array::from(vec![u64::MAX, u64::MAX])) as ArrayRef);
        let err = eval_range(&[column], &DataType::Null, 2).unwrap_err();
        assert_eq!(err.kind(), "ARGUMENT_OUT_OF_BOUND");
        let constant =
            Column::constant(Arc::new(UInt64Array::from(vec![u64::MAX / 2])) as ArrayRef, 3)
                .unwrap();
        let err = eval_range(&[constant], &DataType::Null, 3).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_range_rejects_signed() {
        let column = Column::full(Arc::new(Int32Array::from(vec![1])) as ArrayRef);
        assert_eq!(
            return_type_range(&[column.clone()]).unwrap_err().kind(),
            "ILLEGAL_TYPE_OF_ARGUMENT"
        );
        assert_eq!(
            eval_range(&[column], &DataType::Null, 1).unwrap_err().kind(),
            "ILLEGAL_COLUMN"
        );
    }
}
