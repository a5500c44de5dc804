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

use arrow::array::{Array, ArrayBuilder, ArrayRef, AsArray, BinaryBuilder, make_builder};
use arrow::datatypes::DataType;

use crate::arrayfn_logging::trace;
use crate::common::error::{FunctionError, Result};
use crate::exec::chunk::Column;
use crate::exec::expr::agg::{AggStateGuard, AggregateFunction, resolve};

use super::common::{expect_array_type, zip_array_arguments};

const FN_NAME: &str = "arrayReduce";

/// The aggregate name carried by the first argument. It has to be a
/// non-empty string constant.
fn aggregate_name(column: &Column) -> Result<&str> {
    let not_constant = || {
        FunctionError::illegal_type(format!(
            "First argument for function {} must be constant string: name of aggregate function.",
            FN_NAME
        ))
    };
    if !column.is_const() {
        return Err(not_constant());
    }
    let name = column.data().as_string_opt::<i32>().ok_or_else(not_constant)?;
    if name.is_null(0) || name.value(0).is_empty() {
        return Err(not_constant());
    }
    Ok(name.value(0))
}

fn resolve_aggregate(args: &[Column]) -> Result<Arc<dyn AggregateFunction>> {
    let name = aggregate_name(&args[0])?;
    let mut element_types = Vec::with_capacity(args.len() - 1);
    for (pos, arg) in args.iter().enumerate().skip(1) {
        let field = expect_array_type(arg.data_type(), FN_NAME, pos + 1)?;
        element_types.push(field.data_type().clone());
    }
    resolve(name, &element_types).map_err(|message| {
        FunctionError::illegal_type(format!(
            "Illegal aggregate function {} for function {}: {}",
            name, FN_NAME, message
        ))
    })
}

pub(super) fn return_type_array_reduce(args: &[Column]) -> Result<DataType> {
    Ok(resolve_aggregate(args)?.return_type())
}

/// Destination of one finalized value per row.
enum ResultSink {
    State(BinaryBuilder),
    Value(Box<dyn ArrayBuilder>),
}

impl ResultSink {
    fn for_function(function: &dyn AggregateFunction, result_type: &DataType, rows: usize) -> Result<Self> {
        if function.is_state() {
            if result_type != &DataType::Binary {
                return Err(FunctionError::illegal_column(format!(
                    "Illegal result column {} for state of aggregate function {}",
                    result_type,
                    function.name()
                )));
            }
            return Ok(ResultSink::State(BinaryBuilder::with_capacity(rows, rows * 16)));
        }
        if &function.return_type() != result_type {
            return Err(FunctionError::logical(format!(
                "{} expected result type {}, aggregate {} returns {}",
                FN_NAME,
                result_type,
                function.name(),
                function.return_type()
            )));
        }
        Ok(ResultSink::Value(make_builder(result_type, rows)))
    }

    fn finish(self) -> ArrayRef {
        match self {
            ResultSink::State(mut builder) => Arc::new(builder.finish()) as ArrayRef,
            ResultSink::Value(mut builder) => builder.finish(),
        }
    }
}

/// Folds every row of the zipped arrays through a fresh aggregate state.
fn reduce_rows(
    function: &dyn AggregateFunction,
    arrays: &[Column],
    result_type: &DataType,
) -> Result<ArrayRef> {
    let zipped = zip_array_arguments(arrays, FN_NAME)?;
    let rows = zipped.offsets.len().saturating_sub(1);
    let aggregate_error = |message: String| FunctionError::Aggregate {
        name: function.name().to_string(),
        message,
    };

    let mut sink = ResultSink::for_function(function, result_type, rows)?;
    for row in 0..rows {
        let mut guard = AggStateGuard::new(function);
        let state = guard.state_mut().map_err(aggregate_error)?;
        for pos in zipped.offsets[row]..zipped.offsets[row + 1] {
            state.add(&zipped.values, pos).map_err(aggregate_error)?;
        }
        match &mut sink {
            ResultSink::State(builder) => builder.append_value(state.serialize()),
            ResultSink::Value(builder) => state
                .insert_result_into(&mut **builder)
                .map_err(aggregate_error)?,
        }
    }
    Ok(sink.finish())
}

/// `arrayReduce('agg', arr1, ..., arrN)`: applies the aggregate to the
/// elements of each row, zipping the arrays positionally.
pub(super) fn eval_array_reduce(args: &[Column], result_type: &DataType, rows: usize) -> Result<Column> {
    let function = resolve_aggregate(args)?;
    trace!(
        "{} with {}: state size {} bytes, arena {}",
        FN_NAME,
        function.name(),
        function.size_of_data(),
        function.allocates_memory_in_arena()
    );

    let arrays = &args[1..];
    if arrays.iter().all(Column::is_const) {
        let values = arrays
            .iter()
            .map(|column| Column::full(Arc::clone(column.data())))
            .collect::<Vec<_>>();
        let out = reduce_rows(function.as_ref(), &values, result_type)?;
        return Column::constant(out, rows);
    }
    Ok(Column::full(reduce_rows(function.as_ref(), arrays, result_type)?))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{const_int_list, int_list_column, string_list_column};
    use super::*;
    use arrow::array::StringArray;
    use arrow::datatypes::{Float64Type, Int32Type, Int64Type, UInt64Type};

    fn name(agg: &str, rows: usize) -> Column {
        Column::constant(Arc::new(StringArray::from(vec![agg])) as ArrayRef, rows).unwrap()
    }

    fn reduce(agg: &str, arrays: Vec<Column>, rows: usize) -> Result<Column> {
        let mut args = vec![name(agg, rows)];
        args.extend(arrays);
        let result_type = return_type_array_reduce(&args)?;
        eval_array_reduce(&args, &result_type, rows)
    }

    #[test]
    fn test_reduce_sum_and_max() {
        let arr = int_list_column(vec![vec![Some(1), Some(2), Some(3)], vec![], vec![Some(-4)]]);
        let sum = reduce("sum", vec![arr.clone()], 3).unwrap();
        let sum = sum.to_full().unwrap();
        assert_eq!(sum.as_primitive::<Int64Type>().values().to_vec(), vec![6, 0, -4]);

        let max = reduce("max", vec![arr], 3).unwrap().to_full().unwrap();
        assert_eq!(max.as_primitive::<Int32Type>().value(0), 3);
        assert_eq!(max.as_primitive::<Int32Type>().value(2), -4);
    }

    #[test]
    fn test_reduce_zips_arrays_for_uniq() {
        let a = int_list_column(vec![vec![Some(1), Some(1), Some(2)]]);
        let b = string_list_column(vec![vec![Some("x"), Some("x"), Some("x")]]);
        let out = reduce("uniq", vec![a, b], 1).unwrap().to_full().unwrap();
        assert_eq!(out.as_primitive::<UInt64Type>().value(0), 2);
    }

    #[test]
    fn test_reduce_constant_arrays() {
        let arr = const_int_list(vec![Some(2), Some(4)], 3);
        let out = reduce("avg", vec![arr], 3).unwrap();
        assert!(out.is_const());
        assert_eq!(out.len(), 3);
        assert_eq!(out.data().as_primitive::<Float64Type>().value(0), 3.0);
    }

    #[test]
    fn test_reduce_state_suffix() {
        let arr = int_list_column(vec![vec![Some(1)], vec![Some(1), Some(2)]]);
        let args = vec![name("sumState", 2), arr];
        assert_eq!(return_type_array_reduce(&args).unwrap(), DataType::Binary);
        let out = eval_array_reduce(&args, &DataType::Binary, 2).unwrap();
        let out = out.to_full().unwrap();
        let states = out.as_binary::<i32>();
        assert_eq!(states.len(), 2);
        assert_ne!(states.value(0), states.value(1));

        let err = eval_array_reduce(&args, &DataType::Int64, 2).unwrap_err();
        assert_eq!(err.kind(), "ILLEGAL_COLUMN");
    }

    #[test]
    fn test_reduce_mismatched_lengths() {
        let a = int_list_column(vec![vec![Some(1), Some(2)]]);
        let b = int_list_column(vec![vec![Some(1)]]);
        let err = reduce("uniq", vec![a, b], 1).unwrap_err();
        assert_eq!(err.kind(), "SIZES_OF_ARRAYS_DOESNT_MATCH");
        assert_eq!(
            err.to_string(),
            "Lengths of all arrays passed to arrayReduce must be equal."
        );
    }

    #[test]
    fn test_reduce_rejects_bad_name() {
        let arr = int_list_column(vec![vec![Some(1)]]);
        let varying = Column::full(Arc::new(StringArray::from(vec!["sum"])) as ArrayRef);
        let err = return_type_array_reduce(&[varying, arr.clone()]).unwrap_err();
        assert_eq!(err.kind(), "ILLEGAL_TYPE_OF_ARGUMENT");

        let err = return_type_array_reduce(&[name("median", 1), arr.clone()]).unwrap_err();
        assert_eq!(err.kind(), "ILLEGAL_TYPE_OF_ARGUMENT");

        let err = return_type_array_reduce(&[name("", 1), arr]).unwrap_err();
        assert_eq!(err.kind(), "ILLEGAL_TYPE_OF_ARGUMENT");
    }

    #[test]
    fn test_reduce_rejects_non_array_argument() {
        let err = return_type_array_reduce(&[
            name("sum", 1),
            Column::full(Arc::new(arrow::array::Int32Array::from(vec![1])) as ArrayRef),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("must be array"));
    }
}
