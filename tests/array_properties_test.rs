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
//! Integration tests for the array functions, driven through the public
//! `return_type` / `eval_array_function` / `execute` entry points.
mod common;

use std::sync::Arc;

use arrow::array::{Array, AsArray, UInt64Array};
use arrow::datatypes::{DataType, Int32Type};

use arrayfn::{Chunk, Column, execute};
use common::*;

fn sample_rows() -> Vec<Vec<Option<i32>>> {
    vec![
        vec![Some(1), None, Some(3)],
        vec![],
        vec![Some(7)],
        vec![None, None],
        vec![Some(5), Some(4), Some(3), Some(2), Some(1)],
    ]
}

fn elements(column: &Column) -> Vec<Option<i32>> {
    column
        .to_full()
        .unwrap()
        .as_primitive::<Int32Type>()
        .iter()
        .collect()
}

#[test]
fn test_reverse_is_an_involution() {
    let arr = int_arrays(sample_rows());
    let once = call("arrayReverse", &[arr.clone()], 5).unwrap();
    let twice = call("arrayReverse", &[once.clone()], 5).unwrap();
    assert_eq!(int_rows(&twice), sample_rows());
    assert_eq!(int_rows(&once)[0], vec![Some(3), None, Some(1)]);
}

#[test]
fn test_positive_and_negative_indices_agree() {
    let rows = sample_rows();
    let arr = int_arrays(rows.clone());
    for (row, values) in rows.iter().enumerate() {
        let len = values.len() as i64;
        for k in 1..=len {
            let mut pos = vec![None; rows.len()];
            let mut neg = vec![None; rows.len()];
            pos[row] = Some(k);
            neg[row] = Some(-(len - k + 1));
            let a = call("arrayElement", &[arr.clone(), i64s(pos)], rows.len()).unwrap();
            let b = call("arrayElement", &[arr.clone(), i64s(neg)], rows.len()).unwrap();
            assert_eq!(elements(&a)[row], elements(&b)[row]);
            assert_eq!(elements(&a)[row], values[(k - 1) as usize]);
        }
    }
}

#[test]
fn test_out_of_range_index_gives_default_or_null() {
    let nullable = ints(vec![vec![1, 2], vec![]]);
    for k in [3, -3, 100, i64::MIN] {
        let out = call("arrayElement", &[nullable.clone(), const_i64(k, 2)], 2).unwrap();
        assert_eq!(elements(&out), vec![None, None]);
    }

    let plain = plain_ints(vec![vec![1, 2], vec![]]);
    let out = call("arrayElement", &[plain, const_i64(3, 2)], 2).unwrap();
    let out = out.to_full().unwrap();
    assert_eq!(out.null_count(), 0);
    assert_eq!(out.as_primitive::<Int32Type>().values().to_vec(), vec![0, 0]);
}

#[test]
fn test_zero_index_is_rejected() {
    let arr = ints(vec![vec![1]]);
    let err = call("arrayElement", &[arr, const_i64(0, 1)], 1).unwrap_err();
    assert_eq!(err.kind(), "ZERO_ARRAY_OR_TUPLE_INDEX");
}

#[test]
fn test_distinct_count_ignores_order_and_duplicates() {
    let arr = int_arrays(vec![
        vec![Some(3), Some(1), Some(2)],
        vec![Some(2), Some(2), Some(1), Some(3), Some(3), Some(3)],
        vec![Some(1), Some(3), Some(2), Some(1)],
    ]);
    let out = call("arrayUniq", &[arr], 3).unwrap();
    assert_eq!(u32_values(&out), vec![3, 3, 3]);
}

#[test]
fn test_concat_of_slices_restores_array() {
    let rows = vec![vec![1, 2, 3, 4, 5], vec![6, 7], vec![8, 9, 10]];
    let arr = ints(rows.clone());
    for n in 0..=3i64 {
        let head = call("arraySlice", &[arr.clone(), const_i64(1, 3), const_i64(n, 3)], 3).unwrap();
        let tail = call("arraySlice", &[arr.clone(), const_i64(n + 1, 3)], 3).unwrap();
        let joined = call("arrayConcat", &[head, tail], 3).unwrap();
        assert_eq!(int_rows(&joined), int_rows(&arr), "split at {}", n);
    }
}

#[test]
fn test_empty_array_to_single_is_idempotent() {
    let arr = int_arrays(vec![vec![], vec![Some(1), None], vec![]]);
    let once = call("emptyArrayToSingle", &[arr], 3).unwrap();
    let twice = call("emptyArrayToSingle", &[once.clone()], 3).unwrap();
    assert_eq!(int_rows(&once), int_rows(&twice));
    assert_eq!(
        int_rows(&once),
        vec![vec![Some(0)], vec![Some(1), None], vec![Some(0)]]
    );
}

#[test]
fn test_range_rows() {
    let bounds = Column::full(Arc::new(UInt64Array::from(vec![5, 0, 3])));
    let out = call("range", &[bounds], 3).unwrap();
    let out = out.to_full().unwrap();
    let list = out.as_list::<i32>();
    let rows: Vec<Vec<u64>> = (0..list.len())
        .map(|i| {
            list.value(i)
                .as_primitive::<arrow::datatypes::UInt64Type>()
                .values()
                .to_vec()
        })
        .collect();
    assert_eq!(rows, vec![vec![0, 1, 2, 3, 4], vec![], vec![0, 1, 2]]);
}

#[test]
fn test_enumerate_uniq_scenario() {
    let arr = int_arrays(vec![vec![Some(1), Some(2), Some(2), None], vec![Some(1), Some(3)]]);
    let out = call("arrayEnumerateUniq", &[arr], 2).unwrap();
    assert_eq!(u32_rows(&out), vec![vec![1, 1, 2, 1], vec![1, 1]]);
}

#[test]
fn test_push_pop_slice_scenarios() {
    let out = call("arrayPushBack", &[ints(vec![vec![1, 2]]), const_i32(3, 1)], 1).unwrap();
    assert_eq!(int_rows(&out), vec![vec![Some(1), Some(2), Some(3)]]);

    let out = call("arrayPopFront", &[ints(vec![vec![1, 2, 3]])], 1).unwrap();
    assert_eq!(int_rows(&out), vec![vec![Some(2), Some(3)]]);

    let out = call("arraySlice", &[ints(vec![vec![1, 2, 3, 4, 5]]), const_i64(-2, 1)], 1).unwrap();
    assert_eq!(int_rows(&out), vec![vec![Some(4), Some(5)]]);
}

#[test]
fn test_uniq_null_group_scenario() {
    let arr = int_arrays(vec![vec![Some(1), None, Some(1), None, Some(2)]]);
    let out = call("arrayUniq", &[arr], 1).unwrap();
    assert_eq!(u32_values(&out), vec![3]);
}

#[test]
fn test_constant_arguments_stay_constant() {
    let arr = const_ints(vec![1, 2, 3], 4);
    let out = call("arrayReverse", &[arr.clone()], 4).unwrap();
    assert!(out.is_const());
    assert_eq!(out.len(), 4);
    assert_eq!(int_rows(&out), vec![vec![Some(3), Some(2), Some(1)]; 4]);

    let out = call("arraySlice", &[arr, const_i64(2, 4), const_i64(1, 4)], 4).unwrap();
    assert!(out.is_const());
    assert_eq!(int_rows(&out), vec![vec![Some(2)]; 4]);
}

#[test]
fn test_strings_flow_through_concat_and_element() {
    let arr = string_arrays(vec![vec![Some("a"), None], vec![Some("b")]]);
    let out = call("arrayConcat", &[arr.clone(), arr.clone()], 2).unwrap();
    assert_eq!(
        string_rows(&out)[1],
        vec![Some("b".to_string()), Some("b".to_string())]
    );
    let out = call("arrayElement", &[arr, const_i64(2, 2)], 2).unwrap();
    let out = out.to_full().unwrap();
    let strings = out.as_string::<i32>();
    assert!(strings.is_null(0));
    assert!(strings.is_null(1));
}

#[test]
fn test_array_constructor_widens_elements() {
    let a = Column::full(Arc::new(arrow::array::Int8Array::from(vec![1, 2])));
    let b = Column::full(Arc::new(arrow::array::Int32Array::from(vec![30, 40])));
    let result_type = arrayfn::return_type("array", &[a.clone(), b.clone()]).unwrap();
    let DataType::List(field) = &result_type else {
        panic!("array must return a list, got {}", result_type);
    };
    assert_eq!(field.data_type(), &DataType::Int32);
    let out = arrayfn::eval_array_function("array", &[a, b], &result_type, 2).unwrap();
    assert_eq!(
        int_rows(&out),
        vec![vec![Some(1), Some(30)], vec![Some(2), Some(40)]]
    );
}

#[test]
fn test_zipped_length_mismatch() {
    let a = ints(vec![vec![1, 2]]);
    let b = ints(vec![vec![1]]);
    let err = call("arrayUniq", &[a, b], 1).unwrap_err();
    assert_eq!(err.kind(), "SIZES_OF_ARRAYS_DOESNT_MATCH");
}

#[test]
fn test_execute_on_chunk() {
    let config = TestConfig::new().unwrap();
    config.init_logging();
    let arr = ints(vec![vec![1, 2, 3], vec![4]]);
    let mut chunk = Chunk::try_new(vec![arr, const_i64(2, 2)]).unwrap();
    let slot = execute("array_slice", &mut chunk, &[0, 1]).unwrap();
    assert_eq!(slot, 2);
    assert_eq!(
        int_rows(chunk.column(slot).unwrap()),
        vec![vec![Some(2), Some(3)], vec![]]
    );
}

#[test]
fn test_non_array_argument_is_rejected() {
    let scalar = const_i64(1, 1);
    let err = arrayfn::return_type("arrayReverse", &[scalar]).unwrap_err();
    assert_eq!(err.kind(), "ILLEGAL_TYPE_OF_ARGUMENT");
}
