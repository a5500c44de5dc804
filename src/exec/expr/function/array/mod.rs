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
mod array_concat;
mod array_construct;
mod array_element;
mod array_enumerate;
mod array_enumerate_uniq;
mod array_pop;
mod array_push;
mod array_reduce;
mod array_reverse;
mod array_slice;
mod array_uniq;
mod common;
mod dedup;
mod dispatch;
mod empty_array_to_single;
mod gather;
mod range;
#[cfg(test)]
mod test_utils;

pub use dispatch::{FunctionMeta, eval_array_function, execute, metadata, register, return_type};
