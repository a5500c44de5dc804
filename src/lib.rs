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
//! Vectorized array functions over Arrow list columns.
//!
//! Every function consumes a batch of argument columns and produces one
//! result column. Array arguments are `ListArray`s; a single-row
//! [`Column::Const`] stands for a value broadcast over the whole batch.

pub mod common;
pub mod exec;

// `arrayfn_*` convenience aliases.
pub use common::app_config as arrayfn_config;
pub use common::logging as arrayfn_logging;

pub use common::error::{FunctionError, Result};
pub use exec::chunk::{Chunk, Column};
pub use exec::expr::function::{FunctionMeta, eval_array_function, execute, return_type};
