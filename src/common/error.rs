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
use arrow::error::ArrowError;
use thiserror::Error;

/// Errors surfaced by array functions. None of them are retried, and a
/// failed call never leaves a partial result behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("Number of arguments for function {name} doesn't match: passed {passed}, should be {expected}")]
    NumberOfArgumentsMismatch {
        name: String,
        passed: usize,
        expected: String,
    },
    #[error("{0}")]
    IllegalTypeOfArgument(String),
    #[error("{0}")]
    IllegalColumn(String),
    #[error("{0}")]
    SizesOfArraysDoNotMatch(String),
    #[error("{0}")]
    ZeroIndex(String),
    #[error("{0}")]
    ArgumentOutOfBound(String),
    #[error("logical error: {0}")]
    LogicalError(String),
    /// Failure reported by an aggregate state while folding a row.
    #[error("aggregate function {name} failed: {message}")]
    Aggregate { name: String, message: String },
}

impl FunctionError {
    pub fn illegal_type(message: impl Into<String>) -> Self {
        Self::IllegalTypeOfArgument(message.into())
    }

    pub fn illegal_column(message: impl Into<String>) -> Self {
        Self::IllegalColumn(message.into())
    }

    pub fn logical(message: impl Into<String>) -> Self {
        Self::LogicalError(message.into())
    }

    /// Stable kind name, handy for logs and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NumberOfArgumentsMismatch { .. } => "NUMBER_OF_ARGUMENTS_DOESNT_MATCH",
            Self::IllegalTypeOfArgument(_) => "ILLEGAL_TYPE_OF_ARGUMENT",
            Self::IllegalColumn(_) => "ILLEGAL_COLUMN",
            Self::SizesOfArraysDoNotMatch(_) => "SIZES_OF_ARRAYS_DOESNT_MATCH",
            Self::ZeroIndex(_) => "ZERO_ARRAY_OR_TUPLE_INDEX",
            Self::ArgumentOutOfBound(_) => "ARGUMENT_OUT_OF_BOUND",
            Self::LogicalError(_) => "LOGICAL_ERROR",
            Self::Aggregate { .. } => "AGGREGATE_FUNCTION_ERROR",
        }
    }
}

impl From<ArrowError> for FunctionError {
    fn from(err: ArrowError) -> Self {
        Self::LogicalError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FunctionError>;
