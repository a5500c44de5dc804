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
use once_cell::sync::Lazy;
use std::collections::HashMap;

mod array;

pub use array::{FunctionMeta, eval_array_function, execute, return_type};

/// Function kind identifier for all supported functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    // Array functions (generic dispatcher), keyed by canonical name
    Array(&'static str),
}

/// Function metadata for validation and documentation.
pub struct FunctionMetadata {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub kind: FunctionKind,
}

/// Static function registry mapping function names to FunctionKind.
/// Keys are lowercase; lookups are case-insensitive.
pub static FUNCTION_REGISTRY: Lazy<HashMap<&'static str, FunctionKind>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Array functions
    array::register(&mut m);

    m
});

/// Look up function kind by name (case-insensitive).
pub fn lookup_function(name: &str) -> Option<FunctionKind> {
    FUNCTION_REGISTRY.get(name.to_lowercase().as_str()).copied()
}

/// Get function metadata for validation.
pub fn function_metadata(kind: FunctionKind) -> Option<FunctionMetadata> {
    match kind {
        FunctionKind::Array(name) => array::metadata(name).map(|meta| FunctionMetadata {
            name: meta.name,
            min_args: meta.min_args,
            max_args: meta.max_args,
            kind,
        }),
    }
}
