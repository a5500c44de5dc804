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

use arrow::datatypes::DataType;

use super::AggregateFunction;

mod avg;
mod common;
mod count;
mod min_max;
mod sum;
mod uniq;

use avg::AvgAgg;
use count::CountAgg;
use min_max::MinMaxAgg;
use sum::SumAgg;
use uniq::UniqAgg;

pub(crate) fn canonical_agg_name(name: &str) -> Option<&'static str> {
    match name {
        "sum" => Some("sum"),
        "count" => Some("count"),
        "min" => Some("min"),
        "max" => Some("max"),
        "avg" => Some("avg"),
        "uniq" | "uniqExact" => Some("uniq"),
        _ => None,
    }
}

pub(super) fn resolve_by_name(
    name: &str,
    arg_types: &[DataType],
) -> Result<Arc<dyn AggregateFunction>, String> {
    let function: Arc<dyn AggregateFunction> = match canonical_agg_name(name) {
        Some("sum") => Arc::new(SumAgg::try_new(arg_types)?),
        Some("count") => Arc::new(CountAgg::try_new(arg_types)?),
        Some("min") => Arc::new(MinMaxAgg::try_new(arg_types, false)?),
        Some("max") => Arc::new(MinMaxAgg::try_new(arg_types, true)?),
        Some("avg") => Arc::new(AvgAgg::try_new(arg_types)?),
        Some("uniq") => Arc::new(UniqAgg::try_new(arg_types)?),
        _ => return Err(format!("unknown aggregate function {}", name)),
    };
    Ok(function)
}
