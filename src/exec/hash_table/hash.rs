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
const HASH128_LOW_SEED: u64 = 0x243f6a8885a308d3;
const HASH128_HIGH_SEED: u64 = 0x13198a2e03707344;

pub(crate) fn combine_hash(acc: u64, value_hash: u64) -> u64 {
    acc ^ value_hash
        .wrapping_add(0x9e3779b97f4a7c15)
        .wrapping_add(acc << 6)
        .wrapping_add(acc >> 2)
}

pub(crate) fn hash_u64_with_seed(seed: u64, value: u64) -> u64 {
    mix_u64(seed ^ value)
}

pub(crate) fn hash_bytes_with_seed(seed: u64, bytes: &[u8]) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// 128-bit hash of a byte string, two independently seeded 64-bit halves.
pub(crate) fn hash128_bytes(bytes: &[u8]) -> u128 {
    let len = bytes.len() as u64;
    let low = hash_u64_with_seed(HASH128_LOW_SEED, hash_bytes_with_seed(HASH128_LOW_SEED, bytes));
    let high = hash_u64_with_seed(
        HASH128_HIGH_SEED ^ len,
        hash_bytes_with_seed(HASH128_HIGH_SEED, bytes),
    );
    ((high as u128) << 64) | low as u128
}

/// Folds one column's 128-bit hash into the running hash of a zipped tuple.
pub(crate) fn combine_hash128(acc: u128, value_hash: u128) -> u128 {
    let low = combine_hash(acc as u64, value_hash as u64);
    let high = combine_hash((acc >> 64) as u64, (value_hash >> 64) as u64);
    ((high as u128) << 64) | low as u128
}

fn mix_u64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e3779b97f4a7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d049bb133111eb);
    value ^ (value >> 31)
}
