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
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CONFIG: OnceLock<ArrayFnConfig> = OnceLock::new();

fn default_log_level() -> String {
    "info".to_string()
}

pub fn init_from_path(path: impl AsRef<Path>) -> Result<&'static ArrayFnConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = path.as_ref().to_path_buf();
    let cfg = ArrayFnConfig::load_from_file(&path)?;
    let _ = CONFIG.set(cfg);
    CONFIG.get().ok_or_else(|| anyhow!("config not initialized"))
}

pub fn init_from_env_or_default() -> Result<&'static ArrayFnConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = config_path_from_env_or_default()?;
    let cfg = ArrayFnConfig::load_from_file(&path)?;
    let _ = CONFIG.set(cfg);
    CONFIG.get().ok_or_else(|| anyhow!("config not initialized"))
}

pub fn config() -> Result<&'static ArrayFnConfig> {
    init_from_env_or_default()
}

fn config_path_from_env_or_default() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("ARRAYFN_CONFIG")
        && !p.trim().is_empty()
    {
        return Ok(PathBuf::from(p));
    }

    let candidates = [PathBuf::from("arrayfn.toml")];
    for p in candidates {
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "missing config file: set $ARRAYFN_CONFIG or create ./arrayfn.toml"
    ))
}

#[derive(Clone, Debug, Deserialize)]
pub struct ArrayFnConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional full tracing EnvFilter expression.
    /// If set, this takes precedence over `log_level`.
    /// Example: "arrayfn=debug"
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

impl ArrayFnConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let cfg: ArrayFnConfig =
            toml::from_str(&s).with_context(|| format!("parse toml: {}", path.display()))?;
        Ok(cfg)
    }
}

impl Default for ArrayFnConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_filter: None,
            runtime: RuntimeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Initial capacity reserved for the per-call dedup scratch table.
    #[serde(default = "default_dedup_initial_capacity")]
    pub dedup_initial_capacity: usize,
}

fn default_dedup_initial_capacity() -> usize {
    512
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dedup_initial_capacity: default_dedup_initial_capacity(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub log_function_calls: bool,
}

#[cfg(test)]
mod tests {
    use super::ArrayFnConfig;
    use std::io::Write;

    #[test]
    fn test_runtime_defaults() {
        let cfg: ArrayFnConfig = toml::from_str(
            r#"
[runtime]
"#,
        )
        .expect("parse config");
        assert_eq!(cfg.runtime.dedup_initial_capacity, 512);
        assert!(!cfg.debug.log_function_calls);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_runtime_can_be_overridden() {
        let cfg: ArrayFnConfig = toml::from_str(
            r#"
log_filter = "arrayfn=trace"

[runtime]
dedup_initial_capacity = 64

[debug]
log_function_calls = true
"#,
        )
        .expect("parse config");
        assert_eq!(cfg.runtime.dedup_initial_capacity, 64);
        assert!(cfg.debug.log_function_calls);
        assert_eq!(cfg.log_filter.as_deref(), Some("arrayfn=trace"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("arrayfn.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "log_level = \"debug\"").expect("write");
        let cfg = ArrayFnConfig::load_from_file(&path).expect("load");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.runtime.dedup_initial_capacity, 512);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ArrayFnConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("read config file"));
    }
}
