// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::Color;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::{collections::{BTreeMap, HashMap},
          fs,
          path::{Path, PathBuf}};
use tracing::{debug, warn};


/// Key value storage for settings which outlive a single session.
pub trait PreferenceStore {
  fn get(&self, key: &str) -> Result<Option<String>>;
  fn set(&mut self, key: &str, value: &str) -> Result<()>;
}


/// Volatile store, mainly for tests and one-shot invocations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
  values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.values.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    self.values.insert(key.to_string(), value.to_string());
    Ok(())
  }
}


/// Store backed by a JSON object in a file. A missing file is an empty store;
/// the file is created on the first `set`.
#[derive(Clone, Debug, PartialEq)]
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  pub fn new(path: &Path) -> Self {
    Self { path: path.to_owned() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn read(&self) -> Result<BTreeMap<String, String>> {
    if !self.path.exists() {
      return Ok(BTreeMap::new());
    }
    let json = fs::read_to_string(&self.path).wrap_err_with(|| {
                 format!("could not read preferences ({})", self.path.display())
               })?;
    serde_json::from_str(&json).wrap_err_with(|| {
                                 format!("could not parse preferences ({})",
                                         self.path.display())
                               })
  }
}

impl PreferenceStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.read()?.remove(key))
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    let mut values = self.read()?;
    values.insert(key.to_string(), value.to_string());
    fs::write(&self.path, serde_json::to_string_pretty(&values)?).wrap_err_with(|| {
      format!("could not write preferences ({})", self.path.display())
    })
  }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
  Bar,
  Line,
  Scatter,
}

impl Default for ChartType {
  fn default() -> Self {
    ChartType::Line
  }
}


/// How the user last left the dashboard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewPreferences {
  pub chart_type:        ChartType,
  pub sidebar_collapsed: bool,
  pub top_n:             usize,
  /// Series id to `#rrggbb`.
  pub series_colors:     BTreeMap<String, String>,
}

impl Default for ViewPreferences {
  fn default() -> Self {
    Self { chart_type:        ChartType::default(),
           sidebar_collapsed: false,
           top_n:             10,
           series_colors:     BTreeMap::new() }
  }
}

impl ViewPreferences {
  pub const KEY: &'static str = "view-preferences";

  /// Reads the preferences from `store`. Missing or broken entries give the
  /// defaults; the dashboard should come up either way.
  pub fn load(store: &dyn PreferenceStore) -> Self {
    match store.get(Self::KEY) {
      Ok(Some(json)) => {
        serde_json::from_str(&json).unwrap_or_else(|err| {
                                     warn!(%err, "discarding unreadable view preferences");
                                     Self::default()
                                   })
      }
      Ok(None) => {
        debug!("no stored view preferences, using defaults");
        Self::default()
      }
      Err(err) => {
        warn!(%err, "could not load view preferences");
        Self::default()
      }
    }
  }

  pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
    store.set(Self::KEY, &serde_json::to_string(self)?)
  }

  pub fn set_series_color(&mut self, series_id: &str, color: Color) {
    self.series_colors.insert(series_id.to_string(), color.to_string());
  }

  pub fn reset_series_color(&mut self, series_id: &str) {
    self.series_colors.remove(series_id);
  }
}
