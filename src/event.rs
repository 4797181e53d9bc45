// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{lap::normalize, LapRecord, RaceResult, RawLap, WeatherSample};
use chrono::{NaiveDate, NaiveDateTime};
use eyre::{ensure, eyre, Result, WrapErr};
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::{collections::{HashMap, HashSet},
          fs,
          path::Path};
use tracing::debug;


/// A driver entered in the event.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Driver {
  pub id:         String,
  pub name:       String,
  pub class_name: Option<String>,
}


/// One timed run of the event, e.g. a qualifying or a race.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
  pub id:         String,
  pub name:       String,
  pub class_name: Option<String>,
  pub started_at: Option<NaiveDateTime>,
  pub laps:       Vec<RawLap>,
  pub results:    Vec<RaceResult>,
}

impl Session {
  /// Valid laps of this session. Laps which don't name their session are
  /// tagged with this session's id.
  pub fn laps(&self) -> Vec<LapRecord> {
    normalize(&self.laps).into_iter()
                         .map(|lap| {
                           if lap.session_id().is_none() {
                             lap.with_session(&self.id)
                           } else {
                             lap
                           }
                         })
                         .collect()
  }
}


/// Everything recorded at one event: entry list, sessions and weather.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
#[getset(get = "pub")]
pub struct Event {
  name:     String,
  #[serde(default)]
  date:     Option<NaiveDate>,
  #[serde(default)]
  drivers:  Vec<Driver>,
  #[serde(default)]
  sessions: Vec<Session>,
  #[serde(default)]
  weather:  Vec<WeatherSample>,
}

impl Event {
  pub fn new(name: &str,
             drivers: Vec<Driver>,
             sessions: Vec<Session>,
             weather: Vec<WeatherSample>)
             -> Self {
    Self { name: name.to_string(),
           date: None,
           drivers,
           sessions,
           weather }
  }

  /// Loads an event from a JSON file.
  pub fn load(path: &Path) -> Result<Self> {
    let extension =
      path.extension()
          .unwrap_or_default()
          .to_str()
          .ok_or(eyre!("file extension is not valid unicode ({})",
                       path.display()))?;

    ensure!(path.exists() && path.is_file(),
            "path does not exist or is not a valid file ({})",
            path.display());
    ensure!(extension == "json",
            "only files with extension .json accepted ({})",
            path.display());

    let json = fs::read_to_string(path).wrap_err_with(|| {
                                          format!("could not read event file ({})",
                                                  path.display())
                                        })?;
    let event = Self::from_json(&json).wrap_err_with(|| {
                  format!("could not parse event file ({})", path.display())
                })?;

    debug!(event = %event.name,
           sessions = event.sessions.len(),
           drivers = event.drivers.len(),
           "loaded event");
    Ok(event)
  }

  /// Parses an event from its JSON representation.
  pub fn from_json(json: &str) -> Result<Self> {
    let event: Self = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for session in &event.sessions {
      ensure!(!session.id.is_empty(), "session without id");
      ensure!(seen.insert(session.id.as_str()),
              "duplicate session id '{}'",
              session.id);
    }
    Ok(event)
  }

  pub fn session(&self, id: &str) -> Option<&Session> {
    self.sessions.iter().find(|session| session.id == id)
  }

  pub fn driver(&self, id: &str) -> Option<&Driver> {
    self.drivers.iter().find(|driver| driver.id == id)
  }

  /// Driver id to display name. Names from the entry list win over names
  /// found in session results.
  pub fn roster(&self) -> HashMap<String, String> {
    let mut roster = HashMap::new();
    for result in self.sessions.iter().flat_map(|s| &s.results) {
      if !result.driver_name.is_empty() {
        roster.insert(result.driver_id.clone(), result.driver_name.clone());
      }
    }
    for driver in &self.drivers {
      roster.insert(driver.id.clone(), driver.name.clone());
    }
    roster
  }

  /// Valid laps of all sessions.
  pub fn laps(&self) -> Vec<LapRecord> {
    self.sessions.iter().flat_map(|s| s.laps()).collect()
  }

  /// Results of all sessions.
  pub fn results(&self) -> Vec<RaceResult> {
    self.sessions
        .iter()
        .flat_map(|s| s.results.iter().cloned())
        .collect()
  }
}
