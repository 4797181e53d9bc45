// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Jonas Reitemeyer <alumni@bmc-labs.com>
//   Florian Eich <florian@bmc-labs.com>

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use tracing::debug;


/// One lap of one driver as delivered by the event data source. Any field may
/// be missing or nonsensical, `normalize` decides what survives.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLap {
  pub driver_id:  Option<String>,
  pub session_id: Option<String>,
  pub lap_number: Option<u32>,
  pub lap_time:   Option<f64>,
  pub elapsed:    Option<f64>,
  pub position:   Option<u32>,
}


/// A validated lap of one driver.
///
/// `lap_time` is finite and positive, `elapsed` (race time at the end of the
/// lap) is finite and non-negative, `lap_number` starts at 1. Records built
/// through `from_raw` or `normalize` uphold this; `new` trusts its caller.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters, Deserialize, Serialize)]
pub struct LapRecord {
  #[getset(get = "pub")]
  driver_id:  String,
  #[getset(get = "pub")]
  session_id: Option<String>,
  #[getset(get_copy = "pub")]
  lap_number: u32,
  #[getset(get_copy = "pub")]
  lap_time:   f64,
  #[getset(get_copy = "pub")]
  elapsed:    f64,
  #[getset(get_copy = "pub")]
  position:   Option<u32>,
}

impl LapRecord {
  pub fn new(driver_id: &str,
             lap_number: u32,
             lap_time: f64,
             elapsed: f64,
             position: Option<u32>)
             -> Self {
    Self { driver_id: driver_id.to_string(),
           session_id: None,
           lap_number,
           lap_time,
           elapsed,
           position }
  }

  /// Tags the lap with the session it was driven in.
  pub fn with_session(mut self, session_id: &str) -> Self {
    self.session_id = Some(session_id.to_string());
    self
  }

  /// Validates a `RawLap`. Returns `None` if the lap is unusable for display.
  pub fn from_raw(raw: &RawLap) -> Option<Self> {
    let driver_id = raw.driver_id.as_ref().filter(|id| !id.is_empty())?;
    let lap_number = raw.lap_number.filter(|&number| number >= 1)?;
    let lap_time = raw.lap_time.filter(|t| t.is_finite() && *t > 0.0)?;
    let elapsed = raw.elapsed.filter(|t| t.is_finite() && *t >= 0.0)?;

    Some(Self { driver_id: driver_id.clone(),
                session_id: raw.session_id.clone(),
                lap_number,
                lap_time,
                elapsed,
                position: raw.position.filter(|&p| p >= 1) })
  }
}


/// Drops every raw lap which fails validation. Output order follows input
/// order, but callers must not rely on it.
pub fn normalize<'a, I>(raw: I) -> Vec<LapRecord>
  where I: IntoIterator<Item = &'a RawLap>
{
  let mut dropped = 0usize;
  let laps: Vec<LapRecord> = raw.into_iter()
                                .filter_map(|raw| {
                                  let lap = LapRecord::from_raw(raw);
                                  if lap.is_none() {
                                    dropped += 1;
                                  }
                                  lap
                                })
                                .collect();

  if dropped > 0 {
    debug!(kept = laps.len(), dropped, "normalized lap records");
  }
  laps
}
