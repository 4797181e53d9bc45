// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::LapRecord;
use getset::Getters;
use serde::Serialize;
use std::collections::HashMap;


/// All laps of one driver, ordered by lap number.
#[derive(Clone, Debug, PartialEq, Getters, Serialize)]
#[getset(get = "pub")]
pub struct DriverSeries {
  driver_id:   String,
  driver_name: String,
  laps:        Vec<LapRecord>,
}

impl DriverSeries {
  /// Creates a series, sorting `laps` by lap number. The sort is stable, so
  /// duplicate lap numbers keep the order they were recorded in.
  pub fn new(driver_id: &str, driver_name: &str, mut laps: Vec<LapRecord>) -> Self {
    laps.sort_by_key(|lap| lap.lap_number());
    Self { driver_id: driver_id.to_string(),
           driver_name: driver_name.to_string(),
           laps }
  }

  pub fn len(&self) -> usize {
    self.laps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.laps.is_empty()
  }

  /// Fastest lap time in the series, `None` if there are no laps.
  pub fn best_lap_time(&self) -> Option<f64> {
    self.laps
        .iter()
        .map(|lap| lap.lap_time())
        .min_by(|a, b| a.total_cmp(b))
  }

  /// Arithmetic mean over all lap times in the series.
  pub fn mean_lap_time(&self) -> Option<f64> {
    if self.laps.is_empty() {
      return None;
    }
    let total: f64 = self.laps.iter().map(|lap| lap.lap_time()).sum();
    Some(total / self.laps.len() as f64)
  }

  /// The last recorded lap with number `lap_number`.
  pub fn lap(&self, lap_number: u32) -> Option<&LapRecord> {
    self.laps
        .iter()
        .rev()
        .find(|lap| lap.lap_number() == lap_number)
  }
}


/// Groups `laps` into one `DriverSeries` per driver id.
///
/// Series come out in the order their driver first appears in `laps`. Names
/// are looked up in `roster` (driver id to display name); drivers missing from
/// the roster are named by their id.
pub fn build_series<'a, I>(laps: I,
                           roster: &HashMap<String, String>)
                           -> Vec<DriverSeries>
  where I: IntoIterator<Item = &'a LapRecord>
{
  let mut order: Vec<String> = Vec::new();
  let mut grouped: HashMap<String, Vec<LapRecord>> = HashMap::new();

  for lap in laps {
    let group = grouped.entry(lap.driver_id().clone()).or_insert_with(|| {
                         order.push(lap.driver_id().clone());
                         Vec::new()
                       });
    group.push(lap.clone());
  }

  order.into_iter()
       .filter_map(|driver_id| {
         let laps = grouped.remove(&driver_id)?;
         let name = roster.get(&driver_id).unwrap_or(&driver_id);
         Some(DriverSeries::new(&driver_id, name, laps))
       })
       .collect()
}
