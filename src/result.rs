// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


/// Classified result of one driver in one race, as published by timing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RaceResult {
  pub race_id:       String,
  pub driver_id:     String,
  pub driver_name:   String,
  pub class_name:    String,
  pub position:      Option<u32>,
  pub fast_lap_time: Option<f64>,
  pub avg_lap_time:  Option<f64>,
}


/// Best and mean lap time of one driver over a set of race results.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters, Serialize)]
pub struct DriverAggregate {
  #[getset(get = "pub")]
  driver_id:     String,
  #[getset(get = "pub")]
  driver_name:   String,
  #[getset(get_copy = "pub")]
  best_lap_time: Option<f64>,
  #[getset(get_copy = "pub")]
  mean_lap_time: Option<f64>,
  #[getset(get_copy = "pub")]
  races:         usize,
}

#[derive(Default)]
struct Accumulator {
  driver_name: String,
  best:        Option<f64>,
  avg_sum:     f64,
  avg_count:   usize,
  races:       usize,
}

fn valid(time: Option<f64>) -> Option<f64> {
  time.filter(|t| t.is_finite() && *t > 0.0)
}


/// Aggregates `results` per driver, optionally restricted to `class_name`.
///
/// The best lap is the fastest valid `fast_lap_time`. The mean lap is the
/// plain mean of the valid per-race `avg_lap_time` values, so every race
/// weighs the same no matter how many laps it had. Either is `None` if the
/// driver has no valid value for it. Drivers come out in the order of their
/// first result.
pub fn aggregate(results: &[RaceResult],
                 class_name: Option<&str>)
                 -> Vec<DriverAggregate> {
  let mut order: Vec<&str> = Vec::new();
  let mut acc: HashMap<&str, Accumulator> = HashMap::new();

  for result in results {
    if let Some(class_name) = class_name {
      if result.class_name != class_name {
        continue;
      }
    }

    let entry = acc.entry(result.driver_id.as_str()).or_insert_with(|| {
                     order.push(result.driver_id.as_str());
                     Accumulator { driver_name: result.driver_name.clone(),
                                   ..Default::default() }
                   });

    entry.races += 1;
    if let Some(fast) = valid(result.fast_lap_time) {
      entry.best = Some(entry.best.map_or(fast, |best| best.min(fast)));
    }
    if let Some(avg) = valid(result.avg_lap_time) {
      entry.avg_sum += avg;
      entry.avg_count += 1;
    }
  }

  order.into_iter()
       .filter_map(|driver_id| {
         let totals = acc.remove(driver_id)?;
         let mean = if totals.avg_count > 0 {
           Some(totals.avg_sum / totals.avg_count as f64)
         } else {
           None
         };
         Some(DriverAggregate { driver_id:     driver_id.to_string(),
                                driver_name:   totals.driver_name,
                                best_lap_time: totals.best,
                                mean_lap_time: mean,
                                races:         totals.races })
       })
       .collect()
}

/// Distinct class names in `results`, in order of first appearance.
pub fn classes(results: &[RaceResult]) -> Vec<String> {
  let mut classes: Vec<String> = Vec::new();
  for result in results {
    if !result.class_name.is_empty() && !classes.contains(&result.class_name) {
      classes.push(result.class_name.clone());
    }
  }
  classes
}
