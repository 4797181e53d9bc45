// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>

use chrono::NaiveDateTime;
use getset::CopyGetters;
use serde::{Deserialize, Serialize};


/// Weather station reading taken during the event.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherSample {
  pub recorded_at: Option<NaiveDateTime>,
  pub air_temp:    Option<f64>,
  pub track_temp:  Option<f64>,
  pub humidity:    Option<f64>,
  pub wind_speed:  Option<f64>,
  pub rain:        Option<bool>,
}


#[derive(Clone, Copy, Debug, PartialEq, CopyGetters, Serialize)]
#[getset(get_copy = "pub")]
pub struct Range {
  min:  f64,
  max:  f64,
  mean: f64,
}

impl Range {
  /// Range over the finite values of `values`, `None` if there are none.
  pub fn over<I>(values: I) -> Option<Self>
    where I: IntoIterator<Item = f64>
  {
    let (mut min, mut max, mut sum, mut count) =
      (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize);

    for value in values.into_iter().filter(|v| v.is_finite()) {
      min = min.min(value);
      max = max.max(value);
      sum += value;
      count += 1;
    }

    if count == 0 {
      return None;
    }
    Some(Self { min,
                max,
                mean: sum / count as f64 })
  }
}


/// Condensed weather conditions of an event.
#[derive(Clone, Debug, Default, PartialEq, CopyGetters, Serialize)]
#[getset(get_copy = "pub")]
pub struct WeatherSummary {
  samples:    usize,
  first:      Option<NaiveDateTime>,
  last:       Option<NaiveDateTime>,
  air_temp:   Option<Range>,
  track_temp: Option<Range>,
  humidity:   Option<Range>,
  wind_speed: Option<Range>,
  wet:        bool,
}


pub fn summarize(samples: &[WeatherSample]) -> WeatherSummary {
  let reading = |f: fn(&WeatherSample) -> Option<f64>| {
    Range::over(samples.iter().filter_map(f))
  };

  WeatherSummary { samples:    samples.len(),
                   first:      samples.iter().filter_map(|s| s.recorded_at).min(),
                   last:       samples.iter().filter_map(|s| s.recorded_at).max(),
                   air_temp:   reading(|s| s.air_temp),
                   track_temp: reading(|s| s.track_temp),
                   humidity:   reading(|s| s.humidity),
                   wind_speed: reading(|s| s.wind_speed),
                   wet:        samples.iter().any(|s| s.rain == Some(true)) }
}
