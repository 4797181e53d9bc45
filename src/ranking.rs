// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{DriverAggregate, DriverSeries, GapSeries};


/// Anything which can be ranked by the fastest lap of its driver.
pub trait BestLap {
  fn best_lap(&self) -> Option<f64>;
}

impl BestLap for DriverSeries {
  fn best_lap(&self) -> Option<f64> {
    self.best_lap_time()
  }
}

impl BestLap for GapSeries {
  fn best_lap(&self) -> Option<f64> {
    self.best_lap_time()
  }
}

impl BestLap for DriverAggregate {
  fn best_lap(&self) -> Option<f64> {
    self.best_lap_time()
  }
}


/// Returns the `n` entries with the fastest best lap, fastest first.
///
/// Entries without a best lap are left out. Equal best laps keep their input
/// order. If fewer than `n` entries qualify, all of them are returned.
pub fn top_n<T>(items: &[T], n: usize) -> Vec<T>
  where T: BestLap + Clone
{
  let mut ranked: Vec<(f64, &T)> =
    items.iter()
         .filter_map(|item| item.best_lap().map(|best| (best, item)))
         .collect();

  // sort_by is stable, so ties stay in input order
  ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));
  ranked.into_iter()
        .take(n)
        .map(|(_, item)| item.clone())
        .collect()
}
