// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>

use super::DriverSeries;
use std::{collections::hash_map::DefaultHasher,
          hash::{Hash, Hasher}};
use tracing::debug;


/// Content fingerprint of a set of driver series. Equal input gives an equal
/// fingerprint; times are hashed by their bit pattern.
pub fn fingerprint(series: &[DriverSeries]) -> u64 {
  let mut hasher = DefaultHasher::new();
  series.len().hash(&mut hasher);
  for s in series {
    s.driver_id().hash(&mut hasher);
    s.driver_name().hash(&mut hasher);
    s.len().hash(&mut hasher);
    for lap in s.laps() {
      lap.session_id().hash(&mut hasher);
      lap.lap_number().hash(&mut hasher);
      lap.lap_time().to_bits().hash(&mut hasher);
      lap.elapsed().to_bits().hash(&mut hasher);
      lap.position().hash(&mut hasher);
    }
  }
  hasher.finish()
}


/// Remembers the last computed value together with the fingerprint of the
/// input it was computed from.
#[derive(Clone, Debug)]
pub struct Memo<V> {
  cached: Option<(u64, V)>,
  hits:   usize,
  misses: usize,
}

impl<V> Default for Memo<V> {
  fn default() -> Self {
    Self { cached: None,
           hits:   0,
           misses: 0 }
  }
}

impl<V> Memo<V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the cached value if it was computed for `key`, otherwise runs
  /// `compute` and caches its result.
  pub fn get_or_compute<F>(&mut self, key: u64, compute: F) -> &V
    where F: FnOnce() -> V
  {
    match &self.cached {
      Some((cached_key, _)) if *cached_key == key => {
        self.hits += 1;
        debug!(key, "memo hit");
      }
      _ => {
        self.misses += 1;
        self.cached = None;
      }
    }

    let (_, value) = self.cached.get_or_insert_with(|| (key, compute()));
    value
  }

  pub fn invalidate(&mut self) {
    self.cached = None;
  }

  pub fn hits(&self) -> usize {
    self.hits
  }

  pub fn misses(&self) -> usize {
    self.misses
  }
}


#[cfg(test)]
mod tests {
  use super::{super::LapRecord, *};
  use pretty_assertions::assert_eq;


  fn series(elapsed: f64) -> Vec<DriverSeries> {
    vec![DriverSeries::new("D1",
                           "Ada Falk",
                           vec![LapRecord::new("D1", 1, elapsed, elapsed, None)])]
  }

  #[test]
  fn fingerprint_test() {
    assert_eq!(fingerprint(&series(60.0)), fingerprint(&series(60.0)));
    assert!(fingerprint(&series(60.0)) != fingerprint(&series(60.5)));
    assert!(fingerprint(&[]) != fingerprint(&series(60.0)));
  }

  #[test]
  fn memo_test() {
    let mut memo = Memo::new();

    assert_eq!(&1, memo.get_or_compute(7, || 1));
    assert_eq!(&1, memo.get_or_compute(7, || 2));
    assert_eq!((1, 1), (memo.hits(), memo.misses()));

    assert_eq!(&3, memo.get_or_compute(8, || 3));
    assert_eq!(2, memo.misses());

    memo.invalidate();
    assert_eq!(&4, memo.get_or_compute(8, || 4));
    assert_eq!(3, memo.misses());
  }

  #[test]
  fn memo_compute_once_test() {
    let mut memo = Memo::new();
    let mut calls = 0;

    for key in &[1, 1, 2, 2, 2, 1] {
      memo.get_or_compute(*key, || {
            calls += 1;
            key * 10
          });
    }
    assert_eq!(3, calls);
    assert_eq!((3, 3), (memo.hits(), memo.misses()));
    assert_eq!(&10, memo.get_or_compute(1, || 0));
  }
}
