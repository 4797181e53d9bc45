// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::DriverSeries;
use getset::{CopyGetters, Getters};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;


/// Gap of one driver to the leader at the end of one lap.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters, Serialize)]
#[getset(get_copy = "pub")]
pub struct GapPoint {
  lap_number:    u32,
  elapsed:       f64,
  gap_to_leader: f64,
}

impl GapPoint {
  pub fn new(lap_number: u32, elapsed: f64, gap_to_leader: f64) -> Self {
    Self { lap_number,
           elapsed,
           gap_to_leader }
  }
}


/// Gap evolution of one driver over the laps they completed.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters, Serialize)]
pub struct GapSeries {
  #[getset(get = "pub")]
  driver_id:     String,
  #[getset(get = "pub")]
  driver_name:   String,
  #[getset(get_copy = "pub")]
  best_lap_time: Option<f64>,
  #[getset(get = "pub")]
  gaps:          Vec<GapPoint>,
}

impl GapSeries {
  pub fn len(&self) -> usize {
    self.gaps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.gaps.is_empty()
  }

  pub fn gap_at(&self, lap_number: u32) -> Option<f64> {
    self.gaps
        .iter()
        .find(|point| point.lap_number == lap_number)
        .map(|point| point.gap_to_leader)
  }
}


/// Computes every driver's gap to the race leader on every lap.
///
/// The leader on lap `L` is the series with the smallest elapsed time among
/// those which recorded lap `L`; on equal times the series earlier in `series`
/// leads. A series without lap `L` gets no point for it. If a series recorded
/// the same lap number more than once, the last record counts.
pub fn gap_evolution(series: &[DriverSeries]) -> Vec<GapSeries> {
  // lap number -> elapsed, one map per series
  let elapsed: Vec<BTreeMap<u32, f64>> =
    series.iter()
          .map(|s| {
            s.laps()
             .iter()
             .map(|lap| (lap.lap_number(), lap.elapsed()))
             .collect()
          })
          .collect();

  let lap_numbers: BTreeSet<u32> =
    elapsed.iter().flat_map(|laps| laps.keys().copied()).collect();

  let mut leaders: BTreeMap<u32, f64> = BTreeMap::new();
  for &lap_number in &lap_numbers {
    let mut leader: Option<f64> = None;
    for laps in &elapsed {
      if let Some(&time) = laps.get(&lap_number) {
        match leader {
          Some(best) if best <= time => {}
          _ => leader = Some(time),
        }
      }
    }
    if let Some(time) = leader {
      leaders.insert(lap_number, time);
    }
  }

  series.iter()
        .zip(&elapsed)
        .map(|(s, laps)| {
          let gaps = laps.iter()
                         .filter_map(|(&lap_number, &time)| {
                           let leader = *leaders.get(&lap_number)?;
                           let gap = clamp_gap(s, lap_number, time - leader);
                           Some(GapPoint::new(lap_number, time, gap))
                         })
                         .collect();

          GapSeries { driver_id: s.driver_id().clone(),
                      driver_name: s.driver_name().clone(),
                      best_lap_time: s.best_lap_time(),
                      gaps }
        })
        .collect()
}

fn clamp_gap(series: &DriverSeries, lap_number: u32, gap: f64) -> f64 {
  if gap < 0.0 {
    warn!(driver = %series.driver_id(),
          lap = lap_number,
          gap,
          "negative gap to leader, clamping to zero");
    return 0.0;
  }
  gap
}


#[cfg(test)]
mod tests {
  use super::{super::LapRecord, *};
  use pretty_assertions::assert_eq;


  fn series(id: &str, laps: &[(u32, f64)]) -> DriverSeries {
    let mut previous = 0.0;
    let laps = laps.iter()
                   .map(|&(number, elapsed)| {
                     let lap = LapRecord::new(id, number, elapsed - previous, elapsed, None);
                     previous = elapsed;
                     lap
                   })
                   .collect();
    DriverSeries::new(id, id, laps)
  }

  #[test]
  fn three_driver_gap_test() {
    let input = vec![series("D1", &[(1, 10.0)]),
                     series("D2", &[(1, 10.5)]),
                     series("D3", &[(1, 11.0)])];

    let gaps = gap_evolution(&input);
    assert_eq!(3, gaps.len());
    assert_eq!(Some(0.0), gaps[0].gap_at(1));
    assert_eq!(Some(0.5), gaps[1].gap_at(1));
    assert_eq!(Some(1.0), gaps[2].gap_at(1));
  }

  #[test]
  fn leader_changes_test() {
    let input = vec![series("D1", &[(1, 60.0), (2, 125.0), (3, 190.0)]),
                     series("D2", &[(1, 61.0), (2, 122.0), (3, 183.0)])];

    let gaps = gap_evolution(&input);
    assert_eq!(vec![0.0, 3.0, 7.0],
               gaps[0].gaps()
                      .iter()
                      .map(|p| p.gap_to_leader())
                      .collect::<Vec<_>>());
    assert_eq!(vec![1.0, 0.0, 0.0],
               gaps[1].gaps()
                      .iter()
                      .map(|p| p.gap_to_leader())
                      .collect::<Vec<_>>());
    assert_eq!(125.0, gaps[0].gaps()[1].elapsed());
  }

  #[test]
  fn missing_laps_test() {
    // D2 retired after lap 1, D3 is missing lap 2 in the timing data
    let input = vec![series("D1", &[(1, 60.0), (2, 120.0), (3, 180.0)]),
                     series("D2", &[(1, 59.0)]),
                     series("D3", &[(1, 62.0), (3, 185.0)])];

    let gaps = gap_evolution(&input);
    assert_eq!(3, gaps[0].len());
    assert_eq!(Some(1.0), gaps[0].gap_at(1));
    assert_eq!(Some(0.0), gaps[0].gap_at(2));

    assert_eq!(1, gaps[1].len());
    assert_eq!(Some(0.0), gaps[1].gap_at(1));

    assert_eq!(2, gaps[2].len());
    assert_eq!(None, gaps[2].gap_at(2));
    assert_eq!(Some(5.0), gaps[2].gap_at(3));
  }

  #[test]
  fn single_driver_test() {
    let input = vec![series("D1", &[(1, 60.0), (2, 121.0), (3, 181.5)])];

    let gaps = gap_evolution(&input);
    assert_eq!(1, gaps.len());
    assert_eq!(3, gaps[0].len());
    assert!(gaps[0].gaps().iter().all(|p| p.gap_to_leader() == 0.0));
  }

  #[test]
  fn empty_input_test() {
    assert!(gap_evolution(&[]).is_empty());
  }

  #[test]
  fn tied_leader_test() {
    let input = vec![series("D1", &[(1, 60.0)]), series("D2", &[(1, 60.0)])];

    let gaps = gap_evolution(&input);
    assert_eq!(Some(0.0), gaps[0].gap_at(1));
    assert_eq!(Some(0.0), gaps[1].gap_at(1));
  }

  #[test]
  fn gap_properties_test() {
    let input = vec![series("D1", &[(1, 60.2), (2, 121.9), (3, 183.3), (4, 244.0)]),
                     series("D2", &[(1, 60.9), (2, 121.1), (3, 182.7)]),
                     series("D3", &[(1, 61.4), (2, 122.8), (3, 184.1), (4, 245.7)]),
                     series("D4", &[(2, 130.0), (4, 250.0)])];

    let gaps = gap_evolution(&input);
    for s in &gaps {
      for point in s.gaps() {
        assert!(point.gap_to_leader() >= 0.0);
      }
    }

    // exactly one leader with zero gap on each lap where times differ
    for lap in 1..=4 {
      let leaders = gaps.iter()
                        .filter(|s| s.gap_at(lap) == Some(0.0))
                        .count();
      assert_eq!(1, leaders);
    }

    // pure function, same input gives the same output
    assert_eq!(gaps, gap_evolution(&input));
  }

  #[test]
  fn best_lap_carried_test() {
    let input = vec![series("D1", &[(1, 60.0), (2, 118.0)])];
    assert_eq!(Some(58.0), gap_evolution(&input)[0].best_lap_time());
  }

  #[test]
  fn clamp_gap_test() {
    let s = series("D1", &[(1, 60.0)]);
    assert_eq!(0.0, clamp_gap(&s, 1, -0.25));
    assert_eq!(0.25, clamp_gap(&s, 1, 0.25));
  }
}
