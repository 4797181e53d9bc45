// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Jonas Reitemeyer <alumni@bmc-labs.com>
//   Florian Eich <florian@bmc-labs.com>

use super::{LapRecord, Session};
use getset::{CopyGetters, Getters};
use serde::Serialize;


/// One lap placed on the x axis of a lap trend chart.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters, Serialize)]
pub struct TrendPoint {
  #[getset(get_copy = "pub")]
  index:      usize,
  #[getset(get = "pub")]
  session_id: Option<String>,
  #[getset(get_copy = "pub")]
  lap_number: u32,
  #[getset(get_copy = "pub")]
  lap_time:   f64,
}


/// Range of trend points (inclusive) which belong to one session.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters, Serialize)]
pub struct SessionBand {
  #[getset(get = "pub")]
  session_id:   Option<String>,
  #[getset(get = "pub")]
  session_name: Option<String>,
  #[getset(get_copy = "pub")]
  first:        usize,
  #[getset(get_copy = "pub")]
  last:         usize,
}

impl SessionBand {
  pub fn len(&self) -> usize {
    self.last - self.first + 1
  }
}


#[derive(Clone, Debug, Default, PartialEq, Getters, Serialize)]
#[getset(get = "pub")]
pub struct LapTrend {
  points: Vec<TrendPoint>,
  bands:  Vec<SessionBand>,
}

impl LapTrend {
  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  fn push_band(&mut self,
               session_id: Option<String>,
               session_name: Option<String>,
               laps: Vec<&LapRecord>) {
    if laps.is_empty() {
      return;
    }

    let first = self.points.len();
    for lap in laps {
      self.points.push(TrendPoint { index:      self.points.len(),
                                    session_id: lap.session_id().clone(),
                                    lap_number: lap.lap_number(),
                                    lap_time:   lap.lap_time() });
    }
    self.bands.push(SessionBand { session_id,
                                  session_name,
                                  first,
                                  last: self.points.len() - 1 });
  }
}


/// Lays the laps of one driver out session after session.
///
/// Sessions are ordered by start time; sessions without one follow the dated
/// ones in input order. Within a session laps are ordered by lap number. Every
/// session which contributed a lap gets a band. Laps of sessions not in
/// `sessions` end up in a trailing band without session.
pub fn lap_trend(laps: &[LapRecord], sessions: &[Session]) -> LapTrend {
  let mut order: Vec<&Session> = sessions.iter().collect();
  order.sort_by_key(|session| (session.started_at.is_none(), session.started_at));

  let mut trend = LapTrend::default();
  for session in order {
    let mut in_session: Vec<&LapRecord> =
      laps.iter()
          .filter(|lap| lap.session_id().as_deref() == Some(session.id.as_str()))
          .collect();
    in_session.sort_by_key(|lap| lap.lap_number());

    trend.push_band(Some(session.id.clone()),
                    Some(session.name.clone()),
                    in_session);
  }

  let mut orphans: Vec<&LapRecord> =
    laps.iter()
        .filter(|lap| {
          match lap.session_id() {
            Some(id) => !sessions.iter().any(|session| &session.id == id),
            None => true,
          }
        })
        .collect();
  orphans.sort_by_key(|lap| lap.lap_number());
  trend.push_band(None, None, orphans);

  trend
}
