// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{aggregate,
            build_series,
            gap_evolution,
            lap_trend,
            memo::{fingerprint, Memo},
            summarize,
            top_n,
            DriverAggregate,
            DriverSeries,
            Event,
            GapSeries,
            LapRecord,
            LapTrend,
            RaceResult,
            SeriesColors,
            Session,
            ViewPreferences,
            WeatherSummary};
use getset::Getters;
use serde::Serialize;
use std::{collections::{hash_map::DefaultHasher, HashMap},
          hash::{Hash, Hasher}};


/// What the user currently has selected in the dashboard. Empty lists select
/// everything. A driver's class is the one from the entry list, falling back
/// to the class of the result or session the record belongs to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
  pub drivers:    Vec<String>,
  pub sessions:   Vec<String>,
  pub class_name: Option<String>,
  pub top_n:      Option<usize>,
}

impl Selection {
  pub fn all() -> Self {
    Self::default()
  }

  pub fn with_drivers(mut self, drivers: &[&str]) -> Self {
    self.drivers = drivers.iter().map(|d| d.to_string()).collect();
    self
  }

  pub fn with_sessions(mut self, sessions: &[&str]) -> Self {
    self.sessions = sessions.iter().map(|s| s.to_string()).collect();
    self
  }

  pub fn with_class(mut self, class_name: &str) -> Self {
    self.class_name = Some(class_name.to_string());
    self
  }

  pub fn with_top_n(mut self, n: usize) -> Self {
    self.top_n = Some(n);
    self
  }

  fn wants_driver(&self, driver_id: &str) -> bool {
    self.drivers.is_empty() || self.drivers.iter().any(|d| d == driver_id)
  }

  fn wants_session(&self, session: &Session) -> bool {
    self.sessions.is_empty() || self.sessions.contains(&session.id)
  }
}


/// Gap to leader evolution within one session.
#[derive(Clone, Debug, PartialEq, Getters, Serialize)]
#[getset(get = "pub")]
pub struct SessionGaps {
  session_id:   String,
  session_name: String,
  gaps:         Vec<GapSeries>,
}

impl SessionGaps {
  pub fn len(&self) -> usize {
    self.gaps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.gaps.is_empty()
  }

  pub fn series(&self, driver_id: &str) -> Option<&GapSeries> {
    self.gaps.iter().find(|series| series.driver_id() == driver_id)
  }
}


/// Owns one loaded event and answers the dashboard's queries about it. Gap
/// evolution is remembered for the last input and only recomputed when the
/// selected laps change.
#[derive(Debug)]
pub struct Analyzer {
  event:  Event,
  roster: HashMap<String, String>,
  gaps:   Memo<Vec<SessionGaps>>,
}

impl Analyzer {
  pub fn new(event: Event) -> Self {
    let roster = event.roster();
    Self { event,
           roster,
           gaps: Memo::new() }
  }

  pub fn event(&self) -> &Event {
    &self.event
  }

  /// Class of a driver: the entry list wins, the session class is the
  /// fallback.
  fn class_of<'a>(&'a self, driver_id: &str, session: &'a Session) -> Option<&'a str> {
    self.event
        .driver(driver_id)
        .and_then(|driver| driver.class_name.as_deref())
        .or_else(|| session.class_name.as_deref())
  }

  fn in_class(&self, driver_id: &str, session: &Session, selection: &Selection) -> bool {
    match &selection.class_name {
      Some(class_name) => self.class_of(driver_id, session) == Some(class_name.as_str()),
      None => true,
    }
  }

  /// Class of a classified result: the entry list wins, then the class the
  /// result was published with, then the session class.
  fn result_class<'a>(&'a self,
                      result: &'a RaceResult,
                      session: &'a Session)
                      -> Option<&'a str> {
    self.event
        .driver(&result.driver_id)
        .and_then(|driver| driver.class_name.as_deref())
        .or_else(|| Some(result.class_name.as_str()).filter(|c| !c.is_empty()))
        .or_else(|| session.class_name.as_deref())
  }

  /// Valid laps within `selection`.
  pub fn laps(&self, selection: &Selection) -> Vec<LapRecord> {
    self.event
        .sessions()
        .iter()
        .filter(|session| selection.wants_session(session))
        .flat_map(|session| {
          session.laps()
                 .into_iter()
                 .filter(move |lap| {
                   selection.wants_driver(lap.driver_id())
                   && self.in_class(lap.driver_id(), session, selection)
                 })
        })
        .collect()
  }

  /// One series per selected driver, unranked.
  pub fn series(&self, selection: &Selection) -> Vec<DriverSeries> {
    build_series(&self.laps(selection), &self.roster)
  }

  /// Gap to leader evolution of every selected session with laps, in event
  /// order. Laps are only compared within their session. Each session is
  /// limited to its `top_n` fastest drivers if the selection asks for it.
  pub fn gaps(&mut self, selection: &Selection) -> Vec<SessionGaps> {
    let roster = &self.roster;
    let per_session: Vec<(&Session, Vec<DriverSeries>)> =
      self.event
          .sessions()
          .iter()
          .filter(|session| selection.wants_session(session))
          .map(|session| {
            let laps: Vec<LapRecord> =
              session.laps()
                     .into_iter()
                     .filter(|lap| {
                       selection.wants_driver(lap.driver_id())
                       && self.in_class(lap.driver_id(), session, selection)
                     })
                     .collect();
            (session, build_series(&laps, roster))
          })
          .filter(|(_, series)| !series.is_empty())
          .collect();

    let mut hasher = DefaultHasher::new();
    for (session, series) in &per_session {
      session.id.hash(&mut hasher);
      fingerprint(series).hash(&mut hasher);
    }

    let groups = self.gaps.get_or_compute(hasher.finish(), || {
                            per_session.iter()
                                       .map(|(session, series)| SessionGaps {
                                         session_id:   session.id.clone(),
                                         session_name: session.name.clone(),
                                         gaps:         gap_evolution(series),
                                       })
                                       .collect()
                          });

    match selection.top_n {
      Some(n) => groups.iter()
                       .map(|group| SessionGaps { gaps: top_n(&group.gaps, n),
                                                  ..group.clone() })
                       .collect(),
      None => groups.clone(),
    }
  }

  /// Results within `selection`.
  pub fn results(&self, selection: &Selection) -> Vec<RaceResult> {
    self.event
        .sessions()
        .iter()
        .filter(|session| selection.wants_session(session))
        .flat_map(|session| {
          session.results
                 .iter()
                 .filter(move |result| match &selection.class_name {
                   Some(class_name) => {
                     self.result_class(result, session) == Some(class_name.as_str())
                   }
                   None => true,
                 })
        })
        .filter(|result| selection.wants_driver(&result.driver_id))
        .cloned()
        .collect()
  }

  /// Per driver best and mean lap of the selection, ranked by best lap if
  /// `top_n` is set.
  pub fn aggregates(&self, selection: &Selection) -> Vec<DriverAggregate> {
    let aggregates = aggregate(&self.results(selection), None);
    match selection.top_n {
      Some(n) => top_n(&aggregates, n),
      None => aggregates,
    }
  }

  /// Every class found in the entry list, the sessions or their results.
  pub fn classes(&self) -> Vec<String> {
    let drivers = self.event
                      .drivers()
                      .iter()
                      .filter_map(|driver| driver.class_name.clone());
    let sessions = self.event
                       .sessions()
                       .iter()
                       .filter_map(|session| session.class_name.clone());
    let results = super::classes(&self.event.results()).into_iter();

    let mut classes: Vec<String> = Vec::new();
    for class_name in drivers.chain(sessions).chain(results) {
      if !class_name.is_empty() && !classes.contains(&class_name) {
        classes.push(class_name);
      }
    }
    classes
  }

  /// Lap trend of one driver over the selected sessions.
  pub fn trend(&self, driver_id: &str, selection: &Selection) -> LapTrend {
    let selection = Selection { drivers: vec![driver_id.to_string()],
                                ..selection.clone() };
    let sessions: Vec<Session> = self.event
                                     .sessions()
                                     .iter()
                                     .filter(|session| selection.wants_session(session))
                                     .cloned()
                                     .collect();
    lap_trend(&self.laps(&selection), &sessions)
  }

  pub fn weather(&self) -> WeatherSummary {
    summarize(self.event.weather())
  }

  /// Colors for the given series, honoring the user's overrides.
  pub fn colors<'a, I>(&self, series_ids: I, preferences: &ViewPreferences) -> SeriesColors
    where I: IntoIterator<Item = &'a str>
  {
    SeriesColors::assign(series_ids, &preferences.series_colors)
  }

  /// Number of gap computations answered from the memo.
  pub fn memo_hits(&self) -> usize {
    self.gaps.hits()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::path::Path;


  fn analyzer() -> Analyzer {
    Analyzer::new(Event::load(Path::new("./testdata/event.json")).unwrap())
  }

  fn ids<T>(items: &[T], id: fn(&T) -> &String) -> Vec<String> {
    items.iter().map(|item| id(item).clone()).collect()
  }

  #[test]
  fn laps_test() {
    let analyzer = analyzer();
    assert_eq!(11, analyzer.laps(&Selection::all()).len());
    assert_eq!(7,
               analyzer.laps(&Selection::all().with_sessions(&["R1"])).len());
    assert_eq!(3, analyzer.laps(&Selection::all().with_drivers(&["D3"])).len());
    assert_eq!(7, analyzer.laps(&Selection::all().with_class("GT3")).len());
    assert!(analyzer.laps(&Selection::all().with_class("LMP2")).is_empty());
  }

  fn race(analyzer: &mut Analyzer, selection: &Selection) -> SessionGaps {
    let mut groups = analyzer.gaps(selection);
    assert_eq!(1, groups.len());
    groups.remove(0)
  }

  #[test]
  fn gaps_test() {
    let mut analyzer = analyzer();
    let selection = Selection::all().with_sessions(&["R1"]);

    let r1 = race(&mut analyzer, &selection);
    assert_eq!("R1", r1.session_id());
    assert_eq!("Race 1", r1.session_name());
    let gaps = r1.gaps();
    assert_eq!(vec!["D1", "D2", "D3", "D4"], ids(gaps, GapSeries::driver_id));
    assert_eq!("Ada Falk", gaps[0].driver_name());
    assert_eq!(Some(0.0), gaps[0].gap_at(1));
    assert_eq!(Some(1.0), gaps[1].gap_at(1));
    assert_eq!(Some(0.5), gaps[1].gap_at(2));
    assert_eq!(Some(10.0), gaps[2].gap_at(2));
    assert_eq!(1, gaps[3].len());

    // same selection again is served from the memo
    assert_eq!(vec![r1.clone()], analyzer.gaps(&selection));
    assert_eq!(1, analyzer.memo_hits());

    let top = race(&mut analyzer, &selection.clone().with_top_n(2));
    assert_eq!(vec!["D2", "D1"], ids(top.gaps(), GapSeries::driver_id));
    assert_eq!(2, analyzer.memo_hits());
  }

  #[test]
  fn gaps_per_session_test() {
    let mut analyzer = analyzer();
    let groups = analyzer.gaps(&Selection::all());

    assert_eq!(vec!["Q1", "R1", "R2"], ids(&groups, SessionGaps::session_id));

    // D1 is fastest in R2, but R1 gaps are measured within R1 only
    let r1 = &groups[1];
    let d2 = r1.series("D2").unwrap();
    assert_eq!(Some(1.0), d2.gap_at(1));
    assert_eq!(Some(0.5), d2.gap_at(2));
    assert_eq!(183.0, r1.series("D1").unwrap().gaps()[1].elapsed());

    let r2 = &groups[2];
    assert_eq!(1, r2.len());
    assert_eq!(Some(0.0), r2.series("D1").unwrap().gap_at(1));
    assert_eq!(90.0, r2.series("D1").unwrap().gaps()[0].elapsed());

    let q1 = &groups[0];
    assert_eq!(Some(4.0), q1.series("D3").unwrap().gap_at(1));

    let fastest = analyzer.gaps(&Selection::all().with_top_n(1));
    assert_eq!(vec![vec!["D1".to_string()],
                    vec!["D2".to_string()],
                    vec!["D1".to_string()]],
               fastest.iter()
                      .map(|group| ids(group.gaps(), GapSeries::driver_id))
                      .collect::<Vec<_>>());

    // sessions without selected laps don't show up
    let d2_only = analyzer.gaps(&Selection::all().with_drivers(&["D2"]));
    assert_eq!(vec!["R1"], ids(&d2_only, SessionGaps::session_id));
  }

  #[test]
  fn gaps_by_class_test() {
    let mut analyzer = analyzer();
    let gt4 = race(&mut analyzer,
                   &Selection::all().with_sessions(&["R1"]).with_class("GT4"));
    let gaps = gt4.gaps();
    assert_eq!(vec!["D3", "D4"], ids(gaps, GapSeries::driver_id));
    assert_eq!(Some(0.0), gaps[0].gap_at(1));
    assert_eq!(Some(1.0), gaps[1].gap_at(1));
  }

  #[test]
  fn aggregates_test() {
    let analyzer = analyzer();

    let all = analyzer.aggregates(&Selection::all());
    assert_eq!(4, all.len());
    assert_eq!(None, all[3].mean_lap_time());

    let gt3 = analyzer.aggregates(&Selection::all().with_class("GT3"));
    assert_eq!(vec!["D1", "D2"], ids(&gt3, DriverAggregate::driver_id));
    assert_eq!(Some(91.0), gt3[0].best_lap_time());
    assert_eq!(Some(91.5), gt3[0].mean_lap_time());

    let fastest = analyzer.aggregates(&Selection::all().with_top_n(1));
    assert_eq!(vec!["D2"], ids(&fastest, DriverAggregate::driver_id));

    let none = analyzer.aggregates(&Selection::all().with_sessions(&["Q1"]));
    assert!(none.is_empty());
  }

  #[test]
  fn aggregates_class_resolution_test() {
    let json = r#"{
      "name": "Club Race",
      "drivers": [{ "id": "D1", "name": "Ada Falk", "className": "GT3" },
                  { "id": "D2", "name": "Ben Ort" }],
      "sessions": [{
        "id": "R1",
        "className": "GT4",
        "laps": [{ "driverId": "D1", "lapNumber": 1, "lapTime": 91.0, "elapsed": 91.0 },
                 { "driverId": "D2", "lapNumber": 1, "lapTime": 95.0, "elapsed": 95.0 }],
        "results": [{ "raceId": "R1", "driverId": "D1", "className": "GT4",
                      "fastLapTime": 91.0, "avgLapTime": 91.0 },
                    { "raceId": "R1", "driverId": "D2", "className": "",
                      "fastLapTime": 95.0, "avgLapTime": 95.0 }]
      }]
    }"#;
    let mut analyzer = Analyzer::new(Event::from_json(json).unwrap());

    // the entry list beats the class published with the result
    let gt3 = Selection::all().with_class("GT3");
    assert_eq!(vec!["D1"],
               ids(analyzer.gaps(&gt3)[0].gaps(), GapSeries::driver_id));
    assert_eq!(vec!["D1"],
               ids(&analyzer.aggregates(&gt3), DriverAggregate::driver_id));

    // without entry list class both fall back to the session class
    let gt4 = Selection::all().with_class("GT4");
    assert_eq!(vec!["D2"],
               ids(analyzer.gaps(&gt4)[0].gaps(), GapSeries::driver_id));
    assert_eq!(vec!["D2"],
               ids(&analyzer.aggregates(&gt4), DriverAggregate::driver_id));
  }

  #[test]
  fn classes_test() {
    assert_eq!(vec!["GT3".to_string(), "GT4".to_string()], analyzer().classes());
  }

  #[test]
  fn trend_test() {
    let analyzer = analyzer();
    let trend = analyzer.trend("D1", &Selection::all());

    assert_eq!(5, trend.points().len());
    assert_eq!(3, trend.bands().len());
    assert_eq!(vec![Some("Q1".to_string()),
                    Some("R1".to_string()),
                    Some("R2".to_string())],
               trend.bands()
                    .iter()
                    .map(|band| band.session_id().clone())
                    .collect::<Vec<_>>());

    let race_only = analyzer.trend("D1", &Selection::all().with_sessions(&["R2"]));
    assert_eq!(2, race_only.points().len());
    assert_eq!(1, race_only.bands().len());
  }

  #[test]
  fn weather_test() {
    let summary = analyzer().weather();
    assert_eq!(3, summary.samples());
    assert_eq!(18.0, summary.air_temp().unwrap().min());
    assert_eq!(21.0, summary.air_temp().unwrap().max());
    assert!(summary.wet());
  }

  #[test]
  fn colors_test() {
    let analyzer = analyzer();
    let mut preferences = ViewPreferences::default();
    preferences.series_colors
               .insert("D2".to_string(), "#000000".to_string());

    let colors = analyzer.colors(vec!["D1", "D2"], &preferences);
    assert_eq!(Some(super::super::default_color(0)), colors.get("D1"));
    assert_eq!("#000000", colors.get("D2").unwrap().to_string());
  }
}
