// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

//! Race analysis for telemetry dashboards: gap to leader evolution, per driver
//! and per class lap aggregates, top N selection and lap trends banded by
//! session.
//!
//! Every computation is a pure function over the records of one event. The
//! `Analyzer` ties them to a loaded `Event` and a user `Selection`.

mod analysis;
mod event;
mod gap;
mod lap;
mod memo;
mod palette;
mod preferences;
mod ranking;
mod result;
mod series;
mod trend;
mod weather;

pub use analysis::{Analyzer, Selection, SessionGaps};
pub use event::{Driver, Event, Session};
pub use gap::{gap_evolution, GapPoint, GapSeries};
pub use lap::{normalize, LapRecord, RawLap};
pub use memo::{fingerprint, Memo};
pub use palette::{default_color, palette, Color, SeriesColors};
pub use preferences::{ChartType,
                      FileStore,
                      MemoryStore,
                      PreferenceStore,
                      ViewPreferences};
pub use ranking::{top_n, BestLap};
pub use result::{aggregate, classes, DriverAggregate, RaceResult};
pub use series::{build_series, DriverSeries};
pub use trend::{lap_trend, LapTrend, SessionBand, TrendPoint};
pub use weather::{summarize, Range, WeatherSample, WeatherSummary};
