// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use eyre::{ensure, Report, Result, WrapErr};
use getset::CopyGetters;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom, fmt, str::FromStr};
use tracing::warn;


const DEFAULT_HEX: [&str; 10] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728",
                                 "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
                                 "#bcbd22", "#17becf"];

lazy_static! {
  static ref PALETTE: Vec<Color> =
    DEFAULT_HEX.iter()
               .map(|hex| hex.parse().expect("invalid default palette color"))
               .collect();
}


/// An sRGB color, written as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, CopyGetters, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
#[getset(get_copy = "pub")]
pub struct Color {
  r: u8,
  g: u8,
  b: u8,
}

impl Color {
  pub fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b }
  }
}

impl FromStr for Color {
  type Err = Report;

  /// Accepts `#rrggbb` and the short form `#rgb`, the `#` being optional.
  fn from_str(s: &str) -> Result<Self> {
    let hex = s.trim().trim_start_matches('#');
    ensure!(hex.chars().all(|c| c.is_ascii_hexdigit())
            && (hex.len() == 6 || hex.len() == 3),
            "invalid color '{}'",
            s);

    let channel = |digits: &str| -> Result<u8> {
      let value = u8::from_str_radix(digits, 16).wrap_err_with(|| {
                                                    format!("invalid color '{}'", s)
                                                  })?;
      Ok(if digits.len() == 1 { value * 17 } else { value })
    };

    if hex.len() == 3 {
      Ok(Self::rgb(channel(&hex[0..1])?,
                   channel(&hex[1..2])?,
                   channel(&hex[2..3])?))
    } else {
      Ok(Self::rgb(channel(&hex[0..2])?,
                   channel(&hex[2..4])?,
                   channel(&hex[4..6])?))
    }
  }
}

impl TryFrom<String> for Color {
  type Error = Report;

  fn try_from(s: String) -> Result<Self> {
    s.parse()
  }
}

impl From<Color> for String {
  fn from(color: Color) -> Self {
    color.to_string()
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
  }
}


/// The default categorical palette for chart series.
pub fn palette() -> &'static [Color] {
  &PALETTE
}

/// Palette color of the series at `index`, wrapping around.
pub fn default_color(index: usize) -> Color {
  PALETTE[index % PALETTE.len()]
}


/// Display colors for a set of chart series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesColors {
  colors: Vec<(String, Color)>,
}

impl SeriesColors {
  /// Assigns a color to every id in `ids`. A valid entry in `overrides`
  /// (series id to hex color) wins, otherwise the series gets the palette
  /// color of its position.
  pub fn assign<'a, I>(ids: I, overrides: &BTreeMap<String, String>) -> Self
    where I: IntoIterator<Item = &'a str>
  {
    let colors =
      ids.into_iter()
         .enumerate()
         .map(|(index, id)| {
           let color = match overrides.get(id).map(|hex| hex.parse::<Color>()) {
             Some(Ok(color)) => color,
             Some(Err(err)) => {
               warn!(series = id, %err, "ignoring color override");
               default_color(index)
             }
             None => default_color(index),
           };
           (id.to_string(), color)
         })
         .collect();

    Self { colors }
  }

  pub fn get(&self, id: &str) -> Option<Color> {
    self.colors
        .iter()
        .find(|(series, _)| series == id)
        .map(|(_, color)| *color)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
    self.colors.iter().map(|(id, color)| (id.as_str(), *color))
  }

  pub fn len(&self) -> usize {
    self.colors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.colors.is_empty()
  }
}
