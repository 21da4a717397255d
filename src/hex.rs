//! Axial hex coordinates and the `"qqq.rrr"` location token.

use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WastelandError};

const TOKEN_DIGITS: usize = 3;

/// Axial hex coordinate. The implicit cube coordinate is `s = -q - r`.
///
/// Serializes as its location token so that maps keyed by `Axial` persist
/// with the same strings players and tooling see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub const ORIGIN: Axial = Axial { q: 0, r: 0 };

    /// Clockwise, starting east.
    pub const DIRECTIONS: [Axial; 6] = [
        Axial { q: 1, r: 0 },
        Axial { q: 0, r: 1 },
        Axial { q: -1, r: 1 },
        Axial { q: -1, r: 0 },
        Axial { q: 0, r: -1 },
        Axial { q: 1, r: -1 },
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    pub fn distance(self, other: Axial) -> i32 {
        axial_distance(self, other)
    }

    pub fn neighbors(self) -> [Axial; 6] {
        Self::DIRECTIONS.map(|d| self + d)
    }

    pub fn encode(self) -> String {
        encode(self.q, self.r)
    }

    /// Planar position of the hex centre (pointy-top layout, unit size).
    pub fn to_planar(self) -> (f64, f64) {
        let x = self.q as f64 + self.r as f64 * 0.5;
        let y = self.r as f64 * (3f64.sqrt() / 2.0);
        (x, y)
    }
}

impl Add for Axial {
    type Output = Axial;

    fn add(self, other: Axial) -> Axial {
        Axial::new(self.q + other.q, self.r + other.r)
    }
}

impl Mul<i32> for Axial {
    type Output = Axial;

    fn mul(self, rhs: i32) -> Axial {
        Axial::new(self.q * rhs, self.r * rhs)
    }
}

impl fmt::Display for Axial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Axial {
    type Err = WastelandError;

    fn from_str(token: &str) -> Result<Self> {
        decode(token)
    }
}

impl TryFrom<String> for Axial {
    type Error = WastelandError;

    fn try_from(token: String) -> Result<Self> {
        decode(&token)
    }
}

impl From<Axial> for String {
    fn from(value: Axial) -> Self {
        value.encode()
    }
}

fn encode_component(value: i32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{:0width$}", value.unsigned_abs(), width = TOKEN_DIGITS)
}

/// Encode a coordinate as its location token, e.g. `(3, -12)` -> `"003.-012"`.
pub fn encode(q: i32, r: i32) -> String {
    format!("{}.{}", encode_component(q), encode_component(r))
}

/// Decode a location token. Only canonical tokens (as produced by [`encode`])
/// are accepted, so every location has exactly one spelling.
pub fn decode(token: &str) -> Result<Axial> {
    let invalid = || WastelandError::InvalidCoordinate(token.to_string());
    let (q, r) = token.split_once('.').ok_or_else(invalid)?;
    let q = parse_component(q).ok_or_else(invalid)?;
    let r = parse_component(r).ok_or_else(invalid)?;
    if encode(q, r) != token {
        return Err(invalid());
    }
    Ok(Axial::new(q, r))
}

fn parse_component(part: &str) -> Option<i32> {
    let digits = part.strip_prefix('-').unwrap_or(part);
    if digits.len() < TOKEN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<i32>().ok()
}

pub fn axial_distance(a: Axial, b: Axial) -> i32 {
    let dq = a.q - b.q;
    let dr = a.r - b.r;
    (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
}

/// Every coordinate within `range` of `center`, in ascending `(q, r)` order.
pub fn hexes_in_range(center: Axial, range: i32) -> Vec<Axial> {
    let range = range.max(0);
    let mut hexes = Vec::with_capacity((1 + 3 * range * (range + 1)) as usize);
    for dq in -range..=range {
        let dr_min = (-range).max(-dq - range);
        let dr_max = range.min(-dq + range);
        for dr in dr_min..=dr_max {
            hexes.push(Axial::new(center.q + dq, center.r + dr));
        }
    }
    hexes
}
