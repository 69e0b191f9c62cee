/// Triangle sides, side states and the orientation rotation tables.
///
/// A side name doubles as a facing: a character "faces" one side of the
/// triangle it stands in. Properties are queried via methods, so the
/// rotation and adjacency rules live in one place.
///
/// Rotation cycles (clockwise):
///   pointing up:   Left → Right → Third → Left
///   pointing down: Left → Third → Right → Left
/// Counter-clockwise is the exact inverse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SideParseError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    /// Base edge: bottom when pointing up, top when pointing down.
    Third,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Left, Side::Right, Side::Third];

    /// Slot in per-triangle arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
            Side::Third => 2,
        }
    }

    /// The neighbor's name for the same edge: slanted sides swap, the base
    /// stays the base.
    pub fn corresponding(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Third => Side::Third,
        }
    }

    pub fn clockwise(self, points_up: bool) -> Side {
        match (points_up, self) {
            (true, Side::Left) => Side::Right,
            (true, Side::Right) => Side::Third,
            (true, Side::Third) => Side::Left,
            (false, Side::Left) => Side::Third,
            (false, Side::Third) => Side::Right,
            (false, Side::Right) => Side::Left,
        }
    }

    pub fn counter_clockwise(self, points_up: bool) -> Side {
        match (points_up, self) {
            (true, Side::Right) => Side::Left,
            (true, Side::Third) => Side::Right,
            (true, Side::Left) => Side::Third,
            (false, Side::Third) => Side::Left,
            (false, Side::Right) => Side::Third,
            (false, Side::Left) => Side::Right,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Third => "third",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Side {
    type Err = SideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            "third" => Ok(Side::Third),
            other => Err(SideParseError::UnknownSide(other.to_string())),
        }
    }
}

/// State of one edge. Both triangles sharing an edge always agree on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideState {
    #[default]
    Empty,
    Mirror,
}

impl SideState {
    /// Can a character pass through a side in this state?
    pub fn is_passable(self) -> bool {
        matches!(self, SideState::Empty)
    }

    /// Map-format character (`e` / `m`).
    pub fn to_char(self) -> char {
        match self {
            SideState::Empty => 'e',
            SideState::Mirror => 'm',
        }
    }

    pub fn from_token(token: &str) -> Result<SideState, SideParseError> {
        match token {
            "e" => Ok(SideState::Empty),
            "m" => Ok(SideState::Mirror),
            other => Err(SideParseError::UnknownState(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_three_times_is_identity() {
        for points_up in [true, false] {
            for side in Side::ALL {
                let turned = side
                    .clockwise(points_up)
                    .clockwise(points_up)
                    .clockwise(points_up);
                assert_eq!(turned, side);
            }
        }
    }

    #[test]
    fn counter_clockwise_three_times_is_identity() {
        for points_up in [true, false] {
            for side in Side::ALL {
                let turned = side
                    .counter_clockwise(points_up)
                    .counter_clockwise(points_up)
                    .counter_clockwise(points_up);
                assert_eq!(turned, side);
            }
        }
    }

    #[test]
    fn counter_clockwise_inverts_clockwise() {
        for points_up in [true, false] {
            for side in Side::ALL {
                assert_eq!(side.clockwise(points_up).counter_clockwise(points_up), side);
            }
        }
    }

    #[test]
    fn up_and_down_cycles_differ() {
        assert_eq!(Side::Left.clockwise(true), Side::Right);
        assert_eq!(Side::Left.clockwise(false), Side::Third);
        assert_eq!(Side::Right.clockwise(true), Side::Third);
        assert_eq!(Side::Right.clockwise(false), Side::Left);
    }

    #[test]
    fn corresponding_swaps_slants_only() {
        assert_eq!(Side::Left.corresponding(), Side::Right);
        assert_eq!(Side::Right.corresponding(), Side::Left);
        assert_eq!(Side::Third.corresponding(), Side::Third);
    }

    #[test]
    fn unknown_side_name_is_an_error() {
        assert_eq!("third".parse::<Side>(), Ok(Side::Third));
        assert!(matches!("up".parse::<Side>(), Err(SideParseError::UnknownSide(s)) if s == "up"));
        assert!("Left".parse::<Side>().is_err());
    }

    #[test]
    fn side_state_tokens() {
        assert_eq!(SideState::from_token("e"), Ok(SideState::Empty));
        assert_eq!(SideState::from_token("m"), Ok(SideState::Mirror));
        assert!(SideState::from_token("x").is_err());
        assert_eq!(SideState::Mirror.to_char(), 'm');
        assert!(SideState::Empty.is_passable());
        assert!(!SideState::Mirror.is_passable());
    }
}
