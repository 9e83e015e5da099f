use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Total every canary weight pair must add up to.
pub const WEIGHT_TOTAL: i32 = 100;

/// Traffic split between the `new` and `old` backends.
///
/// Only constructible through [`Weights::new`], so a value of this type always
/// holds two weights in `0..=100` that sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights", into = "RawWeights")]
pub struct Weights {
    new: u8,
    old: u8,
}

#[derive(Serialize, Deserialize)]
struct RawWeights {
    new: i32,
    old: i32,
}

impl Weights {
    pub fn new(new: i32, old: i32) -> ModelResult<Self> {
        let in_range = (0..=WEIGHT_TOTAL).contains(&new) && (0..=WEIGHT_TOTAL).contains(&old);
        if !in_range || new + old != WEIGHT_TOTAL {
            return Err(ModelError::InvalidWeightSum { new, old });
        }
        Ok(Self {
            new: new as u8,
            old: old as u8,
        })
    }

    #[inline]
    pub fn new_weight(&self) -> u8 {
        self.new
    }

    #[inline]
    pub fn old_weight(&self) -> u8 {
        self.old
    }

    /// Move `step` points from `old` to `new` (negative moves them back).
    pub fn shifted(&self, step: i32) -> ModelResult<Self> {
        Self::new(self.new as i32 + step, self.old as i32 - step)
    }
}

impl TryFrom<RawWeights> for Weights {
    type Error = ModelError;
    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Self::new(raw.new, raw.old)
    }
}

impl From<Weights> for RawWeights {
    fn from(w: Weights) -> Self {
        Self {
            new: w.new as i32,
            old: w.old as i32,
        }
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new={} old={}", self.new, self.old)
    }
}
