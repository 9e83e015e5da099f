//! Pure transforms over a load balancer config body.
//!
//! Nothing here talks to the network; the controller fetches a body, applies
//! one of these and stores the result.
use canary_model::Weights;

use crate::config::{COMMENT_MARKER, ConfigText, Tag, WeightedServerLine};
use crate::error::{CanaryError, CanaryResult};

/// The single `new` and single `old` weighted line of a body.
#[derive(Debug, Clone)]
struct WeightedPair {
    new: WeightedServerLine,
    old: WeightedServerLine,
}

impl WeightedPair {
    fn locate(text: &ConfigText) -> CanaryResult<Self> {
        let lines = text.weighted_lines();
        let count = |tag| lines.iter().filter(|l| l.tag() == tag).count();

        for tag in [Tag::New, Tag::Old] {
            if count(tag) > 1 {
                return Err(CanaryError::DuplicateTag { tag });
            }
        }

        let pick = |tag| lines.iter().find(|l| l.tag() == tag).cloned();
        match (pick(Tag::New), pick(Tag::Old)) {
            (Some(new), Some(old)) => Ok(Self { new, old }),
            _ => Err(CanaryError::MissingWeightedLines { found: lines.len() }),
        }
    }
}

/// Weights currently written on the `new` and `old` lines.
///
/// The pair is returned as found, it is not checked to sum to 100.
pub fn current_weights(body: &str) -> CanaryResult<(u32, u32)> {
    if body.is_empty() {
        return Err(CanaryError::EmptyConfig);
    }
    let pair = WeightedPair::locate(&ConfigText::parse(body))?;
    Ok((pair.new.weight(), pair.old.weight()))
}

/// Rewrite the weight numbers on the `new` and `old` server lines.
///
/// Weights are validated before the body is looked at; every other byte of the
/// body is preserved.
pub fn reweight(body: &str, new: i32, old: i32) -> CanaryResult<String> {
    let weights = Weights::new(new, old).map_err(|_| CanaryError::InvalidWeightSum { new, old })?;
    reweight_to(body, weights)
}

/// Like [`reweight`] with already validated weights.
pub fn reweight_to(body: &str, weights: Weights) -> CanaryResult<String> {
    if body.is_empty() {
        return Err(CanaryError::EmptyConfig);
    }
    let mut text = ConfigText::parse(body);
    let pair = WeightedPair::locate(&text)?;

    text.splice(pair.new.index(), pair.new.weight_span(), &weights.new_weight().to_string());
    text.splice(pair.old.index(), pair.old.weight_span(), &weights.old_weight().to_string());
    Ok(text.body())
}

/// Comment out every content line not already commented.
pub fn disable(body: &str) -> CanaryResult<String> {
    if body.is_empty() {
        return Err(CanaryError::EmptyConfig);
    }
    let mut text = ConfigText::parse(body);
    text.comment_all();
    Ok(text.body())
}

/// Strip every comment marker from the body.
///
/// This also removes markers that were in the body before it was disabled,
/// so `enable(disable(x))` is only `x` when `x` had no markers.
pub fn enable(body: &str) -> CanaryResult<String> {
    if body.is_empty() {
        return Err(CanaryError::EmptyConfig);
    }
    Ok(body.replace(COMMENT_MARKER, ""))
}
