use std::fmt::{self, Write as _};
use std::thread;

use tracing::debug;

use crate::{Dice, EngineConfig, EntropySource, RollError, RollRequest};

/// Outcome of one request. `breakdown` holds the individual draws in the
/// order they are printed, and `total` is computed from those same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollResult {
    pub total: i64,
    pub roll_count: u64,
    pub constant_addition: i64,
    pub breakdown: Option<Vec<u32>>,
}

impl RollResult {
    /// `r1 + r2 + ... + rN [+ N × C] = `, ready to be followed by the total.
    pub fn expression(&self) -> Option<String> {
        let rolls = self.breakdown.as_ref()?;
        let mut expr = String::new();
        for (i, roll) in rolls.iter().enumerate() {
            if i > 0 {
                expr.push_str(" + ");
            }
            // Writing into a String cannot fail.
            let _ = write!(expr, "{roll}");
        }
        if self.constant_addition != 0 {
            let _ = write!(expr, " + {} × {}", self.roll_count, self.constant_addition);
        }
        expr.push_str(" = ");
        Some(expr)
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.total)
    }
}

/// Allocate the whole breakdown before any draw happens.
fn reserve_breakdown(roll_count: u64) -> Result<Vec<u32>, RollError> {
    let too_large = || RollError::BreakdownTooLarge { roll_count };
    let len = usize::try_from(roll_count).map_err(|_| too_large())?;
    let mut rolls = Vec::new();
    rolls.try_reserve_exact(len).map_err(|_| too_large())?;
    rolls.resize(len, 0);
    Ok(rolls)
}

/// Draw `count` values, storing them in `slots` when a breakdown is kept.
fn draw_into(mut dice: Dice, count: u64, sides: u32, slots: Option<&mut [u32]>) -> u128 {
    match slots {
        Some(slots) => slots
            .iter_mut()
            .map(|slot| {
                *slot = dice.roll(sides);
                u128::from(*slot)
            })
            .sum(),
        None => (0..count).map(|_| u128::from(dice.roll(sides))).sum(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct RollEngine {
    config: EngineConfig,
}

impl RollEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Roll `request` using generators from `source`.
    ///
    /// Invalid requests are rejected, never clamped. Large requests are split
    /// across scoped worker threads, each owning the generator it was handed.
    pub fn roll<S>(&self, request: &RollRequest, source: &S) -> Result<RollResult, RollError>
    where
        S: EntropySource + ?Sized,
    {
        request.check()?;
        let roll_count = request.roll_count as u64;
        let sides = request.die_size as u32;
        let constant_addition = request.constant_addition;

        if request.is_single_draw() {
            let mut dice = source.generator(0)?;
            let value = dice.roll(sides);
            return Ok(RollResult {
                total: total_of(u128::from(value), roll_count, constant_addition)?,
                roll_count,
                constant_addition,
                breakdown: None,
            });
        }

        let mut breakdown = if request.detailed {
            Some(reserve_breakdown(roll_count)?)
        } else {
            None
        };
        let workers = self.config.worker_count(roll_count);
        let sum = if workers == 1 {
            draw_into(source.generator(0)?, roll_count, sides, breakdown.as_deref_mut())
        } else {
            fan_out(source, workers, roll_count, sides, breakdown.as_deref_mut())?
        };

        Ok(RollResult {
            total: total_of(sum, roll_count, constant_addition)?,
            roll_count,
            constant_addition,
            breakdown,
        })
    }
}

/// Each worker gets a contiguous share of the rolls and, when kept, the
/// matching disjoint slice of the breakdown.
fn fan_out<S>(
    source: &S,
    workers: usize,
    roll_count: u64,
    sides: u32,
    slots: Option<&mut [u32]>,
) -> Result<u128, RollError>
where
    S: EntropySource + ?Sized,
{
    // Seed every generator up front so an entropy failure aborts before any thread starts.
    let generators = (0..workers)
        .map(|w| source.generator(w))
        .collect::<Result<Vec<_>, _>>()?;
    let base = roll_count / workers as u64;
    let extra = roll_count % workers as u64;
    debug!(workers, roll_count, base, extra, "fanning out draws");

    let mut rest = slots;
    thread::scope(|s| {
        let handles: Vec<_> = generators
            .into_iter()
            .enumerate()
            .map(|(w, dice)| {
                let share = base + u64::from((w as u64) < extra);
                // `share` fits in usize: the breakdown it indexes was allocated.
                let mine = rest.take().map(|r| {
                    let (head, tail) = r.split_at_mut(share as usize);
                    rest = Some(tail);
                    head
                });
                s.spawn(move || draw_into(dice, share, sides, mine))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(w, h)| h.join().map_err(|_| RollError::WorkerPanicked(w)))
            .sum()
    })
}

fn total_of(sum: u128, roll_count: u64, constant_addition: i64) -> Result<i64, RollError> {
    let total = sum as i128 + i128::from(roll_count) * i128::from(constant_addition);
    i64::try_from(total).map_err(|_| RollError::Overflow { roll_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeededEntropy;

    fn result(rolls: Vec<u32>, constant_addition: i64) -> RollResult {
        let roll_count = rolls.len() as u64;
        let sum: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        RollResult {
            total: sum + roll_count as i64 * constant_addition,
            roll_count,
            constant_addition,
            breakdown: Some(rolls),
        }
    }

    #[test]
    fn expression_without_addition() {
        let r = result(vec![4, 1], 0);
        assert_eq!(r.expression().as_deref(), Some("4 + 1 = "));
        assert_eq!(r.to_string(), "5");
    }

    #[test]
    fn no_breakdown_no_expression() {
        let r = RollResult { total: 3, roll_count: 1, constant_addition: 0, breakdown: None };
        assert_eq!(r.expression(), None);
    }

    #[test]
    fn overflow_is_reported() {
        let err = total_of(1, u64::MAX / 2, i64::MAX).unwrap_err();
        assert!(matches!(err, RollError::Overflow { .. }));
    }

    #[test]
    fn uneven_split_keeps_every_roll() {
        let engine = RollEngine::new(EngineConfig { workers: Some(3), parallel_threshold: 0 });
        let res = engine
            .roll(&RollRequest::new(10, 6, 0, true), &SeededEntropy::new(5))
            .unwrap();
        assert_eq!(res.breakdown.map(|b| b.len()), Some(10));
    }

    #[test]
    fn oversized_breakdown_is_refused_not_allocated() {
        let err = reserve_breakdown(i64::MAX as u64).unwrap_err();
        assert!(matches!(err, RollError::BreakdownTooLarge { roll_count } if roll_count == i64::MAX as u64));
        assert_eq!(reserve_breakdown(5).unwrap(), vec![0; 5]);
    }

    #[test]
    fn worker_slices_cover_the_breakdown() {
        let engine = RollEngine::new(EngineConfig { workers: Some(4), parallel_threshold: 0 });
        let rolls = engine
            .roll(&RollRequest::new(11, 6, 0, true), &SeededEntropy::new(8))
            .unwrap()
            .breakdown
            .unwrap();
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));
    }
}
