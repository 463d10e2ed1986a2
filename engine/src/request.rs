use std::fmt;

use crate::RollError;

pub const MIN_DIE_SIZE: i64 = 3;
pub const MAX_DIE_SIZE: i64 = u32::MAX as i64;

/// Parameters for one invocation, as the user typed them.
///
/// Values stay signed so out-of-range input is reported by [`RollRequest::validate`]
/// rather than rejected earlier with a less useful message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollRequest {
    pub roll_count: i64,
    pub die_size: i64,
    pub constant_addition: i64,
    pub detailed: bool,
}

/// One violated constraint, e.g. `rollCount must be greater than 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

impl RollRequest {
    pub fn new(roll_count: i64, die_size: i64, constant_addition: i64, detailed: bool) -> Self {
        Self { roll_count, die_size, constant_addition, detailed }
    }

    /// Collect every violated constraint, in argument order.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.roll_count < 1 {
            violations.push(Violation::new("rollCount", "must be greater than 0"));
        }
        if self.die_size < MIN_DIE_SIZE {
            violations.push(Violation::new(
                "dieSize",
                format!("must be greater than or equal to {MIN_DIE_SIZE}"),
            ));
        } else if self.die_size > MAX_DIE_SIZE {
            violations.push(Violation::new(
                "dieSize",
                format!("must be less than or equal to {MAX_DIE_SIZE}"),
            ));
        }
        if self.constant_addition < 0 {
            violations.push(Violation::new(
                "constantAddition",
                "must be greater than or equal to 0",
            ));
        }
        violations
    }

    pub fn check(&self) -> Result<(), RollError> {
        let violations = self.validate();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RollError::Invalid(violations))
        }
    }

    /// True when a single draw answers the request and no breakdown is shown.
    pub fn is_single_draw(&self) -> bool {
        self.roll_count == 1 && (!self.detailed || self.constant_addition == 0)
    }

    /// Smallest and largest totals a valid request can produce.
    pub fn bounds(&self) -> (i128, i128) {
        let count = self.roll_count as i128;
        let add = self.constant_addition as i128;
        (count * (1 + add), count * (self.die_size as i128 + add))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_has_no_violations() {
        assert!(RollRequest::new(3, 6, 2, true).validate().is_empty());
        assert!(RollRequest::new(1, 3, 0, false).check().is_ok());
    }

    #[test]
    fn every_violation_is_reported_in_order() {
        let v = RollRequest::new(0, 2, -1, false).validate();
        let fields: Vec<_> = v.iter().map(|v| v.field).collect();
        assert_eq!(fields, ["rollCount", "dieSize", "constantAddition"]);
        assert_eq!(v[1].to_string(), "dieSize must be greater than or equal to 3");
    }

    #[test]
    fn die_size_above_u32_is_rejected() {
        let v = RollRequest::new(1, MAX_DIE_SIZE + 1, 0, false).validate();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].message, "must be less than or equal to 4294967295");
    }

    #[test]
    fn single_draw_path_selection() {
        assert!(RollRequest::new(1, 6, 0, false).is_single_draw());
        assert!(RollRequest::new(1, 6, 0, true).is_single_draw());
        assert!(RollRequest::new(1, 6, 4, false).is_single_draw());
        assert!(!RollRequest::new(1, 6, 4, true).is_single_draw());
        assert!(!RollRequest::new(2, 6, 0, false).is_single_draw());
    }
}
