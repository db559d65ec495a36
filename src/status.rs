use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Outcome of a single version build.
///
/// Fatal conditions are never represented here; they travel as errors and
/// abort the whole batch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Status {
    #[default]
    Success,
    Failure,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::Failure => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Self) -> Self::Output {
        Status::from_code(self.code() | rhs.code())
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "SUCCESS"),
            Status::Failure => write!(f, "FAILURE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Status::Success.code(), 0);
        assert_eq!(Status::Failure.code(), 1);
        assert_eq!(Status::from_code(0), Status::Success);
        assert_eq!(Status::from_code(128), Status::Failure);
        assert_eq!(Status::from_code(-1), Status::Failure);
    }

    #[test]
    fn test_bitor_any_failure_wins() {
        assert_eq!(Status::Success | Status::Success, Status::Success);
        assert_eq!(Status::Success | Status::Failure, Status::Failure);
        assert_eq!(Status::Failure | Status::Success, Status::Failure);

        let mut status = Status::default();
        status |= Status::Failure;
        status |= Status::Success;
        assert_eq!(status, Status::Failure);
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::Success.to_string(), "SUCCESS");
        assert_eq!(Status::Failure.to_string(), "FAILURE");
    }
}
