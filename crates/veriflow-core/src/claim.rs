// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded optimistic-claim loop.
//!
//! Claiming a scarce resource under contention follows one shape: pick a
//! candidate, try a conditional take that only succeeds if nobody else got
//! there first, and retry a bounded number of times when the take loses.
//! This module captures that shape independently of any store, so the retry
//! policy is unit-testable without a transactional database.

/// Result of a single claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimAttempt<T> {
    /// The conditional take succeeded; the claimer owns `T`.
    Won(T),
    /// Another claimer took the candidate between select and take.
    Lost,
    /// No candidate exists at all.
    Empty,
}

/// Terminal outcome of a bounded claim loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome<T> {
    /// A candidate was claimed.
    Won(T),
    /// Candidates existed but every attempt lost the race.
    Exhausted,
    /// No candidate existed.
    Empty,
}

/// Run `attempt` up to `max_attempts` times, stopping early on a win or on
/// an empty pool. `Lost` attempts are retried; errors abort immediately.
pub fn bounded_claim<T, E, F>(max_attempts: u32, mut attempt: F) -> Result<ClaimOutcome<T>, E>
where
    F: FnMut() -> Result<ClaimAttempt<T>, E>,
{
    for _ in 0..max_attempts {
        match attempt()? {
            ClaimAttempt::Won(value) => return Ok(ClaimOutcome::Won(value)),
            ClaimAttempt::Empty => return Ok(ClaimOutcome::Empty),
            ClaimAttempt::Lost => continue,
        }
    }
    Ok(ClaimOutcome::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wins_on_first_attempt() {
        let outcome: Result<_, ()> = bounded_claim(3, || Ok(ClaimAttempt::Won("code-1")));
        assert_eq!(outcome.unwrap(), ClaimOutcome::Won("code-1"));
    }

    #[test]
    fn empty_pool_short_circuits() {
        let mut calls = 0;
        let outcome: Result<ClaimOutcome<()>, ()> = bounded_claim(3, || {
            calls += 1;
            Ok(ClaimAttempt::Empty)
        });
        assert_eq!(outcome.unwrap(), ClaimOutcome::Empty);
        assert_eq!(calls, 1, "empty must not be retried");
    }

    #[test]
    fn exhausts_after_max_losses() {
        let mut calls = 0;
        let outcome: Result<ClaimOutcome<()>, ()> = bounded_claim(3, || {
            calls += 1;
            Ok(ClaimAttempt::Lost)
        });
        assert_eq!(outcome.unwrap(), ClaimOutcome::Exhausted);
        assert_eq!(calls, 3);
    }

    #[test]
    fn wins_after_losing_races() {
        let mut calls = 0;
        let outcome: Result<_, ()> = bounded_claim(3, || {
            calls += 1;
            if calls < 3 {
                Ok(ClaimAttempt::Lost)
            } else {
                Ok(ClaimAttempt::Won(calls))
            }
        });
        assert_eq!(outcome.unwrap(), ClaimOutcome::Won(3));
    }

    #[test]
    fn errors_abort_immediately() {
        let mut calls = 0;
        let outcome: Result<ClaimOutcome<()>, &str> = bounded_claim(3, || {
            calls += 1;
            Err("store broke")
        });
        assert_eq!(outcome.unwrap_err(), "store broke");
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_attempts_is_exhausted() {
        let outcome: Result<ClaimOutcome<()>, ()> = bounded_claim(0, || Ok(ClaimAttempt::Lost));
        assert_eq!(outcome.unwrap(), ClaimOutcome::Exhausted);
    }
}
