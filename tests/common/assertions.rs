//! Custom test assertions

use batch_review::{BatchResult, ItemStatus};

/// Assertions for BatchResult
pub trait BatchResultAssertions {
    /// Assert one outcome per input item and every outcome terminal
    fn assert_accounted_for(&self, expected_total: usize);

    /// Assert the item ended in `status`
    fn assert_status(&self, item_id: &str, status: ItemStatus);
}

impl BatchResultAssertions for BatchResult {
    fn assert_accounted_for(&self, expected_total: usize) {
        assert_eq!(self.total, expected_total, "total");
        assert_eq!(self.outcomes.len(), expected_total, "outcome count");
        assert_eq!(
            self.succeeded + self.failed + self.skipped + self.cancelled,
            expected_total,
            "status counts must add up"
        );
        for outcome in &self.outcomes {
            assert!(
                outcome.status.is_terminal(),
                "{} is not terminal: {}",
                outcome.item_id,
                outcome.status
            );
        }
    }

    fn assert_status(&self, item_id: &str, status: ItemStatus) {
        let outcome = self
            .outcome(item_id)
            .unwrap_or_else(|| panic!("no outcome for {}", item_id));
        assert_eq!(outcome.status, status, "status of {}", item_id);
    }
}

/// Assert two values are approximately equal (for floats)
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-6_f64)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right) = ($left as f64, $right as f64);
        assert!(
            (left - right).abs() < $epsilon,
            "assertion failed: {} ≈ {} (epsilon {})",
            left,
            right,
            $epsilon
        );
    }};
}
