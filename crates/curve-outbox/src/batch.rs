/// Dynamic batch sizing (§4.5 step 2), a pure function of pending depth
/// so it can be unit-tested without a database.
pub fn effective_batch_size(pending: i64, base_batch_size: i64) -> i64 {
    if pending > 1000 {
        (base_batch_size * 2).min(500)
    } else if pending > 500 {
        ((base_batch_size as f64 * 1.5) as i64).min(300)
    } else if pending < 10 {
        base_batch_size.min(10)
    } else {
        base_batch_size
    }
}

/// Exponential backoff for a failed row: `2^retry_count * 1000ms` (§4.5
/// step 6), expressed in milliseconds to add to `now`.
pub fn next_retry_delay_millis(retry_count: i32) -> i64 {
    2i64.saturating_pow(retry_count.max(0) as u32).saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_up_for_deep_backlog() {
        assert_eq!(effective_batch_size(1500, 100), 200);
        assert_eq!(effective_batch_size(600, 100), 150);
    }

    #[test]
    fn caps_small_batches_for_shallow_backlog() {
        assert_eq!(effective_batch_size(5, 100), 10);
    }

    #[test]
    fn leaves_batch_size_unchanged_in_the_middle_band() {
        assert_eq!(effective_batch_size(50, 100), 100);
    }

    #[test]
    fn retry_delay_doubles_each_attempt() {
        assert_eq!(next_retry_delay_millis(0), 1000);
        assert_eq!(next_retry_delay_millis(1), 2000);
        assert_eq!(next_retry_delay_millis(2), 4000);
    }
}
