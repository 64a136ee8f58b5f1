//! Wall-clock helpers and creation-time identifiers.

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Next creation-time identifier.
///
/// Ids are epoch milliseconds, bumped past `last` so two ids minted within
/// the same millisecond never collide. Saturates at `i64::MAX`.
pub fn next_id(last: &mut i64) -> i64 {
    let id = (now_ms() as i64).max(last.saturating_add(1));
    *last = id;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing() {
        let mut last = 0;
        let a = next_id(&mut last);
        let b = next_id(&mut last);
        let c = next_id(&mut last);
        assert!(a < b && b < c);
    }

    #[test]
    fn ids_skip_past_future_seed() {
        let mut last = i64::MAX - 10;
        assert_eq!(next_id(&mut last), i64::MAX - 9);
    }

    #[test]
    fn ids_saturate_instead_of_overflowing() {
        let mut last = i64::MAX;
        assert_eq!(next_id(&mut last), i64::MAX);
        assert_eq!(last, i64::MAX);
    }
}
