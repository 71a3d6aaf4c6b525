use std::{
    sync::OnceLock,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Wall-clock milliseconds since the unix epoch, advanced by a monotonic clock
/// so successive readings never go backwards.
#[inline(always)]
pub fn now_ms() -> u64 {
    // (t0, epoch_ms) initialised once
    static BASE: OnceLock<(Instant, u64)> = OnceLock::new();
    let (t0, epoch_ms) = *BASE.get_or_init(|| {
        let realtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        (Instant::now(), realtime.as_millis() as u64)
    });

    // time elapsed since t0 in milliseconds
    let delta = Instant::now().duration_since(t0).as_millis() as u64;

    epoch_ms + delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_monotonic() {
        let mut prev = now_ms();
        for _ in 0..1000 {
            let now = now_ms();
            assert!(now >= prev);
            prev = now;
        }
    }

    #[test]
    fn test_now_ms_tracks_sleep() {
        let start = now_ms();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(now_ms() - start >= 20);
    }
}
