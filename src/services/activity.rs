use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tokio::sync::Mutex;

pub struct Activity {
    started: Instant,
    last: Mutex<(Instant, OffsetDateTime)>,
}

#[derive(Debug, Clone, Copy)]
pub struct ActivitySnapshot {
    pub last_access: OffsetDateTime,
    pub uptime: Duration,
    pub idle: Duration,
}

impl Activity {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { started: now, last: Mutex::new((now, OffsetDateTime::now_utc())) }
    }

    pub async fn touch(&self) -> OffsetDateTime {
        let mut last = self.last.lock().await;
        *last = (Instant::now(), OffsetDateTime::now_utc());
        last.1
    }

    pub async fn snapshot(&self) -> ActivitySnapshot {
        let (at, wall) = *self.last.lock().await;
        ActivitySnapshot { last_access: wall, uptime: self.started.elapsed(), idle: at.elapsed() }
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn touch_moves_last_access_forward() {
        let activity = Activity::new();
        let before = activity.snapshot().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let touched = activity.touch().await;
        let after = activity.snapshot().await;

        assert!(touched >= before.last_access);
        assert_eq!(after.last_access, touched);
        assert!(after.idle <= after.uptime);
        assert!(after.uptime >= Duration::from_millis(20));
    }
}
