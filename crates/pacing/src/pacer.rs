//! Human-tempo pacing between page interactions

use page_adapter::PageDriver;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Inserts randomized pauses and cursor/scroll motion between actions.
///
/// Best-effort throughout: a pacer failure must never fail the enclosing
/// flow, so page errors are swallowed and logged at debug level.
#[derive(Debug, Clone)]
pub struct BehaviorPacer {
    delay_min: Duration,
    delay_max: Duration,
}

impl BehaviorPacer {
    /// `delay_min`/`delay_max` bound the inter-request rest used by
    /// [`BehaviorPacer::rest`]; the in-page gesture tempo is fixed.
    pub fn new(delay_min: Duration, delay_max: Duration) -> Self {
        let (delay_min, delay_max) = if delay_min <= delay_max {
            (delay_min, delay_max)
        } else {
            (delay_max, delay_min)
        };
        Self {
            delay_min,
            delay_max,
        }
    }

    /// Scroll a little, wander the cursor, and wait — the fixed
    /// pause point flows insert before interacting with a fresh page.
    pub async fn pause(&self, page: &dyn PageDriver) {
        let (scroll, first_rest, x, y, second_rest) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(100..=500) as i64,
                Duration::from_millis(rng.gen_range(500..=1500)),
                rng.gen_range(100..800) as f64,
                rng.gen_range(100..600) as f64,
                Duration::from_millis(rng.gen_range(200..=1000)),
            )
        };

        if let Err(err) = page.scroll_by(0, scroll).await {
            debug!("pacer scroll failed: {}", err);
        }
        sleep(first_rest).await;

        if let Err(err) = page.mouse_move(x, y).await {
            debug!("pacer cursor move failed: {}", err);
        }
        sleep(second_rest).await;
    }

    /// Rest between requests for a random duration within the configured
    /// range.
    pub async fn rest(&self) {
        let delay = self.range_delay();
        debug!("resting {:?}", delay);
        sleep(delay).await;
    }

    /// Per-character delay for human-plausible typing.
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(50..=150))
    }

    /// Short hesitation between filling a form and submitting it.
    pub fn brief_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(1000..=2000))
    }

    /// Settle delay after a submit, covering client-side result rendering.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(2000..=4000))
    }

    fn range_delay(&self) -> Duration {
        let min = self.delay_min.as_millis() as u64;
        let max = self.delay_max.as_millis() as u64;
        if min >= max {
            return self.delay_min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
