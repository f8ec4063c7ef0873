use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorLimiter};
use nexa_model::settings::RemoteMetadataHttpSettings;
use std::num::NonZeroU32;
use std::time::Duration;

/// Throttles outbound calls to a remote metadata provider to
/// `max_requests_per_window` requests per `window_secs`, token-bucket
/// style so a quiet period can absorb a short burst.
///
/// `max_requests_per_window: None` means no configured ceiling; per
/// spec.md §9 this is resolved as "no per-provider throttling at all"
/// rather than inventing an implicit default, since an operator who wants
/// a limit can always set one. Recorded in DESIGN.md.
pub enum RemoteRateLimiter {
    Unlimited,
    Bounded(GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>),
}

impl RemoteRateLimiter {
    pub fn new(settings: &RemoteMetadataHttpSettings) -> Self {
        match settings.max_requests_per_window {
            None | Some(0) => Self::Unlimited,
            Some(max) => {
                let window = Duration::from_secs(settings.window_secs.max(1));
                let burst = NonZeroU32::new(max).expect("checked non-zero above");
                let quota = Quota::with_period(window / max)
                    .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(1).unwrap()))
                    .allow_burst(burst);
                Self::Bounded(GovernorLimiter::direct(quota))
            }
        }
    }

    pub async fn acquire(&self) {
        match self {
            Self::Unlimited => {}
            Self::Bounded(limiter) => limiter.until_ready().await,
        }
    }
}
