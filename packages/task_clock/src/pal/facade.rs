use std::time::Duration;

#[cfg(test)]
use crate::pal::FakePlatform;
use crate::pal::{Platform, RealPlatform};

/// Dispatches to either the real or (in tests) the fake clock.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(RealPlatform::new())
    }

    #[cfg(test)]
    pub(crate) fn fake(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }
}

impl Platform for PlatformFacade {
    fn now(&self) -> Duration {
        match self {
            Self::Real(p) => p.now(),
            #[cfg(test)]
            Self::Fake(p) => p.now(),
        }
    }
}
