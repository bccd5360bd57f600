//! Platform abstraction layer for the monotonic clock.
//!
//! This module allows switching between the real clock (backed by `std::time::Instant`)
//! and a fake clock whose time is set explicitly by tests.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
pub(crate) use real::RealPlatform;
