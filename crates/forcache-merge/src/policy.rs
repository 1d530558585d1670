use forcache_types::Version;

/// Admission rule consulted at commit time.
///
/// The rule is evaluated inside the confirmed store's exclusive critical
/// section, so the version it sees cannot move before the overlay is applied.
/// The trait is object-safe and `Send + Sync` so a policy can be chosen at
/// runtime.
pub trait MergePolicy: Send + Sync {
    /// Human-readable name of this policy.
    fn name(&self) -> &str;

    /// Whether a branch created at `base` may commit while the store is at
    /// `current`.
    fn admits(&self, base: Version, current: Version) -> bool;
}

/// Store-wide optimistic concurrency control.
///
/// Admits a branch only if nothing at all has been applied to the confirmed
/// store since the branch was created.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalVersionPolicy;

impl MergePolicy for GlobalVersionPolicy {
    fn name(&self) -> &str {
        "global-version"
    }

    fn admits(&self, base: Version, current: Version) -> bool {
        base == current
    }
}
