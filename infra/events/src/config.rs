/// What dispatch does when a listener fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing listener and return its error; panics unwind
    /// to the dispatching caller.
    #[default]
    Propagate,
    /// Run every matched listener, catching errors and panics one by one, and
    /// report them together as [`EventBusError::ListenersFailed`](crate::EventBusError::ListenersFailed).
    Isolate,
}

/// Configuration for an [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    pub failure_policy: FailurePolicy,
    /// When disabled, `orders.*` is matched as a literal name.
    pub wildcards: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { failure_policy: FailurePolicy::Propagate, wildcards: true }
    }
}

impl EventBusConfig {
    /// Preset for buses where one misbehaving listener must not starve the rest.
    #[must_use = "Use this configuration to isolate listener failures"]
    pub fn isolated() -> Self {
        Self { failure_policy: FailurePolicy::Isolate, ..Self::default() }
    }

    #[must_use = "Customize how listener failures are handled"]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use = "Customize whether `prefix.*` names broadcast to a namespace"]
    pub const fn with_wildcards(mut self, enabled: bool) -> Self {
        self.wildcards = enabled;
        self
    }
}
