/// Adapter lifecycle:
/// `Initialized → Attached ⇄ Detached → Destroyed`.
///
/// There is no uninitialized state to represent: an [`Adapter`] value
/// only exists once its descriptor validated, so construction is
/// initialization. `Destroyed` is terminal. While `Detached` the
/// internal widget listener is suspended: widget events are dropped
/// instead of being forwarded, without destroying the widget or giving
/// up the id.
///
/// [`Adapter`]: crate::adapter::Adapter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Initialized,
    Attached,
    Detached,
    Destroyed,
}

impl LifecycleState {
    pub fn is_destroyed(&self) -> bool {
        matches!(self, LifecycleState::Destroyed)
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, LifecycleState::Attached)
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            LifecycleState::Initialized => "Initialized",
            LifecycleState::Attached => "Attached",
            LifecycleState::Detached => "Detached",
            LifecycleState::Destroyed => "Destroyed",
        }
    }
}
