use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ReelError, ReelResult};

// ---------------------------------------------------------------------------
// Observer: pull-style change subscriber
// ---------------------------------------------------------------------------

/// Something that wants to know the catalog or its query configuration
/// changed. Observers get no payload; they pull fresh state afterwards.
pub trait Observer: Send + Sync {
    fn update(&self) -> ReelResult<()>;
}

impl<F> Observer for F
where
    F: Fn() -> ReelResult<()> + Send + Sync,
{
    fn update(&self) -> ReelResult<()> {
        self()
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChangeNotifier
// ---------------------------------------------------------------------------

/// Ordered subscriber list.
///
/// `notify_all` calls every observer synchronously in subscription order.
/// The first observer that fails aborts the round; later observers are not
/// called. Whatever the observer returned is surfaced as `ReelError::Observer`.
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Vec<(ObserverId, Arc<dyn Observer>)>,
    next_id: u64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        tracing::debug!(%id, subscribers = self.observers.len(), "Observer subscribed");
        id
    }

    /// Remove an observer. Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        let removed = self.observers.len() != before;
        if removed {
            tracing::debug!(%id, subscribers = self.observers.len(), "Observer unsubscribed");
        }
        removed
    }

    pub fn notify_all(&self) -> ReelResult<()> {
        for (id, observer) in &self.observers {
            if let Err(err) = observer.update() {
                tracing::debug!(%id, error = %err, "Observer failed, aborting notification");
                return Err(match err {
                    ReelError::Observer(_) => err,
                    other => ReelError::Observer(format!("{}: {}", id, other)),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.observers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ChangeFlag: dirty-bit observer
// ---------------------------------------------------------------------------

/// Observer that raises a shared flag; the owner clears it with [`take`]
/// before re-reading state. Clones share the same flag.
///
/// [`take`]: ChangeFlag::take
#[derive(Debug, Clone, Default)]
pub struct ChangeFlag {
    dirty: Arc<AtomicBool>,
}

impl ChangeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clear the flag and report whether it was set.
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl Observer for ChangeFlag {
    fn update(&self) -> ReelResult<()> {
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
