//! The user-facing alert side channel.
//!
//! Whenever the remote store reports a failure, the repository pushes one
//! message per failed record (plus one for a whole-batch refusal) to a
//! [Notifier]. Embedding applications supply an implementation backed by
//! their alert surface, e.g. a toast stack.

/// Receives user-facing failure messages from the repository.
///
/// Notifications are a side effect of the repository operations, never part
/// of their return values.
pub trait Notifier {
    /// Surface `message` to the user.
    fn notify(&self, message: &str);
}

/// The default notifier: forwards messages to the tracing log at warn level.
///
/// Useful for headless tools and as a fallback when no alert surface exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!("record store reported: {message}");
    }
}
