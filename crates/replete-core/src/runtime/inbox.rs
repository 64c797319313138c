use tokio::sync::mpsc;

use crate::effects::SessionEffect;
use crate::events::SessionEvent;

/// Sender for the session's event inbox.
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiver for the session's event inbox.
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Receiver the editor widget drains for display effects.
pub type SessionEffectReceiver = mpsc::UnboundedReceiver<SessionEffect>;

pub(crate) type SessionEffectSender = mpsc::UnboundedSender<SessionEffect>;
