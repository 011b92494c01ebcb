//! Gesture to command mapping and the outbound command seam.

use crossbeam_channel::{Sender, TrySendError};
use shared::protocol::{MediaPlayerCommand, ServiceCall};
use tracing::{debug, warn};

use crate::affordance::{LinkSelection, PlayerAffordance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    PowerToggled { checked: bool },
    LinkSelected(LinkSelection),
}

/// Fire-and-forget delivery of a service call. Implementations must not
/// block and nothing is reported back to the caller.
pub trait ServiceCaller {
    fn call_service(&self, call: ServiceCall);
}

impl<C: ServiceCaller + ?Sized> ServiceCaller for &C {
    fn call_service(&self, call: ServiceCall) {
        (**self).call_service(call)
    }
}

impl ServiceCaller for Sender<ServiceCall> {
    fn call_service(&self, call: ServiceCall) {
        let domain = call.domain.clone();
        let service = call.service.clone();
        match self.try_send(call) {
            Ok(()) => debug!(%domain, %service, "queued service call"),
            Err(TrySendError::Full(_)) => {
                warn!(%domain, %service, "service call queue is full; dropping call")
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(%domain, %service, "service call receiver disconnected; dropping call")
            }
        }
    }
}

/// Exactly one command per gesture. The link control is disabled upstream
/// when there is no leader, so a `Link` selection is not re-validated here.
pub fn command_for(gesture: Gesture, player: &PlayerAffordance) -> MediaPlayerCommand {
    let entity_id = player.entity_id.clone();
    match gesture {
        Gesture::PowerToggled { checked: true } => MediaPlayerCommand::TurnOn { entity_id },
        Gesture::PowerToggled { checked: false } => MediaPlayerCommand::TurnOff { entity_id },
        Gesture::LinkSelected(LinkSelection::Unlink) => MediaPlayerCommand::Unjoin { entity_id },
        Gesture::LinkSelected(LinkSelection::Link) => MediaPlayerCommand::Join {
            group_members: vec![entity_id],
            entity_id: player.leader.clone(),
        },
    }
}

pub fn dispatch_gesture<C: ServiceCaller + ?Sized>(
    caller: &C,
    gesture: Gesture,
    player: &PlayerAffordance,
) {
    let command = command_for(gesture, player);
    debug!(
        entity_id = %player.entity_id,
        service = command.service(),
        "multiroom: dispatching gesture"
    );
    caller.call_service(command.into());
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
