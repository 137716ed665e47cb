use crossbeam_channel::{Receiver, Sender};

use crate::shared::{KeyId, LoadState};

/// State changes published by the piano after each mutation completes.
#[derive(Clone, Debug, PartialEq)]
pub enum PianoEvent {
    KeyPressed { key: KeyId, velocity: f32 },
    KeyReleased { key: KeyId },
    AllReleased,
    WindowChanged { start: KeyId, count: u8 },
    SuggestedKeysChanged(Vec<KeyId>),
    LoadStateChanged(LoadState),
    PlaybackStarted { song: String },
    PlaybackStopped { completed: bool, progress: f32 },
}

// Fan-out over unbounded channels. Subscribers that dropped their receiver
// are pruned on the next publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<PianoEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<PianoEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: PianoEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_and_prune() {
        let mut bus = EventBus::default();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(PianoEvent::AllReleased);
        assert_eq!(Ok(PianoEvent::AllReleased), first.try_recv());
        assert_eq!(Ok(PianoEvent::AllReleased), second.try_recv());

        drop(second);
        bus.publish(PianoEvent::KeyReleased { key: KeyId(3) });
        assert_eq!(1, bus.subscribers.len());
        assert_eq!(Ok(PianoEvent::KeyReleased { key: KeyId(3) }), first.try_recv());
    }
}
