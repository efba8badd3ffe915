//! Effects port
//!
//! Sound, vibration and HUD flashes live outside the simulation. They hear
//! about state transitions through an `EffectsPort` handed to the world at
//! construction.

use log::{debug, info};

use super::types::{AgentId, OrderId};

/// A state transition the presentation layer may react to
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    OrderGenerated { order: OrderId },
    OrderAccepted { order: OrderId },
    OrderPickedUp { order: OrderId },
    OrderDelivered { order: OrderId, reward: u32 },
    OrderFailed { order: OrderId },
    AgentTurned { agent: AgentId },
    SessionOver { earnings: u32 },
}

pub trait EffectsPort {
    fn emit(&mut self, event: &SimEvent);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEffects;

impl EffectsPort for NoEffects {
    fn emit(&mut self, _event: &SimEvent) {}
}

/// Writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEffects;

impl EffectsPort for LogEffects {
    fn emit(&mut self, event: &SimEvent) {
        match event {
            SimEvent::AgentTurned { .. } | SimEvent::OrderGenerated { .. } => {
                debug!("effect: {:?}", event)
            }
            _ => info!("effect: {:?}", event),
        }
    }
}

/// Keeps every event for later inspection
#[derive(Debug, Default, Clone)]
pub struct RecordedEffects {
    pub events: Vec<SimEvent>,
}

impl RecordedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, predicate: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}

impl EffectsPort for RecordedEffects {
    fn emit(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}
