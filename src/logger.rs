use crate::event::ComponentEvent;
use crate::eventbus::InputListener;

/// A listener that traces every change event at `info` level.
///
/// Install a `tracing` subscriber in the host to see the output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl InputListener for Logger {
    fn on_input(&mut self, event: &ComponentEvent) {
        tracing::info!(
            device = %event.device(),
            component = event.component.name(),
            kind = %event.kind(),
            old = event.old_value,
            new = event.new_value,
            "input"
        );
    }
}
