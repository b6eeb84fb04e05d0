use crate::event::ComponentEvent;
use crate::eventbus::InputListener;

/// Wraps a listener and filters events based on a user-supplied predicate.
///
/// Unlike [`EventFilter::Custom`](crate::eventbus::EventFilter::Custom) the
/// predicate may capture state, e.g. a set of component ids from a binding UI.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&ComponentEvent) -> bool + Send + Sync>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&ComponentEvent) -> bool + Send + Sync + 'static,
        inner: impl InputListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl InputListener for FilteredListener {
    fn on_input(&mut self, event: &ComponentEvent) {
        if (self.predicate)(event) {
            self.inner.on_input(event);
        }
    }
}
