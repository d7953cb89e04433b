/// Browser events the particle background reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer moved to viewport coordinates (x, y).
    PointerMove { x: f64, y: f64 },
    /// Pointer entered the document.
    PointerEnter { x: f64, y: f64 },
    /// Pointer left the document.
    PointerLeave,
    /// Window was resized to the given CSS pixel size.
    Resize { width: f64, height: f64 },
}

/// Event listeners push here; the frame callback drains once per frame.
pub struct InputQueue {
    events: Vec<HostEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    /// Drain pending events. Only the last resize survives, so a window drag
    /// rebuilds the particle set once per frame at most.
    pub fn drain(&mut self) -> Vec<HostEvent> {
        let mut events = std::mem::take(&mut self.events);
        if let Some(last_resize) = events.iter().rposition(|e| matches!(e, HostEvent::Resize { .. })) {
            let mut index = 0;
            events.retain(|e| {
                let keep = !matches!(e, HostEvent::Resize { .. }) || index == last_resize;
                index += 1;
                keep
            });
        }
        events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
