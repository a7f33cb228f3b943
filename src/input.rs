// Pointer input as the surface sees it.
// minifb is polled once per frame; PointerTracker diffs consecutive polls
// into enter / move / leave events.

/// Pressed buttons as a bitmask (primary = 1, secondary = 2, middle = 4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Buttons(pub u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const PRIMARY: Buttons = Buttons(1);
    pub const SECONDARY: Buttons = Buttons(2);
    pub const MIDDLE: Buttons = Buttons(4);

    pub fn from_flags(primary: bool, secondary: bool, middle: bool) -> Self {
        let mut bits = 0;
        if primary { bits |= Self::PRIMARY.0; }
        if secondary { bits |= Self::SECONDARY.0; }
        if middle { bits |= Self::MIDDLE.0; }
        Buttons(bits)
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }

    /// Anything beyond the primary button selects the erase color.
    pub fn erases(self) -> bool {
        self.0 & !Self::PRIMARY.0 != 0
    }
}

/// One pointer event. Coordinates are offsets in display pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Enter,
    Leave,
    Move { x: f32, y: f32, buttons: Buttons, shift: bool },
}

/// What the window reported this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    /// `None` while the pointer is outside the surface.
    pub pos: Option<(f32, f32)>,
    pub buttons: Buttons,
    pub shift: bool,
}

#[derive(Default)]
pub struct PointerTracker {
    last: PointerSample,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events implied by going from the previous sample to `now`.
    pub fn update(&mut self, now: PointerSample) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        match (self.last.pos, now.pos) {
            (None, Some((x, y))) => {
                events.push(PointerEvent::Enter);
                events.push(PointerEvent::Move { x, y, buttons: now.buttons, shift: now.shift });
            }
            (Some(_), None) => events.push(PointerEvent::Leave),
            (Some(prev), Some((x, y))) => {
                if prev != (x, y) || self.last.buttons != now.buttons || self.last.shift != now.shift {
                    events.push(PointerEvent::Move { x, y, buttons: now.buttons, shift: now.shift });
                }
            }
            (None, None) => {}
        }
        self.last = now;
        events
    }
}
