// Input plan for the terminal piano:
//
// Piano keys (relative to the left edge of the visible window):
//     w e   t y u          //  black keys: offsets 1 3   6 8 10
//    a s d f g h j k       //  white keys: offsets 0 2 4 5 7 9 11 12
//
// Host controls:
//   Left / Right    //  ShiftWindow(-1 or 1)
//   - / =           //  ResizeWindow(-1 or 1), debounced in the middle layer
//   Space           //  TogglePlay (demo song)
//   Tab             //  NextScale (suggested keys)
//   l               //  Load (retry after a failed sample load)
//   Esc             //  Quit
//
// Mouse: left button down/drag/up over the keyboard area become Pointer*
// events. Touch events are part of the event model for hosts that have them;
// the terminal never produces them.
//
// The middle layer owns every piece of piano state. The TUI renders
// `Middle::display_state()` each frame and nothing else.

pub const NUM_KEYS: usize = 88;

/// Index of one of the 88 piano keys, always within [0, 87].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(pub u8);

impl KeyId {
    /// Range-checked constructor; anything outside the keyboard is `None`.
    pub fn new(index: i32) -> Option<Self> {
        if (0..NUM_KEYS as i32).contains(&index) {
            Some(KeyId(index as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> i32 {
        self.0 as i32
    }
}

/// Instrument loading lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Ready,
    Failed(String), // reason, shown in the status line
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    pub fn label(&self) -> &str {
        match self {
            LoadState::NotLoaded => "press any key to load samples",
            LoadState::Loading => "loading samples...",
            LoadState::Ready => "ready",
            LoadState::Failed(_) => "samples failed to load",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // physical keyboard, lowercase chars
    KeyDown(char),
    KeyUp(char),

    // the single mouse button session, terminal cell coordinates
    PointerDown { x: u16, y: u16 },
    PointerMove { x: u16, y: u16 },
    PointerUp,

    // touch identifiers are tracked independently of each other
    TouchStart { id: u64, x: u16, y: u16 },
    TouchMove { id: u64, x: u16, y: u16 },
    TouchEnd { id: u64 },
    TouchCancel { id: u64 },

    // terminal lost focus
    FocusLost,

    // host controls, resolved by the tui
    ShiftWindow(i32),
    ResizeWindow(i32),
    TogglePlay,
    NextScale,
    Load,
    Quit,
}

impl InputEvent {
    /// Events that count as a user gesture for lazy sample loading.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyDown(_)
                | InputEvent::PointerDown { .. }
                | InputEvent::TouchStart { .. }
                | InputEvent::TogglePlay
                | InputEvent::Load
        )
    }
}

/// Snapshot of everything the view needs for one frame.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub start: KeyId,
    pub visible: u8,
    pub active: Vec<(KeyId, f32)>, // sounding keys with their velocity
    pub suggested: Vec<KeyId>,
    pub load_state: LoadState,
    pub playing: bool,
    pub progress: f32, // 0.0..=1.0 while a song plays
    pub song_name: Option<String>,
    pub scale_name: &'static str,
}

impl DisplayState {
    pub fn is_active(&self, key: KeyId) -> bool {
        self.active.iter().any(|(k, _)| *k == key)
    }

    pub fn is_suggested(&self, key: KeyId) -> bool {
        self.suggested.contains(&key)
    }
}
