// Abstract input events. The window layer turns raw keys into these,
// so nothing past this point knows about platform key codes.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    PrevMode,
    NextMode,
    FrameRateUp,
    FrameRateDown,
    ZoomIn,
    ZoomOut,
    ToggleVignette,
    ToggleScanLines,
    ToggleHud,
    ToggleNoise,
    Quit,
}

impl InputEvent {
    /// Keyboard contract: a/d mode, w/s FPS, +/= and -/_ zoom, 1-4 toggles, q quit.
    pub fn from_char(c: char) -> Option<Self> {
        let ev = match c.to_ascii_lowercase() {
            'a' => InputEvent::PrevMode,
            'd' => InputEvent::NextMode,
            'w' => InputEvent::FrameRateUp,
            's' => InputEvent::FrameRateDown,
            '+' | '=' => InputEvent::ZoomIn,
            '-' | '_' => InputEvent::ZoomOut,
            '1' => InputEvent::ToggleVignette,
            '2' => InputEvent::ToggleScanLines,
            '3' => InputEvent::ToggleHud,
            '4' => InputEvent::ToggleNoise,
            'q' => InputEvent::Quit,
            _ => return None,
        };
        Some(ev)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_contract() {
        assert_eq!(InputEvent::from_char('a'), Some(InputEvent::PrevMode));
        assert_eq!(InputEvent::from_char('D'), Some(InputEvent::NextMode));
        assert_eq!(InputEvent::from_char('='), Some(InputEvent::ZoomIn));
        assert_eq!(InputEvent::from_char('_'), Some(InputEvent::ZoomOut));
        assert_eq!(InputEvent::from_char('4'), Some(InputEvent::ToggleNoise));
        assert_eq!(InputEvent::from_char('q'), Some(InputEvent::Quit));
        assert_eq!(InputEvent::from_char('x'), None);
        assert_eq!(InputEvent::from_char('5'), None);
    }
}
