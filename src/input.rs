use crate::config::DeviceSetting;
use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDevice {
    Keyboard,
    Touch,
}

impl InputDevice {
    /// Handhelds get touch controls unless the config says otherwise.
    pub fn detect(setting: DeviceSetting) -> Self {
        match setting {
            DeviceSetting::Keyboard => InputDevice::Keyboard,
            DeviceSetting::Touch => InputDevice::Touch,
            DeviceSetting::Auto if cfg!(any(target_os = "android", target_os = "ios")) => {
                InputDevice::Touch
            }
            DeviceSetting::Auto => InputDevice::Keyboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Screen-space x of the finger.
    pub x: f32,
    /// Lifted or cancelled this frame.
    pub ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Burn,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

/// Everything the controller reads from the player in one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub thrust_held: bool,
    pub left_held: bool,
    pub right_held: bool,
    pub touches: Vec<TouchPoint>,
    pub screen_width: f32,
    pub skip_level_pressed: bool,
    pub toggle_collisions_pressed: bool,
}

impl FrameInput {
    pub fn poll() -> Self {
        let mut touches: Vec<TouchPoint> = touches()
            .iter()
            .map(|touch| TouchPoint {
                x: touch.position.x,
                ended: matches!(touch.phase, TouchPhase::Ended | TouchPhase::Cancelled),
            })
            .collect();

        // Fallback to mouse for desktop
        if touches.is_empty() {
            let (x, _) = mouse_position();
            if is_mouse_button_down(MouseButton::Left) {
                touches.push(TouchPoint { x, ended: false });
            } else if is_mouse_button_released(MouseButton::Left) {
                touches.push(TouchPoint { x, ended: true });
            }
        }

        Self {
            thrust_held: is_key_down(KeyCode::Space),
            left_held: is_key_down(KeyCode::A),
            right_held: is_key_down(KeyCode::D),
            touches,
            screen_width: screen_width(),
            skip_level_pressed: is_key_pressed(KeyCode::L),
            toggle_collisions_pressed: is_key_pressed(KeyCode::C),
        }
    }

    pub fn throttle(&self, device: InputDevice) -> Vec<Throttle> {
        match device {
            InputDevice::Keyboard if self.thrust_held => vec![Throttle::Burn],
            InputDevice::Keyboard => vec![Throttle::Cut],
            InputDevice::Touch => {
                let half = self.screen_width / 2.0;
                self.touches
                    .iter()
                    .filter(|touch| touch.x > half)
                    .map(|touch| if touch.ended { Throttle::Cut } else { Throttle::Burn })
                    .collect()
            }
        }
    }

    pub fn turns(&self, device: InputDevice) -> Vec<Turn> {
        match device {
            InputDevice::Keyboard => match (self.left_held, self.right_held) {
                (true, false) => vec![Turn::CounterClockwise],
                (false, true) => vec![Turn::Clockwise],
                _ => Vec::new(),
            },
            InputDevice::Touch => {
                let half = self.screen_width / 2.0;
                let quarter = self.screen_width / 4.0;
                self.touches
                    .iter()
                    .filter_map(|touch| {
                        if touch.x > half - quarter && touch.x < half {
                            Some(Turn::Clockwise)
                        } else if touch.x < quarter {
                            Some(Turn::CounterClockwise)
                        } else {
                            None
                        }
                    })
                    .collect()
            }
        }
    }
}
