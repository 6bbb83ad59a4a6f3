use crate::audio::Clip;
use crate::config::Tuning;
use crate::effects::{Effect, Shake};
use crate::input::{FrameInput, InputDevice, Throttle, Turn};
use crate::level::SurfaceTag;
use crate::rocket::Rocket;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    /// The level after the current one, wrapping to the first.
    Next,
    First,
}

/// Services the controller drives. The game implements this over its audio,
/// particle, camera and scene state.
pub trait Stage {
    fn is_audio_playing(&self) -> bool;
    fn stop_audio(&mut self);
    fn play_one_shot(&mut self, clip: Clip);
    fn play_effect(&mut self, effect: Effect);
    fn stop_effect(&mut self, effect: Effect);
    fn shake_once(&mut self, shake: Shake);
    fn load_scene(&mut self, request: SceneRequest);
}

// Scene load waiting on a timer
#[derive(Debug, Clone, Copy, PartialEq)]
struct DelayedLoad {
    remaining: f32,
    request: SceneRequest,
}

// Player-facing rocket behaviour: input, landings and crashes, level changes
#[derive(Debug, Clone)]
pub struct RocketController {
    tuning: Tuning,
    device: InputDevice,
    debug_keys: bool,
    transcending: bool,
    collisions_disabled: bool,
    pending: Option<DelayedLoad>,
}

impl RocketController {
    pub fn new(tuning: Tuning, device: InputDevice, debug_keys: bool) -> Self {
        Self {
            tuning,
            device,
            debug_keys,
            transcending: false,
            collisions_disabled: false,
            pending: None,
        }
    }

    /// A success or death sequence is running; input is ignored.
    pub fn is_transcending(&self) -> bool {
        self.transcending
    }

    pub fn collisions_disabled(&self) -> bool {
        self.collisions_disabled
    }

    pub fn device(&self) -> InputDevice {
        self.device
    }

    pub fn update<S: Stage>(&mut self, input: &FrameInput, rocket: &mut Rocket, stage: &mut S, dt: f32) {
        if !self.transcending {
            self.respond_to_thrust(input, rocket, stage, dt);
            self.respond_to_rotate(input, rocket, dt);
        }

        if self.debug_keys {
            self.respond_to_debug_keys(input, stage);
        }
    }

    /// Advances the delayed scene load, if one is scheduled.
    pub fn tick<S: Stage>(&mut self, dt: f32, stage: &mut S) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.remaining -= dt;
        if pending.remaining <= 0.0 {
            let request = pending.request;
            self.pending = None;
            stage.load_scene(request);
        }
    }

    pub fn on_collision_enter<S: Stage>(&mut self, tag: SurfaceTag, stage: &mut S) {
        if self.transcending || self.collisions_disabled {
            return;
        }

        match tag {
            SurfaceTag::Friendly => {}
            SurfaceTag::Finish => self.start_success_sequence(stage),
            SurfaceTag::Hazard => self.start_death_sequence(stage),
        }
    }

    fn respond_to_debug_keys<S: Stage>(&mut self, input: &FrameInput, stage: &mut S) {
        if input.skip_level_pressed {
            debug!("Debug skip to next level");
            stage.load_scene(SceneRequest::Next);
        }

        if input.toggle_collisions_pressed {
            self.collisions_disabled = !self.collisions_disabled;
            info!(disabled = self.collisions_disabled, "Collisions toggled");
        }
    }

    fn start_success_sequence<S: Stage>(&mut self, stage: &mut S) {
        info!("Landed, next level in {}s", self.tuning.load_level_delay);
        self.transcending = true;
        stage.stop_audio();
        stage.play_one_shot(Clip::NextLevel);
        stage.play_effect(Effect::Success);
        self.schedule(SceneRequest::Next);
    }

    fn start_death_sequence<S: Stage>(&mut self, stage: &mut S) {
        info!("Crashed, restarting in {}s", self.tuning.load_level_delay);
        self.transcending = true;
        stage.shake_once(Shake::EXPLOSION);
        stage.stop_audio();
        stage.play_one_shot(Clip::Explosion);
        stage.play_effect(Effect::Crush);
        self.schedule(SceneRequest::First);
    }

    fn schedule(&mut self, request: SceneRequest) {
        self.pending = Some(DelayedLoad {
            remaining: self.tuning.load_level_delay,
            request,
        });
    }

    fn respond_to_thrust<S: Stage>(&mut self, input: &FrameInput, rocket: &mut Rocket, stage: &mut S, dt: f32) {
        for throttle in input.throttle(self.device) {
            match throttle {
                Throttle::Burn => self.apply_thrust(rocket, stage, dt),
                Throttle::Cut => stop_thrust(stage),
            }
        }
    }

    fn apply_thrust<S: Stage>(&self, rocket: &mut Rocket, stage: &mut S, dt: f32) {
        rocket.apply_relative_thrust(self.tuning.main_thrust, dt);
        if !stage.is_audio_playing() {
            stage.play_one_shot(Clip::MainEngine);
        }
        stage.play_effect(Effect::Jet);
    }

    fn respond_to_rotate(&self, input: &FrameInput, rocket: &mut Rocket, dt: f32) {
        // manual control takes over from any spin left by a bump
        rocket.stop_spin();

        let rotation_this_frame = self.tuning.rcs_thrust.to_radians() * dt;
        for turn in input.turns(self.device) {
            match turn {
                Turn::Clockwise => rocket.rotate(rotation_this_frame),
                Turn::CounterClockwise => rocket.rotate(-rotation_this_frame),
            }
        }
    }
}

fn stop_thrust<S: Stage>(stage: &mut S) {
    stage.stop_audio();
    stage.stop_effect(Effect::Jet);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TouchPoint;
    use macroquad::prelude::Vec2;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        StopAudio,
        OneShot(Clip),
        Play(Effect),
        Stop(Effect),
        Shake(Shake),
        Load(SceneRequest),
    }

    #[derive(Default)]
    struct RecordingStage {
        calls: Vec<Call>,
        audio_playing: bool,
    }

    impl Stage for RecordingStage {
        fn is_audio_playing(&self) -> bool {
            self.audio_playing
        }
        fn stop_audio(&mut self) {
            self.audio_playing = false;
            self.calls.push(Call::StopAudio);
        }
        fn play_one_shot(&mut self, clip: Clip) {
            self.audio_playing = true;
            self.calls.push(Call::OneShot(clip));
        }
        fn play_effect(&mut self, effect: Effect) {
            self.calls.push(Call::Play(effect));
        }
        fn stop_effect(&mut self, effect: Effect) {
            self.calls.push(Call::Stop(effect));
        }
        fn shake_once(&mut self, shake: Shake) {
            self.calls.push(Call::Shake(shake));
        }
        fn load_scene(&mut self, request: SceneRequest) {
            self.calls.push(Call::Load(request));
        }
    }

    fn controller(device: InputDevice) -> RocketController {
        RocketController::new(Tuning::default(), device, true)
    }

    fn thrusting() -> FrameInput {
        FrameInput {
            thrust_held: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn test_thrust_starts_engine_once() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut rocket = Rocket::new(Vec2::ZERO);
        let mut stage = RecordingStage::default();

        ctrl.update(&thrusting(), &mut rocket, &mut stage, 0.1);
        ctrl.update(&thrusting(), &mut rocket, &mut stage, 0.1);

        assert_eq!(
            stage.calls,
            vec![
                Call::OneShot(Clip::MainEngine),
                Call::Play(Effect::Jet),
                Call::Play(Effect::Jet),
            ]
        );
        // 620 px/s² for 0.2 s, straight up
        assert!((rocket.velocity.y + 124.0).abs() < 1e-3);
    }

    #[test]
    fn test_releasing_thrust_cuts_engine() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut rocket = Rocket::new(Vec2::ZERO);
        let mut stage = RecordingStage::default();

        ctrl.update(&FrameInput::default(), &mut rocket, &mut stage, 0.1);

        assert_eq!(stage.calls, vec![Call::StopAudio, Call::Stop(Effect::Jet)]);
        assert_eq!(rocket.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_rotation_rate_and_spin_reset() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut rocket = Rocket::new(Vec2::ZERO);
        rocket.angular_velocity = 3.0;
        let mut stage = RecordingStage::default();
        let input = FrameInput {
            right_held: true,
            ..FrameInput::default()
        };

        ctrl.update(&input, &mut rocket, &mut stage, 0.5);

        assert_eq!(rocket.angular_velocity, 0.0);
        assert!((rocket.rotation - 75f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_touch_controls() {
        let mut ctrl = controller(InputDevice::Touch);
        let mut rocket = Rocket::new(Vec2::ZERO);
        let mut stage = RecordingStage::default();
        let input = FrameInput {
            touches: vec![
                TouchPoint { x: 900.0, ended: false },
                TouchPoint { x: 100.0, ended: false },
            ],
            screen_width: 1000.0,
            ..FrameInput::default()
        };

        ctrl.update(&input, &mut rocket, &mut stage, 0.1);

        assert_eq!(
            stage.calls,
            vec![Call::OneShot(Clip::MainEngine), Call::Play(Effect::Jet)]
        );
        assert!(rocket.rotation < 0.0);

        let lifted = FrameInput {
            touches: vec![TouchPoint { x: 900.0, ended: true }],
            screen_width: 1000.0,
            ..FrameInput::default()
        };
        stage.calls.clear();
        ctrl.update(&lifted, &mut rocket, &mut stage, 0.1);
        assert_eq!(stage.calls, vec![Call::StopAudio, Call::Stop(Effect::Jet)]);
    }

    #[test]
    fn test_friendly_contact_is_ignored() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut stage = RecordingStage::default();
        ctrl.on_collision_enter(SurfaceTag::Friendly, &mut stage);
        assert!(stage.calls.is_empty());
        assert!(!ctrl.is_transcending());
    }

    #[test]
    fn test_success_sequence_loads_next_after_delay() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut stage = RecordingStage::default();

        ctrl.on_collision_enter(SurfaceTag::Finish, &mut stage);
        assert!(ctrl.is_transcending());
        assert_eq!(
            stage.calls,
            vec![
                Call::StopAudio,
                Call::OneShot(Clip::NextLevel),
                Call::Play(Effect::Success),
            ]
        );

        stage.calls.clear();
        ctrl.tick(1.5, &mut stage);
        assert!(stage.calls.is_empty());
        ctrl.tick(0.5, &mut stage);
        assert_eq!(stage.calls, vec![Call::Load(SceneRequest::Next)]);

        stage.calls.clear();
        ctrl.tick(5.0, &mut stage);
        assert!(stage.calls.is_empty());
    }

    #[test]
    fn test_death_sequence_shakes_and_restarts() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut stage = RecordingStage::default();

        ctrl.on_collision_enter(SurfaceTag::Hazard, &mut stage);
        ctrl.tick(2.0, &mut stage);

        assert_eq!(
            stage.calls,
            vec![
                Call::Shake(Shake::EXPLOSION),
                Call::StopAudio,
                Call::OneShot(Clip::Explosion),
                Call::Play(Effect::Crush),
                Call::Load(SceneRequest::First),
            ]
        );
    }

    #[test]
    fn test_only_one_sequence_at_a_time() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut stage = RecordingStage::default();

        ctrl.on_collision_enter(SurfaceTag::Finish, &mut stage);
        let after_success = stage.calls.len();
        ctrl.on_collision_enter(SurfaceTag::Hazard, &mut stage);
        ctrl.on_collision_enter(SurfaceTag::Finish, &mut stage);
        assert_eq!(stage.calls.len(), after_success);

        ctrl.tick(2.0, &mut stage);
        assert_eq!(stage.calls.last(), Some(&Call::Load(SceneRequest::Next)));
    }

    #[test]
    fn test_input_ignored_while_transcending() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut rocket = Rocket::new(Vec2::ZERO);
        rocket.angular_velocity = 2.0;
        let mut stage = RecordingStage::default();

        ctrl.on_collision_enter(SurfaceTag::Hazard, &mut stage);
        stage.calls.clear();
        ctrl.update(&thrusting(), &mut rocket, &mut stage, 0.1);

        assert!(stage.calls.is_empty());
        assert_eq!(rocket.velocity, Vec2::ZERO);
        // no manual control, so the wreck keeps tumbling
        assert_eq!(rocket.angular_velocity, 2.0);
    }

    #[test]
    fn test_debug_keys() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut rocket = Rocket::new(Vec2::ZERO);
        let mut stage = RecordingStage::default();
        let toggle = FrameInput {
            toggle_collisions_pressed: true,
            ..FrameInput::default()
        };

        ctrl.update(&toggle, &mut rocket, &mut stage, 0.016);
        assert!(ctrl.collisions_disabled());

        stage.calls.clear();
        ctrl.on_collision_enter(SurfaceTag::Hazard, &mut stage);
        assert!(stage.calls.is_empty());

        ctrl.update(&toggle, &mut rocket, &mut stage, 0.016);
        assert!(!ctrl.collisions_disabled());

        let skip = FrameInput {
            skip_level_pressed: true,
            ..FrameInput::default()
        };
        stage.calls.clear();
        ctrl.update(&skip, &mut rocket, &mut stage, 0.016);
        assert_eq!(stage.calls.last(), Some(&Call::Load(SceneRequest::Next)));
    }

    #[test]
    fn test_debug_keys_still_work_while_transcending() {
        let mut ctrl = controller(InputDevice::Keyboard);
        let mut rocket = Rocket::new(Vec2::ZERO);
        let mut stage = RecordingStage::default();
        ctrl.on_collision_enter(SurfaceTag::Hazard, &mut stage);

        stage.calls.clear();
        let skip = FrameInput {
            skip_level_pressed: true,
            ..FrameInput::default()
        };
        ctrl.update(&skip, &mut rocket, &mut stage, 0.016);
        assert_eq!(stage.calls, vec![Call::Load(SceneRequest::Next)]);
    }

    #[test]
    fn test_debug_keys_disabled() {
        let mut ctrl = RocketController::new(Tuning::default(), InputDevice::Keyboard, false);
        let mut rocket = Rocket::new(Vec2::ZERO);
        let mut stage = RecordingStage::default();
        let input = FrameInput {
            thrust_held: true,
            skip_level_pressed: true,
            toggle_collisions_pressed: true,
            ..FrameInput::default()
        };

        ctrl.update(&input, &mut rocket, &mut stage, 0.016);

        assert!(!ctrl.collisions_disabled());
        assert!(!stage.calls.contains(&Call::Load(SceneRequest::Next)));
    }
}
