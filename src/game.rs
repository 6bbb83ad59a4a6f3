use crate::audio::{AudioBank, Clip};
use crate::collision::{self, ContactTracker};
use crate::config::GameConfig;
use crate::controller::{RocketController, SceneRequest, Stage};
use crate::effects::{CameraShake, Effect, Effects, Shake};
use crate::input::{FrameInput, InputDevice};
use crate::level::{Level, LevelSet, SurfaceTag, WORLD_SIZE};
use crate::rocket::Rocket;
use macroquad::prelude::*;
use tracing::{info, warn};

/// Longest step the simulation takes in one frame.
const MAX_STEP: f32 = 1.0 / 30.0;

// Star for background atmosphere
struct Star {
    pos: Vec2,
    velocity: Vec2,
    size: f32,
    alpha: f32,
}

/// Host services the controller talks to.
pub struct Host {
    pub audio: AudioBank,
    pub effects: Effects,
    pub camera: CameraShake,
    scene_request: Option<SceneRequest>,
}

impl Host {
    pub fn new(audio: AudioBank) -> Self {
        Self {
            audio,
            effects: Effects::new(),
            camera: CameraShake::default(),
            scene_request: None,
        }
    }

    fn take_scene_request(&mut self) -> Option<SceneRequest> {
        self.scene_request.take()
    }
}

impl Stage for Host {
    fn is_audio_playing(&self) -> bool {
        self.audio.is_playing()
    }

    fn stop_audio(&mut self) {
        self.audio.stop();
    }

    fn play_one_shot(&mut self, clip: Clip) {
        self.audio.play_one_shot(clip);
    }

    fn play_effect(&mut self, effect: Effect) {
        self.effects.play(effect);
    }

    fn stop_effect(&mut self, effect: Effect) {
        self.effects.stop(effect);
    }

    fn shake_once(&mut self, shake: Shake) {
        self.camera.shake_once(shake);
    }

    fn load_scene(&mut self, request: SceneRequest) {
        // first request in a frame wins
        self.scene_request.get_or_insert(request);
    }
}

/// Maps world coordinates onto the window.
#[derive(Debug, Clone, Copy)]
struct View {
    scale: f32,
    offset: Vec2,
}

impl View {
    fn fit(screen: Vec2, shake: Vec2) -> Self {
        let scale = (screen.x / WORLD_SIZE.x).min(screen.y / WORLD_SIZE.y);
        let offset = (screen - WORLD_SIZE * scale) / 2.0 + shake;
        Self { scale, offset }
    }

    fn point(&self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }

    fn len(&self, l: f32) -> f32 {
        l * self.scale
    }
}

pub struct GameState {
    config: GameConfig,
    levels: LevelSet,
    level_index: usize,
    level: Level,
    rocket: Rocket,
    controller: RocketController,
    contacts: ContactTracker,
    host: Host,

    stars: Vec<Star>,
    time: f32,
    level_time: f32,
}

impl GameState {
    pub fn new(config: GameConfig, audio: AudioBank) -> Self {
        let device = InputDevice::detect(config.input.device);
        info!(?device, debug_keys = config.debug.keys_enabled(), "Input configured");

        let levels = LevelSet::builtin();
        let level = levels.first().clone();

        let mut stars = Vec::new();
        for _ in 0..120 {
            stars.push(Star {
                pos: Vec2::new(
                    rand::gen_range(0.0, WORLD_SIZE.x),
                    rand::gen_range(0.0, WORLD_SIZE.y),
                ),
                velocity: Vec2::new(rand::gen_range(-6.0, 6.0), rand::gen_range(-3.0, 3.0)),
                size: rand::gen_range(0.8, 2.2),
                alpha: rand::gen_range(0.1, 0.4),
            });
        }

        Self {
            rocket: Rocket::new(level.spawn),
            controller: RocketController::new(config.tuning, device, config.debug.keys_enabled()),
            config,
            levels,
            level_index: 0,
            level,
            contacts: ContactTracker::new(),
            host: Host::new(audio),
            stars,
            time: 0.0,
            level_time: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let input = FrameInput::poll();
        self.step(&input, dt);
    }

    /// One simulation frame with the given input.
    pub fn step(&mut self, input: &FrameInput, dt: f32) {
        let dt = dt.min(MAX_STEP);
        self.time += dt;
        self.level_time += dt;

        self.controller.update(input, &mut self.rocket, &mut self.host, dt);
        self.controller.tick(dt, &mut self.host);

        self.rocket.integrate(&self.config.physics, dt);
        let touching = collision::resolve(&mut self.rocket, &self.level.blocks, &self.config.physics);
        for contact in self.contacts.begin(&touching) {
            self.controller.on_collision_enter(contact.tag, &mut self.host);
        }

        self.host.effects.update(&self.rocket, dt);
        self.host.camera.update(dt);

        for star in &mut self.stars {
            star.pos += star.velocity * dt;
            if star.pos.x < 0.0 { star.pos.x = WORLD_SIZE.x; }
            if star.pos.x > WORLD_SIZE.x { star.pos.x = 0.0; }
            if star.pos.y < 0.0 { star.pos.y = WORLD_SIZE.y; }
            if star.pos.y > WORLD_SIZE.y { star.pos.y = 0.0; }

            // Gentle twinkle
            star.alpha = 0.25 + (self.time * 1.5 + star.pos.x * 0.02).sin() * 0.12;
        }

        if let Some(request) = self.host.take_scene_request() {
            self.load_scene(request);
        }
    }

    fn load_scene(&mut self, request: SceneRequest) {
        let index = match request {
            SceneRequest::Next => self.levels.next_index(self.level_index),
            SceneRequest::First => 0,
        };
        let Some(level) = self.levels.get(index) else {
            warn!(index, "Requested level does not exist");
            return;
        };

        info!(index, name = level.name, "Loading level");
        self.level_index = index;
        self.level = level.clone();
        self.rocket = Rocket::new(self.level.spawn);
        self.controller = RocketController::new(
            self.config.tuning,
            self.controller.device(),
            self.config.debug.keys_enabled(),
        );
        self.contacts.clear();
        self.host.audio.stop();
        self.host.effects = Effects::new();
        self.level_time = 0.0;
    }

    pub fn draw(&self) {
        clear_background(Color::from_rgba(5, 5, 15, 255));

        let view = View::fit(
            Vec2::new(screen_width(), screen_height()),
            self.host.camera.offset(),
        );

        for star in &self.stars {
            let p = view.point(star.pos);
            draw_circle(
                p.x,
                p.y,
                view.len(star.size),
                Color::from_rgba(100, 120, 200, (star.alpha * 255.0) as u8),
            );
        }

        for block in &self.level.blocks {
            self.draw_block(&view, block.rect, block.tag);
        }

        for particle in self.host.effects.particles() {
            let p = view.point(particle.pos);
            let mut color = particle.color;
            color.a = particle.fade();
            draw_circle(p.x, p.y, view.len(particle.size), color);
        }

        self.draw_rocket(&view);
        self.draw_ui();
    }

    fn draw_block(&self, view: &View, rect: Rect, tag: SurfaceTag) {
        let (glow, body, edge) = match tag {
            SurfaceTag::Friendly => (
                Color::from_rgba(60, 140, 255, 40),
                Color::from_rgba(50, 110, 200, 255),
                Color::from_rgba(140, 200, 255, 255),
            ),
            SurfaceTag::Finish => {
                let pulse = (self.time * 3.0).sin() * 0.3 + 0.7;
                (
                    Color::from_rgba(100, 255, 150, (pulse * 70.0) as u8),
                    Color::from_rgba(60, 200, 110, 255),
                    Color::from_rgba(160, 255, 190, 255),
                )
            }
            SurfaceTag::Hazard => (
                Color::from_rgba(80, 40, 120, 30),
                Color::from_rgba(70, 40, 100, 255),
                Color::from_rgba(140, 80, 200, 255),
            ),
        };

        let top_left = view.point(rect.point());
        let size = rect.size() * view.scale;
        let pad = view.len(6.0);

        // Outer glow
        draw_rectangle(top_left.x - pad, top_left.y - pad, size.x + 2.0 * pad, size.y + 2.0 * pad, glow);
        draw_rectangle(top_left.x, top_left.y, size.x, size.y, body);
        draw_rectangle_lines(top_left.x, top_left.y, size.x, size.y, 2.0, edge);
    }

    fn draw_rocket(&self, view: &View) {
        let rocket = &self.rocket;
        let at = |x: f32, y: f32| view.point(rocket.to_world(Vec2::new(x, y)));
        let center = view.point(rocket.position);

        let flash = if self.controller.collisions_disabled() {
            ((self.time * 8.0).sin() * 60.0 + 180.0) as u8
        } else {
            255
        };

        // Soft glow
        draw_circle(center.x, center.y, view.len(46.0), Color::from_rgba(80, 180, 255, 20));
        draw_circle(center.x, center.y, view.len(36.0), Color::from_rgba(100, 200, 255, 35));

        // Fins
        draw_triangle(at(-10.0, 8.0), at(-17.0, 28.0), at(-10.0, 24.0), Color::from_rgba(220, 80, 80, flash));
        draw_triangle(at(10.0, 8.0), at(17.0, 28.0), at(10.0, 24.0), Color::from_rgba(220, 80, 80, flash));

        // Body
        let nose = at(0.0, -28.0);
        let shoulder_left = at(-10.0, -8.0);
        let shoulder_right = at(10.0, -8.0);
        let base_left = at(-10.0, 26.0);
        let base_right = at(10.0, 26.0);
        draw_triangle(nose, shoulder_left, shoulder_right, Color::from_rgba(240, 240, 250, flash));
        draw_triangle(shoulder_left, shoulder_right, base_left, Color::from_rgba(200, 210, 230, flash));
        draw_triangle(shoulder_right, base_right, base_left, Color::from_rgba(200, 210, 230, flash));

        // Edges
        let edge = Color::from_rgba(150, 220, 255, flash);
        for (a, b) in [
            (nose, shoulder_left),
            (nose, shoulder_right),
            (shoulder_left, base_left),
            (shoulder_right, base_right),
            (base_left, base_right),
        ] {
            draw_line(a.x, a.y, b.x, b.y, view.len(2.0), edge);
        }

        // Window
        let window = at(0.0, -4.0);
        draw_circle(window.x, window.y, view.len(5.0), Color::from_rgba(100, 220, 255, 200));
        draw_circle(window.x, window.y, view.len(3.0), Color::from_rgba(200, 245, 255, flash));
    }

    fn draw_ui(&self) {
        let font_size = 30.0;

        // Top-left: level
        let level_text = format!(
            "LEVEL {}/{}  {}",
            self.level_index + 1,
            self.levels.len(),
            self.level.name.to_uppercase()
        );
        draw_text(&level_text, 30.0, 40.0, font_size, Color::from_rgba(100, 255, 150, 255));

        // Top-right: timer
        let minutes = (self.level_time / 60.0) as i32;
        let seconds = (self.level_time % 60.0) as i32;
        let time_text = format!("{:02}:{:02}", minutes, seconds);
        let text_width = measure_text(&time_text, None, font_size as u16, 1.0).width;
        draw_text(
            &time_text,
            screen_width() - text_width - 30.0,
            40.0,
            font_size,
            Color::from_rgba(200, 220, 255, 200),
        );

        if self.controller.collisions_disabled() {
            draw_text("COLLISIONS OFF", 30.0, 70.0, 20.0, Color::from_rgba(255, 200, 100, 255));
        }

        if self.level_time < 5.0 && !self.controller.is_transcending() {
            let hint = match self.controller.device() {
                InputDevice::Keyboard => "SPACE to thrust, A / D to rotate",
                InputDevice::Touch => "Right half to thrust, left half to rotate",
            };
            let hint_width = measure_text(hint, None, 20, 1.0).width;
            let alpha = ((self.time * 2.0).sin() * 127.0 + 128.0) as u8;
            draw_text(
                hint,
                (screen_width() - hint_width) / 2.0,
                screen_height() - 80.0,
                20.0,
                Color::from_rgba(255, 200, 100, alpha),
            );
        }
    }
}
