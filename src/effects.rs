use crate::rocket::Rocket;
use macroquad::prelude::*;

/// Screen pixels per unit of shake magnitude.
const SHAKE_PIXELS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Exhaust, emitted continuously while playing.
    Jet,
    /// Burst of sparks on reaching the landing pad.
    Success,
    /// Burst of debris on a crash.
    Crush,
}

// Single spark, exhaust puff or piece of debris
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: Color,
}

impl Particle {
    /// 1.0 when fresh, 0.0 when about to vanish.
    pub fn fade(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

// One particle system
#[derive(Debug, Clone)]
pub struct Emitter {
    kind: Effect,
    playing: bool,
    pending_burst: bool,
    spawn_budget: f32,
    particles: Vec<Particle>,
}

impl Emitter {
    pub fn new(kind: Effect) -> Self {
        Self {
            kind,
            playing: false,
            pending_burst: false,
            spawn_budget: 0.0,
            particles: Vec::new(),
        }
    }

    /// Starting an emitter that is already playing does nothing.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.pending_burst = self.kind != Effect::Jet;
    }

    /// Stops emitting; live particles run out their life.
    pub fn stop(&mut self) {
        self.playing = false;
        self.pending_burst = false;
        self.spawn_budget = 0.0;
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// `origin` is where new particles appear, `heading` the way they fly.
    pub fn update(&mut self, origin: Vec2, heading: Vec2, dt: f32) {
        self.particles.retain_mut(|p| {
            p.pos += p.velocity * dt;
            p.velocity *= 1.0 - (1.5 * dt).min(1.0);
            p.life -= dt;
            p.size += dt * 6.0;
            p.life > 0.0
        });

        match self.kind {
            Effect::Jet if self.playing => {
                self.spawn_budget += dt * 90.0;
                while self.spawn_budget >= 1.0 {
                    self.spawn_budget -= 1.0;
                    self.particles.push(exhaust(origin, heading));
                }
            }
            Effect::Jet => {}
            Effect::Success | Effect::Crush => {
                if self.pending_burst {
                    self.pending_burst = false;
                    for _ in 0..60 {
                        self.particles.push(burst(self.kind, origin));
                    }
                } else if self.playing && self.particles.is_empty() {
                    // a one-shot system finishes once its burst has died out
                    self.playing = false;
                }
            }
        }
    }
}

fn exhaust(origin: Vec2, heading: Vec2) -> Particle {
    let spread = rand::gen_range(-0.35, 0.35);
    let (sin, cos) = f32::sin_cos(spread);
    let dir = Vec2::new(heading.x * cos - heading.y * sin, heading.x * sin + heading.y * cos);
    let max_life = rand::gen_range(0.25, 0.5);

    Particle {
        pos: origin,
        velocity: dir * rand::gen_range(160.0, 260.0),
        life: max_life,
        max_life,
        size: rand::gen_range(2.0, 4.0),
        color: Color::new(1.0, rand::gen_range(0.47, 0.78), 0.2, 1.0),
    }
}

fn burst(kind: Effect, origin: Vec2) -> Particle {
    let angle = rand::gen_range(0.0, std::f32::consts::TAU);
    let max_life = rand::gen_range(0.6, 1.4);
    let (speed, color) = match kind {
        Effect::Success => (
            rand::gen_range(60.0, 220.0),
            Color::new(0.4, 1.0, rand::gen_range(0.6, 0.86), 1.0),
        ),
        _ => (
            rand::gen_range(80.0, 320.0),
            Color::new(1.0, rand::gen_range(0.3, 0.7), 0.15, 1.0),
        ),
    };

    Particle {
        pos: origin,
        velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
        life: max_life,
        max_life,
        size: rand::gen_range(2.0, 5.0),
        color,
    }
}

/// The three particle systems attached to the rocket.
#[derive(Debug, Clone)]
pub struct Effects {
    jet: Emitter,
    success: Emitter,
    crush: Emitter,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects {
    pub fn new() -> Self {
        Self {
            jet: Emitter::new(Effect::Jet),
            success: Emitter::new(Effect::Success),
            crush: Emitter::new(Effect::Crush),
        }
    }

    #[cfg(test)]
    pub fn emitter(&self, effect: Effect) -> &Emitter {
        match effect {
            Effect::Jet => &self.jet,
            Effect::Success => &self.success,
            Effect::Crush => &self.crush,
        }
    }

    fn emitter_mut(&mut self, effect: Effect) -> &mut Emitter {
        match effect {
            Effect::Jet => &mut self.jet,
            Effect::Success => &mut self.success,
            Effect::Crush => &mut self.crush,
        }
    }

    pub fn play(&mut self, effect: Effect) {
        self.emitter_mut(effect).play();
    }

    pub fn stop(&mut self, effect: Effect) {
        self.emitter_mut(effect).stop();
    }

    pub fn update(&mut self, rocket: &Rocket, dt: f32) {
        self.jet.update(rocket.nozzle(), -rocket.forward(), dt);
        self.success.update(rocket.position, rocket.forward(), dt);
        self.crush.update(rocket.position, rocket.forward(), dt);
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.jet
            .particles()
            .iter()
            .chain(self.success.particles())
            .chain(self.crush.particles())
    }
}

/// Parameters of a single camera shake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shake {
    pub magnitude: f32,
    /// Oscillations per second.
    pub roughness: f32,
    pub fade_in: f32,
    pub fade_out: f32,
}

impl Shake {
    pub const EXPLOSION: Shake = Shake {
        magnitude: 4.0,
        roughness: 7.0,
        fade_in: 0.0,
        fade_out: 3.0,
    };
}

#[derive(Debug, Clone, Copy)]
struct ShakeInstance {
    shake: Shake,
    elapsed: f32,
    seed: f32,
}

impl ShakeInstance {
    fn amplitude(&self) -> f32 {
        let Shake {
            fade_in, fade_out, ..
        } = self.shake;
        if self.elapsed < fade_in {
            self.elapsed / fade_in
        } else if fade_out > 0.0 {
            (1.0 - (self.elapsed - fade_in) / fade_out).max(0.0)
        } else {
            0.0
        }
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.shake.fade_in + self.shake.fade_out
    }
}

// Running shakes, summed into one view offset
#[derive(Debug, Clone, Default)]
pub struct CameraShake {
    active: Vec<ShakeInstance>,
}

impl CameraShake {
    pub fn shake_once(&mut self, shake: Shake) {
        self.active.push(ShakeInstance {
            shake,
            elapsed: 0.0,
            seed: rand::gen_range(0.0, 100.0),
        });
    }

    pub fn update(&mut self, dt: f32) {
        for instance in &mut self.active {
            instance.elapsed += dt;
        }
        self.active.retain(|instance| !instance.finished());
    }

    #[cfg(test)]
    pub fn is_shaking(&self) -> bool {
        !self.active.is_empty()
    }

    /// Current view displacement in screen pixels.
    pub fn offset(&self) -> Vec2 {
        self.active
            .iter()
            .map(|instance| {
                let t = instance.elapsed * instance.shake.roughness + instance.seed;
                let wobble = Vec2::new(
                    (t * 6.1).sin() * 0.6 + (t * 2.3).sin() * 0.4,
                    (t * 5.3).cos() * 0.6 + (t * 3.7).sin() * 0.4,
                );
                wobble * instance.shake.magnitude * SHAKE_PIXELS * instance.amplitude()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_emits_only_while_playing() {
        let mut jet = Emitter::new(Effect::Jet);
        jet.update(Vec2::ZERO, Vec2::Y, 0.1);
        assert!(jet.particles().is_empty());

        jet.play();
        jet.update(Vec2::ZERO, Vec2::Y, 0.1);
        let emitted = jet.particles().len();
        assert!(emitted > 0);

        jet.stop();
        assert!(!jet.is_playing());
        jet.update(Vec2::ZERO, Vec2::Y, 0.01);
        assert!(jet.particles().len() <= emitted);

        // everything burns out within the longest particle life
        jet.update(Vec2::ZERO, Vec2::Y, 1.0);
        assert!(jet.particles().is_empty());
    }

    #[test]
    fn test_replaying_a_burst_does_not_restart_it() {
        let mut crush = Emitter::new(Effect::Crush);
        crush.play();
        crush.update(Vec2::ZERO, Vec2::Y, 0.016);
        let count = crush.particles().len();
        assert_eq!(count, 60);

        crush.play();
        crush.update(Vec2::ZERO, Vec2::Y, 0.016);
        assert_eq!(crush.particles().len(), count);
    }

    #[test]
    fn test_burst_stops_playing_when_spent() {
        let mut success = Emitter::new(Effect::Success);
        success.play();
        success.update(Vec2::ZERO, Vec2::Y, 0.016);
        assert!(success.is_playing());

        success.update(Vec2::ZERO, Vec2::Y, 2.0);
        success.update(Vec2::ZERO, Vec2::Y, 0.016);
        assert!(success.particles().is_empty());
        assert!(!success.is_playing());
    }

    #[test]
    fn test_shake_fades_out() {
        let mut camera = CameraShake::default();
        assert_eq!(camera.offset(), Vec2::ZERO);

        camera.shake_once(Shake::EXPLOSION);
        assert!(camera.is_shaking());

        camera.update(1.5);
        let limit = Shake::EXPLOSION.magnitude * SHAKE_PIXELS * 0.5;
        assert!(camera.offset().x.abs() <= limit + 1e-3);
        assert!(camera.offset().y.abs() <= limit + 1e-3);

        camera.update(1.6);
        assert!(!camera.is_shaking());
        assert_eq!(camera.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_fade_in_ramps_up() {
        let instance = ShakeInstance {
            shake: Shake {
                magnitude: 1.0,
                roughness: 1.0,
                fade_in: 1.0,
                fade_out: 1.0,
            },
            elapsed: 0.25,
            seed: 0.0,
        };
        assert!((instance.amplitude() - 0.25).abs() < 1e-6);
    }
}
