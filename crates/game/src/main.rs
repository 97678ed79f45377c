//! weaponsim - headless weapon simulation
//!
//! Builds a small arena, fires every weapon at an enemy, steps the
//! simulation and feeds the resulting impact marks and sprays through the
//! tiled decal pass into an in-memory GPU target.

use anyhow::Result;
use engine_core::{angle_vectors, vec_to_angles, Vec3, Vec4};
use game::{build_arena, weapon_def, Arena, Game, GameConfig, GameEvent, WeaponState, WeaponType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::{Camera, CpuUpload, DecalPipeline, DecalStore, MaterialTable, SprayStore};

/// Server frames stepped after each shot.
const FRAMES_PER_WEAPON: usize = 40;
/// Impact marks fade after this long.
const MARK_DURATION_MS: i64 = 10_000;
const SPRAY_MATERIAL: &str = "sprays/default";

/// A mark left by an impact event, redrawn every frame until it expires.
struct ImpactDecal {
    origin: Vec3,
    normal: Vec3,
    radius: f32,
    angle: f32,
    material: &'static str,
    spawn_time: i64,
}

/// Client-side view of the simulation: marks, sprays and the decal pass.
struct DecalView {
    camera: Camera,
    materials: MaterialTable,
    marks: Vec<ImpactDecal>,
    sprays: SprayStore,
    decals: DecalStore,
    pipeline: DecalPipeline,
    gpu: CpuUpload,
    rng: StdRng,
    peak_decals: usize,
    peak_tiles: usize,
}

impl DecalView {
    fn new(seed: u64) -> Self {
        let mut camera = Camera::default();
        camera.set_viewport(1280, 720);
        Self {
            camera,
            materials: MaterialTable::with_builtin(),
            marks: Vec::new(),
            sprays: SprayStore::new(),
            decals: DecalStore::new(),
            pipeline: DecalPipeline::new(),
            gpu: CpuUpload::new(),
            rng: StdRng::seed_from_u64(seed),
            peak_decals: 0,
            peak_tiles: 0,
        }
    }

    fn add_marks(&mut self, events: &[GameEvent]) {
        for event in events {
            let Some(mark) = event.kind.impact_mark() else {
                continue;
            };
            // Events without a surface (mid-air explosions) leave nothing.
            if event.normal == Vec3::ZERO {
                continue;
            }
            self.marks.push(ImpactDecal {
                origin: event.origin,
                normal: event.normal,
                radius: mark.radius,
                angle: self.rng.gen_range(0.0..std::f32::consts::TAU),
                material: mark.material,
                spawn_time: event.time,
            });
        }
    }

    /// Rebuild this frame's decal list and run it through culling and upload.
    fn render(&mut self, now: i64, eye: Vec3, view_angles: Vec3) -> Result<()> {
        self.camera.position = eye;
        self.camera.angles = view_angles;

        self.decals.clear();
        self.marks.retain(|m| now - m.spawn_time < MARK_DURATION_MS);
        for mark in &self.marks {
            self.decals.add_decal(
                mark.origin,
                mark.normal,
                mark.radius,
                mark.angle,
                mark.material,
                Vec4::ONE,
                &self.materials,
            );
        }
        self.sprays.draw_sprays(now, &mut self.decals, &self.materials);

        let stats = self
            .pipeline
            .add_decals_to_pipeline(&self.camera, &self.decals, &mut self.gpu)?;
        self.peak_decals = self.peak_decals.max(stats.decals);
        self.peak_tiles = self.peak_tiles.max(stats.occupied_tiles);
        log::trace!(
            "frame {}: {} decals, {}/{} tiles occupied, {} indices",
            now,
            stats.decals,
            stats.occupied_tiles,
            stats.tiles,
            stats.indices
        );
        Ok(())
    }
}

fn eye_and_view(game: &Game, arena: &Arena) -> (Vec3, Vec3) {
    let e = &game.entities[arena.shooter];
    let client = e.client.as_ref();
    let view_height = client.map_or(0.0, |c| c.view_height);
    let angles = client.map_or(Vec3::ZERO, |c| c.view_angles);
    (e.origin + Vec3::Z * view_height, angles)
}

fn set_weapon_state(game: &mut Game, arena: &Arena, state: WeaponState) {
    if let Some(client) = game.entities[arena.shooter].client.as_mut() {
        client.weapon_state = state;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    log::info!("Starting weaponsim (seed {:#x})", config.seed);

    let mut game = Game::new(config);
    let arena = build_arena(&mut game)?;
    let mut view = DecalView::new(game.config.seed);

    // Tag the back wall first.
    let (spray_point, spray_normal) = arena.spray_wall;
    let (eye, _) = eye_and_view(&game, &arena);
    let spray_angles = vec_to_angles(spray_point - eye);
    view.sprays.add_spray(
        spray_point,
        spray_normal,
        angle_vectors(spray_angles).up,
        SPRAY_MATERIAL,
        game.now(),
        &mut view.rng,
    );

    for weapon in WeaponType::ALL {
        // Re-aim at whatever is left of the enemy each round.
        let (eye, _) = eye_and_view(&game, &arena);
        let target = game.entities[arena.enemy].origin;
        let angles = vec_to_angles(target - eye);
        let origin = game.entities[arena.shooter].origin;
        game.place_client(arena.shooter, origin, angles);

        set_weapon_state(&mut game, &arena, WeaponState::Firing);
        log::info!("firing {}", weapon_def(weapon).name);
        game.fire_weapon(arena.shooter, weapon);

        for frame in 0..FRAMES_PER_WEAPON {
            // The laser is held down for a few frames, everything else is a single shot.
            if weapon == WeaponType::Laser && frame < 5 {
                game.fire_weapon(arena.shooter, weapon);
            } else if frame == 5 {
                set_weapon_state(&mut game, &arena, WeaponState::Ready);
            }
            game.run_frame();

            let events = game.take_events();
            view.add_marks(&events);
            let (eye, angles) = eye_and_view(&game, &arena);
            view.render(game.now(), eye, angles)?;
        }
    }

    let shooter = &game.entities[arena.shooter];
    if let Some(client) = &shooter.client {
        let stats = &client.stats;
        let shots: u32 = stats.accuracy_shots.iter().sum();
        let hits: u32 = stats.accuracy_hits.iter().sum();
        log::info!(
            "shooter: {} shots, {} hits, {:.0} damage given, {} frags",
            shots,
            hits,
            stats.damage_given,
            stats.frags
        );
    }
    for (name, id) in [
        ("teammate", arena.teammate),
        ("enemy", arena.enemy),
        ("dummy", arena.dummy),
    ] {
        log::info!("{}: health {:.0}", name, game.entities[id].health);
    }
    log::info!(
        "decals: {} marks live, {} sprays, peak {} decals over {} tiles, {} buffer allocations",
        view.marks.len(),
        view.sprays.len(),
        view.peak_decals,
        view.peak_tiles,
        view.gpu.allocations
    );

    Ok(())
}
