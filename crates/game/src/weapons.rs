//! Weapon types and their static definitions.

/// Weapon types a client can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponType {
    Knife,
    Pistol,
    MachineGun,
    Deagle,
    Shotgun,
    AssaultRifle,
    GrenadeLauncher,
    RocketLauncher,
    Plasma,
    BubbleGun,
    Laser,
    Sniper,
    Railgun,
    Rifle,
}

pub const WEAPON_COUNT: usize = 14;

impl WeaponType {
    pub const ALL: [WeaponType; WEAPON_COUNT] = [
        WeaponType::Knife,
        WeaponType::Pistol,
        WeaponType::MachineGun,
        WeaponType::Deagle,
        WeaponType::Shotgun,
        WeaponType::AssaultRifle,
        WeaponType::GrenadeLauncher,
        WeaponType::RocketLauncher,
        WeaponType::Plasma,
        WeaponType::BubbleGun,
        WeaponType::Laser,
        WeaponType::Sniper,
        WeaponType::Railgun,
        WeaponType::Rifle,
    ];

    /// Slot in per-weapon stat arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// What the trigger is doing this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeaponState {
    #[default]
    Ready,
    Firing,
    Reloading,
}

/// Milliseconds of zooming before bullets lose their hip-fire spread.
pub const ZOOM_TIME: i64 = 250;

/// Static weapon parameters.
///
/// `range` is a distance for hit-scan weapons and a lifetime in milliseconds
/// for projectiles. `spread` is the slash half-angle in degrees for the
/// knife, the sunflower scale in units for the shotgun and the outward tilt
/// of ring bubbles for the bubble gun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponDef {
    pub name: &'static str,
    pub speed: f32,
    pub range: f32,
    pub damage: f32,
    pub min_damage: f32,
    pub knockback: f32,
    pub min_knockback: f32,
    pub splash_radius: f32,
    pub spread: f32,
    /// Hip-fire spread cone in degrees, shrinking to zero while zoomed.
    pub zoom_spread: f32,
    pub projectile_count: u32,
}

const HITSCAN: WeaponDef = WeaponDef {
    name: "",
    speed: 0.0,
    range: 8192.0,
    damage: 0.0,
    min_damage: 0.0,
    knockback: 0.0,
    min_knockback: 0.0,
    splash_radius: 0.0,
    spread: 0.0,
    zoom_spread: 0.0,
    projectile_count: 1,
};

static WEAPON_DEFS: [WeaponDef; WEAPON_COUNT] = [
    WeaponDef {
        name: "knife",
        range: 90.0,
        damage: 25.0,
        knockback: 50.0,
        spread: 40.0,
        projectile_count: 7,
        ..HITSCAN
    },
    WeaponDef {
        name: "pistol",
        damage: 20.0,
        knockback: 40.0,
        zoom_spread: 2.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "machinegun",
        damage: 10.0,
        knockback: 15.0,
        zoom_spread: 3.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "deagle",
        damage: 40.0,
        knockback: 60.0,
        zoom_spread: 4.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "shotgun",
        range: 1000.0,
        damage: 5.0,
        knockback: 8.0,
        spread: 20.0,
        projectile_count: 25,
        ..HITSCAN
    },
    WeaponDef {
        name: "assaultrifle",
        damage: 12.0,
        knockback: 20.0,
        zoom_spread: 2.5,
        ..HITSCAN
    },
    WeaponDef {
        name: "grenadelauncher",
        speed: 1000.0,
        range: 1250.0,
        damage: 80.0,
        min_damage: 15.0,
        knockback: 100.0,
        min_knockback: 10.0,
        splash_radius: 150.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "rocketlauncher",
        speed: 1150.0,
        range: 10000.0,
        damage: 80.0,
        min_damage: 15.0,
        knockback: 100.0,
        min_knockback: 10.0,
        splash_radius: 150.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "plasma",
        speed: 1700.0,
        range: 5000.0,
        damage: 14.0,
        min_damage: 5.0,
        knockback: 20.0,
        min_knockback: 1.0,
        splash_radius: 80.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "bubblegun",
        speed: 1000.0,
        range: 1200.0,
        damage: 20.0,
        min_damage: 5.0,
        knockback: 30.0,
        min_knockback: 5.0,
        splash_radius: 80.0,
        spread: 0.1,
        projectile_count: 5,
        ..HITSCAN
    },
    WeaponDef {
        name: "laser",
        range: 700.0,
        damage: 8.0,
        knockback: 14.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "sniper",
        damage: 75.0,
        knockback: 80.0,
        zoom_spread: 10.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "railgun",
        damage: 60.0,
        knockback: 60.0,
        ..HITSCAN
    },
    WeaponDef {
        name: "rifle",
        speed: 6000.0,
        range: 10000.0,
        damage: 45.0,
        knockback: 30.0,
        ..HITSCAN
    },
];

pub fn weapon_def(weapon: WeaponType) -> &'static WeaponDef {
    &WEAPON_DEFS[weapon.index()]
}
