//! Closed kind enums.
//!
//! Every kind that arrives as a string from configuration is parsed through
//! an explicit name table. Lookup is case-insensitive and ignores
//! surrounding whitespace; anything else is an [`UnknownKind`].

use serde::{Deserialize, Serialize};

use crate::error::UnknownKind;

/// Declares a kind enum together with its canonical name table.
macro_rules! named_kind {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical upper-case name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Look up a variant by name, case-insensitively.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.name().eq_ignore_ascii_case(name))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| UnknownKind {
                    category: stringify!($name),
                    name: s.to_string(),
                })
            }
        }
    };
}

named_kind! {
    /// Block and item materials known to the anchor system.
    ///
    /// Anchor blocks and activation items share one namespace, as they do in
    /// the host.
    pub enum Material {
        Air => "AIR",
        Stone => "STONE",
        Dirt => "DIRT",
        GrassBlock => "GRASS_BLOCK",
        Cobblestone => "COBBLESTONE",
        OakPlanks => "OAK_PLANKS",
        Glass => "GLASS",
        Obsidian => "OBSIDIAN",
        CryingObsidian => "CRYING_OBSIDIAN",
        Beacon => "BEACON",
        Lodestone => "LODESTONE",
        RespawnAnchor => "RESPAWN_ANCHOR",
        Conduit => "CONDUIT",
        EndPortalFrame => "END_PORTAL_FRAME",
        AmethystBlock => "AMETHYST_BLOCK",
        Clock => "CLOCK",
        Compass => "COMPASS",
        RecoveryCompass => "RECOVERY_COMPASS",
        EnderPearl => "ENDER_PEARL",
        EnderEye => "ENDER_EYE",
        AmethystShard => "AMETHYST_SHARD",
        NetherStar => "NETHER_STAR",
        BlazeRod => "BLAZE_ROD",
        Stick => "STICK",
    }
}

named_kind! {
    /// The configured flavour of time distortion.
    #[derive(Default)]
    pub enum DistortionKind {
        /// Entities near the anchor are slowed down.
        #[default]
        Slow => "SLOW",
        /// Entities near the anchor are sped up.
        Fast => "FAST",
    }
}

impl DistortionKind {
    /// The status effect this distortion applies.
    #[must_use]
    pub const fn effect(self) -> StatusEffect {
        match self {
            DistortionKind::Slow => StatusEffect::Slowness,
            DistortionKind::Fast => StatusEffect::Speed,
        }
    }
}

named_kind! {
    /// Status effects the host can apply to living entities.
    pub enum StatusEffect {
        Slowness => "SLOWNESS",
        Speed => "SPEED",
    }
}

named_kind! {
    /// Decorative particle kinds.
    #[derive(Default)]
    pub enum ParticleKind {
        #[default]
        Portal => "PORTAL",
        ReversePortal => "REVERSE_PORTAL",
        EndRod => "END_ROD",
        Enchant => "ENCHANT",
        Witch => "WITCH",
        Smoke => "SMOKE",
        LargeSmoke => "LARGE_SMOKE",
        Flame => "FLAME",
        SoulFireFlame => "SOUL_FIRE_FLAME",
        Cloud => "CLOUD",
        DragonBreath => "DRAGON_BREATH",
        TotemOfUndying => "TOTEM_OF_UNDYING",
        Glow => "GLOW",
        ElectricSpark => "ELECTRIC_SPARK",
        Note => "NOTE",
        HappyVillager => "HAPPY_VILLAGER",
        Crit => "CRIT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Material::from_name("beacon"), Some(Material::Beacon));
        assert_eq!(Material::from_name(" Clock "), Some(Material::Clock));
        assert_eq!(
            ParticleKind::from_name("reverse_portal"),
            Some(ParticleKind::ReversePortal)
        );
        assert_eq!(DistortionKind::from_name("fast"), Some(DistortionKind::Fast));
    }

    #[test]
    fn test_unknown_name_is_error() {
        let err = "BEACONN".parse::<Material>().unwrap_err();
        assert_eq!(err.category, "Material");
        assert_eq!(err.name, "BEACONN");
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in Material::ALL.iter().enumerate() {
            for b in &Material::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn test_distortion_maps_to_effect() {
        assert_eq!(DistortionKind::Slow.effect(), StatusEffect::Slowness);
        assert_eq!(DistortionKind::Fast.effect(), StatusEffect::Speed);
    }

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(ParticleKind::TotemOfUndying.to_string(), "TOTEM_OF_UNDYING");
    }
}
