//! Static registry of visualizers and their tunable parameters.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;

/// Parameter name to value, in declaration order.
pub type ParamValues = IndexMap<&'static str, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualizerId {
    GridWalk,
    RandomWalk,
    MatrixRain,
    ParticleSwarm,
    Starfield,
    Ripples,
}

impl VisualizerId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GridWalk => "grid-walk",
            Self::RandomWalk => "random-walk",
            Self::MatrixRain => "matrix-rain",
            Self::ParticleSwarm => "particle-swarm",
            Self::Starfield => "starfield",
            Self::Ripples => "ripples",
        }
    }
}

impl fmt::Display for VisualizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown visualizer `{0}`")]
pub struct UnknownVisualizer(pub String);

impl FromStr for VisualizerId {
    type Err = UnknownVisualizer;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ORDER
            .iter()
            .copied()
            .find(|id| id.as_str() == raw)
            .ok_or_else(|| UnknownVisualizer(raw.to_owned()))
    }
}

/// Bounds and display metadata for one numeric parameter.
///
/// Every entry in the catalog satisfies `min <= default <= max` and
/// `step > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    /// CSS color token used by the control panel.
    pub color: &'static str,
}

impl ParamDescriptor {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug)]
pub struct VisualizerDescriptor {
    pub id: VisualizerId,
    pub display_name: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    /// Whether the draw routine consumes pointer input.
    pub interactive: bool,
    params: &'static [(&'static str, ParamDescriptor)],
}

impl VisualizerDescriptor {
    pub fn param(&self, name: &str) -> Option<&'static ParamDescriptor> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, desc)| desc)
    }

    pub fn params(&self) -> impl Iterator<Item = (&'static str, &'static ParamDescriptor)> {
        self.params.iter().map(|(key, desc)| (*key, desc))
    }
}

const fn param(
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
    default: f64,
    color: &'static str,
) -> ParamDescriptor {
    ParamDescriptor {
        label,
        min,
        max,
        step,
        default,
        color,
    }
}

static GRID_WALK: VisualizerDescriptor = VisualizerDescriptor {
    id: VisualizerId::GridWalk,
    display_name: "Grid Walk",
    tagline: "Structured chaos",
    description: "Agents traverse a grid, leaving colorful trails behind.",
    interactive: false,
    params: &[
        ("agents", param("--agents", 1.0, 100.0, 1.0, 8.0, "var(--term-blue)")),
        ("trailLength", param("--trail", 5.0, 100.0, 5.0, 40.0, "var(--term-green)")),
    ],
};

static RANDOM_WALK: VisualizerDescriptor = VisualizerDescriptor {
    id: VisualizerId::RandomWalk,
    display_name: "Random Walk",
    tagline: "Free flowing",
    description: "Organic, free-flowing paths that wind across the canvas.",
    interactive: false,
    params: &[
        ("agents", param("--agents", 1.0, 100.0, 1.0, 32.0, "var(--term-blue)")),
        ("thickness", param("--thickness", 1.0, 10.0, 1.0, 5.0, "var(--term-aqua)")),
    ],
};

static MATRIX_RAIN: VisualizerDescriptor = VisualizerDescriptor {
    id: VisualizerId::MatrixRain,
    display_name: "Matrix Rain",
    tagline: "Digital rain",
    description: "Falling characters cascade down the screen.",
    interactive: false,
    params: &[
        ("density", param("--density", 5.0, 50.0, 5.0, 20.0, "var(--term-green)")),
        ("charset", param("--charset", 0.0, 2.0, 1.0, 0.0, "var(--term-aqua)")),
    ],
};

static PARTICLE_SWARM: VisualizerDescriptor = VisualizerDescriptor {
    id: VisualizerId::ParticleSwarm,
    display_name: "Particle Swarm",
    tagline: "Follow the cursor",
    description: "Particles attracted to your mouse cursor.",
    interactive: true,
    params: &[
        ("particles", param("--particles", 50.0, 500.0, 50.0, 200.0, "var(--term-yellow)")),
        ("attraction", param("--attraction", 1.0, 10.0, 1.0, 5.0, "var(--term-red)")),
    ],
};

static STARFIELD: VisualizerDescriptor = VisualizerDescriptor {
    id: VisualizerId::Starfield,
    display_name: "Starfield",
    tagline: "Warp speed",
    description: "Fly through an endless field of stars.",
    interactive: false,
    params: &[
        ("stars", param("--stars", 100.0, 1000.0, 100.0, 400.0, "var(--term-blue)")),
        ("spread", param("--spread", 1.0, 10.0, 1.0, 5.0, "var(--term-purple)")),
    ],
};

static RIPPLES: VisualizerDescriptor = VisualizerDescriptor {
    id: VisualizerId::Ripples,
    display_name: "Ripples",
    tagline: "Click to create",
    description: "Click anywhere to create expanding ripples.",
    interactive: true,
    params: &[
        ("decay", param("--decay", 1.0, 10.0, 1.0, 5.0, "var(--term-aqua)")),
        ("frequency", param("--freq", 1.0, 10.0, 1.0, 5.0, "var(--term-yellow)")),
    ],
};

// Curated navigation order, not alphabetical.
static ORDER: [VisualizerId; 6] = [
    VisualizerId::GridWalk,
    VisualizerId::RandomWalk,
    VisualizerId::MatrixRain,
    VisualizerId::ParticleSwarm,
    VisualizerId::Starfield,
    VisualizerId::Ripples,
];

pub fn describe(id: VisualizerId) -> &'static VisualizerDescriptor {
    match id {
        VisualizerId::GridWalk => &GRID_WALK,
        VisualizerId::RandomWalk => &RANDOM_WALK,
        VisualizerId::MatrixRain => &MATRIX_RAIN,
        VisualizerId::ParticleSwarm => &PARTICLE_SWARM,
        VisualizerId::Starfield => &STARFIELD,
        VisualizerId::Ripples => &RIPPLES,
    }
}

/// Fresh mapping of every declared parameter to its default.
pub fn defaults(id: VisualizerId) -> ParamValues {
    describe(id)
        .params()
        .map(|(name, desc)| (name, desc.default))
        .collect()
}

/// Cycle order used by "next visualizer" navigation.
pub fn ordered_ids() -> &'static [VisualizerId] {
    &ORDER
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn descriptors_are_well_formed() {
        for &id in ordered_ids() {
            let desc = describe(id);
            assert_eq!(desc.id, id);
            for (name, p) in desc.params() {
                assert!(p.step > 0.0, "{id}.{name} step");
                assert!(p.min <= p.default && p.default <= p.max, "{id}.{name} bounds");
            }
        }
    }

    #[test]
    fn ids_round_trip_through_names() {
        for &id in ordered_ids() {
            assert_eq!(id.as_str().parse::<VisualizerId>(), Ok(id));
        }
        assert_eq!(
            "aurora".parse::<VisualizerId>(),
            Err(UnknownVisualizer("aurora".into()))
        );
    }

    #[test]
    fn defaults_follow_declaration_order() {
        let d = defaults(VisualizerId::GridWalk);
        let keys: Vec<_> = d.keys().copied().collect();
        assert_eq!(keys, vec!["agents", "trailLength"]);
        assert_eq!(d["agents"], 8.0);
    }

    #[test]
    fn defaults_are_copies() {
        let mut d = defaults(VisualizerId::Starfield);
        d.insert("stars", 1.0);
        assert_eq!(defaults(VisualizerId::Starfield)["stars"], 400.0);
    }

    #[test]
    fn interactive_flags() {
        let interactive: Vec<_> = ordered_ids()
            .iter()
            .filter(|id| describe(**id).interactive)
            .copied()
            .collect();
        assert_eq!(
            interactive,
            vec![VisualizerId::ParticleSwarm, VisualizerId::Ripples]
        );
    }
}
