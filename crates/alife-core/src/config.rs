//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fewest bytes a growth instruction needs for every field to be readable
pub const MIN_INSTRUCTION_LEN: usize = 8;

/// Genome used for the first life when no other is configured
pub const DEFAULT_SEED_GENOME: [u8; 90] = [
    1, 1, 6, 3, 10, 0, 11, 100, 0, 0, //
    4, 7, 1, 3, 10, 0, 12, 100, 0, 0, //
    1, 3, 2, 1, 10, 0, 0, 0, 0, 0, //
    3, 4, 2, 2, 20, 0, 0, 0, 0, 0, //
    2, 5, 1, 4, 10, 8, 64, 40, 0, 0, //
    0, 6, 0, 5, 5, 0, 0, 0, 0, 0, //
    1, 2, 3, 0, 10, 0, 0, 0, 0, 0, //
    4, 8, 0, 3, 10, 20, 128, 30, 0, 0, //
    2, 5, 1, 2, 10, 8, 192, 40, 0, 0, //
];

/// Genome decoding and aging parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeConfig {
    /// Width of one growth instruction in bytes
    pub prime_gene_length: usize,
    /// Ticks a life lives before it is torn down
    pub lifespan: u64,
    /// Ticks after spawn during which no cell may grow
    pub dormancy_ticks: u64,
    /// Largest growth quota a cell can decode
    pub max_growth_limit: u8,
    /// Per-byte replacement probability on reproduction, in percent
    pub mutation_rate: u8,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            prime_gene_length: 10,
            lifespan: 1000,
            dormancy_ticks: 10,
            max_growth_limit: 7,
            mutation_rate: 10,
        }
    }
}

/// Energy and cost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Energy the seed life's root starts with
    pub seed_energy: f32,
    /// Fee charged to the sender of a diffusion transfer
    pub move_cost: f32,
    /// Energy a green cell gains per tick at full illumination
    pub photosynthesis_gain: f32,
    /// Bonus granted when a cell touches a resource node
    pub eat_energy: f32,
    /// Impulse magnitude per unit of a foot cell's impulse gene
    pub foot_impulse_scale: f32,
    /// Energy a foot cell pays per unit of its impulse gene
    pub foot_energy_per_impulse: f32,
    /// Launch impulse per unit of a breed cell's impulse gene
    pub breed_impulse_scale: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            seed_energy: 1.0,
            move_cost: 1.0,
            photosynthesis_gain: 3.0,
            eat_energy: 10.0,
            foot_impulse_scale: 0.5,
            foot_energy_per_impulse: 0.1,
            breed_impulse_scale: 0.5,
        }
    }
}

/// Light source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunConfig {
    pub position: Position,
    /// Distance at which illumination reaches zero
    pub reach: f32,
    /// Modulate power with a seasonal sine cycle
    pub seasonal: bool,
    /// Ticks per seasonal cycle
    pub season_period: u64,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            position: Position::ORIGIN,
            reach: 600.0,
            seasonal: false,
            season_period: 100,
        }
    }
}

/// World layout and population limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Radius of a cell body; children spawn three radii away
    pub cell_radius: f32,
    /// Where the seed life is placed
    pub seed_position: Position,
    /// Bias growth direction towards the sun
    pub phototropism: bool,
    /// Reproduction is refused once this many lives exist
    pub max_population: usize,
    pub sun: SunConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cell_radius: 10.0,
            seed_position: Position::ORIGIN,
            phototropism: true,
            max_population: 1000,
            sun: SunConfig::default(),
        }
    }
}

/// Real-time pacing of ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Minimum seconds between two ticks
    pub interval_secs: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { interval_secs: 0.1 }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Genome of the first life
    pub seed_genome: Vec<u8>,
    /// Emit population metrics every this many ticks (0 disables)
    pub stats_interval: u64,
    pub genome: GenomeConfig,
    pub energy: EnergyConfig,
    pub world: WorldConfig,
    pub clock: ClockConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            seed_genome: DEFAULT_SEED_GENOME.to_vec(),
            stats_interval: 100,
            genome: GenomeConfig::default(),
            energy: EnergyConfig::default(),
            world: WorldConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is in range
    pub fn validate(&self) -> Result<()> {
        if self.genome.prime_gene_length < MIN_INSTRUCTION_LEN {
            return Err(Error::Validation(format!(
                "prime_gene_length must be at least {}, got {}",
                MIN_INSTRUCTION_LEN, self.genome.prime_gene_length
            )));
        }
        if self.genome.mutation_rate > 100 {
            return Err(Error::Validation(format!(
                "mutation_rate is a percentage, got {}",
                self.genome.mutation_rate
            )));
        }
        if self.genome.lifespan == 0 {
            return Err(Error::Validation("lifespan must be positive".to_string()));
        }
        if self.seed_genome.len() < self.genome.prime_gene_length {
            return Err(Error::Validation(format!(
                "seed genome has {} bytes, needs at least {}",
                self.seed_genome.len(),
                self.genome.prime_gene_length
            )));
        }
        if self.energy.move_cost < 0.0 {
            return Err(Error::Validation("move_cost must not be negative".to_string()));
        }
        if self.world.cell_radius <= 0.0 {
            return Err(Error::Validation("cell_radius must be positive".to_string()));
        }
        if self.world.sun.reach <= 0.0 {
            return Err(Error::Validation("sun reach must be positive".to_string()));
        }
        if self.world.sun.season_period == 0 {
            return Err(Error::Validation("season_period must be positive".to_string()));
        }
        if self.clock.interval_secs < 0.0 {
            return Err(Error::Validation("clock interval must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let genome = GenomeConfig::default();
        assert_eq!(genome.prime_gene_length, 10);
        assert_eq!(genome.dormancy_ticks, 10);
        assert_eq!(genome.mutation_rate, 10);

        let config = SimulationConfig::default();
        assert_eq!(config.seed_genome.len(), 90);
        assert_eq!(&config.seed_genome[..10], &[1, 1, 6, 3, 10, 0, 11, 100, 0, 0]);
        assert_eq!(&config.seed_genome[10..20], &[4, 7, 1, 3, 10, 0, 12, 100, 0, 0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.genome.mutation_rate = 101;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.genome.prime_gene_length = 4;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.seed_genome = vec![1, 2, 3];
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.genome.lifespan = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.seed_genome, deserialized.seed_genome);
        assert_eq!(config.genome.lifespan, deserialized.genome.lifespan);
        assert_eq!(config.world.sun.reach, deserialized.world.sun.reach);
    }

    #[test]
    fn test_from_json_file() {
        let mut config = SimulationConfig::default();
        config.seed = 7;
        let path = std::env::temp_dir().join(format!("alife-config-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = SimulationConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.seed, 7);
        std::fs::remove_file(&path).unwrap();

        assert!(SimulationConfig::from_json_file("/nonexistent/alife.json").is_err());
    }
}
