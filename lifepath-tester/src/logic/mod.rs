pub mod playability;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use playability::aggregate_runs;
pub use policy::PlayerStrategy;
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use simulation::{JourneySimulator, SimulationPlan, SimulationSummary};
pub use tester::{LogicTester, ScenarioResult};
