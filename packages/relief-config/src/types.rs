use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub matching: Matching,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Bounds applied by the matching engine on every delivery run.
#[derive(Debug, Deserialize)]
pub struct Matching {
	/// Most recent demands scanned per contact.
	#[serde(default = "default_max_demands_per_contact")]
	pub max_demands_per_contact: u32,
	/// Most recent unsent matches harvested per demand.
	#[serde(default = "default_max_matches_per_demand")]
	pub max_matches_per_demand: u32,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			max_demands_per_contact: default_max_demands_per_contact(),
			max_matches_per_demand: default_max_matches_per_demand(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_demands_per_contact() -> u32 {
	100
}

fn default_max_matches_per_demand() -> u32 {
	10
}
