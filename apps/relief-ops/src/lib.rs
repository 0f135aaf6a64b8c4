use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use relief_service::{ContactHints, Error, RecordKind, ReliefService, search};
use relief_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = relief_cli::VERSION,
	rename_all = "kebab",
	styles = relief_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// Create or upgrade the database schema and exit.
	Schema,
	/// Filtered search over one record type.
	Search {
		#[arg(value_name = "KIND")]
		kind: RecordKind,
		/// Column filter or reserved key (`after`, `before`, `verified_after`, `limit`).
		#[arg(long = "param", short = 'p', value_name = "KEY=VALUE", value_parser = parse_param)]
		params: Vec<(String, String)>,
	},
	/// Insert a record, or update it when the attributes carry an `id`.
	Put {
		#[arg(value_name = "KIND")]
		kind: RecordKind,
		/// JSON object of attributes.
		#[arg(long, value_name = "JSON")]
		attributes: String,
		#[arg(long, value_name = "UUID")]
		acting_user: Uuid,
	},
	/// Deliver pending matches to one contact.
	Deliver {
		#[arg(long, default_value = "telegram")]
		source: String,
		#[arg(long, value_name = "ID", required_unless_present = "handle")]
		user_id: Option<String>,
		#[arg(long, value_name = "HANDLE")]
		handle: Option<String>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = relief_config::load(&args.config)?;

	init_tracing(&config)?;

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = ReliefService::new(config, db);
	let output = match args.command {
		Command::Schema => serde_json::json!({ "schema": "ready" }),
		Command::Search { kind, params } => {
			let items = service
				.search(kind, search::string_params(params))
				.await
				.inspect_err(log_failure)?;

			serde_json::to_value(items)?
		},
		Command::Put { kind, attributes, acting_user } => {
			let attributes = parse_attributes(&attributes)?;
			let response =
				service.put(kind, attributes, acting_user).await.inspect_err(log_failure)?;

			serde_json::to_value(response)?
		},
		Command::Deliver { source, user_id, handle } => {
			let hints = ContactHints::new(source, user_id, handle);
			let delivery = service.deliver_matches(&hints).await.inspect_err(log_failure)?;

			serde_json::to_value(delivery)?
		},
	};
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

fn init_tracing(config: &relief_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}

fn log_failure(err: &Error) {
	tracing::warn!(kind = err.kind(), error = %err, "Operation rolled back.");
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
	let (key, value) =
		raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
	let key = key.trim();

	if key.is_empty() {
		return Err(format!("missing key in {raw:?}"));
	}

	Ok((key.to_string(), value.to_string()))
}

fn parse_attributes(raw: &str) -> color_eyre::Result<Map<String, Value>> {
	match serde_json::from_str::<Value>(raw)? {
		Value::Object(map) => Ok(map),
		other => Err(eyre::eyre!("attributes must be a JSON object, got {other}.")),
	}
}
