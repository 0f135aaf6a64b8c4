use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = relief_ops::Args::parse();

	relief_ops::run(args).await
}
