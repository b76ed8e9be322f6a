use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = ansa_api::Args::parse();
	ansa_api::run(args).await
}
