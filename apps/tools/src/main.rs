use anyhow::Result;
use clap::{Parser, Subcommand};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/server.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    AddOrganization {
        name: String,
    },
    ListOrganizations {
        /// Include ids and timestamps.
        #[arg(long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::AddOrganization { name } => {
            let organization_id = storage.create_organization(&name).await?;
            println!("created organization_id={}", organization_id.0);
        }
        Command::ListOrganizations { verbose: false } => {
            for name in storage.list_organization_names().await? {
                println!("{name}");
            }
        }
        Command::ListOrganizations { verbose: true } => {
            for org in storage.list_organizations().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    org.organization_id.0,
                    org.name,
                    org.created_at.to_rfc3339(),
                    org.updated_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}
