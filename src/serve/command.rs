//! Functionality related to the `bamalyzer serve` command itself.

use clap::Args;
use tracing::info;
use tracing::warn;

use crate::serve::server::DashboardServer;
use crate::utils::args::PipelineArgs;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `bamalyzer serve`.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, value_name = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, value_name = "PORT", default_value = "8501")]
    port: u16,

    /// Open the upload page in the default browser once the server is up.
    #[arg(long)]
    open: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

//==============//
// Main command //
//==============//

/// Main method for the `bamalyzer serve` subcommand.
pub fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.pipeline.config()?;

    let address = format!("{}:{}", args.host, args.port);
    let server = DashboardServer::bind(&address, config)?;

    let url = format!("http://{}", address);
    info!("serving the dashboard at {}", url);

    if args.open {
        if let Err(e) = webbrowser::open(&url) {
            warn!("could not open a browser: {}", e);
        }
    }

    server.run()
}
