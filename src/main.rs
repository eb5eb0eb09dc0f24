use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use cctv_links_lib::server::VIEWER_PAGE;
use cctv_links_lib::{collect_image_links, logger, LinkStore, ViewerServer, DEFAULT_STORE_FILE};

#[derive(Parser)]
#[command(
    name = "cctv-link-extractor",
    version,
    about = "Extract CCTV snapshot links into a paginated store and serve a local grid viewer"
)]
struct Cli {
    /// Path of the link store file
    #[arg(long, global = true, default_value = DEFAULT_STORE_FILE)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a page and print the snapshot links found on it
    Extract {
        url: String,
        /// Also merge the extracted links into the store
        #[arg(long)]
        save: bool,
    },
    /// Print the stored links page by page
    Show,
    /// Replace the stored pages with a JSON array of pages read from a file
    Edit { file: PathBuf },
    /// Serve the store directory for the grid viewer and block
    Serve,
}

fn main() -> ExitCode {
    logger::init();

    let cli = Cli::parse();
    let store = LinkStore::new(&cli.store);

    match run(cli.command, &store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, store: &LinkStore) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Extract { url, save } => {
            let links = collect_image_links(&url)?;
            if links.is_empty() {
                info!("No image links found");
                return Ok(());
            }

            for link in &links {
                println!("{link}");
            }
            info!("Extracted {} image links", links.len());

            if save {
                let document = store.merge(&links)?;
                info!(
                    "Updated {:?}: {} links across {} pages",
                    store.path(),
                    document.total_links(),
                    document.pages.len()
                );
            }
        }
        Command::Show => {
            let document = store.load();
            for (i, page) in document.pages.iter().enumerate() {
                println!("Page {}:", i + 1);
                for link in page {
                    println!("  {link}");
                }
            }
            println!("Last written: {}", document.timestamp);
        }
        Command::Edit { file } => {
            let content = std::fs::read_to_string(&file)?;
            let pages: Vec<Vec<String>> = serde_json::from_str(&content)?;

            let document = store.replace_pages(pages)?;
            info!(
                "Saved {} links across {} pages",
                document.total_links(),
                document.pages.len()
            );
        }
        Command::Serve => {
            let root = store
                .path()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));

            let server = ViewerServer::new(root);
            let port = server.start()?;
            println!("Viewer available at http://localhost:{port}/{VIEWER_PAGE}");

            // The server thread holds the process open; nothing left to do
            // on the main thread.
            loop {
                std::thread::park();
            }
        }
    }
    Ok(())
}
