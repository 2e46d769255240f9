//! stratek command line

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use stratek::config::StratekConfig;
use stratek::contact::ContactForm;
use stratek::email::DeliveryOrchestrator;
use stratek::handlers::process_contact;
use stratek::pdf::PdfRenderer;
use stratek::state::AppState;
use stratek::{observability, server};

#[derive(Parser)]
#[command(name = "stratek")]
#[command(version)]
#[command(about = "Contact-form backend for the Stratek portfolio site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Port to listen on, overrides configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// List the configured email providers in priority order
    Providers {
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Send a sample submission through the whole pipeline
    SendTest {
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Send the email without a PDF attachment
        #[arg(long)]
        skip_pdf: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<StratekConfig> {
    let config = match path {
        Some(path) => StratekConfig::load_from(path)?,
        None => StratekConfig::load()?,
    };
    Ok(config)
}

fn sample_form() -> ContactForm {
    ContactForm {
        nombre: Some("Cliente de Prueba".to_string()),
        email: Some("prueba@example.com".to_string()),
        servicio: Some("Desarrollo Web".to_string()),
        presupuesto: Some("€2,000 - €5,000".to_string()),
        mensaje: Some("Mensaje de prueba enviado desde la línea de comandos.".to_string()),
        telefono: Some("+34 600 000 000".to_string()),
        empresa: Some("Empresa de Prueba".to_string()),
        timeline: Some("1-2 meses".to_string()),
        priority: Some("Media".to_string()),
    }
}

fn providers(config: &StratekConfig) {
    let orchestrator = DeliveryOrchestrator::from_settings(&config.email);
    let names = orchestrator.provider_names();

    if names.is_empty() {
        println!("{}", style("No email provider configured").yellow().bold());
        return;
    }

    println!("{}", style("Email providers (priority order):").bold());
    for (position, name) in names.iter().enumerate() {
        println!("  {} {}", style(position + 1).dim(), style(name).cyan());
    }
}

async fn send_test(config: StratekConfig, skip_pdf: bool) -> Result<()> {
    let pdf = if skip_pdf {
        PdfRenderer::disabled()
    } else {
        PdfRenderer::from_settings(&config.pdf)
    };
    let orchestrator = DeliveryOrchestrator::from_settings(&config.email);
    let state = AppState::new(config, orchestrator, pdf);

    let submission = sample_form().into_contact_submission()?;
    println!(
        "{} {}",
        style("Sending").green().bold(),
        style("test submission...").bold()
    );

    let details = process_contact(&state, &submission).await;

    println!("  PDF generated: {}", details.pdf_generated);
    println!("  Email sent:    {}", details.email_sent);
    if let Some(provider) = details.email_service {
        println!("  Provider:      {}", style(provider).cyan());
    }
    for error in &details.errors {
        println!("  {} {}", style("error:").red().bold(), error);
    }

    if !details.email_sent {
        anyhow::bail!("test email was not delivered");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();
    observability::init()?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve {
        config: None,
        port: None,
    });

    match command {
        Commands::Serve { config, port } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await?;
        }
        Commands::Providers { config } => {
            providers(&load_config(config.as_ref())?);
        }
        Commands::SendTest { config, skip_pdf } => {
            send_test(load_config(config.as_ref())?, skip_pdf).await?;
        }
    }

    Ok(())
}
