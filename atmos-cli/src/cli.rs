use std::{fs, path::PathBuf};

use anyhow::Context;
use atmos_core::{Config, DatePicker, FormController, HttpForecastClient, SubmitError};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::prompt;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "atmos", version, about = "AI powered weather forecast chat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the forecast server, style and defaults.
    Configure,

    /// Request a single forecast.
    Ask {
        /// Date as YYYY-MM-DD; prompts with a date picker if absent.
        #[arg(long)]
        date: Option<String>,

        /// Report length in words; defaults to the configured length.
        #[arg(long)]
        length: Option<String>,

        /// Also write the transcript as an HTML page.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Interactive chat: pick dates until you are done.
    Chat {
        /// Write the transcript as an HTML page on exit.
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => {
                let updated = prompt::configure(&config)?;
                updated.save()?;
                println!("Saved configuration to {}", Config::config_file_path()?.display());
            }
            Command::Ask { date, length, html } => {
                ask(&config, date, length, html.as_ref()).await?;
            }
            Command::Chat { html } => {
                let mut session = Session::new(&config);
                session.print_new();

                let result = session.chat_loop(&config).await;
                session.export(html.as_ref())?;
                result?;
            }
        }

        Ok(())
    }
}

/// One submission; fails with the banner text when no card was produced.
async fn ask(
    config: &Config,
    date: Option<String>,
    length: Option<String>,
    html: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let picker = DatePicker::default();
    let date = match date {
        Some(raw) => picker.pick(&raw)?,
        None => prompt::date(&picker)?,
    };
    let length = length.unwrap_or_else(|| config.default_report_length.to_string());

    let mut session = Session::new(config);
    session.print_new();
    let outcome = session.submit(date, length).await;
    session.export(html)?;
    outcome?;

    Ok(())
}

/// A controller plus the bookkeeping needed to print only new entries.
struct Session {
    controller: FormController,
    client: HttpForecastClient,
    printed: usize,
}

impl Session {
    fn new(config: &Config) -> Self {
        let client = HttpForecastClient::from_config(config);
        info!(url = client.url(), "using forecast endpoint");

        Self { controller: FormController::new(config), client, printed: 0 }
    }

    async fn submit(&mut self, date: String, length: String) -> Result<(), SubmitError> {
        self.controller.set_date(date);
        self.controller.set_report_length(length);

        let outcome = self.controller.submit(&self.client).await;
        self.print_new();
        outcome.map(|_| ())
    }

    async fn chat_loop(&mut self, config: &Config) -> anyhow::Result<()> {
        let picker = DatePicker::default();

        loop {
            let input = prompt::date(&picker).and_then(|date| {
                prompt::report_length(config.default_report_length).map(|length| (date, length))
            });
            let (date, length) = match input {
                Ok(input) => input,
                Err(err) if prompt::is_cancel(&err) => break,
                Err(err) => return Err(err.into()),
            };

            match self.submit(date, length).await {
                Ok(()) => self.offer_details()?,
                Err(err) => eprintln!("Error: {err}"),
            }

            match prompt::another() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(err) if prompt::is_cancel(&err) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Let the user expand the card that was just added.
    fn offer_details(&mut self) -> anyhow::Result<()> {
        let presenter = self.controller.presenter_mut();
        let Some(last) = presenter.transcript().len().checked_sub(1) else {
            return Ok(());
        };

        match prompt::show_details() {
            Ok(true) => {
                presenter.toggle_card(last);
                if let Some(entry) = presenter.transcript().entries().get(last) {
                    println!("{entry}\n");
                }
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) if prompt::is_cancel(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn print_new(&mut self) {
        let transcript = self.controller.presenter_mut().transcript_mut();
        transcript.take_scroll();

        for entry in &transcript.entries()[self.printed..] {
            println!("{entry}\n");
        }
        self.printed = transcript.len();
    }

    fn export(&self, path: Option<&PathBuf>) -> anyhow::Result<()> {
        let Some(path) = path else {
            return Ok(());
        };

        fs::write(path, self.controller.presenter().render_html())
            .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
        println!("Transcript written to {}", path.display());
        Ok(())
    }
}
