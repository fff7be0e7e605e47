//! The `scout` terminal chat.

#[macro_use]
extern crate tracing;

use std::io::{self as std_io, Write as _};
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use scout::Config;
use scout::core::{Role, SessionBuilder, StreamError, Turn, TurnObserver};
use scout::input::read_line;
use scout::render::{self, AnswerPainter};
use scout_model::ModelFinishReason;
use scout_search::DuckDuckGoProvider;
use tokio::io::{self, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std_io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.bright_red());
            return ExitCode::FAILURE;
        }
    };
    debug!("loaded config: {config:?}");

    let mut session =
        SessionBuilder::with_model_provider(config.model_provider())
            .with_search_provider(DuckDuckGoProvider::new())
            .build();

    let mut stdin = BufReader::new(io::stdin());
    emit(&render::page(&[]));
    loop {
        emit(&format!("{} ", render::INPUT_HINT.bright_black()));

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        // Redraw the log before the new turn is appended.
        emit(&render::page(session.conversation().all()));

        let mut observer = TerminalObserver::default();
        let outcome = session.submit(query, &mut observer).await;
        if outcome.finish_reason == Some(ModelFinishReason::Length) {
            let note = "(answer cut at the length limit)";
            emit(&format!("{}\n", note.bright_black()));
        }
        emit("\n");
    }

    ExitCode::SUCCESS
}

/// Draws a submission as it happens: a spinner while searching, then the
/// answer growing in place.
#[derive(Default)]
struct TerminalObserver {
    spinner: Option<ProgressBar>,
    painter: Option<AnswerPainter>,
}

impl TerminalObserver {
    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn painter(&mut self) -> &mut AnswerPainter {
        self.painter.get_or_insert_with(|| {
            emit(&render::turn_prefix(Role::Assistant));
            AnswerPainter::default()
        })
    }
}

impl TurnObserver for TerminalObserver {
    fn on_user_turn(&mut self, turn: &Turn) {
        emit(&render::turn(turn));
    }

    fn on_search_started(&mut self, _query: &str) {
        let style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(render::SEARCHING_STATUS);
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn on_search_finished(&mut self, _context: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(render::SYNTHESIZING_STATUS);
        }
    }

    fn on_partial_answer(&mut self, answer: &str) {
        self.stop_spinner();
        let out = self.painter().paint(answer);
        emit(&out);
    }

    fn on_inference_error(&mut self, err: &StreamError) {
        self.stop_spinner();
        if let Some(painter) = &mut self.painter {
            emit(&painter.finish());
        }
        emit(&render::inference_error(&err.to_string()));
    }

    fn on_assistant_turn(&mut self, _turn: &Turn) {
        self.stop_spinner();
        if let Some(painter) = &mut self.painter {
            emit(&painter.finish());
        }
    }
}

fn emit(text: &str) {
    let mut stdout = std_io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        warn!("error writing output: {err}");
    }
}
