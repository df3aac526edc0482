// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use whatif::http::{self, AppState};
use whatif::render::render_report;
use whatif::DEMO_SCENARIOS;
use whatif_engine::contracts::{EngineMode, WhatIfConfig};
use whatif_engine::{ConfigLoader, ConfigStore, ScenarioEngine};

#[derive(Parser, Debug, Clone)]
#[command(name = "whatif", about = "Six-stage what-if scenario analysis")]
struct Cli {
    /// TOML configuration file (defaults to ./whatif.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured engine
    #[arg(long, global = true, value_enum)]
    engine: Option<EngineArg>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EngineArg {
    Template,
    Model,
}

impl From<EngineArg> for EngineMode {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Template => EngineMode::Template,
            EngineArg::Model => EngineMode::Model,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Analyse a single scenario
    Run {
        scenario: String,
        #[arg(long)]
        json: bool,
    },

    /// Analyse the built-in demo scenarios
    Demo {
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let cli = Cli::parse();

    let loader =
        ConfigLoader::new(cli.config.clone()).with_engine_override(cli.engine.map(Into::into));
    let config = loader.load()?;

    match cli.cmd.unwrap_or(Command::Demo { json: false }) {
        Command::Run { scenario, json } => run_scenarios(&config, &[scenario.as_str()], json).await,
        Command::Demo { json } => run_scenarios(&config, &DEMO_SCENARIOS, json).await,
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            info!(engine = %config.engine.mode, "Starting what-if API");
            http::serve(AppState::new(ConfigStore::with_config(loader, config)), &bind).await
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_scenarios(config: &WhatIfConfig, scenarios: &[&str], json: bool) -> Result<()> {
    let engine = ScenarioEngine::from_config(config)?;
    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let result = engine.run_workflow(scenario).await?;
        if !json {
            println!("{}\n", render_report(&result));
        }
        results.push(result);
    }
    if json {
        let output = match results.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            all => serde_json::to_string_pretty(all)?,
        };
        println!("{output}");
    }
    Ok(())
}
