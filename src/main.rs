// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use extfetch::commands::fetch::FetchCommand;
use extfetch::config::FetchConfig;
use extfetch::error::{format_error_chain, get_exit_code};
use extfetch::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extfetch")]
#[command(
    author,
    version,
    about = "Download marketplace extension packages for selected platforms",
    long_about = None
)]
struct Cli {
    /// File listing one package identifier per line ('#' starts a comment)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory to save packages into [default: your download directory]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Timeout in seconds for each page load, click and download [default: 180]
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Target platform code, repeatable or comma separated [default: this machine]
    #[arg(
        short,
        long = "platform",
        value_name = "CODE",
        value_delimiter = ',',
        action = clap::ArgAction::Append
    )]
    platforms: Vec<String>,

    /// Show the browser window instead of running headless
    #[arg(short, long)]
    debug: bool,

    /// Do not ask before writing into a non-empty output directory
    #[arg(short, long)]
    yes: bool,

    /// Stop at the first package that fails
    #[arg(long)]
    fail_fast: bool,

    /// Use a running WebDriver server instead of spawning chromedriver
    #[arg(long, value_name = "URL")]
    webdriver: Option<String>,

    /// Path to the chromedriver binary [default: looked up in PATH]
    #[arg(long, value_name = "PATH")]
    chromedriver: Option<PathBuf>,

    /// Disable progress indicators
    #[arg(long)]
    no_progress: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command line flags take precedence over file and environment settings.
    fn apply_to(&self, config: &mut FetchConfig) {
        if let Some(output) = &self.output {
            config.output_dir = Some(output.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if !self.platforms.is_empty() {
            config.platforms = self.platforms.clone();
        }
        if self.debug {
            config.headless = false;
        }
        if self.fail_fast {
            config.fail_fast = true;
        }
        if let Some(url) = &self.webdriver {
            config.webdriver_url = Some(url.clone());
        }
        if let Some(path) = &self.chromedriver {
            config.chromedriver_path = Some(path.clone());
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let mut config = match FetchConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error_chain(&e));
            std::process::exit(get_exit_code(&e));
        }
    };
    cli.apply_to(&mut config);

    let command = FetchCommand::new(&config, cli.no_progress, cli.yes);
    if let Err(e) = command.execute(&cli.input).await {
        eprintln!("{}", format_error_chain(&e));
        std::process::exit(get_exit_code(&e));
    }
}
