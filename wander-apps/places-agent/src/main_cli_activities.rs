//!  Wander Places Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//!
//! # Examples
//!
//! ## Activities of a given type
//!
//! ```bash
//! export AMADEUS_API_KEY=... AMADEUS_API_SECRET=...
//! wander-activities search -c "Istanbul" -t museum -l 5
//! ```
//!
//! ## Everything in a city
//!
//! ```bash
//! wander-activities city -c "Cappadocia"
//! ```
//!
//! ## Against a local Amadeus mock
//!
//! ```bash
//! wander-activities --amadeus-base-url http://localhost:8080 search -c Paris -t tour
//! ```
//!
//! # Output
//!
//! Each activity is listed with its name, booking link, price, image and a
//! plain-text description of at most 300 characters.

use anyhow::Result;
use clap::{Parser, Subcommand};
use wander_places_agent::{
    ApiArgs, ApiConfig, CityActivitiesInput, SearchActivitiesInput, ToolCall, Toolbox,
};

#[derive(Parser, Debug)]
#[command(name = "wander-activities")]
#[command(version = "0.1.0")]
#[command(about = "Search activities via the Amadeus API")]
struct Args {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Activities in a city matching a type keyword
    Search {
        #[arg(short = 'c', long, default_value = "Istanbul")]
        city: String,
        #[arg(
            short = 't',
            long = "type",
            default_value = "museum",
            help = "Keyword matched against name, description and category (e.g., tour, boat, food)"
        )]
        activity_type: String,
        #[arg(short = 'l', long, default_value = "10")]
        limit: i64,
    },
    /// Every activity in a city, unfiltered
    City {
        #[arg(short = 'c', long)]
        city: String,
        #[arg(short = 'l', long, default_value = "20")]
        limit: i64,
    },
}

impl From<Command> for ToolCall {
    fn from(command: Command) -> Self {
        match command {
            Command::Search {
                city,
                activity_type,
                limit,
            } => ToolCall::SearchActivities(SearchActivitiesInput {
                city,
                activity_type,
                limit,
            }),
            Command::City { city, limit } => {
                ToolCall::GetCityActivities(CityActivitiesInput {
                    city: Some(city),
                    limit,
                })
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toolbox = Toolbox::new(&ApiConfig::from(args.api))?;

    match toolbox.call(args.command.into()).await {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
