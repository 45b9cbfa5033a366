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
//! ## Basic search
//!
//! ```bash
//! export FOURSQUARE_API_KEY=...
//! wander-places search -n "Antalya" -q restaurant
//! ```
//!
//! ## Filter by category
//!
//! ```bash
//! # Up to 5 museums in Istanbul (Foursquare category 10027)
//! wander-places search -n "Istanbul" -q museum -l 5 -c 10027
//! ```
//!
//! ## Details and photos
//!
//! ```bash
//! wander-places details 4b5c1d2ef964a520c7b828e3
//! wander-places photos 4b5c1d2ef964a520c7b828e3 -l 3
//! ```
//!
//! # Output
//!
//! The same text blocks the MCP tools return. Failures are printed on stderr
//! and the process exits with status 1.

use anyhow::Result;
use clap::{Parser, Subcommand};
use wander_places_agent::{
    ApiArgs, ApiConfig, PlaceDetailsInput, PlacePhotosInput, SearchPlacesInput, ToolCall, Toolbox,
};

#[derive(Parser, Debug)]
#[command(name = "wander-places")]
#[command(version = "0.1.0")]
#[command(about = "Search places via the Foursquare Places API")]
struct Args {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search places near a location
    Search {
        #[arg(short = 'n', long, default_value = "Antalya")]
        near: String,
        #[arg(short = 'q', long, default_value = "restaurant")]
        query: String,
        #[arg(short = 'l', long, default_value = "10", help = "Number of results (1-50)")]
        limit: i64,
        #[arg(
            short = 'c',
            long,
            help = "Category IDs (comma-separated, e.g., 13065,13032)"
        )]
        categories: Option<String>,
    },
    /// Show everything known about a place
    Details { fsq_place_id: String },
    /// List photos of a place
    Photos {
        fsq_place_id: String,
        #[arg(short = 'l', long, default_value = "10")]
        limit: i64,
    },
}

impl From<Command> for ToolCall {
    fn from(command: Command) -> Self {
        match command {
            Command::Search {
                near,
                query,
                limit,
                categories,
            } => ToolCall::SearchPlaces(SearchPlacesInput {
                near,
                query,
                limit,
                categories: categories.unwrap_or_default(),
            }),
            Command::Details { fsq_place_id } => ToolCall::GetPlaceDetails(PlaceDetailsInput {
                fsq_place_id: Some(fsq_place_id),
            }),
            Command::Photos {
                fsq_place_id,
                limit,
            } => ToolCall::GetPlacePhotos(PlacePhotosInput {
                fsq_place_id: Some(fsq_place_id),
                limit,
            }),
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
