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

//! # Activity Search
//!
//! token -> city bounding box -> activities in the box -> type filter -> limit.
//! Runs strictly in sequence and gives up on the first failing step.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::amadeus::{AmadeusClient, RawActivity};
use crate::error::ToolError;
use crate::nominatim::NominatimClient;

pub const DESCRIPTION_MAX_CHARS: usize = 300;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip tags, collapse whitespace, and cut to `max_chars` characters
/// (`max_chars - 1` plus an ellipsis) when longer
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let text = HTML_TAG.replace_all(html, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: Option<String>,
    pub link: Option<String>,
    pub price: Price,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl From<&RawActivity> for Activity {
    fn from(item: &RawActivity) -> Self {
        let price = item.price.clone().unwrap_or_default();
        let description = item
            .description
            .as_deref()
            .map(|d| html_to_text(d, DESCRIPTION_MAX_CHARS))
            .filter(|d| !d.is_empty());

        Self {
            name: item.name.clone(),
            link: item
                .booking_link
                .clone()
                .filter(|l| !l.is_empty())
                .or_else(|| item.self_link.as_ref().and_then(|l| l.href.clone())),
            price: Price {
                amount: price.amount,
                currency: price.currency_code,
            },
            image: item.pictures.first().cloned(),
            description,
        }
    }
}

fn searchable_text(item: &RawActivity) -> String {
    let categories = item
        .classifications
        .iter()
        .map(|c| c.category.as_ref().and_then(|c| c.code.as_deref()).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{} {} {}",
        item.name.as_deref().unwrap_or(""),
        item.description.as_deref().unwrap_or(""),
        categories
    )
    .to_lowercase()
}

/// Keep items whose name, description or category codes contain
/// `activity_type`, ignoring case. An empty type keeps everything.
/// Whitespace in the type is part of the match.
pub fn filter_activities(items: Vec<RawActivity>, activity_type: &str) -> Vec<RawActivity> {
    let needle = activity_type.to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| searchable_text(item).contains(&needle))
        .collect()
}

/// What to look for, and where
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityQuery {
    pub city: String,
    pub activity_type: String,
    /// Zero or negative means no limit
    pub limit: i64,
}

impl ActivityQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            activity_type: String::new(),
            limit: 0,
        }
    }

    pub fn activity_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Clone)]
pub struct ActivityFinder {
    amadeus: AmadeusClient,
    geocoder: NominatimClient,
}

impl ActivityFinder {
    pub fn new(amadeus: AmadeusClient, geocoder: NominatimClient) -> Self {
        Self { amadeus, geocoder }
    }

    pub async fn search(&self, query: &ActivityQuery) -> Result<Vec<Activity>, ToolError> {
        let city = query.city.trim();
        if city.is_empty() {
            return Err(ToolError::validation("city is required"));
        }

        let access_token = self.amadeus.access_token().await?;
        let bbox = self.geocoder.resolve_bounding_box(city).await?;
        let items = self.amadeus.activities_by_square(&access_token, &bbox).await?;
        let fetched = items.len();

        let mut items = filter_activities(items, &query.activity_type);
        if query.limit > 0 {
            items.truncate(query.limit as usize);
        }
        let activities: Vec<Activity> = items.iter().map(Activity::from).collect();

        tracing::info!(
            "[Amadeus] Found {} activities for \"{}\" in {} ({} before filtering)",
            activities.len(),
            query.activity_type,
            city,
            fetched
        );
        Ok(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amadeus::{CategoryCode, Classification, RawPrice, SelfLink};

    fn item(name: &str, description: &str, code: &str) -> RawActivity {
        RawActivity {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            classifications: vec![Classification {
                category: Some(CategoryCode {
                    code: Some(code.to_string()),
                }),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        assert_eq!(
            html_to_text("<p>Hagia   Sophia</p>\n<br/>tour", 300),
            "Hagia Sophia tour"
        );
        assert_eq!(html_to_text("", 300), "");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let long = "a".repeat(400);
        let cut = html_to_text(&long, 300);
        assert_eq!(cut.chars().count(), 300);
        assert!(cut.ends_with('…'));
        assert_eq!(cut.chars().filter(|c| *c == 'a').count(), 299);
    }

    #[test]
    fn text_at_limit_is_untouched() {
        let exact = "é".repeat(300);
        assert_eq!(html_to_text(&exact, 300), exact);
    }

    #[test]
    fn cut_does_not_leave_trailing_space() {
        assert_eq!(html_to_text("abcd efgh", 6), "abcd…");
    }

    #[test]
    fn filter_matches_any_field_ignoring_case() {
        let items = vec![
            item("Istanbul Archaeology MUSEUM", "", "SIGHTS"),
            item("Old town walk", "Includes the Museum of Innocence", "TOURS"),
            item("Night cruise", "Dinner on the water", "MUSEUMS"),
            item("Cooking class", "Learn to make baklava", "FOOD"),
        ];
        let kept = filter_activities(items, "Museum");
        let names: Vec<_> = kept.iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(
            names,
            vec!["Istanbul Archaeology MUSEUM", "Old town walk", "Night cruise"]
        );
    }

    #[test]
    fn padded_type_is_matched_as_written() {
        let items = vec![
            item("Museum pass", "", ""),
            item("Pera Museum", "", ""),
            item("Hidden gems", "", "MUSEUM"),
        ];
        let kept = filter_activities(items, " museum");
        let names: Vec<_> = kept.iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec!["Pera Museum", "Hidden gems"]);
    }

    #[test]
    fn empty_type_keeps_everything_in_order() {
        let items = vec![item("b", "", ""), item("a", "", "")];
        let kept = filter_activities(items.clone(), "");
        assert_eq!(kept, items);
    }

    #[test]
    fn maps_link_price_and_image() {
        let raw = RawActivity {
            name: Some("Balloon ride".into()),
            description: Some("<b>Sunrise</b> flight".into()),
            self_link: Some(SelfLink {
                href: Some("https://api.example/activities/1".into()),
            }),
            price: Some(RawPrice {
                amount: Some("180.00".into()),
                currency_code: Some("EUR".into()),
            }),
            pictures: vec!["https://img.example/1.jpg".into(), "https://img.example/2.jpg".into()],
            ..Default::default()
        };
        let activity = Activity::from(&raw);
        assert_eq!(activity.link.as_deref(), Some("https://api.example/activities/1"));
        assert_eq!(activity.price.amount.as_deref(), Some("180.00"));
        assert_eq!(activity.price.currency.as_deref(), Some("EUR"));
        assert_eq!(activity.image.as_deref(), Some("https://img.example/1.jpg"));
        assert_eq!(activity.description.as_deref(), Some("Sunrise flight"));
    }

    #[test]
    fn booking_link_wins_over_self_link() {
        let raw = RawActivity {
            booking_link: Some("https://book.example/1".into()),
            self_link: Some(SelfLink {
                href: Some("https://api.example/1".into()),
            }),
            ..Default::default()
        };
        assert_eq!(Activity::from(&raw).link.as_deref(), Some("https://book.example/1"));
        assert_eq!(Activity::from(&raw).description, None);
    }
}
