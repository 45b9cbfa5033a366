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

//! # Text Rendering
//!
//! Side-effect free rendering of search results into the text blocks
//! returned by the tools. Missing fields get a fixed placeholder here and
//! nowhere else.

use serde_json::Value;

use crate::activities::Activity;
use crate::foursquare::{Photo, Place, PlaceDetails};

fn or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(placeholder)
}

fn number_or(value: Option<f64>, placeholder: &str) -> String {
    value.map_or_else(|| placeholder.to_string(), |v| v.to_string())
}

fn distance(place: &Place) -> String {
    place
        .distance
        .map_or_else(|| "Distance unknown".to_string(), |d| format!("{}m", d))
}

fn json_or(value: Option<&Value>, placeholder: &str, pretty: bool) -> String {
    match value {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(v) if pretty => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        Some(v) => v.to_string(),
    }
}

pub fn render_places(near: &str, query: &str, places: &[Place]) -> String {
    let entries = places
        .iter()
        .enumerate()
        .map(|(i, place)| {
            let categories = place.category_names();
            format!(
                "{}. **{}**\n   📍 {}\n   🏷️ {}\n   📏 {}\n   🌍 {}, {}\n   🔗 {}\n   🆔 ID: {}\n",
                i + 1,
                or(place.name.as_deref(), "Unknown"),
                or(place.address(), "Address not available"),
                or(categories.as_deref(), "No categories"),
                distance(place),
                number_or(place.latitude, "No lat"),
                number_or(place.longitude, "No lng"),
                or(place.link.as_deref(), "No link"),
                or(place.fsq_place_id.as_deref(), "Unknown"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Found {} places near \"{}\" matching \"{}\":\n\n{}",
        places.len(),
        near,
        query,
        entries
    )
}

pub fn render_place_details(details: &PlaceDetails) -> String {
    let place = &details.place;
    let categories = place.category_names();
    let verified = if details.verified.unwrap_or(false) {
        "Verified"
    } else {
        "Not verified"
    };

    let mut out = format!("**{}**\n\n", or(place.name.as_deref(), "Unknown"));
    out.push_str(&format!(
        "📍 **Address:** {}\n",
        or(place.address(), "Address not available")
    ));
    out.push_str(&format!(
        "🏷️ **Categories:** {}\n",
        or(categories.as_deref(), "No categories")
    ));
    out.push_str(&format!(
        "🌍 **Location:** {}, {}\n",
        number_or(place.latitude, "No lat"),
        number_or(place.longitude, "No lng")
    ));
    out.push_str(&format!("📏 **Distance:** {}\n", distance(place)));
    out.push_str(&format!(
        "⭐ **Rating:** {}\n",
        number_or(details.rating, "No rating")
    ));
    out.push_str(&format!(
        "📊 **Popularity:** {}\n",
        number_or(details.popularity, "No popularity score")
    ));
    out.push_str(&format!(
        "💰 **Price:** {}\n",
        details
            .price
            .map_or_else(|| "No price info".to_string(), |p| p.to_string())
    ));
    out.push_str(&format!(
        "🕒 **Hours:** {}\n",
        json_or(details.hours.as_ref(), "No hours info", true)
    ));
    out.push_str(&format!("📞 **Phone:** {}\n", or(details.tel.as_deref(), "No phone")));
    out.push_str(&format!("📧 **Email:** {}\n", or(details.email.as_deref(), "No email")));
    out.push_str(&format!(
        "🌐 **Website:** {}\n",
        or(details.website.as_deref(), "No website")
    ));
    out.push_str(&format!("🔗 **Link:** {}\n", or(place.link.as_deref(), "No link")));
    out.push_str(&format!(
        "📱 **Social Media:** {}\n",
        json_or(details.social_media.as_ref(), "No social media", false)
    ));
    out.push_str(&format!("✅ **Verified:** {}\n", verified));
    out.push_str(&format!(
        "📝 **Description:** {}\n",
        or(details.description.as_deref(), "No description")
    ));
    out
}

pub fn render_photos(photos: &[Photo]) -> String {
    if photos.is_empty() {
        return "No photos found for this place.".to_string();
    }

    let list = photos
        .iter()
        .enumerate()
        .map(|(i, photo)| {
            let size = match (photo.width, photo.height) {
                (Some(w), Some(h)) => format!("{}x{}", w, h),
                _ => "Unknown".to_string(),
            };
            let categories = if photo.categories.is_empty() {
                "No categories".to_string()
            } else {
                photo.categories.join(", ")
            };
            format!(
                "{}. **Size:** {}\n   **URL:** {}\n   **Categories:** {}\n",
                i + 1,
                size,
                photo.url(),
                categories
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Found {} photos:\n\n{}", photos.len(), list)
}

fn price(activity: &Activity) -> String {
    match (&activity.price.amount, &activity.price.currency) {
        (Some(amount), Some(currency)) => format!("{} {}", amount, currency),
        (Some(amount), None) => amount.clone(),
        _ => "Price not available".to_string(),
    }
}

/// An empty `activity_type` leaves the type word out of the header
pub fn render_activities(city: &str, activity_type: &str, activities: &[Activity]) -> String {
    let header = match activity_type.trim() {
        "" => format!("Found {} activities in {}:", activities.len(), city),
        t => format!("Found {} {} activities in {}:", activities.len(), t, city),
    };

    let entries = activities
        .iter()
        .enumerate()
        .map(|(i, activity)| {
            format!(
                "{}. **{}**\n   🔗 {}\n   💰 {}\n   📸 {}\n   📝 {}\n",
                i + 1,
                or(activity.name.as_deref(), "Unnamed activity"),
                or(activity.link.as_deref(), "No booking link"),
                price(activity),
                or(activity.image.as_deref(), "No image"),
                or(activity.description.as_deref(), "No description"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\n{}", header, entries)
}
