use askama::Template;

use crate::model::{CostItem, Hotel, TransportOption, TravelPlan};

use super::escape::multiline;
use super::icons::mode_icon;
use super::{link_button, section};

const BOOK_LABEL: &str = "🔍 Search & Book →";

#[derive(Template)]
#[template(path = "travel/route_header.html")]
struct RouteHeader<'a> {
    origin: &'a str,
    destination: &'a str,
    best_time: Option<&'a str>,
}

struct TransportCard<'a> {
    icon: &'static str,
    option: &'a TransportOption,
    details: String,
    link: String,
}

#[derive(Template)]
#[template(path = "travel/transport_cards.html")]
struct TransportCards<'a> {
    cards: Vec<TransportCard<'a>>,
}

struct HotelCard<'a> {
    hotel: &'a Hotel,
    why: String,
    link: String,
}

#[derive(Template)]
#[template(path = "travel/hotel_cards.html")]
struct HotelCards<'a> {
    cards: Vec<HotelCard<'a>>,
}

struct DayBlock {
    icon: &'static str,
    label: &'static str,
    text: String,
}

struct DayCard<'a> {
    day: &'a str,
    blocks: Vec<DayBlock>,
    notes: Option<String>,
}

#[derive(Template)]
#[template(path = "travel/itinerary.html")]
struct Itinerary<'a> {
    days: Vec<DayCard<'a>>,
}

#[derive(Template)]
#[template(path = "travel/cost_grid.html")]
struct CostGrid<'a> {
    costs: &'a [CostItem],
}

#[derive(Template)]
#[template(path = "travel/tips.html")]
struct Tips<'a> {
    tips: &'a [String],
}

pub(crate) fn render(plan: &TravelPlan) -> String {
    let mut out = String::new();

    if plan.has_route() {
        out.push_str(
            &RouteHeader {
                origin: plan.origin.as_deref().unwrap_or_default(),
                destination: plan.destination.as_deref().unwrap_or_default(),
                best_time: plan.best_time_to_visit.as_deref(),
            }
            .to_string(),
        );
    }

    if !plan.transport.is_empty() {
        let cards = plan
            .transport
            .iter()
            .map(|option| TransportCard {
                icon: mode_icon(&option.mode),
                option,
                details: multiline(&option.details),
                link: link_button(&option.booking_link, "blue", BOOK_LABEL),
            })
            .collect();
        out.push_str(&section(
            "travel-transport",
            "🚀 Best Ways to Reach",
            &TransportCards { cards }.to_string(),
        ));
    }

    if !plan.hotels.is_empty() {
        let cards = plan
            .hotels
            .iter()
            .map(|hotel| HotelCard {
                hotel,
                why: multiline(&hotel.why),
                link: link_button(&hotel.booking_link, "purple", BOOK_LABEL),
            })
            .collect();
        out.push_str(&section(
            "travel-hotels",
            "🏨 Hotels & Stays",
            &HotelCards { cards }.to_string(),
        ));
    }

    if !plan.itinerary.is_empty() {
        let days = plan
            .itinerary
            .iter()
            .map(|day| {
                let blocks = [
                    ("🌅", "Morning", &day.morning),
                    ("☀️", "Afternoon", &day.afternoon),
                    ("🌙", "Evening", &day.evening),
                ];
                DayCard {
                    day: &day.day,
                    blocks: blocks
                        .into_iter()
                        .filter_map(|(icon, label, block)| {
                            block.as_deref().map(|text| DayBlock {
                                icon,
                                label,
                                text: multiline(text),
                            })
                        })
                        .collect(),
                    notes: day.notes.as_deref().map(multiline),
                }
            })
            .collect();
        out.push_str(&section(
            "travel-itinerary",
            "📅 Day-by-Day Itinerary",
            &Itinerary { days }.to_string(),
        ));
    }

    if !plan.costs.is_empty() {
        out.push_str(&section(
            "travel-costs",
            "💰 Estimated Cost Breakdown",
            &CostGrid { costs: &plan.costs }.to_string(),
        ));
    }

    if !plan.tips.is_empty() {
        out.push_str(&section(
            "travel-tips",
            "💡 Travel Tips",
            &Tips { tips: &plan.tips }.to_string(),
        ));
    }

    out
}
