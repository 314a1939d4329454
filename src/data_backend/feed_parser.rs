use std::collections::BTreeSet;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::constants::MAX_DAY_AGE_HOURS;
use crate::data_types::{MealEntry, MealPlanDay};
use crate::errors::FeedError;

/// Parses the max-manager feed into plan days.
///
/// The feed nests `item` elements (one per dish) inside `tag` elements (one
/// per day, Unix-seconds `timestamp` attribute). Selecting over the parsed
/// tree always yields sequences, so a plan with a single day or a day with a
/// single item needs no special casing. Days whose timestamp lies more than
/// 24 hours before `now` are dropped, not surfaced.
///
/// A body without the `speiseplan` root (an upstream error page, say) is a
/// parse failure, not an empty plan.
pub fn parse_plan_from_xml(
    xml: &str,
    now: DateTime<Utc>,
) -> Result<Vec<MealPlanDay>, FeedError> {
    let document = Html::parse_fragment(xml);
    let root_sel = Selector::parse("speiseplan").unwrap();
    let day_sel = Selector::parse("tag").unwrap();
    let item_sel = Selector::parse("item").unwrap();

    let root = document
        .select(&root_sel)
        .next()
        .ok_or(FeedError::MissingElement("speiseplan"))?;

    let mut days = Vec::new();

    for day in root.select(&day_sel) {
        let raw_ts = day
            .value()
            .attr("timestamp")
            .ok_or(FeedError::MissingElement("tag timestamp"))?;
        let secs: i64 = raw_ts
            .parse()
            .map_err(|_| FeedError::BadTimestamp(raw_ts.to_string()))?;
        let date = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| FeedError::BadTimestamp(raw_ts.to_string()))?;

        if now - date > Duration::hours(MAX_DAY_AGE_HOURS) {
            log::debug!("dropping stale plan day {}", date.date_naive());
            continue;
        }

        let mut meals = Vec::new();
        for item in day.select(&item_sel) {
            meals.push(parse_meal(item)?);
        }

        days.push(MealPlanDay {
            timestamp: date.to_rfc3339_opts(SecondsFormat::Millis, true),
            meals,
        });
    }

    Ok(days)
}

fn parse_meal(item: ElementRef) -> Result<MealEntry, FeedError> {
    let title = child_text(item, "title")?;
    let (name, allergenes) = strip_allergen_codes(&title);

    // the three price tiers come in fixed source order
    let prices = [
        parse_price(&child_text(item, "preis1")?)?,
        parse_price(&child_text(item, "preis2")?)?,
        parse_price(&child_text(item, "preis3")?)?,
    ];

    Ok(MealEntry {
        name,
        prices,
        allergenes,
    })
}

fn child_text(item: ElementRef, tag: &'static str) -> Result<String, FeedError> {
    item.select(&Selector::parse(tag).unwrap())
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or(FeedError::MissingElement(tag))
}

/// Removes every parenthesised allergen group from a meal name, collecting
/// the comma-separated codes into a deduplicated, sorted list.
///
/// A name may carry several groups ("Salat (1,2) mit Dressing (2,3)"), so
/// removal loops until no group is left; running the whole thing again on a
/// cleaned name is a no-op.
fn strip_allergen_codes(raw: &str) -> (String, Vec<String>) {
    let group_re = Regex::new(r"\s*\(([^()]*)\)\s*").unwrap();
    let mut name = raw.to_string();
    let mut codes = BTreeSet::new();

    while let Some(caps) = group_re.captures(&name) {
        let group = caps.get(0).unwrap();
        let group_range = group.start()..group.end();

        for code in caps.get(1).unwrap().as_str().split(',') {
            let code = code.trim();
            if !code.is_empty() {
                codes.insert(code.to_string());
            }
        }

        name.replace_range(group_range, " ");
    }

    (name.trim().to_string(), codes.into_iter().collect())
}

fn parse_price(raw: &str) -> Result<f64, FeedError> {
    // feed prices use the German decimal comma ("3,50")
    raw.trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| FeedError::BadPrice(raw.trim().to_string()))
}
