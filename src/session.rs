//! The interactive search session.
//!
//! Walks the user from location to listings: confirm a US location, pick a
//! state and county (both added to the location tree if new), optionally
//! narrow to one nearby county and a tag, then page through listings.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::error::GeoError;
use crate::location_tree::LocationTree;
use crate::orchestrator::{ListingsSource, PersistOutcome, QueryOrchestrator, select_counties};
use crate::prompt::Prompter;
use crate::proximity::CountyResolver;
use crate::states::{is_valid_county, is_valid_state, normalize_name};
use crate::tree_store::TreeSink;
use crate::types::{CountyRef, Listing, ListingsQuery};
use crate::zipcode::ZipIndex;

#[derive(Debug, Default)]
pub struct SessionSummary {
    pub quit_early: bool,
    pub counties_searched: Vec<CountyRef>,
    pub listings_found: usize,
    pub listings_shown: usize,
    pub tree_updated: bool,
}

pub async fn run<R, W, Res, S, L>(
    prompter: &mut Prompter<R, W>,
    orchestrator: &QueryOrchestrator<'_, Res, S>,
    tree: &mut LocationTree,
    zips: &ZipIndex,
    listings: &L,
    page_size: usize,
) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
    Res: CountyResolver,
    S: TreeSink,
    L: ListingsSource,
{
    let mut summary = SessionSummary::default();

    prompter.say("Welcome to Gifts for Good! This app suggests items for purchase that are sold by Etsy stores")?;
    prompter.say("in areas near you that are experiencing high poverty. We encourage shoppers to keep money in their")?;
    prompter.say("local communities, where it is needed most.")?;
    prompter.say("")?;

    if !prompter.confirm("First, let's determine your location. Are you located in the United States?")? {
        prompter.say("Sorry, but we only support US locations at this time.")?;
        if !prompter.confirm("Would you like to search for items near a US location?")? {
            prompter.say("Goodbye!")?;
            summary.quit_early = true;
            return Ok(summary);
        }
    }

    prompter.say("")?;
    prompter.say(format!("Currently mapped states: {}", tree.child_labels().join(", ")))?;
    let state = prompter.ask_until(
        "Please enter the name of your state. We will add it to our mapping if it is not yet listed:",
        "State name not valid.",
        |s| is_valid_state(s).then(|| normalize_name(s)),
    )?;

    let mapped: Vec<String> = tree
        .state(&state)
        .map(|s| s.child_refs().iter().map(|c| c.county.clone()).collect())
        .unwrap_or_default();
    prompter.say("")?;
    prompter.say(format!("Currently mapped counties in {state}: {}", mapped.join(", ")))?;
    let county = prompter.ask_until(
        "Please enter the name of your county (county name only, no state). We will add it to our mapping if it is not yet listed:",
        "County not found in selected state.",
        |c| is_valid_county(zips, c, &state).then(|| normalize_name(c)),
    )?;

    let resolution = match orchestrator.resolve(tree, &state, &county) {
        Ok(resolution) => resolution,
        Err(GeoError::NoPovertyCountyFound { max_radius, .. }) => {
            prompter.say(format!(
                "Sorry, we could not find a high-poverty county within {max_radius} degrees of {county} county."
            ))?;
            return Ok(summary);
        }
        Err(e) => return Err(e.into()),
    };
    summary.tree_updated = resolution.persist == PersistOutcome::Saved;
    if let PersistOutcome::Failed(reason) = &resolution.persist {
        prompter.say(format!("(Your new location could not be saved for next time: {reason})"))?;
    }

    let nearby = resolution.nearby().to_vec();
    prompter.say("")?;
    prompter.say(format!(
        "The following counties near {county} county, {state}, experience high poverty levels:"
    ))?;
    prompter.say(nearby.iter().map(CountyRef::to_string).collect::<Vec<_>>().join("; "))?;
    prompter.say("")?;

    let mut counties = nearby.clone();
    if prompter.confirm("Would you like to limit your Etsy item search to one specific high-poverty county?")? {
        let choice = prompter.ask("Please enter the name of the county you'd like to search:")?;
        match select_counties(&nearby, &choice) {
            Some(picked) => {
                prompter.say(format!("Thanks! We will only search in {} county.", normalize_name(&choice)))?;
                counties = picked;
            }
            None => prompter.say("County not recognized. Searching all counties...")?,
        }
    }

    prompter.say("")?;
    let tag = if prompter.confirm("Would you like to add a tag to narrow your search (e.g. 'necklace' or 'watch')?")? {
        let tag = prompter.ask("Please enter your desired tag now:")?;
        prompter.say(format!("Searching for {tag}..."))?;
        Some(tag)
    } else {
        None
    };

    prompter.say("This next step may take a while. Please be patient as we gather Etsy listings...")?;
    let query = ListingsQuery {
        counties: counties.clone(),
        tag,
    };
    let outcome = orchestrator.search_listings(&query, listings).await;
    summary.counties_searched = counties;
    summary.listings_found = outcome.listings.len();
    if !outcome.failures.is_empty() {
        prompter.say(format!(
            "({} of {} locations could not be searched.)",
            outcome.failures.len(),
            outcome.locations_searched
        ))?;
    }

    summary.listings_shown = page_listings(prompter, &outcome.listings, page_size)?;

    prompter.say("")?;
    prompter.say("Thank you for using Gifts for Good! Remember to shop small and support your neighbors!")?;
    if summary.tree_updated {
        prompter.say("(Added state and county data have been saved for future use. Thank you for expanding our mapping!)")?;
    }
    Ok(summary)
}

/// Prints the first page, then further pages of a user-chosen size.
/// Returns how many listings were shown.
fn page_listings<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    listings: &[Listing],
    page_size: usize,
) -> Result<usize> {
    if listings.is_empty() {
        prompter.say("No listings found.")?;
        return Ok(0);
    }

    let mut shown = show(prompter, listings, 0, page_size)?;
    while shown < listings.len() {
        prompter.say("")?;
        if !prompter.confirm("Would you like to see more results?")? {
            break;
        }
        let more = prompter.ask_count("How many more listings would you like to see?")?;
        shown = show(prompter, listings, shown, more)?;
    }
    if shown >= listings.len() {
        prompter.say("That's every listing we found.")?;
    }
    Ok(shown)
}

fn show<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    listings: &[Listing],
    start: usize,
    count: usize,
) -> Result<usize> {
    let end = start.saturating_add(count).min(listings.len());
    for listing in &listings[start..end] {
        prompter.say(format!("{listing}\n"))?;
    }
    Ok(end)
}
