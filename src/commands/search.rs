use super::{save_if_dirty, spinner, Context};
use anyhow::Result;
use packsmith::{ModResolver, RegistryClient, SearchIndex, SearchQuery};

pub fn run(
    ctx: &Context,
    query: Option<String>,
    index: SearchIndex,
    limit: u32,
    offset: u32,
    all: bool,
    add: Vec<usize>,
) -> Result<()> {
    // Without a project there is nothing to filter by or add to
    let mut project = if ctx.file.exists() || !add.is_empty() {
        Some(ctx.open_project()?)
    } else {
        None
    };

    let facets = match project.as_ref() {
        Some(project) if !all => {
            let pack = project.modpack()?;
            SearchQuery::mods_for(&pack.mod_loader, &pack.mc_version)
        }
        _ => Vec::new(),
    };

    let search = SearchQuery {
        query: query.clone(),
        facets,
        index: Some(index),
        offset: Some(offset),
        limit: Some(limit),
    };

    let config = &ctx.config;
    let registry = RegistryClient::from_config(config)?;

    let progress = spinner("Searching...");
    let response = registry.search(&search);
    progress.finish_and_clear();

    let response = match response? {
        Some(response) if !response.hits.is_empty() => response,
        _ => {
            match query {
                Some(q) => println!("No mods found matching '{}'", q),
                None => println!("No mods found"),
            }
            println!();
            println!(
                "Try a different search term, or --all to ignore the pack's loader and version."
            );
            return Ok(());
        }
    };

    println!(
        "Showing {}-{} of {} result{}:",
        response.offset + 1,
        response.offset as usize + response.hits.len(),
        response.total_hits,
        if response.total_hits == 1 { "" } else { "s" }
    );
    for (i, hit) in response.hits.iter().enumerate() {
        if hit.description.is_empty() {
            println!("  {:>2}. {} ({})", i + 1, hit.title, hit.slug);
        } else {
            println!(
                "  {:>2}. {} ({}) - {}",
                i + 1,
                hit.title,
                hit.slug,
                hit.description
            );
        }
    }

    if add.is_empty() {
        return Ok(());
    }

    let mut selected = Vec::new();
    for position in add {
        match position.checked_sub(1).and_then(|i| response.hits.get(i)) {
            Some(hit) => selected.push(hit.clone()),
            None => println!("⚠ No search result at position {}", position),
        }
    }

    let Some(project) = project.as_mut() else {
        return Ok(());
    };

    let mut selector = ctx.selector();
    let progress = ctx.spinner("Resolving mods...");
    let result = ModResolver::new(&registry, &config.resolver, selector.as_mut())
        .add_from_search(project, &selected);
    progress.finish_and_clear();

    super::add::print_report(project, &result?);
    save_if_dirty(project)
}
