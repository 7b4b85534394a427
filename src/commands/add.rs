use super::{save_if_dirty, Context};
use anyhow::Result;
use packsmith::{ModResolver, Project, RegistryClient, ResolveReport};

pub fn run(ctx: &Context, mods: Vec<String>) -> Result<()> {
    let mut project = ctx.open_project()?;
    let registry = RegistryClient::from_config(&ctx.config)?;
    let mut selector = ctx.selector();

    let spinner = ctx.spinner("Resolving mods...");
    let result = ModResolver::new(&registry, &ctx.config.resolver, selector.as_mut())
        .add_mods(&mut project, &mods);
    spinner.finish_and_clear();

    print_report(&project, &result?);
    save_if_dirty(&mut project)
}

pub fn print_report(project: &Project, report: &ResolveReport) {
    let title_of = |id: &str| {
        project
            .modpack()
            .ok()
            .and_then(|pack| pack.position_of(id).map(|i| pack.mod_data[i].clone()))
            .map(|record| format!("{} {}", record.title, record.version_number))
            .unwrap_or_else(|| id.to_string())
    };

    println!();
    for id in &report.added {
        println!("✓ Added {}", title_of(id));
    }
    for warning in &report.warnings {
        println!("⚠ {}", warning);
    }
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", report.skipped.join(", "));
    }
    if !report.failed.is_empty() {
        println!("✗ Not found: {}", report.failed.join(", "));
    }
    if report.added.is_empty() {
        println!("No mods were added.");
    }
}
