use super::{save_if_dirty, to_indices, Context};
use anyhow::Result;
use packsmith::{ModResolver, RegistryClient};

pub fn run(ctx: &Context, positions: Vec<usize>) -> Result<()> {
    let indices = to_indices(&positions)?;
    let mut project = ctx.open_project()?;

    if project.modpack()?.mod_data.is_empty() {
        println!("No mods to update.");
        return Ok(());
    }

    let registry = RegistryClient::from_config(&ctx.config)?;
    let mut selector = ctx.selector();

    println!("Checking for updates...");
    let spinner = ctx.spinner("Fetching versions...");
    let result = ModResolver::new(&registry, &ctx.config.resolver, selector.as_mut())
        .update_mods(&mut project, &indices);
    spinner.finish_and_clear();
    let report = result?;

    println!();
    let pack = project.modpack()?;
    for id in &report.updated {
        if let Some(record) = pack.position_of(id).map(|i| &pack.mod_data[i]) {
            println!("✓ Updated {} to {}", record.title, record.version_number);
        }
    }
    if !report.failed.is_empty() {
        println!("✗ Could not check: {}", report.failed.join(", "));
    }
    if report.updated.is_empty() {
        println!("All selected mods are up to date.");
    } else {
        println!(
            "{} updated, {} unchanged",
            report.updated.len(),
            report.current.len()
        );
    }

    save_if_dirty(&mut project)
}
