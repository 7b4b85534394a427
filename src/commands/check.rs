use super::Context;
use anyhow::Result;
use packsmith::check_compatibility;

pub fn run(ctx: &Context) -> Result<()> {
    let project = ctx.open_project()?;
    let pack = project.modpack()?;

    let mut advisories = 0;
    for record in &pack.mod_data {
        for warning in pack.advisories(record) {
            println!("⚠ {}", warning);
            advisories += 1;
        }
    }

    if !check_compatibility(pack) {
        anyhow::bail!(
            "{} lists the same project more than once: {}\n\n\
             Remove the extra entries with: packsmith remove <position>",
            project.filename(),
            pack.duplicate_project_ids().join(", ")
        );
    }

    println!(
        "✓ {} mods, no duplicates ({} advisory warning{})",
        pack.mod_data.len(),
        advisories,
        if advisories == 1 { "" } else { "s" }
    );
    Ok(())
}
