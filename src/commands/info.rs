use super::Context;
use anyhow::Result;
use packsmith::VersionType;

pub fn run(ctx: &Context) -> Result<()> {
    let project = ctx.open_project()?;
    let pack = project.modpack()?;

    println!("{}", pack.title);
    if !pack.description.is_empty() {
        println!("  {}", pack.description);
    }
    println!();
    println!("  File:          {}", project.filename());
    println!("  Minecraft:     {}", pack.mc_version);
    println!("  Loader:        {}", pack.mod_loader);
    println!("  Build:         {} ({})", pack.build_version, pack.build_date);
    for (name, enabled) in &pack.flags {
        println!("  Flag {:<9} {}", format!("{}:", name), enabled);
    }
    println!();

    if pack.mod_data.is_empty() {
        println!("No mods yet. Add one with: packsmith add <slug>");
        return Ok(());
    }

    println!(
        "{} mod{}:",
        pack.mod_data.len(),
        if pack.mod_data.len() == 1 { "" } else { "s" }
    );
    for (i, record) in pack.mod_data.iter().enumerate() {
        let channel = match record.version_type {
            VersionType::Release => String::new(),
            other => format!(" [{}]", other),
        };
        println!(
            "  {:>3}. {} {}{}",
            i + 1,
            record.title,
            record.version_number,
            channel
        );
    }

    Ok(())
}
