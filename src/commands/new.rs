use super::Context;
use anyhow::Result;
use packsmith::{NewProject, Project};

pub fn run(ctx: &Context, request: NewProject, force: bool) -> Result<()> {
    if ctx.file.exists() && !force {
        anyhow::bail!(
            "{} already exists\n\nUse --force to overwrite it, or --file to pick another name.",
            ctx.file.display()
        );
    }

    let mut project = Project::new();
    project.set_filename(&ctx.file);
    project.create(&request)?;
    let path = project.save(Some(&ctx.file))?;

    let pack = project.modpack()?;
    println!("✓ Created {} ({})", pack.title, path.display());
    println!("  Minecraft {} / {}", pack.mc_version, pack.mod_loader);
    println!();
    println!("Next steps:");
    println!("  packsmith search <query>   Find mods for this pack");
    println!("  packsmith add <slug>       Add a mod and its dependencies");

    Ok(())
}
