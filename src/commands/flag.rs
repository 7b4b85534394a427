use super::{save_if_dirty, Context};
use anyhow::Result;
use packsmith::FLAG_ALLOW_ALPHA_BETA;

const KNOWN_FLAGS: &[&str] = &[FLAG_ALLOW_ALPHA_BETA];

pub fn run(ctx: &Context, name: String, value: bool) -> Result<()> {
    if !KNOWN_FLAGS.contains(&name.as_str()) {
        anyhow::bail!(
            "Unknown flag '{}'\n\nKnown flags: {}",
            name,
            KNOWN_FLAGS.join(", ")
        );
    }

    let mut project = ctx.open_project()?;
    project.set_flag(&name, value)?;

    println!("✓ {} = {}", name, value);
    save_if_dirty(&mut project)
}
