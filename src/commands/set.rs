use super::{save_if_dirty, Context};
use anyhow::Result;
use packsmith::PackField;

pub fn run(ctx: &Context, field: PackField, value: String) -> Result<()> {
    let mut project = ctx.open_project()?;

    let previous = project.modpack()?.field(field).to_string();
    project.edit(field, &value)?;
    let current = project.modpack()?.field(field);

    println!("✓ {}: '{}' -> '{}'", field.as_str(), previous, current);
    save_if_dirty(&mut project)
}
