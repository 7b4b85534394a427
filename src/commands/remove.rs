use super::{save_if_dirty, to_indices, Context};
use anyhow::Result;

pub fn run(ctx: &Context, positions: Vec<usize>) -> Result<()> {
    let indices = to_indices(&positions)?;
    let mut project = ctx.open_project()?;

    let pack = project.modpack()?;
    let titles: Vec<String> = indices
        .iter()
        .filter_map(|&i| pack.mod_data.get(i))
        .map(|record| record.title.clone())
        .collect();
    let out_of_range: Vec<String> = indices
        .iter()
        .filter(|&&i| i >= pack.mod_data.len())
        .map(|i| (i + 1).to_string())
        .collect();

    if !out_of_range.is_empty() {
        println!("⚠ No mod at position {}", out_of_range.join(", "));
    }

    if !project.remove_mods(&indices)? {
        println!("Nothing removed.");
        return Ok(());
    }

    for title in &titles {
        println!("✓ Removed {}", title);
    }
    save_if_dirty(&mut project)
}
