use anyhow::Result;
use packsmith::Config;

pub fn run(action: &crate::ConfigAction) -> Result<()> {
    use crate::ConfigAction;

    match action {
        ConfigAction::Show => show_config(),
        ConfigAction::Set { key, value } => set_config(key, value),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::default_path()?;

    println!();
    println!("  Config file: {}", config_path.display());
    if !config_path.exists() {
        println!("  (not created yet, showing defaults)");
    }
    println!();

    println!("[registry]");
    println!("  registry_type:    {}", config.registry.registry_type);
    println!("  url:              {}", config.registry.url);
    println!("  path:             {}", config.registry.path);
    println!("  timeout_seconds:  {}", config.registry.timeout_seconds);
    println!("  user_agent:       {}", config.registry.user_agent);
    println!();

    println!("[resolver]");
    println!("  max_workers:            {}", config.resolver.max_workers);
    println!(
        "  auto_add_dependencies:  {}",
        format_bool(config.resolver.auto_add_dependencies)
    );
    println!();

    println!("[project]");
    println!("  default_filename:  {}", config.project.default_filename);
    println!();

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("✓ Set {} = {}", key, value);
    Ok(())
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
