use packsmith::{Mod, ProjectInfo, Selector, Version};
use std::io::Write;

/// How many candidate versions are listed before truncating
const MAX_LISTED: usize = 10;

/// Asks on stdin; end of input counts as "no"
pub struct PromptSelector;

fn ask(question: &str) -> Option<String> {
    print!("{}", question);
    std::io::stdout().flush().ok()?;

    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(answer.trim().to_lowercase()),
    }
}

fn confirm(question: &str) -> bool {
    matches!(
        ask(&format!("{} (yes/no): ", question)).as_deref(),
        Some("y") | Some("yes")
    )
}

impl Selector for PromptSelector {
    fn choose_version(&mut self, project: &ProjectInfo, candidates: &[Version]) -> Option<usize> {
        println!();
        println!("{} ({})", project.title, project.slug);
        if !project.description.is_empty() {
            println!("  {}", project.description);
        }
        for (i, version) in candidates.iter().take(MAX_LISTED).enumerate() {
            println!("  {:>2}. {}", i + 1, version.describe());
        }
        if candidates.len() > MAX_LISTED {
            println!("      ... {} older versions", candidates.len() - MAX_LISTED);
        }

        loop {
            let answer = ask("Version to add [1, s to skip]: ")?;
            match answer.as_str() {
                "" => return Some(0),
                "s" | "skip" => return None,
                other => match other.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= candidates.len() => return Some(n - 1),
                    _ => println!("  Enter a number between 1 and {}", candidates.len()),
                },
            }
        }
    }

    fn confirm_dependencies(&mut self, project: &ProjectInfo, dependencies: &[String]) -> bool {
        println!("  {} requires: {}", project.title, dependencies.join(", "));
        confirm("  Add required dependencies?")
    }

    fn confirm_update(&mut self, installed: &Mod, candidate: &Version) -> bool {
        println!();
        println!(
            "{}: {} ({}) -> {}",
            installed.title,
            installed.version_number,
            installed.date_published,
            candidate.describe()
        );
        if let Some(changelog) = candidate.changelog.as_deref().filter(|c| !c.is_empty()) {
            for line in changelog.lines().take(5) {
                println!("    {}", line);
            }
        }
        confirm("  Update?")
    }
}
