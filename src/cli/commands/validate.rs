//! `taller validate` command - Check shop documents against their schemas

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::context::ShopContext;
use crate::cli::GlobalOpts;
use crate::core::store::yaml::DOCUMENT_SUFFIX;
use crate::core::EntityPrefix;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: whole shop)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Only this document type (rep, cust)
    #[arg(long, short = 't')]
    pub entity_type: Option<String>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = ShopContext::open(global)?;
    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);

    let entity_filter: Option<EntityPrefix> = match &args.entity_type {
        Some(t) => Some(t.to_uppercase().parse().map_err(|e| miette::miette!("{}", e))?),
        None => None,
    };

    let files = if args.paths.is_empty() {
        let mut files = shop_documents(&ctx.shop.repairs_dir());
        files.extend(shop_documents(&ctx.shop.customers_dir()));
        files
    } else {
        args.paths.iter().flat_map(|p| shop_documents(p)).collect()
    };

    println!("{} Validating {} file(s)...\n", style("→").blue(), files.len());

    let mut stats = ValidationStats::default();
    for path in &files {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(prefix) = EntityPrefix::from_filename(&filename) else {
            if !args.summary {
                println!(
                    "{} {} - unknown document type (skipped)",
                    style("?").yellow(),
                    path.display()
                );
            }
            continue;
        };
        if entity_filter.is_some_and(|f| f != prefix) {
            continue;
        }

        stats.files_checked += 1;
        let outcome = std::fs::read_to_string(path)
            .map_err(|e| (1, miette::miette!("{}", e)))
            .and_then(|content| {
                validator
                    .iter_errors(&content, &filename, prefix)
                    .map_err(|e| (e.violation_count(), miette::Report::new(e)))
            });

        match outcome {
            Ok(()) => {
                stats.files_passed += 1;
                if !args.summary {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Err((count, report)) => {
                stats.files_failed += 1;
                stats.total_errors += count;
                if !args.summary {
                    println!(
                        "{} {} - {} error(s)",
                        style("✗").red(),
                        path.display(),
                        count
                    );
                    println!("{:?}", report);
                }
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    println!();

    match stats.files_failed {
        0 => {
            println!("{} All files passed validation!", style("✓").green().bold());
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

/// Shop documents under `path`, or `path` itself if it is a file
fn shop_documents(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(DOCUMENT_SUFFIX))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_shop_documents_skips_other_files() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("REP-B.taller.yaml"), "").unwrap();
        std::fs::write(tmp.path().join("REP-A.taller.yaml"), "").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "").unwrap();

        let files = shop_documents(tmp.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["REP-A.taller.yaml", "REP-B.taller.yaml"]);
    }
}
