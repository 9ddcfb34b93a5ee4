//! CLI command implementations.

use crate::estimator::Estimator;
use crate::MapArgs;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;
use treeline_core::CodeNode;
use treeline_graph::build_graph;
use treeline_mapper::config::CONFIG_DIR;
use treeline_mapper::{focus_key, Diagnostic, MapOptions, MapperConfig, RepoMapper};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Initialize Treeline in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = MapperConfig::local_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    MapperConfig::default().save(&config_path)?;

    println!("{} Initialized Treeline in {}", "✓".green(), path.display());
    println!("  Settings live in {}", path.join(CONFIG_DIR).display());
    println!("  Run {} to map your repository", "treeline map".cyan());

    Ok(())
}

/// Map a repository and print or save the result.
pub fn map(args: &MapArgs) -> Result<()> {
    let mut config = MapperConfig::load(&args.path)?;
    apply_overrides(&mut config, args);

    let spinner = spinner("Mapping repository...")?;

    let mapper = RepoMapper::from_config(&config, Estimator::load());
    let options = MapOptions {
        render: config.render_options(),
        exclude: config.exclude.clone(),
        mentioned_symbols: args.symbols.clone(),
    };
    let result = if args.files.is_empty() {
        mapper.create_overview(&args.path, &options)
    } else {
        mapper.create_focused_view(&args.files, &args.path, &options)
    };

    spinner.finish_and_clear();
    let map = result?;

    match &args.output {
        Some(out_path) => {
            fs::write(out_path, &map.text)?;
            eprintln!(
                "{} Wrote {} tokens from {} files to {}",
                "✓".green(),
                map.stats.output_size.to_string().cyan(),
                map.stats.files_analyzed.to_string().cyan(),
                out_path.display()
            );
        }
        None => println!("{}", map.text),
    }

    report_diagnostics(&map.diagnostics);
    Ok(())
}

/// Show the most important nodes of a repository.
pub fn rank(
    path: &Path,
    top: usize,
    files: &[std::path::PathBuf],
    symbols: &[String],
    json_output: bool,
) -> Result<()> {
    let config = MapperConfig::load(path)?;
    let mapper = RepoMapper::from_config(&config, Estimator::Chars(Default::default()));

    let analyzed = mapper.analyze_repository(path, &config.exclude)?;
    let focused: Vec<String> = files
        .iter()
        .filter_map(|f| focus_key(path, f))
        .collect();
    let scores = mapper.score(&analyzed.root, &focused, symbols);

    let mut ranked: Vec<(&CodeNode, f64)> = analyzed
        .root
        .descendants()
        .into_iter()
        .map(|node| (node, scores.get(&node.path).copied().unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|(a, sa), (b, sb)| sb.total_cmp(sa).then_with(|| a.path.cmp(&b.path)));
    ranked.truncate(top);

    if json_output {
        let output = serde_json::json!({
            "scorer": config.scorer.to_string(),
            "nodes": ranked.iter().map(|(node, score)| serde_json::json!({
                "path": node.path,
                "name": node.name,
                "kind": node.kind,
                "score": score
            })).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Most important nodes".cyan().bold());
        println!();
        for (node, score) in &ranked {
            println!(
                "  {:>6} {:<9} {}",
                format!("{:.3}", score).yellow(),
                node.kind.to_string().dimmed(),
                node.path
            );
        }
    }

    report_diagnostics(&analyzed.diagnostics);
    Ok(())
}

/// Export the reference graph with scores to JSON.
pub fn export(path: &Path, output: &Path) -> Result<()> {
    let config = MapperConfig::load(path)?;
    let mapper = RepoMapper::from_config(&config, Estimator::Chars(Default::default()));

    let analyzed = mapper.analyze_repository(path, &config.exclude)?;
    let nodes = analyzed.root.descendants();
    let graph = build_graph(nodes.iter().copied(), Vec::new());
    let scores = mapper.score(&analyzed.root, &[], &[]);

    let export = serde_json::json!({
        "version": treeline_mapper::config::CONFIG_VERSION,
        "scorer": config.scorer.to_string(),
        "stats": graph.stats(),
        "nodes": nodes.iter().map(|node| serde_json::json!({
            "path": node.path,
            "name": node.name,
            "kind": node.kind,
            "score": scores.get(&node.path).copied().unwrap_or(0.0)
        })).collect::<Vec<_>>(),
        "edges": graph.export_edges()
    });

    fs::write(output, serde_json::to_string_pretty(&export)?)?;
    println!(
        "{} Exported {} nodes and {} edges to {}",
        "✓".green(),
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        output.display()
    );

    report_diagnostics(&analyzed.diagnostics);
    Ok(())
}

fn apply_overrides(config: &mut MapperConfig, args: &MapArgs) {
    if let Some(tokens) = args.tokens {
        config.token_limit = Some(tokens);
    }
    if args.unlimited {
        config.token_limit = None;
    }
    if let Some(detail) = args.detail {
        config.detail = detail;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(scorer) = args.scorer {
        config.scorer = scorer;
    }
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }
    config.exclude.extend(args.exclude.iter().cloned());
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("\n{} {} files could not be analyzed:", "⚠".yellow(), diagnostics.len());
    for diagnostic in diagnostics.iter().take(5) {
        eprintln!("  {} - {}", diagnostic.path.red(), diagnostic.message);
    }
    if diagnostics.len() > 5 {
        eprintln!("  ... and {} more", diagnostics.len() - 5);
    }
}
