mod bootstrap;

use anyhow::Result;
use protocol_core::config::EngineConfig;
use protocol_core::settings::{OutputFormat, Settings};
use protocol_data::analysis::{analyze_file, AnalysisResult};
use protocol_data::reader::resolve_inputs;
use protocol_report::app::App;
use protocol_report::export::{write_csv_sheets, write_workbook, OutputNames};
use protocol_report::sheet::build_sheets;
use protocol_report::text::render_sheets;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Lap Protocol v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.engine_config()?;
    tracing::info!(
        "Mode: {}, Sessions: {}, Laps/session: {}, Threshold: {:.3}s",
        settings.mode,
        config.session_count,
        config.laps_per_session,
        config.lap_time_threshold.as_secs_f64()
    );

    let inputs = resolve_inputs(&settings.inputs)?;
    tracing::info!("Processing {} export(s)", inputs.len());

    // Each export is an independent event.
    let mut results = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let result = analyze_file(input, settings.mode, &config)?;
        results.push((input.clone(), result));
    }

    match settings.format {
        OutputFormat::Csv => {
            let mut names = OutputNames::new();
            for (input, result) in &results {
                let sheets = build_sheets(&result.standings, &config);
                let stem = bootstrap::protocol_stem(input);
                let written = write_csv_sheets(&sheets, &settings.output, &stem, &mut names)?;
                for path in written {
                    println!("{}", path.display());
                }
            }
        }

        OutputFormat::Xlsx => {
            let mut names = OutputNames::new();
            for (input, result) in &results {
                let sheets = build_sheets(&result.standings, &config);
                let stem = bootstrap::protocol_stem(input);
                let path = write_workbook(&sheets, &settings.output, &stem, &mut names)?;
                println!("{}", path.display());
            }
        }

        OutputFormat::Json => {
            let documents: Vec<&AnalysisResult> = results.iter().map(|(_, r)| r).collect();
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }

        OutputFormat::Text => {
            for (input, result) in &results {
                println!("# {}", input.display());
                println!();
                print!("{}", render_sheets(&build_sheets(&result.standings, &config)));
                println!();
            }
        }

        OutputFormat::Tui => {
            for (input, result) in results {
                run_viewer(&settings.theme, &input, &result, &config).await?;
            }
        }
    }

    Ok(())
}

/// Show one protocol in the terminal viewer.
///
/// The blocking event loop runs on tokio's blocking pool and always restores
/// the terminal before returning; it exits on `q`, Esc or Ctrl+C.
async fn run_viewer(
    theme: &str,
    input: &std::path::Path,
    result: &AnalysisResult,
    config: &EngineConfig,
) -> Result<()> {
    let sheets = build_sheets(&result.standings, config);
    let app = App::new(theme, bootstrap::protocol_stem(input), sheets);

    tokio::task::spawn_blocking(move || app.run()).await??;
    tracing::debug!("Viewer closed for {}", input.display());
    Ok(())
}
